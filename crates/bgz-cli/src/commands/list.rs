//! Effect listing command

use anyhow::{Context, Result};
use bgz_effects::{ClearMode, EffectKind, LoopSettings, Options};
use bgz_runtime::Schedule;
use serde::Serialize;

#[derive(Serialize)]
struct EffectListing {
    name: &'static str,
    summary: &'static str,
    schedule: String,
    clear_mode: String,
    options: Options,
}

pub fn run(format: &str) -> Result<()> {
    let mut listings = Vec::new();
    for kind in EffectKind::ALL {
        let (effect, settings) = kind
            .configure(&Options::new())
            .with_context(|| format!("Failed to build defaults for {}", kind))?;
        listings.push(EffectListing {
            name: kind.name(),
            summary: kind.summary(),
            schedule: describe_schedule(&settings),
            clear_mode: describe_clear_mode(&settings),
            options: effect.settings(),
        });
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    println!("{:<16} {:<14} {:<22} SUMMARY", "EFFECT", "SCHEDULE", "CLEAR");
    for listing in &listings {
        println!(
            "{:<16} {:<14} {:<22} {}",
            listing.name, listing.schedule, listing.clear_mode, listing.summary
        );
    }
    Ok(())
}

pub fn describe_schedule(settings: &LoopSettings) -> String {
    match settings.schedule {
        Schedule::EveryFrame => "every frame".to_string(),
        Schedule::Interval(period) => format!("every {:.1} ms", period.as_secs_f64() * 1000.0),
    }
}

pub fn describe_clear_mode(settings: &LoopSettings) -> String {
    match settings.clear_mode {
        ClearMode::Clear => "clear".to_string(),
        ClearMode::Fill(color) => format!("fill {}", color.to_hex()),
        ClearMode::Fade(color) => format!("fade {}", color.to_hex()),
    }
}
