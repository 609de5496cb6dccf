//! Option validation command

use super::list::{describe_clear_mode, describe_schedule};
use super::load_options;
use anyhow::{Context, Result};
use bgz_effects::{EffectKind, Options};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Resolved {
    effect: &'static str,
    schedule: String,
    clear_mode: String,
    options: Options,
}

pub fn run(effect: &str, options_path: Option<&str>, overrides: &[String], format: &str) -> Result<()> {
    let options = load_options(options_path, overrides)?;
    let resolved = resolve(effect, &options)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!("Effect: {}", resolved.effect);
    println!("Schedule: {}", resolved.schedule);
    println!("Clear mode: {}", resolved.clear_mode);
    println!();
    print!("{}", toml::to_string_pretty(&resolved.options)?);
    Ok(())
}

fn resolve(effect: &str, options: &Options) -> Result<Resolved> {
    let kind: EffectKind = effect.parse()?;
    let (built, settings) = kind
        .configure(options)
        .with_context(|| format!("Invalid options for effect '{}'", kind))?;
    Ok(Resolved {
        effect: kind.name(),
        schedule: describe_schedule(&settings),
        clear_mode: describe_clear_mode(&settings),
        options: built.settings(),
    })
}
