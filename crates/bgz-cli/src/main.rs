//! bgz CLI - Command-line interface for bgz particle effects

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, list, render};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bgz")]
#[command(about = "Animated particle backgrounds, rendered headlessly", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available effects
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Validate effect options and print the resolved configuration
    Check {
        /// Effect name (e.g. "starfield", "bouncingBalls")
        effect: String,

        /// TOML file with effect options
        #[arg(long)]
        options: Option<String>,

        /// Override a single option (repeatable), value parsed as TOML
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Run an effect on an offscreen canvas and write PNG frames
    Render {
        /// Effect name
        effect: String,

        /// TOML file with effect options
        #[arg(long)]
        options: Option<String>,

        /// Override a single option (repeatable), value parsed as TOML
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Canvas width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value = "600")]
        height: u32,

        /// Number of host frames to simulate
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Simulated host frame rate
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Random seed (default: fixed seed, reproducible output)
        #[arg(long)]
        seed: Option<u32>,

        /// Pointer position held for the whole run (comma-separated x,y)
        #[arg(long, value_parser = parse_point)]
        pointer: Option<[f32; 2]>,

        /// Click at x,y on a frame, written x,y@frame (repeatable)
        #[arg(long = "click", value_parser = parse_click)]
        clicks: Vec<render::Click>,

        /// Directory for the PNG frames
        #[arg(short, long, default_value = "frames")]
        output_dir: String,

        /// Write every Nth frame
        #[arg(long, default_value = "1")]
        every: u32,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn parse_point(s: &str) -> Result<[f32; 2], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("expected 2 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    Ok([x, y])
}

fn parse_click(s: &str) -> Result<render::Click, String> {
    let (point, frame) = s
        .split_once('@')
        .ok_or_else(|| format!("expected x,y@frame, got '{}'", s))?;
    let frame: u32 = frame.trim().parse().map_err(|e| format!("invalid frame: {}", e))?;
    Ok(render::Click {
        at: parse_point(point)?,
        frame,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { format } => list::run(&format),
        Commands::Check {
            effect,
            options,
            set,
            format,
        } => check::run(&effect, options.as_deref(), &set, &format),
        Commands::Render {
            effect,
            options,
            set,
            width,
            height,
            frames,
            fps,
            seed,
            pointer,
            clicks,
            output_dir,
            every,
        } => render::run(render::RenderArgs {
            effect,
            options,
            set,
            width,
            height,
            frames,
            fps,
            seed,
            pointer,
            clicks,
            output_dir,
            every,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points_and_clicks() {
        assert_eq!(parse_point("10, 20.5").unwrap(), [10.0, 20.5]);
        assert!(parse_point("10").is_err());

        let click = parse_click("5,6@12").unwrap();
        assert_eq!(click.at, [5.0, 6.0]);
        assert_eq!(click.frame, 12);
        assert!(parse_click("5,6").is_err());
        assert!(parse_click("5,6@soon").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
