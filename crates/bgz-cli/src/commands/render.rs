//! Headless effect-to-PNG render command

use super::load_options;
use anyhow::{Context, Result};
use bgz_effects::EffectFactory;
use bgz_runtime::{PointerState, Scheduler};
use bgz_surface::{Document, RasterSurface};
use std::path::{Path, PathBuf};

/// Selector the offscreen canvas is registered under
const CANVAS: &str = "#canvas";

/// A click delivered on one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub at: [f32; 2],
    pub frame: u32,
}

pub struct RenderArgs {
    pub effect: String,
    pub options: Option<String>,
    pub set: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub frames: u32,
    pub fps: f64,
    pub seed: Option<u32>,
    pub pointer: Option<[f32; 2]>,
    pub clicks: Vec<Click>,
    pub output_dir: String,
    pub every: u32,
}

/// Outcome of a render run
#[derive(Debug)]
pub struct RenderSummary {
    pub written: Vec<PathBuf>,
    pub live_particles: usize,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let summary = render(&args)?;
    println!(
        "Rendered {} frames of '{}' at {}x{}",
        args.frames, args.effect, args.width, args.height
    );
    println!("Live particles at end: {}", summary.live_particles);
    println!("Wrote {} PNG(s) to {}", summary.written.len(), args.output_dir);
    Ok(())
}

pub fn render(args: &RenderArgs) -> Result<RenderSummary> {
    if args.width == 0 || args.height == 0 {
        anyhow::bail!("Canvas size must be non-zero, got {}x{}", args.width, args.height);
    }
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", args.fps);
    }
    if args.every == 0 {
        anyhow::bail!("--every must be at least 1");
    }

    let options = load_options(args.options.as_deref(), &args.set)?;

    let mut document = Document::new();
    let canvas = document.insert_canvas(CANVAS, RasterSurface::new(args.width, args.height));
    let mut factory = EffectFactory::new(document, Scheduler::new());
    if let Some(seed) = args.seed {
        factory = factory.with_seed(seed);
    }
    let handle = factory
        .create_effect(&args.effect, CANVAS, &options)
        .with_context(|| format!("Failed to start effect '{}'", args.effect))?;

    let output_dir = Path::new(&args.output_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir))?;

    let mut pointer = PointerState::new();
    if let Some([x, y]) = args.pointer {
        pointer.process_pointer_move(x, y);
    }

    let mut written = Vec::new();
    for frame in 1..=args.frames {
        for click in args.clicks.iter().filter(|c| c.frame == frame) {
            pointer.process_click(click.at[0], click.at[1]);
        }
        let input = pointer.snapshot();
        factory.scheduler().frame(frame as f64 / args.fps, &input);
        pointer.end_frame();

        if frame % args.every == 0 {
            let path = output_dir.join(format!("frame_{:05}.png", frame));
            canvas
                .borrow()
                .save_png(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "wrote frame");
            written.push(path);
        }
    }

    let live_particles = handle.particle_count();
    handle.stop();
    Ok(RenderSummary {
        written,
        live_particles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(effect: &str, output_dir: &Path) -> RenderArgs {
        RenderArgs {
            effect: effect.to_string(),
            options: None,
            set: Vec::new(),
            width: 64,
            height: 48,
            frames: 6,
            fps: 60.0,
            seed: Some(1),
            pointer: None,
            clicks: Vec::new(),
            output_dir: output_dir.to_string_lossy().into_owned(),
            every: 2,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bgz-render-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn writes_every_nth_frame() {
        let dir = scratch_dir("every");
        let mut a = args("starfield", &dir);
        a.set = vec!["density=20".to_string()];
        let summary = render(&a).unwrap();

        assert_eq!(summary.written.len(), 3);
        assert_eq!(summary.live_particles, 20);
        assert!(dir.join("frame_00002.png").exists());
        assert!(dir.join("frame_00006.png").exists());
        assert!(!dir.join("frame_00001.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn clicks_reach_the_effect() {
        let dir = scratch_dir("clicks");
        let mut a = args("fireworks", &dir);
        a.every = 100;
        a.frames = 1;
        a.clicks = vec![Click {
            at: [10.0, 10.0],
            frame: 1,
        }];
        let summary = render(&a).unwrap();
        assert_eq!(summary.live_particles, 1);
        assert!(summary.written.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_arguments_rejected() {
        let dir = scratch_dir("invalid");
        let mut a = args("rain", &dir);
        a.every = 0;
        assert!(render(&a).is_err());

        let mut a = args("rain", &dir);
        a.set = vec!["speed = { min = 3, max = 1 }".to_string()];
        let err = render(&a).unwrap_err();
        assert!(err.to_string().contains("Failed to start effect 'rain'"));
        assert!(!dir.exists());
    }
}
