//! Layered sine waves; each layer is one particle whose phase advances per tick

use super::Effect;
use crate::config::{number_value, to_table, wrong_type, OptionReader, Options};
use crate::particle::{Extra, Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, ConfigError, Result, Vec2};
use bgz_surface::Surface;
use serde::Serialize;
use toml::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveShape {
    pub amplitude: f32,
    pub wavelength: f32,
}

impl WaveShape {
    pub const fn new(amplitude: f32, wavelength: f32) -> Self {
        Self {
            amplitude,
            wavelength,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WavesConfig {
    pub color: Color,
    pub waves: Vec<WaveShape>,
    pub line_width: f32,
    /// Color of the rule along the top edge
    pub line_color: Color,
    /// Phase added every tick, in radians
    pub phase_step: f32,
}

impl Default for WavesConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x0078d4),
            waves: vec![
                WaveShape::new(25.0, 150.0),
                WaveShape::new(35.0, 120.0),
                WaveShape::new(20.0, 200.0),
            ],
            line_width: 2.0,
            line_color: Color::from_hex(0x005ea2),
            phase_step: 0.015,
        }
    }
}

impl WavesConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        let waves = match reader.raw("waves") {
            Some(value) => wave_list(value)?,
            None => d.waves,
        };
        Ok(Self {
            color: reader.color("color", d.color)?,
            waves,
            line_width: reader.positive("line_width", d.line_width)?,
            line_color: reader.color("line_color", d.line_color)?,
            phase_step: reader.number("phase_step", d.phase_step)?,
        })
    }
}

fn wave_list(value: &Value) -> Result<Vec<WaveShape>> {
    let Value::Array(items) = value else {
        return Err(wrong_type("waves", "array of { amplitude, wavelength }", value));
    };
    if items.is_empty() {
        return Err(ConfigError::Empty {
            field: "waves".into(),
        }
        .into());
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Table(t) = item else {
                return Err(wrong_type(&format!("waves[{i}]"), "table", item));
            };
            let field = |key: &str| -> Result<f32> {
                let name = format!("waves[{i}].{key}");
                match t.get(key) {
                    Some(v) => number_value(&name, v),
                    None => Err(ConfigError::InvalidFieldType {
                        field: name,
                        expected: "number".into(),
                        got: "nothing".into(),
                    }
                    .into()),
                }
            };
            let amplitude = field("amplitude")?;
            let wavelength = field("wavelength")?;
            if wavelength <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: format!("waves[{i}].wavelength"),
                    value: wavelength as f64,
                }
                .into());
            }
            Ok(WaveShape::new(amplitude, wavelength))
        })
        .collect()
}

pub struct Waves {
    config: WavesConfig,
}

impl Waves {
    pub fn new(config: WavesConfig) -> Self {
        Self { config }
    }
}

impl Effect for Waves {
    fn name(&self) -> &'static str {
        "waves"
    }

    fn initial_count(&self) -> usize {
        self.config.waves.len()
    }

    /// Layer `index`, fading from opaque for the first layer
    fn spawn(&self, index: usize, _rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let layers = self.config.waves.len().max(1);
        let shape = self.config.waves.get(index).copied().unwrap_or(WaveShape::new(0.0, 1.0));
        let alpha = 1.0 - index as f32 / layers as f32;
        Particle::new(
            Vec2::new(0.0, bounds.height / 2.0),
            Vec2::ZERO,
            self.config.line_width,
            self.config.color.with_alpha(alpha),
        )
        .with_extra(Extra::Wave {
            amplitude: shape.amplitude,
            wavelength: shape.wavelength,
        })
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.angle += self.config.phase_step;
        p.position.y = ctx.bounds.height / 2.0;
        Fate::Retain
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        let Extra::Wave {
            amplitude,
            wavelength,
        } = p.extra
        else {
            return;
        };
        let width = surface.size().width.max(0.0) as usize;
        let points: Vec<Vec2> = (0..width)
            .map(|x| {
                let x = x as f32;
                Vec2::new(x, amplitude * (x / wavelength + p.angle).sin() + p.position.y)
            })
            .collect();
        surface.stroke_path(&points, p.color, p.size);
    }

    fn draw_backdrop(&self, surface: &mut dyn Surface, bounds: Bounds) {
        surface.stroke_line(
            Vec2::ZERO,
            Vec2::new(bounds.width, 0.0),
            self.config.line_color,
            self.config.line_width,
        );
    }

    fn settings(&self) -> Options {
        to_table(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_options;
    use bgz_runtime::FrameInput;
    use bgz_surface::{DrawCommand, RecordingSurface};

    fn waves(text: &str) -> Result<Waves> {
        let table = parse_options(text)?;
        Ok(Waves::new(WavesConfig::from_options(&mut OptionReader::new(&table))?))
    }

    #[test]
    fn one_layer_per_wave_with_fading_alpha() {
        let fx = waves("").unwrap();
        let mut rng = ParticleRng::new(1);
        let layers: Vec<Particle> = (0..fx.initial_count())
            .map(|i| fx.spawn(i, &mut rng, Bounds::new(100.0, 100.0)))
            .collect();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].color.a, 1.0);
        assert!((layers[1].color.a - 2.0 / 3.0).abs() < 1e-5);
        assert!((layers[2].color.a - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn phase_advances_each_tick() {
        let fx = waves("phase_step = 0.5").unwrap();
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(1);
        let mut layer = fx.spawn(0, &mut rng, Bounds::new(100.0, 100.0));
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 100.0), &input, &mut rng);
        fx.advance(&mut layer, &mut ctx);
        fx.advance(&mut layer, &mut ctx);
        assert_eq!(layer.angle, 1.0);
    }

    #[test]
    fn custom_wave_list() {
        let fx = waves("waves = [{ amplitude = 10, wavelength = 50 }]").unwrap();
        assert_eq!(fx.initial_count(), 1);

        assert!(waves("waves = []").is_err());
        assert!(waves("waves = [{ amplitude = 10 }]").is_err());
        assert!(waves("waves = [{ amplitude = 10, wavelength = 0 }]").is_err());
        assert!(waves("waves = 3").is_err());
    }

    #[test]
    fn draws_top_rule_and_curve() {
        let fx = waves("").unwrap();
        let mut rng = ParticleRng::new(1);
        let mut surface = RecordingSurface::new(40, 100);
        let bounds = Bounds::new(40.0, 100.0);
        fx.draw_backdrop(&mut surface, bounds);
        fx.draw(&fx.spawn(0, &mut rng, bounds), &mut surface);

        let commands = surface.commands();
        assert!(matches!(commands[0], DrawCommand::Line { .. }));
        let DrawCommand::Path { points, .. } = &commands[1] else {
            panic!("expected a path");
        };
        assert_eq!(points.len(), 40);
        assert_eq!(points[0].y, 50.0);
    }
}
