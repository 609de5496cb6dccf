//! Edge policies shared by the effects

use crate::particle::Particle;

/// Wrap `value` into `[min, max]` by shifting it one span
/// (`max - min`) toward the interval. Values inside are untouched.
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= 0.0 {
        return value;
    }
    if value < min {
        value + span
    } else if value > max {
        value - span
    } else {
        value
    }
}

/// Velocity after contact with `[min, max]` on one axis.
///
/// Only a particle past a bound and still moving outward is reflected, so a
/// particle that overshot is not trapped flipping back and forth.
pub fn bounce(position: f32, velocity: f32, min: f32, max: f32, damping: f32) -> f32 {
    if (position < min && velocity < 0.0) || (position > max && velocity > 0.0) {
        -velocity * damping
    } else {
        velocity
    }
}

/// Count down a particle's lifespan by one tick. Returns true once it
/// reaches zero; particles without a lifespan never expire.
pub fn tick_lifespan(particle: &mut Particle) -> bool {
    match particle.lifespan.as_mut() {
        Some(ticks) => {
            *ticks = ticks.saturating_sub(1);
            *ticks == 0
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgz_core::{Color, Vec2};

    #[test]
    fn wrap_shifts_by_span() {
        assert_eq!(wrap(-3.0, 0.0, 100.0), 97.0);
        assert_eq!(wrap(104.0, 0.0, 100.0), 4.0);
        assert_eq!(wrap(50.0, 0.0, 100.0), 50.0);
        // Margins widen the span
        assert_eq!(wrap(-25.0, -20.0, 120.0), 115.0);
    }

    #[test]
    fn bounce_flips_outward_velocity_only() {
        assert_eq!(bounce(-1.0, -2.0, 0.0, 10.0, 1.0), 2.0);
        assert_eq!(bounce(11.0, 3.0, 0.0, 10.0, 0.5), -1.5);
        // Already heading back inside
        assert_eq!(bounce(-1.0, 2.0, 0.0, 10.0, 1.0), 2.0);
        // Inside
        assert_eq!(bounce(5.0, 2.0, 0.0, 10.0, 1.0), 2.0);
    }

    #[test]
    fn lifespan_counts_down() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, Color::WHITE).with_lifespan(2);
        assert!(!tick_lifespan(&mut p));
        assert!(tick_lifespan(&mut p));

        let mut immortal = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, Color::WHITE);
        assert!(!tick_lifespan(&mut immortal));
    }
}
