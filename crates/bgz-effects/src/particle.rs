//! Particle state and the per-loop particle pool

use bgz_core::{Color, Vec2};

/// Kind-specific payload carried by a particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extra {
    None,
    /// Fin lengths of a fish's tail
    Tail([f32; 3]),
    /// Character currently shown by a glyph-rain drop
    Glyph(char),
    /// A firework shell that has not burst yet
    Rocket,
    /// A rising bubble sharing a loop with other particle species
    Bubble,
    /// One layer of a wave effect; `angle` holds its phase
    Wave { amplitude: f32, wavelength: f32 },
}

/// One simulated entity. Exclusively owned by the loop that spawned it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Displacement per tick (frame-stepped effects) or per second
    pub velocity: Vec2,
    pub size: f32,
    pub color: Color,
    /// Heading or phase, in the unit the owning effect uses
    pub angle: f32,
    pub speed: f32,
    /// Remaining ticks; `None` means the particle never expires
    pub lifespan: Option<u32>,
    pub extra: Extra,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, size: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            size,
            color,
            angle: 0.0,
            speed: 0.0,
            lifespan: None,
            extra: Extra::None,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_lifespan(mut self, ticks: u32) -> Self {
        self.lifespan = Some(ticks);
        self
    }

    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }
}

/// What the loop does with a particle after advancing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    /// Keep the (mutated) particle
    Retain,
    /// Replace it with a freshly spawned one
    Recycle,
    /// Remove it permanently
    Expire,
}

/// Bounded particle storage. Iteration follows insertion order.
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Add a particle. Returns false (and drops it) when the pool is full.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Visit every particle in order, keeping those for which `f` returns true
    pub fn retain_mut(&mut self, f: impl FnMut(&mut Particle) -> bool) {
        self.particles.retain_mut(f);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }
}
