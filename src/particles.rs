//! Flame Particle Pool
//!
//! A fixed-size pool of short-lived flame particles that drift upwards
//! above an anchor point. Particles are never removed: an expired particle
//! is respawned in place, keeping its slot (and therefore its draw order).

use crate::display::Canvas;
use crate::util::Rng;

/// Default pool size
pub const DEFAULT_PARTICLE_COUNT: usize = 12;

/// Life lost per tick
const LIFE_DECAY: f32 = 0.02;
/// Flicker oscillates around this base
const FLICKER_BASE: f32 = 0.8;
const FLICKER_AMPLITUDE: f32 = 0.2;
/// Radians advanced per frame
const FLICKER_RATE: f32 = 0.3;

/// A single flame particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: i32,
    pub y: i32,
    /// Remaining life in [0, 1], decreasing
    pub life: f32,
    /// Upward drift in pixels per tick
    pub speed: i32,
    /// Blob radius at full life, in pixels
    pub size: f32,
    pub flicker: f32,
}

impl Particle {
    /// An expired particle; respawned on its first tick
    pub fn dormant() -> Self {
        Self {
            x: 0,
            y: 0,
            life: 0.0,
            speed: 0,
            size: 0.0,
            flicker: FLICKER_BASE,
        }
    }

    /// Check if particle is still alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Where particles are (re)born, relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnBand {
    /// Horizontal half extent around the anchor x
    pub half_width: i32,
    /// Band top, in pixels above the anchor
    pub top: i32,
    /// Band bottom, in pixels above the anchor
    pub bottom: i32,
    /// Particles rising more than this many pixels above the anchor respawn
    pub max_rise: i32,
}

impl SpawnBand {
    /// Whether `(x, y)` lies inside the band for the given anchor
    pub fn contains(&self, anchor: (i32, i32), x: i32, y: i32) -> bool {
        let (ax, ay) = anchor;
        x >= ax - self.half_width
            && x <= ax + self.half_width
            && y >= ay - self.top
            && y <= ay - self.bottom
    }

    /// Whether `y` has drifted past the vertical travel bound
    #[inline]
    pub fn out_of_range(&self, anchor: (i32, i32), y: i32) -> bool {
        y < anchor.1 - self.max_rise
    }
}

impl Default for SpawnBand {
    fn default() -> Self {
        Self {
            half_width: 60,
            top: 40,
            bottom: 10,
            max_rise: 110,
        }
    }
}

/// Fixed-capacity flame particle system
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    band: SpawnBand,
    rng: Rng,
}

impl ParticleSystem {
    /// Create a pool of `count` dormant particles
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            particles: vec![Particle::dormant(); count],
            band: SpawnBand::default(),
            rng: Rng::new(seed),
        }
    }

    /// Override the spawn band
    pub fn with_band(mut self, band: SpawnBand) -> Self {
        self.band = band;
        self
    }

    pub fn band(&self) -> SpawnBand {
        self.band
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Get particle count
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// Advance every particle one tick without drawing
    pub fn step(&mut self, anchor: (i32, i32), frame_index: u64) {
        let phase = frame_index as f32 * FLICKER_RATE;
        for (i, p) in self.particles.iter_mut().enumerate() {
            p.y -= p.speed;
            p.life -= LIFE_DECAY;
            p.flicker = FLICKER_BASE + FLICKER_AMPLITUDE * (phase + i as f32).sin();

            if !p.is_alive() || self.band.out_of_range(anchor, p.y) {
                Self::respawn(p, anchor, &self.band, &mut self.rng);
            }
        }
    }

    /// Advance one tick, then draw every particle in index order
    pub fn tick(&mut self, canvas: &mut Canvas, anchor: (i32, i32), frame_index: u64) {
        self.step(anchor, frame_index);
        self.render(canvas);
    }

    /// Draw all particles; later slots land on top
    pub fn render(&self, canvas: &mut Canvas) {
        for p in &self.particles {
            canvas.particle_blob(p);
        }
    }

    fn respawn(p: &mut Particle, anchor: (i32, i32), band: &SpawnBand, rng: &mut Rng) {
        let (ax, ay) = anchor;
        p.x = rng.range_i32(ax - band.half_width, ax + band.half_width);
        p.y = rng.range_i32(ay - band.top, ay - band.bottom);
        p.life = rng.range_f32(0.6, 1.0);
        p.speed = rng.range_i32(1, 3);
        p.size = rng.range_f32(6.0, 12.0);
    }
}
