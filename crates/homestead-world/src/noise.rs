//! Seeded lattice noise sampled in world space.
//!
//! Both generators implement [`::noise::NoiseFn`] so they compose with the
//! `noise` crate's transformers (the terrain pass wraps [`ValueNoise`] in a
//! [`::noise::ScalePoint`]). Samples depend only on the world position and the
//! seed, never on which chunk asked, so neighbouring chunks join without seams.

use homestead_common::{hash_coords, WorldSeed};
use ::noise::NoiseFn;

/// Seed offset between fractal octaves.
const OCTAVE_SEED_STRIDE: u32 = 1000;

/// Bilinear value noise over hashed lattice corners, in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueNoise {
    seed: u32,
}

impl ValueNoise {
    /// Creates a value noise source for a world.
    #[must_use]
    pub const fn new(world: WorldSeed) -> Self {
        Self::with_raw_seed(world.raw())
    }

    const fn with_raw_seed(seed: u32) -> Self {
        Self { seed }
    }

    fn corner(&self, x: i64, y: i64) -> f64 {
        f64::from(hash_coords(x, y, self.seed)) / 4_294_967_296.0
    }

    /// Samples the noise at a continuous world position.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let (x0, y0) = (x.floor(), y.floor());
        let (ix, iy) = (x0 as i64, y0 as i64);
        let sx = smoothstep(x - x0);
        let sy = smoothstep(y - y0);

        let top = lerp(self.corner(ix, iy), self.corner(ix + 1, iy), sx);
        let bottom = lerp(self.corner(ix, iy + 1), self.corner(ix + 1, iy + 1), sx);
        lerp(top, bottom, sy)
    }
}

impl NoiseFn<f64, 2> for ValueNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// Several octaves of [`ValueNoise`], normalised back into `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FractalNoise {
    octaves: Vec<ValueNoise>,
    persistence: f64,
    scale: f64,
}

impl FractalNoise {
    /// Four octaves, persistence 0.5, unit scale.
    #[must_use]
    pub fn new(world: WorldSeed) -> Self {
        Self::with_params(world, 4, 0.5, 1.0)
    }

    /// Custom octave count, amplitude falloff and base frequency.
    #[must_use]
    pub fn with_params(world: WorldSeed, octaves: u32, persistence: f64, scale: f64) -> Self {
        let octaves = (0..octaves)
            .map(|i| i.wrapping_mul(OCTAVE_SEED_STRIDE))
            .map(|offset| ValueNoise::with_raw_seed(world.raw().wrapping_add(offset)))
            .collect();
        Self {
            octaves,
            persistence,
            scale,
        }
    }

    /// Samples the layered noise at a continuous world position.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;
        let mut frequency = self.scale;

        for octave in &self.octaves {
            total += octave.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

impl NoiseFn<f64, 2> for FractalNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lattice_points_hit_corner_values() {
        let noise = ValueNoise::new(WorldSeed::new(42));
        let expected = f64::from(hash_coords(3, -4, 42)) / 4_294_967_296.0;
        assert!((noise.sample(3.0, -4.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_noise_is_continuous_across_cell_edges() {
        let noise = ValueNoise::new(WorldSeed::new(7));
        for i in -20..20 {
            let edge = f64::from(i);
            let left = noise.sample(edge - 1e-9, 0.5);
            let right = noise.sample(edge + 1e-9, 0.5);
            assert!((left - right).abs() < 1e-6, "seam at x={edge}");
        }
    }

    #[test]
    fn test_fractal_matches_single_octave() {
        let world = WorldSeed::new(3);
        let single = FractalNoise::with_params(world, 1, 0.5, 1.0);
        let value = ValueNoise::new(world);
        assert!((single.sample(1.3, 2.7) - value.sample(1.3, 2.7)).abs() < 1e-12);
    }

    #[test]
    fn test_noise_fn_matches_sample() {
        let fractal = FractalNoise::new(WorldSeed::new(11));
        assert_eq!(fractal.get([4.2, -1.5]).to_bits(), fractal.sample(4.2, -1.5).to_bits());
        assert_eq!(FractalNoise::with_params(WorldSeed::new(1), 0, 0.5, 1.0).sample(1.0, 1.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_noise_in_unit_range(x in -1.0e6f64..1.0e6, y in -1.0e6f64..1.0e6, seed in any::<u32>()) {
            let v = ValueNoise::new(WorldSeed::new(seed)).sample(x, y);
            prop_assert!((0.0..1.0).contains(&v));
            let f = FractalNoise::new(WorldSeed::new(seed)).sample(x, y);
            prop_assert!((0.0..1.0).contains(&f));
        }
    }
}
