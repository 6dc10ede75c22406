//! # Noise Engine
//!
//! Deterministic scalar noise used by every terrain feature. The permutation table is
//! built once from the world seed; after that every sample is a pure function of its
//! inputs, so any thread can regenerate any voxel from its coordinates alone.

use noise::{NoiseFn, Perlin};

use crate::config::NoiseBand;

/// Seeded 3D noise sampler returning values in `[0, 1]`.
///
/// Cloning is cheap (the permutation table is a fixed-size array) and samples never
/// allocate, which matters because terrain generation calls into this several times
/// per voxel.
#[derive(Clone)]
pub struct NoiseEngine {
    perlin: Perlin,
    seed: u32,
}

impl NoiseEngine {
    pub fn new(seed: u32) -> Self {
        NoiseEngine {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples raw noise at `(x, y, z)`, remapped from `[-1, 1]` to `[0, 1]`.
    #[inline]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let raw = self.perlin.get([x, y, z]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Fractal noise: each octave doubles the frequency and halves the amplitude, and
    /// the result is the amplitude-weighted average so it stays in `[0, 1]`.
    ///
    /// An `octaves` value of 0 is treated as a single octave.
    pub fn sample_octaves(&self, x: f64, y: f64, z: f64, octaves: u32) -> f64 {
        let mut value = 0.0;
        let mut divisor = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..octaves.max(1) {
            value += self.sample_3d(x * frequency, y * frequency, z * frequency) * amplitude;
            divisor += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value / divisor
    }

    /// Samples at `(x, y, z) / scale`, multiplies by `height_scale` and, when `power`
    /// is non-zero, raises the result to `power` to sharpen ridges.
    #[inline]
    pub fn modulated_sample(
        &self,
        x: f64,
        y: f64,
        z: f64,
        scale: f64,
        height_scale: f64,
        power: f64,
    ) -> f64 {
        let value = self.sample_3d(x / scale, y / scale, z / scale) * height_scale;
        if power != 0.0 {
            value.powf(power)
        } else {
            value
        }
    }

    /// [`Self::modulated_sample`] with the parameters taken from a configured band.
    #[inline]
    pub fn sample_band(&self, x: f64, y: f64, z: f64, band: &NoiseBand) -> f64 {
        self.modulated_sample(x, y, z, band.scale, band.height, band.power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> impl Iterator<Item = (f64, f64, f64)> {
        (-20..20).map(|i| {
            let f = i as f64;
            (f * 0.37, f * -1.13 + 0.5, f * 2.71)
        })
    }

    #[test]
    fn test_sample_in_unit_range() {
        let engine = NoiseEngine::new(3);
        for (x, y, z) in sample_points() {
            let v = engine.sample_3d(x, y, z);
            assert!((0.0..=1.0).contains(&v), "sample {v} out of range");
            let o = engine.sample_octaves(x, y, z, 4);
            assert!((0.0..=1.0).contains(&o), "octave sample {o} out of range");
        }
    }

    #[test]
    fn test_deterministic_across_instances() {
        let a = NoiseEngine::new(42);
        let b = NoiseEngine::new(42);
        for (x, y, z) in sample_points() {
            assert_eq!(a.sample_3d(x, y, z), b.sample_3d(x, y, z));
            assert_eq!(a.sample_octaves(x, y, z, 3), b.sample_octaves(x, y, z, 3));
        }
    }

    #[test]
    fn test_deterministic_across_threads() {
        let engine = NoiseEngine::new(9);
        let expected: Vec<f64> = sample_points()
            .map(|(x, y, z)| engine.sample_3d(x, y, z))
            .collect();
        let clone = engine.clone();
        let from_thread = std::thread::spawn(move || {
            sample_points()
                .map(|(x, y, z)| clone.sample_3d(x, y, z))
                .collect::<Vec<f64>>()
        })
        .join()
        .unwrap();
        assert_eq!(expected, from_thread);
    }

    #[test]
    fn test_seeds_differ() {
        let a = NoiseEngine::new(1);
        let b = NoiseEngine::new(2);
        assert!(sample_points().any(|(x, y, z)| a.sample_3d(x, y, z) != b.sample_3d(x, y, z)));
    }

    #[test]
    fn test_single_octave_matches_raw_sample() {
        let engine = NoiseEngine::new(5);
        for (x, y, z) in sample_points() {
            assert_eq!(engine.sample_octaves(x, y, z, 1), engine.sample_3d(x, y, z));
            assert_eq!(engine.sample_octaves(x, y, z, 0), engine.sample_3d(x, y, z));
        }
    }

    #[test]
    fn test_modulated_sample_shaping() {
        let engine = NoiseEngine::new(11);
        let (x, y, z) = (13.0, 4.0, -27.0);
        let base = engine.sample_3d(x / 10.0, y / 10.0, z / 10.0);

        let unshaped = engine.modulated_sample(x, y, z, 10.0, 3.0, 0.0);
        assert!((unshaped - base * 3.0).abs() < 1e-12);

        let squared = engine.modulated_sample(x, y, z, 10.0, 3.0, 2.0);
        assert!((squared - (base * 3.0).powi(2)).abs() < 1e-9);

        let band = NoiseBand::new(10.0, 3.0, 2.0);
        assert_eq!(engine.sample_band(x, y, z, &band), squared);
    }
}
