//! Seeded 2D noise field generation
//!
//! Wraps an OpenSimplex source and produces the heightfields the terrain and
//! scatter engines consume: single multi-octave elevation fields and the
//! quantized, random-blended density fields used for object scatter.
//!
//! Sampling is a pure function of the seed and coordinates, so field fills
//! are parallelized per row without affecting the output.

use noise::{NoiseFn, OpenSimplex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::heightfield::Heightfield;

/// Number of discrete bands a scatter field is quantized into before the
/// random blend.
const SCATTER_BANDS: f64 = 5.0;

/// Deterministic noise source for all generated fields.
pub struct NoiseGenerator {
    source: OpenSimplex,
}

impl NoiseGenerator {
    pub fn new(seed: u32) -> Self {
        NoiseGenerator {
            source: OpenSimplex::new(seed),
        }
    }

    /// Sample at `(x, y)` stretched by `wavelength`, remapped from the
    /// source's [-1, 1] range to [0, 1].
    pub fn value(&self, x: f64, y: f64, wavelength: f64) -> f64 {
        let raw = self.source.get([x / wavelength, y / wavelength]);
        (1.0 + raw) * 0.5
    }

    /// Ridge remap: folds the distribution around its midpoint so mid
    /// values read as ridgelines.
    pub fn ridge_value(&self, x: f64, y: f64, wavelength: f64) -> f64 {
        2.0 * (0.5 - (0.5 - self.value(x, y, wavelength)).abs())
    }

    /// Fill a single field at one wavelength.
    pub fn simple_field(
        &self,
        width: usize,
        height: usize,
        wavelength: f64,
        offset: (f64, f64),
        use_ridge: bool,
    ) -> Heightfield {
        let mut data = vec![0.0; width * height];
        data.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let sx = x as f64 + offset.0;
                let sy = y as f64 + offset.1;
                *cell = if use_ridge {
                    self.ridge_value(sx, sy, wavelength)
                } else {
                    self.value(sx, sy, wavelength)
                };
            }
        });
        Heightfield::from_vec(width, height, data)
    }

    /// Weighted multi-octave composition. Octave `i` contributes a full
    /// field at wavelength `max(width, height) / scales[i]`, multiplied by
    /// `octaves[i]`; the sum is divided by the octave weight total so the
    /// result stays in [0, 1].
    pub fn complex_field(
        &self,
        width: usize,
        height: usize,
        octaves: &[f64],
        scales: &[f64],
        offset: (f64, f64),
        use_ridge: bool,
    ) -> Heightfield {
        assert_eq!(
            octaves.len(),
            scales.len(),
            "octave and scale vectors must pair up"
        );
        assert!(!octaves.is_empty(), "at least one octave is required");

        let max_size = width.max(height) as f64;
        let octave_sum: f64 = octaves.iter().sum();

        let mut combined = Heightfield::new(width, height);
        for (weight, scale) in octaves.iter().zip(scales) {
            let layer = self.simple_field(width, height, max_size / scale, offset, use_ridge);
            for (acc, v) in combined.as_mut_slice().iter_mut().zip(layer.as_slice()) {
                *acc += weight * v;
            }
        }

        combined.scale(1.0 / octave_sum)
    }

    /// Density field for one scatter asset: a low-frequency field quantized
    /// to flat bands, blended with uniform random values by `random_weight`,
    /// renormalized, and scaled to the [0, 100] percentile range the scatter
    /// engine thresholds against.
    ///
    /// Callers give every scatter asset its own `offset` so the layers stay
    /// decorrelated.
    pub fn scatter_field(
        &self,
        width: usize,
        height: usize,
        offset: (f64, f64),
        clumping: f64,
        random_weight: f64,
        rng: &mut ChaCha8Rng,
    ) -> Heightfield {
        let max_size = width.max(height) as f64;
        let mut field = self.simple_field(width, height, max_size / clumping, offset, false);

        for v in field.as_mut_slice() {
            let banded = ((1.0 - *v) * SCATTER_BANDS).round() / SCATTER_BANDS;
            *v = banded * (1.0 - random_weight) + rng.gen::<f64>() * random_weight;
        }

        field.normalized().scale(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_value_range() {
        let noise = NoiseGenerator::new(7);
        for i in 0..100 {
            let v = noise.value(i as f64, (i * 3) as f64, 17.0);
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_ridge_value_range() {
        let noise = NoiseGenerator::new(7);
        for i in 0..100 {
            let v = noise.ridge_value(i as f64, (i * 3) as f64, 17.0);
            assert!((0.0..=1.0).contains(&v), "ridge value {} out of range", v);
        }
    }

    #[test]
    fn test_complex_field_bounds() {
        let noise = NoiseGenerator::new(2022);
        let field = noise.complex_field(3, 3, &[1.0, 0.5], &[1.0, 64.0], (0.0, 0.0), false);
        for (_, _, v) in field.iter() {
            assert!((0.0..=1.0).contains(&v), "field value {} out of range", v);
        }
    }

    #[test]
    fn test_complex_field_deterministic() {
        let a = NoiseGenerator::new(2022).complex_field(
            8,
            5,
            &[1.0, 0.5, 0.25],
            &[1.0, 2.0, 4.0],
            (3.0, 11.0),
            false,
        );
        let b = NoiseGenerator::new(2022).complex_field(
            8,
            5,
            &[1.0, 0.5, 0.25],
            &[1.0, 2.0, 4.0],
            (3.0, 11.0),
            false,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_field() {
        let a = NoiseGenerator::new(1).complex_field(6, 6, &[1.0], &[2.0], (0.0, 0.0), false);
        let b = NoiseGenerator::new(2).complex_field(6, 6, &[1.0], &[2.0], (0.0, 0.0), false);
        assert_ne!(a, b);
    }

    #[test]
    fn test_scatter_field_range_and_determinism() {
        let noise = NoiseGenerator::new(99);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let a = noise.scatter_field(10, 10, (100.0, 200.0), 4.0, 0.3, &mut rng);
        for (_, _, v) in a.iter() {
            assert!((0.0..=100.0).contains(&v), "scatter value {} out of range", v);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let b = noise.scatter_field(10, 10, (100.0, 200.0), 4.0, 0.3, &mut rng);
        assert_eq!(a, b);
    }
}
