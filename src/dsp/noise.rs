//! Seeded coherent noise field.

/*
Coherent Noise
==============

White noise gives every sample an independent random value. Coherent noise
instead gives every POINT IN SPACE a value, and nearby points get similar
values. Walking slowly through the field produces smooth, wandering values;
jumping far produces unrelated ones.

Vocabulary
----------

  lattice       A regular grid laid over space. Every lattice corner gets a
                pseudo-random gradient vector.

  simplex       The simplest shape that tiles the space: a triangle in 2-D,
                a tetrahedron in 3-D. Simplex noise sums the contribution of
                the 4 corners of the tetrahedron that contains the point,
                instead of the 8 corners of a cube.

  skew          A linear transform that maps the tetrahedral grid onto a
                cubic one, so finding the containing simplex is a floor().

  permutation   A shuffled table of 0..=255. Hashing lattice coordinates
                through it picks the gradient for each corner. Shuffling the
                table with a different seed gives a different field.


How the Sequencer Samples It
----------------------------

The ramp walks a small circle in the (x, y) plane at a fixed z:

    x = base + sin(angle) * radius
    y = base + cos(angle) * radius
    z = constant

Adjacent steps are close on the circle, so their values are related; the
circle closes on itself, so the last step leads smoothly back into the first.
Moving `base` slides the circle across the field, `radius` (the variance)
controls how far apart the steps sample.


Output Range
------------

The raw sum is scaled by 32 so the result spans roughly [-1, 1]. Callers
still clamp, because the bound is empirical rather than exact.
*/

/// Seed the sequencer's field is built with.
pub const DEFAULT_SEED: i64 = 3518;

const F3: f64 = 1.0 / 3.0;
const G3: f64 = 1.0 / 6.0;
const OUTPUT_SCALE: f64 = 32.0;

const GRADIENTS: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Deterministic 3-D coherent noise. Immutable once built.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl NoiseField {
    pub fn new(seed: i64) -> Self {
        let mut source = [0u8; 256];
        for (i, slot) in source.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut state = seed as u64;
        for _ in 0..3 {
            state = lcg(state);
        }

        let mut table = [0u8; 256];
        for i in (0..256usize).rev() {
            state = lcg(state);
            let r = (state.wrapping_add(31) % (i as u64 + 1)) as usize;
            table[i] = source[r];
            source[r] = source[i];
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }

        Self { perm }
    }

    /// Sample the field. Output is roughly in [-1, 1].
    pub fn evaluate(&self, x: f64, y: f64, z: f64) -> f64 {
        // Skew into cell space and find the containing cube
        let s = (x + y + z) * F3;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();

        // Unskew back to find the first corner offset
        let t = (i + j + k) * G3;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        // Which of the six tetrahedra inside the cube are we in?
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f64 + G3;
        let y1 = y0 - j1 as f64 + G3;
        let z1 = z0 - k1 as f64 + G3;
        let x2 = x0 - i2 as f64 + 2.0 * G3;
        let y2 = y0 - j2 as f64 + 2.0 * G3;
        let z2 = z0 - k2 as f64 + 2.0 * G3;
        let x3 = x0 - 1.0 + 3.0 * G3;
        let y3 = y0 - 1.0 + 3.0 * G3;
        let z3 = z0 - 1.0 + 3.0 * G3;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let kk = (k as i64 & 255) as usize;

        let g0 = self.gradient(ii, jj, kk);
        let g1 = self.gradient(ii + i1, jj + j1, kk + k1);
        let g2 = self.gradient(ii + i2, jj + j2, kk + k2);
        let g3 = self.gradient(ii + 1, jj + 1, kk + 1);

        let n = corner(g0, x0, y0, z0)
            + corner(g1, x1, y1, z1)
            + corner(g2, x2, y2, z2)
            + corner(g3, x3, y3, z3);

        OUTPUT_SCALE * n
    }

    #[inline]
    fn gradient(&self, i: usize, j: usize, k: usize) -> usize {
        let h = self.perm[i + self.perm[j + self.perm[k] as usize] as usize];
        h as usize % GRADIENTS.len()
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").finish_non_exhaustive()
    }
}

#[inline]
fn lcg(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

/// Radially attenuated contribution of one simplex corner.
#[inline]
fn corner(gradient: usize, x: f64, y: f64, z: f64) -> f64 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        return 0.0;
    }
    let g = GRADIENTS[gradient];
    let t2 = t * t;
    t2 * t2 * (g[0] * x + g[1] * y + g[2] * z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_deterministic() {
        let a = NoiseField::new(DEFAULT_SEED);
        let b = NoiseField::new(DEFAULT_SEED);
        for n in 0..200 {
            let x = n as f64 * 0.173;
            let y = n as f64 * 0.091 + 1.0;
            assert_eq!(a.evaluate(x, y, 10.0), b.evaluate(x, y, 10.0));
        }
    }

    #[test]
    fn output_stays_near_unit_range() {
        let noise = NoiseField::default();
        for xi in 0..60 {
            for yi in 0..60 {
                let v = noise.evaluate(xi as f64 * 0.17, yi as f64 * 0.23, 10.0);
                assert!(v.is_finite());
                assert!(v.abs() <= 1.05, "noise sample {} out of range", v);
            }
        }
    }

    #[test]
    fn nearby_points_have_nearby_values() {
        let noise = NoiseField::default();
        for n in 0..100 {
            let x = 1.0 + n as f64 * 0.09;
            let a = noise.evaluate(x, x, 10.0);
            let b = noise.evaluate(x + 1e-3, x, 10.0);
            assert!((a - b).abs() < 0.05, "field jumped {} -> {} at x={}", a, b, x);
        }
    }

    #[test]
    fn field_is_not_flat() {
        let noise = NoiseField::default();
        let samples: Vec<f64> = (0..64)
            .map(|n| noise.evaluate(1.0 + n as f64 * 0.31, 2.0 + n as f64 * 0.17, 10.0))
            .collect();
        let max = samples.iter().cloned().fold(f64::MIN, f64::max);
        let min = samples.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min > 0.1, "field looks flat: [{}, {}]", min, max);
    }

    #[test]
    fn different_seeds_give_different_fields() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(DEFAULT_SEED);
        let differs = (0..64).any(|n| {
            let x = 0.37 + n as f64 * 0.29;
            (a.evaluate(x, x * 0.5, 10.0) - b.evaluate(x, x * 0.5, 10.0)).abs() > 1e-9
        });
        assert!(differs);
    }
}
