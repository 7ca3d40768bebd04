//! Value noise: random values on an integer lattice, smoothed interpolation.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::gradient::GradientNoise;
use super::NoiseSource;

/// Value noise over a hashed integer lattice.
///
/// The permutation table follows the same seeding contract as
/// [`GradientNoise`] (seed 0 keeps the reference ordering); the lattice
/// value table is always drawn from a ChaCha8 stream seeded by the noise
/// seed, values first, then (for non-zero seeds) the permutation shuffle.
pub struct ValueNoise {
    perm: [u8; 512],
    values: [f64; 256],
}

impl ValueNoise {
    pub fn new(seed: u64) -> Self {
        let mut noise = Self {
            perm: [0; 512],
            values: [0.0; 256],
        };
        noise.reseed(seed);
        noise
    }

    fn lattice1(&self, x: i64) -> f64 {
        self.values[self.perm[(x & 255) as usize] as usize]
    }

    fn lattice2(&self, x: i64, y: i64) -> f64 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        self.values[self.perm[self.perm[xi] as usize + yi] as usize]
    }

    fn lattice3(&self, x: i64, y: i64, z: i64) -> f64 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        let zi = (z & 255) as usize;
        self.values[self.perm[self.perm[self.perm[xi] as usize + yi] as usize + zi] as usize]
    }
}

impl NoiseSource for ValueNoise {
    fn sample1d(&self, x: f64) -> f64 {
        let x0 = x.floor() as i64;
        let t = smoothstep(x - x0 as f64);
        lerp(self.lattice1(x0), self.lattice1(x0 + 1), t)
    }

    fn sample2d(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let sx = smoothstep(x - x0 as f64);
        let sy = smoothstep(y - y0 as f64);

        let n0 = lerp(self.lattice2(x0, y0), self.lattice2(x0 + 1, y0), sx);
        let n1 = lerp(self.lattice2(x0, y0 + 1), self.lattice2(x0 + 1, y0 + 1), sx);
        lerp(n0, n1, sy)
    }

    fn sample3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let z0 = z.floor() as i64;
        let sx = smoothstep(x - x0 as f64);
        let sy = smoothstep(y - y0 as f64);
        let sz = smoothstep(z - z0 as f64);

        let front = lerp(
            lerp(self.lattice3(x0, y0, z0), self.lattice3(x0 + 1, y0, z0), sx),
            lerp(self.lattice3(x0, y0 + 1, z0), self.lattice3(x0 + 1, y0 + 1, z0), sx),
            sy,
        );
        let back = lerp(
            lerp(self.lattice3(x0, y0, z0 + 1), self.lattice3(x0 + 1, y0, z0 + 1), sx),
            lerp(
                self.lattice3(x0, y0 + 1, z0 + 1),
                self.lattice3(x0 + 1, y0 + 1, z0 + 1),
                sx,
            ),
            sy,
        );
        lerp(front, back, sz)
    }

    fn reseed(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for v in self.values.iter_mut() {
            *v = rng.gen_range(-1.0..=1.0);
        }

        if seed == 0 {
            // Reference ordering, matching the gradient strategy's contract.
            let reference = GradientNoise::new(0);
            self.perm.copy_from_slice(reference.permutation());
        } else {
            let mut table = [0u8; 256];
            for (i, v) in table.iter_mut().enumerate() {
                *v = i as u8;
            }
            table.shuffle(&mut rng);
            for i in 0..256 {
                self.perm[i] = table[i];
                self.perm[i + 256] = table[i];
            }
        }
    }
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
