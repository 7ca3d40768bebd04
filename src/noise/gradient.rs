//! Gradient (Perlin-style) noise: hashed lattice gradients, smoothstep fade,
//! dot-product projection.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::NoiseSource;

/// Ken Perlin's reference permutation table, used verbatim when seed is 0.
const DEFAULT_PERM: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209,
    76, 132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198,
    173, 186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212,
    207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44,
    154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79,
    113, 224, 232, 178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12,
    191, 179, 162, 241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157,
    184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29,
    24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

/// Gradient noise over a hashed integer lattice.
pub struct GradientNoise {
    // Doubled so `perm[perm[x] + y]` never needs a modulo.
    perm: [u8; 512],
}

impl GradientNoise {
    pub fn new(seed: u64) -> Self {
        let mut noise = Self { perm: [0; 512] };
        noise.reseed(seed);
        noise
    }

    fn rebuild(&mut self, table: [u8; 256]) {
        for i in 0..256 {
            self.perm[i] = table[i];
            self.perm[i + 256] = table[i];
        }
    }

    pub(crate) fn permutation(&self) -> &[u8; 512] {
        &self.perm
    }

    fn hash2(&self, x: i64, y: i64) -> u8 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        self.perm[self.perm[xi] as usize + yi]
    }

    fn hash3(&self, x: i64, y: i64, z: i64) -> u8 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        let zi = (z & 255) as usize;
        self.perm[self.perm[self.perm[xi] as usize + yi] as usize + zi]
    }
}

impl NoiseSource for GradientNoise {
    fn sample1d(&self, x: f64) -> f64 {
        let x0 = x.floor() as i64;
        let t = x - x0 as f64;

        let g0 = grad1(self.perm[(x0 & 255) as usize]);
        let g1 = grad1(self.perm[((x0 + 1) & 255) as usize]);

        // Contributions peak at 0.5, so rescale to fill [-1, 1].
        let v = lerp(g0 * t, g1 * (t - 1.0), smoothstep(t)) * 2.0;
        v.clamp(-1.0, 1.0)
    }

    fn sample2d(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let tx = x - x0 as f64;
        let ty = y - y0 as f64;

        let n00 = grad2(self.hash2(x0, y0), tx, ty);
        let n10 = grad2(self.hash2(x0 + 1, y0), tx - 1.0, ty);
        let n01 = grad2(self.hash2(x0, y0 + 1), tx, ty - 1.0);
        let n11 = grad2(self.hash2(x0 + 1, y0 + 1), tx - 1.0, ty - 1.0);

        let sx = smoothstep(tx);
        let sy = smoothstep(ty);
        let v = lerp(lerp(n00, n10, sx), lerp(n01, n11, sx), sy);
        (v * std::f64::consts::SQRT_2).clamp(-1.0, 1.0)
    }

    fn sample3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let z0 = z.floor() as i64;
        let tx = x - x0 as f64;
        let ty = y - y0 as f64;
        let tz = z - z0 as f64;

        let mut corners = [0.0f64; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let cx = (i & 1) as i64;
            let cy = ((i >> 1) & 1) as i64;
            let cz = ((i >> 2) & 1) as i64;
            *corner = grad3(
                self.hash3(x0 + cx, y0 + cy, z0 + cz),
                tx - cx as f64,
                ty - cy as f64,
                tz - cz as f64,
            );
        }

        let sx = smoothstep(tx);
        let sy = smoothstep(ty);
        let sz = smoothstep(tz);

        let front = lerp(lerp(corners[0], corners[1], sx), lerp(corners[2], corners[3], sx), sy);
        let back = lerp(lerp(corners[4], corners[5], sx), lerp(corners[6], corners[7], sx), sy);
        lerp(front, back, sz).clamp(-1.0, 1.0)
    }

    /// Seed 0 selects the fixed reference table; any other seed shuffles a
    /// fresh table from a ChaCha8 stream. Same seed, same table, always.
    fn reseed(&mut self, seed: u64) {
        if seed == 0 {
            self.rebuild(DEFAULT_PERM);
        } else {
            let mut table = [0u8; 256];
            for (i, v) in table.iter_mut().enumerate() {
                *v = i as u8;
            }
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            table.shuffle(&mut rng);
            self.rebuild(table);
        }
    }
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn grad1(hash: u8) -> f64 {
    if hash & 1 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Project onto one of 8 lattice gradients (axes and diagonals).
fn grad2(hash: u8, x: f64, y: f64) -> f64 {
    const DIAG: f64 = std::f64::consts::FRAC_1_SQRT_2;
    match hash & 7 {
        0 => x,
        1 => -x,
        2 => y,
        3 => -y,
        4 => (x + y) * DIAG,
        5 => (x - y) * DIAG,
        6 => (-x + y) * DIAG,
        _ => (-x - y) * DIAG,
    }
}

/// Perlin's 12-gradient scheme for 3D (improved noise).
fn grad3(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    match hash & 15 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 => -y + z,
        10 => y - z,
        11 => -y - z,
        12 => x + y,
        13 => -y + z,
        14 => -x + y,
        _ => -y - z,
    }
}
