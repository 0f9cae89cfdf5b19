use crate::error::{Result, TerrainError};
use crate::rng::TerrainRng;
use crate::utils::HeightMap2D;

pub const MIN_SIZE_EXPONENT: u32 = 1;
pub const MAX_SIZE_EXPONENT: u32 = 12;

// 2D fractal terrain generator using the Diamond–Square algorithm on a torus.
// The grid is 2^n + 1 on a side; position 2^n aliases position 0.
//
// Roughness divides the jitter amplitude after every iteration. Values of 1.0
// or below keep it constant or make it grow by 1/roughness per iteration.
// They are accepted as is and stay deterministic, but a small enough roughness
// overflows the amplitude to infinity, and the averages then yield NaN cells.
#[derive(Clone, Debug)]
pub struct Fractal2D {
    exponent: u32,
    seed: u64,
    roughness: f64,
}

impl Fractal2D {
    pub fn new(exponent: u32, seed: u64, roughness: f64) -> Result<Self> {
        if !(MIN_SIZE_EXPONENT..=MAX_SIZE_EXPONENT).contains(&exponent) {
            return Err(TerrainError::InvalidSizeExponent(exponent));
        }
        if !roughness.is_finite() || roughness <= 0.0 {
            return Err(TerrainError::InvalidRoughness(roughness));
        }

        Ok(Self {
            exponent,
            seed,
            roughness,
        })
    }

    // side length of the generated map, 2^n + 1
    pub fn size(&self) -> usize {
        (1usize << self.exponent) + 1
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // Generate a size×size height‐map centred around 0.5.
    // Values are unbounded, normalize before shaping.
    pub fn generate(&self) -> HeightMap2D {
        let size = self.size();
        // periodic extent, the last row/column mirror the first
        let grid = size - 1;
        let mut map = vec![vec![0.0f64; size]; size];
        let mut rng = TerrainRng::new(self.seed);
        let mut jitter = |avg: f64, amplitude: f64| avg + (rng.next_f64() - 0.5) * amplitude;

        // Initialize corners
        map[0][0] = jitter(0.5, 1.0);
        map[grid][0] = jitter(0.5, 1.0);
        map[0][grid] = jitter(0.5, 1.0);
        map[grid][grid] = jitter(0.5, 1.0);

        log::debug!(
            "diamond-square: size {}x{}, seed {}, roughness {}",
            size,
            size,
            self.seed,
            self.roughness
        );

        // Step is the current distance between 2 known points
        let mut step = grid;
        let mut amplitude = 1.0;

        while step > 1 {
            let half = step / 2;

            // Diamond step: centre of every cell from its four corners
            for y in (0..grid).step_by(step) {
                for x in (0..grid).step_by(step) {
                    let y1 = (y + step) % grid;
                    let x1 = (x + step) % grid;
                    let avg = (map[y][x] + map[y1][x] + map[y][x1] + map[y1][x1]) / 4.0;
                    map[(y + half) % grid][(x + half) % grid] = jitter(avg, amplitude);
                }
            }

            // Square step: edge midpoints from their four neighbours, wrapping around
            for y in (0..grid).step_by(half) {
                for x in ((y + half) % step..grid).step_by(step) {
                    let avg = (map[(y + grid - half) % grid][x]
                        + map[(y + half) % grid][x]
                        + map[y][(x + grid - half) % grid]
                        + map[y][(x + half) % grid])
                        / 4.0;
                    map[y][x] = jitter(avg, amplitude);
                }
            }

            step = half;
            amplitude *= 1.0 / self.roughness;
        }

        // Copy the first row/column over the last so the wrap is exact
        for i in 0..grid {
            map[i][grid] = map[i][0];
            map[grid][i] = map[0][i];
        }
        map[grid][grid] = map[0][0];

        map
    }
}
