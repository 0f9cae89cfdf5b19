use serde::{Deserialize, Serialize};

use crate::gradient::ColorGradient;
use crate::utils::HeightMap2D;

// Shading constants for the hillshade
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    // multiplies the Sobel gradient before it tilts the normal;
    // higher = more pronounced relief
    pub strength: f64,
    // direction towards the light, normalized at render time
    pub light: [f64; 3],
    pub ambient: f64,
    pub diffuse: f64,
}

impl Default for LightingConfig {
    // light from the north-west, strong diffuse term
    fn default() -> Self {
        Self {
            strength: 5.0,
            light: [-10.5, -5.5, 2.7],
            ambient: 0.2,
            diffuse: 4.5,
        }
    }
}

impl LightingConfig {
    // steeper relief, softer diffuse, used by the interactive viewer
    pub fn web() -> Self {
        Self {
            strength: 10.0,
            light: [-10.0, -6.0, 3.2],
            ambient: 0.2,
            diffuse: 3.0,
        }
    }

    fn unit_light(&self) -> [f64; 3] {
        let [x, y, z] = self.light;
        let len = (x * x + y * y + z * z).sqrt();
        if len == 0.0 || !len.is_finite() {
            return [0.0; 3];
        }
        [x / len, y / len, z / len]
    }
}

// Dense RGBA buffer, row-major, every channel in [0, 1]
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[f64; 4]>,
}

impl PixelBuffer {
    pub fn get(&self, x: usize, y: usize) -> [f64; 4] {
        self.pixels[y * self.width + x]
    }
}

// Sobel gradient at (x, y), wrapping at the edges like the generator does.
// Returns (d/dx, d/dy).
fn sobel(map: &HeightMap2D, x: usize, y: usize) -> (f64, f64) {
    let h = map.len();
    let w = map[0].len();
    let xm = (x + w - 1) % w;
    let xp = (x + 1) % w;
    let ym = (y + h - 1) % h;
    let yp = (y + 1) % h;

    let dx = (map[ym][xp] + 2.0 * map[y][xp] + map[yp][xp])
        - (map[ym][xm] + 2.0 * map[y][xm] + map[yp][xm]);
    let dy = (map[yp][xm] + 2.0 * map[yp][x] + map[yp][xp])
        - (map[ym][xm] + 2.0 * map[ym][x] + map[ym][xp]);
    (dx, dy)
}

// Unit surface normal from the height gradient
fn surface_normal(dx: f64, dy: f64, strength: f64) -> [f64; 3] {
    let nx = -dx * strength;
    let ny = -dy * strength;
    let len = (nx * nx + ny * ny + 1.0).sqrt();
    [nx / len, ny / len, 1.0 / len]
}

// Color every cell from the gradient, then shade it with a Lambertian light.
// With `height_as_alpha` the alpha channel carries the height, so the image
// doubles as a color + height texture.
pub fn render(
    map: &HeightMap2D,
    gradient: &ColorGradient,
    lighting: &LightingConfig,
    height_as_alpha: bool,
) -> PixelBuffer {
    let height = map.len();
    let width = map.first().map_or(0, Vec::len);
    let mut pixels = Vec::with_capacity(width * height);
    let [lx, ly, lz] = lighting.unit_light();

    for y in 0..height {
        for x in 0..width {
            let h = map[y][x];
            let [r, g, b, _] = gradient.at(h);

            let (dx, dy) = sobel(map, x, y);
            let [nx, ny, nz] = surface_normal(dx, dy, lighting.strength);

            // no light from behind a slope
            let lambert = (nx * lx + ny * ly + nz * lz).max(0.0);
            let light = lighting.ambient + lighting.diffuse * lambert;

            let alpha = if height_as_alpha { h.clamp(0.0, 1.0) } else { 1.0 };
            pixels.push([
                (r * light).clamp(0.0, 1.0),
                (g * light).clamp(0.0, 1.0),
                (b * light).clamp(0.0, 1.0),
                alpha,
            ]);
        }
    }

    log::debug!("rendered {}x{} pixels", width, height);

    PixelBuffer {
        width,
        height,
        pixels,
    }
}
