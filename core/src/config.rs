use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fractal2::Fractal2D;
use crate::gradient::ColorGradient;
use crate::postprocess::{Stage, apply_stages};
use crate::render::{LightingConfig, PixelBuffer, render};
use crate::rng::TerrainRng;
use crate::utils::{HeightMap2D, trim_seam};

// Keeps the noise stage's stream apart from the generator's for the same seed
const NOISE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

// Every input of one generate + render run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    // grid side is 2^size_exponent + 1
    pub size_exponent: u32,
    pub seed: u64,
    pub roughness: f64,
    // drop the duplicated first row/column before shaping
    pub trim_seam: bool,
    pub stages: Vec<Stage>,
    pub lighting: LightingConfig,
    pub encode_height_as_alpha: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size_exponent: 9,
            seed: 0,
            roughness: 1.78,
            trim_seam: true,
            stages: Stage::default_chain(),
            lighting: LightingConfig::default(),
            encode_height_as_alpha: true,
        }
    }
}

impl TerrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // Generated, trimmed and post-processed height field
    pub fn heightmap(&self) -> Result<HeightMap2D> {
        let mut map = Fractal2D::new(self.size_exponent, self.seed, self.roughness)?.generate();
        if self.trim_seam {
            trim_seam(&mut map);
        }
        log::debug!(
            "heightmap size: {} x {}",
            map.first().map_or(0, Vec::len),
            map.len()
        );

        let mut rng = TerrainRng::new(self.seed ^ NOISE_STREAM);
        apply_stages(&mut map, &self.stages, &mut rng);
        Ok(map)
    }
}

// seed -> generator -> stages -> renderer, all in one go.
// The seed is used as given; resolve 0 beforehand if a random one is wanted.
pub fn render_terrain(config: &TerrainConfig, gradient: &ColorGradient) -> Result<PixelBuffer> {
    let map = config.heightmap()?;
    Ok(render(
        &map,
        gradient,
        &config.lighting,
        config.encode_height_as_alpha,
    ))
}
