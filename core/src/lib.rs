// core holds the fractal generator, the post-process stages and the renderer
pub mod config;
pub mod error;
pub mod export;
pub mod fractal2;
pub mod gradient;
pub mod postprocess;
pub mod render;
pub mod rng;
pub mod utils;

pub use config::{TerrainConfig, render_terrain};
pub use error::{Result, TerrainError};
pub use export::{encode_png, save_png};
pub use fractal2::{Fractal2D, MAX_SIZE_EXPONENT, MIN_SIZE_EXPONENT};
pub use gradient::{Breakpoint, ColorGradient};
pub use postprocess::{Stage, apply_stages, set_stage};
pub use render::{LightingConfig, PixelBuffer, render};
pub use rng::{TerrainRng, resolve_seed};
pub use utils::{HeightMap2D, flatten2, trim_seam};
