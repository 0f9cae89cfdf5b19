//! terrain-gen - render a Diamond-Square heightmap to a shaded PNG.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use terrain_core::{
    ColorGradient, LightingConfig, MAX_SIZE_EXPONENT, MIN_SIZE_EXPONENT, Stage, TerrainConfig,
    TerrainError, render_terrain, resolve_seed, save_png, set_stage,
};

/// Procedural terrain generator.
#[derive(Parser, Debug)]
#[command(name = "terrain-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with a full terrain configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Size of the terrain map (2^size x 2^size).
    #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_SIZE_EXPONENT as i64..=MAX_SIZE_EXPONENT as i64))]
    size: Option<u32>,

    /// Output file for the generated image.
    #[arg(short, long, default_value = "output/map.png")]
    out: PathBuf,

    /// Random seed (0 for a random seed).
    #[arg(short, long)]
    seed: Option<u64>,

    /// Roughness: how fast detail fades between iterations.
    #[arg(long, alias = "smooth")]
    roughness: Option<f64>,

    /// Power curve exponent; above 1 deepens valleys.
    #[arg(long, alias = "erosion")]
    power: Option<f64>,

    /// Heights below this become flat water.
    #[arg(long)]
    sea_level: Option<f64>,

    /// Box blur window; 0 disables smoothing.
    #[arg(long)]
    blur: Option<f64>,

    /// Random per-cell noise amplitude added last.
    #[arg(long)]
    noise: Option<f64>,

    /// Keep full opacity instead of writing height into alpha.
    #[arg(long)]
    no_height_alpha: bool,

    /// Keep the duplicated seam row/column (2^size + 1 output).
    #[arg(long)]
    no_trim: bool,

    /// Color ramp.
    #[arg(long, value_enum, default_value = "classic")]
    gradient: GradientPreset,

    /// Lighting preset.
    #[arg(long, value_enum)]
    lighting: Option<LightingPreset>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GradientPreset {
    Classic,
    Alpine,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LightingPreset {
    Cli,
    Web,
}

impl Cli {
    fn into_config(self) -> Result<(TerrainConfig, PathBuf, ColorGradient), TerrainError> {
        let mut config = match &self.config {
            Some(path) => TerrainConfig::from_json_file(path)?,
            None => TerrainConfig::default(),
        };

        if let Some(size) = self.size {
            config.size_exponent = size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(roughness) = self.roughness {
            config.roughness = roughness;
        }
        if self.no_trim {
            config.trim_seam = false;
        }
        if self.no_height_alpha {
            config.encode_height_as_alpha = false;
        }
        match self.lighting {
            Some(LightingPreset::Cli) => config.lighting = LightingConfig::default(),
            Some(LightingPreset::Web) => config.lighting = LightingConfig::web(),
            None => {}
        }

        if let Some(exponent) = self.power {
            set_stage(&mut config.stages, Stage::Power { exponent });
        }
        if let Some(window) = self.blur {
            set_stage(&mut config.stages, Stage::BoxBlur { window });
        }
        if let Some(threshold) = self.sea_level {
            set_stage(&mut config.stages, Stage::SeaLevel { threshold });
        }
        if let Some(amount) = self.noise {
            config.stages.push(Stage::MonoNoise { amount });
        }

        let gradient = match self.gradient {
            GradientPreset::Classic => ColorGradient::classic_terrain(),
            GradientPreset::Alpine => ColorGradient::alpine(),
        };

        Ok((config, self.out, gradient))
    }
}

fn run(cli: Cli) -> Result<(), TerrainError> {
    let (mut config, out, gradient) = cli.into_config()?;

    config.seed = resolve_seed(config.seed);
    log::info!("Using seed: {}", config.seed);

    let start = Instant::now();
    let buffer = render_terrain(&config, &gradient)?;
    log::info!(
        "Heightmap size: {} x {} ({:.1} ms)",
        buffer.width,
        buffer.height,
        start.elapsed().as_secs_f64() * 1000.0
    );

    save_png(&buffer, &out)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
