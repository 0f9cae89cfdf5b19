use std::time::Instant;

use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{ColorImage, TextureHandle};
use terrain_core::{
    ColorGradient, LightingConfig, PixelBuffer, Stage, TerrainConfig, render_terrain,
    resolve_seed, save_png,
};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum GradientChoice {
    #[default]
    Classic,
    Alpine,
}

struct TerrainApp {
    // parameters
    // slider is for n; size = 2^n
    exp: u32,
    seed: u64,
    roughness: f64,
    power: f64,
    sea_level: f64,
    blur: f64,
    noise: f64,
    height_alpha: bool,
    web_lighting: bool,
    gradient: GradientChoice,

    // generated texture
    terrain_texture: Option<TextureHandle>,

    // timing & status
    last_duration: Option<f32>,
    status_message: String,

    // Store the last render for saving
    last_buffer: Option<PixelBuffer>,
}

impl Default for TerrainApp {
    fn default() -> Self {
        Self {
            exp: 8,
            seed: 7_431_898_631_184_268_366,
            roughness: 1.78,
            power: 1.9,
            sea_level: 0.1,
            blur: 4.0,
            noise: 0.0,
            height_alpha: true,
            web_lighting: true,
            gradient: GradientChoice::Classic,
            terrain_texture: None,
            last_duration: None,
            status_message: String::new(),
            last_buffer: None,
        }
    }
}

impl TerrainApp {
    fn config(&self) -> TerrainConfig {
        let mut stages = vec![
            Stage::Normalize,
            Stage::Power {
                exponent: self.power,
            },
            Stage::BoxBlur { window: self.blur },
            Stage::SeaLevel {
                threshold: self.sea_level,
            },
        ];
        if self.noise > 0.0 {
            stages.push(Stage::MonoNoise { amount: self.noise });
        }

        TerrainConfig {
            size_exponent: self.exp,
            seed: self.seed,
            roughness: self.roughness,
            trim_seam: true,
            stages,
            lighting: if self.web_lighting {
                LightingConfig::web()
            } else {
                LightingConfig::default()
            },
            encode_height_as_alpha: self.height_alpha,
        }
    }

    fn generate(&mut self, ctx: &egui::Context) {
        let start = Instant::now();
        let gradient = match self.gradient {
            GradientChoice::Classic => ColorGradient::classic_terrain(),
            GradientChoice::Alpine => ColorGradient::alpine(),
        };

        match render_terrain(&self.config(), &gradient) {
            Ok(buffer) => {
                // preview ignores the height-in-alpha channel
                let mut rgba = buffer.to_rgba8();
                for px in rgba.chunks_mut(4) {
                    px[3] = 255;
                }
                let color_image =
                    ColorImage::from_rgba_unmultiplied([buffer.width, buffer.height], &rgba);
                self.terrain_texture =
                    Some(ctx.load_texture("terrain", color_image, egui::TextureOptions::NEAREST));

                let ms = start.elapsed().as_secs_f32() * 1000.0;
                self.last_duration = Some(ms);
                self.status_message = format!("Generated in {:.2} ms (seed {})", ms, self.seed);
                self.last_buffer = Some(buffer);
            }
            Err(e) => {
                log::error!("generation failed: {}", e);
                self.status_message = format!("Error: {}", e);
            }
        }
        ctx.request_repaint();
    }

    fn save(&mut self) {
        let Some(buffer) = &self.last_buffer else {
            self.status_message = "Nothing generated yet".into();
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("terrain_{}.png", self.seed))
            .add_filter("PNG", &["png"])
            .save_file()
        else {
            return;
        };

        self.status_message = match save_png(buffer, &path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Save failed: {}", e),
        };
    }
}

impl App for TerrainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let size = 1usize << self.exp;

        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Terrain Generator");
            ui.separator();

            // Resolution slider
            ui.horizontal(|ui| {
                ui.label("Resolution 2^n:");
                ui.add(
                    egui::Slider::new(&mut self.exp, 4..=10)
                        .text(format!("{}×{}", size, size))
                        .step_by(1.0),
                );
            });

            // Seed
            ui.label("Seed");
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut self.seed).speed(1.0));
                if ui.button("Random").clicked() {
                    self.seed = resolve_seed(0);
                }
            });

            ui.label("Roughness");
            ui.add(egui::Slider::new(&mut self.roughness, 1.05..=3.0));

            ui.label("Power");
            ui.add(egui::Slider::new(&mut self.power, 0.5..=4.0));

            ui.label("Sea Level");
            ui.add(egui::Slider::new(&mut self.sea_level, 0.0..=0.5));

            ui.label("Blur Window");
            ui.add(egui::Slider::new(&mut self.blur, 0.0..=12.0).step_by(1.0));

            ui.label("Noise");
            ui.add(egui::Slider::new(&mut self.noise, 0.0..=0.05));

            egui::ComboBox::from_label("Gradient")
                .selected_text(format!("{:?}", self.gradient))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.gradient, GradientChoice::Classic, "Classic");
                    ui.selectable_value(&mut self.gradient, GradientChoice::Alpine, "Alpine");
                });

            ui.checkbox(&mut self.web_lighting, "Strong relief lighting");
            ui.checkbox(&mut self.height_alpha, "Encode height as alpha");

            ui.separator();

            if ui.button("Generate Terrain").clicked() {
                self.generate(ctx);
            }

            if ui.button("Save PNG…").clicked() {
                self.save();
            }

            ui.separator();
            ui.label(&self.status_message);
        });

        // central display
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(tex) = &self.terrain_texture {
                let side = ui.available_size().min_elem();
                ui.image((tex.id(), egui::vec2(side, side)));
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Click “Generate” to start");
                });
            }
        });
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    run_native(
        "Terrain Generator",
        opts,
        Box::new(|_cc| Ok(Box::new(TerrainApp::default()))),
    )
}
