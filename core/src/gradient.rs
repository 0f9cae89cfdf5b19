use std::fmt;

use palette::{Gradient, LinSrgba};

use crate::error::{Result, TerrainError};

// One breakpoint of a color ramp: height in [0, 1] and RGBA in [0, 1]
pub type Breakpoint = (f64, [f64; 4]);

// Piecewise-linear color ramp over height.
// Positions are validated to be strictly increasing; lookups below the first
// or above the last breakpoint return that breakpoint's color.
pub struct ColorGradient {
    stops: Vec<Breakpoint>,
    ramp: Gradient<LinSrgba<f64>>,
}

impl ColorGradient {
    pub fn new(stops: Vec<Breakpoint>) -> Result<Self> {
        if stops.is_empty() {
            return Err(TerrainError::EmptyGradient);
        }

        for (index, &(position, _)) in stops.iter().enumerate() {
            if !(0.0..=1.0).contains(&position) {
                return Err(TerrainError::InvalidBreakpoint { index, position });
            }
            if index > 0 {
                let previous = stops[index - 1].0;
                if position <= previous {
                    return Err(TerrainError::UnorderedBreakpoints {
                        index,
                        previous,
                        position,
                    });
                }
            }
        }

        let ramp = build_ramp(&stops);
        Ok(Self { stops, ramp })
    }

    // Interpolated RGBA at `height`
    pub fn at(&self, height: f64) -> [f64; 4] {
        // NaN would poison the mix factor
        let height = if height.is_nan() { 0.0 } else { height };
        let c = self.ramp.get(height);
        [c.red, c.green, c.blue, c.alpha]
    }

    pub fn stops(&self) -> &[Breakpoint] {
        &self.stops
    }

    // Deep water, shallows, sand, two grasses, dirt, rock, snow
    pub fn classic_terrain() -> Self {
        Self::from_rgba8(&[
            (0.09, [0, 20, 128, 255]),
            (0.12, [100, 130, 200, 255]),
            (0.125, [220, 180, 140, 255]),
            (0.15, [35, 70, 20, 255]),
            (0.35, [70, 130, 50, 255]),
            (0.55, [124, 103, 51, 255]),
            (0.82, [85, 85, 85, 255]),
            (0.95, [255, 255, 255, 255]),
        ])
    }

    // Darker sea and stone, snow only on the very top
    pub fn alpine() -> Self {
        Self::from_rgba8(&[
            (0.09, [0, 0, 128, 255]),
            (0.12, [100, 130, 200, 255]),
            (0.125, [220, 180, 140, 255]),
            (0.15, [50, 139, 50, 255]),
            (0.3, [50, 100, 24, 255]),
            (0.55, [50, 60, 70, 255]),
            (0.82, [110, 95, 110, 255]),
            (0.99, [255, 255, 255, 255]),
        ])
    }

    // presets are known-good, so skip validation
    fn from_rgba8(stops: &[(f64, [u8; 4])]) -> Self {
        let stops: Vec<Breakpoint> = stops
            .iter()
            .map(|&(p, c)| (p, c.map(|v| v as f64 / 255.0)))
            .collect();
        let ramp = build_ramp(&stops);
        Self { stops, ramp }
    }
}

fn build_ramp(stops: &[Breakpoint]) -> Gradient<LinSrgba<f64>> {
    Gradient::with_domain(
        stops
            .iter()
            .map(|&(p, [r, g, b, a])| (p, LinSrgba::<f64>::new(r, g, b, a)))
            .collect(),
    )
}

impl Clone for ColorGradient {
    fn clone(&self) -> Self {
        Self {
            stops: self.stops.clone(),
            ramp: build_ramp(&self.stops),
        }
    }
}

impl fmt::Debug for ColorGradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorGradient")
            .field("stops", &self.stops)
            .finish()
    }
}
