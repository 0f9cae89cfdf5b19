// Stateless in-place transforms that reshape the raw fractal into terrain.
// Callers pick the order; the usual one is
// Normalize -> Power -> BoxBlur -> SeaLevel.

use serde::{Deserialize, Serialize};

use crate::rng::TerrainRng;
use crate::utils::{HeightMap2D, height_range};

// Rescale so the lowest value becomes 0 and the highest 1.
// A flat field, or one whose spread is not finite, is left untouched.
pub fn normalize(map: &mut HeightMap2D) {
    let Some((min, max)) = height_range(map) else {
        return;
    };

    let range = max - min;
    if range == 0.0 {
        log::debug!("normalize: flat field at {}, nothing to do", min);
        return;
    }
    if !range.is_finite() {
        log::warn!("normalize over range [{}, {}] skipped", min, max);
        return;
    }

    for row in map.iter_mut() {
        for val in row.iter_mut() {
            *val = (*val - min) / range;
        }
    }
}

// v^exponent on every cell. NaN and infinities become 0.
pub fn power(map: &mut HeightMap2D, exponent: f64) {
    let mut replaced = 0usize;
    for row in map.iter_mut() {
        for val in row.iter_mut() {
            let v = val.powf(exponent);
            *val = if v.is_finite() {
                v
            } else {
                replaced += 1;
                0.0
            };
        }
    }

    if replaced > 0 {
        log::warn!(
            "power({}): {} non-finite values clamped to 0",
            exponent,
            replaced
        );
    }
}

pub fn scale(map: &mut HeightMap2D, factor: f64) {
    for row in map.iter_mut() {
        for val in row.iter_mut() {
            *val *= factor;
        }
    }
}

// Square mean filter with radius floor(window / 2).
// Reads from a snapshot so already blurred cells never feed their neighbours.
// No wrap here: near the border only in-grid cells are averaged.
pub fn box_blur(map: &mut HeightMap2D, window: f64) {
    if window.is_nan() || window <= 0.0 {
        log::warn!("box blur with window {} skipped", window);
        return;
    }

    let h = map.len();
    if h == 0 {
        return;
    }
    let w = map[0].len();
    let radius = (window / 2.0).floor() as usize;
    let snapshot = map.clone();

    for y in 0..h {
        let y0 = y.saturating_sub(radius);
        let y1 = y.saturating_add(radius).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(radius);
            let x1 = x.saturating_add(radius).min(w - 1);

            let mut sum = 0.0;
            let mut count = 0usize;
            for row in &snapshot[y0..=y1] {
                for &v in &row[x0..=x1] {
                    sum += v;
                    count += 1;
                }
            }
            map[y][x] = sum / count as f64;
        }
    }
}

// Raise everything below `threshold` to it, a flat sea.
pub fn sea_level(map: &mut HeightMap2D, threshold: f64) {
    for row in map.iter_mut() {
        for val in row.iter_mut() {
            if *val < threshold {
                *val = threshold;
            }
        }
    }
}

// Uniform per-cell perturbation in [-amount, amount], result kept in [0, 1].
// Draws row by row from the caller's RNG.
pub fn mono_noise(map: &mut HeightMap2D, amount: f64, rng: &mut TerrainRng) {
    if !amount.is_finite() {
        log::warn!("mono noise with amount {} skipped", amount);
        return;
    }

    for row in map.iter_mut() {
        for val in row.iter_mut() {
            *val = (*val + rng.next_signed() * amount).clamp(0.0, 1.0);
        }
    }
}

// One configurable step of the post-process chain
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Power { exponent: f64 },
    BoxBlur { window: f64 },
    SeaLevel { threshold: f64 },
    Scale { factor: f64 },
    MonoNoise { amount: f64 },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Power { .. } => "power",
            Stage::BoxBlur { .. } => "box_blur",
            Stage::SeaLevel { .. } => "sea_level",
            Stage::Scale { .. } => "scale",
            Stage::MonoNoise { .. } => "mono_noise",
        }
    }

    pub fn apply(&self, map: &mut HeightMap2D, rng: &mut TerrainRng) {
        match *self {
            Stage::Normalize => normalize(map),
            Stage::Power { exponent } => power(map, exponent),
            Stage::BoxBlur { window } => box_blur(map, window),
            Stage::SeaLevel { threshold } => sea_level(map, threshold),
            Stage::Scale { factor } => scale(map, factor),
            Stage::MonoNoise { amount } => mono_noise(map, amount, rng),
        }
    }

    // Normalize -> Power(1.9) -> BoxBlur(4) -> SeaLevel(0.1)
    pub fn default_chain() -> Vec<Stage> {
        vec![
            Stage::Normalize,
            Stage::Power { exponent: 1.9 },
            Stage::BoxBlur { window: 4.0 },
            Stage::SeaLevel { threshold: 0.1 },
        ]
    }

    // Position in the usual chain; scale and noise have none
    fn chain_rank(&self) -> Option<u8> {
        match self {
            Stage::Normalize => Some(0),
            Stage::Power { .. } => Some(1),
            Stage::BoxBlur { .. } => Some(2),
            Stage::SeaLevel { .. } => Some(3),
            Stage::Scale { .. } | Stage::MonoNoise { .. } => None,
        }
    }
}

// Replace every stage of the same kind as `stage` with it.
// Without one, insert it right after the last stage that comes before it in
// Normalize -> Power -> BoxBlur -> SeaLevel (at the front if there is none).
pub fn set_stage(stages: &mut Vec<Stage>, stage: Stage) {
    let kind = std::mem::discriminant(&stage);
    let mut found = false;
    for s in stages.iter_mut() {
        if std::mem::discriminant(s) == kind {
            *s = stage;
            found = true;
        }
    }
    if found {
        return;
    }

    let at = match stage.chain_rank() {
        Some(rank) => stages
            .iter()
            .rposition(|s| s.chain_rank().is_some_and(|r| r < rank))
            .map_or(0, |i| i + 1),
        None => stages.len(),
    };
    log::debug!("inserting {} stage at {}", stage.name(), at);
    stages.insert(at, stage);
}

// Run each stage to completion, in order.
pub fn apply_stages(map: &mut HeightMap2D, stages: &[Stage], rng: &mut TerrainRng) {
    for stage in stages {
        log::debug!("post-process: {:?}", stage);
        stage.apply(map, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::height_range;

    fn ramp(n: usize) -> HeightMap2D {
        (0..n)
            .map(|y| (0..n).map(|x| (y * n + x) as f64 * 0.37 - 3.0).collect())
            .collect()
    }

    #[test]
    fn normalize_maps_to_unit_range() {
        let mut map = ramp(6);
        normalize(&mut map);
        assert_eq!(height_range(&map), Some((0.0, 1.0)));
    }

    #[test]
    fn normalize_twice_is_noop() {
        let mut map = ramp(6);
        normalize(&mut map);
        let once = map.clone();
        normalize(&mut map);
        assert_eq!(map, once);
    }

    #[test]
    fn normalize_flat_field_untouched() {
        let mut map = vec![vec![0.42; 4]; 4];
        normalize(&mut map);
        assert_eq!(map, vec![vec![0.42; 4]; 4]);

        let mut empty: HeightMap2D = Vec::new();
        normalize(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn normalize_skips_unbounded_field() {
        let map = vec![vec![0.0, f64::INFINITY], vec![-f64::INFINITY, f64::NAN]];
        let mut after = map.clone();
        normalize(&mut after);
        for (a, b) in after.iter().flatten().zip(map.iter().flatten()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }

        let mut half = vec![vec![0.25, f64::INFINITY]];
        normalize(&mut half);
        assert_eq!(half[0][0], 0.25);
    }

    #[test]
    fn power_one_is_identity() {
        let mut map = ramp(5);
        normalize(&mut map);
        let before = map.clone();
        power(&mut map, 1.0);
        for (a, b) in map.iter().flatten().zip(before.iter().flatten()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn power_clamps_non_finite() {
        let mut map = vec![vec![-0.5, 0.0, 0.25, 4.0]];
        power(&mut map, 0.5);
        assert_eq!(map[0][0], 0.0); // sqrt of a negative
        assert_eq!(map[0][1], 0.0);
        assert_eq!(map[0][2], 0.5);
        assert_eq!(map[0][3], 2.0);

        let mut map = vec![vec![0.0, 1e300]];
        power(&mut map, -1.0);
        assert_eq!(map[0][0], 0.0); // 1/0
        assert!(map[0][1].is_finite());

        let mut map = vec![vec![1e200]];
        power(&mut map, 3.0);
        assert_eq!(map[0][0], 0.0); // overflow
    }

    #[test]
    fn power_bias() {
        let mut map = vec![vec![0.5]];
        power(&mut map, 2.0);
        assert_eq!(map[0][0], 0.25);
    }

    #[test]
    fn sea_level_floors_values() {
        let mut map = ramp(5);
        normalize(&mut map);
        let before = map.clone();
        sea_level(&mut map, 0.3);
        for (after, orig) in map.iter().flatten().zip(before.iter().flatten()) {
            assert!(*after >= 0.3);
            if *orig >= 0.3 {
                assert_eq!(after.to_bits(), orig.to_bits());
            } else {
                assert_eq!(*after, 0.3);
            }
        }
    }

    #[test]
    fn blur_non_positive_window_is_noop() {
        let mut map = ramp(5);
        let before = map.clone();
        box_blur(&mut map, 0.0);
        box_blur(&mut map, -3.0);
        box_blur(&mut map, f64::NAN);
        assert_eq!(map, before);
    }

    #[test]
    fn blur_uses_snapshot_and_shrinks_at_edges() {
        // single spike: every cell in its 3x3 window sees it exactly once
        let mut map = vec![vec![0.0; 4]; 4];
        map[0][0] = 9.0;
        box_blur(&mut map, 3.0);
        // corner: 2x2 in-grid neighbourhood
        assert_eq!(map[0][0], 9.0 / 4.0);
        // edge: 2x3 neighbourhood
        assert_eq!(map[0][1], 9.0 / 6.0);
        // interior: full 3x3
        assert_eq!(map[1][1], 9.0 / 9.0);
        // out of reach, and no wrap around
        assert_eq!(map[0][3], 0.0);
        assert_eq!(map[3][3], 0.0);
    }

    #[test]
    fn blur_window_larger_than_grid_averages_everything() {
        let mut map = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        box_blur(&mut map, f64::INFINITY);
        assert_eq!(map, vec![vec![1.5; 2]; 2]);
    }

    #[test]
    fn blur_keeps_constant_field() {
        let mut map = vec![vec![0.6; 7]; 7];
        box_blur(&mut map, 5.0);
        for v in map.iter().flatten() {
            assert!((v - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn mono_noise_stays_in_unit_range_and_is_seeded() {
        let mut a = vec![vec![0.0, 0.5, 1.0]; 8];
        let mut b = a.clone();
        mono_noise(&mut a, 0.3, &mut TerrainRng::new(5));
        mono_noise(&mut b, 0.3, &mut TerrainRng::new(5));
        assert_eq!(a, b);
        for row in &a {
            assert!(row.iter().all(|v| (0.0..=1.0).contains(v)));
            assert!((row[1] - 0.5).abs() <= 0.3);
        }
    }

    #[test]
    fn mono_noise_non_finite_amount_is_noop() {
        for amount in [f64::NAN, f64::INFINITY, -f64::INFINITY] {
            let mut map = vec![vec![0.5; 2]; 2];
            mono_noise(&mut map, amount, &mut TerrainRng::new(5));
            assert_eq!(map, vec![vec![0.5; 2]; 2]);
        }
    }

    #[test]
    fn set_stage_replaces_existing() {
        let mut stages = Stage::default_chain();
        set_stage(&mut stages, Stage::Power { exponent: 3.0 });
        set_stage(&mut stages, Stage::SeaLevel { threshold: 0.2 });
        assert_eq!(
            stages,
            vec![
                Stage::Normalize,
                Stage::Power { exponent: 3.0 },
                Stage::BoxBlur { window: 4.0 },
                Stage::SeaLevel { threshold: 0.2 },
            ]
        );
    }

    #[test]
    fn set_stage_inserts_in_chain_order() {
        let mut stages = vec![Stage::Normalize, Stage::MonoNoise { amount: 0.01 }];
        set_stage(&mut stages, Stage::SeaLevel { threshold: 0.2 });
        set_stage(&mut stages, Stage::Power { exponent: 3.0 });
        set_stage(&mut stages, Stage::BoxBlur { window: 6.0 });
        assert_eq!(
            stages,
            vec![
                Stage::Normalize,
                Stage::Power { exponent: 3.0 },
                Stage::BoxBlur { window: 6.0 },
                Stage::SeaLevel { threshold: 0.2 },
                Stage::MonoNoise { amount: 0.01 },
            ]
        );

        let mut stages = vec![Stage::SeaLevel { threshold: 0.1 }];
        set_stage(&mut stages, Stage::Power { exponent: 2.0 });
        assert_eq!(stages[0], Stage::Power { exponent: 2.0 });

        let mut stages = Vec::new();
        set_stage(&mut stages, Stage::Scale { factor: 2.0 });
        assert_eq!(stages, vec![Stage::Scale { factor: 2.0 }]);
    }

    #[test]
    fn stages_apply_in_order() {
        let mut rng = TerrainRng::new(1);
        let mut a = ramp(4);
        apply_stages(
            &mut a,
            &[Stage::Normalize, Stage::SeaLevel { threshold: 0.5 }],
            &mut rng,
        );
        let mut b = ramp(4);
        apply_stages(
            &mut b,
            &[Stage::SeaLevel { threshold: 0.5 }, Stage::Normalize],
            &mut rng,
        );
        assert_ne!(a, b);
        assert_eq!(height_range(&a), Some((0.5, 1.0)));
        assert_eq!(height_range(&b), Some((0.0, 1.0)));
    }

    #[test]
    fn stage_scale() {
        let mut map = vec![vec![0.5, -2.0]];
        Stage::Scale { factor: 2.0 }.apply(&mut map, &mut TerrainRng::new(0));
        assert_eq!(map, vec![vec![1.0, -4.0]]);
    }

    #[test]
    fn stage_names() {
        let names: Vec<_> = Stage::default_chain().iter().map(Stage::name).collect();
        assert_eq!(names, ["normalize", "power", "box_blur", "sea_level"]);
    }
}
