// 2D height map: row‐major Vec<Vec<f64>>, square
// access as `map[y][x]`.
pub type HeightMap2D = Vec<Vec<f64>>;

// flatten a 2D height map (row‐major) into a single Vec<f64>
// For handing the field to the UI or an encoder as one buffer
pub fn flatten2(map: &HeightMap2D) -> Vec<f64> {
    map.iter().flat_map(|row| row.iter().cloned()).collect()
}

// Smallest and largest value in the map, None when empty
pub fn height_range(map: &HeightMap2D) -> Option<(f64, f64)> {
    let mut values = map.iter().flat_map(|row| row.iter().copied());
    let first = values.next()?;
    Some(values.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}

// Drop row 0 and column 0.
// A periodic 2^n+1 grid repeats its first row/column at the far edge, so
// what is left is a 2^n grid that tiles without a doubled seam.
pub fn trim_seam(map: &mut HeightMap2D) {
    if map.len() < 2 {
        return;
    }
    map.remove(0);
    for row in map.iter_mut() {
        if !row.is_empty() {
            row.remove(0);
        }
    }
}
