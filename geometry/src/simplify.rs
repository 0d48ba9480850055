#[cfg(test)]
#[path = "simplify_test.rs"]
mod simplify_test;

use crate::coord::Coordinate;

/// Reduce `path` with Ramer–Douglas–Peucker, measuring deviation in raw degrees.
///
/// The first and last points are always kept. Paths with fewer than three
/// points are returned unchanged. Running the result through again with the
/// same tolerance yields the same path.
#[must_use]
pub fn simplify(path: &[Coordinate], tolerance_degrees: f64) -> Vec<Coordinate> {
    if path.len() < 3 {
        return path.to_vec();
    }
    debug_assert!(tolerance_degrees.is_finite(), "simplify: non-finite tolerance");

    let last = path.len() - 1;
    let mut keep = vec![false; path.len()];
    keep[0] = true;
    keep[last] = true;

    // Divide and conquer over an explicit stack so long near-colinear drags
    // cannot blow the call stack.
    let mut pending = vec![(0_usize, last)];
    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_deviation = 0.0;
        let mut max_index = start;
        for (i, point) in path.iter().enumerate().take(end).skip(start + 1) {
            let deviation = segment_deviation(*point, path[start], path[end]);
            if deviation > max_deviation {
                max_deviation = deviation;
                max_index = i;
            }
        }

        if max_deviation > tolerance_degrees {
            keep[max_index] = true;
            pending.push((start, max_index));
            pending.push((max_index, end));
        }
    }

    path.iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Planar distance in degrees from `point` to the segment `start..end`.
fn segment_deviation(point: Coordinate, start: Coordinate, end: Coordinate) -> f64 {
    let dx = end.longitude - start.longitude;
    let dy = end.latitude - start.latitude;
    let px = point.longitude - start.longitude;
    let py = point.latitude - start.latitude;

    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return px.hypot(py);
    }

    let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
    (px - t * dx).hypot(py - t * dy)
}
