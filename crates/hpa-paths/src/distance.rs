use hpa_core::Point;

/// Straight-line distance between two cells.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Sum of the Euclidean lengths of consecutive steps.
///
/// A path of fewer than two cells weighs nothing.
pub fn path_weight(path: &[Point]) -> f32 {
    path.windows(2).map(|w| euclidean(w[0], w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_steps() {
        assert_eq!(euclidean(Point::new(0, 0), Point::new(0, 1)), 1.0);
        assert!((euclidean(Point::new(0, 0), Point::new(1, 1)) - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert_eq!(euclidean(Point::new(1, 1), Point::new(4, 5)), 5.0);
    }

    #[test]
    fn weight_of_mixed_path() {
        let path = [Point::new(0, 0), Point::new(1, 0), Point::new(2, 1), Point::new(2, 2)];
        let w = path_weight(&path);
        assert!((w - (2.0 + std::f32::consts::SQRT_2)).abs() < 1e-6);
        assert_eq!(path_weight(&path[..1]), 0.0);
        assert_eq!(path_weight(&[]), 0.0);
    }
}
