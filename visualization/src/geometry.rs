//! Clipping of implicit lines against the square panel domain
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use mlscope_core::data_structures::point::Domain;

const EPSILON: f64 = 1e-9;

/// Clip the line `a·x + b·y + c = 0` to the domain box.
///
/// Returns the two boundary crossings farthest apart, or `None` when the
/// line misses the box, touches it at a single corner, or `a = b = 0`.
pub fn clip_line(a: f64, b: f64, c: f64, domain: Domain) -> Option<([f64; 2], [f64; 2])> {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return None;
    }
    if a.abs() < EPSILON && b.abs() < EPSILON {
        return None;
    }

    let (lo, hi) = (domain.min, domain.max);
    let inside = |v: f64| v >= lo - EPSILON && v <= hi + EPSILON;
    let mut hits: Vec<[f64; 2]> = Vec::with_capacity(4);

    if b.abs() >= EPSILON {
        for x in [lo, hi] {
            let y = -(a * x + c) / b;
            if inside(y) {
                hits.push([x, domain.clamp_value(y)]);
            }
        }
    }
    if a.abs() >= EPSILON {
        for y in [lo, hi] {
            let x = -(b * y + c) / a;
            if inside(x) {
                hits.push([domain.clamp_value(x), y]);
            }
        }
    }

    let mut best: Option<([f64; 2], [f64; 2], f64)> = None;
    for (i, p) in hits.iter().enumerate() {
        for q in &hits[i + 1..] {
            let length = (p[0] - q[0]).hypot(p[1] - q[1]);
            if best.map_or(true, |(_, _, longest)| length > longest) {
                best = Some((*p, *q, length));
            }
        }
    }

    match best {
        Some((p, q, length)) if length > EPSILON => Some((p, q)),
        _ => None,
    }
}

/// Clip `y = slope·x + intercept`
pub fn clip_graph(slope: f64, intercept: f64, domain: Domain) -> Option<([f64; 2], [f64; 2])> {
    clip_line(slope, -1.0, intercept, domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sorted(segment: ([f64; 2], [f64; 2])) -> ([f64; 2], [f64; 2]) {
        let (p, q) = segment;
        if (p[0], p[1]) <= (q[0], q[1]) {
            (p, q)
        } else {
            (q, p)
        }
    }

    #[test]
    fn test_vertical_line() {
        let (p, q) = sorted(clip_line(1.0, 0.0, -0.4, Domain::UNIT).unwrap());
        assert_eq!(p, [0.4, 0.0]);
        assert_eq!(q, [0.4, 1.0]);
    }

    #[test]
    fn test_diagonal_through_corners() {
        let (p, q) = sorted(clip_line(1.0, -1.0, 0.0, Domain::UNIT).unwrap());
        assert_abs_diff_eq!(p[0], 0.0);
        assert_abs_diff_eq!(p[1], 0.0);
        assert_abs_diff_eq!(q[0], 1.0);
        assert_abs_diff_eq!(q[1], 1.0);
    }

    #[test]
    fn test_graph_in_symmetric_domain() {
        let (p, q) = sorted(clip_graph(2.0, 3.0, Domain::SYMMETRIC).unwrap());
        assert_abs_diff_eq!(p[0], -4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], -5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_and_degenerate_lines() {
        assert!(clip_line(1.0, 0.0, -2.0, Domain::UNIT).is_none());
        assert!(clip_line(0.0, 0.0, 1.0, Domain::UNIT).is_none());
        assert!(clip_line(1.0, 1.0, 0.0, Domain::UNIT).is_none());
        assert!(clip_line(f64::NAN, 1.0, 0.0, Domain::UNIT).is_none());
    }
}
