//! Colour tables shared by every view
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

/// Linear RGBA in `[0, 1]`
pub type Rgba = [f32; 4];

pub const TRANSPARENT: Rgba = [0.0, 0.0, 0.0, 0.0];

/// Points not yet assigned to any cluster
pub const UNASSIGNED: Rgba = [0.62, 0.62, 0.62, 1.0];

pub const NEGATIVE_CLASS: Rgba = [0.839, 0.153, 0.157, 1.0];
pub const POSITIVE_CLASS: Rgba = [0.122, 0.467, 0.706, 1.0];

/// Categorical palette indexed by cluster or class
pub const CLASS_PALETTE: [Rgba; 8] = [
    [0.122, 0.467, 0.706, 1.0],
    [1.000, 0.498, 0.055, 1.0],
    [0.173, 0.627, 0.173, 1.0],
    [0.839, 0.153, 0.157, 1.0],
    [0.580, 0.404, 0.741, 1.0],
    [0.549, 0.337, 0.294, 1.0],
    [0.890, 0.467, 0.761, 1.0],
    [0.737, 0.741, 0.133, 1.0],
];

/// Dark-to-bright ramp for continuous values
pub const VALUE_GRADIENT: [Rgba; 3] = [
    [0.267, 0.005, 0.329, 1.0],
    [0.128, 0.567, 0.551, 1.0],
    [0.993, 0.906, 0.144, 1.0],
];

/// Negative, zero and positive ends for signed quantities such as weights
pub const SIGNED_GRADIENT: [Rgba; 3] = [NEGATIVE_CLASS, [0.92, 0.92, 0.92, 1.0], POSITIVE_CLASS];

/// Palette entry for a cluster or class index, wrapping past the end
pub fn class_color(index: usize) -> Rgba {
    CLASS_PALETTE[index % CLASS_PALETTE.len()]
}

/// Palette entry for an integer class label
pub fn label_color(label: i32) -> Rgba {
    class_color(label.rem_euclid(CLASS_PALETTE.len() as i32) as usize)
}

/// Two-colour scheme for `±1` labelled data
pub fn polarity_color(label: i32) -> Rgba {
    if label < 0 {
        NEGATIVE_CLASS
    } else {
        POSITIVE_CLASS
    }
}

pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Sample a piecewise-linear gradient at position `t` in `[0, 1]`
pub fn sample_gradient(gradient: &[Rgba], t: f32) -> Rgba {
    match gradient.len() {
        0 => return TRANSPARENT,
        1 => return gradient[0],
        _ => {}
    }

    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let segment_count = gradient.len() - 1;
    let segment_t = t * segment_count as f32;
    let segment_idx = segment_t as usize;
    let segment_frac = segment_t - segment_idx as f32;

    if segment_idx >= segment_count {
        return gradient[segment_count];
    }

    let c0 = gradient[segment_idx];
    let c1 = gradient[segment_idx + 1];
    [
        c0[0] + (c1[0] - c0[0]) * segment_frac,
        c0[1] + (c1[1] - c0[1]) * segment_frac,
        c0[2] + (c1[2] - c0[2]) * segment_frac,
        c0[3] + (c1[3] - c0[3]) * segment_frac,
    ]
}

/// Position of `value` within `(min, max)`; `0.5` for an empty range
pub fn normalize(value: f64, range: (f64, f64)) -> f32 {
    let span = range.1 - range.0;
    if span.abs() <= f64::EPSILON {
        return 0.5;
    }
    ((value - range.0) / span).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_gradient() {
        let gradient = [[0.0, 0.0, 1.0, 1.0], [1.0, 0.0, 0.0, 1.0]];

        assert_eq!(sample_gradient(&gradient, 0.0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(sample_gradient(&gradient, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(sample_gradient(&gradient, 0.5), [0.5, 0.0, 0.5, 1.0]);
        assert_eq!(sample_gradient(&gradient, 7.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(sample_gradient(&[], 0.5), TRANSPARENT);
    }

    #[test]
    fn test_class_colors_wrap() {
        assert_eq!(class_color(0), class_color(CLASS_PALETTE.len()));
        assert_eq!(label_color(-1), class_color(CLASS_PALETTE.len() - 1));
        assert_ne!(polarity_color(-1), polarity_color(1));
    }

    #[test]
    fn test_normalize_handles_flat_range() {
        assert_eq!(normalize(3.0, (3.0, 3.0)), 0.5);
        assert_eq!(normalize(2.0, (0.0, 4.0)), 0.5);
        assert_eq!(normalize(-1.0, (0.0, 4.0)), 0.0);
    }
}
