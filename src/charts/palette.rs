//! Colour scales for the report charts.

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

// Status series colours, shared by the trend and site charts.
pub const TOTAL: Rgb = Rgb(0x2E, 0x86, 0xAB);
pub const ATTENDED: Rgb = Rgb(0x06, 0xA7, 0x7D);
pub const CANCELLED: Rgb = Rgb(0xD6, 0x28, 0x28);
pub const PENDING: Rgb = Rgb(0xF7, 0x7F, 0x00);

pub const ABOVE_MEAN: Rgb = Rgb(0xFF, 0x6B, 0x6B);
pub const AT_OR_BELOW_MEAN: Rgb = Rgb(0x4E, 0xCD, 0xC4);
pub const MEAN_LINE: Rgb = Rgb(0xFF, 0x00, 0x00);

/// Purple → teal → yellow.
pub const VIRIDIS: [Rgb; 5] = [
    Rgb(68, 1, 84),
    Rgb(59, 82, 139),
    Rgb(33, 145, 140),
    Rgb(94, 201, 98),
    Rgb(253, 231, 37),
];

/// Dark plum → red → pale peach.
pub const ROCKET: [Rgb; 5] = [
    Rgb(53, 25, 62),
    Rgb(113, 31, 87),
    Rgb(203, 29, 79),
    Rgb(243, 118, 81),
    Rgb(246, 212, 180),
];

/// Pale yellow → orange → dark red.
pub const YL_OR_RD: [Rgb; 5] = [
    Rgb(255, 255, 204),
    Rgb(254, 217, 118),
    Rgb(253, 141, 60),
    Rgb(227, 26, 28),
    Rgb(128, 0, 38),
];

/// Soft qualitative colours for unordered categories.
pub const SET2: [Rgb; 8] = [
    Rgb(102, 194, 165),
    Rgb(252, 141, 98),
    Rgb(141, 160, 203),
    Rgb(231, 138, 195),
    Rgb(166, 216, 84),
    Rgb(255, 217, 47),
    Rgb(229, 196, 148),
    Rgb(179, 179, 179),
];

/// Colour at `t` ∈ [0, 1] along a piecewise-linear scale. `t` is clamped.
pub fn sample(stops: &[Rgb], t: f64) -> Rgb {
    match stops {
        [] => Rgb(0, 0, 0),
        [only] => *only,
        _ => {
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            let pos = t * (stops.len() - 1) as f64;
            let idx = (pos.floor() as usize).min(stops.len() - 2);
            lerp(stops[idx], stops[idx + 1], pos - idx as f64)
        }
    }
}

/// `n` evenly spaced colours from the first stop to the last.
pub fn gradient(stops: &[Rgb], n: usize) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![sample(stops, 0.0)],
        _ => (0..n)
            .map(|i| sample(stops, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// `n` qualitative colours, cycling when there are more categories than colours.
pub fn qualitative(n: usize) -> Vec<Rgb> {
    SET2.iter().copied().cycle().take(n).collect()
}

/// Heatmap cell colour for `value` on a `0..=max` scale.
pub fn heat(value: f64, max: f64) -> Rgb {
    if max <= 0.0 {
        return YL_OR_RD[0];
    }
    sample(&YL_OR_RD, value / max)
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text(background: Rgb) -> Rgb {
    let Rgb(r, g, b) = background;
    let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    if luma > 140.0 {
        Rgb(0, 0, 0)
    } else {
        Rgb(255, 255, 255)
    }
}

fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
