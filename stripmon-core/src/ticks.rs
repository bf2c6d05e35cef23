use crate::interval::Interval;

/// Target tick count across the full host extent, X axis.
pub const TICK_DENSITY_X: f64 = 10.0;
/// Target tick count across the full host extent, Y axis.
pub const TICK_DENSITY_Y: f64 = 8.0;

/// Round to a "nice" human spacing: scale the magnitude into [1, 10) by
/// powers of ten, round to the nearest integer, scale back.
///
/// The round-then-rescale form (rather than snapping to {1,2,5} decades)
/// determines the visual tick density and is kept as-is.
pub fn round_nice(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let sign = x.signum();
    let mut x = x.abs();
    let mut m = 1.0;
    if x >= 1.0 {
        while x > 10.0 {
            x /= 10.0;
            m *= 10.0;
        }
    } else {
        while x < 1.0 {
            x *= 10.0;
            m /= 10.0;
        }
    }
    sign * x.round() * m
}

fn target_count(density: f64, widget_px: f64, host_px: f64) -> Option<f64> {
    if !(widget_px.is_finite() && host_px.is_finite()) || widget_px <= 0.0 || host_px <= 0.0 {
        return None;
    }
    Some((density * widget_px / host_px).ceil().max(1.0))
}

/// X-axis tick values for a `[-len, 0]` range: anchored at 0, counting
/// backward in nice steps. Count is `floor(len / spacing) + 1`.
pub fn x_ticks(range_len: f64, widget_px: f64, host_px: f64) -> Vec<f64> {
    let Some(nt) = target_count(TICK_DENSITY_X, widget_px, host_px) else {
        return Vec::new();
    };
    if !range_len.is_finite() || range_len <= 0.0 {
        return Vec::new();
    }
    let dx = round_nice(range_len / nt);
    if !dx.is_finite() || dx <= 0.0 {
        return Vec::new();
    }
    let count = (range_len / dx).floor() as usize + 1;
    (0..count).map(|i| -(i as f64) * dx).collect()
}

/// Y-axis tick values: nice spacing around the rounded range center,
/// filtered to values actually inside the range.
pub fn y_ticks(range: Interval, widget_px: f64, host_px: f64) -> Vec<f64> {
    let Some(nt) = target_count(TICK_DENSITY_Y, widget_px, host_px) else {
        return Vec::new();
    };
    let len = range.length();
    if !len.is_finite() || len <= 0.0 {
        return Vec::new();
    }
    let dy = round_nice(len / nt);
    if !dy.is_finite() || dy <= 0.0 {
        return Vec::new();
    }
    let count = (len / dy).round() as i64;
    let start = round_nice(range.center()) - (count / 2) as f64 * dy;
    (0..count)
        .map(|i| start + i as f64 * dy)
        .filter(|&y| range.contains(y))
        .collect()
}
