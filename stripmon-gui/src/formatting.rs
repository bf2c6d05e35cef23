/// Tick-label formatting for numeric axis values: whole numbers without
/// decimals, fractional values with up to 4 places trimmed of zeros.
pub fn format_axis_value(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        let mut text = format!("{value:.4}");
        while text.contains('.') && text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        text
    }
}

/// Time-offset labels for the X axis (seconds at or left of now):
/// `-m:ss` past a minute, plain seconds below.
pub fn format_time_offset(seconds: f64) -> String {
    let total = seconds.abs().round() as i64;
    let sign = if seconds < 0.0 && total != 0 { "-" } else { "" };
    if total >= 60 {
        format!("{sign}{}:{:02}", total / 60, total % 60)
    } else {
        format!("{sign}{total}")
    }
}

/// Value readout text with a channel-supplied precision.
pub fn format_readout(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

#[cfg(test)]
mod tests {
    use super::{format_axis_value, format_readout, format_time_offset};

    #[test]
    fn axis_values_trim_trailing_zeros() {
        assert_eq!(format_axis_value(42.0), "42");
        assert_eq!(format_axis_value(3.14159), "3.1416");
        assert_eq!(format_axis_value(2.5), "2.5");
        assert_eq!(format_axis_value(-0.25), "-0.25");
    }

    #[test]
    fn time_offsets_switch_to_minutes() {
        assert_eq!(format_time_offset(0.0), "0");
        assert_eq!(format_time_offset(-45.0), "-45");
        assert_eq!(format_time_offset(-90.0), "-1:30");
        assert_eq!(format_time_offset(-600.0), "-10:00");
    }

    #[test]
    fn readout_uses_requested_precision() {
        assert_eq!(format_readout(1.23456, 2), "1.23");
        assert_eq!(format_readout(1.0, 0), "1");
    }
}
