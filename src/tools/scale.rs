//! Metric and imperial scale bars.

/// Maximum bar width in pixels.
pub const MAX_WIDTH: f32 = 100.0;

const FEET_PER_METER: f64 = 3.280_839_9;
const FEET_PER_MILE: f64 = 5280.0;

/// One scale bar: its pixel width and label.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    pub width: f32,
    pub label: String,
}

/// Rounds down to the nearest 1, 2, 3, 5 or 10 times a power of ten.
pub fn round_number(value: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let pow10 = 10f64.powf(value.log10().floor());
    let d = value / pow10;
    let step = if d >= 10.0 {
        10.0
    } else if d >= 5.0 {
        5.0
    } else if d >= 3.0 {
        3.0
    } else if d >= 2.0 {
        2.0
    } else {
        1.0
    };
    pow10 * step
}

/// Metric bar for a ground resolution of `meters_per_pixel`.
pub fn metric_scale(meters_per_pixel: f64) -> ScaleBar {
    let max_meters = meters_per_pixel * MAX_WIDTH as f64;
    let meters = round_number(max_meters);
    let label = if meters >= 1000.0 {
        format!("{} km", meters / 1000.0)
    } else {
        format!("{} m", meters)
    };
    ScaleBar {
        width: bar_width(meters, max_meters),
        label,
    }
}

/// Imperial bar for a ground resolution of `meters_per_pixel`.
pub fn imperial_scale(meters_per_pixel: f64) -> ScaleBar {
    let max_feet = meters_per_pixel * MAX_WIDTH as f64 * FEET_PER_METER;
    if max_feet > FEET_PER_MILE {
        let max_miles = max_feet / FEET_PER_MILE;
        let miles = round_number(max_miles);
        ScaleBar {
            width: bar_width(miles, max_miles),
            label: format!("{} mi", miles),
        }
    } else {
        let feet = round_number(max_feet);
        ScaleBar {
            width: bar_width(feet, max_feet),
            label: format!("{} ft", feet),
        }
    }
}

fn bar_width(value: f64, max_value: f64) -> f32 {
    if max_value <= 0.0 {
        return 0.0;
    }
    (MAX_WIDTH as f64 * value / max_value).round() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_number() {
        assert_eq!(round_number(1.4), 1.0);
        assert_eq!(round_number(2.7), 2.0);
        assert_eq!(round_number(4.9), 3.0);
        assert_eq!(round_number(7.0), 5.0);
        assert_eq!(round_number(870.0), 500.0);
        assert_eq!(round_number(1250.0), 1000.0);
        assert_eq!(round_number(0.0), 0.0);
    }

    #[test]
    fn test_metric_scale() {
        let bar = metric_scale(12.0);
        assert_eq!(bar.label, "1 km");
        assert_eq!(bar.width, 83.0);

        let bar = metric_scale(2.5);
        assert_eq!(bar.label, "200 m");
        assert_eq!(bar.width, 80.0);
    }

    #[test]
    fn test_imperial_scale() {
        // 100 px at 1 m/px is about 328 ft
        let bar = imperial_scale(1.0);
        assert_eq!(bar.label, "300 ft");
        assert!(bar.width <= MAX_WIDTH);

        // 100 px at 100 m/px is about 6.2 mi
        let bar = imperial_scale(100.0);
        assert_eq!(bar.label, "5 mi");
        assert!(bar.width <= MAX_WIDTH);
    }
}
