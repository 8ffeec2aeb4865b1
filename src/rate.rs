/// Zero-safe ratio: `numerator / denominator`, or `0.0` when the denominator is 0.
pub fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

/// Ratio expressed as a percentage rounded to 2 decimals, for display.
pub fn as_percent(ratio: f64) -> f64 {
    (ratio * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate() {
        assert_eq!(rate(1, 2), 0.5);
        assert_eq!(rate(3, 3), 1.0);
        assert_eq!(rate(0, 7), 0.0);
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(5, 0), 0.0);
    }

    #[test]
    fn test_as_percent() {
        assert_eq!(as_percent(1.0 / 3.0), 33.33);
        assert_eq!(as_percent(2.0 / 3.0), 66.67);
        assert_eq!(as_percent(0.0), 0.0);
    }
}
