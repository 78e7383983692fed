//! Human-readable number formatting for weights and reputation.

/// Format a signed weight compactly: `847`, `12.3k`, `1.2m`.
pub fn readable_weight(weight: i64) -> String {
    if weight >= 1_000_000 || weight <= -1_000_000 {
        format!("{:.1}m", weight as f64 / 1_000_000.0)
    } else if weight >= 1_000 || weight <= -1_000 {
        format!("{:.1}k", weight as f64 / 1_000.0)
    } else {
        weight.to_string()
    }
}

/// Format a (non-negative) reputation compactly: `847`, `12k`, `3m`.
pub fn readable_reputation(reputation: i64) -> String {
    if reputation >= 1_000_000 {
        format!("{}m", (reputation as f64 / 1_000_000.0).round() as i64)
    } else if reputation >= 1_000 {
        format!("{}k", (reputation as f64 / 1_000.0).round() as i64)
    } else {
        reputation.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_small_verbatim() {
        assert_eq!(readable_weight(0), "0");
        assert_eq!(readable_weight(-847), "-847");
    }

    #[test]
    fn weight_thousands_and_millions() {
        assert_eq!(readable_weight(12_345), "12.3k");
        assert_eq!(readable_weight(-1_200), "-1.2k");
        assert_eq!(readable_weight(1_200_000), "1.2m");
    }

    #[test]
    fn reputation_rounds_whole_units() {
        assert_eq!(readable_reputation(999), "999");
        assert_eq!(readable_reputation(12_600), "13k");
        assert_eq!(readable_reputation(2_500_000), "3m");
    }
}
