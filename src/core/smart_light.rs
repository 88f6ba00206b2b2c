/// Recommended smart-light high-power wattage for a legacy fixture of the given wattage.
///
/// Each bracket includes its upper bound, so a 20W fixture maps to 10W while anything above it
/// maps to 12W. Fixtures above 60W are capped at 20W.
pub fn default_high_wattage(original_wattage: f64) -> u32 {
    match original_wattage {
        w if w <= 20. => 10,
        w if w <= 24. => 12,
        w if w <= 36. => 16,
        w if w <= 60. => 18,
        _ => 20,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(1., 10)]
    #[case(18., 10)]
    #[case(20., 10)]
    #[case(20.0001, 12)]
    #[case(24., 12)]
    #[case(30., 16)]
    #[case(36., 16)]
    #[case(58., 18)]
    #[case(60., 18)]
    #[case(60.5, 20)]
    #[case(1000., 20)]
    fn should_map_original_wattage_to_high_wattage(
        #[case] original_wattage: f64,
        #[case] expected: u32,
    ) {
        assert_eq!(default_high_wattage(original_wattage), expected);
    }

    #[rstest]
    fn should_be_monotonic_over_supported_wattages() {
        let mapped = (1..=400)
            .map(|w| default_high_wattage(w as f64))
            .collect::<Vec<_>>();
        assert!(mapped.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
