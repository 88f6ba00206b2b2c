pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_DAY: u32 = MINUTES_PER_HOUR * HOURS_PER_DAY;
pub const DAYS_PER_YEAR: u32 = 365;
/// Horizon used for the multi-year savings figures and the investment proposals.
pub const PROJECTION_YEARS: u32 = 6;

/// Decimal places used for every presented energy/cost figure.
pub const PRESENTATION_DECIMAL_PLACES: i32 = 2;

/// Energy in kWh drawn by `fixtures` lights of `watts` each over `hours`.
pub fn kilowatt_hours(fixtures: u32, watts: f64, hours: f64) -> f64 {
    fixtures as f64 * watts * hours / WATTS_PER_KILOWATT as f64
}

/// Round half away from zero to the given number of decimal places.
pub fn round_to_decimal_places(value: f64, decimal_places: i32) -> f64 {
    let factor = 10f64.powi(decimal_places);
    let rounded = (value * factor).round() / factor;
    // avoid presenting "-0" for tiny negative values
    if rounded == 0. {
        0.
    } else {
        rounded
    }
}

pub(crate) fn round_for_presentation(value: f64) -> f64 {
    round_to_decimal_places(value, PRESENTATION_DECIMAL_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_calc_kilowatt_hours_for_fixtures() {
        assert_eq!(kilowatt_hours(500, 18., 24.), 216.);
        assert_eq!(kilowatt_hours(0, 18., 24.), 0.);
    }

    #[rstest]
    #[case(36.792, 36.79)]
    #[case(18396.000000000004, 18396.)]
    #[case(2.675001, 2.68)]
    #[case(-5.556, -5.56)]
    #[case(-0.001, 0.)]
    fn should_round_to_two_decimal_places(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(round_to_decimal_places(value, 2), expected);
    }

    #[rstest]
    fn should_round_to_one_decimal_place() {
        assert_eq!(round_to_decimal_places(15.983333, 1), 16.);
        assert_eq!(round_to_decimal_places(7.25, 1), 7.3);
    }

    #[rstest]
    fn should_never_present_negative_zero() {
        assert!(round_for_presentation(-0.0001).is_sign_positive());
    }
}
