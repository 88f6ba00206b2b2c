// This module calculates the consumption of a legacy fixed-wattage lighting installation and of
// its two-level dimmable replacement over one day, and the savings that follow from the
// difference.
//
// Consumption is accumulated at full precision; every presented figure (per-period details and
// the final totals) is rounded independently to two decimal places.

use crate::core::schedule::Period;
use crate::core::units::{
    kilowatt_hours, round_for_presentation, DAYS_PER_YEAR, PROJECTION_YEARS,
};
use crate::input::{CompleteParameters, InstallationParameters};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Share of each period's on-time spent in high power mode when none has been chosen.
pub const DEFAULT_HIGH_POWER_RATIO: f64 = 0.25;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Per-light savings cannot be calculated for an installation of {0} lights")]
    NoLights(u32),
    #[error("The high power ratio must be a fraction between 0 and 1 (was {0})")]
    InvalidHighPowerRatio(f64),
}

/// How the on-time of a smart light is split between its two power levels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerModeSplit {
    pub high_power_ratio: f64,
    pub low_power_ratio: f64,
}

impl PowerModeSplit {
    pub fn from_high_power_ratio(high_power_ratio: f64) -> Result<Self, CalculationError> {
        if !(0.0..=1.0).contains(&high_power_ratio) {
            return Err(CalculationError::InvalidHighPowerRatio(high_power_ratio));
        }

        Ok(Self {
            high_power_ratio,
            low_power_ratio: 1. - high_power_ratio,
        })
    }
}

/// Breakdown of one schedule period, rounded for presentation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PeriodDetail {
    pub period: String,
    pub duration_hours: f64,
    pub lights_on: u32,
    pub original_consumption_kwh: f64,
    pub smart_high_hours: f64,
    pub smart_low_hours: f64,
    pub smart_high_consumption_kwh: f64,
    pub smart_low_consumption_kwh: f64,
    pub smart_total_consumption_kwh: f64,
    pub period_savings_kwh: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SavingsResult {
    pub daily_savings_kwh: f64,
    pub annual_savings_kwh: f64,
    pub annual_savings_sgd: f64,
    pub per_light_annual_savings: f64,
    pub six_year_savings: f64,
    pub original_daily_consumption_kwh: f64,
    pub smart_daily_consumption_kwh: f64,
    pub period_details: Vec<PeriodDetail>,
}

impl SavingsResult {
    pub fn is_saving(&self) -> bool {
        self.daily_savings_kwh > 0.
    }
}

/// Unrounded consumption figures for a single period.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PeriodConsumption {
    original: f64,
    high_hours: f64,
    low_hours: f64,
    smart_high: f64,
    smart_low: f64,
}

impl PeriodConsumption {
    fn calculate(
        period: &Period,
        original_wattage: f64,
        smart_high_wattage: f64,
        smart_low_wattage: f64,
        split: PowerModeSplit,
    ) -> Self {
        let original = kilowatt_hours(period.lights_on, original_wattage, period.duration_hours);

        // with no lights on there is no on-time to split between the two power levels
        if period.lights_on == 0 {
            return Self {
                original,
                ..Default::default()
            };
        }

        let high_hours = period.duration_hours * split.high_power_ratio;
        let low_hours = period.duration_hours * split.low_power_ratio;

        Self {
            original,
            high_hours,
            low_hours,
            smart_high: kilowatt_hours(period.lights_on, smart_high_wattage, high_hours),
            smart_low: kilowatt_hours(period.lights_on, smart_low_wattage, low_hours),
        }
    }

    fn smart(&self) -> f64 {
        self.smart_high + self.smart_low
    }

    fn detail_for(&self, period: &Period) -> PeriodDetail {
        PeriodDetail {
            period: period_label(period.duration_hours),
            duration_hours: round_for_presentation(period.duration_hours),
            lights_on: period.lights_on,
            original_consumption_kwh: round_for_presentation(self.original),
            smart_high_hours: round_for_presentation(self.high_hours),
            smart_low_hours: round_for_presentation(self.low_hours),
            smart_high_consumption_kwh: round_for_presentation(self.smart_high),
            smart_low_consumption_kwh: round_for_presentation(self.smart_low),
            smart_total_consumption_kwh: round_for_presentation(self.smart()),
            period_savings_kwh: round_for_presentation(self.original - self.smart()),
        }
    }
}

/// Label used to identify a period by its length, e.g. "12.0 hours" or "7.25 hours".
fn period_label(duration_hours: f64) -> String {
    let hours = round_for_presentation(duration_hours);
    if hours.fract() == 0. {
        format!("{hours:.1} hours")
    } else {
        format!("{hours} hours")
    }
}

/// Calculate the savings for a set of installation parameters.
///
/// Returns `Ok(None)` when any required parameter has not been set yet, which is a signal to keep
/// collecting input rather than a failure.
#[instrument(skip_all)]
pub fn calculate_savings(
    parameters: &InstallationParameters,
) -> Result<Option<SavingsResult>, CalculationError> {
    match parameters.complete() {
        Some(complete) => calculate_savings_for(&complete).map(Some),
        None => {
            debug!(
                missing = ?parameters.missing_fields(),
                "Savings are unavailable until all required parameters are set"
            );
            Ok(None)
        }
    }
}

#[instrument(skip_all, fields(project = parameters.project_name))]
pub fn calculate_savings_for(
    parameters: &CompleteParameters,
) -> Result<SavingsResult, CalculationError> {
    if parameters.total_lights == 0 {
        return Err(CalculationError::NoLights(parameters.total_lights));
    }
    let split = PowerModeSplit::from_high_power_ratio(parameters.high_power_ratio)?;

    let mut original_daily_consumption = 0.;
    let mut smart_daily_consumption = 0.;
    let mut period_details = Vec::with_capacity(parameters.operation_schedule.len());

    for period in parameters.operation_schedule {
        let consumption = PeriodConsumption::calculate(
            period,
            parameters.original_wattage,
            parameters.smart_high_wattage,
            parameters.smart_low_wattage,
            split,
        );

        original_daily_consumption += consumption.original;
        smart_daily_consumption += consumption.smart();
        period_details.push(consumption.detail_for(period));
    }

    let daily_savings_kwh = original_daily_consumption - smart_daily_consumption;
    let annual_savings_kwh = daily_savings_kwh * DAYS_PER_YEAR as f64;
    let annual_savings_sgd = annual_savings_kwh * parameters.electricity_rate;
    let per_light_annual_savings = annual_savings_sgd / parameters.total_lights as f64;
    let six_year_savings = annual_savings_sgd * PROJECTION_YEARS as f64;

    if daily_savings_kwh < 0. {
        warn!(
            project = parameters.project_name,
            daily_savings_kwh = round_for_presentation(daily_savings_kwh),
            "Smart lighting is projected to consume more than the existing installation"
        );
    }

    Ok(SavingsResult {
        daily_savings_kwh: round_for_presentation(daily_savings_kwh),
        annual_savings_kwh: round_for_presentation(annual_savings_kwh),
        annual_savings_sgd: round_for_presentation(annual_savings_sgd),
        per_light_annual_savings: round_for_presentation(per_light_annual_savings),
        six_year_savings: round_for_presentation(six_year_savings),
        original_daily_consumption_kwh: round_for_presentation(original_daily_consumption),
        smart_daily_consumption_kwh: round_for_presentation(smart_daily_consumption),
        period_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    use crate::core::validation::ParameterField;

    #[fixture]
    fn warehouse() -> InstallationParameters {
        InstallationParameters {
            project_name: Some("Warehouse".to_string()),
            total_lights: Some(500),
            original_wattage: Some(18.),
            electricity_rate: Some(0.3),
            operation_schedule: Some(vec![Period::new(24., 500)]),
            smart_high_wattage: Some(10.),
            smart_low_wattage: Some(2.),
            high_power_ratio: Some(0.25),
        }
    }

    #[fixture]
    fn office() -> InstallationParameters {
        InstallationParameters {
            project_name: Some("Office".to_string()),
            total_lights: Some(120),
            original_wattage: Some(36.),
            electricity_rate: Some(0.27),
            operation_schedule: Some(vec![
                Period::new(7.5, 120),
                Period::new(3.3, 45),
                Period::new(9.2, 0),
                Period::new(4., 17),
            ]),
            smart_high_wattage: Some(16.),
            smart_low_wattage: Some(3.),
            high_power_ratio: Some(0.35),
        }
    }

    #[rstest]
    fn should_calculate_single_period_scenario(warehouse: InstallationParameters) {
        let result = calculate_savings(&warehouse).unwrap().unwrap();

        assert_eq!(
            result,
            SavingsResult {
                daily_savings_kwh: 168.,
                annual_savings_kwh: 61320.,
                annual_savings_sgd: 18396.,
                per_light_annual_savings: 36.79,
                six_year_savings: 110376.,
                original_daily_consumption_kwh: 216.,
                smart_daily_consumption_kwh: 48.,
                period_details: vec![PeriodDetail {
                    period: "24.0 hours".to_string(),
                    duration_hours: 24.,
                    lights_on: 500,
                    original_consumption_kwh: 216.,
                    smart_high_hours: 6.,
                    smart_low_hours: 18.,
                    smart_high_consumption_kwh: 30.,
                    smart_low_consumption_kwh: 18.,
                    smart_total_consumption_kwh: 48.,
                    period_savings_kwh: 168.,
                }],
            }
        );
    }

    #[rstest]
    fn should_default_high_power_ratio_when_unset(warehouse: InstallationParameters) {
        let unset = InstallationParameters {
            high_power_ratio: None,
            ..warehouse.clone()
        };
        assert_eq!(
            calculate_savings(&unset).unwrap(),
            calculate_savings(&warehouse).unwrap()
        );
    }

    #[rstest]
    #[case(0.)]
    #[case(0.1)]
    #[case(0.25)]
    #[case(0.5)]
    #[case(1.)]
    fn should_zero_smart_fields_when_no_lights_on(
        office: InstallationParameters,
        #[case] ratio: f64,
    ) {
        let parameters = InstallationParameters {
            high_power_ratio: Some(ratio),
            ..office
        };
        let result = calculate_savings(&parameters).unwrap().unwrap();
        let dark_period = &result.period_details[2];

        assert_eq!(dark_period.lights_on, 0);
        assert_eq!(dark_period.smart_high_hours, 0.);
        assert_eq!(dark_period.smart_low_hours, 0.);
        assert_eq!(dark_period.smart_high_consumption_kwh, 0.);
        assert_eq!(dark_period.smart_low_consumption_kwh, 0.);
        assert_eq!(dark_period.smart_total_consumption_kwh, 0.);
        assert_eq!(dark_period.original_consumption_kwh, 0.);
        assert_eq!(dark_period.period_savings_kwh, 0.);
    }

    #[rstest]
    fn should_keep_period_details_in_schedule_order(office: InstallationParameters) {
        let result = calculate_savings(&office).unwrap().unwrap();
        let lights_on = result
            .period_details
            .iter()
            .map(|detail| detail.lights_on)
            .collect::<Vec<_>>();
        assert_eq!(lights_on, vec![120, 45, 0, 17]);
        assert_eq!(result.period_details[1].period, "3.3 hours");
    }

    #[rstest]
    fn should_sum_period_details_to_daily_totals(office: InstallationParameters) {
        let result = calculate_savings(&office).unwrap().unwrap();
        let tolerance = 0.01 * result.period_details.len() as f64;

        let original_sum: f64 = result
            .period_details
            .iter()
            .map(|detail| detail.original_consumption_kwh)
            .sum();
        let smart_sum: f64 = result
            .period_details
            .iter()
            .map(|detail| detail.smart_total_consumption_kwh)
            .sum();

        assert_abs_diff_eq!(
            original_sum,
            result.original_daily_consumption_kwh,
            epsilon = tolerance
        );
        assert_abs_diff_eq!(
            smart_sum,
            result.smart_daily_consumption_kwh,
            epsilon = tolerance
        );
    }

    #[rstest]
    fn should_calculate_multi_period_totals(office: InstallationParameters) {
        let result = calculate_savings(&office).unwrap().unwrap();

        // original: 120*36*7.5 + 45*36*3.3 + 17*36*4 = 32400 + 5346 + 2448 Wh
        assert_abs_diff_eq!(result.original_daily_consumption_kwh, 40.19, epsilon = 1e-9);
        // smart: (120*7.5 + 45*3.3 + 17*4) * (16*0.35 + 3*0.65) Wh
        assert_abs_diff_eq!(result.smart_daily_consumption_kwh, 8.43, epsilon = 1e-9);
        assert_abs_diff_eq!(result.daily_savings_kwh, 31.76, epsilon = 1e-9);
    }

    #[rstest]
    #[case(0.)]
    #[case(0.1)]
    #[case(0.25)]
    #[case(0.3)]
    #[case(0.5)]
    #[case(0.7)]
    #[case(1.)]
    fn should_split_on_time_between_power_modes_exactly(#[case] ratio: f64) {
        let split = PowerModeSplit::from_high_power_ratio(ratio).unwrap();
        assert_eq!(split.high_power_ratio + split.low_power_ratio, 1.);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn should_reject_high_power_ratio_outside_unit_interval(
        warehouse: InstallationParameters,
        #[case] ratio: f64,
    ) {
        let parameters = InstallationParameters {
            high_power_ratio: Some(ratio),
            ..warehouse
        };
        assert!(matches!(
            calculate_savings(&parameters),
            Err(CalculationError::InvalidHighPowerRatio(_))
        ));
    }

    #[rstest]
    fn should_be_idempotent(office: InstallationParameters) {
        let first = calculate_savings(&office).unwrap().unwrap();
        let second = calculate_savings(&office).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.annual_savings_sgd.to_bits(),
            second.annual_savings_sgd.to_bits()
        );
    }

    #[rstest]
    fn should_be_unavailable_when_any_required_field_is_missing(
        warehouse: InstallationParameters,
    ) {
        for field in ParameterField::iter().filter(ParameterField::is_required) {
            let mut parameters = warehouse.clone();
            parameters.unset(field);
            assert_eq!(
                calculate_savings(&parameters),
                Ok(None),
                "expected savings to be unavailable without {field}"
            );
        }
    }

    #[rstest]
    fn should_calculate_zero_savings_for_empty_schedule(warehouse: InstallationParameters) {
        let parameters = InstallationParameters {
            operation_schedule: Some(vec![]),
            ..warehouse
        };
        let result = calculate_savings(&parameters).unwrap().unwrap();

        assert_eq!(result.daily_savings_kwh, 0.);
        assert_eq!(result.six_year_savings, 0.);
        assert!(result.period_details.is_empty());
        assert!(!result.is_saving());
    }

    #[rstest]
    fn should_report_negative_savings(warehouse: InstallationParameters) {
        let parameters = InstallationParameters {
            original_wattage: Some(5.),
            smart_high_wattage: Some(20.),
            smart_low_wattage: Some(5.),
            electricity_rate: Some(0.2),
            ..warehouse
        };
        let result = calculate_savings(&parameters).unwrap().unwrap();

        // original 500*5*24 = 60kWh, smart 500*(20*6 + 5*18) = 105kWh
        assert_eq!(result.daily_savings_kwh, -45.);
        assert_eq!(result.annual_savings_kwh, -16425.);
        assert_eq!(result.annual_savings_sgd, -3285.);
        assert_eq!(result.per_light_annual_savings, -6.57);
        assert_eq!(result.period_details[0].period_savings_kwh, -45.);
    }

    #[rstest]
    fn should_fail_rather_than_divide_by_zero_lights(warehouse: InstallationParameters) {
        let parameters = InstallationParameters {
            total_lights: Some(0),
            operation_schedule: Some(vec![Period::new(24., 0)]),
            ..warehouse
        };
        assert_eq!(
            calculate_savings(&parameters),
            Err(CalculationError::NoLights(0))
        );
    }

    #[rstest]
    #[case(24., "24.0 hours")]
    #[case(7.25, "7.25 hours")]
    #[case(2.006, "2.01 hours")]
    fn should_label_periods_by_duration(#[case] duration: f64, #[case] expected: &str) {
        assert_eq!(period_label(duration), expected);
    }
}
