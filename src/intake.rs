//! Step-by-step collection of installation parameters.
//!
//! The state of an intake is an ordinary value: it can be serialised between interactions and
//! handed back in, and the savings engine only ever sees the parameters it has gathered so far.

use crate::core::savings::{calculate_savings, CalculationError, SavingsResult};
use crate::core::schedule::input::ScheduleEntry;
use crate::core::schedule::{check_schedule_total, Period, ScheduleError};
use crate::core::smart_light::default_high_wattage;
use crate::core::validation::{validate_input, Bounds, ParameterField, ValidationError};
use crate::input::InstallationParameters;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};
use thiserror::Error;
use tracing::debug;

/// Product rules applied while answers are collected. None of these constrain the engine itself.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct IntakePolicy {
    /// Legacy fixture wattages the calculator is able to offer a replacement for.
    pub supported_original_wattage: Bounds,
    pub high_power_ratio: Bounds,
    pub default_low_wattage: f64,
    pub schedule_total_tolerance_hours: f64,
    pub max_periods: usize,
    /// Precision that durations derived from clock times are rounded to.
    pub duration_decimal_places: i32,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            supported_original_wattage: Bounds::new(10., 200.),
            high_power_ratio: Bounds::new(0.1, 0.5),
            default_low_wattage: 2.,
            schedule_total_tolerance_hours: 0.1,
            max_periods: 5,
            duration_decimal_places: 1,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    EnumCount,
    EnumIter,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntakeStep {
    #[default]
    ProjectName,
    TotalLights,
    OriginalWattage,
    ElectricityRate,
    OperationSchedule,
    SmartLightSettings,
    Results,
}

impl IntakeStep {
    fn index(self) -> usize {
        IntakeStep::iter()
            .position(|step| step == self)
            .unwrap_or_default()
    }

    fn next(self) -> Self {
        IntakeStep::iter().nth(self.index() + 1).unwrap_or(self)
    }

    fn previous(self) -> Self {
        match self.index() {
            0 => self,
            index => IntakeStep::iter().nth(index - 1).unwrap_or(self),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum IntakeError {
    #[error("The {submitted} step cannot be answered while at the {current} step")]
    WrongStep {
        current: IntakeStep,
        submitted: IntakeStep,
    },
    #[error("A project name is needed")]
    EmptyProjectName,
    #[error(transparent)]
    InvalidValue(#[from] ValidationError),
    #[error("This type of light ({wattage}W) is currently not supported in our calculator, which supports wattages {supported}")]
    UnsupportedFixture { wattage: f64, supported: Bounds },
    #[error(transparent)]
    InvalidSchedule(#[from] ScheduleError),
    #[error("High power mode time of {ratio} should be {bounds}")]
    HighPowerRatioOutOfRange { ratio: f64, bounds: Bounds },
    #[error("Answer for {0} is needed before this step")]
    MissingEarlierAnswer(ParameterField),
}

/// Optional overrides for the smart lights' power profile. Anything left unset keeps the value
/// suggested from the existing installation.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SmartLightSettings {
    pub high_wattage: Option<f64>,
    pub low_wattage: Option<f64>,
    pub high_power_ratio: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IntakeState {
    step: IntakeStep,
    parameters: InstallationParameters,
}

impl IntakeState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn step(&self) -> IntakeStep {
        self.step
    }

    pub fn parameters(&self) -> &InstallationParameters {
        &self.parameters
    }

    /// Fraction of the intake completed, from 0 at the first question to 1 at the results.
    pub fn progress(&self) -> f64 {
        self.step.index() as f64 / (IntakeStep::COUNT - 1) as f64
    }

    /// Go back one step, keeping every answer given so far.
    pub fn back(&mut self) {
        self.move_to(self.step.previous());
    }

    /// Start again from the first question, keeping previous answers as defaults.
    pub fn restart(&mut self) {
        self.move_to(IntakeStep::ProjectName);
    }

    pub fn submit_project_name(&mut self, project_name: &str) -> Result<(), IntakeError> {
        self.expect_step(IntakeStep::ProjectName)?;

        let project_name = project_name.trim();
        if project_name.is_empty() {
            return Err(IntakeError::EmptyProjectName);
        }

        self.parameters.project_name = Some(project_name.to_string());
        self.advance();
        Ok(())
    }

    pub fn submit_total_lights(&mut self, total_lights: u32) -> Result<(), IntakeError> {
        self.expect_step(IntakeStep::TotalLights)?;
        validate_input(ParameterField::TotalLights, total_lights as f64)?;

        // a kept schedule must still fit within the installation
        let schedule_exceeds_total = self
            .parameters
            .operation_schedule
            .iter()
            .flatten()
            .any(|period| period.lights_on > total_lights);
        if schedule_exceeds_total {
            debug!(
                total_lights,
                "Dropping kept schedule with more lights on than are installed"
            );
            self.parameters.unset(ParameterField::OperationSchedule);
        }

        self.parameters.total_lights = Some(total_lights);
        self.advance();
        Ok(())
    }

    /// Record the wattage of the existing fixtures, and suggest a power profile for the smart
    /// lights replacing them.
    pub fn submit_original_wattage(
        &mut self,
        original_wattage: f64,
        policy: &IntakePolicy,
    ) -> Result<(), IntakeError> {
        self.expect_step(IntakeStep::OriginalWattage)?;

        if !policy.supported_original_wattage.contains(original_wattage) {
            return Err(IntakeError::UnsupportedFixture {
                wattage: original_wattage,
                supported: policy.supported_original_wattage,
            });
        }
        validate_input(ParameterField::OriginalWattage, original_wattage)?;

        self.parameters.original_wattage = Some(original_wattage);
        self.parameters.smart_high_wattage = Some(default_high_wattage(original_wattage) as f64);
        self.parameters.smart_low_wattage = Some(policy.default_low_wattage);
        self.advance();
        Ok(())
    }

    pub fn submit_electricity_rate(&mut self, electricity_rate: f64) -> Result<(), IntakeError> {
        self.expect_step(IntakeStep::ElectricityRate)?;
        validate_input(ParameterField::ElectricityRate, electricity_rate)?;

        self.parameters.electricity_rate = Some(electricity_rate);
        self.advance();
        Ok(())
    }

    pub fn submit_schedule(
        &mut self,
        entries: &[ScheduleEntry],
        policy: &IntakePolicy,
    ) -> Result<(), IntakeError> {
        self.expect_step(IntakeStep::OperationSchedule)?;
        let total_lights = self
            .parameters
            .total_lights
            .ok_or(IntakeError::MissingEarlierAnswer(ParameterField::TotalLights))?;

        if entries.is_empty() {
            return Err(ScheduleError::NoPeriods.into());
        }
        if entries.len() > policy.max_periods {
            return Err(ScheduleError::TooManyPeriods {
                count: entries.len(),
                max: policy.max_periods,
            }
            .into());
        }

        let periods = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let period = entry.to_period(policy.duration_decimal_places)?;
                check_period(idx + 1, &period, total_lights)?;
                Ok(period)
            })
            .collect::<Result<Vec<_>, ScheduleError>>()?;

        check_schedule_total(&periods, policy.schedule_total_tolerance_hours)?;

        self.parameters.operation_schedule = Some(periods);
        self.advance();
        Ok(())
    }

    pub fn submit_smart_settings(
        &mut self,
        settings: SmartLightSettings,
        policy: &IntakePolicy,
    ) -> Result<(), IntakeError> {
        self.expect_step(IntakeStep::SmartLightSettings)?;
        let original_wattage = self
            .parameters
            .original_wattage
            .ok_or(IntakeError::MissingEarlierAnswer(
                ParameterField::OriginalWattage,
            ))?;

        let high_wattage = settings
            .high_wattage
            .or(self.parameters.smart_high_wattage)
            .unwrap_or_else(|| default_high_wattage(original_wattage) as f64);
        let low_wattage = settings
            .low_wattage
            .or(self.parameters.smart_low_wattage)
            .unwrap_or(policy.default_low_wattage);

        validate_input(ParameterField::SmartHighWattage, high_wattage)?;
        validate_input(ParameterField::SmartLowWattage, low_wattage)?;
        if let Some(ratio) = settings.high_power_ratio {
            if !policy.high_power_ratio.contains(ratio) {
                return Err(IntakeError::HighPowerRatioOutOfRange {
                    ratio,
                    bounds: policy.high_power_ratio,
                });
            }
        }

        self.parameters.smart_high_wattage = Some(high_wattage);
        self.parameters.smart_low_wattage = Some(low_wattage);
        if settings.high_power_ratio.is_some() {
            self.parameters.high_power_ratio = settings.high_power_ratio;
        }
        self.advance();
        Ok(())
    }

    /// Calculate savings from the answers gathered so far. `Ok(None)` means the intake has not
    /// gathered every required answer yet.
    pub fn calculate(&self) -> Result<Option<SavingsResult>, CalculationError> {
        calculate_savings(&self.parameters)
    }

    fn expect_step(&self, submitted: IntakeStep) -> Result<(), IntakeError> {
        if self.step == submitted {
            Ok(())
        } else {
            Err(IntakeError::WrongStep {
                current: self.step,
                submitted,
            })
        }
    }

    fn advance(&mut self) {
        self.move_to(self.step.next());
    }

    fn move_to(&mut self, step: IntakeStep) {
        debug!(from = %self.step, to = %step, "Intake moved step");
        self.step = step;
    }
}

fn check_period(
    period_number: usize,
    period: &Period,
    total_lights: u32,
) -> Result<(), ScheduleError> {
    if !period.duration_hours.is_finite() || period.duration_hours < 0. {
        return Err(ScheduleError::InvalidDuration {
            period_number,
            duration_hours: period.duration_hours,
        });
    }
    if period.lights_on > total_lights {
        return Err(ScheduleError::TooManyLightsOn {
            period_number,
            lights_on: period.lights_on,
            total_lights,
        });
    }
    Ok(())
}
