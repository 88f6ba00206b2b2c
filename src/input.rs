use crate::core::savings::DEFAULT_HIGH_POWER_RATIO;
use crate::core::schedule::input::ScheduleEntry;
use crate::core::schedule::Period;
use crate::core::validation::ParameterField;
use crate::intake::{IntakeError, IntakePolicy, IntakeState, SmartLightSettings};
use crate::proposals::ProposalTerms;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};
use strum::IntoEnumIterator;

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

/// The parameters describing an installation, any of which may not have been collected yet.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstallationParameters {
    pub project_name: Option<String>,
    pub total_lights: Option<u32>,
    pub original_wattage: Option<f64>,
    pub electricity_rate: Option<f64>,
    pub operation_schedule: Option<Vec<Period>>,
    pub smart_high_wattage: Option<f64>,
    pub smart_low_wattage: Option<f64>,
    pub high_power_ratio: Option<f64>,
}

impl InstallationParameters {
    pub fn is_set(&self, field: ParameterField) -> bool {
        match field {
            ParameterField::ProjectName => self.project_name.is_some(),
            ParameterField::TotalLights => self.total_lights.is_some(),
            ParameterField::OriginalWattage => self.original_wattage.is_some(),
            ParameterField::ElectricityRate => self.electricity_rate.is_some(),
            ParameterField::OperationSchedule => self.operation_schedule.is_some(),
            ParameterField::SmartHighWattage => self.smart_high_wattage.is_some(),
            ParameterField::SmartLowWattage => self.smart_low_wattage.is_some(),
            ParameterField::HighPowerRatio => self.high_power_ratio.is_some(),
        }
    }

    /// Required fields that have not been set, in intake order.
    pub fn missing_fields(&self) -> Vec<ParameterField> {
        ParameterField::iter()
            .filter(|field| field.is_required() && !self.is_set(*field))
            .collect()
    }

    pub fn unset(&mut self, field: ParameterField) {
        match field {
            ParameterField::ProjectName => self.project_name = None,
            ParameterField::TotalLights => self.total_lights = None,
            ParameterField::OriginalWattage => self.original_wattage = None,
            ParameterField::ElectricityRate => self.electricity_rate = None,
            ParameterField::OperationSchedule => self.operation_schedule = None,
            ParameterField::SmartHighWattage => self.smart_high_wattage = None,
            ParameterField::SmartLowWattage => self.smart_low_wattage = None,
            ParameterField::HighPowerRatio => self.high_power_ratio = None,
        }
    }

    /// A view with every required field present, or `None` if any is missing.
    pub fn complete(&self) -> Option<CompleteParameters<'_>> {
        Some(CompleteParameters {
            project_name: self.project_name.as_deref()?,
            total_lights: self.total_lights?,
            original_wattage: self.original_wattage?,
            electricity_rate: self.electricity_rate?,
            operation_schedule: self.operation_schedule.as_deref()?,
            smart_high_wattage: self.smart_high_wattage?,
            smart_low_wattage: self.smart_low_wattage?,
            high_power_ratio: self.high_power_ratio.unwrap_or(DEFAULT_HIGH_POWER_RATIO),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompleteParameters<'a> {
    pub project_name: &'a str,
    pub total_lights: u32,
    pub original_wattage: f64,
    pub electricity_rate: f64,
    pub operation_schedule: &'a [Period],
    pub smart_high_wattage: f64,
    pub smart_low_wattage: f64,
    pub high_power_ratio: f64,
}

/// A savings project as provided in a JSON input file. Answers can be left out, in which case
/// processing stops at the first unanswered intake step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Input {
    pub project_name: Option<String>,
    pub total_lights: Option<u32>,
    pub original_wattage: Option<f64>,
    pub electricity_rate: Option<f64>,
    pub operation_schedule: Option<Vec<ScheduleEntry>>,
    /// Overrides the high power wattage suggested from the original fixtures.
    pub smart_high_wattage: Option<f64>,
    pub smart_low_wattage: Option<f64>,
    pub high_power_ratio: Option<f64>,
    #[serde(default)]
    pub policy: IntakePolicy,
    #[serde(default)]
    pub proposals: ProposalTerms,
}

#[derive(Clone, Debug)]
pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: Input = serde_json::from_reader(reader)?;

        Ok(Self { input })
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.input.policy
    }

    pub fn proposal_terms(&self) -> &ProposalTerms {
        &self.input.proposals
    }

    /// Feed the answers in the input through a fresh intake, in step order. The intake is left at
    /// the first step the input has no answer for.
    pub fn replay_intake(&self) -> Result<IntakeState, IntakeError> {
        let mut intake = IntakeState::new();
        self.replay_answers(&mut intake)?;
        Ok(intake)
    }

    fn replay_answers(&self, intake: &mut IntakeState) -> Result<(), IntakeError> {
        let input = &self.input;
        let policy = &input.policy;

        let Some(project_name) = &input.project_name else {
            return Ok(());
        };
        intake.submit_project_name(project_name)?;

        let Some(total_lights) = input.total_lights else {
            return Ok(());
        };
        intake.submit_total_lights(total_lights)?;

        let Some(original_wattage) = input.original_wattage else {
            return Ok(());
        };
        intake.submit_original_wattage(original_wattage, policy)?;

        let Some(electricity_rate) = input.electricity_rate else {
            return Ok(());
        };
        intake.submit_electricity_rate(electricity_rate)?;

        let Some(schedule) = &input.operation_schedule else {
            return Ok(());
        };
        intake.submit_schedule(schedule, policy)?;

        intake.submit_smart_settings(
            SmartLightSettings {
                high_wattage: input.smart_high_wattage,
                low_wattage: input.smart_low_wattage,
                high_power_ratio: input.high_power_ratio,
            },
            policy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::IntakeStep;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::fs::File;
    use walkdir::WalkDir;

    fn input_from(value: serde_json::Value) -> InputForProcessing {
        ingest_for_processing(value.to_string().as_bytes()).unwrap()
    }

    #[rstest]
    fn should_successfully_parse_all_demo_files() {
        for entry in WalkDir::new("./demos/input")
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
            })
        {
            let parsed = ingest_for_processing(File::open(entry.path()).unwrap());
            assert!(
                parsed.is_ok(),
                "error was {:?} when parsing file {}",
                parsed.err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
        }
    }

    #[rstest]
    fn should_reject_unknown_fields() {
        let parsed = ingest_for_processing(
            json!({"project_name": "Depot", "lumens": 900})
                .to_string()
                .as_bytes(),
        );
        assert!(parsed.is_err());
    }

    #[rstest]
    fn should_replay_complete_input_through_to_results() {
        let input = input_from(json!({
            "project_name": "Car park",
            "total_lights": 500,
            "original_wattage": 18,
            "electricity_rate": 0.3,
            "operation_schedule": [{"start": "00:00", "end": "23:59", "lights_on": 500}]
        }));
        let intake = input.replay_intake().unwrap();

        assert_eq!(intake.step(), IntakeStep::Results);
        assert_eq!(intake.parameters().smart_high_wattage, Some(10.));
        assert_eq!(intake.parameters().smart_low_wattage, Some(2.));
        assert!(intake.parameters().missing_fields().is_empty());
    }

    #[rstest]
    fn should_stop_replay_at_first_missing_answer() {
        let input = input_from(json!({
            "project_name": "Car park",
            "total_lights": 500,
            "electricity_rate": 0.3
        }));
        let intake = input.replay_intake().unwrap();

        assert_eq!(intake.step(), IntakeStep::OriginalWattage);
        assert_eq!(intake.parameters().electricity_rate, None);
        assert_eq!(
            intake.parameters().missing_fields(),
            vec![
                ParameterField::OriginalWattage,
                ParameterField::ElectricityRate,
                ParameterField::OperationSchedule,
                ParameterField::SmartHighWattage,
                ParameterField::SmartLowWattage,
            ]
        );
    }

    #[rstest]
    fn should_apply_policy_from_input() {
        let input = input_from(json!({
            "project_name": "Stadium",
            "total_lights": 40,
            "original_wattage": 250,
            "policy": {"supported_original_wattage": {"min": 10, "max": 400}}
        }));

        assert_eq!(input.policy().max_periods, 5);
        assert_eq!(
            input.replay_intake().unwrap().step(),
            IntakeStep::ElectricityRate
        );
    }

    #[rstest]
    fn should_fail_replay_on_rejected_answer() {
        let input = input_from(json!({
            "project_name": "Stadium",
            "total_lights": 40,
            "original_wattage": 250
        }));
        assert!(matches!(
            input.replay_intake(),
            Err(IntakeError::UnsupportedFixture { .. })
        ));
    }

    #[rstest]
    fn should_default_high_power_ratio_in_complete_view() {
        let parameters = InstallationParameters {
            project_name: Some("Depot".to_string()),
            total_lights: Some(1),
            original_wattage: Some(18.),
            electricity_rate: Some(0.3),
            operation_schedule: Some(vec![]),
            smart_high_wattage: Some(10.),
            smart_low_wattage: Some(2.),
            high_power_ratio: None,
        };

        let complete = parameters.complete().unwrap();
        assert_eq!(complete.high_power_ratio, DEFAULT_HIGH_POWER_RATIO);
        assert!(complete.operation_schedule.is_empty());
    }
}
