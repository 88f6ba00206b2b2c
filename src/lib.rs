pub mod core;
pub mod errors;
pub mod input;
pub mod intake;
pub mod output;
pub mod proposals;
mod report;

#[macro_use]
extern crate is_close;

use crate::core::savings::{calculate_savings_for, SavingsResult};
use crate::core::validation::ParameterField;
pub use crate::errors::LightingError;
use crate::errors::ReportingError;
use crate::input::{ingest_for_processing, InstallationParameters};
use crate::output::Output;
use crate::proposals::{compare_systems, evaluate_proposals, Proposals, SystemComparison};
use crate::report::write_report;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{info, instrument};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct ProjectFlags: u32 {
        const PERIOD_DETAILS = 0b1;
        const PROPOSALS = 0b10;
    }
}

/// Everything produced by a run whose intake gathered every required answer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SavingsResponse {
    pub project_name: String,
    /// The parameters the savings were calculated from, with defaults applied.
    pub parameters: InstallationParameters,
    pub savings: SavingsResult,
    pub system_comparison: SystemComparison,
    pub proposals: Option<Proposals>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Complete(Box<SavingsResponse>),
    /// The input stopped short of an answer the calculation needs.
    Unavailable { missing: Vec<ParameterField> },
}

#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    flags: &ProjectFlags,
) -> Result<RunOutcome, LightingError> {
    let input_for_processing = ingest_for_processing(input)?;
    let intake = input_for_processing.replay_intake()?;

    let Some(complete) = intake.parameters().complete() else {
        let missing = intake.parameters().missing_fields();
        info!(
            step = %intake.step(),
            ?missing,
            "Input is incomplete, so savings are unavailable"
        );
        return Ok(RunOutcome::Unavailable { missing });
    };
    let savings = calculate_savings_for(&complete)?;
    let (project_name, total_lights, electricity_rate) = (
        complete.project_name.to_string(),
        complete.total_lights,
        complete.electricity_rate,
    );

    let parameters = InstallationParameters {
        high_power_ratio: Some(complete.high_power_ratio),
        ..intake.parameters().clone()
    };

    let proposals = if flags.contains(ProjectFlags::PROPOSALS) {
        Some(evaluate_proposals(
            input_for_processing.proposal_terms(),
            &savings,
            total_lights,
        )?)
    } else {
        None
    };

    let response = SavingsResponse {
        project_name,
        system_comparison: compare_systems(&savings, electricity_rate),
        parameters,
        savings,
        proposals,
    };

    write_report(&output, &response, flags).map_err(ReportingError::new)?;

    info!(
        project = %response.project_name,
        annual_savings_sgd = response.savings.annual_savings_sgd,
        "Savings calculated"
    );

    Ok(RunOutcome::Complete(Box::new(response)))
}
