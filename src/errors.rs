use crate::core::savings::CalculationError;
use crate::intake::IntakeError;
use crate::proposals::ProposalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LightingError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Answer in request was rejected: {0}")]
    IntakeRejected(#[from] IntakeError),
    #[error("Error identified during savings calculation: {0}")]
    FailureInCalculation(#[from] CalculationError),
    #[error("Error identified while evaluating proposals: {0}")]
    ErrorInProposals(#[from] ProposalError),
    #[error("Error during reporting: {0}")]
    ErrorInReporting(#[from] ReportingError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ReportingError {
    error: anyhow::Error,
}

impl ReportingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
