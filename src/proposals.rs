//! Commercial analyses built on top of a savings result: buying the smart lights outright, or
//! installing them under an energy management contract (EMC) where the client shares the savings.

use crate::core::savings::SavingsResult;
use crate::core::units::{round_for_presentation, DAYS_PER_YEAR, PROJECTION_YEARS};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("Commercial terms for {proposal} were invalid: {errors}")]
    InvalidTerms {
        proposal: &'static str,
        errors: String,
    },
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct ProposalTerms {
    pub direct_purchase: DirectPurchaseTerms,
    pub emc_contract: EmcContractTerms,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct DirectPurchaseTerms {
    #[validate(minimum = 0.)]
    pub light_price: f64,
    #[validate(minimum = 0.)]
    pub installation_cost_per_light: f64,
}

impl Default for DirectPurchaseTerms {
    fn default() -> Self {
        Self {
            light_price: 85.,
            installation_cost_per_light: 5.,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct EmcContractTerms {
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub client_cost_share_percent: f64,
    #[validate(minimum = 0.)]
    pub placement_fee_per_light: f64,
    #[validate(minimum = 0.)]
    pub installation_cost_per_light: f64,
}

impl Default for EmcContractTerms {
    fn default() -> Self {
        Self {
            client_cost_share_percent: 60.,
            placement_fee_per_light: 25.,
            installation_cost_per_light: 5.,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DirectPurchaseAnalysis {
    pub terms: DirectPurchaseTerms,
    pub initial_investment: f64,
    pub total_installation_cost: f64,
    pub six_year_roi: f64,
    /// Years for savings to cover the outlay; absent when the smart system saves nothing.
    pub payback_years: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EmcContractAnalysis {
    pub terms: EmcContractTerms,
    pub cost_saving_share: f64,
    pub total_placement_fee: f64,
    pub total_installation_cost: f64,
    pub total_benefit: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Proposals {
    pub direct_purchase: DirectPurchaseAnalysis,
    pub emc_contract: EmcContractAnalysis,
}

pub fn evaluate_proposals(
    terms: &ProposalTerms,
    savings: &SavingsResult,
    total_lights: u32,
) -> Result<Proposals, ProposalError> {
    Ok(Proposals {
        direct_purchase: direct_purchase(&terms.direct_purchase, savings, total_lights)?,
        emc_contract: emc_contract(&terms.emc_contract, savings, total_lights)?,
    })
}

pub fn direct_purchase(
    terms: &DirectPurchaseTerms,
    savings: &SavingsResult,
    total_lights: u32,
) -> Result<DirectPurchaseAnalysis, ProposalError> {
    terms
        .validate()
        .map_err(|errors| ProposalError::InvalidTerms {
            proposal: "direct purchase",
            errors: errors.to_string(),
        })?;

    let initial_investment = terms.light_price * total_lights as f64;
    let total_installation_cost = terms.installation_cost_per_light * total_lights as f64;
    let outlay = initial_investment + total_installation_cost;

    let payback_years = (savings.annual_savings_sgd > 0.)
        .then(|| round_for_presentation(outlay / savings.annual_savings_sgd));

    Ok(DirectPurchaseAnalysis {
        terms: terms.clone(),
        initial_investment: round_for_presentation(initial_investment),
        total_installation_cost: round_for_presentation(total_installation_cost),
        six_year_roi: round_for_presentation(savings.six_year_savings - outlay),
        payback_years,
    })
}

pub fn emc_contract(
    terms: &EmcContractTerms,
    savings: &SavingsResult,
    total_lights: u32,
) -> Result<EmcContractAnalysis, ProposalError> {
    terms
        .validate()
        .map_err(|errors| ProposalError::InvalidTerms {
            proposal: "EMC contract",
            errors: errors.to_string(),
        })?;

    let cost_saving_share = terms.client_cost_share_percent / 100. * savings.six_year_savings;
    let total_placement_fee = terms.placement_fee_per_light * total_lights as f64;
    let total_installation_cost = terms.installation_cost_per_light * total_lights as f64;

    Ok(EmcContractAnalysis {
        terms: terms.clone(),
        cost_saving_share: round_for_presentation(cost_saving_share),
        total_placement_fee: round_for_presentation(total_placement_fee),
        total_installation_cost: round_for_presentation(total_installation_cost),
        total_benefit: round_for_presentation(
            cost_saving_share - total_placement_fee - total_installation_cost,
        ),
    })
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SystemConsumption {
    pub daily_kwh: f64,
    pub annual_kwh: f64,
    pub annual_cost: f64,
}

impl SystemConsumption {
    fn from_daily(daily_kwh: f64, electricity_rate: f64) -> Self {
        let annual_kwh = daily_kwh * DAYS_PER_YEAR as f64;
        Self {
            daily_kwh,
            annual_kwh: round_for_presentation(annual_kwh),
            annual_cost: round_for_presentation(annual_kwh * electricity_rate),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SystemComparison {
    pub original: SystemConsumption,
    pub smart: SystemConsumption,
    pub six_year_energy_savings_kwh: f64,
}

pub fn compare_systems(savings: &SavingsResult, electricity_rate: f64) -> SystemComparison {
    SystemComparison {
        original: SystemConsumption::from_daily(
            savings.original_daily_consumption_kwh,
            electricity_rate,
        ),
        smart: SystemConsumption::from_daily(savings.smart_daily_consumption_kwh, electricity_rate),
        six_year_energy_savings_kwh: round_for_presentation(
            savings.annual_savings_kwh * PROJECTION_YEARS as f64,
        ),
    }
}
