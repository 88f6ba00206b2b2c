// Range checks applied to individual installation parameters as they are collected.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum::{EnumIter, EnumString};
use thiserror::Error;

/// Identifies a single installation parameter.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParameterField {
    ProjectName,
    TotalLights,
    OriginalWattage,
    ElectricityRate,
    OperationSchedule,
    SmartHighWattage,
    SmartLowWattage,
    HighPowerRatio,
}

impl ParameterField {
    /// The inclusive bounds a numeric value for this field must fall within, or `None` for fields
    /// that are checked by other means (e.g. the schedule, which is checked as a whole).
    pub const fn bounds(&self) -> Option<Bounds> {
        match self {
            ParameterField::TotalLights => Some(Bounds::new(1., 10_000.)),
            ParameterField::OriginalWattage => Some(Bounds::new(1., 400.)),
            ParameterField::ElectricityRate => Some(Bounds::new(0.1, 1.0)),
            ParameterField::SmartHighWattage => Some(Bounds::new(5., 20.)),
            ParameterField::SmartLowWattage => Some(Bounds::new(1., 5.)),
            ParameterField::ProjectName
            | ParameterField::OperationSchedule
            | ParameterField::HighPowerRatio => None,
        }
    }

    /// Whether a savings calculation needs this field to be set.
    pub const fn is_required(&self) -> bool {
        !matches!(self, ParameterField::HighPowerRatio)
    }
}

/// An inclusive numeric range.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "between {} and {}", self.min, self.max)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Input value for {field} should be {bounds} (was {value})")]
    OutOfRange {
        field: ParameterField,
        bounds: Bounds,
        value: f64,
    },
    #[error("Input value '{value}' for {field} could not be interpreted as a number")]
    NotNumeric { field: ParameterField, value: String },
}

impl ValidationError {
    /// The permitted bounds, when the failure was a range violation.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            ValidationError::OutOfRange { bounds, .. } => Some(*bounds),
            ValidationError::NotNumeric { .. } => None,
        }
    }
}

/// Check a numeric value against the bounds table. Fields without bounds always pass.
pub fn validate_input(field: ParameterField, value: f64) -> Result<(), ValidationError> {
    match field.bounds() {
        Some(bounds) if !bounds.contains(value) => Err(ValidationError::OutOfRange {
            field,
            bounds,
            value,
        }),
        _ => Ok(()),
    }
}

/// Check a raw, user-entered value for a field identified by name.
///
/// Names that do not identify a bounded field pass through untouched, as does any value for such
/// a field, since those are validated elsewhere.
pub fn validate_named_input(field_name: &str, raw_value: &str) -> Result<(), ValidationError> {
    let Ok(field) = ParameterField::from_str(field_name) else {
        return Ok(());
    };
    if field.bounds().is_none() {
        return Ok(());
    }

    let value = raw_value
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotNumeric {
            field,
            value: raw_value.to_string(),
        })?;

    validate_input(field, value)
}
