use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// The diagnosis value the evaluator uses for a successful application.
pub const APPROVED: &str = "Approved";

/// Request payload sent to the evaluator's `POST /evaluate`.
///
/// Numeric fields travel as the raw strings typed into the form; parsing is
/// left to the evaluator (see [`ApplicantProfile`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub is_sri_lankan: bool,
    pub loan_type: String,
    pub age: String,
    pub income: String,
    pub dti: String,
    pub crib_score: String,
    pub has_previous_arrears: bool,
}

/// Response payload returned by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub diagnosis: String,
    pub category: String,
    pub details: Vec<String>,
}

impl EvaluationResponse {
    /// Only the exact literal "Approved" counts; everything else is a rejection.
    pub fn is_approved(&self) -> bool {
        self.diagnosis == APPROVED
    }
}

/// Loan categories mapped to the schemes offered under each, as served by
/// the evaluator's `GET /schemes`.
pub type LoanSchemes = BTreeMap<String, Vec<String>>;

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

/// An [`EvaluationRequest`] with its numeric strings parsed.
///
/// The form client itself never parses these values. This is the reading an
/// [`Evaluator`](crate::client::Evaluator) implementation applies to the same
/// request contract, turning a bad field into a rejection it can explain.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantProfile {
    pub is_sri_lankan: bool,
    pub loan_type: String,
    pub age: u32,
    pub income: f64,
    pub dti: f64,
    pub crib_score: u32,
    pub has_previous_arrears: bool,
}

impl TryFrom<&EvaluationRequest> for ApplicantProfile {
    type Error = ProfileError;

    fn try_from(request: &EvaluationRequest) -> Result<Self, Self::Error> {
        let loan_type = request.loan_type.trim();
        if loan_type.is_empty() {
            return Err(ProfileError::Blank { field: "loanType" });
        }

        Ok(Self {
            is_sri_lankan: request.is_sri_lankan,
            loan_type: loan_type.to_string(),
            age: parse_field("age", &request.age)?,
            income: parse_non_negative("income", &request.income)?,
            dti: parse_non_negative("dti", &request.dti)?,
            crib_score: parse_field("cribScore", &request.crib_score)?,
            has_previous_arrears: request.has_previous_arrears,
        })
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ProfileError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::Blank { field });
    }
    trimmed.parse().map_err(|_| ProfileError::NotNumeric {
        field,
        value: raw.to_string(),
    })
}

fn parse_non_negative(field: &'static str, raw: &str) -> Result<f64, ProfileError> {
    let value: f64 = parse_field(field, raw)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ProfileError::OutOfRange {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}
