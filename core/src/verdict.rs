//! Two-level success/failure classification of registrar responses.
//!
//! # Design
//! The registrar can report `result: success` for the call as a whole while
//! individual domains in the batch failed. `classify` is a pure function over
//! the deserialized body and knows nothing about transport. A top-level
//! failure short-circuits the per-domain scan. Otherwise the first failing
//! domain in slice order wins and later failures are not reported.

use crate::error::ApiError;
use crate::types::{ApiResponse, SUCCESS_RESULT};

/// Outcome of a registrar call once both result levels are inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    TopLevelFailure {
        result: String,
        code: String,
        text: String,
    },
    DomainFailure {
        dname: String,
        result: String,
        code: String,
        text: String,
    },
}

/// Walk the top-level result, then the per-domain results, of a response.
pub fn classify(response: &ApiResponse) -> Verdict {
    if response.result != SUCCESS_RESULT {
        return Verdict::TopLevelFailure {
            result: response.result.clone(),
            code: response.error_code.clone(),
            text: response.error_text.clone(),
        };
    }

    let failed = response
        .answer
        .as_ref()
        .and_then(|answer| answer.domains.iter().find(|d| !d.is_success()));

    match failed {
        Some(domain) => Verdict::DomainFailure {
            dname: domain.dname.clone(),
            result: domain.result.clone(),
            code: domain.error_code.clone(),
            text: domain.error_text.clone(),
        },
        None => Verdict::Success,
    }
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Verdict::Success => Ok(()),
            Verdict::TopLevelFailure { result, code, text } => Err(ApiError::Api { result, code, text }),
            Verdict::DomainFailure {
                dname,
                result,
                code,
                text,
            } => Err(ApiError::Domain {
                dname,
                result,
                code,
                text,
            }),
        }
    }
}

impl ApiResponse {
    /// `Err` when the call failed at either level.
    pub fn has_error(&self) -> Result<(), ApiError> {
        classify(self).into_result()
    }
}
