use std::fmt;

use lakevend_commons::ModelError;
use thiserror::Error;

/// Result type for vending operations.
pub type Result<T> = std::result::Result<T, VendError>;

/// Step of the vend flow an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendStep {
    Grant,
    Identify,
    Assume,
    Credentialize,
    Metadata,
}

impl fmt::Display for VendStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VendStep::Grant => "grant",
            VendStep::Identify => "identify",
            VendStep::Assume => "assume-role",
            VendStep::Credentialize => "credentialize",
            VendStep::Metadata => "table-metadata",
        };
        f.write_str(s)
    }
}

/// Errors produced while vending credentials.
///
/// Only [`VendError::TransientPropagation`] is worth retrying; everything
/// else aborts the flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendError {
    /// Coordinating identity or grantee lacks the required rights.
    #[error("{step}: not authorized: {message}")]
    Authorization { step: VendStep, message: String },

    /// Bad table, column or argument values.
    #[error("invalid vend request: {0}")]
    Validation(String),

    /// The grant is not yet visible to the data-access service.
    #[error("{step}: grant not yet propagated: {message}")]
    TransientPropagation { step: VendStep, message: String },

    /// Any other failure of an external service call.
    #[error("{step}: service call failed: {message}")]
    Service { step: VendStep, message: String },
}

impl VendError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, VendError::TransientPropagation { .. })
    }

    pub fn authorization(step: VendStep, message: impl Into<String>) -> Self {
        VendError::Authorization {
            step,
            message: message.into(),
        }
    }

    pub fn service(step: VendStep, message: impl Into<String>) -> Self {
        VendError::Service {
            step,
            message: message.into(),
        }
    }
}

impl From<ModelError> for VendError {
    fn from(e: ModelError) -> Self {
        VendError::Validation(e.to_string())
    }
}

/// Map a service error code to the vend error taxonomy.
///
/// Access denials while requesting table credentials usually mean the grant
/// written a moment earlier has not propagated yet, so they are reported as
/// transient. The same code in any other step is an authorization failure.
pub fn classify_service_error(
    step: VendStep,
    code: Option<&str>,
    message: impl Into<String>,
) -> VendError {
    let message = message.into();
    let Some(code) = code else {
        return VendError::Service { step, message };
    };

    if code.starts_with("AccessDenied") {
        return if step == VendStep::Credentialize {
            VendError::TransientPropagation { step, message }
        } else {
            VendError::Authorization { step, message }
        };
    }

    match code {
        "PermissionTypeMismatchException"
        | "UnauthorizedOperation"
        | "UnrecognizedClientException"
        | "InvalidClientTokenId"
        | "ExpiredToken"
        | "ExpiredTokenException"
        | "RegionDisabledException" => VendError::Authorization { step, message },
        c if c.starts_with("InvalidInput")
            || c.starts_with("EntityNotFound")
            || c.starts_with("Validation")
            || c == "MalformedPolicyDocument"
            || c == "PackedPolicyTooLarge" =>
        {
            VendError::Validation(format!("{}: {}", step, message))
        }
        _ => VendError::Service { step, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_depends_on_step() {
        let grant = classify_service_error(VendStep::Grant, Some("AccessDeniedException"), "no");
        assert!(matches!(grant, VendError::Authorization { step: VendStep::Grant, .. }));
        assert!(!grant.is_retryable());

        let assume = classify_service_error(VendStep::Assume, Some("AccessDenied"), "trust");
        assert!(matches!(assume, VendError::Authorization { step: VendStep::Assume, .. }));

        let creds =
            classify_service_error(VendStep::Credentialize, Some("AccessDeniedException"), "x");
        assert!(matches!(creds, VendError::TransientPropagation { .. }));
        assert!(creds.is_retryable());
    }

    #[test]
    fn test_validation_codes() {
        for code in ["InvalidInputException", "EntityNotFoundException", "ValidationException"] {
            let err = classify_service_error(VendStep::Grant, Some(code), "bad column");
            assert!(matches!(err, VendError::Validation(_)), "{code}");
        }
    }

    #[test]
    fn test_unknown_and_missing_codes_are_service_errors() {
        let err = classify_service_error(VendStep::Metadata, Some("InternalServiceException"), "boom");
        assert!(matches!(err, VendError::Service { step: VendStep::Metadata, .. }));

        let err = classify_service_error(VendStep::Identify, None, "dispatch failure");
        assert!(matches!(err, VendError::Service { .. }));
    }

    #[test]
    fn test_display_names_step() {
        let err = VendError::authorization(VendStep::Assume, "tag mismatch");
        assert_eq!(err.to_string(), "assume-role: not authorized: tag mismatch");
    }
}
