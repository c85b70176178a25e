//! Error types for Arcade Lender

use thiserror::Error;

/// Core errors that can occur in Arcade Lender
#[derive(Debug, Error)]
pub enum Error {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Offer error: {0}")]
    Offer(#[from] OfferError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Remote order-book and oracle errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Upstream unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Upstream returned status {status} for {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Submission rejected with status {status}: {body}")]
    SubmissionRejected { status: u16, body: String },

    #[error("Failed to parse response from {url}: {reason}")]
    ParseError { url: String, reason: String },
}

/// Offer construction and validation errors
#[derive(Debug, Error)]
pub enum OfferError {
    #[error("Unknown currency: {currency}")]
    UnknownCurrency { currency: String },

    #[error("Invalid LTV {value}: must be between 0 and 100 (exclusive)")]
    InvalidLtv { value: String },

    #[error("Invalid APR {value}: must be between 0 and 100 (exclusive)")]
    InvalidApr { value: String },

    #[error("Invalid duration {days} days: must be positive")]
    InvalidDuration { days: i64 },

    #[error("Repayment {repayment} must be greater than principal {principal}")]
    RepaymentNotGreaterThanPrincipal { principal: String, repayment: String },

    #[error("Invalid amount for {field}: {message}")]
    InvalidAmount { field: &'static str, message: String },

    #[error("Invalid address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Deadline {deadline} is not after current time {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    #[error("No usable price for collection {collection}")]
    PriceUnavailable { collection: String },

    #[error("Loan {loan_id} not found")]
    LoanNotFound { loan_id: String },
}

/// Typed-data signing errors
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Signer {signer} does not support typed-data signing")]
    Unsupported { signer: String },

    #[error("Invalid private key: {reason}")]
    InvalidKey { reason: String },

    #[error("Failed to encode typed data: {reason}")]
    Encoding { reason: String },

    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },
}

/// Result type alias for Arcade Lender operations
pub type Result<T> = std::result::Result<T, Error>;

impl ApiError {
    /// Get a stable error code for logs and reports
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "upstream_unreachable",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::SubmissionRejected { .. } => "submission_rejected",
            Self::ParseError { .. } => "parse_error",
        }
    }
}

impl OfferError {
    /// Get a stable error code for logs and reports
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCurrency { .. } => "unknown_currency",
            Self::InvalidLtv { .. }
            | Self::InvalidApr { .. }
            | Self::InvalidDuration { .. }
            | Self::RepaymentNotGreaterThanPrincipal { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidAddress { .. }
            | Self::DeadlineExpired { .. } => "invalid_input",
            Self::PriceUnavailable { .. } => "price_unavailable",
            Self::LoanNotFound { .. } => "loan_not_found",
        }
    }
}

impl SignerError {
    /// Get a stable error code for logs and reports
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unsupported { .. } => "signature_unsupported",
            Self::InvalidKey { .. } => "invalid_key",
            Self::Encoding { .. } => "typed_data_encoding",
            Self::SigningFailed { .. } => "signing_failed",
        }
    }
}

impl Error {
    /// Get a stable error code for logs and reports
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api(e) => e.error_code(),
            Self::Offer(e) => e.error_code(),
            Self::Signer(e) => e.error_code(),
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_error_codes() {
        let err = OfferError::InvalidLtv { value: "120".into() };
        assert_eq!(err.error_code(), "invalid_input");

        let err = OfferError::UnknownCurrency {
            currency: "BTC".into(),
        };
        assert_eq!(err.error_code(), "unknown_currency");
        assert_eq!(err.to_string(), "Unknown currency: BTC");
    }

    #[test]
    fn test_rejection_keeps_body_verbatim() {
        let body = r#"{"error":"nonce already used"}"#;
        let err: Error = ApiError::SubmissionRejected {
            status: 409,
            body: body.to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "submission_rejected");
        assert!(err.to_string().contains(body));
    }

    #[test]
    fn test_config_error_code() {
        let err = Error::Config("DUE_SOON_HOURS must be a number".into());
        assert_eq!(err.error_code(), "config");
        assert_eq!(
            err.to_string(),
            "Configuration error: DUE_SOON_HOURS must be a number"
        );
    }

    #[test]
    fn test_signer_unsupported_code() {
        let err: Error = SignerError::Unsupported {
            signer: "watch-only".into(),
        }
        .into();
        assert_eq!(err.error_code(), "signature_unsupported");
    }
}
