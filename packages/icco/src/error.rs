use cosmwasm_std::StdError;
use thiserror::Error;

/// Coarse classification used by callers to decide between dropping a message
/// and escalating.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The body failed structural validation. Never retried.
    MalformedMessage,
    /// The transition is not valid for the current state or time.
    ProtocolViolation,
    /// A ledger invariant does not hold. Processing of the sale must stop.
    AccountingInconsistency,
    /// User-facing claim rejection.
    Claim,
    /// Storage, serialization or host failures.
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("MalformedMessage: {0}")]
    MalformedMessage(String),

    #[error("InvalidVaaAction")]
    InvalidVaaAction,

    #[error("RaiseBelowMinimum")]
    RaiseBelowMinimum,

    #[error("AccountingInconsistency: {0}")]
    AccountingInconsistency(String),

    #[error("AmountTooLarge")]
    AmountTooLarge,

    #[error("InvalidKycSignature")]
    InvalidKycSignature,
}

impl CommonError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        CommonError::MalformedMessage(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CommonError::MalformedMessage(_) => ErrorKind::MalformedMessage,
            CommonError::AccountingInconsistency(_) => ErrorKind::AccountingInconsistency,
            CommonError::InvalidVaaAction
            | CommonError::RaiseBelowMinimum
            | CommonError::AmountTooLarge
            | CommonError::InvalidKycSignature => ErrorKind::ProtocolViolation,
        }
    }

    pub fn std(&self) -> StdError {
        StdError::generic_err(format!("{}", self))
    }

    pub fn std_err<T>(&self) -> Result<T, StdError> {
        Err(self.std())
    }
}
