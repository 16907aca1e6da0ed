use cosmwasm_std::StdError;
use icco::error::{CommonError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContributorError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Common(#[from] CommonError),

    #[error("AlreadyClaimed")]
    AlreadyClaimed,

    #[error("ContributionWindowClosed")]
    ContributionWindowClosed,

    #[error("InvalidConductor")]
    InvalidConductor,

    #[error("InvalidTokenDecimals")]
    InvalidTokenDecimals,

    #[error("NotInitialized")]
    NotInitialized,

    #[error("NothingToClaim")]
    NothingToClaim,

    #[error("SaleAlreadyExists")]
    SaleAlreadyExists,

    #[error("SaleNotAborted")]
    SaleNotAborted,

    #[error("SaleNotActive")]
    SaleNotActive,

    #[error("SaleNotAttestable")]
    SaleNotAttestable,

    #[error("SaleNotFound")]
    SaleNotFound,

    #[error("SaleNotSealed")]
    SaleNotSealed,

    #[error("UnknownToken")]
    UnknownToken,

    #[error("WrongChain")]
    WrongChain,

    #[error("ZeroAmount")]
    ZeroAmount,
}

impl ContributorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContributorError::Std(_) | ContributorError::NotInitialized => ErrorKind::Internal,
            ContributorError::Common(err) => err.kind(),
            ContributorError::AlreadyClaimed
            | ContributorError::NothingToClaim
            | ContributorError::SaleNotAborted
            | ContributorError::SaleNotSealed => ErrorKind::Claim,
            _ => ErrorKind::ProtocolViolation,
        }
    }

    pub fn std(&self) -> StdError {
        StdError::generic_err(format!("{}", self))
    }

    pub fn std_err<T>(&self) -> Result<T, StdError> {
        Err(self.std())
    }
}
