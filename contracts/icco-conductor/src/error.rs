use cosmwasm_std::StdError;
use icco::error::{CommonError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConductorError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Common(#[from] CommonError),

    #[error("ContributionAlreadyCollected")]
    ContributionAlreadyCollected,

    #[error("ContributionsNotCollected")]
    ContributionsNotCollected,

    #[error("IncompleteAttestation")]
    IncompleteAttestation,

    #[error("InvalidAcceptedTokens")]
    InvalidAcceptedTokens,

    #[error("InvalidAddress")]
    InvalidAddress,

    #[error("InvalidEmitter")]
    InvalidEmitter,

    #[error("InvalidRaise")]
    InvalidRaise,

    #[error("InvalidSaleTimes")]
    InvalidSaleTimes,

    #[error("NotInitialized")]
    NotInitialized,

    #[error("SaleNotActive")]
    SaleNotActive,

    #[error("SaleNotEnded")]
    SaleNotEnded,

    #[error("SaleNotFound")]
    SaleNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("UnknownToken")]
    UnknownToken,

    #[error("UnregisteredContributor")]
    UnregisteredContributor,

    #[error("WrongChain")]
    WrongChain,

    #[error("ZeroAmount")]
    ZeroAmount,
}

impl ConductorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConductorError::Std(_) | ConductorError::NotInitialized => ErrorKind::Internal,
            ConductorError::Common(err) => err.kind(),
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
