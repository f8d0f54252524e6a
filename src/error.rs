//! Error taxonomy for the bridge.
//!
//! Inside the Typed Bridge Layer failures keep their category ([`BridgeError`]).
//! Everything above it sees a single shape, [`ArkError`], carrying only a message.

use serde::Serialize;

/// Failure raised by the Typed Bridge Layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// A value could not be encoded or decoded across the boundary. Always a bridge defect.
    #[error("Marshalling failure: {0}")]
    Marshalling(String),

    /// The engine returned an error envelope. The message is the engine's, verbatim.
    #[error("{0}")]
    Engine(String),

    /// A call was made in a state or with arguments that can never succeed.
    #[error("{0}")]
    Precondition(String),
}

impl BridgeError {
    pub fn marshalling(msg: impl Into<String>) -> Self {
        Self::Marshalling(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn no_wallet() -> Self {
        Self::Precondition(NO_WALLET_LOADED.to_string())
    }
}

pub const NO_WALLET_LOADED: &str = "No wallet is loaded";
pub const WALLET_ALREADY_LOADED: &str = "Wallet is already loaded. Close it first.";
pub const WALLET_TRANSITION_IN_PROGRESS: &str = "A wallet load or close is already in progress";

pub type BridgeResult<T> = Result<T, BridgeError>;

/// The uniform error every public operation rejects with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ArkError {
    pub message: String,
}

impl ArkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<BridgeError> for ArkError {
    fn from(err: BridgeError) -> Self {
        Self { message: err.to_string() }
    }
}

pub type ArkResult<T> = Result<T, ArkError>;
