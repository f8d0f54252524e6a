//! Structured values the bridge hands upward, plus the closed tag tables.

use serde::Serialize;

use crate::abi;
use crate::error::BridgeError;

fn unknown_tag(what: &str, tag: u32) -> BridgeError {
    tracing::error!(tag, "engine returned unknown {what} tag");
    BridgeError::marshalling(format!("unknown {what} tag {tag}"))
}

/// Discriminant of [`RefreshMode`] as it crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshModeTag {
    DefaultThreshold,
    ThresholdBlocks,
    ThresholdHours,
    Counterparty,
    All,
    Specific,
}

impl RefreshModeTag {
    pub const ALL: [RefreshModeTag; 6] = [
        RefreshModeTag::DefaultThreshold,
        RefreshModeTag::ThresholdBlocks,
        RefreshModeTag::ThresholdHours,
        RefreshModeTag::Counterparty,
        RefreshModeTag::All,
        RefreshModeTag::Specific,
    ];

    pub fn as_u32(self) -> u32 {
        match self {
            RefreshModeTag::DefaultThreshold => abi::REFRESH_DEFAULT_THRESHOLD,
            RefreshModeTag::ThresholdBlocks => abi::REFRESH_THRESHOLD_BLOCKS,
            RefreshModeTag::ThresholdHours => abi::REFRESH_THRESHOLD_HOURS,
            RefreshModeTag::Counterparty => abi::REFRESH_COUNTERPARTY,
            RefreshModeTag::All => abi::REFRESH_ALL,
            RefreshModeTag::Specific => abi::REFRESH_SPECIFIC,
        }
    }
}

impl TryFrom<u32> for RefreshModeTag {
    type Error = BridgeError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            abi::REFRESH_DEFAULT_THRESHOLD => Ok(RefreshModeTag::DefaultThreshold),
            abi::REFRESH_THRESHOLD_BLOCKS => Ok(RefreshModeTag::ThresholdBlocks),
            abi::REFRESH_THRESHOLD_HOURS => Ok(RefreshModeTag::ThresholdHours),
            abi::REFRESH_COUNTERPARTY => Ok(RefreshModeTag::Counterparty),
            abi::REFRESH_ALL => Ok(RefreshModeTag::All),
            abi::REFRESH_SPECIFIC => Ok(RefreshModeTag::Specific),
            other => Err(unknown_tag("refresh mode", other)),
        }
    }
}

/// Which VTXOs a refresh round should pick up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMode {
    DefaultThreshold,
    ThresholdBlocks(u32),
    ThresholdHours(u32),
    Counterparty,
    All,
    Specific(Vec<String>),
}

impl RefreshMode {
    pub fn tag(&self) -> RefreshModeTag {
        match self {
            RefreshMode::DefaultThreshold => RefreshModeTag::DefaultThreshold,
            RefreshMode::ThresholdBlocks(_) => RefreshModeTag::ThresholdBlocks,
            RefreshMode::ThresholdHours(_) => RefreshModeTag::ThresholdHours,
            RefreshMode::Counterparty => RefreshModeTag::Counterparty,
            RefreshMode::All => RefreshModeTag::All,
            RefreshMode::Specific(_) => RefreshModeTag::Specific,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundState {
    Pending,
    Unconfirmed,
    Confirmed,
    Failed,
}

impl RoundState {
    pub fn is_final(self) -> bool {
        matches!(self, RoundState::Confirmed | RoundState::Failed)
    }

    pub fn is_success(self) -> bool {
        matches!(self, RoundState::Unconfirmed | RoundState::Confirmed)
    }
}

impl TryFrom<u32> for RoundState {
    type Error = BridgeError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            abi::ROUND_PENDING => Ok(RoundState::Pending),
            abi::ROUND_UNCONFIRMED => Ok(RoundState::Unconfirmed),
            abi::ROUND_CONFIRMED => Ok(RoundState::Confirmed),
            abi::ROUND_FAILED => Ok(RoundState::Failed),
            other => Err(unknown_tag("round state", other)),
        }
    }
}

/// Outcome of any operation that takes part in an Ark round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundStatus {
    pub state: RoundState,
    pub funding_txid: Option<String>,
    pub unsigned_funding_txids: Vec<String>,
    /// Present only when `state` is `Failed`.
    pub error: Option<String>,
    pub is_final: bool,
    pub is_success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Bolt11,
    Lnurl,
    Arkoor,
    Onchain,
}

impl TryFrom<u32> for PaymentKind {
    type Error = BridgeError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            abi::PAYMENT_BOLT11 => Ok(PaymentKind::Bolt11),
            abi::PAYMENT_LNURL => Ok(PaymentKind::Lnurl),
            abi::PAYMENT_ARKOOR => Ok(PaymentKind::Arkoor),
            abi::PAYMENT_ONCHAIN => Ok(PaymentKind::Onchain),
            other => Err(unknown_tag("payment kind", other)),
        }
    }
}

/// Result of `send`, shaped by the kind of destination that was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "payment_type")]
pub enum PaymentResult {
    Bolt11 {
        bolt11_invoice: String,
        preimage: Option<String>,
    },
    Lnurl {
        lnurl: String,
        bolt11_invoice: String,
        preimage: Option<String>,
    },
    Arkoor {
        destination_pubkey: String,
        amount_sat: u64,
    },
    Onchain {
        txid: String,
        amount_sat: u64,
        destination_address: String,
    },
}

impl PaymentResult {
    pub fn kind(&self) -> PaymentKind {
        match self {
            PaymentResult::Bolt11 { .. } => PaymentKind::Bolt11,
            PaymentResult::Lnurl { .. } => PaymentKind::Lnurl,
            PaymentResult::Arkoor { .. } => PaymentKind::Arkoor,
            PaymentResult::Onchain { .. } => PaymentKind::Onchain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArkInfo {
    pub network: String,
    pub server_pubkey: String,
    pub round_interval_secs: u64,
    pub vtxo_exit_delta: u16,
    pub vtxo_expiry_delta: u16,
    pub htlc_expiry_delta: u16,
    pub max_vtxo_amount_sat: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Balance {
    pub onchain: u64,
    pub offchain: u64,
    pub pending_exit: u64,
}

impl From<abi::AbiBalance> for Balance {
    fn from(b: abi::AbiBalance) -> Self {
        Self { onchain: b.onchain, offchain: b.offchain, pending_exit: b.pending_exit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendManyOutput {
    pub destination: String,
    pub amount_sat: u64,
}

/// A fresh invoice. `payment_hash` is what `try_claim_lightning_receive` takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bolt11Invoice {
    pub bolt11_invoice: String,
    pub payment_secret: String,
    pub payment_hash: String,
}

/// Keys at a derivation index, hex encoded.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct KeyPair {
    pub public_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
