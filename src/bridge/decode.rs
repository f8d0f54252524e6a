//! Decoding flat ABI shapes into owned values.
//!
//! Result decoders run on engine-owned structs before their guard releases
//! them, so everything is copied. The argument decoders (`ConfigOptions`,
//! `CreateOptions`, `RefreshMode`) are the engine-facing half of the encoders
//! and are what an engine implementation uses to read its inputs.

use std::os::raw::c_char;

use crate::abi::{
    AbiArkInfo, AbiBolt11Invoice, AbiConfigOpts, AbiCreateOpts, AbiKeyPair, AbiPaymentResult, AbiRefreshOpts,
    AbiRoundStatus,
};
use crate::bridge::buffer::{copy_borrowed_str_array, copy_c_str, copy_c_str_array};
use crate::bridge::types::{
    ArkInfo, Bolt11Invoice, KeyPair, PaymentKind, PaymentResult, RefreshMode, RefreshModeTag, RoundState, RoundStatus,
};
use crate::config::{ConfigOptions, CreateOptions, Network};
use crate::error::{BridgeError, BridgeResult};

unsafe fn read_opt<T: Copy>(ptr: *const T) -> Option<T> {
    ptr.as_ref().copied()
}

unsafe fn required(field: &str, ptr: *const c_char) -> BridgeResult<String> {
    copy_c_str(ptr)?.ok_or_else(|| BridgeError::marshalling(format!("missing {field}")))
}

impl ConfigOptions {
    /// # Safety
    ///
    /// Every non-null pointer in `raw` must be valid for reads.
    pub unsafe fn from_abi(raw: &AbiConfigOpts) -> BridgeResult<Self> {
        Ok(Self {
            ark: copy_c_str(raw.ark)?,
            esplora: copy_c_str(raw.esplora)?,
            bitcoind: copy_c_str(raw.bitcoind)?,
            bitcoind_cookie: copy_c_str(raw.bitcoind_cookie)?,
            bitcoind_user: copy_c_str(raw.bitcoind_user)?,
            bitcoind_pass: copy_c_str(raw.bitcoind_pass)?,
            vtxo_refresh_expiry_threshold: read_opt(raw.vtxo_refresh_expiry_threshold),
            fallback_fee_rate: read_opt(raw.fallback_fee_rate),
            htlc_recv_claim_delta: read_opt(raw.htlc_recv_claim_delta),
            vtxo_exit_margin: read_opt(raw.vtxo_exit_margin),
            deep_round_confirmations: read_opt(raw.deep_round_confirmations),
        })
    }
}

impl CreateOptions {
    /// # Safety
    ///
    /// See [`ConfigOptions::from_abi`].
    pub unsafe fn from_abi(raw: &AbiCreateOpts) -> BridgeResult<Self> {
        let network = match (raw.bitcoin, raw.signet, raw.regtest) {
            (true, false, false) => Network::Bitcoin,
            (false, true, false) => Network::Signet,
            (false, false, true) => Network::Regtest,
            flags => {
                return Err(BridgeError::marshalling(format!(
                    "expected exactly one network flag (bitcoin, signet, regtest), got {flags:?}"
                )))
            }
        };
        Ok(Self {
            network,
            mnemonic: copy_c_str(raw.mnemonic)?,
            birthday_height: read_opt(raw.birthday_height),
            config: ConfigOptions::from_abi(&raw.config)?,
        })
    }
}

impl RefreshMode {
    /// Payload that does not belong to the tag is ignored, not validated.
    ///
    /// # Safety
    ///
    /// For the `Specific` tag, the id array must hold `num_specific_vtxo_ids`
    /// valid strings.
    pub unsafe fn from_abi(raw: &AbiRefreshOpts) -> BridgeResult<Self> {
        Ok(match RefreshModeTag::try_from(raw.mode_type)? {
            RefreshModeTag::DefaultThreshold => RefreshMode::DefaultThreshold,
            RefreshModeTag::ThresholdBlocks => RefreshMode::ThresholdBlocks(raw.threshold_value),
            RefreshModeTag::ThresholdHours => RefreshMode::ThresholdHours(raw.threshold_value),
            RefreshModeTag::Counterparty => RefreshMode::Counterparty,
            RefreshModeTag::All => RefreshMode::All,
            RefreshModeTag::Specific => RefreshMode::Specific(copy_borrowed_str_array(
                raw.specific_vtxo_ids,
                raw.num_specific_vtxo_ids,
            )?),
        })
    }
}

impl RoundStatus {
    /// # Safety
    ///
    /// `raw` must be a live engine round status.
    pub unsafe fn from_abi(raw: &AbiRoundStatus) -> BridgeResult<Self> {
        let state = RoundState::try_from(raw.state)?;
        let error = copy_c_str(raw.error)?;
        let error = match state {
            RoundState::Failed => Some(error.unwrap_or_else(|| "round failed".to_string())),
            _ => {
                if error.is_some() {
                    tracing::warn!(?state, "engine set an error on a non-failed round; ignored");
                }
                None
            }
        };
        Ok(Self {
            state,
            funding_txid: copy_c_str(raw.funding_txid)?,
            unsigned_funding_txids: copy_c_str_array(raw.unsigned_funding_txids, raw.num_unsigned_funding_txids)?,
            error,
            is_final: state.is_final(),
            is_success: state.is_success(),
        })
    }
}

impl PaymentResult {
    /// # Safety
    ///
    /// `raw` must be a live engine payment result.
    pub unsafe fn from_abi(raw: &AbiPaymentResult) -> BridgeResult<Self> {
        Ok(match PaymentKind::try_from(raw.kind)? {
            PaymentKind::Bolt11 => PaymentResult::Bolt11 {
                bolt11_invoice: required("bolt11_invoice", raw.bolt11_invoice)?,
                preimage: copy_c_str(raw.preimage)?,
            },
            PaymentKind::Lnurl => PaymentResult::Lnurl {
                lnurl: required("lnurl destination", raw.destination)?,
                bolt11_invoice: required("bolt11_invoice", raw.bolt11_invoice)?,
                preimage: copy_c_str(raw.preimage)?,
            },
            PaymentKind::Arkoor => PaymentResult::Arkoor {
                destination_pubkey: required("destination pubkey", raw.destination)?,
                amount_sat: raw.amount_sat,
            },
            PaymentKind::Onchain => PaymentResult::Onchain {
                txid: required("txid", raw.txid)?,
                amount_sat: raw.amount_sat,
                destination_address: required("destination address", raw.destination)?,
            },
        })
    }
}

impl ArkInfo {
    /// # Safety
    ///
    /// `raw` must be a live engine ark info.
    pub unsafe fn from_abi(raw: &AbiArkInfo) -> BridgeResult<Self> {
        Ok(Self {
            network: required("network", raw.network)?,
            server_pubkey: required("server_pubkey", raw.server_pubkey)?,
            round_interval_secs: raw.round_interval_secs,
            vtxo_exit_delta: raw.vtxo_exit_delta,
            vtxo_expiry_delta: raw.vtxo_expiry_delta,
            htlc_expiry_delta: raw.htlc_expiry_delta,
            max_vtxo_amount_sat: raw.has_max_vtxo_amount.then_some(raw.max_vtxo_amount_sat),
        })
    }
}

impl Bolt11Invoice {
    /// # Safety
    ///
    /// `raw` must be a live engine invoice.
    pub unsafe fn from_abi(raw: &AbiBolt11Invoice) -> BridgeResult<Self> {
        Ok(Self {
            bolt11_invoice: required("bolt11_invoice", raw.bolt11_invoice)?,
            payment_secret: required("payment_secret", raw.payment_secret)?,
            payment_hash: required("payment_hash", raw.payment_hash)?,
        })
    }
}

impl KeyPair {
    /// # Safety
    ///
    /// `raw` must be a live engine keypair.
    pub unsafe fn from_abi(raw: &AbiKeyPair) -> BridgeResult<Self> {
        Ok(Self {
            public_key: required("public_key", raw.public_key)?,
            secret_key: required("secret_key", raw.secret_key)?,
        })
    }
}
