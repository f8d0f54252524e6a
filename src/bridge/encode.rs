//! Argument encoding: owned Rust values to the borrowed flat shapes of the ABI.
//!
//! Each encoder owns the storage its raw view points into. Keep the encoder
//! alive on the stack until the engine call returns; the raw view must not
//! escape that frame.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::abi::{AbiConfigOpts, AbiCreateOpts, AbiRefreshOpts};
use crate::bridge::types::{RefreshMode, RefreshModeTag};
use crate::config::{ConfigOptions, CreateOptions, Network};
use crate::error::{BridgeError, BridgeResult};

/// A string argument borrowed by the engine for one call.
#[derive(Debug)]
pub struct CStringArg(CString);

impl CStringArg {
    pub fn new(field: &str, value: &str) -> BridgeResult<Self> {
        CString::new(value)
            .map(Self)
            .map_err(|_| BridgeError::marshalling(format!("{field} contains an interior NUL byte")))
    }

    pub fn optional(field: &str, value: Option<&str>) -> BridgeResult<Option<Self>> {
        value.map(|v| Self::new(field, v)).transpose()
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }
}

/// Null for an absent string, the borrowed pointer otherwise.
pub fn optional_ptr(arg: &Option<CStringArg>) -> *const c_char {
    arg.as_ref().map_or(ptr::null(), CStringArg::as_ptr)
}

/// A contiguous array of borrowed string pointers.
///
/// The pointers address the heap buffers of `owned`, which do not move when
/// the struct does.
#[derive(Debug)]
pub struct CStringArray {
    _owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CStringArray {
    pub fn new<S: AsRef<str>>(field: &str, values: &[S]) -> BridgeResult<Self> {
        let owned = values
            .iter()
            .map(|v| CString::new(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BridgeError::marshalling(format!("{field} contains an interior NUL byte")))?;
        let ptrs = owned.iter().map(|s| s.as_ptr()).collect();
        Ok(Self { _owned: owned, ptrs })
    }

    pub fn as_ptr(&self) -> *const *const c_char {
        if self.ptrs.is_empty() { ptr::null() } else { self.ptrs.as_ptr() }
    }

    pub fn len(&self) -> usize {
        self.ptrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ptrs.is_empty()
    }
}

/// Heap scratch slot for an optional scalar passed by address.
#[derive(Debug)]
pub struct OptionalScalar<T: Copy>(Option<Box<T>>);

impl<T: Copy> OptionalScalar<T> {
    pub fn new(value: Option<T>) -> Self {
        Self(value.map(Box::new))
    }

    pub fn as_ptr(&self) -> *const T {
        self.0.as_deref().map_or(ptr::null(), |v| v as *const T)
    }
}

pub struct EncodedConfig {
    ark: Option<CStringArg>,
    esplora: Option<CStringArg>,
    bitcoind: Option<CStringArg>,
    bitcoind_cookie: Option<CStringArg>,
    bitcoind_user: Option<CStringArg>,
    bitcoind_pass: Option<CStringArg>,
    vtxo_refresh_expiry_threshold: OptionalScalar<u32>,
    fallback_fee_rate: OptionalScalar<u64>,
    htlc_recv_claim_delta: OptionalScalar<u16>,
    vtxo_exit_margin: OptionalScalar<u16>,
    deep_round_confirmations: OptionalScalar<u16>,
}

impl EncodedConfig {
    pub fn new(c: &ConfigOptions) -> BridgeResult<Self> {
        Ok(Self {
            ark: CStringArg::optional("ark", c.ark.as_deref())?,
            esplora: CStringArg::optional("esplora", c.esplora.as_deref())?,
            bitcoind: CStringArg::optional("bitcoind", c.bitcoind.as_deref())?,
            bitcoind_cookie: CStringArg::optional("bitcoind_cookie", c.bitcoind_cookie.as_deref())?,
            bitcoind_user: CStringArg::optional("bitcoind_user", c.bitcoind_user.as_deref())?,
            bitcoind_pass: CStringArg::optional("bitcoind_pass", c.bitcoind_pass.as_deref())?,
            vtxo_refresh_expiry_threshold: OptionalScalar::new(c.vtxo_refresh_expiry_threshold),
            fallback_fee_rate: OptionalScalar::new(c.fallback_fee_rate),
            htlc_recv_claim_delta: OptionalScalar::new(c.htlc_recv_claim_delta),
            vtxo_exit_margin: OptionalScalar::new(c.vtxo_exit_margin),
            deep_round_confirmations: OptionalScalar::new(c.deep_round_confirmations),
        })
    }

    pub fn as_abi(&self) -> AbiConfigOpts {
        AbiConfigOpts {
            ark: optional_ptr(&self.ark),
            esplora: optional_ptr(&self.esplora),
            bitcoind: optional_ptr(&self.bitcoind),
            bitcoind_cookie: optional_ptr(&self.bitcoind_cookie),
            bitcoind_user: optional_ptr(&self.bitcoind_user),
            bitcoind_pass: optional_ptr(&self.bitcoind_pass),
            vtxo_refresh_expiry_threshold: self.vtxo_refresh_expiry_threshold.as_ptr(),
            fallback_fee_rate: self.fallback_fee_rate.as_ptr(),
            htlc_recv_claim_delta: self.htlc_recv_claim_delta.as_ptr(),
            vtxo_exit_margin: self.vtxo_exit_margin.as_ptr(),
            deep_round_confirmations: self.deep_round_confirmations.as_ptr(),
        }
    }
}

pub struct EncodedCreate {
    network: Network,
    mnemonic: Option<CStringArg>,
    birthday_height: OptionalScalar<u32>,
    config: EncodedConfig,
}

impl EncodedCreate {
    pub fn new(o: &CreateOptions) -> BridgeResult<Self> {
        Ok(Self {
            network: o.network,
            mnemonic: CStringArg::optional("mnemonic", o.mnemonic.as_deref())?,
            birthday_height: OptionalScalar::new(o.birthday_height),
            config: EncodedConfig::new(&o.config)?,
        })
    }

    pub fn as_abi(&self) -> AbiCreateOpts {
        AbiCreateOpts {
            regtest: self.network == Network::Regtest,
            signet: self.network == Network::Signet,
            bitcoin: self.network == Network::Bitcoin,
            mnemonic: optional_ptr(&self.mnemonic),
            birthday_height: self.birthday_height.as_ptr(),
            config: self.config.as_abi(),
        }
    }
}

pub struct EncodedRefresh {
    tag: RefreshModeTag,
    threshold_value: u32,
    ids: Option<CStringArray>,
}

impl EncodedRefresh {
    pub fn new(mode: &RefreshMode) -> BridgeResult<Self> {
        let (threshold_value, ids) = match mode {
            RefreshMode::ThresholdBlocks(v) | RefreshMode::ThresholdHours(v) => (*v, None),
            RefreshMode::Specific(ids) => (0, Some(CStringArray::new("vtxo id", ids.as_slice())?)),
            RefreshMode::DefaultThreshold | RefreshMode::Counterparty | RefreshMode::All => (0, None),
        };
        Ok(Self { tag: mode.tag(), threshold_value, ids })
    }

    /// Payload fields that do not belong to the active tag are zero / null.
    pub fn as_abi(&self) -> AbiRefreshOpts {
        AbiRefreshOpts {
            mode_type: self.tag.as_u32(),
            threshold_value: self.threshold_value,
            specific_vtxo_ids: self.ids.as_ref().map_or(ptr::null(), CStringArray::as_ptr),
            num_specific_vtxo_ids: self.ids.as_ref().map_or(0, CStringArray::len),
        }
    }
}
