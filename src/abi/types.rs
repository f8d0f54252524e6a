//! Fixed-layout structs of the engine contract.
//!
//! Enumerations travel as raw `u32` tags. A Rust enum with an out-of-range
//! discriminant is undefined behaviour, a `u32` is just a number we can check.

use std::os::raw::c_char;
use std::ptr;

/// Error envelope. Null return means success.
#[repr(C)]
#[derive(Debug)]
pub struct AbiError {
    pub message: *mut c_char,
}

/// Engine configuration. Strings are borrowed, scalars are nullable pointers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AbiConfigOpts {
    pub ark: *const c_char,
    pub esplora: *const c_char,
    pub bitcoind: *const c_char,
    pub bitcoind_cookie: *const c_char,
    pub bitcoind_user: *const c_char,
    pub bitcoind_pass: *const c_char,
    pub vtxo_refresh_expiry_threshold: *const u32,
    /// sat/kvB
    pub fallback_fee_rate: *const u64,
    pub htlc_recv_claim_delta: *const u16,
    pub vtxo_exit_margin: *const u16,
    pub deep_round_confirmations: *const u16,
}

impl Default for AbiConfigOpts {
    fn default() -> Self {
        Self {
            ark: ptr::null(),
            esplora: ptr::null(),
            bitcoind: ptr::null(),
            bitcoind_cookie: ptr::null(),
            bitcoind_user: ptr::null(),
            bitcoind_pass: ptr::null(),
            vtxo_refresh_expiry_threshold: ptr::null(),
            fallback_fee_rate: ptr::null(),
            htlc_recv_claim_delta: ptr::null(),
            vtxo_exit_margin: ptr::null(),
            deep_round_confirmations: ptr::null(),
        }
    }
}

/// Wallet creation/load options. Exactly one network flag is set.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AbiCreateOpts {
    pub regtest: bool,
    pub signet: bool,
    pub bitcoin: bool,
    pub mnemonic: *const c_char,
    pub birthday_height: *const u32,
    pub config: AbiConfigOpts,
}

/// Caller-provided out struct, no ownership involved.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbiBalance {
    pub onchain: u64,
    pub offchain: u64,
    pub pending_exit: u64,
}

pub const REFRESH_DEFAULT_THRESHOLD: u32 = 0;
pub const REFRESH_THRESHOLD_BLOCKS: u32 = 1;
pub const REFRESH_THRESHOLD_HOURS: u32 = 2;
pub const REFRESH_COUNTERPARTY: u32 = 3;
pub const REFRESH_ALL: u32 = 4;
pub const REFRESH_SPECIFIC: u32 = 5;

/// Refresh selector. `threshold_value` is read only for the threshold tags,
/// the id array only for `REFRESH_SPECIFIC`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AbiRefreshOpts {
    pub mode_type: u32,
    pub threshold_value: u32,
    pub specific_vtxo_ids: *const *const c_char,
    pub num_specific_vtxo_ids: usize,
}

pub const ROUND_PENDING: u32 = 0;
pub const ROUND_UNCONFIRMED: u32 = 1;
pub const ROUND_CONFIRMED: u32 = 2;
pub const ROUND_FAILED: u32 = 3;

/// Engine allocated, released with `bark_free_round_status`.
#[repr(C)]
#[derive(Debug)]
pub struct AbiRoundStatus {
    pub state: u32,
    pub funding_txid: *mut c_char,
    pub unsigned_funding_txids: *mut *mut c_char,
    pub num_unsigned_funding_txids: usize,
    pub error: *mut c_char,
}

pub const PAYMENT_BOLT11: u32 = 0;
pub const PAYMENT_LNURL: u32 = 1;
pub const PAYMENT_ARKOOR: u32 = 2;
pub const PAYMENT_ONCHAIN: u32 = 3;

/// Engine allocated, released with `bark_free_payment_result`.
#[repr(C)]
#[derive(Debug)]
pub struct AbiPaymentResult {
    pub kind: u32,
    pub destination: *mut c_char,
    pub amount_sat: u64,
    pub txid: *mut c_char,
    pub bolt11_invoice: *mut c_char,
    pub preimage: *mut c_char,
}

/// Engine allocated, released with `bark_free_ark_info`.
#[repr(C)]
#[derive(Debug)]
pub struct AbiArkInfo {
    pub network: *mut c_char,
    pub server_pubkey: *mut c_char,
    pub round_interval_secs: u64,
    pub vtxo_exit_delta: u16,
    pub vtxo_expiry_delta: u16,
    pub htlc_expiry_delta: u16,
    pub has_max_vtxo_amount: bool,
    pub max_vtxo_amount_sat: u64,
}

/// Engine allocated, released with `bark_free_bolt11_invoice`.
#[repr(C)]
#[derive(Debug)]
pub struct AbiBolt11Invoice {
    pub bolt11_invoice: *mut c_char,
    pub payment_secret: *mut c_char,
    pub payment_hash: *mut c_char,
}

/// Engine allocated, released with `bark_free_keypair`. Both keys are hex.
#[repr(C)]
#[derive(Debug)]
pub struct AbiKeyPair {
    pub public_key: *mut c_char,
    pub secret_key: *mut c_char,
}
