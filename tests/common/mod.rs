//! In-process engine double.
//!
//! Implements every `bark_*` function of the ABI with its own tracked
//! allocator: each allocation handed to the bridge is recorded in a live set
//! and removed by the matching release function. A release of an untracked
//! pointer (double free, foreign pointer) is counted, never performed.
//!
//! Behaviour is scripted through [`state()`]: queued round states, one-shot
//! failures, exclusivity violations, injected tags.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use once_cell::sync::Lazy;

use nitro_ark::abi::*;
use nitro_ark::bridge::buffer::{copy_borrowed_str_array, copy_c_str};
use nitro_ark::{CreateOptions, EngineAbi, RefreshMode};

// Well-known test mnemonic, never use with real funds
pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub const FUNDING_TXID: &str = "f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0";

#[derive(Debug, Default)]
pub struct EngineState {
    pub wallets: HashSet<String>,
    pub loaded: Option<String>,
    /// States returned by successive round operations; `Confirmed` once empty.
    pub round_states: VecDeque<u32>,
    pub round_error: Option<String>,
    /// Next fallible call returns this error.
    pub fail_next: Option<String>,
    /// Write the output and return an error anyway.
    pub violate_exclusivity: bool,
    /// Report success without writing the output.
    pub null_output: bool,
    pub payment_kind_override: Option<u32>,
    pub close_refuses: bool,
    pub first_expiring: Option<u32>,
    /// How long `bark_load_wallet` works before answering.
    pub load_delay: Option<Duration>,

    pub last_create: Option<CreateOptions>,
    pub last_refresh: Option<RefreshMode>,
    pub last_send: Option<(String, Option<u64>, Option<String>, bool)>,
    pub last_no_sync: Option<bool>,
    pub last_vtxo_index: Option<Option<u32>>,
    pub last_ids: Vec<String>,
    pub last_amounts: Vec<u64>,
    pub last_address: Option<Option<String>>,
    pub last_claim: Option<(String, bool, Option<String>)>,
    pub calls: Vec<&'static str>,
    pub bad_frees: usize,
}

static STATE: Lazy<Mutex<EngineState>> = Lazy::new(|| Mutex::new(EngineState::default()));
static LIVE: Lazy<Mutex<HashSet<usize>>> = Lazy::new(|| Mutex::new(HashSet::new()));
static ENGINE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn state() -> MutexGuard<'static, EngineState> {
    STATE.lock().unwrap_or_else(|p| p.into_inner())
}

fn live() -> MutexGuard<'static, HashSet<usize>> {
    LIVE.lock().unwrap_or_else(|p| p.into_inner())
}

pub fn live_allocations() -> usize {
    live().len()
}

pub fn bad_frees() -> usize {
    state().bad_frees
}

pub fn called(name: &str) -> bool {
    call_count(name) > 0
}

pub fn call_count(name: &str) -> usize {
    state().calls.iter().filter(|c| **c == name).count()
}

/// Serialise tests on the shared double and start from a clean engine.
pub fn lock_engine() -> MutexGuard<'static, ()> {
    let guard = ENGINE_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    *state() = EngineState::default();
    live().clear();
    guard
}

pub fn engine() -> EngineAbi {
    EngineAbi {
        init_logger: bark_init_logger,
        free_error: bark_free_error,
        free_string: bark_free_string,
        free_round_status: bark_free_round_status,
        free_payment_result: bark_free_payment_result,
        free_ark_info: bark_free_ark_info,
        free_bolt11_invoice: bark_free_bolt11_invoice,
        free_keypair: bark_free_keypair,
        create_mnemonic: bark_create_mnemonic,
        create_wallet: bark_create_wallet,
        load_wallet: bark_load_wallet,
        close_wallet: bark_close_wallet,
        get_ark_info: bark_get_ark_info,
        get_balance: bark_get_balance,
        get_onchain_address: bark_get_onchain_address,
        get_onchain_utxos: bark_get_onchain_utxos,
        send_onchain: bark_send_onchain,
        drain_onchain: bark_drain_onchain,
        send_many_onchain: bark_send_many_onchain,
        get_vtxo_pubkey: bark_get_vtxo_pubkey,
        get_vtxos: bark_get_vtxos,
        get_first_expiring_vtxo_blockheight: bark_get_first_expiring_vtxo_blockheight,
        get_next_required_refresh_blockheight: bark_get_next_required_refresh_blockheight,
        refresh_vtxos: bark_refresh_vtxos,
        board_amount: bark_board_amount,
        board_all: bark_board_all,
        send: bark_send,
        send_round_onchain: bark_send_round_onchain,
        offboard_specific: bark_offboard_specific,
        offboard_all: bark_offboard_all,
        exit_start_specific: bark_exit_start_specific,
        exit_start_all: bark_exit_start_all,
        exit_progress_once: bark_exit_progress_once,
        bolt11_invoice: bark_bolt11_invoice,
        claim_bolt11_payment: bark_claim_bolt11_payment,
        try_claim_lightning_receive: bark_try_claim_lightning_receive,
        peak_keypair: bark_peak_keypair,
        sign_message: bark_sign_message,
        verify_message: bark_verify_message,
        maintenance: bark_maintenance,
        maintenance_refresh: bark_maintenance_refresh,
        sync: bark_sync,
    }
}

// ============================================================================
// Tracked allocator
// ============================================================================

fn track<T>(p: *mut T) -> *mut T {
    live().insert(p as usize);
    p
}

fn untrack<T>(p: *mut T) -> bool {
    let known = live().remove(&(p as usize));
    if !known {
        state().bad_frees += 1;
    }
    known
}

pub fn alloc_str(s: &str) -> *mut c_char {
    track(CString::new(s).unwrap().into_raw())
}

fn alloc_str_array(items: &[&str]) -> (*mut *mut c_char, usize) {
    if items.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let ptrs: Vec<*mut c_char> = items.iter().map(|s| alloc_str(s)).collect();
    let len = ptrs.len();
    (track(Box::into_raw(ptrs.into_boxed_slice()) as *mut *mut c_char), len)
}

fn error(message: &str) -> *mut AbiError {
    track(Box::into_raw(Box::new(AbiError { message: alloc_str(message) })))
}

pub unsafe extern "C" fn bark_free_string(s: *mut c_char) {
    if !s.is_null() && untrack(s) {
        drop(CString::from_raw(s));
    }
}

pub unsafe extern "C" fn bark_free_error(e: *mut AbiError) {
    if !e.is_null() && untrack(e) {
        let e = Box::from_raw(e);
        bark_free_string(e.message);
    }
}

unsafe fn free_str_array(p: *mut *mut c_char, len: usize) {
    if !p.is_null() && untrack(p) {
        let items = Box::from_raw(ptr::slice_from_raw_parts_mut(p, len));
        for &s in items.iter() {
            bark_free_string(s);
        }
    }
}

pub unsafe extern "C" fn bark_free_round_status(s: *mut AbiRoundStatus) {
    if !s.is_null() && untrack(s) {
        let s = Box::from_raw(s);
        bark_free_string(s.funding_txid);
        bark_free_string(s.error);
        free_str_array(s.unsigned_funding_txids, s.num_unsigned_funding_txids);
    }
}

pub unsafe extern "C" fn bark_free_payment_result(r: *mut AbiPaymentResult) {
    if !r.is_null() && untrack(r) {
        let r = Box::from_raw(r);
        bark_free_string(r.destination);
        bark_free_string(r.txid);
        bark_free_string(r.bolt11_invoice);
        bark_free_string(r.preimage);
    }
}

pub unsafe extern "C" fn bark_free_ark_info(i: *mut AbiArkInfo) {
    if !i.is_null() && untrack(i) {
        let i = Box::from_raw(i);
        bark_free_string(i.network);
        bark_free_string(i.server_pubkey);
    }
}

pub unsafe extern "C" fn bark_free_bolt11_invoice(i: *mut AbiBolt11Invoice) {
    if !i.is_null() && untrack(i) {
        let i = Box::from_raw(i);
        bark_free_string(i.bolt11_invoice);
        bark_free_string(i.payment_secret);
        bark_free_string(i.payment_hash);
    }
}

pub unsafe extern "C" fn bark_free_keypair(k: *mut AbiKeyPair) {
    if !k.is_null() && untrack(k) {
        let k = Box::from_raw(k);
        bark_free_string(k.public_key);
        bark_free_string(k.secret_key);
    }
}

// ============================================================================
// Call plumbing
// ============================================================================

fn begin(call: &'static str, needs_wallet: bool) -> Result<(), *mut AbiError> {
    let failure = {
        let mut st = state();
        st.calls.push(call);
        match st.fail_next.take() {
            Some(msg) => Some(msg),
            None if needs_wallet && st.loaded.is_none() => Some("Wallet not loaded".to_string()),
            None => None,
        }
    };
    match failure {
        Some(msg) => Err(error(&msg)),
        None => Ok(()),
    }
}

macro_rules! begin {
    ($call:expr, $wallet:expr) => {
        if let Err(e) = begin($call, $wallet) {
            return e;
        }
    };
}

unsafe fn emit<T>(out: *mut *mut T, build: impl FnOnce() -> *mut T) -> *mut AbiError {
    let (violate, null_out) = {
        let st = state();
        (st.violate_exclusivity, st.null_output)
    };
    if out.is_null() {
        return error("null out pointer");
    }
    if null_out {
        return ptr::null_mut();
    }
    *out = build();
    if violate {
        return error("engine glitch: error with output");
    }
    ptr::null_mut()
}

unsafe fn emit_str(out: *mut *mut c_char, value: &str) -> *mut AbiError {
    emit(out, || alloc_str(value))
}

fn round_status() -> *mut AbiRoundStatus {
    let (tag, err) = {
        let mut st = state();
        (st.round_states.pop_front().unwrap_or(ROUND_CONFIRMED), st.round_error.clone())
    };
    let funding_txid = if tag == ROUND_PENDING { ptr::null_mut() } else { alloc_str(FUNDING_TXID) };
    let (txids, n) = if tag == ROUND_UNCONFIRMED { alloc_str_array(&["aa01", "bb02"]) } else { (ptr::null_mut(), 0) };
    let error = if tag == ROUND_FAILED {
        alloc_str(err.as_deref().unwrap_or("round aborted by server"))
    } else {
        ptr::null_mut()
    };
    track(Box::into_raw(Box::new(AbiRoundStatus {
        state: tag,
        funding_txid,
        unsigned_funding_txids: txids,
        num_unsigned_funding_txids: n,
        error,
    })))
}

fn record_no_sync(no_sync: bool) {
    state().last_no_sync = Some(no_sync);
}

// ============================================================================
// Engine functions
// ============================================================================

pub unsafe extern "C" fn bark_init_logger() {
    state().calls.push("init_logger");
}

pub unsafe extern "C" fn bark_create_mnemonic(out: *mut *mut c_char) -> *mut AbiError {
    begin!("create_mnemonic", false);
    emit_str(out, TEST_MNEMONIC)
}

unsafe fn decode_create(datadir: *const c_char, opts: &AbiCreateOpts) -> Result<(String, CreateOptions), *mut AbiError> {
    let dir = match copy_c_str(datadir) {
        Ok(Some(d)) => d,
        Ok(None) => return Err(error("datadir is required")),
        Err(e) => return Err(error(&e.to_string())),
    };
    let create = CreateOptions::from_abi(opts).map_err(|e| error(&e.to_string()))?;
    Ok((dir, create))
}

pub unsafe extern "C" fn bark_create_wallet(datadir: *const c_char, opts: AbiCreateOpts) -> *mut AbiError {
    begin!("create_wallet", false);
    let (dir, create) = match decode_create(datadir, &opts) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut st = state();
    if !st.wallets.insert(dir.clone()) {
        drop(st);
        return error(&format!("Wallet already exists at {dir}"));
    }
    st.last_create = Some(create);
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_load_wallet(datadir: *const c_char, opts: AbiCreateOpts) -> *mut AbiError {
    begin!("load_wallet", false);
    let (dir, create) = match decode_create(datadir, &opts) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let delay = state().load_delay;
    if let Some(delay) = delay {
        std::thread::sleep(delay);
    }
    let mut st = state();
    if st.loaded.is_some() {
        drop(st);
        return error("Wallet is already loaded. Please close it first.");
    }
    if !st.wallets.contains(&dir) {
        drop(st);
        return error(&format!("No wallet found at {dir}"));
    }
    st.loaded = Some(dir);
    st.last_create = Some(create);
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_close_wallet() -> *mut AbiError {
    begin!("close_wallet", false);
    let mut st = state();
    if st.close_refuses {
        drop(st);
        return error("Wallet is busy");
    }
    if st.loaded.take().is_none() {
        drop(st);
        return error("No wallet is currently loaded.");
    }
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_get_ark_info(out: *mut *mut AbiArkInfo) -> *mut AbiError {
    begin!("get_ark_info", true);
    emit(out, || {
        track(Box::into_raw(Box::new(AbiArkInfo {
            network: alloc_str("regtest"),
            server_pubkey: alloc_str("02aabbcc"),
            round_interval_secs: 30,
            vtxo_exit_delta: 12,
            vtxo_expiry_delta: 144,
            htlc_expiry_delta: 6,
            has_max_vtxo_amount: true,
            max_vtxo_amount_sat: 10_000_000,
        })))
    })
}

pub unsafe extern "C" fn bark_get_balance(no_sync: bool, out: *mut AbiBalance) -> *mut AbiError {
    begin!("get_balance", true);
    record_no_sync(no_sync);
    if out.is_null() {
        return error("null out pointer");
    }
    *out = AbiBalance { onchain: 100_000, offchain: 50_000, pending_exit: 2_500 };
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_get_onchain_address(out: *mut *mut c_char) -> *mut AbiError {
    begin!("get_onchain_address", true);
    emit_str(out, "bcrt1qtestaddress")
}

pub unsafe extern "C" fn bark_get_onchain_utxos(no_sync: bool, out: *mut *mut c_char) -> *mut AbiError {
    begin!("get_onchain_utxos", true);
    record_no_sync(no_sync);
    emit_str(out, r#"[{"outpoint":"aa01:0","amount_sat":100000}]"#)
}

pub unsafe extern "C" fn bark_send_onchain(dest: *const c_char, amount: u64, no_sync: bool, out: *mut *mut c_char) -> *mut AbiError {
    begin!("send_onchain", true);
    record_no_sync(no_sync);
    let dest = copy_c_str(dest).ok().flatten().unwrap_or_default();
    state().last_send = Some((dest, Some(amount), None, no_sync));
    emit_str(out, "txid-onchain")
}

pub unsafe extern "C" fn bark_drain_onchain(dest: *const c_char, no_sync: bool, out: *mut *mut c_char) -> *mut AbiError {
    begin!("drain_onchain", true);
    record_no_sync(no_sync);
    let dest = copy_c_str(dest).ok().flatten().unwrap_or_default();
    state().last_send = Some((dest, None, None, no_sync));
    emit_str(out, "txid-drain")
}

pub unsafe extern "C" fn bark_send_many_onchain(
    dests: *const *const c_char,
    amounts: *const u64,
    num: usize,
    no_sync: bool,
    out: *mut *mut c_char,
) -> *mut AbiError {
    begin!("send_many_onchain", true);
    record_no_sync(no_sync);
    let ids = match copy_borrowed_str_array(dests, num) {
        Ok(v) => v,
        Err(e) => return error(&e.to_string()),
    };
    let amounts = if num == 0 { Vec::new() } else { std::slice::from_raw_parts(amounts, num).to_vec() };
    {
        let mut st = state();
        st.last_ids = ids;
        st.last_amounts = amounts;
    }
    emit_str(out, "txid-many")
}

pub unsafe extern "C" fn bark_get_vtxo_pubkey(index: *const u32, out: *mut *mut c_char) -> *mut AbiError {
    begin!("get_vtxo_pubkey", true);
    let index = index.as_ref().copied();
    state().last_vtxo_index = Some(index);
    let key = match index {
        Some(i) => format!("02pubkey{i}"),
        None => "02pubkeynext".to_string(),
    };
    emit_str(out, &key)
}

pub unsafe extern "C" fn bark_get_vtxos(no_sync: bool, out: *mut *mut c_char) -> *mut AbiError {
    begin!("get_vtxos", true);
    record_no_sync(no_sync);
    emit_str(out, "[]")
}

pub unsafe extern "C" fn bark_get_first_expiring_vtxo_blockheight(has: *mut bool, out: *mut u32) -> *mut AbiError {
    begin!("get_first_expiring_vtxo_blockheight", true);
    let height = state().first_expiring;
    *has = height.is_some();
    *out = height.unwrap_or(0);
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_get_next_required_refresh_blockheight(has: *mut bool, out: *mut u32) -> *mut AbiError {
    begin!("get_next_required_refresh_blockheight", true);
    let height = state().first_expiring.map(|h| h.saturating_sub(12));
    *has = height.is_some();
    *out = height.unwrap_or(0);
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_refresh_vtxos(opts: AbiRefreshOpts, no_sync: bool, out: *mut *mut AbiRoundStatus) -> *mut AbiError {
    begin!("refresh_vtxos", true);
    record_no_sync(no_sync);
    match RefreshMode::from_abi(&opts) {
        Ok(mode) => state().last_refresh = Some(mode),
        Err(e) => return error(&e.to_string()),
    }
    emit(out, round_status)
}

pub unsafe extern "C" fn bark_board_amount(amount: u64, no_sync: bool, out: *mut *mut AbiRoundStatus) -> *mut AbiError {
    begin!("board_amount", true);
    record_no_sync(no_sync);
    state().last_amounts = vec![amount];
    emit(out, round_status)
}

pub unsafe extern "C" fn bark_board_all(no_sync: bool, out: *mut *mut AbiRoundStatus) -> *mut AbiError {
    begin!("board_all", true);
    record_no_sync(no_sync);
    emit(out, round_status)
}

fn payment_kind_for(dest: &str) -> u32 {
    if dest.starts_with("lnbc") {
        PAYMENT_BOLT11
    } else if dest.starts_with("lnurl") || dest.contains('@') {
        PAYMENT_LNURL
    } else if dest.starts_with("ark") || dest.starts_with("tark") {
        PAYMENT_ARKOOR
    } else {
        PAYMENT_ONCHAIN
    }
}

pub unsafe extern "C" fn bark_send(
    dest: *const c_char,
    amount: *const u64,
    comment: *const c_char,
    no_sync: bool,
    out: *mut *mut AbiPaymentResult,
) -> *mut AbiError {
    begin!("send", true);
    record_no_sync(no_sync);
    let dest = copy_c_str(dest).ok().flatten().unwrap_or_default();
    let amount = amount.as_ref().copied();
    let comment = copy_c_str(comment).ok().flatten();
    let kind = {
        let mut st = state();
        st.last_send = Some((dest.clone(), amount, comment, no_sync));
        st.payment_kind_override.unwrap_or_else(|| payment_kind_for(&dest))
    };
    emit(out, || {
        let (txid, invoice, preimage) = match kind {
            PAYMENT_ONCHAIN => (alloc_str("txid-send"), ptr::null_mut(), ptr::null_mut()),
            PAYMENT_BOLT11 => (ptr::null_mut(), alloc_str(&dest), alloc_str("preimage01")),
            PAYMENT_LNURL => (ptr::null_mut(), alloc_str("lnbcrt1resolved"), alloc_str("preimage02")),
            _ => (ptr::null_mut(), ptr::null_mut(), ptr::null_mut()),
        };
        track(Box::into_raw(Box::new(AbiPaymentResult {
            kind,
            destination: alloc_str(&dest),
            amount_sat: amount.unwrap_or(1_000),
            txid,
            bolt11_invoice: invoice,
            preimage,
        })))
    })
}

pub unsafe extern "C" fn bark_send_round_onchain(dest: *const c_char, amount: u64, no_sync: bool, out: *mut *mut AbiRoundStatus) -> *mut AbiError {
    begin!("send_round_onchain", true);
    record_no_sync(no_sync);
    let dest = copy_c_str(dest).ok().flatten().unwrap_or_default();
    state().last_send = Some((dest, Some(amount), None, no_sync));
    emit(out, round_status)
}

pub unsafe extern "C" fn bark_offboard_specific(
    ids: *const *const c_char,
    num: usize,
    address: *const c_char,
    no_sync: bool,
    out: *mut *mut AbiRoundStatus,
) -> *mut AbiError {
    begin!("offboard_specific", true);
    record_no_sync(no_sync);
    let ids = match copy_borrowed_str_array(ids, num) {
        Ok(v) => v,
        Err(e) => return error(&e.to_string()),
    };
    let address = copy_c_str(address).ok().flatten();
    {
        let mut st = state();
        st.last_ids = ids;
        st.last_address = Some(address);
    }
    emit(out, round_status)
}

pub unsafe extern "C" fn bark_offboard_all(address: *const c_char, no_sync: bool, out: *mut *mut AbiRoundStatus) -> *mut AbiError {
    begin!("offboard_all", true);
    record_no_sync(no_sync);
    state().last_address = Some(copy_c_str(address).ok().flatten());
    emit(out, round_status)
}

pub unsafe extern "C" fn bark_exit_start_specific(ids: *const *const c_char, num: usize, out: *mut *mut c_char) -> *mut AbiError {
    begin!("exit_start_specific", true);
    let ids = match copy_borrowed_str_array(ids, num) {
        Ok(v) => v,
        Err(e) => return error(&e.to_string()),
    };
    state().last_ids = ids;
    emit_str(out, &format!(r#"{{"started":{num}}}"#))
}

pub unsafe extern "C" fn bark_exit_start_all(out: *mut *mut c_char) -> *mut AbiError {
    begin!("exit_start_all", true);
    emit_str(out, r#"{"started":"all"}"#)
}

pub unsafe extern "C" fn bark_exit_progress_once(out: *mut *mut c_char) -> *mut AbiError {
    begin!("exit_progress_once", true);
    emit_str(out, r#"{"done":false,"exits":[]}"#)
}

pub unsafe extern "C" fn bark_bolt11_invoice(amount_msat: u64, out: *mut *mut AbiBolt11Invoice) -> *mut AbiError {
    begin!("bolt11_invoice", true);
    emit(out, || {
        track(Box::into_raw(Box::new(AbiBolt11Invoice {
            bolt11_invoice: alloc_str(&format!("lnbcrt{amount_msat}n1test")),
            payment_secret: alloc_str("5e"),
            payment_hash: alloc_str("ab01"),
        })))
    })
}

pub unsafe extern "C" fn bark_claim_bolt11_payment(bolt11: *const c_char) -> *mut AbiError {
    begin!("claim_bolt11_payment", true);
    match copy_c_str(bolt11) {
        Ok(Some(_)) => ptr::null_mut(),
        _ => error("invoice is required"),
    }
}

pub unsafe extern "C" fn bark_try_claim_lightning_receive(
    payment_hash: *const c_char,
    wait: bool,
    token: *const c_char,
) -> *mut AbiError {
    begin!("try_claim_lightning_receive", true);
    let hash = match copy_c_str(payment_hash) {
        Ok(Some(h)) => h,
        _ => return error("payment hash is required"),
    };
    let token = copy_c_str(token).ok().flatten();
    state().last_claim = Some((hash, wait, token));
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_peak_keypair(index: u32, out: *mut *mut AbiKeyPair) -> *mut AbiError {
    begin!("peak_keypair", true);
    emit(out, || {
        track(Box::into_raw(Box::new(AbiKeyPair {
            public_key: alloc_str(&format!("02pubkey{index}")),
            secret_key: alloc_str(&format!("secret{index}")),
        })))
    })
}

pub unsafe extern "C" fn bark_sign_message(message: *const c_char, index: u32, out: *mut *mut c_char) -> *mut AbiError {
    begin!("sign_message", true);
    let message = copy_c_str(message).ok().flatten().unwrap_or_default();
    emit_str(out, &format!("sig:{index}:{message}"))
}

pub unsafe extern "C" fn bark_verify_message(
    message: *const c_char,
    signature: *const c_char,
    pubkey: *const c_char,
    out: *mut bool,
) -> *mut AbiError {
    begin!("verify_message", true);
    let message = copy_c_str(message).ok().flatten().unwrap_or_default();
    let signature = copy_c_str(signature).ok().flatten().unwrap_or_default();
    let pubkey = copy_c_str(pubkey).ok().flatten().unwrap_or_default();
    if out.is_null() {
        return error("null out pointer");
    }
    *out = pubkey.starts_with("02") && signature.starts_with("sig:") && signature.ends_with(&format!(":{message}"));
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_maintenance() -> *mut AbiError {
    begin!("maintenance", true);
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_maintenance_refresh() -> *mut AbiError {
    begin!("maintenance_refresh", true);
    ptr::null_mut()
}

pub unsafe extern "C" fn bark_sync() -> *mut AbiError {
    begin!("sync", true);
    ptr::null_mut()
}
