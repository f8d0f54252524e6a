//! Typed Bridge Layer: the only code allowed to call the engine ABI.
//!
//! ```text
//! Bridge
//!   ├── abi: EngineAbi            (function table)
//!   └── session: Mutex<SessionState>
//!         Empty ─load─▶ Loading ─ok─▶ Loaded ─close─▶ Closing ─ok─▶ Empty
//!                          └─err─▶ Empty         └─err─▶ Loaded
//!
//! call:  encode args (stack-held) → engine fn → guard outputs → check envelope
//!        → copy into owned values → release engine memory → Result
//! ```
//!
//! Calls are blocking. The host layer schedules them on worker threads.
//!
//! The session lock is only ever held for a state read or swap, never across
//! an engine call, so `is_wallet_loaded` answers at once even while a load or
//! close is running. The engine is responsible for serialising its own wallet
//! state; callers must not issue overlapping session-mutating calls.

pub mod buffer;
pub mod decode;
pub mod encode;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};

use crate::abi::{AbiBalance, EngineAbi};
use crate::config::{CreateOptions, Network};
use crate::error::{BridgeError, BridgeResult, WALLET_ALREADY_LOADED, WALLET_TRANSITION_IN_PROGRESS};
use buffer::{call_optional_u32, call_out, call_string, check};
use encode::{optional_ptr, CStringArg, CStringArray, EncodedCreate, EncodedRefresh, OptionalScalar};
pub use types::*;

/// The loaded wallet. At most one exists per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub datadir: PathBuf,
    pub network: Network,
}

#[derive(Debug, Clone)]
enum SessionState {
    Empty,
    Loading,
    Loaded(Session),
    Closing(Session),
}

/// A lifecycle transition in flight. Dropped without `commit` (engine error,
/// panic) it puts the previous state back.
struct Transition<'a> {
    bridge: &'a Bridge,
    rollback: Option<SessionState>,
}

impl Transition<'_> {
    fn commit(mut self, next: SessionState) {
        self.rollback = None;
        *self.bridge.slot() = next;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.rollback.take() {
            *self.bridge.slot() = previous;
        }
    }
}

pub struct Bridge {
    abi: EngineAbi,
    session: Mutex<SessionState>,
    engine_logger: Once,
}

impl Bridge {
    pub fn new(abi: EngineAbi) -> Self {
        Self { abi, session: Mutex::new(SessionState::Empty), engine_logger: Once::new() }
    }

    #[cfg(feature = "linked-engine")]
    pub fn linked() -> Self {
        Self::new(EngineAbi::linked())
    }

    fn slot(&self) -> MutexGuard<'_, SessionState> {
        // Every critical section is a single read or assignment, so a
        // poisoned lock still holds a consistent state.
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Session-scoped calls run only against a committed session, not while
    /// it is loading or closing.
    fn require_session(&self) -> BridgeResult<()> {
        match *self.slot() {
            SessionState::Loaded(_) => Ok(()),
            SessionState::Empty | SessionState::Loading => Err(BridgeError::no_wallet()),
            SessionState::Closing(_) => Err(BridgeError::precondition(WALLET_TRANSITION_IN_PROGRESS)),
        }
    }

    /// True once a load has committed, until a close commits. Never waits on
    /// the engine.
    pub fn is_wallet_loaded(&self) -> bool {
        self.session().is_some()
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.slot() {
            SessionState::Loaded(s) | SessionState::Closing(s) => Some(s.clone()),
            SessionState::Empty | SessionState::Loading => None,
        }
    }

    /// Start the engine's own logger. Only the first call reaches the engine.
    pub fn init_engine_logger(&self) {
        self.engine_logger.call_once(|| {
            debug!("bark_init_logger");
            unsafe { (self.abi.init_logger)() }
        });
    }

    // ---------------------------------------------------------------- lifecycle

    pub fn create_mnemonic(&self) -> BridgeResult<String> {
        debug!("bark_create_mnemonic");
        call_string(&self.abi, "create_mnemonic", |out| unsafe { (self.abi.create_mnemonic)(out) })
    }

    /// Create a wallet on disk. Does not load it.
    pub fn create_wallet(&self, datadir: &Path, opts: &CreateOptions) -> BridgeResult<()> {
        debug!(datadir = %datadir.display(), network = %opts.network, has_mnemonic = opts.mnemonic.is_some(), "bark_create_wallet");
        let dir = path_arg(datadir)?;
        let enc = EncodedCreate::new(opts)?;
        check(&self.abi, unsafe { (self.abi.create_wallet)(dir.as_ptr(), enc.as_abi()) })
    }

    /// Open a wallet and make it the process session. A second load is
    /// rejected; close the current wallet first.
    pub fn load_wallet(&self, datadir: &Path, opts: &CreateOptions) -> BridgeResult<()> {
        let dir = path_arg(datadir)?;
        let enc = EncodedCreate::new(opts)?;
        let transition = {
            let mut slot = self.slot();
            match *slot {
                SessionState::Empty => {}
                SessionState::Loaded(_) => return Err(BridgeError::precondition(WALLET_ALREADY_LOADED)),
                SessionState::Loading | SessionState::Closing(_) => {
                    return Err(BridgeError::precondition(WALLET_TRANSITION_IN_PROGRESS))
                }
            }
            *slot = SessionState::Loading;
            Transition { bridge: self, rollback: Some(SessionState::Empty) }
        };
        debug!(datadir = %datadir.display(), network = %opts.network, "bark_load_wallet");
        check(&self.abi, unsafe { (self.abi.load_wallet)(dir.as_ptr(), enc.as_abi()) })?;
        transition.commit(SessionState::Loaded(Session { datadir: datadir.to_path_buf(), network: opts.network }));
        info!(datadir = %datadir.display(), network = %opts.network, "wallet loaded");
        Ok(())
    }

    /// Close the session. If the engine refuses, the session stays loaded.
    pub fn close_wallet(&self) -> BridgeResult<()> {
        let transition = {
            let mut slot = self.slot();
            let session = match &*slot {
                SessionState::Loaded(s) => s.clone(),
                SessionState::Empty => return Err(BridgeError::no_wallet()),
                SessionState::Loading | SessionState::Closing(_) => {
                    return Err(BridgeError::precondition(WALLET_TRANSITION_IN_PROGRESS))
                }
            };
            *slot = SessionState::Closing(session.clone());
            Transition { bridge: self, rollback: Some(SessionState::Loaded(session)) }
        };
        debug!("bark_close_wallet");
        check(&self.abi, unsafe { (self.abi.close_wallet)() })?;
        transition.commit(SessionState::Empty);
        info!("wallet closed");
        Ok(())
    }

    pub fn get_ark_info(&self) -> BridgeResult<ArkInfo> {
        self.require_session()?;
        debug!("bark_get_ark_info");
        let info = call_out(&self.abi, "get_ark_info", self.abi.free_ark_info, |out| unsafe {
            (self.abi.get_ark_info)(out)
        })?;
        match info.get() {
            Some(raw) => unsafe { ArkInfo::from_abi(raw) },
            None => Err(BridgeError::marshalling("get_ark_info: success without output")),
        }
    }

    // ---------------------------------------------------------------- on-chain

    pub fn get_balance(&self, no_sync: bool) -> BridgeResult<Balance> {
        self.require_session()?;
        debug!(no_sync, "bark_get_balance");
        let mut out = AbiBalance::default();
        check(&self.abi, unsafe { (self.abi.get_balance)(no_sync, &mut out as *mut AbiBalance) })?;
        Ok(out.into())
    }

    pub fn get_onchain_address(&self) -> BridgeResult<String> {
        self.require_session()?;
        debug!("bark_get_onchain_address");
        call_string(&self.abi, "get_onchain_address", |out| unsafe { (self.abi.get_onchain_address)(out) })
    }

    /// Opaque JSON text, passed through unparsed.
    pub fn get_onchain_utxos(&self, no_sync: bool) -> BridgeResult<String> {
        self.require_session()?;
        debug!(no_sync, "bark_get_onchain_utxos");
        call_string(&self.abi, "get_onchain_utxos", |out| unsafe { (self.abi.get_onchain_utxos)(no_sync, out) })
    }

    pub fn send_onchain(&self, destination: &str, amount_sat: u64, no_sync: bool) -> BridgeResult<String> {
        self.require_session()?;
        debug!(destination, amount_sat, no_sync, "bark_send_onchain");
        let dest = CStringArg::new("destination", destination)?;
        call_string(&self.abi, "send_onchain", |out| unsafe {
            (self.abi.send_onchain)(dest.as_ptr(), amount_sat, no_sync, out)
        })
    }

    pub fn drain_onchain(&self, destination: &str, no_sync: bool) -> BridgeResult<String> {
        self.require_session()?;
        debug!(destination, no_sync, "bark_drain_onchain");
        let dest = CStringArg::new("destination", destination)?;
        call_string(&self.abi, "drain_onchain", |out| unsafe {
            (self.abi.drain_onchain)(dest.as_ptr(), no_sync, out)
        })
    }

    pub fn send_many_onchain(&self, outputs: &[SendManyOutput], no_sync: bool) -> BridgeResult<String> {
        self.require_session()?;
        debug!(outputs = outputs.len(), no_sync, "bark_send_many_onchain");
        let dests: Vec<&str> = outputs.iter().map(|o| o.destination.as_str()).collect();
        let dests = CStringArray::new("destination", dests.as_slice())?;
        let amounts: Vec<u64> = outputs.iter().map(|o| o.amount_sat).collect();
        call_string(&self.abi, "send_many_onchain", |out| unsafe {
            (self.abi.send_many_onchain)(dests.as_ptr(), amounts.as_ptr(), dests.len(), no_sync, out)
        })
    }

    // ---------------------------------------------------------------- vtxos

    /// Public key at `index`, or the next unused one when absent.
    pub fn get_vtxo_pubkey(&self, index: Option<u32>) -> BridgeResult<String> {
        self.require_session()?;
        debug!(?index, "bark_get_vtxo_pubkey");
        let index = OptionalScalar::new(index);
        call_string(&self.abi, "get_vtxo_pubkey", |out| unsafe {
            (self.abi.get_vtxo_pubkey)(index.as_ptr(), out)
        })
    }

    /// Opaque JSON text, passed through unparsed.
    pub fn get_vtxos(&self, no_sync: bool) -> BridgeResult<String> {
        self.require_session()?;
        debug!(no_sync, "bark_get_vtxos");
        call_string(&self.abi, "get_vtxos", |out| unsafe { (self.abi.get_vtxos)(no_sync, out) })
    }

    /// `None` when the wallet holds no expiring VTXO.
    pub fn get_first_expiring_vtxo_blockheight(&self) -> BridgeResult<Option<u32>> {
        self.require_session()?;
        debug!("bark_get_first_expiring_vtxo_blockheight");
        call_optional_u32(&self.abi, |has, out| unsafe {
            (self.abi.get_first_expiring_vtxo_blockheight)(has, out)
        })
    }

    pub fn get_next_required_refresh_blockheight(&self) -> BridgeResult<Option<u32>> {
        self.require_session()?;
        debug!("bark_get_next_required_refresh_blockheight");
        call_optional_u32(&self.abi, |has, out| unsafe {
            (self.abi.get_next_required_refresh_blockheight)(has, out)
        })
    }

    // ---------------------------------------------------------------- rounds

    fn round(
        &self,
        op: &str,
        call: impl FnOnce(*mut *mut crate::abi::AbiRoundStatus) -> *mut crate::abi::AbiError,
    ) -> BridgeResult<RoundStatus> {
        let status = call_out(&self.abi, op, self.abi.free_round_status, call)?;
        match status.get() {
            Some(raw) => unsafe { RoundStatus::from_abi(raw) },
            None => Err(BridgeError::marshalling(format!("{op}: success without output"))),
        }
    }

    pub fn refresh_vtxos(&self, mode: &RefreshMode, no_sync: bool) -> BridgeResult<RoundStatus> {
        self.require_session()?;
        debug!(mode = ?mode.tag(), no_sync, "bark_refresh_vtxos");
        let enc = EncodedRefresh::new(mode)?;
        self.round("refresh_vtxos", |out| unsafe { (self.abi.refresh_vtxos)(enc.as_abi(), no_sync, out) })
    }

    pub fn board_amount(&self, amount_sat: u64, no_sync: bool) -> BridgeResult<RoundStatus> {
        self.require_session()?;
        debug!(amount_sat, no_sync, "bark_board_amount");
        self.round("board_amount", |out| unsafe { (self.abi.board_amount)(amount_sat, no_sync, out) })
    }

    pub fn board_all(&self, no_sync: bool) -> BridgeResult<RoundStatus> {
        self.require_session()?;
        debug!(no_sync, "bark_board_all");
        self.round("board_all", |out| unsafe { (self.abi.board_all)(no_sync, out) })
    }

    pub fn send_round_onchain(&self, destination: &str, amount_sat: u64, no_sync: bool) -> BridgeResult<RoundStatus> {
        self.require_session()?;
        debug!(destination, amount_sat, no_sync, "bark_send_round_onchain");
        let dest = CStringArg::new("destination", destination)?;
        self.round("send_round_onchain", |out| unsafe {
            (self.abi.send_round_onchain)(dest.as_ptr(), amount_sat, no_sync, out)
        })
    }

    /// `address` absent means an address of the wallet itself.
    pub fn offboard_specific(&self, vtxo_ids: &[String], address: Option<&str>, no_sync: bool) -> BridgeResult<RoundStatus> {
        self.require_session()?;
        debug!(vtxos = vtxo_ids.len(), has_address = address.is_some(), no_sync, "bark_offboard_specific");
        let ids = CStringArray::new("vtxo id", vtxo_ids)?;
        let address = CStringArg::optional("address", address)?;
        self.round("offboard_specific", |out| unsafe {
            (self.abi.offboard_specific)(ids.as_ptr(), ids.len(), optional_ptr(&address), no_sync, out)
        })
    }

    pub fn offboard_all(&self, address: Option<&str>, no_sync: bool) -> BridgeResult<RoundStatus> {
        self.require_session()?;
        debug!(has_address = address.is_some(), no_sync, "bark_offboard_all");
        let address = CStringArg::optional("address", address)?;
        self.round("offboard_all", |out| unsafe { (self.abi.offboard_all)(optional_ptr(&address), no_sync, out) })
    }

    // ---------------------------------------------------------------- payments

    /// Pay an Ark address, Lightning invoice, lightning address or on-chain
    /// address. `amount_sat` absent means "take it from the invoice".
    pub fn send(&self, destination: &str, amount_sat: Option<u64>, comment: Option<&str>, no_sync: bool) -> BridgeResult<PaymentResult> {
        self.require_session()?;
        debug!(destination, ?amount_sat, has_comment = comment.is_some(), no_sync, "bark_send");
        let dest = CStringArg::new("destination", destination)?;
        let amount = OptionalScalar::new(amount_sat);
        let comment = CStringArg::optional("comment", comment)?;
        let result = call_out(&self.abi, "send", self.abi.free_payment_result, |out| unsafe {
            (self.abi.send)(dest.as_ptr(), amount.as_ptr(), optional_ptr(&comment), no_sync, out)
        })?;
        match result.get() {
            Some(raw) => unsafe { PaymentResult::from_abi(raw) },
            None => Err(BridgeError::marshalling("send: success without output")),
        }
    }

    pub fn bolt11_invoice(&self, amount_msat: u64) -> BridgeResult<Bolt11Invoice> {
        self.require_session()?;
        debug!(amount_msat, "bark_bolt11_invoice");
        let invoice = call_out(&self.abi, "bolt11_invoice", self.abi.free_bolt11_invoice, |out| unsafe {
            (self.abi.bolt11_invoice)(amount_msat, out)
        })?;
        match invoice.get() {
            Some(raw) => unsafe { Bolt11Invoice::from_abi(raw) },
            None => Err(BridgeError::marshalling("bolt11_invoice: success without output")),
        }
    }

    pub fn claim_bolt11_payment(&self, bolt11: &str) -> BridgeResult<()> {
        self.require_session()?;
        debug!("bark_claim_bolt11_payment");
        let invoice = CStringArg::new("bolt11", bolt11)?;
        check(&self.abi, unsafe { (self.abi.claim_bolt11_payment)(invoice.as_ptr()) })
    }

    /// Claim the incoming payment for `payment_hash`. With `wait` the engine
    /// blocks until the payer's HTLCs arrive.
    pub fn try_claim_lightning_receive(&self, payment_hash: &str, wait: bool, token: Option<&str>) -> BridgeResult<()> {
        self.require_session()?;
        debug!(payment_hash, wait, has_token = token.is_some(), "bark_try_claim_lightning_receive");
        let hash = CStringArg::new("payment_hash", payment_hash)?;
        let token = CStringArg::optional("token", token)?;
        check(&self.abi, unsafe {
            (self.abi.try_claim_lightning_receive)(hash.as_ptr(), wait, optional_ptr(&token))
        })
    }

    // ---------------------------------------------------------------- exit

    /// Opaque JSON text. Exit calls take no `no_sync` flag.
    pub fn exit_start_specific(&self, vtxo_ids: &[String]) -> BridgeResult<String> {
        self.require_session()?;
        debug!(vtxos = vtxo_ids.len(), "bark_exit_start_specific");
        let ids = CStringArray::new("vtxo id", vtxo_ids)?;
        call_string(&self.abi, "exit_start_specific", |out| unsafe {
            (self.abi.exit_start_specific)(ids.as_ptr(), ids.len(), out)
        })
    }

    pub fn exit_start_all(&self) -> BridgeResult<String> {
        self.require_session()?;
        debug!("bark_exit_start_all");
        call_string(&self.abi, "exit_start_all", |out| unsafe { (self.abi.exit_start_all)(out) })
    }

    pub fn exit_progress_once(&self) -> BridgeResult<String> {
        self.require_session()?;
        debug!("bark_exit_progress_once");
        call_string(&self.abi, "exit_progress_once", |out| unsafe { (self.abi.exit_progress_once)(out) })
    }

    // ---------------------------------------------------------------- misc

    /// Keys at `index` without advancing the wallet's derivation counter.
    pub fn peak_keypair(&self, index: u32) -> BridgeResult<KeyPair> {
        self.require_session()?;
        debug!(index, "bark_peak_keypair");
        let keypair = call_out(&self.abi, "peak_keypair", self.abi.free_keypair, |out| unsafe {
            (self.abi.peak_keypair)(index, out)
        })?;
        match keypair.get() {
            Some(raw) => unsafe { KeyPair::from_abi(raw) },
            None => Err(BridgeError::marshalling("peak_keypair: success without output")),
        }
    }

    pub fn sign_message(&self, message: &str, index: u32) -> BridgeResult<String> {
        self.require_session()?;
        debug!(index, "bark_sign_message");
        let msg = CStringArg::new("message", message)?;
        call_string(&self.abi, "sign_message", |out| unsafe { (self.abi.sign_message)(msg.as_ptr(), index, out) })
    }

    pub fn verify_message(&self, message: &str, signature: &str, public_key: &str) -> BridgeResult<bool> {
        self.require_session()?;
        debug!("bark_verify_message");
        let msg = CStringArg::new("message", message)?;
        let sig = CStringArg::new("signature", signature)?;
        let key = CStringArg::new("public key", public_key)?;
        let mut valid = false;
        check(&self.abi, unsafe { (self.abi.verify_message)(msg.as_ptr(), sig.as_ptr(), key.as_ptr(), &mut valid as *mut bool) })?;
        Ok(valid)
    }

    pub fn maintenance(&self) -> BridgeResult<()> {
        self.require_session()?;
        debug!("bark_maintenance");
        check(&self.abi, unsafe { (self.abi.maintenance)() })
    }

    /// Refresh the VTXOs the engine considers due, as one round.
    pub fn maintenance_refresh(&self) -> BridgeResult<()> {
        self.require_session()?;
        debug!("bark_maintenance_refresh");
        check(&self.abi, unsafe { (self.abi.maintenance_refresh)() })
    }

    pub fn sync(&self) -> BridgeResult<()> {
        self.require_session()?;
        debug!("bark_sync");
        check(&self.abi, unsafe { (self.abi.sync)() })
    }
}

fn path_arg(path: &Path) -> BridgeResult<CStringArg> {
    let s = path
        .to_str()
        .ok_or_else(|| BridgeError::marshalling(format!("datadir is not UTF-8: {}", path.display())))?;
    CStringArg::new("datadir", s)
}
