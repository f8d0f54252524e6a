//! Public Surface API: one async operation per wallet capability.
//!
//! Every method returns an [`AsyncResultSlot`] and never blocks the caller.
//! Arguments get light validation here (empty required strings, zero
//! amounts, empty lists, malformed mnemonics) so obviously bad calls are
//! rejected without crossing the boundary. Business rules belong to the
//! engine.
//!
//! # `no_sync`
//!
//! The flag is part of each operation's own contract and is not uniform:
//! balance, UTXO/VTXO listing, on-chain sends, rounds, `send` and offboards
//! take it; exits, invoices, lightning claims, key/signing and lifecycle
//! calls do not.
//!
//! # Concurrency
//!
//! Calls may run concurrently. Do not issue overlapping session-mutating
//! calls (boards, sends, refreshes, exits); the engine decides what is safe
//! to interleave, not the bridge. There is no cancellation and no timeout:
//! a hung engine call leaves its slot pending.

use std::path::PathBuf;
use std::sync::Arc;

use crate::abi::EngineAbi;
use crate::bridge::{
    ArkInfo, Balance, Bolt11Invoice, Bridge, KeyPair, PaymentResult, RefreshMode, RoundStatus, SendManyOutput,
};
use crate::config::CreateOptions;
use crate::error::{ArkError, ArkResult, BridgeResult};
use crate::host::dispatch::Dispatcher;
use crate::host::slot::AsyncResultSlot;

macro_rules! precheck {
    ($check:expr) => {
        if let Err(e) = $check {
            return AsyncResultSlot::rejected(e);
        }
    };
}

fn non_empty(value: &str, what: &str) -> ArkResult<()> {
    if value.trim().is_empty() {
        return Err(ArkError::new(format!("{what} is required")));
    }
    Ok(())
}

fn positive(amount: u64, what: &str) -> ArkResult<()> {
    if amount == 0 {
        return Err(ArkError::new(format!("{what} must be greater than zero")));
    }
    Ok(())
}

fn non_empty_list<T>(items: &[T], what: &str) -> ArkResult<()> {
    if items.is_empty() {
        return Err(ArkError::new(format!("{what} must not be empty")));
    }
    Ok(())
}

fn valid_mnemonic(opts: &CreateOptions) -> ArkResult<()> {
    match opts.mnemonic.as_deref() {
        None => Ok(()),
        Some(m) => {
            non_empty(m, "Mnemonic")?;
            bip39::Mnemonic::parse(m)
                .map(|_| ())
                .map_err(|e| ArkError::new(format!("Invalid mnemonic: {e}")))
        }
    }
}

/// Handle to the bridge. Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct ArkClient {
    bridge: Arc<Bridge>,
    dispatcher: Dispatcher,
}

impl ArkClient {
    pub fn new(abi: EngineAbi) -> Self {
        Self::with_dispatcher(abi, Dispatcher::shared())
    }

    pub fn with_dispatcher(abi: EngineAbi, dispatcher: Dispatcher) -> Self {
        Self { bridge: Arc::new(Bridge::new(abi)), dispatcher }
    }

    #[cfg(feature = "linked-engine")]
    pub fn linked() -> Self {
        Self::new(EngineAbi::linked())
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn call<T, F>(&self, op: &'static str, work: F) -> AsyncResultSlot<T>
    where
        T: Send + 'static,
        F: FnOnce(&Bridge) -> BridgeResult<T> + Send + 'static,
    {
        let bridge = Arc::clone(&self.bridge);
        self.dispatcher.run(move || {
            work(&bridge).map_err(|e| {
                tracing::debug!(op, error = %e, "operation failed");
                ArkError::from(e)
            })
        })
    }

    // ---------------------------------------------------------------- lifecycle

    pub fn create_mnemonic(&self) -> AsyncResultSlot<String> {
        self.call("createMnemonic", |b| b.create_mnemonic())
    }

    pub fn create_wallet(&self, datadir: impl Into<PathBuf>, opts: CreateOptions) -> AsyncResultSlot<()> {
        let datadir = datadir.into();
        precheck!(non_empty(&datadir.to_string_lossy(), "Data directory"));
        precheck!(valid_mnemonic(&opts));
        self.call("createWallet", move |b| b.create_wallet(&datadir, &opts))
    }

    pub fn load_wallet(&self, datadir: impl Into<PathBuf>, opts: CreateOptions) -> AsyncResultSlot<()> {
        let datadir = datadir.into();
        precheck!(non_empty(&datadir.to_string_lossy(), "Data directory"));
        precheck!(valid_mnemonic(&opts));
        self.call("loadWallet", move |b| b.load_wallet(&datadir, &opts))
    }

    pub fn close_wallet(&self) -> AsyncResultSlot<()> {
        self.call("closeWallet", |b| b.close_wallet())
    }

    /// Synchronous read of the session slot. Never crosses the boundary.
    pub fn is_wallet_loaded(&self) -> bool {
        self.bridge.is_wallet_loaded()
    }

    pub fn is_wallet_loaded_async(&self) -> AsyncResultSlot<bool> {
        AsyncResultSlot::resolved(self.is_wallet_loaded())
    }

    pub fn get_ark_info(&self) -> AsyncResultSlot<ArkInfo> {
        self.call("getArkInfo", |b| b.get_ark_info())
    }

    // ---------------------------------------------------------------- on-chain

    pub fn get_balance(&self, no_sync: bool) -> AsyncResultSlot<Balance> {
        self.call("getBalance", move |b| b.get_balance(no_sync))
    }

    pub fn get_onchain_address(&self) -> AsyncResultSlot<String> {
        self.call("getOnchainAddress", |b| b.get_onchain_address())
    }

    pub fn get_onchain_utxos(&self, no_sync: bool) -> AsyncResultSlot<String> {
        self.call("getOnchainUtxos", move |b| b.get_onchain_utxos(no_sync))
    }

    pub fn send_onchain(&self, destination: String, amount_sat: u64, no_sync: bool) -> AsyncResultSlot<String> {
        precheck!(non_empty(&destination, "Destination"));
        precheck!(positive(amount_sat, "Amount"));
        self.call("sendOnchain", move |b| b.send_onchain(&destination, amount_sat, no_sync))
    }

    pub fn drain_onchain(&self, destination: String, no_sync: bool) -> AsyncResultSlot<String> {
        precheck!(non_empty(&destination, "Destination"));
        self.call("drainOnchain", move |b| b.drain_onchain(&destination, no_sync))
    }

    pub fn send_many_onchain(&self, outputs: Vec<SendManyOutput>, no_sync: bool) -> AsyncResultSlot<String> {
        precheck!(non_empty_list(&outputs, "Outputs"));
        for o in &outputs {
            precheck!(non_empty(&o.destination, "Destination"));
            precheck!(positive(o.amount_sat, "Amount"));
        }
        self.call("sendManyOnchain", move |b| b.send_many_onchain(&outputs, no_sync))
    }

    // ---------------------------------------------------------------- vtxos

    pub fn get_vtxo_pubkey(&self, index: Option<u32>) -> AsyncResultSlot<String> {
        self.call("getVtxoPubkey", move |b| b.get_vtxo_pubkey(index))
    }

    pub fn get_vtxos(&self, no_sync: bool) -> AsyncResultSlot<String> {
        self.call("getVtxos", move |b| b.get_vtxos(no_sync))
    }

    pub fn get_first_expiring_vtxo_blockheight(&self) -> AsyncResultSlot<Option<u32>> {
        self.call("getFirstExpiringVtxoBlockheight", |b| b.get_first_expiring_vtxo_blockheight())
    }

    pub fn get_next_required_refresh_blockheight(&self) -> AsyncResultSlot<Option<u32>> {
        self.call("getNextRequiredRefreshBlockheight", |b| b.get_next_required_refresh_blockheight())
    }

    // ---------------------------------------------------------------- rounds

    pub fn refresh_vtxos(&self, mode: RefreshMode, no_sync: bool) -> AsyncResultSlot<RoundStatus> {
        if let RefreshMode::Specific(ids) = &mode {
            precheck!(non_empty_list(ids, "VTXO ids"));
        }
        self.call("refreshVtxos", move |b| b.refresh_vtxos(&mode, no_sync))
    }

    pub fn board_amount(&self, amount_sat: u64, no_sync: bool) -> AsyncResultSlot<RoundStatus> {
        precheck!(positive(amount_sat, "Amount"));
        self.call("boardAmount", move |b| b.board_amount(amount_sat, no_sync))
    }

    pub fn board_all(&self, no_sync: bool) -> AsyncResultSlot<RoundStatus> {
        self.call("boardAll", move |b| b.board_all(no_sync))
    }

    pub fn send_round_onchain(&self, destination: String, amount_sat: u64, no_sync: bool) -> AsyncResultSlot<RoundStatus> {
        precheck!(non_empty(&destination, "Destination"));
        precheck!(positive(amount_sat, "Amount"));
        self.call("sendRoundOnchain", move |b| b.send_round_onchain(&destination, amount_sat, no_sync))
    }

    pub fn offboard_specific(&self, vtxo_ids: Vec<String>, address: Option<String>, no_sync: bool) -> AsyncResultSlot<RoundStatus> {
        precheck!(non_empty_list(&vtxo_ids, "VTXO ids"));
        self.call("offboardSpecific", move |b| b.offboard_specific(&vtxo_ids, address.as_deref(), no_sync))
    }

    pub fn offboard_all(&self, address: Option<String>, no_sync: bool) -> AsyncResultSlot<RoundStatus> {
        self.call("offboardAll", move |b| b.offboard_all(address.as_deref(), no_sync))
    }

    // ---------------------------------------------------------------- payments

    pub fn send(&self, destination: String, amount_sat: Option<u64>, comment: Option<String>, no_sync: bool) -> AsyncResultSlot<PaymentResult> {
        precheck!(non_empty(&destination, "Destination"));
        if let Some(amount) = amount_sat {
            precheck!(positive(amount, "Amount"));
        }
        self.call("send", move |b| b.send(&destination, amount_sat, comment.as_deref(), no_sync))
    }

    pub fn bolt11_invoice(&self, amount_msat: u64) -> AsyncResultSlot<Bolt11Invoice> {
        precheck!(positive(amount_msat, "Amount"));
        self.call("bolt11Invoice", move |b| b.bolt11_invoice(amount_msat))
    }

    pub fn claim_bolt11_payment(&self, bolt11: String) -> AsyncResultSlot<()> {
        precheck!(non_empty(&bolt11, "Invoice"));
        self.call("claimBolt11Payment", move |b| b.claim_bolt11_payment(&bolt11))
    }

    /// An empty `token` is the same as no token.
    pub fn try_claim_lightning_receive(&self, payment_hash: String, wait: bool, token: Option<String>) -> AsyncResultSlot<()> {
        precheck!(non_empty(&payment_hash, "Payment hash"));
        let token = token.filter(|t| !t.is_empty());
        self.call("tryClaimLightningReceive", move |b| {
            b.try_claim_lightning_receive(&payment_hash, wait, token.as_deref())
        })
    }

    // ---------------------------------------------------------------- exit

    pub fn exit_start_specific(&self, vtxo_ids: Vec<String>) -> AsyncResultSlot<String> {
        precheck!(non_empty_list(&vtxo_ids, "VTXO ids"));
        self.call("exitStartSpecific", move |b| b.exit_start_specific(&vtxo_ids))
    }

    pub fn exit_start_all(&self) -> AsyncResultSlot<String> {
        self.call("exitStartAll", |b| b.exit_start_all())
    }

    pub fn exit_progress_once(&self) -> AsyncResultSlot<String> {
        self.call("exitProgressOnce", |b| b.exit_progress_once())
    }

    // ---------------------------------------------------------------- misc

    pub fn peak_keypair(&self, index: u32) -> AsyncResultSlot<KeyPair> {
        self.call("peakKeyPair", move |b| b.peak_keypair(index))
    }

    pub fn sign_message(&self, message: String, index: u32) -> AsyncResultSlot<String> {
        precheck!(non_empty(&message, "Message"));
        self.call("signMessage", move |b| b.sign_message(&message, index))
    }

    pub fn verify_message(&self, message: String, signature: String, public_key: String) -> AsyncResultSlot<bool> {
        precheck!(non_empty(&message, "Message"));
        precheck!(non_empty(&signature, "Signature"));
        precheck!(non_empty(&public_key, "Public key"));
        self.call("verifyMessage", move |b| b.verify_message(&message, &signature, &public_key))
    }

    pub fn maintenance(&self) -> AsyncResultSlot<()> {
        self.call("maintenance", |b| b.maintenance())
    }

    pub fn maintenance_refresh(&self) -> AsyncResultSlot<()> {
        self.call("maintenanceRefresh", |b| b.maintenance_refresh())
    }

    pub fn sync(&self) -> AsyncResultSlot<()> {
        self.call("sync", |b| b.sync())
    }
}
