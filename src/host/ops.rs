//! Operation catalogue for hosts that speak JSON.
//!
//! Names match the managed runtime surface (camelCase). Arguments are a JSON
//! object, results are JSON: structured records as objects, pass-through
//! engine blobs as strings, `null` for void and for absent optionals.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ArkError, ArkResult};
use crate::host::convert::*;
use crate::host::slot::AsyncResultSlot;
use crate::surface::ArkClient;

pub type OpFuture = Pin<Box<dyn Future<Output = ArkResult<Value>> + Send + 'static>>;

pub const OPERATIONS: &[&str] = &[
    "createMnemonic",
    "createWallet",
    "loadWallet",
    "closeWallet",
    "isWalletLoaded",
    "getArkInfo",
    "getBalance",
    "getOnchainAddress",
    "getOnchainUtxos",
    "sendOnchain",
    "drainOnchain",
    "sendManyOnchain",
    "getVtxoPubkey",
    "getVtxos",
    "getFirstExpiringVtxoBlockheight",
    "getNextRequiredRefreshBlockheight",
    "refreshVtxos",
    "boardAmount",
    "boardAll",
    "send",
    "sendRoundOnchain",
    "offboardSpecific",
    "offboardAll",
    "exitStartSpecific",
    "exitStartAll",
    "exitProgressOnce",
    "bolt11Invoice",
    "claimBolt11Payment",
    "tryClaimLightningReceive",
    "peakKeyPair",
    "signMessage",
    "verifyMessage",
    "maintenance",
    "maintenanceRefresh",
    "sync",
];

fn json<T: Serialize + Send + 'static>(slot: AsyncResultSlot<T>) -> OpFuture {
    Box::pin(async move {
        let value = slot.await?;
        serde_json::to_value(value).map_err(|e| ArkError::new(format!("Failed to serialize result: {e}")))
    })
}

fn required_field<'a>(args: &'a Value, name: &str) -> ArkResult<&'a Value> {
    field(args, name).ok_or_else(|| ArkError::new(format!("Missing required argument '{name}'")))
}

/// Dispatch `operation` with `args`. Argument errors reject the returned
/// future without touching the bridge.
pub fn route(client: &ArkClient, operation: &str, args: &Value) -> OpFuture {
    match build(client, operation, args) {
        Ok(fut) => fut,
        Err(e) => {
            tracing::debug!(operation, error = %e, "rejected before dispatch");
            Box::pin(async move { Err(e) })
        }
    }
}

fn build(c: &ArkClient, op: &str, args: &Value) -> ArkResult<OpFuture> {
    if !(args.is_null() || args.is_object()) {
        return Err(ArkError::new("Arguments must be a JSON object"));
    }
    Ok(match op {
        "createMnemonic" => json(c.create_mnemonic()),
        "createWallet" => json(c.create_wallet(required_str(args, "datadir")?, create_options(required_field(args, "opts")?)?)),
        "loadWallet" => json(c.load_wallet(required_str(args, "datadir")?, create_options(required_field(args, "opts")?)?)),
        "closeWallet" => json(c.close_wallet()),
        "isWalletLoaded" => json(c.is_wallet_loaded_async()),
        "getArkInfo" => json(c.get_ark_info()),

        "getBalance" => json(c.get_balance(no_sync(args)?)),
        "getOnchainAddress" => json(c.get_onchain_address()),
        "getOnchainUtxos" => json(c.get_onchain_utxos(no_sync(args)?)),
        "sendOnchain" => json(c.send_onchain(required_str(args, "destination")?, required_u64(args, "amountSat")?, no_sync(args)?)),
        "drainOnchain" => json(c.drain_onchain(required_str(args, "destination")?, no_sync(args)?)),
        "sendManyOnchain" => json(c.send_many_onchain(send_many_outputs(required_field(args, "outputs")?)?, no_sync(args)?)),

        "getVtxoPubkey" => json(c.get_vtxo_pubkey(optional_u32(args, "index")?)),
        "getVtxos" => json(c.get_vtxos(no_sync(args)?)),
        "getFirstExpiringVtxoBlockheight" => json(c.get_first_expiring_vtxo_blockheight()),
        "getNextRequiredRefreshBlockheight" => json(c.get_next_required_refresh_blockheight()),

        "refreshVtxos" => json(c.refresh_vtxos(refresh_mode(required_field(args, "refreshOpts")?)?, no_sync(args)?)),
        "boardAmount" => json(c.board_amount(required_u64(args, "amountSat")?, no_sync(args)?)),
        "boardAll" => json(c.board_all(no_sync(args)?)),
        "sendRoundOnchain" => json(c.send_round_onchain(required_str(args, "destination")?, required_u64(args, "amountSat")?, no_sync(args)?)),
        "offboardSpecific" => json(c.offboard_specific(required_list(args, "vtxoIds")?, optional_str(args, "optionalAddress")?, no_sync(args)?)),
        "offboardAll" => json(c.offboard_all(optional_str(args, "optionalAddress")?, no_sync(args)?)),

        "send" => json(c.send(
            required_str(args, "destination")?,
            optional_u64(args, "amountSat")?,
            optional_str(args, "comment")?,
            no_sync(args)?,
        )),
        "bolt11Invoice" => json(c.bolt11_invoice(required_u64(args, "amountMsat")?)),
        "claimBolt11Payment" => json(c.claim_bolt11_payment(required_str(args, "bolt11")?)),
        "tryClaimLightningReceive" => json(c.try_claim_lightning_receive(
            required_str(args, "paymentHash")?,
            optional_bool(args, "wait")?.unwrap_or(false),
            optional_str(args, "token")?,
        )),

        "exitStartSpecific" => json(c.exit_start_specific(required_list(args, "vtxoIds")?)),
        "exitStartAll" => json(c.exit_start_all()),
        "exitProgressOnce" => json(c.exit_progress_once()),

        "peakKeyPair" => json(c.peak_keypair(required_u32(args, "index")?)),
        "signMessage" => json(c.sign_message(required_str(args, "message")?, required_u32(args, "index")?)),
        "verifyMessage" => json(c.verify_message(
            required_str(args, "message")?,
            required_str(args, "signature")?,
            required_str(args, "publicKey")?,
        )),
        "maintenance" => json(c.maintenance()),
        "maintenanceRefresh" => json(c.maintenance_refresh()),
        "sync" => json(c.sync()),

        other => return Err(ArkError::new(format!("Unknown operation '{other}'"))),
    })
}
