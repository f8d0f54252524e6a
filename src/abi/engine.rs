//! The engine's foreign-callable surface as a table of function pointers.
//!
//! The bridge never names a `bark_*` symbol directly. It calls through an
//! [`EngineAbi`], which is either the linked engine (`linked-engine` feature)
//! or any other implementation of the same contract.

use std::os::raw::c_char;

use super::types::*;

type Err = *mut AbiError;
type OutStr = *mut *mut c_char;
type OutRound = *mut *mut AbiRoundStatus;

#[derive(Debug, Clone, Copy)]
pub struct EngineAbi {
    pub init_logger: unsafe extern "C" fn(),

    // Release functions. Null is a no-op for all of them.
    pub free_error: unsafe extern "C" fn(*mut AbiError),
    pub free_string: unsafe extern "C" fn(*mut c_char),
    pub free_round_status: unsafe extern "C" fn(*mut AbiRoundStatus),
    pub free_payment_result: unsafe extern "C" fn(*mut AbiPaymentResult),
    pub free_ark_info: unsafe extern "C" fn(*mut AbiArkInfo),
    pub free_bolt11_invoice: unsafe extern "C" fn(*mut AbiBolt11Invoice),
    pub free_keypair: unsafe extern "C" fn(*mut AbiKeyPair),

    pub create_mnemonic: unsafe extern "C" fn(OutStr) -> Err,
    pub create_wallet: unsafe extern "C" fn(*const c_char, AbiCreateOpts) -> Err,
    pub load_wallet: unsafe extern "C" fn(*const c_char, AbiCreateOpts) -> Err,
    pub close_wallet: unsafe extern "C" fn() -> Err,
    pub get_ark_info: unsafe extern "C" fn(*mut *mut AbiArkInfo) -> Err,

    pub get_balance: unsafe extern "C" fn(bool, *mut AbiBalance) -> Err,
    pub get_onchain_address: unsafe extern "C" fn(OutStr) -> Err,
    pub get_onchain_utxos: unsafe extern "C" fn(bool, OutStr) -> Err,
    pub send_onchain: unsafe extern "C" fn(*const c_char, u64, bool, OutStr) -> Err,
    pub drain_onchain: unsafe extern "C" fn(*const c_char, bool, OutStr) -> Err,
    pub send_many_onchain:
        unsafe extern "C" fn(*const *const c_char, *const u64, usize, bool, OutStr) -> Err,

    pub get_vtxo_pubkey: unsafe extern "C" fn(*const u32, OutStr) -> Err,
    pub get_vtxos: unsafe extern "C" fn(bool, OutStr) -> Err,
    pub get_first_expiring_vtxo_blockheight: unsafe extern "C" fn(*mut bool, *mut u32) -> Err,
    pub get_next_required_refresh_blockheight: unsafe extern "C" fn(*mut bool, *mut u32) -> Err,

    pub refresh_vtxos: unsafe extern "C" fn(AbiRefreshOpts, bool, OutRound) -> Err,
    pub board_amount: unsafe extern "C" fn(u64, bool, OutRound) -> Err,
    pub board_all: unsafe extern "C" fn(bool, OutRound) -> Err,

    pub send: unsafe extern "C" fn(
        *const c_char,
        *const u64,
        *const c_char,
        bool,
        *mut *mut AbiPaymentResult,
    ) -> Err,
    pub send_round_onchain: unsafe extern "C" fn(*const c_char, u64, bool, OutRound) -> Err,
    pub offboard_specific:
        unsafe extern "C" fn(*const *const c_char, usize, *const c_char, bool, OutRound) -> Err,
    pub offboard_all: unsafe extern "C" fn(*const c_char, bool, OutRound) -> Err,

    pub exit_start_specific: unsafe extern "C" fn(*const *const c_char, usize, OutStr) -> Err,
    pub exit_start_all: unsafe extern "C" fn(OutStr) -> Err,
    pub exit_progress_once: unsafe extern "C" fn(OutStr) -> Err,

    pub bolt11_invoice: unsafe extern "C" fn(u64, *mut *mut AbiBolt11Invoice) -> Err,
    pub claim_bolt11_payment: unsafe extern "C" fn(*const c_char) -> Err,
    pub try_claim_lightning_receive: unsafe extern "C" fn(*const c_char, bool, *const c_char) -> Err,

    pub peak_keypair: unsafe extern "C" fn(u32, *mut *mut AbiKeyPair) -> Err,
    pub sign_message: unsafe extern "C" fn(*const c_char, u32, OutStr) -> Err,
    pub verify_message:
        unsafe extern "C" fn(*const c_char, *const c_char, *const c_char, *mut bool) -> Err,
    pub maintenance: unsafe extern "C" fn() -> Err,
    pub maintenance_refresh: unsafe extern "C" fn() -> Err,
    pub sync: unsafe extern "C" fn() -> Err,
}

#[cfg(feature = "linked-engine")]
mod linked {
    use super::*;

    extern "C" {
        pub fn bark_init_logger();
        pub fn bark_free_error(error: *mut AbiError);
        pub fn bark_free_string(s: *mut c_char);
        pub fn bark_free_round_status(status: *mut AbiRoundStatus);
        pub fn bark_free_payment_result(result: *mut AbiPaymentResult);
        pub fn bark_free_ark_info(info: *mut AbiArkInfo);
        pub fn bark_free_bolt11_invoice(invoice: *mut AbiBolt11Invoice);
        pub fn bark_free_keypair(keypair: *mut AbiKeyPair);

        pub fn bark_create_mnemonic(out: OutStr) -> Err;
        pub fn bark_create_wallet(datadir: *const c_char, opts: AbiCreateOpts) -> Err;
        pub fn bark_load_wallet(datadir: *const c_char, opts: AbiCreateOpts) -> Err;
        pub fn bark_close_wallet() -> Err;
        pub fn bark_get_ark_info(out: *mut *mut AbiArkInfo) -> Err;

        pub fn bark_get_balance(no_sync: bool, out: *mut AbiBalance) -> Err;
        pub fn bark_get_onchain_address(out: OutStr) -> Err;
        pub fn bark_get_onchain_utxos(no_sync: bool, out: OutStr) -> Err;
        pub fn bark_send_onchain(dest: *const c_char, amount_sat: u64, no_sync: bool, out: OutStr) -> Err;
        pub fn bark_drain_onchain(dest: *const c_char, no_sync: bool, out: OutStr) -> Err;
        pub fn bark_send_many_onchain(
            destinations: *const *const c_char,
            amounts_sat: *const u64,
            num: usize,
            no_sync: bool,
            out: OutStr,
        ) -> Err;

        pub fn bark_get_vtxo_pubkey(index: *const u32, out: OutStr) -> Err;
        pub fn bark_get_vtxos(no_sync: bool, out: OutStr) -> Err;
        pub fn bark_get_first_expiring_vtxo_blockheight(has: *mut bool, out: *mut u32) -> Err;
        pub fn bark_get_next_required_refresh_blockheight(has: *mut bool, out: *mut u32) -> Err;

        pub fn bark_refresh_vtxos(opts: AbiRefreshOpts, no_sync: bool, out: OutRound) -> Err;
        pub fn bark_board_amount(amount_sat: u64, no_sync: bool, out: OutRound) -> Err;
        pub fn bark_board_all(no_sync: bool, out: OutRound) -> Err;

        pub fn bark_send(
            destination: *const c_char,
            amount_sat: *const u64,
            comment: *const c_char,
            no_sync: bool,
            out: *mut *mut AbiPaymentResult,
        ) -> Err;
        pub fn bark_send_round_onchain(dest: *const c_char, amount_sat: u64, no_sync: bool, out: OutRound) -> Err;
        pub fn bark_offboard_specific(
            ids: *const *const c_char,
            num: usize,
            address: *const c_char,
            no_sync: bool,
            out: OutRound,
        ) -> Err;
        pub fn bark_offboard_all(address: *const c_char, no_sync: bool, out: OutRound) -> Err;

        pub fn bark_exit_start_specific(ids: *const *const c_char, num: usize, out: OutStr) -> Err;
        pub fn bark_exit_start_all(out: OutStr) -> Err;
        pub fn bark_exit_progress_once(out: OutStr) -> Err;

        pub fn bark_bolt11_invoice(amount_msat: u64, out: *mut *mut AbiBolt11Invoice) -> Err;
        pub fn bark_claim_bolt11_payment(bolt11: *const c_char) -> Err;
        pub fn bark_try_claim_lightning_receive(payment_hash: *const c_char, wait: bool, token: *const c_char) -> Err;

        pub fn bark_peak_keypair(index: u32, out: *mut *mut AbiKeyPair) -> Err;
        pub fn bark_sign_message(message: *const c_char, index: u32, out: OutStr) -> Err;
        pub fn bark_verify_message(
            message: *const c_char,
            signature: *const c_char,
            pubkey: *const c_char,
            out: *mut bool,
        ) -> Err;
        pub fn bark_maintenance() -> Err;
        pub fn bark_maintenance_refresh() -> Err;
        pub fn bark_sync() -> Err;
    }
}

#[cfg(feature = "linked-engine")]
impl EngineAbi {
    /// The engine statically linked into this binary.
    pub fn linked() -> Self {
        use linked::*;
        Self {
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
}
