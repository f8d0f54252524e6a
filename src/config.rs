//! Wallet configuration - passed in by the host per call, never retained.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Bitcoin,
    #[default]
    Signet,
    Regtest,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bitcoin => "bitcoin",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" => Some(Network::Bitcoin),
            "signet" => Some(Network::Signet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine endpoints, credentials and tunables. Every field is independently
/// optional: `None` means "let the engine decide", never zero.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigOptions {
    pub ark: Option<String>,
    pub esplora: Option<String>,
    pub bitcoind: Option<String>,
    pub bitcoind_cookie: Option<String>,
    pub bitcoind_user: Option<String>,
    pub bitcoind_pass: Option<String>,
    pub vtxo_refresh_expiry_threshold: Option<u32>,
    /// sat/kvB
    pub fallback_fee_rate: Option<u64>,
    pub htlc_recv_claim_delta: Option<u16>,
    pub vtxo_exit_margin: Option<u16>,
    pub deep_round_confirmations: Option<u16>,
}

impl ConfigOptions {
    pub fn new() -> Self { Self::default() }
    pub fn with_ark(mut self, url: impl Into<String>) -> Self { self.ark = Some(url.into()); self }
    pub fn with_esplora(mut self, url: impl Into<String>) -> Self { self.esplora = Some(url.into()); self }
    pub fn with_bitcoind(mut self, url: impl Into<String>) -> Self { self.bitcoind = Some(url.into()); self }
    pub fn with_bitcoind_cookie(mut self, path: impl Into<String>) -> Self { self.bitcoind_cookie = Some(path.into()); self }
    pub fn with_bitcoind_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.bitcoind_user = Some(user.into());
        self.bitcoind_pass = Some(pass.into());
        self
    }
    pub fn with_vtxo_refresh_expiry_threshold(mut self, blocks: u32) -> Self { self.vtxo_refresh_expiry_threshold = Some(blocks); self }
    pub fn with_fallback_fee_rate(mut self, sat_per_kvb: u64) -> Self { self.fallback_fee_rate = Some(sat_per_kvb); self }
    pub fn with_htlc_recv_claim_delta(mut self, blocks: u16) -> Self { self.htlc_recv_claim_delta = Some(blocks); self }
    pub fn with_vtxo_exit_margin(mut self, blocks: u16) -> Self { self.vtxo_exit_margin = Some(blocks); self }
    pub fn with_deep_round_confirmations(mut self, confs: u16) -> Self { self.deep_round_confirmations = Some(confs); self }
}

// Credentials stay out of logs.
impl fmt::Debug for ConfigOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOptions")
            .field("ark", &self.ark)
            .field("esplora", &self.esplora)
            .field("bitcoind", &self.bitcoind)
            .field("bitcoind_cookie", &self.bitcoind_cookie.as_ref().map(|_| "<set>"))
            .field("bitcoind_user", &self.bitcoind_user.as_ref().map(|_| "<set>"))
            .field("bitcoind_pass", &self.bitcoind_pass.as_ref().map(|_| "<set>"))
            .field("vtxo_refresh_expiry_threshold", &self.vtxo_refresh_expiry_threshold)
            .field("fallback_fee_rate", &self.fallback_fee_rate)
            .field("htlc_recv_claim_delta", &self.htlc_recv_claim_delta)
            .field("vtxo_exit_margin", &self.vtxo_exit_margin)
            .field("deep_round_confirmations", &self.deep_round_confirmations)
            .finish()
    }
}

/// Options for creating or opening a wallet.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub network: Network,
    pub mnemonic: Option<String>,
    pub birthday_height: Option<u32>,
    pub config: ConfigOptions,
}

impl CreateOptions {
    pub fn new(network: Network) -> Self { Self { network, ..Default::default() } }
    pub fn with_mnemonic(mut self, m: impl Into<String>) -> Self { self.mnemonic = Some(m.into()); self }
    pub fn with_birthday_height(mut self, height: u32) -> Self { self.birthday_height = Some(height); self }
    pub fn with_config(mut self, c: ConfigOptions) -> Self { self.config = c; self }
}

impl fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateOptions")
            .field("network", &self.network)
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<set>"))
            .field("birthday_height", &self.birthday_height)
            .field("config", &self.config)
            .finish()
    }
}
