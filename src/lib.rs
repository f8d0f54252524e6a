//! nitro-ark: the bark Ark wallet engine, bridged to mobile runtimes.
//!
//! # Architecture
//!
//! ```text
//! App (JS / Swift / Kotlin)
//!   │
//!   ├── host (adapters)
//!   │     ├── callback  ark_host_call(op, json, ctx, completion)
//!   │     ├── android   NitroArkNative.call(op, json, CompletableFuture)
//!   │     ├── ops       operation catalogue, JSON in / JSON out
//!   │     ├── convert   loose host values → strict bridge shapes
//!   │     └── dispatch  tokio blocking pool, one AsyncResultSlot per call
//!   │
//!   ├── surface (ArkClient)  typed async operations, light validation
//!   │
//!   ├── bridge (Bridge)      WalletSession slot, encode / decode, ownership
//!   │
//!   └── abi (EngineAbi)      repr(C) structs, bark_* function table
//!         └── engine (external, linked with `linked-engine`)
//! ```
//!
//! # Ownership
//!
//! Input strings are borrowed by the engine for one call. Every buffer the
//! engine returns is guarded the moment the call returns, copied, and released
//! exactly once through its paired `bark_free_*` function.
//!
//! # Features
//!
//! - `linked-engine` - link the engine's `bark_*` symbols, `ArkClient::linked()`
//! - `android` - JNI adapter (`jni`)
//!
//! # Usage
//!
//! ```ignore
//! use nitro_ark::{ArkClient, CreateOptions, ConfigOptions, Network};
//!
//! let client = ArkClient::linked();
//! let opts = CreateOptions::new(Network::Signet)
//!     .with_mnemonic(client.create_mnemonic().await?)
//!     .with_config(ConfigOptions::new().with_ark("https://ark.signet.2nd.dev"));
//!
//! client.create_wallet("/data/wallet", opts.clone()).await?;
//! client.load_wallet("/data/wallet", opts).await?;
//!
//! let status = client.board_amount(50_000, false).await?;
//! assert!(status.error.is_none());
//! ```

pub mod abi;
pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod surface;

pub use abi::EngineAbi;
pub use bridge::{
    ArkInfo, Balance, Bolt11Invoice, Bridge, KeyPair, PaymentKind, PaymentResult, RefreshMode, RoundState,
    RoundStatus, SendManyOutput, Session,
};
pub use config::{ConfigOptions, CreateOptions, Network};
pub use error::{ArkError, ArkResult, BridgeError, BridgeResult};
pub use host::dispatch::Dispatcher;
pub use host::slot::AsyncResultSlot;
pub use surface::ArkClient;
