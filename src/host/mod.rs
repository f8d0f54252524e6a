//! Host Adapters: managed runtimes to bridge and back.
//!
//! ```text
//! JS / Swift / Kotlin
//!   │  operation name + JSON args
//!   ▼
//! callback.rs (C completion)   android.rs (JNI CompletableFuture)
//!   │
//!   ▼
//! ops::route ── convert (validate, coerce) ── ArkClient (surface)
//!   │
//!   ▼
//! Dispatcher: spawn_blocking + catch_unwind ─▶ Bridge ─▶ EngineAbi
//!   │
//!   ▼
//! AsyncResultSlot settled once ─▶ completion / future completed
//! ```

pub mod callback;
pub mod convert;
pub mod dispatch;
pub mod ops;
pub mod slot;

#[cfg(feature = "android")]
pub mod android;

use std::sync::OnceLock;

use serde_json::Value;
use tokio::runtime::Handle;

use crate::error::{ArkError, ArkResult};
use crate::surface::ArkClient;
use dispatch::Dispatcher;
use ops::OpFuture;

static CLIENT: OnceLock<ArkClient> = OnceLock::new();

/// Install the process client used by the C and JNI entry points. Only the
/// first install wins; the rejected client is handed back.
pub fn install(client: ArkClient) -> Result<(), ArkClient> {
    CLIENT.set(client)
}

/// The installed client. With `linked-engine` the linked engine is installed
/// on first use.
pub fn client() -> ArkResult<&'static ArkClient> {
    #[cfg(feature = "linked-engine")]
    {
        Ok(CLIENT.get_or_init(ArkClient::linked))
    }
    #[cfg(not(feature = "linked-engine"))]
    {
        CLIENT.get().ok_or_else(|| ArkError::new("No engine installed"))
    }
}

/// Invokes a host completion exactly once. Dropped unfinished, it reports
/// the operation as lost instead of leaving the host waiting.
pub(crate) struct Completion<C: FnOnce(ArkResult<String>)>(Option<C>);

impl<C: FnOnce(ArkResult<String>)> Completion<C> {
    pub(crate) fn new(complete: C) -> Self {
        Self(Some(complete))
    }

    pub(crate) fn finish(mut self, result: ArkResult<String>) {
        if let Some(complete) = self.0.take() {
            complete(result);
        }
    }
}

impl<C: FnOnce(ArkResult<String>)> Drop for Completion<C> {
    fn drop(&mut self) {
        if let Some(complete) = self.0.take() {
            complete(Err(ArkError::new(slot::RESOLVER_DROPPED)));
        }
    }
}

/// Start this crate's tracing subscriber and, once a client is installed,
/// the engine's own logger. Safe to call more than once.
pub fn init_logging() {
    crate::logging::init_logging();
    match client() {
        Ok(c) => c.bridge().init_engine_logger(),
        Err(e) => tracing::debug!(error = %e, "engine logger not started"),
    }
}

fn parse_args(args_json: &str) -> ArkResult<Value> {
    if args_json.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(args_json).map_err(|e| ArkError::new(format!("Arguments are not valid JSON: {e}")))
}

fn rejected(error: ArkError) -> OpFuture {
    Box::pin(async move { Err(error) })
}

fn dispatcher_for(client: ArkResult<&ArkClient>) -> Dispatcher {
    client.map(|c| c.dispatcher().clone()).unwrap_or_else(|_| Dispatcher::shared())
}

/// Run `operation` on the installed client and hand the outcome, as JSON
/// text or an error message, to `complete`. Returns immediately; `complete`
/// always runs on another thread, failures before dispatch included.
pub(crate) fn call_json<C>(operation: &str, args_json: &str, complete: C)
where
    C: FnOnce(ArkResult<String>) + Send + 'static,
{
    let completion = Completion::new(complete);
    let prepared = client().and_then(|c| parse_args(args_json).map(|args| (c, args)));
    let (dispatcher, fut) = match prepared {
        Ok((c, args)) => {
            tracing::debug!(operation, "host call");
            (c.dispatcher().clone(), ops::route(c, operation, &args))
        }
        Err(e) => {
            tracing::debug!(operation, error = %e, "host call rejected");
            (dispatcher_for(client()), rejected(e))
        }
    };
    settle_on(dispatcher.handle(), completion, fut);
}

/// Report `error` through `complete` from another thread, for adapters that
/// fail before they have an operation to run.
pub(crate) fn reject_call<C>(error: ArkError, complete: C)
where
    C: FnOnce(ArkResult<String>) + Send + 'static,
{
    let dispatcher = dispatcher_for(client());
    settle_on(dispatcher.handle(), Completion::new(complete), rejected(error));
}

fn settle_on<C>(handle: ArkResult<Handle>, completion: Completion<C>, fut: OpFuture)
where
    C: FnOnce(ArkResult<String>) + Send + 'static,
{
    match handle {
        Ok(handle) => {
            // A task dropped unrun drops `completion`, which reports the loss.
            handle.spawn(async move {
                let result = fut.await.and_then(|value| {
                    serde_json::to_string(&value).map_err(|e| ArkError::new(format!("Failed to serialize result: {e}")))
                });
                completion.finish(result);
            });
        }
        Err(e) => {
            tracing::error!(error = %e, "no worker runtime; completing on a fallback thread");
            let spawned = std::thread::Builder::new()
                .name("nitro-ark-complete".into())
                .spawn(move || completion.finish(Err(e)));
            if let Err(e) = spawned {
                tracing::error!(error = %e, "could not start fallback completion thread");
            }
        }
    }
}
