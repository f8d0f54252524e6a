//! Worker dispatch: every bridged call runs off the caller's thread.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::{ArkError, ArkResult};
use crate::host::slot::{slot, AsyncResultSlot};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn shared_runtime() -> ArkResult<&'static Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }
    let rt = Builder::new_multi_thread()
        .thread_name("nitro-ark-worker")
        .enable_all()
        .build()
        .map_err(|e| ArkError::new(format!("Failed to start worker runtime: {e}")))?;
    // A concurrent initialiser may win; the losing runtime is dropped here.
    Ok(RUNTIME.get_or_init(|| rt))
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Native call panicked: {detail}")
}

/// Schedules blocking bridge calls on a tokio blocking pool.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    handle: Option<Handle>,
}

impl Dispatcher {
    /// The process-wide worker runtime, started on first dispatch.
    pub fn shared() -> Self {
        Self { handle: None }
    }

    /// Dispatch onto a runtime the host already owns.
    pub fn on(handle: Handle) -> Self {
        Self { handle: Some(handle) }
    }

    pub(crate) fn handle(&self) -> ArkResult<Handle> {
        match &self.handle {
            Some(h) => Ok(h.clone()),
            None => shared_runtime().map(|rt| rt.handle().clone()),
        }
    }

    /// Run `work` on a worker thread and return its slot. A panic inside
    /// `work` rejects the slot instead of unwinding into the runtime.
    pub fn run<T, F>(&self, work: F) -> AsyncResultSlot<T>
    where
        T: Send + 'static,
        F: FnOnce() -> ArkResult<T> + Send + 'static,
    {
        let (resolver, result) = slot();
        match self.handle() {
            Ok(handle) => {
                // If the runtime is shutting down the closure is dropped unrun,
                // and the resolver's drop rejects the slot.
                handle.spawn_blocking(move || {
                    let outcome = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|panic| {
                        let message = panic_message(panic);
                        tracing::error!(%message, "bridged call panicked");
                        Err(ArkError::new(message))
                    });
                    resolver.settle(outcome);
                });
            }
            Err(e) => resolver.reject(e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn runs_off_the_calling_thread() {
        let caller = std::thread::current().id();
        let worker = Dispatcher::on(Handle::current()).run(move || Ok(std::thread::current().id())).await.unwrap();
        assert_ne!(caller, worker);
    }

    #[tokio::test]
    async fn panic_becomes_rejection() {
        let err = Dispatcher::on(Handle::current())
            .run::<(), _>(|| panic!("engine exploded"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Native call panicked: engine exploded");
    }

    #[test]
    fn shared_runtime_serves_plain_threads() {
        let slot = Dispatcher::shared().run(|| Ok(5u8));
        let value = futures_block_on(slot);
        assert_eq!(value, Ok(5));
    }

    fn futures_block_on<F: std::future::Future>(f: F) -> F::Output {
        Builder::new_current_thread().build().unwrap().block_on(f)
    }
}
