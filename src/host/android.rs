//! JNI host adapter (feature `android`).
//!
//! Kotlin side:
//!
//! ```text
//! object NitroArkNative {
//!     external fun call(operation: String, argsJson: String?, future: CompletableFuture<String>)
//! }
//! ```
//!
//! The future is completed with the JSON result, or completed exceptionally
//! with a `RuntimeException` carrying the error message. Completion happens
//! on a worker thread attached to the JVM for the duration of the call.

use anyhow::{anyhow, Context, Result};
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use crate::error::{ArkError, ArkResult};

fn read_string(env: &mut JNIEnv, value: &JString) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let s: String = env.get_string(value).context("reading Java string")?.into();
    Ok(Some(s))
}

fn complete(vm: &JavaVM, future: &GlobalRef, result: ArkResult<String>) -> Result<()> {
    let mut env = vm.attach_current_thread().context("attaching worker thread to JVM")?;
    match result {
        Ok(json) => {
            let value = env.new_string(json).context("creating result string")?;
            env.call_method(future.as_obj(), "complete", "(Ljava/lang/Object;)Z", &[JValue::Object(&value)])
                .context("CompletableFuture.complete")?;
        }
        Err(e) => {
            let message = env.new_string(e.message).context("creating error message")?;
            let exception = env
                .new_object("java/lang/RuntimeException", "(Ljava/lang/String;)V", &[JValue::Object(&message)])
                .context("creating RuntimeException")?;
            env.call_method(
                future.as_obj(),
                "completeExceptionally",
                "(Ljava/lang/Throwable;)Z",
                &[JValue::Object(&exception)],
            )
            .context("CompletableFuture.completeExceptionally")?;
        }
    }
    Ok(())
}

fn start(env: &mut JNIEnv, operation: &JString, args_json: &JString, future: &JObject) -> Result<()> {
    if future.is_null() {
        return Err(anyhow!("future must not be null"));
    }
    let vm = env.get_java_vm().context("getting JavaVM")?;
    let future = env.new_global_ref(future).context("pinning future")?;

    let parsed = read_string(env, operation).and_then(|op| {
        let op = op.ok_or_else(|| anyhow!("Operation name is required"))?;
        Ok((op, read_string(env, args_json)?.unwrap_or_default()))
    });
    let finish = move |result: ArkResult<String>| {
        if let Err(e) = complete(&vm, &future, result) {
            tracing::error!(error = %e, "failed to complete Java future");
        }
    };
    match parsed {
        Ok((op, args)) => crate::host::call_json(&op, &args, finish),
        Err(e) => crate::host::reject_call(ArkError::new(e.to_string()), finish),
    }
    Ok(())
}

#[no_mangle]
pub extern "system" fn Java_com_margelo_nitro_nitroark_NitroArkNative_call<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    operation: JString<'local>,
    args_json: JString<'local>,
    future: JObject<'local>,
) {
    let started = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        start(&mut env, &operation, &args_json, &future)
    }));
    match started {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(error = %e, "NitroArkNative.call failed");
            let _ = env.throw_new("java/lang/IllegalArgumentException", e.to_string());
        }
        Err(_) => {
            tracing::error!("NitroArkNative.call panicked");
            let _ = env.throw_new("java/lang/IllegalStateException", "native panic");
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_margelo_nitro_nitroark_NitroArkNative_isWalletLoaded<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jni::sys::jboolean {
    let loaded = crate::host::client().map(|c| c.is_wallet_loaded()).unwrap_or(false);
    loaded as jni::sys::jboolean
}

#[no_mangle]
pub extern "system" fn Java_com_margelo_nitro_nitroark_NitroArkNative_initLogging<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    crate::host::init_logging();
}
