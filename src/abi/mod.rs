//! Boundary ABI: the flat C contract of the wallet engine.
//!
//! Rules every caller relies on:
//! - fallible functions return `*mut AbiError`, null on success;
//! - on failure no out-parameter is written;
//! - every allocating function has exactly one paired release function;
//! - input strings are borrowed for the duration of the call only;
//! - optional scalars are nullable pointers, arrays are `(pointer, length)`.

mod engine;
mod types;

pub use engine::EngineAbi;
pub use types::*;
