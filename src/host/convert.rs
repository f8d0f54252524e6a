//! Validating conversion of loosely typed host values into bridge shapes.
//!
//! Host runtimes hand us JavaScript-shaped JSON: numbers are doubles, fields
//! may be missing, `null` or `undefined`. One function per argument type turns
//! that into a strict value or a precondition error naming the field.
//!
//! Missing and `null` both mean absent. Absent never becomes zero.

use serde_json::{Map, Value};

use crate::bridge::{RefreshMode, SendManyOutput};
use crate::config::{ConfigOptions, CreateOptions, Network};
use crate::error::{ArkError, ArkResult};

/// Largest integer a JavaScript number represents exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

fn invalid(field: &str, expected: &str) -> ArkError {
    ArkError::new(format!("Invalid argument '{field}': expected {expected}"))
}

fn missing(field: &str) -> ArkError {
    ArkError::new(format!("Missing required argument '{field}'"))
}

/// A field of an argument object, with `null` folded into absence.
pub fn field<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

/// First present field among `names` (camelCase and snake_case spellings).
fn field_any<'a>(args: &'a Value, names: &[&str]) -> Option<(&'a Value, String)> {
    names.iter().find_map(|n| field(args, n).map(|v| (v, n.to_string())))
}

pub fn object<'a>(value: &'a Value, field: &str) -> ArkResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| invalid(field, "an object"))
}

pub fn to_u64(value: &Value, field: &str) -> ArkResult<u64> {
    let expected = "a non-negative integer";
    if let Some(n) = value.as_u64() {
        return if n <= MAX_SAFE_INTEGER { Ok(n) } else { Err(invalid(field, "an integer no larger than 2^53-1")) };
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= MAX_SAFE_INTEGER as f64 => Ok(f as u64),
        _ => Err(invalid(field, expected)),
    }
}

fn narrow<T: TryFrom<u64>>(value: &Value, field: &str, width: &str) -> ArkResult<T> {
    T::try_from(to_u64(value, field)?).map_err(|_| invalid(field, width))
}

pub fn to_u32(value: &Value, field: &str) -> ArkResult<u32> {
    narrow(value, field, "an integer that fits in 32 bits")
}

pub fn to_u16(value: &Value, field: &str) -> ArkResult<u16> {
    narrow(value, field, "an integer that fits in 16 bits")
}

pub fn to_string(value: &Value, field: &str) -> ArkResult<String> {
    value.as_str().map(str::to_owned).ok_or_else(|| invalid(field, "a string"))
}

pub fn to_bool(value: &Value, field: &str) -> ArkResult<bool> {
    value.as_bool().ok_or_else(|| invalid(field, "a boolean"))
}

pub fn to_string_list(value: &Value, field: &str) -> ArkResult<Vec<String>> {
    value
        .as_array()
        .ok_or_else(|| invalid(field, "an array of strings"))?
        .iter()
        .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| invalid(field, "an array of strings")))
        .collect()
}

pub fn required_str(args: &Value, name: &str) -> ArkResult<String> {
    field(args, name).map(|v| to_string(v, name)).unwrap_or_else(|| Err(missing(name)))
}

pub fn optional_str(args: &Value, name: &str) -> ArkResult<Option<String>> {
    field(args, name).map(|v| to_string(v, name)).transpose()
}

pub fn required_u64(args: &Value, name: &str) -> ArkResult<u64> {
    field(args, name).map(|v| to_u64(v, name)).unwrap_or_else(|| Err(missing(name)))
}

pub fn optional_u64(args: &Value, name: &str) -> ArkResult<Option<u64>> {
    field(args, name).map(|v| to_u64(v, name)).transpose()
}

pub fn required_u32(args: &Value, name: &str) -> ArkResult<u32> {
    field(args, name).map(|v| to_u32(v, name)).unwrap_or_else(|| Err(missing(name)))
}

pub fn optional_u32(args: &Value, name: &str) -> ArkResult<Option<u32>> {
    field(args, name).map(|v| to_u32(v, name)).transpose()
}

pub fn optional_u16(args: &Value, name: &str) -> ArkResult<Option<u16>> {
    field(args, name).map(|v| to_u16(v, name)).transpose()
}

pub fn required_list(args: &Value, name: &str) -> ArkResult<Vec<String>> {
    field(args, name).map(|v| to_string_list(v, name)).unwrap_or_else(|| Err(missing(name)))
}

pub fn optional_bool(args: &Value, name: &str) -> ArkResult<Option<bool>> {
    field(args, name).map(|v| to_bool(v, name)).transpose()
}

/// The `no_sync` flag, absent meaning `false`. Accepts `no_sync` and `noSync`.
pub fn no_sync(args: &Value) -> ArkResult<bool> {
    match field_any(args, &["no_sync", "noSync"]) {
        Some((v, name)) => to_bool(v, &name),
        None => Ok(false),
    }
}

pub fn config_options(value: &Value) -> ArkResult<ConfigOptions> {
    object(value, "config")?;
    Ok(ConfigOptions {
        ark: optional_str(value, "ark")?,
        esplora: optional_str(value, "esplora")?,
        bitcoind: optional_str(value, "bitcoind")?,
        bitcoind_cookie: optional_str(value, "bitcoind_cookie")?,
        bitcoind_user: optional_str(value, "bitcoind_user")?,
        bitcoind_pass: optional_str(value, "bitcoind_pass")?,
        vtxo_refresh_expiry_threshold: optional_u32(value, "vtxo_refresh_expiry_threshold")?,
        fallback_fee_rate: optional_u64(value, "fallback_fee_rate")?,
        htlc_recv_claim_delta: optional_u16(value, "htlc_recv_claim_delta")?,
        vtxo_exit_margin: optional_u16(value, "vtxo_exit_margin")?,
        deep_round_confirmations: optional_u16(value, "deep_round_confirmations")?,
    })
}

/// Either `{"network": "signet"}` or exactly one of the `bitcoin` / `signet`
/// / `regtest` boolean flags.
fn network(value: &Value) -> ArkResult<Network> {
    if let Some(v) = field(value, "network") {
        let name = to_string(v, "network")?;
        return Network::from_str(&name).ok_or_else(|| invalid("network", "one of bitcoin, signet, regtest"));
    }
    let mut chosen = Vec::new();
    for (flag, net) in [("bitcoin", Network::Bitcoin), ("signet", Network::Signet), ("regtest", Network::Regtest)] {
        if let Some(v) = field(value, flag) {
            if to_bool(v, flag)? {
                chosen.push(net);
            }
        }
    }
    match chosen.as_slice() {
        [net] => Ok(*net),
        [] => Err(missing("network")),
        _ => Err(invalid("network", "exactly one of bitcoin, signet, regtest")),
    }
}

pub fn create_options(value: &Value) -> ArkResult<CreateOptions> {
    object(value, "opts")?;
    let config = match field(value, "config") {
        Some(c) => config_options(c)?,
        None => ConfigOptions::default(),
    };
    Ok(CreateOptions {
        network: network(value)?,
        mnemonic: optional_str(value, "mnemonic")?,
        birthday_height: optional_u32(value, "birthday_height")?,
        config,
    })
}

/// `{"mode_type": "ThresholdBlocks", "value": 144}` and friends. Payload
/// fields that do not belong to the mode are ignored.
pub fn refresh_mode(value: &Value) -> ArkResult<RefreshMode> {
    object(value, "refreshOpts")?;
    let (mode, name) = field_any(value, &["mode_type", "modeType"]).ok_or_else(|| missing("mode_type"))?;
    let mode = to_string(mode, &name)?;
    let threshold = |v: &Value| -> ArkResult<u32> {
        field_any(v, &["value", "threshold_value", "thresholdValue"])
            .map(|(t, n)| to_u32(t, &n))
            .unwrap_or_else(|| Err(missing("value")))
    };
    match mode.to_ascii_lowercase().replace('_', "").as_str() {
        "defaultthreshold" => Ok(RefreshMode::DefaultThreshold),
        "thresholdblocks" => Ok(RefreshMode::ThresholdBlocks(threshold(value)?)),
        "thresholdhours" => Ok(RefreshMode::ThresholdHours(threshold(value)?)),
        "counterparty" => Ok(RefreshMode::Counterparty),
        "all" => Ok(RefreshMode::All),
        "specific" => {
            let (ids, n) = field_any(value, &["specific_vtxo_ids", "specificVtxoIds"])
                .ok_or_else(|| missing("specific_vtxo_ids"))?;
            Ok(RefreshMode::Specific(to_string_list(ids, &n)?))
        }
        _ => Err(invalid(
            "mode_type",
            "one of DefaultThreshold, ThresholdBlocks, ThresholdHours, Counterparty, All, Specific",
        )),
    }
}

pub fn send_many_outputs(value: &Value) -> ArkResult<Vec<SendManyOutput>> {
    value
        .as_array()
        .ok_or_else(|| invalid("outputs", "an array of {destination, amountSat}"))?
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let at = format!("outputs[{i}]");
            object(o, &at)?;
            let destination = required_str(o, "destination").map_err(|e| ArkError::new(format!("{at}: {}", e.message)))?;
            let (amount, n) = field_any(o, &["amountSat", "amount_sat"]).ok_or_else(|| missing(&format!("{at}.amountSat")))?;
            Ok(SendManyOutput { destination, amount_sat: to_u64(amount, &format!("{at}.{n}"))? })
        })
        .collect()
}
