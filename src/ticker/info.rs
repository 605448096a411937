use serde_json::Value;

use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
    quotesummary,
};

use super::model::Info;

const MODULES: &str =
    "assetProfile,summaryDetail,defaultKeyStatistics,financialData,quoteType,price";

pub(super) async fn fetch_info(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Info, YfError> {
    let result = quotesummary::fetch_first_result(
        client,
        symbol,
        MODULES,
        "info",
        cache_mode,
        retry_override,
    )
    .await?;

    let info = flatten_modules(result);
    if info.is_empty() {
        return Err(YfError::Data(format!("no info available for {symbol}")));
    }
    Ok(info)
}

/// Merges every module object into one flat map.
///
/// `{raw, fmt}` wrappers collapse to `raw`, wrappers without a `raw` fall back to
/// `fmt`, empty wrappers are dropped, and the per-module `maxAge` bookkeeping is
/// skipped. Later modules do not overwrite keys set by earlier ones.
fn flatten_modules(result: Value) -> Info {
    let mut info = Info::new();
    let Value::Object(modules) = result else {
        return info;
    };

    for (_, module) in modules {
        let Value::Object(fields) = module else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" || info.contains_key(&key) {
                continue;
            }
            if let Some(v) = unwrap_value(value) {
                info.insert(key, v);
            }
        }
    }
    info
}

fn unwrap_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(mut obj) if obj.contains_key("raw") || obj.contains_key("fmt") => {
            obj.remove("raw")
                .filter(|v| !v.is_null())
                .or_else(|| obj.remove("fmt").filter(|v| !v.is_null()))
        }
        Value::Object(obj) if obj.is_empty() => None,
        other => Some(other),
    }
}
