//! Unwrapping of the upstream response envelope.
//!
//! Listing endpoints put their array either at `result` or one level down at
//! `result.result`, and `result_info` follows the same split. Both locations
//! are probed explicitly; nothing deeper is searched.

use serde_json::Value;

/// Items of one listing page, or `None` when neither location holds an array.
pub fn page_items(body: &Value) -> Option<&Vec<Value>> {
    let result = body.get("result")?;
    if let Some(items) = result.as_array() {
        return Some(items);
    }
    result.get("result").and_then(Value::as_array)
}

/// Pagination metadata of one listing page. `null` counts as absent.
pub fn page_info(body: &Value) -> Option<&Value> {
    let present = |v: &&Value| !v.is_null();
    body.get("result_info").filter(present).or_else(|| {
        body.get("result")
            .and_then(|r| r.get("result_info"))
            .filter(present)
    })
}

/// Page count reported by the metadata, accepting `total_pages` or `totalPages`
/// as a number or numeric string. Zero, negative and non-finite values are ignored.
pub fn total_pages(info: &Value) -> Option<u32> {
    let raw = info.get("total_pages").or_else(|| info.get("totalPages"))?;
    let count = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !count.is_finite() || count < 1.0 {
        return None;
    }
    Some(count.min(u32::MAX as f64) as u32)
}

/// Record carried by a single-item response: `result` when present, else the body itself.
pub fn single_item(body: &Value) -> &Value {
    match body.get("result") {
        Some(inner) if !inner.is_null() => inner,
        _ => body,
    }
}
