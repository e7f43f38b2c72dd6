//! Response envelope and payload normalization.
//!
//! The controller's payloads are not stable across firmware generations:
//! the business code arrives as `retCode` or `code`, row lists arrive as
//! `{result: [..]}`, `{list: [..]}`, or a bare array (each optionally nested
//! under `data`), and field values switch between numbers, strings, and
//! booleans. Everything here is total over arbitrary JSON; unknown shapes
//! normalize to "nothing", never to a panic.

use serde_json::{Map, Value};

use crate::error::GwnError;

/// Field names under which the controller reports its business code.
const CODE_KEYS: &[&str] = &["retCode", "code"];

/// Field names under which a human-readable message may appear.
const MESSAGE_KEYS: &[&str] = &["retMsg", "msg", "message"];

/// True iff the body carries an explicit vendor success code.
///
/// Non-objects and bodies without a known code field are not successful;
/// listing endpoints that answer with a bare array are handled by
/// [`VendorResponse::ensure_successful`], which only treats an *explicit*
/// non-zero code as failure.
pub fn response_successful(body: &Value) -> bool {
    vendor_code(body) == Some(0)
}

/// The vendor business code, if the body carries one.
pub fn vendor_code(body: &Value) -> Option<i64> {
    let obj = body.as_object()?;
    CODE_KEYS.iter().find_map(|key| obj.get(*key).and_then(coerce_i64))
}

/// The vendor's own message, if the body carries one.
pub fn vendor_message(body: &Value) -> Option<&str> {
    let obj = body.as_object()?;
    MESSAGE_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
}

/// Extract the row list from any of the known wrapper shapes.
///
/// Checks `data` first (`{data: {result: [..]}}`, `{data: {list: [..]}}`,
/// `{data: [..]}`), then the body itself (`{result: [..]}`, `{list: [..]}`,
/// bare array). Unrecognized shapes and non-object rows yield an empty vec:
/// empty means "nothing to show", not an error.
pub fn collect_rows(body: &Value) -> Vec<NormalizedRow> {
    for container in [body.get("data"), Some(body)].into_iter().flatten() {
        if let Some(items) = container.as_array() {
            return rows_from(items);
        }
        if let Some(obj) = container.as_object() {
            for key in ["result", "list"] {
                if let Some(items) = obj.get(key).and_then(Value::as_array) {
                    return rows_from(items);
                }
            }
        }
    }
    Vec::new()
}

fn rows_from(items: &[Value]) -> Vec<NormalizedRow> {
    items.iter().filter_map(NormalizedRow::from_value).collect()
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A single payload row with tolerant, priority-ordered field access.
///
/// Accessors take a candidate-key list and return the first present field,
/// coercing the vendor's numeric/string/bool variance to the requested type.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    fields: Map<String, Value>,
}

impl NormalizedRow {
    /// Wrap a JSON object; `None` for any other value kind.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|fields| Self {
            fields: fields.clone(),
        })
    }

    /// The first raw value present under one of the candidate keys.
    pub fn get(&self, candidates: &[&str]) -> Option<&Value> {
        candidates.iter().find_map(|key| self.fields.get(*key))
    }

    pub fn str_field(&self, candidates: &[&str]) -> Option<String> {
        self.get(candidates).and_then(coerce_string)
    }

    pub fn i64_field(&self, candidates: &[&str]) -> Option<i64> {
        self.get(candidates).and_then(coerce_i64)
    }

    pub fn bool_field(&self, candidates: &[&str]) -> Option<bool> {
        self.get(candidates).and_then(coerce_bool)
    }
}

/// Decoded controller reply: the HTTP status plus the JSON body as received.
#[derive(Debug, Clone)]
pub struct VendorResponse {
    pub status: u16,
    pub body: Value,
}

impl VendorResponse {
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the body carries the explicit vendor success code.
    pub fn successful(&self) -> bool {
        response_successful(&self.body)
    }

    pub fn vendor_code(&self) -> Option<i64> {
        vendor_code(&self.body)
    }

    pub fn vendor_message(&self) -> Option<&str> {
        vendor_message(&self.body)
    }

    /// Rows extracted from the payload; empty for unrecognized shapes.
    pub fn rows(&self) -> Vec<NormalizedRow> {
        collect_rows(&self.body)
    }

    /// The `data` object (detail endpoints), falling back to the body itself
    /// when the controller skipped the envelope.
    pub fn data_row(&self) -> Option<NormalizedRow> {
        self.body
            .get("data")
            .and_then(NormalizedRow::from_value)
            .or_else(|| NormalizedRow::from_value(&self.body))
    }

    /// Promote an explicit vendor failure to [`GwnError::Vendor`].
    ///
    /// A body with no business code at all passes as long as the HTTP layer
    /// succeeded; bare-array listings are valid answers.
    pub fn ensure_successful(self) -> Result<Self, GwnError> {
        match self.vendor_code() {
            Some(0) => Ok(self),
            Some(code) => {
                let message = self
                    .vendor_message()
                    .unwrap_or("request rejected")
                    .to_string();
                Err(GwnError::Vendor { code, message })
            }
            None if self.status < 400 => Ok(self),
            None => Err(GwnError::Vendor {
                code: i64::from(self.status),
                message: format!("HTTP {}", self.status),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    // =========================================================================
    // response_successful
    // =========================================================================

    #[test]
    fn success_under_ret_code() {
        assert!(response_successful(&json!({"retCode": 0, "msg": "ok"})));
        assert!(!response_successful(&json!({"retCode": 1100, "msg": "no"})));
    }

    #[test]
    fn success_under_code() {
        assert!(response_successful(&json!({"code": 0})));
        assert!(!response_successful(&json!({"code": -1})));
    }

    #[test]
    fn ret_code_takes_priority_over_code() {
        assert!(!response_successful(&json!({"retCode": 7, "code": 0})));
        assert!(response_successful(&json!({"retCode": 0, "code": 5})));
    }

    #[test]
    fn string_code_is_coerced() {
        assert!(response_successful(&json!({"retCode": "0"})));
        assert!(!response_successful(&json!({"retCode": "401"})));
    }

    #[test]
    fn malformed_bodies_are_not_successful() {
        for body in [
            json!(null),
            json!("ok"),
            json!(42),
            json!([1, 2, 3]),
            json!({}),
            json!({"status": "fine"}),
            json!({"retCode": "not a number"}),
            json!({"retCode": {"nested": 0}}),
        ] {
            assert!(!response_successful(&body), "body: {body}");
        }
    }

    // =========================================================================
    // collect_rows
    // =========================================================================

    fn sample_rows() -> Value {
        json!([{"mac": "AA"}, {"mac": "BB"}])
    }

    #[test]
    fn rows_from_known_wrappers_are_identical() {
        let shapes = [
            json!({"retCode": 0, "data": {"result": sample_rows()}}),
            json!({"retCode": 0, "data": {"list": sample_rows()}}),
            json!({"retCode": 0, "data": sample_rows()}),
            json!({"result": sample_rows()}),
            json!({"list": sample_rows()}),
            sample_rows(),
        ];
        let expected = collect_rows(&shapes[0]);
        assert_eq!(expected.len(), 2);
        for shape in &shapes {
            assert_eq!(collect_rows(shape), expected, "shape: {shape}");
        }
    }

    #[test]
    fn unknown_shapes_yield_no_rows() {
        for body in [
            json!(null),
            json!("rows"),
            json!({"retCode": 0}),
            json!({"data": {"total": 5}}),
            json!({"rows": [{"mac": "AA"}]}),
        ] {
            assert!(collect_rows(&body).is_empty(), "body: {body}");
        }
    }

    #[test]
    fn non_object_rows_are_skipped() {
        let body = json!({"data": {"result": [{"mac": "AA"}, 42, "x", null]}});
        assert_eq!(collect_rows(&body).len(), 1);
    }

    // =========================================================================
    // NormalizedRow
    // =========================================================================

    #[test]
    fn candidate_keys_resolve_in_priority_order() {
        let row = NormalizedRow::from_value(&json!({
            "macAddress": "aa:bb", "clientMac": "cc:dd"
        }))
        .unwrap();
        assert_eq!(
            row.str_field(&["mac", "macAddress", "clientMac"]).unwrap(),
            "aa:bb"
        );
        assert!(row.get(&["name", "hostName"]).is_none());
    }

    #[test]
    fn field_coercion_tolerates_value_kinds() {
        let row = NormalizedRow::from_value(&json!({
            "id": 1042,
            "count": "17",
            "blockedNum": true,
            "enable": "1",
            "online": 0,
            "flag": "no",
        }))
        .unwrap();
        assert_eq!(row.str_field(&["id"]).unwrap(), "1042");
        assert_eq!(row.i64_field(&["count"]).unwrap(), 17);
        assert_eq!(row.i64_field(&["blockedNum"]).unwrap(), 1);
        assert_eq!(row.bool_field(&["enable"]), Some(true));
        assert_eq!(row.bool_field(&["online"]), Some(false));
        assert_eq!(row.bool_field(&["flag"]), Some(false));
        assert_eq!(row.bool_field(&["missing"]), None);
    }

    // =========================================================================
    // VendorResponse
    // =========================================================================

    #[test]
    fn ensure_successful_passes_success_envelope() {
        let response = VendorResponse::new(200, json!({"retCode": 0, "data": {"result": []}}));
        assert!(response.ensure_successful().is_ok());
    }

    #[test]
    fn ensure_successful_passes_bare_array() {
        let response = VendorResponse::new(200, sample_rows());
        assert!(response.ensure_successful().is_ok());
    }

    #[test]
    fn ensure_successful_maps_vendor_failure() {
        let response = VendorResponse::new(200, json!({"retCode": 1100, "retMsg": "mac not found"}));
        let err = response.ensure_successful().unwrap_err();
        match err {
            GwnError::Vendor { code, message } => {
                assert_eq!(code, 1100);
                assert_eq!(message, "mac not found");
            }
            other => panic!("expected Vendor error, got: {other}"),
        }
    }

    #[test]
    fn ensure_successful_maps_http_failure_without_code() {
        let response = VendorResponse::new(502, json!({"error": "bad gateway"}));
        let err = response.ensure_successful().unwrap_err();
        assert!(matches!(err, GwnError::Vendor { code: 502, .. }));
    }

    #[test]
    fn data_row_prefers_nested_data() {
        let response = VendorResponse::new(200, json!({"retCode": 0, "data": {"name": "dorm-a"}}));
        let row = response.data_row().unwrap();
        assert_eq!(row.str_field(&["name"]).unwrap(), "dorm-a");
    }

    #[test]
    fn data_row_falls_back_to_body() {
        let response = VendorResponse::new(200, json!({"access_token": "tok"}));
        let row = response.data_row().unwrap();
        assert_eq!(row.str_field(&["access_token"]).unwrap(), "tok");
    }

    #[test]
    fn vendor_message_checks_known_keys() {
        assert_eq!(
            vendor_message(&json!({"retMsg": "denied"})),
            Some("denied")
        );
        assert_eq!(vendor_message(&json!({"msg": "m"})), Some("m"));
        assert_eq!(vendor_message(&json!({"message": "x"})), Some("x"));
        assert_eq!(vendor_message(&json!({"note": "x"})), None);
        assert_eq!(vendor_message(&json!([1])), None);
    }
}
