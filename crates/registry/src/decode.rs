//! Tolerant decoding for registry payloads. The upstream schema varies by
//! endpoint and by carrier: the same logical record may arrive as a direct
//! object, a list of objects, or an object wrapping a list under a
//! `content` key, and field casing is not stable. Everything here
//! normalizes that variance into the flat shapes the decision rule reads,
//! treating missing fields as unknown rather than as errors.

use std::collections::BTreeSet;

use freightdesk_core::eligibility::CarrierFlags;
use freightdesk_core::DotNumber;
use serde_json::Value;

const AUTHORITY_STATUS_FIELDS: [&str; 6] = [
    "commonAuthorityStatus",
    "contractAuthorityStatus",
    "brokerAuthorityStatus",
    "authorizedForProperty",
    "authorizedForPassenger",
    "authorizedForHouseholdGoods",
];

/// Case-insensitive object field lookup.
pub fn get_ci<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map(|(_, found)| found)
}

/// Descends a path of object keys (case-insensitive) and list indices
/// (segments that parse as numbers).
pub fn dig_ci<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in path {
        current = match segment.parse::<usize>() {
            Ok(index) => current.as_array()?.get(index)?,
            Err(_) => get_ci(current, segment)?,
        };
    }
    Some(current)
}

/// Depth-first scan for the first occurrence of a key, any casing, at any
/// nesting level. Last-resort shape recovery.
pub fn scan_for_key<'a>(value: &'a Value, target: &str) -> Option<&'a Value> {
    match value {
        Value::Object(fields) => {
            for (key, nested) in fields {
                if key.eq_ignore_ascii_case(target) {
                    return Some(nested);
                }
                if let Some(found) = scan_for_key(nested, target) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| scan_for_key(item, target)),
        _ => None,
    }
}

/// Normalizes a payload to the list of records it carries: a bare list,
/// a `content`-wrapped list, or a single object.
pub fn as_records(value: &Value) -> Vec<&Value> {
    if let Some(items) = value.as_array() {
        return items.iter().collect();
    }
    if let Some(items) = get_ci(value, "content").and_then(Value::as_array) {
        return items.iter().collect();
    }
    if value.is_object() {
        return vec![value];
    }
    Vec::new()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Pulls the resolved DOT number out of a docket lookup, trying the
/// response shapes observed in the wild before falling back to a scan.
pub fn extract_dot(payload: &Value) -> Option<DotNumber> {
    const PATHS: [&[&str]; 5] = [
        &["content", "0", "carrier", "dotNumber"],
        &["content", "0", "dotNumber"],
        &["carrier", "dotNumber"],
        &["dotNumber"],
        &["items", "0", "carrier", "dotNumber"],
    ];

    for path in PATHS {
        if let Some(found) = dig_ci(payload, path).and_then(scalar_to_string) {
            return Some(DotNumber(found));
        }
    }

    scan_for_key(payload, "dotNumber").and_then(scalar_to_string).map(DotNumber)
}

/// Operating flags from a carrier record; they may sit under a `carrier`
/// wrapper or at the top level.
pub fn carrier_flags(payload: &Value) -> CarrierFlags {
    let field = |name: &str| {
        dig_ci(payload, &["carrier", name])
            .or_else(|| get_ci(payload, name))
            .and_then(scalar_to_string)
    };

    CarrierFlags {
        allow_to_operate: field("allowToOperate"),
        out_of_service: field("outOfService"),
    }
}

/// Unions every known authority-status field across all records in the
/// payload, uppercased for the decision rule.
pub fn authority_statuses(payload: &Value) -> BTreeSet<String> {
    let mut statuses = BTreeSet::new();
    for record in as_records(payload) {
        for field in AUTHORITY_STATUS_FIELDS {
            if let Some(status) = get_ci(record, field).and_then(|value| scalar_to_string(value)) {
                statuses.insert(status.to_uppercase());
            }
        }
    }
    statuses
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{as_records, authority_statuses, carrier_flags, dig_ci, extract_dot};

    #[test]
    fn dot_is_found_in_content_wrapped_lookup() {
        let payload = json!({"content": [{"carrier": {"dotNumber": 3921117}}]});
        let dot = extract_dot(&payload).expect("dot should resolve");
        assert_eq!(dot.0, "3921117");
    }

    #[test]
    fn dot_is_found_in_bare_object_with_odd_casing() {
        let payload = json!({"Carrier": {"DOTNumber": "1048790"}});
        let dot = extract_dot(&payload).expect("dot should resolve");
        assert_eq!(dot.0, "1048790");
    }

    #[test]
    fn dot_is_recovered_by_scanning_unknown_shapes() {
        let payload = json!({"results": {"records": [{"detail": {"dotNumber": 88071}}]}});
        let dot = extract_dot(&payload).expect("scan should recover the dot");
        assert_eq!(dot.0, "88071");
    }

    #[test]
    fn missing_dot_yields_none() {
        assert!(extract_dot(&json!({"content": []})).is_none());
        assert!(extract_dot(&json!({})).is_none());
        assert!(extract_dot(&json!({"dotNumber": ""})).is_none());
    }

    #[test]
    fn flags_are_lifted_from_nested_or_top_level() {
        let nested = json!({"carrier": {"allowToOperate": "Y", "outOfService": "N"}});
        let flags = carrier_flags(&nested);
        assert_eq!(flags.allow_to_operate.as_deref(), Some("Y"));
        assert_eq!(flags.out_of_service.as_deref(), Some("N"));

        let top_level = json!({"allowToOperate": "y"});
        let flags = carrier_flags(&top_level);
        assert_eq!(flags.allow_to_operate.as_deref(), Some("y"));
        assert!(flags.out_of_service.is_none());
    }

    #[test]
    fn authority_statuses_union_across_list_entries() {
        let payload = json!([
            {"commonAuthorityStatus": "active", "authorizedForProperty": "Y"},
            {"contractAuthorityStatus": "INACTIVE"}
        ]);
        let statuses = authority_statuses(&payload);

        assert!(statuses.contains("ACTIVE"));
        assert!(statuses.contains("Y"));
        assert!(statuses.contains("INACTIVE"));
    }

    #[test]
    fn authority_statuses_read_content_wrapped_and_single_objects() {
        let wrapped = json!({"content": [{"brokerAuthorityStatus": "Authorized"}]});
        assert!(authority_statuses(&wrapped).contains("AUTHORIZED"));

        let single = json!({"commonAuthorityStatus": "A"});
        assert!(authority_statuses(&single).contains("A"));
    }

    #[test]
    fn records_normalization_handles_scalars_gracefully() {
        assert!(as_records(&json!("oops")).is_empty());
        assert_eq!(as_records(&json!({"content": [{}, {}]})).len(), 2);
        assert_eq!(as_records(&json!([{}, {}, {}])).len(), 3);
    }

    #[test]
    fn dig_handles_index_segments() {
        let payload = json!({"items": [{"value": 7}]});
        let found = dig_ci(&payload, &["items", "0", "value"]).expect("path should resolve");
        assert_eq!(found.as_i64(), Some(7));
    }
}
