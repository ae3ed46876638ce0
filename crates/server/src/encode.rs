//! Response body encoding for the query endpoints.
//!
//! Every query endpoint answers in JSON or CSV from the same query result;
//! the shapes here are the contract and the handlers stay format-agnostic.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulse_core::{csv_escape, DeviceView, GroupKey, OutputFormat};
use serde_json::json;

use crate::db::GroupCount;

fn csv_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv")],
        body,
    )
        .into_response()
}

/// Active-device count. JSON reports the window cutoff; CSV reports the
/// evaluation timestamp in its first field.
pub fn count_response(format: OutputFormat, now: i64, window: i64, active: i64) -> Response {
    match format {
        OutputFormat::Json => Json(json!({
            "since": now - window,
            "window": window,
            "active": active,
        }))
        .into_response(),
        OutputFormat::Csv => csv_response(format!(
            "timestamp,window,active\n{},{},{}\n",
            now, window, active
        )),
    }
}

/// Device listing, newest first, nulls already substituted in the views.
pub fn list_response(format: OutputFormat, window: i64, devices: &[DeviceView]) -> Response {
    match format {
        OutputFormat::Json => Json(json!({
            "windowSec": window,
            "devices": devices,
        }))
        .into_response(),
        OutputFormat::Csv => {
            let mut body =
                String::from("unique_id,first_seen,last_seen,part_num,fw_version,sw_version,country\n");
            for d in devices {
                body.push_str(&format!(
                    "{},{},{},{},{},{},{}\n",
                    csv_escape(&d.unique_id),
                    d.first_seen,
                    d.last_seen,
                    csv_escape(&d.part_num),
                    csv_escape(&d.fw_version),
                    csv_escape(&d.sw_version),
                    csv_escape(&d.country),
                ));
            }
            csv_response(body)
        }
    }
}

/// Grouped metrics. The group columns keep their request order in both
/// formats; each bucket carries its count last.
pub fn metrics_response(
    format: OutputFormat,
    now: i64,
    window: i64,
    keys: &[GroupKey],
    buckets: &[GroupCount],
) -> Response {
    match format {
        OutputFormat::Json => {
            let total: i64 = buckets.iter().map(|b| b.count).sum();
            let groups: Vec<serde_json::Value> = buckets
                .iter()
                .map(|b| {
                    let mut row = serde_json::Map::new();
                    for (key, value) in keys.iter().zip(&b.values) {
                        row.insert(key.column().to_string(), json!(value));
                    }
                    row.insert("count".to_string(), json!(b.count));
                    serde_json::Value::Object(row)
                })
                .collect();
            Json(json!({
                "timestamp": now,
                "window": window,
                "totalActive": total,
                "groups": groups,
            }))
            .into_response()
        }
        OutputFormat::Csv => {
            let header: Vec<&str> = keys.iter().map(|k| k.column()).collect();
            let mut body = format!("{},count\n", header.join(","));
            for b in buckets {
                let values: Vec<String> = b.values.iter().map(|v| csv_escape(v)).collect();
                body.push_str(&format!("{},{}\n", values.join(","), b.count));
            }
            csv_response(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_csv_header_follows_request_order() {
        let keys = [GroupKey::Country, GroupKey::PartNum];
        let buckets = [GroupCount {
            values: vec!["DE".to_string(), "P1".to_string()],
            count: 3,
        }];
        let resp = metrics_response(OutputFormat::Csv, 5000, 3600, &keys, &buckets);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
    }

    #[test]
    fn count_csv_is_one_row() {
        let resp = count_response(OutputFormat::Csv, 5000, 3600, 42);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
    }
}
