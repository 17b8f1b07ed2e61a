use gloo_net::http::{Request, Response};
use serde::Deserialize;
use serde_json::Value;
use web_sys::FormData;

use crate::error::ClientError;

pub const SEND_PATH: &str = "/send";

pub const TRACKED_FIELDS: [&str; 5] = [
    "phone_numbers_csv",
    "message_title",
    "message_body",
    "google_drive_link",
    "history_title",
];

pub fn refill_path(id: &str) -> String {
    format!("/refill/{id}")
}

pub fn delete_path(id: &str) -> String {
    format!("/delete/{id}")
}

pub fn report_path(id: &str) -> String {
    format!("/download-report/{id}")
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    skipped: Option<SkippedSummary>,
}

#[derive(Debug, Deserialize)]
struct SkippedSummary {
    #[serde(default)]
    count: usize,
}

#[derive(Debug, Deserialize)]
struct RefillResponse {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    message: Option<String>,
    history_title: Option<String>,
    message_title: Option<String>,
    message_body: Option<String>,
    google_drive_link: Option<String>,
    phone_numbers_csv: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefillFields {
    pub history_title: String,
    pub message_title: String,
    pub message_body: String,
    pub google_drive_link: String,
    pub phone_numbers_csv: String,
}

impl RefillFields {
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("history_title", &self.history_title),
            ("message_title", &self.message_title),
            ("message_body", &self.message_body),
            ("google_drive_link", &self.google_drive_link),
            ("phone_numbers_csv", &self.phone_numbers_csv),
        ]
    }
}

fn rejection(message: Option<String>) -> ClientError {
    let message = message
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown error".to_string());
    ClientError::Rejected(message)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn parse_send(body: &str) -> Result<Vec<String>, ClientError> {
    let payload = serde_json::from_str::<SendResponse>(body)?;
    if payload.status.as_deref() != Some("success") {
        return Err(rejection(payload.message));
    }

    let mut lines = payload.messages;
    if let Some(skipped) = payload.skipped.filter(|summary| summary.count > 0) {
        lines.push(format!("Skipped {} invalid entries.", skipped.count));
    }
    Ok(lines)
}

pub fn parse_refill(body: &str) -> Result<RefillFields, ClientError> {
    let payload = serde_json::from_str::<RefillResponse>(body)?;
    if is_truthy(&payload.status) {
        return Err(rejection(payload.message));
    }

    Ok(RefillFields {
        history_title: payload.history_title.unwrap_or_default(),
        message_title: payload.message_title.unwrap_or_default(),
        message_body: payload.message_body.unwrap_or_default(),
        google_drive_link: payload.google_drive_link.unwrap_or_default(),
        phone_numbers_csv: payload.phone_numbers_csv.unwrap_or_default(),
    })
}

/// A delete only counts when the server answered with JSON; anything else
/// (login redirects, HTML error pages) is surfaced verbatim.
pub fn parse_delete(content_type: Option<&str>, body: &str) -> Result<(), ClientError> {
    let is_json = content_type
        .map(|value| value.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(ClientError::NonJson {
            body: body.to_string(),
        });
    }

    let payload = serde_json::from_str::<DeleteResponse>(body)?;
    if payload.status.as_deref() == Some("success") {
        Ok(())
    } else {
        Err(rejection(payload.message))
    }
}

pub async fn post_send(form: FormData) -> Result<Vec<String>, ClientError> {
    let response = Request::post(SEND_PATH).body(form)?.send().await?;
    let body = response.text().await?;
    parse_send(&body)
}

pub async fn get_refill(id: &str) -> Result<RefillFields, ClientError> {
    let response = Request::get(&refill_path(id)).send().await?;
    let body = response.text().await?;
    parse_refill(&body)
}

pub async fn delete_record(id: &str) -> Result<(), ClientError> {
    let response = Request::delete(&delete_path(id)).send().await?;
    let content_type = response.headers().get("content-type");
    let body = response.text().await?;
    parse_delete(content_type.as_deref(), &body)
}

pub async fn request_report(id: &str) -> Result<Response, ClientError> {
    Ok(Request::get(&report_path(id)).send().await?)
}

pub fn ensure_ok(response: &Response) -> Result<(), ClientError> {
    if response.ok() {
        Ok(())
    } else {
        Err(ClientError::Http {
            status: response.status(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_success_yields_one_line_per_message() {
        let body = r#"{"status":"success","messages":["911234: ✅ Sent","915678: ❌ bad number"]}"#;
        let lines = parse_send(body).expect("success payload");
        assert_eq!(lines, vec!["911234: ✅ Sent", "915678: ❌ bad number"]);
    }

    #[test]
    fn send_success_appends_skipped_summary_only_when_non_zero() {
        let body = r#"{"status":"success","messages":["a"],"skipped":{"count":2,"items":[{},{}]}}"#;
        assert_eq!(
            parse_send(body).expect("success payload"),
            vec!["a".to_string(), "Skipped 2 invalid entries.".to_string()]
        );

        let body = r#"{"status":"success","messages":["a"],"skipped":{"count":0,"items":[]}}"#;
        assert_eq!(parse_send(body).expect("success payload").len(), 1);
    }

    #[test]
    fn send_error_surfaces_server_message() {
        let body = r#"{"status":"error","message":"History title required"}"#;
        assert_eq!(
            parse_send(body).unwrap_err().status_line(),
            "Error: History title required"
        );
    }

    #[test]
    fn send_with_html_body_is_a_decode_error() {
        let err = parse_send("<!doctype html><p>login</p>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn refill_without_status_returns_fields() {
        let body = r#"{
            "history_title": "March promo",
            "message_title": "Hello",
            "message_body": "Body text",
            "google_drive_link": null,
            "phone_numbers_csv": "911234,915678"
        }"#;
        let fields = parse_refill(body).expect("refill payload");
        assert_eq!(fields.history_title, "March promo");
        assert_eq!(fields.google_drive_link, "");
        assert_eq!(fields.entries()[4], ("phone_numbers_csv", "911234,915678"));
    }

    #[test]
    fn refill_with_falsy_status_still_counts_as_success() {
        let body = r#"{"status": "", "history_title": "x"}"#;
        assert_eq!(parse_refill(body).expect("refill").history_title, "x");
        let body = r#"{"status": 0, "history_title": "y"}"#;
        assert_eq!(parse_refill(body).expect("refill").history_title, "y");
    }

    #[test]
    fn refill_with_status_is_rejected() {
        let body = r#"{"status":"error","message":"Not found"}"#;
        assert_eq!(
            parse_refill(body).unwrap_err(),
            ClientError::Rejected("Not found".to_string())
        );
    }

    #[test]
    fn delete_requires_json_content_type() {
        let err = parse_delete(Some("text/html; charset=utf-8"), "<h1>Internal Server Error</h1>")
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::NonJson {
                body: "<h1>Internal Server Error</h1>".to_string()
            }
        );
        assert!(err.status_line().contains("<h1>Internal Server Error</h1>"));

        assert!(matches!(
            parse_delete(None, "{}").unwrap_err(),
            ClientError::NonJson { .. }
        ));
    }

    #[test]
    fn delete_success_and_failure() {
        assert!(parse_delete(Some("application/json"), r#"{"status":"success"}"#).is_ok());
        assert_eq!(
            parse_delete(
                Some("application/json"),
                r#"{"status":"error","message":"Not logged"}"#
            )
            .unwrap_err()
            .status_line(),
            "Error: Not logged"
        );
        assert_eq!(
            parse_delete(Some("application/json"), r#"{"status":"error"}"#)
                .unwrap_err()
                .status_line(),
            "Error: unknown error"
        );
    }

    #[test]
    fn endpoint_paths_embed_the_id() {
        assert_eq!(refill_path("7"), "/refill/7");
        assert_eq!(delete_path("7"), "/delete/7");
        assert_eq!(report_path("7"), "/download-report/7");
    }
}
