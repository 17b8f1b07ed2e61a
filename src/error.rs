use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("Network response was not ok (HTTP {status})")]
    Http { status: u16 },
    #[error("server returned a non-JSON response: {body}")]
    NonJson { body: String },
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Dom(String),
}

impl ClientError {
    pub fn status_line(&self) -> String {
        format!("Error: {self}")
    }

    pub fn from_js(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|message| message.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Dom(text)
    }
}

impl From<gloo_net::Error> for ClientError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(err) => Self::Decode(err.to_string()),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ClientError;

    #[test]
    fn status_lines_carry_the_error_prefix() {
        assert_eq!(
            ClientError::Rejected("History title required".to_string()).status_line(),
            "Error: History title required"
        );
        assert_eq!(
            ClientError::Http { status: 404 }.status_line(),
            "Error: Network response was not ok (HTTP 404)"
        );
    }

    #[test]
    fn non_json_error_includes_body() {
        let err = ClientError::NonJson {
            body: "<html>500</html>".to_string(),
        };
        assert!(err.to_string().contains("<html>500</html>"));
    }

    #[test]
    fn serde_failures_map_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(ClientError::from(err), ClientError::Decode(_)));
    }
}
