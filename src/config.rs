use serde::Deserialize;

use crate::dom::web_document;

/// Id of the `<script type="application/json">` element the server may embed
/// to override client defaults.
pub const CONFIG_ELEMENT_ID: &str = "sender-config";

#[derive(Debug, Clone, Deserialize, Default)]
struct PageConfig {
    page_size: Option<usize>,
    reload_delay_ms: Option<u32>,
    autosave_clear_delay_ms: Option<u32>,
    storage_prefix: Option<String>,
    default_report_filename: Option<String>,
    main_path: Option<String>,
    log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub page_size: usize,
    pub reload_delay_ms: u32,
    pub autosave_clear_delay_ms: u32,
    pub storage_prefix: String,
    pub default_report_filename: String,
    pub main_path: String,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            reload_delay_ms: 2_000,
            autosave_clear_delay_ms: 3_000,
            storage_prefix: "whatsapp_form_".to_string(),
            default_report_filename: "report.pdf".to_string(),
            main_path: "/main".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads the bootstrap element from the current document. A page without
    /// one gets the defaults.
    pub fn load() -> Result<Self, serde_json::Error> {
        let raw = web_document()
            .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|node| node.text_content())
            .unwrap_or_default();
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let mut cfg = Self::default();
        if raw.trim().is_empty() {
            return Ok(cfg);
        }
        let page_cfg = serde_json::from_str::<PageConfig>(raw)?;
        cfg.apply_page(page_cfg);
        Ok(cfg)
    }

    fn apply_page(&mut self, page_cfg: PageConfig) {
        set_opt_usize_min(&mut self.page_size, page_cfg.page_size, 1);
        set_opt(&mut self.reload_delay_ms, page_cfg.reload_delay_ms);
        set_opt(
            &mut self.autosave_clear_delay_ms,
            page_cfg.autosave_clear_delay_ms,
        );
        set_opt_non_empty(&mut self.storage_prefix, page_cfg.storage_prefix);
        set_opt_non_empty(
            &mut self.default_report_filename,
            page_cfg.default_report_filename,
        );
        set_opt_non_empty(&mut self.main_path, page_cfg.main_path);
        set_opt_non_empty(&mut self.log_level, page_cfg.log_level);
    }
}

fn set_opt<T>(dst: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *dst = v;
    }
}

fn set_opt_usize_min(dst: &mut usize, value: Option<usize>, min: usize) {
    if let Some(v) = value {
        *dst = v.max(min);
    }
}

fn set_opt_non_empty(dst: &mut String, value: Option<String>) {
    if let Some(v) = value {
        let trimmed = v.trim();
        if !trimmed.is_empty() {
            *dst = trimmed.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientConfig;

    #[test]
    fn empty_bootstrap_yields_defaults() {
        let cfg = ClientConfig::from_json_str("  \n").expect("empty input parses");
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.storage_prefix, "whatsapp_form_");
        assert_eq!(cfg.default_report_filename, "report.pdf");
    }

    #[test]
    fn partial_bootstrap_overrides_only_given_keys() {
        let cfg = ClientConfig::from_json_str(r#"{"page_size": 25, "log_level": "debug"}"#)
            .expect("valid json");
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.reload_delay_ms, 2_000);
        assert_eq!(cfg.autosave_clear_delay_ms, 3_000);
    }

    #[test]
    fn zero_page_size_is_clamped_and_blank_strings_ignored() {
        let cfg = ClientConfig::from_json_str(r#"{"page_size": 0, "storage_prefix": "  "}"#)
            .expect("valid json");
        assert_eq!(cfg.page_size, 1);
        assert_eq!(cfg.storage_prefix, "whatsapp_form_");
    }

    #[test]
    fn malformed_bootstrap_is_an_error() {
        assert!(ClientConfig::from_json_str("{page_size:").is_err());
    }
}
