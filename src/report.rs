use std::rc::Rc;

use regex::Regex;
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Blob, Document, HtmlAnchorElement, HtmlElement, Url};

use crate::api;
use crate::config::ClientConfig;
use crate::dom::{
    alert, append_status, element_by_id, hide_loading_modal, navigate, show_loading_modal,
    web_document,
};
use crate::error::ClientError;

pub fn filename_from_disposition(header: Option<&str>, fallback: &str) -> String {
    let Ok(re) = Regex::new(r#"filename="(.+)""#) else {
        return fallback.to_string();
    };
    header
        .and_then(|value| re.captures(value))
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn download_report(history_id: String, config: Rc<ClientConfig>) {
    show_loading_modal();
    spawn_local(async move {
        match fetch_and_save(&history_id, &config.default_report_filename).await {
            Ok(filename) => {
                info!("downloaded report {history_id} as {filename}");
                append_status(&format!("Report downloaded successfully: {filename}"));
            }
            Err(err) => {
                hide_loading_modal();
                warn!("report {history_id} download failed: {err}");
                append_status(&format!("Error downloading report: {err}"));
            }
        }
    });
}

async fn fetch_and_save(history_id: &str, fallback: &str) -> Result<String, ClientError> {
    let response = api::request_report(history_id).await?;
    hide_loading_modal();
    api::ensure_ok(&response)?;

    let disposition = response.headers().get("content-disposition");
    let filename = filename_from_disposition(disposition.as_deref(), fallback);
    let content_type = response.headers().get("content-type");
    let bytes = response.binary().await?;
    save_bytes(&bytes, content_type.as_deref(), &filename)?;
    Ok(filename)
}

/// Hands `bytes` to the browser's download flow through a temporary object
/// URL and a hidden anchor.
fn save_bytes(bytes: &[u8], content_type: Option<&str>, filename: &str) -> Result<(), ClientError> {
    let doc = web_document().ok_or_else(|| ClientError::Dom("document unavailable".to_string()))?;
    let body = doc
        .body()
        .ok_or_else(|| ClientError::Dom("document has no body".to_string()))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    if let Some(kind) = content_type {
        options.set_type(kind);
    }
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(ClientError::from_js)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(ClientError::from_js)?;

    let clicked = click_download_anchor(&doc, &body, &url, filename);
    let _ = Url::revoke_object_url(&url);
    clicked
}

fn click_download_anchor(
    doc: &Document,
    body: &HtmlElement,
    url: &str,
    filename: &str,
) -> Result<(), ClientError> {
    let anchor = doc
        .create_element("a")
        .map_err(ClientError::from_js)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| ClientError::Dom("anchor element has unexpected type".to_string()))?;
    let _ = anchor.style().set_property("display", "none");
    anchor.set_href(url);
    anchor.set_download(filename);
    body.append_child(&anchor).map_err(ClientError::from_js)?;
    anchor.click();
    anchor.remove();
    Ok(())
}

/// History id for the report page: the button's `data-history-id`, else the
/// `DOCUMENT_HISTORY_ID` global the template may define.
fn report_page_history_id(button: &HtmlElement) -> Option<String> {
    let from_attr = button
        .get_attribute("data-history-id")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    if from_attr.is_some() {
        return from_attr;
    }

    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str("DOCUMENT_HISTORY_ID")).ok()?;
    value
        .as_string()
        .or_else(|| value.as_f64().map(|id| format!("{id}")))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && id != "0")
}

pub fn init_report_page(config: Rc<ClientConfig>) {
    if let Some(back) = element_by_id::<HtmlElement>("btnBack") {
        let main_path = config.main_path.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            navigate(&main_path);
        });
        let _ = back.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    if let Some(button) = element_by_id::<HtmlElement>("btnDownloadPdf") {
        let button_ref = button.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let Some(history_id) = report_page_history_id(&button_ref) else {
                alert("Report ID is missing - cannot download");
                return;
            };
            download_report(history_id, config.clone());
        });
        let _ = button.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }
}
