use std::rc::Rc;

use gloo_timers::callback::Timeout;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventInit, FormData, HtmlFormElement, KeyboardEvent};

use crate::api;
use crate::autosave::{FieldStore, FormAutosave, PageAutosave};
use crate::config::ClientConfig;
use crate::dom::{append_status, clear_status, element_by_id, reload_page, set_status_text};
use crate::error::ClientError;

pub const SEND_FORM_ID: &str = "sendForm";

pub fn is_submit_shortcut(ctrl_key: bool, key: &str) -> bool {
    ctrl_key && key == "Enter"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub lines: Vec<String>,
    pub reload_after_ms: Option<u32>,
}

/// Saved fields are dropped before the reload is scheduled, so the reload can
/// never win against the delayed clear.
pub fn finish_send<S: FieldStore>(
    outcome: Result<Vec<String>, ClientError>,
    autosave: Option<&FormAutosave<S>>,
    reload_delay_ms: u32,
) -> SendReport {
    match outcome {
        Ok(lines) => {
            if let Some(autosave) = autosave {
                autosave.clear();
            }
            SendReport {
                lines,
                reload_after_ms: Some(reload_delay_ms),
            }
        }
        Err(err) => SendReport {
            lines: vec![err.status_line()],
            reload_after_ms: None,
        },
    }
}

pub fn init_send_form(config: &ClientConfig, autosave: Option<Rc<PageAutosave>>) {
    let Some(form) = element_by_id::<HtmlFormElement>(SEND_FORM_ID) else {
        return;
    };

    let reload_delay_ms = config.reload_delay_ms;
    let form_ref = form.clone();
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        event.prevent_default();
        set_status_text("Sending messages...");

        let form_data = match FormData::new_with_form(&form_ref) {
            Ok(form_data) => form_data,
            Err(err) => {
                clear_status();
                append_status(&ClientError::from_js(err).status_line());
                return;
            }
        };

        let autosave = autosave.clone();
        spawn_local(async move {
            let outcome = api::post_send(form_data).await;
            match &outcome {
                Ok(lines) => info!("send batch accepted with {} status lines", lines.len()),
                Err(err) => warn!("send failed: {err}"),
            }
            let report = finish_send(outcome, autosave.as_deref(), reload_delay_ms);

            clear_status();
            for line in &report.lines {
                append_status(line);
            }
            if let Some(delay_ms) = report.reload_after_ms {
                Timeout::new(delay_ms, reload_page).forget();
            }
        });
    });
    let _ = form.add_event_listener_with_callback("submit", callback.as_ref().unchecked_ref());
    callback.forget();
}

/// Ctrl+Enter anywhere on the page submits the send form. The synthetic event
/// skips native constraint validation, like a script-driven submit.
pub fn init_submit_shortcut() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if element_by_id::<HtmlFormElement>(SEND_FORM_ID).is_none() {
        return;
    }

    let callback = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        if !is_submit_shortcut(event.ctrl_key(), &event.key()) {
            return;
        }
        let Some(form) = element_by_id::<HtmlFormElement>(SEND_FORM_ID) else {
            return;
        };
        event.prevent_default();

        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        match web_sys::Event::new_with_event_init_dict("submit", &init) {
            Ok(submit) => {
                debug!("submitting send form from keyboard shortcut");
                let _ = form.dispatch_event(&submit);
            }
            Err(err) => warn!("could not build submit event: {err:?}"),
        }
    });
    let _ = window.add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref());
    callback.forget();
}

#[cfg(test)]
mod tests {
    use super::{finish_send, is_submit_shortcut};
    use crate::api::TRACKED_FIELDS;
    use crate::autosave::tests::MemoryStore;
    use crate::autosave::{FieldStore, FormAutosave};
    use crate::error::ClientError;

    fn filled_autosave(store: &MemoryStore) -> FormAutosave<&MemoryStore> {
        let autosave = FormAutosave::new(store, "whatsapp_form_");
        for field in TRACKED_FIELDS {
            autosave.persist(field, "draft");
        }
        autosave
    }

    #[test]
    fn successful_send_clears_saved_fields_before_reloading() {
        let store = MemoryStore::default();
        let autosave = filled_autosave(&store);

        let report = finish_send(
            Ok(vec!["911234: ✅ Sent".to_string(), "915678: ❌ bad number".to_string()]),
            Some(&autosave),
            2000,
        );

        assert_eq!(report.reload_after_ms, Some(2000));
        for field in TRACKED_FIELDS {
            assert_eq!(store.load(&autosave.storage_key(field)), None);
        }
    }

    #[test]
    fn successful_send_reports_one_line_per_message() {
        let report = finish_send::<MemoryStore>(
            Ok(vec!["a".to_string(), "b".to_string(), "Skipped 1 invalid entries.".to_string()]),
            None,
            2000,
        );
        assert_eq!(report.lines, vec!["a", "b", "Skipped 1 invalid entries."]);
    }

    #[test]
    fn failed_send_keeps_fields_and_does_not_reload() {
        let store = MemoryStore::default();
        let autosave = filled_autosave(&store);

        let report = finish_send(
            Err(ClientError::Rejected("History title required".to_string())),
            Some(&autosave),
            2000,
        );

        assert_eq!(report.lines, vec!["Error: History title required"]);
        assert_eq!(report.reload_after_ms, None);
        assert_eq!(
            store.load(&autosave.storage_key("message_body")).as_deref(),
            Some("draft")
        );
    }

    #[test]
    fn only_ctrl_enter_submits() {
        assert!(is_submit_shortcut(true, "Enter"));
        assert!(!is_submit_shortcut(false, "Enter"));
        assert!(!is_submit_shortcut(true, "a"));
        assert!(!is_submit_shortcut(true, "enter"));
    }
}
