use std::rc::Rc;

use gloo_timers::callback::Timeout;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlFormElement, Storage};

use crate::api::TRACKED_FIELDS;
use crate::config::ClientConfig;
use crate::dom::{element_by_id, field_value, named_field, set_field_value};
use crate::send::SEND_FORM_ID;

pub trait FieldStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S: FieldStore + ?Sized> FieldStore for &S {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) {
        (**self).save(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

pub struct BrowserStore {
    storage: Storage,
}

impl BrowserStore {
    pub fn local() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl FieldStore for BrowserStore {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.set_item(key, value) {
            warn!("failed to persist {key}: {err:?}");
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

pub struct FormAutosave<S> {
    store: S,
    prefix: String,
}

impl<S: FieldStore> FormAutosave<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn storage_key(&self, field: &str) -> String {
        format!("{}{field}", self.prefix)
    }

    pub fn restore(&self, field: &str) -> Option<String> {
        self.store
            .load(&self.storage_key(field))
            .filter(|value| !value.is_empty())
    }

    pub fn persist(&self, field: &str, value: &str) {
        self.store.save(&self.storage_key(field), value);
    }

    pub fn clear(&self) {
        for field in TRACKED_FIELDS {
            self.store.remove(&self.storage_key(field));
        }
    }
}

pub type PageAutosave = FormAutosave<BrowserStore>;

/// Restores saved field values, persists every keystroke, and drops the saved
/// values a few seconds after each submission of the send form.
pub fn init_autosave(config: &ClientConfig) -> Option<Rc<PageAutosave>> {
    let Some(store) = BrowserStore::local() else {
        warn!("localStorage unavailable; form autosave disabled");
        return None;
    };
    let autosave = Rc::new(FormAutosave::new(store, config.storage_prefix.clone()));

    for field in TRACKED_FIELDS {
        let Some(element) = named_field(field) else {
            continue;
        };
        if let Some(saved) = autosave.restore(field) {
            set_field_value(&element, &saved);
        }

        let autosave_ref = autosave.clone();
        let element_ref = element.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            if let Some(value) = field_value(&element_ref) {
                autosave_ref.persist(field, &value);
            }
        });
        let _ = element.add_event_listener_with_callback("input", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    if let Some(form) = element_by_id::<HtmlFormElement>(SEND_FORM_ID) {
        let autosave_ref = autosave.clone();
        let delay_ms = config.autosave_clear_delay_ms;
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let autosave_ref = autosave_ref.clone();
            Timeout::new(delay_ms, move || {
                autosave_ref.clear();
                debug!("cleared autosaved form fields");
            })
            .forget();
        });
        let _ = form.add_event_listener_with_callback("submit", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    Some(autosave)
}
