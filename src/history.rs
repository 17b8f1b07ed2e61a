//! History table: pagination plus the refill/delete/download row actions.
//!
//! One delegated `click` listener on the table body serves every row, so
//! nothing has to be rebound when the visible page changes.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions};

use crate::api;
use crate::autosave::PageAutosave;
use crate::config::ClientConfig;
use crate::dom::{
    alert, append_status, confirm, element_by_id, named_field, set_display, set_field_value,
    set_nav_enabled, set_text,
};
use crate::pagination::{PageState, PageView};
use crate::report::download_report;
use crate::send::SEND_FORM_ID;

pub const TABLE_BODY_ID: &str = "historyTableBody";
pub const PAGE_INFO_ID: &str = "pageInfo";
pub const PREV_PAGE_ID: &str = "prevPage";
pub const NEXT_PAGE_ID: &str = "nextPage";
const TITLE_CELL_SELECTOR: &str = "td:nth-child(2)";
const ACTION_SELECTOR: &str = "[data-action], .refillBtn, .deleteBtn, .downloadBtn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Refill,
    Delete,
    Download,
}

impl RowAction {
    pub fn resolve(data_action: Option<&str>, class_name: &str) -> Option<Self> {
        if let Some(action) = data_action {
            return match action.trim().to_ascii_lowercase().as_str() {
                "refill" => Some(Self::Refill),
                "delete" => Some(Self::Delete),
                "download" => Some(Self::Download),
                _ => None,
            };
        }

        class_name
            .split_whitespace()
            .find_map(|class| match class {
                "refillBtn" => Some(Self::Refill),
                "deleteBtn" => Some(Self::Delete),
                "downloadBtn" => Some(Self::Download),
                _ => None,
            })
    }
}

pub fn delete_prompt(title: &str) -> String {
    format!("Delete \"{title}\"?")
}

pub fn deleted_line(title: &str) -> String {
    format!("Record \"{title}\" deleted.")
}

/// Drops `clicked` from `rows` and re-clamps the page over the rows that are
/// left. `None` when the row is no longer part of the table.
pub fn remove_row<T: PartialEq>(
    rows: &mut Vec<T>,
    clicked: &T,
    state: &mut PageState,
) -> Option<(T, PageView)> {
    let index = rows.iter().position(|row| row == clicked)?;
    let removed = rows.remove(index);
    state.clamp(rows.len());
    Some((removed, state.view(rows.len())))
}

struct HistoryTable {
    body: HtmlElement,
    state: RefCell<PageState>,
    config: Rc<ClientConfig>,
    autosave: Option<Rc<PageAutosave>>,
}

impl HistoryTable {
    fn rows(&self) -> Vec<HtmlElement> {
        let Ok(nodes) = self.body.query_selector_all("tr") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|idx| nodes.item(idx))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn repaint(&self) {
        let rows = self.rows();
        let view = {
            let mut state = self.state.borrow_mut();
            state.clamp(rows.len());
            state.view(rows.len())
        };
        self.paint(&rows, &view);
    }

    fn paint(&self, rows: &[HtmlElement], view: &PageView) {
        let page_size = self.state.borrow().page_size();
        debug!(
            "history page {} of {}: {} of {} rows shown, {page_size} per page",
            view.page,
            view.total_pages,
            view.visible_count(),
            rows.len()
        );

        for (index, row) in rows.iter().enumerate() {
            set_display(row, view.is_visible(index));
        }
        set_text(PAGE_INFO_ID, view.label());
        set_nav_enabled(PREV_PAGE_ID, view.prev_enabled);
        set_nav_enabled(NEXT_PAGE_ID, view.next_enabled);
    }

    fn go_next(&self) {
        let row_count = self.rows().len();
        let moved = self.state.borrow_mut().next(row_count);
        if moved {
            debug!("moved to history page {}", self.state.borrow().current_page());
            self.repaint();
        }
    }

    fn go_prev(&self) {
        let moved = self.state.borrow_mut().prev();
        if moved {
            self.repaint();
        }
    }

    fn handle_click(self: &Rc<Self>, event: web_sys::Event) {
        let Some(button) = event
            .target()
            .and_then(|node| node.dyn_into::<Element>().ok())
            .and_then(|node| node.closest(ACTION_SELECTOR).ok().flatten())
        else {
            return;
        };
        let Some(action) =
            RowAction::resolve(button.get_attribute("data-action").as_deref(), &button.class_name())
        else {
            return;
        };
        let Some(id) = button
            .get_attribute("data-id")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        else {
            warn!("{action:?} button without data-id");
            return;
        };

        debug!("history row action {action:?} for {id}");
        match action {
            RowAction::Refill => self.refill(id),
            RowAction::Delete => self.delete(id, &button),
            RowAction::Download => download_report(id, self.config.clone()),
        }
    }

    fn refill(&self, id: String) {
        let autosave = self.autosave.clone();
        spawn_local(async move {
            let fields = match api::get_refill(&id).await {
                Ok(fields) => fields,
                Err(err) => {
                    warn!("refill {id} failed: {err}");
                    append_status(&err.status_line());
                    return;
                }
            };

            for (name, value) in fields.entries() {
                if let Some(element) = named_field(name) {
                    set_field_value(&element, value);
                }
                if let Some(autosave) = autosave.as_ref() {
                    autosave.persist(name, value);
                }
            }
            if let Some(file_input) = element_by_id::<HtmlInputElement>("excel_file") {
                file_input.set_value("");
            }

            info!("refilled send form from history {id}");
            alert("Form refilled from history!");
            if let Some(form) = element_by_id::<HtmlElement>(SEND_FORM_ID) {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                form.scroll_into_view_with_scroll_into_view_options(&options);
            }
        });
    }

    fn delete(self: &Rc<Self>, id: String, button: &Element) {
        let Some(row) = button
            .closest("tr")
            .ok()
            .flatten()
            .and_then(|row| row.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let title = row
            .query_selector(TITLE_CELL_SELECTOR)
            .ok()
            .flatten()
            .and_then(|cell| cell.text_content())
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        if !confirm(&delete_prompt(&title)) {
            return;
        }

        let table = self.clone();
        spawn_local(async move {
            match api::delete_record(&id).await {
                Ok(()) => {
                    let mut rows = table.rows();
                    let removed = remove_row(&mut rows, &row, &mut table.state.borrow_mut());
                    match removed {
                        Some((removed, view)) => {
                            removed.remove();
                            table.paint(&rows, &view);
                        }
                        None => {
                            row.remove();
                            table.repaint();
                        }
                    }
                    info!("deleted history record {id}");
                    append_status(&deleted_line(&title));
                }
                Err(err) => {
                    warn!("delete {id} failed: {err}");
                    append_status(&err.status_line());
                }
            }
        });
    }
}

pub fn init_history_table(config: Rc<ClientConfig>, autosave: Option<Rc<PageAutosave>>) {
    let Some(body) = element_by_id::<HtmlElement>(TABLE_BODY_ID) else {
        return;
    };

    let table = Rc::new(HistoryTable {
        body: body.clone(),
        state: RefCell::new(PageState::new(config.page_size)),
        config,
        autosave,
    });
    table.repaint();

    if let Some(prev) = element_by_id::<HtmlElement>(PREV_PAGE_ID) {
        let table_ref = table.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            table_ref.go_prev();
        });
        let _ = prev.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    if let Some(next) = element_by_id::<HtmlElement>(NEXT_PAGE_ID) {
        let table_ref = table.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            table_ref.go_next();
        });
        let _ = next.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let table_ref = table.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            table_ref.handle_click(event);
        });
        let _ = body.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }
}
