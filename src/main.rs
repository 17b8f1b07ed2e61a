mod api;
mod autosave;
mod config;
mod dom;
mod error;
mod history;
mod pagination;
mod report;
mod send;

use std::rc::Rc;

use leptos::*;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_web::MakeWebConsoleWriter;
use web_sys::HtmlElement;

use crate::config::ClientConfig;
use crate::dom::element_by_id;

#[component]
fn App() -> impl IntoView {
    view! {
        <div
            id="leptos-runtime-marker"
            data-runtime="sender-frontend"
            style="display:none;"
        ></div>
    }
}

fn init_tracing(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn main() {
    console_error_panic_hook::set_once();

    let (config, bootstrap_error) = match ClientConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (ClientConfig::default(), Some(err)),
    };
    init_tracing(&config.log_level);
    if let Some(err) = bootstrap_error {
        warn!("ignoring malformed #{} bootstrap: {err}", config::CONFIG_ELEMENT_ID);
    }
    let config = Rc::new(config);

    if let Some(root) = element_by_id::<HtmlElement>("leptos-runtime-root") {
        mount_to(root, || view! { <App /> });
    } else {
        mount_to_body(|| view! { <App /> });
    }

    let autosave = autosave::init_autosave(&config);
    send::init_send_form(&config, autosave.clone());
    send::init_submit_shortcut();
    history::init_history_table(config.clone(), autosave);
    report::init_report_page(config.clone());

    info!("sender frontend ready");
}
