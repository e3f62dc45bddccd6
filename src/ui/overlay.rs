/// Full-page block overlay injected by the content script

use web_sys::Document;
use yew::prelude::*;

use crate::content::{BackAction, OverlayInfo};

const STYLE_ID: &str = "stg-block-style";

const STYLES: &str = r#"
.stg-block {
  position: fixed; inset: 0; z-index: 2147483647;
  display: flex; align-items: center; justify-content: center;
  backdrop-filter: blur(3px);
  background: rgba(0,0,0,0.55);
}
.stg-card {
  max-width: 520px; width: 92%;
  background: #111; color: #fff; border-radius: 16px; padding: 24px; box-shadow: 0 10px 30px rgba(0,0,0,.4);
  font: 15px/1.5 system-ui, -apple-system, Segoe UI, Roboto, Ubuntu, "Helvetica Neue", Arial, sans-serif;
  text-align: center;
}
.stg-card h1 { margin: 0 0 8px; font-size: 22px; }
.stg-card p { opacity: .9; margin: 6px 0 16px; }
.stg-row { display: flex; gap: 8px; justify-content: center; flex-wrap: wrap; margin-top: 4px; }
.stg-btn { border: 0; border-radius: 10px; padding: 10px 14px; cursor: pointer; }
.stg-primary { background: #ff6363; color: #111; font-weight: 700; }
.stg-ghost { background: #222; color: #fff; }
.stg-hint { opacity: .7; margin-top: 14px; }
"#;

/// Add the overlay stylesheet once per document
pub fn ensure_styles(document: &Document) {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return;
    }

    let Ok(style) = document.create_element("style") else {
        return;
    };
    style.set_id(STYLE_ID);
    style.set_text_content(Some(STYLES));

    if let Some(root) = document.document_element() {
        let _ = root.append_child(&style);
    }
}

#[derive(Properties, PartialEq)]
pub struct BlockOverlayProps {
    pub info: OverlayInfo,
}

#[function_component(BlockOverlay)]
pub fn block_overlay(props: &BlockOverlayProps) -> Html {
    let on_close = Callback::from(|_: MouseEvent| close_tab());
    let on_back = Callback::from(|_: MouseEvent| go_back());

    html! {
        <div class="stg-block">
            <div class="stg-card" role="dialog" aria-modal="true">
                <h1>{props.info.headline()}</h1>
                if let Some(line) = props.info.usage_line() {
                    <p>{line}</p>
                }
                <div class="stg-row">
                    <button class="stg-btn stg-primary" onclick={on_close}>{"Close tab"}</button>
                    <button class="stg-btn stg-ghost" onclick={on_back}>{"Go back"}</button>
                </div>
                <p class="stg-hint">{"Need more time? Set a new limit in the extension popup."}</p>
            </div>
        </div>
    }
}

fn close_tab() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.close() {
            log::warn!("window.close failed: {:?}", e);
        }
    }
}

fn go_back() {
    let Some(window) = web_sys::window() else {
        return;
    };

    let length = window
        .history()
        .and_then(|history| history.length())
        .unwrap_or(0);

    match BackAction::for_history_length(length) {
        BackAction::HistoryBack => {
            if let Ok(history) = window.history() {
                let _ = history.back();
            }
        }
        BackAction::CloseTab => close_tab(),
    }
}
