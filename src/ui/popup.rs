/// Popup UI for Site Time Guard

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::background::Browser;
use crate::bridge::{ExtensionBrowser, send_request};
use crate::domain::clean_domain_input;
use crate::error::Result;
use crate::operations::{active_label, parse_minutes, usage_rows};
use crate::protocol::{Ack, LimitsUpdated, Request, Snapshot};
use crate::ui::components::UsageTable;

const INVALID_DOMAIN: &str = "Enter a valid domain (e.g., youtube.com).";
const CONFIRM_CLEAR: &str = "Clear today’s usage for all sites?";

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Ready(Snapshot),
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let domain_input = use_state(String::new);
    let minutes_input = use_state(String::new);

    // Fetch the snapshot and pre-fill the domain field on mount
    {
        let state = state.clone();
        let domain_input = domain_input.clone();

        use_effect_with((), move |_| {
            refresh(state);
            spawn_local(async move {
                if let Ok(Some(tab)) = ExtensionBrowser.focused_active_tab().await {
                    if let Some(domain) = tab.domain() {
                        domain_input.set(domain);
                    }
                }
            });
            || ()
        });
    }

    let on_domain_input = {
        let domain_input = domain_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                domain_input.set(input.value());
            }
        })
    };

    let on_minutes_input = {
        let minutes_input = minutes_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                minutes_input.set(input.value());
            }
        })
    };

    // Set limit handler
    let on_set = {
        let state = state.clone();
        let domain_input = domain_input.clone();
        let minutes_input = minutes_input.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(domain) = clean_domain_input(&domain_input) else {
                alert(INVALID_DOMAIN);
                return;
            };
            let minutes = parse_minutes(&minutes_input);

            domain_input.set(String::new());
            minutes_input.set(String::new());

            let state = state.clone();
            spawn_local(async move {
                match set_limit(domain, minutes).await {
                    Ok(_) => refresh(state),
                    Err(e) => {
                        log::warn!("set limit failed: {}", e);
                        state.set(PopupState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    // Delete limit handler
    let on_delete = {
        let state = state.clone();

        Callback::from(move |domain: String| {
            let state = state.clone();
            spawn_local(async move {
                match set_limit(domain, Some(0.0)).await {
                    Ok(_) => refresh(state),
                    Err(e) => {
                        log::warn!("delete limit failed: {}", e);
                        state.set(PopupState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    // Clear usage handler
    let on_clear = {
        let state = state.clone();

        Callback::from(move |_: MouseEvent| {
            if !confirm(CONFIRM_CLEAR) {
                return;
            }

            let state = state.clone();
            spawn_local(async move {
                match send_request::<Ack>(&Request::ClearToday).await {
                    Ok(_) => refresh(state),
                    Err(e) => {
                        log::warn!("clear usage failed: {}", e);
                        state.set(PopupState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Site Time Guard"}</h1>

            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PopupState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Something went wrong"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PopupState::Ready(snapshot) => html! {
                    <>
                        <p class="active-label">{active_label(snapshot.active_domain.as_deref())}</p>
                        <UsageTable rows={usage_rows(snapshot)} on_delete={on_delete.clone()} />
                    </>
                },
            }}

            <div class="limit-form">
                <input
                    type="text"
                    placeholder="youtube.com"
                    value={(*domain_input).clone()}
                    oninput={on_domain_input}
                    class="domain-input"
                />
                <input
                    type="number"
                    min="0"
                    placeholder="minutes"
                    value={(*minutes_input).clone()}
                    oninput={on_minutes_input}
                    class="minutes-input"
                />
                <Button onclick={on_set} variant={ButtonVariant::Primary}>
                    {"Set limit"}
                </Button>
            </div>

            <div class="flex-column-gap">
                <Button onclick={on_clear} variant={ButtonVariant::Secondary}>
                    {"Clear usage"}
                </Button>
            </div>
        </div>
    }
}

// Helper functions

/// Re-fetch the whole snapshot; every mutation ends here
fn refresh(state: UseStateHandle<PopupState>) {
    spawn_local(async move {
        match send_request::<Snapshot>(&Request::GetSnapshot).await {
            Ok(snapshot) => state.set(PopupState::Ready(snapshot)),
            Err(e) => state.set(PopupState::Error(e.to_string())),
        }
    });
}

async fn set_limit(domain: String, minutes: Option<f64>) -> Result<LimitsUpdated> {
    send_request(&Request::SetLimit { domain, minutes }).await
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}
