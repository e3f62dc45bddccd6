/// Entry wiring for the background and content contexts
///
/// Registers browser listeners through the bridge and turns each callback into
/// a typed event or request. Listener closures live as long as the page, so
/// they are leaked with `into_js_value`.
use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::{mpsc, oneshot};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::Element;
use yew::AppHandle;

use crate::background::{Background, BackgroundEvent, Dispatch, SystemClock};
use crate::bridge::{self, BrowserStore, ExtensionBrowser, from_js, send_request, to_js};
use crate::config::Config;
use crate::content::{Overlay, OverlayInfo, Transition};
use crate::protocol::{BlockDecision, ContentMessage, Request};
use crate::tab_data::IdleState;
use crate::ui::overlay::{BlockOverlay, BlockOverlayProps, ensure_styles};

/// `listener` is a leaked closure from `Closure::into_js_value`
fn register(add_listener: fn(&js_sys::Function), listener: JsValue) {
    add_listener(listener.unchecked_ref());
}

fn forward(sender: &mpsc::UnboundedSender<Dispatch>, event: BackgroundEvent) {
    if sender.unbounded_send(Dispatch::Event(event)).is_err() {
        log::warn!("background channel closed, event dropped");
    }
}

/// Start the background: alarm, idle detection, listeners, dispatch loop
pub fn start_background(config: Config) {
    let (sender, inbox) = mpsc::unbounded();

    bridge::createAlarm(&config.alarm_name, config.tick_period_minutes);
    bridge::setIdleDetectionInterval(config.idle_detection_seconds);

    let tx = sender.clone();
    register(
        bridge::onInstalled,
        Closure::<dyn FnMut()>::new(move || forward(&tx, BackgroundEvent::Installed)).into_js_value(),
    );

    let tx = sender.clone();
    register(
        bridge::onStartup,
        Closure::<dyn FnMut()>::new(move || forward(&tx, BackgroundEvent::Startup)).into_js_value(),
    );

    let tx = sender.clone();
    register(
        bridge::onAlarm,
        Closure::<dyn FnMut(String)>::new(move |name: String| forward(&tx, BackgroundEvent::Alarm(name)))
            .into_js_value(),
    );

    let tx = sender.clone();
    register(
        bridge::onIdleStateChanged,
        Closure::<dyn FnMut(String)>::new(move |state: String| {
            forward(&tx, BackgroundEvent::IdleStateChanged(IdleState::parse(&state)))
        })
        .into_js_value(),
    );

    let tx = sender.clone();
    register(
        bridge::onWindowFocusChanged,
        Closure::<dyn FnMut(i32)>::new(move |window_id: i32| {
            forward(&tx, BackgroundEvent::WindowFocusChanged(window_id))
        })
        .into_js_value(),
    );

    let tx = sender.clone();
    register(
        bridge::onTabActivated,
        Closure::<dyn FnMut(i32)>::new(move |tab_id: i32| forward(&tx, BackgroundEvent::TabActivated(tab_id)))
            .into_js_value(),
    );

    let tx = sender.clone();
    register(
        bridge::onTabUpdated,
        Closure::<dyn FnMut(i32, bool)>::new(move |tab_id: i32, complete: bool| {
            forward(&tx, BackgroundEvent::TabUpdated { tab_id, complete })
        })
        .into_js_value(),
    );

    let tx = sender;
    register(
        bridge::onRuntimeMessage,
        Closure::<dyn FnMut(JsValue) -> JsValue>::new(move |message: JsValue| answer(&tx, message))
            .into_js_value(),
    );

    let background = Background::new(BrowserStore, ExtensionBrowser, SystemClock, config);
    spawn_local(background.run(inbox));
    log::info!("background started");
}

/// Queue a request and hand the browser a promise for its response.
/// Messages that are not requests get `undefined` so other listeners may answer.
fn answer(sender: &mpsc::UnboundedSender<Dispatch>, message: JsValue) -> JsValue {
    let request: Request = match from_js("request", message) {
        Ok(request) => request,
        Err(err) => {
            log::debug!("ignoring message: {}", err);
            return JsValue::UNDEFINED;
        }
    };

    let (reply, response) = oneshot::channel();
    if sender.unbounded_send(Dispatch::Request(request, reply)).is_err() {
        log::warn!("background channel closed, request dropped");
        return JsValue::UNDEFINED;
    }

    future_to_promise(async move {
        match response.await {
            Ok(Ok(response)) => to_js("response", &response).map_err(|e| JsValue::from_str(&e.to_string())),
            Ok(Err(err)) => Err(JsValue::from_str(&err.to_string())),
            Err(_) => Err(JsValue::from_str("background stopped before replying")),
        }
    })
    .into()
}

/// Overlay controller plus the mounted Yew app, if any
struct ContentScript {
    overlay: Overlay,
    mounted: Option<(Element, AppHandle<BlockOverlay>)>,
}

impl ContentScript {
    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Show(info) => {
                if !self.mount(info) {
                    log::warn!("could not mount the block overlay");
                    self.overlay.mount_failed();
                }
            }
            Transition::Hide => self.unmount(),
            Transition::Unchanged => {}
        }
    }

    /// Returns false when the page has nowhere to attach the card
    fn mount(&mut self, info: OverlayInfo) -> bool {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return false;
        };
        let Some(root) = document.document_element() else {
            return false;
        };
        let Ok(host) = document.create_element("div") else {
            return false;
        };

        ensure_styles(&document);
        if root.append_child(&host).is_err() {
            return false;
        }

        let handle =
            yew::Renderer::<BlockOverlay>::with_root_and_props(host.clone(), BlockOverlayProps { info }).render();
        self.mounted = Some((host, handle));
        true
    }

    fn unmount(&mut self) {
        if let Some((host, handle)) = self.mounted.take() {
            handle.destroy();
            host.remove();
        }
    }
}

/// Start the content script: initial block query plus background pushes
pub fn start_content() {
    let hostname = web_sys::window()
        .and_then(|window| window.location().hostname().ok())
        .unwrap_or_default();

    let script = Rc::new(RefCell::new(ContentScript {
        overlay: Overlay::for_hostname(&hostname),
        mounted: None,
    }));

    let listener_script = script.clone();
    register(
        bridge::onRuntimeMessage,
        Closure::<dyn FnMut(JsValue) -> JsValue>::new(move |message: JsValue| {
            match from_js::<ContentMessage>("content message", message) {
                Ok(message) => {
                    let transition = listener_script.borrow_mut().overlay.on_message(message);
                    listener_script.borrow_mut().apply(transition);
                }
                Err(err) => log::debug!("ignoring message: {}", err),
            }
            JsValue::UNDEFINED
        })
        .into_js_value(),
    );

    spawn_local(async move {
        let domain = script.borrow().overlay.page_domain().to_string();
        match send_request::<BlockDecision>(&Request::QueryBlock { domain }).await {
            Ok(decision) => {
                let transition = script.borrow_mut().overlay.on_query_result(decision);
                script.borrow_mut().apply(transition);
            }
            Err(err) => log::debug!("block query failed: {}", err),
        }
    });
}
