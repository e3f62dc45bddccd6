/// JS bridge: browser extension APIs exposed to Rust
///
/// `bridge.js` wraps the `browser`/`chrome` namespace. Everything here is a
/// thin typed layer over it; values cross as plain JSON-compatible objects.
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::background::Browser;
use crate::error::{Error, Result};
use crate::protocol::{ContentMessage, Request};
use crate::storage::{STORAGE_KEYS, StatePatch, StoredState, Store};
use crate::tab_data::{TabId, TabInfo};

#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(patch: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabs() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> std::result::Result<JsValue, JsValue>;

    pub fn createAlarm(name: &str, period_in_minutes: f64);

    pub fn setIdleDetectionInterval(seconds: u32);

    pub fn onAlarm(callback: &js_sys::Function);

    pub fn onInstalled(callback: &js_sys::Function);

    pub fn onStartup(callback: &js_sys::Function);

    pub fn onIdleStateChanged(callback: &js_sys::Function);

    pub fn onWindowFocusChanged(callback: &js_sys::Function);

    pub fn onTabActivated(callback: &js_sys::Function);

    pub fn onTabUpdated(callback: &js_sys::Function);

    pub fn onRuntimeMessage(callback: &js_sys::Function);
}

/// Serialize to plain objects (not `Map`s) so storage and messaging accept it
pub fn to_js<T: Serialize>(what: &'static str, value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::serde(what, e))
}

pub fn from_js<T: DeserializeOwned>(what: &'static str, value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| Error::serde(what, e))
}

fn js_error(call: &'static str, err: JsValue) -> Error {
    Error::bridge(call, format!("{:?}", err))
}

/// Send a request to the background and decode its reply
pub async fn send_request<T: DeserializeOwned>(request: &Request) -> Result<T> {
    let message = to_js("request", request)?;
    let reply = sendRuntimeMessage(message)
        .await
        .map_err(|e| js_error("runtime.sendMessage", e))?;
    from_js("response", reply)
}

/// `storage.local`
pub struct BrowserStore;

#[async_trait(?Send)]
impl Store for BrowserStore {
    async fn load(&self) -> Result<StoredState> {
        let keys = to_js("storage keys", &STORAGE_KEYS)?;
        let stored = getStorage(keys)
            .await
            .map_err(|e| js_error("storage.local.get", e))?;

        if stored.is_null() || stored.is_undefined() {
            Ok(StoredState::new())
        } else {
            from_js("stored state", stored)
        }
    }

    async fn save(&self, patch: StatePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let patch = to_js("state patch", &patch)?;
        setStorage(patch)
            .await
            .map_err(|e| js_error("storage.local.set", e))?;
        Ok(())
    }
}

/// `tabs.*` for the running browser
pub struct ExtensionBrowser;

#[async_trait(?Send)]
impl Browser for ExtensionBrowser {
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo> {
        let tab = getTab(tab_id).await.map_err(|e| js_error("tabs.get", e))?;
        if tab.is_null() || tab.is_undefined() {
            return Err(Error::TabNotFound(tab_id));
        }
        from_js("tab", tab)
    }

    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        let tabs = queryTabs().await.map_err(|e| js_error("tabs.query", e))?;
        from_js("tabs", tabs)
    }

    async fn focused_active_tab(&self) -> Result<Option<TabInfo>> {
        let tab = queryActiveTab()
            .await
            .map_err(|e| js_error("tabs.query", e))?;
        if tab.is_null() || tab.is_undefined() {
            Ok(None)
        } else {
            from_js("tab", tab).map(Some)
        }
    }

    async fn send_to_tab(&self, tab_id: TabId, message: &ContentMessage) -> Result<()> {
        let message = to_js("content message", message)?;
        sendTabMessage(tab_id, message)
            .await
            .map_err(|e| js_error("tabs.sendMessage", e))?;
        Ok(())
    }
}
