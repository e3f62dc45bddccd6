/// Data structures for browser tabs as the extension sees them
use serde::{Deserialize, Serialize};

use crate::domain::domain_from_url;

pub type TabId = i32;

/// Information about a browser tab
///
/// Mirrors the subset of `tabs.Tab` the background reads. Fields the browser
/// omits (e.g. `url` without the tabs permission) fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabInfo {
    pub id: Option<TabId>,
    pub url: Option<String>,
    pub active: bool,
    pub discarded: bool,
}

impl TabInfo {
    pub fn new(id: TabId, url: &str, active: bool) -> TabInfo {
        TabInfo {
            id: Some(id),
            url: Some(url.to_string()),
            active,
            discarded: false,
        }
    }

    /// Domain key of the tab's current URL
    pub fn domain(&self) -> Option<String> {
        self.url.as_deref().and_then(domain_from_url)
    }

    /// Whether a tick may credit this tab
    pub fn is_countable(&self) -> bool {
        self.active && self.id.is_some() && !self.discarded && self.domain().is_some()
    }
}

/// User idle state as reported by the idle API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

impl IdleState {
    /// Anything other than "active" counts as idle; unknown strings too
    pub fn parse(state: &str) -> IdleState {
        match state {
            "active" => IdleState::Active,
            "locked" => IdleState::Locked,
            _ => IdleState::Idle,
        }
    }

    pub fn is_idle(self) -> bool {
        self != IdleState::Active
    }
}
