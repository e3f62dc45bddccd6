/// Persisted state layout for storage.local
///
/// Three top-level keys, each a flat JSON object:
/// - `settings`: `{ init, lastDay }`
/// - `limits`: domain → minutes per day
/// - `usage`: `YYYY-MM-DD` → (domain → minutes)
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::BlockDecision;

pub const SETTINGS_KEY: &str = "settings";
pub const LIMITS_KEY: &str = "limits";
pub const USAGE_KEY: &str = "usage";
pub const STORAGE_KEYS: [&str; 3] = [SETTINGS_KEY, LIMITS_KEY, USAGE_KEY];

pub type Limits = BTreeMap<String, u32>;
pub type DayUsage = BTreeMap<String, u32>;
pub type Usage = BTreeMap<String, DayUsage>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Defaults have been seeded
    pub init: bool,
    /// Day the usage mapping was last reset
    pub last_day: Option<String>,
}

/// Root storage structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredState {
    pub settings: Settings,
    pub limits: Limits,
    pub usage: Usage,
}

impl StoredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minutes spent on `domain` during `day`
    pub fn used(&self, day: &str, domain: &str) -> u32 {
        self.usage
            .get(day)
            .and_then(|minutes| minutes.get(domain))
            .copied()
            .unwrap_or(0)
    }

    pub fn limit(&self, domain: &str) -> Option<u32> {
        self.limits.get(domain).copied()
    }

    pub fn today_usage(&self, day: &str) -> DayUsage {
        self.usage.get(day).cloned().unwrap_or_default()
    }

    pub fn block_decision(&self, day: &str, domain: &str) -> BlockDecision {
        BlockDecision::evaluate(self.used(day, domain), self.limit(domain))
    }

    /// Reset usage if `today` is a new day. Returns true when a reset happened.
    pub fn roll_over(&mut self, today: &str) -> bool {
        if self.settings.last_day.as_deref() == Some(today) {
            return false;
        }

        self.usage.clear();
        self.settings.last_day = Some(today.to_string());
        true
    }

    /// Credit one minute to `domain` on `day`, returning the new total
    pub fn record_minute(&mut self, day: &str, domain: &str) -> u32 {
        let minutes = self
            .usage
            .entry(day.to_string())
            .or_default()
            .entry(domain.to_string())
            .or_insert(0);
        *minutes = minutes.saturating_add(1);
        *minutes
    }

    /// Store a limit, or remove it when `minutes` is None
    pub fn set_limit(&mut self, domain: &str, minutes: Option<u32>) {
        match minutes {
            Some(minutes) => {
                self.limits.insert(domain.to_string(), minutes);
            }
            None => {
                self.limits.remove(domain);
            }
        }
    }

    /// Wipe usage for every recorded day
    pub fn clear_usage(&mut self) {
        self.usage.clear();
    }

    /// First-run state: seeded limits, empty usage, today as the last reset
    pub fn seeded(today: &str, default_limits: &Limits) -> Self {
        StoredState {
            settings: Settings {
                init: true,
                last_day: Some(today.to_string()),
            },
            limits: default_limits.clone(),
            usage: Usage::new(),
        }
    }
}

/// Partial write: only the keys that are Some get replaced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StatePatch {
    pub fn all(state: StoredState) -> Self {
        StatePatch {
            settings: Some(state.settings),
            limits: Some(state.limits),
            usage: Some(state.usage),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_none() && self.limits.is_none() && self.usage.is_none()
    }

    pub fn apply_to(self, state: &mut StoredState) {
        if let Some(settings) = self.settings {
            state.settings = settings;
        }
        if let Some(limits) = self.limits {
            state.limits = limits;
        }
        if let Some(usage) = self.usage {
            state.usage = usage;
        }
    }
}

/// Key-value persistence the background reads and writes through
///
/// Every call is a suspension point; a load followed by a save is not atomic.
#[async_trait(?Send)]
pub trait Store {
    async fn load(&self) -> Result<StoredState>;

    async fn save(&self, patch: StatePatch) -> Result<()>;
}
