/// In-memory fakes for the `Store`, `Browser` and `Clock` seams
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::background::{Browser, Clock};
use crate::error::{Error, Result};
use crate::protocol::ContentMessage;
use crate::storage::{StatePatch, StoredState, Store};
use crate::tab_data::{TabId, TabInfo};

#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<StoredState>,
    failing: Cell<bool>,
}

impl MemoryStore {
    pub fn with_state(state: StoredState) -> Self {
        MemoryStore {
            state: RefCell::new(state),
            failing: Cell::new(false),
        }
    }

    pub fn state(&self) -> StoredState {
        self.state.borrow().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn check(&self, call: &'static str) -> Result<()> {
        if self.failing.get() {
            Err(Error::bridge(call, "storage unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait(?Send)]
impl Store for MemoryStore {
    async fn load(&self) -> Result<StoredState> {
        self.check("storage.local.get")?;
        Ok(self.state())
    }

    async fn save(&self, patch: StatePatch) -> Result<()> {
        self.check("storage.local.set")?;
        patch.apply_to(&mut self.state.borrow_mut());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    tabs: RefCell<BTreeMap<TabId, TabInfo>>,
    focused_active: Cell<Option<TabId>>,
    failing_sends: RefCell<HashSet<TabId>>,
    sent: RefCell<Vec<(TabId, ContentMessage)>>,
}

impl FakeBrowser {
    pub fn with_tabs(tabs: Vec<TabInfo>) -> Self {
        let browser = FakeBrowser::default();
        for tab in tabs {
            browser.update_tab(tab);
        }
        browser
    }

    pub fn update_tab(&self, tab: TabInfo) {
        if let Some(id) = tab.id {
            self.tabs.borrow_mut().insert(id, tab);
        }
    }

    pub fn remove_tab(&self, tab_id: TabId) {
        self.tabs.borrow_mut().remove(&tab_id);
    }

    pub fn set_focused_active(&self, tab_id: Option<TabId>) {
        self.focused_active.set(tab_id);
    }

    pub fn fail_sends_to(&self, tab_id: TabId) {
        self.failing_sends.borrow_mut().insert(tab_id);
    }

    /// Messages delivered so far, clearing the log
    pub fn take_sent(&self) -> Vec<(TabId, ContentMessage)> {
        self.sent.take()
    }
}

#[async_trait(?Send)]
impl Browser for FakeBrowser {
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo> {
        self.tabs
            .borrow()
            .get(&tab_id)
            .cloned()
            .ok_or(Error::TabNotFound(tab_id))
    }

    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        Ok(self.tabs.borrow().values().cloned().collect())
    }

    async fn focused_active_tab(&self) -> Result<Option<TabInfo>> {
        Ok(self
            .focused_active
            .get()
            .and_then(|tab_id| self.tabs.borrow().get(&tab_id).cloned()))
    }

    async fn send_to_tab(&self, tab_id: TabId, message: &ContentMessage) -> Result<()> {
        if self.failing_sends.borrow().contains(&tab_id) || !self.tabs.borrow().contains_key(&tab_id) {
            return Err(Error::bridge("tabs.sendMessage", "receiving end does not exist"));
        }
        self.sent.borrow_mut().push((tab_id, message.clone()));
        Ok(())
    }
}

pub struct FixedClock {
    today: Cell<NaiveDate>,
}

impl FixedClock {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        FixedClock {
            today: Cell::new(Self::date(year, month, day)),
        }
    }

    pub fn set(&self, year: i32, month: u32, day: u32) {
        self.today.set(Self::date(year, month, day));
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}
