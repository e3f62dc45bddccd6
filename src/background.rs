/// Background process: session context, minute-tick accounting, active-tab
/// tracking and the request handlers behind the message channel
///
/// Every browser input arrives as a `Dispatch` on one channel and is handled
/// to completion before the next one, so handlers never interleave.
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::channel::{mpsc, oneshot};
use futures::StreamExt;

use crate::config::Config;
use crate::error::Result;
use crate::operations::normalize_limit;
use crate::protocol::{Ack, ContentMessage, LimitsUpdated, Request, Response, Snapshot};
use crate::storage::{StatePatch, StoredState, Store};
use crate::tab_data::{IdleState, TabId, TabInfo};

/// `windows.WINDOW_ID_NONE`: focus left the browser
pub const WINDOW_ID_NONE: i32 = -1;

/// Tab and messaging side of the browser
#[async_trait(?Send)]
pub trait Browser {
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo>;

    async fn query_tabs(&self) -> Result<Vec<TabInfo>>;

    /// Active tab of the focused window, if any
    async fn focused_active_tab(&self) -> Result<Option<TabInfo>>;

    async fn send_to_tab(&self, tab_id: TabId, message: &ContentMessage) -> Result<()>;
}

/// Source of the current calendar day. Injected so tests can cross midnight.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// UTC calendar day, matching `Date.prototype.toISOString().slice(0, 10)`
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Usage bucket key for a day
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundEvent {
    Installed,
    Startup,
    Alarm(String),
    IdleStateChanged(IdleState),
    WindowFocusChanged(i32),
    TabActivated(TabId),
    TabUpdated { tab_id: TabId, complete: bool },
}

/// Item on the background channel
pub enum Dispatch {
    Event(BackgroundEvent),
    Request(Request, oneshot::Sender<Result<Response>>),
}

/// In-memory state of the background; never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub active_tab_id: Option<TabId>,
    pub active_domain: Option<String>,
    pub window_focused: bool,
    pub user_idle: bool,
    /// Best-effort calls that failed and were swallowed
    pub failures: u64,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            active_tab_id: None,
            active_domain: None,
            window_focused: true,
            user_idle: false,
            failures: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unfocused,
    Idle,
    NoActiveDomain,
    TabUnavailable,
    TabNotCountable,
    StorageUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Credited {
        domain: String,
        used: u32,
        /// Tabs that received a block push
        notified: usize,
    },
}

pub struct Background<S, B, C> {
    store: S,
    browser: B,
    clock: C,
    config: Config,
    session: Session,
}

impl<S: Store, B: Browser, C: Clock> Background<S, B, C> {
    pub fn new(store: S, browser: B, clock: C, config: Config) -> Self {
        Background {
            store,
            browser,
            clock,
            config,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn today(&self) -> String {
        day_key(self.clock.today())
    }

    /// Handle items until every sender is dropped
    pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Dispatch>) {
        while let Some(item) = inbox.next().await {
            match item {
                Dispatch::Event(event) => self.handle_event(event).await,
                Dispatch::Request(request, reply) => {
                    let response = self.handle_request(request).await;
                    // The sender side may have given up waiting
                    let _ = reply.send(response);
                }
            }
        }
        log::debug!("background channel closed");
    }

    pub async fn handle_event(&mut self, event: BackgroundEvent) {
        log::debug!("event: {:?}", event);

        match event {
            BackgroundEvent::Installed | BackgroundEvent::Startup => self.ensure_defaults().await,
            BackgroundEvent::Alarm(name) => {
                if name == self.config.alarm_name {
                    let outcome = self.tick().await;
                    log::debug!("tick: {:?}", outcome);
                }
            }
            BackgroundEvent::IdleStateChanged(state) => {
                self.session.user_idle = state.is_idle();
            }
            BackgroundEvent::WindowFocusChanged(window_id) => {
                self.session.window_focused = window_id != WINDOW_ID_NONE;
                self.update_active().await;
            }
            BackgroundEvent::TabActivated(tab_id) => {
                self.session.active_tab_id = Some(tab_id);
                self.update_active().await;
            }
            BackgroundEvent::TabUpdated { tab_id, complete } => {
                if complete && self.session.active_tab_id == Some(tab_id) {
                    self.update_active().await;
                }
            }
        }
    }

    pub async fn handle_request(&mut self, request: Request) -> Result<Response> {
        log::debug!("request: {:?}", request);

        match request {
            Request::GetSnapshot => {
                let state = self.store.load().await?;
                let today = self.today();

                Ok(Response::Snapshot(Snapshot {
                    usage: state.today_usage(&today),
                    date: today,
                    limits: state.limits,
                    active_domain: self.session.active_domain.clone(),
                    active_tab_id: self.session.active_tab_id,
                }))
            }
            Request::SetLimit { domain, minutes } => {
                let mut state = self.store.load().await?;
                let limit = normalize_limit(minutes);
                state.set_limit(&domain, limit);

                self.store
                    .save(StatePatch {
                        limits: Some(state.limits.clone()),
                        ..Default::default()
                    })
                    .await?;
                log::info!("limit for {} set to {:?}", domain, limit);

                self.update_active().await;
                Ok(Response::LimitsUpdated(LimitsUpdated {
                    ok: true,
                    limits: state.limits,
                }))
            }
            Request::ClearToday => {
                // Clears every day's bucket, not only today's
                let mut state = self.store.load().await?;
                state.clear_usage();

                self.store
                    .save(StatePatch {
                        usage: Some(state.usage),
                        ..Default::default()
                    })
                    .await?;
                log::info!("usage cleared");

                self.update_active().await;
                Ok(Response::Ack(Ack { ok: true }))
            }
            Request::QueryBlock { domain } => {
                let state = self.store.load().await?;
                Ok(Response::Block(state.block_decision(&self.today(), &domain)))
            }
        }
    }

    /// Seed settings, default limits and empty usage on first run
    async fn ensure_defaults(&mut self) {
        let loaded = self.store.load().await;
        let Some(state) = self.best_effort("load state", loaded) else {
            return;
        };
        if state.settings.init {
            return;
        }

        let seeded = StoredState::seeded(&self.today(), &self.config.default_limits);
        let saved = self.store.save(StatePatch::all(seeded)).await;
        if self.best_effort("seed defaults", saved).is_some() {
            log::info!("seeded {} default limits", self.config.default_limits.len());
        }
    }

    /// One accounting step; credits at most one minute
    pub async fn tick(&mut self) -> TickOutcome {
        if !self.session.window_focused {
            return TickOutcome::Skipped(SkipReason::Unfocused);
        }
        if self.session.user_idle {
            return TickOutcome::Skipped(SkipReason::Idle);
        }
        let (Some(tab_id), Some(domain)) = (self.session.active_tab_id, self.session.active_domain.clone())
        else {
            return TickOutcome::Skipped(SkipReason::NoActiveDomain);
        };

        let tab = self.browser.get_tab(tab_id).await;
        let Some(tab) = self.best_effort("get ticked tab", tab) else {
            return TickOutcome::Skipped(SkipReason::TabUnavailable);
        };
        if !tab.is_countable() {
            return TickOutcome::Skipped(SkipReason::TabNotCountable);
        }

        let loaded = self.store.load().await;
        let Some(mut state) = self.best_effort("load state", loaded) else {
            return TickOutcome::Skipped(SkipReason::StorageUnavailable);
        };

        let today = self.today();
        let mut patch = StatePatch::default();
        if state.roll_over(&today) {
            log::info!("day rolled over to {}", today);
            patch.settings = Some(state.settings.clone());
        }

        let used = state.record_minute(&today, &domain);
        patch.usage = Some(state.usage.clone());

        let saved = self.store.save(patch).await;
        if self.best_effort("save usage", saved).is_none() {
            return TickOutcome::Skipped(SkipReason::StorageUnavailable);
        }

        let notified = if state.block_decision(&today, &domain).should_block {
            self.broadcast_block(&domain).await
        } else {
            0
        };

        TickOutcome::Credited {
            domain,
            used,
            notified,
        }
    }

    /// Push BLOCK_NOW to every open tab on `domain`; returns deliveries
    async fn broadcast_block(&mut self, domain: &str) -> usize {
        let tabs = self.browser.query_tabs().await;
        let Some(tabs) = self.best_effort("query tabs", tabs) else {
            return 0;
        };

        let message = ContentMessage::BlockNow {
            domain: Some(domain.to_string()),
        };
        let targets: Vec<TabId> = tabs
            .iter()
            .filter(|tab| tab.domain().as_deref() == Some(domain))
            .filter_map(|tab| tab.id)
            .collect();

        let results =
            futures::future::join_all(targets.iter().map(|tab_id| self.browser.send_to_tab(*tab_id, &message)))
                .await;

        results
            .into_iter()
            .filter_map(|result| self.best_effort("send block", result))
            .count()
    }

    /// Re-resolve the active tab and tell it whether to block right now
    pub async fn update_active(&mut self) {
        let tab = self.resolve_active_tab().await;
        let domain = tab.as_ref().and_then(TabInfo::domain);
        self.session.active_domain = domain.clone();

        let (Some(tab_id), Some(domain)) = (tab.and_then(|tab| tab.id), domain) else {
            return;
        };

        let loaded = self.store.load().await;
        let Some(state) = self.best_effort("load state", loaded) else {
            return;
        };
        let decision = state.block_decision(&self.today(), &domain);

        let message = ContentMessage::ShouldBlock {
            domain,
            should_block: decision.should_block,
        };
        let sent = self.browser.send_to_tab(tab_id, &message).await;
        self.best_effort("send should-block", sent);
    }

    async fn resolve_active_tab(&mut self) -> Option<TabInfo> {
        if self.session.active_tab_id.is_none() {
            let queried = self.browser.focused_active_tab().await;
            if let Some(Some(tab)) = self.best_effort("query active tab", queried) {
                self.session.active_tab_id = tab.id;
            }
        }

        let tab_id = self.session.active_tab_id?;
        let tab = self.browser.get_tab(tab_id).await;
        self.best_effort("get active tab", tab)
    }

    /// Swallow a boundary failure: log it, count it, carry on
    fn best_effort<T>(&mut self, operation: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.session.failures += 1;
                log::warn!("{} failed: {}", operation, err);
                None
            }
        }
    }
}
