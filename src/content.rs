/// Content-script overlay state machine
///
/// The overlay is either hidden or shown. Query results and background pushes
/// are fed in; the returned `Transition` says what the DOM layer must do.
use crate::domain::normalize_host;
use crate::protocol::{BlockDecision, ContentMessage};

/// What the block card displays
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayInfo {
    pub domain: String,
    pub used: Option<u32>,
    pub limit: Option<u32>,
}

impl OverlayInfo {
    pub fn new(domain: &str) -> Self {
        OverlayInfo {
            domain: domain.to_string(),
            used: None,
            limit: None,
        }
    }

    pub fn headline(&self) -> String {
        format!("Time’s up for {}", self.domain)
    }

    /// Only known when the overlay came from a query with raw numbers
    pub fn usage_line(&self) -> Option<String> {
        match (self.used, self.limit) {
            (Some(used), Some(limit)) => Some(format!("You used {} / {} minutes today.", used, limit)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    Hidden,
    Shown(OverlayInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Show(OverlayInfo),
    Hide,
    Unchanged,
}

/// Per-page overlay controller
#[derive(Debug)]
pub struct Overlay {
    page_domain: String,
    state: OverlayState,
}

impl Overlay {
    /// `hostname` is `location.hostname` of the page
    pub fn for_hostname(hostname: &str) -> Self {
        Overlay {
            page_domain: normalize_host(hostname),
            state: OverlayState::Hidden,
        }
    }

    pub fn page_domain(&self) -> &str {
        &self.page_domain
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_shown(&self) -> bool {
        matches!(self.state, OverlayState::Shown(_))
    }

    /// Result of the initial STG_QUERY_BLOCK for this page
    pub fn on_query_result(&mut self, decision: BlockDecision) -> Transition {
        if decision.should_block {
            self.show(OverlayInfo {
                domain: self.page_domain.clone(),
                used: Some(decision.used),
                limit: decision.limit,
            })
        } else {
            self.hide()
        }
    }

    pub fn on_message(&mut self, message: ContentMessage) -> Transition {
        match message {
            ContentMessage::BlockNow { domain } => {
                let domain = domain.unwrap_or_else(|| self.page_domain.clone());
                self.show(OverlayInfo::new(&domain))
            }
            ContentMessage::ShouldBlock {
                domain,
                should_block: true,
            } => self.show(OverlayInfo::new(&domain)),
            ContentMessage::ShouldBlock {
                should_block: false, ..
            } => self.hide(),
        }
    }

    /// The DOM layer could not mount the card; the next show must retry
    pub fn mount_failed(&mut self) {
        self.state = OverlayState::Hidden;
    }

    fn show(&mut self, info: OverlayInfo) -> Transition {
        if self.is_shown() {
            return Transition::Unchanged;
        }
        self.state = OverlayState::Shown(info.clone());
        Transition::Show(info)
    }

    fn hide(&mut self) -> Transition {
        if !self.is_shown() {
            return Transition::Unchanged;
        }
        self.state = OverlayState::Hidden;
        Transition::Hide
    }
}

/// What the "Go back" button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    HistoryBack,
    CloseTab,
}

impl BackAction {
    pub fn for_history_length(length: u32) -> Self {
        if length > 1 {
            BackAction::HistoryBack
        } else {
            BackAction::CloseTab
        }
    }
}
