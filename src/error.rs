/// Error type shared by the bridge, the storage layer and the background
use thiserror::Error;

use crate::tab_data::TabId;

#[derive(Debug, Error)]
pub enum Error {
    /// A browser API call rejected or threw
    #[error("browser call `{call}` failed: {message}")]
    Bridge { call: &'static str, message: String },

    #[error("failed to (de)serialize {what}: {message}")]
    Serde { what: &'static str, message: String },

    #[error("tab {0} not found")]
    TabNotFound(TabId),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn bridge(call: &'static str, message: impl Into<String>) -> Self {
        Error::Bridge {
            call,
            message: message.into(),
        }
    }

    pub fn serde(what: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Serde {
            what,
            message: err.to_string(),
        }
    }
}
