/// Message protocol between the background, content scripts and the popup
///
/// Messages are plain JSON objects discriminated by a `type` field, the same
/// shape on both sides of `runtime.sendMessage` / `tabs.sendMessage`.
use serde::{Deserialize, Serialize};

use crate::storage::{DayUsage, Limits};
use crate::tab_data::TabId;

/// Requests handled by the background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "STG_GET_SNAPSHOT")]
    GetSnapshot,

    /// `minutes` absent, NaN or <= 0 deletes the limit
    #[serde(rename = "STG_SET_LIMIT")]
    SetLimit {
        domain: String,
        #[serde(default)]
        minutes: Option<f64>,
    },

    /// Wipes usage for every day, not just today
    #[serde(rename = "STG_CLEAR_TODAY")]
    ClearToday,

    #[serde(rename = "STG_QUERY_BLOCK")]
    QueryBlock { domain: String },
}

/// Pushes from the background to content scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentMessage {
    /// A tick crossed the limit for this domain
    #[serde(rename = "STG_BLOCK_NOW")]
    BlockNow {
        #[serde(default)]
        domain: Option<String>,
    },

    /// Re-evaluation after navigation, activation or a settings change
    #[serde(rename = "STG_SHOULD_BLOCK", rename_all = "camelCase")]
    ShouldBlock { domain: String, should_block: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub date: String,
    /// Today's bucket only
    pub usage: DayUsage,
    pub limits: Limits,
    pub active_domain: Option<String>,
    pub active_tab_id: Option<TabId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsUpdated {
    pub ok: bool,
    pub limits: Limits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

/// `limit != None && used >= limit`, with the raw values alongside
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDecision {
    pub should_block: bool,
    pub used: u32,
    pub limit: Option<u32>,
}

impl BlockDecision {
    /// A stored limit of zero counts as no limit
    pub fn evaluate(used: u32, limit: Option<u32>) -> Self {
        let limit = limit.filter(|limit| *limit > 0);
        BlockDecision {
            should_block: limit.is_some_and(|limit| used >= limit),
            used,
            limit,
        }
    }
}

/// Reply to a `Request`; serialized without a discriminator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Snapshot(Snapshot),
    LimitsUpdated(LimitsUpdated),
    Ack(Ack),
    Block(BlockDecision),
}
