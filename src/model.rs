use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SyncError;
use crate::page::ElementId;

/// Cart state as reported by the cart service after a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub item_count: u32,
    pub cart_total: f64,
    /// Only present for quantity updates.
    pub item_total: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Add,
    Remove,
    Update,
    Count,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Add => write!(f, "add"),
            ActionKind::Remove => write!(f, "remove"),
            ActionKind::Update => write!(f, "update"),
            ActionKind::Count => write!(f, "count"),
        }
    }
}

/// One intended cart mutation, built from page attributes when an event fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartActionRequest {
    pub kind: ActionKind,
    pub product_id: String,
    pub quantity: Option<u32>,
}

impl CartActionRequest {
    pub fn add(product_id: &str, quantity: u32) -> Self {
        CartActionRequest {
            kind: ActionKind::Add,
            product_id: product_id.to_string(),
            quantity: Some(quantity),
        }
    }

    pub fn remove(product_id: &str) -> Self {
        CartActionRequest {
            kind: ActionKind::Remove,
            product_id: product_id.to_string(),
            quantity: None,
        }
    }

    pub fn update(product_id: &str, quantity: u32) -> Self {
        CartActionRequest {
            kind: ActionKind::Update,
            product_id: product_id.to_string(),
            quantity: Some(quantity),
        }
    }

    pub fn count() -> Self {
        CartActionRequest {
            kind: ActionKind::Count,
            product_id: String::new(),
            quantity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartActionResult {
    Success {
        snapshot: CartSnapshot,
        message: Option<String>,
        payload: serde_json::Value,
    },
    Failure(SyncError),
}

impl CartActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CartActionResult::Success { .. })
    }

    pub fn snapshot(&self) -> Option<&CartSnapshot> {
        match self {
            CartActionResult::Success { snapshot, .. } => Some(snapshot),
            CartActionResult::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "info-circle",
            Severity::Success => "check-circle",
            Severity::Error => "exclamation-circle",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub element: ElementId,
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
    pub lifetime_ms: u64,
}

/// Broadcast after every successful mutation.
#[derive(Debug, Clone, Serialize)]
pub struct CartChanged {
    pub action: ActionKind,
    pub product_id: String,
    pub payload: serde_json::Value,
}
