//! # Notifications
//!
//! Fire-and-forget user notifications. Each one is logged through `tracing`
//! at the matching level and kept in a bounded ring so the HTTP API can show
//! the most recent ones.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Default number of notifications kept.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Delivery order, starting at 1.
    pub sequence: u64,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug)]
struct Ring {
    entries: VecDeque<Notification>,
    capacity: usize,
    next_sequence: u64,
}

/// Cloneable handle to a shared notification ring.
#[derive(Debug, Clone)]
pub struct Notifier {
    ring: Arc<Mutex<Ring>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(Ring {
                entries: VecDeque::with_capacity(capacity.max(1)),
                capacity: capacity.max(1),
                next_sequence: 1,
            })),
        }
    }

    /// Deliver a notification. Never fails.
    pub fn notify(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) {
        let title = title.into();
        let description = description.into();

        match severity {
            Severity::Error => tracing::error!(event = "notification", %title, "{}", description),
            Severity::Warning => tracing::warn!(event = "notification", %title, "{}", description),
            Severity::Info | Severity::Success => {
                tracing::info!(event = "notification", %title, "{}", description)
            }
        }

        let mut ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        let sequence = ring.next_sequence;
        ring.next_sequence += 1;
        if ring.entries.len() == ring.capacity {
            ring.entries.pop_front();
        }
        ring.entries.push_back(Notification {
            sequence,
            title,
            description,
            severity,
        });
    }

    /// Up to `limit` most recent notifications, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        let ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        ring.entries.iter().rev().take(limit).cloned().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
