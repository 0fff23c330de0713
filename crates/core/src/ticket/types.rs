//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a ticket.
///
/// Every status may transition to every other status (including itself);
/// `closed` tickets remain patchable.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    /// Returns the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tracked ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Unique identifier (monotonically increasing decimal string, assigned
    /// by the store). Never reused or mutated.
    pub id: String,

    /// Title, unique case-insensitively across all tickets.
    pub title: String,

    /// Freeform description.
    pub description: String,

    /// Current status.
    pub status: TicketStatus,

    /// When the ticket was created. Immutable after creation.
    pub created_at: DateTime<Utc>,
}
