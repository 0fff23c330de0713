//! Ticket storage trait and request types.

use thiserror::Error;

use super::{Ticket, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// No ticket with the given id.
    #[error("Ticket {0} not found")]
    NotFound(String),

    /// A ticket with the same title (compared case-insensitively) already
    /// exists.
    #[error("Ticket with title '{0}' already exists")]
    DuplicateTitle(String),

    /// The backing document could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Request to create a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Ticket title.
    pub title: String,
    /// Ticket description.
    pub description: String,
    /// Initial status.
    pub status: TicketStatus,
}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// List every ticket, newest first: `created_at` descending, ties broken
    /// by numeric id descending.
    fn list(&self) -> Result<Vec<Ticket>, TicketError>;

    /// Get a ticket by id.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// Create a new ticket, assigning its id and creation timestamp.
    fn create(&self, request: NewTicket) -> Result<Ticket, TicketError>;

    /// Replace the status of an existing ticket. All other fields are left
    /// unchanged.
    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError>;
}
