//! Ticket API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketd_core::{NewTicket, Ticket, TicketError, TicketStatus};

use crate::metrics::{TICKETS_CREATED_TOTAL, TICKET_STATUS_UPDATES_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    /// Ticket title (must be non-empty)
    pub title: String,
    /// Ticket description (must be non-empty)
    pub description: String,
    /// Initial status, `open` when omitted
    #[serde(default)]
    pub status: TicketStatus,
}

/// Request body for patching a ticket's status
#[derive(Debug, Deserialize)]
pub struct PatchStatusBody {
    pub status: TicketStatus,
}

/// Response for ticket operations
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            status: ticket.status,
            created_at: ticket.created_at.to_rfc3339(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List all tickets, newest first
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TicketResponse>>, impl IntoResponse> {
    match state.ticket_store().list() {
        Ok(tickets) => Ok(Json(
            tickets.into_iter().map(TicketResponse::from).collect(),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TicketErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<TicketResponse>), impl IntoResponse> {
    // Field validation happens before the store is touched, so a rejected
    // request never mutates anything.
    if body.title.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(TicketErrorResponse {
                error: "title must be a non-empty string".to_string(),
            }),
        ));
    }
    if body.description.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(TicketErrorResponse {
                error: "description must be a non-empty string".to_string(),
            }),
        ));
    }

    let request = NewTicket {
        title: body.title,
        description: body.description,
        status: body.status,
    };

    match state.ticket_store().create(request) {
        Ok(ticket) => {
            TICKETS_CREATED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket))))
        }
        Err(TicketError::DuplicateTitle(title)) => Err((
            StatusCode::CONFLICT,
            Json(TicketErrorResponse {
                error: format!("Ticket with title '{}' already exists", title),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TicketErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Replace a ticket's status
pub async fn patch_ticket_status(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
    Json(body): Json<PatchStatusBody>,
) -> Result<StatusCode, impl IntoResponse> {
    match state.ticket_store().update_status(&ticket_id, body.status) {
        Ok(ticket) => {
            TICKET_STATUS_UPDATES_TOTAL
                .with_label_values(&[ticket.status.as_str()])
                .inc();
            Ok(StatusCode::NO_CONTENT)
        }
        Err(TicketError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(TicketErrorResponse {
                error: format!("Ticket {} not found", ticket_id),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TicketErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
