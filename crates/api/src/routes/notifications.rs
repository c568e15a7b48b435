//! Notification inbox endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use common::NotificationId;
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::response::Envelope;
use crate::routes::parse_id;

/// GET /notifications — newest 50 with the unread count.
pub async fn list<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let inbox = state.notifications.inbox(&actor).await?;
    Ok(Envelope::data(inbox))
}

/// PUT /notifications/{id}/read — flip one read flag.
pub async fn read<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = NotificationId::from_uuid(parse_id(&id)?);
    let notification = state.notifications.mark_read(&actor, id).await?;
    Ok(Envelope::with_message(
        notification,
        "Notification marked as read",
    ))
}

/// PUT /notifications/read-all — flip every unread flag.
pub async fn read_all<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    state.notifications.mark_all_read(&actor).await?;
    Ok(Envelope::message_only("All notifications marked as read"))
}

/// DELETE /notifications/{id} — delete one row.
pub async fn remove<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = NotificationId::from_uuid(parse_id(&id)?);
    state.notifications.delete(&actor, id).await?;
    Ok(Envelope::message_only("Notification deleted successfully"))
}

/// DELETE /notifications — clear the whole inbox.
pub async fn clear<S: MarketStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(actor): Caller,
) -> Result<impl IntoResponse, ApiError> {
    state.notifications.clear(&actor).await?;
    Ok(Envelope::message_only(
        "All notifications cleared successfully",
    ))
}
