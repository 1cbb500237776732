use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use super::domain::{
    ConversationId, ConversationThread, Delivery, Inbox, Message, OutgoingMessage, Reply,
};
use super::service::Messenger;
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::RentalStore;

pub fn conversation_router<S>(messenger: Arc<Messenger<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/conversations",
            get(inbox_handler::<S>).post(send_handler::<S>),
        )
        .route(
            "/api/v1/conversations/:conversation_id",
            get(open_handler::<S>),
        )
        .route(
            "/api/v1/conversations/:conversation_id/messages",
            post(reply_handler::<S>),
        )
        .with_state(messenger)
}

pub(crate) async fn inbox_handler<S>(
    State(messenger): State<Arc<Messenger<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Inbox>, ServiceError>
where
    S: RentalStore + 'static,
{
    messenger.inbox(&actor).map(Json)
}

/// 201 when a new conversation was started, 200 when an existing one was continued.
pub(crate) async fn send_handler<S>(
    State(messenger): State<Arc<Messenger<S>>>,
    Extension(actor): Extension<Actor>,
    Json(outgoing): Json<OutgoingMessage>,
) -> Result<(StatusCode, Json<Delivery>), ServiceError>
where
    S: RentalStore + 'static,
{
    let delivery = messenger.start_or_continue(&actor, outgoing)?;
    let status = if delivery.started_conversation {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(delivery)))
}

pub(crate) async fn open_handler<S>(
    State(messenger): State<Arc<Messenger<S>>>,
    Extension(actor): Extension<Actor>,
    Path(conversation_id): Path<u64>,
) -> Result<Json<ConversationThread>, ServiceError>
where
    S: RentalStore + 'static,
{
    messenger
        .open(&actor, ConversationId(conversation_id))
        .map(Json)
}

pub(crate) async fn reply_handler<S>(
    State(messenger): State<Arc<Messenger<S>>>,
    Extension(actor): Extension<Actor>,
    Path(conversation_id): Path<u64>,
    Json(reply): Json<Reply>,
) -> Result<(StatusCode, Json<Message>), ServiceError>
where
    S: RentalStore + 'static,
{
    let message = messenger.reply(&actor, ConversationId(conversation_id), reply)?;
    Ok((StatusCode::CREATED, Json(message)))
}
