//! Push a message to the caller's own connections, over either delivery path.

use axum::Json;
use axum::extract::State;

use pulse_core::error::AppError;
use pulse_realtime::Envelope;

use crate::dto::request::{DeliveryPath, PublishMessageRequest};
use crate::dto::response::PublishMessageResponse;
use crate::error::{ApiError, RequestId};
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// POST /api/realtime/messages
pub async fn publish_message(
    State(state): State<AppState>,
    request_id: RequestId,
    user: CurrentUser,
    Json(req): Json<PublishMessageRequest>,
) -> Result<Json<PublishMessageResponse>, ApiError> {
    if req.kind.trim().is_empty() {
        return Err(request_id.reject(AppError::validation("Message type must not be empty")));
    }

    let envelope = Envelope {
        kind: req.kind,
        payload: req.payload,
    };

    let delivered = match req.via {
        DeliveryPath::Direct => state.hub.send_to_user(&user.user_id, &envelope).await,
        DeliveryPath::Broker => state.hub.publish(&user.user_id, &envelope).await,
    }
    .map_err(|e| request_id.reject(e))?;

    Ok(Json(PublishMessageResponse {
        delivered,
        via: req.via,
    }))
}
