//! Contact form handler

use axum::extract::State;

use super::ActionResponse;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::services::ContactForm;

/// POST /contact
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ActionResponse>, ApiError> {
    let message = state.contact.submit(form).await?;

    Ok(Json(ActionResponse {
        message,
        redirect: None,
    }))
}
