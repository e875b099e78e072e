//! Contact form route handlers.
//!
//! Messages are validated locally, stamped with the configured website id and
//! forwarded to the catalog API.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use inktrix_core::ContactForm;

use crate::error::AppError;
use crate::state::AppState;

/// Contact form data as submitted by the page.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Submit a contact message.
///
/// POST /api/contact
#[instrument(skip(state, request), fields(subject = %request.subject))]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    let form = ContactForm::new(
        state.catalog().website_id(),
        &request.name,
        &request.email,
        &request.phone,
        &request.subject,
        &request.message,
    )?;

    state.catalog().submit_contact(&form).await?;
    tracing::info!(website_id = %form.website_id, "Contact message forwarded");

    Ok((
        StatusCode::OK,
        Json(ContactResponse {
            success: true,
            message: None,
        }),
    ))
}
