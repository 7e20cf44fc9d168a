use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::models::ContactType;
use crate::response::{ApiMessage, Created};
use crate::services::contact::{ContactService, NewContactMessage};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    /// Sender name
    #[validate(length(max = 100))]
    pub name: Option<String>,
    /// Sender email
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    pub message: Option<String>,
    /// general, technical, feedback, partnership or media (default general)
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ContactRequest {
    fn into_new_message(self) -> AppResult<NewContactMessage> {
        let kind = match present(self.kind) {
            Some(raw) => raw.parse::<ContactType>().map_err(AppError::Validation)?,
            None => ContactType::default(),
        };

        Ok(NewContactMessage {
            name: required(self.name, "name")?,
            email: required(self.email, "email")?,
            subject: required(self.subject, "subject")?,
            message: required(self.message, "message")?,
            kind,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    present(value).ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ApiMessage),
        (status = 400, description = "Validation error", body = AppError),
        (status = 500, description = "Failed to submit contact form", body = AppError),
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> AppResult<impl IntoResponse> {
    let new_message = {
        let payload = ContactRequest {
            email: present(payload.email),
            ..payload
        };
        payload
            .validate()
            .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;
        payload.into_new_message()?
    };

    ContactService::new(db).submit(new_message).await?;

    Ok(Created(ApiMessage::ok("Contact form submitted successfully")))
}
