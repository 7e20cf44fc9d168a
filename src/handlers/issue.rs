use crate::config::workflow::TransitionPolicy;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiMultipart, ApiQuery};
use crate::middleware::AdminUser;
use crate::models::{IssueCategory, IssueStatus, IssueUpdateModel, IssueUrgency};
use crate::response::{timestamp, Created};
use crate::services::issue::{IssueRecord, IssueService, NewIssue, RECENT_LIMIT};
use crate::services::upload::{UploadConfig, UploadService};
use crate::services::workflow::{timeline, TimelineStage};
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Multipart fields accepted when reporting an issue.
///
/// Alongside these, an optional `photo` file part may be sent.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueForm {
    /// Short summary (required)
    #[validate(length(max = 200))]
    pub title: Option<String>,
    /// What is wrong (required)
    pub description: Option<String>,
    /// One of pothole, streetlight, garbage, water, drainage, road, park, other (required)
    pub category: Option<String>,
    /// Where it is (required)
    pub location: Option<String>,
    /// low, medium or high (default medium)
    pub urgency: Option<String>,
    /// Reporter name
    #[validate(length(max = 100))]
    pub name: Option<String>,
    /// Reporter email
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    /// Reporter phone
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub pincode: Option<String>,
    /// Why the urgency was chosen
    pub urgency_reason: Option<String>,
}

impl CreateIssueForm {
    /// Store a text part. Blank values count as absent; unknown parts are ignored.
    fn set(&mut self, field: &str, value: String) {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        let slot = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "location" => &mut self.location,
            "urgency" => &mut self.urgency,
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "state" => &mut self.state,
            "pincode" => &mut self.pincode,
            "urgencyReason" | "urgency_reason" => &mut self.urgency_reason,
            _ => return,
        };
        *slot = value;
    }

    fn into_new_issue(self) -> AppResult<NewIssue> {
        let title = required(self.title, "title")?;
        let description = required(self.description, "description")?;
        let category: IssueCategory = required(self.category, "category")?
            .parse()
            .map_err(AppError::Validation)?;
        let location = required(self.location, "location")?;
        let urgency = match self.urgency {
            Some(raw) => raw.parse::<IssueUrgency>().map_err(AppError::Validation)?,
            None => IssueUrgency::default(),
        };

        Ok(NewIssue {
            title,
            description,
            category,
            location,
            urgency,
            reporter_name: self.name,
            reporter_email: self.email,
            reporter_phone: self.phone,
            state: self.state,
            pincode: self.pincode,
            urgency_reason: self.urgency_reason,
        })
    }
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueResponse {
    pub success: bool,
    pub message: String,
    /// Tracking identifier, `CR-<year>-<6 digits>`
    pub report_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateEntry {
    pub message: String,
    pub timestamp: String,
}

impl From<IssueUpdateModel> for UpdateEntry {
    fn from(u: IssueUpdateModel) -> Self {
        Self {
            message: u.message,
            timestamp: timestamp(u.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub report_id: String,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub location: String,
    pub urgency: IssueUrgency,
    pub status: IssueStatus,
    /// Public path of the attached photo
    pub photo: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub urgency_reason: Option<String>,
    /// Progress log, oldest first
    pub updates: Vec<UpdateEntry>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<IssueRecord> for IssueResponse {
    fn from(r: IssueRecord) -> Self {
        let i = r.issue;
        Self {
            report_id: i.report_id,
            title: i.title,
            description: i.description,
            category: i.category,
            location: i.location,
            urgency: i.urgency,
            status: i.status,
            photo: i.photo,
            name: i.reporter_name,
            email: i.reporter_email,
            phone: i.reporter_phone,
            state: i.state,
            pincode: i.pincode,
            urgency_reason: i.urgency_reason,
            updates: r.updates.into_iter().map(UpdateEntry::from).collect(),
            created_at: timestamp(i.created_at),
            updated_at: timestamp(i.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListIssuesQuery {
    /// Maximum number of issues (1-50, default 50)
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// New workflow status
    pub status: Option<String>,
    /// Narrative for the update log; defaults to "Status changed to <status>"
    pub update_message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub message: String,
    pub issue: IssueResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub report_id: String,
    pub status: IssueStatus,
    pub stages: Vec<TimelineStage>,
}

#[utoipa::path(
    post,
    path = "/api/issues",
    request_body(content = CreateIssueForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Issue reported", body = CreateIssueResponse),
        (status = 400, description = "Validation error or rejected upload", body = AppError),
        (status = 413, description = "Photo larger than 5 MB", body = AppError),
        (status = 500, description = "Failed to submit issue", body = AppError),
    ),
    tag = "issues"
)]
pub async fn create_issue(
    Extension(db): Extension<DatabaseConnection>,
    Extension(upload_config): Extension<UploadConfig>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> AppResult<impl IntoResponse> {
    let mut form = CreateIssueForm::default();
    let mut photo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty part when no file was chosen.
            if !data.is_empty() {
                photo = Some((content_type, data.to_vec()));
            }
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.set(&name, value);
        }
    }

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let new_issue = form.into_new_issue()?;

    let image = photo
        .map(|(content_type, data)| UploadService::validate_image(data, &content_type))
        .transpose()?;

    let photo_url = match &image {
        Some(image) => Some(UploadService::save_image(&upload_config, image, "issues").await?),
        None => None,
    };

    let service = IssueService::new(db);
    let record = match service.create(new_issue, photo_url.clone()).await {
        Ok(record) => record,
        Err(e) => {
            if let Some(url) = &photo_url {
                UploadService::remove(&upload_config, url).await;
            }
            return Err(e);
        }
    };

    Ok(Created(CreateIssueResponse {
        success: true,
        message: "Issue reported successfully".to_string(),
        report_id: record.issue.report_id,
    }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Failed to read upload: {}", e.body_text()))
    }
}

#[utoipa::path(
    get,
    path = "/api/issues/{report_id}",
    params(("report_id" = String, Path, description = "Report ID, e.g. CR-2024-001234")),
    responses(
        (status = 200, description = "Issue found", body = IssueResponse),
        (status = 404, description = "Issue not found", body = AppError),
    ),
    tag = "issues"
)]
pub async fn get_issue(
    Extension(db): Extension<DatabaseConnection>,
    Path(report_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = IssueService::new(db);
    let record = service.get_by_report_id(report_id.trim()).await?;

    Ok(Json(IssueResponse::from(record)))
}

#[utoipa::path(
    get,
    path = "/api/issues/{report_id}/timeline",
    params(("report_id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Five-stage progress timeline", body = TimelineResponse),
        (status = 404, description = "Issue not found", body = AppError),
    ),
    tag = "issues"
)]
pub async fn get_issue_timeline(
    Extension(db): Extension<DatabaseConnection>,
    Path(report_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = IssueService::new(db);
    let record = service.get_by_report_id(report_id.trim()).await?;
    let status = record.issue.status;

    Ok(Json(TimelineResponse {
        report_id: record.issue.report_id,
        status,
        stages: timeline(status),
    }))
}

#[utoipa::path(
    get,
    path = "/api/issues",
    params(("limit" = Option<u64>, Query, description = "Maximum number of issues (1-50)")),
    responses(
        (status = 200, description = "Most recent issues, newest first", body = Vec<IssueResponse>),
        (status = 400, description = "Malformed query string", body = AppError),
    ),
    tag = "issues"
)]
pub async fn list_issues(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(params): ApiQuery<ListIssuesQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(RECENT_LIMIT);

    let service = IssueService::new(db);
    let records = service.list_recent(limit).await?;
    let items: Vec<IssueResponse> = records.into_iter().map(IssueResponse::from).collect();

    Ok(Json(items))
}

#[utoipa::path(
    patch,
    path = "/api/issues/{report_id}/status",
    security(("jwt_token" = [])),
    params(("report_id" = String, Path, description = "Report ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 400, description = "Invalid status or disallowed transition", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Issue not found", body = AppError),
    ),
    tag = "issues"
)]
pub async fn update_issue_status(
    Extension(db): Extension<DatabaseConnection>,
    Extension(policy): Extension<TransitionPolicy>,
    admin: AdminUser,
    Path(report_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status: IssueStatus = payload
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("status is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;

    let service = IssueService::with_policy(db, policy);
    let record = service
        .update_status(report_id.trim(), status, payload.update_message.as_deref())
        .await?;

    tracing::debug!(admin = %admin.username, report_id = %report_id, "Status change applied");

    Ok(Json(UpdateStatusResponse {
        success: true,
        message: "Issue status updated successfully".to_string(),
        issue: IssueResponse::from(record),
    }))
}
