use crate::config::admin::AdminCredentials;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::issue::IssueResponse;
use crate::middleware::AdminUser;
use crate::response::ApiMessage;
use crate::services::auth::AuthService;
use crate::services::dashboard::{self, IssueQuery, SortKey, SortOrder, StatusFilter};
use crate::services::issue::{IssueService, IssueStats, RECENT_LIMIT};
use crate::services::seed::{seed_sample_issue, SAMPLE_REPORT_ID};
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// Bearer token for the admin routes
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminIssueParams {
    /// Case-insensitive match on report ID, title, reporter name or email
    pub search: Option<String>,
    /// A workflow status, or `all`
    pub status: Option<String>,
    /// createdAt (default), updatedAt, title or status
    pub sort_by: Option<String>,
    /// asc or desc (default)
    pub sort_order: Option<String>,
}

impl AdminIssueParams {
    fn into_query(self) -> AppResult<IssueQuery> {
        let parse = |raw: Option<String>| raw.unwrap_or_default();

        Ok(IssueQuery {
            search: self.search,
            status: parse(self.status)
                .parse::<StatusFilter>()
                .map_err(AppError::Validation)?,
            sort_by: parse(self.sort_by)
                .parse::<SortKey>()
                .map_err(AppError::Validation)?,
            sort_order: parse(self.sort_order)
                .parse::<SortOrder>()
                .map_err(AppError::Validation)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: u64,
    pub submitted: u64,
    pub in_progress: u64,
    pub resolved: u64,
    /// Issues created in the last 24 hours
    #[serde(rename = "last24h")]
    pub last_24h: u64,
}

impl From<IssueStats> for StatsResponse {
    fn from(s: IssueStats) -> Self {
        Self {
            total: s.total,
            submitted: s.submitted,
            in_progress: s.in_progress,
            resolved: s.resolved,
            last_24h: s.last_24h,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "admin"
)]
pub async fn login(
    Extension(credentials): Extension<AdminCredentials>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (token, expires_in) =
        AuthService::new(&credentials).login(payload.username.trim(), &payload.password)?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        expires_in,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/issues",
    security(("jwt_token" = [])),
    params(AdminIssueParams),
    responses(
        (status = 200, description = "Filtered and sorted recent issues", body = Vec<IssueResponse>),
        (status = 400, description = "Invalid filter or sort parameter", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_admin_issues(
    Extension(db): Extension<DatabaseConnection>,
    _admin: AdminUser,
    ApiQuery(params): ApiQuery<AdminIssueParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.into_query()?;

    let records = IssueService::new(db).list_recent(RECENT_LIMIT).await?;
    let items: Vec<IssueResponse> = dashboard::apply(records, &query)
        .into_iter()
        .map(IssueResponse::from)
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Issue counts", body = StatsResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "admin"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    _admin: AdminUser,
) -> AppResult<impl IntoResponse> {
    let stats = IssueService::new(db).stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}

#[utoipa::path(
    post,
    path = "/api/admin/seed",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Sample issue present", body = ApiMessage),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "admin"
)]
pub async fn seed(
    Extension(db): Extension<DatabaseConnection>,
    admin: AdminUser,
) -> AppResult<impl IntoResponse> {
    let created = seed_sample_issue(&db).await?;
    let message = if created {
        tracing::info!(admin = %admin.username, "Sample data seeded");
        format!("Sample issue {} created", SAMPLE_REPORT_ID)
    } else {
        format!("Sample issue {} already exists", SAMPLE_REPORT_ID)
    };

    Ok(Json(ApiMessage::ok(message)))
}
