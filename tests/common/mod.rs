#![allow(dead_code)]

use civic_report::config::{admin::AdminCredentials, workflow::TransitionPolicy};
use civic_report::services::upload::UploadConfig;
use reqwest::Client;
use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Once, OnceLock};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "integration-test-password";

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = civic_report::config::jwt::JwtConfig::from_env().unwrap();
        let _ = civic_report::utils::jwt::init_jwt_config(config);
    });
}

/// bcrypt is slow on purpose; hash the test password once per binary.
fn admin_credentials() -> AdminCredentials {
    static HASH: OnceLock<String> = OnceLock::new();
    let password_hash = HASH
        .get_or_init(|| civic_report::utils::hash_password(ADMIN_PASSWORD).unwrap())
        .clone();
    AdminCredentials {
        username: ADMIN_USERNAME.to_string(),
        password_hash,
    }
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub upload_dir: std::path::PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_policy(TransitionPolicy::Permissive).await
}

pub async fn spawn_app_with_policy(policy: TransitionPolicy) -> TestApp {
    init_env();

    let db = connect().await;
    civic_report::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    cleanup_tables(&db).await;

    let upload_dir = std::env::temp_dir().join(format!("civic-test-{}", uuid::Uuid::new_v4()));
    let upload_config = UploadConfig {
        upload_dir: upload_dir.to_string_lossy().into_owned(),
    };

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(civic_report::routes::create_routes())
        .layer(axum::middleware::from_fn(
            civic_report::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(admin_credentials()))
        .layer(axum::extract::Extension(policy));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        upload_dir,
    }
}

/// `TEST_DATABASE_URL` if set, otherwise a private in-memory SQLite database.
async fn connect() -> DatabaseConnection {
    match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => sea_orm::Database::connect(&url)
            .await
            .expect("Failed to connect to test database"),
        Err(_) => {
            // Each pooled connection would otherwise see its own empty database.
            let mut opt = ConnectOptions::new("sqlite::memory:");
            opt.max_connections(1)
                .min_connections(1)
                .sqlx_logging(false);
            sea_orm::Database::connect(opt)
                .await
                .expect("Failed to open in-memory database")
        }
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    for table in ["issue_updates", "issues", "contact_messages"] {
        let _ = db
            .execute(Statement::from_string(backend, format!("DELETE FROM {}", table)))
            .await;
    }
}

/// Log in as the test operator and return the bearer token.
pub async fn admin_token(app: &TestApp) -> String {
    let resp = app
        .client
        .post(app.url("/admin/login"))
        .json(&serde_json::json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to log in");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse login response");
    assert_eq!(status, 200, "login failed: {}", body);

    body["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string()
}

pub fn issue_form(title: &str, category: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("description", "Reported during integration testing")
        .text("category", category.to_string())
        .text("location", "MG Road")
}

/// Submit an issue and return its report ID.
pub async fn create_issue(app: &TestApp, title: &str, category: &str) -> String {
    let resp = app
        .client
        .post(app.url("/issues"))
        .multipart(issue_form(title, category))
        .send()
        .await
        .expect("Failed to create issue");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse create response");
    assert_eq!(status, 201, "create failed: {}", body);

    body["reportId"]
        .as_str()
        .expect("Create response missing reportId")
        .to_string()
}

pub async fn get_issue(app: &TestApp, report_id: &str) -> Value {
    app.client
        .get(app.url(&format!("/issues/{}", report_id)))
        .send()
        .await
        .expect("Failed to fetch issue")
        .json()
        .await
        .expect("Failed to parse issue")
}

pub async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {}", table),
        ))
        .await
        .expect("count query failed")
        .expect("count returned no row");
    row.try_get::<i64>("", "n").expect("count column missing")
}

/// Insert a bare issue row, bypassing the API.
pub async fn insert_issue_at(
    db: &DatabaseConnection,
    report_id: &str,
    created_at: chrono::NaiveDateTime,
) {
    use civic_report::models::{issue, IssueCategory, IssueStatus, IssueUrgency};
    use sea_orm::{ActiveModelTrait, ActiveValue::Set};

    issue::ActiveModel {
        report_id: Set(report_id.to_string()),
        title: Set(format!("Backfilled {}", report_id)),
        description: Set("Inserted directly".to_string()),
        category: Set(IssueCategory::Road),
        location: Set("Ring Road".to_string()),
        urgency: Set(IssueUrgency::Low),
        status: Set(IssueStatus::Submitted),
        photo: Set(None),
        reporter_name: Set(None),
        reporter_email: Set(None),
        reporter_phone: Set(None),
        state: Set(None),
        pincode: Set(None),
        urgency_reason: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert issue");
}
