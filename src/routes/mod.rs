use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::admin_auth_middleware;
use crate::services::upload::MAX_FILE_SIZE;
use axum::{extract::DefaultBodyLimit, middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Multipart framing and text fields on top of the largest accepted photo.
const ISSUE_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

pub fn create_routes() -> Router {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let public_read = public_read_routes(&rate_limit_config);
    let submit = submit_routes(&rate_limit_config);
    let admin = admin_routes(&rate_limit_config);

    public_read.merge(submit).merge(admin)
}

/// Citizen-facing lookups.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/issues", routing::get(handlers::issue::list_issues))
        .route(
            "/issues/{report_id}",
            routing::get(handlers::issue::get_issue),
        )
        .route(
            "/issues/{report_id}/timeline",
            routing::get(handlers::issue::get_issue_timeline),
        );

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Anonymous writes: issue reports, the contact form and operator login.
fn submit_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/issues",
            routing::post(handlers::issue::create_issue)
                .layer(DefaultBodyLimit::max(ISSUE_BODY_LIMIT)),
        )
        .route("/contact", routing::post(handlers::contact::submit_contact))
        .route("/admin/login", routing::post(handlers::admin::login));

    with_optional_rate_limit(router, config.enabled, config.submit)
}

/// Operator routes, all behind an admin token.
fn admin_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/issues/{report_id}/status",
            routing::patch(handlers::issue::update_issue_status),
        )
        .route(
            "/admin/issues",
            routing::get(handlers::admin::list_admin_issues),
        )
        .route("/admin/stats", routing::get(handlers::admin::get_stats))
        .route("/admin/seed", routing::post(handlers::admin::seed))
        .layer(middleware::from_fn(admin_auth_middleware));

    with_optional_rate_limit(router, config.enabled, config.admin)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    match GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    {
        Some(governor_conf) => router.layer(GovernorLayer::new(governor_conf)),
        None => {
            tracing::warn!("Invalid rate limit rule {:?}, serving without limit", rule);
            router
        }
    }
}
