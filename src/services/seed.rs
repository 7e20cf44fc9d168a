use crate::{
    error::AppResult,
    models::{issue, Issue, IssueCategory, IssueStatus, IssueUrgency},
    services::issue::{append_update, is_unique_violation, SUBMITTED_MESSAGE},
};
use chrono::Duration;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};

pub const SAMPLE_REPORT_ID: &str = "CR-2024-001234";

/// Insert the demo pothole report if it is not there yet.
/// Returns `true` when a record was created.
pub async fn seed_sample_issue(db: &DatabaseConnection) -> AppResult<bool> {
    let exists = Issue::find()
        .filter(issue::Column::ReportId.eq(SAMPLE_REPORT_ID))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Ok(false);
    }

    insert_sample(db).await
}

/// A unique violation means a concurrent call inserted the sample first.
async fn insert_sample(db: &DatabaseConnection) -> AppResult<bool> {
    let now = chrono::Utc::now().naive_utc();
    let history = [
        (SUBMITTED_MESSAGE, now - Duration::days(3)),
        (
            "Report reviewed and verified by authorities",
            now - Duration::days(2),
        ),
        (
            "Issue assigned to Public Works Department",
            now - Duration::days(1),
        ),
        (
            "Work crew dispatched to location. Repair work in progress.",
            now - Duration::hours(4),
        ),
    ];

    let txn = db.begin().await?;
    let sample = issue::ActiveModel {
        report_id: sea_orm::ActiveValue::Set(SAMPLE_REPORT_ID.to_string()),
        title: sea_orm::ActiveValue::Set("Large pothole on MG Road".to_string()),
        description: sea_orm::ActiveValue::Set(
            "There is a large pothole near the City Hospital on MG Road that is causing \
             traffic issues and poses a safety risk to vehicles and pedestrians."
                .to_string(),
        ),
        category: sea_orm::ActiveValue::Set(IssueCategory::Pothole),
        location: sea_orm::ActiveValue::Set("MG Road, Near City Hospital, Ranchi".to_string()),
        urgency: sea_orm::ActiveValue::Set(IssueUrgency::High),
        status: sea_orm::ActiveValue::Set(IssueStatus::InProgress),
        photo: sea_orm::ActiveValue::Set(None),
        reporter_name: sea_orm::ActiveValue::Set(None),
        reporter_email: sea_orm::ActiveValue::Set(None),
        reporter_phone: sea_orm::ActiveValue::Set(None),
        state: sea_orm::ActiveValue::Set(Some("Jharkhand".to_string())),
        pincode: sea_orm::ActiveValue::Set(None),
        urgency_reason: sea_orm::ActiveValue::Set(None),
        created_at: sea_orm::ActiveValue::Set(history[0].1),
        updated_at: sea_orm::ActiveValue::Set(history[3].1),
        ..Default::default()
    }
    .insert(&txn)
    .await;

    let sample = match sample {
        Ok(sample) => sample,
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!("Sample issue {} inserted concurrently", SAMPLE_REPORT_ID);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    for (message, at) in history {
        append_update(&txn, sample.id, message, at).await?;
    }
    txn.commit().await?;

    tracing::info!("Seeded sample issue {}", SAMPLE_REPORT_ID);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::Migrator;
    use crate::models::IssueUpdate;
    use sea_orm::{ConnectOptions, PaginatorTrait};
    use sea_orm_migration::MigratorTrait;

    async fn memory_db() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = sea_orm::Database::connect(opt).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn seeding_twice_keeps_one_sample() {
        let db = memory_db().await;
        assert!(seed_sample_issue(&db).await.unwrap());
        assert!(!seed_sample_issue(&db).await.unwrap());
        assert_eq!(Issue::find().count(&db).await.unwrap(), 1);
        assert_eq!(IssueUpdate::find().count(&db).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn losing_the_insert_race_reports_existing() {
        let db = memory_db().await;
        assert!(seed_sample_issue(&db).await.unwrap());

        // Skips the existence check, as a concurrent caller would.
        assert!(!insert_sample(&db).await.unwrap());
        assert_eq!(Issue::find().count(&db).await.unwrap(), 1);
        assert_eq!(IssueUpdate::find().count(&db).await.unwrap(), 4);
    }
}
