use crate::{
    config::workflow::TransitionPolicy,
    error::{AppError, AppResult},
    models::{
        issue, issue_update, Issue, IssueCategory, IssueModel, IssueStatus, IssueUpdate,
        IssueUpdateModel, IssueUrgency,
    },
    services::workflow::{check_transition, default_update_message},
    utils::{generate_report_id, is_valid_report_id},
};
use chrono::Datelike;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};

/// First entry of every issue's update log.
pub const SUBMITTED_MESSAGE: &str = "Issue report submitted successfully";

/// Upper bound for list queries.
pub const RECENT_LIMIT: u64 = 50;

/// How many fresh report IDs to try before giving up on a create.
const REPORT_ID_MAX_ATTEMPTS: usize = 5;

/// Validated input for a new issue.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub location: String,
    pub urgency: IssueUrgency,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub urgency_reason: Option<String>,
}

/// An issue together with its update log, oldest entry first.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub issue: IssueModel,
    pub updates: Vec<IssueUpdateModel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueStats {
    pub total: u64,
    pub submitted: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub last_24h: u64,
}

pub struct IssueService {
    db: DatabaseConnection,
    policy: TransitionPolicy,
}

impl IssueService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_policy(db, TransitionPolicy::default())
    }

    pub fn with_policy(db: DatabaseConnection, policy: TransitionPolicy) -> Self {
        Self { db, policy }
    }

    /// Persist a new issue with a freshly generated report ID.
    pub async fn create(&self, new: NewIssue, photo: Option<String>) -> AppResult<IssueRecord> {
        self.create_with_rng(new, photo, &mut StdRng::from_entropy())
            .await
    }

    /// Like [`create`](Self::create), drawing report IDs from `rng`.
    ///
    /// A report-ID collision surfaces as a unique-index violation; the insert
    /// is retried with a new ID a bounded number of times.
    pub async fn create_with_rng<R: Rng + Send>(
        &self,
        new: NewIssue,
        photo: Option<String>,
        rng: &mut R,
    ) -> AppResult<IssueRecord> {
        let year = chrono::Utc::now().year();

        for attempt in 1..=REPORT_ID_MAX_ATTEMPTS {
            let report_id = generate_report_id(year, rng);

            match self.insert(&new, &report_id, photo.clone()).await {
                Ok(record) => {
                    tracing::info!(
                        report_id = %record.issue.report_id,
                        category = new.category.as_str(),
                        "Issue created"
                    );
                    return Ok(record);
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(
                        "Report ID {} already taken (attempt {}/{})",
                        report_id,
                        attempt,
                        REPORT_ID_MAX_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "Could not allocate a unique report ID after {} attempts",
            REPORT_ID_MAX_ATTEMPTS
        )))
    }

    async fn insert(
        &self,
        new: &NewIssue,
        report_id: &str,
        photo: Option<String>,
    ) -> Result<IssueRecord, DbErr> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().naive_utc();

        let model = issue::ActiveModel {
            report_id: sea_orm::ActiveValue::Set(report_id.to_string()),
            title: sea_orm::ActiveValue::Set(new.title.clone()),
            description: sea_orm::ActiveValue::Set(new.description.clone()),
            category: sea_orm::ActiveValue::Set(new.category),
            location: sea_orm::ActiveValue::Set(new.location.clone()),
            urgency: sea_orm::ActiveValue::Set(new.urgency),
            status: sea_orm::ActiveValue::Set(IssueStatus::Submitted),
            photo: sea_orm::ActiveValue::Set(photo),
            reporter_name: sea_orm::ActiveValue::Set(new.reporter_name.clone()),
            reporter_email: sea_orm::ActiveValue::Set(new.reporter_email.clone()),
            reporter_phone: sea_orm::ActiveValue::Set(new.reporter_phone.clone()),
            state: sea_orm::ActiveValue::Set(new.state.clone()),
            pincode: sea_orm::ActiveValue::Set(new.pincode.clone()),
            urgency_reason: sea_orm::ActiveValue::Set(new.urgency_reason.clone()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        let saved = model.insert(&txn).await?;

        let first = append_update(&txn, saved.id, SUBMITTED_MESSAGE, now).await?;
        txn.commit().await?;

        Ok(IssueRecord {
            issue: saved,
            updates: vec![first],
        })
    }

    pub async fn get_by_report_id(&self, report_id: &str) -> AppResult<IssueRecord> {
        let issue = find_by_report_id(&self.db, report_id).await?;
        let updates = updates_of(&self.db, &issue).await?;
        Ok(IssueRecord { issue, updates })
    }

    /// Newest issues first, at most [`RECENT_LIMIT`].
    pub async fn list_recent(&self, limit: u64) -> AppResult<Vec<IssueRecord>> {
        let limit = limit.clamp(1, RECENT_LIMIT);

        let issues = Issue::find()
            .order_by_desc(issue::Column::CreatedAt)
            .order_by_desc(issue::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        let updates = issues.load_many(IssueUpdate, &self.db).await?;

        Ok(issues
            .into_iter()
            .zip(updates)
            .map(|(issue, mut updates)| {
                updates.sort_by_key(|u| u.id);
                IssueRecord { issue, updates }
            })
            .collect())
    }

    /// Set a new status and append exactly one update entry.
    ///
    /// A missing or blank `message` is replaced by `"Status changed to <status>"`.
    pub async fn update_status(
        &self,
        report_id: &str,
        status: IssueStatus,
        message: Option<&str>,
    ) -> AppResult<IssueRecord> {
        let txn = self.db.begin().await?;

        let existing = find_by_report_id(&txn, report_id).await?;
        let previous = existing.status;
        check_transition(self.policy, previous, status)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: issue::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(status);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&txn).await?;

        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_update_message(status));
        append_update(&txn, updated.id, &message, now).await?;

        let updates = updates_of(&txn, &updated).await?;
        txn.commit().await?;

        tracing::info!(
            report_id = %updated.report_id,
            from = previous.as_str(),
            to = status.as_str(),
            "Issue status updated"
        );

        Ok(IssueRecord {
            issue: updated,
            updates,
        })
    }

    pub async fn stats(&self) -> AppResult<IssueStats> {
        let total = Issue::find().count(&self.db).await?;
        let submitted = self.count_with_status(IssueStatus::Submitted).await?;
        let in_progress = self.count_with_status(IssueStatus::InProgress).await?;
        let resolved = self.count_with_status(IssueStatus::Resolved).await?;

        let since = chrono::Utc::now().naive_utc() - chrono::Duration::hours(24);
        let last_24h = Issue::find()
            .filter(issue::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?;

        Ok(IssueStats {
            total,
            submitted,
            in_progress,
            resolved,
            last_24h,
        })
    }

    async fn count_with_status(&self, status: IssueStatus) -> AppResult<u64> {
        Ok(Issue::find()
            .filter(issue::Column::Status.eq(status))
            .count(&self.db)
            .await?)
    }
}

async fn find_by_report_id<C: ConnectionTrait>(db: &C, report_id: &str) -> AppResult<IssueModel> {
    if !is_valid_report_id(report_id) {
        return Err(AppError::NotFound("Issue"));
    }

    Issue::find()
        .filter(issue::Column::ReportId.eq(report_id))
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Issue"))
}

async fn updates_of<C: ConnectionTrait>(
    db: &C,
    issue: &IssueModel,
) -> Result<Vec<IssueUpdateModel>, DbErr> {
    issue
        .find_related(IssueUpdate)
        .order_by_asc(issue_update::Column::Id)
        .all(db)
        .await
}

/// Updates are only ever inserted; nothing edits or deletes an entry.
pub(crate) async fn append_update<C: ConnectionTrait>(
    db: &C,
    issue_id: i32,
    message: &str,
    at: chrono::NaiveDateTime,
) -> Result<IssueUpdateModel, DbErr> {
    issue_update::ActiveModel {
        issue_id: sea_orm::ActiveValue::Set(issue_id),
        message: sea_orm::ActiveValue::Set(message.to_string()),
        created_at: sea_orm::ActiveValue::Set(at),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::Migrator;
    use rand::rngs::mock::StepRng;
    use sea_orm::ConnectOptions;
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

    fn pothole() -> NewIssue {
        NewIssue {
            title: "Pothole".into(),
            description: "deep hole".into(),
            category: IssueCategory::Pothole,
            location: "MG Road".into(),
            urgency: IssueUrgency::High,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            state: None,
            pincode: None,
            urgency_reason: None,
        }
    }

    #[tokio::test]
    async fn taken_report_id_is_retried_with_a_fresh_one() {
        let service = IssueService::new(memory_db().await);
        let year = chrono::Utc::now().year();

        let rng = StdRng::seed_from_u64(7);
        let mut preview = rng.clone();
        let taken = generate_report_id(year, &mut preview);
        let next = generate_report_id(year, &mut preview);
        assert_ne!(taken, next);

        service.insert(&pothole(), &taken, None).await.unwrap();

        let record = service
            .create_with_rng(pothole(), None, &mut rng.clone())
            .await
            .unwrap();
        assert_eq!(record.issue.report_id, next);
        assert_eq!(record.updates.len(), 1);
        assert_eq!(Issue::find().count(&service.db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn gives_up_when_every_report_id_is_taken() {
        let service = IssueService::new(memory_db().await);
        let year = chrono::Utc::now().year();

        let mut constant = StepRng::new(0, 0);
        let taken = generate_report_id(year, &mut constant);
        service.insert(&pothole(), &taken, None).await.unwrap();

        let err = service
            .create_with_rng(pothole(), None, &mut constant)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(Issue::find().count(&service.db).await.unwrap(), 1);
        assert_eq!(IssueUpdate::find().count(&service.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_report_id_is_a_unique_violation() {
        let service = IssueService::new(memory_db().await);
        service
            .insert(&pothole(), "CR-2024-000001", None)
            .await
            .unwrap();

        let err = service
            .insert(&pothole(), "CR-2024-000001", None)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
