use crate::{
    error::AppResult,
    models::{contact, ContactMessageModel, ContactType},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection};

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub kind: ContactType,
}

pub struct ContactService {
    db: DatabaseConnection,
}

impl ContactService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store an inbound contact-form message. Messages are never updated.
    pub async fn submit(&self, new: NewContactMessage) -> AppResult<ContactMessageModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = contact::ActiveModel {
            name: sea_orm::ActiveValue::Set(new.name),
            email: sea_orm::ActiveValue::Set(new.email),
            subject: sea_orm::ActiveValue::Set(new.subject),
            message: sea_orm::ActiveValue::Set(new.message),
            kind: sea_orm::ActiveValue::Set(new.kind),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        tracing::info!(id = saved.id, kind = saved.kind.as_str(), "Contact message received");
        Ok(saved)
    }
}
