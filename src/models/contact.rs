use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "kebab-case")]
pub enum ContactType {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "technical")]
    Technical,
    #[sea_orm(string_value = "feedback")]
    Feedback,
    #[sea_orm(string_value = "partnership")]
    Partnership,
    #[sea_orm(string_value = "media")]
    Media,
}

impl ContactType {
    pub const ALL: [ContactType; 5] = [
        ContactType::General,
        ContactType::Technical,
        ContactType::Feedback,
        ContactType::Partnership,
        ContactType::Media,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContactType::General => "general",
            ContactType::Technical => "technical",
            ContactType::Feedback => "feedback",
            ContactType::Partnership => "partnership",
            ContactType::Media => "media",
        }
    }
}

impl Default for ContactType {
    fn default() -> Self {
        ContactType::General
    }
}

impl FromStr for ContactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
            format!(
                "type must be one of: {}",
                Self::ALL.map(|t| t.as_str()).join(", ")
            )
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub email: String,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub kind: ContactType,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
