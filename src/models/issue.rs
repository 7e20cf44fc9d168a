use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    #[sea_orm(string_value = "pothole")]
    Pothole,
    #[sea_orm(string_value = "streetlight")]
    Streetlight,
    #[sea_orm(string_value = "garbage")]
    Garbage,
    #[sea_orm(string_value = "water")]
    Water,
    #[sea_orm(string_value = "drainage")]
    Drainage,
    #[sea_orm(string_value = "road")]
    Road,
    #[sea_orm(string_value = "park")]
    Park,
    #[sea_orm(string_value = "other")]
    Other,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 8] = [
        IssueCategory::Pothole,
        IssueCategory::Streetlight,
        IssueCategory::Garbage,
        IssueCategory::Water,
        IssueCategory::Drainage,
        IssueCategory::Road,
        IssueCategory::Park,
        IssueCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::Pothole => "pothole",
            IssueCategory::Streetlight => "streetlight",
            IssueCategory::Garbage => "garbage",
            IssueCategory::Water => "water",
            IssueCategory::Drainage => "drainage",
            IssueCategory::Road => "road",
            IssueCategory::Park => "park",
            IssueCategory::Other => "other",
        }
    }
}

impl FromStr for IssueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| one_of("category", Self::ALL.iter().map(|c| c.as_str())))
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "kebab-case")]
pub enum IssueUrgency {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl IssueUrgency {
    pub const ALL: [IssueUrgency; 3] = [IssueUrgency::Low, IssueUrgency::Medium, IssueUrgency::High];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueUrgency::Low => "low",
            IssueUrgency::Medium => "medium",
            IssueUrgency::High => "high",
        }
    }
}

impl Default for IssueUrgency {
    fn default() -> Self {
        IssueUrgency::Medium
    }
}

impl FromStr for IssueUrgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| one_of("urgency", Self::ALL.iter().map(|u| u.as_str())))
    }
}

/// Issue progress. Declaration order is the canonical workflow order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "reviewed")]
    Reviewed,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl IssueStatus {
    pub const WORKFLOW: [IssueStatus; 5] = [
        IssueStatus::Submitted,
        IssueStatus::Reviewed,
        IssueStatus::Assigned,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Submitted => "submitted",
            IssueStatus::Reviewed => "reviewed",
            IssueStatus::Assigned => "assigned",
            IssueStatus::InProgress => "in-progress",
            IssueStatus::Resolved => "resolved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IssueStatus::Submitted => "Report Submitted",
            IssueStatus::Reviewed => "Under Review",
            IssueStatus::Assigned => "Assigned to Department",
            IssueStatus::InProgress => "Work in Progress",
            IssueStatus::Resolved => "Issue Resolved",
        }
    }

    /// Index of this status in [`IssueStatus::WORKFLOW`].
    pub fn position(self) -> usize {
        Self::WORKFLOW
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::Submitted
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::WORKFLOW
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| one_of("status", Self::WORKFLOW.iter().map(|st| st.as_str())))
    }
}

fn one_of<'a>(field: &str, allowed: impl Iterator<Item = &'a str>) -> String {
    format!(
        "{} must be one of: {}",
        field,
        allowed.collect::<Vec<_>>().join(", ")
    )
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(20))", unique)]
    pub report_id: String,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: IssueCategory,
    #[sea_orm(column_type = "Text")]
    pub location: String,
    pub urgency: IssueUrgency,
    pub status: IssueStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub photo: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub reporter_name: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub reporter_email: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))", nullable)]
    pub reporter_phone: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub state: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(10))", nullable)]
    pub pincode: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub urgency_reason: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue_update::Entity")]
    Updates,
}

impl Related<super::issue_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Updates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
