pub mod contact;
pub mod issue;
pub mod issue_update;

pub use contact::{ContactType, Model as ContactMessageModel};
pub use issue::{
    Entity as Issue, IssueCategory, IssueStatus, IssueUrgency, Model as IssueModel,
};
pub use issue_update::{Entity as IssueUpdate, Model as IssueUpdateModel};
