use crate::config::workflow::TransitionPolicy;
use crate::error::{AppError, AppResult};
use crate::models::IssueStatus;
use serde::Serialize;
use utoipa::ToSchema;

/// Decide whether `current -> next` is allowed under `policy`.
pub fn check_transition(
    policy: TransitionPolicy,
    current: IssueStatus,
    next: IssueStatus,
) -> AppResult<()> {
    match policy {
        TransitionPolicy::Permissive => Ok(()),
        TransitionPolicy::ForwardOnly if next >= current => Ok(()),
        TransitionPolicy::ForwardOnly => Err(AppError::Validation(format!(
            "Cannot move status back from {} to {}",
            current, next
        ))),
    }
}

/// Default narrative for a status change without an operator message.
pub fn default_update_message(status: IssueStatus) -> String {
    format!("Status changed to {}", status)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimelineStage {
    pub status: IssueStatus,
    pub label: String,
    pub state: StageState,
}

/// Render the fixed five-stage workflow around the stored status.
///
/// Stages before the current one are completed, the current one is current,
/// the rest pending. The stored value is trusted even if it was reached by
/// skipping or reverting stages.
pub fn timeline(current: IssueStatus) -> Vec<TimelineStage> {
    let index = current.position();
    IssueStatus::WORKFLOW
        .iter()
        .enumerate()
        .map(|(i, status)| TimelineStage {
            status: *status,
            label: status.label().to_string(),
            state: match i.cmp(&index) {
                std::cmp::Ordering::Less => StageState::Completed,
                std::cmp::Ordering::Equal => StageState::Current,
                std::cmp::Ordering::Greater => StageState::Pending,
            },
        })
        .collect()
}
