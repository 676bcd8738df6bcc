//! Task review workflow rules.
//!
//! Defines which statuses a caller may drive a task to, and composes the
//! notification (title, message, receiver, email template) that accompanies
//! each transition. The composition is an exhaustive `match` on
//! [`ReviewOutcome`], so adding a status forces every arm to be revisited
//! at compile time.

use serde::Serialize;

use crate::error::CoreError;
use crate::status::TaskStatus;

// ---------------------------------------------------------------------------
// ReviewOutcome
// ---------------------------------------------------------------------------

/// A caller-settable task status transition.
///
/// `Ongoing` (initial default) and `Overdue` (sweep-only) are deliberately
/// unrepresentable here; [`ReviewOutcome::from_status`] rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Assignee submitted the task for review.
    UnderReview,
    /// Assigner rejected the submitted work.
    Rejected,
    /// Assigner accepted the work and closed the task.
    Closed,
}

impl ReviewOutcome {
    /// Validate that `status` is a caller-settable target.
    pub fn from_status(status: TaskStatus) -> Result<Self, CoreError> {
        match status {
            TaskStatus::UnderReview => Ok(Self::UnderReview),
            TaskStatus::Rejected => Ok(Self::Rejected),
            TaskStatus::Closed => Ok(Self::Closed),
            TaskStatus::Ongoing | TaskStatus::Overdue => Err(CoreError::InvalidTransition(
                format!(
                    "'{}' is not a reviewable target; allowed: under_review, rejected, closed",
                    status.name()
                ),
            )),
        }
    }

    /// The task status this outcome writes.
    pub fn status(self) -> TaskStatus {
        match self {
            Self::UnderReview => TaskStatus::UnderReview,
            Self::Rejected => TaskStatus::Rejected,
            Self::Closed => TaskStatus::Closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Notification composition
// ---------------------------------------------------------------------------

/// Which party of a task a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyParty {
    /// The member who created/assigned the task.
    Assigner,
    /// The member the task is assigned to.
    Assignee,
}

/// Email template selector carried in the queue message `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    TaskUnderReview,
    TaskRejected,
    TaskClosed,
    TaskAssigned,
    TaskReassigned,
    TaskUnassigned,
}

impl EmailTemplate {
    /// Wire name used as the queue message discriminator.
    pub fn kind(self) -> &'static str {
        match self {
            Self::TaskUnderReview => "task_under_review",
            Self::TaskRejected => "task_rejected",
            Self::TaskClosed => "task_closed",
            Self::TaskAssigned => "task_assigned",
            Self::TaskReassigned => "task_reassigned",
            Self::TaskUnassigned => "task_unassigned",
        }
    }
}

/// Fully composed notification content for one lifecycle event.
#[derive(Debug, Clone)]
pub struct NotificationContent {
    pub title: String,
    pub message: String,
    pub receiver: NotifyParty,
    pub template: EmailTemplate,
}

/// Compose the notification for a review transition.
///
/// `under_review` informs the assigner; `rejected` and `closed` inform the
/// assignee: always the party that did not act.
pub fn compose_status_change(
    outcome: ReviewOutcome,
    task_title: &str,
    actor_name: &str,
) -> NotificationContent {
    match outcome {
        ReviewOutcome::UnderReview => NotificationContent {
            title: "Task submitted for review".to_string(),
            message: format!("{actor_name} submitted \"{task_title}\" for review"),
            receiver: NotifyParty::Assigner,
            template: EmailTemplate::TaskUnderReview,
        },
        ReviewOutcome::Rejected => NotificationContent {
            title: "Task rejected".to_string(),
            message: format!("{actor_name} rejected \"{task_title}\" and sent it back to you"),
            receiver: NotifyParty::Assignee,
            template: EmailTemplate::TaskRejected,
        },
        ReviewOutcome::Closed => NotificationContent {
            title: "Task closed".to_string(),
            message: format!("{actor_name} accepted \"{task_title}\" and closed it"),
            receiver: NotifyParty::Assignee,
            template: EmailTemplate::TaskClosed,
        },
    }
}

/// Compose the notification sent to a member who was just assigned a task.
pub fn compose_assignment(task_title: &str, project_title: &str) -> NotificationContent {
    NotificationContent {
        title: "New task assigned".to_string(),
        message: format!("You were assigned \"{task_title}\" in {project_title}"),
        receiver: NotifyParty::Assignee,
        template: EmailTemplate::TaskAssigned,
    }
}

/// Compose the notification sent to the new assignee on reassignment.
pub fn compose_reassignment(task_title: &str, project_title: &str) -> NotificationContent {
    NotificationContent {
        title: "Task reassigned to you".to_string(),
        message: format!("\"{task_title}\" in {project_title} was reassigned to you"),
        receiver: NotifyParty::Assignee,
        template: EmailTemplate::TaskReassigned,
    }
}

/// Compose the notification sent to the previous assignee on reassignment.
pub fn compose_unassignment(task_title: &str, project_title: &str) -> NotificationContent {
    NotificationContent {
        title: "Task reassigned".to_string(),
        message: format!("\"{task_title}\" in {project_title} is no longer assigned to you"),
        receiver: NotifyParty::Assignee,
        template: EmailTemplate::TaskUnassigned,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn caller_settable_statuses_accepted() {
        assert_matches!(
            ReviewOutcome::from_status(TaskStatus::UnderReview),
            Ok(ReviewOutcome::UnderReview)
        );
        assert_matches!(
            ReviewOutcome::from_status(TaskStatus::Rejected),
            Ok(ReviewOutcome::Rejected)
        );
        assert_matches!(
            ReviewOutcome::from_status(TaskStatus::Closed),
            Ok(ReviewOutcome::Closed)
        );
    }

    #[test]
    fn system_only_statuses_rejected() {
        assert_matches!(
            ReviewOutcome::from_status(TaskStatus::Ongoing),
            Err(CoreError::InvalidTransition(_))
        );
        assert_matches!(
            ReviewOutcome::from_status(TaskStatus::Overdue),
            Err(CoreError::InvalidTransition(_))
        );
    }

    #[test]
    fn outcome_round_trips_to_status() {
        for status in TaskStatus::CALLER_SETTABLE {
            let outcome = ReviewOutcome::from_status(status).unwrap();
            assert_eq!(outcome.status(), status);
        }
    }

    #[test]
    fn under_review_notifies_the_assigner() {
        let content = compose_status_change(ReviewOutcome::UnderReview, "Fix login", "Alice");
        assert_eq!(content.receiver, NotifyParty::Assigner);
        assert_eq!(content.template, EmailTemplate::TaskUnderReview);
        assert!(content.message.contains("Alice"));
        assert!(content.message.contains("Fix login"));
    }

    #[test]
    fn rejected_and_closed_notify_the_assignee() {
        let rejected = compose_status_change(ReviewOutcome::Rejected, "Fix login", "Bob");
        assert_eq!(rejected.receiver, NotifyParty::Assignee);
        assert_eq!(rejected.template, EmailTemplate::TaskRejected);

        let closed = compose_status_change(ReviewOutcome::Closed, "Fix login", "Bob");
        assert_eq!(closed.receiver, NotifyParty::Assignee);
        assert_eq!(closed.template, EmailTemplate::TaskClosed);
    }

    #[test]
    fn template_kinds_are_stable_wire_names() {
        assert_eq!(EmailTemplate::TaskUnderReview.kind(), "task_under_review");
        assert_eq!(EmailTemplate::TaskAssigned.kind(), "task_assigned");
        assert_eq!(EmailTemplate::TaskUnassigned.kind(), "task_unassigned");
    }
}
