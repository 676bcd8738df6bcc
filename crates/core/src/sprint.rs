//! Sprint time-range rules and default-sprint selection.

use chrono::Duration;

use crate::error::CoreError;
use crate::status::SprintStatus;
use crate::types::{DbId, Timestamp};

/// How far in the past a sprint's start date may lie at creation/update.
pub const START_GRACE_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a sprint's date pair.
///
/// `end` must not precede `start`, and `start` must not be more than
/// [`START_GRACE_HOURS`] before `now`. Partial updates pass the unchanged
/// bound here so a lone `start` change is still checked against the stored
/// `end` (and vice versa).
pub fn validate_time_range(
    start: Timestamp,
    end: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::InvalidTimeRange(
            "end date precedes start date".to_string(),
        ));
    }

    if start < now - Duration::hours(START_GRACE_HOURS) {
        return Err(CoreError::InvalidTimeRange(format!(
            "start date is more than {START_GRACE_HOURS} hours in the past"
        )));
    }

    Ok(())
}

/// Validate that a task deadline falls inside its sprint's window.
pub fn validate_deadline(
    deadline: Timestamp,
    sprint_start: Timestamp,
    sprint_end: Timestamp,
) -> Result<(), CoreError> {
    if deadline < sprint_start || deadline > sprint_end {
        return Err(CoreError::InvalidTimeRange(
            "deadline falls outside the sprint window".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Default-sprint selection
// ---------------------------------------------------------------------------

/// The fields of a sprint that participate in default-sprint selection.
#[derive(Debug, Clone, Copy)]
pub struct SprintCandidate {
    pub id: DbId,
    pub status: SprintStatus,
    pub created_at: Timestamp,
    pub end_date: Timestamp,
}

/// Pick the project's default sprint.
///
/// Policy: the most recently created `active` sprint; failing that, the
/// sprint with the latest end date; `None` when the project has no
/// sprints (not an error).
pub fn pick_default(candidates: &[SprintCandidate]) -> Option<DbId> {
    if let Some(active) = candidates
        .iter()
        .filter(|c| c.status == SprintStatus::Active)
        .max_by_key(|c| c.created_at)
    {
        return Some(active.id);
    }

    candidates.iter().max_by_key(|c| c.end_date).map(|c| c.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn candidate(
        id: DbId,
        status: SprintStatus,
        created_offset_h: i64,
        end_offset_h: i64,
    ) -> SprintCandidate {
        let now = Utc::now();
        SprintCandidate {
            id,
            status,
            created_at: now + Duration::hours(created_offset_h),
            end_date: now + Duration::hours(end_offset_h),
        }
    }

    #[test]
    fn accepts_a_valid_range() {
        let now = Utc::now();
        assert!(validate_time_range(now, now + Duration::days(14), now).is_ok());
    }

    #[test]
    fn accepts_start_within_grace_window() {
        let now = Utc::now();
        let start = now - Duration::hours(START_GRACE_HOURS - 1);
        assert!(validate_time_range(start, now + Duration::days(7), now).is_ok());
    }

    #[test]
    fn rejects_end_before_start() {
        let now = Utc::now();
        assert_matches!(
            validate_time_range(now, now - Duration::hours(1), now),
            Err(CoreError::InvalidTimeRange(_))
        );
    }

    #[test]
    fn rejects_start_older_than_grace_window() {
        let now = Utc::now();
        let start = now - Duration::hours(START_GRACE_HOURS + 1);
        assert_matches!(
            validate_time_range(start, now + Duration::days(7), now),
            Err(CoreError::InvalidTimeRange(_))
        );
    }

    #[test]
    fn deadline_must_sit_inside_the_window() {
        let now = Utc::now();
        let start = now;
        let end = now + Duration::days(14);

        assert!(validate_deadline(now + Duration::days(7), start, end).is_ok());
        assert!(validate_deadline(start, start, end).is_ok());
        assert!(validate_deadline(end, start, end).is_ok());
        assert_matches!(
            validate_deadline(now - Duration::hours(1), start, end),
            Err(CoreError::InvalidTimeRange(_))
        );
        assert_matches!(
            validate_deadline(end + Duration::hours(1), start, end),
            Err(CoreError::InvalidTimeRange(_))
        );
    }

    #[test]
    fn default_prefers_latest_created_active_sprint() {
        let sprints = [
            candidate(1, SprintStatus::Active, -48, 100),
            candidate(2, SprintStatus::Active, -2, 50),
            candidate(3, SprintStatus::Planned, 0, 200),
        ];
        assert_eq!(pick_default(&sprints), Some(2));
    }

    #[test]
    fn default_falls_back_to_latest_end_date() {
        let sprints = [
            candidate(1, SprintStatus::Completed, -48, 10),
            candidate(2, SprintStatus::Planned, -2, 300),
            candidate(3, SprintStatus::Overdue, 0, 200),
        ];
        assert_eq!(pick_default(&sprints), Some(2));
    }

    #[test]
    fn default_is_none_without_sprints() {
        assert_eq!(pick_default(&[]), None);
    }
}
