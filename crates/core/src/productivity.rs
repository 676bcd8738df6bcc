//! Productivity scoring and shared aggregation math.
//!
//! Pure functions over counts the persistence layer has already computed.
//! Nothing here touches the database.

// ---------------------------------------------------------------------------
// Weights and windows
// ---------------------------------------------------------------------------

/// Weight of the completion-rate term in the productivity score.
pub const COMPLETION_RATE_WEIGHT: f64 = 60.0;
/// Weight of the turnaround term.
pub const TURNAROUND_WEIGHT: f64 = 20.0;
/// Weight of the overdue/rejected penalty term.
pub const PENALTY_WEIGHT: f64 = 20.0;
/// Target turnaround per task, in hours. Closing at or under this earns
/// the full turnaround weight.
pub const TARGET_TURNAROUND_HOURS: f64 = 8.0;

/// Trailing and leading window for recent-activity queries, in days.
pub const ACTIVITY_WINDOW_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-member task counts aggregated from the store.
///
/// `avg_completion_hours` is the mean of `updated_at - created_at` over
/// closed tasks only, and is `0.0` when the member has no closed tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberTaskStats {
    pub total: i64,
    pub closed: i64,
    pub overdue: i64,
    pub rejected: i64,
    pub avg_completion_hours: f64,
}

/// A computed productivity report for one member.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ProductivityScore {
    pub completion_rate: f64,
    pub avg_completion_hours: f64,
    pub score: i32,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Compute a member's productivity score.
///
/// `score = round(completion_rate * 60
///             + (1 - avg_completion_hours / 8) * 20
///             + (1 - (overdue + rejected) / total) * 20)`
///
/// A member with zero tasks has no score; returning `None` here (rather
/// than 0) lets callers render "no data" instead of a bottom ranking.
pub fn score(stats: &MemberTaskStats) -> Option<ProductivityScore> {
    if stats.total == 0 {
        return None;
    }

    let total = stats.total as f64;
    let completion_rate = stats.closed as f64 / total;
    let turnaround_term =
        (1.0 - stats.avg_completion_hours / TARGET_TURNAROUND_HOURS) * TURNAROUND_WEIGHT;
    let penalty_term =
        (1.0 - (stats.overdue + stats.rejected) as f64 / total) * PENALTY_WEIGHT;

    let raw = completion_rate * COMPLETION_RATE_WEIGHT + turnaround_term + penalty_term;

    Some(ProductivityScore {
        completion_rate,
        avg_completion_hours: stats.avg_completion_hours,
        score: raw.round() as i32,
    })
}

/// Percentage share of `count` in `total`, rounded to one decimal place.
/// Zero when `total` is zero so empty projects aggregate cleanly.
pub fn percent(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_matches_worked_example() {
        // 10 tasks, 6 closed in 4h average, 1 overdue, 0 rejected:
        // 0.6*60 + (1 - 4/8)*20 + (1 - 1/10)*20 = 36 + 10 + 18 = 64
        let stats = MemberTaskStats {
            total: 10,
            closed: 6,
            overdue: 1,
            rejected: 0,
            avg_completion_hours: 4.0,
        };
        let report = score(&stats).unwrap();
        assert_eq!(report.score, 64);
        assert!((report.completion_rate - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_tasks_yields_no_score() {
        assert!(score(&MemberTaskStats::default()).is_none());
    }

    #[test]
    fn perfect_member_scores_one_hundred() {
        let stats = MemberTaskStats {
            total: 5,
            closed: 5,
            overdue: 0,
            rejected: 0,
            avg_completion_hours: 0.0,
        };
        assert_eq!(score(&stats).unwrap().score, 100);
    }

    #[test]
    fn no_closed_tasks_earns_full_turnaround_term_only() {
        // completion 0, turnaround (1-0)*20 = 20, penalty (1-2/4)*20 = 10
        let stats = MemberTaskStats {
            total: 4,
            closed: 0,
            overdue: 1,
            rejected: 1,
            avg_completion_hours: 0.0,
        };
        assert_eq!(score(&stats).unwrap().score, 30);
    }

    #[test]
    fn slow_turnaround_can_push_the_term_negative() {
        // avg 16h against an 8h target: turnaround term is -20.
        let stats = MemberTaskStats {
            total: 2,
            closed: 2,
            overdue: 0,
            rejected: 0,
            avg_completion_hours: 16.0,
        };
        assert_eq!(score(&stats).unwrap().score, 60);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(0, 3), 0.0);
        assert_eq!(percent(3, 3), 100.0);
    }

    #[test]
    fn percent_of_empty_total_is_zero() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(5, 0), 0.0);
    }
}
