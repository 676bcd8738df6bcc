//! Status and priority enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding database lookup table, and each variant carries
//! the seeded name so services never embed raw strings or magic numbers.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Lookup-table name for this value.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Resolve a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Resolve a lookup-table name back to the enum.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $label => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Task lifecycle status.
    ///
    /// `Ongoing` is the creation default and is never re-entered;
    /// `Overdue` is written only by the overdue sweep.
    TaskStatus {
        Ongoing = 1 => "ongoing",
        UnderReview = 2 => "under_review",
        Rejected = 3 => "rejected",
        Closed = 4 => "closed",
        Overdue = 5 => "overdue",
    }
}

define_status_enum! {
    /// Sprint lifecycle status.
    SprintStatus {
        Planned = 1 => "planned",
        Active = 2 => "active",
        Completed = 3 => "completed",
        Overdue = 4 => "overdue",
    }
}

define_status_enum! {
    /// Task priority level.
    Priority {
        Low = 1 => "low",
        Middle = 2 => "middle",
        High = 3 => "high",
    }
}

impl Priority {
    /// Every priority, in seed order.
    pub const ALL: [Priority; 3] = [Self::Low, Self::Middle, Self::High];
}

define_status_enum! {
    /// Self-reported member workload level.
    BusyLevel {
        Free = 1 => "free",
        Low = 2 => "low",
        Medium = 3 => "medium",
        High = 4 => "high",
    }
}

impl TaskStatus {
    /// Every task status, in seed order. Aggregations iterate this to
    /// zero-fill empty buckets.
    pub const ALL: [TaskStatus; 5] = [
        Self::Ongoing,
        Self::UnderReview,
        Self::Rejected,
        Self::Closed,
        Self::Overdue,
    ];

    /// Statuses a caller may drive a task to through a review decision.
    pub const CALLER_SETTABLE: [TaskStatus; 3] =
        [Self::UnderReview, Self::Rejected, Self::Closed];

    /// Statuses the overdue sweep transitions out of. Excluding `Overdue`
    /// itself is what makes the sweep idempotent.
    pub const SWEEPABLE: [TaskStatus; 3] = [Self::Ongoing, Self::UnderReview, Self::Rejected];

    /// Counts toward the "active" bucket in sprint progress.
    pub fn is_active_work(self) -> bool {
        matches!(self, Self::Ongoing | Self::UnderReview)
    }

    /// Counts toward the "blocked" bucket in sprint progress.
    pub fn is_blocked_work(self) -> bool {
        matches!(self, Self::Rejected | Self::Overdue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_ids_match_seed_data() {
        assert_eq!(TaskStatus::Ongoing.id(), 1);
        assert_eq!(TaskStatus::UnderReview.id(), 2);
        assert_eq!(TaskStatus::Rejected.id(), 3);
        assert_eq!(TaskStatus::Closed.id(), 4);
        assert_eq!(TaskStatus::Overdue.id(), 5);
    }

    #[test]
    fn sprint_status_ids_match_seed_data() {
        assert_eq!(SprintStatus::Planned.id(), 1);
        assert_eq!(SprintStatus::Active.id(), 2);
        assert_eq!(SprintStatus::Completed.id(), 3);
        assert_eq!(SprintStatus::Overdue.id(), 4);
    }

    #[test]
    fn priority_ids_match_seed_data() {
        assert_eq!(Priority::Low.id(), 1);
        assert_eq!(Priority::Middle.id(), 2);
        assert_eq!(Priority::High.id(), 3);
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            TaskStatus::Ongoing,
            TaskStatus::UnderReview,
            TaskStatus::Rejected,
            TaskStatus::Closed,
            TaskStatus::Overdue,
        ] {
            assert_eq!(TaskStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(TaskStatus::from_id(0), None);
        assert_eq!(TaskStatus::from_id(6), None);
    }

    #[test]
    fn status_names_match_lookup_tables() {
        assert_eq!(TaskStatus::UnderReview.name(), "under_review");
        assert_eq!(SprintStatus::Active.name(), "active");
        assert_eq!(Priority::Middle.name(), "middle");
        assert_eq!(BusyLevel::Free.name(), "free");
    }

    #[test]
    fn progress_buckets_partition_non_terminal_statuses() {
        assert!(TaskStatus::Ongoing.is_active_work());
        assert!(TaskStatus::UnderReview.is_active_work());
        assert!(TaskStatus::Rejected.is_blocked_work());
        assert!(TaskStatus::Overdue.is_blocked_work());
        assert!(!TaskStatus::Closed.is_active_work());
        assert!(!TaskStatus::Closed.is_blocked_work());
    }

    #[test]
    fn sweepable_excludes_overdue_and_closed() {
        assert!(!TaskStatus::SWEEPABLE.contains(&TaskStatus::Overdue));
        assert!(!TaskStatus::SWEEPABLE.contains(&TaskStatus::Closed));
    }
}
