//! Scheduled background jobs.

pub mod daily_report;
pub mod overdue_sweeper;
