//! Aggregate task statistics
//!
//! A [`Statistics`] value is a point-in-time aggregation computed by the
//! repository; it holds plain counts plus the completion rate. The extra
//! derived metrics consumed by the extended statistics view are pure
//! functions of the record and carry no state of their own.

use serde::Serialize;

/// Aggregated counts over the tasks in a repository
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub overdue: usize,

    /// Completed tasks as a percentage of all tasks; 0 when empty
    pub completion_rate: f64,
}

impl Statistics {
    /// Overdue tasks as a percentage of all tasks; 0 when empty
    pub fn overdue_rate(&self) -> f64 {
        if self.total > 0 {
            self.overdue as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Completed count minus overdue count; negative when overdue dominates
    pub fn health_index(&self) -> i64 {
        self.completed as i64 - self.overdue as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: usize, completed: usize, overdue: usize) -> Statistics {
        Statistics {
            total,
            pending: total - completed,
            in_progress: 0,
            completed,
            cancelled: 0,
            overdue,
            completion_rate: if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    #[test]
    fn overdue_rate_of_empty_stats_is_zero() {
        assert_eq!(stats(0, 0, 0).overdue_rate(), 0.0);
    }

    #[test]
    fn overdue_rate_is_a_percentage() {
        assert_eq!(stats(4, 1, 1).overdue_rate(), 25.0);
    }

    #[test]
    fn health_index_subtracts_overdue_from_completed() {
        assert_eq!(stats(4, 3, 1).health_index(), 2);
    }

    #[test]
    fn health_index_can_go_negative() {
        assert_eq!(stats(5, 1, 4).health_index(), -3);
    }

    #[test]
    fn serializes_all_counts() {
        let value = serde_json::to_value(stats(2, 1, 0)).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["completed"], 1);
        assert_eq!(value["completion_rate"], 50.0);
    }
}
