use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// One progress event for a bulk task.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub percent: f64,
    pub title: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

/// Accumulated progress of one bulk task.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskProgress {
    pub total: usize,
    pub events: Vec<ProgressEvent>,
    pub failed: Vec<String>,
    pub completed: bool,
}

/// In-memory progress channel, polled by task id.
///
/// Events are append-only per task; publishing against an unknown id is a
/// no-op so a lost task entry never fails a running batch.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    tasks: Arc<DashMap<String, TaskProgress>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, task_id: &str, total: usize) {
        self.tasks.insert(
            task_id.to_string(),
            TaskProgress {
                total,
                ..TaskProgress::default()
            },
        );
    }

    pub fn publish(&self, task_id: &str, percent: f64, title: &str, description: &str) {
        tracing::info!(
            task_id = %task_id,
            percent = percent,
            document = %description,
            message = %title,
            "Bulk task progress"
        );

        if let Some(mut task) = self.tasks.get_mut(task_id) {
            task.events.push(ProgressEvent {
                percent,
                title: title.to_string(),
                description: description.to_string(),
                at: Utc::now(),
            });
        }
    }

    pub fn finish(&self, task_id: &str, failed: &[String]) {
        if let Some(mut task) = self.tasks.get_mut(task_id) {
            task.failed = failed.to_vec();
            task.completed = true;
        }
    }

    pub fn forget(&self, task_id: &str) {
        self.tasks.remove(task_id);
    }

    pub fn snapshot(&self, task_id: &str) -> Option<TaskProgress> {
        self.tasks.get(task_id).map(|task| task.value().clone())
    }

    pub fn is_known(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_a_task_from_begin_to_finish() {
        let tracker = ProgressTracker::new();
        tracker.begin("task-1", 2);
        tracker.publish("task-1", 50.0, "Submitting Payment Entry", "PE-0001");
        tracker.publish("task-1", 100.0, "", "PE-0002");
        tracker.finish("task-1", &["PE-0002".to_string()]);

        let snapshot = tracker.snapshot("task-1").expect("known task");

        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.events[0].percent, 50.0);
        assert_eq!(snapshot.events[1].title, "");
        assert_eq!(snapshot.failed, vec!["PE-0002".to_string()]);
        assert!(snapshot.completed);
    }

    #[test]
    fn publishing_against_an_unknown_task_is_a_no_op() {
        let tracker = ProgressTracker::new();

        tracker.publish("ghost", 10.0, "", "PE-0001");

        assert!(tracker.snapshot("ghost").is_none());
        assert!(!tracker.is_known("ghost"));
    }

    #[test]
    fn forget_drops_the_task() {
        let tracker = ProgressTracker::new();
        tracker.begin("task-1", 1);
        tracker.forget("task-1");

        assert!(tracker.snapshot("task-1").is_none());
    }
}
