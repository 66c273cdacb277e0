//! Build sinks receive every action a build plans or performs.
//!
//! Previews and real builds report through the same interface, so callers can
//! log them, show them to a user or inspect them in tests.

use parking_lot::Mutex;
use tracing::info;

use crate::action::{BuildAction, BuildMode};

/// Receiver for the actions of a build.
pub trait BuildSink {
    /// An action that would happen in a writing build but is skipped now.
    fn planned(&self, action: &BuildAction);

    /// An action that is being carried out.
    fn executed(&self, action: &BuildAction);
}

/// Sink that reports actions through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl BuildSink for TracingSink {
    fn planned(&self, action: &BuildAction) {
        match action {
            BuildAction::WriteFile {
                target_path,
                content,
                ..
            } => info!("would write {}\n{}", target_path.display(), content),
            BuildAction::RunScript { kind, content } => {
                info!("would run {}\n{}", kind.sh_name(), content)
            }
        }
    }

    fn executed(&self, action: &BuildAction) {
        match action {
            BuildAction::WriteFile {
                mode: BuildMode::Overwrite,
                target_path,
                ..
            } => info!("overwriting {}", target_path.display()),
            BuildAction::WriteFile { target_path, .. } => info!("writing {}", target_path.display()),
            BuildAction::RunScript { kind, .. } => info!("running {}", kind.sh_name()),
        }
    }
}

/// Whether a recorded action was only planned or actually executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Planned,
    Executed,
}

/// Sink that keeps every action in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(Record, BuildAction)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in the order they were reported.
    pub fn records(&self) -> Vec<(Record, BuildAction)> {
        self.records.lock().clone()
    }

    /// Actions reported with the given record kind.
    pub fn actions(&self, record: Record) -> Vec<BuildAction> {
        self.records
            .lock()
            .iter()
            .filter(|(kind, _)| *kind == record)
            .map(|(_, action)| action.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl BuildSink for RecordingSink {
    fn planned(&self, action: &BuildAction) {
        self.records.lock().push((Record::Planned, action.clone()));
    }

    fn executed(&self, action: &BuildAction) {
        self.records.lock().push((Record::Executed, action.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ScriptKind;

    #[test]
    fn test_recording_sink_keeps_order_and_kind() {
        let sink = RecordingSink::new();
        let before = BuildAction::RunScript {
            kind: ScriptKind::Before,
            content: "true\n".to_string(),
        };
        let after = BuildAction::RunScript {
            kind: ScriptKind::After,
            content: "false\n".to_string(),
        };

        sink.executed(&before);
        sink.planned(&after);

        assert_eq!(
            sink.records(),
            vec![(Record::Executed, before.clone()), (Record::Planned, after.clone())]
        );
        assert_eq!(sink.actions(Record::Planned), vec![after]);
    }
}
