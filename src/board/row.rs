use crate::models::{Task, TaskStatus};

/// How the title of a row is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMode {
    /// Static title; clicking it starts editing.
    Label,
    /// Editable field holding the uncommitted text.
    Editing { draft: String },
}

/// Show animation state. Rows enter hidden and are shown on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Shown,
}

/// Keys the edit field reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
}

/// One rendered task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    mode: RowMode,
    phase: Phase,
    delete_armed: bool,
}

impl TaskRow {
    pub fn mount(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            mode: RowMode::Label,
            phase: Phase::Entering,
            delete_armed: true,
        }
    }

    /// The only way a row changes mode. Returns the mode it left.
    pub fn set_mode(&mut self, mode: RowMode) -> RowMode {
        std::mem::replace(&mut self.mode, mode)
    }

    pub fn mode(&self) -> &RowMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, RowMode::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.mode {
            RowMode::Editing { draft } => Some(draft),
            RowMode::Label => None,
        }
    }

    pub(crate) fn draft_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            RowMode::Editing { draft } => Some(draft),
            RowMode::Label => None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn enter(&mut self) {
        self.phase = Phase::Entering;
    }

    pub(crate) fn show(&mut self) {
        self.phase = Phase::Shown;
    }

    pub fn delete_armed(&self) -> bool {
        self.delete_armed
    }

    /// Consumes the delete control. `false` if it already fired.
    pub(crate) fn disarm_delete(&mut self) -> bool {
        std::mem::replace(&mut self.delete_armed, false)
    }

    pub(crate) fn rearm_delete(&mut self) {
        self.delete_armed = true;
    }

    /// Element id of the status toggle.
    pub fn icon_id(&self) -> String {
        format!("{}-icon", self.id)
    }

    pub fn title_id(&self) -> String {
        format!("{}-task-name", self.id)
    }

    pub fn delete_button_id(&self) -> String {
        format!("{}-delete-button", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_transitions_are_reentrant() {
        let mut row = TaskRow::mount(&Task::new("Title"));
        assert_eq!(row.mode(), &RowMode::Label);

        for _ in 0..2 {
            let left = row.set_mode(RowMode::Editing {
                draft: row.title.clone(),
            });
            assert_eq!(left, RowMode::Label);
            assert_eq!(row.draft(), Some("Title"));

            let left = row.set_mode(RowMode::Label);
            assert!(matches!(left, RowMode::Editing { .. }));
            assert!(!row.is_editing());
        }
    }

    #[test]
    fn test_delete_control_fires_once() {
        let mut row = TaskRow::mount(&Task::new("x"));
        assert!(row.disarm_delete());
        assert!(!row.disarm_delete());
        row.rearm_delete();
        assert!(row.delete_armed());
    }

    #[test]
    fn test_element_ids() {
        let mut task = Task::new("x");
        task.id = "abc".into();
        let row = TaskRow::mount(&task);
        assert_eq!(row.icon_id(), "abc-icon");
        assert_eq!(row.title_id(), "abc-task-name");
        assert_eq!(row.delete_button_id(), "abc-delete-button");
        assert_eq!(row.phase(), Phase::Entering);
    }
}
