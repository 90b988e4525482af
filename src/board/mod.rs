//! The task page view model.
//!
//! A `Board` projects its `TaskStore` into two sections of rows (todo and done)
//! and carries out the interactions a row offers: toggling the status, the
//! single-fire delete, and click-to-edit renaming. Every interaction awaits the
//! backend first and only then mutates the store and the rows, so both always
//! describe the same tasks.

pub mod row;

use chrono::NaiveDate;
use log::{debug, error, warn};
use std::fmt;

use crate::backend::TaskBackend;
use crate::error::AppError;
use crate::models::{Filter, Task, TaskPatch, TaskStatus};
use crate::session::Session;
use crate::store::TaskStore;

pub use row::{EditKey, Phase, RowMode, TaskRow};

/// The page the front-end should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tasks,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub todo: usize,
    pub done: usize,
}

/// The rows rendered for one status.
#[derive(Debug, Clone)]
pub struct Section {
    pub status: TaskStatus,
    pub rows: Vec<TaskRow>,
}

impl Section {
    fn new(status: TaskStatus) -> Self {
        Self {
            status,
            rows: Vec::new(),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.status {
            TaskStatus::Todo => "ToDo",
            TaskStatus::Done => "Done",
        }
    }

    pub fn titles(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.title.as_str()).collect()
    }
}

/// Formats the page header date, e.g. "Thursday, October 16".
pub fn header_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

pub struct Board {
    store: TaskStore,
    backend: Box<dyn TaskBackend>,
    todo: Section,
    done: Section,
    filter: Filter,
    route: Route,
}

impl Board {
    pub fn new(store: TaskStore, backend: impl TaskBackend + 'static) -> Self {
        Self {
            store,
            backend: Box::new(backend),
            todo: Section::new(TaskStatus::Todo),
            done: Section::new(TaskStatus::Done),
            filter: Filter::All,
            route: Route::Tasks,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn section(&self, status: TaskStatus) -> &Section {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::Done => &self.done,
        }
    }

    fn section_mut(&mut self, status: TaskStatus) -> &mut Section {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::Done => &mut self.done,
        }
    }

    pub fn row(&self, id: &str) -> Option<&TaskRow> {
        self.todo
            .rows
            .iter()
            .chain(self.done.rows.iter())
            .find(|row| row.id == id)
    }

    fn row_mut(&mut self, id: &str) -> Option<&mut TaskRow> {
        self.todo
            .rows
            .iter_mut()
            .chain(self.done.rows.iter_mut())
            .find(|row| row.id == id)
    }

    fn take_row(&mut self, id: &str) -> Option<TaskRow> {
        for section in [&mut self.todo, &mut self.done] {
            if let Some(index) = section.rows.iter().position(|row| row.id == id) {
                return Some(section.rows.remove(index));
            }
        }
        None
    }

    pub fn counters(&self) -> Counters {
        Counters {
            todo: self.store.count(TaskStatus::Todo),
            done: self.store.count(TaskStatus::Done),
        }
    }

    /// Mounts a row for `task` in the section of its status.
    pub fn render(&mut self, task: &Task) {
        self.section_mut(task.status).rows.push(TaskRow::mount(task));
    }

    /// Clears both sections and repopulates them from the store.
    pub fn rerender(&mut self, filter: Filter) {
        self.todo.rows.clear();
        self.done.rows.clear();
        let rows: Vec<TaskRow> = self
            .store
            .filter(filter)
            .into_iter()
            .map(TaskRow::mount)
            .collect();
        for row in rows {
            self.section_mut(row.status).rows.push(row);
        }
        self.filter = filter;
    }

    /// Advances the show animation of every entering row.
    pub fn frame(&mut self) {
        for row in self.todo.rows.iter_mut().chain(self.done.rows.iter_mut()) {
            row.show();
        }
    }

    /// Triages a backend result.
    ///
    /// Recoverable failures are logged and reported as `Ok(None)`; a missing
    /// session sends the front-end to the login page.
    fn settle<T>(&mut self, action: &str, result: Result<T, AppError>) -> Result<Option<T>, AppError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(AppError::MissingSession) => {
                warn!("{} needs a session, redirecting to login", action);
                self.route = Route::Login;
                Err(AppError::MissingSession)
            }
            Err(e) if e.is_recoverable() => {
                error!("{} failed: {}", action, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches every task from the backend and shows those matching `filter`.
    pub async fn load(&mut self, filter: Filter) -> Result<bool, AppError> {
        self.todo.rows.clear();
        self.done.rows.clear();
        self.filter = filter;

        let result = self.backend.fetch_all().await;
        let Some(tasks) = self.settle("Loading tasks", result)? else {
            return Ok(false);
        };
        self.store.replace_all(tasks)?;
        self.rerender(filter);
        Ok(true)
    }

    /// Creates a task from user input. Blank input is ignored.
    ///
    /// Returns the id of the new task.
    pub async fn create(&mut self, title: &str) -> Result<Option<String>, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let result = self.backend.create(title).await;
        let Some(task) = self.settle("Creating task", result)? else {
            return Ok(None);
        };
        self.store.add(task.clone())?;
        self.render(&task);
        debug!("Created task {}", task.id);
        Ok(Some(task.id))
    }

    /// Flips a rendered task between todo and done.
    pub async fn toggle_status(&mut self, id: &str) -> Result<bool, AppError> {
        let Some(status) = self.row(id).map(|row| row.status) else {
            return Ok(false);
        };
        let next = status.toggled();

        let result = self.backend.update(id, &TaskPatch::status(next)).await;
        if self.settle("Status update", result)?.is_none() {
            return Ok(false);
        }

        self.store.set_status(id, next)?;
        if let Some(mut row) = self.take_row(id) {
            row.status = next;
            row.enter();
            self.section_mut(next).rows.push(row);
        }
        Ok(true)
    }

    /// Fires the delete control of a rendered task.
    ///
    /// The control is consumed before the request goes out; a second press
    /// while it is consumed does nothing. It is re-armed if the request fails.
    pub async fn delete(&mut self, id: &str) -> Result<bool, AppError> {
        let Some(row) = self.row_mut(id) else {
            return Ok(false);
        };
        if !row.disarm_delete() {
            debug!("Delete of {} already in progress", id);
            return Ok(false);
        }

        let result = self.backend.delete(id).await;
        let settled = self.settle("Deleting task", result);
        if !matches!(settled, Ok(Some(()))) {
            if let Some(row) = self.row_mut(id) {
                row.rearm_delete();
            }
            return settled.map(|_| false);
        }

        if let Err(e) = self.store.remove(id) {
            if let Some(row) = self.row_mut(id) {
                row.rearm_delete();
            }
            return Err(e);
        }
        self.take_row(id);
        Ok(true)
    }

    /// Swaps the title label for an edit field holding the current title.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        match self.row_mut(id) {
            Some(row) if !row.is_editing() => {
                let draft = row.title.clone();
                row.set_mode(RowMode::Editing { draft });
                true
            }
            _ => false,
        }
    }

    /// Replaces the text of an open edit field.
    pub fn edit_input(&mut self, id: &str, text: &str) -> bool {
        match self.row_mut(id).and_then(TaskRow::draft_mut) {
            Some(draft) => {
                *draft = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Enter commits non-blank text; Escape reverts.
    ///
    /// Returns whether the title changed.
    pub async fn edit_key(&mut self, id: &str, key: EditKey) -> Result<bool, AppError> {
        match key {
            EditKey::Enter if self.has_text(id) => self.commit_edit(id).await,
            EditKey::Enter => Ok(false),
            EditKey::Escape => {
                self.cancel_edit(id);
                Ok(false)
            }
        }
    }

    /// Losing focus commits non-blank text and reverts blank text.
    pub async fn blur(&mut self, id: &str) -> Result<bool, AppError> {
        if self.has_text(id) {
            self.commit_edit(id).await
        } else {
            self.cancel_edit(id);
            Ok(false)
        }
    }

    fn has_text(&self, id: &str) -> bool {
        self.row(id)
            .and_then(TaskRow::draft)
            .is_some_and(|draft| !draft.trim().is_empty())
    }

    fn cancel_edit(&mut self, id: &str) {
        if let Some(row) = self.row_mut(id) {
            row.set_mode(RowMode::Label);
        }
    }

    async fn commit_edit(&mut self, id: &str) -> Result<bool, AppError> {
        let (draft, current) = match self.row_mut(id) {
            Some(row) => match row.set_mode(RowMode::Label) {
                RowMode::Editing { draft } => (draft, row.title.clone()),
                RowMode::Label => return Ok(false),
            },
            None => return Ok(false),
        };

        let title = draft.trim().to_string();
        if title.is_empty() || title == current {
            return Ok(false);
        }

        let result = self.backend.update(id, &TaskPatch::title(title.as_str())).await;
        if self.settle("Rename", result)?.is_none() {
            return Ok(false);
        }

        self.store.rename(id, &title)?;
        if let Some(row) = self.row_mut(id) {
            row.title = title;
        }
        Ok(true)
    }

    /// Forgets the session and sends the front-end to the login page.
    pub fn logout(&mut self, session: &Session) -> Result<(), AppError> {
        session.logout()?;
        self.route = Route::Login;
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let counters = self.counters();
        for (section, count) in [(&self.todo, counters.todo), (&self.done, counters.done)] {
            writeln!(f, "{} ({})", section.heading(), count)?;
            for row in &section.rows {
                let mark = match row.status {
                    TaskStatus::Todo => "[ ]",
                    TaskStatus::Done => "[x]",
                };
                match row.draft() {
                    Some(draft) => writeln!(f, "  {} > {}_  {}", mark, draft, row.id)?,
                    None => writeln!(f, "  {} {}  {}", mark, row.title, row.id)?,
                }
            }
        }
        Ok(())
    }
}
