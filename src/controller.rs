use std::sync::Arc;

use crate::client::TaskService;
use crate::error::Result;
use crate::form::{AddTaskForm, NewTask};
use crate::models::{FetchOutcome, MutationReply, Popup, RemovalTable, TaskListDocument, TaskRow};

pub const FETCH_FAILED: &str = "Failed to fetch tasks.";
pub const ADD_FAILED: &str = "Failed to add task.";
pub const ADD_SUCCEEDED: &str = "Task added.";
pub const REMOVE_SUCCEEDED: &str = "Task removed successfully.";
pub const NO_TASKS: &str = "No tasks found for the Employee ID.";

/// How an add or remove ended, including the re-fetch that follows success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Failed(String),
    /// `message` is the server's reply, kept even when the re-fetch fails.
    Applied { message: String, refreshed: bool },
}

/// Owns the view state for one employee and drives the remote calls.
///
/// Every call is split into a synchronous `begin`/`finish` pair so an event
/// loop can run the request elsewhere and hand the result back. The async
/// helpers chain the pairs for callers that can simply await.
pub struct TaskController {
    service: Arc<dyn TaskService>,
    employee_id: String,
    document: Option<TaskListDocument>,
    rows: Vec<TaskRow>,
    pub loading: bool,
    pub no_tasks: bool,
    pub popup: Popup,
}

impl TaskController {
    pub fn new(employee_id: impl Into<String>, service: Arc<dyn TaskService>) -> Self {
        TaskController {
            service,
            employee_id: employee_id.into(),
            document: None,
            rows: Vec::new(),
            loading: false,
            no_tasks: false,
            popup: Popup::None,
        }
    }

    pub fn service(&self) -> Arc<dyn TaskService> {
        Arc::clone(&self.service)
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// Rows of the current document, for the main list.
    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.document = None;
        self.rows.clear();
        self.no_tasks = false;
    }

    pub fn finish_fetch(&mut self, result: Result<FetchOutcome>) {
        match result {
            Ok(FetchOutcome::Empty) => {
                self.document = None;
                self.rows.clear();
                self.no_tasks = true;
            }
            Ok(FetchOutcome::Tasks(document)) => {
                self.rows = document.rows();
                self.document = Some(document);
                self.no_tasks = false;
            }
            Err(err) => {
                log::error!("Error fetching tasks: {err}");
                self.popup = Popup::Message(FETCH_FAILED.to_string());
            }
        }
        self.loading = false;
    }

    /// Returns whether the fetch succeeded.
    pub async fn fetch_tasks(&mut self) -> bool {
        let service = self.service();
        let employee_id = self.employee_id.clone();
        self.begin_fetch();
        let result = service.fetch_tasks(&employee_id).await;
        let fetched = result.is_ok();
        self.finish_fetch(result);
        fetched
    }

    pub fn open_add_popup(&mut self) {
        self.popup = Popup::AddTask(AddTaskForm::default());
    }

    /// Derives the removal table from the stored document.
    pub fn open_remove_popup(&mut self) {
        let rows = self.document.as_ref().map(TaskListDocument::rows).unwrap_or_default();
        self.popup = Popup::RemoveTask(RemovalTable::new(rows));
    }

    pub fn close_all(&mut self) {
        self.popup = Popup::None;
    }

    /// Checks the open add form. A failed check stays on the form.
    pub fn validate_add_form(&mut self) -> Option<NewTask> {
        let Popup::AddTask(form) = &mut self.popup else {
            return None;
        };
        match form.to_new_task() {
            Ok(task) => {
                form.error = None;
                Some(task)
            }
            Err(err) => {
                form.error = Some(err.to_string());
                None
            }
        }
    }

    /// Returns whether the list must be fetched again.
    pub fn finish_add(&mut self, result: Result<MutationReply>) -> bool {
        match result {
            Ok(reply) => {
                let message = reply.message.unwrap_or_else(|| ADD_SUCCEEDED.to_string());
                self.popup = Popup::Message(message);
                true
            }
            Err(err) => {
                log::error!("Error adding task: {err}");
                self.popup = Popup::Message(ADD_FAILED.to_string());
                false
            }
        }
    }

    pub async fn submit_add_task(&mut self, task: &NewTask) -> MutationOutcome {
        let result = self.service.add_task(task).await;
        let added = self.finish_add(result);
        self.refresh_after(added).await
    }

    /// Returns whether the list must be fetched again.
    pub fn finish_remove(&mut self, result: Result<MutationReply>) -> bool {
        match result {
            Ok(reply) => {
                let message = reply.message.unwrap_or_else(|| REMOVE_SUCCEEDED.to_string());
                self.popup = Popup::Message(message);
                true
            }
            Err(err) => {
                log::error!("Error removing task: {err}");
                self.popup = Popup::Message(format!("Request failed: {err}"));
                false
            }
        }
    }

    pub async fn remove_task(&mut self, employee_name: &str, task_description: &str) -> MutationOutcome {
        let result = self.service.remove_task(employee_name, task_description).await;
        let removed = self.finish_remove(result);
        self.refresh_after(removed).await
    }

    async fn refresh_after(&mut self, succeeded: bool) -> MutationOutcome {
        let message = match &self.popup {
            Popup::Message(message) => message.clone(),
            _ => String::new(),
        };
        if !succeeded {
            return MutationOutcome::Failed(message);
        }
        let refreshed = self.fetch_tasks().await;
        MutationOutcome::Applied { message, refreshed }
    }
}
