use serde::Deserialize;

use crate::form::AddTaskForm;
use crate::markup;

/// One task as shown in the list and the removal table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRow {
    pub employee_name: String,
    pub task_description: String,
    pub start_date: String,
    pub end_date: String,
    pub rating: String,
    pub remarks: String,
}

/// The task list as last returned by the fetch endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskListDocument {
    /// Server-rendered table, kept verbatim.
    Markup(String),
    /// Structured records, sent when the service answers with JSON.
    Records(Vec<TaskRow>),
}

impl TaskListDocument {
    /// Rows of the document, header excluded, in document order.
    pub fn rows(&self) -> Vec<TaskRow> {
        match self {
            TaskListDocument::Markup(markup) => markup::extract_rows(markup),
            TaskListDocument::Records(rows) => rows.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Success with nothing to show.
    Empty,
    Tasks(TaskListDocument),
}

/// JSON body returned by both mutation endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MutationReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// Rows offered for removal plus the highlighted one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalTable {
    pub rows: Vec<TaskRow>,
    pub selected: Option<usize>,
}

impl RemovalTable {
    pub fn new(rows: Vec<TaskRow>) -> Self {
        let selected = if rows.is_empty() { None } else { Some(0) };
        RemovalTable { rows, selected }
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        });
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        });
    }

    pub fn selected_row(&self) -> Option<&TaskRow> {
        self.selected.and_then(|i| self.rows.get(i))
    }
}

/// The overlay currently shown; at most one at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Popup {
    #[default]
    None,
    AddTask(AddTaskForm),
    RemoveTask(RemovalTable),
    Message(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> TaskRow {
        TaskRow {
            employee_name: name.to_string(),
            ..TaskRow::default()
        }
    }

    #[test]
    fn records_deserialize_with_missing_fields() {
        let rows: Vec<TaskRow> =
            serde_json::from_str(r#"[{"employeeName":"Alice","taskDescription":"Write report","rating":"5"}]"#)
                .unwrap();
        assert_eq!(rows[0].employee_name, "Alice");
        assert_eq!(rows[0].rating, "5");
        assert_eq!(rows[0].remarks, "");
    }

    #[test]
    fn reply_message_is_optional() {
        let reply: MutationReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.message, None);
        let reply: MutationReply = serde_json::from_str(r#"{"message":"Removed"}"#).unwrap();
        assert_eq!(reply.message.as_deref(), Some("Removed"));
    }

    #[test]
    fn removal_selection_wraps() {
        let mut table = RemovalTable::new(vec![row("a"), row("b"), row("c")]);
        assert_eq!(table.selected, Some(0));
        table.previous();
        assert_eq!(table.selected, Some(2));
        table.next();
        assert_eq!(table.selected, Some(0));
        table.next();
        assert_eq!(table.selected_row().map(|r| r.employee_name.as_str()), Some("b"));
    }

    #[test]
    fn empty_removal_table_selects_nothing() {
        let mut table = RemovalTable::new(Vec::new());
        table.next();
        table.previous();
        assert_eq!(table.selected, None);
        assert!(table.selected_row().is_none());
    }
}
