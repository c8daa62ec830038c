use chrono::NaiveDate;

use crate::editor::LineEditor;
use crate::error::{Result, TaskError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    EmployeeId,
    EmployeeName,
    TaskDescription,
    StartDate,
    EndDate,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::EmployeeId,
        FormField::EmployeeName,
        FormField::TaskDescription,
        FormField::StartDate,
        FormField::EndDate,
    ];

    /// Key used in the urlencoded body.
    pub fn form_key(self) -> &'static str {
        match self {
            FormField::EmployeeId => "eID",
            FormField::EmployeeName => "eName",
            FormField::TaskDescription => "TaskDescription",
            FormField::StartDate => "StartDate",
            FormField::EndDate => "EndDate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::EmployeeId => "Employee ID",
            FormField::EmployeeName => "Employee Name",
            FormField::TaskDescription => "Task",
            FormField::StartDate => "Start Date",
            FormField::EndDate => "End Date",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            FormField::EmployeeId | FormField::EmployeeName | FormField::TaskDescription
        )
    }

    pub fn is_date(self) -> bool {
        matches!(self, FormField::StartDate | FormField::EndDate)
    }

    fn index(self) -> usize {
        FormField::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// A checked add-task submission, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub employee_id: String,
    pub employee_name: String,
    pub task_description: String,
    pub start_date: String,
    pub end_date: String,
}

impl NewTask {
    /// Required fields must be non-empty; dates, when given, must be YYYY-MM-DD.
    pub fn new(
        employee_id: &str,
        employee_name: &str,
        task_description: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Self> {
        let values = [employee_id, employee_name, task_description, start_date, end_date];
        for (field, value) in FormField::ALL.iter().zip(values) {
            if field.is_required() && value.is_empty() {
                return Err(TaskError::InvalidForm(format!("{} is required.", field.label())));
            }
            if field.is_date() && !value.is_empty() && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                return Err(TaskError::InvalidForm(format!(
                    "{} must be a date in YYYY-MM-DD form.",
                    field.label()
                )));
            }
        }
        Ok(NewTask {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            task_description: task_description.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        })
    }

    /// Key/value pairs in form order; empty dates are still sent.
    pub fn form_pairs(&self) -> [(&'static str, &str); 5] {
        [
            (FormField::EmployeeId.form_key(), self.employee_id.as_str()),
            (FormField::EmployeeName.form_key(), self.employee_name.as_str()),
            (FormField::TaskDescription.form_key(), self.task_description.as_str()),
            (FormField::StartDate.form_key(), self.start_date.as_str()),
            (FormField::EndDate.form_key(), self.end_date.as_str()),
        ]
    }
}

/// State of the add-task popup.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTaskForm {
    inputs: [LineEditor; 5],
    pub focus: FormField,
    /// Last failed check, shown under the fields.
    pub error: Option<String>,
}

impl Default for AddTaskForm {
    fn default() -> Self {
        AddTaskForm {
            inputs: Default::default(),
            focus: FormField::EmployeeId,
            error: None,
        }
    }
}

impl AddTaskForm {
    pub fn input(&self, field: FormField) -> &LineEditor {
        &self.inputs[field.index()]
    }

    pub fn focused_input_mut(&mut self) -> &mut LineEditor {
        &mut self.inputs[self.focus.index()]
    }

    #[cfg(test)]
    pub fn set_value(&mut self, field: FormField, value: &str) {
        self.inputs[field.index()] = LineEditor::new(value);
    }

    pub fn value(&self, field: FormField) -> String {
        self.input(field).get_content()
    }

    pub fn focus_next(&mut self) {
        let i = self.focus.index();
        self.focus = FormField::ALL[(i + 1) % FormField::ALL.len()];
    }

    pub fn focus_previous(&mut self) {
        let i = self.focus.index();
        self.focus = FormField::ALL[(i + FormField::ALL.len() - 1) % FormField::ALL.len()];
    }

    pub fn to_new_task(&self) -> Result<NewTask> {
        NewTask::new(
            &self.value(FormField::EmployeeId),
            &self.value(FormField::EmployeeName),
            &self.value(FormField::TaskDescription),
            &self.value(FormField::StartDate),
            &self.value(FormField::EndDate),
        )
    }
}
