//! Reading task rows out of the server-rendered task table.
//!
//! The fetch endpoint answers with an HTML fragment whose first `tr` is a
//! header. Every later `tr` is one task; its element children are read by
//! position: 0 is the employee id (ignored), 1..=6 are name, description,
//! start date, end date, rating and remarks. Missing cells read as "".

use scraper::{ElementRef, Html};

use crate::models::TaskRow;

pub fn extract_rows(markup: &str) -> Vec<TaskRow> {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "tr")
        .skip(1)
        .map(|tr| {
            let cells: Vec<String> = tr.children().filter_map(ElementRef::wrap).map(cell_text).collect();
            let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
            TaskRow {
                employee_name: cell(1),
                task_description: cell(2),
                start_date: cell(3),
                end_date: cell(4),
                rating: cell(5),
                remarks: cell(6),
            }
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
