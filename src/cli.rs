use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_ADD_URL, DEFAULT_EMPLOYEE_ID, DEFAULT_FETCH_URL, DEFAULT_REMOVE_URL};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Write log output to this file (the TUI discards logs otherwise)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// Employee whose tasks are shown
    #[arg(long, global = true, env = "EMPTASK_EMPLOYEE_ID", default_value = DEFAULT_EMPLOYEE_ID)]
    pub employee_id: String,

    /// Task list endpoint
    #[arg(long, global = true, env = "EMPTASK_FETCH_URL", default_value = DEFAULT_FETCH_URL)]
    pub fetch_url: String,

    /// Add-task endpoint
    #[arg(long, global = true, env = "EMPTASK_ADD_URL", default_value = DEFAULT_ADD_URL)]
    pub add_url: String,

    /// Remove-task endpoint
    #[arg(long, global = true, env = "EMPTASK_REMOVE_URL", default_value = DEFAULT_REMOVE_URL)]
    pub remove_url: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch TUI interface
    Tui,
    /// Print the employee's tasks
    List,
    /// Add a task
    Add {
        /// Employee ID sent with the task
        #[arg(long = "id", value_name = "EMPLOYEE_ID")]
        employee_id: String,
        /// Employee name
        #[arg(long = "name", value_name = "NAME")]
        employee_name: String,
        /// Task description
        #[arg(long = "task", value_name = "DESCRIPTION")]
        task_description: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long = "start", value_name = "DATE")]
        start_date: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long = "end", value_name = "DATE")]
        end_date: Option<String>,
    },
    /// Remove a task by employee name and description
    Remove {
        #[arg(value_name = "NAME")]
        employee_name: String,
        #[arg(value_name = "DESCRIPTION")]
        task_description: String,
    },
    /// Print shell completions
    Completions {
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}
