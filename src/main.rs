mod cli;
mod client;
mod config;
mod controller;
mod editor;
mod error;
mod form;
mod logging;
mod markup;
mod models;
mod ui;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use client::HttpTaskService;
use config::Config;
use controller::{MutationOutcome, TaskController, FETCH_FAILED, NO_TASKS};
use form::NewTask;
use models::Popup;
use std::sync::Arc;
use ui::run_tui;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    logging::init(cli.log_file.as_deref(), interactive)?;

    let config = Config::from(cli.endpoints);
    log::debug!("Using config {config:?}");
    let service = Arc::new(HttpTaskService::new(&config));
    let mut controller = TaskController::new(config.employee_id.clone(), service);
    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Some(Commands::List) => {
            rt.block_on(controller.fetch_tasks());
            if let Popup::Message(message) = &controller.popup {
                bail!("{message}");
            }
            print_tasks(&controller);
        }
        Some(Commands::Add {
            employee_id,
            employee_name,
            task_description,
            start_date,
            end_date,
        }) => {
            let task = NewTask::new(
                &employee_id,
                &employee_name,
                &task_description,
                start_date.as_deref().unwrap_or_default(),
                end_date.as_deref().unwrap_or_default(),
            )?;
            let outcome = rt.block_on(controller.submit_add_task(&task));
            finish_mutation(&controller, outcome)?;
        }
        Some(Commands::Remove {
            employee_name,
            task_description,
        }) => {
            let outcome = rt.block_on(controller.remove_task(&employee_name, &task_description));
            finish_mutation(&controller, outcome)?;
        }
        Some(Commands::Completions { shell }) => {
            use clap_complete::{generate, Shell};
            let shell = shell.to_lowercase();
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "elvish" => Shell::Elvish,
                "powershell" => Shell::PowerShell,
                _ => {
                    println!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "emptask", &mut std::io::stdout());
        }
        Some(Commands::Tui) | None => {
            run_tui(controller, rt.handle().clone())?;
        }
    }

    Ok(())
}

fn finish_mutation(controller: &TaskController, outcome: MutationOutcome) -> Result<()> {
    match outcome {
        MutationOutcome::Failed(message) => bail!("{message}"),
        MutationOutcome::Applied { message, refreshed } => {
            println!("{message}");
            if !refreshed {
                bail!("{FETCH_FAILED}");
            }
            print_tasks(controller);
            Ok(())
        }
    }
}

fn print_tasks(controller: &TaskController) {
    if controller.no_tasks {
        println!("{NO_TASKS}");
        return;
    }
    for row in controller.rows() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            controller.employee_id(),
            row.employee_name,
            row.task_description,
            row.start_date,
            row.end_date,
            row.rating,
            row.remarks
        );
    }
}
