use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpTaskStore, ListController, ListError, ListEvent, ListView};
use shared::domain::{Filter, Task, TaskId};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Ordered task list backed by a remote /todos store")]
struct Cli {
    /// Overrides the configured store url.
    #[arg(long)]
    store_url: Option<String>,
    /// Which tasks to show and which view reorder indices refer to.
    #[arg(long, default_value = "all")]
    filter: Filter,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Toggle {
        id: String,
    },
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Delete {
        id: String,
    },
    ClearCompleted,
    /// Moves the task at position FROM of the filtered view to position TO.
    Reorder {
        from: usize,
        to: usize,
    },
    /// Shows a single task.
    Show {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(store_url) = cli.store_url {
        settings.store_url = store_url;
    }

    let env_filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let store = HttpTaskStore::new(&settings.store_url)
        .with_context(|| format!("failed to configure store at '{}'", settings.store_url))?;
    info!(store_url = %store.base_url(), "using task store");

    let controller = ListController::new(Arc::new(store));
    let mut events = controller.subscribe();
    controller.set_filter(cli.filter).await;

    let outcome = run(&controller, cli.command).await;
    print_notices(&mut events);

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(controller: &ListController, command: Command) -> Result<(), ListError> {
    if let Command::Show { id } = command {
        let id = TaskId::new(id);
        match controller.fetch_task(&id).await? {
            Some(task) => println!("{}", render_detail(&task)),
            None => println!("Todo not found: {id}"),
        }
        return Ok(());
    }

    controller.load().await?;
    match command {
        Command::List | Command::Show { .. } => {}
        Command::Add { text } => {
            controller.set_pending_input(text.join(" ")).await;
            controller.add().await?;
        }
        Command::Toggle { id } => {
            if controller.toggle(&TaskId::new(id.clone())).await?.is_none() {
                eprintln!("no task with id {id}");
            }
        }
        Command::Edit { id, text } => {
            if controller
                .edit_text(&TaskId::new(id.clone()), text.join(" "))
                .await?
                .is_none()
            {
                eprintln!("no task with id {id}");
            }
        }
        Command::Delete { id } => controller.delete(&TaskId::new(id)).await?,
        Command::ClearCompleted => {
            controller.clear_completed().await?;
        }
        Command::Reorder { from, to } => controller.reorder(from, to).await?,
    }

    print!("{}", render(&controller.snapshot().await));
    Ok(())
}

fn print_notices(events: &mut broadcast::Receiver<ListEvent>) {
    while let Ok(event) = events.try_recv() {
        if let ListEvent::Notice(notice) = event {
            if notice.is_error() {
                eprintln!("Error: {}", notice.message);
            } else {
                eprintln!("{}", notice.message);
            }
        }
    }
}

fn render(view: &ListView) -> String {
    let mut out = format!("{} ({} shown)\n", view.filter, view.tasks.len());
    for (index, task) in view.tasks.iter().enumerate() {
        let mark = if task.completed { 'x' } else { ' ' };
        out.push_str(&format!(
            "{index:>3}. [{mark}] {}  ({}, #{})\n",
            task.text, task.id, task.order
        ));
    }
    out
}

fn render_detail(task: &Task) -> String {
    let status = if task.completed { "completed" } else { "active" };
    format!(
        "id:     {}\ntext:   {}\nstatus: {status}\norder:  {}",
        task.id, task.text, task.order
    )
}
