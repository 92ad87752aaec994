//! Todo CLI
//!
//! Terminal front end for the task API. Every invocation rehydrates the session
//! from a token, loads the task collection into a `TaskStore`, and prints the
//! `FilterProjector` view or the store's error slot.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_tasks::{
    CreateTask, FilterProjector, HttpTaskRemote, TaskId, TaskPriority, TaskStats, TaskStore,
    parse_due_date,
};
use domain_users::{AuthClient, AuthUser, LoginUser, RegisterUser, SessionHandle, UserError};
use eyre::{Result, bail, eyre};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use validator::Validate;

mod config;
mod render;

use config::Config;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Manage your tasks from the terminal")]
struct Cli {
    /// Session token printed by `todo login` or `todo register`
    #[arg(long, env = "TODO_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and print its session token
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
    },

    /// Sign in and print the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in user
    Whoami,

    /// List tasks, optionally filtered
    List {
        /// Case-insensitive text to look for in title or description
        #[arg(short, long, default_value = "")]
        query: String,

        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        status: String,

        /// all, low, medium or high
        #[arg(short, long, default_value = "all")]
        priority: String,
    },

    /// Show task counts
    Stats,

    /// Add a task
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: TaskPriority,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDate>,
    },

    /// Flip a task between active and completed
    Toggle { id: String },

    /// Delete a task
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_due(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_due_date(value).ok_or_else(|| format!("expected YYYY-MM-DD, got `{}`", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    config.check();

    let cli = Cli::parse();

    let session = SessionHandle::new();
    let auth = AuthClient::new(config.api.clone(), session.clone())?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let user = auth
                .register(RegisterUser {
                    name,
                    email,
                    password,
                    confirm_password,
                })
                .await?;
            info!(user_id = %user.id, "Registered");
            print_token(&session)?;
        }

        Commands::Login { email, password } => {
            let user = auth.login(LoginUser { email, password }).await?;
            info!(user_id = %user.id, "Logged in");
            print_token(&session)?;
        }

        Commands::Whoami => {
            let user = resume(&auth, cli.token).await?;
            println!("{}", render::format_user(&user));
        }

        command => {
            resume(&auth, cli.token).await?;
            let remote = HttpTaskRemote::new(config.api.clone(), session.clone())?;
            let store = TaskStore::new(remote);

            let result = run_task_command(&store, command).await;
            auth.logout();
            store.clear();
            result?;
        }
    }

    Ok(())
}

async fn resume(auth: &AuthClient, token: Option<String>) -> Result<AuthUser> {
    let token = token.ok_or_else(|| eyre!("Not logged in: pass --token or set TODO_TOKEN"))?;
    auth.resume(token).await.map_err(resume_failure)
}

/// Only a rejected token means the session expired; anything else is reported as is
fn resume_failure(err: UserError) -> eyre::Report {
    match err {
        UserError::Unauthorized => eyre!("Session expired, log in again"),
        other => eyre::Report::new(other).wrap_err("Could not restore the session"),
    }
}

fn print_token(session: &SessionHandle) -> Result<()> {
    let current = session
        .current()
        .ok_or_else(|| eyre!("No session after authentication"))?;
    println!("{}", current.token());
    Ok(())
}

async fn run_task_command(store: &TaskStore<HttpTaskRemote>, command: Commands) -> Result<()> {
    match command {
        Commands::List {
            query,
            status,
            priority,
        } => {
            let mut projector = FilterProjector::new(store.subscribe());
            projector.set_query(query);
            projector.set_status_str(&status)?;
            projector.set_priority_str(&priority)?;

            load(store).await?;

            let summary = projector.is_filtered().then(|| projector.summary());
            println!("{}", render::format_task_list(&projector.visible(), summary));
        }

        Commands::Stats => {
            load(store).await?;
            let stats = TaskStats::from_tasks(&store.tasks(), Local::now().date_naive());
            println!("{}", render::format_stats(&stats));
        }

        Commands::Add {
            title,
            description,
            priority,
            due,
        } => {
            let mut input = CreateTask::new(title)
                .with_priority(priority)
                .with_due_date(due);
            if let Some(description) = description {
                input = input.with_description(description);
            }
            input.validate()?;

            match store.add_task(input).await {
                Some(task) => println!("Added {}", render::format_task(&task)),
                None => return Err(store_failure(store)),
            }
        }

        Commands::Toggle { id } => {
            load(store).await?;
            let id = TaskId::new(id);
            let task = store
                .get(&id)
                .ok_or_else(|| eyre!("No task with id {}", id))?;

            match store.toggle_complete(&id, task.completed).await {
                Some(task) => println!("{}", render::format_task(&task)),
                None => return Err(store_failure(store)),
            }
        }

        Commands::Delete { id, yes } => {
            load(store).await?;
            let id = TaskId::new(id);
            let task = store
                .get(&id)
                .ok_or_else(|| eyre!("No task with id {}", id))?;

            if !yes && !confirm(&format!("Delete \"{}\"?", task.title)).await? {
                println!("Cancelled");
                return Ok(());
            }

            if !store.delete_task(&id).await {
                return Err(store_failure(store));
            }
            println!("Deleted \"{}\"", task.title);
        }

        Commands::Register { .. } | Commands::Login { .. } | Commands::Whoami => {
            bail!("not a task command")
        }
    }

    Ok(())
}

async fn load(store: &TaskStore<HttpTaskRemote>) -> Result<()> {
    if store.load().await {
        Ok(())
    } else {
        Err(store_failure(store))
    }
}

fn store_failure(store: &TaskStore<HttpTaskRemote>) -> eyre::Report {
    match store.error() {
        Some(err) => eyre!(render::format_store_error(&err)),
        None => eyre!("Operation was not applied"),
    }
}

async fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{} Are you sure you want to delete this task? [y/N] ", prompt).as_bytes())
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
