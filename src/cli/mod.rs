//! Command-line surface of the console.
//!
//! Every command runs against a started [`Console`]: the persisted session
//! has been restored and, when a token exists, confirmed with the backend.

use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::app::Console;
use crate::models::{ReviewStatus, Task, TaskStats};
use crate::review::AutoReviewOptions;

/// Command-line interface of the KGE-Gen console
#[derive(Parser, Debug)]
#[command(name = "kgegen-console", version, about = "KGE-Gen dataset generation console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and persist the session
    Login {
        username: String,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// Show the current user
    Whoami,

    /// Change the current user's password
    ChangePassword {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,
    },

    /// Task list and lifecycle
    #[command(subcommand)]
    Tasks(TaskCommands),

    /// Review of generated items
    #[command(subcommand)]
    Review(ReviewCommands),

    /// Generation configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Account administration
    #[command(subcommand)]
    Users(UserCommands),

    /// Run the navigation guard for a route and print where it lands
    Open { path: String },
}

/// Task subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommands {
    /// List all tasks
    List,

    /// Show one task
    Show { id: String },

    /// Delete one or more tasks
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Poll the task list and print it on every tick
    Watch {
        /// Defaults to POLL_INTERVAL_MS
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Number of ticks to observe before exiting
        #[arg(long, default_value = "5")]
        ticks: u32,
    },

    /// Show task counters
    Stats,
}

/// Review subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ReviewCommands {
    /// Show review counters of a task
    Stats { task: String },

    /// Apply one status to several items
    Batch {
        task: String,
        status: ReviewStatus,
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Run the auto reviewer on several items
    Auto {
        task: String,
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long, default_value = "0.7")]
        threshold: f64,

        /// Do not approve items above the threshold
        #[arg(long)]
        no_approve: bool,

        /// Reject items below the threshold
        #[arg(long)]
        reject: bool,
    },

    /// Export reviewed items on the server
    Export {
        task: String,

        /// Only export items in these statuses
        #[arg(long = "status")]
        statuses: Vec<ReviewStatus>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Reset to defaults and save
    ResetSave,
}

/// Account subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// List accounts (admin)
    List,
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a console command.
pub async fn execute_command(command: Commands, console: &Console) -> CliResult {
    match command {
        Commands::Login { username, password } => execute_login(console, &username, password).await,
        Commands::Logout => match console.context.manager.logout().await {
            Ok(()) => CliResult::success("Logged out"),
            Err(e) => CliResult::error(format!("Logout incomplete: {}", e)),
        },
        Commands::Whoami => execute_whoami(console).await,
        Commands::ChangePassword { old, new } => {
            match console.context.manager.change_password(&old, &new).await {
                Ok(()) => CliResult::success("Password changed"),
                Err(e) => CliResult::error(format!("Password change failed: {}", e)),
            }
        }
        Commands::Tasks(command) => execute_tasks(console, command).await,
        Commands::Review(command) => execute_review(console, command).await,
        Commands::Config(command) => execute_config(console, command).await,
        Commands::Users(UserCommands::List) => execute_users(console).await,
        Commands::Open { path } => execute_open(console, &path).await,
    }
}

async fn execute_login(console: &Console, username: &str, password: Option<String>) -> CliResult {
    let password = match password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            if let Err(e) = std::io::stdin().read_line(&mut line) {
                return CliResult::error(format!("Failed to read password: {}", e));
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    match console.context.manager.login(username, &password).await {
        Ok(user) => CliResult::success(format!("Logged in as {} ({})", user.username, user.role)),
        Err(e) => CliResult::error(format!("Login failed: {}", e)),
    }
}

async fn execute_whoami(console: &Console) -> CliResult {
    let session = console.context.manager.snapshot().await;
    match session.user {
        Some(user) if session.token.is_some() => {
            let mut output = format!("{} ({})\n", user.username, user.role);
            output.push_str(&format!("  id:     {}\n", user.user_id));
            output.push_str(&format!("  active: {}\n", user.is_active));
            if let Some(email) = &user.email {
                output.push_str(&format!("  email:  {}\n", email));
            }
            if let Some(last_login) = user.last_login_at() {
                output.push_str(&format!("  last login: {}\n", last_login.to_rfc3339()));
            }
            CliResult::success(output)
        }
        _ => CliResult::error("Not logged in"),
    }
}

async fn execute_tasks(console: &Console, command: TaskCommands) -> CliResult {
    let store = &console.tasks;
    match command {
        TaskCommands::List => match store.refresh_list().await {
            Ok(Some(_)) => CliResult::success(format_task_table(&store.tasks().await)),
            Ok(None) => CliResult::error("Task list request was rejected"),
            Err(e) => CliResult::error(format!("Failed to load tasks: {}", e)),
        },
        TaskCommands::Show { id } => match store.refresh_one(&id).await {
            Some(task) => CliResult::success(format_task(&task)),
            None => CliResult::error(format!("Task {} could not be loaded", id)),
        },
        TaskCommands::Delete { ids } => {
            let report = store.delete_many(&ids).await;
            let mut output = format!("Deleted {} of {} task(s)\n", report.deleted.len(), ids.len());
            for id in &report.failed {
                output.push_str(&format!("  failed: {}\n", id));
            }
            if report.is_complete() {
                CliResult::success(output)
            } else {
                CliResult::error(output)
            }
        }
        TaskCommands::Watch { interval_ms, ticks } => {
            let interval = Duration::from_millis(
                interval_ms
                    .unwrap_or(console.config.polling.interval_ms)
                    .max(crate::config::MIN_POLL_INTERVAL_MS),
            );
            let _ = store.refresh_list().await;
            println!("{}", format_task_table(&store.tasks().await));

            let poller = store.start_polling(interval);
            for _ in 0..ticks {
                tokio::time::sleep(interval).await;
                println!("{}", format_task_table(&store.tasks().await));
            }
            poller.shutdown().await;
            CliResult::success(format!("Stopped after {} tick(s)", ticks))
        }
        TaskCommands::Stats => match store.stats().await {
            Ok(stats) => CliResult::success(format_task_stats(&stats)),
            Err(e) => CliResult::error(format!("Failed to load task stats: {}", e)),
        },
    }
}

async fn execute_review(console: &Console, command: ReviewCommands) -> CliResult {
    let workspace = &console.reviews;
    let task = match &command {
        ReviewCommands::Stats { task }
        | ReviewCommands::Batch { task, .. }
        | ReviewCommands::Auto { task, .. }
        | ReviewCommands::Export { task, .. } => task.clone(),
    };
    if let Err(e) = workspace.load(&task).await {
        return CliResult::error(format!("Failed to load review items of {}: {}", task, e));
    }

    let result = match command {
        ReviewCommands::Stats { .. } => workspace.stats().await.map(|stats| {
            format!(
                "total {} | pending {} | approved {} | rejected {} | modified {} | auto approved {} | auto rejected {}\nprogress {:.1}%",
                stats.total,
                stats.pending,
                stats.approved,
                stats.rejected,
                stats.modified,
                stats.auto_approved,
                stats.auto_rejected,
                stats.progress() * 100.0
            )
        }),
        ReviewCommands::Batch {
            status,
            ids,
            comment,
            ..
        } => workspace
            .batch_review(ids, status, comment)
            .await
            .map(|summary| match summary {
                Some(s) => format!("{} succeeded, {} failed", s.success_count, s.error_count),
                None => "Batch review applied".to_string(),
            }),
        ReviewCommands::Auto {
            ids,
            threshold,
            no_approve,
            reject,
            ..
        } => {
            let options = AutoReviewOptions {
                threshold,
                auto_approve: !no_approve,
                auto_reject: reject,
            };
            workspace
                .auto_review(ids, options)
                .await
                .map(|summary| match summary {
                    Some(s) => format!("{} reviewed, {} failed", s.success_count, s.error_count),
                    None => "Auto review finished".to_string(),
                })
        }
        ReviewCommands::Export { statuses, .. } => workspace
            .export(&statuses)
            .await
            .map(|ack| ack.message.unwrap_or_else(|| "Export finished".to_string())),
    };

    match result {
        Ok(message) => CliResult::success(message),
        Err(e) => CliResult::error(e.to_string()),
    }
}

async fn execute_config(console: &Console, command: ConfigCommands) -> CliResult {
    let store = &console.task_config;
    match command {
        ConfigCommands::Show => {
            store.load().await;
            match serde_json::to_string_pretty(&store.config().await) {
                Ok(json) => CliResult::success(json),
                Err(e) => CliResult::error(format!("Failed to render configuration: {}", e)),
            }
        }
        ConfigCommands::ResetSave => {
            store.reset().await;
            if store.save().await {
                CliResult::success("Configuration reset to defaults")
            } else {
                CliResult::error("Failed to save configuration")
            }
        }
    }
}

async fn execute_users(console: &Console) -> CliResult {
    match console.context.manager.list_users().await {
        Ok(users) => {
            let mut output = format!("{:<20} {:<10} {:<8} {}\n", "USERNAME", "ROLE", "ACTIVE", "EMAIL");
            for user in users {
                output.push_str(&format!(
                    "{:<20} {:<10} {:<8} {}\n",
                    user.username,
                    user.role.to_string(),
                    user.is_active.to_string(),
                    user.email.as_deref().unwrap_or("-")
                ));
            }
            CliResult::success(output)
        }
        Err(e) => CliResult::error(format!("Failed to list users: {}", e)),
    }
}

async fn execute_open(console: &Console, path: &str) -> CliResult {
    let destination = console.guard.navigate(path).await;
    let route = console.guard.routes().resolve(&destination);
    let title = route.document_title().unwrap_or_else(|| "KGE-Gen".to_string());
    CliResult::success(format!("{} ({})", destination, title))
}

fn format_task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks".to_string();
    }
    let mut output = format!("{:<38} {:<12} {:<20} {}\n", "ID", "STATUS", "CREATED", "NAME");
    for task in tasks {
        output.push_str(&format!(
            "{:<38} {:<12} {:<20} {}\n",
            task.task_id,
            task.status.to_string(),
            task.created_at,
            task.task_name
        ));
    }
    output
}

fn format_task(task: &Task) -> String {
    let mut output = format!("{} [{}]\n", task.task_name, task.status);
    output.push_str(&format!("  id:      {}\n", task.task_id));
    if let Some(description) = &task.task_description {
        output.push_str(&format!("  about:   {}\n", description));
    }
    output.push_str(&format!("  created: {}\n", task.created_at));
    for (name, path) in task.filenames.iter().zip(&task.filepaths) {
        output.push_str(&format!("  file:    {} ({})\n", name, path));
    }
    if let Some(qa_count) = task.qa_count {
        output.push_str(&format!("  qa:      {}\n", qa_count));
    }
    if let Some(error) = &task.error_message {
        output.push_str(&format!("  error:   {}\n", error));
    }
    output
}

fn format_task_stats(stats: &TaskStats) -> String {
    format!(
        "total {} | pending {} | processing {} | completed {} | failed {}",
        stats.total, stats.pending, stats.processing, stats.completed, stats.failed
    )
}
