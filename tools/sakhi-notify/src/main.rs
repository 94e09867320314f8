//! SAKHI notification CLI.
//!
//! Drives a file-backed notification center from the command line: publish
//! notifications on behalf of a feature module, inspect the retained list and
//! manage read state. Uses the same snapshot format as the dashboard.

mod storage;

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sakhi_common::center::NotificationCenter;
use sakhi_common::display::{format_relative, format_unread_badge};
use sakhi_common::notification::{NewNotification, Notification, NotificationType, Priority};

use storage::{default_store_path, FileStorage};

#[derive(Parser)]
#[command(name = "sakhi-notify", about = "SAKHI notification store tool")]
struct Cli {
    /// Snapshot file (default: <data dir>/sakhi/notifications.json).
    #[arg(long, env = "SAKHI_NOTIFY_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish a new notification.
    Publish {
        /// One of user_registered, alert_created, alert_resolved,
        /// delivery_assigned, delivery_completed, stock_low, other.
        #[arg(long, value_parser = parse_kind, default_value = "other")]
        kind: NotificationType,
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        /// high, medium or low.
        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
        /// Dashboard path to open when the notification is clicked.
        #[arg(long)]
        action_url: Option<String>,
    },
    /// List retained notifications, newest first.
    List {
        /// Only show unread notifications.
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read.
    Read { id: String },
    /// Mark every notification as read.
    ReadAll,
    /// Print the unread count.
    Unread,
    /// Remove all notifications.
    Clear,
}

fn parse_kind(s: &str) -> Result<NotificationType, String> {
    NotificationType::parse(s).ok_or_else(|| format!("unknown notification type '{s}'"))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("unknown priority '{s}'"))
}

fn print_notification(n: &Notification) {
    let marker = if n.read { " " } else { "●" };
    let when = format_relative(n.timestamp, Utc::now());
    println!(
        "{marker} {}  {} {:<12} {:<6} {:>10}  {}: {}",
        n.id,
        n.kind.icon(),
        n.kind.label(),
        n.priority.as_str(),
        when,
        n.title,
        n.message
    );
    if let Some(url) = &n.action_url {
        println!("    -> {url}");
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.store.unwrap_or_else(default_store_path);
    tracing::debug!("Using notification store {}", path.display());
    let center = NotificationCenter::load(FileStorage::new(&path));

    match cli.command {
        Command::Publish {
            kind,
            title,
            message,
            priority,
            action_url,
        } => {
            let mut new = NewNotification::new(kind, title, message).with_priority(priority);
            if let Some(url) = action_url {
                new = new.with_action_url(url);
            }
            let n = center.publish(new);
            tracing::info!("Published {} ({} unread)", n.id, center.unread_count());
            println!("{}", n.id);
        }
        Command::List { unread } => {
            let list: Vec<_> = center
                .notifications()
                .into_iter()
                .filter(|n| !unread || !n.read)
                .collect();
            if list.is_empty() {
                println!("No notifications");
            }
            for n in &list {
                print_notification(n);
            }
        }
        Command::Read { id } => {
            if center.mark_as_read(&id) {
                println!("Marked {id} as read");
            } else if center.get(&id).is_some() {
                println!("{id} was already read");
            } else {
                bail!("no notification with id {id}");
            }
        }
        Command::ReadAll => {
            let flipped = center.mark_all_as_read();
            println!("Marked {flipped} notifications as read");
        }
        Command::Unread => {
            let count = center.unread_count();
            let badge = format_unread_badge(count);
            if badge.is_empty() {
                println!("0");
            } else {
                println!("{count} ({badge})");
            }
        }
        Command::Clear => {
            center.clear();
            println!("Cleared notifications in {}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
