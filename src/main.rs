use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use lifelink_notify::api::ApiClient;
use lifelink_notify::config;
use lifelink_notify::models::notification::{
    FetchParams, NewNotification, Notification, SortDirection, SortField,
};
use lifelink_notify::sync::NotificationSync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lifelink_notify=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let api = ApiClient::new(cfg.api_url.clone(), cfg.api_token.clone())?;
    let sync = NotificationSync::new(api, cfg.poll_interval);

    match args.command {
        cli::Commands::Watch { interval } => {
            let interval = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(cfg.poll_interval);
            let token = cfg.require_token()?;
            let sync = NotificationSync::new(
                ApiClient::new(cfg.api_url.clone(), None)?,
                interval,
            );
            run_watch(&sync, token, interval).await
        }
        cli::Commands::List {
            unread_only,
            kind,
            limit,
            sort,
            desc,
        } => {
            let params = FetchParams {
                unread_only: unread_only.then_some(true),
                kind,
                limit,
            };
            let field = parse_sort_field(&sort)?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            refresh_or_bail(&sync, params).await?;
            print_notifications(&sync.sorted(field, direction));
            println!("\n{} unread", sync.unread_count());
            Ok(())
        }
        cli::Commands::Read { id } => {
            refresh_or_bail(&sync, FetchParams::default()).await?;
            sync.mark_as_read(&id)
                .await
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("failed to mark {id} as read"))?;
            println!("Marked {id} as read. {} unread.", sync.unread_count());
            Ok(())
        }
        cli::Commands::ReadAll => {
            refresh_or_bail(&sync, FetchParams::default()).await?;
            sync.mark_all_as_read().await.map_err(anyhow::Error::msg)?;
            println!("All notifications marked as read.");
            Ok(())
        }
        cli::Commands::Delete { id } => {
            refresh_or_bail(&sync, FetchParams::default()).await?;
            sync.delete(&id)
                .await
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("failed to delete {id}"))?;
            println!("Deleted {id}.");
            Ok(())
        }
        cli::Commands::Clear => {
            sync.clear_all().await.map_err(anyhow::Error::msg)?;
            println!("All notifications deleted.");
            Ok(())
        }
        cli::Commands::Create { kind, title, body } => {
            let created = sync
                .create(NewNotification { kind, title, body })
                .await
                .map_err(anyhow::Error::msg)?;
            println!("Notification created:\n  ID:   {}\n  Type: {}", created.id, created.kind);
            Ok(())
        }
        cli::Commands::Stats => {
            refresh_or_bail(&sync, FetchParams::default()).await?;
            let stats = sync.stats();
            println!("Total:  {}", stats.total);
            println!("Unread: {}", stats.unread);
            println!("Read:   {}", stats.read);
            println!("Today:  {}", stats.today);
            if !stats.by_kind.is_empty() {
                println!("By type:");
                for (kind, count) in &stats.by_kind {
                    println!("  {:<16} {}", kind, count);
                }
            }
            Ok(())
        }
        cli::Commands::Settings { command } => match command {
            cli::SettingsCommands::Get => {
                let settings = sync.settings().await.map_err(anyhow::Error::msg)?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
                Ok(())
            }
            cli::SettingsCommands::Set { json } => {
                let value: serde_json::Value =
                    serde_json::from_str(&json).context("settings must be valid JSON")?;
                let updated = sync.update_settings(value).await.map_err(anyhow::Error::msg)?;
                println!("Settings updated.");
                if !updated.is_null() {
                    println!("{}", serde_json::to_string_pretty(&updated)?);
                }
                Ok(())
            }
        },
    }
}

async fn run_watch(sync: &NotificationSync, token: String, interval: Duration) -> anyhow::Result<()> {
    if let Err(e) = sync.login(token).await {
        // Fail soft: the poller is already retrying on its own schedule.
        tracing::warn!(error = %e, "initial fetch failed; polling will retry");
    }
    println!(
        "Watching notifications every {}s ({} unread). Ctrl-C to stop.",
        interval.as_secs(),
        sync.unread_count()
    );

    let mut seen: HashSet<String> = sync.notifications().iter().map(|n| n.id.clone()).collect();
    let mut last_unread = sync.unread_count();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                for n in sync.notifications() {
                    if seen.insert(n.id.clone()) {
                        println!(
                            "[{}] {:<10} {}",
                            n.created_at.format("%H:%M:%S"),
                            n.kind,
                            n.title.as_deref().unwrap_or("(no title)")
                        );
                    }
                }
                let unread = sync.unread_count();
                if unread != last_unread {
                    println!("  {} unread", unread);
                    last_unread = unread;
                }
                if let Some(e) = sync.last_error() {
                    tracing::debug!(error = %e, "last poll reported an error");
                }
            }
        }
    }

    sync.logout();
    println!("Stopped.");
    Ok(())
}

async fn refresh_or_bail(sync: &NotificationSync, params: FetchParams) -> anyhow::Result<()> {
    sync.refresh(params)
        .await
        .map_err(anyhow::Error::msg)
        .context("failed to fetch notifications")
}

fn parse_sort_field(raw: &str) -> anyhow::Result<SortField> {
    match raw {
        "created-at" => Ok(SortField::CreatedAt),
        "kind" | "type" => Ok(SortField::Kind),
        "read" => Ok(SortField::Read),
        other => anyhow::bail!("invalid sort key: {}. Must be created-at, kind, or read", other),
    }
}

fn print_notifications(list: &[Notification]) {
    if list.is_empty() {
        println!("No notifications.");
        return;
    }
    println!("{:<26} {:<10} {:<7} {:<21} TITLE", "ID", "TYPE", "READ", "CREATED");
    for n in list {
        println!(
            "{:<26} {:<10} {:<7} {:<21} {}",
            n.id,
            n.kind,
            if n.read { "yes" } else { "no" },
            n.created_at.format("%Y-%m-%d %H:%M:%S"),
            n.title.as_deref().unwrap_or("-")
        );
    }
}
