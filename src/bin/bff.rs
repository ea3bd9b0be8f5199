// Command-line front end for the BFF data client.
// Prints every answer as pretty JSON together with where it came from.

use anyhow::{Context, Result};
use bff_client::config::{self, CliArgs};
use bff_client::{BffClient, HospitalFilter};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bff", version, about = "Breast Friend Forever data client")]
struct Cli {
    #[command(flatten)]
    client: CliArgs,

    /// Print the resolved configuration before running
    #[arg(long)]
    show_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe backend reachability
    Health {
        /// Keep probing at the health interval until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Send a message to the chat assistant
    Chat { text: String },
    /// Fetch the chat greeting
    Greeting,
    /// List hospitals, optionally filtered
    Hospitals {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// List educational resources
    Resources,
    /// List community encouragement messages
    Encouragement,
    /// Share an encouragement message
    PostEncouragement {
        text: String,
        /// Message category
        #[arg(long = "kind")]
        kind: Option<String>,
    },
    /// Self-exam guide steps
    SelfExam,
    /// Mobile feature descriptor
    Features,
    /// Offline cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Drop every entry of the current cache generation
    Clear,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::load(cli.client).context("Failed to load configuration")?;
    if cli.show_config {
        cfg.print_summary();
    }

    let client = BffClient::open_persistent(cfg)
        .await
        .context("Failed to start client")?;

    match cli.command {
        Command::Health { watch: false } => {
            let healthy = client.check_health().await;
            print_json(&serde_json::json!({
                "healthy": healthy,
                "last_checked": client.connectivity().last_checked,
            }))?;
        }
        Command::Health { watch: true } => {
            let interval = Duration::from_millis(client.config().health_interval_ms);
            tokio::select! {
                _ = client.health().run_periodic(interval) => {}
                _ = tokio::signal::ctrl_c() => log::info!("👋 stopping health watch"),
            }
        }
        Command::Chat { text } => print_json(&client.send_chat_message(&text).await?)?,
        Command::Greeting => print_json(&client.get_chat_greeting().await?)?,
        Command::Hospitals { city, state } => {
            let filter = HospitalFilter { city, state };
            print_json(&client.get_hospitals(&filter).await?)?
        }
        Command::Resources => print_json(&client.get_resources().await?)?,
        Command::Encouragement => print_json(&client.get_encouragement().await?)?,
        Command::PostEncouragement { text, kind } => {
            print_json(&client.post_encouragement(&text, kind.as_deref()).await?)?
        }
        Command::SelfExam => print_json(&client.get_self_exam_steps().await?)?,
        Command::Features => print_json(&client.get_mobile_features().await?)?,
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            let removed = client.cache().invalidate_all().await?;
            print_json(&serde_json::json!({
                "namespace": client.cache().namespace(),
                "removed": removed,
            }))?;
        }
    }

    Ok(())
}
