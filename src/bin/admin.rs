//! CLI administration tool for shortener-service.
//!
//! Runs the same orchestrator as the HTTP service against the configured store
//! and event transport, so records created here emit the same events.
//!
//! # Usage
//!
//! ```bash
//! # Create a short URL that expires in one hour
//! cargo run --bin admin -- shorten https://example.com --ttl-seconds 3600
//!
//! # Look up a short code
//! cargo run --bin admin -- get 3f9a1c0e
//!
//! # Delete a short code (asks for confirmation)
//! cargo run --bin admin -- delete 3f9a1c0e
//!
//! # Check store and event transport connectivity
//! cargo run --bin admin -- check
//! ```
//!
//! # Environment Variables
//!
//! Same as the service; see [`shortener_service::config`].

use shortener_service::config;
use shortener_service::domain::entities::UrlRecord;
use shortener_service::server::{Components, build_components, drain_event_worker};

use anyhow::Result;
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::time::Duration;

/// CLI tool for managing short URLs.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short URL
    Shorten {
        /// URL to shorten
        url: String,

        /// Lifetime in seconds (0 = never expires)
        #[arg(short, long, default_value_t = 0)]
        ttl_seconds: i64,
    },

    /// Show the original URL for a short code
    Get {
        code: String,
    },

    /// Delete a short code
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Check store and event transport connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let Components {
        url_service,
        publisher,
        event_notifier,
        event_worker,
    } = build_components(&config).await?;

    let result = match cli.command {
        Commands::Shorten { url, ttl_seconds } => {
            println!("{}", "🔗 Shorten URL".bright_blue().bold());
            println!();

            let ttl = TimeDelta::try_seconds(ttl_seconds)
                .ok_or_else(|| anyhow::anyhow!("ttl-seconds is out of range"))?;

            match url_service.save(UrlRecord::new(url), ttl).await {
                Ok(record) => {
                    println!("  Code: {}", record.short_code.bright_yellow().bold());
                    println!("  URL:  {}", record.original_url.cyan());
                    if ttl_seconds > 0 {
                        println!("  TTL:  {}s", ttl_seconds.to_string().bright_black());
                    } else {
                        println!("  TTL:  {}", "never expires".bright_black());
                    }
                    println!();
                    println!("{}", "✅ Short URL created".green().bold());
                    Ok(())
                }
                Err(e) => Err(anyhow::anyhow!("Failed to create short URL: {}", e)),
            }
        }
        Commands::Get { code } => match url_service.get(&code).await {
            Ok(record) => {
                println!("  {} → {}", code.bright_yellow(), record.original_url.cyan());
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("Lookup failed: {}", e)),
        },
        Commands::Delete { code, yes } => {
            println!("{}", "🗑  Delete Short URL".bright_blue().bold());
            println!();
            println!("  Code: {}", code.bright_yellow());
            println!();

            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Delete this short URL?")
                    .default(false)
                    .interact()?;

            if confirmed {
                match url_service.delete(&code).await {
                    Ok(()) => {
                        println!("{}", "✅ Short URL deleted".green().bold());
                        Ok(())
                    }
                    Err(e) => Err(anyhow::anyhow!("Failed to delete short URL: {}", e)),
                }
            } else {
                println!("{}", "❌ Cancelled".red());
                Ok(())
            }
        }
        Commands::Check => {
            println!("{}", "🔍 Checking connectivity...".bright_blue());
            println!();

            let store_ok = url_service.store_healthy().await;
            let transport_ok = publisher.health_check().await;

            print_check("Store", store_ok);
            print_check("Event transport", transport_ok);
            println!();

            if store_ok && transport_ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("One or more components are unreachable"))
            }
        }
    };

    // Flush events emitted by this command before exiting
    drop(url_service);
    drop(event_notifier);
    drain_event_worker(
        event_worker,
        Duration::from_millis(config.event_publish_timeout_ms) + Duration::from_secs(1),
    )
    .await;

    result
}

fn print_check(name: &str, ok: bool) {
    if ok {
        println!("  {:<16} {}", name, "OK".green().bold());
    } else {
        println!("  {:<16} {}", name, "FAILED".red().bold());
    }
}
