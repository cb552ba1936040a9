use std::io::{self, BufRead, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use launchdeck::api::client::{format_sol, ApiClient};
use launchdeck::api::links::parse_status_id;
use launchdeck::config::Config;
use launchdeck::deploy::http::HttpDeployer;
use launchdeck::deploy::traits::{DeployRequest, Deployer};
use launchdeck::feed::events::{self, FeedEvent};
use launchdeck::feed::model::Post;
use launchdeck::feed::rules::NotificationRules;
use launchdeck::feed::store::PostCollection;
use launchdeck::feed::transport::{FeedTransport, TransportConfig};
use launchdeck::output::terminal;
use launchdeck::token::identifier::derive_token_identifier;
use launchdeck::token::ticker::TickerMode;

/// launchdeck: watch a live social feed and launch tokens from what you see.
#[derive(Parser)]
#[command(name = "launchdeck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a token name and symbol from text
    Derive {
        /// The selected text
        text: String,

        /// Ticker mode: "Selected Text", "Abbreviation", "First Word" or "Custom"
        #[arg(long)]
        mode: Option<TickerMode>,
    },

    /// Normalize feed events from a file (or stdin) and print the posts
    Normalize {
        /// JSON file with one envelope, an array, or one envelope per line
        file: Option<PathBuf>,

        /// Print normalized posts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect to the live feed and print posts as they arrive
    Watch,

    /// Look up a single post by link or status id
    Lookup {
        /// x.com / twitter.com status link, or a bare id
        link: String,

        /// Print the normalized post as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the SOL balance of a public key
    Balance {
        public_key: String,
    },

    /// Import a private key and print the composite key for DEPLOY_WALLETS
    ImportWallet {
        /// Private key (read from stdin when omitted, to keep it out of shell history)
        #[arg(long)]
        key: Option<String>,
    },

    /// Deploy a token named after some text or a post
    Deploy {
        /// Text to derive the token from (defaults to the post's text with --from)
        text: Option<String>,

        /// Derive from a post instead: status link or id
        #[arg(long = "from")]
        from_status: Option<String>,

        /// Ticker mode (defaults to TICKER_MODE)
        #[arg(long)]
        mode: Option<TickerMode>,

        /// Token image URL (defaults to the post's first image or avatar)
        #[arg(long)]
        image: Option<String>,

        /// Initial buy in SOL (defaults to DEPLOY_AMOUNT)
        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        website: Option<String>,

        #[arg(long)]
        twitter: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("launchdeck=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Derive { text, mode } => {
            let config = Config::load()?;
            let mode = mode.unwrap_or(config.ticker_mode);
            let identifier = derive_token_identifier(&text, mode, &config.name_affixes)?;
            terminal::display_identifier(&identifier, mode.as_str());
        }

        Commands::Normalize { file, json } => {
            let config = Config::load()?;
            let rules = config.notification_rules()?;
            let raw = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };

            let events = read_events(&raw, &rules)?;
            info!(events = events.len(), "Normalized feed events");

            let posts: Vec<Post> = events.into_iter().flat_map(event_posts).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                for post in &posts {
                    terminal::display_post(post);
                }
            }
        }

        Commands::Watch => {
            let config = Config::load()?;
            config.require_feed()?;
            let rules = config.notification_rules()?;
            watch(&config, rules).await?;
        }

        Commands::Lookup { link, json } => {
            let config = Config::load()?;
            let rules = config.notification_rules()?;
            let post = lookup(&config, &link, &rules).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                terminal::display_post(&post);
            }
        }

        Commands::Balance { public_key } => {
            let config = Config::load()?;
            let api = ApiClient::from_config(&config)?;
            let lamports = api.balance(&public_key).await?;
            println!("{} {}", public_key.dimmed(), format_sol(lamports).bold());
        }

        Commands::ImportWallet { key } => {
            let config = Config::load()?;
            let key = match key {
                Some(key) => key,
                None => {
                    eprintln!("Paste the private key and press enter:");
                    let mut line = String::new();
                    io::stdin()
                        .lock()
                        .read_line(&mut line)
                        .context("Failed to read private key from stdin")?;
                    line
                }
            };
            let api = ApiClient::from_config(&config)?;
            let composite = api.import_wallet(&key).await?;
            println!("{composite}");
            println!(
                "{}",
                "Add this to DEPLOY_WALLETS in your .env file (comma-separated).".dimmed()
            );
        }

        Commands::Deploy {
            text,
            from_status,
            mode,
            image,
            amount,
            website,
            twitter,
            dry_run,
        } => {
            let config = Config::load()?;
            let rules = config.notification_rules()?;

            let source_post = match &from_status {
                Some(link) => Some(lookup(&config, link, &rules).await?),
                None => None,
            };

            let text = match (text, &source_post) {
                (Some(text), _) => text,
                (None, Some(post)) => deploy_text(post),
                (None, None) => anyhow::bail!("Give the text to deploy, or a post with --from"),
            };
            if text.trim().is_empty() {
                anyhow::bail!("Selected text is empty, nothing to name the token after");
            }

            let mode = mode.unwrap_or(config.ticker_mode);
            let identifier = derive_token_identifier(&text, mode, &config.name_affixes)?;

            let image = image
                .or_else(|| {
                    source_post
                        .as_ref()
                        .and_then(|p| p.preferred_image().map(String::from))
                })
                .context("No token image. Pass --image or deploy from a post with media.")?;

            let mut request = DeployRequest::new(
                &config.deploy_platform,
                identifier,
                &image,
                amount.unwrap_or(config.deploy_amount),
                config.deploy_wallets.clone(),
            );
            request.website = website;
            request.twitter = twitter.or_else(|| source_post.as_ref().and_then(Post::external_url));

            terminal::display_deploy_request(&request);

            if dry_run {
                request.validate()?;
                println!("\n{}", serde_json::to_string_pretty(&request)?);
                return Ok(());
            }

            config.require_wallets()?;
            let deployer = HttpDeployer::new(&config.deploy_api_url)?;
            let result = deployer.deploy(&request).await?;
            terminal::display_deploy_result(&result);
        }
    }

    Ok(())
}

/// Subscribe to the feed and apply events to a local collection until ctrl-c.
async fn watch(config: &Config, rules: NotificationRules) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::channel::<FeedEvent>(256);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    info!(highlight_rules = rules.len(), "Starting feed watch");
    let transport = FeedTransport::new(
        TransportConfig::new(&config.feed_url, config.feed_token.clone()),
        rules,
    );
    let transport_task = tokio::spawn(transport.run(events_tx, shutdown_rx));

    let mut posts = PostCollection::new(config.purge_delay);
    println!("{}", "Watching feed (ctrl-c to stop)...".bold());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping feed watch");
                break;
            }
            event = events_rx.recv() => {
                let Some(event) = event else {
                    warn!("Feed transport ended");
                    break;
                };
                print_event(&event);
                posts.apply(event).await;
            }
        }
    }

    let _ = shutdown_tx.send(()).await;
    posts.shutdown();
    transport_task.await.context("Feed transport task panicked")??;

    println!("{} posts in view at exit", posts.len().await);
    Ok(())
}

fn print_event(event: &FeedEvent) {
    match event {
        FeedEvent::Post(post) | FeedEvent::Follow(post) | FeedEvent::Unfollow(post) => {
            terminal::display_post(post)
        }
        FeedEvent::InitialBatch(batch) => {
            println!("{}", format!("Loaded {} recent posts", batch.len()).dimmed());
            for post in batch {
                terminal::display_post(post);
            }
        }
        FeedEvent::Delete(id) => println!("{}", format!("Deleted {id}").dimmed()),
        FeedEvent::Deactivation { notice, .. } => terminal::display_post(notice),
        FeedEvent::Unknown(_) => {}
    }
}

async fn lookup(config: &Config, link: &str, rules: &NotificationRules) -> Result<Post> {
    let status_id = parse_status_id(link)
        .with_context(|| format!("Not a status link or id: {link}"))?;
    let api = ApiClient::from_config(config)?;
    api.lookup_tweet(&status_id, rules).await
}

/// Text to name a token after: the post's own text, or the original's for
/// a pure retweet.
fn deploy_text(post: &Post) -> String {
    if post.body_text.trim().is_empty() {
        if let Some(embedded) = &post.embedded_post {
            return embedded.body_text.clone();
        }
    }
    post.body_text.clone()
}

/// Parse a file of events: one envelope, a JSON array, or JSON lines.
/// Anything without an event name is treated as a bare `tweet` payload.
fn read_events(raw: &str, rules: &NotificationRules) -> Result<Vec<FeedEvent>> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(match value {
            Value::Array(items) => items.iter().map(|v| event_from_value(v, rules)).collect(),
            other => vec![event_from_value(&other, rules)],
        });
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Value>(line)
                .with_context(|| format!("Line {} is not valid JSON", i + 1))
                .map(|v| event_from_value(&v, rules))
        })
        .collect()
}

fn event_from_value(value: &Value, rules: &NotificationRules) -> FeedEvent {
    let name = value.get("event").and_then(Value::as_str);
    let data = value.get("data").or_else(|| value.get("payload"));
    match (name, data) {
        (Some(name), Some(data)) => events::from_named(name, data, rules),
        (Some(name), None) => events::from_named(name, &Value::Null, rules),
        _ => events::from_named("tweet", value, rules),
    }
}

fn event_posts(event: FeedEvent) -> Vec<Post> {
    match event {
        FeedEvent::Post(post) | FeedEvent::Follow(post) | FeedEvent::Unfollow(post) => vec![post],
        FeedEvent::InitialBatch(batch) => batch,
        FeedEvent::Deactivation { notice, .. } => vec![notice],
        FeedEvent::Delete(_) | FeedEvent::Unknown(_) => Vec::new(),
    }
}
