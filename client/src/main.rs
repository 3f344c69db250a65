use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use client::{ProfileApi, ProfileCache, types::Profile};

#[derive(Parser)]
#[command(author, version, about = "CLI for the single-profile backend")]
struct Args {
    /// Base URL of the profile backend.
    #[arg(long, default_value = "http://localhost:4000")]
    server: String,

    /// Path of the local profile cache file.
    #[arg(long)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the profile, or update it if this email already has one.
    Create {
        name: String,
        email: String,
        #[arg(long)]
        age: Option<i32>,
    },
    /// Show the profile; falls back to the cached copy when the server is
    /// unreachable.
    Show,
    /// Update fields of the existing profile.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        age: Option<i32>,
    },
    /// Delete the profile.
    Delete,
    /// Show how many records the store holds.
    Stats,
}

fn print_profile(profile: &Profile) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let api = ProfileApi::new(&args.server);
    let cache = ProfileCache::new(args.cache.unwrap_or_else(ProfileCache::default_path));

    match args.command {
        Command::Create { name, email, age } => {
            let profile = api.create_or_update(&name, &email, age).await?;
            cache.save(&profile)?;
            print_profile(&profile)?;
        }
        Command::Show => match api.get().await {
            Ok(Some(profile)) => {
                cache.save(&profile)?;
                print_profile(&profile)?;
            }
            Ok(None) => {
                cache.clear()?;
                println!("No profile stored.");
            }
            Err(err) => match cache.load() {
                Some(cached) => {
                    warn!("server unavailable, showing cached copy: {err}");
                    print_profile(&cached)?;
                }
                None => return Err(err),
            },
        },
        Command::Update { name, email, age } => {
            let profile = api
                .update(name.as_deref(), email.as_deref(), age)
                .await?;
            cache.save(&profile)?;
            print_profile(&profile)?;
        }
        Command::Delete => {
            if api.delete().await? {
                cache.clear()?;
                println!("Profile deleted.");
            } else {
                println!("No profile stored.");
            }
        }
        Command::Stats => {
            println!("{}", api.stats().await?);
        }
    }

    Ok(())
}
