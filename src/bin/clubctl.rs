//! clubctl: command-line client for the club functions.
//!
//! Reads CLUBHUB_URL, CLUBHUB_API_KEY, CLUBHUB_ACCESS_TOKEN and CLUBHUB_USER_ID
//! (a .env file is honoured) and prints every response as JSON.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use clubhub_api::{
    client::{ClubClient, Session},
    models::{app::ToggleClubAppRequest, club::ProvisionClubRequest},
};

#[derive(Parser)]
#[command(name = "clubctl", about = "Provision clubs and manage their apps")]
struct Cli {
    /// Base URL of the deployment
    #[arg(long, env = "CLUBHUB_URL")]
    url: String,

    /// Public API key sent as the `apikey` header
    #[arg(long, env = "CLUBHUB_API_KEY", default_value = "")]
    api_key: String,

    /// Access token of the signed-in user
    #[arg(long, env = "CLUBHUB_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// User ID matching the access token (needed by `clubs`)
    #[arg(long, env = "CLUBHUB_USER_ID")]
    user_id: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a club with its owner and storage bucket (super-admins only)
    Provision {
        /// Display name of the club
        name: String,
        /// Email of the club owner
        owner_email: String,
        /// trialing, active, past_due or canceled
        #[arg(long)]
        status: Option<String>,
    },
    /// Enable or disable an app for a club (club owners only)
    Toggle {
        club_id: Uuid,
        /// academy, members, profiles, fin or saas
        app_type: String,
        #[arg(action = ArgAction::Set)]
        enabled: bool,
        /// JSON object merged into the app settings
        #[arg(long)]
        settings: Option<String>,
    },
    /// Storage and app usage for a club
    Usage { club_id: Uuid },
    /// Clubs the current user belongs to
    Clubs,
    /// App entitlements of a club
    Apps { club_id: Uuid },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut client = ClubClient::new(&cli.url, &cli.api_key);
    if let Some(access_token) = cli.access_token {
        // Function calls only need the token; listings also need the user ID
        client.set_session(Some(Session {
            access_token,
            user_id: cli.user_id.unwrap_or_else(Uuid::nil),
        }));
    }

    match cli.command {
        Commands::Provision {
            name,
            owner_email,
            status,
        } => {
            let response = client
                .provision_club(&ProvisionClubRequest {
                    club_name: Some(name),
                    owner_email: Some(owner_email),
                    subscription_status: status,
                })
                .await?;
            print_json(&response)?;
        }
        Commands::Toggle {
            club_id,
            app_type,
            enabled,
            settings,
        } => {
            let settings = settings
                .map(|s| serde_json::from_str(&s).context("--settings must be valid JSON"))
                .transpose()?;
            let response = client
                .toggle_club_app(&ToggleClubAppRequest {
                    club_id: Some(club_id.to_string()),
                    app_type: Some(app_type),
                    enabled: Some(enabled),
                    settings,
                })
                .await?;
            print_json(&response)?;
        }
        Commands::Usage { club_id } => {
            let response = client.get_club_usage(club_id).await?;
            print_json(&response)?;
        }
        Commands::Clubs => {
            if cli.user_id.is_none() {
                anyhow::bail!("CLUBHUB_USER_ID is required to list clubs");
            }
            let clubs = client.get_user_clubs().await?;
            print_json(&clubs)?;
        }
        Commands::Apps { club_id } => {
            let apps = client.get_club_apps(club_id).await?;
            print_json(&apps)?;
        }
    }

    Ok(())
}
