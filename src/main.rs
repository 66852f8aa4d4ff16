use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;
use tracing::info;

use grupeta::config::{self, Config};
use grupeta::flow;
use grupeta::importer::{parse_participants, ParseOptions};
use grupeta::model::Participant;
use grupeta::provider::GroupClient;
use grupeta::session::Session;
use grupeta::source::TextSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// JSON credentials file overlaying the provider settings
    #[arg(long)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a roster and print it with per-record validity; no network
    Preview {
        /// Roster input: a file path, an http(s) URL, or `-` for stdin
        input: String,
    },
    /// Import a roster and create the provider group for the activity
    CreateGroup {
        /// Activity name, used as the group subject
        #[arg(long)]
        activity: String,
        input: String,
    },
    /// Add a roster's numbers to an existing group
    Add {
        #[arg(long)]
        activity: String,
        /// Group id returned by create-group
        #[arg(long)]
        group_id: String,
        input: String,
    },
    /// Full flow: import, create the group, add the participants
    Run {
        #[arg(long)]
        activity: String,
        input: String,
    },
    /// Print an example configuration file
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    if matches!(args.command, Command::ExampleConfig) {
        print!("{}", config::example());
        return Ok(());
    }

    let mut cfg = config::load_or_default(Some(&args.config))?;
    if let Some(path) = &args.credentials {
        let creds = config::load_credentials(path)?;
        cfg.apply_credentials(&creds);
    }
    cfg.apply_env();
    let opts = cfg.import.parse_options();

    match args.command {
        Command::Preview { input } => {
            let text = TextSource::from_arg(&input)?.read().await?;
            let participants = parse_participants(&text, &opts);
            if participants.is_empty() {
                anyhow::bail!("the input contains no valid participants");
            }
            print_participants(&participants);
            Ok(())
        }
        Command::CreateGroup { activity, input } => {
            cfg.validate_provider()?;
            let service = client_from(&cfg)?;
            let mut session = Session::new();
            import_into(&mut session, &activity, &input, &opts).await?;
            let id = flow::create_group(&service, &mut session, &cfg.provider.admin_phone).await?;
            println!("created group \"{activity}\": {id}");
            Ok(())
        }
        Command::Add {
            activity,
            group_id,
            input,
        } => {
            cfg.validate_provider()?;
            let service = client_from(&cfg)?;
            let mut session = Session::new();
            import_into(&mut session, &activity, &input, &opts).await?;
            session.set_group(group_id);
            let summary =
                flow::add_participants(&service, &mut session, &cfg.provider.admin_phone).await?;
            print_participants(session.selected_participants());
            println!(
                "submitted {} numbers, {} rejected by the provider",
                summary.attempted, summary.failed
            );
            Ok(())
        }
        Command::Run { activity, input } => {
            cfg.validate_provider()?;
            let service = client_from(&cfg)?;
            let mut session = Session::new();
            import_into(&mut session, &activity, &input, &opts).await?;
            let id = flow::create_group(&service, &mut session, &cfg.provider.admin_phone).await?;
            println!("created group \"{activity}\": {id}");
            let summary =
                flow::add_participants(&service, &mut session, &cfg.provider.admin_phone).await?;
            print_participants(session.selected_participants());
            println!(
                "submitted {} numbers, {} rejected by the provider",
                summary.attempted, summary.failed
            );
            Ok(())
        }
        // Handled before config resolution.
        Command::ExampleConfig => Ok(()),
    }
}

async fn import_into(
    session: &mut Session,
    activity: &str,
    input: &str,
    opts: &ParseOptions,
) -> Result<usize> {
    let text = TextSource::from_arg(input)?.read().await?;
    let count = session.import(activity, &text, opts)?;
    info!(activity, count, "imported participants");
    Ok(count)
}

fn client_from(cfg: &Config) -> Result<GroupClient> {
    let base = Url::parse(cfg.provider.api_url.trim())?;
    Ok(GroupClient::new(base, cfg.provider.api_key.trim().to_string()))
}

fn print_participants(participants: &[Participant]) {
    println!("{:<30} {:<15} STATUS", "NAME", "PHONE");
    for p in participants {
        println!("{:<30} {:<15} {}", p.name, p.phone, p.status.as_str());
    }
}
