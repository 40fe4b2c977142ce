use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fbstream::{
    commands::{self, Clock},
    config::Config,
    models::{FixtureFilters, StatusFilter},
    services::{FixtureDirectory, LoadState},
    sources::FallbackChain,
    streaming::{AuthTokenGenerator, ClientProfile, StreamResolver},
    utils::time::parse_time_offset,
};

#[derive(Parser)]
#[command(name = "fbstream")]
#[command(version)]
#[command(about = "Live football fixtures with provider stream resolution")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "fbstream.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Pretend the clock is shifted, e.g. "+2h" or "-30m"
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    shift: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List fixtures
    List {
        /// League name, or "all"
        #[arg(short, long, default_value = "")]
        league: String,

        /// all, live, upcoming or finished
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,

        /// Case-insensitive match on team or league names
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Only fixtures in the live band
        #[arg(long)]
        live: bool,

        /// Keep reprinting the list on the summary tick
        #[arg(short, long)]
        follow: bool,
    },
    /// Show one fixture
    Show { id: String },
    /// Print the playable URL for every stream of a fixture
    Resolve {
        id: String,

        /// Client user agent used for Apple detection
        #[arg(long)]
        user_agent: Option<String>,

        /// Force the Apple-like flag instead of detecting it
        #[arg(long)]
        apple_like: Option<bool>,
    },
    /// Count down, then play the default stream on a logging engine
    Watch {
        id: String,

        /// Stop after this many seconds
        #[arg(long, default_value_t = 60)]
        seconds: u64,

        #[arg(long)]
        user_agent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fbstream={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fbstream v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    let clock = match cli.shift.as_deref() {
        Some(offset) => Clock::shifted_by_seconds(
            parse_time_offset(offset).map_err(|e| anyhow::anyhow!("--shift: {e}"))?,
        ),
        None => Clock::default(),
    };

    let directory = FixtureDirectory::new(FallbackChain::from_config(&config.source)?);
    match directory.refresh().await {
        LoadState::Ready {
            source_name,
            is_placeholder,
            stale,
        } => {
            info!("Fixtures loaded from {}", source_name);
            if is_placeholder {
                println!("Showing sample fixtures; live data is unavailable.");
            }
            if stale {
                warn!("Fixture list is stale");
            }
        }
        LoadState::Failed { message } => {
            println!("Failed to load matches. Please try again later.");
            anyhow::bail!(message);
        }
        other => warn!("Unexpected directory state after refresh: {:?}", other),
    }

    let now_ms = clock.now_ms();
    match cli.command {
        Command::List {
            league,
            status,
            search,
            live,
            follow,
        } => {
            let filters = FixtureFilters {
                league,
                status,
                search,
            };
            if follow {
                commands::follow_list(
                    &directory,
                    &filters,
                    live,
                    clock,
                    &Local,
                    config.schedule.summary_tick,
                )
                .await;
            } else {
                for line in commands::list_lines(&directory, &filters, live, now_ms, &Local).await
                {
                    println!("{line}");
                }
            }
        }
        Command::Show { id } => {
            let fixture = commands::find_fixture(&directory, &id).await?;
            for line in commands::show_lines(&fixture, now_ms, &Local) {
                println!("{line}");
            }
        }
        Command::Resolve {
            id,
            user_agent,
            apple_like,
        } => {
            let fixture = commands::find_fixture(&directory, &id).await?;
            let client = ClientProfile::from_user_agent(
                user_agent.unwrap_or_else(|| config.source.user_agent.clone()),
            );
            let flag = apple_like.unwrap_or_else(|| client.is_apple_like());
            let token = AuthTokenGenerator::from_config(&config.token)?.generate();
            let resolver = StreamResolver::new(token, flag);
            for line in commands::resolve_lines(&fixture, &resolver) {
                println!("{line}");
            }
        }
        Command::Watch {
            id,
            seconds,
            user_agent,
        } => {
            let fixture = commands::find_fixture(&directory, &id).await?;
            let client = ClientProfile::from_user_agent(
                user_agent.unwrap_or_else(|| config.source.user_agent.clone()),
            );
            commands::watch(&config, &fixture, client, seconds, clock).await?;
        }
    }

    Ok(())
}
