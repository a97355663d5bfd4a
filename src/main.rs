use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kiosk::news::model as news;

#[derive(Parser)]
#[command(name = "kiosk", version, about = "Notes and news site")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct Overrides {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database URL (file path or `libsql://`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Secret used to sign session cookies (at least 32 bytes)
    #[arg(long, global = true)]
    jwt_secret: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Publish a news article
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        /// Publication date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<jiff::civil::Date>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> kiosk::Result<()> {
    let command = cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    });
    let (host, port) = match &command {
        Command::Serve { host, port } => (host.as_deref(), *port),
        Command::Publish { .. } => (None, None),
    };

    let config = kiosk::Loader::default().load(
        cli.overrides.config.as_deref(),
        host,
        port,
        cli.overrides.database_url.as_deref(),
        cli.overrides.jwt_secret.as_deref(),
    )?;
    let db = kiosk::db::open(&config.database.url).await?;

    match command {
        Command::Serve { .. } => {
            let router = kiosk::router(&config);
            let state = kiosk::server::State::new(config, Some(db), router.into_handle())?;
            kiosk::server::run(state).await
        }
        Command::Publish { title, text, date } => {
            let conn = kiosk::db::connection(&db).await?;
            let date = date.unwrap_or_else(news::today);
            let article = news::create_news(&conn, &title, &text, date).await?;
            tracing::info!(news_id = article.id, %date, "Published news article");
            Ok(())
        }
    }
}
