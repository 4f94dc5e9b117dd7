use anyhow::Context;
use autoreply_core::{AppConfig, AutoresponderConfig, SelectedPost, SubmissionController};
use clap::Parser;
use database::open_store;
use graph_client::{FileTokenStore, GraphApiClient};
use gui::{App, Handlers};
use iced::{Application, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "autoreply", about = "Configure comment autoresponders for a post")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "AUTOREPLY_CONFIG", default_value = "autoreply.toml")]
    config: PathBuf,

    /// JSON file describing the selected post
    #[arg(long)]
    post: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "autoreply=debug,autoreply_core=debug,graph_client=debug,database=debug,gui=debug",
            )
        }))
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Autoreply - comment autoresponder setup");

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    let post = SelectedPost::from_json_file(&cli.post)
        .with_context(|| format!("failed to read selected post from {}", cli.post.display()))?;

    // Kept alive for the whole run: the SQLite pool's maintenance tasks live on it.
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let store = runtime
        .block_on(open_store(&config.store))
        .context("failed to open autoresponder store")?;

    let lookup = GraphApiClient::new(&config.graph).context("failed to build Graph API client")?;
    let tokens = FileTokenStore::from_config(&config.token_store);
    tracing::info!(
        "Graph API at {}, access token read from {}",
        lookup.api_base(),
        tokens.path().display()
    );
    let controller = SubmissionController::new(Arc::new(tokens), Arc::new(lookup), store);

    let mut settings = Settings::with_flags((post, controller));
    settings.window = iced::window::Settings {
        size: iced::Size::new(720.0, 820.0),
        min_size: Some(iced::Size::new(480.0, 600.0)),
        ..Default::default()
    };

    AutoreplyApp::run(settings).map_err(|e| {
        tracing::error!("Application error: {}", e);
        anyhow::anyhow!("GUI error: {e}")
    })
}

struct AutoreplyApp {
    app: App,
}

impl Application for AutoreplyApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = (SelectedPost, SubmissionController);

    fn new((post, controller): Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Opening autoresponder form for post {}", post.id);
        let handlers = Handlers {
            on_complete: Box::new(|config: &AutoresponderConfig| {
                match serde_json::to_string(config) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!("Could not serialize autoresponder: {}", e),
                }
            }),
            ..Handlers::default()
        };
        (
            Self {
                app: App::new(post, controller, handlers),
            },
            iced::Command::none(),
        )
    }

    fn title(&self) -> String {
        "Autoreply - New autoresponder".to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        self.app.update(message)
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }
}
