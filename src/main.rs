mod auth;
mod aws;
mod bot;
mod chat;
mod common;
mod config;
mod service;
mod storage;
mod ui;

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use auth::{AuthContext, CognitoUserPool, SessionCache};
use bot::LexClient;
use chat::{ChatController, LoaderTiming};
use common::EventSink;
use config::AppConfig;
use service::ChatService;
use storage::{SessionStorage, TranscriptStore};
use ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "botchat",
    version,
    about = "Desktop chat client for a managed conversational bot"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Path of the session storage database (overrides the config file)
    #[arg(long, value_name = "FILE")]
    storage: Option<String>,
    /// Keep the transcript in memory only; it is gone when the window closes
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    app_config.apply_env_overrides();
    if let Some(storage) = cli.storage {
        app_config.storage_path = Some(storage);
    }
    if let Err(err) = app_config.validate() {
        log::error!("Invalid configuration: {err}");
        return Err(err.into());
    }

    run_client(app_config, cli.ephemeral).await
}

async fn run_client(app_config: AppConfig, ephemeral: bool) -> Result<(), Box<dyn Error>> {
    // UI -> service
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Service -> UI
    let (sink, event_rx) = EventSink::channel();

    let http = aws::http_client();
    let identity = CognitoUserPool::new(
        &app_config,
        http.clone(),
        SessionCache::new(app_config.session_cache_path()),
    );
    let auth = AuthContext::new(Arc::new(identity), sink.clone());
    let chat = ChatController::new(
        Box::new(LexClient::new(&app_config, http)),
        open_transcript_store(&app_config, ephemeral),
        LoaderTiming::default(),
        sink.clone(),
    );

    tokio::spawn(ChatService::new(auth, chat, cmd_rx, sink).run());

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "MCPP Bot",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .ok_or("ChatApp should only be initialized once")?;

            log::info!("Client started for bot {}", app_config.bot_id);

            Ok(Box::new(ChatApp::new(cc, cmd_tx.clone(), event_receiver)))
        }),
    )?;

    Ok(())
}

fn open_transcript_store(app_config: &AppConfig, ephemeral: bool) -> TranscriptStore {
    let storage = if ephemeral {
        SessionStorage::in_memory()
    } else {
        SessionStorage::with_path(app_config.storage_path()).or_else(|err| {
            log::warn!(
                "Cannot open {} ({err}); keeping chat in memory",
                app_config.storage_path()
            );
            SessionStorage::in_memory()
        })
    };

    match storage {
        Ok(storage) => TranscriptStore::new(storage),
        Err(err) => {
            log::error!("Session storage unavailable: {err}");
            TranscriptStore::detached()
        }
    }
}
