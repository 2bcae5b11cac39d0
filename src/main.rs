use clap::Parser;
use log::warn;
use std::sync::Arc;

mod chat;
mod command_parser;
mod config;
mod error;
mod llm_manager;
mod logger;
mod providers;
mod server;

use chat::ChatService;
use config::Config;
use llm_manager::ReplyService;
use providers::GeminiProvider;

#[derive(Parser)]
#[command(name = "chat_assistant")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,
    /// Interface to bind, overrides the config file
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logger::init(args.verbose);

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(args.host, args.port);

    let replies = match GeminiProvider::new(&config.reply_service) {
        Ok(provider) => ReplyService::new(Box::new(provider), config.reply_service.timeout()),
        Err(e) => {
            warn!("{:#}", e);
            ReplyService::unconfigured()
        }
    };
    if !replies.is_configured() {
        warn!("No Gemini credentials, free-text replies will use the fallback message");
    }

    let service = Arc::new(ChatService::new(replies));
    server::serve(&config.server, service).await
}
