pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod matcher;
pub mod citation;
pub mod decision_log;

use agent::RelayAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Primary LLM Type: {}", args.primary_llm_type);
    info!("Primary Model: {}", args.primary_model.as_deref().unwrap_or("adapter default"));
    info!("Secondary LLM Type: {}", args.secondary_llm_type);
    info!("Secondary Model: {}", args.secondary_model.as_deref().unwrap_or("adapter default"));
    info!("Provider Timeout: {}s", args.provider_timeout_secs);
    info!("Max Message Length: {} chars", args.max_message_chars);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Citations Path: {}", args.citations_path.as_deref().unwrap_or("built-in"));
    info!("Decision Log: {} ({})", args.decision_log, args.log_dir);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = Arc::new(RelayAgent::new(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args.clone());
    server.run().await?;

    Ok(())
}
