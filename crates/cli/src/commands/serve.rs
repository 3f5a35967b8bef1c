//! Serve command handler.

use clap::Args;
use cookbook_core::{config::AppConfig, AppResult};
use cookbook_knowledge::RagContext;

/// Serve the chat endpoint over HTTP
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, env = "COOKBOOK_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "COOKBOOK_PORT")]
    pub port: Option<u16>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut server = config.server.clone();
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if self.timeout.is_some() {
            server.request_timeout_secs = self.timeout;
        }

        let ctx = RagContext::from_config(config)?;
        cookbook_server::run_server(&server, ctx).await
    }
}
