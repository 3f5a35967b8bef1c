//! Ask command handler.
//!
//! Answers one question through the same pipeline the server uses.

use clap::Args;
use cookbook_core::{config::AppConfig, AppResult};
use cookbook_knowledge::{chat, RagContext, RetrievalTier};

/// Ask a single question about the cookbook
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON (same shape as the HTTP response)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let ctx = RagContext::from_config(config)?;
        let response = chat(&ctx, &self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("{}", response.answer.trim());
        println!();

        if response.sources.is_empty() {
            println!("Sources: (no matching recipe)");
        } else {
            println!("Sources:");
            for source in &response.sources {
                println!("- {} ({})", source.title, source.id);
            }
        }

        if config.verbose {
            match &response.tier {
                RetrievalTier::Keyword { keyword, category } => println!(
                    "\nRetrieval: keyword '{}' ({})",
                    keyword,
                    category.as_deref().unwrap_or("-")
                ),
                RetrievalTier::Semantic => println!("\nRetrieval: semantic"),
            }
        }

        Ok(())
    }
}
