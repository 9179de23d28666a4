//! CLI module
//!
//! thairecipes command definitions and implementations. The chat loop
//! is the presentation boundary: any error a workflow run propagates is
//! rendered inline and the session keeps going.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::session::{render_documents, ChatHistory};
use crate::workflow::Workflow;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "thairecipes")]
#[command(version, about = "Thai cuisine assistant - routed RAG", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question and print the routed answer
    Ask {
        /// The question
        question: String,
    },

    /// Interactive chat session
    Chat,

    /// Check configuration status
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// Execute the parsed command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask { question } => cmd_ask(&question).await,
        Commands::Chat => cmd_chat().await,
        Commands::Status => cmd_status(),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Single question command (ask)
async fn cmd_ask(question: &str) -> Result<()> {
    let config = Config::from_env().context("Configuration incomplete")?;
    let workflow = Workflow::from_config(&config).context("Failed to build workflow")?;

    println!("[*] Routing: \"{}\"", truncate_text(question, 80));

    let state = workflow.run(question).await?;

    if state.documents.is_empty() {
        println!("[!] No documents matched your question.");
        return Ok(());
    }

    println!();
    println!("{}", render_documents(&state.documents));

    Ok(())
}

/// Interactive session command (chat)
async fn cmd_chat() -> Result<()> {
    let config = Config::from_env().context("Configuration incomplete")?;
    let workflow = Workflow::from_config(&config).context("Failed to build workflow")?;
    let mut history = ChatHistory::new();

    println!("thairecipes chat (session {})", history.session_id());
    println!("Ask about Thai recipes, ingredients, or cooking techniques.");
    println!("Type 'exit' to leave.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        history.push_human(question);

        // Errors end the turn, never the session
        match workflow.run(question).await {
            Ok(state) => {
                let answer = if state.documents.is_empty() {
                    "No documents matched your question.".to_string()
                } else {
                    render_documents(&state.documents)
                };

                println!("ai> {}", answer);
                history.push_ai(answer);
            }
            Err(e) => {
                println!("[!] Error: {:#}", e);
            }
        }

        println!();
    }

    println!("[OK] Session ended ({} turns)", history.len());
    Ok(())
}

/// Status command (status)
fn cmd_status() -> Result<()> {
    println!("thairecipes v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let missing = Config::missing_from_env();
    if missing.is_empty() {
        println!("[OK] Configuration: complete");
    } else {
        for name in &missing {
            println!("[!] {}: not set", name);
        }
        println!();
        println!("    Set: export <NAME>=...  (GEMINI_API_KEY works in place of GOOGLE_API_KEY)");
        return Ok(());
    }

    match Config::from_env() {
        Ok(config) => {
            println!("     Collection: {}.{}", config.keyspace, config.collection);
            match config.astra_endpoint() {
                Ok(endpoint) => println!("     Endpoint: {}", endpoint),
                Err(e) => println!("[!] Endpoint: {:#}", e),
            }
        }
        Err(e) => {
            println!("[!] Configuration error: {:#}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Truncate text for display (UTF-8 safe)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
