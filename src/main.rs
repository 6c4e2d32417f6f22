//! sshpilot - LLM-driven remote command execution over SSH
//!
//! Main entry point for the CLI application.

use clap::Parser;
use sshpilot::{Config, Repl, SessionDriver};

/// sshpilot - run natural-language instructions on a remote host
#[derive(Parser, Debug)]
#[command(name = "sshpilot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Remote host address
    #[arg(long, short = 'H')]
    host: Option<String>,

    /// SSH port
    #[arg(long, short = 'P')]
    port: Option<u16>,

    /// SSH username
    #[arg(long, short = 'u')]
    username: Option<String>,

    /// Chat model name
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.ssh.host = host;
    }

    if let Some(port) = args.port {
        config.ssh.port = port;
    }

    if let Some(username) = args.username {
        config.ssh.username = username;
    }

    if let Some(model) = args.model {
        config.llm.model = model;
    }

    if args.debug {
        config.agent.debug = true;
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let driver = SessionDriver::new(config);
        let outcome = driver.run(&prompt).await;
        println!("{}", outcome.render());
        if outcome.is_failed() {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config);
    repl.run().await?;

    Ok(())
}
