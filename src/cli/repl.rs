//! Interactive REPL for sshpilot
//!
//! Provides the main user interaction loop: one instruction per line,
//! `quit` (case-insensitive) ends the session, empty input re-prompts.

use std::io::{self, BufRead, Write};

use crate::agent::SessionDriver;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    driver: SessionDriver,
}

impl Repl {
    /// Create a REPL with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            driver: SessionDriver::new(config),
        }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &self.driver)? {
                CommandResult::Exit => {
                    println!("Goodbye!");
                    break;
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::Continue(instruction) => {
                    // Failures are already folded into the outcome by
                    // the session driver; the loop never dies here.
                    let outcome = self.driver.run(&instruction).await;
                    println!("\n{}\n", outcome.render());
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.driver.config();

        println!("sshpilot — LLM-driven remote command execution");
        println!("Model:  {}", config.llm.model);
        if config.ssh.host.is_empty() {
            println!("Remote: (not configured — set SSH_HOST / SSH_USERNAME)");
        } else {
            println!("Remote: {}@{}", config.ssh.username, config.ssh.addr());
        }
        println!();
        println!("Commands: help, status, quit");
        println!("─────────────────────────────────────────────────────");
    }
}
