//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::SessionDriver;
use crate::core::Result;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, driver: &SessionDriver) -> Result<CommandResult> {
    let input = input.trim();
    let cmd = input.to_lowercase();

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        // Each instruction starts a fresh transcript, so there is no
        // history to reset; clearing the screen is all this does.
        "clear" => Ok(CommandResult::Handled("\x1b[2J\x1b[1;1H".to_string())),

        "status" => {
            let config = driver.config();
            let status = format!(
                "sshpilot status:\n\
                 ─────────────────────────────\n\
                 Model:     {}\n\
                 API base:  {}\n\
                 Remote:    {}@{}\n\
                 Max turns: {}\n\
                 Debug:     {}",
                config.llm.model,
                config.llm.base_url,
                config.ssh.username,
                config.ssh.addr(),
                config.agent.max_turns,
                if config.agent.debug { "on" } else { "off" }
            );
            Ok(CommandResult::Handled(status))
        }

        _ => {
            // Not a command, treat as normal input
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    input
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Generate help text
fn help_text() -> String {
    r#"sshpilot commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  status           Show current configuration
  clear            Clear the screen
  exit, quit, q    Leave sshpilot

Anything else is sent to the model as an instruction. The model picks
one shell command, sshpilot runs it on the configured remote host over
SSH and shows the captured output.
─────────────────────────────────────────────"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;

    fn driver() -> SessionDriver {
        SessionDriver::new(Config::default())
    }

    #[test]
    fn test_quit_is_case_insensitive() {
        let d = driver();
        assert!(matches!(
            handle_command("QUIT", &d).unwrap(),
            CommandResult::Exit
        ));
        assert!(matches!(
            handle_command("Quit", &d).unwrap(),
            CommandResult::Exit
        ));
        assert!(matches!(
            handle_command("exit", &d).unwrap(),
            CommandResult::Exit
        ));
    }

    #[test]
    fn test_plain_input_continues() {
        let d = driver();
        match handle_command("list files in home", &d).unwrap() {
            CommandResult::Continue(text) => assert_eq!(text, "list files in home"),
            _ => panic!("expected Continue"),
        }
    }

    #[test]
    fn test_slash_prefixed_unknown_is_handled() {
        let d = driver();
        assert!(matches!(
            handle_command("/frobnicate", &d).unwrap(),
            CommandResult::Handled(_)
        ));
    }
}
