//! Interactive shell.
//!
//! Every line typed is appended to a story buffer and the whole buffer is
//! handed to the scheduler, which extracts once typing pauses. Lines
//! starting with `:` are shell commands.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use literate_extractor::Extractor;
use literate_scheduler::{Scheduler, SchedulerHandle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::info;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Append a line of story text
    Append(String),
    /// Print the current objects
    Show,
    /// Print scheduler counters and collection statistics
    Stats,
    /// Print the story buffer
    Text,
    /// Empty the story buffer
    Clear,
    /// Drop the last line of the story buffer
    Undo,
    /// Extract now, even if the text has not changed
    Retry,
    /// Ask for a fresh take on one object
    Correct(String),
    /// Print help
    Help,
    /// Leave the shell
    Quit,
}

/// Parse a non-empty shell line.
pub fn parse_line(line: &str) -> Result<ShellCommand> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ShellCommand::Append(line.trim_end().to_string()));
    };

    let (word, rest) = match command.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (command, ""),
    };

    match word {
        "show" | "s" => Ok(ShellCommand::Show),
        "stats" => Ok(ShellCommand::Stats),
        "text" | "t" => Ok(ShellCommand::Text),
        "clear" => Ok(ShellCommand::Clear),
        "undo" | "u" => Ok(ShellCommand::Undo),
        "retry" | "r" => Ok(ShellCommand::Retry),
        "correct" | "c" => {
            if rest.is_empty() {
                return Err(CliError::InvalidInput("Usage: :correct <name>".to_string()));
            }
            Ok(ShellCommand::Correct(rest.to_string()))
        }
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: :{}. Type :help for available commands.",
            word
        ))),
    }
}

/// The story typed so far, one entry per line.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Remove and return the last line.
    pub fn pop(&mut self) -> Option<String> {
        self.lines.pop()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if no lines have been typed.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The full text handed to the scheduler.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Run the interactive shell until `:quit` or end of input.
pub async fn run_shell(config: &Config, formatter: &Formatter) -> Result<()> {
    let provider = config.provider.build(config.extractor.timeout())?;
    let backend = format!("{} ({})", provider.name(), provider.model());
    let extractor = Extractor::new(provider, config.extractor.clone());

    let (handle, mut events) = Scheduler::new(extractor, config.scheduler.clone()).spawn()?;

    let printer = {
        let formatter = formatter.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let Some(line) = formatter.format_event(&event) {
                    println!("{}", line);
                }
            }
        })
    };

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)?
        .auto_add_history(false)
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    let history_path = history_path()?;
    let _ = editor.load_history(&history_path);

    println!(
        "{}",
        formatter.info(&format!(
            "Literate shell using {}. Type your story; :help for commands.",
            backend
        ))
    );
    println!();

    let mut buffer = TextBuffer::new();

    loop {
        let prompt = format!("literate [{}]> ", handle.snapshot().request.label());
        match editor.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str()).ok();

                match parse_line(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(command, &mut buffer, &handle, formatter) {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use :quit to leave"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    let objects = handle.shutdown().await?;
    let _ = printer.await;
    info!(objects = objects.len(), "Shell closed");
    println!("{}", formatter.info("Goodbye!"));

    Ok(())
}

/// Apply one shell command.
fn execute(
    command: ShellCommand,
    buffer: &mut TextBuffer,
    handle: &SchedulerHandle,
    formatter: &Formatter,
) -> Result<()> {
    match command {
        ShellCommand::Append(line) => {
            buffer.push(line);
            handle.notify_text_changed(buffer.text());
        }
        ShellCommand::Show => {
            println!("{}", formatter.format_snapshot(&handle.snapshot())?);
        }
        ShellCommand::Stats => {
            let snapshot = handle.snapshot();
            let stats = snapshot.objects.statistics();
            println!("{}", snapshot.metrics.summary());
            println!();
            println!("Objects: {}", stats.total_objects);
            println!("Relationships: {}", stats.total_relationships);
            println!(
                "Avg relationships per object: {:.2}",
                stats.avg_relationships_per_object
            );
            println!("Status: {}", formatter.status(&snapshot.request));
        }
        ShellCommand::Text => {
            if buffer.is_empty() {
                println!("{}", formatter.info("Nothing typed yet"));
            } else {
                println!("{}", buffer.text());
            }
        }
        ShellCommand::Clear => {
            buffer.clear();
            handle.notify_text_changed(buffer.text());
            println!("{}", formatter.success("Story cleared"));
        }
        ShellCommand::Undo => match buffer.pop() {
            Some(line) => {
                handle.notify_text_changed(buffer.text());
                println!("{}", formatter.success(&format!("Removed: {}", line)));
            }
            None => println!("{}", formatter.warning("Nothing to undo")),
        },
        ShellCommand::Retry => {
            handle.retry()?;
            println!("{}", formatter.info("Extracting..."));
        }
        ShellCommand::Correct(name) => {
            if !handle.snapshot().objects.contains(&name) {
                return Err(CliError::InvalidInput(format!("No object named '{}'", name)));
            }
            handle.correct(name)?;
            println!("{}", formatter.info("Asking for a correction..."));
        }
        ShellCommand::Help => print_help(formatter),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn history_path() -> Result<PathBuf> {
    let dir = Config::data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Anything not starting with ':' is added to the story."));
    println!();
    println!("  :show, :s             - Show current objects");
    println!("  :stats                - Show counters and collection statistics");
    println!("  :text, :t             - Print the story so far");
    println!("  :undo, :u             - Remove the last line");
    println!("  :clear                - Remove every line");
    println!("  :retry, :r            - Extract now");
    println!("  :correct <name>, :c   - Re-derive one object");
    println!("  :help, :?             - Show this help");
    println!("  :quit, :exit, :q      - Leave the shell");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_appended() {
        assert_eq!(
            parse_line("Alice met Bob.  ").unwrap(),
            ShellCommand::Append("Alice met Bob.".to_string())
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_line(":show").unwrap(), ShellCommand::Show);
        assert_eq!(parse_line(":q").unwrap(), ShellCommand::Quit);
        assert_eq!(parse_line(":undo").unwrap(), ShellCommand::Undo);
        assert_eq!(parse_line(":retry").unwrap(), ShellCommand::Retry);
    }

    #[test]
    fn test_correct_takes_multi_word_name() {
        assert_eq!(
            parse_line(":correct  Mad Hatter ").unwrap(),
            ShellCommand::Correct("Mad Hatter".to_string())
        );
        assert!(parse_line(":correct").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_line(":frobnicate").unwrap_err();
        assert!(err.to_string().contains(":frobnicate"));
    }

    #[test]
    fn test_buffer_undo_and_clear() {
        let mut buffer = TextBuffer::new();
        buffer.push("Alice met Bob.");
        buffer.push("Charlie arrived.");
        assert_eq!(buffer.text(), "Alice met Bob.\nCharlie arrived.");

        assert_eq!(buffer.pop().as_deref(), Some("Charlie arrived."));
        assert_eq!(buffer.text(), "Alice met Bob.");
        assert_eq!(buffer.len(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.text(), "");
        assert!(buffer.pop().is_none());
    }
}
