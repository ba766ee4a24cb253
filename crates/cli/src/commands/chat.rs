//! Chat command handler.
//!
//! Interactive question loop over stdin. The index is built on the first
//! question and reused until `/new`.

use crate::commands::open_session;
use crate::commands::settings::print_settings;
use crate::commands::sources::{parse_sources, SourceArgs};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_rag::{Role, Session, Sources};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands:
  /new [file... | url]  start over, optionally with new sources
  /info                 show corpus statistics
  /history              show the conversation so far
  /settings             show the active configuration
  /quit                 exit";

/// Chat about files or a web page
#[derive(Args, Debug)]
pub struct ChatCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Delay between revealed words in milliseconds (0 prints at once)
    #[arg(long, default_value_t = 30)]
    pub reveal_delay_ms: u64,
}

/// What the loop should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Question(&'a str),
    New(Vec<&'a str>),
    Info,
    History,
    Settings,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Question(line);
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "new" => Input::New(parts.collect()),
        "info" => Input::Info,
        "history" => Input::History,
        "settings" => Input::Settings,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut sources = self.sources.to_sources().await?;
        docqa_rag::ingest::validate(&sources)?;
        let session = open_session(config).await?;

        println!("Ask a question about your document. Type /help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                Input::Empty => {}
                Input::Question(question) => {
                    self.answer(&session, sources.clone(), question).await;
                }
                Input::New(args) => {
                    if !args.is_empty() {
                        match parse_sources(&args).await {
                            Ok(new_sources) => sources = new_sources,
                            Err(e) => {
                                eprintln!("{}", e);
                                continue;
                            }
                        }
                    }
                    session.new_document().await;
                    println!("Started a new document.");
                }
                Input::Info => print_info(&session).await,
                Input::History => print_history(&session).await,
                Input::Settings => print_settings(config, false)?,
                Input::Help => println!("{}", HELP),
                Input::Quit => break,
                Input::Unknown(command) => {
                    println!("Unknown command: {}", command);
                    println!("{}", HELP);
                }
            }
        }

        tracing::debug!("Chat session {} ended", session.id());
        Ok(())
    }

    async fn answer(&self, session: &Session, sources: Sources, question: &str) {
        let first = !session.is_loaded().await;
        if first {
            println!("Processing document...");
        }

        match session.ask(sources, question).await {
            Ok(answer) => {
                if first {
                    print_info(session).await;
                }
                if let Err(e) = reveal(&answer, self.reveal_delay_ms).await {
                    tracing::warn!("Failed to write answer: {}", e);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

/// Print `text` one word at a time.
async fn reveal(text: &str, delay_ms: u64) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    if delay_ms == 0 {
        return writeln!(stdout, "{}", text);
    }

    for word in text.split_inclusive(char::is_whitespace) {
        write!(stdout, "{}", word)?;
        stdout.flush()?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    writeln!(stdout)
}

async fn print_info(session: &Session) {
    match session.corpus_info().await {
        Some(info) => println!(
            "{} documents, {} characters, {} chunks (avg {} chars, min {}, max {})",
            info.total_documents,
            info.total_characters,
            info.total_chunks,
            info.avg_chunk_size,
            info.min_chunk_size,
            info.max_chunk_size
        ),
        None => println!("No document loaded yet."),
    }
}

async fn print_history(session: &Session) {
    let history = session.history().await;
    if history.is_empty() {
        println!("No messages yet.");
        return;
    }

    for turn in history {
        let speaker = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!("[{}] {}: {}", turn.at.format("%H:%M:%S"), speaker, turn.content);
    }
}
