//! Tidemark - command line host
//!
//! Runs one editing command against a markdown file (or stdin) and prints the
//! result, which makes the editing engine scriptable and easy to inspect.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use tidemark::buffer::{Document, Position, Selection, TextBuffer, TextLines};
use tidemark::config::{get_config_file_path, load_config, load_config_from, EditorSettings};
use tidemark::editing::{EditorCommand, MarkdownEditor};
use tidemark::error::{Error, Result};

#[derive(Parser)]
#[command(name = "tidemark", version, about = "Markdown-aware structural editing")]
struct Cli {
    /// Settings file to use instead of the user configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply an editing command and print the resulting text
    Apply {
        /// Markdown file, or `-` for stdin
        input: String,
        /// Command name, e.g. `toggleBold` or `toggle-heading-2`
        #[arg(long)]
        command: String,
        /// Selection head as LINE:CH (0-based)
        #[arg(long, default_value = "0:0")]
        cursor: Position,
        /// Selection anchor as LINE:CH; defaults to the cursor
        #[arg(long)]
        anchor: Option<Position>,
        /// URL for link, image and upload commands
        #[arg(long)]
        url: Option<String>,
    },
    /// Print the constructs active at a position as JSON
    State {
        /// Markdown file, or `-` for stdin
        input: String,
        #[arg(long, default_value = "0:0")]
        cursor: Position,
    },
    /// Render the document to HTML
    Render {
        /// Markdown file, or `-` for stdin
        input: String,
    },
    /// Print the location of the configuration file
    ConfigPath,
    /// List the available command names
    Commands,
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn settings(path: Option<&PathBuf>) -> Result<EditorSettings> {
    match path {
        Some(path) => load_config_from(path),
        None => Ok(load_config()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = settings(cli.config.as_ref())?;

    match cli.command {
        Command::Apply {
            input,
            command,
            cursor,
            anchor,
            url,
        } => {
            let command: EditorCommand = command.parse()?;
            let mut document = Document::new(read_input(&input)?);
            document.set_selection(Selection::new(anchor.unwrap_or(cursor), cursor))?;

            let mut editor = MarkdownEditor::new(document, settings);
            let handled = editor.execute_with_url(command, url.as_deref());
            if !handled {
                return Err(Error::Application(format!(
                    "{} did not apply at {}",
                    command, cursor
                )));
            }

            let text = editor.text();
            let lines = TextLines::new(text);
            let selection = editor.buffer().selection();
            info!(
                "Selection {} -> {}",
                lines.clamp_pos(selection.anchor),
                lines.clamp_pos(selection.head)
            );
            print!("{}", text);
        }
        Command::State { input, cursor } => {
            let editor = MarkdownEditor::from_text(read_input(&input)?, settings);
            let state = editor.get_state(Some(cursor));
            println!("{}", serde_json::to_string(&state)?);
        }
        Command::Render { input } => {
            let editor = MarkdownEditor::from_text(read_input(&input)?, settings);
            print!("{}", editor.preview_html());
        }
        Command::ConfigPath => {
            println!("{}", get_config_file_path()?.display());
        }
        Command::Commands => {
            for command in EditorCommand::all() {
                match command.shortcut_label(cfg!(target_os = "macos")) {
                    Some(shortcut) => println!("{:<24} {}", command.name(), shortcut),
                    None => println!("{}", command.name()),
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
