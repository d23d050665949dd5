use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// `briefloop` - human-in-the-loop intake for music-licensing briefs.
#[derive(Parser, Debug)]
#[command(name = "briefloop")]
#[command(version)]
#[command(about = "Extract, check and refine music-licensing briefs.", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full intake loop on a brief, asking for missing fields interactively
    Analyze {
        /// Brief text file (`-` reads stdin)
        file: PathBuf,

        /// Override the configured iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Print the final outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start a session and store it; answer later with `continue`
    Start {
        /// Brief text file (`-` reads stdin)
        file: PathBuf,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Feed answers into a stored session
    Continue {
        session_id: String,

        /// Answer as `path=value`; values parse as JSON when valid, else as text
        #[arg(short, long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, Value)>,

        /// Opaque id for this answer batch (defaults to a content fingerprint)
        #[arg(long)]
        batch_id: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a stored session and its iteration history
    Show {
        session_id: String,

        /// Print the full stored state as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored sessions
    Sessions,

    /// List the tracked brief fields
    Fields,

    /// Fetch a Chartmetric access token to check credentials
    Token,
}

/// Parses a `path=value` answer argument.
pub fn parse_answer(raw: &str) -> Result<(String, Value), String> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected path=value, got `{raw}`"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err("answer path cannot be empty".into());
    }
    Ok((path.to_string(), parse_answer_value(value)))
}

/// JSON when the text parses as JSON, otherwise the trimmed text itself.
pub fn parse_answer_value(raw: &str) -> Value {
    let raw = raw.trim();
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
