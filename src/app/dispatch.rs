use crate::app::console::ConsoleResponder;
use crate::app::render::{render_fields, render_history, render_outcome, render_sessions};
use crate::auth::chartmetric_token_cache;
use crate::cli::commands::{Cli, Commands};
use crate::core::extraction::LlmBriefExtractor;
use crate::core::intake::{
    AnswerBatch, FieldRegistry, HitlOrchestrator, SessionTurn, WorkflowState,
};
use crate::error::SessionError;
use crate::session::{JsonFileSessionStore, SessionStore};
use crate::ui::style as ui;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::Config;

fn build_orchestrator(config: &Config, max_iterations: Option<u32>) -> HitlOrchestrator {
    if config.llm.api_key.is_none() {
        warn!(
            provider = %config.llm.provider_name,
            "No LLM API key configured; extraction will fall back to a placeholder record"
        );
    }
    let mut policy = config.hitl.policy();
    if let Some(max_iterations) = max_iterations {
        policy.max_iterations = max_iterations;
    }
    let extractor = LlmBriefExtractor::from_config(&config.llm);
    HitlOrchestrator::new(Arc::new(extractor)).with_policy(policy)
}

fn read_brief(file: &Path) -> Result<String> {
    let brief = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read brief from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read brief {}", file.display()))?
    };
    if brief.trim().is_empty() {
        bail!("Brief is empty");
    }
    Ok(brief)
}

fn print_turn(turn: &SessionTurn, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&turn.outcome)?);
    } else {
        println!("{}", render_outcome(&turn.outcome));
    }
    Ok(())
}

fn answer_batch(answers: Vec<(String, Value)>, batch_id: Option<String>) -> Option<AnswerBatch> {
    if answers.is_empty() && batch_id.is_none() {
        return None;
    }
    let answers: Map<String, Value> = answers.into_iter().collect();
    Some(match batch_id {
        Some(id) => AnswerBatch::with_id(id, answers),
        None => AnswerBatch::new(answers),
    })
}

/// Loads a stored session; a corrupt state file restarts from the saved brief.
async fn load_or_restart(
    store: &dyn SessionStore,
    orchestrator: &HitlOrchestrator,
    session_id: &str,
) -> Result<WorkflowState> {
    match store.load(session_id).await {
        Ok(state) => Ok(state),
        Err(SessionError::Corrupt { message, .. }) => {
            warn!(session_id, error = %message, "Stored session is corrupt; restarting from brief");
            let brief = store
                .load_brief(session_id)
                .await
                .context("Corrupt session has no saved brief to restart from")?;
            let turn = orchestrator.start_session(&brief).await?;
            println!(
                "{}",
                ui::yellow(format!(
                    "Session {session_id} was unreadable; restarted as {}",
                    turn.state.session_id
                ))
            );
            Ok(turn.state)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    let store = JsonFileSessionStore::new(config.sessions_dir());

    match cli.command {
        Commands::Analyze {
            file,
            max_iterations,
            json,
        } => {
            let brief = read_brief(&file)?;
            let orchestrator = build_orchestrator(&config, max_iterations);
            let turn = orchestrator.drive(&brief, &ConsoleResponder).await?;
            store.save(&turn.state).await?;
            info!(
                session_id = %turn.state.session_id,
                status = %turn.state.status,
                "Analysis finished"
            );
            print_turn(&turn, json)
        }

        Commands::Start { file, json } => {
            let brief = read_brief(&file)?;
            let orchestrator = build_orchestrator(&config, None);
            let turn = orchestrator.start_session(&brief).await?;
            store.save(&turn.state).await?;
            print_turn(&turn, json)
        }

        Commands::Continue {
            session_id,
            answers,
            batch_id,
            json,
        } => {
            let orchestrator = build_orchestrator(&config, None);
            let state = load_or_restart(&store, &orchestrator, &session_id).await?;
            let session_id = state.session_id.clone();
            let turn = orchestrator
                .continue_session(&session_id, state, answer_batch(answers, batch_id))
                .await?;
            store.save(&turn.state).await?;
            print_turn(&turn, json)
        }

        Commands::Show { session_id, json } => {
            let state = store.load(&session_id).await?;
            if json {
                println!("{}", state.to_json()?);
            } else {
                print!("{}", render_history(&state));
            }
            Ok(())
        }

        Commands::Sessions => {
            println!("{}", render_sessions(&store.list().await?));
            Ok(())
        }

        Commands::Fields => {
            print!("{}", render_fields(&FieldRegistry::reference()));
            Ok(())
        }

        Commands::Token => {
            let cache = chartmetric_token_cache(&config.chartmetric)?;
            let token = cache.get().await?;
            let prefix: String = token.chars().take(6).collect();
            println!("{} Chartmetric token {prefix}****", ui::value("OK"));
            if let Some(remaining) = cache.remaining().await {
                println!("  {}", ui::dim(format!("cached for {} min", remaining.as_secs() / 60)));
            }
            Ok(())
        }
    }
}
