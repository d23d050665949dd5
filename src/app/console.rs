use crate::app::render::render_request;
use crate::cli::commands::parse_answer_value;
use crate::core::intake::{AnswerBatch, HumanResponder, InfoRequest};
use crate::ui::style as ui;
use anyhow::{Context, Result};
use dialoguer::{Input, Select};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Asks for each missing field on the terminal.
pub struct ConsoleResponder;

impl HumanResponder for ConsoleResponder {
    fn respond<'a>(
        &'a self,
        request: &'a InfoRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AnswerBatch>> + Send + 'a>> {
        let request = request.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || prompt_answers(&request))
                .await
                .context("console prompt task panicked")?
        })
    }
}

fn prompt_answers(request: &InfoRequest) -> Result<AnswerBatch> {
    println!();
    println!("{}", render_request(request));

    let mut answers = Map::new();
    for path in &request.missing_fields {
        let description = request.describe(path).unwrap_or(path);
        let suggestions = request.suggestions(path);
        let answer = if suggestions.is_empty() {
            prompt_text(description)?
        } else {
            prompt_choice(description, suggestions)?
        };
        if let Some(value) = answer {
            answers.insert(path.clone(), value);
        }
    }

    if answers.is_empty() {
        println!("  {}", ui::dim("No answers given."));
    }
    Ok(AnswerBatch::new(answers))
}

fn prompt_text(description: &str) -> Result<Option<Value>> {
    let raw: String = Input::new()
        .with_prompt(format!("  {description} (blank to skip)"))
        .allow_empty(true)
        .interact_text()?;
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(parse_answer_value(&raw)))
    }
}

fn prompt_choice(description: &str, suggestions: &[String]) -> Result<Option<Value>> {
    let mut items: Vec<&str> = suggestions.iter().map(String::as_str).collect();
    items.push("Other (type a value)");
    items.push("Skip");

    let idx = Select::new()
        .with_prompt(format!("  {description}"))
        .items(&items)
        .default(0)
        .interact()?;

    match idx {
        i if i < suggestions.len() => Ok(Some(Value::String(suggestions[i].clone()))),
        i if i == suggestions.len() => prompt_text(description),
        _ => Ok(None),
    }
}
