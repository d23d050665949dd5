use crate::core::intake::merger::display_value;
use crate::core::intake::{FieldRegistry, InfoRequest, TurnOutcome, WorkflowState};
use crate::session::SessionSummary;
use crate::ui::style as ui;
use std::fmt::Write;

pub fn render_request(request: &InfoRequest) -> String {
    let mut out = format!(
        "{} {}\n{}\n",
        ui::priority(request.priority),
        ui::header("More information needed"),
        request.request_message
    );
    for path in &request.missing_fields {
        let description = request.describe(path).unwrap_or(path);
        let _ = writeln!(out, "  {} {} {}", ui::accent("*"), description, ui::dim(path));
        let suggestions = request.suggestions(path);
        if !suggestions.is_empty() {
            let _ = writeln!(out, "    {}", ui::dim(format!("e.g. {}", suggestions.join(", "))));
        }
    }
    out
}

pub fn render_outcome(outcome: &TurnOutcome) -> String {
    let mut lines = vec![
        format!("{} {}", ui::header("Session"), ui::value(&outcome.session_id)),
        format!("  status       {}", ui::status(outcome.status)),
        format!("  iterations   {}", outcome.iteration_count),
    ];
    if let Some(confidence) = outcome.confidence {
        lines.push(format!(
            "  confidence   {}",
            ui::confidence(confidence.score, confidence.level)
        ));
    }
    if let Some(quality) = &outcome.quality {
        lines.push(format!(
            "  missing      {} ({} critical)",
            quality.missing_fields_count, quality.critical_missing_count
        ));
        if !quality.analysis_complete {
            lines.push(format!(
                "  {}",
                ui::yellow("extraction failed; the record is a placeholder")
            ));
        }
    }
    if let Some(request) = outcome.info_request.as_ref().filter(|_| outcome.requires_human_input) {
        lines.push(String::new());
        lines.push(render_request(request));
        lines.push(ui::dim(format!(
            "Answer with: briefloop continue {} --answer <path>=<value>",
            outcome.session_id
        )));
    }
    lines.join("\n")
}

pub fn render_history(state: &WorkflowState) -> String {
    let mut out = format!(
        "{} {}  {}  {}/{} iterations\n",
        ui::header("Session"),
        ui::value(&state.session_id),
        ui::status(state.status),
        state.iteration_count,
        state.max_iterations
    );
    for entry in state.ledger.all() {
        let _ = writeln!(
            out,
            "\n{} {}  {}  confidence {}",
            ui::accent(format!("#{}", entry.iteration)),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.record_snapshot.extraction_status().unwrap_or("unknown"),
            ui::confidence(entry.confidence.score, entry.confidence.level)
        );
        if let Some(answers) = &entry.human_input_this_iteration {
            for (path, value) in answers {
                let _ = writeln!(out, "  + {path} = {}", ui::value(display_value(value)));
            }
        }
        if entry.missing_at_this_point.is_empty() {
            let _ = writeln!(out, "  {}", ui::dim("nothing missing"));
        } else {
            let _ = writeln!(
                out,
                "  {}",
                ui::dim(format!("missing: {}", entry.missing_at_this_point.join(", ")))
            );
        }
    }
    out
}

pub fn render_fields(registry: &FieldRegistry) -> String {
    let mut out = String::new();
    for spec in registry.fields() {
        let _ = writeln!(
            out,
            "{:<36} {:<10} {}",
            spec.path,
            spec.priority.to_string(),
            spec.description
        );
        if !spec.suggested_values.is_empty() {
            let _ = writeln!(out, "{:<47} {}", "", ui::dim(spec.suggested_values.join(", ")));
        }
    }
    out
}

pub fn render_sessions(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "No stored sessions.".to_string();
    }
    sessions
        .iter()
        .map(|summary| {
            format!(
                "{}  {}  {}/{}  {}",
                summary.session_id,
                ui::status(summary.status),
                summary.iteration_count,
                summary.max_iterations,
                summary
                    .updated_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
