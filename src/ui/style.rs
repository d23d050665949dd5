use crate::core::intake::{ConfidenceLevel, HitlStatus, RequestPriority};
use console::style;
use std::fmt::Display;

/// White bold: section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: secondary text, hints
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Green: supplied values, paths
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: bullets, iteration markers
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// Yellow: warnings, commands to run next
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

pub fn status(status: HitlStatus) -> String {
    let text = style(status.to_string()).bold();
    match status {
        HitlStatus::Completed => text.green().to_string(),
        HitlStatus::Pending => text.yellow().to_string(),
        HitlStatus::Skipped => text.dim().to_string(),
    }
}

pub fn confidence(score: f64, level: ConfidenceLevel) -> String {
    let text = style(format!("{score:.2} ({level})"));
    match level {
        ConfidenceLevel::High => text.green().to_string(),
        ConfidenceLevel::Medium => text.cyan().to_string(),
        ConfidenceLevel::Low => text.yellow().to_string(),
        ConfidenceLevel::VeryLow => text.red().to_string(),
    }
}

pub fn priority(priority: RequestPriority) -> String {
    let text = style(priority.to_string().to_uppercase()).bold();
    match priority {
        RequestPriority::Critical => text.red().to_string(),
        RequestPriority::Important => text.yellow().to_string(),
        RequestPriority::Optional => text.dim().to_string(),
    }
}
