// src/utils/log.rs

//! Console-style progress output on top of the `log` facade.
//!
//! Pipelines report headers, steps and summaries through these helpers so the
//! layout stays the same whichever logger the binary installs.

const RULE_WIDTH: usize = 60;

/// Log an info message
pub fn info(message: &str) {
    log::info!("{message}");
}

/// Log a warning message
pub fn warn(message: &str) {
    log::warn!("{message}");
}

/// Log a success message
pub fn success(message: &str) {
    log::info!("✓ {message}");
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {title}");
    for line in format_items(items) {
        log::info!("{line}");
    }
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {step_num}/{total}] {message}")
}

fn format_items(items: &[(&str, String)]) -> Vec<String> {
    let width = items.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);
    items
        .iter()
        .map(|(key, value)| format!("    {key:<width$} : {value}"))
        .collect()
}
