// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable rendering of plugin operation reports.
//!
//! Every report becomes a list of [`Line`]s, one per platform-level outcome.
//! With color enabled a status symbol is printed; with `--plain` a bracketed
//! tag is used instead.

use plinth_core::PluginRecord;
use plinth_plugin::{AddReport, PrepareOutcome, PrepareReport, RemoveReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Ok,
    Skip,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub status: LineStatus,
    pub label: String,
    pub message: String,
}

impl Line {
    fn new(status: LineStatus, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            label: label.into(),
            message: message.into(),
        }
    }
}

pub fn render_line(line: &Line, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match line.status {
            LineStatus::Ok => ("✓".green().to_string(), line.message.normal()),
            LineStatus::Skip => ("-".dimmed().to_string(), line.message.dimmed()),
            LineStatus::Warn => ("!".yellow().to_string(), line.message.yellow()),
            LineStatus::Fail => ("✗".red().to_string(), line.message.red()),
        };
        format!("    {symbol} {:<12} {message}", line.label)
    } else {
        let tag = match line.status {
            LineStatus::Ok => "[OK]  ",
            LineStatus::Skip => "[SKIP]",
            LineStatus::Warn => "[WARN]",
            LineStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<12} {}", line.label, line.message)
    }
}

pub fn add_lines(report: &AddReport) -> Vec<Line> {
    let plugin = &report.plugin;
    let mut lines = vec![Line::new(
        LineStatus::Ok,
        "install",
        format!("{}@{}", plugin.name, plugin.version),
    )];
    lines.extend(
        report
            .warnings
            .iter()
            .map(|w| Line::new(LineStatus::Warn, w.platform().to_string(), w.to_string())),
    );
    lines
}

pub fn remove_lines(report: &RemoveReport) -> Vec<Line> {
    let mut lines: Vec<Line> = report
        .platforms
        .iter()
        .map(|step| match &step.result {
            Ok(()) => Line::new(LineStatus::Ok, step.platform.to_string(), "native code removed"),
            Err(e) => Line::new(LineStatus::Fail, step.platform.to_string(), e.to_string()),
        })
        .collect();
    lines.push(match &report.uninstall {
        Ok(()) => Line::new(LineStatus::Ok, "uninstall", report.name.clone()),
        Err(e) => Line::new(LineStatus::Fail, "uninstall", e.to_string()),
    });
    lines
}

pub fn prepare_lines(report: &PrepareReport) -> Vec<Line> {
    report
        .entries
        .iter()
        .map(|entry| {
            let label = entry.platform.to_string();
            match &entry.outcome {
                Ok(PrepareOutcome::Integrated) => {
                    Line::new(LineStatus::Ok, label, format!("{} integrated", entry.plugin))
                }
                Ok(PrepareOutcome::Skipped) => {
                    Line::new(LineStatus::Skip, label, format!("{} unchanged", entry.plugin))
                }
                Ok(PrepareOutcome::NoNativeCode) => {
                    Line::new(LineStatus::Skip, label, format!("{} has no native code", entry.plugin))
                }
                Err(e) => Line::new(LineStatus::Fail, label, e.to_string()),
            }
        })
        .collect()
}

pub fn list_lines(plugins: &[PluginRecord]) -> Vec<Line> {
    plugins
        .iter()
        .map(|plugin| {
            let platforms = if plugin.min_versions.is_empty() {
                "no platform requirements".to_string()
            } else {
                plugin
                    .min_versions
                    .iter()
                    .map(|(platform, version)| format!("{platform} >= {version}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            Line::new(LineStatus::Ok, plugin.version.clone(), format!("{} ({platforms})", plugin.name))
        })
        .collect()
}
