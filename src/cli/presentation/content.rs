//! Content presentation: drafts, verdicts and stage failures as terminal text.

use crate::error::{AgentError, OutputDefect};
use crate::pipeline::Stage;
use crate::schema::{ContentOutput, ReviewOutput, VerdictStatus};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use owo_colors::{OwoColorize, Style};

const RAW_PREVIEW_CHARS: usize = 400;

/// Apply `style` only when color is enabled.
pub(crate) fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        format!("{}", text.style(style))
    } else {
        text.to_string()
    }
}

pub fn format_section_heading(title: &str, color: bool) -> String {
    paint(title, Style::new().bold().underline(), color)
}

/// Explanation followed by an MCQ table. Correct options are marked with `*`.
pub fn format_content_text(title: &str, content: &ContentOutput, color: bool) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title, color));
    out.push_str(&content.explanation);
    out.push_str("\n\n");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Question", "Options", "Answer"]);
    for (index, mcq) in content.mcqs.iter().enumerate() {
        let options = mcq
            .options
            .iter()
            .map(|option| {
                if *option == mcq.answer {
                    format!("* {}", option)
                } else {
                    format!("  {}", option)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            (index + 1).to_string(),
            mcq.question.clone(),
            options,
            mcq.answer.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_verdict_text(verdict: &ReviewOutput, color: bool) -> String {
    let label = match verdict.verdict_status() {
        VerdictStatus::Pass => paint("PASS", Style::new().green().bold(), color),
        VerdictStatus::Fail => paint("FAIL", Style::new().red().bold(), color),
        VerdictStatus::Unrecognized => paint(
            &format!("{} (treated as pass)", verdict.status),
            Style::new().yellow().bold(),
            color,
        ),
    };

    let mut out = format!("{} {}\n", format_section_heading("Review", color), label);
    if verdict.feedback.is_empty() {
        out.push_str("  No feedback.\n");
    }
    for item in &verdict.feedback {
        out.push_str(&format!("  - {}\n", item));
    }
    out
}

pub fn format_failure_text(stage: Stage, error: &AgentError, color: bool) -> String {
    let label = paint("FAILED", Style::new().red().bold(), color);
    let mut out = format!("{} at stage {}: {}\n", label, stage, error);
    if let AgentError::ModelOutputInvalid(invalid) = error {
        if let OutputDefect::MissingField(field) = &invalid.defect {
            out.push_str(&format!("  Missing field: {}\n", field));
        }
        out.push_str("  Raw model output:\n");
        out.push_str(&indent(&truncate_chars(&invalid.raw, RAW_PREVIEW_CHARS), "    "));
        out.push('\n');
    }
    out
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
