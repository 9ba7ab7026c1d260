//! Markdown rendering of the analysis history.
//!
//! Every record renders with the same fixed template: a heading with the
//! record's timestamp in local display form, then a labeled section per
//! present field, then a separator line. Absent fields are omitted
//! entirely, never rendered as empty sections.

use chrono::Local;

use crate::error::JournalError;
use crate::models::AnalysisRecord;

/// Render the full history, in ledger (chronological) order.
///
/// Refuses to produce a document for an empty history; the caller turns
/// [`JournalError::NothingToExport`] into a user notice.
pub fn generate_history_document(history: &[AnalysisRecord]) -> Result<String, JournalError> {
    if history.is_empty() {
        return Err(JournalError::NothingToExport);
    }

    let mut output = String::new();
    for record in history {
        output.push_str(&render_record(record));
    }

    Ok(output)
}

/// Render a single record with the fixed per-record template.
pub fn render_record(record: &AnalysisRecord) -> String {
    let mut block = String::new();

    block.push_str(&format!("### Analysis from {}\n\n", record.local_timestamp()));

    if let Some(ref emotions) = record.emotions {
        block.push_str("**Emotional Analysis:**\n\n");
        for (label, intensity) in emotions {
            block.push_str(&format!("- {}: {:.2}\n", label, intensity));
        }
        block.push('\n');
    }

    if let Some(ref insight) = record.psychoanalytic_response {
        block.push_str("**Psychoanalytic Insights:**\n\n");
        block.push_str(insight);
        block.push_str("\n\n");
    }

    if let Some(ref insights) = record.personality_insights {
        block.push_str("**Personality Insights:**\n\n");
        for (label, assessment) in insights {
            block.push_str(&format!("- {}: {}\n", label, assessment));
        }
        block.push('\n');
    }

    block.push_str("---\n\n");

    block
}

/// File name for an export performed today, e.g.
/// `AI_Journal_Analysis_2024-03-01.md`.
pub fn export_file_name() -> String {
    format!(
        "AI_Journal_Analysis_{}.md",
        Local::now().format("%Y-%m-%d")
    )
}
