//! Plain-text frequency report.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::stats::{frequency::FrequencyTable, CorpusStats};

const RULE_WIDTH: usize = 50;

/// Naming for one report section.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    /// Singular, capitalised: "Medication".
    pub singular: &'static str,
    /// Plural, capitalised: "Medications".
    pub plural: &'static str,
}

pub const MEDICATIONS: Category = Category {
    singular: "Medication",
    plural: "Medications",
};

pub const DISEASES: Category = Category {
    singular: "Disease",
    plural: "Diseases",
};

/// Render `(label, count)` rows as `label → count times`, with labels padded
/// to the widest label and counts right-aligned to the widest count.
pub fn format_rows(rows: &[(&str, usize)]) -> Vec<String> {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let count_width = rows
        .iter()
        .map(|(_, count)| count.to_string().len())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(label, count)| format!("{label:<label_width$} → {count:>count_width$} times"))
        .collect()
}

/// One statistics block: banner, totals, then the top-`n` table.
pub fn render_section(category: Category, table: &FrequencyTable, top_n: usize) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let plural_lower = category.plural.to_lowercase();
    let mut out = String::new();
    out.push_str(&format!(
        "{heavy}\n{} STATISTICS\n{heavy}\n\n",
        category.singular.to_uppercase()
    ));
    out.push_str(&format!("Total {plural_lower} found: {}\n", table.total()));
    out.push_str(&format!("Unique {plural_lower}: {}\n\n", table.distinct()));
    out.push_str(&format!(
        "Top {top_n} Most Common {}:\n{light}\n",
        category.plural
    ));
    for line in format_rows(&table.top_n(top_n)) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Full report for a corpus run.
pub fn render_report(stats: &CorpusStats, top_n: usize) -> String {
    let mut out = format!("Processed {} clinical notes", stats.notes_processed);
    if stats.rows_skipped > 0 {
        out.push_str(&format!(" ({} rows skipped)", stats.rows_skipped));
    }
    out.push_str("\n\n");
    out.push_str(&render_section(MEDICATIONS, &stats.medications, top_n));
    out.push('\n');
    out.push_str(&render_section(DISEASES, &stats.diseases, top_n));
    out
}

/// Persist the report with a generation timestamp header.
pub fn write_report(path: &Path, report: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let stamped = format!("# generated {}\n\n{report}", Utc::now().to_rfc3339());
    std::fs::write(path, stamped).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}
