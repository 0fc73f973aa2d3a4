//! Plain-text formatting for command output.

use crate::api::Issue;
use crate::context::ProjectContext;
use crate::workflow::ScoredIssue;

/// Render a boxed table. Cells shorter than the widest entry in their
/// column are padded with spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
                .max(h.chars().count())
        })
        .collect();

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(cells.get(i).copied().unwrap_or(""), *w))
            .collect();
        format!("│ {} │", padded.join(" │ "))
    };

    let mut out = vec![
        border("┌", "┬", "┐"),
        line(headers.to_vec()),
        border("├", "┼", "┤"),
    ];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.push(border("└", "┴", "┘"));
    out.join("\n")
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Multi-line summary of an issue. The URL line is included when a project
/// context is available.
pub fn issue(issue: &Issue, project: Option<&ProjectContext>) -> String {
    let mut out = format!(
        "{} - {}\n  Type: {} | Priority: {} | Status: {}\n  Assignee: {}",
        issue.issue_key,
        issue.summary,
        issue.issue_type_name(),
        issue.priority_name(),
        issue.status_name(),
        issue.assignee_name(),
    );
    if let Some(project) = project {
        out.push_str(&format!("\n  URL: {}", project.issue_url(&issue.issue_key)));
    }
    out
}

/// Marker shown next to a recommendation.
pub fn priority_icon(priority: Option<&str>) -> &'static str {
    match priority {
        Some("High") => "🔴",
        Some("Normal") => "🟡",
        _ => "🟢",
    }
}

/// Numbered recommendation list for `next`.
pub fn recommendations(ranked: &[ScoredIssue<'_>]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let issue = scored.issue;
            format!(
                "{}. {} {} - {}\n   Type: {} | Priority: {}\n   Score: {:.1}/100",
                i + 1,
                priority_icon(issue.priority()),
                issue.issue_key,
                issue.summary,
                issue.issue_type_name(),
                issue.priority_name(),
                scored.score,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
