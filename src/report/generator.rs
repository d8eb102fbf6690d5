//! Markdown report generation.
//!
//! This module renders the dashboard report from the store's view models:
//! policy list, status distribution, selected-policy details, and links to
//! the exported chart artifacts.

use crate::models::{CookieSeries, Policy, Report, ReportMetadata, RetentionSeries};
use anyhow::Result;

/// Placeholder shown while the selected policy has nothing displayable,
/// carried over from the original dashboard.
const LOADING_PLACEHOLDER: &str = "Loading policy data…";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Policyscope Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_policy_list_section(&report.policies));
    output.push_str(&generate_distribution_section(report));
    output.push_str(&generate_selected_section(report));
    output.push_str(&generate_charts_section(report));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Policy Service:** {}\n", metadata.endpoint));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Policies Fetched:** {}\n",
        metadata.policy_count
    ));
    if let Some(ref id) = metadata.selected_id {
        section.push_str(&format!("- **Selected Policy:** `{}`\n", id));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the policy list section.
fn generate_policy_list_section(policies: &[Policy]) -> String {
    let mut section = String::new();

    section.push_str("## Policy List\n\n");

    if policies.is_empty() {
        section.push_str("No policies were fetched.\n\n");
        return section;
    }

    section.push_str("| Id | Status | Start | End |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    for policy in policies {
        section.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            policy.id, policy.status, policy.start_date, policy.end_date
        ));
    }
    section.push('\n');

    section
}

/// Generate the status distribution section.
fn generate_distribution_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Policy Status Distribution\n\n");

    let distribution = &report.status_distribution;
    if distribution.is_empty() {
        section.push_str("No status data available.\n\n");
        return section;
    }

    section.push_str("| Status | Number of Policies |\n");
    section.push_str("|:---|:---:|\n");

    for entry in distribution.iter() {
        section.push_str(&format!("| {} | {} |\n", entry.status, entry.count));
    }
    section.push_str(&format!("| **Total** | **{}** |\n\n", distribution.total()));

    section
}

/// Generate the selected-policy details section.
fn generate_selected_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Selected Policy Details\n\n");

    let policy = match report.selected {
        Some(ref policy) => policy,
        None => {
            section.push_str(LOADING_PLACEHOLDER);
            section.push_str("\n\n");
            return section;
        }
    };

    section.push_str(&format!("- **ID:** `{}`\n", policy.id));
    section.push_str(&format!("- **Status:** {}\n", policy.status));
    section.push_str(&format!(
        "- **Domain:** {}\n",
        policy.domain.as_deref().unwrap_or("-")
    ));

    match policy.owner {
        Some(ref owner) => {
            section.push_str(&format!("- **Owner:** {}\n", owner.name));
            section.push_str(&format!("- **Email:** {}\n", owner.email));
            section.push_str(&format!("- **Phone:** {}\n", owner.phone));
        }
        None => section.push_str("- **Owner:** -\n"),
    }

    match policy.descriptor {
        Some(ref descriptor) => {
            section.push_str(&format!("- **Title:** {}\n", descriptor.title));
            section.push_str(&format!("- **Summary:** {}\n", descriptor.summary));
            section.push_str(&format!("- **Content:** {}\n", descriptor.content));
        }
        None => section.push_str("- **Title:** -\n"),
    }

    section.push_str(&format!(
        "- **Type:** {}\n\n",
        policy.policy_type.as_deref().unwrap_or("-")
    ));

    if let Some(retention) = report.retention {
        section.push_str("### Data Retention Duration\n\n");
        section.push_str(&format!(
            "| {} |\n|:---:|\n| {} |\n\n",
            RetentionSeries::LABEL,
            retention.months
        ));
    }

    if let Some(cookie) = report.cookie {
        section.push_str("### Cookie Policy\n\n");
        section.push_str(&format!(
            "| {} | {} |\n|:---:|:---:|\n| {} | {} |\n\n",
            CookieSeries::LABELS[0],
            CookieSeries::LABELS[1],
            cookie.values[0],
            cookie.values[1]
        ));
    }

    section
}

/// Generate the chart download links.
fn generate_charts_section(report: &Report) -> String {
    if report.charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Charts\n\n");
    for chart in &report.charts {
        section.push_str(&format!("- [Download {}]({})\n", chart.title, chart.path));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by policyscope*\n".to_string()
}
