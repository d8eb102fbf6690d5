//! Data models for the policy dashboard.
//!
//! This module contains the wire-level policy records fetched from the
//! governance service, the chart-agnostic view models derived from them,
//! and the report structures written out at the end of a run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A data-governance policy record.
///
/// Core fields (id, status, validity window, rules) are required on the
/// wire. Everything else is descriptive metadata used only for display and
/// decoded through an explicit optional-field contract: absent fields
/// become `None` and are rendered as placeholders, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Opaque identifier, unique within a fetched batch.
    pub id: String,
    /// Status label. An open set: new labels may appear on the wire at any
    /// time, so this is deliberately not an enum.
    pub status: String,
    /// Start of the validity window.
    pub start_date: NaiveDate,
    /// End of the validity window.
    pub end_date: NaiveDate,
    /// Named rule toggles. Missing rules decode to disabled toggles with
    /// empty values.
    #[serde(default)]
    pub rules: RuleSet,
    /// Domain the policy applies to (display only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Owner contact details (display only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    /// Title/summary/content block (display only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    /// Free-form type tag (display only).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
}

impl Policy {
    /// One-line rendering used by the policy list and `--dry-run` output.
    pub fn summary_line(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            self.id, self.status, self.start_date, self.end_date
        )
    }
}

/// The named rule toggles carried by every policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Data-retention rule; its value is a string-encoded duration in months.
    #[serde(default)]
    pub data_retention: RuleToggle,
    /// Cookie-policy rule; only the enabled flag is charted.
    #[serde(default)]
    pub cookie_policy: RuleToggle,
}

/// A single named toggle: an enabled flag plus a free-form string value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleToggle {
    #[serde(default)]
    pub is_enabled: bool,
    /// Free-form. May or may not parse as an integer; aggregation degrades
    /// non-numeric values to zero rather than surfacing a parse failure.
    #[serde(default)]
    pub value: String,
}

/// Owner contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Title/summary/content metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

/// Response body of `GET /v2/policy`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyListEnvelope {
    #[serde(default)]
    pub policies: Vec<Policy>,
}

/// Response body of `GET /v2/policy/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyEnvelope {
    pub policy: Policy,
}

/// One status label with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Frequency table of status labels across a policy batch.
///
/// Labels keep their first-seen insertion order, which is why this is a
/// vector of pairs rather than a map: chart axes must come out in the same
/// order the statuses appeared in the fetched list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusDistribution {
    entries: Vec<StatusCount>,
}

impl StatusDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the count for `status`, appending it on first sight.
    pub(crate) fn increment(&mut self, status: &str) {
        match self.entries.iter_mut().find(|e| e.status == status) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(StatusCount {
                status: status.to_string(),
                count: 1,
            }),
        }
    }

    /// Count for a single label, if present.
    #[allow(dead_code)] // Lookup utility, exercised in tests
    pub fn get(&self, status: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.status == status)
            .map(|e| e.count)
    }

    /// Number of distinct status labels.
    #[allow(dead_code)] // Utility accessor
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts. Equals the length of the aggregated input.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusCount> {
        self.entries.iter()
    }
}

/// Single-value series behind the data-retention bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionSeries {
    /// Parsed retention duration; zero when the rule value was non-numeric
    /// or missing.
    pub months: i64,
}

impl RetentionSeries {
    /// Axis label carried over from the original dashboard.
    pub const LABEL: &'static str = "Data Retention Duration (months)";

    pub fn values(&self) -> [i64; 1] {
        [self.months]
    }
}

/// Fixed two-slot series behind the cookie-policy pie chart.
///
/// Slot 0 is 1 or 0 for the enabled flag; slot 1 is always 1, the "Other"
/// complement. The shape encodes a pie-chart convention and is not a
/// general boolean summary, so it stays exactly two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSeries {
    pub values: [u64; 2],
}

impl CookieSeries {
    /// Slice labels carried over from the original dashboard.
    pub const LABELS: [&'static str; 2] = ["Cookie Policy", "Other"];

    pub fn enabled(&self) -> bool {
        self.values[0] == 1
    }
}

/// Metadata block at the top of every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Base URL of the policy service the data came from.
    pub endpoint: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of policies in the fetched list.
    pub policy_count: usize,
    /// Identifier of the selected policy, if one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// A chart artifact the report links to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRef {
    pub title: String,
    pub path: String,
}

/// The complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// The fetched policy list, in service order.
    pub policies: Vec<Policy>,
    /// Status frequency table over `policies`.
    pub status_distribution: StatusDistribution,
    /// The selected policy, if one is displayable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Policy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<CookieSeries>,
    /// Chart artifacts written alongside the report.
    pub charts: Vec<ChartRef>,
}
