//! Policy aggregation into chart-ready view models.
//!
//! Everything in this module is pure: deterministic for a given input
//! order, no I/O, no shared state. The store calls these on every
//! mutation; the renderer and report generator consume the results.

use crate::models::{CookieSeries, Policy, RetentionSeries, StatusDistribution};

/// Count policies per status label, preserving first-seen label order.
///
/// An empty input yields an empty table. The counts always sum to the
/// input length.
pub fn status_distribution(policies: &[Policy]) -> StatusDistribution {
    let mut distribution = StatusDistribution::new();

    for policy in policies {
        distribution.increment(&policy.status);
    }

    distribution
}

/// Derive the data-retention series for the selected policy.
///
/// Returns `None` when no policy is selected (no chart-worthy data). A
/// rule value that does not start with an integer yields a series of
/// exactly 0 — degrading quietly is the contract, not an omission.
pub fn retention_series(policy: Option<&Policy>) -> Option<RetentionSeries> {
    policy.map(|p| RetentionSeries {
        months: parse_leading_int(&p.rules.data_retention.value),
    })
}

/// Derive the cookie-policy series for the selected policy.
///
/// The result is always the fixed two-slot shape `[enabled, 1]`; the
/// constant second slot is the pie chart's "Other" complement.
pub fn cookie_series(policy: Option<&Policy>) -> Option<CookieSeries> {
    policy.map(|p| CookieSeries {
        values: [u64::from(p.rules.cookie_policy.is_enabled), 1],
    })
}

/// Parse the leading integer of a free-form rule value, zero on failure.
///
/// Accepts an optional sign followed by digits, ignoring surrounding
/// whitespace and any trailing text ("6 months" parses as 6). Values the
/// original data source emits are duration counts encoded as strings.
fn parse_leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start();

    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digit_count = digits.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_count == 0 {
        return 0;
    }

    digits[..digit_count].parse::<i64>().map_or(0, |n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RuleSet, RuleToggle};
    use chrono::NaiveDate;

    fn create_test_policy(status: &str, retention: &str, cookies_enabled: bool) -> Policy {
        Policy {
            id: format!("policy-{}", status),
            status: status.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            rules: RuleSet {
                data_retention: RuleToggle {
                    is_enabled: true,
                    value: retention.to_string(),
                },
                cookie_policy: RuleToggle {
                    is_enabled: cookies_enabled,
                    value: String::new(),
                },
            },
            domain: None,
            owner: None,
            descriptor: None,
            policy_type: None,
        }
    }

    #[test]
    fn test_status_distribution_counts_and_order() {
        let policies = vec![
            create_test_policy("active", "6", true),
            create_test_policy("active", "6", true),
            create_test_policy("expired", "6", true),
        ];

        let dist = status_distribution(&policies);

        assert_eq!(dist.get("active"), Some(2));
        assert_eq!(dist.get("expired"), Some(1));
        assert_eq!(dist.len(), 2);

        let labels: Vec<_> = dist.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(labels, vec!["active", "expired"]);
    }

    #[test]
    fn test_status_distribution_sums_to_input_length() {
        let policies = vec![
            create_test_policy("active", "1", false),
            create_test_policy("draft", "2", false),
            create_test_policy("expired", "3", false),
            create_test_policy("draft", "4", false),
        ];

        let dist = status_distribution(&policies);
        assert_eq!(dist.total(), policies.len() as u64);
    }

    #[test]
    fn test_status_distribution_empty_input() {
        let dist = status_distribution(&[]);
        assert!(dist.is_empty());
        assert_eq!(dist.total(), 0);
    }

    #[test]
    fn test_retention_series_numeric_value() {
        let policy = create_test_policy("active", "12", true);
        let series = retention_series(Some(&policy)).unwrap();
        assert_eq!(series.months, 12);
        assert_eq!(series.values(), [12]);
    }

    #[test]
    fn test_retention_series_non_numeric_degrades_to_zero() {
        let policy = create_test_policy("active", "abc", true);
        assert_eq!(retention_series(Some(&policy)).unwrap().months, 0);

        let policy = create_test_policy("active", "", true);
        assert_eq!(retention_series(Some(&policy)).unwrap().months, 0);
    }

    #[test]
    fn test_retention_series_leading_integer_prefix() {
        let policy = create_test_policy("active", "6 months", true);
        assert_eq!(retention_series(Some(&policy)).unwrap().months, 6);

        let policy = create_test_policy("active", "  24  ", true);
        assert_eq!(retention_series(Some(&policy)).unwrap().months, 24);

        let policy = create_test_policy("active", "-3", true);
        assert_eq!(retention_series(Some(&policy)).unwrap().months, -3);
    }

    #[test]
    fn test_retention_series_no_selection() {
        assert!(retention_series(None).is_none());
    }

    #[test]
    fn test_cookie_series_enabled() {
        let policy = create_test_policy("active", "6", true);
        let series = cookie_series(Some(&policy)).unwrap();
        assert_eq!(series.values, [1, 1]);
        assert!(series.enabled());
    }

    #[test]
    fn test_cookie_series_disabled() {
        let policy = create_test_policy("active", "6", false);
        let series = cookie_series(Some(&policy)).unwrap();
        assert_eq!(series.values, [0, 1]);
        assert!(!series.enabled());
    }

    #[test]
    fn test_cookie_series_no_selection() {
        assert!(cookie_series(None).is_none());
    }
}
