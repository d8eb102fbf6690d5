//! The policy store: single source of truth for fetched data.
//!
//! Holds the full policy list and the independently fetched selected
//! policy, and owns the derived chart view models. All state is private;
//! mutations go through the methods below, and every mutation recomputes
//! the view models it affects so readers always see values consistent
//! with the data.

use crate::analysis::{cookie_series, retention_series, status_distribution};
use crate::models::{CookieSeries, Policy, RetentionSeries, StatusDistribution};
use tracing::warn;

/// Lifecycle of the selected-policy slot.
///
/// `Loading` and `Failed` carry the prior record (if any) so the view
/// keeps showing the last good data while a fetch is in flight or after
/// it failed. Failure is surfaced to logging only; there is no retry.
#[derive(Debug, Clone, Default)]
pub enum SelectedState {
    /// No selection was ever requested.
    #[default]
    Unset,
    /// A fetch is in flight.
    Loading { prior: Option<Box<Policy>> },
    /// The last fetch succeeded.
    Loaded(Box<Policy>),
    /// The last fetch failed; the prior record is retained for display.
    Failed { prior: Option<Box<Policy>> },
}

impl SelectedState {
    /// The record this state should display, if any.
    fn displayable(&self) -> Option<&Policy> {
        match self {
            SelectedState::Unset => None,
            SelectedState::Loading { prior } | SelectedState::Failed { prior } => {
                prior.as_deref()
            }
            SelectedState::Loaded(policy) => Some(policy),
        }
    }

    /// Consume the state, keeping whatever record it was displaying.
    fn into_displayable(self) -> Option<Box<Policy>> {
        match self {
            SelectedState::Unset => None,
            SelectedState::Loading { prior } | SelectedState::Failed { prior } => prior,
            SelectedState::Loaded(policy) => Some(policy),
        }
    }
}

/// Store for the fetched policy list, the selected policy, and the chart
/// view models derived from both.
#[derive(Debug, Default)]
pub struct PolicyStore {
    all_policies: Vec<Policy>,
    selected: SelectedState,
    status_distribution: StatusDistribution,
    retention_series: Option<RetentionSeries>,
    cookie_series: Option<CookieSeries>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the policy list wholesale and recompute the status
    /// distribution. There is no incremental merge: each successful list
    /// fetch fully discards the previous list and its aggregation.
    pub fn set_policies(&mut self, policies: Vec<Policy>) {
        self.all_policies = policies;
        self.status_distribution = status_distribution(&self.all_policies);
    }

    /// Mark the selected-policy fetch as started.
    ///
    /// Whatever the slot currently displays is carried into `Loading` so
    /// a re-fetch does not blank the view.
    pub fn begin_selected_fetch(&mut self) {
        let prior = std::mem::take(&mut self.selected).into_displayable();
        self.selected = SelectedState::Loading { prior };
        self.recompute_selected_series();
    }

    /// Resolve the selected-policy fetch with the fetched record.
    pub fn resolve_selected(&mut self, policy: Policy) {
        self.selected = SelectedState::Loaded(Box::new(policy));
        self.recompute_selected_series();
    }

    /// Mark the selected-policy fetch as failed, retaining the prior
    /// record (if any) for display.
    pub fn fail_selected(&mut self, reason: &str) {
        warn!("Selected-policy fetch failed: {}", reason);
        let prior = std::mem::take(&mut self.selected).into_displayable();
        self.selected = SelectedState::Failed { prior };
        self.recompute_selected_series();
    }

    fn recompute_selected_series(&mut self) {
        let selected = self.selected.displayable();
        self.retention_series = retention_series(selected);
        self.cookie_series = cookie_series(selected);
    }

    /// The fetched list, in service order.
    pub fn policies(&self) -> &[Policy] {
        &self.all_policies
    }

    /// The record the selected-policy slot currently displays.
    pub fn selected(&self) -> Option<&Policy> {
        self.selected.displayable()
    }

    /// Whether the last selected-policy fetch failed.
    #[allow(dead_code)] // State inspection utility
    pub fn selected_failed(&self) -> bool {
        matches!(self.selected, SelectedState::Failed { .. })
    }

    pub fn status_distribution(&self) -> &StatusDistribution {
        &self.status_distribution
    }

    pub fn retention_series(&self) -> Option<RetentionSeries> {
        self.retention_series
    }

    pub fn cookie_series(&self) -> Option<CookieSeries> {
        self.cookie_series
    }
}
