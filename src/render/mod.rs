//! Chart rendering.
//!
//! View models go in, standalone SVG documents come out. Each chart lives
//! on a named surface that owns at most one artifact at a time: a redraw
//! releases the previous artifact before acquiring the new one, so a
//! surface can never hold two drawings. Exported artifacts are the file
//! counterpart of the dashboard's image-download links.

use crate::models::{ChartRef, CookieSeries, RetentionSeries};
use crate::store::PolicyStore;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

// Chart.js default-palette colors carried over from the original dashboard.
const BAR_FILL: &str = "rgba(75, 192, 192, 0.6)";
const BAR_STROKE: &str = "rgba(75, 192, 192, 1)";
const PIE_FILLS: [&str; 2] = ["rgba(255, 99, 132, 0.6)", "rgba(255, 159, 64, 0.6)"];
const PIE_STROKES: [&str; 2] = ["rgba(255, 99, 132, 1)", "rgba(255, 159, 64, 1)"];

const MARGIN: f64 = 36.0;

/// A rendered chart: an SVG document plus the name it downloads as.
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    title: String,
    file_name: String,
    svg: String,
}

impl ChartArtifact {
    #[allow(dead_code)] // Accessor for inspection
    pub fn title(&self) -> &str {
        &self.title
    }

    #[allow(dead_code)] // Accessor for inspection
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[allow(dead_code)] // Accessor for inspection
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Write the artifact into `dir`, returning a report-ready reference.
    pub fn write_to(&self, dir: &Path) -> Result<ChartRef> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.svg)
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;

        Ok(ChartRef {
            title: self.title.clone(),
            path: path.to_string_lossy().to_string(),
        })
    }
}

/// A drawing surface holding at most one chart artifact.
#[derive(Debug, Default)]
pub struct ChartSurface {
    name: &'static str,
    current: Option<ChartArtifact>,
}

impl ChartSurface {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: None,
        }
    }

    /// Replace the surface's artifact.
    ///
    /// The previous artifact is released first; the surface never holds
    /// two drawings at once.
    pub fn redraw(&mut self, artifact: ChartArtifact) -> &ChartArtifact {
        if let Some(previous) = self.current.take() {
            debug!(
                "Released previous {} chart ({} bytes)",
                self.name,
                previous.svg.len()
            );
        }
        self.current.insert(artifact)
    }

    /// Drop the current artifact, leaving the surface blank.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&ChartArtifact> {
        self.current.as_ref()
    }
}

/// The three chart surfaces of the dashboard.
pub struct ChartSet {
    status: ChartSurface,
    retention: ChartSurface,
    cookie: ChartSurface,
    width: u32,
    height: u32,
}

impl ChartSet {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            status: ChartSurface::new("policy_status"),
            retention: ChartSurface::new("data_retention"),
            cookie: ChartSurface::new("cookie_policy"),
            width,
            height,
        }
    }

    /// Redraw every surface from the store's current view models.
    ///
    /// Surfaces whose view model has no chart-worthy data are cleared, not
    /// left showing a stale drawing.
    pub fn redraw_from_store(&mut self, store: &PolicyStore) {
        let distribution = store.status_distribution();
        if distribution.is_empty() {
            self.status.clear();
        } else {
            let labels: Vec<&str> = distribution.iter().map(|e| e.status.as_str()).collect();
            let values: Vec<i64> = distribution.iter().map(|e| e.count as i64).collect();
            self.status.redraw(ChartArtifact {
                title: "Policy Status Distribution".to_string(),
                file_name: "policy_status_chart.svg".to_string(),
                svg: bar_chart_svg(
                    "Policy Status Distribution",
                    &labels,
                    &values,
                    self.width,
                    self.height,
                ),
            });
        }

        match store.retention_series() {
            Some(series) => {
                self.retention.redraw(ChartArtifact {
                    title: RetentionSeries::LABEL.to_string(),
                    file_name: "data_retention_chart.svg".to_string(),
                    svg: bar_chart_svg(
                        RetentionSeries::LABEL,
                        &["Data Retention Duration"],
                        &series.values(),
                        self.width,
                        self.height,
                    ),
                });
            }
            None => self.retention.clear(),
        }

        match store.cookie_series() {
            Some(series) => {
                self.cookie.redraw(ChartArtifact {
                    title: "Cookie Policy".to_string(),
                    file_name: "cookie_policy_chart.svg".to_string(),
                    svg: pie_chart_svg(
                        "Cookie Policy",
                        &CookieSeries::LABELS,
                        &series.values,
                        self.width,
                        self.height,
                    ),
                });
            }
            None => self.cookie.clear(),
        }
    }

    /// Write every drawn artifact into `dir`, creating it if needed.
    ///
    /// Returns the references in dashboard order for the report to link.
    pub fn export(&self, dir: &Path) -> Result<Vec<ChartRef>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;

        let mut refs = Vec::new();
        for surface in [&self.status, &self.retention, &self.cookie] {
            if let Some(artifact) = surface.current() {
                refs.push(artifact.write_to(dir)?);
            }
        }

        Ok(refs)
    }
}

/// Render a vertical bar chart as a standalone SVG document.
fn bar_chart_svg(title: &str, labels: &[&str], values: &[i64], width: u32, height: u32) -> String {
    let width = f64::from(width);
    let height = f64::from(height);
    let plot_width = width - 2.0 * MARGIN;
    let plot_height = height - 2.0 * MARGIN;
    let baseline = height - MARGIN;

    // Y axis begins at zero; negative values clamp to the baseline.
    let max_value = values.iter().copied().max().unwrap_or(0).max(1) as f64;

    let mut svg = svg_header(width, height, title);

    // Axes
    svg.push_str(&format!(
        r##"  <line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="#666" stroke-width="1"/>
  <line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="#666" stroke-width="1"/>
"##,
        m = MARGIN,
        b = baseline,
        r = width - MARGIN,
    ));

    let slot = plot_width / labels.len().max(1) as f64;
    let bar_width = slot * 0.6;

    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        let bar_height = ((*value).max(0) as f64 / max_value) * plot_height;
        let x = MARGIN + i as f64 * slot + (slot - bar_width) / 2.0;
        let y = baseline - bar_height;
        let center = x + bar_width / 2.0;

        svg.push_str(&format!(
            r##"  <rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}" stroke="{stroke}" stroke-width="1"/>
  <text x="{c:.1}" y="{vy:.1}" text-anchor="middle" font-size="11" fill="#333">{value}</text>
  <text x="{c:.1}" y="{ly:.1}" text-anchor="middle" font-size="11" fill="#333">{label}</text>
"##,
            w = bar_width,
            h = bar_height,
            fill = BAR_FILL,
            stroke = BAR_STROKE,
            c = center,
            vy = y - 4.0,
            ly = baseline + 14.0,
            label = escape_xml(label),
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render a pie chart as a standalone SVG document.
///
/// Zero-valued slices are skipped; a slice covering the whole pie is drawn
/// as a full circle since a 360-degree arc path degenerates.
fn pie_chart_svg(title: &str, labels: &[&str], values: &[u64], width: u32, height: u32) -> String {
    let width = f64::from(width);
    let height = f64::from(height);
    let radius = (height - 2.0 * MARGIN).min(width / 2.0 - MARGIN) / 2.0;
    let cx = width / 3.0;
    let cy = height / 2.0;

    let total = values.iter().sum::<u64>().max(1) as f64;

    let mut svg = svg_header(width, height, title);
    let mut angle = -std::f64::consts::FRAC_PI_2;

    for (i, value) in values.iter().enumerate() {
        if *value == 0 {
            continue;
        }

        let fill = PIE_FILLS[i % PIE_FILLS.len()];
        let stroke = PIE_STROKES[i % PIE_STROKES.len()];
        let fraction = *value as f64 / total;

        if fraction >= 0.999 {
            svg.push_str(&format!(
                r#"  <circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="{fill}" stroke="{stroke}" stroke-width="1"/>
"#,
            ));
            angle += std::f64::consts::TAU;
            continue;
        }

        let sweep = fraction * std::f64::consts::TAU;
        let (x1, y1) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        let end = angle + sweep;
        let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
        let large_arc = i32::from(sweep > std::f64::consts::PI);

        svg.push_str(&format!(
            r#"  <path d="M {cx:.1} {cy:.1} L {x1:.1} {y1:.1} A {radius:.1} {radius:.1} 0 {large_arc} 1 {x2:.1} {y2:.1} Z" fill="{fill}" stroke="{stroke}" stroke-width="1"/>
"#,
        ));

        angle = end;
    }

    // Legend
    let legend_x = width * 2.0 / 3.0;
    for (i, label) in labels.iter().enumerate() {
        let y = cy - 12.0 + i as f64 * 22.0;
        let fill = PIE_FILLS[i % PIE_FILLS.len()];
        svg.push_str(&format!(
            r##"  <rect x="{legend_x:.1}" y="{ry:.1}" width="12" height="12" fill="{fill}"/>
  <text x="{tx:.1}" y="{ty:.1}" font-size="12" fill="#333">{label}</text>
"##,
            ry = y - 10.0,
            tx = legend_x + 18.0,
            ty = y,
            label = escape_xml(label),
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn svg_header(width: f64, height: f64, title: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
  <rect width="{width}" height="{height}" fill="white"/>
  <text x="{tx}" y="20" text-anchor="middle" font-size="14" font-weight="bold" fill="#111">{title}</text>
"##,
        tx = width / 2.0,
        title = escape_xml(title),
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Policy, RuleSet, RuleToggle};
    use chrono::NaiveDate;

    fn create_test_policy(status: &str, retention: &str, cookies: bool) -> Policy {
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
                    is_enabled: cookies,
                    value: String::new(),
                },
            },
            domain: None,
            owner: None,
            descriptor: None,
            policy_type: None,
        }
    }

    fn test_artifact(marker: &str) -> ChartArtifact {
        ChartArtifact {
            title: marker.to_string(),
            file_name: format!("{}.svg", marker),
            svg: format!("<svg>{}</svg>", marker),
        }
    }

    #[test]
    fn test_redraw_replaces_previous_artifact() {
        let mut surface = ChartSurface::new("test");
        surface.redraw(test_artifact("first"));
        surface.redraw(test_artifact("second"));

        let current = surface.current().unwrap();
        assert_eq!(current.title(), "second");
        assert!(!current.svg().contains("first"));
    }

    #[test]
    fn test_clear_releases_artifact() {
        let mut surface = ChartSurface::new("test");
        surface.redraw(test_artifact("only"));
        surface.clear();
        assert!(surface.current().is_none());
    }

    #[test]
    fn test_bar_chart_contains_bars_and_labels() {
        let svg = bar_chart_svg("Statuses", &["active", "expired"], &[2, 1], 400, 200);

        assert_eq!(svg.matches("<rect").count(), 3); // background + 2 bars
        assert!(svg.contains(">active</text>"));
        assert!(svg.contains(">expired</text>"));
        assert!(svg.contains(BAR_FILL));
    }

    #[test]
    fn test_bar_chart_escapes_labels() {
        let svg = bar_chart_svg("t", &["a<b"], &[1], 400, 200);
        assert!(svg.contains("a&lt;b"));
        assert!(!svg.contains(">a<b<"));
    }

    #[test]
    fn test_pie_chart_enabled_draws_two_slices() {
        let svg = pie_chart_svg("Cookie Policy", &CookieSeries::LABELS, &[1, 1], 400, 200);

        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("Cookie Policy</text>"));
        assert!(svg.contains("Other</text>"));
    }

    #[test]
    fn test_pie_chart_disabled_draws_full_circle() {
        // [0, 1]: the zero slice is skipped and the remaining slice covers
        // the whole pie.
        let svg = pie_chart_svg("Cookie Policy", &CookieSeries::LABELS, &[0, 1], 400, 200);

        assert_eq!(svg.matches("<path").count(), 0);
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_chart_set_redraw_and_export() {
        let mut store = crate::store::PolicyStore::new();
        store.set_policies(vec![
            create_test_policy("active", "6", true),
            create_test_policy("expired", "6", true),
        ]);
        store.begin_selected_fetch();
        store.resolve_selected(create_test_policy("active", "6", true));

        let mut charts = ChartSet::new(400, 200);
        charts.redraw_from_store(&store);

        let dir = tempfile::tempdir().unwrap();
        let refs = charts.export(dir.path()).unwrap();

        assert_eq!(refs.len(), 3);
        assert!(dir.path().join("policy_status_chart.svg").exists());
        assert!(dir.path().join("data_retention_chart.svg").exists());
        assert!(dir.path().join("cookie_policy_chart.svg").exists());
    }

    #[test]
    fn test_chart_set_empty_store_exports_nothing() {
        let store = crate::store::PolicyStore::new();
        let mut charts = ChartSet::new(400, 200);
        charts.redraw_from_store(&store);

        let dir = tempfile::tempdir().unwrap();
        let refs = charts.export(dir.path()).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_redraw_clears_surface_when_data_goes_away() {
        let mut store = crate::store::PolicyStore::new();
        store.begin_selected_fetch();
        store.resolve_selected(create_test_policy("active", "6", true));

        let mut charts = ChartSet::new(400, 200);
        charts.redraw_from_store(&store);
        assert!(charts.retention.current().is_some());

        store.begin_selected_fetch();
        store.fail_selected("gone");
        // Prior record retained, series still derived, surface stays drawn.
        charts.redraw_from_store(&store);
        assert!(charts.retention.current().is_some());

        let empty = crate::store::PolicyStore::new();
        charts.redraw_from_store(&empty);
        assert!(charts.retention.current().is_none());
        assert!(charts.status.current().is_none());
    }
}
