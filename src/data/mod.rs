//! Dashboard data model
//!
//! Every dashboard is a plain, immutable value: it is built once (from one of
//! the built-in literals or from a JSON/TOML definition) and never mutated
//! afterwards. All computation on these records is presentation formatting.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod builtin;
pub mod logistics;

/// A labelled row of numbers in a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    pub headers: Vec<String>,
    pub rows: Vec<MetricRecord>,
}

/// An independent percentage gauge drawn as a two-slice donut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutSlice {
    pub value: f64,
    pub color: String,
    pub label: String,
}

/// A labelled linear gauge row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressItem {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutLayer {
    pub name: String,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

/// Concentric rings; the first layer is the outermost ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredDonut {
    pub labels: Vec<String>,
    pub series: Vec<DonutLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A single labelled numeric series, drawn as a pie or a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Free-form table with pre-formatted cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    SummaryTable(MetricTable),
    DonutGauges {
        gauges: Vec<DonutSlice>,
    },
    ProgressBars {
        items: Vec<ProgressItem>,
    },
    LayeredDonut {
        chart: LayeredDonut,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    StatCard(StatCard),
    Insight {
        text: String,
    },
    PieChart(SeriesChart),
    BarChart(SeriesChart),
    Table(DataTable),
    Note {
        lines: Vec<String>,
    },
}

/// A widget plus the card chrome around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Title colour; falls back to the theme text colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(flatten)]
    pub widget: Widget,
}

impl Card {
    pub fn new(widget: Widget) -> Self {
        Self {
            title: None,
            accent: None,
            widget,
        }
    }

    pub fn titled(title: &str, accent: Option<&str>, widget: Widget) -> Self {
        Self {
            title: Some(title.to_string()),
            accent: accent.map(str::to_string),
            widget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Row,
    #[default]
    Column,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub direction: Direction,
    pub cards: Vec<Card>,
}

impl Section {
    pub fn row(cards: Vec<Card>) -> Self {
        Self {
            direction: Direction::Row,
            cards,
        }
    }

    pub fn column(cards: Vec<Card>) -> Self {
        Self {
            direction: Direction::Column,
            cards,
        }
    }
}

/// Colour scheme, as `#RRGGBB` strings. Missing fields take the light values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub card_background: String,
    pub text: String,
    pub muted: String,
    pub accent: String,
    pub header_background: String,
    pub header_text: String,
    pub stripe: String,
    /// Row-label colour in summary tables.
    pub label: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: "#F7FAFC".into(),
            card_background: "#FFFFFF".into(),
            text: "#444444".into(),
            muted: "#555555".into(),
            accent: "#A259F7".into(),
            header_background: "#1FB5FB".into(),
            header_text: "#FFFFFF".into(),
            stripe: "#F4F4F4".into(),
            label: "#13C5B4".into(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#121629".into(),
            card_background: "#232946".into(),
            text: "#FFFFFF".into(),
            muted: "#BEBEBE".into(),
            accent: "#FFC750".into(),
            header_background: "#232946".into(),
            header_text: "#FFC750".into(),
            stripe: "#1A1A2E".into(),
            label: "#FFC750".into(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    #[serde(default)]
    pub theme: Theme,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<String>,
}

/// A gauge or progress value outside the nominal percentage range.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageWarning {
    pub label: String,
    pub value: f64,
}

impl Dashboard {
    /// Names accepted by [`Dashboard::builtin`].
    pub const BUILTIN_NAMES: &'static [&'static str] = &["analytics", "logistics"];

    pub fn builtin(name: &str) -> Option<Dashboard> {
        match name {
            "analytics" => Some(Self::analytics()),
            "logistics" => Some(Self::logistics()),
            _ => None,
        }
    }

    /// The shipping-carrier report, derived from its carrier literal.
    pub fn logistics() -> Dashboard {
        logistics::CarrierReport::october().to_dashboard()
    }

    /// Load a dashboard definition from a `.json` or `.toml` file.
    pub fn from_path(path: &Path) -> Result<Dashboard> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let dashboard: Dashboard = match ext.as_str() {
            "json" => serde_json::from_str(&raw)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?,
            "toml" => toml::from_str(&raw)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?,
            other => {
                return Err(Error::ConfigError(format!(
                    "Unsupported dashboard format '{}' (expected .json or .toml)",
                    other
                )))
            }
        };
        for w in dashboard.percentage_warnings() {
            log::warn!(
                "'{}' has value {} outside 0..=100; it is displayed as-is",
                w.label,
                w.value
            );
        }
        Ok(dashboard)
    }

    /// Gauge and progress values outside `[0, 100]`. Nothing is rejected;
    /// geometry clamps while labels keep the literal value.
    pub fn percentage_warnings(&self) -> Vec<PercentageWarning> {
        let mut out = Vec::new();
        let mut check = |label: &str, value: f64| {
            if !(0.0..=100.0).contains(&value) {
                out.push(PercentageWarning {
                    label: label.to_string(),
                    value,
                });
            }
        };
        for card in self.sections.iter().flat_map(|s| s.cards.iter()) {
            match &card.widget {
                Widget::DonutGauges { gauges } => {
                    gauges.iter().for_each(|g| check(&g.label, g.value))
                }
                Widget::ProgressBars { items } => {
                    items.iter().for_each(|i| check(&i.label, i.value))
                }
                _ => {}
            }
        }
        out
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }
}

/// Integers render without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_percent(75.0), "75%");
    }

    #[test]
    fn builtin_lookup() {
        for name in Dashboard::BUILTIN_NAMES {
            assert!(Dashboard::builtin(name).is_some(), "missing {}", name);
        }
        assert!(Dashboard::builtin("nope").is_none());
    }

    #[test]
    fn out_of_range_values_are_reported_not_rejected() {
        let mut d = Dashboard::analytics();
        assert!(d.percentage_warnings().is_empty());
        d.sections.push(Section::column(vec![Card::new(Widget::ProgressBars {
            items: vec![ProgressItem {
                label: "JUN".into(),
                value: 184.0,
                color: "#A259F7".into(),
            }],
        })]));
        let w = d.percentage_warnings();
        assert_eq!(w, vec![PercentageWarning { label: "JUN".into(), value: 184.0 }]);
    }

    #[test]
    fn card_json_is_flat_and_tagged() {
        let card = Card::titled(
            "Notes",
            None,
            Widget::Insight {
                text: "hello".into(),
            },
        );
        let v = serde_json::to_value(&card).unwrap();
        assert_eq!(v["type"], "insight");
        assert_eq!(v["title"], "Notes");
        assert_eq!(v["text"], "hello");
        let back: Card = serde_json::from_value(v).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn loads_toml_definition() {
        let dir = std::env::temp_dir().join(format!("dashsnap-data-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mini.toml");
        std::fs::write(
            &path,
            r##"
title = "Mini"

[[sections]]
direction = "row"

[[sections.cards]]
type = "progress_bars"
title = "Budget"

[[sections.cards.items]]
label = "JAN"
value = 70
color = "#A259F7"
"##,
        )
        .unwrap();
        let d = Dashboard::from_path(&path).unwrap();
        assert_eq!(d.title, "Mini");
        assert_eq!(d.theme, Theme::light());
        assert_eq!(d.sections[0].direction, Direction::Row);
        match &d.sections[0].cards[0].widget {
            Widget::ProgressBars { items } => assert_eq!(items[0].value, 70.0),
            other => panic!("unexpected widget {:?}", other),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = std::env::temp_dir().join(format!("dashsnap-ext-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mini.yaml");
        std::fs::write(&path, "title: x").unwrap();
        assert!(matches!(Dashboard::from_path(&path), Err(Error::ConfigError(_))));
        std::fs::remove_dir_all(&dir).ok();
    }
}
