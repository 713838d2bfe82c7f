//! Chart configuration mapping
//!
//! Charts are described the way a charting library expects them: labels,
//! numeric datasets, per-slice colours and a few display options. The mappings
//! here are pure; drawing happens in [`crate::rendering::paint`].

use crate::data::{DonutSlice, LayeredDonut, SeriesChart};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cyclic palette used for pie and bar charts.
pub const PALETTE: [&str; 8] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#7C4DFF", "#009688", "#F44336", "#E91E63", "#00BCD4",
];

/// Track colour for the unfilled part of a gauge.
pub const GAUGE_TRACK: &str = "#EEEEEE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const WHITE: Rgba = Rgba(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba(0, 0, 0, 255);

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse(s: &str) -> Result<Rgba> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| Error::ConfigError(format!("Colour '{}' must start with '#'", s)))?;
        let bad = || Error::ConfigError(format!("Malformed colour '{}'", s));
        let nibble = |i: usize| {
            u8::from_str_radix(hex.get(i..i + 1).ok_or_else(bad)?, 16).map_err(|_| bad())
        };
        let byte = |i: usize| {
            u8::from_str_radix(hex.get(i..i + 2).ok_or_else(bad)?, 16).map_err(|_| bad())
        };
        match hex.len() {
            3 => Ok(Rgba(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255)),
            6 => Ok(Rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(bad()),
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.0, self.1, self.2, self.3]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Doughnut,
    Pie,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<Rgba>,
    pub border_width: u32,
}

impl Dataset {
    /// Colour for slice/bar `i`, cycling through the colour list.
    pub fn color_at(&self, i: usize) -> Rgba {
        if self.background_color.is_empty() {
            return Rgba::BLACK;
        }
        self.background_color[i % self.background_color.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Inner radius as a fraction of the outer radius (0 for a pie).
    pub cutout: f32,
    pub legend: bool,
    /// Colour for axis ticks and legend text.
    pub text_color: Rgba,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            cutout: 0.0,
            legend: false,
            text_color: Rgba(0x66, 0x66, 0x66, 255),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

fn palette() -> Result<Vec<Rgba>> {
    PALETTE.iter().map(|c| Rgba::parse(c)).collect()
}

/// A single gauge: `[value, 100 - value]` over a grey track.
pub fn gauge_config(slice: &DonutSlice) -> Result<ChartConfig> {
    Ok(ChartConfig {
        kind: ChartKind::Doughnut,
        labels: Vec::new(),
        datasets: vec![Dataset {
            label: slice.label.clone(),
            data: vec![slice.value, 100.0 - slice.value],
            background_color: vec![Rgba::parse(&slice.color)?, Rgba::parse(GAUGE_TRACK)?],
            border_width: 3,
        }],
        options: ChartOptions {
            cutout: 0.7,
            ..Default::default()
        },
    })
}

/// One concentric ring per layer; the first layer is drawn outermost.
pub fn layered_config(chart: &LayeredDonut) -> Result<ChartConfig> {
    let datasets = chart
        .series
        .iter()
        .map(|layer| {
            Ok(Dataset {
                label: layer.name.clone(),
                data: layer.values.clone(),
                background_color: layer
                    .colors
                    .iter()
                    .map(|c| Rgba::parse(c))
                    .collect::<Result<Vec<_>>>()?,
                border_width: 8,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ChartConfig {
        kind: ChartKind::Doughnut,
        labels: chart.labels.clone(),
        datasets,
        options: ChartOptions {
            cutout: 0.4,
            ..Default::default()
        },
    })
}

pub fn pie_config(series: &SeriesChart, text_color: Rgba) -> Result<ChartConfig> {
    Ok(ChartConfig {
        kind: ChartKind::Pie,
        labels: series.labels.clone(),
        datasets: vec![Dataset {
            label: String::new(),
            data: series.values.clone(),
            background_color: palette()?,
            border_width: 1,
        }],
        options: ChartOptions {
            legend: true,
            text_color,
            ..Default::default()
        },
    })
}

pub fn bar_config(series: &SeriesChart, text_color: Rgba) -> Result<ChartConfig> {
    Ok(ChartConfig {
        kind: ChartKind::Bar,
        labels: series.labels.clone(),
        datasets: vec![Dataset {
            label: String::new(),
            data: series.values.clone(),
            background_color: palette()?,
            border_width: 0,
        }],
        options: ChartOptions {
            text_color,
            ..Default::default()
        },
    })
}
