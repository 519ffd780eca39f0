//! Plain-data figure descriptions.
//!
//! Nothing here draws. A [`Figure`] holds everything a plotting frontend needs
//! (traces, limits, labels, colors) and serializes to JSON for it.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trace colors, serialized with matplotlib's names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "b")]
    Blue,
    #[serde(rename = "r")]
    Red,
    #[serde(rename = "k")]
    Black,
    #[serde(rename = "y")]
    Yellow,
    #[serde(rename = "orange")]
    Orange,
    #[serde(rename = "brown")]
    Brown,
    #[serde(rename = "pink")]
    Pink,
    #[serde(rename = "g")]
    Green,
    #[serde(rename = "c")]
    Cyan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLocation {
    UpperRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: Option<String>,
    pub color: Color,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    /// Pairs samples up to the shorter of the two inputs
    pub fn new(x: &[f64], y: &[f64], color: Color) -> Self {
        let len = x.len().min(y.len());
        Series {
            label: None,
            color,
            x: x[..len].to_vec(),
            y: y[..len].to_vec(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// One set of axes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: Option<String>,
    pub series: Vec<Series>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub legend: Option<LegendLocation>,
}

impl Panel {
    pub fn plot(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_xlim(&mut self, low: f64, high: f64) {
        self.xlim = Some((low, high));
    }

    pub fn set_ylim(&mut self, low: f64, high: f64) {
        self.ylim = Some((low, high));
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.xlabel = Some(label.into());
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.ylabel = Some(label.into());
    }

    pub fn set_legend(&mut self, loc: LegendLocation) {
        self.legend = Some(loc);
    }

    /// Labels of the labelled series, in plotting order
    pub fn labels(&self) -> Vec<&str> {
        self.series
            .iter()
            .filter_map(|series| series.label.as_deref())
            .collect()
    }
}

/// Number of stacked panels in a cell figure
pub const PANELS: usize = 3;

/// Vertically stacked panels sharing the x axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Width and height in inches; `None` lets the frontend decide
    pub size: Option<(f64, f64)>,
    /// Vertical space between panels, as a fraction of panel height
    pub hspace: f64,
    pub sharex: bool,
    pub panels: [Panel; PANELS],
}

impl Figure {
    pub fn subplots(size: Option<(f64, f64)>, hspace: f64) -> Self {
        Figure {
            size,
            hspace,
            sharex: true,
            panels: std::array::from_fn(|_| Panel::default()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
