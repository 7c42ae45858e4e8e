//! Chart kind and the geometry shared by the terminal renderer and image export:
//! line/bar points, value bounds, pie slices and the slice palette.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::record::Record;

/// Visualization mode, orthogonal to the data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    pub const ALL: [Self; 3] = [Self::Line, Self::Bar, Self::Pie];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Pie => "Pie",
        }
    }

    /// Name used in documents (`"line"`, `"bar"`, `"pie"`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Line => 0,
            Self::Bar => 1,
            Self::Pie => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl From<chartui_cli::ChartKindArg> for ChartKind {
    fn from(arg: chartui_cli::ChartKindArg) -> Self {
        match arg {
            chartui_cli::ChartKindArg::Line => Self::Line,
            chartui_cli::ChartKindArg::Bar => Self::Bar,
            chartui_cli::ChartKindArg::Pie => Self::Pie,
        }
    }
}

/// Pie slices cycle through this many colors by record index.
pub const PALETTE_SIZE: usize = 8;

pub const DEFAULT_PALETTE: [&str; PALETTE_SIZE] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
];

/// Palette slot for the record at `index`.
pub fn palette_slot(index: usize) -> usize {
    index % PALETTE_SIZE
}

/// (index, value) points, x = position in the list.
pub fn indexed_points(records: &[Record]) -> Vec<(f64, f64)> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.value))
        .collect()
}

/// Y range covering every value. Bars always include 0. A flat range is widened
/// so axes never collapse.
pub fn value_bounds(records: &[Record], include_zero: bool) -> (f64, f64) {
    let (mut min, mut max) = records
        .iter()
        .map(|r| r.value)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| {
            (a.min(v), b.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if max <= min {
        max = min + 1.0;
    }
    (min, max)
}

/// One slice of a pie chart. Angles are radians, counter-clockwise from 3 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    /// Position of the record in the list (drives the palette color).
    pub index: usize,
    pub name: String,
    pub value: f64,
    pub fraction: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl PieSlice {
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.sweep / 2.0
    }

    pub fn contains_angle(&self, angle: f64) -> bool {
        angle >= self.start_angle && angle < self.end_angle()
    }
}

/// Slices proportional to each value's share of the positive total.
/// Zero and negative values get no slice.
pub fn pie_slices(records: &[Record]) -> Vec<PieSlice> {
    let total: f64 = records.iter().map(|r| r.value).filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0;
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.value > 0.0)
        .map(|(index, r)| {
            let fraction = r.value / total;
            let slice = PieSlice {
                index,
                name: r.name.clone(),
                value: r.value,
                fraction,
                start_angle: start,
                sweep: fraction * TAU,
            };
            start += slice.sweep;
            slice
        })
        .collect()
}

/// Normalize an angle from `atan2` into `[0, TAU)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Format a value for labels: integers without decimals, others with up to 2.
pub fn format_value(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else if v.abs() >= 1e6 || v.abs() < 1e-2 {
        format!("{:.2e}", v)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
