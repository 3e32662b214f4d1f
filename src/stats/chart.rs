//! Chart data handed to an external renderer as Vega-Lite specs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::stats::frequency::FrequencyTable;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    pub color: String,
}

/// Renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// Horizontal bars, highest first.
    Bar {
        title: String,
        x_label: String,
        color: String,
        rows: Vec<(String, usize)>,
    },
    Pie {
        title: String,
        slices: Vec<PieSlice>,
    },
}

/// Top-`n` entries of `table` as a horizontal bar chart.
pub fn top_bar_chart(title: &str, color: &str, table: &FrequencyTable, n: usize) -> Chart {
    Chart::Bar {
        title: title.to_string(),
        x_label: "Frequency".to_string(),
        color: color.to_string(),
        rows: table
            .top_n(n)
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect(),
    }
}

/// Share of medication mentions against disease mentions.
pub fn distribution_pie(medications: usize, diseases: usize) -> Chart {
    Chart::Pie {
        title: "Medications vs Diseases Distribution".to_string(),
        slices: vec![
            PieSlice {
                label: "Medications".to_string(),
                value: medications,
                color: "skyblue".to_string(),
            },
            PieSlice {
                label: "Diseases".to_string(),
                value: diseases,
                color: "lightcoral".to_string(),
            },
        ],
    }
}

/// Boundary to whatever draws the charts.
pub trait ChartSink {
    /// Receive a named group of charts meant to be drawn side by side.
    fn render(&mut self, name: &str, charts: &[Chart]) -> Result<()>;
}

/// Writes each chart group to `<out_dir>/<name>.vl.json`.
pub struct VegaLiteSink {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl VegaLiteSink {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartSink for VegaLiteSink {
    fn render(&mut self, name: &str, charts: &[Chart]) -> Result<()> {
        let mut spec = match charts {
            [single] => to_vega_lite(single),
            many => {
                let panels: Vec<Value> = many.iter().map(to_vega_lite).collect();
                json!({ "hconcat": panels })
            }
        };
        spec["$schema"] = json!(VEGA_LITE_SCHEMA);

        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{name}.vl.json"));
        let body = serde_json::to_string_pretty(&spec)?;
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), charts = charts.len(), "wrote chart spec");
        self.written.push(path);
        Ok(())
    }
}

fn to_vega_lite(chart: &Chart) -> Value {
    match chart {
        Chart::Bar {
            title,
            x_label,
            color,
            rows,
        } => {
            let values: Vec<Value> = rows
                .iter()
                .map(|(label, count)| json!({ "label": label, "count": count }))
                .collect();
            json!({
                "title": title,
                "data": { "values": values },
                "mark": { "type": "bar", "color": color },
                "encoding": {
                    "y": { "field": "label", "type": "nominal", "sort": "-x", "title": null },
                    "x": { "field": "count", "type": "quantitative", "title": x_label }
                }
            })
        }
        Chart::Pie { title, slices } => {
            let total: usize = slices.iter().map(|s| s.value).sum();
            let values: Vec<Value> = slices
                .iter()
                .map(|s| {
                    let share = if total == 0 {
                        0.0
                    } else {
                        (s.value as f64 * 1000.0 / total as f64).round() / 10.0
                    };
                    json!({ "label": s.label, "value": s.value, "share": share })
                })
                .collect();
            let domain: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
            let range: Vec<&str> = slices.iter().map(|s| s.color.as_str()).collect();
            json!({
                "title": title,
                "data": { "values": values },
                "mark": { "type": "arc", "tooltip": true },
                "encoding": {
                    "theta": { "field": "value", "type": "quantitative", "stack": true },
                    "color": {
                        "field": "label",
                        "type": "nominal",
                        "scale": { "domain": domain, "range": range }
                    }
                }
            })
        }
    }
}
