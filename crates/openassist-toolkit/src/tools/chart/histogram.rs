use openassist::async_trait;
use openassist::core::tool::{ToolCallError, ToolOutput, ToolRuntime};
use openassist_derive::{ToolInput, tool};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Fetches the numeric values of a named variable.
pub type ValuesProvider =
    Arc<dyn Fn(&str) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

const DEFAULT_BINS: usize = 10;

#[derive(Serialize, Deserialize, ToolInput, Debug)]
pub struct HistogramArgs {
    #[input(description = "Name of the numeric variable to bin")]
    variable: String,
    #[input(description = "Number of equal-width bins, defaults to 10")]
    bins: Option<u32>,
}

#[tool(
    name = "histogram",
    description = "Bin a numeric variable into equal-width intervals and count the values per bin",
    input = HistogramArgs,
)]
pub struct HistogramTool {
    provider: ValuesProvider,
}

impl HistogramTool {
    pub fn new(provider: ValuesProvider) -> Self {
        Self { provider }
    }
}

impl fmt::Debug for HistogramTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistogramTool").finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolRuntime for HistogramTool {
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolCallError> {
        let HistogramArgs { variable, bins } = serde_json::from_value(args)?;
        let bin_count = bins.map(|b| b as usize).unwrap_or(DEFAULT_BINS).max(1);

        debug!("Histogram Executing: variable {variable}, {bin_count} bins");

        let values = (self.provider)(&variable).map_err(ToolCallError::RuntimeError)?;
        if values.is_empty() {
            return Err(ToolCallError::RuntimeError(
                format!("Variable '{variable}' has no values").into(),
            ));
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // Degenerate spread still gets one well-formed bin.
        let width = if max > min {
            (max - min) / bin_count as f64
        } else {
            1.0
        };

        let mut counts = vec![0usize; bin_count];
        let mut assignments = Vec::with_capacity(values.len());
        for &value in &values {
            let index = (((value - min) / width) as usize).min(bin_count - 1);
            counts[index] += 1;
            assignments.push(index);
        }

        let bins: Vec<Value> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                json!({
                    "start": min + width * i as f64,
                    "end": min + width * (i + 1) as f64,
                    "count": count,
                })
            })
            .collect();

        Ok(ToolOutput::with_additional_data(
            json!({
                "variable": variable,
                "value_count": values.len(),
                "min": min,
                "max": max,
                "bins": bins,
            }),
            // Per-value bin assignments for a renderer to highlight from.
            json!({
                "variable": variable,
                "assignments": assignments,
                "bin_width": width,
            }),
        ))
    }
}
