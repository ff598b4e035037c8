use super::{GeometryProvider, walk_positions};
use openassist::async_trait;
use openassist::core::tool::{ToolCallError, ToolOutput, ToolRuntime};
use openassist_derive::{ToolInput, tool};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

#[derive(Serialize, Deserialize, ToolInput, Debug)]
pub struct CentroidArgs {
    #[input(description = "Name of the dataset to compute the centroid for")]
    dataset: String,
}

#[tool(
    name = "centroid",
    description = "Compute the centroid of a GeoJSON dataset as the mean of its coordinates",
    input = CentroidArgs,
)]
pub struct CentroidTool {
    provider: GeometryProvider,
}

impl CentroidTool {
    pub fn new(provider: GeometryProvider) -> Self {
        Self { provider }
    }
}

impl fmt::Debug for CentroidTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CentroidTool").finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolRuntime for CentroidTool {
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolCallError> {
        let CentroidArgs { dataset } = serde_json::from_value(args)?;

        debug!("Centroid Executing: dataset {dataset}");

        let geometry = (self.provider)(&dataset).map_err(ToolCallError::RuntimeError)?;

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut count = 0usize;
        walk_positions(&geometry, &mut |x, y| {
            sum_x += x;
            sum_y += y;
            count += 1;
        });

        if count == 0 {
            return Err(ToolCallError::RuntimeError(
                format!("Dataset '{dataset}' contains no coordinates").into(),
            ));
        }

        let x = sum_x / count as f64;
        let y = sum_y / count as f64;

        Ok(ToolOutput::with_additional_data(
            json!({
                "dataset": dataset,
                "centroid": [x, y],
                "positions": count,
            }),
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [x, y]},
                "properties": {"dataset": dataset},
            }),
        ))
    }
}
