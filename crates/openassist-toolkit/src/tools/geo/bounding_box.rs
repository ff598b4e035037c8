use super::{GeometryProvider, walk_positions};
use openassist::async_trait;
use openassist::core::tool::{ToolCallError, ToolOutput, ToolRuntime};
use openassist_derive::{ToolInput, tool};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

#[derive(Serialize, Deserialize, ToolInput, Debug)]
pub struct BoundingBoxArgs {
    #[input(description = "Name of the dataset to compute the bounding box for")]
    dataset: String,
}

#[tool(
    name = "bounding_box",
    description = "Compute the bounding box of a GeoJSON dataset",
    input = BoundingBoxArgs,
)]
pub struct BoundingBoxTool {
    provider: GeometryProvider,
}

impl BoundingBoxTool {
    pub fn new(provider: GeometryProvider) -> Self {
        Self { provider }
    }
}

impl fmt::Debug for BoundingBoxTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundingBoxTool").finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolRuntime for BoundingBoxTool {
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolCallError> {
        let BoundingBoxArgs { dataset } = serde_json::from_value(args)?;

        debug!("Bounding Box Executing: dataset {dataset}");

        let geometry = (self.provider)(&dataset).map_err(ToolCallError::RuntimeError)?;

        let mut bounds: Option<[f64; 4]> = None;
        walk_positions(&geometry, &mut |x, y| {
            let b = bounds.get_or_insert([x, y, x, y]);
            b[0] = b[0].min(x);
            b[1] = b[1].min(y);
            b[2] = b[2].max(x);
            b[3] = b[3].max(y);
        });

        let [min_x, min_y, max_x, max_y] = bounds.ok_or_else(|| {
            ToolCallError::RuntimeError(
                format!("Dataset '{dataset}' contains no coordinates").into(),
            )
        })?;

        Ok(ToolOutput::with_additional_data(
            json!({
                "dataset": dataset,
                "bbox": [min_x, min_y, max_x, max_y],
            }),
            // A renderable polygon covering the bounds.
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [min_x, min_y],
                        [max_x, min_y],
                        [max_x, max_y],
                        [min_x, max_y],
                        [min_x, min_y],
                    ]],
                },
                "properties": {"dataset": dataset},
            }),
        ))
    }
}
