//! GeoJSON geometry utilities over an injected dataset provider.

mod bounding_box;
mod centroid;

pub use bounding_box::BoundingBoxTool;
pub use centroid::CentroidTool;

use serde_json::Value;
use std::sync::Arc;

/// Fetches the GeoJSON for a named dataset. Injected so tools stay agnostic
/// of where geometries live.
pub type GeometryProvider =
    Arc<dyn Fn(&str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// Walk every position (`[x, y, ...]` array) in a GeoJSON fragment.
///
/// Positions can sit at any nesting depth (Point, LineString, Polygon,
/// Multi* and GeometryCollection all differ), so the walk recurses through
/// arrays and the `geometry`/`geometries`/`features` keys.
pub(crate) fn walk_positions(value: &Value, visit: &mut impl FnMut(f64, f64)) {
    match value {
        Value::Array(items) => {
            if let [Value::Number(x), Value::Number(y), ..] = items.as_slice() {
                if let (Some(x), Some(y)) = (x.as_f64(), y.as_f64()) {
                    visit(x, y);
                }
                return;
            }
            for item in items {
                walk_positions(item, visit);
            }
        }
        Value::Object(map) => {
            for key in ["coordinates", "geometry", "geometries", "features"] {
                if let Some(inner) = map.get(key) {
                    walk_positions(inner, visit);
                }
            }
        }
        _ => {}
    }
}
