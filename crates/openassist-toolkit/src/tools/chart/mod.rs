mod histogram;

pub use histogram::{HistogramTool, ValuesProvider};
