mod query;

pub use query::{DbConnector, QueryTool};
