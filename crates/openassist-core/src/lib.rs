pub mod assistant;
pub mod cache;
pub mod dispatch;
pub mod error;
pub mod tool;

pub use error::Error;
