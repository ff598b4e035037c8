// This file contains all the tools available in the toolkit.

#[cfg(all(not(target_arch = "wasm32"), feature = "sql"))]
pub mod sql;

#[cfg(feature = "geo")]
pub mod geo;

#[cfg(feature = "chart")]
pub mod chart;
