//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Serializes fetched or classified digests into a JSON [`Report`](json::Report)
//!
//! # Output Destinations
//!
//! ```text
//! stdout                 # default, one JSON document
//! --output out/run.json  # file, parent directories created on demand
//! ```

pub mod json;
