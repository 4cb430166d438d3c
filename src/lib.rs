//! freightq - Freight-cost model training and quote generation
//!
//! Learns a freight-cost regressor from historical lane costs and lane
//! distances, then produces quote tables for unseen lanes.
//!
//! # Architecture
//!
//! ```text
//! Load tables → Distance Index → Merge → Train → Expand → Project → Write
//!      ↓              ↓            ↓       ↓        ↓         ↓        ↓
//!    csv +         HashMap      left     boosted  origins   history   csv
//!   dialect       last wins     join     trees   × targets  × history
//!   sniffing                            (rayon CV)
//! ```
//!
//! # Guarantees
//!
//! - Deterministic: one seed drives split, search, boosting and importance
//! - Lanes without a distance never reach a quote table silently: training
//!   drops them, expansion and projection fail naming the lane
//! - O(1) distance lookups during quote generation

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod quotes;
pub mod training;
pub mod types;

// Re-export core types
pub use error::{Error, Result, Stage};
pub use types::{Feature, LaneFeatures, LaneKey, LaneRecord, QuoteRecord, Regressor, Row};

// Re-export pipeline operations
pub use config::Config;
pub use data::{DistanceIndex, TableRow, load_tabular, merge, write_tabular};
pub use quotes::{DEFAULT_HORIZON_WEEKS, expand, project};
pub use training::{GradientBoostedTrees, TrainerConfig, TrainingReport, train};
