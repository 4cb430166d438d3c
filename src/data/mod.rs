//! Data preparation: tabular I/O, the distance index, and the merge of
//! freight records with distances.
//!
//! ```text
//! distances.csv ──load──→ DistanceIndex ─┐
//!                                        ├─ merge ─→ modeling table
//! freight_costs.csv ──load──→ records ───┘
//! ```

pub mod distance;
pub mod merge;
pub mod tabular;

pub use distance::DistanceIndex;
pub use merge::merge;
pub use tabular::{TableRow, load_tabular, write_tabular};
