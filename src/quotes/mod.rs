//! Quote generation from a fitted model.
//!
//! - **Expansion**: every origin of the distance table × a caller-chosen
//!   list of target destinations.
//! - **Projection**: every origin × every destination already present in a
//!   quote table, nominally over a future horizon.
//!
//! Both stages share one rule: a lane without a known distance is a hard
//! error naming the lane. A partial quote table is never returned.

pub mod expansion;
pub mod projection;

pub use expansion::expand;
pub use projection::{DEFAULT_HORIZON_WEEKS, project};

use std::collections::HashSet;
use std::hash::Hash;

use crate::data::DistanceIndex;
use crate::error::{Error, Result, Stage};
use crate::types::{LaneFeatures, QuoteRecord, Regressor};

/// Distinct values in order of first appearance.
pub(crate) fn distinct_in_order<T, I>(values: I) -> Vec<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}

/// Predict every origin × destination lane, origins outermost.
pub(crate) fn quote_cross_product<M>(
    model: &M,
    index: &DistanceIndex,
    origins: &[i64],
    destinations: &[i64],
    stage: Stage,
) -> Result<Vec<QuoteRecord>>
where
    M: Regressor + ?Sized,
{
    let mut quotes = Vec::with_capacity(origins.len() * destinations.len());

    for &origin_id in origins {
        for &destination_id in destinations {
            let distance =
                index
                    .get(origin_id, destination_id)
                    .ok_or(Error::MissingDistance {
                        stage,
                        origin: origin_id,
                        destination: destination_id,
                    })?;

            let features = LaneFeatures {
                origin_id,
                destination_id,
                distance,
            };
            quotes.push(QuoteRecord {
                origin_id,
                destination_id,
                freight_cost: model.predict(&features),
            });
        }
    }

    Ok(quotes)
}
