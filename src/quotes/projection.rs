//! Project historical quotes forward.

use crate::data::DistanceIndex;
use crate::error::{Result, Stage};
use crate::types::{QuoteRecord, Regressor};

use super::{distinct_in_order, quote_cross_product};

/// Default projection horizon, in weeks.
pub const DEFAULT_HORIZON_WEEKS: usize = 52;

/// Re-quote every distinct origin × distinct destination of `historical`.
///
/// The horizon is recorded in the log but does not shape the output: the
/// features carry no time component, so every week would predict the same
/// cost. The table stays flat, one row per lane.
pub fn project<M>(
    model: &M,
    historical: &[QuoteRecord],
    index: &DistanceIndex,
    horizon: usize,
) -> Result<Vec<QuoteRecord>>
where
    M: Regressor + ?Sized,
{
    let origins = distinct_in_order(historical.iter().map(|q| q.origin_id));
    let destinations = distinct_in_order(historical.iter().map(|q| q.destination_id));

    let quotes =
        quote_cross_product(model, index, &origins, &destinations, Stage::Projection)?;

    tracing::info!(
        stage = Stage::Projection.as_str(),
        horizon_weeks = horizon,
        origins = origins.len(),
        destinations = destinations.len(),
        quotes = quotes.len(),
        "projected quotes"
    );
    Ok(quotes)
}
