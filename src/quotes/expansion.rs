//! Expand quotes to every origin × target destination.

use crate::data::DistanceIndex;
use crate::error::{Result, Stage};
use crate::types::{QuoteRecord, Regressor};

use super::{distinct_in_order, quote_cross_product};

/// Quote every origin known to the distance index against each target.
///
/// Origins come from the index in first-appearance order; targets keep
/// the caller's order with duplicates dropped. The result has exactly
/// `origins × distinct targets` rows, no lane repeated. Any lane without
/// a distance fails the whole expansion with
/// [`crate::Error::MissingDistance`].
pub fn expand<M>(
    model: &M,
    index: &DistanceIndex,
    target_destinations: &[i64],
) -> Result<Vec<QuoteRecord>>
where
    M: Regressor + ?Sized,
{
    let destinations = distinct_in_order(target_destinations.iter().copied());
    let quotes = quote_cross_product(
        model,
        index,
        index.origins(),
        &destinations,
        Stage::Expansion,
    )?;

    tracing::info!(
        stage = Stage::Expansion.as_str(),
        origins = index.origins().len(),
        destinations = destinations.len(),
        quotes = quotes.len(),
        "expanded quotes"
    );
    Ok(quotes)
}
