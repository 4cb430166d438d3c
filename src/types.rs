//! Core types for freightq - lanes, quotes and the model seam.
//!
//! Records are plain values: built once by a stage, passed by reference to
//! the next, never mutated afterwards. Serialized column names follow the
//! source data (`id_city_origin`, `id_city_destination`, ...), so output
//! files can be loaded back by the same reader.

use serde::{Deserialize, Serialize};

/// Number of model input features.
pub const FEATURE_COUNT: usize = 3;

/// Dense feature row in [`Feature::ALL`] order.
pub type Row = [f64; FEATURE_COUNT];

/// An (origin, destination) city pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneKey {
    pub origin_id: i64,
    pub destination_id: i64,
}

impl LaneKey {
    pub fn new(origin_id: i64, destination_id: i64) -> Self {
        Self {
            origin_id,
            destination_id,
        }
    }
}

/// One row of a freight or distance table.
///
/// `distance == None` marks a lane whose distance could not be resolved.
/// It is never coerced to 0.0 or NaN, so it cannot leak into a sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    #[serde(rename = "id_city_origin")]
    pub origin_id: i64,
    #[serde(rename = "id_city_destination")]
    pub destination_id: i64,
    pub distance: Option<f64>,
    pub freight_cost: Option<f64>,
}

impl LaneRecord {
    /// Row of a distance table.
    pub fn distance(origin_id: i64, destination_id: i64, distance: f64) -> Self {
        Self {
            origin_id,
            destination_id,
            distance: Some(distance),
            freight_cost: None,
        }
    }

    /// Row of a freight table, distance not yet resolved.
    pub fn freight(origin_id: i64, destination_id: i64, freight_cost: f64) -> Self {
        Self {
            origin_id,
            destination_id,
            distance: None,
            freight_cost: Some(freight_cost),
        }
    }

    pub fn key(&self) -> LaneKey {
        LaneKey::new(self.origin_id, self.destination_id)
    }

    /// Feature vector, if the distance is known.
    pub fn features(&self) -> Option<LaneFeatures> {
        self.distance.map(|distance| LaneFeatures {
            origin_id: self.origin_id,
            destination_id: self.destination_id,
            distance,
        })
    }
}

/// Model input for a single lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneFeatures {
    pub origin_id: i64,
    pub destination_id: i64,
    pub distance: f64,
}

impl LaneFeatures {
    pub fn to_row(&self) -> Row {
        [
            self.origin_id as f64,
            self.destination_id as f64,
            self.distance,
        ]
    }
}

/// A predicted freight cost for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    #[serde(rename = "id_city_origin")]
    pub origin_id: i64,
    #[serde(rename = "id_city_destination")]
    pub destination_id: i64,
    pub freight_cost: f64,
}

impl QuoteRecord {
    pub fn key(&self) -> LaneKey {
        LaneKey::new(self.origin_id, self.destination_id)
    }
}

/// Model input columns, in row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    OriginId,
    DestinationId,
    Distance,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] =
        [Feature::OriginId, Feature::DestinationId, Feature::Distance];

    /// Column position in a [`Row`].
    pub fn index(self) -> usize {
        match self {
            Feature::OriginId => 0,
            Feature::DestinationId => 1,
            Feature::Distance => 2,
        }
    }

    /// Column name as it appears in the source tables.
    pub fn column(self) -> &'static str {
        match self {
            Feature::OriginId => "id_city_origin",
            Feature::DestinationId => "id_city_destination",
            Feature::Distance => "distance",
        }
    }
}

/// A fitted cost model.
///
/// Implementations are pure after fitting and shared read-only between
/// the expansion and projection stages.
pub trait Regressor: Send + Sync {
    fn predict_row(&self, row: &Row) -> f64;

    fn predict(&self, features: &LaneFeatures) -> f64 {
        self.predict_row(&features.to_row())
    }
}

impl<F> Regressor for F
where
    F: Fn(&Row) -> f64 + Send + Sync,
{
    fn predict_row(&self, row: &Row) -> f64 {
        self(row)
    }
}
