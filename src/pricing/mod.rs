//! Plan normalization, currency conversion, and cheapest-price reduction.

pub mod aggregate;
pub mod convert;
pub mod models;
pub mod normalize;

pub use aggregate::reduce;
pub use convert::{round_half_up, to_reference};
pub use models::{AggregatedRecord, PlanCategory, PricedObservation, RawObservation};
pub use normalize::{clean_price, normalize_plan_name};
