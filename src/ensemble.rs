pub mod bagging;
pub mod boosting;
pub mod params;

pub use bagging::{Bagging, Sample};
pub use boosting::{Boosting, BoostingState};
pub use params::{BaggingParams, BaggingParamsBuilder, BoostingParams, BoostingParamsBuilder};
