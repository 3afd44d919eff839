pub mod calculators;
pub mod quality_enforcer;
pub mod schema_validator;

pub use quality_enforcer::{QualityEnforcer, MIN_QUALITY_SCORE};
pub use schema_validator::SchemaValidator;
