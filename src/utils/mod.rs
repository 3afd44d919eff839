pub mod logging;
pub mod payload;

pub use payload::{extract_payload, strip_code_fence};
