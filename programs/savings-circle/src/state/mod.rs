//! Account state for circles and their funding requests

pub mod circle;
pub mod funding_request;

pub use circle::*;
pub use funding_request::*;
