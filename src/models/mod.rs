//! Typed accessors over the lazy resources returned by the API.

mod detection;
mod detector;
mod endpoint;
mod indicator;
mod response_plan;
mod timeline;

pub use detection::{Detection, RemediationState};
pub use detector::Detector;
pub use endpoint::Endpoint;
pub use indicator::Indicator;
pub use response_plan::ResponsePlan;
pub use timeline::TimelineEntry;
