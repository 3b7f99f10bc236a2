//! Indicator model: indicators of compromise attached to detections.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Detection;
use crate::resource::{ApiResource, Resource};

/// An indicator of compromise.
#[derive(Debug, Clone)]
pub struct Indicator {
    resource: Resource,
}

#[async_trait]
impl ApiResource for Indicator {
    const KIND: &'static str = "indicator";

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl Indicator {
    /// Unique identifier of the indicator.
    pub async fn id(&mut self) -> Result<u64> {
        self.resource.get_u64("id").await
    }

    /// Indicator type, e.g. `"md5"` or `"domain"`.
    pub async fn indicator_type(&mut self) -> Result<String> {
        self.resource.get_string("type").await
    }

    /// Detections this indicator appeared in.
    pub async fn detections(&mut self) -> Result<Vec<Detection>> {
        self.resource.has_many("detections").await
    }
}
