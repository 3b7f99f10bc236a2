//! Response plan model: remediation plans attached to detections.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Detection, Endpoint};
use crate::resource::{ApiResource, Resource};

/// A remediation response plan.
#[derive(Debug, Clone)]
pub struct ResponsePlan {
    resource: Resource,
}

#[async_trait]
impl ApiResource for ResponsePlan {
    const KIND: &'static str = "response_plan";

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl ResponsePlan {
    /// Unique identifier of the response plan.
    pub async fn id(&mut self) -> Result<u64> {
        self.resource.get_u64("id").await
    }

    /// Current state of the plan, e.g. `"open"`.
    pub async fn state(&mut self) -> Result<String> {
        self.resource.get_string("state").await
    }

    /// Who created the plan, as raw JSON. Not present in snippets.
    pub async fn creator(&mut self) -> Result<Value> {
        self.resource.get_field("creator").await
    }

    /// The endpoint the plan applies to.
    pub async fn endpoint(&mut self) -> Result<Endpoint> {
        self.resource.has_one("endpoint").await
    }

    /// The detection the plan responds to.
    pub async fn detection(&mut self) -> Result<Detection> {
        self.resource.has_one("detection").await
    }
}
