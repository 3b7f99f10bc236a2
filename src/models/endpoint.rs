//! Endpoint model: monitored hosts.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::Detection;
use crate::resource::{ApiResource, Resource};

/// A monitored endpoint (host).
///
/// Usually first seen as a snippet embedded in a detection; fields beyond
/// the snippet (e.g. `operating_system`) hydrate on first access.
#[derive(Debug, Clone)]
pub struct Endpoint {
    resource: Resource,
}

#[async_trait]
impl ApiResource for Endpoint {
    const KIND: &'static str = "endpoint";

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl Endpoint {
    /// Unique identifier of the endpoint.
    pub async fn id(&mut self) -> Result<u64> {
        self.resource.get_u64("id").await
    }

    /// Hostname as reported by the sensor.
    pub async fn hostname(&mut self) -> Result<String> {
        self.resource.get_string("hostname").await
    }

    /// Operating system description. Not present in snippets.
    pub async fn operating_system(&mut self) -> Result<String> {
        self.resource.get_string("operating_system").await
    }

    /// IP addresses observed on the endpoint, as raw JSON (the server
    /// reports these as objects with interface metadata).
    pub async fn ip_addresses(&mut self) -> Result<Value> {
        self.resource.get_field("ip_addresses").await
    }

    /// Sensor installed on the endpoint, as raw JSON.
    pub async fn sensor(&mut self) -> Result<Value> {
        self.resource.get_field("sensor").await
    }

    /// Detections recorded against this endpoint.
    pub async fn detections(&mut self) -> Result<Vec<Detection>> {
        self.resource.has_many("detections").await
    }
}
