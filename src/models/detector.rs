//! Detector model: the analytics that identify suspicious activity.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::resource::{ApiResource, Resource};

/// A Red Canary detector.
///
/// Detector records use the JSON-API envelope, so most fields live under
/// `attributes`; the accessors below read through it transparently.
#[derive(Debug, Clone)]
pub struct Detector {
    resource: Resource,
}

#[async_trait]
impl ApiResource for Detector {
    const KIND: &'static str = "detector";

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl Detector {
    /// Unique identifier of the detector.
    pub async fn id(&mut self) -> Result<u64> {
        self.resource.get_u64("id").await
    }

    /// Name of the detector.
    pub async fn name(&mut self) -> Result<String> {
        self.resource.get_string("name").await
    }

    /// Description of the activity the detector identifies, in Markdown.
    pub async fn description(&mut self) -> Result<String> {
        self.resource.get_string("description").await
    }

    /// The type of adversary intelligence supporting this detector.
    pub async fn contributing_intelligence(&mut self) -> Result<String> {
        self.resource.get_string("contributing_intelligence").await
    }

    /// The ATT&CK techniques the detector maps to. Empty if the server
    /// reports none.
    pub async fn attack_technique_identifiers(&mut self) -> Result<Vec<String>> {
        let value = self
            .resource
            .try_field("attack_technique_identifiers")
            .await?;
        let ids = match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        Ok(ids)
    }

    /// Resources related to this detector, as raw JSON.
    pub async fn relationships(&mut self) -> Result<Value> {
        self.resource.get_field("relationships").await
    }
}
