//! Timeline entry model: the event sequence embedded in a detection.

use std::borrow::Cow;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::resource::{ApiResource, Resource};

/// One entry in a detection's event timeline.
///
/// Timeline entries are always embedded in their detection record and carry
/// no self URL, so every field they will ever have is already present;
/// accessors for fields that only apply to some entry types return
/// `Option`.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    resource: Resource,
}

#[async_trait]
impl ApiResource for TimelineEntry {
    const KIND: &'static str = "timeline_entry";

    // "timeline_entrys" from the default pluralization is not a path the
    // server knows.
    fn path() -> Cow<'static, str> {
        Cow::Borrowed("timeline_entries")
    }

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl TimelineEntry {
    /// When the event occurred.
    pub async fn timestamp(&mut self) -> Result<String> {
        self.resource.get_string("timestamp").await
    }

    /// Event type: `Process`, `FileModification`, `RegistryModification`,
    /// or `NetworkConnection`.
    pub async fn entry_type(&mut self) -> Result<String> {
        self.resource.get_string("type").await
    }

    /// Whether this entry is an indicator of compromise. Metadata entries
    /// that carry no flag report `false`.
    pub async fn is_ioc(&mut self) -> Result<bool> {
        let value = self.resource.try_field("is_ioc").await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Filesystem or registry path. Only meaningful for process and
    /// modification entries.
    pub async fn path(&mut self) -> Result<Option<String>> {
        let entry_type = self.entry_type().await?;
        if !matches!(
            entry_type.as_str(),
            "Process" | "FileModification" | "RegistryModification"
        ) {
            return Ok(None);
        }
        Ok(self.opt_string("path").await?)
    }

    /// MD5 of the file involved, if any.
    pub async fn md5(&mut self) -> Result<Option<String>> {
        self.opt_string("md5").await
    }

    /// Kind of file modification (`create`, `delete`, ...), if any.
    pub async fn modification(&mut self) -> Result<Option<String>> {
        self.opt_string("modification").await
    }

    /// Network connection direction (`inbound`/`outbound`), if any.
    pub async fn direction(&mut self) -> Result<Option<String>> {
        self.opt_string("direction").await
    }

    /// Remote domain of a network connection, if any.
    pub async fn domain(&mut self) -> Result<Option<String>> {
        self.opt_string("domain").await
    }

    /// Remote IP of a network connection, if any.
    pub async fn ip(&mut self) -> Result<Option<String>> {
        self.opt_string("ip").await
    }

    /// Remote port of a network connection, if any. The server reports
    /// this as either a number or a numeric string.
    pub async fn port(&mut self) -> Result<Option<u64>> {
        let value = self.resource.try_field("port").await?;
        Ok(value.and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }))
    }

    /// Raw IP protocol number of a network connection, if any.
    pub async fn protocol(&mut self) -> Result<Option<String>> {
        let value = self.resource.try_field("protocol").await?;
        Ok(value.map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    /// IP protocol name for the known protocol numbers.
    pub async fn protocol_name(&mut self) -> Result<Option<&'static str>> {
        Ok(match self.protocol().await?.as_deref() {
            Some("6") => Some("TCP"),
            Some("17") => Some("UDP"),
            _ => None,
        })
    }

    async fn opt_string(&mut self, name: &str) -> Result<Option<String>> {
        let value = self.resource.try_field(name).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }
}
