//! Detection model: confirmed threats published to the customer portal.

use async_trait::async_trait;
use url::Url;

use crate::collection::Collection;
use crate::error::{CanaryError, Result};
use crate::models::{Endpoint, Indicator, ResponsePlan, TimelineEntry};
use crate::resource::{unwrap_detail, ApiResource, Resource};

/// A confirmed detection.
///
/// List pages return full detection records; the embedded endpoint,
/// response plans, and timeline are snippets that hydrate on demand.
#[derive(Debug, Clone)]
pub struct Detection {
    resource: Resource,
}

#[async_trait]
impl ApiResource for Detection {
    const KIND: &'static str = "detection";

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

/// Outcome recorded when closing out a detection's remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationState {
    Remediated,
    NotRemediatedFalsePositive,
    NotRemediatedSanctionedActivity,
    NotRemediatedUnwarranted,
}

impl RemediationState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Remediated => "remediated",
            Self::NotRemediatedFalsePositive => "not_remediated_false_positive",
            Self::NotRemediatedSanctionedActivity => "not_remediated_sanctioned_activity",
            Self::NotRemediatedUnwarranted => "not_remediated_unwarranted",
        }
    }
}

impl Detection {
    /// Unique identifier of the detection.
    pub async fn id(&mut self) -> Result<u64> {
        self.resource.get_u64("id").await
    }

    /// One-line description, e.g. `"[1234] Malicious software on host"`.
    pub async fn headline(&mut self) -> Result<String> {
        self.resource.get_string("headline").await
    }

    /// Severity classification (`high`, `medium`, `low`).
    pub async fn severity(&mut self) -> Result<String> {
        self.resource.get_string("severity").await
    }

    /// Longer analyst-written summary.
    pub async fn summary(&mut self) -> Result<String> {
        self.resource.get_string("summary").await
    }

    /// When the detection was published.
    pub async fn date(&mut self) -> Result<String> {
        self.resource.get_string("date").await
    }

    /// Stable unique identifier string.
    pub async fn uid(&mut self) -> Result<String> {
        self.resource.get_string("uid").await
    }

    /// The endpoint the detection occurred on.
    pub async fn endpoint(&mut self) -> Result<Endpoint> {
        self.resource.has_one("endpoint").await
    }

    /// Response plans attached to this detection.
    pub async fn response_plans(&mut self) -> Result<Vec<ResponsePlan>> {
        self.resource.has_many("response_plans").await
    }

    /// The event timeline leading up to the detection.
    pub async fn timeline(&mut self) -> Result<Vec<TimelineEntry>> {
        self.resource.has_many("event_timeline").await
    }

    /// Number of indicators of compromise, from the embedded summary.
    /// Cheaper than sizing [`indicators`](Self::indicators).
    pub async fn num_indicators(&mut self) -> Result<u64> {
        let summary = self.resource.get_field("indicators").await?;
        summary
            .get("count")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| CanaryError::MalformedResponse {
                kind: Self::KIND,
                reason: "'indicators' summary has no 'count'".to_string(),
            })
    }

    /// The detection's indicators of compromise, as a paginated collection
    /// over the URL embedded in the detection record.
    pub async fn indicators(&mut self) -> Result<Collection<Indicator>> {
        let summary = self.resource.get_field("indicators").await?;
        let url = summary
            .get("url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| CanaryError::MalformedResponse {
                kind: Self::KIND,
                reason: "'indicators' summary has no 'url'".to_string(),
            })?;
        let url = Url::parse(url)?;
        Ok(Collection::at_url(self.resource.client().clone(), url))
    }

    /// Acknowledge the detection, taking ownership of its follow-up.
    /// Returns the updated detection as reported by the server.
    pub async fn acknowledge(&mut self) -> Result<Detection> {
        let id = self.id().await?;
        let client = self.resource.client().clone();
        let body = client
            .patch::<[(&str, &str)]>(&format!("detections/{id}/mark_acknowledged"), &[])
            .await?;
        let fields = unwrap_detail(Self::KIND, body)?;
        let resource = Resource::full(client, Self::KIND, serde_json::Value::Object(fields))?;
        Ok(Detection::from_resource(resource))
    }

    /// Record the remediation outcome for the detection, with an optional
    /// comment. Returns the updated detection.
    pub async fn update_remediation_state(
        &mut self,
        state: RemediationState,
        comment: Option<&str>,
    ) -> Result<Detection> {
        let id = self.id().await?;
        let client = self.resource.client().clone();

        let mut query = vec![("remediation_state", state.as_str())];
        if let Some(comment) = comment {
            query.push(("comment", comment));
        }

        let body = client
            .patch(&format!("detections/{id}/update_remediation_state"), &query)
            .await?;
        let fields = unwrap_detail(Self::KIND, body)?;
        let resource = Resource::full(client, Self::KIND, serde_json::Value::Object(fields))?;
        Ok(Detection::from_resource(resource))
    }
}
