//! Lazy resources and the resource descriptor trait.
//!
//! The API returns records in two flavors: list endpoints and embedded
//! relationships carry abbreviated "snippets", while detail endpoints return
//! the full representation. [`Resource`] wraps a raw JSON object and hides
//! the difference: a field lookup that misses on a snippet fetches the full
//! record from the snippet's self URL exactly once, then retries the lookup.

use std::borrow::Cow;

use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use crate::client::CanaryClient;
use crate::collection::Collection;
use crate::error::{CanaryError, Result};

/// Backing state of a [`Resource`].
///
/// A snippet may upgrade to full exactly once (hydration); a full resource
/// never goes back.
#[derive(Debug, Clone)]
enum ResourceState {
    /// Partial record from a list page or an embedded relationship.
    Snippet {
        fields: Map<String, Value>,
        self_url: Option<String>,
    },
    /// Complete record from a detail response.
    Full { fields: Map<String, Value> },
}

/// A lazily-loaded API resource backed by a raw JSON object.
///
/// Field access on a snippet that misses triggers one GET of the snippet's
/// self URL ("hydration"), replaces the backing data with the full record,
/// and retries the lookup. A miss on a full resource is a
/// [`MissingField`](CanaryError::MissingField) error. Hydration failure
/// leaves the snippet untouched, so a later access may retry the fetch.
#[derive(Debug, Clone)]
pub struct Resource {
    client: CanaryClient,
    kind: &'static str,
    state: ResourceState,
}

impl Resource {
    /// Wrap a raw JSON object as a snippet. No network call is made; the
    /// self URL for later hydration is taken from the object's `url` field,
    /// or `links.self.href` if absent.
    pub fn snippet(client: CanaryClient, kind: &'static str, value: Value) -> Result<Self> {
        let fields = object_fields(kind, value)?;
        let self_url = self_url_of(&fields);
        Ok(Self {
            client,
            kind,
            state: ResourceState::Snippet { fields, self_url },
        })
    }

    /// Wrap a raw JSON object as a full record. No network call is made.
    pub fn full(client: CanaryClient, kind: &'static str, value: Value) -> Result<Self> {
        let fields = object_fields(kind, value)?;
        Ok(Self {
            client,
            kind,
            state: ResourceState::Full { fields },
        })
    }

    /// The kind name this resource was built as, e.g. `"detection"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether this resource is still a partial snippet.
    pub fn is_snippet(&self) -> bool {
        matches!(self.state, ResourceState::Snippet { .. })
    }

    pub(crate) fn client(&self) -> &CanaryClient {
        &self.client
    }

    fn fields(&self) -> &Map<String, Value> {
        match &self.state {
            ResourceState::Snippet { fields, .. } => fields,
            ResourceState::Full { fields } => fields,
        }
    }

    /// Look a field up in the backing data without any side effect.
    /// Checks the top level first, then the JSON-API `attributes` object.
    fn lookup(&self, name: &str) -> Option<&Value> {
        let fields = self.fields();
        fields.get(name).or_else(|| {
            fields
                .get("attributes")
                .and_then(Value::as_object)
                .and_then(|attrs| attrs.get(name))
        })
    }

    /// Get a field, hydrating the resource first if it is a snippet that
    /// does not carry the field.
    ///
    /// A field present in the backing data is returned without any network
    /// call, full or snippet. If the field is still absent after hydration
    /// the error is [`MissingField`](CanaryError::MissingField); that case
    /// is a contract mismatch and is never retried.
    pub async fn get_field(&mut self, name: &str) -> Result<Value> {
        if let Some(value) = self.lookup(name) {
            return Ok(value.clone());
        }

        let self_url = match &self.state {
            ResourceState::Full { .. } => {
                return Err(CanaryError::MissingField {
                    kind: self.kind,
                    field: name.to_string(),
                })
            }
            ResourceState::Snippet { self_url, .. } => {
                self_url.clone().ok_or(CanaryError::MissingSelfUrl { kind: self.kind })?
            }
        };

        let url = Url::parse(&self_url)?;
        tracing::debug!(kind = self.kind, url = %url, "hydrating snippet");
        let body = self.client.get_url(url).await?;
        let fields = unwrap_detail(self.kind, body)?;
        // Only reached on success: a failed fetch leaves the snippet as-is.
        self.state = ResourceState::Full { fields };

        self.lookup(name)
            .cloned()
            .ok_or_else(|| CanaryError::MissingField {
                kind: self.kind,
                field: name.to_string(),
            })
    }

    /// Like [`get_field`](Self::get_field), but maps a missing field (or a
    /// snippet with no self URL to hydrate from) to `None`. Transport and
    /// parse errors still propagate.
    pub async fn try_field(&mut self, name: &str) -> Result<Option<Value>> {
        match self.get_field(name).await {
            Ok(value) => Ok(Some(value)),
            Err(CanaryError::MissingField { .. }) | Err(CanaryError::MissingSelfUrl { .. }) => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Get a field as a string.
    pub async fn get_string(&mut self, name: &str) -> Result<String> {
        let value = self.get_field(name).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CanaryError::MalformedResponse {
                kind: self.kind,
                reason: format!("field '{name}' is not a string"),
            })
    }

    /// Get a field as an unsigned integer.
    pub async fn get_u64(&mut self, name: &str) -> Result<u64> {
        let value = self.get_field(name).await?;
        value
            .as_u64()
            .ok_or_else(|| CanaryError::MalformedResponse {
                kind: self.kind,
                reason: format!("field '{name}' is not an integer"),
            })
    }

    /// A has-one association: wrap the embedded object under `field` as a
    /// snippet of `T`. Hydrates first if the field is missing from a
    /// snippet. The returned resource is independent of this one.
    pub async fn has_one<T: ApiResource>(&mut self, field: &str) -> Result<T> {
        let value = self.get_field(field).await?;
        let resource = Resource::snippet(self.client.clone(), T::KIND, value)?;
        Ok(T::from_resource(resource))
    }

    /// A has-many association: wrap each element of the array under `field`
    /// as a snippet of `T`.
    pub async fn has_many<T: ApiResource>(&mut self, field: &str) -> Result<Vec<T>> {
        let value = self.get_field(field).await?;
        let items = match value {
            Value::Array(items) => items,
            _ => {
                return Err(CanaryError::MalformedResponse {
                    kind: self.kind,
                    reason: format!("field '{field}' is not an array"),
                })
            }
        };
        items
            .into_iter()
            .map(|item| {
                let resource = Resource::snippet(self.client.clone(), T::KIND, item)?;
                Ok(T::from_resource(resource))
            })
            .collect()
    }

    /// The backing data as a JSON object.
    pub fn as_json(&self) -> Value {
        Value::Object(self.fields().clone())
    }
}

/// Static descriptor binding a resource kind to its collection endpoint.
///
/// Implementors get `all` and `find` for free. The collection path defaults
/// to the kind name pluralized by adding an `s`; kinds with irregular paths
/// (e.g. `response_plan` -> `response_plans`) override [`path`](Self::path).
#[async_trait]
pub trait ApiResource: Sized + Send {
    /// Singular kind name, e.g. `"detection"`.
    const KIND: &'static str;

    /// Collection path under the API base URL.
    fn path() -> Cow<'static, str> {
        Cow::Owned(format!("{}s", Self::KIND))
    }

    /// Wrap an already-built lazy resource.
    fn from_resource(resource: Resource) -> Self;

    /// Access the underlying lazy resource.
    fn resource_mut(&mut self) -> &mut Resource;

    /// The collection of all resources of this kind.
    ///
    /// Nothing is fetched until the collection is first sized or iterated.
    fn all(client: &CanaryClient) -> Collection<Self> {
        Collection::new(client.clone())
    }

    /// Fetch a single resource by ID. The result is a full record.
    async fn find(client: &CanaryClient, id: u64) -> Result<Self> {
        let body = client.get(&format!("{}/{id}", Self::path())).await?;
        let fields = unwrap_detail(Self::KIND, body)?;
        let resource = Resource {
            client: client.clone(),
            kind: Self::KIND,
            state: ResourceState::Full { fields },
        };
        Ok(Self::from_resource(resource))
    }
}

/// Coerce a raw item into its field map, rejecting non-objects.
pub(crate) fn object_fields(kind: &'static str, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(CanaryError::MalformedResponse {
            kind,
            reason: format!("expected a JSON object, got {}", type_name(&other)),
        }),
    }
}

/// Unwrap a detail response body into the record's field map.
///
/// Detail endpoints wrap the record as `{"data": [item]}`; hydration via a
/// self URL may return `{"data": item}` or the bare object. All three are
/// accepted.
pub(crate) fn unwrap_detail(kind: &'static str, body: Value) -> Result<Map<String, Value>> {
    let record = match body {
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(mut items)) => {
                if items.is_empty() {
                    return Err(CanaryError::MalformedResponse {
                        kind,
                        reason: "empty 'data' array in detail response".to_string(),
                    });
                }
                items.swap_remove(0)
            }
            Some(item @ Value::Object(_)) => item,
            Some(other) => {
                return Err(CanaryError::MalformedResponse {
                    kind,
                    reason: format!("'data' is {}, expected object or array", type_name(&other)),
                })
            }
            None => Value::Object(fields),
        },
        other => {
            return Err(CanaryError::MalformedResponse {
                kind,
                reason: format!("expected a JSON object, got {}", type_name(&other)),
            })
        }
    };
    object_fields(kind, record)
}

fn self_url_of(fields: &Map<String, Value>) -> Option<String> {
    if let Some(url) = fields.get("url").and_then(Value::as_str) {
        return Some(url.to_string());
    }
    fields
        .get("links")
        .and_then(|links| links.get("self"))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
