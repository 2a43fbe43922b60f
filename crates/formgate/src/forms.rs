//! Form and submission operations built on the [`GatewayClient`].
//!
//! Submission ids never leave this layer in raw form: responses carry an
//! `obfuscated_id` produced by the [`IdCodec`], and incoming external ids are
//! decoded before any request is made. Form paths are checked the same way.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use formgate_std::{GetNow, SystemClock};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{AUDIT_EMAIL_FIELD, GatewayClient};
use crate::codec::IdCodec;
use crate::error::{GatewayError, InvalidIdentifier, Result};
use crate::permissions::Principal;
use crate::tags::ResourceTags;

const FORM_LIST_PATH: &str = "form?type=form&select=title,name,path,tags,components";
const FORM_FIELDS: &str = "select=title,tags,name,components";

/// One entry of the form catalogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSummary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub name: String,
    /// Link into this service, `<application_root>view/<form path>`.
    pub path: String,
    pub category: Vec<String>,
    pub description: String,
}

/// A submission as listed to its author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionSummary {
    pub obfuscated_id: String,
    pub created: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

pub struct FormsService<C = SystemClock> {
    client: GatewayClient<C>,
    codec: IdCodec,
    application_root: String,
}

impl<C> FormsService<C>
where
    C: GetNow<Instant = SystemTime>,
{
    pub fn new(client: GatewayClient<C>, codec: IdCodec, application_root: impl Into<String>) -> Self {
        Self {
            client,
            codec,
            application_root: application_root.into(),
        }
    }

    pub fn encode_id(&self, internal_id: &str) -> std::result::Result<String, InvalidIdentifier> {
        self.codec.encode(internal_id)
    }

    pub fn decode_id(&self, external_id: &str) -> std::result::Result<String, InvalidIdentifier> {
        self.codec.decode(external_id)
    }

    /// Forms the caller may see, optionally restricted to one category
    /// (case-insensitive).
    pub async fn list_forms(
        &self,
        principal: &Principal,
        category: Option<&str>,
    ) -> Result<Vec<FormSummary>> {
        let body = self.client.get(principal, FORM_LIST_PATH, None).await?;
        let forms = into_array(body)?;
        let wanted = category.map(str::trim).filter(|c| !c.is_empty());

        let mut summaries = Vec::with_capacity(forms.len());
        for form in forms {
            let tags = ResourceTags::of(&form);
            if !tags.is_tagged() {
                continue;
            }
            let ResourceTags::Present { set, .. } = tags else {
                continue;
            };
            if let Some(wanted) = wanted {
                if !set.has_category(wanted) {
                    continue;
                }
            }
            summaries.push(FormSummary {
                id: string_field(&form, "_id"),
                title: string_field(&form, "title").unwrap_or_default(),
                name: string_field(&form, "name").unwrap_or_default(),
                path: format!(
                    "{}view/{}",
                    self.application_root,
                    string_field(&form, "path").unwrap_or_default()
                ),
                category: set.categories,
                description: first_component_content(&form),
            });
        }
        Ok(summaries)
    }

    /// A single form definition without the audit component.
    pub async fn get_form(&self, principal: &Principal, form_path: &str) -> Result<Value> {
        let form_path = form_segment(form_path)?;
        let path = format!("{form_path}?{FORM_FIELDS}");
        let mut form = self.client.get(principal, &path, Some(form_path)).await?;
        if let Some(Value::Array(components)) = form.get_mut("components") {
            components.retain(|c| c.get("key").and_then(Value::as_str) != Some(AUDIT_EMAIL_FIELD));
        }
        Ok(form)
    }

    /// Submit `payload` to a form and return the stored `data` section.
    pub async fn create_submission(
        &self,
        principal: &Principal,
        form_path: &str,
        payload: Map<String, Value>,
    ) -> Result<Value> {
        let form_path = form_segment(form_path)?;
        let path = format!("{form_path}/submission");
        let mut created = self
            .client
            .post(principal, &path, Some(form_path), payload)
            .await?;
        Ok(created
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// The caller's own submissions to a form.
    pub async fn list_submissions(
        &self,
        principal: &Principal,
        form_path: &str,
    ) -> Result<Vec<SubmissionSummary>> {
        let form_path = form_segment(form_path)?;
        let path = format!(
            "{form_path}/submission?data.{AUDIT_EMAIL_FIELD}={}",
            urlencoding::encode(&principal.email)
        );
        let body = self.client.get_scoped(principal, &path, form_path).await?;

        into_array(body)?
            .into_iter()
            .map(|item| self.summarize(item))
            .collect()
    }

    pub async fn get_submission(
        &self,
        principal: &Principal,
        form_path: &str,
        external_id: &str,
    ) -> Result<Value> {
        let form_path = form_segment(form_path)?;
        let internal = self.codec.decode(external_id)?;
        let path = format!("{form_path}/submission/{internal}");
        let submission = self.client.get(principal, &path, Some(form_path)).await?;
        self.obfuscate(submission)
    }

    pub async fn update_submission(
        &self,
        principal: &Principal,
        form_path: &str,
        external_id: &str,
        payload: Value,
    ) -> Result<Value> {
        let form_path = form_segment(form_path)?;
        let internal = self.codec.decode(external_id)?;
        let path = format!("{form_path}/submission/{internal}");
        let submission = self
            .client
            .put(principal, &path, Some(form_path), payload)
            .await?;
        self.obfuscate(submission)
    }

    fn summarize(&self, item: Value) -> Result<SubmissionSummary> {
        let Value::Object(mut fields) = item else {
            return Err(malformed("submission is not an object"));
        };
        let obfuscated_id = self.take_obfuscated_id(&mut fields)?;
        let created = fields
            .remove("created")
            .and_then(|v| v.as_str().map(str::to_owned))
            .ok_or_else(|| malformed("submission has no created timestamp"))?;
        let created = DateTime::parse_from_rfc3339(&created)
            .map_err(|e| malformed(format!("bad created timestamp {created:?}: {e}")))?
            .with_timezone(&Utc);

        Ok(SubmissionSummary {
            obfuscated_id,
            created,
            fields,
        })
    }

    fn obfuscate(&self, submission: Value) -> Result<Value> {
        match submission {
            Value::Object(mut fields) if fields.contains_key("_id") => {
                let id = self.take_obfuscated_id(&mut fields)?;
                fields.insert("obfuscated_id".to_string(), Value::String(id));
                Ok(Value::Object(fields))
            }
            other => Ok(other),
        }
    }

    fn take_obfuscated_id(&self, fields: &mut Map<String, Value>) -> Result<String> {
        let id = fields
            .remove("_id")
            .and_then(|v| v.as_str().map(str::to_owned))
            .ok_or_else(|| malformed("submission has no _id"))?;
        self.codec
            .encode(&id)
            .map_err(|e| malformed(format!("submission id: {e}")))
    }
}

/// Form paths are spliced into upstream URLs; only one plain segment is
/// accepted so a caller cannot redirect the request to another resource.
fn form_segment(form_path: &str) -> std::result::Result<&str, InvalidIdentifier> {
    let plain = !form_path.is_empty()
        && form_path
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if plain {
        Ok(form_path)
    } else {
        Err(InvalidIdentifier(form_path.to_string()))
    }
}

fn into_array(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        _ => Err(malformed("expected a JSON array")),
    }
}

fn malformed(msg: impl Into<String>) -> GatewayError {
    GatewayError::MalformedUpstreamResponse(msg.into())
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn first_component_content(form: &Value) -> String {
    form.get("components")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
