//! Authenticated, permission-aware client for the upstream form service.
//!
//! Every call:
//! 1. Obtains a credential from the shared [`TokenManager`].
//! 2. Sends the request with `X-Jwt-Token` and a bounded timeout.
//! 3. Classifies the response: 200/201/206 succeed, anything else becomes
//!    [`GatewayError::UpstreamApplication`] with a sanitized body.
//! 4. Applies tag-based access rules to the successful body.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use formgate_std::{GetNow, SystemClock};
use reqwest::{Client, Method, Response};
use serde_json::{Map, Value, json};
use tracing::{error, instrument, warn};

use crate::config::{GatewayConfig, TagFallback};
use crate::error::{GatewayError, Result};
use crate::permissions::{self, Principal, SingleDecision};
use crate::tags::{TAGS_FIELD, TagSet};
use crate::token::{TOKEN_HEADER, TokenManager};

/// Field injected into created records to attribute them to the caller.
pub const AUDIT_EMAIL_FIELD: &str = "auth_user_email";

const SUCCESS_STATUSES: [u16; 3] = [200, 201, 206];

pub struct GatewayClient<C = SystemClock> {
    http: Client,
    base_url: String,
    timeout: Duration,
    tag_fallback: TagFallback,
    tokens: Arc<TokenManager<C>>,
}

impl GatewayClient<SystemClock> {
    pub fn new(config: &GatewayConfig) -> Self {
        let http = Client::new();
        let tokens = TokenManager::new(
            http.clone(),
            &config.api_url,
            config.login.clone(),
            config.timeout,
        );
        Self::with_tokens(http, config, Arc::new(tokens))
    }
}

impl<C> GatewayClient<C>
where
    C: GetNow<Instant = SystemTime>,
{
    /// Build a client around an existing token manager (shared or with a
    /// custom clock).
    pub fn with_tokens(http: Client, config: &GatewayConfig, tokens: Arc<TokenManager<C>>) -> Self {
        Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            tag_fallback: config.tag_fallback,
            tokens,
        }
    }

    // ── Operations ────────────────────────────────────────────────────────────

    /// `resource_id` names the resource whose tags guard the response when the
    /// body itself carries none.
    pub async fn get(
        &self,
        principal: &Principal,
        path: &str,
        resource_id: Option<&str>,
    ) -> Result<Value> {
        let resp = self.send(Method::GET, path, None).await?;
        let body = parse_body(resp).await?;
        self.enforce(principal, body, resource_id).await
    }

    /// Read a collection whose elements carry no tags of their own. Access is
    /// decided by the tags of `parent_id`; the list itself is not filtered.
    pub async fn get_scoped(
        &self,
        principal: &Principal,
        path: &str,
        parent_id: &str,
    ) -> Result<Value> {
        self.authorize_by_lookup(principal, parent_id).await?;
        let resp = self.send(Method::GET, path, None).await?;
        parse_body(resp).await
    }

    /// Create a record. The caller's email is written to
    /// `data.auth_user_email` before sending.
    pub async fn post(
        &self,
        principal: &Principal,
        path: &str,
        resource_id: Option<&str>,
        mut payload: Map<String, Value>,
    ) -> Result<Value> {
        inject_email(&mut payload, &principal.email);
        let payload = Value::Object(payload);
        let resp = self.send(Method::POST, path, Some(&payload)).await?;
        let body = parse_body(resp).await?;
        self.enforce(principal, body, resource_id).await
    }

    pub async fn put(
        &self,
        principal: &Principal,
        path: &str,
        resource_id: Option<&str>,
        payload: Value,
    ) -> Result<Value> {
        let resp = self.send(Method::PUT, path, Some(&payload)).await?;
        let body = parse_body(resp).await?;
        self.enforce(principal, body, resource_id).await
    }

    /// Delete a record. The response body is discarded. When `resource_id` is
    /// given, its tags are checked before anything is deleted.
    pub async fn delete(
        &self,
        principal: &Principal,
        path: &str,
        resource_id: Option<&str>,
    ) -> Result<()> {
        if let Some(id) = resource_id {
            self.authorize_by_lookup(principal, id).await?;
        }
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens
            .get_token()
            .await
            .map(|credential| credential.value().to_string())
            .map_err(|e| {
                warn!(error = %e, "no upstream credential available");
                GatewayError::AuthenticationFailure
            })
    }

    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn send(&self, method: Method, path: &str, payload: Option<&Value>) -> Result<Response> {
        let token = self.bearer().await?;
        let url = self.url(path);

        let mut req = self
            .http
            .request(method.clone(), &url)
            .timeout(self.timeout)
            .header(TOKEN_HEADER, token);
        if let Some(payload) = payload {
            req = req.json(payload);
        }

        let resp = req.send().await.map_err(|e| {
            error!(error = %e, url = %url, "upstream request failed");
            GatewayError::GatewayUnavailable(e.to_string())
        })?;

        let status = resp.status().as_u16();
        if SUCCESS_STATUSES.contains(&status) {
            return Ok(resp);
        }
        if status == 401 {
            // The upstream no longer accepts the cached credential.
            self.tokens.invalidate();
        }

        let text = resp.text().await.unwrap_or_default();
        error!(status, url = %url, body = %text, "upstream returned an error");
        Err(GatewayError::UpstreamApplication {
            status: remap_status(status),
            body: error_body(&text, payload),
        })
    }

    // ── Access control ────────────────────────────────────────────────────────

    async fn enforce(
        &self,
        principal: &Principal,
        body: Value,
        resource_id: Option<&str>,
    ) -> Result<Value> {
        match body {
            Value::Array(items) => Ok(Value::Array(permissions::filter_list(principal, items))),
            Value::Object(_) => match permissions::check_single(principal, &body) {
                SingleDecision::Allow => Ok(body),
                SingleDecision::Deny => Err(GatewayError::PermissionDenied),
                SingleDecision::LookupTags => {
                    if let Some(id) = resource_id {
                        self.authorize_by_lookup(principal, id).await?;
                    }
                    Ok(body)
                }
            },
            scalar => Ok(scalar),
        }
    }

    async fn authorize_by_lookup(&self, principal: &Principal, resource_id: &str) -> Result<()> {
        match self.lookup_tags(resource_id).await? {
            Some(tags) if permissions::is_authorized(principal, &tags) => Ok(()),
            Some(_) => Err(GatewayError::PermissionDenied),
            None => match self.tag_fallback {
                TagFallback::PassThrough => Ok(()),
                TagFallback::Deny => Err(GatewayError::PermissionDenied),
            },
        }
    }

    /// `Ok(None)` when the lookup did not produce a usable answer.
    async fn lookup_tags(&self, resource_id: &str) -> Result<Option<TagSet>> {
        let token = self.bearer().await?;
        let url = self.url(resource_id);

        let resp = match self
            .http
            .get(&url)
            .query(&[("select", TAGS_FIELD)])
            .timeout(self.timeout)
            .header(TOKEN_HEADER, token)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, url = %url, "tag lookup failed");
                return Ok(None);
            }
        };

        let status = resp.status().as_u16();
        if status != 200 {
            warn!(status, url = %url, "tag lookup returned non-200");
            return Ok(None);
        }

        match resp.json::<Value>().await {
            Ok(Value::Object(fields)) => Ok(Some(TagSet::parse(
                fields
                    .get(TAGS_FIELD)
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(Value::as_str),
            ))),
            Ok(_) => {
                warn!(url = %url, "tag lookup did not return a single resource");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, url = %url, "tag lookup returned an unreadable body");
                Ok(None)
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn parse_body(resp: Response) -> Result<Value> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| GatewayError::GatewayUnavailable(e.to_string()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| {
        error!(error = %e, "upstream body is not JSON");
        GatewayError::MalformedUpstreamResponse(e.to_string())
    })
}

fn inject_email(payload: &mut Map<String, Value>, email: &str) {
    let data = payload
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()));
    if !data.is_object() {
        *data = Value::Object(Map::new());
    }
    if let Value::Object(fields) = data {
        fields.insert(AUDIT_EMAIL_FIELD.to_string(), Value::String(email.to_string()));
    }
}

/// An upstream 401 would end the caller's own session, so it is surfaced as 403.
fn remap_status(status: u16) -> u16 {
    if status == 401 { 403 } else { status }
}

fn error_body(message: &str, payload: Option<&Value>) -> Value {
    let mut data = payload
        .and_then(|p| p.get("data"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    data.remove(AUDIT_EMAIL_FIELD);
    json!({
        "submit": "error",
        "class": "is-danger",
        "message": message,
        "data": data,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use httpmock::prelude::*;
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;
    use crate::token::MachineLogin;

    const EMAIL: &str = "jane@example.com";

    fn jwt() -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        jsonwebtoken::encode(
            &Header::default(),
            &json!({"exp": exp}),
            &EncodingKey::from_secret(b"upstream"),
        )
        .unwrap()
    }

    fn config(server: &MockServer) -> GatewayConfig {
        GatewayConfig::new(server.base_url(), MachineLogin::new("key", "secret"))
    }

    fn principal(perms: &[&str]) -> Principal {
        Principal::new(EMAIL, perms.iter().copied())
    }

    async fn upstream() -> (MockServer, String) {
        let server = MockServer::start_async().await;
        let token = jwt();
        server
            .mock_async(|when, then| {
                when.method(POST).path("/machine/login");
                then.status(200).header(TOKEN_HEADER, token.as_str());
            })
            .await;
        (server, token)
    }

    #[test]
    fn inject_email_creates_data_member() {
        let mut payload = Map::new();
        inject_email(&mut payload, EMAIL);
        assert_eq!(Value::Object(payload), json!({"data": {"auth_user_email": EMAIL}}));
    }

    #[test]
    fn inject_email_replaces_non_object_data() {
        let mut payload = json!({"data": "oops", "state": "submitted"})
            .as_object()
            .cloned()
            .unwrap();
        inject_email(&mut payload, EMAIL);
        assert_eq!(
            Value::Object(payload),
            json!({"data": {"auth_user_email": EMAIL}, "state": "submitted"})
        );
    }

    #[test]
    fn error_body_strips_audit_field() {
        let payload = json!({"data": {"name": "x", "auth_user_email": EMAIL}});
        assert_eq!(
            error_body("boom", Some(&payload)),
            json!({"submit": "error", "class": "is-danger", "message": "boom", "data": {"name": "x"}})
        );
        assert_eq!(error_body("boom", None)["data"], json!({}));
    }

    #[test]
    fn only_401_is_remapped() {
        assert_eq!(remap_status(401), 403);
        assert_eq!(remap_status(404), 404);
        assert_eq!(remap_status(500), 500);
    }

    /// The credential is sent in `X-Jwt-Token` and an authorized body is returned.
    #[tokio::test]
    async fn get_returns_authorized_resource() {
        let (server, token) = upstream().await;
        let form = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/intake")
                    .header("x-jwt-token", token.as_str());
                then.status(200)
                    .json_body(json!({"title": "Intake", "tags": ["perm:read"]}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let body = client
            .get(&principal(&["forms.read"]), "intake", Some("intake"))
            .await
            .unwrap();

        assert_eq!(body["title"], "Intake");
        form.assert_async().await;
    }

    #[tokio::test]
    async fn get_denies_when_tags_unsatisfied() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(200)
                    .json_body(json!({"title": "Intake", "tags": ["perm:read"]}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let err = client
            .get(&principal(&["forms.write"]), "intake", Some("intake"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PermissionDenied));
    }

    #[tokio::test]
    async fn list_is_filtered_per_element() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/form").query_param("type", "form");
                then.status(200).json_body(json!([
                    {"name": "a", "tags": ["perm:read"]},
                    {"name": "b"},
                    {"name": "c", "tags": ["perm:admin"]},
                ]));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let body = client
            .get(&principal(&["forms.read"]), "form?type=form", None)
            .await
            .unwrap();

        assert_eq!(body, json!([{"name": "a", "tags": ["perm:read"]}]));
    }

    #[tokio::test]
    async fn upstream_401_surfaces_as_403() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(401).body("Unauthorized");
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let err = client
            .get(&principal(&[]), "intake", Some("intake"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 403);
    }

    /// The email is injected into the outgoing body and stripped from the error echo.
    #[tokio::test]
    async fn create_failure_echoes_sanitized_payload() {
        let (server, _) = upstream().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/intake/submission")
                    .json_body(json!({"data": {"name": "Jane", "auth_user_email": EMAIL}}));
                then.status(500).body("Database unavailable");
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let payload = json!({"data": {"name": "Jane"}}).as_object().cloned().unwrap();
        let err = client
            .post(&principal(&[]), "intake/submission", Some("intake"), payload)
            .await
            .unwrap_err();

        create.assert_async().await;
        match err {
            GatewayError::UpstreamApplication { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body["message"], "Database unavailable");
                assert_eq!(body["data"], json!({"name": "Jane"}));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    /// Without a credential no resource request is made.
    #[tokio::test]
    async fn login_failure_skips_resource_call() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/machine/login");
                then.status(500);
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(200).json_body(json!({}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let err = client
            .get(&principal(&[]), "intake", None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AuthenticationFailure));
        assert_eq!(resource.hits(), 0);
    }

    #[tokio::test]
    async fn slow_upstream_is_unavailable() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(200)
                    .json_body(json!({}))
                    .delay(Duration::from_secs(2));
            })
            .await;

        let client = GatewayClient::new(&config(&server).with_timeout(Duration::from_millis(200)));
        let err = client
            .get(&principal(&[]), "intake", None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::GatewayUnavailable(_)));
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn non_json_success_is_malformed() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let err = client
            .get(&principal(&[]), "intake", None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::MalformedUpstreamResponse(_)));
    }

    /// A body without `tags` triggers a lookup on the resource id.
    #[tokio::test]
    async fn untagged_single_uses_tag_lookup() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake/submission/abc");
                then.status(200).json_body(json!({"_id": "abc", "data": {}}));
            })
            .await;
        let lookup = server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(200).json_body(json!({"tags": ["perm:read"]}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let denied = client
            .get(&principal(&["forms.write"]), "intake/submission/abc", Some("intake"))
            .await;
        let allowed = client
            .get(&principal(&["forms.read"]), "intake/submission/abc", Some("intake"))
            .await;

        assert!(matches!(denied, Err(GatewayError::PermissionDenied)));
        assert_eq!(allowed.unwrap()["_id"], "abc");
        assert_eq!(lookup.hits(), 2);
    }

    #[tokio::test]
    async fn failed_lookup_passes_through_by_default() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake/submission/abc");
                then.status(200).json_body(json!({"_id": "abc"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(500);
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let body = client
            .get(&principal(&[]), "intake/submission/abc", Some("intake"))
            .await
            .unwrap();

        assert_eq!(body, json!({"_id": "abc"}));
    }

    #[tokio::test]
    async fn failed_lookup_denies_with_deny_policy() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake/submission/abc");
                then.status(200).json_body(json!({"_id": "abc"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(500);
            })
            .await;

        let client = GatewayClient::new(&config(&server).with_tag_fallback(TagFallback::Deny));
        let err = client
            .get(&principal(&[]), "intake/submission/abc", Some("intake"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PermissionDenied));
    }

    #[tokio::test]
    async fn untagged_single_without_id_passes_through() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/current");
                then.status(200).json_body(json!({"email": EMAIL}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let body = client.get(&principal(&[]), "current", None).await.unwrap();

        assert_eq!(body["email"], EMAIL);
    }

    /// Scoped reads authorize against the parent and keep untagged elements.
    #[tokio::test]
    async fn scoped_list_is_authorized_by_parent() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake/submission");
                then.status(200).json_body(json!([{"_id": "1"}, {"_id": "2"}]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(200).json_body(json!({"tags": ["perm:read"]}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let listed = client
            .get_scoped(&principal(&["forms.read"]), "intake/submission", "intake")
            .await
            .unwrap();
        let denied = client
            .get_scoped(&principal(&["forms.write"]), "intake/submission", "intake")
            .await;

        assert_eq!(listed.as_array().map(Vec::len), Some(2));
        assert!(matches!(denied, Err(GatewayError::PermissionDenied)));
    }

    /// The collection is never fetched for a caller the parent's tags deny.
    #[tokio::test]
    async fn denied_scoped_read_skips_collection_fetch() {
        let (server, _) = upstream().await;
        let collection = server
            .mock_async(|when, then| {
                when.method(GET).path("/intake/submission");
                then.status(200).json_body(json!([{"_id": "1"}]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(200).json_body(json!({"tags": ["perm:admin"]}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let err = client
            .get_scoped(&principal(&["forms.read"]), "intake/submission", "intake")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PermissionDenied));
        assert_eq!(collection.hits(), 0);
    }

    /// A lookup answering with a list says nothing about the resource's tags.
    #[tokio::test]
    async fn list_shaped_lookup_counts_as_failed() {
        let (server, _) = upstream().await;
        let collection = server
            .mock_async(|when, then| {
                when.method(GET).path("/intake/submission");
                then.status(200).json_body(json!([{"_id": "1"}]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(200).json_body(json!([{"_id": "1", "tags": []}]));
            })
            .await;

        let client = GatewayClient::new(&config(&server).with_tag_fallback(TagFallback::Deny));
        assert_eq!(client.lookup_tags("intake").await.unwrap(), None);

        let err = client
            .get_scoped(&principal(&["forms.read"]), "intake/submission", "intake")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PermissionDenied));
        assert_eq!(collection.hits(), 0);
    }

    /// After the upstream rejects a credential, the next call logs in again.
    #[tokio::test]
    async fn upstream_401_drops_cached_credential() {
        let server = MockServer::start_async().await;
        let token = jwt();
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path("/machine/login");
                then.status(200).header(TOKEN_HEADER, token.as_str());
            })
            .await;
        let mut rejected = server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(401).body("Token expired");
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let first = client.get(&principal(&[]), "intake", None).await;
        assert!(matches!(
            first,
            Err(GatewayError::UpstreamApplication { status: 403, .. })
        ));
        assert_eq!(login.hits(), 1);

        rejected.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake");
                then.status(200).json_body(json!({"title": "Intake", "tags": []}));
            })
            .await;

        let body = client.get(&principal(&[]), "intake", None).await.unwrap();
        assert_eq!(body["title"], "Intake");
        assert_eq!(login.hits(), 2);
    }

    /// Nothing is deleted for a caller the resource's tags deny.
    #[tokio::test]
    async fn denied_delete_never_reaches_upstream() {
        let (server, _) = upstream().await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/intake/submission/abc");
                then.status(200);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/intake").query_param("select", "tags");
                then.status(200).json_body(json!({"tags": ["perm:admin"]}));
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let err = client
            .delete(
                &principal(&["forms.read"]),
                "intake/submission/abc",
                Some("intake"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PermissionDenied));
        assert_eq!(delete.hits(), 0);
    }

    #[tokio::test]
    async fn delete_returns_unit_and_ignores_body() {
        let (server, _) = upstream().await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/intake/submission/abc");
                then.status(200).body("OK");
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        client
            .delete(&principal(&[]), "intake/submission/abc", None)
            .await
            .unwrap();

        delete.assert_async().await;
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let (server, _) = upstream().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/intake/submission/abc");
                then.status(200);
            })
            .await;

        let client = GatewayClient::new(&config(&server));
        let body = client
            .put(&principal(&[]), "intake/submission/abc", None, json!({"data": {}}))
            .await
            .unwrap();

        assert_eq!(body, Value::Null);
    }
}
