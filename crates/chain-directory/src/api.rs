//! REST-shaped facade
//!
//! Binds the organization directory and branch request workflow to the
//! `/org/...` surface. Transport is owned by the embedding service: it hands
//! over the method, path, query map, JSON body and the caller identity, and
//! writes back the returned [`ApiResponse`].
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | /org/organizations | list my organizations |
//! | GET | /org/organizations/:oid | organization detail |
//! | PATCH | /org/organizations/:oid | update default language |
//! | GET | /org/organizations/:oid/restaurants | list organization restaurants |
//! | GET | /org/restaurants/:rid | restaurant detail |
//! | POST | /org/branch-requests | create branch request |
//! | GET | /org/branch-requests | list my branch requests |
//! | GET | /org/branch-requests/:id | branch request detail |
//! | POST | /org/branch-requests/:id/approve | approve (platform admin) |
//! | POST | /org/branch-requests/:id/reject | reject (platform admin) |
//!
//! Ids are validated here, before any store access.

use chain_access::IdentityContext;
use chain_org::BranchRequestStatus;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::branch_requests::{BranchRequestQuery, BranchRequestWorkflow};
use crate::config::{ConfigError, DirectoryConfig};
use crate::dto::{CreateBranchRequestBody, RejectBody, UpdateOrganizationBody};
use crate::error::{DirectoryError, DirectoryResult};
use crate::organizations::OrganizationDirectory;
use crate::pagination::{PageLimits, PageRequest};
use crate::store::DirectoryStore;

/// Query string parameters.
pub type Query = HashMap<String, String>;

/// Status code and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// 201 with `body`.
    pub fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    /// Error response carrying `{kind, message}`.
    pub fn error(err: &DirectoryError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "kind": err.kind(), "message": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The error kind, for error responses.
    pub fn error_kind(&self) -> Option<&str> {
        if self.is_success() {
            return None;
        }
        self.body.get("kind").and_then(Value::as_str)
    }
}

fn authenticated(identity: Option<&IdentityContext>) -> DirectoryResult<&IdentityContext> {
    identity.ok_or(DirectoryError::Unauthenticated)
}

fn parse_id(raw: &str, what: &str) -> DirectoryResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DirectoryError::InvalidInput(format!("malformed {} id: {}", what, raw)))
}

/// Blank query values count as absent.
fn query_param<'a>(query: &'a Query, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_body<T: DeserializeOwned + Default>(body: &Value) -> DirectoryResult<T> {
    if body.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(body.clone())
        .map_err(|e| DirectoryError::InvalidInput(format!("malformed body: {}", e)))
}

fn respond(result: DirectoryResult<ApiResponse>) -> ApiResponse {
    match result {
        Ok(response) => response,
        Err(err) => {
            if err.is_server_error() {
                error!(kind = err.kind(), error = %err, "Request failed");
            } else {
                debug!(kind = err.kind(), error = %err, "Request rejected");
            }
            ApiResponse::error(&err)
        }
    }
}

/// The `/org` API over a directory store.
pub struct OrgApi<S: DirectoryStore + ?Sized> {
    directory: OrganizationDirectory<S>,
    workflow: BranchRequestWorkflow<S>,
    limits: PageLimits,
}

impl<S: DirectoryStore + ?Sized> OrgApi<S> {
    /// Create the API over `store`.
    ///
    /// Fails when `config` carries incoherent paging bounds.
    pub fn new(store: Arc<S>, config: DirectoryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            limits: config.page_limits(),
            directory: OrganizationDirectory::new(store.clone(), config.clone()),
            workflow: BranchRequestWorkflow::new(store, config),
        })
    }

    pub fn directory(&self) -> &OrganizationDirectory<S> {
        &self.directory
    }

    pub fn workflow(&self) -> &BranchRequestWorkflow<S> {
        &self.workflow
    }

    fn page_request(&self, query: &Query) -> PageRequest {
        PageRequest::parse(
            query.get("limit").map(String::as_str),
            query.get("cursor").map(String::as_str),
            &self.limits,
        )
    }

    /// Dispatch a request by method and path.
    #[instrument(skip(self, identity, query, body))]
    pub async fn route(
        &self,
        method: &str,
        path: &str,
        identity: Option<&IdentityContext>,
        query: &Query,
        body: &Value,
    ) -> ApiResponse {
        let method = method.to_ascii_uppercase();
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .trim_matches('/')
            .split('/')
            .collect();

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["org", "organizations"]) => self.list_organizations(identity, query).await,
            ("GET", ["org", "organizations", oid]) => self.get_organization(identity, oid).await,
            ("PATCH", ["org", "organizations", oid]) => {
                self.update_organization(identity, oid, body).await
            }
            ("GET", ["org", "organizations", oid, "restaurants"]) => {
                self.list_organization_restaurants(identity, oid, query).await
            }
            ("GET", ["org", "restaurants", rid]) => self.get_restaurant(identity, rid).await,
            ("POST", ["org", "branch-requests"]) => {
                self.create_branch_request(identity, body).await
            }
            ("GET", ["org", "branch-requests"]) => self.list_branch_requests(identity, query).await,
            ("GET", ["org", "branch-requests", id]) => self.get_branch_request(identity, id).await,
            ("POST", ["org", "branch-requests", id, "approve"]) => {
                self.approve_branch_request(identity, id).await
            }
            ("POST", ["org", "branch-requests", id, "reject"]) => {
                self.reject_branch_request(identity, id, body).await
            }
            _ => {
                debug!(method = %method, path = path, "No route");
                ApiResponse::error(&DirectoryError::NotFound(format!(
                    "no route for {} {}",
                    method, path
                )))
            }
        }
    }

    /// `GET /org/organizations`
    pub async fn list_organizations(
        &self,
        identity: Option<&IdentityContext>,
        query: &Query,
    ) -> ApiResponse {
        respond(self.try_list_organizations(identity, query).await)
    }

    async fn try_list_organizations(
        &self,
        identity: Option<&IdentityContext>,
        query: &Query,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let page = self
            .directory
            .list_accessible(identity, self.page_request(query))
            .await?;
        Ok(ApiResponse::ok(serde_json::to_value(&page)?))
    }

    /// `GET /org/organizations/:oid`
    pub async fn get_organization(&self, identity: Option<&IdentityContext>, oid: &str) -> ApiResponse {
        respond(self.try_get_organization(identity, oid).await)
    }

    async fn try_get_organization(
        &self,
        identity: Option<&IdentityContext>,
        oid: &str,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let org_id = parse_id(oid, "organization")?;
        let detail = self.directory.get_detail(identity, org_id).await?;
        Ok(ApiResponse::ok(serde_json::to_value(&detail)?))
    }

    /// `PATCH /org/organizations/:oid` with `{defaultLanguage}`
    pub async fn update_organization(
        &self,
        identity: Option<&IdentityContext>,
        oid: &str,
        body: &Value,
    ) -> ApiResponse {
        respond(self.try_update_organization(identity, oid, body).await)
    }

    async fn try_update_organization(
        &self,
        identity: Option<&IdentityContext>,
        oid: &str,
        body: &Value,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let org_id = parse_id(oid, "organization")?;
        let body: UpdateOrganizationBody = parse_body(body)?;
        let language = body
            .default_language
            .ok_or_else(|| DirectoryError::InvalidInput("defaultLanguage is required".into()))?;

        let organization = self
            .directory
            .update_default_language(identity, org_id, &language)
            .await?;
        Ok(ApiResponse::ok(json!({
            "ok": true,
            "organization": serde_json::to_value(&organization)?,
        })))
    }

    /// `GET /org/organizations/:oid/restaurants`
    pub async fn list_organization_restaurants(
        &self,
        identity: Option<&IdentityContext>,
        oid: &str,
        query: &Query,
    ) -> ApiResponse {
        respond(self.try_list_organization_restaurants(identity, oid, query).await)
    }

    async fn try_list_organization_restaurants(
        &self,
        identity: Option<&IdentityContext>,
        oid: &str,
        query: &Query,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let org_id = parse_id(oid, "organization")?;
        let page = self
            .directory
            .list_restaurants(identity, org_id, self.page_request(query))
            .await?;
        Ok(ApiResponse::ok(serde_json::to_value(&page)?))
    }

    /// `GET /org/restaurants/:rid`
    pub async fn get_restaurant(&self, identity: Option<&IdentityContext>, rid: &str) -> ApiResponse {
        respond(self.try_get_restaurant(identity, rid).await)
    }

    async fn try_get_restaurant(
        &self,
        identity: Option<&IdentityContext>,
        rid: &str,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let restaurant_id = parse_id(rid, "restaurant")?;
        let restaurant = self.directory.get_restaurant(identity, restaurant_id).await?;
        Ok(ApiResponse::ok(serde_json::to_value(&restaurant)?))
    }

    /// `POST /org/branch-requests`
    pub async fn create_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        body: &Value,
    ) -> ApiResponse {
        respond(self.try_create_branch_request(identity, body).await)
    }

    async fn try_create_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        body: &Value,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let body: CreateBranchRequestBody = parse_body(body)?;
        let org_id = body
            .organization_id
            .as_deref()
            .ok_or_else(|| DirectoryError::InvalidInput("organizationId is required".into()))
            .and_then(|raw| parse_id(raw, "organization"))?;

        let request = self
            .workflow
            .create(identity, org_id, body.draft, body.notes)
            .await?;
        Ok(ApiResponse::created(json!({
            "ok": true,
            "branchRequest": serde_json::to_value(&request)?,
        })))
    }

    /// `GET /org/branch-requests`
    pub async fn list_branch_requests(
        &self,
        identity: Option<&IdentityContext>,
        query: &Query,
    ) -> ApiResponse {
        respond(self.try_list_branch_requests(identity, query).await)
    }

    async fn try_list_branch_requests(
        &self,
        identity: Option<&IdentityContext>,
        query: &Query,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let status = query_param(query, "status")
            .map(|raw| {
                BranchRequestStatus::parse(raw).ok_or_else(|| {
                    DirectoryError::InvalidInput(format!("unknown status: {}", raw))
                })
            })
            .transpose()?;
        let organization_id = query_param(query, "organizationId")
            .map(|raw| parse_id(raw, "organization"))
            .transpose()?;

        let page = self
            .workflow
            .list_mine(
                identity,
                BranchRequestQuery {
                    status,
                    organization_id,
                },
                self.page_request(query),
            )
            .await?;
        Ok(ApiResponse::ok(serde_json::to_value(&page)?))
    }

    /// `GET /org/branch-requests/:id`
    pub async fn get_branch_request(&self, identity: Option<&IdentityContext>, id: &str) -> ApiResponse {
        respond(self.try_get_branch_request(identity, id).await)
    }

    async fn try_get_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        id: &str,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let request_id = parse_id(id, "branch request")?;
        let request = self.workflow.get(identity, request_id).await?;
        Ok(ApiResponse::ok(serde_json::to_value(&request)?))
    }

    /// `POST /org/branch-requests/:id/approve`
    pub async fn approve_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        id: &str,
    ) -> ApiResponse {
        respond(self.try_approve_branch_request(identity, id).await)
    }

    async fn try_approve_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        id: &str,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let request_id = parse_id(id, "branch request")?;
        let request = self.workflow.approve(identity, request_id).await?;
        Ok(ApiResponse::ok(json!({
            "ok": true,
            "branchRequest": serde_json::to_value(&request)?,
        })))
    }

    /// `POST /org/branch-requests/:id/reject` with `{reason}`
    pub async fn reject_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        id: &str,
        body: &Value,
    ) -> ApiResponse {
        respond(self.try_reject_branch_request(identity, id, body).await)
    }

    async fn try_reject_branch_request(
        &self,
        identity: Option<&IdentityContext>,
        id: &str,
        body: &Value,
    ) -> DirectoryResult<ApiResponse> {
        let identity = authenticated(identity)?;
        let request_id = parse_id(id, "branch request")?;
        let body: RejectBody = parse_body(body)?;
        let reason = body.reason.unwrap_or_default();

        let request = self.workflow.reject(identity, request_id, &reason).await?;
        Ok(ApiResponse::ok(json!({
            "ok": true,
            "branchRequest": serde_json::to_value(&request)?,
        })))
    }
}
