//! Resource facade: one method per remote resource or action.
//!
//! # Design
//! Methods validate nothing locally. Each one picks a path from
//! [`crate::paths`], assembles fresh query parameters and an optional JSON
//! payload, and hands them to the `Connection`. Bulk endpoints return the
//! server's per-item results untouched in the envelope body.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::{ClientConfig, Credentials};
use crate::connection::Connection;
use crate::error::Result;
use crate::http::Transport;
use crate::params::Params;
use crate::paths;
use crate::sso::{self, Clock, SystemClock};
use crate::types::ApiResponse;

/// Search and suggest options, merged into the query payload after `q`.
pub type SearchOptions = Map<String, Value>;

/// Synchronous client for the Swiftype REST API.
///
/// Immutable after construction and cheap to clone; share it freely across
/// threads.
#[derive(Clone)]
pub struct Client {
    conn: Connection,
    client_id: Option<String>,
    client_secret: Option<String>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("conn", &self.conn)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client against the public API host with default configuration.
    pub fn new(credentials: Credentials) -> Self {
        ClientBuilder::new().credentials(credentials).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // -----------------------------------------------------------------------
    // Engines
    // -----------------------------------------------------------------------

    pub fn engines(&self, page: Option<u32>, per_page: Option<u32>) -> Result<ApiResponse> {
        self.conn.get(&paths::engines(), Params::pagination(page, per_page), None)
    }

    pub fn engine(&self, engine_id: &str) -> Result<ApiResponse> {
        self.conn.get(&paths::engine(engine_id), Params::new(), None)
    }

    pub fn create_engine(&self, engine_id: &str) -> Result<ApiResponse> {
        let body = json!({ "engine": { "name": engine_id } });
        self.conn.post(&paths::engines(), Params::new(), Some(&body))
    }

    pub fn destroy_engine(&self, engine_id: &str) -> Result<ApiResponse> {
        self.conn.delete(&paths::engine(engine_id), Params::new(), None)
    }

    // -----------------------------------------------------------------------
    // Document types
    // -----------------------------------------------------------------------

    pub fn document_types(
        &self,
        engine_id: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::document_types(engine_id),
            Params::pagination(page, per_page),
            None,
        )
    }

    pub fn document_type(&self, engine_id: &str, document_type_id: &str) -> Result<ApiResponse> {
        self.conn.get(
            &paths::document_type(engine_id, document_type_id),
            Params::new(),
            None,
        )
    }

    pub fn create_document_type(&self, engine_id: &str, document_type_id: &str) -> Result<ApiResponse> {
        let body = json!({ "document_type": { "name": document_type_id } });
        self.conn
            .post(&paths::document_types(engine_id), Params::new(), Some(&body))
    }

    pub fn destroy_document_type(&self, engine_id: &str, document_type_id: &str) -> Result<ApiResponse> {
        self.conn.delete(
            &paths::document_type(engine_id, document_type_id),
            Params::new(),
            None,
        )
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub fn documents(
        &self,
        engine_id: &str,
        document_type_id: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::documents(engine_id, document_type_id),
            Params::pagination(page, per_page),
            None,
        )
    }

    pub fn document(&self, engine_id: &str, document_type_id: &str, document_id: &str) -> Result<ApiResponse> {
        self.conn.get(
            &paths::document(engine_id, document_type_id, document_id),
            Params::new(),
            None,
        )
    }

    pub fn create_document(&self, engine_id: &str, document_type_id: &str, document: &Value) -> Result<ApiResponse> {
        let body = json!({ "document": document });
        self.conn.post(
            &paths::documents(engine_id, document_type_id),
            Params::new(),
            Some(&body),
        )
    }

    pub fn create_or_update_document(
        &self,
        engine_id: &str,
        document_type_id: &str,
        document: &Value,
    ) -> Result<ApiResponse> {
        let body = json!({ "document": document });
        self.conn.post(
            &documents_action(engine_id, document_type_id, "create_or_update"),
            Params::new(),
            Some(&body),
        )
    }

    /// Per-item results come back as an array of booleans.
    pub fn create_documents(&self, engine_id: &str, document_type_id: &str, documents: &[Value]) -> Result<ApiResponse> {
        self.bulk_post(engine_id, document_type_id, "bulk_create", documents)
    }

    pub fn create_or_update_documents(
        &self,
        engine_id: &str,
        document_type_id: &str,
        documents: &[Value],
    ) -> Result<ApiResponse> {
        self.bulk_post(engine_id, document_type_id, "bulk_create_or_update", documents)
    }

    /// Like `create_or_update_documents`, but failed items are reported as
    /// error messages instead of `false`.
    pub fn create_or_update_documents_verbose(
        &self,
        engine_id: &str,
        document_type_id: &str,
        documents: &[Value],
    ) -> Result<ApiResponse> {
        self.bulk_post(
            engine_id,
            document_type_id,
            "bulk_create_or_update_verbose",
            documents,
        )
    }

    pub fn update_document(
        &self,
        engine_id: &str,
        document_type_id: &str,
        document_id: &str,
        fields: &Value,
    ) -> Result<ApiResponse> {
        let path = format!(
            "{}/update_fields",
            paths::document(engine_id, document_type_id, document_id)
        );
        let body = json!({ "fields": fields });
        self.conn.put(&path, Params::new(), Some(&body))
    }

    pub fn update_documents(&self, engine_id: &str, document_type_id: &str, documents: &[Value]) -> Result<ApiResponse> {
        let body = json!({ "documents": documents });
        self.conn.put(
            &documents_action(engine_id, document_type_id, "bulk_update"),
            Params::new(),
            Some(&body),
        )
    }

    pub fn destroy_document(&self, engine_id: &str, document_type_id: &str, document_id: &str) -> Result<ApiResponse> {
        self.conn.delete(
            &paths::document(engine_id, document_type_id, document_id),
            Params::new(),
            None,
        )
    }

    pub fn destroy_documents(
        &self,
        engine_id: &str,
        document_type_id: &str,
        document_ids: &[&str],
    ) -> Result<ApiResponse> {
        let body = json!({ "documents": document_ids });
        self.conn.post(
            &documents_action(engine_id, document_type_id, "bulk_destroy"),
            Params::new(),
            Some(&body),
        )
    }

    fn bulk_post(
        &self,
        engine_id: &str,
        document_type_id: &str,
        action: &str,
        documents: &[Value],
    ) -> Result<ApiResponse> {
        let body = json!({ "documents": documents });
        self.conn.post(
            &documents_action(engine_id, document_type_id, action),
            Params::new(),
            Some(&body),
        )
    }

    // -----------------------------------------------------------------------
    // Search & suggest
    // -----------------------------------------------------------------------

    pub fn search(&self, engine_id: &str, query: &str, options: &SearchOptions) -> Result<ApiResponse> {
        let body = query_payload(query, options);
        self.conn.get(&paths::search(engine_id), Params::new(), Some(&body))
    }

    pub fn search_document_type(
        &self,
        engine_id: &str,
        document_type_id: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<ApiResponse> {
        let body = query_payload(query, options);
        self.conn.get(
            &paths::document_type_search(engine_id, document_type_id),
            Params::new(),
            Some(&body),
        )
    }

    pub fn suggest(&self, engine_id: &str, query: &str, options: &SearchOptions) -> Result<ApiResponse> {
        let body = query_payload(query, options);
        self.conn.get(&paths::suggest(engine_id), Params::new(), Some(&body))
    }

    pub fn suggest_document_type(
        &self,
        engine_id: &str,
        document_type_id: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<ApiResponse> {
        let body = query_payload(query, options);
        self.conn.get(
            &paths::document_type_suggest(engine_id, document_type_id),
            Params::new(),
            Some(&body),
        )
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    pub fn analytics_searches(
        &self,
        engine_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::analytics(engine_id, "searches"),
            Params::date_range(start_date, end_date),
            None,
        )
    }

    pub fn analytics_autoselects(
        &self,
        engine_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::analytics(engine_id, "autoselects"),
            Params::date_range(start_date, end_date),
            None,
        )
    }

    pub fn analytics_top_queries(
        &self,
        engine_id: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::analytics(engine_id, "top_queries"),
            Params::pagination(page, per_page),
            None,
        )
    }

    pub fn analytics_top_queries_in_range(
        &self,
        engine_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::analytics(engine_id, "top_queries_in_range"),
            Params::date_range(start_date, end_date),
            None,
        )
    }

    pub fn analytics_top_no_result_queries(
        &self,
        engine_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ApiResponse> {
        self.conn.get(
            &paths::analytics(engine_id, "top_no_result_queries_in_range"),
            Params::date_range(start_date, end_date),
            None,
        )
    }

    // -----------------------------------------------------------------------
    // Domains
    // -----------------------------------------------------------------------

    pub fn domains(&self, engine_id: &str) -> Result<ApiResponse> {
        self.conn.get(&paths::domains(engine_id), Params::new(), None)
    }

    pub fn domain(&self, engine_id: &str, domain_id: &str) -> Result<ApiResponse> {
        self.conn.get(&paths::domain(engine_id, domain_id), Params::new(), None)
    }

    pub fn create_domain(&self, engine_id: &str, url: &str) -> Result<ApiResponse> {
        let body = json!({ "domain": { "submitted_url": url } });
        self.conn.post(&paths::domains(engine_id), Params::new(), Some(&body))
    }

    pub fn destroy_domain(&self, engine_id: &str, domain_id: &str) -> Result<ApiResponse> {
        self.conn.delete(&paths::domain(engine_id, domain_id), Params::new(), None)
    }

    pub fn recrawl_domain(&self, engine_id: &str, domain_id: &str) -> Result<ApiResponse> {
        let path = format!("{}/recrawl", paths::domain(engine_id, domain_id));
        self.conn.put(&path, Params::new(), None)
    }

    pub fn crawl_url(&self, engine_id: &str, domain_id: &str, url: &str) -> Result<ApiResponse> {
        let path = format!("{}/crawl_url", paths::domain(engine_id, domain_id));
        let body = json!({ "url": url });
        self.conn.put(&path, Params::new(), Some(&body))
    }

    // -----------------------------------------------------------------------
    // Platform users & SSO
    // -----------------------------------------------------------------------

    pub fn users(&self, page: Option<u32>, per_page: Option<u32>) -> Result<ApiResponse> {
        let params = self
            .platform_params()
            .merge(Params::pagination(page, per_page));
        self.conn.get(&paths::users(), params, None)
    }

    pub fn user(&self, user_id: &str) -> Result<ApiResponse> {
        self.conn.get(&paths::user(user_id), self.platform_params(), None)
    }

    pub fn create_user(&self) -> Result<ApiResponse> {
        self.conn.post(&paths::users(), self.platform_params(), None)
    }

    /// Signature for an SSO login at `timestamp`. A missing client secret
    /// signs with an empty secret.
    pub fn sso_token(&self, user_id: &str, timestamp: u64) -> String {
        sso::sso_token(user_id, self.client_secret.as_deref().unwrap_or(""), timestamp)
    }

    /// Login URL for `user_id`, stamped with the client's clock.
    pub fn sso_url(&self, user_id: &str) -> String {
        sso::sso_url(
            &self.conn.config().sso_host,
            user_id,
            self.client_id.as_deref(),
            self.client_secret.as_deref().unwrap_or(""),
            self.clock.unix_timestamp(),
        )
    }

    fn platform_params(&self) -> Params {
        Params::new()
            .with_opt("client_id", self.client_id.as_deref())
            .with_opt("client_secret", self.client_secret.as_deref())
    }
}

fn documents_action(engine_id: &str, document_type_id: &str, action: &str) -> String {
    format!("{}/{action}", paths::documents(engine_id, document_type_id))
}

fn query_payload(query: &str, options: &SearchOptions) -> Value {
    let mut payload = Map::new();
    payload.insert("q".to_string(), Value::String(query.to_string()));
    for (key, value) in options {
        payload.insert(key.clone(), value.clone());
    }
    Value::Object(payload)
}

/// Assembles a `Client`. Every setting has a default except the
/// credentials, which default to none.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    credentials: Credentials,
    client_id: Option<String>,
    client_secret: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn sso_host(mut self, sso_host: impl Into<String>) -> Self {
        self.config.sso_host = sso_host.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials.username = Some(username.into());
        self.credentials.password = Some(password.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credentials.api_key = Some(api_key.into());
        self
    }

    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.credentials.access_token = Some(access_token.into());
        self
    }

    /// Platform application id, sent with user requests and SSO URLs.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Client {
        let conn = match self.transport {
            Some(transport) => Connection::with_transport(self.config, self.credentials, transport),
            None => Connection::new(self.config, self.credentials),
        };
        Client {
            conn,
            client_id: self.client_id,
            client_secret: self.client_secret,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        }
    }
}
