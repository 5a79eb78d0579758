//! The platform client: session handling plus one method per REST endpoint.
//!
//! # Design
//!
//! [`TapestryClient`] owns a cloneable [`reqwest::Client`] (which pools
//! connections internally) and the current session as a single optional
//! field. [`TapestryClient::authenticate`] takes `&mut self` and is the
//! only session-mutating call; everything else borrows the client
//! immutably. Share a client across tasks by scoping one instance per
//! logical session, or put it behind an external lock — there is no
//! interior mutability here.
//!
//! Response bodies are parsed permissively: a 200 body that is not valid
//! JSON is wrapped as `{"content": <text>}`, and shape oddities degrade to
//! absent fields instead of raising. Errors come only from transport
//! failures, missing session tickets, and the platform's status codes
//! (see [`ClientError`]).

use serde_json::{Map, Value};
use tracing::debug;

use tapestry_model::Individual;

use crate::api::{AuthResponse, OpResult, QueryRequest, QueryResponse, UpdateOptions};
use crate::error::{ClientError, Result};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authenticated state carried between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The opaque ticket returned by `authenticate`.
    pub ticket: String,

    /// URI of the authenticated user's individual, when the platform
    /// reported one.
    pub user_uri: Option<String>,
}

// ---------------------------------------------------------------------------
// TapestryClient
// ---------------------------------------------------------------------------

/// Client for the Tapestry platform REST API.
///
/// # Example
///
/// ```rust,ignore
/// let mut client = TapestryClient::new("http://platform.example.com/api");
/// client.authenticate("karpovrt", &util::hash_password("123"), None).await?;
/// let person = client.get_individual("td:RomanKarpov", None).await?;
/// ```
pub struct TapestryClient {
    pub(crate) base_url: String,
    pub(crate) http: reqwest::Client,
    session: Option<Session>,
}

impl TapestryClient {
    /// Create a client for the given API base URL with a default
    /// `reqwest::Client`. A trailing slash on the URL is stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    /// Create a client with a pre-configured `reqwest::Client` (e.g. with
    /// a timeout or proxy).
    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            session: None,
        }
    }

    /// The current session, if authenticated.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The current session ticket, if any.
    pub fn ticket(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.ticket.as_str())
    }

    /// Install a session obtained elsewhere (e.g. a trusted ticket or a
    /// ticket persisted from an earlier run).
    pub fn set_session(&mut self, ticket: impl Into<String>, user_uri: Option<String>) {
        self.session = Some(Session {
            ticket: ticket.into(),
            user_uri,
        });
    }

    /// `{base_url}/{endpoint}`
    pub(crate) fn endpoint(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// The stored ticket, or [`ClientError::Auth`] when the client has no
    /// usable session.
    pub(crate) fn require_ticket(&self) -> Result<&str> {
        match self.ticket() {
            Some(ticket) if !ticket.is_empty() => Ok(ticket),
            _ => Err(ClientError::no_ticket()),
        }
    }

    /// Interpret a platform response: 200 parses as JSON (falling back to
    /// `{"content": <raw text>}`), anything else maps through
    /// [`ClientError::from_status`].
    pub(crate) async fn read_body(response: reqwest::Response) -> Result<Value> {
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ClientError::from_status(status));
        }
        let text = response.text().await?;
        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(serde_json::json!({ "content": text })),
        }
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// Authenticate with login and hashed password (see
    /// [`util::hash_password`](crate::util::hash_password)).
    ///
    /// On success the returned ticket is stored on the client and reused
    /// by all subsequent calls.
    pub async fn authenticate(
        &mut self,
        login: &str,
        password: &str,
        secret: Option<&str>,
    ) -> Result<AuthResponse> {
        let mut params = vec![("login", login.to_string()), ("password", password.to_string())];
        if let Some(secret) = secret {
            if !secret.is_empty() {
                params.push(("secret", secret.to_string()));
            }
        }

        debug!("authenticate: login={login}");
        let response = self
            .http
            .get(self.endpoint("authenticate"))
            .query(&params)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        let auth: AuthResponse = serde_json::from_value(body).unwrap_or_default();

        if let Some(id) = &auth.id {
            self.session = Some(Session {
                ticket: id.clone(),
                user_uri: auth.user_uri.clone(),
            });
        }
        Ok(auth)
    }

    /// Ask the platform whether a ticket is still valid.
    ///
    /// Pass `None` to validate the stored session ticket. Transport and
    /// status failures propagate as errors, so callers can distinguish
    /// "definitely invalid" from "could not determine"; see
    /// [`is_ticket_valid`](Self::is_ticket_valid) for the swallowing
    /// variant.
    pub async fn check_ticket(&self, ticket: Option<&str>) -> Result<bool> {
        let ticket = match ticket {
            Some(ticket) => ticket,
            None => self.require_ticket()?,
        };
        if ticket.is_empty() {
            return Err(ClientError::no_ticket());
        }

        let response = self
            .http
            .get(self.endpoint("is_ticket_valid"))
            .query(&[("ticket", ticket)])
            .send()
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ClientError::from_status(status));
        }
        Ok(response.json::<bool>().await?)
    }

    /// Whether the stored session ticket is valid, converting *any*
    /// failure into `false`.
    ///
    /// This swallow-to-false behaviour is an intentional API asymmetry
    /// kept for compatibility with existing callers; use
    /// [`check_ticket`](Self::check_ticket) when the failure cause
    /// matters.
    pub async fn is_ticket_valid(&self) -> bool {
        self.check_ticket(None).await.unwrap_or(false)
    }

    /// Obtain a ticket trusted for use as another user. Requires an
    /// authenticated session; the returned ticket is *not* installed on
    /// this client.
    pub async fn get_ticket_trusted(&self, login: &str) -> Result<AuthResponse> {
        let ticket = self.require_ticket()?;
        let response = self
            .http
            .get(self.endpoint("get_ticket_trusted"))
            .query(&[("ticket", ticket), ("login", login)])
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Execute a full-text query; returns matching URIs plus paging
    /// metadata.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let ticket = self.require_ticket()?;
        let mut body = match serde_json::to_value(request) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        body.insert("ticket".into(), ticket.into());

        debug!("query: {}", request.query);
        let response = self
            .http
            .post(self.endpoint("query"))
            .json(&body)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Individual reads
    // -----------------------------------------------------------------------

    /// Retrieve one individual by URI.
    pub async fn get_individual(&self, uri: &str, reopen: Option<bool>) -> Result<Individual> {
        let ticket = self.require_ticket()?;
        let mut params = vec![("ticket", ticket.to_string()), ("uri", uri.to_string())];
        if let Some(reopen) = reopen {
            params.push(("reopen", reopen.to_string()));
        }

        let response = self
            .http
            .get(self.endpoint("get_individual"))
            .query(&params)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(Individual::from_json(&body))
    }

    /// Retrieve a batch of individuals by URI. URIs the platform does not
    /// return are simply absent from the result.
    pub async fn get_individuals(&self, uris: &[String]) -> Result<Vec<Individual>> {
        let ticket = self.require_ticket()?;
        let body = serde_json::json!({ "ticket": ticket, "uris": uris });

        let response = self
            .http
            .post(self.endpoint("get_individuals"))
            .json(&body)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(body
            .as_array()
            .map(|items| items.iter().map(Individual::from_json).collect())
            .unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Individual writes
    // -----------------------------------------------------------------------

    /// Insert or fully update one individual.
    pub async fn put_individual(
        &self,
        individual: &Individual,
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        let mut body = Map::new();
        body.insert("individual".into(), individual.to_json());
        self.update_call("put_individual", body, options).await
    }

    /// Insert or fully update a batch of individuals in one call.
    pub async fn put_individuals(
        &self,
        individuals: &[Individual],
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        let mut body = Map::new();
        body.insert(
            "individuals".into(),
            Value::Array(individuals.iter().map(Individual::to_json).collect()),
        );
        self.update_call("put_individuals", body, options).await
    }

    /// Delete an individual from the platform.
    pub async fn remove_individual(&self, uri: &str, options: &UpdateOptions) -> Result<OpResult> {
        let mut body = Map::new();
        body.insert("uri".into(), uri.into());
        self.update_call("remove_individual", body, options).await
    }

    /// Remove the given predicate values from the stored individual.
    pub async fn remove_from_individual(
        &self,
        uri: &str,
        individual: &Individual,
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        self.partial_update("remove_from_individual", uri, individual, options)
            .await
    }

    /// Replace the given predicates on the stored individual, leaving
    /// other predicates untouched.
    pub async fn set_in_individual(
        &self,
        uri: &str,
        individual: &Individual,
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        self.partial_update("set_in_individual", uri, individual, options)
            .await
    }

    /// Append the given predicate values to the stored individual.
    pub async fn add_to_individual(
        &self,
        uri: &str,
        individual: &Individual,
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        self.partial_update("add_to_individual", uri, individual, options)
            .await
    }

    async fn partial_update(
        &self,
        endpoint: &str,
        uri: &str,
        individual: &Individual,
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        let mut body = Map::new();
        body.insert("uri".into(), uri.into());
        body.insert("individual".into(), individual.to_json());
        self.update_call(endpoint, body, options).await
    }

    /// Shared tail of every write endpoint: attach the ticket and update
    /// options, PUT, and parse the operation result.
    async fn update_call(
        &self,
        endpoint: &str,
        mut body: Map<String, Value>,
        options: &UpdateOptions,
    ) -> Result<OpResult> {
        let ticket = self.require_ticket()?;
        body.insert("ticket".into(), ticket.into());
        options.apply(&mut body);

        debug!("{endpoint}");
        let response = self
            .http
            .put(self.endpoint(endpoint))
            .json(&body)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Rights and membership
    // -----------------------------------------------------------------------

    /// The access rights of the current user on `uri`, as an
    /// individual-shaped record.
    pub async fn get_rights(&self, uri: &str) -> Result<Individual> {
        self.uri_read("get_rights", uri).await
    }

    /// Membership information of `uri`, as an individual-shaped record.
    pub async fn get_membership(&self, uri: &str) -> Result<Individual> {
        self.uri_read("get_membership", uri).await
    }

    /// The individual-shaped records explaining where the rights on `uri`
    /// originate.
    pub async fn get_rights_origin(&self, uri: &str) -> Result<Vec<Individual>> {
        let ticket = self.require_ticket()?;
        let response = self
            .http
            .get(self.endpoint("get_rights_origin"))
            .query(&[("ticket", ticket), ("uri", uri)])
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(body
            .as_array()
            .map(|items| items.iter().map(Individual::from_json).collect())
            .unwrap_or_default())
    }

    async fn uri_read(&self, endpoint: &str, uri: &str) -> Result<Individual> {
        let ticket = self.require_ticket()?;
        let response = self
            .http
            .get(self.endpoint(endpoint))
            .query(&[("ticket", ticket), ("uri", uri)])
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(Individual::from_json(&body))
    }

    // -----------------------------------------------------------------------
    // Operation state
    // -----------------------------------------------------------------------

    /// Poll the state of a previously submitted operation. The endpoint
    /// returns a bare number; a non-numeric 200 body is a
    /// [`ClientError::Response`]. No ticket is required.
    pub async fn get_operation_state(&self, module_id: i64, wait_op_id: i64) -> Result<i64> {
        let response = self
            .http
            .get(self.endpoint("get_operation_state"))
            .query(&[("module_id", module_id), ("wait_op_id", wait_op_id)])
            .send()
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ClientError::from_status(status));
        }
        let text = response.text().await?;
        text.trim().parse::<i64>().map_err(|_| {
            ClientError::Response(format!(
                "expected a numeric operation state, got {:?}",
                text.trim()
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
