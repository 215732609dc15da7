// Manager HTTP client
//
// Wraps `reqwest::Client` with dataservice URL construction, XSRF
// header injection, and JSON decoding. Endpoint wrappers (devices,
// templates) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, body_preview};
use crate::transport::TransportConfig;

/// Path prefix of the REST API on the manager.
const DATASERVICE: &str = "/dataservice";

/// Raw HTTP client for the SD-WAN Manager.
///
/// The session cookie (`JSESSIONID`) lives in the cookie jar; the XSRF
/// token obtained at login is added to every request made through
/// [`request`](Self::request) and the typed endpoint wrappers.
pub struct ManagerClient {
    http: reqwest::Client,
    base_url: Url,
    /// Anti-forgery token, set by `login`.
    xsrf_token: RwLock<Option<String>>,
}

impl ManagerClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies). `base_url` is the
    /// manager root, e.g. `https://vmanage.example.net:8443`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        Ok(Self::with_client(config.build_client()?, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            xsrf_token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a login has stored an XSRF token.
    pub fn is_authenticated(&self) -> bool {
        self.xsrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // ── XSRF token management ────────────────────────────────────────

    pub(crate) fn set_xsrf_token(&self, token: Option<String>) {
        debug!(present = token.is_some(), "storing XSRF token");
        *self
            .xsrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Apply the stored XSRF token to a request builder.
    pub(crate) fn apply_xsrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self
            .xsrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(token) => builder.header("X-XSRF-TOKEN", token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a URL relative to the manager root: `{base}{path}`.
    ///
    /// Used for the login/logout endpoints, which live outside the API.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Build an API URL: `{base}/dataservice{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.root_url(&format!("{DATASERVICE}{path}"))
    }

    // ── Generic requests ─────────────────────────────────────────────

    /// Issue `method` against `/dataservice{path}` and return the parsed JSON.
    ///
    /// Any failure (transport, non-2xx status, undecodable body) is logged
    /// and returned as an [`Error`]; nothing is retried.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<Value, Error> {
        self.send(method, path, payload).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        self.send(Method::GET, path, None::<&Value>).await
    }

    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value, Error> {
        self.send(Method::POST, path, Some(payload)).await
    }

    pub async fn put(&self, path: &str, payload: &Value) -> Result<Value, Error> {
        self.send(Method::PUT, path, Some(payload)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        self.send(Method::DELETE, path, None::<&Value>).await
    }

    /// Typed GET used by the endpoint wrappers.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.send(Method::GET, path, None::<&Value>).await
    }

    /// Typed POST used by the endpoint wrappers.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.api_url(path)?;
        debug!("{} {}", method, url);

        let mut builder = self.apply_xsrf(self.http.request(method.clone(), url.clone()));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let result = match builder.send().await {
            Ok(resp) => parse_json(resp).await,
            Err(e) => Err(Error::Transport(e)),
        };

        if let Err(ref e) = result {
            warn!(%method, %url, error = %e, "manager request failed");
        }
        result
    }
}

/// Check the status and decode a JSON body.
pub(crate) async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            body: body_preview(&body),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", body_preview(&body)),
        body,
    })
}
