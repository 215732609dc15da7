// Session authentication
//
// Form login against `j_security_check`, followed by an XSRF token fetch.
// The security check sets `JSESSIONID` in the client's cookie jar; the
// token is sent as `X-XSRF-TOKEN` on every later API call.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{ManagerClient, parse_json};
use crate::error::{Error, body_preview};
use crate::models::TokenResponse;

impl ManagerClient {
    /// Authenticate with the manager using username/password.
    ///
    /// An accepted login answers the security check with HTTP 200 and an
    /// empty body. Anything else (typically the HTML login page again)
    /// means the credentials were rejected, and no further request is made.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.root_url("/j_security_check")?;
        debug!("logging in at {}", url);

        let form = [
            ("j_username", username),
            ("j_password", password.expose_secret()),
        ];

        let resp = self.http().post(url).form(&form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            return Err(Error::Authentication {
                message: format!("security check returned HTTP {status}"),
            });
        }
        if !body.is_empty() {
            debug!(body = %body_preview(&body), "security check returned a page");
            return Err(Error::Authentication {
                message: "credentials rejected by security check".into(),
            });
        }

        let token = self.fetch_xsrf_token().await?;
        self.set_xsrf_token(Some(token));

        debug!("login successful");
        Ok(())
    }

    /// `GET /dataservice/client/token?json=true`
    ///
    /// A non-2xx status is returned as [`Error::Http`]; a body without a
    /// usable token is an authentication failure.
    async fn fetch_xsrf_token(&self) -> Result<String, Error> {
        let url = self.api_url("/client/token?json=true")?;
        debug!("requesting XSRF token");

        let resp = self.http().get(url).send().await?;
        let token: TokenResponse = parse_json(resp).await.map_err(|e| match e {
            Error::Deserialization { message, .. } => Error::Authentication {
                message: format!("unable to obtain the XSRF token: {message}"),
            },
            other => other,
        })?;

        if token.token.is_empty() {
            return Err(Error::Authentication {
                message: "manager returned an empty XSRF token".into(),
            });
        }
        Ok(token.token)
    }

    /// End the current session.
    ///
    /// `POST /logout` with a cache-busting `nocache` parameter. The stored
    /// token is dropped whatever the outcome.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.root_url("/logout")?;
        debug!("logging out at {}", url);

        let nocache = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_string();

        let result = self
            .apply_xsrf(self.http().post(url))
            .form(&[("nocache", nocache.as_str())])
            .send()
            .await;
        self.set_xsrf_token(None);

        let resp = result?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: body_preview(&body),
            });
        }

        debug!("logout complete");
        Ok(())
    }
}
