use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{
    APP_ACCESS_TOKEN_PATH, ApiResponse, AppAccessTokenRequest, AppAccessTokenResponse,
    LOG_ID_HEADER, OIDC_ACCESS_TOKEN_PATH, OidcAccessTokenRequest,
};
use crate::{Credentials, FeishuAuthError, FeishuConfig, Result, TokenSet};

/// Blocking Feishu open platform client
///
/// Covers the two calls needed to turn a login code into a user access
/// token: obtaining an app access token from the app credentials, and the
/// OIDC `authorization_code` exchange itself.
///
/// # Example
///
/// ```no_run
/// use feishu_auth::{Credentials, FeishuClient, FeishuConfig};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = FeishuClient::new(FeishuConfig::default())?;
///     let credentials = Credentials {
///         app_id: "cli_xxx".into(),
///         app_secret: "secret".into(),
///     };
///
///     let tokens = client.exchange_code(&credentials, "login_code")?;
///     println!("Got user access token, expires in {:?}s", tokens.expires_in);
///     Ok(())
/// }
/// ```
pub struct FeishuClient {
    base_url: Url,
    http: reqwest::blocking::Client,
}

impl FeishuClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(config: FeishuConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(FeishuAuthError::InvalidConfig(format!(
                "base_url cannot be a base: {}",
                config.base_url
            )));
        }

        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| FeishuAuthError::ClientCreation(e.to_string()))?;

        Ok(Self { base_url, http })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Obtain an app access token for a self-built app
    ///
    /// # Errors
    ///
    /// Returns [`FeishuAuthError::Api`] if the platform rejects the
    /// credentials, or a transport error
    pub fn app_access_token(&self, credentials: &Credentials) -> Result<String> {
        let url = self.endpoint(APP_ACCESS_TOKEN_PATH)?;
        log::debug!("requesting app access token for {}", credentials.app_id);

        let response = self
            .http
            .post(url)
            .json(&AppAccessTokenRequest {
                app_id: &credentials.app_id,
                app_secret: &credentials.app_secret,
            })
            .send()?;

        let log_id = log_id(&response);
        let body: AppAccessTokenResponse = read_json(response)?;
        if body.code != 0 {
            return Err(FeishuAuthError::Api {
                code: body.code,
                msg: body.msg,
                log_id,
            });
        }

        body.app_access_token.ok_or_else(|| FeishuAuthError::Api {
            code: body.code,
            msg: "response carries no app_access_token".to_string(),
            log_id,
        })
    }

    /// Exchange a login code for user tokens
    ///
    /// Obtains an app access token first, then performs the exchange.
    pub fn exchange_code(&self, credentials: &Credentials, code: &str) -> Result<TokenSet> {
        let app_access_token = self.app_access_token(credentials)?;
        self.exchange_code_with_app_token(&app_access_token, code)
    }

    /// Exchange a login code for user tokens with a known app access token
    ///
    /// # Errors
    ///
    /// Returns [`FeishuAuthError::Api`] with the platform's code, message and
    /// log id if the exchange is rejected (e.g. an expired or reused code)
    pub fn exchange_code_with_app_token(
        &self,
        app_access_token: &str,
        code: &str,
    ) -> Result<TokenSet> {
        let url = self.endpoint(OIDC_ACCESS_TOKEN_PATH)?;
        log::debug!("exchanging login code at {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(app_access_token)
            .json(&OidcAccessTokenRequest {
                grant_type: "authorization_code",
                code,
            })
            .send()?;

        let log_id = log_id(&response);
        let body: ApiResponse<TokenSet> = read_json(response)?;
        if body.code != 0 {
            return Err(FeishuAuthError::Api {
                code: body.code,
                msg: body.msg,
                log_id,
            });
        }

        Ok(body.data.unwrap_or_default())
    }
}

fn log_id(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOG_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Decode a JSON body; the platform reports business errors in the body
/// even on 4xx, so only fall back to `Http` when the body is not JSON.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text()?;
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(FeishuAuthError::Http {
            status: status.as_u16(),
            body,
        }),
        Err(e) => Err(e.into()),
    }
}
