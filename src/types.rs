use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default open platform host (Feishu, mainland China)
pub const FEISHU_BASE_URL: &str = "https://open.feishu.cn";

/// Open platform host for Lark international tenants
pub const LARK_BASE_URL: &str = "https://open.larksuite.com";

pub(crate) const APP_ACCESS_TOKEN_PATH: &str = "/open-apis/auth/v3/app_access_token/internal";
pub(crate) const OIDC_ACCESS_TOKEN_PATH: &str = "/open-apis/authen/v1/oidc/access_token";

/// Response header carrying the provider's trace id
pub(crate) const LOG_ID_HEADER: &str = "X-Tt-Logid";

/// Application identity read from the `ID` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

impl Credentials {
    /// Build credentials, treating empty strings as missing
    pub fn new(app_id: Option<&str>, app_secret: Option<&str>) -> Option<Self> {
        match (non_empty(app_id), non_empty(app_secret)) {
            (Some(app_id), Some(app_secret)) => Some(Self {
                app_id: app_id.to_string(),
                app_secret: app_secret.to_string(),
            }),
            _ => None,
        }
    }
}

/// `None` for absent or blank values; the value itself is returned as is
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// User token payload returned by the OIDC access token endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSet {
    /// The user access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// The refresh token, when the app has refresh permission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Lifetime of the refresh token in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// The pair handed back to callers of [`crate::get_user_access_token`]
///
/// Both fields are `None` when the remote exchange failed, and a blank value
/// from the provider is reported as `None` too; check before use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTokens {
    pub user_access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl UserTokens {
    pub fn is_empty(&self) -> bool {
        self.user_access_token.is_none() && self.refresh_token.is_none()
    }
}

impl From<TokenSet> for UserTokens {
    fn from(tokens: TokenSet) -> Self {
        let present = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
        UserTokens {
            user_access_token: present(tokens.access_token),
            refresh_token: present(tokens.refresh_token),
        }
    }
}

/// Configuration for the Feishu HTTP client
#[derive(Debug, Clone)]
pub struct FeishuConfig {
    /// Open platform host (default: "https://open.feishu.cn")
    pub base_url: String,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            base_url: FEISHU_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl FeishuConfig {
    /// Create a new config builder
    pub fn builder() -> FeishuConfigBuilder {
        FeishuConfigBuilder::default()
    }
}

/// Builder for FeishuConfig
#[derive(Debug, Clone, Default)]
pub struct FeishuConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl FeishuConfigBuilder {
    /// Set the open platform host
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use the Lark international host
    pub fn lark(mut self) -> Self {
        self.base_url = Some(LARK_BASE_URL.to_string());
        self
    }

    /// Set a request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the FeishuConfig
    pub fn build(self) -> FeishuConfig {
        let defaults = FeishuConfig::default();
        FeishuConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            timeout: self.timeout.or(defaults.timeout),
        }
    }
}

/// Body of the app access token request
#[derive(Debug, Serialize)]
pub(crate) struct AppAccessTokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// App access token response; fields sit at the top level, not under `data`
#[derive(Debug, Deserialize)]
pub(crate) struct AppAccessTokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub app_access_token: Option<String>,
}

/// Body of the OIDC access token request
#[derive(Debug, Serialize)]
pub(crate) struct OidcAccessTokenRequest<'a> {
    pub grant_type: &'a str,
    pub code: &'a str,
}

/// Standard `{code, msg, data}` envelope used by the open platform
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}
