use crate::types::non_empty;
use crate::{ConfigFile, Credentials, FeishuAuthError, FeishuClient, Result, TokenSet, UserTokens};

/// Something that can turn a login code into user tokens
///
/// [`FeishuClient`] is the real implementation; the seam exists so the
/// read/merge/write cycle in [`get_user_access_token`] can run without a
/// network.
pub trait CodeExchange {
    /// Perform exactly one exchange of `code`
    fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
        app_access_token: Option<&str>,
    ) -> Result<TokenSet>;
}

impl CodeExchange for FeishuClient {
    fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
        app_access_token: Option<&str>,
    ) -> Result<TokenSet> {
        match app_access_token {
            Some(token) => self.exchange_code_with_app_token(token, code),
            None => FeishuClient::exchange_code(self, credentials, code),
        }
    }
}

/// Caller-supplied inputs to [`get_user_access_token`]
#[derive(Debug, Clone, Default)]
pub struct ExchangeRequest {
    pub login_code: Option<String>,
    pub app_access_token: Option<String>,
}

impl ExchangeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_code(mut self, code: impl Into<String>) -> Self {
        self.login_code = Some(code.into());
        self
    }

    /// Skip the app access token request and use this one instead
    pub fn with_app_access_token(mut self, token: impl Into<String>) -> Self {
        self.app_access_token = Some(token.into());
        self
    }
}

/// Resolve the login code: explicit argument first, then the config file
///
/// # Errors
///
/// Returns [`FeishuAuthError::MissingLoginCode`] when neither source has a
/// non-empty value
pub fn resolve_login_code(explicit: Option<&str>, config: &ConfigFile) -> Result<String> {
    non_empty(explicit)
        .map(str::to_string)
        .or_else(|| config.login_code())
        .ok_or(FeishuAuthError::MissingLoginCode)
}

/// Exchange a login code and persist the resulting tokens into `config`
///
/// Missing app credentials or a missing login code are returned as errors
/// before `exchanger` is called, as is any configuration error the exchanger
/// reports. A failed exchange is logged and yields an empty [`UserTokens`],
/// leaving the config file untouched.
///
/// # Example
///
/// ```no_run
/// use feishu_auth::{ConfigFile, ExchangeRequest, FeishuClient, FeishuConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = ConfigFile::open("feishu-config.ini")?;
/// let client = FeishuClient::new(FeishuConfig::default())?;
/// let request = ExchangeRequest::new().with_login_code("code");
///
/// let tokens = feishu_auth::get_user_access_token(&mut config, &request, &client)?;
/// if let Some(token) = tokens.user_access_token {
///     println!("user_access_token: {}", token);
/// }
/// # Ok(())
/// # }
/// ```
pub fn get_user_access_token(
    config: &mut ConfigFile,
    request: &ExchangeRequest,
    exchanger: &impl CodeExchange,
) -> Result<UserTokens> {
    let credentials = config.credentials()?;
    let code = resolve_login_code(request.login_code.as_deref(), config)?;

    let tokens = match exchanger.exchange_code(
        &credentials,
        &code,
        non_empty(request.app_access_token.as_deref()),
    ) {
        Ok(tokens) => tokens,
        Err(e) if e.is_configuration() => return Err(e),
        Err(FeishuAuthError::Api { code, msg, log_id }) => {
            log::error!(
                "failed to get user access token, code: {}, msg: {}, log_id: {}",
                code,
                msg,
                log_id.as_deref().unwrap_or("-")
            );
            return Ok(UserTokens::default());
        }
        Err(e) => {
            log::error!("failed to get user access token: {}", e);
            return Ok(UserTokens::default());
        }
    };

    if config.store_tokens(&tokens) {
        config.save()?;
        log::info!("saved user access token to {}", config.path().display());
    } else {
        log::warn!("exchange succeeded without an access token, config left unchanged");
    }

    Ok(tokens.into())
}
