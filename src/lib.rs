//! # feishu-auth
//!
//! Exchange a Feishu/Lark login code (the one-time authorization code issued
//! after user login) for a user access token, and keep the result in a local
//! INI config file for other tools to reuse.
//!
//! The config file layout:
//!
//! ```ini
//! [ID]
//! app_id=cli_xxx
//! app_secret=xxx
//!
//! [TOKEN]
//! login_code=xxx
//! user_access_token=u-xxx
//! refresh_token=ur-xxx
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use feishu_auth::{ConfigFile, ExchangeRequest, FeishuClient, FeishuConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = ConfigFile::open("feishu-config.ini")?;
//!     let client = FeishuClient::new(FeishuConfig::default())?;
//!
//!     let tokens = feishu_auth::get_user_access_token(
//!         &mut config,
//!         &ExchangeRequest::new().with_login_code("code"),
//!         &client,
//!     )?;
//!
//!     match tokens.user_access_token {
//!         Some(token) => println!("Got token: {}", token),
//!         None => println!("Exchange failed, see log"),
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod types;

pub mod blocking;
pub mod config;
pub mod token;

// Public API exports
pub use blocking::FeishuClient;
pub use config::{ConfigFile, DEFAULT_CONFIG_FILE};
pub use error::{FeishuAuthError, Result};
pub use token::{CodeExchange, ExchangeRequest, get_user_access_token, resolve_login_code};
pub use types::{
    Credentials, FEISHU_BASE_URL, FeishuConfig, FeishuConfigBuilder, LARK_BASE_URL, TokenSet,
    UserTokens,
};
