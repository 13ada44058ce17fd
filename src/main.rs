use clap::Parser;
use feishu_auth::{
    ConfigFile, DEFAULT_CONFIG_FILE, ExchangeRequest, FEISHU_BASE_URL, FeishuClient,
    FeishuConfig, get_user_access_token, resolve_login_code,
};
use std::path::PathBuf;

/// Exchange a Feishu login code for a user access token
#[derive(Debug, Parser)]
#[command(name = "feishu-user-token", version)]
struct Opt {
    /// Login pre-authorization code; falls back to TOKEN.login_code in the config file
    #[arg(short = 'l', long = "login_code")]
    login_code: Option<String>,

    /// Path of the config file
    #[arg(long = "config_file", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Open platform host, e.g. https://open.larksuite.com for Lark
    #[arg(long = "base_url", default_value = FEISHU_BASE_URL)]
    base_url: String,

    /// Use this app access token instead of requesting one
    #[arg(long = "app_access_token")]
    app_access_token: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::parse();

    let mut config = ConfigFile::open(&opt.config_file)?;
    let login_code = resolve_login_code(opt.login_code.as_deref(), &config)?;

    let mut request = ExchangeRequest::new().with_login_code(login_code);
    if let Some(token) = opt.app_access_token {
        request = request.with_app_access_token(token);
    }

    let client = FeishuClient::new(FeishuConfig::builder().base_url(opt.base_url).build())?;
    let tokens = get_user_access_token(&mut config, &request, &client)?;

    println!(
        "user_access_token: {}",
        tokens.user_access_token.as_deref().unwrap_or("None")
    );
    println!(
        "refresh_token: {}",
        tokens.refresh_token.as_deref().unwrap_or("None")
    );
    Ok(())
}
