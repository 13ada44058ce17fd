use ini::{EscapePolicy, Ini, Properties, WriteOption};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::non_empty;
use crate::{Credentials, FeishuAuthError, Result, TokenSet};

/// Default config file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "feishu-config.ini";

pub const ID_SECTION: &str = "ID";
pub const TOKEN_SECTION: &str = "TOKEN";

pub const APP_ID_KEY: &str = "app_id";
pub const APP_SECRET_KEY: &str = "app_secret";
pub const LOGIN_CODE_KEY: &str = "login_code";
pub const USER_ACCESS_TOKEN_KEY: &str = "user_access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Sectioned key-value config file holding app identity and user tokens
///
/// The file is read once on [`ConfigFile::open`] and only written back by an
/// explicit [`ConfigFile::save`]; callers own that lifecycle.
///
/// # Example
///
/// ```no_run
/// use feishu_auth::ConfigFile;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = ConfigFile::open("feishu-config.ini")?;
/// config.set("TOKEN", "login_code", "abc123");
/// config.save()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    ini: Ini,
}

impl ConfigFile {
    /// Open a config file, creating it empty if it does not exist
    ///
    /// The `ID` and `TOKEN` sections are added in memory when missing. They
    /// reach the disk on the next [`ConfigFile::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or read, or if its
    /// contents are not valid sectioned key-value text.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Only creates; an existing file is left as is.
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        let ini = Ini::load_from_file_noescape(&path)?;
        let mut config = Self { path, ini };
        config.ensure_sections();
        Ok(config)
    }

    /// Parse config text without a backing file on disk
    pub fn from_str_at(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let ini = Ini::load_from_str_noescape(contents)
            .map_err(|e| FeishuAuthError::ConfigParse(e.to_string()))?;
        let mut config = Self {
            path: path.into(),
            ini,
        };
        config.ensure_sections();
        Ok(config)
    }

    fn ensure_sections(&mut self) {
        for name in [TOKEN_SECTION, ID_SECTION] {
            if self.ini.section(Some(name)).is_none() {
                self.ini
                    .entry(Some(name.to_string()))
                    .or_insert(Properties::new());
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value; `None` if the section or key is absent
    ///
    /// Section names are case-sensitive, keys are not: an exact match wins,
    /// otherwise the first key equal ignoring ASCII case is used.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let props = self.ini.section(Some(section))?;
        props.get(key).or_else(|| {
            props
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Look up a value, falling back to `default`
    pub fn get_or<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Set a value, creating the section if needed
    ///
    /// Keys spelled with a different case are replaced, so `USER_ACCESS_TOKEN`
    /// does not linger next to `user_access_token`.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let props = self
            .ini
            .entry(Some(section.to_string()))
            .or_insert(Properties::new());
        let stale: Vec<String> = props
            .iter()
            .filter(|(k, _)| *k != key && k.eq_ignore_ascii_case(key))
            .map(|(k, _)| k.to_string())
            .collect();
        for k in stale {
            props.remove(&k);
        }
        props.insert(key, value);
    }

    /// App identity from the `ID` section
    ///
    /// # Errors
    ///
    /// Returns [`FeishuAuthError::MissingCredentials`] if `app_id` or
    /// `app_secret` is absent or empty.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(
            self.get(ID_SECTION, APP_ID_KEY),
            self.get(ID_SECTION, APP_SECRET_KEY),
        )
        .ok_or(FeishuAuthError::MissingCredentials)
    }

    /// Stored one-time authorization code, if any
    pub fn login_code(&self) -> Option<String> {
        non_empty(self.get(TOKEN_SECTION, LOGIN_CODE_KEY)).map(str::to_string)
    }

    /// Write the token fields into the `TOKEN` section
    ///
    /// Nothing is written without an access token. `refresh_token` is only
    /// written when the provider returned one, so a previously stored value
    /// survives an exchange without refresh scope.
    ///
    /// Returns whether anything changed.
    pub fn store_tokens(&mut self, tokens: &TokenSet) -> bool {
        let Some(access_token) = non_empty(tokens.access_token.as_deref()) else {
            return false;
        };
        self.set(TOKEN_SECTION, USER_ACCESS_TOKEN_KEY, access_token);
        if let Some(refresh_token) = non_empty(tokens.refresh_token.as_deref()) {
            self.set(TOKEN_SECTION, REFRESH_TOKEN_KEY, refresh_token);
        }
        true
    }

    /// Rewrite the whole file
    ///
    /// Contents go to a temporary file in the same directory which is then
    /// renamed over the target, so readers never observe a partial write.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let option = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..Default::default()
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        self.ini.write_to_opt(&mut tmp, option)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        log::debug!("wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        (dir, path)
    }

    #[test]
    fn test_open_creates_missing_file() {
        let (_dir, path) = scratch();
        assert!(!path.exists());

        let config = ConfigFile::open(&path).unwrap();
        assert!(path.exists());
        assert!(config.ini.section(Some(ID_SECTION)).is_some());
        assert!(config.ini.section(Some(TOKEN_SECTION)).is_some());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_ensure_sections_is_idempotent() {
        let (_dir, path) = scratch();
        fs::write(&path, "[ID]\napp_id=cli_a\napp_secret=shh\n").unwrap();

        ConfigFile::open(&path).unwrap().save().unwrap();
        ConfigFile::open(&path).unwrap().save().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("[ID]").count(), 1);
        assert_eq!(text.matches("[TOKEN]").count(), 1);

        let config = ConfigFile::open(&path).unwrap();
        assert_eq!(config.get(ID_SECTION, APP_ID_KEY), Some("cli_a"));
        assert_eq!(config.get(ID_SECTION, APP_SECRET_KEY), Some("shh"));
    }

    #[test]
    fn test_get_and_set() {
        let (_dir, path) = scratch();
        let mut config = ConfigFile::open(&path).unwrap();

        assert_eq!(config.get(TOKEN_SECTION, LOGIN_CODE_KEY), None);
        assert_eq!(config.get_or(TOKEN_SECTION, LOGIN_CODE_KEY, "x"), "x");

        config.set("EXTRA", "k", "v");
        config.set(TOKEN_SECTION, LOGIN_CODE_KEY, "code-1");
        config.save().unwrap();

        let config = ConfigFile::open(&path).unwrap();
        assert_eq!(config.get("EXTRA", "k"), Some("v"));
        assert_eq!(config.login_code().as_deref(), Some("code-1"));
    }

    #[test]
    fn test_credentials_missing_or_empty() {
        let config = ConfigFile::from_str_at("mem.ini", "").unwrap();
        assert!(matches!(
            config.credentials(),
            Err(FeishuAuthError::MissingCredentials)
        ));

        let config =
            ConfigFile::from_str_at("mem.ini", "[ID]\napp_id=cli_a\napp_secret=\n").unwrap();
        assert!(matches!(
            config.credentials(),
            Err(FeishuAuthError::MissingCredentials)
        ));

        let config =
            ConfigFile::from_str_at("mem.ini", "[ID]\napp_id=cli_a\napp_secret=shh\n").unwrap();
        assert_eq!(config.credentials().unwrap().app_id, "cli_a");
    }

    #[test]
    fn test_empty_login_code_is_absent() {
        let config = ConfigFile::from_str_at("mem.ini", "[TOKEN]\nlogin_code=\n").unwrap();
        assert_eq!(config.login_code(), None);
    }

    #[test]
    fn test_store_tokens_keeps_refresh_token_when_absent() {
        let mut config =
            ConfigFile::from_str_at("mem.ini", "[TOKEN]\nrefresh_token=old\n").unwrap();
        assert!(config.store_tokens(&TokenSet {
            access_token: Some("AT2".to_string()),
            ..Default::default()
        }));
        assert_eq!(config.get(TOKEN_SECTION, USER_ACCESS_TOKEN_KEY), Some("AT2"));
        assert_eq!(config.get(TOKEN_SECTION, REFRESH_TOKEN_KEY), Some("old"));
    }

    #[test]
    fn test_store_tokens_without_access_token_writes_nothing() {
        let mut config = ConfigFile::from_str_at("mem.ini", "").unwrap();
        assert!(!config.store_tokens(&TokenSet {
            access_token: Some(String::new()),
            refresh_token: Some("RT1".to_string()),
            ..Default::default()
        }));
        assert_eq!(config.get(TOKEN_SECTION, USER_ACCESS_TOKEN_KEY), None);
        assert_eq!(config.get(TOKEN_SECTION, REFRESH_TOKEN_KEY), None);
    }

    #[test]
    fn test_store_tokens_keeps_value_verbatim() {
        let mut config = ConfigFile::from_str_at("mem.ini", "").unwrap();
        config.store_tokens(&TokenSet {
            access_token: Some("AT1".to_string()),
            refresh_token: Some("RT1 ".to_string()),
            ..Default::default()
        });
        assert_eq!(config.get(TOKEN_SECTION, REFRESH_TOKEN_KEY), Some("RT1 "));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let (_dir, path) = scratch();
        fs::write(
            &path,
            "[ID]\nAPP_ID=cli_a\nApp_Secret=shh\n[TOKEN]\nUSER_ACCESS_TOKEN=old\n",
        )
        .unwrap();

        let mut config = ConfigFile::open(&path).unwrap();
        assert_eq!(config.credentials().unwrap().app_id, "cli_a");
        assert_eq!(config.get(TOKEN_SECTION, USER_ACCESS_TOKEN_KEY), Some("old"));

        config.set(TOKEN_SECTION, USER_ACCESS_TOKEN_KEY, "new");
        config.save().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("user_access_token=new"));
        assert!(!text.contains("USER_ACCESS_TOKEN"));
    }

    #[test]
    fn test_unparseable_file_is_rejected() {
        let (_dir, path) = scratch();
        fs::write(&path, "[ID]\napp_id=cli_a\n[TOKEN").unwrap();
        assert!(matches!(
            ConfigFile::open(&path),
            Err(FeishuAuthError::ConfigParse(_))
        ));
    }
}
