//! Loader for chirp configuration with YAML + environment overlays.
//!
//! Sources merge in the order they are attached, and `CHIRP__`-prefixed environment
//! variables (`__` between path segments, e.g. `CHIRP__SEARCH__COUNT=20`) are applied
//! last so they always win. Environment values arrive as strings and are read as the
//! field's type, so a numeric-looking token stays exactly as written while
//! `CHIRP__SEARCH__COUNT=20` still sets a number. String values may contain `${VAR}` placeholders, which are
//! expanded after merging. Every section is optional; missing keys take the defaults
//! below.
//!
//! ```yaml
//! twitter:
//!   bearer_token: "${TWITTER_BEARER_TOKEN}"
//!   base_url: "https://api.twitter.com"
//!   timeout_secs: 15
//! search:
//!   count: 100
//!   clean: true
//!   column: "text"
//! logging:
//!   format: text
//!   emit_stderr: false
//!   filter: info
//! ```
use chirp_common::LogFormat;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CHIRP";
const TOKEN_ENV: &str = "TWITTER_BEARER_TOKEN";
const CONFIG_FILE_NAME: &str = "chirp.yaml";

#[derive(Debug, Default, Deserialize)]
pub struct ChirpConfig {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct TwitterConfig {
    /// Falls back to `TWITTER_BEARER_TOKEN` when the key is absent.
    #[serde(default = "bearer_from_env", deserialize_with = "lenient::string")]
    pub bearer_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs", deserialize_with = "lenient::parsed")]
    pub timeout_secs: u64,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            bearer_token: bearer_from_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TwitterConfig {
    /// False when the token is empty or still an unexpanded `${VAR}`.
    pub fn has_bearer_token(&self) -> bool {
        let token = self.bearer_token.trim();
        !token.is_empty() && !token.contains("${")
    }
}

/// Defaults for `fetch` invocations.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_count", deserialize_with = "lenient::parsed")]
    pub count: u32,
    #[serde(default = "default_true", deserialize_with = "lenient::parsed")]
    pub clean: bool,
    #[serde(default = "default_column", deserialize_with = "lenient::string")]
    pub column: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            clean: true,
            column: default_column(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default, deserialize_with = "lenient::parsed")]
    pub emit_stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            emit_stderr: false,
            filter: default_filter(),
            dir: None,
        }
    }
}

fn bearer_from_env() -> String {
    std::env::var(TOKEN_ENV).unwrap_or_default()
}
fn default_base_url() -> String {
    "https://api.twitter.com".into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_count() -> u32 {
    100
}
fn default_true() -> bool {
    true
}
fn default_column() -> String {
    "text".into()
}
fn default_filter() -> String {
    "info".into()
}

/// Field readers that accept both the native type and its string spelling.
mod lenient {
    use serde::de::{DeserializeOwned, Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;
    use std::fmt::Display;
    use std::str::FromStr;

    fn scalar_to_string<E: Error>(v: Value) -> Result<String, E> {
        match v {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(E::custom(format!("expected a string, got {other}"))),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        scalar_to_string(Value::deserialize(d)?)
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            v => scalar_to_string(v).map(Some),
        }
    }

    pub fn parsed<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + DeserializeOwned,
        T::Err: Display,
    {
        match Value::deserialize(d)? {
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid value {s:?}: {e}"))),
            v => serde_json::from_value(v).map_err(D::Error::custom),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => break,
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring.
pub struct ChirpConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ChirpConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ChirpConfigLoader {
    /// Start with no files; only defaults and `CHIRP__` environment overrides apply.
    ///
    /// ```
    /// use chirp_config::ChirpConfigLoader;
    ///
    /// let cfg = ChirpConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.search.count, 100);
    /// assert!(cfg.search.clean);
    /// assert_eq!(cfg.twitter.base_url, "https://api.twitter.com");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from its suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach `$XDG_CONFIG_HOME/chirp/chirp.yaml` then `./chirp.yaml`, both optional.
    pub fn with_default_files(self) -> Self {
        let user = dirs::config_dir().map(|d| d.join("chirp").join(CONFIG_FILE_NAME));
        let loader = match user {
            Some(path) => self.with_optional_file(path),
            None => self,
        };
        loader.with_optional_file(CONFIG_FILE_NAME)
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use chirp_config::ChirpConfigLoader;
    ///
    /// let cfg = ChirpConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "1"
    /// search:
    ///   count: 25
    ///   clean: false
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("1"));
    /// assert_eq!(cfg.search.count, 25);
    /// assert!(!cfg.search.clean);
    /// assert_eq!(cfg.search.column, "text");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    pub fn load(self) -> Result<ChirpConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX).separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("CHIRP_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${CHIRP_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("CHIRP_TEST_CITY", Some("Lyon")), ("CHIRP_TEST_CC", Some("FR"))],
            || {
                let mut v = json!([
                    "hello-$CHIRP_TEST_CITY",
                    { "loc": "${CHIRP_TEST_CITY}-${CHIRP_TEST_CC}" },
                    42,
                    true,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["hello-Lyon", { "loc": "Lyon-FR" }, 42, true, null])
                );
            },
        );
    }

    #[test]
    fn expands_through_nested_references() {
        temp_env::with_vars(
            [
                ("CHIRP_TEST_C", Some("qux")),
                ("CHIRP_TEST_B", Some("mid-${CHIRP_TEST_C}")),
                ("CHIRP_TEST_A", Some("start-${CHIRP_TEST_B}-end")),
            ],
            || {
                let mut v = json!("X=${CHIRP_TEST_A}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn cycles_terminate() {
        temp_env::with_vars(
            [
                ("CHIRP_TEST_P", Some("${CHIRP_TEST_Q}")),
                ("CHIRP_TEST_Q", Some("${CHIRP_TEST_P}")),
            ],
            || {
                let mut v = json!("x=${CHIRP_TEST_P}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${CHIRP_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${CHIRP_TEST_DOES_NOT_EXIST}"));
    }

    #[test]
    fn string_fields_accept_scalars() {
        let cfg: SearchConfig = serde_json::from_value(json!({"column": 1})).unwrap();
        assert_eq!(cfg.column, "1");
        let cfg: TwitterConfig =
            serde_json::from_value(json!({"bearer_token": 12345, "timeout_secs": "30"})).unwrap();
        assert_eq!(cfg.bearer_token, "12345");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn bad_numeric_string_is_an_error() {
        let err = serde_json::from_value::<SearchConfig>(json!({"count": "many"})).unwrap_err();
        assert!(err.to_string().contains("many"));
    }

    #[test]
    fn unexpanded_token_is_not_a_token() {
        let mut cfg = TwitterConfig::default();
        cfg.bearer_token = "${TWITTER_BEARER_TOKEN}".into();
        assert!(!cfg.has_bearer_token());
        cfg.bearer_token = "  ".into();
        assert!(!cfg.has_bearer_token());
        cfg.bearer_token = "AAAA".into();
        assert!(cfg.has_bearer_token());
    }
}
