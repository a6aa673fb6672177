use super::error::Error;
use super::spec;
use std::fs;
use std::time::Duration;
use yaml_rust::{Yaml, YamlLoader};

/// Self-check terminal configuration.
///
/// Created via ConfigBuilder and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    host: String,
    port: u16,
    library: String,
    language: String,
    institution: String,
    patron: String,
    patron_pwd: String,
    terminal_pwd: String,
    location: String,
    uid_algorithm: u8,
    pwd_algorithm: u8,
    max_retry: usize,
    terminator: String,
    ascii: bool,
    utc_dates: bool,
    timeout: Option<Duration>,
    debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: String::from("localhost"),
            port: spec::DEFAULT_PORT,
            library: String::new(),
            language: spec::DEFAULT_LANGUAGE.to_string(),
            institution: spec::DEFAULT_INSTITUTION.to_string(),
            patron: String::new(),
            patron_pwd: String::new(),
            terminal_pwd: String::new(),
            location: String::new(),
            uid_algorithm: 0,
            pwd_algorithm: 0,
            max_retry: spec::DEFAULT_MAX_RETRY,
            terminator: spec::DEFAULT_TERMINATOR.to_string(),
            ascii: false,
            utc_dates: false,
            timeout: None,
            debug: false,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load a configuration from a YAML file.
    ///
    /// Values are read from the top-level "sip2sc" key.  Missing
    /// values keep their defaults.
    pub fn from_yaml(filename: &str) -> Result<Self, Error> {
        let yaml_text = match fs::read_to_string(filename) {
            Ok(y) => y,
            Err(e) => return Err(Error::ConfigError(format!("Error reading {filename}: {e}"))),
        };

        Config::from_yaml_str(&yaml_text)
    }

    /// ```
    /// use sip2sc::Config;
    /// let conf = Config::from_yaml_str(r#"
    /// sip2sc:
    ///   host: sip.example.org
    ///   port: 6001
    ///   patron: "101010101"
    ///   max-retry: 5
    /// "#).unwrap();
    ///
    /// assert_eq!(conf.host(), "sip.example.org");
    /// assert_eq!(conf.port(), 6001);
    /// assert_eq!(conf.patron(), "101010101");
    /// assert_eq!(conf.max_retry(), 5);
    /// assert_eq!(conf.language(), "001");
    /// ```
    pub fn from_yaml_str(yaml_text: &str) -> Result<Self, Error> {
        let yaml_docs = match YamlLoader::load_from_str(yaml_text) {
            Ok(y) => y,
            Err(e) => return Err(Error::ConfigError(format!("Error parsing YAML: {e}"))),
        };

        let root = match yaml_docs.first() {
            Some(doc) => &doc["sip2sc"],
            None => return Err(Error::ConfigError("Empty configuration".to_string())),
        };

        let mut builder = ConfigBuilder::new();
        builder.apply_yaml(root)?;
        builder.build()
    }

    pub fn host(&self) -> &str {
        &self.host
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    /// "host:port" as used to open the connection.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
    pub fn library(&self) -> &str {
        &self.library
    }
    pub fn language(&self) -> &str {
        &self.language
    }
    pub fn institution(&self) -> &str {
        &self.institution
    }
    pub fn patron(&self) -> &str {
        &self.patron
    }
    pub fn patron_pwd(&self) -> &str {
        &self.patron_pwd
    }
    pub fn terminal_pwd(&self) -> &str {
        &self.terminal_pwd
    }
    pub fn location(&self) -> &str {
        &self.location
    }
    pub fn uid_algorithm(&self) -> u8 {
        self.uid_algorithm
    }
    pub fn pwd_algorithm(&self) -> u8 {
        self.pwd_algorithm
    }
    pub fn max_retry(&self) -> usize {
        self.max_retry
    }
    pub fn terminator(&self) -> &str {
        &self.terminator
    }
    pub fn ascii(&self) -> bool {
        self.ascii
    }
    /// Send transaction dates in UTC ("YYYYMMDD   ZHHMMSS") instead of
    /// local time.
    pub fn utc_dates(&self) -> bool {
        self.utc_dates
    }
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
    pub fn debug(&self) -> bool {
        self.debug
    }
}

/// Collects configuration values and produces a validated Config.
///
/// ```
/// use sip2sc::Config;
/// let conf = Config::builder()
///     .set_host("127.0.0.1")
///     .set_patron("101010101")
///     .set_patron_pwd("010101")
///     .build()
///     .unwrap();
///
/// assert_eq!(conf.address(), "127.0.0.1:6002");
/// assert_eq!(conf.terminator(), "\r\n");
///
/// assert!(Config::builder().set_language("en").build().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    conf: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Start from an existing configuration, e.g. one loaded from YAML,
    /// so individual values may be overridden.
    pub fn from_config(conf: &Config) -> Self {
        ConfigBuilder { conf: conf.clone() }
    }

    pub fn set_host(&mut self, value: &str) -> &mut Self {
        self.conf.host = value.to_string();
        self
    }
    pub fn set_port(&mut self, value: u16) -> &mut Self {
        self.conf.port = value;
        self
    }
    pub fn set_library(&mut self, value: &str) -> &mut Self {
        self.conf.library = value.to_string();
        self
    }
    pub fn set_language(&mut self, value: &str) -> &mut Self {
        self.conf.language = value.to_string();
        self
    }
    pub fn set_institution(&mut self, value: &str) -> &mut Self {
        self.conf.institution = value.to_string();
        self
    }
    pub fn set_patron(&mut self, value: &str) -> &mut Self {
        self.conf.patron = value.to_string();
        self
    }
    pub fn set_patron_pwd(&mut self, value: &str) -> &mut Self {
        self.conf.patron_pwd = value.to_string();
        self
    }
    pub fn set_terminal_pwd(&mut self, value: &str) -> &mut Self {
        self.conf.terminal_pwd = value.to_string();
        self
    }
    pub fn set_location(&mut self, value: &str) -> &mut Self {
        self.conf.location = value.to_string();
        self
    }
    pub fn set_uid_algorithm(&mut self, value: u8) -> &mut Self {
        self.conf.uid_algorithm = value;
        self
    }
    pub fn set_pwd_algorithm(&mut self, value: u8) -> &mut Self {
        self.conf.pwd_algorithm = value;
        self
    }
    pub fn set_max_retry(&mut self, value: usize) -> &mut Self {
        self.conf.max_retry = value;
        self
    }
    pub fn set_terminator(&mut self, value: &str) -> &mut Self {
        self.conf.terminator = value.to_string();
        self
    }
    pub fn set_ascii(&mut self, value: bool) -> &mut Self {
        self.conf.ascii = value;
        self
    }
    pub fn set_utc_dates(&mut self, value: bool) -> &mut Self {
        self.conf.utc_dates = value;
        self
    }
    pub fn set_timeout(&mut self, value: Option<Duration>) -> &mut Self {
        self.conf.timeout = value;
        self
    }
    pub fn set_debug(&mut self, value: bool) -> &mut Self {
        self.conf.debug = value;
        self
    }

    /// Copy any values present in a YAML hash onto the builder.
    fn apply_yaml(&mut self, root: &Yaml) -> Result<(), Error> {
        let text = |key: &str| root[key].as_str().map(|s| s.to_string());

        if let Some(v) = text("host") {
            self.set_host(&v);
        }
        if let Some(v) = root["port"].as_i64() {
            match u16::try_from(v) {
                Ok(p) => self.set_port(p),
                Err(_) => return Err(Error::ConfigError(format!("Invalid port: {v}"))),
            };
        }
        if let Some(v) = text("library") {
            self.set_library(&v);
        }
        if let Some(v) = text("language") {
            self.set_language(&v);
        } else if let Some(v) = root["language"].as_i64() {
            // YAML reads an unquoted 001 as a number.
            self.set_language(&format!("{v:03}"));
        }
        if let Some(v) = text("institution") {
            self.set_institution(&v);
        }
        if let Some(v) = text("patron") {
            self.set_patron(&v);
        } else if let Some(v) = root["patron"].as_i64() {
            self.set_patron(&v.to_string());
        }
        if let Some(v) = text("patron-pwd") {
            self.set_patron_pwd(&v);
        }
        if let Some(v) = text("terminal-pwd") {
            self.set_terminal_pwd(&v);
        }
        if let Some(v) = text("location") {
            self.set_location(&v);
        }
        if let Some(v) = root["uid-algorithm"].as_i64() {
            self.set_uid_algorithm(algorithm(v)?);
        }
        if let Some(v) = root["pwd-algorithm"].as_i64() {
            self.set_pwd_algorithm(algorithm(v)?);
        }
        if let Some(v) = root["max-retry"].as_i64() {
            self.set_max_retry(v.max(0) as usize);
        }
        if let Some(v) = text("terminator") {
            self.set_terminator(&v);
        }
        if let Some(v) = root["ascii"].as_bool() {
            self.set_ascii(v);
        }
        if let Some(v) = root["utc-dates"].as_bool() {
            self.set_utc_dates(v);
        }
        if let Some(v) = root["timeout"].as_i64() {
            let timeout = match v > 0 {
                true => Some(Duration::from_secs(v as u64)),
                false => None,
            };
            self.set_timeout(timeout);
        }
        if let Some(v) = root["debug"].as_bool() {
            self.set_debug(v);
        }

        Ok(())
    }

    pub fn build(&self) -> Result<Config, Error> {
        let conf = &self.conf;

        if conf.language.chars().count() != 3 {
            return Err(Error::ConfigError(format!(
                "Language code must be 3 characters: '{}'",
                conf.language
            )));
        }

        if conf.uid_algorithm > 9 || conf.pwd_algorithm > 9 {
            return Err(Error::ConfigError(
                "Login algorithm codes must be a single digit".to_string(),
            ));
        }

        if !conf.terminator.starts_with(spec::RESPONSE_TERMINATOR as char) {
            return Err(Error::ConfigError(
                "Message terminator must begin with a carriage return".to_string(),
            ));
        }

        Ok(conf.clone())
    }
}

fn algorithm(value: i64) -> Result<u8, Error> {
    match u8::try_from(value) {
        Ok(v) if v <= 9 => Ok(v),
        _ => Err(Error::ConfigError(format!("Invalid login algorithm: {value}"))),
    }
}
