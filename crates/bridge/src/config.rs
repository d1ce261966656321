//! Bridge configuration.
//!
//! Hosts usually carry settings as flat string parameters. [`BridgeConfig`]
//! is the typed form: it is read once from an [`InitParams`] source, every key
//! validated in one place, and is immutable afterwards.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use http::Method;
use mime::Mime;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ensure;

/// Content type stamped on every frame request.
pub const CONTENT_TYPE_PARAM: &str = "org.atmosphere.websocket.messageContentType";

/// Method stamped on every frame request.
pub const METHOD_PARAM: &str = "org.atmosphere.websocket.messageMethod";

/// Marker enclosing an in-band routing path at the start of a text frame.
pub const PATH_DELIMITER_PARAM: &str = "org.atmosphere.websocket.pathDelimiter";

/// Whether frame requests may be recycled by the sink once processed.
pub const RECYCLE_REQUESTS_PARAM: &str = "org.atmosphere.cpr.recycleAtmosphereRequestResponse";

pub const DEFAULT_PATH_DELIMITER: &str = "@@";

/// A string keyed source of initialization parameters.
pub trait InitParams {
    fn init_param(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> InitParams for HashMap<String, String, S> {
    fn init_param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<S: BuildHasher> InitParams for HashMap<&str, &str, S> {
    fn init_param(&self, key: &str) -> Option<&str> {
        self.get(key).copied()
    }
}

impl InitParams for BTreeMap<String, String> {
    fn init_param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<T: InitParams + ?Sized> InitParams for &T {
    fn init_param(&self, key: &str) -> Option<&str> {
        (**self).init_param(key)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid content type {value:?}: {source}")]
    InvalidContentType {
        value: String,
        #[source]
        source: mime::FromStrError,
    },

    #[error("invalid method {value:?}: {source}")]
    InvalidMethod {
        value: String,
        #[source]
        source: http::method::InvalidMethod,
    },

    #[error("path delimiter must not be empty")]
    EmptyDelimiter,
}

/// Settings applied to every frame request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub content_type: Mime,
    pub method: Method,
    pub path_delimiter: String,
    /// Passed to each request as its destroyable flag.
    pub recycle_requests: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            content_type: mime::TEXT_PLAIN,
            method: Method::POST,
            path_delimiter: DEFAULT_PATH_DELIMITER.to_owned(),
            recycle_requests: false,
        }
    }
}

impl BridgeConfig {
    /// Reads every setting from `params`.
    ///
    /// Missing parameters take their default silently; unparsable ones take
    /// their default with a warning. This never fails.
    pub fn from_params<P: InitParams + ?Sized>(params: &P) -> Self {
        let defaults = Self::default();

        let content_type = load(params, CONTENT_TYPE_PARAM, parse_content_type).unwrap_or(defaults.content_type);
        let method = load(params, METHOD_PARAM, parse_method).unwrap_or(defaults.method);
        let path_delimiter = load(params, PATH_DELIMITER_PARAM, parse_delimiter).unwrap_or(defaults.path_delimiter);
        let recycle_requests = params.init_param(RECYCLE_REQUESTS_PARAM).is_some_and(parse_flag);

        let config = Self { content_type, method, path_delimiter, recycle_requests };
        debug!(?config, "bridge configured");
        config
    }

    #[must_use]
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the routing delimiter, keeping the current one if `delimiter` is empty.
    #[must_use]
    pub fn path_delimiter<S: Into<String>>(mut self, delimiter: S) -> Self {
        if let Ok(delimiter) = parse_delimiter(&delimiter.into()) {
            self.path_delimiter = delimiter;
        }
        self
    }

    #[must_use]
    pub fn recycle_requests(mut self, recycle: bool) -> Self {
        self.recycle_requests = recycle;
        self
    }
}

fn load<P, T, F>(params: &P, key: &str, parse: F) -> Option<T>
where
    P: InitParams + ?Sized,
    F: FnOnce(&str) -> Result<T, ConfigError>,
{
    let value = params.init_param(key)?;
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(key, cause = %e, "ignoring invalid init parameter, using default");
            None
        }
    }
}

fn parse_content_type(value: &str) -> Result<Mime, ConfigError> {
    value.trim().parse::<Mime>().map_err(|source| ConfigError::InvalidContentType { value: value.to_owned(), source })
}

fn parse_method(value: &str) -> Result<Method, ConfigError> {
    Method::from_bytes(value.trim().as_bytes())
        .map_err(|source| ConfigError::InvalidMethod { value: value.to_owned(), source })
}

fn parse_delimiter(value: &str) -> Result<String, ConfigError> {
    ensure!(!value.is_empty(), ConfigError::EmptyDelimiter);
    Ok(value.to_owned())
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
