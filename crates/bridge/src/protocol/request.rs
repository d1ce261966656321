//! The handshake request a connection was upgraded from.
//!
//! Every frame on a connection is turned into a request templated on this
//! one: it supplies the headers, the request URI, the path info and the live
//! attribute map that frame requests inherit.

use std::fmt;
use std::sync::Arc;

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

use crate::protocol::{AttributeSource, SharedAttributes};

/// Wraps the `http::Request<()>` captured when the connection was established.
///
/// In addition to the standard head it carries:
/// - the path info, i.e. the part of the path below the endpoint mount point
/// - the live attribute map, shared with whoever else holds the connection
pub struct HandshakeRequest {
    inner: Request<()>,
    path_info: String,
    attributes: Arc<dyn AttributeSource>,
}

impl AsRef<Request<()>> for HandshakeRequest {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl HandshakeRequest {
    /// Creates a handshake request with no path info and an empty attribute map.
    pub fn new(inner: Request<()>) -> Self {
        Self { inner, path_info: String::new(), attributes: Arc::new(SharedAttributes::new()) }
    }

    #[must_use]
    pub fn with_path_info<S: Into<String>>(mut self, path_info: S) -> Self {
        self.path_info = path_info.into();
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Arc<dyn AttributeSource>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the path component of the URI, without the query string.
    pub fn request_uri(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.uri().query()
    }

    /// Returns the path info, empty when the endpoint is mounted at the full path.
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Returns the live attribute map.
    pub fn attributes(&self) -> &dyn AttributeSource {
        self.attributes.as_ref()
    }

    /// Returns the number of live attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}

impl fmt::Debug for HandshakeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeRequest")
            .field("inner", &self.inner)
            .field("path_info", &self.path_info)
            .field("attribute_count", &self.attribute_count())
            .finish()
    }
}

impl From<Request<()>> for HandshakeRequest {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self::new(inner)
    }
}

impl From<Parts> for HandshakeRequest {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self::new(Request::from_parts(parts, ()))
    }
}
