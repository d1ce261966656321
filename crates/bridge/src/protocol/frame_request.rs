//! Requests synthesized from frames.
//!
//! A [`FrameRequest`] is built fresh for every frame, so requests produced from
//! frames that arrive concurrently on one connection never share mutable
//! state. It can be handed to a sink as-is or converted into a plain
//! `http::Request<FrameBody>` with [`FrameRequest::into_http`].

use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, Request, Uri, Version};
use mime::Mime;

use crate::protocol::body::FrameBody;
use crate::protocol::{Attributes, HandshakeRequest, RequestBuildError, Session};

/// Request extension carrying the path info of a converted frame request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo(pub String);

/// Request extension carrying the destroyable hint of a converted frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destroyable(pub bool);

/// A request synthesized from one text or binary frame.
#[derive(Debug, Clone)]
pub struct FrameRequest {
    method: Method,
    content_type: Mime,
    version: Version,
    request_uri: String,
    query: Option<String>,
    path_info: String,
    headers: HeaderMap,
    attributes: Attributes,
    session: Option<Arc<Session>>,
    destroyable: bool,
    body: FrameBody,
}

impl FrameRequest {
    pub fn builder() -> FrameRequestBuilder {
        FrameRequestBuilder::new()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    /// Whether the sink may recycle this request once it has been processed.
    pub fn is_destroyable(&self) -> bool {
        self.destroyable
    }

    pub fn body(&self) -> &FrameBody {
        &self.body
    }

    pub fn into_body(self) -> FrameBody {
        self.body
    }

    /// Converts into an `http::Request`.
    ///
    /// The configured content type replaces any `Content-Type` inherited from
    /// the handshake. Attributes, [`PathInfo`], [`Destroyable`] and the session
    /// are moved into the request extensions.
    ///
    /// # Errors
    ///
    /// Fails when the request URI (with the routed path appended) is not a
    /// valid URI, or when the content type is not a valid header value.
    pub fn into_http(self) -> Result<Request<FrameBody>, RequestBuildError> {
        let uri_string = match &self.query {
            Some(query) if self.request_uri.contains('?') => format!("{}&{}", self.request_uri, query),
            Some(query) => format!("{}?{}", self.request_uri, query),
            None => self.request_uri.clone(),
        };
        let uri = uri_string.parse::<Uri>().map_err(|e| RequestBuildError::invalid_uri(&uri_string, e))?;
        let content_type = HeaderValue::from_str(self.content_type.as_ref())?;

        let mut request = Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers;
        request.headers_mut().insert(CONTENT_TYPE, content_type);

        let extensions = request.extensions_mut();
        extensions.insert(self.attributes);
        extensions.insert(PathInfo(self.path_info));
        extensions.insert(Destroyable(self.destroyable));
        if let Some(session) = self.session {
            extensions.insert(session);
        }

        Ok(request)
    }
}

/// Builds a [`FrameRequest`], usually seeded from a [`HandshakeRequest`].
#[derive(Debug)]
pub struct FrameRequestBuilder {
    inner: FrameRequest,
}

impl FrameRequestBuilder {
    pub fn new() -> Self {
        Self {
            inner: FrameRequest {
                method: Method::POST,
                content_type: mime::TEXT_PLAIN,
                version: Version::HTTP_11,
                request_uri: String::from("/"),
                query: None,
                path_info: String::new(),
                headers: HeaderMap::new(),
                attributes: Attributes::new(),
                session: None,
                destroyable: false,
                body: FrameBody::text(""),
            },
        }
    }

    /// Uses `base` as the template: version, query, request URI, path info and
    /// headers are copied from it. Later calls override what was copied.
    #[must_use]
    pub fn request(mut self, base: &HandshakeRequest) -> Self {
        self.inner.version = base.version();
        self.inner.query = base.query().map(str::to_owned);
        self.inner.request_uri = base.request_uri().to_owned();
        self.inner.path_info = base.path_info().to_owned();
        self.inner.headers = base.headers().clone();
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.inner.method = method;
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.inner.content_type = content_type;
        self
    }

    #[must_use]
    pub fn body(mut self, body: FrameBody) -> Self {
        self.inner.body = body;
        self
    }

    #[must_use]
    pub fn text_body<S: Into<String>>(self, text: S) -> Self {
        self.body(FrameBody::text(text))
    }

    #[must_use]
    pub fn binary_body<B: Into<Bytes>>(self, bytes: B) -> Self {
        self.body(FrameBody::binary(bytes))
    }

    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.inner.attributes = attributes;
        self
    }

    #[must_use]
    pub fn path_info<S: Into<String>>(mut self, path_info: S) -> Self {
        self.inner.path_info = path_info.into();
        self
    }

    #[must_use]
    pub fn request_uri<S: Into<String>>(mut self, request_uri: S) -> Self {
        self.inner.request_uri = request_uri.into();
        self
    }

    #[must_use]
    pub fn query(mut self, query: Option<String>) -> Self {
        self.inner.query = query;
        self
    }

    #[must_use]
    pub fn destroyable(mut self, destroyable: bool) -> Self {
        self.inner.destroyable = destroyable;
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.inner.headers = headers;
        self
    }

    #[must_use]
    pub fn session(mut self, session: Option<Arc<Session>>) -> Self {
        self.inner.session = session;
        self
    }

    pub fn build(self) -> FrameRequest {
        self.inner
    }
}

impl Default for FrameRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
