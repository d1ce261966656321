use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::protocol::{HandshakeRequest, Session};

/// A persistent connection that delivers frames.
///
/// The bridge only ever borrows a connection for the duration of one call.
pub trait Connection: Send + Sync {
    /// Returns the resource bound to this connection, `None` once it has closed.
    fn resource(&self) -> Option<Arc<ConnectionResource>>;
}

/// What a connection knows about the request it was established from.
#[derive(Debug)]
pub struct ConnectionResource {
    request: HandshakeRequest,
    session: Option<Arc<Session>>,
}

impl ConnectionResource {
    pub fn new(request: HandshakeRequest) -> Self {
        Self { request, session: None }
    }

    #[must_use]
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Returns the handshake request every frame request is templated on.
    pub fn request(&self) -> &HandshakeRequest {
        &self.request
    }

    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }
}

/// A connection handle whose resource can be detached without locking.
///
/// Frames may still be in flight when the connection closes; a translator
/// racing with [`close`](FrameConnection::close) sees either the resource or
/// nothing at all.
#[derive(Debug, Default)]
pub struct FrameConnection {
    resource: ArcSwapOption<ConnectionResource>,
}

impl FrameConnection {
    pub fn new(resource: ConnectionResource) -> Self {
        Self { resource: ArcSwapOption::from_pointee(resource) }
    }

    /// Creates a connection with no resource attached yet.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Attaches `resource`, returning the one it replaces.
    pub fn attach(&self, resource: ConnectionResource) -> Option<Arc<ConnectionResource>> {
        self.resource.swap(Some(Arc::new(resource)))
    }

    /// Detaches and returns the resource. Frames translated afterwards yield nothing.
    pub fn close(&self) -> Option<Arc<ConnectionResource>> {
        self.resource.swap(None)
    }

    pub fn is_open(&self) -> bool {
        self.resource.load().is_some()
    }
}

impl Connection for FrameConnection {
    fn resource(&self) -> Option<Arc<ConnectionResource>> {
        self.resource.load_full()
    }
}
