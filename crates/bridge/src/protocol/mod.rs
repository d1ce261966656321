//! Request-side abstractions shared by the bridge and its sinks.
//!
//! # Architecture
//!
//! - **Handshake**: the request a connection was upgraded from
//!   - [`HandshakeRequest`]: wraps `http::Request<()>` with path info and live attributes
//!
//! - **Attributes**: connection scoped state
//!   - [`AttributeSource`]: the live, concurrently mutable map
//!   - [`SharedAttributes`]: lock-free copy-on-write implementation
//!   - [`Attributes`]: the private map every frame request owns
//!
//! - **Frame requests**: what the bridge produces
//!   - [`FrameRequest`] and its [`FrameRequestBuilder`]
//!   - [`body::FrameBody`]: the frame payload as an `http_body::Body`
//!
//! - **Errors**
//!   - [`ConcurrentModification`]: a write overlapped an attribute merge
//!   - [`ProtocolFault`]: a transport fault passed to `on_error`
//!   - [`RequestBuildError`]: a frame request cannot become an `http::Request`

mod attributes;
pub use attributes::AttributeSource;
pub use attributes::AttributeValue;
pub use attributes::Attributes;
pub use attributes::SharedAttributes;
pub use attributes::ATTRIBUTE_COUNT_HINT;
pub use attributes::SIMPLE_HTTP_OVER_WEBSOCKET;
pub use attributes::SUBPROTOCOL_ATTRIBUTE;
#[cfg(test)]
pub(crate) use attributes::MockAttributeSource;

mod request;
pub use request::HandshakeRequest;

mod session;
pub use session::Session;

mod frame_request;
pub use frame_request::Destroyable;
pub use frame_request::FrameRequest;
pub use frame_request::FrameRequestBuilder;
pub use frame_request::PathInfo;

mod error;
pub use error::ConcurrentModification;
pub use error::ProtocolFault;
pub use error::RequestBuildError;

pub mod body;
