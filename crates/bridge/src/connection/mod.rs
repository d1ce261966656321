//! Connection side of the bridge.
//!
//! # Components
//!
//! - [`Connection`]: what the bridge needs from a transport, namely the
//!   resource bound to it while it is open
//! - [`ConnectionResource`]: the handshake request and session of a connection
//! - [`FrameConnection`]: a connection handle that detaches its resource on close
//!   without locking
//! - [`ConnectionEvent`]: open, text, binary, error and close events
//! - [`FrameDispatcher`]: feeds a stream of events through a protocol into a sink

mod dispatcher;
mod event;
mod frame_connection;

pub use dispatcher::DispatchSummary;
pub use dispatcher::FrameDispatcher;
pub use event::ConnectionEvent;
pub use frame_connection::Connection;
pub use frame_connection::ConnectionResource;
pub use frame_connection::FrameConnection;
