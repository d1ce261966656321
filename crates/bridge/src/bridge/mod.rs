//! Frame to request translation.
//!
//! [`FrameProtocol`] is the seam between a connection and a request pipeline:
//! the connection reports lifecycle events and frames, the protocol answers
//! each frame with the requests it stands for. [`FrameBridge`] is the
//! implementation that maps one frame to one request, with optional in-band
//! routing for text frames.

mod frame_bridge;
mod propagate;
mod routing;

pub use frame_bridge::FrameBridge;

use bytes::Bytes;

use crate::connection::Connection;
use crate::protocol::{FrameRequest, ProtocolFault};

/// Translates connection events into requests.
///
/// All methods take `&self` and may be called concurrently, including for
/// frames of the same connection.
pub trait FrameProtocol: Send + Sync {
    /// Translates a text frame. Returns nothing if the connection already closed.
    fn on_text(&self, connection: &dyn Connection, payload: String) -> Vec<FrameRequest>;

    /// Translates a binary frame. Returns nothing if the connection already closed.
    fn on_binary(&self, connection: &dyn Connection, payload: Bytes) -> Vec<FrameRequest>;

    fn on_open(&self, _connection: &dyn Connection) {}

    fn on_close(&self, _connection: &dyn Connection) {}

    /// Called with faults raised by the transport. Recovery is left to the caller.
    fn on_error(&self, connection: &dyn Connection, fault: &ProtocolFault);
}
