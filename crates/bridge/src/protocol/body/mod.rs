//! Frame payload bodies.
//!
//! A frame arrives complete, so unlike a streamed HTTP body there is nothing
//! to drain or back-pressure: [`FrameBody`] holds the whole payload and yields
//! it as a single data frame through the standard `http_body::Body` interface.
//! That lets any `http`-based pipeline read a frame request the same way it
//! reads a request that came in over HTTP.

mod frame_body;

pub use frame_body::FrameBody;
