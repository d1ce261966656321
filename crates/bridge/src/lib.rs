//! Turns WebSocket frames into HTTP shaped requests.
//!
//! A WebSocket connection delivers an open ended sequence of frames, while a
//! request pipeline expects one request per call. This crate sits between the
//! two: every text or binary frame becomes a [`protocol::FrameRequest`]
//! templated on the handshake request the connection was upgraded from.
//!
//! # Features
//!
//! - One independent request per frame, safe for frames that arrive concurrently
//!   on the same connection
//! - In-band routing: a text frame `@@/path@@body` is delivered to `/path`
//! - Connection attributes propagated into every request without locking
//! - Binary frames passed through byte for byte
//! - Conversion into `http::Request<FrameBody>` for `http` based pipelines
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use futures::stream;
//! use http::Request;
//! use micro_ws_bridge::bridge::FrameBridge;
//! use micro_ws_bridge::connection::{ConnectionEvent, ConnectionResource, FrameConnection, FrameDispatcher};
//! use micro_ws_bridge::handler::make_sink;
//! use micro_ws_bridge::protocol::{FrameRequest, HandshakeRequest};
//! use tracing::info;
//!
//! #[tokio::main]
//! async fn main() {
//!     let params = HashMap::from([("org.atmosphere.websocket.messageMethod", "PUT")]);
//!     let bridge = Arc::new(FrameBridge::from_params(&params));
//!
//!     let sink = Arc::new(make_sink(|request: FrameRequest| async move {
//!         info!(path_info = request.path_info(), "received frame request");
//!         Ok::<_, std::io::Error>(())
//!     }));
//!
//!     let handshake = HandshakeRequest::from(Request::builder().uri("/chat").body(()).unwrap());
//!     let connection = FrameConnection::new(ConnectionResource::new(handshake));
//!
//!     let events = stream::iter(vec![
//!         ConnectionEvent::Open,
//!         ConnectionEvent::from("@@/room/1@@hello"),
//!         ConnectionEvent::Close,
//!     ]);
//!
//!     let dispatcher = FrameDispatcher::new(bridge, sink);
//!     let summary = dispatcher.process(&connection, events).await;
//!     info!(?summary, "done");
//! }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: typed bridge settings read from string parameters
//! - [`protocol`]: handshake request, attributes, frame requests and bodies
//! - [`bridge`]: the [`bridge::FrameProtocol`] seam and [`bridge::FrameBridge`]
//! - [`connection`]: connection abstraction, events and the dispatcher
//! - [`handler`]: sinks that consume frame requests
//!
//! # Concurrency
//!
//! Translation is synchronous and keeps no state between frames. The only
//! shared mutable state is the handshake attribute map; it is read through
//! [`protocol::AttributeSource`], which detects overlapping writes so the bridge
//! can fall back to a private snapshot instead of taking a lock.

pub mod bridge;
pub mod config;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
