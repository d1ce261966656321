use std::error::Error;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::bridge::FrameProtocol;
use crate::connection::{Connection, ConnectionEvent};
use crate::handler::RequestSink;
use crate::protocol::FrameRequest;

/// Drives the events of one connection through a [`FrameProtocol`] into a [`RequestSink`].
///
/// Requests are delivered to the sink in frame order. A failing sink does not
/// stop the connection: the error is logged and the next event is processed.
#[derive(Debug)]
pub struct FrameDispatcher<P, S> {
    protocol: Arc<P>,
    sink: Arc<S>,
}

/// Counters collected while processing one connection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Text and binary frames received.
    pub frames: usize,
    /// Requests the sink accepted.
    pub delivered: usize,
    /// Requests the sink rejected.
    pub failed: usize,
}

impl<P, S> FrameDispatcher<P, S>
where
    P: FrameProtocol,
    S: RequestSink,
{
    pub fn new(protocol: Arc<P>, sink: Arc<S>) -> Self {
        Self { protocol, sink }
    }

    /// Processes `events` until the connection closes or the stream ends.
    pub async fn process<E>(&self, connection: &dyn Connection, mut events: E) -> DispatchSummary
    where
        E: Stream<Item = ConnectionEvent> + Unpin,
    {
        let mut summary = DispatchSummary::default();

        loop {
            let Some(event) = events.next().await else {
                info!(?summary, "no more events, stop dispatching");
                return summary;
            };
            if event.is_frame() {
                summary.frames += 1;
            }

            match event {
                ConnectionEvent::Open => {
                    self.protocol.on_open(connection);
                }

                ConnectionEvent::Text(text) => {
                    let requests = self.protocol.on_text(connection, text);
                    self.deliver(requests, &mut summary).await;
                }

                ConnectionEvent::Binary(bytes) => {
                    let requests = self.protocol.on_binary(connection, bytes);
                    self.deliver(requests, &mut summary).await;
                }

                ConnectionEvent::Error(fault) => {
                    self.protocol.on_error(connection, &fault);
                }

                ConnectionEvent::Close => {
                    self.protocol.on_close(connection);
                    info!(?summary, "connection closed");
                    return summary;
                }
            }
        }
    }

    async fn deliver(&self, requests: Vec<FrameRequest>, summary: &mut DispatchSummary) {
        if requests.is_empty() {
            debug!("frame produced no request");
        }

        for request in requests {
            match self.sink.accept(request).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    summary.failed += 1;
                    let cause: Box<dyn Error + Send + Sync> = e.into();
                    error!("request sink failed, cause {}", cause);
                }
            }
        }
    }
}
