//! Sinks that receive synthesized frame requests.
//!
//! The bridge stops at translation: whatever processes a [`FrameRequest`]
//! implements [`RequestSink`]. Async functions and closures can be adapted
//! with [`make_sink`].

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;

use crate::protocol::FrameRequest;

#[async_trait]
pub trait RequestSink: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn accept(&self, request: FrameRequest) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub struct SinkFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> RequestSink for SinkFn<F>
where
    F: Fn(FrameRequest) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<(), Err>> + Send,
{
    type Error = Err;

    async fn accept(&self, request: FrameRequest) -> Result<(), Self::Error> {
        (self.f)(request).await
    }
}

pub fn make_sink<F, Err, Fut>(f: F) -> SinkFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<(), Err>>,
    F: Fn(FrameRequest) -> Fut,
{
    SinkFn { f }
}
