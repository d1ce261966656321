use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};

/// The payload of a single frame, exposed as a one-shot `http_body::Body`.
///
/// Text payloads keep their UTF-8 guarantee so they can be read back with
/// [`as_text`](FrameBody::as_text); binary payloads are handed through as the
/// exact byte range received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBody {
    kind: Kind,
    data: Option<Bytes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Binary,
}

impl FrameBody {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::new(Kind::Text, Bytes::from(text.into()))
    }

    pub fn binary<B: Into<Bytes>>(bytes: B) -> Self {
        Self::new(Kind::Binary, bytes.into())
    }

    fn new(kind: Kind, bytes: Bytes) -> Self {
        let data = if bytes.is_empty() { None } else { Some(bytes) };
        Self { kind, data }
    }

    pub fn is_text(&self) -> bool {
        self.kind == Kind::Text
    }

    pub fn is_binary(&self) -> bool {
        self.kind == Kind::Binary
    }

    /// Returns the remaining payload, empty once it has been polled.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Returns the remaining payload as text, `None` for binary frames.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            Kind::Text => std::str::from_utf8(self.as_bytes()).ok(),
            Kind::Binary => None,
        }
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Consumes the body and returns the remaining payload.
    pub fn into_bytes(self) -> Bytes {
        self.data.unwrap_or_default()
    }
}

impl Body for FrameBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().data.take().map(|bytes| Ok(Frame::data(bytes))))
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.len() as u64)
    }
}
