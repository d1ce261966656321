/// A frame payload loaded from `resources/frames`.
#[derive(Debug, Copy, Clone)]
pub struct FrameFixture {
    name: &'static str,
    kind: FrameKind,
    content: &'static [u8],
}

impl FrameFixture {
    pub const fn text(name: &'static str, content: &'static str) -> Self {
        Self { name, kind: FrameKind::Text, content: content.as_bytes() }
    }

    pub const fn binary(name: &'static str, content: &'static [u8]) -> Self {
        Self { name, kind: FrameKind::Binary, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn content(&self) -> &'static [u8] {
        self.content
    }

    /// Returns the payload of a text fixture, `None` for binary ones.
    pub fn text_content(&self) -> Option<&'static str> {
        match self.kind {
            FrameKind::Text => std::str::from_utf8(self.content).ok(),
            FrameKind::Binary => None,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
}
