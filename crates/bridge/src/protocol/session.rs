use crate::protocol::SharedAttributes;

/// The logical session a connection belongs to.
///
/// Frame requests hold it through an `Arc`, so it outlives the connection for
/// as long as a request still refers to it.
#[derive(Debug)]
pub struct Session {
    id: String,
    attributes: SharedAttributes,
}

impl Session {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), attributes: SharedAttributes::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &SharedAttributes {
        &self.attributes
    }
}
