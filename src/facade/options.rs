//! Operation options
//!
//! Transient request shapes scoped to a single facade call.

/// Window selection for reads and chunked reads.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Chunk window size; whole file when absent or zero.
    pub size: Option<u64>,
    /// Starting byte offset.
    pub start: Option<u64>,
    /// Exclusive end offset, clamped to the file length.
    pub end: Option<u64>,
}

/// Mode selection for `open_file` (default: read).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRequest {
    pub for_write: bool,
    pub for_remove: bool,
    /// Exclusive creation: fail rather than resolve an existing target.
    pub exclusive: bool,
}

impl OpenRequest {
    pub fn read() -> Self {
        OpenRequest::default()
    }

    pub fn write(exclusive: bool) -> Self {
        OpenRequest {
            for_write: true,
            exclusive,
            ..OpenRequest::default()
        }
    }

    pub fn remove() -> Self {
        OpenRequest {
            for_remove: true,
            ..OpenRequest::default()
        }
    }
}

/// Write payload, normalized to bytes before it reaches the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePayload {
    Text(String),
    Bytes(Vec<u8>),
}

impl WritePayload {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            WritePayload::Text(text) => text.into_bytes(),
            WritePayload::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WritePayload::Text(text) => text.len(),
            WritePayload::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for WritePayload {
    fn from(text: &str) -> Self {
        WritePayload::Text(text.to_string())
    }
}

impl From<String> for WritePayload {
    fn from(text: String) -> Self {
        WritePayload::Text(text)
    }
}

impl From<Vec<u8>> for WritePayload {
    fn from(bytes: Vec<u8>) -> Self {
        WritePayload::Bytes(bytes)
    }
}

/// Full write request: payload plus mode flags.
///
/// A bare string converts into a non-exclusive truncating write, matching
/// the facade's raw-content calling convention.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub content: WritePayload,
    /// Advisory allocation hint; the sandbox provider sizes writes from
    /// its quota ledger instead.
    pub size: Option<u64>,
    /// Seek to end-of-file before writing.
    pub for_append: bool,
    /// Fail with a collision error if the target already exists;
    /// non-exclusive writes silently overwrite.
    pub exclusive: bool,
}

impl WriteRequest {
    pub fn new(content: impl Into<WritePayload>) -> Self {
        WriteRequest {
            content: content.into(),
            size: None,
            for_append: false,
            exclusive: false,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn appending(mut self) -> Self {
        self.for_append = true;
        self
    }
}

impl From<&str> for WriteRequest {
    fn from(content: &str) -> Self {
        WriteRequest::new(content)
    }
}

impl From<String> for WriteRequest {
    fn from(content: String) -> Self {
        WriteRequest::new(content)
    }
}

impl From<Vec<u8>> for WriteRequest {
    fn from(content: Vec<u8>) -> Self {
        WriteRequest::new(content)
    }
}

impl From<WritePayload> for WriteRequest {
    fn from(content: WritePayload) -> Self {
        WriteRequest::new(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_normalizes_to_bytes() {
        assert_eq!(WritePayload::from("hi").into_bytes(), b"hi".to_vec());
        assert_eq!(
            WritePayload::from(vec![0u8, 255]).into_bytes(),
            vec![0u8, 255]
        );
    }

    #[test]
    fn test_raw_string_becomes_plain_overwrite() {
        let request: WriteRequest = "hello".into();
        assert!(!request.exclusive);
        assert!(!request.for_append);
        assert_eq!(request.content, WritePayload::Text("hello".into()));
    }

    #[test]
    fn test_builder_flags() {
        let request = WriteRequest::new("x").exclusive().appending();
        assert!(request.exclusive);
        assert!(request.for_append);
    }
}
