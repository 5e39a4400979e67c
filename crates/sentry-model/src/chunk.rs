use bytes::Bytes;

/// A single delivery unit handed to subscribers: one pipe-read's worth of
/// bytes, tagged with which stream it came from.
///
/// `Bytes` rather than `Vec<u8>` so that fanning the same chunk out to N
/// subscribers is a refcount bump, not a copy.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    pub data: Bytes,
    pub is_stderr: bool,
}

impl OutputChunk {
    pub fn new(data: impl Into<Bytes>, is_stderr: bool) -> Self {
        Self {
            data: data.into(),
            is_stderr,
        }
    }
}
