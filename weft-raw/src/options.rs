use crate::StringEncoding;

/// Marker written by every `end`, and looked for by `is_end`.
pub const END_MARK: u64 = 0x1337_fabc_affe_420b;

/// Options shared by [`RawSink`](crate::RawSink) and [`RawSource`](crate::RawSource).
/// Both sides must agree on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawOptions {
    /// Layout of string values.
    pub string_encoding: StringEncoding,
}

impl RawOptions {
    /// Default options: strings in modified UTF-8.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the string layout.
    pub fn string_encoding(mut self, encoding: StringEncoding) -> Self {
        self.string_encoding = encoding;
        self
    }
}
