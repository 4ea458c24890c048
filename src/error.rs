//! Error types for encoding and decoding.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Codec error types.
#[derive(Debug, Error)]
pub enum Error {
    /// A Huffman tree was requested for an empty frequency table.
    #[error("cannot build a Huffman tree from empty input")]
    EmptyInput,

    /// A derived codeword does not fit the 16-bit header field.
    #[error("codeword for symbol 0x{symbol:02x} is {length} bits long, at most 16 are supported")]
    CodewordTooLong { symbol: u8, length: usize },

    /// A write or read went past the bounds of its buffer.
    #[error("buffer overrun: {context}")]
    BufferOverrun { context: String },

    /// The symbol table or payload trailer of an encoded buffer is invalid.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The payload holds fewer bits than the header declares.
    #[error("unexpected end of stream: needed {needed_bits} bits, {available_bits} available")]
    UnexpectedEndOfStream {
        needed_bits: u64,
        available_bits: u64,
    },

    /// The payload follows a branch that no header entry defines.
    #[error("invalid codeword at payload bit {bit_offset}")]
    InvalidCodeword { bit_offset: u64 },

    /// The packed payload would not fit the 32-bit length field.
    #[error("input too large: payload of {bytes} bytes exceeds the 32-bit length field")]
    InputTooLarge { bytes: u64 },

    /// Internal consistency violation in the code tables.
    #[error("internal error: {0}")]
    Internal(String),

    /// Decoded bytes are not valid UTF-8.
    #[error("decoded data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// I/O error from the underlying bit cursor.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed header error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedHeader(message.into())
    }

    /// Create a buffer overrun error.
    pub fn overrun(context: impl Into<String>) -> Self {
        Error::BufferOverrun {
            context: context.into(),
        }
    }

    /// Returns true if the error came from a corrupt or truncated buffer.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            Error::MalformedHeader(_)
                | Error::UnexpectedEndOfStream { .. }
                | Error::InvalidCodeword { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::CodewordTooLong {
            symbol: 0x41,
            length: 19,
        };
        assert_eq!(
            err.to_string(),
            "codeword for symbol 0x41 is 19 bits long, at most 16 are supported"
        );

        let err = Error::UnexpectedEndOfStream {
            needed_bits: 16,
            available_bits: 8,
        };
        assert!(err.to_string().contains("needed 16 bits"));
    }

    #[test]
    fn corrupt_input_classification() {
        assert!(Error::malformed("x").is_corrupt_input());
        assert!(Error::InvalidCodeword { bit_offset: 3 }.is_corrupt_input());
        assert!(!Error::overrun("x").is_corrupt_input());
        assert!(!Error::EmptyInput.is_corrupt_input());
    }
}
