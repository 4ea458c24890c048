//! # huffpack
//!
//! Byte-oriented Huffman coding with a self-describing binary format.
//!
//! ```rust
//! let encoded = huffpack::encode(b"abracadabra")?;
//! assert_eq!(huffpack::decode(&encoded)?, b"abracadabra");
//! # Ok::<(), huffpack::Error>(())
//! ```
//!
//! The encoded buffer carries the codeword of every symbol, so decoding
//! rebuilds the code tree without the original frequencies. See
//! [`format`] for the layout.

pub mod bit_reader;
pub mod bit_writer;
pub mod codeword;
pub mod compress;
pub mod error;
pub mod format;
pub mod frequency;
pub mod tree;

pub use codeword::{BitSequence, Codeword, CodewordTable};
pub use compress::{Report, decode, encode, report};
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use tree::{HuffmanTree, Node};

/// Encode the bytes of a string.
pub fn encode_str(text: &str) -> Result<Vec<u8>> {
    encode(text.as_bytes())
}

/// Decode a buffer whose contents are expected to be UTF-8 text.
pub fn decode_to_string(buffer: &[u8]) -> Result<String> {
    Ok(String::from_utf8(decode(buffer)?)?)
}
