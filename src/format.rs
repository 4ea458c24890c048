//! Binary layout of an encoded buffer.
//!
//! All integers are big-endian:
//!
//! | Offset | Size     | Field                                          |
//! |--------|----------|------------------------------------------------|
//! | 0      | 2        | symbol table length `H` in bytes               |
//! | 2      | `H`      | symbol table entries                           |
//! | 2+H    | 4        | payload length in bytes                        |
//! | 6+H    | 1        | zero bits padding the last payload byte (0-7)  |
//! | 7+H    | variable | packed codewords, most significant bit first   |
//!
//! A symbol table entry is the codeword length `L` (1 byte), the symbol
//! (1 byte) and the codeword in the low `L` bits of a 1-byte field, or a
//! 2-byte field when `L > 8`.

use tracing::debug;

use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::codeword::{BitSequence, Codeword, CodewordTable, MAX_CODEWORD_LEN};
use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node};

/// Bytes taken by the table length, payload length and padding fields.
pub const FIXED_OVERHEAD: usize = 2 + 4 + 1;

const TABLE_LEN_BITS: u32 = 16;
const PAYLOAD_LEN_BITS: u32 = 32;
const PADDING_BITS: u32 = 8;

/// Bytes one symbol table entry takes for a codeword of `len` bits.
pub fn entry_size(len: usize) -> usize {
    2 + value_width(len) as usize / 8
}

fn value_width(len: usize) -> u32 {
    if len > 8 { 16 } else { 8 }
}

/// Size of the symbol table section.
pub fn table_size(table: &CodewordTable) -> usize {
    table.iter().map(|(_, codeword)| entry_size(codeword.len())).sum()
}

/// Exact size of the buffer [`serialize`] produces.
pub fn encoded_len(table: &CodewordTable, bits: &BitSequence) -> usize {
    FIXED_OVERHEAD + table_size(table) + bits.bit_len().div_ceil(8) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderEntry {
    pub symbol: u8,
    pub codeword: Codeword,
}

/// Everything in front of the packed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub entries: Vec<HeaderEntry>,
    pub table_bytes: u16,
    pub payload_bytes: u32,
    pub padding: u8,
}

impl Header {
    /// Number of meaningful payload bits.
    pub fn payload_bits(&self) -> u64 {
        u64::from(self.payload_bytes) * 8 - u64::from(self.padding)
    }

    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        FIXED_OVERHEAD + self.table_bytes as usize
    }

    pub fn codeword_table(&self) -> Result<CodewordTable> {
        CodewordTable::from_entries(self.entries.iter().map(|e| (e.symbol, e.codeword)))
    }

    /// Rebuild the code tree by placing every entry along its own path.
    pub fn rebuild_tree(&self) -> Result<HuffmanTree> {
        let mut tree = HuffmanTree::for_reconstruction();
        for entry in &self.entries {
            tree.place(entry.symbol, entry.codeword)?;
        }
        Ok(tree)
    }
}

/// Write the symbol table followed by the packed `bits`.
pub fn serialize(table: &CodewordTable, bits: &BitSequence) -> Result<Vec<u8>> {
    let table_bytes = table_size(table);
    debug_assert!(table_bytes <= 256 * 4);
    let table_field = table_bytes as u32;

    let payload_bytes = bits.bit_len().div_ceil(8);
    let payload_field =
        u32::try_from(payload_bytes).map_err(|_| Error::InputTooLarge { bytes: payload_bytes })?;
    let padding = (payload_bytes * 8 - bits.bit_len()) as u32;

    let mut writer = BitWriter::with_capacity(encoded_len(table, bits));

    writer.write_fixed_width(table_field, TABLE_LEN_BITS)?;
    for (symbol, codeword) in table.iter() {
        writer.write_fixed_width(codeword.len() as u32, 8)?;
        writer.write_fixed_width(u32::from(symbol), 8)?;
        writer.write_fixed_width(u32::from(codeword.value()), value_width(codeword.len()))?;
    }
    writer.write_fixed_width(payload_field, PAYLOAD_LEN_BITS)?;
    writer.write_fixed_width(padding, PADDING_BITS)?;

    for &codeword in bits.codewords() {
        writer.write_codeword(codeword)?;
    }

    let (buffer, pad) = writer.finish()?;
    if u32::from(pad) != padding {
        return Err(Error::Internal(format!(
            "writer padded {pad} bits, header declares {padding}"
        )));
    }
    Ok(buffer)
}

/// Parse only the header of `buffer`.
pub fn inspect(buffer: &[u8]) -> Result<Header> {
    read_header(&mut BitReader::new(buffer))
}

fn read_header(reader: &mut BitReader<'_>) -> Result<Header> {
    let table_bytes = read_field(reader, TABLE_LEN_BITS, "symbol table length")? as u16;

    let mut entries = Vec::new();
    let mut seen = [false; 256];
    let mut consumed = 0usize;
    while consumed < table_bytes as usize {
        let len = read_field(reader, 8, "codeword length")? as usize;
        if len == 0 || len > MAX_CODEWORD_LEN {
            return Err(Error::malformed(format!(
                "codeword length {len} outside 1..={MAX_CODEWORD_LEN}"
            )));
        }
        let size = entry_size(len);
        if consumed + size > table_bytes as usize {
            return Err(Error::malformed(format!(
                "entry at table offset {consumed} overruns the {table_bytes}-byte symbol table"
            )));
        }

        let symbol = read_field(reader, 8, "symbol")? as u8;
        let value = read_field(reader, value_width(len), "codeword")? as u16;
        let codeword = Codeword::new(value, len)?;

        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(Error::malformed(format!(
                "symbol 0x{symbol:02x} listed twice"
            )));
        }
        entries.push(HeaderEntry { symbol, codeword });
        consumed += size;
    }

    let payload_bytes = read_field(reader, PAYLOAD_LEN_BITS, "payload length")?;
    let padding = read_field(reader, PADDING_BITS, "padding")? as u8;

    if padding > 7 {
        return Err(Error::malformed(format!("padding of {padding} bits")));
    }
    if payload_bytes == 0 && padding != 0 {
        return Err(Error::malformed("padding declared for an empty payload"));
    }
    if entries.is_empty() && payload_bytes != 0 {
        return Err(Error::malformed("payload present without a symbol table"));
    }

    Ok(Header {
        entries,
        table_bytes,
        payload_bytes,
        padding,
    })
}

fn read_field(reader: &mut BitReader<'_>, width: u32, field: &str) -> Result<u32> {
    reader.read_fixed_width(width).map_err(|err| match err {
        Error::UnexpectedEndOfStream { .. } => {
            Error::malformed(format!("truncated header while reading {field}"))
        }
        other => other,
    })
}

/// Decode a buffer produced by [`serialize`].
pub fn deserialize(buffer: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(buffer);
    let header = read_header(&mut reader)?;
    let tree = header.rebuild_tree()?;

    let payload_len_bits = u64::from(header.payload_bytes) * 8;
    let available = reader.remaining_bits();
    if payload_len_bits > available {
        return Err(Error::UnexpectedEndOfStream {
            needed_bits: payload_len_bits,
            available_bits: available,
        });
    }
    if available > payload_len_bits {
        debug!(
            trailing_bytes = (available - payload_len_bits) / 8,
            "ignoring bytes after the payload"
        );
    }

    let declared = header.payload_bits();
    let mut consumed = 0u64;
    let mut output = Vec::new();

    while consumed < declared && reader.peek_bit()?.is_some() {
        let mut node = tree.root();
        let symbol = loop {
            if let Node::Leaf { symbol, .. } = node {
                break *symbol;
            }
            if consumed >= declared {
                return Err(Error::UnexpectedEndOfStream {
                    needed_bits: consumed + 1,
                    available_bits: declared,
                });
            }
            let bit = reader.read_bit()?.ok_or(Error::UnexpectedEndOfStream {
                needed_bits: consumed + 1,
                available_bits: consumed,
            })?;
            node = node
                .child(bit)
                .ok_or(Error::InvalidCodeword { bit_offset: consumed })?;
            consumed += 1;
        };
        output.push(symbol);
    }

    debug!(
        symbols = output.len(),
        bits = consumed,
        "decoded payload"
    );
    Ok(output)
}
