// compress.rs

use std::io::Write;

use flate2::{Compression, write::DeflateEncoder};
use serde::Serialize;
use tracing::{debug, info};

use crate::codeword::{BitSequence, CodewordTable};
use crate::error::Result;
use crate::format;
use crate::frequency::FrequencyTable;
use crate::tree::HuffmanTree;

/// Encode `data` into a self-describing buffer.
///
/// Empty input yields the 7-byte buffer with an empty symbol table and a
/// zero-length payload.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let (table, bits) = plan(data)?;
    let buffer = format::serialize(&table, &bits)?;
    info!(
        input_bytes = data.len(),
        output_bytes = buffer.len(),
        symbols = table.len(),
        "encoded"
    );
    Ok(buffer)
}

/// Decode a buffer produced by [`encode`].
pub fn decode(buffer: &[u8]) -> Result<Vec<u8>> {
    let data = format::deserialize(buffer)?;
    info!(
        input_bytes = buffer.len(),
        output_bytes = data.len(),
        "decoded"
    );
    Ok(data)
}

/// Frequency count, tree, codeword table and the concatenated codewords.
fn plan(data: &[u8]) -> Result<(CodewordTable, BitSequence)> {
    let frequencies = FrequencyTable::from_symbols(data);
    if frequencies.is_empty() {
        debug!("empty input, writing empty symbol table");
        return Ok((CodewordTable::default(), BitSequence::default()));
    }

    let tree = HuffmanTree::build(&frequencies)?;
    let table = CodewordTable::from_tree(&tree)?;
    debug!(
        distinct = frequencies.len(),
        depth = tree.depth(),
        "built code tree"
    );
    let bits = table.encode_symbols(data)?;
    Ok((table, bits))
}

/// Size breakdown of encoding one input, with a deflate baseline.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub original_bytes: usize,
    pub encoded_bytes: usize,
    pub table_bytes: usize,
    pub payload_bits: u64,
    pub distinct_symbols: usize,
    pub longest_codeword: usize,
    pub ratio: f64,
    pub deflate_bytes: usize,
    pub verified: bool,
}

/// Encode `data` in memory, decode it again and describe the result.
pub fn report(data: &[u8]) -> Result<Report> {
    let (table, bits) = plan(data)?;
    let buffer = format::serialize(&table, &bits)?;
    let verified = format::deserialize(&buffer)? == data;

    let ratio = if data.is_empty() {
        0.0
    } else {
        buffer.len() as f64 / data.len() as f64
    };

    Ok(Report {
        original_bytes: data.len(),
        encoded_bytes: buffer.len(),
        table_bytes: format::table_size(&table),
        payload_bits: bits.bit_len(),
        distinct_symbols: table.len(),
        longest_codeword: table.iter().map(|(_, c)| c.len()).max().unwrap_or(0),
        ratio,
        deflate_bytes: deflate_len(data)?,
        verified,
    })
}

fn deflate_len(data: &[u8]) -> Result<usize> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_seven_bytes() {
        let buffer = encode(b"").unwrap();
        assert_eq!(buffer.len(), format::FIXED_OVERHEAD);
        assert_eq!(format::inspect(&buffer).unwrap().payload_bytes, 0);
        assert!(decode(&buffer).unwrap().is_empty());
    }

    #[test]
    fn roundtrip_samples() {
        for sample in [
            &b"aaaa"[..],
            b"abracadabra",
            b"Hello world!",
            b"\x00\xff\x00\xff\x7f",
        ] {
            assert_eq!(decode(&encode(sample).unwrap()).unwrap(), sample);
        }
    }

    #[test]
    fn report_adds_up() {
        let data = b"abracadabra";
        let report = report(data).unwrap();
        assert!(report.verified);
        assert_eq!(report.original_bytes, 11);
        assert_eq!(report.distinct_symbols, 5);
        assert_eq!(report.payload_bits, 23);
        assert_eq!(report.longest_codeword, 4);
        assert_eq!(
            report.encoded_bytes,
            format::FIXED_OVERHEAD + report.table_bytes + 3
        );
        assert!(report.deflate_bytes > 0);
    }

    #[test]
    fn report_serializes_to_json() {
        let json = serde_json::to_value(report(b"aaaa").unwrap()).unwrap();
        assert_eq!(json["distinct_symbols"], 1);
        assert_eq!(json["verified"], true);
    }
}
