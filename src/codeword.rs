//! Codeword derivation from a Huffman tree.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node};

/// Longest codeword the header format can carry.
pub const MAX_CODEWORD_LEN: usize = 16;

/// A root-to-leaf path of 1..=16 bits, stored in the low bits of `value`.
/// Bit `len - 1` is the decision taken at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codeword {
    value: u16,
    len: u8,
}

impl Codeword {
    pub fn new(value: u16, len: usize) -> Result<Self> {
        if len == 0 || len > MAX_CODEWORD_LEN {
            return Err(Error::malformed(format!(
                "codeword length {len} outside 1..={MAX_CODEWORD_LEN}"
            )));
        }
        if len < 16 && value >> len != 0 {
            return Err(Error::malformed(format!(
                "codeword value {value:#x} does not fit in {len} bits"
            )));
        }
        Ok(Codeword {
            value,
            len: len as u8,
        })
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Bit at position `i`, counted from the least significant end.
    pub fn bit(&self, i: usize) -> bool {
        (self.value >> i) & 1 == 1
    }

    /// Bits in transmission order, root decision first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).rev().map(move |i| self.bit(i))
    }

    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        self.len <= other.len && other.value >> (other.len - self.len) == self.value
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to codeword mapping, iterated in ascending symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodewordTable {
    codes: BTreeMap<u8, Codeword>,
}

impl CodewordTable {
    /// Assign every leaf its path in one top-down pass (left = 0, right = 1).
    /// A tree that is a single leaf gets the one-bit codeword `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = CodewordTable::default();
        match tree.root() {
            Node::Leaf { symbol, .. } => {
                table.insert(*symbol, Codeword::new(0, 1)?)?;
            }
            root => table.assign(root, 0, 0)?,
        }
        Ok(table)
    }

    fn assign(&mut self, node: &Node, code: u32, depth: usize) -> Result<()> {
        match node {
            Node::Leaf { symbol, .. } => {
                if depth > MAX_CODEWORD_LEN {
                    return Err(Error::CodewordTooLong {
                        symbol: *symbol,
                        length: depth,
                    });
                }
                self.insert(*symbol, Codeword::new(code as u16, depth)?)
            }
            Node::Internal { children, .. } => {
                for (bit, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        self.assign(child, (code << 1) | bit as u32, depth + 1)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Build a table from explicit entries, as read from a header.
    pub fn from_entries(entries: impl IntoIterator<Item = (u8, Codeword)>) -> Result<Self> {
        let mut table = CodewordTable::default();
        for (symbol, codeword) in entries {
            table.insert(symbol, codeword)?;
        }
        Ok(table)
    }

    fn insert(&mut self, symbol: u8, codeword: Codeword) -> Result<()> {
        if self.codes.insert(symbol, codeword).is_some() {
            return Err(Error::Internal(format!(
                "symbol 0x{symbol:02x} reached by more than one path"
            )));
        }
        Ok(())
    }

    pub fn get(&self, symbol: u8) -> Option<Codeword> {
        self.codes.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Codeword)> + '_ {
        self.codes.iter().map(|(&symbol, &codeword)| (symbol, codeword))
    }

    /// Concatenate the codeword of each input symbol in order.
    pub fn encode_symbols(&self, data: &[u8]) -> Result<BitSequence> {
        let mut lookup = [None; 256];
        for (symbol, codeword) in self.iter() {
            lookup[symbol as usize] = Some(codeword);
        }

        let mut sequence = BitSequence::with_capacity(data.len());
        for &byte in data {
            let codeword = lookup[byte as usize].ok_or_else(|| {
                Error::Internal(format!("symbol 0x{byte:02x} missing from codeword table"))
            })?;
            sequence.push(codeword);
        }
        Ok(sequence)
    }
}

/// Ordered concatenation of codewords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSequence {
    codewords: Vec<Codeword>,
    bit_len: u64,
}

impl BitSequence {
    pub fn with_capacity(symbols: usize) -> Self {
        BitSequence {
            codewords: Vec::with_capacity(symbols),
            bit_len: 0,
        }
    }

    pub fn push(&mut self, codeword: Codeword) {
        self.bit_len += codeword.len() as u64;
        self.codewords.push(codeword);
    }

    /// Total number of bits.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    pub fn codewords(&self) -> &[Codeword] {
        &self.codewords
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.codewords.iter().flat_map(|codeword| codeword.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;

    fn table_for(data: &[u8]) -> CodewordTable {
        let tree = HuffmanTree::build(&FrequencyTable::from_symbols(data)).unwrap();
        CodewordTable::from_tree(&tree).unwrap()
    }

    #[test]
    fn codeword_validation() {
        assert!(Codeword::new(0, 0).is_err());
        assert!(Codeword::new(0, 17).is_err());
        assert!(Codeword::new(0b100, 2).is_err());
        assert!(Codeword::new(0xffff, 16).is_ok());
        assert_eq!(Codeword::new(0b0110, 4).unwrap().to_string(), "0110");
    }

    #[test]
    fn prefix_check() {
        let a = Codeword::new(0b1, 1).unwrap();
        let b = Codeword::new(0b10, 2).unwrap();
        let c = Codeword::new(0b01, 2).unwrap();
        assert!(a.is_prefix_of(&b));
        assert!(!a.is_prefix_of(&c));
        assert!(!b.is_prefix_of(&a));
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let table = table_for(b"aaaa");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b'a'), Some(Codeword::new(0, 1).unwrap()));
    }

    #[test]
    fn abracadabra_codes() {
        let table = table_for(b"abracadabra");
        let code = |s: u8| table.get(s).unwrap().to_string();
        assert_eq!(code(b'a'), "0");
        assert_eq!(code(b'b'), "10");
        assert_eq!(code(b'r'), "111");
        assert_eq!(code(b'd'), "1100");
        assert_eq!(code(b'c'), "1101");

        let shortest = table.iter().map(|(_, c)| c.len()).min().unwrap();
        assert_eq!(table.get(b'a').unwrap().len(), shortest);
    }

    #[test]
    fn two_symbols_get_one_bit_each() {
        let table = table_for(&b"ab".repeat(50));
        assert!(table.iter().all(|(_, c)| c.len() == 1));
    }

    #[test]
    fn codes_are_prefix_free() {
        let table = table_for(b"the quick brown fox jumps over the lazy dog");
        let codes: Vec<Codeword> = table.iter().map(|(_, c)| c).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{a} is a prefix of {b}");
                }
            }
        }
    }

    #[test]
    fn fibonacci_weights_exceed_code_limit() {
        let mut data = Vec::new();
        let (mut x, mut y) = (1usize, 1usize);
        for symbol in 0..20u8 {
            data.extend(std::iter::repeat_n(symbol, x));
            (x, y) = (y, x + y);
        }
        let tree = HuffmanTree::build(&FrequencyTable::from_symbols(&data)).unwrap();
        assert_eq!(tree.depth(), 19);
        // the first leaf past the limit is reported, not necessarily the deepest
        assert!(matches!(
            CodewordTable::from_tree(&tree),
            Err(Error::CodewordTooLong { length, .. }) if length > MAX_CODEWORD_LEN
        ));
    }

    #[test]
    fn encode_symbols_concatenates_in_order() {
        let table = table_for(b"abracadabra");
        let bits = table.encode_symbols(b"abra").unwrap();
        assert_eq!(bits.bit_len(), 1 + 2 + 3 + 1);
        let rendered: String = bits.bits().map(|b| if b { '1' } else { '0' }).collect();
        assert_eq!(rendered, "0101110");
    }

    #[test]
    fn encode_symbols_rejects_unknown_symbol() {
        let table = table_for(b"ab");
        assert!(matches!(
            table.encode_symbols(b"abc"),
            Err(Error::Internal(_))
        ));
    }
}
