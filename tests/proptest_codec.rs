//! Property-based tests for the codec.
//!
//! These check, across generated inputs:
//! - decode(encode(s)) == s
//! - codeword tables are prefix-free
//! - the encoded size matches the layout exactly
//! - decoding arbitrary bytes never panics

use proptest::prelude::*;

use huffpack::{CodewordTable, FrequencyTable, HuffmanTree, decode, encode, format};

/// Inputs over a small alphabet, so codes stay well under 16 bits.
fn small_alphabet_input() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"abcdefghij \n".to_vec()), 1..2048)
}

/// Inputs over the full byte range.
fn byte_input() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..1024)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 100,
        ..ProptestConfig::default()
    })]

    /// Property: decoding an encoded buffer gives back the input.
    #[test]
    fn prop_roundtrip(data in small_alphabet_input()) {
        let encoded = encode(&data).unwrap();
        prop_assert_eq!(decode(&encoded).unwrap(), data);
    }

    /// Property: the round trip holds for arbitrary bytes.
    #[test]
    fn prop_roundtrip_bytes(data in byte_input()) {
        let encoded = encode(&data).unwrap();
        prop_assert_eq!(decode(&encoded).unwrap(), data);
    }

    /// Property: no codeword is a prefix of another.
    #[test]
    fn prop_prefix_free(data in byte_input()) {
        let tree = HuffmanTree::build(&FrequencyTable::from_symbols(&data)).unwrap();
        let table = CodewordTable::from_tree(&tree).unwrap();
        let codes: Vec<_> = table.iter().map(|(_, c)| c).collect();
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                prop_assert!(!a.is_prefix_of(b) && !b.is_prefix_of(a), "{} / {}", a, b);
            }
        }
    }

    /// Property: size is table + 7 + ceil(bits / 8).
    #[test]
    fn prop_exact_size(data in small_alphabet_input()) {
        let tree = HuffmanTree::build(&FrequencyTable::from_symbols(&data)).unwrap();
        let table = CodewordTable::from_tree(&tree).unwrap();
        let bits = table.encode_symbols(&data).unwrap();
        let encoded = encode(&data).unwrap();
        prop_assert_eq!(encoded.len(), format::encoded_len(&table, &bits));
        prop_assert_eq!(
            encoded.len(),
            format::table_size(&table) + 7 + bits.bit_len().div_ceil(8) as usize
        );
    }

    /// Property: garbage input fails cleanly instead of panicking.
    #[test]
    fn prop_decode_garbage(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&data);
    }
}
