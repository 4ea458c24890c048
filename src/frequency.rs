//! Symbol frequency counting.

/// Occurrence counts per byte value, remembering first-seen order.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u64; 256],
    order: Vec<u8>,
}

impl FrequencyTable {
    /// Count every symbol of `data`. Empty input gives an empty table.
    pub fn from_symbols(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        let mut order = Vec::new();
        for &byte in data {
            let slot = &mut counts[byte as usize];
            if *slot == 0 {
                order.push(byte);
            }
            *slot += 1;
        }
        FrequencyTable { counts, order }
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Count for `symbol`, `None` if it never occurs.
    pub fn get(&self, symbol: u8) -> Option<u64> {
        match self.counts[symbol as usize] {
            0 => None,
            n => Some(n),
        }
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.order.iter().map(|&s| self.counts[s as usize]).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.order.iter().map(|&s| (s, self.counts[s as usize]))
    }

    /// Entries by descending count; equal counts keep first-seen order.
    pub fn by_weight(&self) -> Vec<(u8, u64)> {
        let mut entries: Vec<(u8, u64)> = self.iter().collect();
        // stable sort keeps first-seen order among ties
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}
