//! Fixed-length bit set backed by `u64` words.
//!
//! Used both as the row storage of truth tables (where the word-wise NOR is
//! the whole cost of circuit simulation) and as the set of child ids already
//! consumed during search.

/// A bit set of fixed length backed by a vector of u64 words.
///
/// Bits beyond `len` in the last word are always kept clear, so two sets of
/// the same length compare equal exactly when they hold the same bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of addressable bits
    len: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates a bit set of `len` bits, all clear.
    pub fn new(len: usize) -> Self {
        let num_words = len.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            len,
        }
    }

    /// Creates a bit set of `len` bits, all set.
    pub fn full(len: usize) -> Self {
        let mut bs = Self {
            words: vec![u64::MAX; len.div_ceil(Self::BITS_PER_WORD)],
            len,
        };
        bs.clear_tail();
        bs
    }

    /// Returns the number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set has no addressable bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the bit at the given index is set.
    ///
    /// Indices past the end read as clear.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        (self.words[word_idx] >> bit_idx) & 1 == 1
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.len, "bit index {} out of range for length {}", index, self.len);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        self.words[word_idx] |= mask;
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_set = self.words[word_idx] & mask != 0;
        self.words[word_idx] &= !mask;
        was_set
    }

    /// Bitwise NOR of two sets of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn nor(&self, other: &BitSet) -> BitSet {
        assert_eq!(self.len, other.len, "NOR of bit sets with different lengths");
        let words = self.words.iter().zip(&other.words).map(|(a, b)| !(a | b)).collect();
        let mut result = BitSet { words, len: self.len };
        result.clear_tail();
        result
    }

    fn clear_tail(&mut self) {
        let rem = self.len % Self::BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}
