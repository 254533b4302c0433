//! Truth tables over `n` inputs.
//!
//! A boolean function f: {0,1}ⁿ → {0,1} is stored as 2ⁿ bits, one per row.
//!
//! # Row Ordering
//!
//! Inputs are numbered 1 to n. In row `r`, input `k` has the value of bit
//! `n - k` of `r`, so x₁ is the *most* significant bit of the row index:
//!
//! ```text
//! n = 2:  row 0 = 00, row 1 = 01, row 2 = 10, row 3 = 11   (x₁ x₂)
//! ```
//!
//! Every comparison between a circuit and its target uses this order.

use std::fmt;

use crate::bitset::BitSet;
use crate::error::{Error, Result};

/// Largest supported number of inputs.
pub const MAX_INPUTS: u32 = 16;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    /// Number of inputs.
    num_inputs: u32,
    /// The table bits: 2ⁿ rows.
    bits: BitSet,
}

/// Canonical column of input `k` over `n` inputs.
///
/// Bit `r` equals bit `n - k` of `r`.
///
/// # Panics
///
/// Panics unless `1 <= k <= n <= MAX_INPUTS`.
pub fn column(k: u32, n: u32) -> TruthTable {
    assert!(
        k >= 1 && k <= n && n <= MAX_INPUTS,
        "input {} out of range for {} inputs",
        k,
        n
    );
    let shift = n - k;
    TruthTable::build(n, |row| (row >> shift) & 1 == 1)
}

/// Columns of all inputs `1..=n`, in order.
pub fn columns(n: u32) -> Vec<TruthTable> {
    (1..=n).map(|k| column(k, n)).collect()
}

impl TruthTable {
    /// Builds a table by evaluating `f` on every row index.
    pub fn from_fn(num_inputs: u32, f: impl Fn(usize) -> bool) -> Result<Self> {
        validate_num_inputs(num_inputs)?;
        Ok(Self::build(num_inputs, f))
    }

    fn build(num_inputs: u32, f: impl Fn(usize) -> bool) -> Self {
        let rows = 1usize << num_inputs;
        let mut bits = BitSet::new(rows);
        for row in 0..rows {
            if f(row) {
                bits.insert(row);
            }
        }
        TruthTable { num_inputs, bits }
    }

    /// Builds a table from one `bool` per row.
    pub fn from_bools(num_inputs: u32, rows: &[bool]) -> Result<Self> {
        validate_num_inputs(num_inputs)?;
        let expected = 1usize << num_inputs;
        if rows.len() != expected {
            return Err(Error::InvalidInput(format!(
                "expected {} rows for {} inputs, got {}",
                expected,
                num_inputs,
                rows.len()
            )));
        }
        Ok(Self::build(num_inputs, |row| rows[row]))
    }

    /// Parses a table of `0`/`1` characters for a known number of inputs.
    ///
    /// Whitespace and commas between bits are ignored.
    pub fn parse(num_inputs: u32, text: &str) -> Result<Self> {
        let rows = parse_bits(text)?;
        Self::from_bools(num_inputs, &rows)
    }

    /// Parses a table of `0`/`1` characters, inferring `n` from its length.
    pub fn parse_inferred(text: &str) -> Result<Self> {
        let rows = parse_bits(text)?;
        if !rows.len().is_power_of_two() || rows.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "table length {} is not a power of two of at least 2",
                rows.len()
            )));
        }
        Self::from_bools(rows.len().trailing_zeros(), &rows)
    }

    /// Constant table.
    pub fn constant(num_inputs: u32, value: bool) -> Result<Self> {
        validate_num_inputs(num_inputs)?;
        let rows = 1usize << num_inputs;
        let bits = if value { BitSet::full(rows) } else { BitSet::new(rows) };
        Ok(TruthTable { num_inputs, bits })
    }

    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    /// Number of rows, 2ⁿ.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Output at the given row.
    pub fn get(&self, row: usize) -> bool {
        self.bits.contains(row)
    }

    /// Number of rows where the function is true.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Row-wise `NOT(self OR other)`.
    ///
    /// # Panics
    ///
    /// Panics if the tables have different numbers of inputs.
    pub fn nor(&self, other: &TruthTable) -> TruthTable {
        assert_eq!(self.num_inputs, other.num_inputs);
        TruthTable {
            num_inputs: self.num_inputs,
            bits: self.bits.nor(&other.bits),
        }
    }

    /// Rows as `0`/`1` values, in row order.
    pub fn to_bits(&self) -> Vec<u8> {
        (0..self.len()).map(|row| self.get(row) as u8).collect()
    }
}

pub(crate) fn validate_num_inputs(num_inputs: u32) -> Result<()> {
    if num_inputs == 0 {
        return Err(Error::InvalidInput("number of inputs must be positive".into()));
    }
    if num_inputs > MAX_INPUTS {
        return Err(Error::InvalidInput(format!(
            "at most {} inputs are supported, got {}",
            MAX_INPUTS, num_inputs
        )));
    }
    Ok(())
}

pub(crate) fn validate_table(table: &TruthTable) -> Result<()> {
    validate_num_inputs(table.num_inputs)?;
    let expected = 1usize << table.num_inputs;
    if table.len() != expected {
        return Err(Error::InvalidInput(format!(
            "truth table has {} rows, expected {}",
            table.len(),
            expected
        )));
    }
    Ok(())
}

fn parse_bits(text: &str) -> Result<Vec<bool>> {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(Error::InvalidInput(format!("unexpected character {:?} in truth table", c))),
        })
        .collect()
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.len() {
            write!(f, "{}", if self.get(row) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl fmt::Debug for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TruthTable(n={}, {})", self.num_inputs, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_msb_first() {
        // x1 is the most significant bit of the row index
        assert_eq!(column(1, 2).to_string(), "0011");
        assert_eq!(column(2, 2).to_string(), "0101");
        assert_eq!(column(1, 3).to_string(), "00001111");
        assert_eq!(column(2, 3).to_string(), "00110011");
        assert_eq!(column(3, 3).to_string(), "01010101");
    }

    #[test]
    fn test_column_length() {
        for n in 1..=7 {
            for k in 1..=n {
                let col = column(k, n);
                assert_eq!(col.len(), 1 << n);
                assert_eq!(col.count_ones(), 1 << (n - 1));
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_column_zero_panics() {
        column(0, 2);
    }

    #[test]
    fn test_nor_of_columns() {
        let f = column(1, 2).nor(&column(2, 2));
        assert_eq!(f.to_string(), "1000");
        assert_eq!(f.to_bits(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_parse() {
        let t = TruthTable::parse(2, "0 1, 1 0").unwrap();
        assert_eq!(t.to_string(), "0110");
        assert_eq!(t.num_inputs(), 2);
    }

    #[test]
    fn test_parse_wrong_length() {
        let err = TruthTable::parse(2, "011").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_bad_char() {
        assert!(matches!(TruthTable::parse(1, "0x"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_zero_inputs() {
        assert!(matches!(TruthTable::parse(0, "1"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_inferred() {
        let t = TruthTable::parse_inferred("10010110").unwrap();
        assert_eq!(t.num_inputs(), 3);
        assert!(TruthTable::parse_inferred("101").is_err());
        assert!(TruthTable::parse_inferred("1").is_err());
    }

    #[test]
    fn test_constant() {
        assert_eq!(TruthTable::constant(2, true).unwrap().to_string(), "1111");
        assert_eq!(TruthTable::constant(2, false).unwrap().to_string(), "0000");
    }

    #[test]
    fn test_constructors_reject_bad_input_counts() {
        for n in [0, MAX_INPUTS + 1, 64, u32::MAX] {
            assert!(matches!(TruthTable::constant(n, true), Err(Error::InvalidInput(_))));
            assert!(matches!(TruthTable::from_fn(n, |_| false), Err(Error::InvalidInput(_))));
        }
        let t = TruthTable::from_fn(MAX_INPUTS, |row| row % 3 == 0).unwrap();
        assert_eq!(t.len(), 1 << MAX_INPUTS);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_column_too_many_inputs_panics() {
        column(1, 64);
    }
}
