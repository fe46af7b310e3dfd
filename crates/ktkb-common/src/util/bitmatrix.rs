/// A matrix of `ROWS` rows and up to 32 columns holding one bit per
/// cell, laid out as one `u32` per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix<const ROWS: usize> {
    buf: [u32; ROWS],
}

impl<const ROWS: usize> BitMatrix<ROWS> {
    pub const MAX_COLS: u8 = 32;

    pub const fn new() -> Self {
        Self { buf: [0; ROWS] }
    }

    /// Returns the value of the cell, or `false` if it is out of bounds.
    pub fn get_value(&self, row: usize, col: u8) -> bool {
        if row >= ROWS || col >= Self::MAX_COLS {
            return false;
        }

        self.buf[row] & (1 << col) != 0
    }

    /// Updates the cell and returns whether its value changed. Out of
    /// bounds cells are never changed.
    pub fn set_value(&mut self, row: usize, col: u8, value: bool) -> bool {
        if row >= ROWS || col >= Self::MAX_COLS {
            return false;
        }

        let old = self.buf[row];
        if value {
            self.buf[row] |= 1 << col;
        } else {
            self.buf[row] &= !(1 << col);
        }
        old != self.buf[row]
    }

    pub fn count_ones(&self) -> u32 {
        self.buf.iter().map(|row| row.count_ones()).sum()
    }

    pub fn clear(&mut self) {
        self.buf = [0; ROWS];
    }
}

impl<const ROWS: usize> Default for BitMatrix<ROWS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::BitMatrix;

    #[test]
    fn test_set_reports_changes() {
        let mut m = BitMatrix::<3>::new();
        assert!(m.set_value(1, 5, true));
        assert!(!m.set_value(1, 5, true));
        assert!(m.get_value(1, 5));
        assert!(!m.get_value(0, 5));
        assert!(m.set_value(1, 5, false));
        assert!(!m.get_value(1, 5));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut m = BitMatrix::<2>::new();
        assert!(!m.set_value(2, 0, true));
        assert!(!m.set_value(0, 32, true));
        assert!(!m.get_value(5, 1));
        assert_eq!(m.count_ones(), 0);
    }

    #[test]
    fn test_count_and_clear() {
        let mut m = BitMatrix::<2>::new();
        m.set_value(0, 0, true);
        m.set_value(1, 31, true);
        assert_eq!(m.count_ones(), 2);
        m.clear();
        assert_eq!(m.count_ones(), 0);
    }
}
