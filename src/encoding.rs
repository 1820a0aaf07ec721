//! Ternary state encoding for board positions.
//!
//! Each cell contributes one base-3 digit (Empty=0, O=1, X=2). Cells are read
//! in row-major order with cell 0 as the most significant digit, so the
//! digit string of a key reads like the board itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tictactoe::{BoardState, Cell};

/// Unique integer key of a board's cell contents, in `0..StateKey::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32")]
pub struct StateKey(u16);

impl StateKey {
    /// Number of distinct keys (3^9).
    pub const COUNT: usize = 19_683;

    /// Encode the cells of `board`.
    pub fn encode(board: &BoardState) -> Self {
        Self::from_cells(&board.cells)
    }

    /// Encode raw cells.
    pub fn from_cells(cells: &[Cell; 9]) -> Self {
        let mut value = 0u16;
        let mut base = 1u16;
        for cell in cells.iter().rev() {
            value += cell.ternary_digit() * base;
            base *= 3;
        }
        StateKey(value)
    }

    /// Wrap a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStateKey`] if the value is >= 19683.
    pub fn new(value: u32) -> Result<Self, crate::Error> {
        if (value as usize) < Self::COUNT {
            Ok(StateKey(value as u16))
        } else {
            Err(crate::Error::InvalidStateKey { value })
        }
    }

    /// Raw value, usable as a dense table row index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Recover the cells this key was built from.
    pub fn decode(self) -> [Cell; 9] {
        let mut cells = [Cell::Empty; 9];
        let mut value = self.0;
        for cell in cells.iter_mut().rev() {
            *cell = Cell::from_ternary_digit(value % 3).unwrap_or(Cell::Empty);
            value /= 3;
        }
        cells
    }

    /// Nine-character digit string, cell 0 first.
    pub fn to_digits(self) -> String {
        self.decode()
            .iter()
            .map(|cell| char::from(b'0' + cell.ternary_digit() as u8))
            .collect()
    }

    /// Parse a nine-character digit string produced by [`StateKey::to_digits`].
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly nine digits in `0..=2`.
    pub fn parse_digits(digits: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = digits.chars().collect();
        if chars.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: digits.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = c
                .to_digit(3)
                .and_then(|d| Cell::from_ternary_digit(d as u16))
                .ok_or_else(|| crate::Error::InvalidCellCharacter {
                    character: c,
                    position: i,
                    context: digits.to_string(),
                })?;
        }
        Ok(Self::from_cells(&cells))
    }
}

impl From<&BoardState> for StateKey {
    fn from(board: &BoardState) -> Self {
        Self::encode(board)
    }
}

impl TryFrom<u32> for StateKey {
    type Error = crate::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_digits())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn cells_from_index(mut n: usize) -> [Cell; 9] {
        let mut cells = [Cell::Empty; 9];
        for cell in cells.iter_mut() {
            *cell = Cell::from_ternary_digit((n % 3) as u16).unwrap();
            n /= 3;
        }
        cells
    }

    #[test]
    fn empty_board_is_zero() {
        assert_eq!(StateKey::encode(&BoardState::new()).index(), 0);
    }

    #[test]
    fn last_cell_is_least_significant() {
        let board = BoardState::from_string("........X").unwrap();
        assert_eq!(StateKey::encode(&board).index(), 2);

        let board = BoardState::from_string("X........").unwrap();
        assert_eq!(StateKey::encode(&board).index(), 2 * 6561);
    }

    #[test]
    fn full_domain_is_a_bijection() {
        let mut seen = HashSet::with_capacity(StateKey::COUNT);
        for n in 0..StateKey::COUNT {
            let cells = cells_from_index(n);
            let key = StateKey::from_cells(&cells);
            assert!(key.index() < StateKey::COUNT);
            assert_eq!(key.decode(), cells);
            assert!(seen.insert(key), "duplicate key for {cells:?}");
        }
        assert_eq!(seen.len(), StateKey::COUNT);
    }

    #[test]
    fn digits_roundtrip() {
        let board = BoardState::from_string("XO..X..O.").unwrap();
        let key = StateKey::encode(&board);
        assert_eq!(key.to_digits(), "210020010");
        assert_eq!(StateKey::parse_digits("210020010").unwrap(), key);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(StateKey::new(19_683).is_err());
        assert!(StateKey::new(19_682).is_ok());
        assert!(StateKey::parse_digits("2100").is_err());
        assert!(StateKey::parse_digits("21002001x").is_err());
        assert!(StateKey::parse_digits("210020013").is_err());
    }
}
