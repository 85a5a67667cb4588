//! Seed patterns and plaintext parsing.

use super::error::{LifeError, Result};

/// Rectangular live/dead mask, stamped onto a grid with [`Grid::stamp`].
///
/// [`Grid::stamp`]: super::grid::Grid::stamp
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    rows: usize,
    cols: usize,
    mask: Vec<bool>,
}

const GLIDER: [(usize, usize); 5] = [(0, 2), (1, 0), (1, 2), (2, 1), (2, 2)];

#[rustfmt::skip]
const GOSPER_GLIDER_GUN: [(usize, usize); 36] = [
    // left block
    (5, 1), (5, 2), (6, 1), (6, 2),
    // left ship
    (3, 13), (3, 14), (4, 12), (4, 16), (5, 11), (5, 17),
    (6, 11), (6, 15), (6, 17), (6, 18), (7, 11), (7, 17),
    (8, 12), (8, 16), (9, 13), (9, 14),
    // right ship
    (1, 25), (2, 23), (2, 25), (3, 21), (3, 22), (4, 21),
    (4, 22), (5, 21), (5, 22), (6, 23), (6, 25), (7, 25),
    // right block
    (3, 35), (3, 36), (4, 35), (4, 36),
];

impl Pattern {
    /// Build a pattern from live cell offsets inside a `rows × cols` box.
    pub fn new(name: &str, rows: usize, cols: usize, live: &[(usize, usize)]) -> Result<Self> {
        if let Some(&(r, c)) = live.iter().find(|&&(r, c)| r >= rows || c >= cols) {
            return Err(LifeError::InvalidPattern {
                reason: format!("{name}: cell ({r}, {c}) outside {rows}x{cols} box"),
            });
        }
        Ok(Self::from_offsets(name, rows, cols, live))
    }

    fn from_offsets(name: &str, rows: usize, cols: usize, live: &[(usize, usize)]) -> Self {
        let mut mask = vec![false; rows * cols];
        for &(r, c) in live {
            mask[r * cols + c] = true;
        }
        Self {
            name: name.to_string(),
            rows,
            cols,
            mask,
        }
    }

    /// Parse plaintext rows; short rows are padded with dead cells.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let lines = parse_plaintext(text)?;
        let rows = lines.len();
        let cols = lines.iter().map(Vec::len).max().unwrap_or(0);
        let mut mask = vec![false; rows * cols];
        for (r, line) in lines.iter().enumerate() {
            mask[r * cols..r * cols + line.len()].copy_from_slice(line);
        }
        Ok(Self {
            name: name.to_string(),
            rows,
            cols,
            mask,
        })
    }

    /// 2×2 still life.
    pub fn block() -> Self {
        Self::from_offsets("block", 2, 2, &[(0, 0), (0, 1), (1, 0), (1, 1)])
    }

    /// Period-2 oscillator, horizontal phase.
    pub fn blinker() -> Self {
        Self::from_offsets("blinker", 1, 3, &[(0, 0), (0, 1), (0, 2)])
    }

    /// Travels one row down and one column right every 4 generations.
    pub fn glider() -> Self {
        Self::from_offsets("glider", 3, 3, &GLIDER)
    }

    /// Period-30 gun in an 11×38 box, emitting gliders down and to the right.
    pub fn gosper_glider_gun() -> Self {
        Self::from_offsets("gosper glider gun", 11, 38, &GOSPER_GLIDER_GUN)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.mask[row * self.cols + col]
    }

    pub fn population(&self) -> usize {
        self.mask.iter().filter(|&&alive| alive).count()
    }
}

/// Split plaintext into rows of cells. `O`, `*` and `1` are live; `.` and
/// `0` are dead. Blank lines and `!` comment lines are skipped.
pub(crate) fn parse_plaintext(text: &str) -> Result<Vec<Vec<bool>>> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        let row = line
            .chars()
            .map(|ch| match ch {
                'O' | '*' | '1' => Ok(true),
                '.' | '0' => Ok(false),
                other => Err(LifeError::InvalidPattern {
                    reason: format!("unexpected {other:?} on line {}", line_no + 1),
                }),
            })
            .collect::<Result<Vec<bool>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::Pattern;
    use crate::torus::error::LifeError;
    use crate::torus::grid::Grid;

    #[test]
    fn builtin_populations() {
        assert_eq!(Pattern::block().population(), 4);
        assert_eq!(Pattern::blinker().population(), 3);
        assert_eq!(Pattern::glider().population(), 5);
        let gun = Pattern::gosper_glider_gun();
        assert_eq!((gun.rows(), gun.cols()), (11, 38));
        assert_eq!(gun.population(), 36);
    }

    #[test]
    fn parse_pads_short_rows_and_skips_comments() {
        let pattern = Pattern::parse("glider", "!Name: glider\n..O\nO.O\n.OO\n").unwrap();
        assert_eq!(pattern, Pattern::glider());

        let ragged = Pattern::parse("ragged", "O\n.O.\n").unwrap();
        assert_eq!((ragged.rows(), ragged.cols()), (2, 3));
        assert!(ragged.is_alive(0, 0));
        assert!(!ragged.is_alive(0, 2));
    }

    #[test]
    fn parse_rejects_unknown_glyph() {
        assert!(matches!(
            Pattern::parse("bad", "O.x\n"),
            Err(LifeError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn new_rejects_cells_outside_box() {
        assert!(Pattern::new("ok", 2, 2, &[(1, 1)]).is_ok());
        assert!(matches!(
            Pattern::new("bad", 2, 2, &[(0, 2)]),
            Err(LifeError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn stamp_wraps_and_clears_box() {
        let mut grid = Grid::new(4);
        grid.set(3, 0, true);
        grid.stamp(&Pattern::glider(), 2, 3);
        assert_eq!(grid.population(), 5);
        // (0, 2) of the glider lands at (2, 5) -> (2, 1).
        assert!(grid.get(2, 1));
        // (1, 0) of the glider is at (3, 3); (3, 0) was inside the box and dead.
        assert!(grid.get(3, 3));
        assert!(!grid.get(3, 0));
    }
}
