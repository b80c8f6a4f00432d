//! Critical mass and adjacency rules.
//!
//! Everything here is derived from the board dimensions and a cell's
//! position alone. A cell's critical mass equals its number of orthogonal
//! neighbours, so an explosion hands exactly one unit to each neighbour.

use crate::game::Coord;

/// Unit count at which the cell at `(row, col)` explodes.
///
/// 2 for corners, 3 for other border cells, 4 for interior cells. On
/// degenerate one-wide boards the value is clamped to at least 1.
#[must_use]
pub const fn critical_mass(row: u16, col: u16, rows: u16, cols: u16) -> u32 {
    let mut count = 0u32;
    if row > 0 {
        count += 1;
    }
    if row + 1 < rows {
        count += 1;
    }
    if col > 0 {
        count += 1;
    }
    if col + 1 < cols {
        count += 1;
    }
    if count == 0 { 1 } else { count }
}

/// Orthogonal in-bounds neighbours (up, down, left, right).
///
/// Returns a fixed-size array and count to avoid heap allocation.
/// The array contains valid coordinates in indices `0..count`.
#[must_use]
#[inline]
pub fn neighbors(row: u16, col: u16, rows: u16, cols: u16) -> ([Coord; 4], u8) {
    let mut result = [Coord::new(0, 0); 4];
    let mut count = 0u8;

    if row > 0 {
        result[count as usize] = Coord::new(row - 1, col);
        count += 1;
    }
    if row + 1 < rows {
        result[count as usize] = Coord::new(row + 1, col);
        count += 1;
    }
    if col > 0 {
        result[count as usize] = Coord::new(row, col - 1);
        count += 1;
    }
    if col + 1 < cols {
        result[count as usize] = Coord::new(row, col + 1);
        count += 1;
    }

    (result, count)
}

/// Index-based variant of [`neighbors`] for row-major cell arrays.
#[must_use]
#[inline]
pub(crate) fn neighbor_indices(idx: usize, rows: u16, cols: u16) -> ([usize; 4], u8) {
    let width = usize::from(cols);
    let row = idx / width;
    let col = idx % width;
    let mut result = [0usize; 4];
    let mut count = 0u8;

    if row > 0 {
        result[count as usize] = idx - width;
        count += 1;
    }
    if row + 1 < usize::from(rows) {
        result[count as usize] = idx + width;
        count += 1;
    }
    if col > 0 {
        result[count as usize] = idx - 1;
        count += 1;
    }
    if col + 1 < width {
        result[count as usize] = idx + 1;
        count += 1;
    }

    (result, count)
}

/// Chebyshev distance between two coordinates.
#[must_use]
#[inline]
pub const fn chebyshev_distance(a: Coord, b: Coord) -> u16 {
    let dr = a.row.abs_diff(b.row);
    let dc = a.col.abs_diff(b.col);
    if dr > dc { dr } else { dc }
}

/// Manhattan distance between two coordinates.
#[must_use]
#[inline]
pub const fn manhattan_distance(a: Coord, b: Coord) -> u16 {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

/// Check if two cells touch, diagonals included (Chebyshev distance <= 1).
///
/// Used by move legality; cascades only ever use orthogonal [`neighbors`].
#[must_use]
#[inline]
pub const fn is_adjacent_including_diagonal(a: Coord, b: Coord) -> bool {
    chebyshev_distance(a, b) <= 1
}

/// Check if a cell lies on the outer ring of the board.
#[must_use]
pub const fn is_edge(coord: Coord, rows: u16, cols: u16) -> bool {
    coord.row == 0 || coord.col == 0 || coord.row + 1 == rows || coord.col + 1 == cols
}

/// Check if a cell is one of the four corners.
#[must_use]
pub const fn is_corner(coord: Coord, rows: u16, cols: u16) -> bool {
    (coord.row == 0 || coord.row + 1 == rows) && (coord.col == 0 || coord.col + 1 == cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_mass_9x9() {
        assert_eq!(critical_mass(0, 0, 9, 9), 2);
        assert_eq!(critical_mass(0, 4, 9, 9), 3);
        assert_eq!(critical_mass(4, 4, 9, 9), 4);
        assert_eq!(critical_mass(8, 8, 9, 9), 2);
        assert_eq!(critical_mass(8, 3, 9, 9), 3);
        assert_eq!(critical_mass(4, 0, 9, 9), 3);
    }

    #[test]
    fn test_critical_mass_matches_neighbor_count() {
        for rows in 2..6u16 {
            for cols in 2..6u16 {
                for row in 0..rows {
                    for col in 0..cols {
                        let (_, count) = neighbors(row, col, rows, cols);
                        assert_eq!(critical_mass(row, col, rows, cols), u32::from(count));
                    }
                }
            }
        }
    }

    #[test]
    fn test_critical_mass_degenerate() {
        assert_eq!(critical_mass(0, 0, 1, 1), 1);
        assert_eq!(critical_mass(0, 0, 1, 3), 1);
        assert_eq!(critical_mass(0, 1, 1, 3), 2);
    }

    #[test]
    fn test_neighbors_corner() {
        let (adj, count) = neighbors(0, 0, 9, 9);
        let adj = &adj[..count as usize];
        assert_eq!(count, 2);
        assert!(adj.contains(&Coord::new(1, 0)));
        assert!(adj.contains(&Coord::new(0, 1)));
    }

    #[test]
    fn test_neighbors_interior() {
        let (adj, count) = neighbors(4, 4, 9, 9);
        let adj = &adj[..count as usize];
        assert_eq!(count, 4);
        assert!(adj.contains(&Coord::new(3, 4)));
        assert!(adj.contains(&Coord::new(5, 4)));
        assert!(adj.contains(&Coord::new(4, 3)));
        assert!(adj.contains(&Coord::new(4, 5)));
    }

    #[test]
    fn test_neighbor_indices_agree() {
        let (rows, cols) = (4u16, 5u16);
        for idx in 0..usize::from(rows * cols) {
            let row = (idx / 5) as u16;
            let col = (idx % 5) as u16;
            let (coords, n1) = neighbors(row, col, rows, cols);
            let (indices, n2) = neighbor_indices(idx, rows, cols);
            assert_eq!(n1, n2);
            for i in 0..n1 as usize {
                let c = coords[i];
                assert_eq!(indices[i], usize::from(c.row) * 5 + usize::from(c.col));
            }
        }
    }

    #[test]
    fn test_adjacent_including_diagonal() {
        let center = Coord::new(3, 3);
        assert!(is_adjacent_including_diagonal(center, Coord::new(2, 2)));
        assert!(is_adjacent_including_diagonal(center, Coord::new(4, 3)));
        assert!(is_adjacent_including_diagonal(center, center));
        assert!(!is_adjacent_including_diagonal(center, Coord::new(5, 3)));
        assert!(!is_adjacent_including_diagonal(center, Coord::new(1, 4)));
    }

    #[test]
    fn test_edge_and_corner() {
        assert!(is_corner(Coord::new(0, 8), 9, 9));
        assert!(!is_corner(Coord::new(0, 4), 9, 9));
        assert!(is_edge(Coord::new(0, 4), 9, 9));
        assert!(!is_edge(Coord::new(4, 4), 9, 9));
    }
}
