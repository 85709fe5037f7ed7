pub const TILE_WIDTH: i32 = 112;
pub const TILE_HEIGHT: i32 = 82;

// the bottom tip of the bottom tile sits this many pixels above the viewport edge
const BOTTOM_MARGIN: i32 = 12;

const COLUMNS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
const ROWS: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];

/// Maps a board cell to the pixel at its centre, for a viewport of
/// `width` x `height`.
///
/// The board is drawn as a diamond: A1 is the bottom tile, H8 the top one.
/// A column or row outside the known set contributes no offset on its axis.
pub fn resolve(width: i32, height: i32, column: char, row: char) -> (i32, i32) {
    let mut x = width / 2;
    let mut y = height - BOTTOM_MARGIN - TILE_HEIGHT / 2;

    if let Some(k) = COLUMNS.iter().position(|&c| c == column) {
        // right and up half a tile per column
        x += (TILE_WIDTH / 2) * k as i32;
        y -= (TILE_HEIGHT / 2) * k as i32;
    }

    if let Some(k) = ROWS.iter().position(|&r| r == row) {
        // left and up half a tile per row
        x -= (TILE_WIDTH / 2) * k as i32;
        y -= (TILE_HEIGHT / 2) * k as i32;
    }

    (x, y)
}

/// A strictly validated board cell, `A1` through `H8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridCell {
    pub column: char,
    pub row: char,
}

impl GridCell {
    /// Accepts either case for the column letter.
    pub fn new(column: char, row: char) -> Option<GridCell> {
        let column = column.to_ascii_uppercase();
        if COLUMNS.contains(&column) && ROWS.contains(&row) {
            Some(GridCell { column, row })
        } else {
            None
        }
    }

    pub fn pixel(&self, width: i32, height: i32) -> (i32, i32) {
        resolve(width, height, self.column, self.row)
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}
