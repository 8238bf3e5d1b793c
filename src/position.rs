use anyhow::{bail, Context};
use std::fmt;
use std::ops::{Index, IndexMut};

pub const ROWS: usize = 8;
pub const COLS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::King,
        Kind::Queen,
        Kind::Rook,
        Kind::Bishop,
        Kind::Knight,
        Kind::Pawn,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: Kind,
}

impl Piece {
    pub fn new(color: Color, kind: Kind) -> Self {
        Self { color, kind }
    }

    /// Uppercase characters are white pieces, lowercase are black.
    pub fn from_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'k' => Kind::King,
            'q' => Kind::Queen,
            'r' => Kind::Rook,
            'b' => Kind::Bishop,
            'n' => Kind::Knight,
            'p' => Kind::Pawn,
            _ => return None,
        };
        Some(Self { color, kind })
    }

    pub fn to_char(self) -> char {
        let c = match self.kind {
            Kind::King => 'k',
            Kind::Queen => 'q',
            Kind::Rook => 'r',
            Kind::Bishop => 'b',
            Kind::Knight => 'n',
            Kind::Pawn => 'p',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A board coordinate. Row 0 is the top rank (black's back rank in the
/// starting arrangement), column 0 is the leftmost file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        assert!(
            row < ROWS && col < COLS,
            "square ({}, {}) out of bounds",
            row,
            col
        );
        Self { row, col }
    }

    pub fn index(self) -> usize {
        self.row * COLS + self.col
    }

    /// Iterate every square, top-left to bottom-right.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Square { row, col }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col as u8) as char;
        write!(f, "{}{}", file, ROWS - self.row)
    }
}

/// The piece arrangement: a flat 8x8 grid of optional pieces. No notion of
/// turn order, legality, or game state lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    cells: [Option<Piece>; ROWS * COLS],
}

impl Position {
    pub fn empty() -> Self {
        Self {
            cells: [None; ROWS * COLS],
        }
    }

    /// The standard starting arrangement, black on top.
    pub fn starting() -> Self {
        const BACK_RANK: [Kind; COLS] = [
            Kind::Rook,
            Kind::Knight,
            Kind::Bishop,
            Kind::Queen,
            Kind::King,
            Kind::Bishop,
            Kind::Knight,
            Kind::Rook,
        ];

        let mut cells = [None; ROWS * COLS];
        for col in 0..COLS {
            cells[col] = Some(Piece::new(Color::Black, BACK_RANK[col]));
            cells[COLS + col] = Some(Piece::new(Color::Black, Kind::Pawn));
            cells[6 * COLS + col] = Some(Piece::new(Color::White, Kind::Pawn));
            cells[7 * COLS + col] = Some(Piece::new(Color::White, BACK_RANK[col]));
        }
        Self { cells }
    }

    /// Parse the board field of a FEN string: rows top to bottom separated
    /// by `/`, digits standing for runs of empty squares.
    pub fn from_placement(placement: &str) -> anyhow::Result<Self> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != ROWS {
            bail!("expected {} rows in placement, got {}", ROWS, rows.len());
        }

        let mut cells = [None; ROWS * COLS];
        for (row, row_str) in rows.iter().enumerate() {
            let mut col = 0usize;
            for c in row_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    col += run as usize;
                } else {
                    let piece = Piece::from_char(c)
                        .with_context(|| format!("invalid piece character {:?} in row {}", c, row))?;
                    if col >= COLS {
                        bail!("row {} overflows {} columns", row, COLS);
                    }
                    cells[row * COLS + col] = Some(piece);
                    col += 1;
                }
            }
            if col != COLS {
                bail!("row {} describes {} columns, expected {}", row, col, COLS);
            }
        }
        Ok(Self { cells })
    }

    /// Inverse of [`from_placement`](Self::from_placement).
    pub fn to_placement(&self) -> String {
        let mut out = String::new();
        for row in 0..ROWS {
            if row > 0 {
                out.push('/');
            }
            let mut empty_run = 0u8;
            for col in 0..COLS {
                match self.cells[row * COLS + col] {
                    Some(piece) => {
                        if empty_run > 0 {
                            out.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        out.push(piece.to_char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push((b'0' + empty_run) as char);
            }
        }
        out
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl Index<Square> for Position {
    type Output = Option<Piece>;

    fn index(&self, square: Square) -> &Self::Output {
        &self.cells[square.index()]
    }
}

impl IndexMut<Square> for Position {
    fn index_mut(&mut self, square: Square) -> &mut Self::Output {
        &mut self.cells[square.index()]
    }
}
