use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Serializer, Deserialize, Deserializer};
use serde::ser::SerializeSeq;
use serde::de::{self, SeqAccess, Visitor};
use lazy_static::lazy_static;

pub const ROWS: usize = 8;
pub const COLS: usize = 8;
const START_ROWS: usize = 3;

/// `(row, col)`, row 0 at the top of the board.
pub type Square = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Maximizing side, starts on rows 5-7 and promotes on row 0.
    Black,
    /// Minimizing side, starts on rows 0-2 and promotes on row 7.
    White,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    pub fn from_maximizing(maximizing: bool) -> Side {
        if maximizing { Side::Black } else { Side::White }
    }

    pub fn is_maximizing(self) -> bool {
        self == Side::Black
    }

    /// Row delta of a forward step.
    fn forward(self) -> isize {
        match self {
            Side::Black => -1,
            Side::White => 1,
        }
    }

    fn king_row(self) -> usize {
        match self {
            Side::Black => 0,
            Side::White => ROWS - 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Black => f.write_str("black"),
            Side::White => f.write_str("white"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    row: usize,
    col: usize,
    side: Side,
    king: bool,
}

impl Piece {
    pub fn new(row: usize, col: usize, side: Side) -> Self {
        Self { row, col, side, king: false }
    }

    pub fn new_king(row: usize, col: usize, side: Side) -> Self {
        Self { row, col, side, king: true }
    }

    pub fn row(&self) -> usize { self.row }
    pub fn col(&self) -> usize { self.col }
    pub fn square(&self) -> Square { (self.row, self.col) }
    pub fn side(&self) -> Side { self.side }
    pub fn is_king(&self) -> bool { self.king }

    fn symbol(&self) -> char {
        match (self.side, self.king) {
            (Side::Black, false) => 'b',
            (Side::Black, true) => 'B',
            (Side::White, false) => 'w',
            (Side::White, true) => 'W',
        }
    }

    fn from_symbol(symbol: char, row: usize, col: usize) -> Option<Option<Piece>> {
        match symbol {
            '.' => Some(None),
            'b' => Some(Some(Piece::new(row, col, Side::Black))),
            'B' => Some(Some(Piece::new_king(row, col, Side::Black))),
            'w' => Some(Some(Piece::new(row, col, Side::White))),
            'W' => Some(Some(Piece::new_king(row, col, Side::White))),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
struct Diagonal {
    rows: isize,
    step: Square,
    jump: Option<Square>,
}

fn offset((row, col): Square, rows: isize, cols: isize) -> Option<Square> {
    let row = row.checked_add_signed(rows)?;
    let col = col.checked_add_signed(cols)?;
    if row < ROWS && col < COLS { Some((row, col)) } else { None }
}

lazy_static! {
    // in-bounds diagonal neighbours of every square, indexed by row * COLS + col
    static ref DIAGONALS: Vec<Vec<Diagonal>> = {
        let mut diagonals = Vec::with_capacity(ROWS * COLS);
        for row in 0..ROWS {
            for col in 0..COLS {
                let mut square_diagonals = Vec::new();
                for (rows, cols) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
                    if let Some(step) = offset((row, col), rows, cols) {
                        square_diagonals.push(Diagonal {
                            rows,
                            step,
                            jump: offset(step, rows, cols),
                        });
                    }
                }
                diagonals.push(square_diagonals);
            }
        }
        diagonals
    };
}

/// Destinations reachable by one piece, each with the pieces captured on the way.
pub type ValidMoves = BTreeMap<Square, Vec<Piece>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<Piece>; COLS]; ROWS],
    black_left: u8,
    white_left: u8,
    black_kings: u8,
    white_kings: u8,
}

impl Board {
    /// Starting position: 12 men per side on the dark squares.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for row in 0..ROWS {
            let side = if row < START_ROWS {
                Side::White
            } else if row >= ROWS - START_ROWS {
                Side::Black
            } else {
                continue;
            };
            for col in (0..COLS).filter(|col| (row + col) % 2 == 1) {
                board.place(Piece::new(row, col, side));
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            grid: [[None; COLS]; ROWS],
            black_left: 0,
            white_left: 0,
            black_kings: 0,
            white_kings: 0,
        }
    }

    fn counters(&mut self, side: Side) -> (&mut u8, &mut u8) {
        match side {
            Side::Black => (&mut self.black_left, &mut self.black_kings),
            Side::White => (&mut self.white_left, &mut self.white_kings),
        }
    }

    pub fn pieces_left(&self, side: Side) -> u8 {
        match side {
            Side::Black => self.black_left,
            Side::White => self.white_left,
        }
    }

    pub fn kings(&self, side: Side) -> u8 {
        match side {
            Side::Black => self.black_kings,
            Side::White => self.white_kings,
        }
    }

    /// Puts a piece on an empty square. Used to set up positions.
    pub fn place(&mut self, piece: Piece) {
        assert!(piece.row < ROWS && piece.col < COLS, "square {:?} is off the board", piece.square());
        let cell = &mut self.grid[piece.row][piece.col];
        assert!(cell.is_none(), "square {:?} is occupied", piece.square());
        *cell = Some(piece);
        let (left, kings) = self.counters(piece.side);
        *left += 1;
        if piece.king {
            *kings += 1;
        }
    }

    pub fn get_piece(&self, row: usize, col: usize) -> Option<Piece> {
        assert!(row < ROWS && col < COLS, "square {:?} is off the board", (row, col));
        self.grid[row][col]
    }

    /// All pieces of `side` in row-major order.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Piece> + '_ {
        self.grid
            .iter()
            .flatten()
            .filter_map(move |cell| cell.filter(|piece| piece.side == side))
    }

    pub fn get_valid_moves(&self, piece: &Piece) -> ValidMoves {
        let piece = self.get_piece(piece.row, piece.col)
            .filter(|p| p.side == piece.side)
            .unwrap_or_else(|| panic!("no {} piece on {:?}", piece.side, piece.square()));
        let mut moves = ValidMoves::new();
        let forward = piece.side.forward();
        for diagonal in &DIAGONALS[piece.row * COLS + piece.col] {
            if !piece.king && diagonal.rows != forward {
                continue;
            }
            let (row, col) = diagonal.step;
            match self.grid[row][col] {
                None => {
                    moves.insert(diagonal.step, Vec::new());
                }
                Some(other) if other.side != piece.side => {
                    if let Some((jump_row, jump_col)) = diagonal.jump {
                        if self.grid[jump_row][jump_col].is_none() {
                            moves.insert((jump_row, jump_col), vec![other]);
                        }
                    }
                }
                Some(_) => {}
            }
        }
        moves
    }

    pub fn has_valid_moves(&self, side: Side) -> bool {
        self.pieces(side).any(|piece| !self.get_valid_moves(&piece).is_empty())
    }

    /// Relocates `piece`, crowning it on the far row. Returns the piece as it now stands.
    pub fn move_piece(&mut self, piece: &Piece, row: usize, col: usize) -> Piece {
        assert!(row < ROWS && col < COLS, "square {:?} is off the board", (row, col));
        let mut moved = self.grid[piece.row][piece.col]
            .take()
            .filter(|p| p.side == piece.side)
            .unwrap_or_else(|| panic!("no {} piece on {:?}", piece.side, piece.square()));
        assert!(self.grid[row][col].is_none(), "square {:?} is occupied", (row, col));
        moved.row = row;
        moved.col = col;
        if !moved.king && row == moved.side.king_row() {
            moved.king = true;
            *self.counters(moved.side).1 += 1;
        }
        self.grid[row][col] = Some(moved);
        moved
    }

    pub fn remove(&mut self, pieces: &[Piece]) {
        for piece in pieces {
            let removed = self.grid[piece.row][piece.col]
                .take()
                .filter(|p| p.side == piece.side)
                .unwrap_or_else(|| panic!("no {} piece on {:?}", piece.side, piece.square()));
            let (left, kings) = self.counters(removed.side);
            *left -= 1;
            if removed.king {
                *kings -= 1;
            }
        }
    }

    /// Copy of this board with `piece` moved to `dest` and `captured` taken off.
    pub fn with_move(&self, piece: &Piece, dest: Square, captured: &[Piece]) -> Board {
        let mut board = self.clone();
        board.move_piece(piece, dest.0, dest.1);
        if !captured.is_empty() {
            board.remove(captured);
        }
        board
    }

    pub fn winner(&self) -> Option<Side> {
        if self.black_left == 0 {
            Some(Side::White)
        } else if self.white_left == 0 {
            Some(Side::Black)
        } else if !self.has_valid_moves(Side::Black) {
            Some(Side::White)
        } else if !self.has_valid_moves(Side::White) {
            Some(Side::Black)
        } else {
            None
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..COLS {
            write!(f, " {}", col)?;
        }
        writeln!(f)?;
        for (row, cells) in self.grid.iter().enumerate() {
            write!(f, "{}", row)?;
            for cell in cells {
                write!(f, " {}", cell.map_or('.', |piece| piece.symbol()))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// serialized as 8 strings of 8 cells, row 0 first
impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut s = serializer.serialize_seq(Some(ROWS))?;
        for cells in &self.grid {
            let row: String = cells.iter().map(|cell| cell.map_or('.', |piece| piece.symbol())).collect();
            s.serialize_element(&row)?;
        }
        s.end()
    }
}

struct BoardVisitor;
impl<'de> Visitor<'de> for BoardVisitor {
    type Value = Board;
    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON array of 8 rows of 8 cells for Board")
    }
    fn visit_seq<V>(self, mut seq: V) -> Result<Board, V::Error> where V: SeqAccess<'de> {
        let mut board = Board::empty();
        let mut row = 0;
        while let Some(cells) = seq.next_element::<String>()? {
            if row >= ROWS {
                return Err(de::Error::invalid_length(row + 1, &self));
            }
            if cells.chars().count() != COLS {
                return Err(de::Error::invalid_value(de::Unexpected::Str(&cells), &"a row of 8 cells"));
            }
            for (col, symbol) in cells.chars().enumerate() {
                let cell = Piece::from_symbol(symbol, row, col).ok_or_else(|| {
                    de::Error::invalid_value(de::Unexpected::Char(symbol), &"one of . b B w W")
                })?;
                if let Some(piece) = cell {
                    board.place(piece);
                }
            }
            row += 1;
        }
        if row != ROWS {
            return Err(de::Error::invalid_length(row, &self));
        }
        Ok(board)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_seq(BoardVisitor)
    }
}
