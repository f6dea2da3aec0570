//! Board values, parsing and move generation

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;
use crate::{Error, Result};

/// Label shape accepted by [`BoardState::from_label`]
const LABEL_SHAPE: &str = "XXXXXXXXX_P";

/// Contents of one square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }
}

impl TryFrom<char> for Cell {
    type Error = char;

    /// `.`, `_`, `-` and space are empty; case is ignored; `0` reads as O.
    fn try_from(c: char) -> std::result::Result<Self, char> {
        match c.to_ascii_uppercase() {
            '.' | '_' | '-' | ' ' => Ok(Cell::Empty),
            'X' => Ok(Cell::X),
            'O' | '0' => Ok(Cell::O),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// The mark this player leaves on the board
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    pub fn to_char(self) -> char {
        self.to_cell().to_char()
    }
}

impl FromStr for Player {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "X" => Ok(Player::X),
            "O" => Ok(Player::O),
            _ => Err(Error::InvalidPlayerString {
                player: s.to_string(),
                label: s.to_string(),
            }),
        }
    }
}

/// Nine cells plus the player to move.
///
/// Boards are immutable values: moves produce new boards, and two boards with
/// the same cells and the same player to move are the same table key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
    pub to_move: Player,
}

fn parse_cells(text: &str, context: &str) -> Result<[Cell; 9]> {
    let found = text.chars().count();
    if found != 9 {
        return Err(Error::InvalidBoardLength {
            expected: 9,
            got: found,
            context: context.to_string(),
        });
    }

    let mut cells = [Cell::Empty; 9];
    for (position, (slot, c)) in cells.iter_mut().zip(text.chars()).enumerate() {
        *slot = Cell::try_from(c).map_err(|_| Error::InvalidCellCharacter {
            character: c,
            position,
            context: context.to_string(),
        })?;
    }
    Ok(cells)
}

impl BoardState {
    /// Empty board, X to move
    pub fn new() -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
            to_move: Player::X,
        }
    }

    /// Marks `player` has on the board
    pub fn count(&self, player: Player) -> usize {
        let mark = player.to_cell();
        self.cells.iter().filter(|&&c| c == mark).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.count(Player::X) + self.count(Player::O)
    }

    /// Whose turn the piece counts imply in an X-first game
    fn turn_implied_by_counts(cells: [Cell; 9]) -> Result<Player> {
        let board = BoardState {
            cells,
            to_move: Player::X,
        };
        let (x, o) = (board.count(Player::X), board.count(Player::O));
        match x.checked_sub(o) {
            Some(0) => Ok(Player::X),
            Some(1) => Ok(Player::O),
            _ => Err(Error::InvalidPieceCounts {
                x_count: x,
                o_count: o,
            }),
        }
    }

    /// Parse a board written loosely, e.g. `"XO. / ... / ..."`.
    ///
    /// Whitespace and `/` separators are dropped. Input carrying a `_X` or
    /// `_O` suffix is read as a label; otherwise the player to move follows
    /// from the piece counts.
    pub fn from_string(s: &str) -> Result<Self> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/')
            .collect();
        if cleaned.len() > 9 && cleaned.contains('_') {
            return Self::from_label(&cleaned);
        }

        let cells = parse_cells(&cleaned, s)?;
        let to_move = Self::turn_implied_by_counts(cells)?;
        Ok(BoardState { cells, to_move })
    }

    /// Parse the `"XO......._X"` form produced by [`BoardState::encode`].
    ///
    /// Live boards must have the player to move that the piece counts imply.
    /// Finished boards may name either player, since play has stopped.
    pub fn from_label(label: &str) -> Result<Self> {
        let (board, player) = label
            .rsplit_once('_')
            .ok_or_else(|| Error::MissingLabelPart {
                part: "player".to_string(),
                label: label.to_string(),
            })?;
        if board.chars().count() != 9 {
            return Err(Error::InvalidLabelFormat {
                label: label.to_string(),
                expected: LABEL_SHAPE.to_string(),
            });
        }

        let cells = parse_cells(board, label)?;
        let to_move = player.parse::<Player>().map_err(|_| Error::InvalidPlayerString {
            player: player.to_string(),
            label: label.to_string(),
        })?;
        let implied = Self::turn_implied_by_counts(cells)?;
        let state = BoardState { cells, to_move };

        if state.has_won(Player::X) && state.has_won(Player::O) {
            return Err(Error::invalid_config(format!(
                "board label '{label}' has lines for both players"
            )));
        }
        if implied != to_move && !state.is_terminal() {
            return Err(Error::invalid_config(format!(
                "board label '{label}' names {} to move but the counts imply {}",
                to_move.to_char(),
                implied.to_char()
            )));
        }
        Ok(state)
    }

    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Empty cells in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        (0..9).filter(|&pos| self.is_empty(pos)).collect()
    }

    /// Place the mover's mark on `pos` and pass the turn
    #[must_use = "make_move returns a new board; the original is unchanged"]
    pub fn make_move(&self, pos: usize) -> Result<BoardState> {
        if pos >= 9 || !self.is_empty(pos) {
            return Err(Error::InvalidMove { position: pos });
        }
        let mut next = *self;
        next.cells[pos] = self.to_move.to_cell();
        next.to_move = self.to_move.opponent();
        Ok(next)
    }

    /// Empty cells while the game is live, nothing once it is over.
    ///
    /// The ascending order here is the action order every solver breaks
    /// ties by.
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            Vec::new()
        } else {
            self.empty_positions()
        }
    }

    /// Cells that would complete a line for `player` right now
    pub fn winning_moves(&self, player: Player) -> Vec<usize> {
        LineAnalyzer::winning_moves(&self.cells, player)
    }

    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    pub fn winner(&self) -> Option<Player> {
        [Player::X, Player::O]
            .into_iter()
            .find(|&player| self.has_won(player))
    }

    /// Table key form, e.g. `"X...O...._X"`
    pub fn encode(&self) -> String {
        let mut label: String = self.cells.iter().map(|c| c.to_char()).collect();
        label.push('_');
        label.push(self.to_move.to_char());
        label
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for BoardState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl fmt::Debug for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoardState({})", self.encode())
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .cells
            .chunks(3)
            .map(|row| row.iter().map(|c| c.to_char()).collect())
            .collect();
        f.write_str(&rows.join("\n"))
    }
}
