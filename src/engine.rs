use log::{debug, info};
use crate::board::{Board, Side};

/// Material value of a king on top of the man it was promoted from.
pub const KING_WEIGHT: f64 = 1.5;
/// Score of a decided game, `+` when black has won.
pub const WIN_SCORE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPolicy {
    pub depth: u32,
    /// Captures are the only legal moves at a ply where any capture exists.
    pub mandatory_jumping: bool,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self { depth: 3, mandatory_jumping: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    pub nodes: u64,
    /// Score of the chosen move, `None` when there was nothing to choose.
    pub score: Option<f64>,
}

/// Boards reachable by one move of `side`, captures first.
///
/// With `mandatory_jumping` set, simple moves are dropped whenever a capture exists.
pub fn candidate_boards(board: &Board, side: Side, mandatory_jumping: bool) -> Vec<Board> {
    let mut jumps = Vec::new();
    let mut steps = Vec::new();
    for piece in board.pieces(side) {
        for (dest, captured) in board.get_valid_moves(&piece) {
            let child = board.with_move(&piece, dest, &captured);
            if captured.is_empty() {
                steps.push(child);
            } else {
                jumps.push(child);
            }
        }
    }
    if !(mandatory_jumping && !jumps.is_empty()) {
        jumps.append(&mut steps);
    }
    jumps
}

pub struct Engine {
    policy: SearchPolicy,
    stats: SearchStats,
}

impl Engine {
    pub fn new(policy: SearchPolicy) -> Self {
        Self {
            policy,
            stats: SearchStats::default(),
        }
    }

    pub fn policy(&self) -> SearchPolicy {
        self.policy
    }

    /// Counters of the last `get_best_move` call.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn eval(&self, board: &Board) -> f64 {
        match board.winner() {
            Some(Side::Black) => WIN_SCORE,
            Some(Side::White) => -WIN_SCORE,
            None => Self::material(board, Side::Black) - Self::material(board, Side::White),
        }
    }

    fn material(board: &Board, side: Side) -> f64 {
        board.pieces_left(side) as f64 + KING_WEIGHT * board.kings(side) as f64
    }

    /// Minimax value of `board` with `maximizing` (black) or white to move.
    pub fn search(&mut self, board: &Board, depth: u32, mut alpha: f64, mut beta: f64, maximizing: bool) -> f64 {
        self.stats.nodes += 1;
        if depth == 0 {
            return self.eval(board);
        }

        let children = candidate_boards(board, Side::from_maximizing(maximizing), self.policy.mandatory_jumping);
        if children.is_empty() {
            return self.eval(board);
        }

        let mut best = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };
        for child in &children {
            let score = self.search(child, depth - 1, alpha, beta, !maximizing);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }

    pub fn get_best_move(&mut self, board: &Board, side: Side) -> Option<Board> {
        self.best_move_with_score(board, side).map(|(best, _)| best)
    }

    /// Like `get_best_move`, also returning the minimax score of the chosen board.
    pub fn best_move_with_score(&mut self, board: &Board, side: Side) -> Option<(Board, f64)> {
        self.stats = SearchStats::default();
        let maximizing = side.is_maximizing();
        let children = candidate_boards(board, side, self.policy.mandatory_jumping);
        debug!("{} to move, {} candidate moves at depth {}", side, children.len(), self.policy.depth);

        let mut best: Option<(Board, f64)> = None;
        for (i, child) in children.into_iter().enumerate() {
            // every root candidate gets a full window
            let score = self.search(
                &child,
                self.policy.depth.saturating_sub(1),
                f64::NEG_INFINITY,
                f64::INFINITY,
                !maximizing,
            );
            debug!("candidate {} scored {}", i, score);
            let better = match &best {
                None => true,
                Some((_, best_score)) => if maximizing { score > *best_score } else { score < *best_score },
            };
            if better {
                best = Some((child, score));
            }
        }

        self.stats.score = best.as_ref().map(|(_, score)| *score);
        match &self.stats.score {
            Some(score) => info!("{} best score {} after {} nodes", side, score, self.stats.nodes),
            None => info!("{} has no legal move", side),
        }
        best
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SearchPolicy::default())
    }
}
