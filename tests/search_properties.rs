use draughts_engine::{candidate_boards, Board, Engine, Piece, SearchPolicy, Side, Square};

fn engine(depth: u32, mandatory_jumping: bool) -> Engine {
    Engine::new(SearchPolicy { depth, mandatory_jumping })
}

fn board_from_rows(rows: [&str; 8]) -> Board {
    serde_json::from_value(serde_json::json!(rows)).unwrap()
}

fn midgame() -> Board {
    board_from_rows([
        ".w.w....",
        "......w.",
        ".w...w.w",
        "..b.W...",
        ".b...b..",
        "b.....b.",
        "...B...b",
        "........",
    ])
}

fn total_pieces(board: &Board) -> usize {
    board.pieces_left(Side::Black) as usize + board.pieces_left(Side::White) as usize
}

fn squares(board: &Board, side: Side) -> Vec<Square> {
    board.pieces(side).map(|piece| piece.square()).collect()
}

// plain minimax over the same move lists, no pruning
fn minimax(engine: &Engine, board: &Board, depth: u32, maximizing: bool, mandatory_jumping: bool) -> f64 {
    if depth == 0 {
        return engine.eval(board);
    }
    let children = candidate_boards(board, Side::from_maximizing(maximizing), mandatory_jumping);
    if children.is_empty() {
        return engine.eval(board);
    }
    let scores = children
        .iter()
        .map(|child| minimax(engine, child, depth - 1, !maximizing, mandatory_jumping));
    if maximizing {
        scores.fold(f64::NEG_INFINITY, f64::max)
    } else {
        scores.fold(f64::INFINITY, f64::min)
    }
}

fn has_capture(board: &Board, side: Side) -> bool {
    board
        .pieces(side)
        .any(|piece| board.get_valid_moves(&piece).values().any(|captured| !captured.is_empty()))
}

#[test]
fn pruning_does_not_change_the_root_score() {
    for (board, mandatory_jumping) in [(Board::new(), true), (midgame(), true), (midgame(), false)] {
        for depth in 1..=4 {
            for maximizing in [true, false] {
                let mut pruned = engine(depth, mandatory_jumping);
                let score = pruned.search(&board, depth, f64::NEG_INFINITY, f64::INFINITY, maximizing);
                let expected = minimax(&pruned, &board, depth, maximizing, mandatory_jumping);
                assert_eq!(score, expected, "depth {} maximizing {}", depth, maximizing);
            }
        }
    }
}

#[test]
fn best_move_score_matches_minimax() {
    for depth in 1..=3 {
        for side in [Side::Black, Side::White] {
            let mut engine = engine(depth, true);
            let (best, score) = engine.best_move_with_score(&midgame(), side).unwrap();
            let expected = minimax(&engine, &midgame(), depth, side.is_maximizing(), true);
            assert_eq!(score, expected);
            assert_eq!(minimax(&engine, &best, depth - 1, !side.is_maximizing(), true), score);
        }
    }
}

#[test]
fn piece_count_never_increases() {
    let mut board = Board::new();
    let mut side = Side::Black;
    let mut engine = engine(2, true);
    for _ in 0..40 {
        let before = total_pieces(&board);
        let Some(next) = engine.get_best_move(&board, side) else { break };
        let after = total_pieces(&next);
        assert!(after <= before);
        assert_eq!(after, squares(&next, Side::Black).len() + squares(&next, Side::White).len());
        board = next;
        side = side.opponent();
    }
}

#[test]
fn kings_stay_kings() {
    let board = board_from_rows([
        "........",
        "..b.....",
        "........",
        "........",
        "........",
        "........",
        "....w...",
        "........",
    ]);
    let mut engine = engine(1, true);
    let crowned = engine.get_best_move(&board, Side::Black).unwrap();
    assert_eq!(crowned.kings(Side::Black), 1);

    let mut board = crowned;
    let mut side = Side::White;
    for _ in 0..12 {
        let Some(next) = engine.get_best_move(&board, side) else { break };
        assert_eq!(next.kings(Side::Black), next.pieces_left(Side::Black));
        assert!(next.pieces(Side::Black).all(|piece| piece.is_king()));
        board = next;
        side = side.opponent();
    }
}

#[test]
fn mandatory_jump_is_taken_at_every_depth() {
    // black can take on (3,4) but also has quiet moves elsewhere
    let board = board_from_rows([
        ".w.w....",
        "........",
        "........",
        "...w....",
        "....b...",
        "........",
        "b.....b.",
        "........",
    ]);
    assert!(has_capture(&board, Side::Black));
    for depth in 1..=4 {
        let best = engine(depth, true).get_best_move(&board, Side::Black).unwrap();
        assert_eq!(best.pieces_left(Side::White), 2, "depth {}", depth);
        assert_eq!(best.get_piece(2, 2).map(|p| p.side()), Some(Side::Black));
    }
}

#[test]
fn candidates_under_mandatory_jump_are_all_captures() {
    let board = midgame();
    for side in [Side::Black, Side::White] {
        if !has_capture(&board, side) {
            continue;
        }
        let captured = board.pieces_left(side.opponent());
        for child in candidate_boards(&board, side, true) {
            assert_eq!(child.pieces_left(side.opponent()), captured - 1);
        }
    }
}

#[test]
fn no_legal_move_returns_none() {
    let mut board = Board::empty();
    board.place(Piece::new(5, 0, Side::Black));
    board.place(Piece::new(4, 1, Side::White));
    board.place(Piece::new(3, 2, Side::White));
    let mut engine = engine(3, true);
    assert!(engine.get_best_move(&board, Side::Black).is_none());
    assert!(engine.get_best_move(&Board::empty(), Side::White).is_none());
}

#[test]
fn opening_move_advances_one_piece() {
    let board = Board::new();
    let snapshot = board.clone();
    let best = engine(1, true).get_best_move(&board, Side::Black).unwrap();
    assert_eq!(board, snapshot);

    assert_eq!(best.pieces_left(Side::Black), 12);
    assert_eq!(best.pieces_left(Side::White), 12);
    assert_eq!(squares(&best, Side::White), squares(&board, Side::White));

    let before = squares(&board, Side::Black);
    let after = squares(&best, Side::Black);
    let vacated: Vec<_> = before.iter().filter(|sq| !after.contains(sq)).collect();
    let entered: Vec<_> = after.iter().filter(|sq| !before.contains(sq)).collect();
    assert_eq!(vacated.len(), 1);
    assert_eq!(entered.len(), 1);
    let ((from_row, from_col), (to_row, to_col)) = (*vacated[0], *entered[0]);
    assert_eq!(to_row + 1, from_row);
    assert_eq!(from_col.abs_diff(to_col), 1);
}

#[test]
fn lone_capture_is_taken() {
    let mut board = Board::empty();
    board.place(Piece::new(5, 2, Side::Black));
    board.place(Piece::new(4, 3, Side::White));
    let best = engine(1, true).get_best_move(&board, Side::Black).unwrap();
    assert_eq!(best.pieces_left(Side::White), 0);
    assert_eq!(best.get_piece(4, 3), None);
    assert_eq!(best.get_piece(3, 4).map(|p| p.side()), Some(Side::Black));
    assert_eq!(best.winner(), Some(Side::Black));
}
