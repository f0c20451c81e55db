use std::fs;
use std::io::{self, BufRead, Error, ErrorKind, Lines, StdinLock};
use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use serde_json::json;
use draughts_engine::{Board, Engine, SearchPolicy, Side, Square};

const SURRENDER_MARGIN: u8 = 7;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = 3, global = true)]
    depth: u32,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, global = true)]
    mandatory_jumping: bool,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board after the engine's move for one side
    Best {
        /// JSON array of 8 rows, e.g. ".w.w.w.w"
        #[arg(long)]
        board: PathBuf,
        #[arg(long, value_enum, default_value_t = SideArg::White)]
        side: SideArg,
    },
    /// Let the engine play both sides from the starting position
    SelfPlay {
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
    },
    /// Play black against the engine in the terminal
    Play,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideArg {
    Black,
    White,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Black => Side::Black,
            SideArg::White => Side::White,
        }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let level = if args.verbose { log::Level::Debug } else { log::Level::Info };
    simple_logger::init_with_level(level).map_err(|e| Error::new(ErrorKind::Other, e))?;

    let mut engine = Engine::new(SearchPolicy {
        depth: args.depth,
        mandatory_jumping: args.mandatory_jumping,
    });
    info!("Search policy: {:?}", engine.policy());

    match args.command {
        Command::Best { board, side } => best(&mut engine, &board, side.into()),
        Command::SelfPlay { max_turns } => self_play(&mut engine, max_turns),
        Command::Play => play(&mut engine),
    }
}

fn best(engine: &mut Engine, path: &Path, side: Side) -> Result<(), Error> {
    let board: Board = serde_json::from_str(&fs::read_to_string(path)?)?;
    let response = match engine.get_best_move(&board, side) {
        Some(next) => json!({ "move": next }),
        None => json!({ "move": null }),
    };
    println!("{}", response);
    Ok(())
}

fn self_play(engine: &mut Engine, max_turns: u32) -> Result<(), Error> {
    let mut board = Board::new();
    let mut side = Side::Black;
    for turn in 1..=max_turns {
        if let Some(winner) = board.winner() {
            println!("{}", json!({ "winner": winner }));
            return Ok(());
        }
        match engine.get_best_move(&board, side) {
            Some(next) => board = next,
            None => {
                println!("{}", json!({ "winner": side.opponent() }));
                return Ok(());
            }
        }
        println!("{}", json!({ "turn": turn, "side": side, "board": board }));
        side = side.opponent();
    }
    warn!("No winner after {} turns", max_turns);
    println!("{}", json!({ "winner": null }));
    Ok(())
}

fn play(engine: &mut Engine) -> Result<(), Error> {
    let mut lines = io::stdin().lock().lines();
    let mut board = Board::new();
    let mut players_turn = true;
    loop {
        println!("\n{}", board);
        if let Some(winner) = board.winner() {
            println!("{}", if winner == Side::Black { "You win!" } else { "You lose!" });
            return Ok(());
        }

        if players_turn {
            println!("Your move (from row, from col, to row, to col):");
            let Some(line) = lines.next() else { return Ok(()) };
            match player_move(&board, &line?, engine.policy().mandatory_jumping) {
                Ok(next) => board = next,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            }
            let behind = board.pieces_left(Side::White).saturating_sub(board.pieces_left(Side::Black));
            if behind >= SURRENDER_MARGIN && offer_surrender(&mut lines)? {
                println!("Game surrendered.");
                return Ok(());
            }
        } else {
            println!("Thinking...");
            match engine.get_best_move(&board, Side::White) {
                Some(next) => board = next,
                None => {
                    println!("Computer has no moves. You win!");
                    return Ok(());
                }
            }
        }
        players_turn = !players_turn;
    }
}

fn offer_surrender(lines: &mut Lines<StdinLock<'static>>) -> Result<bool, Error> {
    println!("You are far behind. Do you want to surrender? (yes/no):");
    let answer = match lines.next() {
        Some(line) => line?,
        None => return Ok(true),
    };
    Ok(matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes"))
}

fn parse_squares(line: &str) -> Result<(Square, Square), Error> {
    let numbers = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok().filter(|n| *n < 8))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Squares are numbers from 0 to 7"))?;
    match numbers[..] {
        [from_row, from_col, to_row, to_col] => Ok(((from_row, from_col), (to_row, to_col))),
        _ => Err(Error::new(ErrorKind::InvalidInput, "Expected four numbers")),
    }
}

fn player_move(board: &Board, line: &str, mandatory_jumping: bool) -> Result<Board, Error> {
    let ((from_row, from_col), dest) = parse_squares(line)?;
    let piece = board
        .get_piece(from_row, from_col)
        .filter(|piece| piece.side() == Side::Black)
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "No black piece on that square"))?;
    let moves = board.get_valid_moves(&piece);
    let captured = moves
        .get(&dest)
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Illegal move"))?;
    if mandatory_jumping && captured.is_empty() {
        let can_jump = board
            .pieces(Side::Black)
            .any(|piece| board.get_valid_moves(&piece).values().any(|captured| !captured.is_empty()));
        if can_jump {
            return Err(Error::new(ErrorKind::InvalidInput, "A capture is available and must be taken"));
        }
    }
    Ok(board.with_move(&piece, dest, captured))
}
