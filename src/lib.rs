//! Mil Game AI Engine
//!
//! N×N 棋盘连线吃子游戏（mil）的规则引擎与 AI - 支持 FEN 输入输出

pub mod ai;
pub mod board;
pub mod fen;
pub mod test_positions;
pub mod types;

pub use ai::{
    evaluate, evaluate_detail, get_node_count, reset_node_count, AIConfig, AIEngine, AIStrategy,
    Capture, Decision, EvalDetail, MinimaxAI, RandomAI, ScoredMove, AVAILABLE_STRATEGIES,
};
pub use board::{get_legal_moves_from_fen, Board, GameConfig, MoveResult};
pub use fen::{apply_move_to_fen, parse_fen, FenState};
pub use types::{
    ActionType, Cell, Color, Difficulty, GameResult, Mil, MilMove, Phase, Position,
    DEFAULT_BOARD_SIZE, DEFAULT_STARTING_PIECES, DEFAULT_TURN_LIMIT, MAX_BOARD_SIZE, MIN_PIECES,
};
