//! AI 策略模块
//!
//! 提供随机走子和 Minimax（Alpha-Beta 剪枝）两种策略，按难度选择

mod eval;
mod minimax;
mod random;

pub use eval::{evaluate, evaluate_detail, EvalDetail};
pub use minimax::MinimaxAI;
pub use random::RandomAI;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::board::Board;
use crate::types::{Difficulty, Mil, MilMove, Position};

/// 全局节点计数器（仅用于统计）
pub static NODE_COUNT: AtomicU64 = AtomicU64::new(0);

/// 重置节点计数器
pub fn reset_node_count() {
    NODE_COUNT.store(0, AtomicOrdering::Relaxed);
}

/// 获取当前节点计数
pub fn get_node_count() -> u64 {
    NODE_COUNT.load(AtomicOrdering::Relaxed)
}

/// 可用策略名称
pub const AVAILABLE_STRATEGIES: &[&str] = &["random", "minimax", "easy", "medium", "hard"];

/// AI 配置
#[derive(Debug, Clone)]
pub struct AIConfig {
    /// 搜索深度
    pub depth: u32,
    /// 随机种子
    pub seed: Option<u64>,
    /// 时间限制（秒）
    pub time_limit: Option<f64>,
}

impl Default for AIConfig {
    fn default() -> Self {
        AIConfig {
            depth: 3,
            seed: None,
            time_limit: None,
        }
    }
}

impl AIConfig {
    /// 按难度生成配置
    pub fn for_difficulty(difficulty: Difficulty, seed: Option<u64>) -> Self {
        AIConfig {
            depth: difficulty.depth(),
            seed,
            time_limit: None,
        }
    }
}

/// 形成 mil 后的吃子选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub mil: Mil,
    /// 对方无子可吃时为 None
    pub target: Option<Position>,
}

/// AI 的一步完整决策：走法 + 可能的吃子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub mv: MilMove,
    pub capture: Option<Capture>,
}

impl Decision {
    /// 在棋盘上执行决策（不切换回合）
    ///
    /// 走法形成 mil 却没有吃子选择时，按第一个 mil 结算
    pub fn apply(&self, board: &mut Board) -> bool {
        let result = board.apply_move(&self.mv);
        if !result.is_applied() {
            return false;
        }
        match (result.mil_choices().first(), self.capture) {
            (None, _) => true,
            (Some(_), Some(capture)) => board.resolve_capture(&capture.mil, capture.target),
            (Some(&mil), None) => {
                let target = board
                    .removable_pieces(board.current_turn().opposite())
                    .first()
                    .copied();
                board.resolve_capture(&mil, target)
            }
        }
    }

    /// 文本形式：`c2c1` 或 `c2c1xd3`（无子可吃时 `x-`）
    pub fn to_fen_str(&self) -> String {
        match self.capture {
            None => self.mv.to_fen_str(),
            Some(Capture {
                target: Some(t), ..
            }) => format!("{}x{}", self.mv.to_fen_str(), t.to_fen_str()),
            Some(Capture { target: None, .. }) => format!("{}x-", self.mv.to_fen_str()),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_str())
    }
}

/// 走法评分（走子方视角，越大越好）
#[derive(Debug, Clone)]
pub struct ScoredMove {
    pub decision: Decision,
    pub score: i32,
}

/// AI 策略接口
pub trait AIStrategy {
    /// 选择走法（返回带评分的走法列表）
    fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove>;

    /// 选择最佳走法
    fn select_best_move(&mut self, board: &Board) -> Option<Decision> {
        self.select_moves(board, 1).first().map(|sm| sm.decision)
    }
}

/// 排序辅助函数（稳定排序，同分保持生成顺序）
pub(crate) fn sort_and_truncate(scored: &mut Vec<ScoredMove>, n: usize) {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(n);
}

/// AI 引擎 - 统一的 AI 接口
pub struct AIEngine {
    strategy: Box<dyn AIStrategy>,
}

impl AIEngine {
    /// 创建随机 AI
    pub fn random(seed: Option<u64>) -> Self {
        AIEngine {
            strategy: Box::new(RandomAI::new(seed)),
        }
    }

    /// 创建 Minimax AI
    pub fn minimax(config: &AIConfig) -> Self {
        AIEngine {
            strategy: Box::new(MinimaxAI::new(config)),
        }
    }

    /// 按难度创建：easy 随机，medium/hard 为不同深度的 Minimax
    pub fn from_difficulty(difficulty: Difficulty, seed: Option<u64>) -> Self {
        match difficulty {
            Difficulty::Easy => Self::random(seed),
            Difficulty::Medium | Difficulty::Hard => {
                Self::minimax(&AIConfig::for_difficulty(difficulty, seed))
            }
        }
    }

    /// 从策略名称创建
    pub fn from_strategy(name: &str, config: &AIConfig) -> Result<Self, String> {
        match name.to_lowercase().as_str() {
            "random" => Ok(Self::random(config.seed)),
            "minimax" => Ok(Self::minimax(config)),
            other => match other.parse::<Difficulty>() {
                Ok(difficulty) => Ok(Self::from_difficulty(difficulty, config.seed)),
                Err(_) => Err(format!(
                    "Unknown strategy: {}. Available: {}",
                    name,
                    AVAILABLE_STRATEGIES.join(", ")
                )),
            },
        }
    }

    /// 选择 AI 的下一步
    pub fn choose_move(&mut self, board: &Board) -> Option<Decision> {
        self.strategy.select_best_move(board)
    }

    /// 返回前 n 个走法及评分
    pub fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove> {
        self.strategy.select_moves(board, n)
    }

    /// 从 FEN 选择走法（返回带评分的走法字符串）
    pub fn select_moves_fen(&mut self, fen: &str, n: usize) -> Result<Vec<(String, i32)>, String> {
        let board = Board::from_fen(fen)?;
        let moves = self.strategy.select_moves(&board, n);
        Ok(moves
            .into_iter()
            .map(|sm| (sm.decision.to_fen_str(), sm.score))
            .collect())
    }

    /// 从 FEN 选择最佳走法
    pub fn select_best_move_fen(&mut self, fen: &str) -> Result<Option<String>, String> {
        let board = Board::from_fen(fen)?;
        Ok(self
            .strategy
            .select_best_move(&board)
            .map(|d| d.to_fen_str()))
    }
}
