//! Minimax AI 策略
//!
//! 白方取最大、黑方取最小的 Alpha-Beta 搜索。每个节点在自己的棋盘克隆上执行走法，
//! 兄弟分支之间不共享状态。
//!
//! 形成 mil 时只考虑第一个候选 mil，并穷举对方所有可吃棋子；
//! 吃子选择之间不做剪枝（只把当前窗口传给子节点）。

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use log::debug;

use super::{evaluate, sort_and_truncate, AIConfig, AIStrategy, Capture, Decision, ScoredMove, NODE_COUNT};
use crate::board::Board;
use crate::types::{Color, MilMove};

/// 最大搜索深度
pub const MAX_DEPTH: u32 = 8;

/// Minimax AI - 使用 Alpha-Beta 剪枝
pub struct MinimaxAI {
    depth: u32,
    time_limit: Option<Duration>,
    start_time: Option<Instant>,
}

impl MinimaxAI {
    pub fn new(config: &AIConfig) -> Self {
        MinimaxAI {
            depth: config.depth.clamp(1, MAX_DEPTH),
            time_limit: config.time_limit.map(Duration::from_secs_f64),
            start_time: None,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// 检查是否超时
    fn is_timeout(&self) -> bool {
        if let (Some(limit), Some(start)) = (self.time_limit, self.start_time) {
            start.elapsed() >= limit
        } else {
            false
        }
    }

    /// 搜索入口：返回 (分值, 最佳决策)，分值以白方为正
    pub fn minimax(
        &self,
        board: &Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> (i32, Option<Decision>) {
        NODE_COUNT.fetch_add(1, Ordering::Relaxed);

        if depth == 0 || !board.is_playing() {
            return (evaluate(board), None);
        }

        let legal_moves = board.get_legal_moves();
        if legal_moves.is_empty() {
            return (evaluate(board), None);
        }

        let maximizing = board.current_turn() == Color::White;
        let mut best_value = if maximizing { i32::MIN } else { i32::MAX };
        let mut best: Option<Decision> = None;

        for mv in legal_moves {
            // 超时后保留已搜索到的最佳走法
            if best.is_some() && self.is_timeout() {
                break;
            }

            let (value, capture) = self.search_move(board, &mv, depth, alpha, beta);

            let better = if maximizing {
                value > best_value
            } else {
                value < best_value
            };
            if better || best.is_none() {
                best_value = value;
                best = Some(Decision { mv, capture });
            }

            if maximizing {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            if beta <= alpha {
                break; // Alpha-Beta 剪枝
            }
        }

        (best_value, best)
    }

    /// 在克隆上执行一步（含吃子选择），返回该走法的分值
    fn search_move(
        &self,
        board: &Board,
        mv: &MilMove,
        depth: u32,
        alpha: i32,
        beta: i32,
    ) -> (i32, Option<Capture>) {
        let mover = board.current_turn();
        let mut child = board.clone();
        let result = child.apply_move(mv);
        debug_assert!(result.is_applied(), "generated move {} was rejected", mv);

        let mil = match result.mil_choices().first() {
            Some(&mil) => mil,
            None => {
                child.switch_turn();
                let (value, _) = self.minimax(&child, depth - 1, alpha, beta);
                return (value, None);
            }
        };

        let targets = child.removable_pieces(mover.opposite());
        if targets.is_empty() {
            let resolved = child.resolve_capture(&mil, None);
            debug_assert!(resolved);
            child.switch_turn();
            let (value, _) = self.minimax(&child, depth - 1, alpha, beta);
            return (value, Some(Capture { mil, target: None }));
        }

        let maximizing = mover == Color::White;
        let mut best_value = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_target = targets[0];

        for target in targets {
            let mut captured = child.clone();
            let resolved = captured.resolve_capture(&mil, Some(target));
            debug_assert!(resolved);
            captured.switch_turn();

            let (value, _) = self.minimax(&captured, depth - 1, alpha, beta);
            let better = if maximizing {
                value > best_value
            } else {
                value < best_value
            };
            if better {
                best_value = value;
                best_target = target;
            }
        }

        (
            best_value,
            Some(Capture {
                mil,
                target: Some(best_target),
            }),
        )
    }

    /// 重置计时起点
    fn start_clock(&mut self) {
        self.start_time = Some(Instant::now());
    }
}

impl AIStrategy for MinimaxAI {
    fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove> {
        self.start_clock();

        let color = board.current_turn();
        let moves = board.get_legal_moves();

        // 每个根走法用完整窗口搜索，得到精确分值用于排序
        let mut scored: Vec<ScoredMove> = moves
            .into_iter()
            .map(|mv| {
                let (value, capture) =
                    self.search_move(board, &mv, self.depth, i32::MIN, i32::MAX);
                ScoredMove {
                    decision: Decision { mv, capture },
                    score: value * color.sign(),
                }
            })
            .collect();

        sort_and_truncate(&mut scored, n);
        scored
    }

    fn select_best_move(&mut self, board: &Board) -> Option<Decision> {
        self.start_clock();

        let (value, best) = self.minimax(board, self.depth, i32::MIN, i32::MAX);
        debug!(
            "minimax depth={} value={} best={:?} nodes={}",
            self.depth,
            value,
            best.map(|d| d.to_fen_str()),
            NODE_COUNT.load(Ordering::Relaxed)
        );
        best
    }
}
