//! 随机 AI 策略

use super::{sort_and_truncate, AIStrategy, Capture, Decision, ScoredMove};
use crate::board::Board;
use crate::types::MilMove;
use rand::prelude::*;

/// 随机 AI - 随机选择合法走法，形成 mil 时随机吃子
pub struct RandomAI {
    rng: StdRng,
}

impl RandomAI {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        RandomAI { rng }
    }

    /// 走法形成 mil 时，取第一个 mil 并随机选择吃子目标
    fn random_capture(&mut self, board: &Board, mv: &MilMove) -> Option<Capture> {
        let mut child = board.clone();
        let result = child.apply_move(mv);
        let mil = *result.mil_choices().first()?;
        let targets = child.removable_pieces(board.current_turn().opposite());
        Some(Capture {
            mil,
            target: targets.choose(&mut self.rng).copied(),
        })
    }
}

impl AIStrategy for RandomAI {
    fn select_moves(&mut self, board: &Board, n: usize) -> Vec<ScoredMove> {
        let moves = board.get_legal_moves();

        let mut scored: Vec<ScoredMove> = moves
            .into_iter()
            .map(|mv| {
                let capture = self.random_capture(board, &mv);
                ScoredMove {
                    decision: Decision { mv, capture },
                    score: self.rng.gen_range(0..1000),
                }
            })
            .collect();

        sort_and_truncate(&mut scored, n);
        scored
    }

    fn select_best_move(&mut self, board: &Board) -> Option<Decision> {
        let moves = board.get_legal_moves();
        let mv = *moves.choose(&mut self.rng)?;
        let capture = self.random_capture(board, &mv);
        Some(Decision { mv, capture })
    }
}
