//! 静态评估
//!
//! 分数以白方为正：子数差 + 相邻同色对 + mil 数，权重固定

use crate::board::Board;
use crate::types::{Cell, Color};

/// 子数权重
pub const PIECE_FACTOR: i32 = 1;
/// 相邻同色对权重
pub const PAIR_FACTOR: i32 = 2;
/// mil 权重
pub const MIL_FACTOR: i32 = 10;

/// 评估各项（白方减黑方）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalDetail {
    pub pieces: i32,
    pub pairs: i32,
    pub mils: i32,
}

impl EvalDetail {
    pub fn total(&self) -> i32 {
        PIECE_FACTOR * self.pieces + PAIR_FACTOR * self.pairs + MIL_FACTOR * self.mils
    }
}

/// 横竖相邻的普通同色棋子对数（白方减黑方）
///
/// mil 中的棋子不计入
fn count_pairs(board: &Board) -> i32 {
    let size = board.size();
    let cells = board.cells();
    let mut pairs = 0;

    for row in 0..size {
        for col in 0..size {
            let sign = match cells[row * size + col] {
                Cell::White => 1,
                Cell::Black => -1,
                _ => continue,
            };
            let cell = cells[row * size + col];
            if col + 1 < size && cells[row * size + col + 1] == cell {
                pairs += sign;
            }
            if row + 1 < size && cells[(row + 1) * size + col] == cell {
                pairs += sign;
            }
        }
    }

    pairs
}

/// 各项评估明细
pub fn evaluate_detail(board: &Board) -> EvalDetail {
    EvalDetail {
        pieces: board.pieces(Color::White) as i32 - board.pieces(Color::Black) as i32,
        pairs: count_pairs(board),
        mils: board.mils(Color::White).len() as i32 - board.mils(Color::Black).len() as i32,
    }
}

/// 静态评估（白方为正）
#[inline]
pub fn evaluate(board: &Board) -> i32 {
    evaluate_detail(board).total()
}
