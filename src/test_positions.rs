//! Mil 测试局面库
//!
//! 提供命名的 FEN 测试局面，方便测试、基准和调试
//!
//! 命名规范:
//! - START_n: 初始局面
//! - PLACING_n: 落子阶段
//! - MOVING_n: 移动阶段
//! - FLYING_n: 飞子阶段
//! - MIL_n: mil / 吃子测试
//! - END_n: 终局（胜负或和棋）

// =============================================================================
// 初始局面 (START)
// =============================================================================

/// 默认 8×8，每方 9 子
pub const START: &str = "8/8/8/8/8/8/8/8 9:9 -:- w 0";

/// 5×5，每方 4 子（小棋盘，深度搜索可承受）
pub const START_SMALL: &str = "5/5/5/5/5 4:4 -:- w 0";

/// 4×4，每方 3 子
pub const START_TINY: &str = "4/4/4/4 3:3 -:- w 0";

// =============================================================================
// 落子阶段 (PLACING)
// =============================================================================

/// 双方各落三子，无 mil
pub const PLACING_1: &str = "w1b5/1w6/2wb4/8/3b4/8/8/8 6:6 -:- w 6";

/// 白方落 c1 即成 mil，黑方 a8 可被吃
pub const PLACING_2: &str = "ww6/8/8/8/8/8/8/b7 1:3 -:- w 4";

// =============================================================================
// 移动阶段 (MOVING)
// =============================================================================

/// 双方各 4 子，分处两角
pub const MOVING_1: &str = "ww6/ww6/8/8/8/8/6bb/6bb 0:0 -:- w 10";

/// 白方已有一个 mil，黑方走
pub const MOVING_2: &str = "WWW5/b7/1b2w3/8/3b4/8/5w2/bb2w3 0:0 a1b1c1:- b 40";

// =============================================================================
// 飞子阶段 (FLYING)
// =============================================================================

/// 白方三子飞行，黑方四子移动
pub const FLYING_1: &str = "www5/8/8/8/8/8/8/bbbb4 0:0 -:- w 10";

/// 双方都只剩三子
pub const FLYING_2: &str = "w7/1w6/2w5/8/8/5b2/6b1/7b 0:0 -:- b 50";

// =============================================================================
// mil / 吃子 (MIL)
// =============================================================================

/// 4×4：白方 c2c1 成 mil，吃 b4 最优
pub const MIL_1: &str = "ww2/2w1/1b2/bb1b 0:0 -:- w 10";

/// 白方全部在 mil 中，黑方成 mil 后无子可吃
pub const MIL_2: &str = "WWW5/8/8/8/8/8/b7/1bb5 0:0 a1b1c1:- b 20";

// =============================================================================
// 终局 (END)
// =============================================================================

/// 黑方只剩两子，白胜
pub const END_1: &str = "www5/8/8/8/8/8/8/bb6 0:0 -:- w 40";

/// 距回合上限一步
pub const END_2: &str = "www5/8/8/8/8/8/8/bbbbb3 0:0 -:- w 9/10";

pub const START_POSITIONS: &[&str] = &[START, START_SMALL, START_TINY];
pub const PLACING_POSITIONS: &[&str] = &[PLACING_1, PLACING_2];
pub const MOVING_POSITIONS: &[&str] = &[MOVING_1, MOVING_2];
pub const FLYING_POSITIONS: &[&str] = &[FLYING_1, FLYING_2];
pub const MIL_POSITIONS: &[&str] = &[MIL_1, MIL_2];
pub const END_POSITIONS: &[&str] = &[END_1, END_2];

/// 所有局面
pub fn all_positions() -> Vec<&'static str> {
    [
        START_POSITIONS,
        PLACING_POSITIONS,
        MOVING_POSITIONS,
        FLYING_POSITIONS,
        MIL_POSITIONS,
        END_POSITIONS,
    ]
    .concat()
}
