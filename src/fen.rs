//! FEN 解析和生成
//!
//! 格式: `<棋盘> <手中子> <mil> <回合> <回合数>[/<回合上限>] [<阶段>]`
//!
//! 棋盘符号（从第 1 行开始，行之间用 `/` 分隔）：
//! - 白方：w（普通） W（mil 中）
//! - 黑方：b（普通） B（mil 中）
//! - 空格：十进制数字
//!
//! 手中子：`<白>:<黑>`
//!
//! mil：`<白>:<黑>`，每方用逗号分隔，每个 mil 写三个坐标（如 `a1b1c1`），没有时写 `-`
//!
//! 阶段：`<白>:<黑>`，p（落子） m（移动） f（飞子）。省略时由子数推导：
//! 手中有子为落子，否则棋盘上不超过三子为飞子，其余为移动。
//! 只有实际阶段与推导不同时才写出（例如落完最后一子时只剩三子）

use crate::board::Board;
use crate::types::{
    Cell, Color, Mil, MilMove, Phase, Position, DEFAULT_TURN_LIMIT, MAX_BOARD_SIZE,
};

/// FEN 解析后的状态
#[derive(Debug, Clone)]
pub struct FenState {
    pub size: usize,
    pub cells: Vec<Cell>,
    pub hands: [u32; 2],
    pub mils: [Vec<Mil>; 2],
    /// 显式写出的阶段
    pub phases: Option<[Phase; 2]>,
    pub turn: Color,
    pub turn_count: u32,
    pub turn_limit: u32,
}

/// 解析 FEN 字符串
pub fn parse_fen(fen: &str) -> Result<FenState, String> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 5 && parts.len() != 6 {
        return Err(format!(
            "Invalid FEN format: expected '<board> <hands> <mils> <turn> <turns> [<phases>]', got: {}",
            fen
        ));
    }

    let (size, cells) = parse_board(parts[0])?;
    let hands = parse_hands(parts[1])?;
    // 手中子不可能超过格子数
    if hands.iter().any(|&h| h as usize > size * size) {
        return Err(format!(
            "Invalid hands: {} exceeds {} cells",
            parts[1],
            size * size
        ));
    }
    let mils = parse_mils(parts[2])?;
    let mut turn_chars = parts[3].chars();
    let turn = match (turn_chars.next().and_then(Color::from_fen_char), turn_chars.next()) {
        (Some(color), None) => color,
        _ => return Err(format!("Invalid turn: {}", parts[3])),
    };
    let (turn_count, turn_limit) = parse_turns(parts[4])?;
    let phases = match parts.get(5) {
        Some(s) => Some(parse_phases(s)?),
        None => None,
    };

    Ok(FenState {
        size,
        cells,
        hands,
        mils,
        phases,
        turn,
        turn_count,
        turn_limit,
    })
}

/// 解析棋盘字符串，返回边长和行优先格子
fn parse_board(board_str: &str) -> Result<(usize, Vec<Cell>), String> {
    let rows: Vec<&str> = board_str.split('/').collect();
    let size = rows.len();
    if !(3..=MAX_BOARD_SIZE).contains(&size) {
        return Err(format!(
            "Invalid board: expected 3..={} rows, got {}",
            MAX_BOARD_SIZE, size
        ));
    }

    let mut cells = Vec::with_capacity(size * size);

    for (row, row_str) in rows.iter().enumerate() {
        let mut col = 0usize;
        let mut run = 0usize;

        for ch in row_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                run = run
                    .checked_mul(10)
                    .and_then(|r| r.checked_add(d as usize))
                    .filter(|&r| col + r <= size)
                    .ok_or_else(|| format!("Row {} is wider than {}", row + 1, size))?;
                continue;
            }
            if run > 0 {
                cells.extend(std::iter::repeat(Cell::Empty).take(run));
                col += run;
                run = 0;
            }
            let cell =
                Cell::from_fen_char(ch).ok_or_else(|| format!("Invalid character in board: {}", ch))?;
            if col >= size {
                return Err(format!("Row {} is wider than {}", row + 1, size));
            }
            cells.push(cell);
            col += 1;
        }
        if run > 0 {
            cells.extend(std::iter::repeat(Cell::Empty).take(run));
            col += run;
        }

        if col != size {
            return Err(format!(
                "Row {} has {} columns, expected {}",
                row + 1,
                col,
                size
            ));
        }
    }

    Ok((size, cells))
}

fn parse_count(s: &str, what: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Invalid {}: {}", what, s))
}

/// 解析手中子 `<白>:<黑>`
fn parse_hands(hands_str: &str) -> Result<[u32; 2], String> {
    let (white, black) = hands_str
        .split_once(':')
        .ok_or_else(|| format!("Invalid hands format: {}", hands_str))?;
    Ok([parse_count(white, "hand")?, parse_count(black, "hand")?])
}

/// 解析 mil 列表 `<白>:<黑>`
fn parse_mils(mils_str: &str) -> Result<[Vec<Mil>; 2], String> {
    let (white, black) = mils_str
        .split_once(':')
        .ok_or_else(|| format!("Invalid mils format: {}", mils_str))?;

    let parse_side = |side: &str| -> Result<Vec<Mil>, String> {
        if side == "-" {
            return Ok(Vec::new());
        }
        side.split(',')
            .map(|m| Mil::from_fen_str(m).ok_or_else(|| format!("Invalid mil: {}", m)))
            .collect()
    };

    Ok([parse_side(white)?, parse_side(black)?])
}

/// 解析阶段 `<白>:<黑>`
fn parse_phases(phases_str: &str) -> Result<[Phase; 2], String> {
    let parse_one = |s: &str| -> Result<Phase, String> {
        let mut chars = s.chars();
        match (chars.next().and_then(Phase::from_fen_char), chars.next()) {
            (Some(phase), None) => Ok(phase),
            _ => Err(format!("Invalid phases: {}", phases_str)),
        }
    };
    let (white, black) = phases_str
        .split_once(':')
        .ok_or_else(|| format!("Invalid phases format: {}", phases_str))?;
    Ok([parse_one(white)?, parse_one(black)?])
}

/// 解析 `<回合数>[/<回合上限>]`
fn parse_turns(turns_str: &str) -> Result<(u32, u32), String> {
    match turns_str.split_once('/') {
        Some((count, limit)) => Ok((
            parse_count(count, "turn count")?,
            parse_count(limit, "turn limit")?,
        )),
        None => Ok((parse_count(turns_str, "turn count")?, DEFAULT_TURN_LIMIT)),
    }
}

/// 生成棋盘字符串
fn board_to_fen(board: &Board) -> String {
    let size = board.size();
    let mut rows = Vec::with_capacity(size);

    for row in board.cells().chunks(size) {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for cell in row {
            match cell.to_fen_char() {
                Some(ch) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(ch);
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    rows.join("/")
}

fn mils_to_fen(mils: &[Mil]) -> String {
    if mils.is_empty() {
        "-".to_string()
    } else {
        mils.iter()
            .map(|m| m.to_fen_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Board {
    /// 从 FEN 字符串创建棋盘，并检查局面一致性
    pub fn from_fen(fen: &str) -> Result<Board, String> {
        let state = parse_fen(fen)?;
        let board = Board::from_parts(
            state.size,
            state.cells,
            state.hands,
            state.mils,
            state.phases,
            state.turn,
            state.turn_count,
            state.turn_limit,
        );
        board.check_invariants()?;
        Ok(board)
    }

    /// 生成 FEN 字符串
    pub fn to_fen(&self) -> String {
        let turns = if self.turn_limit() == DEFAULT_TURN_LIMIT {
            self.turn_count().to_string()
        } else {
            format!("{}/{}", self.turn_count(), self.turn_limit())
        };
        let mut fen = format!(
            "{} {}:{} {}:{} {} {}",
            board_to_fen(self),
            self.hand(Color::White),
            self.hand(Color::Black),
            mils_to_fen(self.mils(Color::White)),
            mils_to_fen(self.mils(Color::Black)),
            self.current_turn().to_fen_char(),
            turns
        );
        let derived = Color::ALL
            .iter()
            .all(|&c| self.phase(c) == Board::default_phase(self.hand(c), self.pieces(c)));
        if !derived {
            fen.push_str(&format!(
                " {}:{}",
                self.phase(Color::White).to_fen_char(),
                self.phase(Color::Black).to_fen_char()
            ));
        }
        fen
    }
}

/// 在 FEN 上执行走法（含可选吃子）并切换回合，返回新的 FEN
///
/// `capture` 为 `(mil 序号, 吃子坐标)`；形成 mil 但未给出时，
/// 选第一个 mil，并仅在对方无子可吃时接受
pub fn apply_move_to_fen(
    fen: &str,
    move_str: &str,
    capture: Option<(usize, Option<&str>)>,
) -> Result<String, String> {
    let mut board = Board::from_fen(fen)?;
    let mv: MilMove = move_str.parse()?;

    let result = board.apply_move(&mv);
    if !result.is_applied() {
        return Err(format!("Illegal move: {}", move_str));
    }

    let mils = result.mil_choices();
    if !mils.is_empty() {
        let (idx, target) = capture.unwrap_or((0, None));
        let mil = mils
            .get(idx)
            .ok_or_else(|| format!("Invalid mil index: {}", idx))?;
        let target = match target {
            Some(t) => Some(
                Position::from_fen_str(t)
                    .ok_or_else(|| format!("Invalid capture square: {}", t))?,
            ),
            None => None,
        };
        if !board.resolve_capture(mil, target) {
            return Err(format!("Illegal capture: {:?}", target.map(|t| t.to_fen_str())));
        }
    }

    board.switch_turn();
    Ok(board.to_fen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameResult, Phase};

    #[test]
    fn test_parse_initial_fen() {
        let fen = "8/8/8/8/8/8/8/8 9:9 -:- w 0";
        let state = parse_fen(fen).unwrap();

        assert_eq!(state.size, 8);
        assert_eq!(state.cells.len(), 64);
        assert!(state.cells.iter().all(|c| c.is_empty()));
        assert_eq!(state.hands, [9, 9]);
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.turn_limit, DEFAULT_TURN_LIMIT);

        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board, Board::new(8, 9));
    }

    #[test]
    fn test_parse_mid_game_fen() {
        let fen = "WWW5/8/2b5/8/8/3w4/8/bb6 2:3 a1b1c1:- b 12/40";
        let board = Board::from_fen(fen).unwrap();

        assert_eq!(board.current_turn(), Color::Black);
        assert_eq!(board.pieces(Color::White), 4);
        assert_eq!(board.pieces(Color::Black), 3);
        assert_eq!(board.hand(Color::Black), 3);
        assert_eq!(board.mils(Color::White).len(), 1);
        assert_eq!(board.phase(Color::White), Phase::Placing);
        assert_eq!(board.turn_count(), 12);
        assert_eq!(board.turn_limit(), 40);
        assert_eq!(board.get_cell(Position::new(5, 3)), Some(Cell::White));
    }

    #[test]
    fn test_fen_roundtrip() {
        let fens = [
            "8/8/8/8/8/8/8/8 9:9 -:- w 0",
            "WWW5/8/2b5/8/8/3w4/8/bb6 2:3 a1b1c1:- b 12/40",
            "b9/1B8/1B8/1B8/10/10/10/10/10/9w 0:0 -:b2b3b4 w 31",
        ];
        for fen in fens {
            assert_eq!(Board::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_rejects_inconsistent_fen() {
        // 行宽不对
        assert!(Board::from_fen("7/8/8/8/8/8/8/8 9:9 -:- w 0").is_err());
        // mil 标记与列表不一致
        assert!(Board::from_fen("WWW5/8/8/8/8/8/8/8 9:9 -:- w 0").is_err());
        assert!(Board::from_fen("www5/8/8/8/8/8/8/8 9:9 a1b1c1:- w 0").is_err());
        // mil 不连续
        assert!(Board::from_fen("WW1W4/8/8/8/8/8/8/8 9:9 a1b1d1:- w 0").is_err());
        // 非法字符、字段数
        assert!(Board::from_fen("x7/8/8/8/8/8/8/8 9:9 -:- w 0").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 9:9 w 0").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 9:9 -:- r 0").is_err());
    }

    #[test]
    fn test_rejects_oversized_counts() {
        // 空格计数溢出或超出行宽
        assert!(parse_fen("99999999999999999999999/3/3 0:0 -:- w 0").is_err());
        assert!(parse_fen("4/3/3 0:0 -:- w 0").is_err());
        assert!(parse_fen("2w1/3/3 0:0 -:- w 0").is_err());
        assert!(parse_fen("3w/3/3 0:0 -:- w 0").is_err());
        // 手中子超过格子数
        assert!(Board::from_fen("w2/3/3 4294967295:0 -:- w 0").is_err());
        assert!(Board::from_fen("3/3/3 10:0 -:- w 0").is_err());
        assert!(Board::from_fen("3/3/3 9:9 -:- w 0").is_ok());
    }

    #[test]
    fn test_explicit_phases() {
        let fen = "WWW5/8/8/8/8/8/8/bbbb4 0:0 a1b1c1:- w 10 m:m";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.phase(Color::White), Phase::Moving);
        assert!(!board.get_legal_moves().contains(&"a1h1".parse().unwrap()));
        assert_eq!(board.to_fen(), fen);

        // 与推导一致时不写出
        let derived = "WWW5/8/8/8/8/8/8/bbbb4 0:0 a1b1c1:- w 10 f:m";
        assert_eq!(
            Board::from_fen(derived).unwrap().to_fen(),
            "WWW5/8/8/8/8/8/8/bbbb4 0:0 a1b1c1:- w 10"
        );

        // 手中有子必须是落子阶段，飞子最多三子
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 9:9 -:- w 0 m:p").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/bbbb4 9:0 -:- w 0 p:f").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/bbbb4 9:0 -:- w 0 p:x").is_err());
    }

    #[test]
    fn test_terminal_fen() {
        let board = Board::from_fen("www5/8/8/8/8/8/8/bb6 0:0 -:- w 40").unwrap();
        assert_eq!(board.outcome(), GameResult::WhiteWin);
    }

    #[test]
    fn test_apply_move() {
        let fen = "ww6/8/8/8/8/8/8/b7 1:3 -:- w 4";
        let new_fen = apply_move_to_fen(fen, "c1", Some((0, Some("a8")))).unwrap();
        // 落完最后一子只剩三子，仍是移动阶段，需要写出阶段
        assert_eq!(new_fen, "WWW5/8/8/8/8/8/8/8 0:3 a1b1c1:- b 5 m:p");

        let board = Board::from_fen(&new_fen).unwrap();
        assert_eq!(board.current_turn(), Color::Black);
        assert_eq!(board.phase(Color::White), Phase::Moving);
        assert_eq!(board.to_fen(), new_fen);

        assert!(apply_move_to_fen(fen, "a1", None).is_err());
        assert!(apply_move_to_fen(fen, "c1", Some((1, Some("a8")))).is_err());
        assert!(apply_move_to_fen(fen, "c1", Some((0, Some("b1")))).is_err());
    }
}
