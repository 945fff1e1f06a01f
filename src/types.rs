//! 棋子连线游戏核心类型定义
//!
//! 定义棋盘、规则引擎和 AI 共用的基础数据类型

use std::fmt;
use std::str::FromStr;

/// 最大棋盘边长（列用 a-z 表示）
pub const MAX_BOARD_SIZE: usize = 26;

/// 剩余棋子少于该数即判负
pub const MIN_PIECES: u32 = 3;

/// 默认棋盘边长
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// 默认每方棋子数
pub const DEFAULT_STARTING_PIECES: u32 = 9;

/// 默认回合上限（和棋）
pub const DEFAULT_TURN_LIMIT: u32 = 300;

/// 棋子颜色/阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// 获取对方阵营
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 用于 `[T; 2]` 数组的下标
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// 白方为正，黑方为负
    #[inline]
    pub fn sign(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    /// 转换为 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            _ => Err(format!("Unknown color: {}. Available: white, black", s)),
        }
    }
}

/// 格子状态
///
/// 成 mil 的棋子仍属于原阵营，但在 mil 解散前不能被吃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    White,
    WhiteMil,
    Black,
    BlackMil,
}

impl Cell {
    /// 普通棋子
    #[inline]
    pub fn piece(color: Color) -> Cell {
        match color {
            Color::White => Cell::White,
            Color::Black => Cell::Black,
        }
    }

    /// mil 中的棋子
    #[inline]
    pub fn mil_piece(color: Color) -> Cell {
        match color {
            Color::White => Cell::WhiteMil,
            Color::Black => Cell::BlackMil,
        }
    }

    /// 棋子所属阵营，空格为 None
    #[inline]
    pub fn color(&self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::White | Cell::WhiteMil => Some(Color::White),
            Cell::Black | Cell::BlackMil => Some(Color::Black),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Cell::Empty
    }

    #[inline]
    pub fn is_mil(&self) -> bool {
        matches!(self, Cell::WhiteMil | Cell::BlackMil)
    }

    /// 从 FEN 字符解析（不含数字）
    pub fn from_fen_char(c: char) -> Option<Cell> {
        match c {
            'w' => Some(Cell::White),
            'W' => Some(Cell::WhiteMil),
            'b' => Some(Cell::Black),
            'B' => Some(Cell::BlackMil),
            _ => None,
        }
    }

    /// 转换为 FEN 字符，空格返回 None
    pub fn to_fen_char(&self) -> Option<char> {
        match self {
            Cell::Empty => None,
            Cell::White => Some('w'),
            Cell::WhiteMil => Some('W'),
            Cell::Black => Some('b'),
            Cell::BlackMil => Some('B'),
        }
    }
}

/// 每方所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// 从手中落子
    Placing,
    /// 向相邻空位走子
    Moving,
    /// 剩三子时可飞到任意空位
    Flying,
}

impl Phase {
    /// 从 FEN 字符解析阶段
    pub fn from_fen_char(c: char) -> Option<Phase> {
        match c {
            'p' => Some(Phase::Placing),
            'm' => Some(Phase::Moving),
            'f' => Some(Phase::Flying),
            _ => None,
        }
    }

    pub fn to_fen_char(&self) -> char {
        match self {
            Phase::Placing => 'p',
            Phase::Moving => 'm',
            Phase::Flying => 'f',
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Placing => "placing",
            Phase::Moving => "moving",
            Phase::Flying => "flying",
        };
        write!(f, "{}", name)
    }
}

/// 棋盘位置 (row, col)
///
/// row: 0 在上方，文本坐标中显示为 1
/// col: 0 在左侧，文本坐标中显示为 a
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub fn new(row: i8, col: i8) -> Self {
        Position { row, col }
    }

    /// 检查位置是否在 size x size 棋盘内
    #[inline]
    pub fn is_valid(&self, size: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < size && (self.col as usize) < size
    }

    /// 位置加偏移量
    #[inline]
    pub fn offset(&self, row_delta: i8, col_delta: i8) -> Position {
        Position {
            row: self.row + row_delta,
            col: self.col + col_delta,
        }
    }

    /// 曼哈顿距离
    #[inline]
    pub fn manhattan(&self, other: Position) -> u32 {
        ((self.row - other.row).unsigned_abs() + (self.col - other.col).unsigned_abs()) as u32
    }

    /// 转换为行优先下标（调用方保证在棋盘内）
    #[inline]
    pub fn to_index(&self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    /// 从行优先下标恢复
    #[inline]
    pub fn from_index(index: usize, size: usize) -> Position {
        Position {
            row: (index / size) as i8,
            col: (index % size) as i8,
        }
    }

    /// 从 FEN 坐标解析（如 "a1"、"c12"）
    pub fn from_fen_str(s: &str) -> Option<Position> {
        let mut chars = s.chars();
        let col = match chars.next()? {
            c @ 'a'..='z' => (c as u8 - b'a') as i8,
            _ => return None,
        };
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let row: i8 = digits.parse().ok()?;
        if row < 1 || row as usize > MAX_BOARD_SIZE {
            return None;
        }
        Some(Position { row: row - 1, col })
    }

    /// 转换为 FEN 坐标（如 "a1"）
    pub fn to_fen_str(&self) -> String {
        let col_char = b'a'.wrapping_add(self.col as u8) as char;
        format!("{}{}", col_char, self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_str())
    }
}

/// 动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// 从手中落子
    Place,
    /// 移动（走子或飞子）
    Move,
}

/// 走法
///
/// 落子时 `from_pos` 为 None
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MilMove {
    pub action_type: ActionType,
    pub from_pos: Option<Position>,
    pub to_pos: Position,
}

impl MilMove {
    /// 创建落子走法
    pub fn place(to: Position) -> Self {
        MilMove {
            action_type: ActionType::Place,
            from_pos: None,
            to_pos: to,
        }
    }

    /// 创建移动走法
    pub fn step(from: Position, to: Position) -> Self {
        MilMove {
            action_type: ActionType::Move,
            from_pos: Some(from),
            to_pos: to,
        }
    }

    /// 从 FEN 走法字符串解析
    ///
    /// 格式：
    /// - 落子：`c3`
    /// - 移动：`c3c4`
    pub fn from_fen_str(s: &str) -> Option<MilMove> {
        let s = s.trim();
        // 第二个坐标从第二个字母处开始
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_lowercase())
            .map(|(i, _)| i);

        match split {
            None => Position::from_fen_str(s).map(MilMove::place),
            Some(i) => {
                let from = Position::from_fen_str(&s[..i])?;
                let to = Position::from_fen_str(&s[i..])?;
                Some(MilMove::step(from, to))
            }
        }
    }

    /// 转换为 FEN 走法字符串
    pub fn to_fen_str(&self) -> String {
        match self.from_pos {
            Some(from) if self.action_type == ActionType::Move => {
                format!("{}{}", from.to_fen_str(), self.to_pos.to_fen_str())
            }
            _ => self.to_pos.to_fen_str(),
        }
    }
}

impl fmt::Display for MilMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_str())
    }
}

impl FromStr for MilMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MilMove::from_fen_str(s).ok_or_else(|| format!("Invalid move string: {}", s))
    }
}

/// 同色三子连线（同一行或同一列，连续）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mil(pub [Position; 3]);

impl Mil {
    pub fn cells(&self) -> &[Position; 3] {
        &self.0
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }

    /// 三点是否共线且连续
    pub fn is_line(&self) -> bool {
        let mut cells = self.0;
        cells.sort();
        let [a, b, c] = cells;
        let horizontal = a.row == b.row && b.row == c.row && b.col == a.col + 1 && c.col == b.col + 1;
        let vertical = a.col == b.col && b.col == c.col && b.row == a.row + 1 && c.row == b.row + 1;
        horizontal || vertical
    }

    pub fn to_fen_str(&self) -> String {
        self.0.iter().map(|p| p.to_fen_str()).collect()
    }

    /// 解析三个连写的坐标（如 "a1b1c1"）
    pub fn from_fen_str(s: &str) -> Option<Mil> {
        let mut starts = s
            .char_indices()
            .filter(|(_, c)| c.is_ascii_lowercase())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        if starts.len() != 3 || starts[0] != 0 {
            return None;
        }
        starts.push(s.len());
        let mut cells = [Position::new(0, 0); 3];
        for (k, cell) in cells.iter_mut().enumerate() {
            *cell = Position::from_fen_str(&s[starts[k]..starts[k + 1]])?;
        }
        Some(Mil(cells))
    }
}

impl fmt::Display for Mil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|p| p.to_fen_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Playing,
    WhiteWin,
    BlackWin,
    Tie,
}

impl GameResult {
    /// 某方获胜
    pub fn win_for(color: Color) -> GameResult {
        match color {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        }
    }
}

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    /// 随机走子
    Easy,
    /// Minimax 深度 3
    Medium,
    /// Minimax 深度 5
    Hard,
}

impl Difficulty {
    /// 搜索深度（Easy 不搜索）
    pub fn depth(&self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 3,
            Difficulty::Hard => 5,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Unknown difficulty: {}. Available: easy, medium, hard",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_fen_str() {
        assert_eq!(Position::from_fen_str("a1"), Some(Position::new(0, 0)));
        assert_eq!(Position::from_fen_str("e4"), Some(Position::new(3, 4)));
        assert_eq!(Position::from_fen_str("c12"), Some(Position::new(11, 2)));
        assert_eq!(Position::from_fen_str("a0"), None);
        assert_eq!(Position::from_fen_str("A1"), None);
        assert_eq!(Position::from_fen_str("a"), None);
    }

    #[test]
    fn test_position_to_fen_str() {
        assert_eq!(Position::new(0, 0).to_fen_str(), "a1");
        assert_eq!(Position::new(3, 4).to_fen_str(), "e4");
        assert_eq!(Position::new(9, 7).to_fen_str(), "h10");
    }

    #[test]
    fn test_move_from_fen_str() {
        let m = MilMove::from_fen_str("c3").unwrap();
        assert_eq!(m.action_type, ActionType::Place);
        assert_eq!(m.from_pos, None);
        assert_eq!(m.to_pos, Position::new(2, 2));

        let m = MilMove::from_fen_str("a10b10").unwrap();
        assert_eq!(m.action_type, ActionType::Move);
        assert_eq!(m.from_pos, Some(Position::new(9, 0)));
        assert_eq!(m.to_pos, Position::new(9, 1));
        assert_eq!(m.to_fen_str(), "a10b10");

        assert!(MilMove::from_fen_str("c").is_none());
        assert!("zz".parse::<MilMove>().is_err());
    }

    #[test]
    fn test_mil_is_line() {
        let row = Mil([Position::new(0, 2), Position::new(0, 0), Position::new(0, 1)]);
        assert!(row.is_line());
        let col = Mil([Position::new(1, 3), Position::new(2, 3), Position::new(3, 3)]);
        assert!(col.is_line());
        let gap = Mil([Position::new(0, 0), Position::new(0, 1), Position::new(0, 3)]);
        assert!(!gap.is_line());
        let bent = Mil([Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]);
        assert!(!bent.is_line());
    }

    #[test]
    fn test_mil_fen() {
        let mil = Mil::from_fen_str("a1b1c1").unwrap();
        assert_eq!(
            mil,
            Mil([Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)])
        );
        assert_eq!(mil.to_fen_str(), "a1b1c1");
        assert!(Mil::from_fen_str("a1b1").is_none());
    }

    #[test]
    fn test_cell_helpers() {
        assert_eq!(Cell::WhiteMil.color(), Some(Color::White));
        assert!(Cell::BlackMil.is_mil());
        assert!(Cell::Empty.color().is_none());
        assert_eq!(Cell::mil_piece(Color::Black), Cell::BlackMil);
    }

    #[test]
    fn test_difficulty_depth() {
        assert_eq!("easy".parse::<Difficulty>().unwrap().depth(), 0);
        assert_eq!(Difficulty::Medium.depth(), 3);
        assert_eq!(Difficulty::Hard.depth(), 5);
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
