//! 棋盘状态与规则引擎
//!
//! 保存一个完整局面，并负责走法合法性、mil 检测和吃子结算。
//! 所有修改都经过这里的方法，搜索只在克隆上调用它们。

use log::{debug, trace};

use crate::types::{
    Cell, Color, GameResult, Mil, MilMove, Phase, Position, DEFAULT_BOARD_SIZE,
    DEFAULT_STARTING_PIECES, DEFAULT_TURN_LIMIT, MAX_BOARD_SIZE, MIN_PIECES,
};

/// 对局参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// 棋盘边长
    pub size: usize,
    /// 每方棋子数
    pub starting_pieces: u32,
    /// 达到该回合数判和
    pub turn_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            size: DEFAULT_BOARD_SIZE,
            starting_pieces: DEFAULT_STARTING_PIECES,
            turn_limit: DEFAULT_TURN_LIMIT,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(3..=MAX_BOARD_SIZE).contains(&self.size) {
            return Err(format!(
                "Invalid board size: {} (expected 3..={})",
                self.size, MAX_BOARD_SIZE
            ));
        }
        if self.starting_pieces as usize > self.size * self.size / 2 {
            return Err(format!(
                "Too many pieces: {} per side on a {}x{} board",
                self.starting_pieces, self.size, self.size
            ));
        }
        Ok(())
    }
}

/// 走法执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// 不合法，局面未改变
    Rejected,
    /// 已执行，未形成 mil
    Applied,
    /// 已执行并形成候选 mil，需要调用 `resolve_capture`
    AppliedWithMilChoices(Vec<Mil>),
}

impl MoveResult {
    pub fn is_applied(&self) -> bool {
        !matches!(self, MoveResult::Rejected)
    }

    /// 候选 mil（没有时为空）
    pub fn mil_choices(&self) -> &[Mil] {
        match self {
            MoveResult::AppliedWithMilChoices(mils) => mils,
            _ => &[],
        }
    }
}

/// 棋盘局面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// 行优先存储的 size x size 格子
    cells: Vec<Cell>,
    hands: [u32; 2],
    pieces: [u32; 2],
    phase: [Phase; 2],
    mils: [Vec<Mil>; 2],
    /// 上一步走法形成、尚未结算的候选 mil
    pending_mils: Vec<Mil>,
    current_turn: Color,
    turn_count: u32,
    turn_limit: u32,
    outcome: GameResult,
}

impl Board {
    /// 创建空棋盘（默认回合上限）
    pub fn new(size: usize, starting_pieces: u32) -> Board {
        Board::with_config(GameConfig {
            size,
            starting_pieces,
            turn_limit: DEFAULT_TURN_LIMIT,
        })
    }

    /// 按配置创建空棋盘，白方先走
    pub fn with_config(config: GameConfig) -> Board {
        let size = config.size.clamp(1, MAX_BOARD_SIZE);
        let phase = Board::default_phase(config.starting_pieces, 0);
        Board {
            size,
            cells: vec![Cell::Empty; size * size],
            hands: [config.starting_pieces; 2],
            pieces: [0; 2],
            phase: [phase; 2],
            mils: [Vec::new(), Vec::new()],
            pending_mils: Vec::new(),
            current_turn: Color::White,
            turn_count: 0,
            turn_limit: config.turn_limit,
            outcome: GameResult::Playing,
        }
    }

    /// 由已校验的各部分组装局面（FEN 解析使用）
    ///
    /// `phases` 为 None 时按手中和棋盘上的棋子数推导
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        size: usize,
        cells: Vec<Cell>,
        hands: [u32; 2],
        mils: [Vec<Mil>; 2],
        phases: Option<[Phase; 2]>,
        turn: Color,
        turn_count: u32,
        turn_limit: u32,
    ) -> Board {
        let mut pieces = [0u32; 2];
        for cell in &cells {
            if let Some(color) = cell.color() {
                pieces[color.index()] += 1;
            }
        }
        let phase = phases.unwrap_or([
            Board::default_phase(hands[0], pieces[0]),
            Board::default_phase(hands[1], pieces[1]),
        ]);
        let mut board = Board {
            size,
            cells,
            hands,
            pieces,
            phase,
            mils,
            pending_mils: Vec::new(),
            current_turn: turn,
            turn_count,
            turn_limit,
            outcome: GameResult::Playing,
        };
        board.update_outcome();
        board
    }

    /// 记谱未写明阶段时的推导：手中有子为落子，否则不超过三子为飞子
    pub(crate) fn default_phase(hand: u32, pieces: u32) -> Phase {
        if hand > 0 {
            Phase::Placing
        } else if pieces <= MIN_PIECES {
            Phase::Flying
        } else {
            Phase::Moving
        }
    }

    // ------------------------------------------------------------------
    // 查询
    // ------------------------------------------------------------------

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// 获取当前回合
    #[inline]
    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    #[inline]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    #[inline]
    pub fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    #[inline]
    pub fn outcome(&self) -> GameResult {
        self.outcome
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.outcome == GameResult::Playing
    }

    #[inline]
    pub fn hand(&self, color: Color) -> u32 {
        self.hands[color.index()]
    }

    /// 棋盘上该方的棋子数
    #[inline]
    pub fn pieces(&self, color: Color) -> u32 {
        self.pieces[color.index()]
    }

    #[inline]
    pub fn phase(&self, color: Color) -> Phase {
        self.phase[color.index()]
    }

    #[inline]
    pub fn mils(&self, color: Color) -> &[Mil] {
        &self.mils[color.index()]
    }

    /// 获取某位置的格子，越界返回 None
    #[inline]
    pub fn get_cell(&self, pos: Position) -> Option<Cell> {
        if !pos.is_valid(self.size) {
            return None;
        }
        Some(self.cells[pos.to_index(self.size)])
    }

    /// 行优先的全部格子
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn set_cell(&mut self, pos: Position, cell: Cell) {
        let idx = pos.to_index(self.size);
        self.cells[idx] = cell;
    }

    /// 行优先遍历所有位置
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| Position::from_index(i, self.size))
    }

    /// 某方所有棋子的位置（行优先）
    pub fn positions_of(&self, color: Color) -> Vec<Position> {
        self.positions()
            .filter(|&p| self.cells[p.to_index(self.size)].color() == Some(color))
            .collect()
    }

    /// 剩余子力（手中 + 棋盘上）
    #[inline]
    pub fn material(&self, color: Color) -> u32 {
        self.hands[color.index()]
            .saturating_add(self.pieces[color.index()])
    }

    // ------------------------------------------------------------------
    // 规则引擎
    // ------------------------------------------------------------------

    /// 检查走法是否合法（当前走子方）
    pub fn is_legal(&self, from: Option<Position>, to: Position) -> bool {
        if !self.is_playing() {
            return false;
        }
        if self.get_cell(to) != Some(Cell::Empty) {
            return false;
        }

        let color = self.current_turn;
        match self.phase(color) {
            Phase::Placing => self.hand(color) > 0,
            phase => {
                let from = match from {
                    Some(f) => f,
                    None => return false,
                };
                let owned = self
                    .get_cell(from)
                    .and_then(|c| c.color())
                    .is_some_and(|c| c == color);
                if !owned {
                    return false;
                }
                // 飞子阶段不要求相邻
                phase == Phase::Flying || from.manhattan(to) == 1
            }
        }
    }

    /// 执行走法（不切换回合，形成 mil 后由同一方吃子）
    pub fn apply_move(&mut self, mv: &MilMove) -> MoveResult {
        if !self.is_legal(mv.from_pos, mv.to_pos) {
            trace!("rejected {} for {}", mv, self.current_turn);
            return MoveResult::Rejected;
        }

        let color = self.current_turn;
        let to = mv.to_pos;

        match self.phase(color) {
            Phase::Placing => {
                self.set_cell(to, Cell::piece(color));
                self.hands[color.index()] -= 1;
                self.pieces[color.index()] += 1;
                // 落完最后一子进入移动阶段，棋子再少也不直接飞子
                if self.hands[color.index()] == 0 {
                    self.phase[color.index()] = Phase::Moving;
                }
            }
            Phase::Moving | Phase::Flying => {
                // is_legal 已保证 from 存在
                let from = match mv.from_pos {
                    Some(f) => f,
                    None => return MoveResult::Rejected,
                };
                if self.get_cell(from).is_some_and(|c| c.is_mil()) {
                    self.dissolve_mil(color, from);
                }
                self.set_cell(from, Cell::Empty);
                self.set_cell(to, Cell::piece(color));
            }
        }

        let candidates = self.detect_mils(to, color);
        self.pending_mils = candidates.clone();
        debug_assert!(self.check_invariants().is_ok());

        if candidates.is_empty() {
            MoveResult::Applied
        } else {
            debug!("{} formed {} mil candidate(s) at {}", color, candidates.len(), to);
            MoveResult::AppliedWithMilChoices(candidates)
        }
    }

    /// 解散包含 `pos` 的 mil，三子恢复为普通棋子
    fn dissolve_mil(&mut self, color: Color, pos: Position) {
        let mils = &mut self.mils[color.index()];
        if let Some(idx) = mils.iter().position(|m| m.contains(pos)) {
            let mil = mils.remove(idx);
            for &cell in mil.cells() {
                self.set_cell(cell, Cell::piece(color));
            }
        }
    }

    /// 只扫描经过 `to` 的横竖三连窗口
    fn detect_mils(&self, to: Position, color: Color) -> Vec<Mil> {
        let piece = Cell::piece(color);
        let mut found = Vec::new();

        for (dr, dc) in [(0i8, 1i8), (1, 0)] {
            for start in -2i8..=0 {
                let first = to.offset(dr * start, dc * start);
                let window = [first, first.offset(dr, dc), first.offset(dr * 2, dc * 2)];
                if window
                    .iter()
                    .all(|&p| self.get_cell(p) == Some(piece))
                {
                    found.push(Mil(window));
                }
            }
        }

        found
    }

    /// `mil` 是否是上一步走法形成、可被当前走子方登记的候选
    fn is_candidate_mil(&self, mil: &Mil) -> bool {
        let piece = Cell::piece(self.current_turn);
        self.pending_mils.contains(mil)
            && mil.cells().iter().all(|&p| self.get_cell(p) == Some(piece))
    }

    /// 上一步走法形成、尚未结算的候选 mil
    #[inline]
    pub fn pending_mils(&self) -> &[Mil] {
        &self.pending_mils
    }

    /// 结算 mil 与吃子
    ///
    /// `target` 为 None 仅在对方没有可吃棋子时接受（只登记 mil）
    pub fn resolve_capture(&mut self, mil: &Mil, target: Option<Position>) -> bool {
        if !self.is_playing() || !self.is_candidate_mil(mil) {
            return false;
        }

        let color = self.current_turn;
        let opponent = color.opposite();

        match target {
            Some(t) => {
                if self.get_cell(t) != Some(Cell::piece(opponent)) {
                    return false;
                }
                self.set_cell(t, Cell::Empty);
                self.pieces[opponent.index()] -= 1;
                self.enter_flying(opponent);
            }
            None => {
                if !self.removable_pieces(opponent).is_empty() {
                    return false;
                }
            }
        }

        for &cell in mil.cells() {
            self.set_cell(cell, Cell::mil_piece(color));
        }
        self.mils[color.index()].push(*mil);
        self.pending_mils.clear();

        match target {
            Some(t) => debug!("{} formed {} and captured {}", color, mil, t),
            None => debug!("{} formed {} with nothing to capture", color, mil),
        }
        debug_assert!(self.check_invariants().is_ok());
        true
    }

    /// 被吃子后，移动阶段的一方剩不超过三子时进入飞子阶段
    fn enter_flying(&mut self, color: Color) {
        let idx = color.index();
        if self.phase[idx] == Phase::Moving && self.pieces[idx] <= MIN_PIECES {
            self.phase[idx] = Phase::Flying;
        }
    }

    /// 切换回合并更新胜负
    pub fn switch_turn(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.pending_mils.clear();
        self.current_turn = self.current_turn.opposite();
        self.turn_count += 1;
        self.update_outcome();
    }

    /// 判断胜负：子力不足三枚者负，其次回合上限判和
    pub fn update_outcome(&mut self) -> GameResult {
        if !self.is_playing() {
            return self.outcome;
        }
        for color in Color::ALL {
            if self.material(color) < MIN_PIECES {
                self.outcome = GameResult::win_for(color.opposite());
                debug!("{} is out of material: {:?}", color, self.outcome);
                return self.outcome;
            }
        }
        if self.turn_count >= self.turn_limit {
            self.outcome = GameResult::Tie;
            debug!("turn limit {} reached", self.turn_limit);
        }
        self.outcome
    }

    /// 强制设定结果（驱动方使用，例如认输）
    pub fn set_outcome(&mut self, outcome: GameResult) {
        self.outcome = outcome;
    }

    // ------------------------------------------------------------------
    // 走法生成
    // ------------------------------------------------------------------

    /// 获取当前走子方的所有合法走法（行优先，顺序固定）
    pub fn get_legal_moves(&self) -> Vec<MilMove> {
        let mut moves = Vec::new();
        if !self.is_playing() {
            return moves;
        }

        let color = self.current_turn;
        match self.phase(color) {
            Phase::Placing => {
                if self.hand(color) == 0 {
                    return moves;
                }
                moves.extend(
                    self.positions()
                        .filter(|&p| self.cells[p.to_index(self.size)].is_empty())
                        .map(MilMove::place),
                );
            }
            Phase::Moving => {
                for from in self.positions_of(color) {
                    for dr in -1i8..=1 {
                        for dc in -1i8..=1 {
                            if dr == 0 && dc == 0 {
                                continue;
                            }
                            let to = from.offset(dr, dc);
                            if self.is_legal(Some(from), to) {
                                moves.push(MilMove::step(from, to));
                            }
                        }
                    }
                }
            }
            Phase::Flying => {
                let empties: Vec<Position> = self
                    .positions()
                    .filter(|&p| self.cells[p.to_index(self.size)].is_empty())
                    .collect();
                for from in self.positions_of(color) {
                    moves.extend(empties.iter().map(|&to| MilMove::step(from, to)));
                }
            }
        }

        moves
    }

    /// 对方可被吃的棋子（不在 mil 中）
    pub fn removable_pieces(&self, color: Color) -> Vec<Position> {
        let piece = Cell::piece(color);
        self.positions()
            .filter(|&p| self.cells[p.to_index(self.size)] == piece)
            .collect()
    }

    /// 获取所有合法走法（字符串格式）
    pub fn get_legal_moves_str(&self) -> Vec<String> {
        self.get_legal_moves()
            .iter()
            .map(|m| m.to_fen_str())
            .collect()
    }

    // ------------------------------------------------------------------
    // 一致性检查
    // ------------------------------------------------------------------

    /// 检查局面不变量，返回第一个违反项
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.cells.len() != self.size * self.size {
            return Err(format!("cell count {} for size {}", self.cells.len(), self.size));
        }

        for color in Color::ALL {
            let on_board = self.positions_of(color).len() as u32;
            if on_board != self.pieces(color) {
                return Err(format!(
                    "{} has {} pieces on board but counter says {}",
                    color,
                    on_board,
                    self.pieces(color)
                ));
            }
        }

        for color in Color::ALL {
            let placing = self.phase(color) == Phase::Placing;
            if placing != (self.hand(color) > 0) {
                return Err(format!(
                    "{} is {} with {} in hand",
                    color,
                    self.phase(color),
                    self.hand(color)
                ));
            }
            if self.phase(color) == Phase::Flying && self.pieces(color) > MIN_PIECES {
                return Err(format!(
                    "{} is flying with {} pieces on board",
                    color,
                    self.pieces(color)
                ));
            }
        }

        let mut seen = vec![false; self.cells.len()];
        for color in Color::ALL {
            let mil_cell = Cell::mil_piece(color);
            for mil in self.mils(color) {
                if !mil.is_line() {
                    return Err(format!("{} mil {} is not a line", color, mil));
                }
                for &p in mil.cells() {
                    if self.get_cell(p) != Some(mil_cell) {
                        return Err(format!("{} mil {} covers unmarked cell {}", color, mil, p));
                    }
                    let idx = p.to_index(self.size);
                    if seen[idx] {
                        return Err(format!("cell {} belongs to more than one mil", p));
                    }
                    seen[idx] = true;
                }
            }
        }

        for (idx, cell) in self.cells.iter().enumerate() {
            if cell.is_mil() && !seen[idx] {
                return Err(format!(
                    "cell {} is mil-marked without a mil",
                    Position::from_index(idx, self.size)
                ));
            }
        }

        Ok(())
    }

    /// 文本棋盘（行号在左，列字母在下）
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..self.size {
            out.push_str(&format!("{:>2} ", row + 1));
            for col in 0..self.size {
                let ch = match self.cells[row * self.size + col] {
                    Cell::Empty => '.',
                    Cell::White => 'w',
                    Cell::WhiteMil => 'W',
                    Cell::Black => 'b',
                    Cell::BlackMil => 'B',
                };
                out.push(ch);
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("   ");
        for col in 0..self.size {
            out.push((b'a' + col as u8) as char);
            out.push(' ');
        }
        out.push('\n');
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::with_config(GameConfig::default())
    }
}

/// 从 FEN 获取合法走法（字符串格式）
pub fn get_legal_moves_from_fen(fen: &str) -> Result<Vec<String>, String> {
    let board = Board::from_fen(fen)?;
    Ok(board.get_legal_moves_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionType;

    fn pos(s: &str) -> Position {
        Position::from_fen_str(s).unwrap()
    }

    /// 双方轮流落子（白方在 white，黑方在 black）
    fn place_pair(board: &mut Board, white: &str, black: &str) {
        assert_eq!(board.apply_move(&MilMove::place(pos(white))), MoveResult::Applied);
        board.switch_turn();
        assert_eq!(board.apply_move(&MilMove::place(pos(black))), MoveResult::Applied);
        board.switch_turn();
    }

    #[test]
    fn test_initial_board() {
        let board = Board::new(8, 9);
        assert_eq!(board.size(), 8);
        assert_eq!(board.hand(Color::White), 9);
        assert_eq!(board.hand(Color::Black), 9);
        assert_eq!(board.pieces(Color::White), 0);
        assert_eq!(board.phase(Color::White), Phase::Placing);
        assert_eq!(board.current_turn(), Color::White);
        assert_eq!(board.outcome(), GameResult::Playing);
        assert_eq!(board.get_legal_moves().len(), 64);
    }

    #[test]
    fn test_rejects_occupied_and_out_of_bounds() {
        let mut board = Board::new(8, 9);
        assert_eq!(board.apply_move(&MilMove::place(Position::new(8, 0))), MoveResult::Rejected);
        assert_eq!(board.apply_move(&MilMove::place(Position::new(-1, 0))), MoveResult::Rejected);

        board.apply_move(&MilMove::place(pos("d4")));
        board.switch_turn();
        let before = board.clone();
        assert_eq!(board.apply_move(&MilMove::place(pos("d4"))), MoveResult::Rejected);
        assert_eq!(board, before);
    }

    #[test]
    fn test_mil_on_third_placement() {
        let mut board = Board::new(8, 3);
        place_pair(&mut board, "a1", "h8");
        place_pair(&mut board, "b1", "f8");

        let result = board.apply_move(&MilMove::place(pos("c1")));
        let expected = Mil([pos("a1"), pos("b1"), pos("c1")]);
        assert_eq!(result, MoveResult::AppliedWithMilChoices(vec![expected]));

        assert!(board.resolve_capture(&expected, Some(pos("h8"))));
        assert_eq!(board.pieces(Color::Black), 1);
        for p in ["a1", "b1", "c1"] {
            assert_eq!(board.get_cell(pos(p)), Some(Cell::WhiteMil));
        }
        assert_eq!(board.mils(Color::White), &[expected]);
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_middle_placement_detects_both_axes() {
        let mut board = Board::new(5, 9);
        place_pair(&mut board, "a2", "e5");
        place_pair(&mut board, "c2", "e3");
        place_pair(&mut board, "b1", "c5");
        place_pair(&mut board, "b3", "a4");

        let result = board.apply_move(&MilMove::place(pos("b2")));
        let mils = result.mil_choices();
        assert_eq!(mils.len(), 2);
        assert!(mils.contains(&Mil([pos("a2"), pos("b2"), pos("c2")])));
        assert!(mils.contains(&Mil([pos("b1"), pos("b2"), pos("b3")])));
    }

    #[test]
    fn test_capture_rejections() {
        let mut board = Board::new(8, 3);
        place_pair(&mut board, "a1", "h8");
        place_pair(&mut board, "b1", "f8");
        let result = board.apply_move(&MilMove::place(pos("c1")));
        let mil = result.mil_choices()[0];
        let before = board.clone();

        // 空格、己方棋子、没有目标（对方还有可吃棋子）
        assert!(!board.resolve_capture(&mil, Some(pos("d4"))));
        assert!(!board.resolve_capture(&mil, Some(pos("a1"))));
        assert!(!board.resolve_capture(&mil, None));
        // 不是候选 mil
        let fake = Mil([pos("a1"), pos("b1"), pos("d1")]);
        assert!(!board.resolve_capture(&fake, Some(pos("h8"))));
        assert_eq!(board, before);
    }

    #[test]
    fn test_mil_piece_is_protected() {
        let fen = "WWW5/8/8/8/8/8/8/bbb5 0:0 a1b1c1:- b 20";
        let mut board = Board::from_fen(fen).unwrap();
        assert_eq!(board.phase(Color::Black), Phase::Flying);

        let result = board.apply_move(&"a8a7".parse().unwrap());
        assert!(result.is_applied());
        board.switch_turn();
        board.switch_turn();
        // 白方全部在 mil 中，黑方组成 mil 后不可吃子
        assert!(board.removable_pieces(Color::White).is_empty());
        let result = board.apply_move(&"a7a8".parse().unwrap());
        let mil = result.mil_choices()[0];
        assert!(!board.resolve_capture(&mil, Some(pos("a1"))));
        assert!(board.resolve_capture(&mil, None));
        assert_eq!(board.mils(Color::Black).len(), 1);
        assert_eq!(board.pieces(Color::White), 3);
    }

    #[test]
    fn test_moving_requires_adjacency_and_ownership() {
        let fen = "ww6/ww6/8/8/8/8/6bb/6bb 0:0 -:- w 10";
        let mut board = Board::from_fen(fen).unwrap();
        assert_eq!(board.phase(Color::White), Phase::Moving);
        let before = board.clone();
        assert_eq!(board.apply_move(&"a1a3".parse().unwrap()), MoveResult::Rejected);
        assert_eq!(board.apply_move(&"b2c3".parse().unwrap()), MoveResult::Rejected);
        assert_eq!(board.apply_move(&"g8g6".parse().unwrap()), MoveResult::Rejected);
        assert_eq!(board.apply_move(&"h8h6".parse().unwrap()), MoveResult::Rejected);
        assert_eq!(board.apply_move(&MilMove::place(pos("d4"))), MoveResult::Rejected);
        assert_eq!(board, before);

        assert_eq!(board.apply_move(&"b2c2".parse().unwrap()), MoveResult::Applied);
        assert_eq!(board.get_cell(pos("c2")), Some(Cell::White));
        assert_eq!(board.get_cell(pos("b2")), Some(Cell::Empty));
    }

    #[test]
    fn test_moving_generates_orthogonal_steps_only() {
        let fen = "8/8/8/3w4/3w4/3w4/3w4/bbbb4 0:0 -:- w 10";
        let board = Board::from_fen(fen).unwrap();
        let from_d4: Vec<_> = board
            .get_legal_moves()
            .into_iter()
            .filter(|m| m.from_pos == Some(pos("d4")))
            .map(|m| m.to_fen_str())
            .collect();
        assert_eq!(from_d4, vec!["d4d3", "d4c4", "d4e4"]);
    }

    #[test]
    fn test_flying_reaches_any_empty_cell() {
        let fen = "www5/8/8/8/8/8/8/bbbb4 0:0 -:- w 10";
        let mut board = Board::from_fen(fen).unwrap();
        assert_eq!(board.phase(Color::White), Phase::Flying);
        assert_eq!(board.get_legal_moves().len(), 3 * (64 - 7));
        assert!(board.apply_move(&"a1h8".parse().unwrap()).is_applied());
        assert_eq!(board.get_cell(pos("h8")), Some(Cell::White));
    }

    #[test]
    fn test_moving_out_of_mil_dissolves_it() {
        let fen = "WWW5/8/8/8/8/8/8/bbbb4 0:0 a1b1c1:- w 10";
        let mut board = Board::from_fen(fen).unwrap();
        assert_eq!(board.mils(Color::White).len(), 1);

        assert!(board.apply_move(&"c1c2".parse().unwrap()).is_applied());
        assert!(board.mils(Color::White).is_empty());
        assert_eq!(board.get_cell(pos("a1")), Some(Cell::White));
        assert_eq!(board.get_cell(pos("b1")), Some(Cell::White));
        board.check_invariants().unwrap();

        // 走回原位重新形成 mil
        board.switch_turn();
        assert!(board.apply_move(&"d8d7".parse().unwrap()).is_applied());
        board.switch_turn();
        let result = board.apply_move(&"c2c1".parse().unwrap());
        assert_eq!(result.mil_choices(), &[Mil([pos("a1"), pos("b1"), pos("c1")])]);
    }

    #[test]
    fn test_last_placement_switches_to_moving() {
        let mut board = Board::new(8, 4);
        place_pair(&mut board, "a1", "h8");
        place_pair(&mut board, "c3", "f6");
        place_pair(&mut board, "e5", "d8");
        assert_eq!(board.phase(Color::White), Phase::Placing);
        assert!(board.apply_move(&MilMove::place(pos("a8"))).is_applied());
        assert_eq!(board.phase(Color::White), Phase::Moving);
        assert_eq!(board.hand(Color::White), 0);
        board.switch_turn();
        assert_eq!(board.phase(Color::White), Phase::Moving);
        assert!(board
            .get_legal_moves()
            .iter()
            .all(|m| m.action_type == ActionType::Place));
    }

    #[test]
    fn test_last_placement_with_three_pieces_moves_not_flies() {
        let mut board = Board::new(8, 3);
        place_pair(&mut board, "a1", "h8");
        place_pair(&mut board, "b1", "f8");
        assert!(board.apply_move(&MilMove::place(pos("e5"))).is_applied());
        assert_eq!(board.phase(Color::White), Phase::Moving);
        board.switch_turn();
        assert!(board.apply_move(&MilMove::place(pos("d8"))).is_applied());
        assert_eq!(board.phase(Color::Black), Phase::Moving);
        board.switch_turn();
        assert_eq!(board.phase(Color::White), Phase::Moving);

        // 只能走相邻空格
        let moves = board.get_legal_moves();
        assert!(moves.contains(&"e5e6".parse().unwrap()));
        assert!(!moves.contains(&"e5a8".parse().unwrap()));
        assert_eq!(board.apply_move(&"a1a5".parse().unwrap()), MoveResult::Rejected);
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_only_last_move_mils_can_be_resolved() {
        // a1b1c1 已登记，d1 是普通白子
        let fen = "WWWw4/8/8/8/8/8/8/bbbb4 0:0 a1b1c1:- w 10";
        let mut board = Board::from_fen(fen).unwrap();
        assert!(board.pending_mils().is_empty());

        // a1 离开，b1c1d1 恢复为普通棋子但不是这一步形成的
        assert_eq!(board.apply_move(&"a1a2".parse().unwrap()), MoveResult::Applied);
        assert_eq!(board.get_cell(pos("b1")), Some(Cell::White));
        let stale = Mil([pos("b1"), pos("c1"), pos("d1")]);
        let before = board.clone();
        assert!(!board.resolve_capture(&stale, Some(pos("a8"))));
        assert_eq!(board, before);

        // 换手后也不能补登记
        board.switch_turn();
        assert!(board.apply_move(&"a8a7".parse().unwrap()).is_applied());
        board.switch_turn();
        assert!(!board.resolve_capture(&stale, Some(pos("b8"))));
        assert_eq!(board.pieces(Color::Black), 4);
    }

    #[test]
    fn test_candidates_are_cleared_after_capture() {
        let mut board = Board::new(8, 3);
        place_pair(&mut board, "a1", "h8");
        place_pair(&mut board, "b1", "f8");
        let result = board.apply_move(&MilMove::place(pos("c1")));
        let mil = result.mil_choices()[0];
        assert_eq!(board.pending_mils(), &[mil]);

        assert!(board.resolve_capture(&mil, Some(pos("h8"))));
        assert!(board.pending_mils().is_empty());
        assert!(!board.resolve_capture(&mil, Some(pos("f8"))));
        assert_eq!(board.pieces(Color::Black), 1);
    }

    #[test]
    fn test_capture_down_to_two_ends_game() {
        let fen = "ww6/w7/8/8/8/8/8/bbb5 0:0 -:- w 10";
        let mut board = Board::from_fen(fen).unwrap();
        let result = board.apply_move(&"a2c1".parse().unwrap());
        let mil = result.mil_choices()[0];
        assert!(board.resolve_capture(&mil, Some(pos("a8"))));
        assert_eq!(board.pieces(Color::Black), 2);
        board.switch_turn();
        assert_eq!(board.outcome(), GameResult::WhiteWin);

        let before = board.clone();
        assert_eq!(board.apply_move(&"b8b7".parse().unwrap()), MoveResult::Rejected);
        assert!(board.get_legal_moves().is_empty());
        board.switch_turn();
        assert_eq!(board, before);
    }

    #[test]
    fn test_turn_limit_forces_tie() {
        let fen = "www5/8/8/8/8/8/8/bbbbb3 0:0 -:- w 9/10";
        let mut board = Board::from_fen(fen).unwrap();
        assert_eq!(board.outcome(), GameResult::Playing);
        assert!(board.apply_move(&"a1a2".parse().unwrap()).is_applied());
        board.switch_turn();
        assert_eq!(board.outcome(), GameResult::Tie);
    }

    #[test]
    fn test_render() {
        let board = Board::from_fen("w2/1B1/3 0:0 -:- w 0").map(|b| b.render());
        // 单个 B 不是合法 mil，解析失败
        assert!(board.is_err());
        let text = Board::new(3, 1).render();
        assert!(text.starts_with(" 1 . . ."));
        assert!(text.ends_with("   a b c \n"));
    }
}
