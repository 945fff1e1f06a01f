//! Mil AI CLI
//!
//! 命令行界面，用于对弈和测试 AI
//!
//! 支持三种模式：
//! 1. 对弈模式：人类与 AI 在终端中交替走子
//! 2. 单次命令模式：每次执行一个命令
//! 3. Server 模式：长驻进程，通过 stdin/stdout 通信

use clap::{Parser, Subcommand};
use log::info;
use mil_ai::{
    apply_move_to_fen, evaluate, evaluate_detail, get_legal_moves_from_fen, get_node_count,
    reset_node_count, AIConfig, AIEngine, Board, Color, Difficulty, GameConfig, GameResult,
    MilMove, Phase, Position, DEFAULT_BOARD_SIZE, DEFAULT_STARTING_PIECES, DEFAULT_TURN_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "mil-ai")]
#[command(about = "Mil (row-formation capture game) engine and AI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 与 AI 对弈
    Play {
        /// AI 难度 (easy, medium, hard)
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// 棋盘边长
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,

        /// 每方棋子数
        #[arg(long, default_value_t = DEFAULT_STARTING_PIECES)]
        pieces: u32,

        /// 回合上限
        #[arg(long, default_value_t = DEFAULT_TURN_LIMIT)]
        turn_limit: u32,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// AI 执子颜色 (white, black)
        #[arg(long, default_value = "black")]
        ai_color: Color,
    },

    /// 显示规则
    Rules,

    /// 获取合法走法
    Moves {
        /// FEN 字符串
        #[arg(long)]
        fen: String,
    },

    /// 选择最佳走法
    Best {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// AI 策略 (random, minimax, easy, medium, hard)
        #[arg(long, default_value = "medium")]
        strategy: String,

        /// 搜索深度（minimax 策略）
        #[arg(long, default_value = "3")]
        depth: u32,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 时间限制（秒）
        #[arg(long)]
        time_limit: Option<f64>,

        /// 返回的走法数量
        #[arg(long, default_value = "1")]
        n: usize,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 评估局面分数
    Score {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server,
}

#[derive(Serialize, Deserialize)]
struct MoveScore {
    #[serde(rename = "move")]
    mv: String,
    score: i32,
}

#[derive(Serialize, Deserialize)]
struct BestResponse {
    best: Option<String>,
    moves: Vec<MoveScore>,
    total: usize,
    nodes: u64,
    elapsed_ms: f64,
}

#[derive(Serialize, Deserialize)]
struct ScoreResponse {
    fen: String,
    score: i32,
    pieces: i32,
    pairs: i32,
    mils: i32,
}

// Server 模式的请求和响应结构
#[derive(Serialize, Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    fen: String,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    depth: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    time_limit: Option<f64>,
    #[serde(default)]
    n: Option<usize>,
    #[serde(default, rename = "move")]
    mv: Option<String>,
    /// 候选 mil 序号（从 0 开始）
    #[serde(default)]
    mil: Option<usize>,
    /// 吃子坐标，`-` 表示无子可吃
    #[serde(default)]
    capture: Option<String>,
}

#[derive(Serialize, Deserialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    best: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<MoveScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    fn success_best(best: Option<String>, moves: Vec<MoveScore>, nodes: u64, elapsed_ms: f64) -> Self {
        Self {
            ok: true,
            best,
            moves: Some(moves),
            nodes: Some(nodes),
            elapsed_ms: Some(elapsed_ms),
            ..Default::default()
        }
    }

    fn success_legal_moves(legal_moves: Vec<String>) -> Self {
        Self {
            ok: true,
            legal_moves: Some(legal_moves),
            ..Default::default()
        }
    }

    fn success_eval(eval_score: i32) -> Self {
        Self {
            ok: true,
            eval: Some(eval_score),
            ..Default::default()
        }
    }

    fn success_fen(fen: String) -> Self {
        Self {
            ok: true,
            fen: Some(fen),
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

const RULES: &str = "
GAME RULES

The goal of the game is to reduce the opponent to two pieces. Pieces are placed
on a square grid; once a player has only two pieces left (on the board and in
hand together) the game is over and the other player wins. The game is drawn
when the turn limit is reached.

Capture:
    - A capture removes one piece of the opponent from the board.
      The piece cannot be part of a mil.
    - Captures can occur during any phase of the game.

Mil:
    - A mil is three pieces of the same player next to each other in a
      row or a column.
    - A piece cannot be part of more than one mil at a time, even if it
      lies on both a full row and a full column.
    - Mils can be formed during any phase of the game.
    - After forming a mil, the player captures a piece.
    - Moving a piece out of a mil dissolves the mil.

Phase 1 (Placing):
    - Players take turns putting a piece on any vacant cell.
    - The phase ends for a player when all of their pieces are on the board.

Phase 2 (Moving):
    - Players take turns moving a piece to an adjacent vacant cell.
    - Only horizontal and vertical moves are allowed, never diagonal.
    - The phase ends when a player has only three pieces left.

Phase 3 (Flying):
    - A player with three pieces may move a piece to any vacant cell.
    - The game is over when a player is reduced to two pieces.

Coordinates are written as a column letter and a row number, e.g. a1.
";

fn calc_elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// 序列化为 JSON（失败时输出错误对象）
fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"{}\"}}", e))
}

fn exit_with_error(e: &str) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            difficulty,
            size,
            pieces,
            turn_limit,
            seed,
            ai_color,
        } => {
            let config = GameConfig {
                size,
                starting_pieces: pieces,
                turn_limit,
            };
            if let Err(e) = config.validate() {
                exit_with_error(&e);
            }
            info!("new game {}x{} pieces={} difficulty={}", size, size, pieces, difficulty);

            let stdin = io::stdin();
            let mut session = PlaySession {
                board: Board::with_config(config),
                engine: AIEngine::from_difficulty(difficulty, seed),
                ai_color,
                lines: stdin.lock().lines(),
            };
            session.run();
        }

        Commands::Rules => println!("{}", RULES),

        Commands::Moves { fen } => match get_legal_moves_from_fen(&fen) {
            Ok(moves) => {
                println!("Legal moves ({}):", moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
            Err(e) => exit_with_error(&e),
        },

        Commands::Best {
            fen,
            strategy,
            depth,
            seed,
            time_limit,
            n,
            json,
        } => {
            let config = AIConfig {
                depth,
                seed,
                time_limit,
            };
            let response = match run_best(&fen, &strategy, &config, n) {
                Ok(r) => r,
                Err(e) => exit_with_error(&e),
            };

            if json {
                println!("{}", to_json(&response, true));
            } else {
                match &response.best {
                    Some(best) => println!("Best move (strategy={}): {}", strategy, best),
                    None => println!("No legal moves (strategy={})", strategy),
                }
                for m in &response.moves {
                    println!("  {} (score: {})", m.mv, m.score);
                }
                println!(
                    "\nStats: nodes={}, time={:.3}ms",
                    response.nodes, response.elapsed_ms
                );
            }
        }

        Commands::Score { fen, json } => match Board::from_fen(&fen) {
            Ok(board) => {
                let detail = evaluate_detail(&board);
                if json {
                    let response = ScoreResponse {
                        fen,
                        score: detail.total(),
                        pieces: detail.pieces,
                        pairs: detail.pairs,
                        mils: detail.mils,
                    };
                    println!("{}", to_json(&response, true));
                } else {
                    println!("局面评估 (白方视角): {}", detail.total());
                    println!(
                        "  pieces={} pairs={} mils={}",
                        detail.pieces, detail.pairs, detail.mils
                    );
                }
            }
            Err(e) => exit_with_error(&e),
        },

        Commands::Server => run_server(),
    }
}

/// 执行 best 命令：最佳决策 + 前 n 个根走法
fn run_best(fen: &str, strategy: &str, config: &AIConfig, n: usize) -> Result<BestResponse, String> {
    let mut ai = AIEngine::from_strategy(strategy, config)?;

    reset_node_count();
    let start = Instant::now();

    let best = ai.select_best_move_fen(fen)?;
    let moves: Vec<MoveScore> = ai
        .select_moves_fen(fen, n)?
        .into_iter()
        .map(|(mv, score)| MoveScore { mv, score })
        .collect();

    Ok(BestResponse {
        best,
        total: moves.len(),
        moves,
        nodes: get_node_count(),
        elapsed_ms: calc_elapsed_ms(start),
    })
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        let request: ServerRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let response = ServerResponse::error(&format!("Invalid JSON: {}", e));
                println!("{}", to_json(&response, false));
                let _ = stdout.flush();
                continue;
            }
        };

        let response = match request.cmd.as_str() {
            "best" => handle_best_request(&request),
            "moves" => handle_moves_request(&request),
            "eval" => handle_eval_request(&request),
            "apply" => handle_apply_request(&request),
            "quit" => break,
            _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
        };

        println!("{}", to_json(&response, false));
        let _ = stdout.flush();
    }
}

/// 处理 best 命令
fn handle_best_request(request: &ServerRequest) -> ServerResponse {
    let strategy = request.strategy.as_deref().unwrap_or("medium");
    let config = AIConfig {
        depth: request.depth.unwrap_or(3),
        seed: request.seed,
        time_limit: request.time_limit,
    };

    match run_best(&request.fen, strategy, &config, request.n.unwrap_or(5)) {
        Ok(r) => ServerResponse::success_best(r.best, r.moves, r.nodes, r.elapsed_ms),
        Err(e) => ServerResponse::error(&format!("AI error: {}", e)),
    }
}

/// 处理 moves 命令
fn handle_moves_request(request: &ServerRequest) -> ServerResponse {
    match get_legal_moves_from_fen(&request.fen) {
        Ok(moves) => ServerResponse::success_legal_moves(moves),
        Err(e) => ServerResponse::error(&format!("Invalid FEN: {}", e)),
    }
}

/// 处理 eval 命令（静态评估，白方视角）
fn handle_eval_request(request: &ServerRequest) -> ServerResponse {
    match Board::from_fen(&request.fen) {
        Ok(board) => ServerResponse::success_eval(evaluate(&board)),
        Err(e) => ServerResponse::error(&format!("Invalid FEN: {}", e)),
    }
}

/// 处理 apply 命令：执行走法和吃子，返回新 FEN
fn handle_apply_request(request: &ServerRequest) -> ServerResponse {
    let mv = match &request.mv {
        Some(mv) => mv,
        None => return ServerResponse::error("Missing move"),
    };
    let target = request.capture.as_deref().filter(|t| *t != "-");
    let capture = match (request.mil, &request.capture) {
        (None, None) => None,
        (mil, _) => Some((mil.unwrap_or(0), target)),
    };

    match apply_move_to_fen(&request.fen, mv, capture) {
        Ok(fen) => ServerResponse::success_fen(fen),
        Err(e) => ServerResponse::error(&e),
    }
}

/// 终端对弈
struct PlaySession<L: Iterator<Item = io::Result<String>>> {
    board: Board,
    engine: AIEngine,
    ai_color: Color,
    lines: L,
}

impl<L: Iterator<Item = io::Result<String>>> PlaySession<L> {
    fn run(&mut self) {
        while self.board.is_playing() {
            self.print_status();

            let color = self.board.current_turn();
            if self.board.get_legal_moves().is_empty() {
                println!("{} has no legal move and passes.", color);
                self.board.switch_turn();
                continue;
            }

            let finished = if color == self.ai_color {
                self.ai_turn()
            } else {
                self.human_turn()
            };
            if !finished {
                return;
            }

            self.board.switch_turn();
        }

        println!("{}", self.board.render());
        println!("Game over!");
        match self.board.outcome() {
            GameResult::Tie => println!("It's a tie!"),
            GameResult::WhiteWin => println!("White wins!"),
            GameResult::BlackWin => println!("Black wins!"),
            GameResult::Playing => {}
        }
    }

    fn print_status(&self) {
        let color = self.board.current_turn();
        println!("{}", self.board.render());
        println!("Turn: {}", self.board.turn_count());
        println!("It's {}'s turn!", color);
        println!("Phase: {}", self.board.phase(color));
        if self.board.hand(color) > 0 {
            println!("Pieces on hand: {}", self.board.hand(color));
        }
        println!("Pieces left: {}", self.board.pieces(color));
        println!("Evaluation: {}", evaluate(&self.board));
    }

    /// 读取一行输入，EOF 返回 None
    fn prompt(&mut self, text: &str) -> Option<String> {
        print!("{}", text);
        let _ = io::stdout().flush();
        match self.lines.next() {
            Some(Ok(line)) => Some(line.trim().to_string()),
            _ => None,
        }
    }

    /// 读取棋盘内坐标；输入 quit 认输
    fn read_position(&mut self, text: &str) -> Option<Position> {
        loop {
            let input = self.prompt(text)?;
            if input == "quit" {
                let winner = self.board.current_turn().opposite();
                self.board.set_outcome(GameResult::win_for(winner));
                return None;
            }
            match Position::from_fen_str(&input) {
                Some(pos) if pos.is_valid(self.board.size()) => return Some(pos),
                _ => println!("Invalid input. Please enter coordinates in the format a1."),
            }
        }
    }

    /// 人类走子；返回 false 表示输入结束或认输
    fn human_turn(&mut self) -> bool {
        let color = self.board.current_turn();
        let (result, mv) = loop {
            let from = if self.board.phase(color) == Phase::Placing {
                None
            } else {
                match self.read_position("Enter the starting coordinate: ") {
                    Some(p) => Some(p),
                    None => return self.resigned(),
                }
            };
            let to = match self.read_position("Enter the destination coordinate: ") {
                Some(p) => p,
                None => return self.resigned(),
            };

            let mv = match from {
                Some(f) => MilMove::step(f, to),
                None => MilMove::place(to),
            };
            let result = self.board.apply_move(&mv);
            if result.is_applied() {
                break (result, mv);
            }
            println!("Invalid move. Try again.");
        };
        info!("{} played {}", color, mv);

        let mils = result.mil_choices();
        if mils.is_empty() {
            return true;
        }

        let mil = if mils.len() > 1 {
            print_mils(mils);
            loop {
                let input = match self.prompt(&format!("Select mil 1-{}: ", mils.len())) {
                    Some(i) => i,
                    None => return false,
                };
                match input.parse::<usize>() {
                    Ok(k) if (1..=mils.len()).contains(&k) => break mils[k - 1],
                    _ => continue,
                }
            }
        } else {
            mils[0]
        };

        if self.board.removable_pieces(color.opposite()).is_empty() {
            println!("No opponent piece can be captured.");
            return self.board.resolve_capture(&mil, None);
        }

        loop {
            let target = match self.read_position("Enter the opponent piece to remove: ") {
                Some(t) => t,
                None => return self.resigned(),
            };
            if self.board.resolve_capture(&mil, Some(target)) {
                return true;
            }
            println!("That piece cannot be captured. Try again.");
        }
    }

    /// 认输后对局已结束
    fn resigned(&self) -> bool {
        !self.board.is_playing()
    }

    fn ai_turn(&mut self) -> bool {
        let decision = match self.engine.choose_move(&self.board) {
            Some(d) => d,
            None => return true,
        };
        println!("AI plays {}", decision);
        if let Some(capture) = decision.capture {
            print_mils(&[capture.mil]);
        }
        if !decision.apply(&mut self.board) {
            eprintln!("AI produced an illegal decision: {}", decision);
            return false;
        }
        true
    }
}

fn print_mils(mils: &[mil_ai::Mil]) {
    println!("Mils created:");
    for (i, mil) in mils.iter().enumerate() {
        println!("{}: {}", i + 1, mil);
    }
}
