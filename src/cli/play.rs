//! Play command implementation - interactive terminal front-end.

// Cell coordinates and widths fit comfortably in u16
#![allow(clippy::cast_possible_truncation, clippy::needless_pass_by_value)]

use super::{CliError, RoundSetup};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use xonix::{
    ActorId, Cell, Coord, Direction, Intent, Leaderboard, Outcome, RoundStatus, Session, Theme,
    ThemeCatalog, Variant,
};

/// Frame budget for input polling.
const FRAME: Duration = Duration::from_millis(16);

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if the round cannot be set up, the theme is unknown, or the
/// terminal fails.
pub(crate) fn execute(
    setup: RoundSetup,
    theme: &str,
    save_file: PathBuf,
    leaderboard: Option<PathBuf>,
    names: Vec<String>,
) -> Result<(), CliError> {
    let catalog = ThemeCatalog::builtin();
    let theme = theme
        .parse::<u32>()
        .ok()
        .and_then(|id| catalog.lookup(id))
        .or_else(|| catalog.lookup_name(theme))
        .ok_or_else(|| CliError::new(format!("Unknown theme: {theme}")))?
        .clone();

    let session: Session = Session::new(&setup.config, setup.variant, setup.seed)?;
    let mut app = App::new(session, setup.variant, &theme, save_file);

    let outcome = run_tui(&mut app)?;
    print_outcome(&outcome);

    if let Some(path) = leaderboard {
        let mut board = Leaderboard::load(&path)?;
        let scores = app.session.scores();
        for (i, score) in scores.iter().enumerate() {
            let name = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Player {}", i + 1));
            board.record(&name, *score);
        }
        board.save(&path)?;
        info!(path = %path.display(), "leaderboard updated");
    }

    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Solo { score } => println!("Final score: {score}"),
        Outcome::Winner { actor, scores } => {
            println!("Player {actor} wins! Scores: {scores:?}");
        }
        Outcome::Draw { scores } => println!("Draw. Scores: {scores:?}"),
    }
}

/// Colours of a theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    claimed: Color,
    open: Color,
    trails: [Color; 2],
    enemy: Color,
    accent: Color,
}

impl Palette {
    fn for_theme(theme: &Theme) -> Self {
        let (claimed, trails, enemy, accent) = match theme.id {
            2 => (Color::Green, [Color::LightGreen, Color::Yellow], Color::White, Color::Green),
            3 => (
                Color::Magenta,
                [Color::LightCyan, Color::LightYellow],
                Color::LightRed,
                Color::LightMagenta,
            ),
            4 => (Color::Gray, [Color::White, Color::DarkGray], Color::White, Color::White),
            5 => (
                Color::Rgb(255, 140, 0),
                [Color::Yellow, Color::LightRed],
                Color::Red,
                Color::Yellow,
            ),
            6 => (
                Color::Rgb(128, 0, 160),
                [Color::LightMagenta, Color::Cyan],
                Color::LightGreen,
                Color::Magenta,
            ),
            7 => (
                Color::Rgb(101, 67, 33),
                [Color::LightGreen, Color::Yellow],
                Color::Red,
                Color::Green,
            ),
            _ => (Color::Blue, [Color::LightCyan, Color::LightMagenta], Color::Red, Color::Cyan),
        };
        Self {
            claimed,
            open: Color::Black,
            trails,
            enemy,
            accent,
        }
    }
}

/// App state for the TUI.
struct App {
    session: Session,
    variant: Variant,
    theme_name: String,
    palette: Palette,
    save_file: PathBuf,
    message: Option<String>,
    last_frame: Instant,
}

impl App {
    fn new(session: Session, variant: Variant, theme: &Theme, save_file: PathBuf) -> Self {
        Self {
            session,
            variant,
            theme_name: theme.name.clone(),
            palette: Palette::for_theme(theme),
            save_file,
            message: None,
            last_frame: Instant::now(),
        }
    }

    fn steer(&mut self, actor: ActorId, dir: Direction) {
        if actor == 2 && self.variant != Variant::Dual {
            return;
        }
        self.session.handle(Intent::Steer(actor, dir));
    }

    fn toggle_pause(&mut self) {
        let intent = if self.session.status() == RoundStatus::Paused {
            Intent::Resume
        } else {
            Intent::Pause
        };
        self.session.handle(intent);
    }

    fn freeze(&mut self, actor: ActorId) {
        if self.session.handle(Intent::Freeze(actor)) {
            self.message = Some(format!("Player {actor} froze the board"));
        }
    }

    fn save(&mut self) {
        self.message = Some(match self.session.save(&self.save_file) {
            Ok(()) => format!("Saved to {}", self.save_file.display()),
            Err(e) => format!("Save failed: {e}"),
        });
    }

    fn load(&mut self) {
        self.message = Some(match self.session.load(&self.save_file) {
            Ok(()) => format!("Loaded {} (paused)", self.save_file.display()),
            Err(e) => format!("Load failed: {e}"),
        });
    }

    /// Feed wall-clock time into the session.
    fn tick(&mut self) {
        let now = Instant::now();
        self.session.advance(now - self.last_frame);
        self.last_frame = now;
    }
}

fn run_tui(app: &mut App) -> Result<Outcome, CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result?;
    Ok(app.session.exit())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Handle input with timeout
        if event::poll(FRAME)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Esc => app.toggle_pause(),
                KeyCode::F(5) => app.save(),
                KeyCode::F(9) => app.load(),
                KeyCode::Left => app.steer(1, Direction::Left),
                KeyCode::Right => app.steer(1, Direction::Right),
                KeyCode::Up => app.steer(1, Direction::Up),
                KeyCode::Down => app.steer(1, Direction::Down),
                KeyCode::Char('a') => app.steer(2, Direction::Left),
                KeyCode::Char('d') => app.steer(2, Direction::Right),
                KeyCode::Char('w') => app.steer(2, Direction::Up),
                KeyCode::Char('s') => app.steer(2, Direction::Down),
                KeyCode::Char('t') => app.freeze(1),
                KeyCode::Char('p') => app.freeze(2),
                _ => {}
            }
        }

        app.tick();
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Board and stats
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let grid = app.session.engine().grid();
    let board_width = grid.width() * 2 + 2;
    let main_chunks = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Min(24)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);
    render_stats(f, main_chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let engine = app.session.engine();
    let status = match app.session.status() {
        RoundStatus::Running => "RUNNING".to_string(),
        RoundStatus::Paused => "PAUSED".to_string(),
        RoundStatus::Over(Outcome::Solo { score }) => format!("GAME OVER - {score} points"),
        RoundStatus::Over(Outcome::Winner { actor, .. }) => format!("PLAYER {actor} WINS"),
        RoundStatus::Over(Outcome::Draw { .. }) => "DRAW".to_string(),
    };

    let title = format!(
        " Xonix | {} | Tick {} | {status} ",
        app.theme_name,
        engine.tick_count()
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(app.palette.accent).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let engine = app.session.engine();
    let grid = engine.grid();
    let palette = app.palette;

    let visible_width = area.width.saturating_sub(2) / 2;
    let visible_height = area.height.saturating_sub(2);

    let enemy_cells: Vec<Coord> = engine.enemy_cells().collect();
    let mut lines: Vec<Line> = Vec::new();

    for y in 0..grid.height().min(visible_height) {
        let mut spans = Vec::new();
        for x in 0..grid.width().min(visible_width) {
            let coord = Coord::new(x, y);
            let actor = engine.actors().iter().find(|a| a.pos == coord);
            let span = if let Some(actor) = actor {
                let color = palette.trails[usize::from(actor.id - 1) % 2];
                let glyph = if actor.alive { "@@" } else { "xx" };
                Span::styled(glyph, Style::default().fg(Color::Black).bg(color))
            } else if enemy_cells.contains(&coord) {
                Span::styled("()", Style::default().fg(palette.enemy).add_modifier(Modifier::BOLD))
            } else {
                match grid.get(coord) {
                    Cell::Claimed => Span::styled("  ", Style::default().bg(palette.claimed)),
                    Cell::Trail(owner) => {
                        let color = palette.trails[usize::from(owner.saturating_sub(1)) % 2];
                        Span::styled("  ", Style::default().bg(color))
                    }
                    Cell::Open | Cell::Scratch => {
                        Span::styled("  ", Style::default().bg(palette.open))
                    }
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let board =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Board "));
    f.render_widget(board, area);
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let engine = app.session.engine();
    let grid = engine.grid();
    let mut lines = vec![Line::from("")];

    for actor in engine.actors() {
        let color = app.palette.trails[usize::from(actor.id - 1) % 2];
        let status = if !actor.alive {
            " [DEAD]"
        } else if actor.is_frozen() {
            " [FROZEN]"
        } else if actor.drawing {
            " [DRAWING]"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("Player {}", actor.id),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(status),
        ]));
        lines.push(Line::from(format!("  Score: {}", app.session.score(actor.id))));
        lines.push(Line::from(format!("  Power-ups: {}", app.session.power_ups(actor.id))));
        lines.push(Line::from(""));
    }

    let interior =
        u32::from(grid.width().saturating_sub(2)) * u32::from(grid.height().saturating_sub(2));
    let claimed = interior.saturating_sub(grid.count_open());
    lines.push(Line::from(format!("Claimed: {claimed}/{interior}")));
    lines.push(Line::from(format!("Enemies: {}", engine.enemies().len())));
    let freeze = app.session.freeze_remaining();
    if !freeze.is_zero() {
        lines.push(Line::from(Span::styled(
            format!("Frozen: {:.1}s", freeze.as_secs_f64()),
            Style::default().fg(app.palette.accent),
        )));
    }
    if let Some(message) = &app.message {
        lines.push(Line::from(""));
        lines.push(Line::from(message.as_str()));
    }

    let stats = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Players "))
        .wrap(Wrap { trim: false });

    f.render_widget(stats, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.session.is_over() {
        " [q] Quit "
    } else if app.variant == Variant::Dual {
        " [←↑↓→] P1  [WASD] P2  [t/p] Freeze  [Esc] Pause  [F5] Save  [F9] Load  [q] Quit "
    } else {
        " [←↑↓→] Move  [t] Freeze  [Esc] Pause  [F5] Save  [F9] Load  [q] Quit "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
