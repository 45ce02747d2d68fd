use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::game::{GameState, Mode, Position, Round};
use crate::metrics::GameMetrics;

/// Terminal columns used for one grid cell
const CELL_COLUMNS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Food,
    Body,
    Head,
}

impl Cell {
    fn span(self) -> Span<'static> {
        match self {
            Cell::Head => Span::styled(
                "■ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
            Cell::Food => Span::styled(
                "● ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        }
    }
}

/// Draws the game state. Holds no game logic.
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let round = match (state.mode, state.round.as_ref()) {
            (Mode::Menu, _) | (_, None) => {
                self.render_menu(frame, metrics);
                return;
            }
            (_, Some(round)) => round,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(round, metrics), chunks[0]);

        let grid_area = centered_rect(
            terminal_extent(state.grid_width, CELL_COLUMNS),
            terminal_extent(state.grid_height, 1),
            chunks[1],
        );
        frame.render_widget(self.render_grid(state, round), grid_area);

        match state.mode {
            Mode::Paused => self.render_overlay(
                frame,
                grid_area,
                vec![
                    Line::from(Span::styled(
                        "PAUSED",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from("P: Resume | Esc: Menu"),
                ],
                Color::Yellow,
            ),
            Mode::GameOver => self.render_overlay(
                frame,
                grid_area,
                vec![
                    Line::from(Span::styled(
                        "GAME OVER",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                        Span::styled(
                            round.score.to_string(),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(""),
                    Line::from("Space/Enter: Restart | Esc: Menu"),
                ],
                Color::Red,
            ),
            Mode::Playing | Mode::Menu => {}
        }

        frame.render_widget(self.render_controls(state.mode), chunks[2]);
    }

    fn render_menu(&self, frame: &mut Frame, metrics: &GameMetrics) {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "SNAKE GAME",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Press "),
                Span::styled("Enter", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("Space", Style::default().fg(Color::Cyan)),
                Span::raw(" to play"),
            ]),
            Line::from(vec![
                Span::raw("Press "),
                Span::styled("Esc", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]),
        ];

        if metrics.rounds_played > 0 {
            text.push(Line::from(""));
            text.push(Line::from(format!(
                "Best this session: {} ({} played)",
                metrics.best_score, metrics.rounds_played
            )));
        }

        let height = text.len() as u16 + 3;
        let area = centered_rect(44, height, frame.area());
        let menu = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(menu, area);
    }

    fn render_grid(&self, state: &GameState, round: &Round) -> Paragraph<'_> {
        let width = state.grid_width;
        let mut cells = vec![Cell::Empty; width * state.grid_height];
        let mut paint = |pos: Position, cell: Cell| {
            if state.is_in_bounds(pos) {
                cells[pos.y as usize * width + pos.x as usize] = cell;
            }
        };

        paint(round.food, Cell::Food);
        for segment in round.snake.iter().skip(1) {
            paint(*segment, Cell::Body);
        }
        paint(round.snake.head(), Cell::Head);

        let lines: Vec<Line> = cells
            .chunks(width.max(1))
            .map(|row| Line::from(row.iter().map(|cell| cell.span()).collect::<Vec<_>>()))
            .collect();

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, round: &Round, metrics: &GameMetrics) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                round.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                metrics.best_score.max(round.score).to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_overlay(&self, frame: &mut Frame, grid: Rect, text: Vec<Line<'static>>, color: Color) {
        let height = text.len() as u16 + 2;
        let area = centered_rect(40, height, grid);

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            area,
        );
    }

    fn render_controls(&self, mode: Mode) -> Paragraph<'_> {
        let text = match mode {
            Mode::Playing => Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("P", Style::default().fg(Color::Yellow)),
                Span::raw(" to pause"),
            ]),
            Mode::Paused => Line::from(vec![
                Span::styled("P", Style::default().fg(Color::Yellow)),
                Span::raw(" to resume | "),
                Span::styled("Esc", Style::default().fg(Color::Red)),
                Span::raw(" for menu"),
            ]),
            Mode::GameOver | Mode::Menu => Line::from(vec![
                Span::styled("Space/Enter", Style::default().fg(Color::Green)),
                Span::raw(" to restart | "),
                Span::styled("Esc", Style::default().fg(Color::Red)),
                Span::raw(" for menu"),
            ]),
        };

        Paragraph::new(vec![text]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal cells needed for `cells` grid cells plus a border on each side
fn terminal_extent(cells: usize, columns_per_cell: u16) -> u16 {
    u16::try_from(cells)
        .unwrap_or(u16::MAX)
        .saturating_mul(columns_per_cell)
        .saturating_add(2)
}

/// A `width` x `height` rect centred in `area`, clipped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
