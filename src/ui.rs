use crate::client::AppSnapshot;
use color_eyre::eyre::Result;
use crossterm::{
    event::{
        Event,
        KeyCode,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use itertools::Itertools;
use limbo_client::{
    GameStatus,
    RevealPhase,
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::stdout;

pub enum UserEvent {
    Quit,
    Redraw,
    PlaceBet { stake: f64, target_multiplier: f64 },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Stake,
    Multiplier,
}

#[derive(Debug)]
pub struct UiState {
    focus: Field,
    stake_input: String,
    multiplier_input: String,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl UiState {
    pub fn new(default_target_multiplier: f64) -> Self {
        UiState {
            focus: Field::Stake,
            stake_input: String::from("0"),
            multiplier_input: format!("{default_target_multiplier:.2}"),
            terminal: None,
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Field::Stake => &mut self.stake_input,
            Field::Multiplier => &mut self.multiplier_input,
        }
    }

    fn scale_stake(&mut self, factor: f64) {
        let current = self.stake_input.parse::<f64>().unwrap_or(0.0);
        self.stake_input = trim_amount(current * factor);
    }
}

fn trim_amount(value: f64) -> String {
    let text = format!("{value:.8}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Unparseable input becomes NaN so validation reports it as invalid.
fn parse_input(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let Event::Key(k) = event else {
        return match event {
            Event::Resize(..) => Some(UserEvent::Redraw),
            _ => None,
        };
    };
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UserEvent::Quit),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            state.focus = match state.focus {
                Field::Stake => Field::Multiplier,
                Field::Multiplier => Field::Stake,
            };
            Some(UserEvent::Redraw)
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
            let input = state.focused_input();
            if input == "0" && c != '.' {
                input.clear();
            }
            input.push(c);
            Some(UserEvent::Redraw)
        }
        KeyCode::Backspace => {
            state.focused_input().pop();
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('[') => {
            state.scale_stake(0.5);
            Some(UserEvent::Redraw)
        }
        KeyCode::Char(']') => {
            state.scale_stake(2.0);
            Some(UserEvent::Redraw)
        }
        KeyCode::Enter | KeyCode::Char(' ') => Some(UserEvent::PlaceBet {
            stake: parse_input(&state.stake_input),
            target_multiplier: parse_input(&state.multiplier_input),
        }),
        _ => None,
    }
}

/// Readout for the big multiplier; an idle zero shows as `1.00×`.
fn format_multiplier(value: f64) -> String {
    if value == 0.0 {
        String::from("1.00×")
    } else {
        format!("{value:.2}×")
    }
}

fn status_color(status: Option<GameStatus>) -> Color {
    match status {
        Some(GameStatus::Win) => Color::Green,
        Some(GameStatus::Lose) => Color::Red,
        None => Color::White,
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // result strip
            Constraint::Min(11),   // bet form + readout
            Constraint::Length(6), // table limits
            Constraint::Length(6), // status/errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_history_strip(f, chunks[0], snap);
    draw_middle(f, state, chunks[1], snap);
    draw_limits(f, chunks[2], snap);
    draw_status(f, chunks[3], snap);
    draw_help(f, chunks[4]);
}

fn draw_history_strip(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let line = if snap.history.is_empty() {
        Line::styled("No rounds yet", Style::default().fg(Color::DarkGray))
    } else {
        let spans = snap.history.iter().map(|text| {
            let color = if text == "0.00" {
                Color::DarkGray
            } else {
                Color::Green
            };
            Span::styled(format!("{text}×"), Style::default().fg(color))
        });
        let spans: Vec<_> = Itertools::intersperse(spans, Span::raw("  ")).collect();
        Line::from(spans)
    };
    let strip =
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("History"));
    f.render_widget(strip, area);
}

fn draw_middle(f: &mut Frame, state: &UiState, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(20)])
        .split(area);

    let field_style = |field: Field| {
        if state.focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let mut lines = vec![
        Line::from(format!("Balance: ${:.2}", snap.balance)),
        Line::from(""),
        Line::styled(
            format!("Bet Amount: {}", state.stake_input),
            field_style(Field::Stake),
        ),
        Line::styled(
            format!("Target Multiplier: {}×", state.multiplier_input),
            field_style(Field::Multiplier),
        ),
        Line::from(""),
    ];
    if snap.awaiting_outcome {
        lines.push(Line::styled(
            "Waiting for result...",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        lines.push(Line::from("Enter: Place Bet"));
    }
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Bet"));
    f.render_widget(form, cols[0]);

    // the last round's colour only shows once its reveal is over
    let status = match snap.phase {
        RevealPhase::Revealing => None,
        RevealPhase::Idle | RevealPhase::Settled => snap.round_status,
    };
    let readout_block = Block::default().borders(Borders::ALL).title("Limbo");
    let inner = readout_block.inner(cols[1]);
    f.render_widget(readout_block, cols[1]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(inner);
    let readout = Paragraph::new(format_multiplier(snap.display_value))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(status_color(status))
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(readout, rows[1]);
}

fn draw_limits(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let lines = vec![
        Line::from(format!("House Edge      {:.0}%", snap.house_edge * 100.0)),
        Line::from(format!("Max Bet         {:.2}", snap.limits.max_bet)),
        Line::from(format!("Max Win         {:.2}", snap.limits.max_win)),
        Line::from(format!("Max Multiplier  {:.2}×", snap.limits.max_multiplier)),
    ];
    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Table"));
    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let widget = if snap.errors.is_empty() {
        let text = if snap.status.trim().is_empty() {
            "Ready"
        } else {
            snap.status.as_str()
        };
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        let lines: Vec<Line> = snap.errors.iter().map(|e| Line::from(e.clone())).collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "0-9 . edit | Tab switch field | [ half | ] double | Enter place bet | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}
