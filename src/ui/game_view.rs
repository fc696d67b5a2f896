use crate::game::{Cell, GameStatus, Mark, SIZE};
use crate::session::{GameMode, SessionSnapshot};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    snapshot: &SessionSnapshot,
    cursor: usize,
    message: &Option<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(11),  // Board
            Constraint::Length(3), // Message
            Constraint::Length(4), // Controls
        ])
        .split(frame.area());

    render_header(frame, snapshot, chunks[0]);
    render_board(frame, snapshot, cursor, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn mark_color(mark: Mark) -> Color {
    match mark {
        Mark::X => Color::Cyan,
        Mark::O => Color::Magenta,
    }
}

fn render_header(frame: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let (status, color) = match snapshot.status {
        GameStatus::InProgress(_) if snapshot.computer_thinking => {
            ("Computer is thinking...".to_string(), mark_color(snapshot.computer_mark))
        }
        GameStatus::InProgress(mark) => (format!("Current Player: {mark}"), mark_color(mark)),
        GameStatus::Won { mark, .. } => (format!("Player {mark} wins!"), mark_color(mark)),
        GameStatus::Draw => ("It's a draw!".to_string(), Color::White),
    };

    let header = Paragraph::new(format!("{}  |  {}", status, snapshot.mode))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("4x4 Tic-Tac-Toe"),
        );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, snapshot: &SessionSnapshot, cursor: usize, area: Rect) {
    let winning = snapshot.winning_line();
    let mut lines = Vec::new();

    lines.push(Line::from("╔════╦════╦════╦════╗"));

    for row in 0..SIZE {
        let mut row_spans = vec![Span::raw("║")];

        for col in 0..SIZE {
            let index = row * SIZE + col;
            let cell = snapshot.board.get(index).unwrap_or(Cell::Empty);
            let (symbol, mut style) = match cell.mark() {
                Some(mark) => (
                    format!(" {mark}  "),
                    Style::default().fg(mark_color(mark)).add_modifier(Modifier::BOLD),
                ),
                None => (format!(" {index:2} "), Style::default().fg(Color::DarkGray)),
            };
            if winning.is_some_and(|line| line.contains(index)) {
                style = style.bg(Color::Green).fg(Color::Black);
            }
            if index == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            row_spans.push(Span::styled(symbol, style));
            row_spans.push(Span::raw("║"));
        }

        lines.push(Line::from(row_spans));

        if row < SIZE - 1 {
            lines.push(Line::from("╠════╬════╬════╬════╣"));
        }
    }

    lines.push(Line::from("╚════╩════╩════╩════╝"));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let line1 = Line::from("Arrows: Move  |  Enter: Place  |  R: Restart  |  Q: Quit");
    let line2 = Line::from(vec![
        Span::raw("M: toggle mode   "),
        Span::styled("1", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}   ", GameMode::HumanVsHuman)),
        Span::styled("2", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}", GameMode::HumanVsComputer)),
    ]);

    let controls = Paragraph::new(vec![line1, line2])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}
