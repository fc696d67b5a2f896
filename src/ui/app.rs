use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};

use crate::error::{InvalidMove, MoveError};
use crate::game::{Board, GameStatus, CELLS, SIZE};
use crate::session::{Actor, GameController, GameMode, GameSession, SessionEvent};

/// Longest the event loop blocks waiting for input.
const INPUT_POLL: Duration = Duration::from_millis(100);

pub struct App {
    session: GameSession,
    events: Receiver<SessionEvent>,
    cursor: usize,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    pub fn new(mut session: GameSession) -> Self {
        let events = session.subscribe();
        App {
            session,
            events,
            cursor: 5, // Start near the middle
            should_quit: false,
            message: None,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal
                .draw(|f| self.render(f))
                .map_err(Into::<io::Error>::into)?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.session.on_tick(Instant::now());
            self.drain_session_events();
        }
        Ok(())
    }

    /// Handle keyboard events, waking early when the computer's reply is due
    fn handle_events(&mut self) -> io::Result<()> {
        let timeout = self
            .session
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()).min(INPUT_POLL))
            .unwrap_or(INPUT_POLL);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.place_mark();
            }
            KeyCode::Char('r') => {
                self.session.on_reset();
            }
            KeyCode::Char('m') => {
                let mode = self.session.mode().toggled();
                self.session.on_set_mode(mode);
            }
            KeyCode::Char('1') => self.session.on_set_mode(GameMode::HumanVsHuman),
            KeyCode::Char('2') => self.session.on_set_mode(GameMode::HumanVsComputer),
            _ => {}
        }
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let (row, col) = Board::row_col(self.cursor);
        let (row, col) = (row as isize + d_row, col as isize + d_col);
        let max = SIZE as isize - 1;
        let (row, col) = (row.clamp(0, max) as usize, col.clamp(0, max) as usize);
        self.cursor = (row * SIZE + col).min(CELLS - 1);
    }

    /// Place the current mark at the cursor
    fn place_mark(&mut self) {
        if let Err(error) = self.session.on_cell_activated(self.cursor) {
            self.message = Some(match error {
                MoveError::InvalidMove(InvalidMove::GameOver) => {
                    "Game over! Press 'r' to restart.".to_string()
                }
                other => capitalize(&other.to_string()),
            });
        }
    }

    fn drain_session_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::GameOver(status) => {
                    self.message = Some(self.outcome_message(status));
                }
                SessionEvent::Reset { mode } => {
                    self.message = Some(format!("New game: {mode}"));
                }
                SessionEvent::MovePlayed {
                    index,
                    actor: Actor::Computer,
                    ..
                } => {
                    self.message = Some(format!("Computer plays at position {index}"));
                }
                _ => {}
            }
        }
    }

    fn outcome_message(&self, status: GameStatus) -> String {
        match status {
            GameStatus::Won { mark, .. } => {
                if self.session.mode() == GameMode::HumanVsComputer
                    && mark == self.session.computer_mark()
                {
                    format!("Computer ({mark}) wins!")
                } else {
                    format!("Player {mark} wins!")
                }
            }
            GameStatus::Draw => "It's a draw!".to_string(),
            GameStatus::InProgress(_) => String::new(),
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, &self.session.snapshot(), self.cursor, &self.message);
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
