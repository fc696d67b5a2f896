use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::events::{Actor, SessionEvent};
use super::schedule::ScheduledMove;
use super::GameMode;
use crate::ai::Agent;
use crate::error::{InvalidMove, MoveError};
use crate::game::{Board, GameState, GameStatus, Line, Mark};

/// Session settings, loadable from the `[session]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: GameMode,
    /// Mark played by the computer in human-vs-computer mode.
    pub computer_mark: Mark,
    /// Pause before the computer replies, in milliseconds.
    pub computer_delay_ms: u64,
}

impl SessionConfig {
    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.computer_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            mode: GameMode::HumanVsComputer,
            computer_mark: Mark::O,
            computer_delay_ms: 500,
        }
    }
}

/// Immutable view of everything a front-end needs to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub board: Board,
    pub status: GameStatus,
    pub mode: GameMode,
    pub computer_mark: Mark,
    /// A computer reply is scheduled and has not fired yet.
    pub computer_thinking: bool,
    pub generation: u64,
}

impl SessionSnapshot {
    pub fn winning_line(&self) -> Option<Line> {
        match self.status {
            GameStatus::Won { line, .. } => Some(line),
            _ => None,
        }
    }
}

/// The narrow interface a presentation layer drives the game through.
pub trait GameController {
    /// A cell was clicked or selected.
    fn on_cell_activated(&mut self, index: usize) -> Result<GameStatus, MoveError>;
    fn on_reset(&mut self);
    fn on_set_mode(&mut self, mode: GameMode);
    /// Give a scheduled computer move the chance to fire. Returns the cell it
    /// played, if any.
    fn on_tick(&mut self, now: Instant) -> Option<usize>;
    fn snapshot(&self) -> SessionSnapshot;
}

/// One game of four-in-a-row plus the mode it is played in.
///
/// All mutation goes through [`GameSession::request_move`], the scheduled
/// computer move, [`GameSession::reset`] and [`GameSession::set_mode`].
pub struct GameSession {
    state: GameState,
    mode: GameMode,
    computer_mark: Mark,
    delay: Duration,
    agent: Box<dyn Agent>,
    generation: u64,
    pending: Option<ScheduledMove>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl GameSession {
    pub fn new(config: &SessionConfig, agent: Box<dyn Agent>) -> Self {
        let mut session = GameSession {
            state: GameState::initial(),
            mode: config.mode,
            computer_mark: config.computer_mark,
            delay: config.computer_delay(),
            agent,
            generation: 0,
            pending: None,
            subscribers: Vec::new(),
        };
        info!(
            mode = %session.mode,
            computer = %session.computer_mark,
            agent = session.agent.name(),
            "game session started"
        );
        session.schedule_computer_if_due();
        session
    }

    /// Register for state-change notifications. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn computer_mark(&self) -> Mark {
        self.computer_mark
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_computer_move(&self) -> Option<ScheduledMove> {
        self.pending
    }

    pub fn is_computer_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending computer move is due, as a hint for the caller's
    /// event-loop timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|ticket| ticket.due_at())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: *self.state.board(),
            status: self.state.status(),
            mode: self.mode,
            computer_mark: self.computer_mark,
            computer_thinking: self.is_computer_thinking(),
            generation: self.generation,
        }
    }

    /// Play a human move on the current mark's behalf.
    pub fn request_move(&mut self, index: usize) -> Result<GameStatus, MoveError> {
        let result = self.check_human_turn().and_then(|mark| {
            let status = self.state.apply_move_mut(index)?;
            Ok((mark, status))
        });

        match result {
            Ok((mark, status)) => {
                debug!(index, %mark, "human move");
                self.after_move(index, mark, Actor::Human);
                Ok(status)
            }
            Err(error) => {
                debug!(index, %error, "move rejected");
                self.emit(SessionEvent::MoveRejected { index, error });
                Err(error)
            }
        }
    }

    /// Fire the pending computer move if it is due at `now`.
    pub fn poll_computer_move(&mut self, now: Instant) -> Option<usize> {
        let ticket = self.pending.filter(|ticket| ticket.is_due(now))?;
        self.fire_scheduled(ticket)
    }

    /// Run the computer move a ticket was issued for. A ticket from an earlier
    /// generation, or one that is no longer pending, does nothing.
    pub fn fire_scheduled(&mut self, ticket: ScheduledMove) -> Option<usize> {
        if ticket.generation() != self.generation || self.pending != Some(ticket) {
            debug!(
                ticket_generation = ticket.generation(),
                generation = self.generation,
                "stale computer move ignored"
            );
            return None;
        }
        self.pending = None;

        let mark = self.computer_mark;
        if self.state.current_mark() != Some(mark) {
            warn!(status = ?self.state.status(), "computer move fired out of turn");
            return None;
        }

        let chosen = self.agent.select_move(self.state.board(), mark);
        let index = match chosen {
            Some(index) if self.state.board().is_occupied(index) == Ok(false) => index,
            _ => {
                // The human stays locked out until the computer has moved
                let fallback = self.state.board().empty_cells().first().copied()?;
                warn!(
                    ?chosen,
                    fallback,
                    agent = self.agent.name(),
                    "computer chose an unusable cell"
                );
                fallback
            }
        };

        match self.state.apply_move_mut(index) {
            Ok(_) => {
                debug!(index, %mark, agent = self.agent.name(), "computer move");
                self.after_move(index, mark, Actor::Computer);
                Some(index)
            }
            Err(error) => {
                warn!(index, %error, agent = self.agent.name(), "computer move rejected");
                None
            }
        }
    }

    /// Start a fresh game in the current mode, dropping any pending computer
    /// move.
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            debug!("pending computer move cancelled");
            self.emit(SessionEvent::ComputerCancelled);
        }
        self.generation += 1;
        self.state = GameState::initial();
        info!(mode = %self.mode, generation = self.generation, "game reset");
        self.emit(SessionEvent::Reset { mode: self.mode });
        self.schedule_computer_if_due();
    }

    /// Switch mode; always starts a fresh game.
    pub fn set_mode(&mut self, mode: GameMode) {
        info!(from = %self.mode, to = %mode, "mode changed");
        self.mode = mode;
        self.reset();
    }

    fn check_human_turn(&self) -> Result<Mark, MoveError> {
        match self.state.status() {
            GameStatus::InProgress(mark) => {
                if self.mode == GameMode::HumanVsComputer && mark == self.computer_mark {
                    Err(InvalidMove::ComputerTurn.into())
                } else {
                    Ok(mark)
                }
            }
            _ => Err(InvalidMove::GameOver.into()),
        }
    }

    fn after_move(&mut self, index: usize, mark: Mark, actor: Actor) {
        self.emit(SessionEvent::MovePlayed { index, mark, actor });

        let status = self.state.status();
        if status.is_terminal() {
            info!(?status, "game over");
            self.emit(SessionEvent::GameOver(status));
        } else {
            self.schedule_computer_if_due();
        }
    }

    fn schedule_computer_if_due(&mut self) {
        if self.mode != GameMode::HumanVsComputer
            || self.state.current_mark() != Some(self.computer_mark)
            || self.pending.is_some()
        {
            return;
        }
        let ticket = ScheduledMove::new(self.generation, Instant::now(), self.delay);
        self.pending = Some(ticket);
        debug!(delay_ms = self.delay.as_millis() as u64, "computer move scheduled");
        self.emit(SessionEvent::ComputerScheduled { delay: self.delay });
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl GameController for GameSession {
    fn on_cell_activated(&mut self, index: usize) -> Result<GameStatus, MoveError> {
        self.request_move(index)
    }

    fn on_reset(&mut self) {
        self.reset();
    }

    fn on_set_mode(&mut self, mode: GameMode) {
        self.set_mode(mode);
    }

    fn on_tick(&mut self, now: Instant) -> Option<usize> {
        self.poll_computer_move(now)
    }

    fn snapshot(&self) -> SessionSnapshot {
        GameSession::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{HeuristicAgent, CENTER_CELLS};
    use crate::game::{Cell, CELLS, LINES};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Plays a fixed list of cells and counts how often it was asked.
    struct ScriptedAgent {
        moves: Vec<usize>,
        calls: Rc<RefCell<usize>>,
    }

    impl Agent for ScriptedAgent {
        fn select_move(&mut self, _board: &Board, _mark: Mark) -> Option<usize> {
            let mut calls = self.calls.borrow_mut();
            let index = self.moves.get(*calls).copied();
            *calls += 1;
            index
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    fn scripted(mode: GameMode, moves: Vec<usize>) -> (GameSession, Rc<RefCell<usize>>) {
        let calls = Rc::new(RefCell::new(0));
        let config = SessionConfig {
            mode,
            ..SessionConfig::default()
        };
        let agent = ScriptedAgent {
            moves,
            calls: Rc::clone(&calls),
        };
        (GameSession::new(&config, Box::new(agent)), calls)
    }

    fn fire_now(session: &mut GameSession) -> Option<usize> {
        let ticket = session.pending_computer_move()?;
        session.poll_computer_move(ticket.due_at())
    }

    #[test]
    fn test_initial_session() {
        let (session, _) = scripted(GameMode::HumanVsComputer, vec![]);
        assert_eq!(session.status(), GameStatus::InProgress(Mark::X));
        assert_eq!(session.board(), &Board::new());
        assert!(!session.is_computer_thinking());
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn test_human_vs_human_never_asks_computer() {
        let (mut session, calls) = scripted(GameMode::HumanVsHuman, vec![0, 1, 2]);
        assert_eq!(session.request_move(0), Ok(GameStatus::InProgress(Mark::O)));
        assert_eq!(session.request_move(5), Ok(GameStatus::InProgress(Mark::X)));
        assert!(session.pending_computer_move().is_none());
        assert_eq!(session.poll_computer_move(Instant::now() + Duration::from_secs(10)), None);
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(session.board().get(5), Some(Cell::O));
    }

    #[test]
    fn test_computer_replies_after_delay() {
        let (mut session, calls) = scripted(GameMode::HumanVsComputer, vec![6]);
        session.request_move(0).unwrap();

        let ticket = session.pending_computer_move().expect("computer move scheduled");
        assert!(session.snapshot().computer_thinking);
        let early = ticket.due_at() - Duration::from_millis(1);
        assert_eq!(session.poll_computer_move(early), None);
        assert_eq!(*calls.borrow(), 0);

        assert_eq!(session.poll_computer_move(ticket.due_at()), Some(6));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(session.board().get(6), Some(Cell::O));
        assert_eq!(session.status(), GameStatus::InProgress(Mark::X));
        assert!(!session.is_computer_thinking());
    }

    #[test]
    fn test_ticket_fires_only_once() {
        let (mut session, calls) = scripted(GameMode::HumanVsComputer, vec![6, 7]);
        session.request_move(0).unwrap();
        let ticket = session.pending_computer_move().unwrap();
        assert_eq!(session.fire_scheduled(ticket), Some(6));
        assert_eq!(session.fire_scheduled(ticket), None);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_human_cannot_move_for_computer() {
        let (mut session, _) = scripted(GameMode::HumanVsComputer, vec![6]);
        session.request_move(0).unwrap();
        let before = session.snapshot();
        assert_eq!(
            session.request_move(1),
            Err(MoveError::InvalidMove(InvalidMove::ComputerTurn))
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_reset_cancels_pending_computer_move() {
        let (mut session, calls) = scripted(GameMode::HumanVsComputer, vec![6]);
        session.request_move(0).unwrap();
        session.request_move(3).unwrap_err();
        let ticket = session.pending_computer_move().unwrap();

        session.reset();

        assert_eq!(session.fire_scheduled(ticket), None);
        assert_eq!(session.poll_computer_move(ticket.due_at()), None);
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(session.status(), GameStatus::InProgress(Mark::X));
        assert!((0..CELLS).all(|i| session.board().get(i) == Some(Cell::Empty)));
        assert_eq!(session.mode(), GameMode::HumanVsComputer);
        assert!(!session.is_computer_thinking());
    }

    #[test]
    fn test_mode_change_cancels_and_resets() {
        let (mut session, calls) = scripted(GameMode::HumanVsComputer, vec![6]);
        session.request_move(0).unwrap();
        let ticket = session.pending_computer_move().unwrap();
        let generation = session.generation();

        session.set_mode(GameMode::HumanVsHuman);

        assert!(session.generation() > generation);
        assert_eq!(session.mode(), GameMode::HumanVsHuman);
        assert_eq!(session.fire_scheduled(ticket), None);
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(session.board(), &Board::new());
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let (mut session, _) = scripted(GameMode::HumanVsHuman, vec![]);
        session.request_move(0).unwrap();
        let before = session.snapshot();

        assert_eq!(session.request_move(16), Err(MoveError::InvalidIndex(16)));
        assert_eq!(
            session.request_move(0),
            Err(MoveError::InvalidMove(InvalidMove::Occupied(0)))
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_no_moves_after_win() {
        let (mut session, _) = scripted(GameMode::HumanVsHuman, vec![]);
        for index in [0, 4, 1, 5, 2, 6, 3] {
            session.request_move(index).unwrap();
        }
        let status = session.status();
        assert_eq!(
            status,
            GameStatus::Won {
                mark: Mark::X,
                line: LINES[0]
            }
        );
        assert_eq!(session.snapshot().winning_line(), Some(LINES[0]));
        assert_eq!(
            session.request_move(7),
            Err(MoveError::InvalidMove(InvalidMove::GameOver))
        );
        assert_eq!(session.status(), status);
    }

    #[test]
    fn test_draw_in_two_player_game() {
        let (mut session, _) = scripted(GameMode::HumanVsHuman, vec![]);
        for index in [0, 1, 2, 3, 4, 5, 6, 7, 9, 8, 11, 10, 13, 12, 15, 14] {
            session.request_move(index).unwrap();
        }
        assert_eq!(session.status(), GameStatus::Draw);
        assert_eq!(session.snapshot().winning_line(), None);
    }

    #[test]
    fn test_computer_can_win() {
        // Computer (O) completes row 1
        let (mut session, _) = scripted(GameMode::HumanVsComputer, vec![4, 5, 6, 7]);
        for human in [0, 1, 8, 12] {
            session.request_move(human).unwrap();
            fire_now(&mut session).unwrap();
        }
        assert_eq!(
            session.status(),
            GameStatus::Won {
                mark: Mark::O,
                line: LINES[1]
            }
        );
        assert!(!session.is_computer_thinking());
    }

    #[test]
    fn test_unusable_computer_choice_falls_back_to_first_empty_cell() {
        // Occupied pick, then no pick at all
        let (mut session, _) = scripted(GameMode::HumanVsComputer, vec![0]);
        session.request_move(0).unwrap();
        assert_eq!(fire_now(&mut session), Some(1));
        assert_eq!(session.board().get(1), Some(Cell::O));
        assert_eq!(session.status(), GameStatus::InProgress(Mark::X));

        session.request_move(5).unwrap();
        assert_eq!(fire_now(&mut session), Some(2));
        assert!(!session.is_computer_thinking());
        assert_eq!(session.request_move(3), Ok(GameStatus::InProgress(Mark::O)));
    }

    #[test]
    fn test_computer_opens_when_playing_x() {
        let config = SessionConfig {
            mode: GameMode::HumanVsComputer,
            computer_mark: Mark::X,
            computer_delay_ms: 0,
        };
        let mut session = GameSession::new(&config, Box::new(HeuristicAgent::with_seed(1)));
        assert!(session.is_computer_thinking());
        assert_eq!(
            session.request_move(0),
            Err(MoveError::InvalidMove(InvalidMove::ComputerTurn))
        );

        let index = session.on_tick(Instant::now()).unwrap();
        assert!(CENTER_CELLS.contains(&index));
        assert_eq!(session.status(), GameStatus::InProgress(Mark::O));

        session.on_reset();
        assert!(session.is_computer_thinking());
    }

    #[test]
    fn test_events_are_published() {
        let (mut session, _) = scripted(GameMode::HumanVsComputer, vec![6]);
        let rx = session.subscribe();

        session.on_cell_activated(0).unwrap();
        session.on_cell_activated(0).unwrap_err();
        fire_now(&mut session).unwrap();
        session.request_move(1).unwrap();
        session.on_set_mode(GameMode::HumanVsHuman);

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        let delay = Duration::from_millis(500);
        assert_eq!(
            events,
            vec![
                SessionEvent::MovePlayed {
                    index: 0,
                    mark: Mark::X,
                    actor: Actor::Human
                },
                SessionEvent::ComputerScheduled { delay },
                SessionEvent::MoveRejected {
                    index: 0,
                    error: MoveError::InvalidMove(InvalidMove::ComputerTurn)
                },
                SessionEvent::MovePlayed {
                    index: 6,
                    mark: Mark::O,
                    actor: Actor::Computer
                },
                SessionEvent::MovePlayed {
                    index: 1,
                    mark: Mark::X,
                    actor: Actor::Human
                },
                SessionEvent::ComputerScheduled { delay },
                SessionEvent::ComputerCancelled,
                SessionEvent::Reset {
                    mode: GameMode::HumanVsHuman
                },
            ]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (mut session, _) = scripted(GameMode::HumanVsHuman, vec![]);
        drop(session.subscribe());
        let rx = session.subscribe();
        session.request_move(0).unwrap();
        assert_eq!(session.subscribers.len(), 1);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_full_game_against_heuristic_agent() {
        let config = SessionConfig {
            computer_delay_ms: 0,
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(&config, Box::new(HeuristicAgent::with_seed(8)));
        while !session.status().is_terminal() {
            if session.is_computer_thinking() {
                session.poll_computer_move(Instant::now()).unwrap();
                continue;
            }
            let index = session.board().empty_cells()[0];
            session.request_move(index).unwrap();
        }
        let balance = session.board().count(Cell::X) as isize
            - session.board().count(Cell::O) as isize;
        assert!((0..=1).contains(&balance));
    }
}
