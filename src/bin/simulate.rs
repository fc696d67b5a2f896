use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use four_in_a_row::ai::{Agent, HeuristicAgent, RandomAgent};
use four_in_a_row::game::{GameState, GameStatus, Mark};

/// Pit the heuristic computer opponent against a random player.
#[derive(Parser)]
#[command(name = "simulate", about = "Run headless heuristic-vs-random games")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value_t = 1000)]
    games: usize,

    /// Seed for both players; each game is then reproducible
    #[arg(long)]
    seed: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Print the final board of every game
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    games: usize,
    heuristic_wins: usize,
    random_wins: usize,
    draws: usize,
    heuristic_wins_as_x: usize,
    heuristic_wins_as_o: usize,
    avg_moves: f64,
    #[serde(skip)]
    total_moves: usize,
}

impl Summary {
    /// Tally one finished game in which the heuristic played `heuristic_mark`.
    fn record(&mut self, status: GameStatus, heuristic_mark: Mark, moves: usize) -> Result<()> {
        match status {
            GameStatus::Won { mark, .. } if mark == heuristic_mark => {
                self.heuristic_wins += 1;
                match mark {
                    Mark::X => self.heuristic_wins_as_x += 1,
                    Mark::O => self.heuristic_wins_as_o += 1,
                }
            }
            GameStatus::Won { .. } => self.random_wins += 1,
            GameStatus::Draw => self.draws += 1,
            GameStatus::InProgress(_) => bail!("cannot record an unfinished game"),
        }
        self.games += 1;
        self.total_moves += moves;
        self.avg_moves = self.total_moves as f64 / self.games as f64;
        Ok(())
    }

    fn heuristic_win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.heuristic_wins as f64 / self.games as f64
        }
    }
}

/// The heuristic opens (plays X) on even-numbered games.
fn heuristic_mark_for(game: usize) -> Mark {
    if game % 2 == 0 {
        Mark::X
    } else {
        Mark::O
    }
}

/// Play one game to the end and return the final state and move count.
fn play_game<'a>(
    x: &'a mut (dyn Agent + 'a),
    o: &'a mut (dyn Agent + 'a),
) -> Result<(GameState, usize)> {
    let mut state = GameState::initial();
    let mut moves = 0;

    while let Some(mark) = state.current_mark() {
        let agent = match mark {
            Mark::X => &mut *x,
            Mark::O => &mut *o,
        };
        let Some(index) = agent.select_move(state.board(), mark) else {
            bail!("{} found no move on a running game", agent.name());
        };
        state
            .apply_move_mut(index)
            .with_context(|| format!("{} played an illegal move", agent.name()))?;
        moves += 1;
    }

    Ok((state, moves))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.games == 0 {
        bail!("--games must be > 0");
    }

    let (mut heuristic, mut random) = match cli.seed {
        Some(seed) => (
            HeuristicAgent::with_seed(seed),
            RandomAgent::with_seed(seed.wrapping_add(1)),
        ),
        None => (HeuristicAgent::new(), RandomAgent::new()),
    };

    info!(games = cli.games, seed = ?cli.seed, "starting simulation");

    let mut summary = Summary::default();

    for game in 0..cli.games {
        let heuristic_mark = heuristic_mark_for(game);
        let (state, moves) = match heuristic_mark {
            Mark::X => play_game(&mut heuristic, &mut random)?,
            Mark::O => play_game(&mut random, &mut heuristic)?,
        };
        summary.record(state.status(), heuristic_mark, moves)?;
        debug!(game, moves, status = ?state.status(), "game finished");

        if cli.verbose {
            println!("Game {} (heuristic as {heuristic_mark}): {:?}", game + 1, state.status());
            println!("{}", state.board());
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Games:          {}", summary.games);
        println!(
            "Heuristic wins: {} ({:.1}%)  [as X: {}, as O: {}]",
            summary.heuristic_wins,
            summary.heuristic_win_rate() * 100.0,
            summary.heuristic_wins_as_x,
            summary.heuristic_wins_as_o
        );
        println!("Random wins:    {}", summary.random_wins);
        println!("Draws:          {}", summary.draws);
        println!("Avg moves:      {:.1}", summary.avg_moves);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use four_in_a_row::game::{Board, Cell, LINES};

    /// Always answers with the same cell.
    struct Stubborn(usize);

    impl Agent for Stubborn {
        fn select_move(&mut self, _board: &Board, _mark: Mark) -> Option<usize> {
            Some(self.0)
        }

        fn name(&self) -> &str {
            "Stubborn"
        }
    }

    #[test]
    fn test_play_game_reaches_terminal_state() {
        for seed in 0..20 {
            let mut heuristic = HeuristicAgent::with_seed(seed);
            let mut random = RandomAgent::with_seed(seed + 1);
            let (state, moves) = if seed % 2 == 0 {
                play_game(&mut heuristic, &mut random).unwrap()
            } else {
                play_game(&mut random, &mut heuristic).unwrap()
            };

            assert!(state.is_terminal());
            assert!((7..=16).contains(&moves));
            let marks = state.board().count(Cell::X) + state.board().count(Cell::O);
            assert_eq!(marks, moves);
        }
    }

    #[test]
    fn test_play_game_rejects_illegal_agent() {
        let mut x = Stubborn(0);
        let mut o = Stubborn(0);
        let err = play_game(&mut x, &mut o).unwrap_err();
        assert!(err.to_string().contains("illegal move"));
    }

    #[test]
    fn test_heuristic_alternates_opening() {
        assert_eq!(heuristic_mark_for(0), Mark::X);
        assert_eq!(heuristic_mark_for(1), Mark::O);
        assert_eq!(heuristic_mark_for(2), Mark::X);
    }

    #[test]
    fn test_summary_tallies_by_mark() {
        let mut summary = Summary::default();
        let o_win = GameStatus::Won {
            mark: Mark::O,
            line: LINES[1],
        };
        let x_win = GameStatus::Won {
            mark: Mark::X,
            line: LINES[0],
        };

        summary.record(o_win, Mark::O, 8).unwrap();
        summary.record(x_win, Mark::O, 7).unwrap();
        summary.record(GameStatus::Draw, Mark::X, 16).unwrap();
        summary.record(x_win, Mark::X, 9).unwrap();

        assert_eq!(summary.games, 4);
        assert_eq!(summary.heuristic_wins, 2);
        assert_eq!(summary.heuristic_wins_as_o, 1);
        assert_eq!(summary.heuristic_wins_as_x, 1);
        assert_eq!(summary.random_wins, 1);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.avg_moves, 10.0);
        assert_eq!(summary.heuristic_win_rate(), 0.5);
    }

    #[test]
    fn test_summary_refuses_unfinished_game() {
        let mut summary = Summary::default();
        assert!(summary
            .record(GameStatus::InProgress(Mark::X), Mark::X, 3)
            .is_err());
        assert_eq!(summary.games, 0);
    }
}
