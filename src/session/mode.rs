use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    HumanVsHuman,
    #[default]
    HumanVsComputer,
}

impl GameMode {
    /// The other mode
    pub fn toggled(self) -> GameMode {
        match self {
            GameMode::HumanVsHuman => GameMode::HumanVsComputer,
            GameMode::HumanVsComputer => GameMode::HumanVsHuman,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::HumanVsHuman => "Player vs Player",
            GameMode::HumanVsComputer => "Player vs Computer",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pvp" | "human_vs_human" | "human-vs-human" => Ok(GameMode::HumanVsHuman),
            "pvc" | "human_vs_computer" | "human-vs-computer" => Ok(GameMode::HumanVsComputer),
            other => Err(format!("unknown game mode '{other}' (expected pvp or pvc)")),
        }
    }
}
