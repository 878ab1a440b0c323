use serde::{Deserialize, Serialize};
use std::fmt;
use tsify::Tsify;

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Tsify,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default)]
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    #[serde(rename = "isAI", alias = "isAi", default)]
    pub is_ai: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: impl Into<String>, is_ai: bool) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            is_ai,
        }
    }

    pub fn human(id: PlayerId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::new(id, name, color, false)
    }

    pub fn ai(id: PlayerId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::new(id, name, color, true)
    }

    pub fn with_id(&self, id: PlayerId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Color as RGB when it is written `#rrggbb`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ai {
            write!(f, "{} (AI)", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Partial update for a roster entry; `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "isAI", alias = "isAi")]
    pub is_ai: Option<bool>,
}

impl PlayerUpdate {
    pub fn apply_to(&self, player: &Player) -> Player {
        Player {
            id: player.id,
            name: self.name.clone().unwrap_or_else(|| player.name.clone()),
            color: self.color.clone().unwrap_or_else(|| player.color.clone()),
            is_ai: self.is_ai.unwrap_or(player.is_ai),
        }
    }
}

pub fn default_roster() -> Vec<Player> {
    vec![
        Player::human(PlayerId(0), "Player 1", "#FF6B6B"),
        Player::ai(PlayerId(1), "Robo", "#4ECDC4"),
    ]
}
