/// Game snapshot pushed by the server on every tick
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// A cell on the grid, in tile units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Tile {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Player {
    pub x: i64,
    pub y: i64,
    pub color: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One full snapshot. Each one replaces the previous; nothing is merged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameState {
    pub goal: Tile,
    pub players: Players,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub blocked: Vec<Tile>,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub grid_size: Option<u32>,
}

impl GameState {
    /// Parse a snapshot from an event payload
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// The winner, if there is one. An empty name counts as no winner.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref().filter(|w| !w.is_empty())
    }

    /// Scores of players still on the board, labelled by name (falling back
    /// to the token), best first. Equal scores keep their payload order.
    pub fn leaderboard(&self) -> Vec<(String, i64)> {
        let mut rows: Vec<(String, i64)> = self
            .scores
            .iter()
            .filter_map(|(token, score)| {
                let player = self.players.get(token)?;
                let label = player.name.clone().unwrap_or_else(|| token.to_string());
                Some((label, *score))
            })
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

/// Players keyed by token, in the order the server wrote them.
///
/// Draw order follows this order, so a hashed map would make overlapping
/// tokens flicker between snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Players(Vec<(String, Player)>);

impl Players {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Player)> {
        self.0.iter().map(|(token, player)| (token.as_str(), player))
    }

    pub fn get(&self, token: &str) -> Option<&Player> {
        self.0.iter().find(|(t, _)| t == token).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Player)> for Players {
    fn from_iter<I: IntoIterator<Item = (String, Player)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Scores keyed by token, in payload order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scores(Vec<(String, i64)>);

impl Scores {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &i64)> {
        self.0.iter().map(|(token, score)| (token.as_str(), score))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, i64)> for Scores {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Collects a JSON object into a Vec of pairs, keeping key order.
/// A repeated key replaces the earlier value in place, like a JS object.
struct OrderedMapVisitor<V>(std::marker::PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object keyed by player token")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(entries)
    }
}

fn ordered_map<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    deserializer.deserialize_map(OrderedMapVisitor(std::marker::PhantomData))
}

impl<'de> Deserialize<'de> for Players {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ordered_map(deserializer).map(Players)
    }
}

impl<'de> Deserialize<'de> for Scores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ordered_map(deserializer).map(Scores)
    }
}
