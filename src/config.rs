use serde::{Deserialize, Serialize};

use crate::card::StackConfig;
use crate::deck::DeckConfig;

/// Game configuration, supplied at game creation and never mutated by the
/// engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Deck composition the supply is built from at game start.
    pub deck: DeckConfig,
    /// Which responses to a pending draw are legal.
    pub stacking: StackConfig,
    /// Whether the hand-swap special card is part of the game.
    pub swap_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck: DeckConfig::standard(),
            stacking: StackConfig::default(),
            swap_enabled: false,
        }
    }
}

impl GameConfig {
    /// The default rules with swap cards shuffled into the deck.
    pub fn with_swap() -> Self {
        Self {
            deck: DeckConfig::standard_with_swap(),
            stacking: StackConfig::default(),
            swap_enabled: true,
        }
    }
}
