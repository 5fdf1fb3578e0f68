use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::card::{Card, CardKind, Color};

/// One line of a deck composition table: how many copies of a given
/// color/kind combination the deck is built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub color: Color,
    pub kind: CardKind,
    pub count: u8,
}

/// Configurable deck composition. Color, draw, skip, reverse and wild
/// counts can all be tuned independently. A composition must contain at
/// least one entry with a non-zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub entries: Vec<DeckEntry>,
}

const COLORS: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

impl DeckConfig {
    /// The standard 108-card composition: per color one 0, two of each 1-9,
    /// two skips, two reverses and two draw-2s, plus four wilds and four
    /// wild-draw-4s.
    pub fn standard() -> Self {
        let mut entries = Vec::new();

        for color in COLORS {
            entries.push(DeckEntry {
                color,
                kind: CardKind::Number(0),
                count: 1,
            });

            for number in 1..=9 {
                entries.push(DeckEntry {
                    color,
                    kind: CardKind::Number(number),
                    count: 2,
                });
            }

            for kind in [CardKind::Skip, CardKind::Reverse, CardKind::Draw(2)] {
                entries.push(DeckEntry {
                    color,
                    kind,
                    count: 2,
                });
            }
        }

        entries.push(DeckEntry {
            color: Color::Black,
            kind: CardKind::Wild,
            count: 4,
        });
        entries.push(DeckEntry {
            color: Color::Black,
            kind: CardKind::WildDraw(4),
            count: 4,
        });

        Self { entries }
    }

    /// The standard composition plus two swap cards per color.
    pub fn standard_with_swap() -> Self {
        let mut config = Self::standard();

        for color in COLORS {
            config.entries.push(DeckEntry {
                color,
                kind: CardKind::Swap,
                count: 2,
            });
        }

        config
    }

    /// Instantiates fresh card instances from the table. With `half` each
    /// count is halved (rounded down); this is the regeneration path used
    /// when both piles run dry.
    pub fn build(&self, half: bool) -> Vec<Card> {
        let divider = if half { 2 } else { 1 };

        self.entries
            .iter()
            .flat_map(|entry| {
                (0..entry.count / divider).map(|_| Card::new(entry.color, entry.kind))
            })
            .collect()
    }

    /// Total number of cards a full build produces.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| usize::from(e.count)).sum()
    }
}

/// A draw pile plus a discard pile. The deck owns the card supply; the
/// face-up card itself is held by the game, not the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub(crate) draw_pile: Vec<Card>,
    pub(crate) discard_pile: Vec<Card>,
    config: DeckConfig,
}

impl Deck {
    /// A deck with no cards in circulation; used while a game sits in the
    /// lobby. The real supply is built at game start.
    pub fn empty(config: DeckConfig) -> Self {
        Self {
            draw_pile: Vec::new(),
            discard_pile: Vec::new(),
            config,
        }
    }

    /// A full, unshuffled deck built from the composition table.
    pub fn new(config: DeckConfig) -> Self {
        Self {
            draw_pile: config.build(false),
            discard_pile: Vec::new(),
            config,
        }
    }

    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.draw_pile.shuffle(&mut rng);
    }

    pub fn available(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discarded(&self) -> usize {
        self.discard_pile.len()
    }

    /// Moves the discard pile back into the draw pile and shuffles.
    fn refill_from_discard(&mut self) {
        if self.discard_pile.is_empty() {
            return;
        }

        trace!(
            cards = self.discard_pile.len(),
            "refilling draw pile from discards"
        );
        self.draw_pile.append(&mut self.discard_pile);
        self.shuffle();
    }

    /// Adds a card to the discard pile. Wilds go back to black so a face-up
    /// wild is color-neutral until the next play chooses again.
    pub fn discard(&mut self, mut card: Card) {
        if card.is_wild() {
            card.set_color(Color::Black);
        }

        self.discard_pile.push(card);
    }

    /// Removes and returns the next card. Never fails: an empty draw pile is
    /// first refilled from the discards, and if both piles are dry a fresh
    /// half-composition set is shuffled in, growing the cards in circulation.
    pub fn draw(&mut self) -> Card {
        if self.draw_pile.is_empty() {
            self.refill_from_discard();
        }

        if self.draw_pile.is_empty() {
            debug!("both piles empty, merging in a half deck");
            let mut extra = self.config.build(true);
            if extra.is_empty() {
                // Every count was 1 and halved away; fall back to a full set.
                extra = self.config.build(false);
            }
            self.draw_pile.append(&mut extra);
            self.shuffle();
        }

        // A non-empty composition always leaves at least one card here.
        self.draw_pile.pop().expect("deck composition produced no cards")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_composition_has_108_cards() {
        let config = DeckConfig::standard();
        assert_eq!(config.total(), 108);
        assert_eq!(config.build(false).len(), 108);
    }

    #[test]
    fn test_swap_composition_adds_two_per_color() {
        let config = DeckConfig::standard_with_swap();
        assert_eq!(config.total(), 116);
    }

    #[test]
    fn test_half_build_rounds_down() {
        let config = DeckConfig::standard();
        // Per color: 0-cards (1 -> 0), plus 12 pairs halved to 1 each, plus
        // 2 + 2 wilds halved.
        assert_eq!(config.build(true).len(), 4 * 12 + 2 + 2);
    }

    #[test]
    fn test_draw_refills_from_discards() {
        let mut deck = Deck::new(DeckConfig::standard());
        deck.shuffle();

        while deck.available() > 0 {
            let card = deck.draw();
            deck.discard(card);
        }
        assert_eq!(deck.discarded(), 108);

        // The next draw has to come out of the discard pile, with no new
        // cards injected.
        let card = deck.draw();
        assert_eq!(deck.available(), 107);
        assert_eq!(deck.discarded(), 0);
        deck.discard(card);
    }

    #[test]
    fn test_draw_synthesizes_half_deck_when_dry() {
        let mut deck = Deck::empty(DeckConfig::standard());
        assert_eq!(deck.available() + deck.discarded(), 0);

        let card = deck.draw();
        // The half deck minus the card just drawn is still in the pile.
        assert_eq!(deck.available(), 4 * 12 + 2 + 2 - 1);
        deck.discard(card);
    }

    #[test]
    fn test_draw_falls_back_to_a_full_build_for_tiny_compositions() {
        // A half build of this composition is empty (1 / 2 rounds to 0);
        // draw must still produce a card.
        let config = DeckConfig {
            entries: vec![DeckEntry {
                color: Color::Red,
                kind: CardKind::Number(1),
                count: 1,
            }],
        };
        let mut deck = Deck::empty(config);

        let card = deck.draw();
        assert_eq!(card.kind, CardKind::Number(1));
        deck.discard(card);
    }

    #[test]
    fn test_discarded_wild_reverts_to_black() {
        let mut deck = Deck::empty(DeckConfig::standard());
        let mut wild = Card::new(Color::Black, CardKind::Wild);
        wild.set_color(Color::Red);

        deck.discard(wild);
        // Draw everything back out and find it.
        let mut found = false;
        for _ in 0..deck.discarded() {
            let card = deck.draw();
            if card.kind == CardKind::Wild {
                assert_eq!(card.color, Color::Black);
                found = true;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_card_identity_survives_the_piles() {
        let mut deck = Deck::new(DeckConfig::standard());
        deck.shuffle();

        let card = deck.draw();
        let id = card.id;
        deck.discard(card);

        let mut seen = false;
        for _ in 0..deck.available() + deck.discarded() {
            if deck.draw().id == id {
                seen = true;
                break;
            }
        }
        assert!(seen);
    }
}
