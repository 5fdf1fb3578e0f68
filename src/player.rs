use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId};

/// Opaque participant identifier supplied by the transport layer.
pub type PlayerId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,

    // Cumulative play statistics, reported through the stats layer.
    pub cards_played: u32,
    pub catorces_called: u32,
    pub catorces_missed: u32,
    pub avg_response_time: Duration,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Vec::with_capacity(7),
            cards_played: 0,
            catorces_called: 0,
            catorces_missed: 0,
            avg_response_time: Duration::ZERO,
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Looks a card up by identity.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.hand.iter().find(|c| c.id == id)
    }

    /// Removes a card from the hand by identity. Hand order carries no
    /// meaning, so the removal may reorder it.
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let index = self.hand.iter().position(|c| c.id == id)?;
        Some(self.hand.swap_remove(index))
    }

    pub fn has_won(&self) -> bool {
        self.hand.is_empty()
    }

    /// Penalty points currently held in the hand.
    pub fn hand_points(&self) -> u32 {
        self.hand.iter().map(Card::score).sum()
    }

    /// Folds a new turn duration into the running average. Must be called
    /// after `cards_played` has been incremented for that turn.
    pub fn record_response(&mut self, duration: Duration) {
        let n = u128::from(self.cards_played.max(1));
        let avg = self.avg_response_time.as_nanos();
        let updated = ((n - 1) * avg + duration.as_nanos()) / n;
        self.avg_response_time = Duration::from_nanos(updated as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardKind, Color};

    #[test]
    fn test_remove_card_by_identity() {
        let mut player = Player::new(1, "Alice");
        let a = Card::new(Color::Red, CardKind::Number(5));
        let b = Card::new(Color::Red, CardKind::Number(5));
        let a_id = a.id;
        player.add_card(a);
        player.add_card(b);

        let removed = player.remove_card(a_id).unwrap();
        assert_eq!(removed.id, a_id);
        // The twin with the same color and value is still held.
        assert_eq!(player.hand.len(), 1);
        assert_ne!(player.hand[0].id, a_id);

        assert!(player.remove_card(a_id).is_none());
    }

    #[test]
    fn test_hand_points() {
        let mut player = Player::new(1, "Alice");
        player.add_card(Card::new(Color::Red, CardKind::Number(7)));
        player.add_card(Card::new(Color::Blue, CardKind::Skip));
        player.add_card(Card::new(Color::Black, CardKind::WildDraw(4)));
        assert_eq!(player.hand_points(), 7 + 20 + 50);
    }

    #[test]
    fn test_response_time_running_average() {
        let mut player = Player::new(1, "Alice");

        player.cards_played += 1;
        player.record_response(Duration::from_secs(10));
        assert_eq!(player.avg_response_time, Duration::from_secs(10));

        player.cards_played += 1;
        player.record_response(Duration::from_secs(20));
        assert_eq!(player.avg_response_time, Duration::from_secs(15));
    }
}
