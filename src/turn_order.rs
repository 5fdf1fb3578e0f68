use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::player::{Player, PlayerId};

/// An ordered, rotatable, reversible sequence of players. The players are
/// owned by the rotation; "current" is an index into it, which keeps
/// membership and rotation free of any linked-ring machinery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnOrder {
    pub(crate) players: Vec<Player>,
    pub(crate) current: usize,
    pub(crate) reversed: bool,
}

impl TurnOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn push(&mut self, player: Player) {
        self.players.push(player);
    }

    pub fn current(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Player {
        &mut self.players[self.current]
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Moves the current pointer one step in the active direction.
    pub fn advance(&mut self) {
        let len = self.players.len();
        if self.reversed {
            self.current = (self.current + len - 1) % len;
        } else {
            self.current = (self.current + 1) % len;
        }
    }

    /// Flips the direction of play. With two players the engine issues a
    /// skip instead, so this is never called in that case.
    pub fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }

    /// Randomizes the seating order; used once at game start.
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.players.shuffle(&mut rng);
        self.current = 0;
        self.reversed = false;
    }

    /// Exchanges the hands of two players, leaving everything else in place.
    pub fn swap_hands(&mut self, a: PlayerId, b: PlayerId) {
        let Some(ia) = self.players.iter().position(|p| p.id == a) else {
            return;
        };
        let Some(ib) = self.players.iter().position(|p| p.id == b) else {
            return;
        };
        if ia == ib {
            return;
        }

        let hand_a: Vec<Card> = std::mem::take(&mut self.players[ia].hand);
        let hand_b = std::mem::replace(&mut self.players[ib].hand, hand_a);
        self.players[ia].hand = hand_b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardKind, Color};

    fn order_of(n: i64) -> TurnOrder {
        let mut order = TurnOrder::new();
        for id in 0..n {
            order.push(Player::new(id, format!("player-{id}")));
        }
        order
    }

    #[test]
    fn test_advance_wraps_forward() {
        let mut order = order_of(3);
        assert_eq!(order.current().id, 0);
        order.advance();
        assert_eq!(order.current().id, 1);
        order.advance();
        assert_eq!(order.current().id, 2);
        order.advance();
        assert_eq!(order.current().id, 0);
    }

    #[test]
    fn test_advance_wraps_backward_when_reversed() {
        let mut order = order_of(3);
        order.reverse();
        order.advance();
        assert_eq!(order.current().id, 2);
        order.advance();
        assert_eq!(order.current().id, 1);
    }

    #[test]
    fn test_shuffle_keeps_membership() {
        let mut order = order_of(5);
        order.shuffle();
        assert_eq!(order.len(), 5);
        let mut ids: Vec<_> = order.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_swap_hands() {
        let mut order = order_of(2);
        let red = Card::new(Color::Red, CardKind::Number(1));
        let blue = Card::new(Color::Blue, CardKind::Number(2));
        let red_id = red.id;
        let blue_id = blue.id;
        order.player_mut(0).unwrap().add_card(red);
        order.player_mut(1).unwrap().add_card(blue);

        order.swap_hands(0, 1);
        assert_eq!(order.player(0).unwrap().hand[0].id, blue_id);
        assert_eq!(order.player(1).unwrap().hand[0].id, red_id);

        // Swapping with an unknown player leaves hands alone.
        order.swap_hands(0, 99);
        assert_eq!(order.player(0).unwrap().hand[0].id, blue_id);
    }
}
