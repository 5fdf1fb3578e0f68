use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::card::{Card, CardId, CardKind, Color};
use crate::config::GameConfig;
use crate::deck::Deck;
use crate::player::{Player, PlayerId};
use crate::turn_order::TurnOrder;

pub const MAX_PLAYERS: usize = 10;
pub const HAND_SIZE: usize = 7;
pub const CATORCE_PENALTY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Players are joining; no deck exists yet. A finished game returns
    /// here, so games are restartable.
    Lobby,
    /// The current player must play or draw.
    ChooseCard,
    /// The current player drew a card and may play it or pass.
    Drew,
    /// A wild was played; its color must be chosen before play resumes.
    ChooseColor,
    /// A swap card was played; a target player must be chosen.
    ChoosePlayer,
}

/// One externally-triggered player action. Unlisted (state, event) pairs are
/// rejected with [`GameError::EventNotCovered`] and leave the game untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AddPlayer { id: PlayerId, name: String },
    StartGame,
    CardPlayed { player: PlayerId, card: CardId },
    DrawCard { player: PlayerId },
    Pass { player: PlayerId },
    ColorChosen { player: PlayerId, color: Color },
    PlayerSwapChosen { player: PlayerId, target: PlayerId },
    Catorce { player: PlayerId },
}

/// What a successfully applied event did. `catorce_missed` reports a player
/// who was penalized for not calling their last card before this action; it
/// is captured atomically with the mutation so the caller can warn them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    PlayerAdded,
    Started,
    Played { catorce_missed: Option<PlayerId> },
    Drew { catorce_missed: Option<PlayerId> },
    PenaltyDrawn { amount: u32, catorce_missed: Option<PlayerId> },
    Passed,
    ColorPicked,
    HandsSwapped { target: PlayerId },
    CatorceCalled,
    /// The acting player emptied their hand; the game is back in the lobby.
    GameOver { winner: PlayerId, catorce_missed: Option<PlayerId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("event not applicable in current state")]
    EventNotCovered,
    #[error("not enough players to start")]
    NotEnoughPlayers,
    #[error("maximum number of players reached")]
    MaxPlayers,
    #[error("it's not this player's turn")]
    WrongPlayer,
    #[error("illegal card for the current pile")]
    CantPlayCard,
    #[error("current card is not wild, can't choose a color")]
    CantChooseColor,
    #[error("no catorce pending")]
    NoCatorcePending,
    #[error("player is not part of this game")]
    UnknownPlayer,
    #[error("card is not in the player's hand")]
    CardNotInHand,
}

/// The game engine: a finite-state machine owning the deck, the turn order
/// and the face-up card. One instance per game; all operations are
/// synchronous and either commit fully or reject without side effects.
/// Callers serialize events per game (one lock per instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    deck: Deck,
    turn_order: TurnOrder,
    state: GameState,
    current_card: Option<Card>,
    draw_count: u32,
    catorce_pending: Option<PlayerId>,
    rounds: u32,
    turn_started: DateTime<Utc>,

    // Per-game aggregates; the stats layer folds them into overall numbers
    // when the game ends.
    p2_sequence: u32,
    p4_played: u32,
    largest_response_time: Duration,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let deck = Deck::empty(config.deck.clone());
        Self {
            config,
            deck,
            turn_order: TurnOrder::new(),
            state: GameState::Lobby,
            current_card: None,
            draw_count: 0,
            catorce_pending: None,
            rounds: 0,
            turn_started: Utc::now(),
            p2_sequence: 0,
            p4_played: 0,
            largest_response_time: Duration::ZERO,
        }
    }

    /// Single entry point for all inbound events. Validates the event
    /// against the current state and applies it atomically.
    pub fn handle_event(&mut self, event: Event) -> Result<Outcome, GameError> {
        debug!(state = ?self.state, event = ?event, "handling event");

        match event {
            Event::AddPlayer { id, name } => {
                if self.state != GameState::Lobby {
                    return Err(GameError::EventNotCovered);
                }
                if self.turn_order.len() >= MAX_PLAYERS {
                    return Err(GameError::MaxPlayers);
                }

                self.turn_order.push(Player::new(id, name));
                Ok(Outcome::PlayerAdded)
            }

            Event::StartGame => {
                if self.state != GameState::Lobby {
                    return Err(GameError::EventNotCovered);
                }
                if self.turn_order.len() < 2 {
                    return Err(GameError::NotEnoughPlayers);
                }

                self.start();
                Ok(Outcome::Started)
            }

            Event::CardPlayed { player, card } => {
                if !matches!(self.state, GameState::ChooseCard | GameState::Drew) {
                    return Err(GameError::EventNotCovered);
                }
                if player != self.turn_order.current().id {
                    return Err(GameError::WrongPlayer);
                }

                let candidate = self
                    .turn_order
                    .current()
                    .card(card)
                    .ok_or(GameError::CardNotInHand)?;
                let top = self.current_card.as_ref().ok_or(GameError::EventNotCovered)?;
                if !candidate.can_play_on_top(top, self.draw_count > 0, &self.config.stacking) {
                    trace!(card = ?candidate, top = ?top, "illegal card");
                    return Err(GameError::CantPlayCard);
                }

                let catorce_missed = self.resolve_catorce();
                let played = self
                    .turn_order
                    .current_mut()
                    .remove_card(card)
                    .ok_or(GameError::CardNotInHand)?;
                Ok(self.play_card(played, catorce_missed))
            }

            Event::DrawCard { player } => {
                if self.state != GameState::ChooseCard {
                    return Err(GameError::EventNotCovered);
                }
                if player != self.turn_order.current().id {
                    return Err(GameError::WrongPlayer);
                }

                let catorce_missed = self.resolve_catorce();

                if self.draw_count == 0 {
                    let card = self.deck.draw();
                    self.turn_order.current_mut().add_card(card);
                    debug!(from = ?self.state, to = ?GameState::Drew, "changing state");
                    self.state = GameState::Drew;
                    return Ok(Outcome::Drew { catorce_missed });
                }

                // Discharge the accumulated penalty and forfeit the turn.
                let amount = self.draw_count;
                if amount > self.p2_sequence {
                    self.p2_sequence = amount;
                }
                for _ in 0..amount {
                    let card = self.deck.draw();
                    self.turn_order.current_mut().add_card(card);
                }
                self.draw_count = 0;

                match self.end_turn(false) {
                    Some(winner) => Ok(Outcome::GameOver { winner, catorce_missed }),
                    None => Ok(Outcome::PenaltyDrawn { amount, catorce_missed }),
                }
            }

            Event::Pass { .. } => {
                if self.state != GameState::Drew {
                    return Err(GameError::EventNotCovered);
                }

                match self.end_turn(false) {
                    Some(winner) => Ok(Outcome::GameOver { winner, catorce_missed: None }),
                    None => Ok(Outcome::Passed),
                }
            }

            Event::ColorChosen { player, color } => {
                if self.state != GameState::ChooseColor {
                    return Err(GameError::EventNotCovered);
                }
                if player != self.turn_order.current().id {
                    return Err(GameError::WrongPlayer);
                }
                let Some(top) = self.current_card.as_mut() else {
                    return Err(GameError::CantChooseColor);
                };
                if !top.is_wild() {
                    return Err(GameError::CantChooseColor);
                }

                trace!(color = ?color, "setting card color");
                top.set_color(color);

                match self.end_turn(false) {
                    Some(winner) => Ok(Outcome::GameOver { winner, catorce_missed: None }),
                    None => Ok(Outcome::ColorPicked),
                }
            }

            Event::PlayerSwapChosen { player, target } => {
                if self.state != GameState::ChoosePlayer {
                    return Err(GameError::EventNotCovered);
                }
                if player != self.turn_order.current().id {
                    return Err(GameError::WrongPlayer);
                }
                if self.turn_order.player(target).is_none() {
                    return Err(GameError::UnknownPlayer);
                }

                self.turn_order.swap_hands(player, target);

                match self.end_turn(false) {
                    Some(winner) => Ok(Outcome::GameOver { winner, catorce_missed: None }),
                    None => Ok(Outcome::HandsSwapped { target }),
                }
            }

            Event::Catorce { player } => {
                if self.state != GameState::ChooseCard {
                    return Err(GameError::EventNotCovered);
                }
                let holder = self.catorce_pending.ok_or(GameError::NoCatorcePending)?;
                if player != holder {
                    return Err(GameError::WrongPlayer);
                }

                self.catorce_pending = None;
                if let Some(p) = self.turn_order.player_mut(holder) {
                    p.catorces_called += 1;
                }
                Ok(Outcome::CatorceCalled)
            }
        }
    }

    /// Game-start sequence: fresh shuffled supply, shuffled seating, seven
    /// cards each, then the opening flip.
    fn start(&mut self) {
        self.current_card = None;
        self.draw_count = 0;
        self.catorce_pending = None;
        self.rounds = 0;
        self.p2_sequence = 0;
        self.p4_played = 0;
        self.largest_response_time = Duration::ZERO;

        for player in self.turn_order.iter_mut() {
            player.hand.clear();
        }

        self.deck = Deck::new(self.config.deck.clone());
        self.deck.shuffle();
        self.turn_order.shuffle();

        for _ in 0..HAND_SIZE {
            for player in self.turn_order.iter_mut() {
                player.add_card(self.deck.draw());
            }
        }

        self.flip_first_card();

        debug!(from = ?self.state, to = ?GameState::ChooseCard, "changing state");
        self.state = GameState::ChooseCard;
        self.turn_started = Utc::now();
    }

    /// Flips the opening card, redrawing while it is wild, and applies its
    /// effect as if it had been played against the first player.
    fn flip_first_card(&mut self) {
        let mut card = self.deck.draw();
        while card.is_wild() {
            trace!(card = ?card, "first card is wild, redrawing");
            self.deck.discard(card);
            card = self.deck.draw();
        }

        trace!(card = ?card, "first card flipped");
        let kind = card.kind;
        self.current_card = Some(card);

        match kind {
            CardKind::Skip => {
                self.end_turn(false);
            }
            CardKind::Draw(n) => self.draw_count += u32::from(n),
            CardKind::Reverse => {
                if self.turn_order.len() == 2 {
                    self.end_turn(false);
                } else {
                    self.turn_order.reverse();
                }
            }
            _ => {}
        }
    }

    /// Applies an already-validated play: stats, discard of the old face-up
    /// card, and the new card's own effect.
    fn play_card(&mut self, card: Card, catorce_missed: Option<PlayerId>) -> Outcome {
        let turn_duration = (Utc::now() - self.turn_started).to_std().unwrap_or_default();
        {
            let player = self.turn_order.current_mut();
            player.cards_played += 1;
            player.record_response(turn_duration);
        }
        if turn_duration > self.largest_response_time {
            self.largest_response_time = turn_duration;
        }

        if let Some(old) = self.current_card.take() {
            self.deck.discard(old);
        }

        let kind = card.kind;
        self.current_card = Some(card);

        if kind.is_wild() {
            if let CardKind::WildDraw(n) = kind {
                self.p4_played += 1;
                self.draw_count += u32::from(n);
            }
            debug!(from = ?self.state, to = ?GameState::ChooseColor, "changing state");
            self.state = GameState::ChooseColor;
            return Outcome::Played { catorce_missed };
        }

        let mut jump = false;
        match kind {
            CardKind::Skip => jump = true,
            CardKind::Draw(n) => self.draw_count += u32::from(n),
            CardKind::Reverse => {
                // With two players a reverse behaves as a skip.
                if self.turn_order.len() == 2 {
                    jump = true;
                } else {
                    self.turn_order.reverse();
                }
            }
            // With the swap rule disabled a Swap plays as a plain colored
            // action card.
            CardKind::Swap
                if self.config.swap_enabled && !self.turn_order.current().hand.is_empty() =>
            {
                debug!(from = ?self.state, to = ?GameState::ChoosePlayer, "changing state");
                self.state = GameState::ChoosePlayer;
                return Outcome::Played { catorce_missed };
            }
            _ => {}
        }

        // Draw plays accumulate the penalty; anything else clears it.
        if !kind.is_draw() {
            self.draw_count = 0;
        }

        match self.end_turn(jump) {
            Some(winner) => Outcome::GameOver { winner, catorce_missed },
            None => Outcome::Played { catorce_missed },
        }
    }

    /// Penalizes a pending catorce holder who failed to call their last
    /// card before another action landed. Returns the penalized player.
    fn resolve_catorce(&mut self) -> Option<PlayerId> {
        let holder = self.catorce_pending.take()?;
        trace!(player = holder, "pending catorce missed, applying penalty");

        let penalty: Vec<Card> = (0..CATORCE_PENALTY).map(|_| self.deck.draw()).collect();
        if let Some(player) = self.turn_order.player_mut(holder) {
            player.catorces_missed += 1;
            for card in penalty {
                player.add_card(card);
            }
        }

        Some(holder)
    }

    /// Shared end-of-turn bookkeeping. Returns the winner when the acting
    /// player just emptied their hand, in which case the game is back in
    /// the lobby.
    fn end_turn(&mut self, jump: bool) -> Option<PlayerId> {
        self.rounds += 1;

        let acting = self.turn_order.current();
        trace!(player = acting.id, rounds = self.rounds, "ending turn");

        if acting.hand.is_empty() {
            let winner = acting.id;
            debug!(from = ?self.state, to = ?GameState::Lobby, winner, "game over");
            self.state = GameState::Lobby;
            return Some(winner);
        }

        let swap_play = self.config.swap_enabled
            && self
                .current_card
                .as_ref()
                .is_some_and(|c| c.kind == CardKind::Swap);
        if acting.hand.len() == 1 && !swap_play {
            trace!(player = acting.id, "one card left, catorce pending");
            self.catorce_pending = Some(acting.id);
        }

        self.turn_order.advance();
        if jump {
            self.turn_order.advance();
        }

        debug!(from = ?self.state, to = ?GameState::ChooseCard, "changing state");
        self.state = GameState::ChooseCard;
        self.turn_started = Utc::now();
        None
    }

    // --- queries ---

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.turn_order.iter()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.turn_order.player(id)
    }

    pub fn player_count(&self) -> usize {
        self.turn_order.len()
    }

    /// The player whose action is expected. `None` while in the lobby.
    pub fn current_player(&self) -> Option<&Player> {
        if self.state == GameState::Lobby || self.turn_order.is_empty() {
            None
        } else {
            Some(self.turn_order.current())
        }
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current_card.as_ref()
    }

    pub fn pending_draw(&self) -> u32 {
        self.draw_count
    }

    pub fn catorce_pending(&self) -> Option<PlayerId> {
        self.catorce_pending
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// When the current turn began; timeout policy is the caller's concern.
    pub fn turn_started(&self) -> DateTime<Utc> {
        self.turn_started
    }

    pub fn is_reversed(&self) -> bool {
        self.turn_order.is_reversed()
    }

    /// The subset of a player's hand that is legal against the face-up card
    /// and the pending-draw state.
    pub fn playable_cards(&self, player: PlayerId) -> Vec<&Card> {
        let Some(player) = self.turn_order.player(player) else {
            return Vec::new();
        };
        let Some(top) = &self.current_card else {
            return Vec::new();
        };

        player
            .hand
            .iter()
            .filter(|c| c.can_play_on_top(top, self.draw_count > 0, &self.config.stacking))
            .collect()
    }

    /// Total card instances across the draw pile, the discard pile, the
    /// face-up card and every hand. Constant during a game except for the
    /// half-deck injection when both piles run dry.
    pub fn cards_in_circulation(&self) -> usize {
        self.deck.available()
            + self.deck.discarded()
            + usize::from(self.current_card.is_some())
            + self.turn_order.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    pub fn largest_response_time(&self) -> Duration {
        self.largest_response_time
    }

    /// Largest draw penalty discharged in one go this game.
    pub fn p2_sequence(&self) -> u32 {
        self.p2_sequence
    }

    /// Wild-draw-four cards played this game.
    pub fn p4_played(&self) -> u32 {
        self.p4_played
    }
}
