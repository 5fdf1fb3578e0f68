//! Rules engine for an UNO-family card game ("catorce") played
//! asynchronously by chat participants.
//!
//! The crate is transport-agnostic: a [`Game`] is an independent value that
//! consumes [`Event`]s through [`Game::handle_event`] and reports typed
//! [`Outcome`]s and [`GameError`]s. Message dispatch, UI rendering and
//! persistence live in external layers; the engine only guarantees that
//! each event applies atomically and that the full game state is
//! serializable (see [`snapshot`]).

pub mod card;
pub mod config;
pub mod deck;
pub mod game;
pub mod player;
pub mod snapshot;
pub mod turn_order;

pub use card::{Card, CardId, CardKind, Color, StackConfig};
pub use config::GameConfig;
pub use deck::{Deck, DeckConfig, DeckEntry};
pub use game::{Event, Game, GameError, GameState, Outcome};
pub use player::{Player, PlayerId};
pub use snapshot::{GameSnapshot, SnapshotStore};
pub use turn_order::TurnOrder;
