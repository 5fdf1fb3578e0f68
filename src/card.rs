use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a single card instance. Two cards with the same color
/// and kind are still distinct objects while they move between the deck,
/// the discard pile and players' hands.
pub type CardId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    /// Reserved for wild cards and face-up wilds whose color has not been
    /// chosen yet.
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Number(u8),
    /// Colored draw card; the value is how many cards the next player draws.
    Draw(u8),
    Reverse,
    Skip,
    /// Optional rule: swap hands with a chosen player.
    Swap,
    Wild,
    /// Wild that also forces a draw (the classic "wild draw four").
    WildDraw(u8),
}

impl CardKind {
    pub fn is_wild(&self) -> bool {
        matches!(self, CardKind::Wild | CardKind::WildDraw(_))
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, CardKind::Draw(_) | CardKind::WildDraw(_))
    }

    /// How many cards this kind adds to the pending-draw counter.
    pub fn draw_amount(&self) -> u8 {
        match self {
            CardKind::Draw(n) | CardKind::WildDraw(n) => *n,
            _ => 0,
        }
    }
}

/// Which stacking responses to a pending draw are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Draw cards can be stacked at all; overrides everything else.
    pub can_stack_draws: bool,
    /// A draw can be stacked on top of a wild draw.
    pub can_stack_wild: bool,
    /// A draw with a bigger value can be stacked, otherwise values must match.
    pub can_stack_bigger: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub color: Color,
    pub kind: CardKind,
}

impl Card {
    pub fn new(color: Color, kind: CardKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            kind,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.kind.is_wild()
    }

    /// Changes the card color. Only wild cards can change color, so this is
    /// a no-op on anything else.
    pub fn set_color(&mut self, color: Color) {
        if self.is_wild() {
            self.color = color;
        }
    }

    /// Checks if this card can be played on top of `top`.
    ///
    /// Without a pending draw a card is legal if it is wild, shares the top
    /// card's color, or matches its kind and value exactly. With a pending
    /// draw only draw cards are eligible, and only as far as `config` allows.
    pub fn can_play_on_top(&self, top: &Card, draw_pending: bool, config: &StackConfig) -> bool {
        if !draw_pending {
            return self.is_wild() || self.color == top.color || self.kind == top.kind;
        }

        if !config.can_stack_draws || !self.kind.is_draw() {
            return false;
        }

        if !config.can_stack_wild && top.is_wild() {
            return false;
        }

        let color_ok = self.is_wild() || self.color == top.color;

        if config.can_stack_bigger {
            color_ok && self.kind.draw_amount() >= top.kind.draw_amount()
        } else {
            color_ok && self.kind.draw_amount() == top.kind.draw_amount()
        }
    }

    /// Card score used for hand points at round end:
    ///
    /// | Card         | Value            |
    /// | ------------ | ---------------- |
    /// | Number cards | Face value (0-9) |
    /// | Draw 2       | 20               |
    /// | Reverse      | 20               |
    /// | Skip         | 20               |
    /// | Swap         | 20               |
    /// | Wild         | 50               |
    /// | Wild Draw 4  | 50               |
    pub fn score(&self) -> u32 {
        match self.kind {
            CardKind::Number(n) => u32::from(n),
            CardKind::Draw(_) | CardKind::Reverse | CardKind::Skip | CardKind::Swap => 20,
            CardKind::Wild | CardKind::WildDraw(_) => 50,
        }
    }
}
