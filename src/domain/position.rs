use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether capital is currently committed to the market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Out,
    In,
}

/// Which side an open position represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    None,
    Long,
    Short,
}

#[derive(Debug, Error, PartialEq)]
pub enum PositionError {
    #[error("An open position requires a direction")]
    OpenWithoutDirection,
}

/// The only state that lives across decision cycles.
///
/// `(In, None)` cannot be built through the constructors below; the
/// fields are private so every transition goes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionState {
    position: Position,
    direction: Direction,
}

impl PositionState {
    /// State at process start: flat, with `Short` as an inert placeholder direction.
    pub const INITIAL: PositionState = PositionState {
        position: Position::Out,
        direction: Direction::Short,
    };

    pub fn new(position: Position, direction: Direction) -> Result<Self, PositionError> {
        if position == Position::In && direction == Direction::None {
            return Err(PositionError::OpenWithoutDirection);
        }
        Ok(Self { position, direction })
    }

    /// Flat with no direction, the state after any exit
    pub fn flat() -> Self {
        Self {
            position: Position::Out,
            direction: Direction::None,
        }
    }

    pub fn long() -> Self {
        Self {
            position: Position::In,
            direction: Direction::Long,
        }
    }

    pub fn short() -> Self {
        Self {
            position: Position::In,
            direction: Direction::Short,
        }
    }

    /// Initial state, optionally with the placeholder direction cleared
    pub fn initial(normalize_direction: bool) -> Self {
        if normalize_direction {
            Self::flat()
        } else {
            Self::INITIAL
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_out(&self) -> bool {
        self.position == Position::Out
    }

    pub fn is_long(&self) -> bool {
        self.position == Position::In && self.direction == Direction::Long
    }

    pub fn is_short(&self) -> bool {
        self.position == Position::In && self.direction == Direction::Short
    }
}

impl Default for PositionState {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = match self.position {
            Position::Out => "out",
            Position::In => "in",
        };
        let direction = match self.direction {
            Direction::None => "none",
            Direction::Long => "long",
            Direction::Short => "short",
        };
        write!(f, "({}, {})", position, direction)
    }
}
