use thiserror::Error;

use crate::model::{Stage, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("invalid tile id: {0}")]
    InvalidId(u8),
    #[error("invalid tile symbol: '{0}'")]
    InvalidSymbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("invalid deck string: '{0}'")]
    Format(String),
    #[error("tile not found in deck: {0}")]
    NotFound(Tile),
    #[error(transparent)]
    Tile(#[from] TileError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("invalid kan string: '{0}'")]
    NotPromotable(String),
    #[error("malformed call string: '{0}'")]
    Malformed(String),
    #[error(transparent)]
    Tile(#[from] TileError),
}

#[derive(Debug, Error)]
pub enum WallError {
    #[error("{0} player game is not implemented")]
    NotImplemented(usize),
    #[error("unsupported red dora count: {0}")]
    RedDora(usize),
    #[error("wall must contain 136 tiles, got {0}")]
    Length(usize),
    #[error(transparent)]
    Tile(#[from] TileError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// 点数計算側から返されるエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandValueError {
    #[error("hand has no yaku")]
    NoYaku,
    #[error("malformed hand: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum GameError {
    // 局の続行は不可能. snapshotは違反が発生した時点の卓情報
    #[error("rule violation: {reason}")]
    RuleViolation { reason: String, snapshot: Box<Stage> },
    #[error(transparent)]
    Calculator(#[from] HandValueError),
    #[error(transparent)]
    Wall(#[from] WallError),
}

impl GameError {
    pub fn violation(reason: impl Into<String>, stg: &Stage) -> Self {
        Self::RuleViolation {
            reason: reason.into(),
            snapshot: Box::new(stg.clone()),
        }
    }
}
