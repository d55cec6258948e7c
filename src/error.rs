use std::fmt;

use crate::entity::{Entity, Messages};
use crate::gateway::GatewayError;

/// Store operation, used to pick the fallback message and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Load,
    Add,
    Update,
    Remove,
}

impl StoreOp {
    pub fn fallback_message<T: Entity>(self) -> &'static str {
        let Messages {
            load,
            add,
            update,
            remove,
        } = T::messages();
        match self {
            StoreOp::Load => load,
            StoreOp::Add => add,
            StoreOp::Update => update,
            StoreOp::Remove => remove,
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::Load => "load",
            StoreOp::Add => "add",
            StoreOp::Update => "update",
            StoreOp::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Error returned by the mutating store operations after rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The gateway call failed; the optimistic change has been rolled back.
    Gateway {
        op: StoreOp,
        /// Short user-facing message, also recorded in the store's error field.
        message: String,
        source: GatewayError,
    },
    /// The create payload was rejected before anything was applied.
    InvalidDraft(String),
    /// No entity with this id is in the collection.
    NotFound { kind: &'static str, id: String },
    /// The actor tried to act on themself (e.g. follow their own account).
    SelfTarget,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Gateway { op, source, .. } => write!(f, "{} failed: {}", op, source),
            StoreError::InvalidDraft(msg) => write!(f, "invalid draft: {}", msg),
            StoreError::NotFound { kind, id } => write!(f, "{} {} not found", kind, id),
            StoreError::SelfTarget => write!(f, "cannot target own account"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Gateway { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl StoreError {
    /// Short message suitable for a toast or dialog.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Gateway { message, .. } => message.clone(),
            StoreError::InvalidDraft(msg) => msg.clone(),
            StoreError::NotFound { .. } => "대상을 찾을 수 없습니다.".into(),
            StoreError::SelfTarget => "자기 자신은 팔로우할 수 없습니다.".into(),
        }
    }
}
