//! Engine error types.
//!
//! These cover write-path validation and infrastructure faults only.
//! Resolution denials are verdict fields, never errors.

use deskgate_core::error::CoreError;
use deskgate_core::models::group::GroupType;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("unknown group: {0}")]
    UnknownGroup(Uuid),

    #[error(
        "chat {chat_id} is already registered to tenant {tenant_id} \
         as '{group_name}' ({group_type})"
    )]
    DuplicateChat {
        chat_id: String,
        tenant_id: Uuid,
        group_name: String,
        group_type: GroupType,
        is_active: bool,
    },

    #[error("user {user_id} is already declared in group {group_id}")]
    AlreadyDeclared { user_id: String, group_id: Uuid },

    #[error("invalid group type: {0}")]
    InvalidGroupType(String),

    #[error("resolution stage '{stage}' timed out")]
    ResolutionTimeout { stage: &'static str },

    #[error(transparent)]
    Store(#[from] CoreError),
}

impl From<EngineError> for CoreError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRequest(msg) | EngineError::InvalidGroupType(msg) => {
                CoreError::Validation { message: msg }
            }
            EngineError::UnknownTenant(id) => CoreError::NotFound {
                entity: "tenant".into(),
                id,
            },
            EngineError::UnknownGroup(id) => CoreError::NotFound {
                entity: "telegram_group".into(),
                id: id.to_string(),
            },
            EngineError::DuplicateChat { chat_id, .. } => CoreError::AlreadyExists {
                entity: "telegram_group".into(),
                key: chat_id,
            },
            EngineError::AlreadyDeclared { user_id, group_id } => CoreError::AlreadyExists {
                entity: "user_declaration".into(),
                key: format!("user={user_id},group={group_id}"),
            },
            EngineError::ResolutionTimeout { stage } => CoreError::Timeout {
                operation: stage.into(),
            },
            EngineError::Store(inner) => inner,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
