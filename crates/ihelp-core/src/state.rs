//! UI-agnostic conversation types
//!
//! This module contains data structures that are shared between different UIs
//! and don't depend on any specific UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A chat message in the conversation. Never edited once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: u64,
    role: Role,
    content: String,
    timestamp: DateTime<Local>,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Message {
    pub(crate) fn new(id: u64, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Time label shown under each bubble, e.g. "09:41 AM"
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%I:%M %p").to_string()
    }
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "iHelp",
        }
    }
}
