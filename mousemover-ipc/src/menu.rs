use serde::{Deserialize, Serialize};

use crate::command::Command;

/// One row of the context menu. The daemon builds the model; whatever renders
/// it sends back the attached command when an entry is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuItem {
    Action {
        label: String,
        command: Command,
        #[serde(default)]
        checked: bool,
    },
    Separator,
}

impl MenuItem {
    pub fn action(label: impl Into<String>, command: Command) -> Self {
        Self::Action {
            label: label.into(),
            command,
            checked: false,
        }
    }

    pub fn checkbox(label: impl Into<String>, command: Command, checked: bool) -> Self {
        Self::Action {
            label: label.into(),
            command,
            checked,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Action { label, .. } => Some(label),
            Self::Separator => None,
        }
    }

    pub fn command(&self) -> Option<&Command> {
        match self {
            Self::Action { command, .. } => Some(command),
            Self::Separator => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Action { checked: true, .. })
    }
}
