use serde::{Deserialize, Serialize};

use crate::menu::MenuItem;
use crate::status::StatusInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Movement control
    Pause,
    Resume,
    TogglePause,

    // Queries
    Status,
    Menu,

    // Login item
    SetAutostart { enabled: bool },

    // Control
    Quit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Error { message: String },
    Status { status: StatusInfo },
    Menu { items: Vec<MenuItem> },
}
