pub mod command;
pub mod menu;
pub mod status;

pub use command::{Command, Response};
pub use menu::MenuItem;
pub use status::StatusInfo;
