use mousemover_ipc::{Command, MenuItem, Response, StatusInfo};

use crate::autostart::Autostart;
use crate::scheduler::{Scheduler, SchedulerState};

/// Requests from the control surface, already translated from whatever
/// raised them (socket command, signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    PauseToggle,
    Pause,
    Resume,
    Status,
    ContextMenuRequest,
    SetAutostart(bool),
    Exit,
}

impl From<Command> for ControlEvent {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Pause => Self::Pause,
            Command::Resume => Self::Resume,
            Command::TogglePause => Self::PauseToggle,
            Command::Status => Self::Status,
            Command::Menu => Self::ContextMenuRequest,
            Command::SetAutostart { enabled } => Self::SetAutostart(enabled),
            Command::Quit => Self::Exit,
        }
    }
}

pub trait ControlHandler {
    fn handle(&mut self, event: ControlEvent) -> Response;
}

/// Applies control events to the scheduler and the login item.
pub struct Controller<A> {
    scheduler: Scheduler,
    autostart: A,
    tooltip: String,
}

impl<A: Autostart> Controller<A> {
    pub fn new(scheduler: Scheduler, autostart: A) -> Self {
        let tooltip = scheduler.status_line();
        Self {
            scheduler,
            autostart,
            tooltip,
        }
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Latest status line, refreshed on every pause/resume.
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn status(&self) -> StatusInfo {
        let config = self.scheduler.config();
        StatusInfo {
            paused: self.scheduler.is_paused(),
            short_delay: config.short_delay(),
            long_delay: config.long_delay(),
            distance: config.distance(),
            summary: self.tooltip.clone(),
        }
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        let pause_label = if self.scheduler.is_paused() {
            "Resume"
        } else {
            "Pause"
        };
        let autostart = self.autostart.is_enabled();
        vec![
            MenuItem::action(pause_label, Command::TogglePause),
            MenuItem::Separator,
            MenuItem::checkbox(
                "Start at login",
                Command::SetAutostart {
                    enabled: !autostart,
                },
                autostart,
            ),
            MenuItem::Separator,
            MenuItem::action("Exit", Command::Quit),
        ]
    }

    /// Stops the movement thread and waits for it.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
    }

    /// Pause state can no longer change once the scheduler has stopped.
    fn change_pause(&mut self, change: impl FnOnce(&Scheduler)) -> Result<(), Response> {
        if self.scheduler.state() == SchedulerState::Stopped {
            return Err(Response::Error {
                message: "Scheduler is stopped".to_string(),
            });
        }
        change(&self.scheduler);
        self.refresh_tooltip();
        Ok(())
    }

    fn refresh_tooltip(&mut self) {
        self.tooltip = self.scheduler.status_line();
        tracing::info!("{}", self.tooltip);
    }
}

impl<A: Autostart> ControlHandler for Controller<A> {
    fn handle(&mut self, event: ControlEvent) -> Response {
        match event {
            ControlEvent::PauseToggle => match self.change_pause(|s| {
                s.toggle_pause();
            }) {
                Ok(()) => Response::Status {
                    status: self.status(),
                },
                Err(response) => response,
            },
            ControlEvent::Pause => match self.change_pause(Scheduler::pause) {
                Ok(()) => Response::Ok,
                Err(response) => response,
            },
            ControlEvent::Resume => match self.change_pause(Scheduler::resume) {
                Ok(()) => Response::Ok,
                Err(response) => response,
            },
            ControlEvent::Status => Response::Status {
                status: self.status(),
            },
            ControlEvent::ContextMenuRequest => Response::Menu { items: self.menu() },
            ControlEvent::SetAutostart(enable) => match self.autostart.set_enabled(enable) {
                Ok(()) => Response::Ok,
                Err(e) => {
                    tracing::warn!("Failed to update autostart: {}", e);
                    Response::Error {
                        message: format!("Failed to update autostart: {}", e),
                    }
                }
            },
            ControlEvent::Exit => {
                tracing::info!("Exit requested");
                Response::Ok
            }
        }
    }
}
