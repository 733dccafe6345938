use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use crate::autostart::{Autostart, LaunchAgent, Unavailable};
use crate::control::{ControlEvent, ControlHandler, Controller};
use crate::core::Config;
use crate::ipc::{IpcCommandWithResponse, IpcServer, SOCKET_PATH};
use crate::platform;
use crate::scheduler::Scheduler;

pub struct App {}

impl App {
    /// Runs the daemon until an exit request. The control socket is bound
    /// before the movement thread starts; on exit the thread is joined
    /// before returning.
    pub fn run(config: Config) -> Result<()> {
        let cursor = platform::system_cursor()?;
        let autostart: Box<dyn Autostart> = match LaunchAgent::for_current_user(&config) {
            Ok(agent) => Box::new(agent),
            Err(e) => {
                tracing::warn!("Autostart unavailable: {}", e);
                Box::new(Unavailable::new(e.to_string()))
            }
        };

        let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

        let (ipc_tx, ipc_rx) = mpsc::channel::<IpcCommandWithResponse>(32);
        let server = {
            let _guard = rt.enter();
            Arc::new(IpcServer::bind(SOCKET_PATH, ipc_tx)?)
        };

        let scheduler = Scheduler::spawn(config, cursor)?;
        let mut controller = Controller::new(scheduler, autostart);
        tracing::info!("{}", controller.tooltip());

        let result = rt.block_on(Self::control_loop(
            Arc::clone(&server),
            ipc_rx,
            &mut controller,
        ));

        controller.shutdown();
        // Removes the socket file, now that the movement thread is joined.
        drop(server);
        tracing::info!("mousemover stopped");
        result
    }

    async fn control_loop<H: ControlHandler>(
        server: Arc<IpcServer>,
        mut ipc_rx: mpsc::Receiver<IpcCommandWithResponse>,
        handler: &mut H,
    ) -> Result<()> {
        let mut sigterm = signal(SignalKind::terminate()).context("Failed to watch SIGTERM")?;
        let mut sigusr1 =
            signal(SignalKind::user_defined1()).context("Failed to watch SIGUSR1")?;

        let server_task = tokio::spawn(async move {
            if let Err(e) = server.run().await {
                tracing::error!("IPC server error: {}", e);
            }
        });

        loop {
            let (event, resp_tx) = tokio::select! {
                Some((cmd, resp_tx)) = ipc_rx.recv() => (ControlEvent::from(cmd), Some(resp_tx)),
                _ = tokio::signal::ctrl_c() => (ControlEvent::Exit, None),
                _ = sigterm.recv() => (ControlEvent::Exit, None),
                _ = sigusr1.recv() => (ControlEvent::PauseToggle, None),
            };

            let response = handler.handle(event);
            if let Some(resp_tx) = resp_tx {
                let _ = resp_tx.send(response).await;
            }

            if event == ControlEvent::Exit {
                break;
            }
        }

        server_task.abort();
        let _ = server_task.await;
        Ok(())
    }
}
