use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;

use mousemover_ipc::{Command, Response};

pub type IpcCommandWithResponse = (Command, mpsc::Sender<Response>);

pub struct IpcServer {
    socket_path: PathBuf,
    listener: UnixListener,
    cmd_tx: mpsc::Sender<IpcCommandWithResponse>,
}

impl IpcServer {
    /// Binds the control socket. Fails if another daemon is already
    /// answering on it; a stale socket file is replaced.
    /// Must be called inside a tokio runtime.
    pub fn bind(
        socket_path: impl AsRef<Path>,
        cmd_tx: mpsc::Sender<IpcCommandWithResponse>,
    ) -> Result<Self> {
        let socket_path = socket_path.as_ref().to_path_buf();

        if socket_path.exists() {
            if std::os::unix::net::UnixStream::connect(&socket_path).is_ok() {
                bail!(
                    "mousemover is already running (socket {:?} is in use)",
                    socket_path
                );
            }
            std::fs::remove_file(&socket_path)
                .with_context(|| format!("Failed to remove stale socket {:?}", socket_path))?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind control socket {:?}", socket_path))?;
        tracing::info!("IPC server listening on {:?}", socket_path);

        Ok(Self {
            socket_path,
            listener,
            cmd_tx,
        })
    }

    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let cmd_tx = self.cmd_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(stream, cmd_tx).await {
                            tracing::error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                }
            }
        }
    }

    async fn handle_connection(
        stream: UnixStream,
        cmd_tx: mpsc::Sender<IpcCommandWithResponse>,
    ) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                break; // EOF
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Command>(line) {
                Ok(cmd) => {
                    tracing::debug!("Received command: {:?}", cmd);
                    let (resp_tx, mut resp_rx) = mpsc::channel(1);

                    if cmd_tx.send((cmd, resp_tx)).await.is_err() {
                        Response::Error {
                            message: "Internal error: command channel closed".to_string(),
                        }
                    } else {
                        resp_rx.recv().await.unwrap_or(Response::Error {
                            message: "Internal error: no response".to_string(),
                        })
                    }
                }
                Err(e) => Response::Error {
                    message: format!("Invalid command: {}", e),
                },
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    async fn roundtrip(path: &Path, request: &str) -> Response {
        let stream = UnixStream::connect(path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer.write_all(request.as_bytes()).await.unwrap();
        writer.write_all(b"\n").await.unwrap();

        let mut line = String::new();
        BufReader::new(reader).read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_command_is_forwarded_and_answered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mm.sock");
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<IpcCommandWithResponse>(8);

        let server = IpcServer::bind(&path, cmd_tx).unwrap();
        let server_task = tokio::spawn(async move { server.run().await });

        tokio::spawn(async move {
            while let Some((cmd, resp_tx)) = cmd_rx.recv().await {
                let response = match cmd {
                    Command::Quit => Response::Ok,
                    other => Response::Error {
                        message: format!("{:?}", other),
                    },
                };
                let _ = resp_tx.send(response).await;
            }
        });

        assert!(matches!(
            roundtrip(&path, "{\"type\":\"quit\"}").await,
            Response::Ok
        ));
        match roundtrip(&path, "{\"type\":\"status\"}").await {
            Response::Error { message } => assert_eq!(message, "Status"),
            other => panic!("Unexpected response: {:?}", other),
        }

        server_task.abort();
    }

    #[tokio::test]
    async fn test_invalid_command_gets_error_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mm.sock");
        let (cmd_tx, _cmd_rx) = mpsc::channel::<IpcCommandWithResponse>(8);

        let server = IpcServer::bind(&path, cmd_tx).unwrap();
        let server_task = tokio::spawn(async move { server.run().await });

        match roundtrip(&path, "not json").await {
            Response::Error { message } => assert!(message.starts_with("Invalid command")),
            other => panic!("Unexpected response: {:?}", other),
        }

        server_task.abort();
    }

    #[tokio::test]
    async fn test_second_instance_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mm.sock");
        let (cmd_tx, _cmd_rx) = mpsc::channel::<IpcCommandWithResponse>(8);

        let _first = IpcServer::bind(&path, cmd_tx.clone()).unwrap();
        let err = IpcServer::bind(&path, cmd_tx).err().unwrap();
        assert!(err.to_string().contains("already running"));
    }

    #[tokio::test]
    async fn test_stale_socket_is_replaced_and_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mm.sock");
        std::fs::write(&path, "").unwrap();
        let (cmd_tx, _cmd_rx) = mpsc::channel::<IpcCommandWithResponse>(8);

        let server = IpcServer::bind(&path, cmd_tx).unwrap();
        assert!(path.exists());

        drop(server);
        assert!(!path.exists());
    }
}
