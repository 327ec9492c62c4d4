use std::path::PathBuf;
use std::os::unix::net::{UnixListener, UnixStream};
use std::io::{Read, Write};
use serde::{Serialize, Deserialize};
use anyhow::{Result, Context};
use crate::slideshow::SlideshowStatus;
use crate::swww::Monitor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpcCommand {
    Next,
    Start,
    Stop,
    Toggle,
    Select { path: PathBuf },
    Preview { path: PathBuf },
    SetFolder { path: PathBuf },
    Rescan,
    Clear,
    AddFolder { path: PathBuf },
    AddFile { path: PathBuf },
    SetSponsorFolder { path: PathBuf },
    SetInterval { seconds: u64 },
    SetRandom { enabled: bool },
    SetSponsors { enabled: bool },
    SetWatch { enabled: bool },
    PlayVideo { path: PathBuf },
    StopVideo,
    VideoState { code: i32 },
    Archive { dest: PathBuf },
    DeleteRecent,
    Delete { paths: Vec<PathBuf> },
    ShowGallery,
    HideGallery,
    Monitors,
    Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum IpcResponse {
    Success { message: String },
    Error { message: String },
    Status { status: SlideshowStatus },
    Monitors {
        monitors: Vec<Monitor>,
        gallery: Option<String>,
    },
}

impl IpcResponse {
    pub fn success(message: impl Into<String>) -> Self {
        IpcResponse::Success { message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        IpcResponse::Error { message: message.into() }
    }
}

pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("photoreel.sock")
}

pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    pub fn new() -> Self {
        Self::with_socket(default_socket_path())
    }

    pub fn with_socket(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub fn send_command(&self, command: IpcCommand) -> Result<IpcResponse> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .with_context(|| format!("Failed to connect to photoreel daemon at {:?}", self.socket_path))?;

        let command_json = serde_json::to_string(&command)
            .with_context(|| "Failed to serialize command")?;

        stream.write_all(command_json.as_bytes())
            .with_context(|| "Failed to send command to daemon")?;
        stream.shutdown(std::net::Shutdown::Write)
            .with_context(|| "Failed to shutdown write stream")?;

        let mut response = String::new();
        stream.read_to_string(&mut response)
            .with_context(|| "Failed to read response from daemon")?;

        let ipc_response: IpcResponse = serde_json::from_str(&response)
            .with_context(|| "Failed to deserialize response")?;

        Ok(ipc_response)
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IpcServer {
    socket_path: PathBuf,
}

impl IpcServer {
    pub fn new() -> Self {
        Self::with_socket(default_socket_path())
    }

    pub fn with_socket(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub fn socket_path(&self) -> &std::path::Path {
        &self.socket_path
    }

    /// Binds the socket, replacing a stale one left by a previous run.
    pub fn bind(&self) -> Result<UnixListener> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .with_context(|| "Failed to remove existing socket")?;
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| "Failed to create socket directory")?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .with_context(|| format!("Failed to bind to socket {:?}", self.socket_path))?;

        log::info!("IPC server listening on {:?}", self.socket_path);
        Ok(listener)
    }

    /// Serves connections one at a time until the listener fails.
    ///
    /// Requests are handled in order so the handler can forward them to a
    /// single owner of the slideshow state.
    pub fn serve<F>(listener: UnixListener, mut handler: F)
    where
        F: FnMut(IpcCommand) -> Result<IpcResponse>,
    {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = Self::handle_connection(stream, &mut handler) {
                        log::error!("Error handling IPC connection: {}", e);
                    }
                }
                Err(e) => {
                    log::error!("Error accepting IPC connection: {}", e);
                }
            }
        }
    }

    fn handle_connection<F>(mut stream: UnixStream, handler: &mut F) -> Result<()>
    where
        F: FnMut(IpcCommand) -> Result<IpcResponse>,
    {
        let mut command_json = String::new();
        stream.read_to_string(&mut command_json)
            .with_context(|| "Failed to read command from client")?;

        let response = match serde_json::from_str::<IpcCommand>(&command_json) {
            Ok(command) => {
                log::debug!("IPC command: {:?}", command);
                handler(command).unwrap_or_else(|e| IpcResponse::error(e.to_string()))
            }
            Err(e) => IpcResponse::error(format!("Invalid command: {}", e)),
        };

        let response_json = serde_json::to_string(&response)
            .with_context(|| "Failed to serialize response")?;

        stream.write_all(response_json.as_bytes())
            .with_context(|| "Failed to send response to client")?;

        Ok(())
    }
}

impl Default for IpcServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_string(&IpcCommand::SetInterval { seconds: 30 }).unwrap();
        assert_eq!(json, r#"{"SetInterval":{"seconds":30}}"#);

        let json = serde_json::to_string(&IpcCommand::Next).unwrap();
        assert_eq!(json, r#""Next""#);

        let parsed: IpcCommand = serde_json::from_str(r#"{"VideoState":{"code":3}}"#).unwrap();
        assert_eq!(parsed, IpcCommand::VideoState { code: 3 });
    }

    #[test]
    fn test_client_server_exchange() {
        let temp_dir = tempdir().unwrap();
        let socket = temp_dir.path().join("run").join("photoreel.sock");

        let server = IpcServer::with_socket(socket.clone());
        let listener = server.bind().unwrap();
        std::thread::spawn(move || {
            IpcServer::serve(listener, |command| match command {
                IpcCommand::Select { path } => Ok(IpcResponse::success(format!("selected {}", path.display()))),
                IpcCommand::Clear => Err(anyhow::anyhow!("refused")),
                _ => Ok(IpcResponse::error("unexpected")),
            });
        });

        let client = IpcClient::with_socket(socket);
        match client.send_command(IpcCommand::Select { path: PathBuf::from("/p/a.jpg") }).unwrap() {
            IpcResponse::Success { message } => assert_eq!(message, "selected /p/a.jpg"),
            other => panic!("Unexpected response: {:?}", other),
        }
        match client.send_command(IpcCommand::Clear).unwrap() {
            IpcResponse::Error { message } => assert_eq!(message, "refused"),
            other => panic!("Unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_bind_replaces_stale_socket() {
        let temp_dir = tempdir().unwrap();
        let socket = temp_dir.path().join("photoreel.sock");
        std::fs::write(&socket, "stale").unwrap();

        let server = IpcServer::with_socket(socket.clone());
        assert!(server.bind().is_ok());
    }

    #[test]
    fn test_client_without_daemon_fails() {
        let temp_dir = tempdir().unwrap();
        let client = IpcClient::with_socket(temp_dir.path().join("missing.sock"));
        assert!(client.send_command(IpcCommand::Status).is_err());
    }
}
