use crate::error::{Result, VibrError};
use crate::{trace_if_enabled, vibr_error};
use crate::utils::runtime_dir;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const REQUEST_SOCKET: &str = ".socket.sock";
const EVENT_SOCKET: &str = ".socket2.sock";
const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// Пути к сокетам экземпляра Hyprland
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyprSockets {
    dir: PathBuf,
}

impl HyprSockets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Найти каталог сокетов: `$XDG_RUNTIME_DIR/hypr/<sig>`, затем `/tmp/hypr/<sig>`
    pub fn discover(signature: Option<&str>) -> Result<Self> {
        let signature = match signature {
            Some(sig) if !sig.is_empty() => sig.to_string(),
            _ => std::env::var("HYPRLAND_INSTANCE_SIGNATURE").map_err(|_| {
                VibrError::ServiceUnavailable(
                    "HYPRLAND_INSTANCE_SIGNATURE не задан, Hyprland не запущен?".to_string(),
                )
            })?,
        };

        let candidates = runtime_dir()
            .map(|dir| dir.join("hypr").join(&signature))
            .into_iter()
            .chain(std::iter::once(PathBuf::from("/tmp/hypr").join(&signature)));

        for dir in candidates {
            if dir.join(REQUEST_SOCKET).exists() {
                debug!("Сокеты Hyprland найдены в {:?}", dir);
                return Ok(Self::new(dir));
            }
        }

        VibrError::socket_not_found(format!("сокет Hyprland для экземпляра '{}'", signature))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn request_path(&self) -> PathBuf {
        self.dir.join(REQUEST_SOCKET)
    }

    pub fn event_path(&self) -> PathBuf {
        self.dir.join(EVENT_SOCKET)
    }

    /// Отправить команду в `.socket.sock` и прочитать ответ целиком
    pub fn request(&self, command: &str) -> Result<String> {
        trace_if_enabled!("IPC -> {}", command);

        let mut stream = UnixStream::connect(self.request_path())?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        stream.write_all(command.as_bytes())?;

        let mut response = String::new();
        stream.read_to_string(&mut response)?;

        trace_if_enabled!("IPC <- {}", response);
        Ok(response)
    }

    /// Команда, на которую Hyprland отвечает `ok`
    pub fn command(&self, command: &str) -> Result<()> {
        let response = self.request(command)?;
        if response.trim() == "ok" {
            Ok(())
        } else {
            Err(vibr_error!(ipc, "'{}': {}", command, response.trim()))
        }
    }
}
