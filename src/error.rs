use thiserror::Error;

#[derive(Error, Debug)]
pub enum VibrError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка разбора JSON от композитора: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ошибка IPC Hyprland: {0}")]
    Ipc(String),

    #[error("Сокет не найден: {0}")]
    SocketNotFound(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),
}

impl VibrError {
    pub fn socket_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(VibrError::SocketNotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, VibrError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! vibr_error {
    (ipc, $($arg:tt)*) => {
        $crate::error::VibrError::Ipc(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::VibrError::ServiceUnavailable(format!($($arg)*))
    };
}
