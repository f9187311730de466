use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Каталог XDG_RUNTIME_DIR пользователя, в котором Hyprland держит сокеты.
///
/// Под `sudo` переменная указывает на root, поэтому берём каталог SUDO_USER.
pub fn runtime_dir() -> Option<PathBuf> {
    if let Ok(sudo_user) = std::env::var("SUDO_USER") {
        if let Some(uid) = uid_of(&sudo_user) {
            debug!("Используем runtime-каталог пользователя {}: uid={}", sudo_user, uid);
            return Some(PathBuf::from(format!("/run/user/{}", uid)));
        }
    }

    if let Some(dir) = std::env::var_os("XDG_RUNTIME_DIR") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    let user = std::env::var("USER").ok()?;
    uid_of(&user).map(|uid| PathBuf::from(format!("/run/user/{}", uid)))
}

fn uid_of(user: &str) -> Option<String> {
    let output = Command::new("id").args(["-u", user]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let uid = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!uid.is_empty()).then_some(uid)
}
