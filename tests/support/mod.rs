use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

// Process environment is shared test state: every suite test serializes on
// this lock because configuration loading reads PACKDOCK__* overrides.
pub fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

/// Temp config root holding a `packdock.json` with the given tree.
pub fn config_root(tree: &Value) -> TempDir {
    let dir = tempfile::tempdir().expect("allocating config root");
    write_config(dir.path(), tree);
    dir
}

pub fn write_config(root: &Path, tree: &Value) {
    fs::write(
        root.join("packdock.json"),
        serde_json::to_string_pretty(tree).expect("serializing config"),
    )
    .expect("writing packdock.json");
}

/// Sets an environment variable for the guard's lifetime, restoring the
/// previous value on drop. Callers must hold [`env_lock`].
pub struct EnvGuard {
    name: String,
    previous: Option<String>,
}

impl EnvGuard {
    pub fn set(name: &str, value: &str) -> Self {
        let previous = env::var(name).ok();
        // SAFETY: suite tests serialize environment access through env_lock.
        unsafe { env::set_var(name, value) };
        Self {
            name: name.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            // SAFETY: see EnvGuard::set.
            Some(value) => unsafe { env::set_var(&self.name, value) },
            None => unsafe { env::remove_var(&self.name) },
        }
    }
}
