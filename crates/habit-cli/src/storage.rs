//! Persistence for the local [`Dashboard`].

use std::{io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};

use crate::dashboard::Dashboard;

/// Where a [`Dashboard`] is kept between runs.
pub trait StateStorage {
  /// The saved state. Missing or unreadable state yields `None`; unreadable
  /// state is logged.
  fn load(&self) -> Option<Dashboard>;

  fn save(&self, state: &Dashboard) -> Result<()>;

  fn clear(&self) -> Result<()>;
}

fn parse(raw: &str, origin: &str) -> Option<Dashboard> {
  serde_json::from_str(raw)
    .inspect_err(|e| tracing::warn!(error = %e, "ignoring unreadable dashboard state in {origin}"))
    .ok()
}

// ─── File ─────────────────────────────────────────────────────────────────────

/// JSON file on disk.
pub struct FileStorage {
  path: PathBuf,
}

impl FileStorage {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// `$HOME/.local/share/habits/dashboard.json`, or the working directory
  /// when `HOME` is unset.
  pub fn default_path() -> PathBuf {
    match std::env::var_os("HOME") {
      Some(home) => PathBuf::from(home).join(".local/share/habits/dashboard.json"),
      None => PathBuf::from("dashboard.json"),
    }
  }
}

impl StateStorage for FileStorage {
  fn load(&self) -> Option<Dashboard> {
    match std::fs::read_to_string(&self.path) {
      Ok(raw) => parse(&raw, &self.path.display().to_string()),
      Err(e) if e.kind() == ErrorKind::NotFound => None,
      Err(e) => {
        tracing::warn!(error = %e, path = %self.path.display(), "failed to read dashboard state");
        None
      }
    }
  }

  fn save(&self, state: &Dashboard) -> Result<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let raw = serde_json::to_string_pretty(state).context("serialising dashboard")?;
    std::fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
  }

  fn clear(&self) -> Result<()> {
    match std::fs::remove_file(&self.path) {
      Err(e) if e.kind() != ErrorKind::NotFound => {
        Err(e).with_context(|| format!("removing {}", self.path.display()))
      }
      _ => Ok(()),
    }
  }
}

// ─── Memory ───────────────────────────────────────────────────────────────────

/// Serialised state held in memory.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
  raw: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryStorage {
  /// Storage pre-loaded with `raw`, whatever it contains.
  pub fn with_raw(raw: impl Into<String>) -> Self {
    Self { raw: std::sync::Mutex::new(Some(raw.into())) }
  }

  fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
    self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

#[cfg(test)]
impl StateStorage for MemoryStorage {
  fn load(&self) -> Option<Dashboard> { self.slot().as_deref().and_then(|raw| parse(raw, "memory")) }

  fn save(&self, state: &Dashboard) -> Result<()> {
    *self.slot() = Some(serde_json::to_string(state).context("serialising dashboard")?);
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    *self.slot() = None;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dashboard::Action;

  fn sample() -> Dashboard {
    Dashboard::default()
      .apply(Action::ToggleCheck { id: "h-1".into(), day: 12 })
      .apply(Action::SetReflection("steady".into()))
  }

  fn exercise(storage: &dyn StateStorage) {
    assert!(storage.load().is_none());

    let state = sample();
    storage.save(&state).unwrap();
    assert_eq!(storage.load(), Some(state));

    storage.clear().unwrap();
    assert!(storage.load().is_none());
    storage.clear().unwrap();
  }

  #[test]
  fn memory_storage_save_load_clear() { exercise(&MemoryStorage::default()); }

  #[test]
  fn file_storage_save_load_clear() {
    let path = std::env::temp_dir()
      .join(format!("habits-dashboard-{}", std::process::id()))
      .join("dashboard.json");
    exercise(&FileStorage::new(&path));
    if let Some(dir) = path.parent() {
      std::fs::remove_dir_all(dir).ok();
    }
  }

  #[test]
  fn unreadable_state_loads_as_none() {
    assert!(MemoryStorage::with_raw("{not json").load().is_none());
    assert!(MemoryStorage::with_raw(r#"{"month": 3}"#).load().is_none());
  }
}
