use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const CREDENTIALS_FILE: &str = "session.json";

/// Which of the two independent credential slots a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialScope {
    /// Bearer token issued by `/auth/login`.
    User,
    /// Token issued by `/admin/login`, sent on its own header.
    Admin,
}

impl CredentialScope {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialScope::User => "user",
            CredentialScope::Admin => "admin",
        }
    }
}

/// On-disk layout. Keys match the storage keys the web client used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct Slots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin_token: Option<String>,
}

impl Slots {
    fn slot_mut(&mut self, scope: CredentialScope) -> &mut Option<String> {
        match scope {
            CredentialScope::User => &mut self.token,
            CredentialScope::Admin => &mut self.admin_token,
        }
    }

    fn slot(&self, scope: CredentialScope) -> Option<&String> {
        match scope {
            CredentialScope::User => self.token.as_ref(),
            CredentialScope::Admin => self.admin_token.as_ref(),
        }
    }
}

/// Process-wide holder of the user and admin tokens.
///
/// Cloning is cheap and every clone sees the same slots. When backed by a
/// file, every mutation is written through before the lock is released, so
/// readers never observe a half-written token. No well-formedness checks are
/// done here; an empty value is treated as "absent".
#[derive(Clone, Debug)]
pub struct CredentialStore {
    slots: Arc<RwLock<Slots>>,
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            slots: Arc::new(RwLock::new(Slots::default())),
            path: None,
        }
    }

    /// Open the store persisted under the platform config directory.
    pub fn load() -> Self {
        Self::open(Self::default_path())
    }

    /// Open (or lazily create) a store persisted at `path`.
    ///
    /// A missing or unreadable file yields an empty store; the file is only
    /// written on the next mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let slots = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<Slots>(&content) {
                    Ok(slots) => {
                        tracing::info!("Loaded credentials from {:?}", path);
                        slots
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse credentials file: {}", e);
                        Slots::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read credentials file: {}", e);
                    Slots::default()
                }
            }
        } else {
            Slots::default()
        };

        Self {
            slots: Arc::new(RwLock::new(sanitize(slots))),
            path: Some(path),
        }
    }

    /// Default location: `<config_dir>/wallet-shell/session.json`.
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("wallet-shell");
            if !app_dir.exists() {
                let _ = fs::create_dir_all(&app_dir);
            }
            app_dir.join(CREDENTIALS_FILE)
        } else {
            PathBuf::from(CREDENTIALS_FILE)
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stored token for `scope`, or an empty string when absent.
    pub fn get(&self, scope: CredentialScope) -> String {
        self.read().slot(scope).cloned().unwrap_or_default()
    }

    pub fn has(&self, scope: CredentialScope) -> bool {
        self.read().slot(scope).is_some()
    }

    /// Store `token` for `scope`. An empty (or whitespace-only) value clears the slot.
    pub fn set(&self, scope: CredentialScope, token: impl Into<String>) {
        let token = token.into();
        let mut slots = self.write();
        *slots.slot_mut(scope) = if token.trim().is_empty() { None } else { Some(token) };
        self.persist(&slots);
    }

    pub fn clear(&self, scope: CredentialScope) {
        let mut slots = self.write();
        if slots.slot_mut(scope).take().is_some() {
            tracing::info!("Cleared {} credential", scope.label());
        }
        self.persist(&slots);
    }

    /// Clear `scope` only while it still holds `expected`. Returns whether it did.
    ///
    /// Lets a late result discard the token it was about, without wiping one
    /// that was stored in the meantime.
    pub fn clear_if(&self, scope: CredentialScope, expected: &str) -> bool {
        let mut slots = self.write();
        let slot = slots.slot_mut(scope);
        if slot.as_deref() != Some(expected) {
            return false;
        }
        *slot = None;
        tracing::info!("Cleared {} credential", scope.label());
        self.persist(&slots);
        true
    }

    /// Drop both slots.
    pub fn clear_all(&self) {
        let mut slots = self.write();
        *slots = Slots::default();
        self.persist(&slots);
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write-through to disk. The in-memory value stays authoritative if this fails.
    fn persist(&self, slots: &Slots) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_atomically(path, slots) {
            tracing::warn!("Failed to save credentials to {:?}: {}", path, e);
        }
    }
}

fn sanitize(mut slots: Slots) -> Slots {
    for scope in [CredentialScope::User, CredentialScope::Admin] {
        let slot = slots.slot_mut(scope);
        if slot.as_deref().map(|t| t.trim().is_empty()).unwrap_or(false) {
            *slot = None;
        }
    }
    slots
}

fn write_atomically(path: &Path, slots: &Slots) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(slots)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
