use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::config::QuotaConfig;
use super::entitlement::Credits;
use super::entitlement::Tier;
use super::entitlement::UserEntitlement;
use super::error::WorkspaceResult;

pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    UserTier,
    AiCredits,
    OnboardingComplete,
    AdminMode,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 4] = [
        PreferenceKey::UserTier,
        PreferenceKey::AiCredits,
        PreferenceKey::OnboardingComplete,
        PreferenceKey::AdminMode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserTier => "bmad-user-tier",
            Self::AiCredits => "bmad-ai-credits",
            Self::OnboardingComplete => "bmad-onboarding-complete",
            Self::AdminMode => "bmad-admin-mode",
        }
    }
}

/// String-keyed store of JSON values. Each preference lives under its own key.
pub trait PreferenceStore {
    fn get_raw(&self, key: &str) -> WorkspaceResult<Option<Value>>;
    fn set_raw(&mut self, key: &str, value: Value) -> WorkspaceResult<()>;
    fn clear(&mut self) -> WorkspaceResult<()>;

    /// Reads `key`, falling back to `default` when the key is missing or its
    /// value does not decode as `T`.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        let raw = match self.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read preference");
                return default;
            }
        };
        match serde_json::from_value(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring undecodable preference");
                default
            }
        }
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) -> WorkspaceResult<()>
    where
        Self: Sized,
    {
        let encoded = serde_json::to_value(value)?;
        self.set_raw(key, encoded)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_raw(&self, key: &str) -> WorkspaceResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: Value) -> WorkspaceResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self) -> WorkspaceResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Preferences kept as one JSON object on disk. Every mutation rewrites the
/// file before returning.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FilePreferenceStore {
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(PREFERENCES_FILE_NAME);
        let entries = load_entries(&path)?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> WorkspaceResult<()> {
        let encoded = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, &encoded)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get_raw(&self, key: &str) -> WorkspaceResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: Value) -> WorkspaceResult<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn clear(&mut self) -> WorkspaceResult<()> {
        self.entries.clear();
        self.flush()
    }
}

fn load_entries(path: &Path) -> std::io::Result<BTreeMap<String, Value>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let bytes = std::fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    match serde_json::from_slice::<BTreeMap<String, Value>>(&bytes) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "discarding unreadable preferences file");
            Ok(BTreeMap::new())
        }
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydratedPreferences {
    pub entitlement: UserEntitlement,
    pub onboarding_complete: bool,
    pub admin_mode: bool,
}

pub fn load_preferences<S: PreferenceStore>(store: &S, quotas: &QuotaConfig) -> HydratedPreferences {
    let tier = store.get(PreferenceKey::UserTier.as_str(), Tier::Free);
    let credits = store.get(
        PreferenceKey::AiCredits.as_str(),
        Credits::Finite(quotas.free_credits),
    );
    HydratedPreferences {
        entitlement: UserEntitlement::from_persisted(tier, credits, quotas),
        onboarding_complete: store.get(PreferenceKey::OnboardingComplete.as_str(), false),
        admin_mode: store.get(PreferenceKey::AdminMode.as_str(), false),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::load_preferences;
    use super::FilePreferenceStore;
    use super::MemoryPreferenceStore;
    use super::PreferenceKey;
    use super::PreferenceStore;
    use crate::config::QuotaConfig;
    use crate::entitlement::Credits;
    use crate::entitlement::Tier;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_key_yields_default() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("absent", 7_u32), 7);
        assert!(store.get("absent-flag", true));
    }

    #[test]
    fn undecodable_value_yields_default() {
        let mut store = MemoryPreferenceStore::new();
        store
            .set_raw(PreferenceKey::UserTier.as_str(), json!("platinum"))
            .expect("set");
        assert_eq!(store.get(PreferenceKey::UserTier.as_str(), Tier::Free), Tier::Free);
    }

    #[test]
    fn file_store_round_trips_and_survives_reopen() {
        let dir = tempdir().expect("tmpdir");
        let nested = json!({"files": ["index.jsx", "styles.css"], "count": 3});
        {
            let mut store = FilePreferenceStore::open(dir.path()).expect("open");
            store.set("nested", &nested).expect("set");
            store
                .set(PreferenceKey::AiCredits.as_str(), &Credits::Finite(12))
                .expect("set");
            let read: serde_json::Value = store.get("nested", serde_json::Value::Null);
            assert_eq!(read, nested);
        }

        let reopened = FilePreferenceStore::open(dir.path()).expect("reopen");
        let read: serde_json::Value = reopened.get("nested", serde_json::Value::Null);
        assert_eq!(read, nested);
        assert_eq!(
            reopened.get(PreferenceKey::AiCredits.as_str(), Credits::Finite(0)),
            Credits::Finite(12)
        );
    }

    #[test]
    fn file_store_clear_removes_everything() {
        let dir = tempdir().expect("tmpdir");
        let mut store = FilePreferenceStore::open(dir.path()).expect("open");
        store.set(PreferenceKey::AdminMode.as_str(), &true).expect("set");
        store.clear().expect("clear");

        let reopened = FilePreferenceStore::open(dir.path()).expect("reopen");
        assert!(!reopened.get(PreferenceKey::AdminMode.as_str(), false));
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempdir().expect("tmpdir");
        std::fs::write(dir.path().join(super::PREFERENCES_FILE_NAME), b"{not json").expect("write");
        let store = FilePreferenceStore::open(dir.path()).expect("open");
        assert_eq!(store.get(PreferenceKey::AiCredits.as_str(), 50_u32), 50);
    }

    #[test]
    fn hydration_defaults_to_free_fifty() {
        let store = MemoryPreferenceStore::new();
        let hydrated = load_preferences(&store, &QuotaConfig::default());
        assert_eq!(hydrated.entitlement.tier, Tier::Free);
        assert_eq!(hydrated.entitlement.credits, Credits::Finite(50));
        assert!(!hydrated.onboarding_complete);
        assert!(!hydrated.admin_mode);
    }

    #[test]
    fn hydration_reads_each_key_independently() {
        let mut store = MemoryPreferenceStore::new();
        store.set_raw(PreferenceKey::UserTier.as_str(), json!("enterprise")).expect("set");
        store.set_raw(PreferenceKey::AiCredits.as_str(), json!(9999)).expect("set");
        store.set_raw(PreferenceKey::AdminMode.as_str(), json!(true)).expect("set");

        let hydrated = load_preferences(&store, &QuotaConfig::default());
        assert_eq!(hydrated.entitlement.tier, Tier::Enterprise);
        assert_eq!(hydrated.entitlement.credits, Credits::Unbounded);
        assert!(hydrated.admin_mode);
        assert!(!hydrated.onboarding_complete);
    }
}
