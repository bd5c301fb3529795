//! Contributor display-name refresh
//!
//! Resolves the display name for every contributor UUID against the Mojang
//! profile API and patches `ContributorList.json` when names drift. Lookups
//! are independent and side-effect free, so they run on a small fixed pool
//! of worker threads; results are collected as they complete with no
//! ordering guarantee. A failed lookup marks that UUID unresolved and never
//! aborts the batch. The file is rewritten (pretty, write-then-rename) only
//! if at least one name actually changed.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Profile endpoint; the UUID is appended.
pub const API_URL: &str = "https://api.mojang.com/user/profile/";
/// User agent sent with every lookup
pub const USER_AGENT: &str = "Contributors-Updater/1.0";
/// Per-request timeout
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(60);
/// Size of the lookup worker pool
pub const MAX_WORKERS: usize = 5;

/// One contributor record. Fields other than the display name are carried
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The ContributorList.json document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorList {
    pub contributors: BTreeMap<String, Contributor>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Errors for contributor list I/O
#[derive(Debug, thiserror::Error)]
pub enum ContributorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContributorList {
    /// Load from file
    pub fn from_file(path: &Path) -> Result<Self, ContributorError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write atomically to file (write-then-rename, pretty-printed)
    pub fn write_to_file(&self, path: &Path) -> Result<(), ContributorError> {
        let json = serde_json::to_string_pretty(self)?;

        let temp_path = temp_path_for(path);
        fs::write(&temp_path, &json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".new");
    path.with_file_name(name)
}

/// Errors for a single remote lookup
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid profile body: {0}")]
    Body(#[from] io::Error),
}

impl From<ureq::Error> for LookupError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => LookupError::Status(code),
            other => LookupError::Transport(other.to_string()),
        }
    }
}

/// Resolves a UUID to a current display name. Implementations must be usable
/// from multiple worker threads at once.
pub trait NameLookup: Sync {
    fn lookup(&self, uuid: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct Profile {
    name: String,
}

/// Mojang profile API client
pub struct MojangClient {
    agent: ureq::Agent,
}

impl MojangClient {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(LOOKUP_TIMEOUT)
                .user_agent(USER_AGENT)
                .build(),
        }
    }
}

impl Default for MojangClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NameLookup for MojangClient {
    fn lookup(&self, uuid: &str) -> Result<String, LookupError> {
        let response = self.agent.get(&format!("{}{}", API_URL, uuid)).call()?;
        let profile: Profile = response.into_json()?;
        Ok(profile.name)
    }
}

/// Lookup-result cache shared by the worker pool. One mutex guards both the
/// read-check and the write-insert; failed lookups are cached as `None` so a
/// UUID is fetched at most once per run.
#[derive(Debug, Default)]
pub struct UsernameCache {
    inner: Mutex<HashMap<String, Option<String>>>,
}

impl UsernameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uuid: &str) -> Option<Option<String>> {
        self.inner.lock().expect("cache lock").get(uuid).cloned()
    }

    pub fn insert(&self, uuid: &str, name: Option<String>) {
        self.inner
            .lock()
            .expect("cache lock")
            .insert(uuid.to_string(), name);
    }
}

/// Resolve one UUID through the cache. A lookup failure is logged and cached
/// as unresolved.
pub fn resolve(cache: &UsernameCache, client: &dyn NameLookup, uuid: &str) -> Option<String> {
    if let Some(cached) = cache.get(uuid) {
        return cached;
    }

    match client.lookup(uuid) {
        Ok(name) => {
            cache.insert(uuid, Some(name.clone()));
            Some(name)
        }
        Err(e) => {
            eprintln!("Error {} for {}", e, uuid);
            cache.insert(uuid, None);
            None
        }
    }
}

/// Whether a change created a name or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Updated,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Created => write!(f, "Created"),
            ChangeAction::Updated => write!(f, "Updated"),
        }
    }
}

/// One applied display-name change
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub uuid: String,
    pub display_name: String,
    pub action: ChangeAction,
}

/// Resolve every contributor's name on the worker pool and patch the list in
/// memory. Returns the applied changes; unresolved UUIDs are reported and
/// left untouched.
pub fn refresh_contributors(
    list: &mut ContributorList,
    client: &dyn NameLookup,
) -> Vec<ChangeRecord> {
    let cache = UsernameCache::new();
    let queue: Mutex<Vec<String>> = Mutex::new(list.contributors.keys().cloned().collect());
    let (tx, rx) = mpsc::channel::<(String, Option<String>)>();

    let mut resolved = Vec::new();
    thread::scope(|s| {
        let workers = MAX_WORKERS.min(list.contributors.len());
        for _ in 0..workers {
            let tx = tx.clone();
            let cache = &cache;
            let queue = &queue;
            s.spawn(move || loop {
                let next = queue.lock().expect("queue lock").pop();
                let Some(uuid) = next else { break };
                let name = resolve(cache, client, &uuid);
                if tx.send((uuid, name)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        // Completion order, not submission order.
        for result in rx.iter() {
            resolved.push(result);
        }
    });

    let mut changes = Vec::new();
    for (uuid, name) in resolved {
        let Some(contributor) = list.contributors.get_mut(&uuid) else {
            continue;
        };
        match name {
            Some(name) if contributor.display_name.as_deref() != Some(name.as_str()) => {
                let action = if contributor.display_name.is_none() {
                    ChangeAction::Created
                } else {
                    ChangeAction::Updated
                };
                contributor.display_name = Some(name.clone());
                println!("{}: {} -> {}", action, uuid, name);
                changes.push(ChangeRecord {
                    uuid,
                    display_name: name,
                    action,
                });
            }
            Some(_) => {}
            None => println!("Failed to fetch username for UUID: {}", uuid),
        }
    }
    changes
}

/// Run a full contributor refresh against the file at `path`. The file is
/// rewritten only if at least one display name changed.
pub fn run_contributor_update(
    path: &Path,
    client: &dyn NameLookup,
) -> Result<Vec<ChangeRecord>, ContributorError> {
    let mut list = ContributorList::from_file(path)?;
    let changes = refresh_contributors(&mut list, client);

    if !changes.is_empty() {
        list.write_to_file(path)?;
    }
    Ok(changes)
}
