//! In-memory link store backed by an append-only JSON-lines journal.
//!
//! Every successful `store` appends one line to the journal before the record
//! becomes visible; opening the store replays the journal in full. There is no
//! compaction.
//!
//! Deletion flags are only flipped in memory. A restart brings deleted links
//! back as active because the journal never records deletions.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::entities::{CreateOutcome, Link};
use crate::domain::repositories::{LinkStore, StoreError};

/// Link store holding every record in memory.
///
/// Reads share the lock; `store`, `mark_deleted_batch` and `close` take it
/// exclusively, journal writes included.
pub struct MemoryLinkStore {
    state: RwLock<MemoryState>,
    path: Option<PathBuf>,
    closed: AtomicBool,
}

#[derive(Default)]
struct MemoryState {
    links: HashMap<String, Link>,
    /// `(owner_id, long_url)` → code
    by_owner_url: HashMap<(String, String), String>,
    journal: Option<File>,
}

impl MemoryState {
    fn insert(&mut self, link: Link) {
        self.by_owner_url
            .insert((link.owner_id.clone(), link.long_url.clone()), link.code.clone());
        self.links.insert(link.code.clone(), link);
    }
}

impl MemoryLinkStore {
    /// Creates a store without a journal. Nothing survives a restart.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            path: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Replays the journal at `path` and opens it for appending.
    ///
    /// A missing file is an empty store; parent directories are created.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CorruptJournal`] if a line is not a valid record
    /// - [`StoreError::Journal`] on I/O failures
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut state = MemoryState::default();

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let link: Link = serde_json::from_str(line).map_err(|source| {
                StoreError::CorruptJournal {
                    line: index + 1,
                    source,
                }
            })?;
            state.insert(link);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut journal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        // Terminate a last record left without its newline.
        if !contents.is_empty() && !contents.ends_with('\n') {
            journal.write_all(b"\n").await?;
            journal.flush().await?;
        }
        state.journal = Some(journal);

        info!(
            path = %path.display(),
            links = state.links.len(),
            "Journal replayed"
        );

        Ok(Self {
            state: RwLock::new(state),
            path: Some(path),
            closed: AtomicBool::new(false),
        })
    }

    /// Journal location, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Default for MemoryLinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn store(&self, link: Link) -> Result<(Link, CreateOutcome), StoreError> {
        let mut state = self.state.write().await;
        self.ensure_open()?;

        let key = (link.owner_id.clone(), link.long_url.clone());
        if let Some(existing) = state
            .by_owner_url
            .get(&key)
            .and_then(|code| state.links.get(code))
        {
            return Ok((existing.clone(), CreateOutcome::Conflict));
        }

        if state.links.contains_key(&link.code) {
            return Err(StoreError::CodeTaken { code: link.code });
        }

        if let Some(journal) = state.journal.as_mut() {
            let mut line = serde_json::to_vec(&link).map_err(StoreError::Encode)?;
            line.push(b'\n');
            journal.write_all(&line).await?;
            journal.flush().await?;
        }

        debug!(code = %link.code, owner_id = %link.owner_id, "Link stored");
        state.insert(link.clone());

        Ok((link, CreateOutcome::Created))
    }

    async fn find(&self, code: &str) -> Result<Option<Link>, StoreError> {
        let state = self.state.read().await;
        self.ensure_open()?;

        Ok(state.links.get(code).cloned())
    }

    async fn find_all_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, StoreError> {
        let state = self.state.read().await;
        self.ensure_open()?;

        Ok(state
            .links
            .values()
            .filter(|link| link.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn mark_deleted_batch(&self, owner_id: &str, codes: &[String]) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.ensure_open()?;

        for code in codes {
            if let Some(link) = state.links.get_mut(code)
                && link.is_owned_by(owner_id)
            {
                link.deleted = true;
            }
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(mut journal) = state.journal.take() {
            journal.flush().await?;
            journal.sync_all().await?;
        }

        info!(links = state.links.len(), "Memory link store closed");

        Ok(())
    }
}
