//! # Slot Stores
//!
//! The durable key/value substrate behind cart persistence.
//!
//! ## Why Write-Behind?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SqliteSlotStore                                      │
//! │                                                                         │
//! │  CartStore::add_item (sync, under the cart lock)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  set(key, json) ──► cache.insert ──► cmd_tx.send(Set)  ◄── returns now  │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                      ┌─────────────────────────────────────┐            │
//! │                      │  slot writer task (tokio::spawn)    │            │
//! │                      │  • one task, so writes stay ordered │            │
//! │                      │  • queued sets for the same key     │            │
//! │                      │    collapse to the newest value     │            │
//! │                      │  • failures: warn! and continue     │            │
//! │                      └──────────────────┬──────────────────┘            │
//! │                                         ▼                               │
//! │                               cart_slots (SQLite)                       │
//! │                                                                         │
//! │  get(key) reads the cache, which was filled from SQLite on open.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations are synchronous, so the store must accept a write without
//! awaiting the database. `flush().await` is the barrier for shutdown and
//! tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use storefront_db::{Database, SlotRepository};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};

// =============================================================================
// Slot Store Trait
// =============================================================================

/// A durable string key/value slot, synchronous from the caller's view.
pub trait SlotStore: Send + Sync + fmt::Debug {
    /// Reads a slot. `Ok(None)` when it was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a slot, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

// =============================================================================
// Memory Slot Store
// =============================================================================

/// In-process slots. Used for `storage.backend = "memory"` and in tests.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `set` fail, as a full or read-only medium would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Puts a raw value in a slot, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// SQLite Slot Store
// =============================================================================

/// Commands for the slot writer task.
#[derive(Debug)]
enum WriterCommand {
    Set { key: String, value: String },
    /// Reply once everything queued before it is written.
    Flush(oneshot::Sender<()>),
    /// Write what is queued, then stop.
    Shutdown(oneshot::Sender<()>),
}

/// Write-behind slots over `storefront-db`.
///
/// Must be opened inside a tokio runtime; the writer task is spawned there.
pub struct SqliteSlotStore {
    repo: SlotRepository,
    cache: Mutex<HashMap<String, String>>,
    cmd_tx: mpsc::UnboundedSender<WriterCommand>,
}

impl fmt::Debug for SqliteSlotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSlotStore")
            .field("writer_running", &!self.cmd_tx.is_closed())
            .finish()
    }
}

impl SqliteSlotStore {
    /// Loads every slot into memory and starts the writer task.
    pub async fn open(db: &Database) -> StorageResult<Self> {
        let repo = db.slots();

        let cache: HashMap<String, String> = repo
            .all()
            .await?
            .into_iter()
            .map(|slot| (slot.key, slot.value))
            .collect();

        info!(slots = cache.len(), "Slot cache loaded");

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(repo.clone(), cmd_rx));

        Ok(SqliteSlotStore {
            repo,
            cache: Mutex::new(cache),
            cmd_tx,
        })
    }

    /// Waits until every write queued so far has reached the database.
    pub async fn flush(&self) -> StorageResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(WriterCommand::Flush(done_tx))
            .map_err(|_| StorageError::WriterClosed)?;
        done_rx.await.map_err(|_| StorageError::WriterClosed)
    }

    /// Flushes and stops the writer. Later `set` calls fail with `WriterClosed`.
    pub async fn shutdown(&self) -> StorageResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(WriterCommand::Shutdown(done_tx))
            .map_err(|_| StorageError::WriterClosed)?;
        done_rx.await.map_err(|_| StorageError::WriterClosed)
    }

    /// Re-reads one slot from the database into the cache.
    ///
    /// Our own queued writes are flushed first so they are not shadowed by an
    /// older row. Picks up what another process wrote since `open`.
    pub async fn refresh(&self, key: &str) -> StorageResult<()> {
        self.flush().await?;
        let value = self.repo.get(key).await?;
        debug!(key = %key, found = value.is_some(), "Slot refreshed from database");

        let mut cache = self.lock();
        match value {
            Some(value) => cache.insert(key.to_string(), value),
            None => cache.remove(key),
        };
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStore for SqliteSlotStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.cmd_tx
            .send(WriterCommand::Set {
                key: key.to_string(),
                value: value.to_string(),
            })
            .map_err(|_| StorageError::WriterClosed)?;

        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Writer loop: drains the queue, keeps the newest value per key, writes.
async fn run_writer(repo: SlotRepository, mut cmd_rx: mpsc::UnboundedReceiver<WriterCommand>) {
    debug!("Slot writer started");

    while let Some(cmd) = cmd_rx.recv().await {
        let mut pending: Vec<(String, String)> = Vec::new();
        let mut next = Some(cmd);

        while let Some(cmd) = next.take() {
            match cmd {
                WriterCommand::Set { key, value } => {
                    match pending.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => pending.push((key, value)),
                    }
                    next = cmd_rx.try_recv().ok();
                }
                WriterCommand::Flush(done) => {
                    write_pending(&repo, &mut pending).await;
                    let _ = done.send(());
                    next = cmd_rx.try_recv().ok();
                }
                WriterCommand::Shutdown(done) => {
                    write_pending(&repo, &mut pending).await;
                    cmd_rx.close();
                    let _ = done.send(());
                    info!("Slot writer stopped");
                    return;
                }
            }
        }

        write_pending(&repo, &mut pending).await;
    }

    debug!("Slot writer stopped: all handles dropped");
}

async fn write_pending(repo: &SlotRepository, pending: &mut Vec<(String, String)>) {
    for (key, value) in pending.drain(..) {
        if let Err(e) = repo.set(&key, &value).await {
            warn!(key = %key, error = %e, "Slot write failed; value kept in memory only");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
