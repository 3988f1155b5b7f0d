//! Observable in-memory collection of one entity type.
//!
//! [`EntityListStore`] is the single source of truth for a collection
//! within a view's lifetime. Its state lives in a `tokio::sync::watch`
//! channel: consumers hold read-only receivers or cloned snapshots and all
//! mutation goes through the store's methods. Every method runs to
//! completion under the channel lock, so no reader ever observes a
//! half-applied change.
//!
//! Records enter the store as wire records and are normalized on the way
//! in. Entries are kept behind `Arc` so entries that a mutation does not
//! touch keep their identity across snapshots.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use caviar_core::normalize::{ListEntity, NormalizeDefaults};
use caviar_core::types::{EntityId, Timestamp};
use chrono::Utc;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Activity flags tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Loading,
    Saving,
    Deleting,
}

impl Flag {
    fn index(self) -> usize {
        match self {
            Flag::Loading => 0,
            Flag::Saving => 1,
            Flag::Deleting => 2,
        }
    }
}

/// A consistent view of the collection and its flags.
#[derive(Debug, Clone)]
pub struct StoreState<T> {
    items: Vec<Arc<T>>,
    flags: [bool; 3],
    in_flight: [u32; 3],
    /// Raised through the plain setters; independent of guard counts.
    pinned: [bool; 3],
    error: Option<String>,
    last_updated: Timestamp,
}

impl<T> StoreState<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            flags: [false; 3],
            in_flight: [0; 3],
            pinned: [false; 3],
            error: None,
            last_updated: Utc::now(),
        }
    }

    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    pub fn loading(&self) -> bool {
        self.flags[Flag::Loading.index()]
    }

    pub fn saving(&self) -> bool {
        self.flags[Flag::Saving.index()]
    }

    pub fn deleting(&self) -> bool {
        self.flags[Flag::Deleting.index()]
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.flags[flag.index()]
    }

    /// Whether any operation is in progress.
    pub fn busy(&self) -> bool {
        self.flags.iter().any(|f| *f)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    fn refresh_flag(&mut self, i: usize) {
        self.flags[i] = self.pinned[i] || self.in_flight[i] > 0;
    }
}

// ---------------------------------------------------------------------------
// Write ordering
// ---------------------------------------------------------------------------

/// How responses to overlapping writes on the same id are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Apply a response only if it was requested after the last applied
    /// one for the same id; older responses arriving late are dropped.
    #[default]
    DiscardStale,
    /// Apply every response in completion order.
    LastWriterWins,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard_stale" => Ok(Self::DiscardStale),
            "last_writer_wins" => Ok(Self::LastWriterWins),
            other => Err(format!(
                "Unknown write policy '{other}'. Must be one of: discard_stale, last_writer_wins"
            )),
        }
    }
}

/// Sequence number handed out when a remote write on an id is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTicket {
    id: EntityId,
    seq: u64,
}

impl WriteTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct EntityListStore<T: ListEntity> {
    state: watch::Sender<StoreState<T>>,
    defaults: NormalizeDefaults,
    policy: WritePolicy,
    next_seq: AtomicU64,
    applied: Mutex<HashMap<EntityId, u64>>,
}

impl<T: ListEntity> EntityListStore<T> {
    pub fn new(defaults: NormalizeDefaults, policy: WritePolicy) -> Self {
        let (state, _) = watch::channel(StoreState::empty());
        Self {
            state,
            defaults,
            policy,
            next_seq: AtomicU64::new(0),
            applied: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    // ---- reads ----

    /// Receive every state change. Receivers only ever get shared borrows.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<T>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState<T> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<Arc<T>> {
        self.state.borrow().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.state.borrow().flag(flag)
    }

    // ---- collection mutations ----

    /// Replace the whole collection. Later duplicates of an id replace
    /// earlier ones in place.
    pub fn set_all(&self, records: Vec<T::Record>) {
        let defaults = self.defaults.at_now();
        let mut items: Vec<Arc<T>> = Vec::with_capacity(records.len());
        for record in records {
            let item = T::normalize(record, &defaults);
            match items.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => *existing = Arc::new(item),
                None => items.push(Arc::new(item)),
            }
        }

        self.state.send_modify(|s| {
            s.items = items;
            s.error = None;
            s.touch();
        });
        tracing::debug!(entity = T::ENTITY, count = self.len(), "Collection replaced");
    }

    /// Append a record the backend has just created.
    ///
    /// If the id is already present the existing entry is replaced in place.
    pub fn add(&self, record: T::Record) -> Arc<T> {
        let item = Arc::new(T::normalize(record, &self.defaults.at_now()));
        let mut committed = Arc::clone(&item);

        self.state.send_modify(|s| {
            match s.items.iter_mut().find(|e| e.id() == item.id()) {
                Some(existing) => {
                    let merged = Arc::new(existing.reconcile(T::clone(&item)));
                    *existing = Arc::clone(&merged);
                    committed = merged;
                }
                None => s.items.push(Arc::clone(&item)),
            }
            s.error = None;
            s.touch();
        });

        committed
    }

    /// Replace the entry with the record's id, keeping its position.
    ///
    /// Returns `None` and leaves the state untouched when the id is absent.
    pub fn update(&self, record: T::Record) -> Option<Arc<T>> {
        let id = T::record_id(&record).to_string();
        if !self.contains(&id) {
            tracing::debug!(entity = T::ENTITY, %id, "Update for absent id ignored");
            return None;
        }

        let incoming = T::normalize(record, &self.defaults.at_now());
        let mut updated = None;

        self.state.send_if_modified(|s| {
            let Some(existing) = s.items.iter_mut().find(|e| e.id() == id) else {
                return false;
            };
            let merged = Arc::new(existing.reconcile(incoming));
            *existing = Arc::clone(&merged);
            updated = Some(merged);
            s.error = None;
            s.touch();
            true
        });

        updated
    }

    /// Remove the entry with `id`. Removing an absent id is a no-op.
    pub fn remove(&self, id: &str) -> bool {
        self.applied_writes().remove(id);

        self.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|item| item.id() != id);
            let removed = s.items.len() != before;
            if removed {
                s.touch();
            }
            removed
        })
    }

    /// Apply a client-side change to one entry (e.g. a resolved URL).
    pub fn modify(&self, id: &str, change: impl FnOnce(&mut T)) -> Option<Arc<T>> {
        let mut modified = None;

        self.state.send_if_modified(|s| {
            let Some(existing) = s.items.iter_mut().find(|e| e.id() == id) else {
                return false;
            };
            let mut item = T::clone(&**existing);
            change(&mut item);
            let item = Arc::new(item);
            *existing = Arc::clone(&item);
            modified = Some(item);
            s.touch();
            true
        });

        modified
    }

    fn contains(&self, id: &str) -> bool {
        self.state.borrow().items.iter().any(|item| item.id() == id)
    }

    // ---- ordered remote writes ----

    /// Issue a ticket before sending a remote write for `id`.
    pub fn begin_write(&self, id: &str) -> WriteTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        WriteTicket {
            id: id.to_string(),
            seq,
        }
    }

    /// Apply the response to a ticketed write.
    ///
    /// Under [`WritePolicy::DiscardStale`] the response is dropped when a
    /// write issued later for the same id has already been applied.
    ///
    /// The sequence is only remembered when the entry is still present, so
    /// responses for removed ids leave nothing behind.
    pub fn commit_update(&self, ticket: WriteTicket, record: T::Record) -> Option<Arc<T>> {
        let mut applied = self.applied_writes();
        let last = applied.get(&ticket.id).copied().unwrap_or(0);
        if self.policy == WritePolicy::DiscardStale && ticket.seq < last {
            tracing::debug!(
                entity = T::ENTITY,
                id = %ticket.id,
                seq = ticket.seq,
                last_applied = last,
                "Discarding stale response"
            );
            return None;
        }

        let committed = self.update(record);
        if committed.is_some() {
            applied.insert(ticket.id, ticket.seq.max(last));
        }
        committed
    }

    fn applied_writes(&self) -> std::sync::MutexGuard<'_, HashMap<EntityId, u64>> {
        self.applied.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- flags ----

    pub fn set_loading(&self, value: bool) {
        self.set_flag(Flag::Loading, value);
    }

    pub fn set_saving(&self, value: bool) {
        self.set_flag(Flag::Saving, value);
    }

    pub fn set_deleting(&self, value: bool) {
        self.set_flag(Flag::Deleting, value);
    }

    pub fn set_error(&self, message: Option<String>) {
        self.state.send_modify(|s| {
            s.error = message;
            s.touch();
        });
    }

    /// The plain setters pin a flag independently of guards: the flag stays
    /// raised while either the pin or any guard holds it.
    fn set_flag(&self, flag: Flag, value: bool) {
        let i = flag.index();
        self.state.send_modify(|s| {
            s.pinned[i] = value;
            s.refresh_flag(i);
            s.touch();
        });
    }

    /// Raise `flag` for the lifetime of the returned guard.
    ///
    /// Overlapping guards on the same flag are counted; the flag drops only
    /// when the last one is released, whether the operation succeeded,
    /// failed or was cancelled.
    pub fn begin(&self, flag: Flag) -> FlagGuard<'_, T> {
        self.state.send_modify(|s| {
            s.in_flight[flag.index()] += 1;
            s.refresh_flag(flag.index());
            s.touch();
        });
        FlagGuard { store: self, flag }
    }
}

impl<T: ListEntity> Default for EntityListStore<T> {
    fn default() -> Self {
        Self::new(NormalizeDefaults::default(), WritePolicy::default())
    }
}

/// Clears its flag on drop. See [`EntityListStore::begin`].
#[must_use = "the flag is cleared as soon as the guard is dropped"]
pub struct FlagGuard<'a, T: ListEntity> {
    store: &'a EntityListStore<T>,
    flag: Flag,
}

impl<T: ListEntity> Drop for FlagGuard<'_, T> {
    fn drop(&mut self) {
        let i = self.flag.index();
        self.store.state.send_modify(|s| {
            s.in_flight[i] = s.in_flight[i].saturating_sub(1);
            s.refresh_flag(i);
            s.touch();
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
