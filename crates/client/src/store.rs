//! Session-scoped authorization store.
//!
//! One `AuthorizationStore` exists per logged-in session. It is created at
//! login, handed to consumers by reference (`Arc`), and dropped at logout.
//! All mutation goes through [`initialize`](AuthorizationStore::initialize),
//! [`set_authorization`](AuthorizationStore::set_authorization) and
//! [`clear`](AuthorizationStore::clear).
//!
//! - Reads are synchronous snapshots and never wait on I/O
//! - Concurrent `initialize` calls share one persistence read
//! - Persistence faults degrade to "absent" (deny), never to an error, and
//!   the next `initialize` retries the read

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use orderdesk_auth::{
    AuthzFault, Module, ModuleRegistry, PermissionCode, RawPermissionInput, ResolvedAuthorization,
    ScreenId, parse, presence, resolve,
};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::persistence::{PersistenceError, SecureStore};
use crate::state::{AuthorizationState, Phase};

pub struct AuthorizationStore {
    session_id: Uuid,
    config: ClientConfig,
    registry: &'static ModuleRegistry,
    persistence: Arc<dyn SecureStore>,
    state: watch::Sender<AuthorizationState>,
    /// Bumped by every `set_authorization`/`clear`; lets in-flight work detect
    /// that a newer write has completed.
    generation: Arc<AtomicU64>,
    init_lock: Mutex<()>,
    /// Count of loads whose result was applied; callers that waited on
    /// `init_lock` while one completed take its result instead of re-reading.
    completed_loads: AtomicU64,
    /// Set while the Ready state stems from a failed persistence read.
    read_faulted: AtomicBool,
    /// Serializes persistence writes so the stored value tracks the newest one.
    write_lock: Arc<Mutex<()>>,
}

impl AuthorizationStore {
    pub fn new(config: ClientConfig, persistence: Arc<dyn SecureStore>) -> Self {
        Self::with_registry(config, persistence, ModuleRegistry::standard())
    }

    pub fn with_registry(
        config: ClientConfig,
        persistence: Arc<dyn SecureStore>,
        registry: &'static ModuleRegistry,
    ) -> Self {
        let (state, _) = watch::channel(AuthorizationState::uninitialized());
        Self {
            session_id: Uuid::now_v7(),
            config,
            registry,
            persistence,
            state,
            generation: Arc::new(AtomicU64::new(0)),
            init_lock: Mutex::new(()),
            completed_loads: AtomicU64::new(0),
            read_faulted: AtomicBool::new(false),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Load the persisted permission value and resolve it.
    ///
    /// Returns the resulting snapshot. Callers arriving while a load is in
    /// flight wait for it and receive the same result; once Ready, this is a
    /// cheap no-op until the next `clear`.
    ///
    /// A failed read yields Ready with no authorization (deny-all) and is
    /// retried by the next call; the state stays Ready during the retry.
    ///
    /// If `set_authorization` or `clear` lands while the read is in flight,
    /// the loaded value is dropped and the current snapshot is returned. After
    /// a `clear` that is the `Uninitialized` state, which guards render as
    /// Pending until `initialize` is called again.
    pub async fn initialize(&self) -> AuthorizationState {
        let loads_seen = self.completed_loads.load(Ordering::SeqCst);
        let current = self.snapshot();
        if current.is_ready() && !self.read_faulted.load(Ordering::SeqCst) {
            return current;
        }

        let _init = self.init_lock.lock().await;
        let current = self.snapshot();
        if current.is_ready()
            && (!self.read_faulted.load(Ordering::SeqCst)
                || self.completed_loads.load(Ordering::SeqCst) != loads_seen)
        {
            return current;
        }

        let started_at = self.generation.load(Ordering::SeqCst);
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != started_at || state.is_ready() {
                return false;
            }
            *state = AuthorizationState::loading();
            true
        });
        if current.is_ready() {
            tracing::info!(session_id = %self.session_id, "retrying authorization load after a persistence fault");
        } else {
            tracing::info!(session_id = %self.session_id, "loading authorization");
        }

        let persisted = self.read_persisted().await;
        let faulted = persisted.is_none();
        let resolved = self.derive(&persisted.unwrap_or_default());

        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != started_at {
                return false;
            }
            *state = AuthorizationState::ready(resolved);
            self.read_faulted.store(faulted, Ordering::SeqCst);
            self.completed_loads.fetch_add(1, Ordering::SeqCst);
            true
        });

        if applied {
            let snapshot = self.snapshot();
            tracing::info!(
                session_id = %self.session_id,
                present = snapshot.resolved.is_some(),
                faulted,
                screens = snapshot.allowed_screens().len(),
                "authorization ready"
            );
            snapshot
        } else {
            tracing::debug!(session_id = %self.session_id, "initial load superseded by a newer write");
            self.snapshot()
        }
    }

    /// Replace the session's authorization with a freshly issued code set.
    ///
    /// The in-memory state is updated before this returns; the raw value is
    /// then persisted on a background task. A failed write is logged and does
    /// not roll back the in-memory state. Returns `None` when called outside a
    /// Tokio runtime (nothing is persisted in that case).
    pub fn set_authorization(&self, raw: RawPermissionInput) -> Option<JoinHandle<()>> {
        let resolved = self.derive(&raw);
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = AuthorizationState::ready(resolved);
            self.read_faulted.store(false, Ordering::SeqCst);
        });
        tracing::info!(
            session_id = %self.session_id,
            generation,
            modules = self.snapshot().allowed_modules().len(),
            "authorization replaced"
        );

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(session_id = %self.session_id, error = %err, "no runtime; permissions not persisted");
                return None;
            }
        };

        let persistence = Arc::clone(&self.persistence);
        let write_lock = Arc::clone(&self.write_lock);
        let latest = Arc::clone(&self.generation);
        let key = self.config.permission_key.clone();
        let timeout = self.config.persistence_timeout();
        let session_id = self.session_id;

        Some(runtime.spawn(async move {
            let _write = write_lock.lock().await;
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(%session_id, generation, "skipping superseded permission write");
                return;
            }

            let result = match raw.to_persisted() {
                Some(value) => bounded(timeout, persistence.set(&key, &value)).await,
                None => bounded(timeout, persistence.remove(&key)).await,
            };

            if let Err(err) = result {
                let fault = AuthzFault::persistence(err.to_string());
                tracing::warn!(%session_id, fault = fault.kind(), error = %err, "failed to persist permissions");
            }
        }))
    }

    /// Forget the session's authorization (logout).
    pub async fn clear(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = AuthorizationState::uninitialized();
            self.read_faulted.store(false, Ordering::SeqCst);
        });
        tracing::info!(session_id = %self.session_id, "authorization cleared");

        let _write = self.write_lock.lock().await;
        let key = &self.config.permission_key;
        if let Err(err) = bounded(self.config.persistence_timeout(), self.persistence.remove(key)).await {
            let fault = AuthzFault::persistence(err.to_string());
            tracing::warn!(session_id = %self.session_id, fault = fault.kind(), error = %err, "failed to remove persisted permissions");
        }
    }

    pub fn snapshot(&self) -> AuthorizationState {
        self.state.borrow().clone()
    }

    /// Observe state changes (e.g. to re-render guards).
    pub fn subscribe(&self) -> watch::Receiver<AuthorizationState> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn is_screen_allowed(&self, screen: &ScreenId) -> bool {
        self.state.borrow().is_screen_allowed(screen)
    }

    pub fn allowed_screens(&self) -> Vec<ScreenId> {
        self.state.borrow().allowed_screens().to_vec()
    }

    pub fn allowed_modules(&self) -> Vec<Module> {
        self.state.borrow().allowed_modules().to_vec()
    }

    pub fn has_module_access(&self, code: PermissionCode) -> bool {
        self.state.borrow().has_module_access(code)
    }

    fn derive(&self, raw: &RawPermissionInput) -> Option<ResolvedAuthorization> {
        let codes = parse(raw, self.config.code_range);
        resolve(&codes, presence(raw), &self.config.fallback_screen, self.registry)
    }

    /// `None` when the read failed or timed out.
    async fn read_persisted(&self) -> Option<RawPermissionInput> {
        let key = &self.config.permission_key;
        match bounded(self.config.persistence_timeout(), self.persistence.get(key)).await {
            Ok(value) => Some(RawPermissionInput::from(value)),
            Err(err) => {
                let fault = AuthzFault::persistence(err.to_string());
                tracing::warn!(
                    session_id = %self.session_id,
                    fault = fault.kind(),
                    error = %err,
                    "failed to read persisted permissions; treating as absent"
                );
                None
            }
        }
    }
}

impl core::fmt::Debug for AuthorizationStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorizationStore")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase().as_str())
            .finish_non_exhaustive()
    }
}

async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, PersistenceError>
where
    F: Future<Output = Result<T, PersistenceError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(PersistenceError::Timeout(timeout.as_millis() as u64)),
    }
}
