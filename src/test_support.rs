//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::freeze::{FreezeError, PageFuture, PageSource};
use crate::store::{
    ContentStore, PagesHost, PagesStatus, ProbeOutcome, RemoteTarget, RepositoryId,
    RepositorySpec, RepositoryStatus, RevisionMarker, StoreFuture, UpsertOutcome, UpsertRequest,
};

/// Transport failure injected by the in-memory doubles.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("simulated transport failure for {target}")]
pub struct SimulatedTransportError {
    /// Path or operation that was failed on purpose.
    pub target: String,
}

/// Single call observed by [`MemoryContentStore`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreCall {
    /// A probe of the given remote path.
    Probe(String),
    /// An upsert of the given remote path.
    Upsert {
        /// Remote path written.
        path: String,
        /// Commit message sent with the write.
        message: String,
        /// Revision the write claimed to replace.
        revision: Option<String>,
        /// Bytes sent.
        content: Vec<u8>,
    },
}

impl StoreCall {
    /// Remote path the call addressed.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Probe(path) | Self::Upsert { path, .. } => path,
        }
    }

    /// Returns `true` for upserts.
    #[must_use]
    pub const fn is_upsert(&self) -> bool {
        matches!(self, Self::Upsert { .. })
    }
}

#[derive(Debug, Default)]
struct StoreState {
    objects: BTreeMap<String, (Vec<u8>, RevisionMarker)>,
    next_revision: u64,
    calls: Vec<StoreCall>,
    probe_overrides: HashMap<String, ProbeOutcome>,
    upsert_overrides: HashMap<String, UpsertOutcome>,
    transport_failures: BTreeSet<String>,
}

impl StoreState {
    fn store(&mut self, path: &str, content: Vec<u8>) -> RevisionMarker {
        self.next_revision += 1;
        let revision = RevisionMarker::new(format!("rev-{}", self.next_revision));
        self.objects
            .insert(path.to_owned(), (content, revision.clone()));
        revision
    }
}

/// Path-addressed store kept in memory.
///
/// Writes follow the contents API rules: creating over an existing object
/// without its revision is rejected with 422 and replacing with a stale
/// revision is rejected with 409. Individual paths can be scripted to return
/// fixed outcomes or transport failures.
#[derive(Clone, Debug, Default)]
pub struct MemoryContentStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryContentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds an object at `path`.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.lock().store(path, content.into());
    }

    /// Makes every probe of `path` return `outcome`.
    pub fn script_probe(&self, path: &str, outcome: ProbeOutcome) {
        self.lock().probe_overrides.insert(path.to_owned(), outcome);
    }

    /// Makes every upsert of `path` return `outcome` without storing.
    pub fn script_upsert(&self, path: &str, outcome: UpsertOutcome) {
        self.lock().upsert_overrides.insert(path.to_owned(), outcome);
    }

    /// Makes every call addressing `path` fail at the transport level.
    pub fn fail_transport(&self, path: &str) {
        self.lock().transport_failures.insert(path.to_owned());
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Returns the stored content of `path`.
    #[must_use]
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(path)
            .map(|(content, _)| content.clone())
    }

    /// Returns every stored path in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    fn probe_now(&self, target: &RemoteTarget) -> Result<ProbeOutcome, SimulatedTransportError> {
        let mut state = self.lock();
        let path = target.remote_path.clone();
        state.calls.push(StoreCall::Probe(path.clone()));
        if state.transport_failures.contains(&path) {
            return Err(SimulatedTransportError { target: path });
        }
        if let Some(outcome) = state.probe_overrides.get(&path) {
            return Ok(outcome.clone());
        }
        Ok(state
            .objects
            .get(&path)
            .map_or(ProbeOutcome::Absent, |(_, revision)| ProbeOutcome::Present {
                revision: Some(revision.clone()),
            }))
    }

    fn upsert_now(
        &self,
        request: &UpsertRequest,
    ) -> Result<UpsertOutcome, SimulatedTransportError> {
        let mut state = self.lock();
        let path = request.target.remote_path.clone();
        state.calls.push(StoreCall::Upsert {
            path: path.clone(),
            message: request.message.clone(),
            revision: request.revision.as_ref().map(|r| r.as_str().to_owned()),
            content: request.content.clone(),
        });
        if state.transport_failures.contains(&path) {
            return Err(SimulatedTransportError { target: path });
        }
        if let Some(outcome) = state.upsert_overrides.get(&path) {
            return Ok(outcome.clone());
        }

        let existing = state.objects.get(&path).map(|(_, revision)| revision.clone());
        match (existing, request.revision.as_ref()) {
            (Some(_), None) => Ok(UpsertOutcome::Rejected {
                status: 422,
                body: String::from("\"sha\" wasn't supplied"),
            }),
            (stored, Some(claimed)) if stored.as_ref() != Some(claimed) => {
                Ok(UpsertOutcome::Rejected {
                    status: 409,
                    body: format!("{path} does not match {claimed}"),
                })
            }
            _ => {
                let revision = state.store(&path, request.content.clone());
                Ok(UpsertOutcome::Written {
                    revision: Some(revision),
                })
            }
        }
    }
}

impl ContentStore for MemoryContentStore {
    type Error = SimulatedTransportError;

    fn probe<'a>(
        &'a self,
        target: &'a RemoteTarget,
    ) -> StoreFuture<'a, ProbeOutcome, Self::Error> {
        let outcome = self.probe_now(target);
        Box::pin(async move { outcome })
    }

    fn upsert<'a>(
        &'a self,
        request: &'a UpsertRequest,
    ) -> StoreFuture<'a, UpsertOutcome, Self::Error> {
        let outcome = self.upsert_now(request);
        Box::pin(async move { outcome })
    }
}

/// Single call observed by [`ScriptedPagesHost`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostCall {
    /// Repository creation with the given parameters.
    CreateRepository(RepositorySpec),
    /// Pages enablement for a repository branch.
    EnablePages {
        /// Repository being published.
        repository: RepositoryId,
        /// Branch being published.
        branch: String,
    },
}

#[derive(Debug)]
struct HostState {
    repository: Result<RepositoryStatus, SimulatedTransportError>,
    pages: Result<PagesStatus, SimulatedTransportError>,
    calls: Vec<HostCall>,
}

/// Pages host returning fixed answers.
#[derive(Clone, Debug)]
pub struct ScriptedPagesHost {
    state: Arc<Mutex<HostState>>,
}

impl Default for ScriptedPagesHost {
    fn default() -> Self {
        Self::new(
            RepositoryStatus::Created { html_url: None },
            PagesStatus::Enabled,
        )
    }
}

impl ScriptedPagesHost {
    /// Creates a host answering every request with the given statuses.
    #[must_use]
    pub fn new(repository: RepositoryStatus, pages: PagesStatus) -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState {
                repository: Ok(repository),
                pages: Ok(pages),
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes repository creation fail at the transport level.
    pub fn fail_repository_transport(&self) {
        self.lock().repository = Err(SimulatedTransportError {
            target: String::from("create repository"),
        });
    }

    /// Makes Pages enablement fail at the transport level.
    pub fn fail_pages_transport(&self) {
        self.lock().pages = Err(SimulatedTransportError {
            target: String::from("enable pages"),
        });
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().calls.clone()
    }
}

impl PagesHost for ScriptedPagesHost {
    type Error = SimulatedTransportError;

    fn create_repository<'a>(
        &'a self,
        spec: &'a RepositorySpec,
    ) -> StoreFuture<'a, RepositoryStatus, Self::Error> {
        let outcome = {
            let mut state = self.lock();
            state.calls.push(HostCall::CreateRepository(spec.clone()));
            state.repository.clone()
        };
        Box::pin(async move { outcome })
    }

    fn enable_pages<'a>(
        &'a self,
        repository: &'a RepositoryId,
        branch: &'a str,
    ) -> StoreFuture<'a, PagesStatus, Self::Error> {
        let outcome = {
            let mut state = self.lock();
            state.calls.push(HostCall::EnablePages {
                repository: repository.clone(),
                branch: branch.to_owned(),
            });
            state.pages.clone()
        };
        Box::pin(async move { outcome })
    }
}

/// Page source serving canned bodies; unknown routes answer 404.
#[derive(Clone, Debug, Default)]
pub struct MemoryPageSource {
    pages: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MemoryPageSource {
    /// Creates a source with no pages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `route`.
    #[must_use]
    pub fn with_page(self, route: &str, body: &str) -> Self {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(route.to_owned(), body.as_bytes().to_vec());
        self
    }

    /// Returns every route fetched so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PageSource for MemoryPageSource {
    fn fetch<'a>(&'a self, route: &'a str) -> PageFuture<'a> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_owned());
        let body = self
            .pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route)
            .cloned()
            .ok_or_else(|| FreezeError::Fetch {
                route: route.to_owned(),
                status: 404,
            });
        Box::pin(async move { body })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: AsyncMutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        Self::apply(pairs, &[]).await
    }

    /// Sets `pairs` and removes `removed` while holding a global mutex.
    pub async fn apply(pairs: &[(&str, &str)], removed: &[&str]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs
                    .iter()
                    .map(|(key, _)| key)
                    .chain(removed)
                    .all(|key| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len() + removed.len());
        for (key, value) in pairs {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
        }
        for key in removed {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
