use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Default upper bound on a single request/response exchange with an actor.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Secondary key that must stay unique across the whole collection.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Construct the full Entity from the ID and creation params
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures of the store itself, wrapping the entity's own error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Duplicate key: {0}")]
    Conflict(String),
    #[error("{0}")]
    Entity(E),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, R> = oneshot::Sender<Result<R, FrameworkError<<T as Entity>::Error>>>;

/// Predicate evaluated inside the actor against a consistent snapshot.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T, Option<T>>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<T, Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, ()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T, T::ActionResult>,
    },
    /// Applies every action or none of them.
    Transaction {
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<T, Vec<T::ActionResult>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    unique_index: HashMap<String, T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

type ActorResult<T, R> = Result<R, FrameworkError<<T as Entity>::Error>>;

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            unique_index: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self.store.values().filter(|item| filter(item)).cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
                ResourceRequest::Transaction { actions, respond_to } => {
                    let _ = respond_to.send(self.handle_transaction(actions));
                }
            }
        }
    }

    fn handle_create(&mut self, params: T::CreateParams) -> ActorResult<T, T::Id> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        self.reindex(&id, None, item.unique_key())?;
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> ActorResult<T, T> {
        let mut updated = self.load(&id)?;
        let old_key = updated.unique_key();
        updated.on_update(patch).map_err(FrameworkError::Entity)?;
        self.reindex(&id, old_key, updated.unique_key())?;
        self.store.insert(id, updated.clone());
        Ok(updated)
    }

    fn handle_delete(&mut self, id: T::Id) -> ActorResult<T, ()> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete().map_err(FrameworkError::Entity)?;
        if let Some(key) = item.unique_key() {
            self.unique_index.remove(&key);
        }
        self.store.remove(&id);
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> ActorResult<T, T::ActionResult> {
        let mut item = self.load(&id)?;
        let old_key = item.unique_key();
        let result = item.handle_action(action).map_err(FrameworkError::Entity)?;
        self.reindex(&id, old_key, item.unique_key())?;
        self.store.insert(id, item);
        Ok(result)
    }

    /// Runs all actions against staged copies and commits only if every one succeeds.
    /// Several actions on the same id see each other's effects.
    fn handle_transaction(
        &mut self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> ActorResult<T, Vec<T::ActionResult>> {
        let mut staged: HashMap<T::Id, T> = HashMap::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            let item = match staged.entry(id) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    let current = self
                        .store
                        .get(slot.key())
                        .cloned()
                        .ok_or_else(|| FrameworkError::NotFound(slot.key().to_string()))?;
                    slot.insert(current)
                }
            };
            results.push(item.handle_action(action).map_err(FrameworkError::Entity)?);
        }

        for (id, item) in &staged {
            if let Some(key) = item.unique_key() {
                if self.unique_index.get(&key).is_some_and(|owner| owner != id) {
                    return Err(FrameworkError::Conflict(key));
                }
            }
        }

        for (id, item) in staged {
            let old_key = self.store.get(&id).and_then(T::unique_key);
            self.reindex(&id, old_key, item.unique_key())?;
            self.store.insert(id, item);
        }

        Ok(results)
    }

    fn load(&self, id: &T::Id) -> ActorResult<T, T> {
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn reindex(&mut self, id: &T::Id, old: Option<String>, new: Option<String>) -> ActorResult<T, ()> {
        if old == new {
            return Ok(());
        }
        if let Some(key) = &new {
            if self.unique_index.get(key).is_some_and(|owner| owner != id) {
                return Err(FrameworkError::Conflict(key.clone()));
            }
        }
        if let Some(key) = old {
            self.unique_index.remove(&key);
        }
        if let Some(key) = new {
            self.unique_index.insert(key, id.clone());
        }
        Ok(())
    }
}

/// ID generator producing `prefix_1`, `prefix_2`, ...
pub fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    timeout: Duration,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            timeout: self.timeout,
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self {
            sender,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn request<R: Send>(
        &self,
        make: impl FnOnce(Response<T, R>) -> ResourceRequest<T>,
    ) -> ActorResult<T, R> {
        let (respond_to, response) = oneshot::channel();
        let request = make(respond_to);
        let exchange = async move {
            if self.sender.send(request).await.is_err() {
                return Err(FrameworkError::ActorClosed);
            }
            response.await.unwrap_or(Err(FrameworkError::ActorDropped))
        };
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(FrameworkError::Timeout(self.timeout)),
        }
    }

    pub async fn create(&self, params: T::CreateParams) -> ActorResult<T, T::Id> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> ActorResult<T, Option<T>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> ActorResult<T, Vec<T>> {
        let filter: Filter<T> = Box::new(filter);
        self.request(|respond_to| ResourceRequest::List { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> ActorResult<T, T> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> ActorResult<T, ()> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> ActorResult<T, T::ActionResult> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    pub async fn transaction(&self, actions: Vec<(T::Id, T::Action)>) -> ActorResult<T, Vec<T::ActionResult>> {
        self.request(|respond_to| ResourceRequest::Transaction { actions, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
