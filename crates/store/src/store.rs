//! The beverage store: catalog seeding, selection tracking, order
//! submission, and live order reconciliation.
//!
//! One [`BeverageStore`] instance owns the local view of the catalogs, the
//! in-progress selection, and the signed-in user's saved orders, and keeps
//! that view synchronized with the remote document store. All state lives
//! behind one lock that is never held across an await; mutation happens
//! only in the submit path and the snapshot handler, and the latest
//! snapshot always wins wholesale (replace, never merge).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use copper_kettle_core::{
    CatalogKind, CatalogOption, Identity, OptionId, Order, OrderId, Temperature, UserId,
};

use crate::catalog;
use crate::config::{ConfigError, StoreConfig};
use crate::error::SubmitError;
use crate::remote::{Document, DocumentStore, RemoteError, Snapshot};

/// The in-progress beverage choice, as read by the presentation layer.
///
/// A transient projection buffer: it exists for one editing session, is
/// never persisted, and copies option values rather than aliasing catalog
/// or order records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub name: String,
    pub temperature: Temperature,
    pub base: Option<CatalogOption>,
    pub syrup: Option<CatalogOption>,
    pub creamer: Option<CatalogOption>,
}

impl Selection {
    /// Whether every field required for an order is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && self.base.is_some()
            && self.syrup.is_some()
            && self.creamer.is_some()
    }
}

/// Client-side state manager for catalogs, the current selection, and the
/// signed-in user's saved orders.
///
/// Cheaply cloneable; clones share the same state. Collaborators (the
/// remote document store, the identity feed) are injected, so independent
/// instances can run side by side in tests.
#[derive(Clone)]
pub struct BeverageStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    remote: Arc<dyn DocumentStore>,
    config: StoreConfig,
    state: RwLock<StoreState>,
    subscription: Mutex<Option<ActiveSubscription>>,
}

/// Exactly one of these exists while the store is bound to an identity.
struct ActiveSubscription {
    handle: crate::remote::SubscriptionHandle,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct StoreState {
    bases: Vec<CatalogOption>,
    current_base: Option<CatalogOption>,
    syrups: Vec<CatalogOption>,
    current_syrup: Option<CatalogOption>,
    creamers: Vec<CatalogOption>,
    current_creamer: Option<CatalogOption>,
    current_temperature: Temperature,
    current_name: String,
    orders: Vec<Order>,
    current_order: Option<Order>,
    identity: Option<Identity>,
}

fn lock_subscription(
    mutex: &Mutex<Option<ActiveSubscription>>,
) -> MutexGuard<'_, Option<ActiveSubscription>> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StoreState {
    fn catalog(&self, kind: CatalogKind) -> &Vec<CatalogOption> {
        match kind {
            CatalogKind::Base => &self.bases,
            CatalogKind::Syrup => &self.syrups,
            CatalogKind::Creamer => &self.creamers,
        }
    }

    fn set_catalog(&mut self, kind: CatalogKind, options: Vec<CatalogOption>) {
        let first = options.first().cloned();
        match kind {
            CatalogKind::Base => {
                self.bases = options;
                self.current_base = first;
            }
            CatalogKind::Syrup => {
                self.syrups = options;
                self.current_syrup = first;
            }
            CatalogKind::Creamer => {
                self.creamers = options;
                self.current_creamer = first;
            }
        }
    }

    fn current_option(&self, kind: CatalogKind) -> &Option<CatalogOption> {
        match kind {
            CatalogKind::Base => &self.current_base,
            CatalogKind::Syrup => &self.current_syrup,
            CatalogKind::Creamer => &self.current_creamer,
        }
    }

    fn selection(&self) -> Selection {
        Selection {
            name: self.current_name.clone(),
            temperature: self.current_temperature,
            base: self.current_base.clone(),
            syrup: self.current_syrup.clone(),
            creamer: self.current_creamer.clone(),
        }
    }

    /// Copy the current order's fields into the selection, by value.
    ///
    /// No-op when there is no current order. The order is trusted as-is;
    /// it passed validation when it was created.
    fn project_current_order(&mut self) {
        let Some(order) = self.current_order.clone() else {
            return;
        };
        self.current_name = order.name;
        self.current_temperature = order.temperature;
        self.current_base = Some(order.base);
        self.current_syrup = Some(order.syrup);
        self.current_creamer = Some(order.creamer);
    }
}

impl StoreInner {
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild local orders from a full snapshot and re-resolve the
    /// current-order pointer.
    ///
    /// `owner` is the identity the subscription was opened for; a snapshot
    /// that outlives its binding (delivered after a sign-out or re-bind)
    /// is dropped rather than applied to the successor's state.
    fn apply_snapshot(&self, owner: &UserId, docs: Snapshot) {
        let mut orders = Vec::with_capacity(docs.len());
        for doc in &docs {
            match parse_order(doc, &self.config.owner_field) {
                Ok(order) => orders.push(order),
                Err(err) => {
                    warn!(document = %doc.id, error = %err, "skipping malformed order document");
                }
            }
        }
        debug!(count = orders.len(), "applying order snapshot");

        let mut state = self.write();
        if state.identity.as_ref().map(|identity| &identity.id) != Some(owner) {
            debug!(%owner, "dropping snapshot for a superseded binding");
            return;
        }
        let previous = state.current_order.as_ref().map(|order| order.id.clone());
        // The snapshot is a complete view of the remote collection:
        // replace everything, never merge.
        state.orders = orders;
        state.current_order = previous
            .and_then(|id| state.orders.iter().find(|order| order.id == id).cloned())
            .or_else(|| state.orders.first().cloned());
        state.project_current_order();
    }

    /// Cancel the active subscription, if any. Always safe to call.
    fn teardown_subscription(&self) {
        if let Some(mut active) = lock_subscription(&self.subscription).take() {
            active.handle.cancel();
            active.task.abort();
            debug!("order subscription torn down");
        }
    }
}

/// Map an order document: id from the key, owner from the configured
/// filter field, remaining fields from the body.
fn parse_order(doc: &Document, owner_field: &str) -> Result<Order, serde_json::Error> {
    use serde::de::Error as _;

    let mut order: Order = serde_json::from_value(doc.data.clone())?;
    let owner = doc
        .data
        .get(owner_field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| serde_json::Error::custom(format!("missing owner field {owner_field}")))?;
    order.id = OrderId::new(doc.id.clone());
    order.owner_id = UserId::new(owner);
    Ok(order)
}

impl BeverageStore {
    /// Create a store with the default collection layout.
    #[must_use]
    pub fn new(remote: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                remote,
                config: StoreConfig::default(),
                state: RwLock::new(StoreState::default()),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Create a store with an explicit collection layout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration names an empty collection
    /// or filter field.
    pub fn with_config(
        remote: Arc<dyn DocumentStore>,
        config: StoreConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(StoreInner {
                remote,
                config,
                state: RwLock::new(StoreState::default()),
                subscription: Mutex::new(None),
            }),
        })
    }

    // =========================================================================
    // Catalog seeding
    // =========================================================================

    /// Load all three catalogs, seeding empty remote collections from the
    /// bundled defaults.
    ///
    /// Kinds load independently: a failure in one is logged and leaves that
    /// catalog untouched while the others still load.
    pub async fn init(&self) {
        for kind in CatalogKind::ALL {
            if let Err(err) = self.load_catalog(kind).await {
                error!(catalog = %kind, error = %err, "failed to load catalog");
            }
        }
    }

    /// Load one catalog from the remote store.
    ///
    /// An empty remote collection is seeded from the bundled default set
    /// (individual seed-write failures are logged, not fatal) and the
    /// bundled set is adopted. A non-empty collection is adopted as-is.
    /// Afterwards the current pointer for the kind is the first element,
    /// or unset when the result is empty.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the collection cannot be read; local state
    /// for the kind keeps its prior value.
    pub async fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogOption>, RemoteError> {
        let collection = self.inner.config.collection(kind);
        let docs = self.inner.remote.list(collection).await?;

        let options = if docs.is_empty() {
            let defaults = catalog::bundled_defaults(kind);
            for option in defaults {
                let body = catalog::option_body(option);
                match self.inner.remote.set(collection, option.id.as_str(), body).await {
                    Ok(()) => info!(catalog = %kind, id = %option.id, "seeded option"),
                    Err(err) => {
                        // Self-healing seed: a lost write just means the next
                        // empty read seeds again.
                        error!(catalog = %kind, id = %option.id, error = %err, "seed write failed");
                    }
                }
            }
            defaults.to_vec()
        } else {
            docs.iter()
                .filter_map(|doc| match catalog::parse_option(doc) {
                    Ok(option) => Some(option),
                    Err(err) => {
                        warn!(document = %doc.id, error = %err, "skipping malformed option document");
                        None
                    }
                })
                .collect()
        };

        debug!(catalog = %kind, count = options.len(), "catalog loaded");
        self.inner.write().set_catalog(kind, options.clone());
        Ok(options)
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    /// The loaded options for a kind.
    #[must_use]
    pub fn catalog(&self, kind: CatalogKind) -> Vec<CatalogOption> {
        self.inner.read().catalog(kind).clone()
    }

    /// The currently selected option for a kind.
    #[must_use]
    pub fn current_option(&self, kind: CatalogKind) -> Option<CatalogOption> {
        self.inner.read().current_option(kind).clone()
    }

    /// The fixed ordered temperature list.
    #[must_use]
    pub const fn temperatures(&self) -> [Temperature; 4] {
        Temperature::ALL
    }

    /// The in-progress selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.inner.read().selection()
    }

    /// The signed-in user's saved orders.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.inner.read().orders.clone()
    }

    /// The currently displayed order, if any.
    #[must_use]
    pub fn current_order(&self) -> Option<Order> {
        self.inner.read().current_order.clone()
    }

    /// The bound identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.inner.read().identity.clone()
    }

    // =========================================================================
    // Selection tracking
    // =========================================================================

    /// Set the transient beverage name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.write().current_name = name.into();
    }

    /// Set the serving temperature.
    pub fn set_temperature(&self, temperature: Temperature) {
        self.inner.write().current_temperature = temperature;
    }

    /// Select an option by id from the loaded catalog for `kind`.
    ///
    /// Returns `false` (and leaves the selection unchanged) when the id is
    /// not in the catalog.
    pub fn select_option(&self, kind: CatalogKind, id: &OptionId) -> bool {
        let mut state = self.inner.write();
        let Some(option) = state.catalog(kind).iter().find(|o| &o.id == id).cloned() else {
            return false;
        };
        match kind {
            CatalogKind::Base => state.current_base = Some(option),
            CatalogKind::Syrup => state.current_syrup = Some(option),
            CatalogKind::Creamer => state.current_creamer = Some(option),
        }
        true
    }

    /// Display a saved order: set it as the current order and project its
    /// fields into the selection.
    ///
    /// Returns `false` when the id is not in the local order collection.
    pub fn show_order(&self, id: &OrderId) -> bool {
        let mut state = self.inner.write();
        let Some(order) = state.orders.iter().find(|o| &o.id == id).cloned() else {
            return false;
        };
        state.current_order = Some(order);
        state.project_current_order();
        true
    }

    // =========================================================================
    // Order submission
    // =========================================================================

    /// Validate the selection and persist it as a new order.
    ///
    /// On success the order is appended to local state optimistically, set
    /// as the current order, and the transient name is cleared. The next
    /// subscription snapshot is authoritative and will replace the
    /// optimistic entry. Other state reads are never blocked while the
    /// write is in flight.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::NotSignedIn` with no identity bound,
    /// `SubmitError::IncompleteSelection` when name, base, syrup, or
    /// creamer is missing, and `SubmitError::Remote` when the remote write
    /// is rejected. No remote call is made for precondition rejections.
    pub async fn submit(&self) -> Result<String, SubmitError> {
        let (identity, selection) = {
            let state = self.inner.read();
            (state.identity.clone(), state.selection())
        };

        let Some(identity) = identity else {
            return Err(SubmitError::NotSignedIn);
        };
        if !selection.is_complete() {
            return Err(SubmitError::IncompleteSelection);
        }
        let (Some(base), Some(syrup), Some(creamer)) =
            (selection.base, selection.syrup, selection.creamer)
        else {
            return Err(SubmitError::IncompleteSelection);
        };

        let order = Order {
            id: OrderId::default(),
            name: selection.name,
            temperature: selection.temperature,
            base,
            syrup,
            creamer,
            owner_id: identity.id,
        };
        let mut body = serde_json::to_value(&order)
            .map_err(|err| SubmitError::Remote(RemoteError::Write(err.to_string())))?;
        if let serde_json::Value::Object(map) = &mut body {
            // The owner travels under the configured filter field so the
            // subscription query can match it.
            map.insert(
                self.inner.config.owner_field.clone(),
                serde_json::Value::String(order.owner_id.as_str().to_owned()),
            );
        }

        let key = self
            .inner
            .remote
            .add(&self.inner.config.orders_collection, body)
            .await
            .map_err(|err| {
                error!(error = %err, "order write rejected");
                SubmitError::Remote(err)
            })?;

        let order = Order {
            id: OrderId::new(key),
            ..order
        };
        info!(order = %order.id, name = %order.name, "order saved");

        {
            let mut state = self.inner.write();
            // A sign-out or identity switch may have landed while the
            // write was in flight. The document is saved remotely either
            // way, but it must not resurface in a store that is no longer
            // bound to its owner.
            if state.identity.as_ref().map(|identity| &identity.id) == Some(&order.owner_id) {
                match state.orders.iter_mut().find(|o| o.id == order.id) {
                    Some(existing) => *existing = order.clone(),
                    None => state.orders.push(order.clone()),
                }
                state.current_order = Some(order.clone());
                state.project_current_order();
                // The transient name is consumed by the submit; clearing it
                // wins over the projection above.
                state.current_name.clear();
            } else {
                warn!(order = %order.id, "identity changed during submit, local state untouched");
            }
        }

        Ok(format!("Beverage {} made successfully!", order.name))
    }

    // =========================================================================
    // Live subscription management
    // =========================================================================

    /// Entry point for the external auth collaborator's identity changes.
    pub async fn on_identity_changed(&self, identity: Option<Identity>) {
        self.bind(identity).await;
    }

    /// Bind the store to an identity (or to none).
    ///
    /// Any active subscription is always cancelled first, even when the new
    /// identity is `None`, so a subscription scoped to the old identity can
    /// never leak. With an identity, a new filtered subscription is opened
    /// and its snapshots are consumed on a background task. Without one,
    /// local orders, the current order, and the transient name are cleared.
    ///
    /// A subscribe failure is logged and leaves the store bound but
    /// without a feed; re-binding the identity is the recovery path.
    pub async fn bind(&self, identity: Option<Identity>) {
        self.inner.teardown_subscription();

        let Some(identity) = identity else {
            let mut state = self.inner.write();
            state.identity = None;
            state.orders.clear();
            state.current_order = None;
            state.current_name.clear();
            info!("identity cleared, local orders dropped");
            return;
        };

        info!(user = %identity.id, "binding to identity");
        {
            let mut state = self.inner.write();
            state.identity = Some(identity.clone());
            // Orders always reflect the bound identity; the subscription's
            // initial snapshot rebuilds them for the new one.
            state.orders.clear();
            state.current_order = None;
        }

        let feed = self
            .inner
            .remote
            .subscribe(
                &self.inner.config.orders_collection,
                &self.inner.config.owner_field,
                identity.id.as_str(),
            )
            .await;
        let feed = match feed {
            Ok(feed) => feed,
            Err(err) => {
                error!(user = %identity.id, error = %err, "order subscription failed");
                return;
            }
        };

        // The task holds a weak reference so an abandoned store can drop;
        // it exits when the feed closes.
        let weak = Arc::downgrade(&self.inner);
        let owner = identity.id;
        let mut snapshots = feed.snapshots;
        let task = tokio::spawn(async move {
            while let Some(snapshot) = snapshots.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.apply_snapshot(&owner, snapshot);
            }
            debug!("order feed closed");
        });

        *lock_subscription(&self.inner.subscription) = Some(ActiveSubscription {
            handle: feed.handle,
            task,
        });
    }

    /// Whether a live subscription is currently active.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        lock_subscription(&self.inner.subscription).is_some()
    }
}

impl std::fmt::Debug for BeverageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read();
        f.debug_struct("BeverageStore")
            .field("identity", &state.identity)
            .field("orders", &state.orders.len())
            .field("bound", &self.is_bound())
            .finish()
    }
}
