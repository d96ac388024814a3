//! Per-user handles to a single backend address.

use crate::backend::{self, Address, Database, SharedConnector};
use crate::config::AuthInfo;
use crate::handle::{ConnHandle, State};

use derive_where::derive_where;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{event, instrument, Level};

#[derive(Error, Debug)]
pub enum Error {
    #[error("User {user} is not connected to this server")]
    UserNotConnected { user: String },
}

/// Maps an authenticated user to the [ConnHandle] it uses for one address.
///
/// Every handle in a pool targets [UserPool::address], differing only by the
/// credentials it was opened with.
#[derive_where(Debug)]
pub struct UserPool<D: Database> {
    address: Address,
    handles: RwLock<BTreeMap<String, Arc<ConnHandle<D>>>>,
}

impl<D: Database> UserPool<D> {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            handles: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Opens a database for `auth.user` against this pool's address.
    ///
    /// If the user already has a handle, it is replaced.
    #[instrument(skip(self, connector, auth), fields(address = %self.address, user = %auth.user), err)]
    pub async fn open(
        &self,
        connector: &SharedConnector<D>,
        auth: &AuthInfo,
        schema: &str,
        max_conns: usize,
    ) -> Result<Arc<ConnHandle<D>>, backend::Error> {
        // Dial before taking the lock; concurrent opens only serialize on the
        // map insertion.
        let db = match connector.open(&self.address, auth, schema, max_conns).await {
            Ok(db) => db,
            Err(err) => {
                event!(Level::WARN, err = ?err, "Failed to open database");
                return Err(err);
            }
        };
        let handle = Arc::new(ConnHandle::new(self.address.clone(), &auth.user, db));
        self.handles
            .write()
            .unwrap()
            .insert(auth.user.clone(), handle.clone());
        Ok(handle)
    }

    pub fn get_by_user(&self, user: &str) -> Result<Arc<ConnHandle<D>>, Error> {
        self.handles
            .read()
            .unwrap()
            .get(user)
            .cloned()
            .ok_or_else(|| Error::UserNotConnected {
                user: user.to_string(),
            })
    }

    /// Returns any one handle, for callers which only care about the address
    /// and its liveness.
    pub fn get_arbitrary(&self) -> Option<Arc<ConnHandle<D>>> {
        self.handles.read().unwrap().values().next().cloned()
    }

    /// Returns a snapshot of every handle in the pool.
    pub fn all_handles(&self) -> Vec<Arc<ConnHandle<D>>> {
        self.handles.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handles.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The liveness of this address, as seen through an arbitrary handle.
    ///
    /// An empty pool is reported as [State::Down].
    pub fn state(&self) -> State {
        self.get_arbitrary()
            .map(|handle| handle.state())
            .unwrap_or(State::Down)
    }

    /// Moves every handle to `state` and closes it.
    ///
    /// The state is stored before closing, so no new lease is granted from a
    /// handle while it closes.
    pub async fn close_all(&self, state: State) {
        for handle in self.all_handles() {
            handle.set_state(state);
            handle.close().await;
        }
    }
}
