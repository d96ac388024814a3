//! A shard's master and weighted slaves, with failover and health checks.

use crate::backend::{self, Address, Database, SharedConnector};
use crate::balancer::Schedule;
use crate::config::NodeConfig;
use crate::handle::{ConnHandle, State};
#[cfg(feature = "probes")]
use crate::probes;
use crate::user_pool::{self, UserPool};

use derive_where::derive_where;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{event, instrument, Level};

const SLAVE_SPLIT: char = ',';
const WEIGHT_SPLIT: char = '@';

#[derive(Error, Debug)]
pub enum Error {
    #[error("Backend address is empty")]
    AddressEmpty,

    #[error("Invalid weight in {input:?}, expected host:port@weight with a weight from 1 to {}", MAX_WEIGHT)]
    InvalidWeight { input: String },

    #[error("Slave weights sum to more than {}", MAX_TOTAL_WEIGHT)]
    TotalWeightTooLarge,

    #[error("Backends can only be brought down to Down or ManualDown, not {state:?}")]
    InvalidDownState { state: State },

    #[error("No master configured for this node")]
    NoMaster,

    #[error("Master {address} does not exist")]
    MasterNotExist { address: Address },

    #[error("No master connection available")]
    NoMasterConnection,

    #[error("Master is down")]
    MasterDown,

    #[error("Slave {address} already exists")]
    SlaveExists { address: Address },

    #[error("Slave {address} does not exist")]
    SlaveNotExist { address: Address },

    #[error("No slaves configured for this node")]
    NoSlave,

    #[error("No slave connection available")]
    NoSlaveConnection,

    #[error("Slave is down")]
    SlaveDown,

    #[error(transparent)]
    UserPool(#[from] user_pool::Error),

    #[error(transparent)]
    Backend(#[from] backend::Error),
}

/// The largest weight a single slave may be given.
pub const MAX_WEIGHT: usize = 1024;

/// The largest sum of slave weights, which is also the length of one
/// scheduling cycle.
pub const MAX_TOTAL_WEIGHT: usize = 1 << 16;

// Parses "host:port", rejecting empty input.
fn parse_address(input: &str) -> Result<Address, Error> {
    let address = input.trim();
    if address.is_empty() {
        return Err(Error::AddressEmpty);
    }
    Ok(Address::new(address))
}

// Parses "host:port[@weight]". The weight is None when there is no suffix.
fn parse_weighted(input: &str) -> Result<(Address, Option<usize>), Error> {
    let input = input.trim();
    let (address, weight) = match input.split_once(WEIGHT_SPLIT) {
        Some((address, weight)) => {
            let weight = weight
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|weight| (1..=MAX_WEIGHT).contains(weight))
                .ok_or_else(|| Error::InvalidWeight {
                    input: input.to_string(),
                })?;
            (address, Some(weight))
        }
        None => (input, None),
    };
    Ok((parse_address(address)?, weight))
}

// Sums slave weights, rejecting totals above MAX_TOTAL_WEIGHT.
fn total_weight<'a>(weights: impl IntoIterator<Item = &'a usize>) -> Result<usize, Error> {
    weights
        .into_iter()
        .try_fold(0usize, |total, weight| total.checked_add(*weight))
        .filter(|total| *total <= MAX_TOTAL_WEIGHT)
        .ok_or(Error::TotalWeightTooLarge)
}

// The slaves of a node, along with the schedule derived from their weights.
//
// These are only ever replaced together, so a reader holding the lock never
// observes a schedule that disagrees with the slave list.
#[derive_where(Default)]
struct Topology<D: Database> {
    slaves: Vec<Arc<UserPool<D>>>,
    weights: Vec<usize>,
    schedule: Schedule,
    cursor: usize,
}

impl<D: Database> Topology<D> {
    fn new(slaves: Vec<Arc<UserPool<D>>>, weights: Vec<usize>) -> Result<Self, Error> {
        assert_eq!(slaves.len(), weights.len());
        total_weight(&weights)?;
        let schedule = Schedule::new(&weights);
        Ok(Self {
            slaves,
            weights,
            schedule,
            cursor: 0,
        })
    }

    fn position(&self, address: &str) -> Option<usize> {
        self.slaves
            .iter()
            .position(|pool| pool.address().as_str() == address)
    }

    // Checks that a slave could be added without changing the topology.
    fn check_addable(&self, address: &Address, weight: usize) -> Result<(), Error> {
        if self.position(address.as_str()).is_some() {
            return Err(Error::SlaveExists {
                address: address.clone(),
            });
        }
        total_weight(self.weights.iter().chain([&weight]))?;
        Ok(())
    }

    fn with_slave(&self, pool: Arc<UserPool<D>>, weight: usize) -> Result<Self, Error> {
        let mut slaves = self.slaves.clone();
        let mut weights = self.weights.clone();
        slaves.push(pool);
        weights.push(weight);
        Self::new(slaves, weights)
    }

    fn without_slave(&self, index: usize) -> Result<Self, Error> {
        let mut slaves = self.slaves.clone();
        let mut weights = self.weights.clone();
        slaves.remove(index);
        weights.remove(index);
        Self::new(slaves, weights)
    }

    // Replaces the pool at "index", and its weight if one is given.
    fn with_replaced(
        &self,
        index: usize,
        pool: Arc<UserPool<D>>,
        weight: Option<usize>,
    ) -> Result<Self, Error> {
        let mut slaves = self.slaves.clone();
        let mut weights = self.weights.clone();
        slaves[index] = pool;
        if let Some(weight) = weight {
            weights[index] = weight;
        }
        Self::new(slaves, weights)
    }

    // Advances the cursor through the schedule, returning the chosen slave.
    fn next(&mut self) -> Option<(usize, Arc<UserPool<D>>)> {
        if self.schedule.is_empty() {
            return None;
        }
        let position = self.cursor % self.schedule.len();
        self.cursor = (position + 1) % self.schedule.len();
        let index = self.schedule.get(position)?;
        self.slaves.get(index).map(|pool| (index, pool.clone()))
    }
}

/// Describes one backend of a node, as reported by [Node::status].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BackendStatus {
    pub address: Address,
    /// The slave weight. Always `None` for the master.
    pub weight: Option<usize>,
    pub state: State,
}

/// A point-in-time view of a node's topology and liveness.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeStatus {
    pub name: String,
    pub master: Option<BackendStatus>,
    pub slaves: Vec<BackendStatus>,
}

/// One shard: a master pool and a weighted set of slave pools.
///
/// Liveness is tracked per [ConnHandle] and updated by [Node::check_master]
/// and [Node::check_slave], usually driven by [crate::health::HealthCheck].
///
/// # Locking
///
/// The slave topology is guarded by an async reader/writer lock, which may be
/// held across opening a pool. Each [UserPool] guards its own map with a
/// separate lock which is never held across an `.await`. A pool lock may be
/// taken while the topology lock is held, never the other way around.
pub struct Node<D: Database> {
    config: NodeConfig,
    connector: SharedConnector<D>,

    master: RwLock<Option<Arc<UserPool<D>>>>,
    slaves: tokio::sync::RwLock<Topology<D>>,

    down_after_noalive: Duration,

    // Milliseconds since "anchor" of the last successful ping to any master
    // or slave, respectively.
    anchor: Instant,
    last_master_ping: AtomicU64,
    last_slave_ping: AtomicU64,
}

impl<D: Database> Node<D> {
    /// Creates a node without any backends.
    ///
    /// Most callers want [Node::open], which also opens the configured
    /// master and slaves.
    pub fn new(config: NodeConfig, connector: SharedConnector<D>) -> Self {
        let down_after_noalive = config.down_after_noalive();
        Self {
            config,
            connector,
            master: RwLock::new(None),
            slaves: tokio::sync::RwLock::new(Topology::default()),
            down_after_noalive,
            anchor: Instant::now(),
            last_master_ping: AtomicU64::new(0),
            last_slave_ping: AtomicU64::new(0),
        }
    }

    /// Creates a node and opens every backend named in its configuration.
    #[instrument(skip(config, connector), fields(node = %config.name), err, name = "Node::open")]
    pub async fn open(config: NodeConfig, connector: SharedConnector<D>) -> Result<Self, Error> {
        #[cfg(feature = "probes")]
        if let Err(err) = usdt::register_probes() {
            event!(Level::WARN, err = ?err, "Failed to register USDT probes");
        }

        let master = config.master.clone();
        let slave = config.slave.clone();
        let node = Self::new(config, connector);
        node.parse_master(&master).await?;
        node.parse_slave(&slave).await?;
        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn master(&self) -> Option<Arc<UserPool<D>>> {
        self.master.read().unwrap().clone()
    }

    fn master_at(&self, address: &str) -> Result<Arc<UserPool<D>>, Error> {
        match self.master() {
            Some(master) if master.address().as_str() == address => Ok(master),
            _ => Err(Error::MasterNotExist {
                address: Address::new(address),
            }),
        }
    }

    async fn slave_at(&self, address: &str) -> Result<Arc<UserPool<D>>, Error> {
        let topology = self.slaves.read().await;
        if topology.slaves.is_empty() {
            return Err(Error::NoSlave);
        }
        topology
            .position(address)
            .map(|index| topology.slaves[index].clone())
            .ok_or_else(|| Error::SlaveNotExist {
                address: Address::new(address),
            })
    }

    /// Leases a connection to the master, authenticated as `user`.
    #[instrument(level = "debug", skip(self), err, name = "Node::get_master_connection")]
    pub async fn get_master_connection(&self, user: &str) -> Result<D::Connection, Error> {
        let master = self.master().ok_or(Error::NoMasterConnection)?;
        let handle = master.get_by_user(user)?;
        if handle.state() != State::Up {
            return Err(Error::MasterDown);
        }
        Ok(handle.get_conn().await?)
    }

    /// Leases a connection to the next scheduled slave, authenticated as
    /// `user`.
    ///
    /// A down slave is reported as [Error::SlaveDown] rather than skipped;
    /// the next call moves on to the following slave in the schedule.
    #[instrument(level = "debug", skip(self), err, name = "Node::get_slave_connection")]
    pub async fn get_slave_connection(&self, user: &str) -> Result<D::Connection, Error> {
        let handle = self.get_next_slave(user).await?;
        if handle.state() != State::Up {
            return Err(Error::SlaveDown);
        }
        Ok(handle.get_conn().await?)
    }

    /// Picks the next slave from the weighted schedule, without checking its
    /// liveness.
    pub async fn get_next_slave(&self, user: &str) -> Result<Arc<ConnHandle<D>>, Error> {
        let (index, pool) = {
            let mut topology = self.slaves.write().await;
            topology.next().ok_or(Error::NoSlaveConnection)?
        };
        #[cfg(feature = "probes")]
        probes::slave__selected!(|| (self.name(), pool.address().as_str(), index as u64));
        event!(Level::TRACE, index, address = %pool.address(), "Selected slave");
        Ok(pool.get_by_user(user)?)
    }

    // Opens one handle per configured user against `address`.
    async fn open_pool(&self, address: &Address) -> Result<UserPool<D>, backend::Error> {
        let pool = UserPool::new(address.clone());
        let max_conns = self.config.max_conns();
        futures::future::try_join_all(
            self.config
                .users
                .iter()
                .map(|auth| pool.open(&self.connector, auth, "", max_conns)),
        )
        .await?;
        Ok(pool)
    }

    // Opens a fresh pool and probes it once.
    //
    // On failure the new pool is closed and discarded.
    async fn up_pool(&self, address: &Address) -> Result<Arc<UserPool<D>>, Error> {
        let pool = self.open_pool(address).await?;
        if let Some(probe) = pool.get_arbitrary() {
            if let Err(err) = probe.ping().await {
                pool.close_all(State::Down).await;
                return Err(err.into());
            }
        }
        for handle in pool.all_handles() {
            handle.set_state(State::Up);
        }
        Ok(Arc::new(pool))
    }

    /// Opens the master pool from its configured address.
    pub async fn parse_master(&self, master: &str) -> Result<(), Error> {
        if master.trim().is_empty() {
            return Err(Error::NoMaster);
        }
        let address = parse_address(master)?;
        let pool = self.open_pool(&address).await?;
        *self.master.write().unwrap() = Some(Arc::new(pool));
        Ok(())
    }

    /// Opens every slave in a `host:port[@weight],...` list, replacing the
    /// current slaves.
    pub async fn parse_slave(&self, slaves: &str) -> Result<(), Error> {
        let slaves = slaves.trim().trim_matches(SLAVE_SPLIT);
        if slaves.is_empty() {
            return Ok(());
        }

        let mut entries: Vec<(Address, usize)> = vec![];
        for entry in slaves.split(SLAVE_SPLIT) {
            let (address, weight) = parse_weighted(entry)?;
            if entries.iter().any(|(existing, _)| existing == &address) {
                return Err(Error::SlaveExists { address });
            }
            entries.push((address, weight.unwrap_or(1)));
        }
        total_weight(entries.iter().map(|(_, weight)| weight))?;

        let mut pools = Vec::with_capacity(entries.len());
        for (address, _) in &entries {
            pools.push(Arc::new(self.open_pool(address).await?));
        }
        let weights = entries.into_iter().map(|(_, weight)| weight).collect();

        *self.slaves.write().await = Topology::new(pools, weights)?;
        Ok(())
    }

    /// Opens and adds a slave, given as `host:port[@weight]`.
    ///
    /// The slave is dialed without holding the topology lock, so slave
    /// selection is not stalled by a slow backend.
    #[instrument(skip(self), fields(node = %self.name()), err, name = "Node::add_slave")]
    pub async fn add_slave(&self, address: &str) -> Result<(), Error> {
        let (address, weight) = parse_weighted(address)?;
        let weight = weight.unwrap_or(1);

        self.slaves.read().await.check_addable(&address, weight)?;
        let pool = Arc::new(self.open_pool(&address).await?);

        let mut topology = self.slaves.write().await;
        // The topology may have changed while dialing.
        let added = topology
            .check_addable(&address, weight)
            .and_then(|()| topology.with_slave(pool.clone(), weight));
        match added {
            Ok(added) => *topology = added,
            Err(err) => {
                drop(topology);
                pool.close_all(State::Down).await;
                return Err(err);
            }
        }

        event!(Level::INFO, %address, weight, "Added slave");
        Ok(())
    }

    /// Removes a slave.
    ///
    /// The removed pool is not closed: it is released once in-flight leases
    /// drop their references to it.
    #[instrument(skip(self), fields(node = %self.name()), err, name = "Node::delete_slave")]
    pub async fn delete_slave(&self, address: &str) -> Result<(), Error> {
        let mut topology = self.slaves.write().await;
        if topology.slaves.is_empty() {
            return Err(Error::NoSlave);
        }
        let Some(index) = topology.position(address) else {
            return Err(Error::SlaveNotExist {
                address: Address::new(address),
            });
        };
        *topology = if topology.slaves.len() == 1 {
            Topology::default()
        } else {
            topology.without_slave(index)?
        };

        event!(Level::INFO, address, "Deleted slave");
        Ok(())
    }

    /// Reopens the master against `address` and marks it up.
    ///
    /// If the new pool cannot be probed, the current master is left in place.
    #[instrument(skip(self), fields(node = %self.name()), name = "Node::up_master")]
    pub async fn up_master(&self, address: &str) -> Result<(), Error> {
        let address = parse_address(address)?;
        let pool = match self.up_pool(&address).await {
            Ok(pool) => pool,
            Err(err) => {
                event!(Level::WARN, %address, err = ?err, "Failed to bring master up");
                return Err(err);
            }
        };
        *self.master.write().unwrap() = Some(pool);

        #[cfg(feature = "probes")]
        probes::master__up!(|| (self.name(), address.as_str()));
        event!(Level::INFO, %address, "Master up");
        Ok(())
    }

    /// Reopens a slave, given as `host:port[@weight]`, and marks it up.
    ///
    /// Replaces the slave with the same address, or adds the slave if there
    /// is none. A weight suffix replaces the slave's weight; without one, an
    /// existing slave keeps its weight and a new slave gets weight one.
    #[instrument(skip(self), fields(node = %self.name()), name = "Node::up_slave")]
    pub async fn up_slave(&self, address: &str) -> Result<(), Error> {
        let (address, weight) = parse_weighted(address)?;
        self.reopen_slave(&address, weight, true).await
    }

    // Reopens the slave at "address". With "append" set, a missing slave is
    // added; otherwise it is left absent.
    async fn reopen_slave(
        &self,
        address: &Address,
        weight: Option<usize>,
        append: bool,
    ) -> Result<(), Error> {
        let pool = match self.up_pool(address).await {
            Ok(pool) => pool,
            Err(err) => {
                event!(Level::WARN, %address, err = ?err, "Failed to bring slave up");
                return Err(err);
            }
        };

        let mut topology = self.slaves.write().await;
        let updated = match (topology.position(address.as_str()), append) {
            (Some(index), _) => topology.with_replaced(index, pool.clone(), weight),
            (None, true) => topology.with_slave(pool.clone(), weight.unwrap_or(1)),
            (None, false) => {
                event!(Level::DEBUG, %address, "Slave removed while reopening");
                Err(Error::SlaveNotExist {
                    address: address.clone(),
                })
            }
        };
        match updated {
            Ok(updated) => *topology = updated,
            Err(err) => {
                drop(topology);
                pool.close_all(State::Down).await;
                return Err(err);
            }
        }
        drop(topology);

        #[cfg(feature = "probes")]
        probes::slave__up!(|| (self.name(), address.as_str()));
        event!(Level::INFO, %address, "Slave up");
        Ok(())
    }

    /// Closes the master and sets its liveness to `state`, which must be
    /// [State::Down] or [State::ManualDown].
    #[instrument(skip(self), fields(node = %self.name()), err, name = "Node::down_master")]
    pub async fn down_master(&self, address: &str, state: State) -> Result<(), Error> {
        if state == State::Up {
            return Err(Error::InvalidDownState { state });
        }
        let master = self.master_at(address)?;
        master.close_all(state).await;

        #[cfg(feature = "probes")]
        probes::master__down!(|| (self.name(), address));
        event!(Level::INFO, address, ?state, "Master down");
        Ok(())
    }

    /// Closes a slave and sets its liveness to `state`, which must be
    /// [State::Down] or [State::ManualDown].
    #[instrument(skip(self), fields(node = %self.name()), err, name = "Node::down_slave")]
    pub async fn down_slave(&self, address: &str, state: State) -> Result<(), Error> {
        if state == State::Up {
            return Err(Error::InvalidDownState { state });
        }
        let slave = self.slave_at(address).await?;
        slave.close_all(state).await;

        #[cfg(feature = "probes")]
        probes::slave__down!(|| (self.name(), address));
        event!(Level::INFO, address, ?state, "Slave down");
        Ok(())
    }

    // Marks every handle of "pool" which is still up as down, and closes it.
    //
    // Handles in any other state, notably ManualDown, are left alone.
    async fn expire_pool(pool: &UserPool<D>) -> bool {
        let mut expired = false;
        for handle in pool.all_handles() {
            if handle.try_mark_down() {
                handle.close().await;
                expired = true;
            }
        }
        expired
    }

    fn now_ms(&self) -> u64 {
        self.anchor.elapsed().as_millis() as u64
    }

    fn record_ping(&self, last: &AtomicU64) {
        last.fetch_max(self.now_ms(), Ordering::AcqRel);
    }

    // Returns true if nothing has answered a ping for longer than
    // "down_after_noalive".
    fn past_down_threshold(&self, last: &AtomicU64) -> bool {
        if self.down_after_noalive.is_zero() {
            return false;
        }
        let since = self.now_ms().saturating_sub(last.load(Ordering::Acquire));
        Duration::from_millis(since) > self.down_after_noalive
    }

    /// Treats every backend as having answered just now.
    pub(crate) fn reset_ping_clock(&self) {
        self.record_ping(&self.last_master_ping);
        self.record_ping(&self.last_slave_ping);
    }

    /// Pings the master, bringing it up or down as needed.
    #[instrument(level = "trace", skip(self), fields(node = %self.name()), name = "Node::check_master")]
    pub async fn check_master(&self) {
        let Some(handle) = self.master().and_then(|master| master.get_arbitrary()) else {
            event!(Level::ERROR, "Master is not alive");
            return;
        };
        let address = handle.address().clone();

        #[cfg(feature = "probes")]
        probes::health__check__start!(|| (self.name(), address.as_str()));
        match handle.ping().await {
            Ok(()) => {
                #[cfg(feature = "probes")]
                probes::health__check__done!(|| (self.name(), address.as_str()));
                if handle.state() == State::Down && self.up_master(address.as_str()).await.is_err() {
                    return;
                }
                self.record_ping(&self.last_master_ping);
                handle.mark_up();
            }
            Err(err) => {
                #[cfg(feature = "probes")]
                {
                    let reason = err.to_string();
                    probes::health__check__failed!(|| (self.name(), address.as_str(), reason.as_str()));
                }
                event!(Level::WARN, %address, err = ?err, "Master ping failed");

                if !self.past_down_threshold(&self.last_master_ping) {
                    return;
                }
                let Ok(master) = self.master_at(address.as_str()) else {
                    return;
                };
                if Self::expire_pool(&master).await {
                    #[cfg(feature = "probes")]
                    probes::master__down!(|| (self.name(), address.as_str()));
                    event!(
                        Level::INFO,
                        %address,
                        down_after_noalive = ?self.down_after_noalive,
                        "Master down"
                    );
                }
            }
        }
    }

    /// Pings every slave handle, bringing slaves up or down as needed.
    #[instrument(level = "trace", skip(self), fields(node = %self.name()), name = "Node::check_slave")]
    pub async fn check_slave(&self) {
        // Snapshot the handles, then ping without holding the topology lock.
        let slaves: Vec<(Address, Vec<Arc<ConnHandle<D>>>)> = {
            let topology = self.slaves.read().await;
            topology
                .slaves
                .iter()
                .map(|pool| (pool.address().clone(), pool.all_handles()))
                .collect()
        };

        for (address, handles) in slaves {
            for handle in handles {
                if self.check_slave_handle(&address, &handle).await == Checked::Reopened {
                    // The remaining handles belong to the replaced pool.
                    break;
                }
            }
        }
    }

    async fn check_slave_handle(&self, address: &Address, handle: &ConnHandle<D>) -> Checked {
        #[cfg(feature = "probes")]
        probes::health__check__start!(|| (self.name(), address.as_str()));
        match handle.ping().await {
            Ok(()) => {
                #[cfg(feature = "probes")]
                probes::health__check__done!(|| (self.name(), address.as_str()));
                let mut checked = Checked::Continue;
                if handle.state() == State::Down {
                    checked = Checked::Reopened;
                    if self.reopen_slave(address, None, false).await.is_err() {
                        return checked;
                    }
                }
                self.record_ping(&self.last_slave_ping);
                handle.mark_up();
                checked
            }
            Err(err) => {
                #[cfg(feature = "probes")]
                {
                    let reason = err.to_string();
                    probes::health__check__failed!(|| (self.name(), address.as_str(), reason.as_str()));
                }
                event!(Level::WARN, %address, user = handle.user(), err = ?err, "Slave ping failed");

                if !self.past_down_threshold(&self.last_slave_ping) {
                    return Checked::Continue;
                }
                let Ok(slave) = self.slave_at(address.as_str()).await else {
                    return Checked::Continue;
                };
                if Self::expire_pool(&slave).await {
                    #[cfg(feature = "probes")]
                    probes::slave__down!(|| (self.name(), address.as_str()));
                    event!(
                        Level::INFO,
                        %address,
                        down_after_noalive = ?self.down_after_noalive,
                        "Slave down"
                    );
                }
                Checked::Continue
            }
        }
    }

    /// Reports the address, weight, and liveness of every backend.
    pub async fn status(&self) -> NodeStatus {
        let master = self.master().map(|pool| BackendStatus {
            address: pool.address().clone(),
            weight: None,
            state: pool.state(),
        });
        let topology = self.slaves.read().await;
        let slaves = topology
            .slaves
            .iter()
            .zip(&topology.weights)
            .map(|(pool, weight)| BackendStatus {
                address: pool.address().clone(),
                weight: Some(*weight),
                state: pool.state(),
            })
            .collect();
        NodeStatus {
            name: self.name().to_string(),
            master,
            slaves,
        }
    }

    /// Returns the current weighted schedule, as indices into the slave list.
    pub async fn schedule(&self) -> Vec<usize> {
        self.slaves.read().await.schedule.as_slice().to_vec()
    }
}

impl<D: Database> std::fmt::Display for Node<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name().fmt(f)
    }
}

#[derive(Debug, Eq, PartialEq)]
enum Checked {
    Continue,
    // The pool was replaced, or a replacement was attempted.
    Reopened,
}
