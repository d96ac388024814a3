//! Utilities to help with testing shardpool

use crate::backend::{self, Address, Connector, Database};
use crate::config::AuthInfo;

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// State shared between a connector and every database it opens.
#[derive(Default)]
struct Network {
    unreachable: Mutex<BTreeSet<Address>>,
    open_delays: Mutex<BTreeMap<Address, Duration>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl Network {
    fn check(&self, address: &Address) -> Result<(), backend::Error> {
        if self.unreachable.lock().unwrap().contains(address) {
            return Err(backend::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("{address} is unreachable"),
            )));
        }
        Ok(())
    }
}

/// A test-only connector whose backends can be made unreachable on demand.
pub struct FakeConnector {
    network: Arc<Network>,
}

impl FakeConnector {
    /// Creates a connector for which every address is reachable.
    pub fn new() -> Self {
        Self {
            network: Arc::new(Network::default()),
        }
    }

    /// Makes future opens, pings, and leases against `address` succeed or
    /// fail.
    pub fn set_reachable(&self, address: &str, reachable: bool) {
        let mut unreachable = self.network.unreachable.lock().unwrap();
        if reachable {
            unreachable.remove(address);
        } else {
            unreachable.insert(Address::new(address));
        }
    }

    /// Makes every open against `address` take `delay` first.
    pub fn set_open_delay(&self, address: &str, delay: Duration) {
        self.network
            .open_delays
            .lock()
            .unwrap()
            .insert(Address::new(address), delay);
    }

    /// The number of databases successfully opened through this connector.
    pub fn open_count(&self) -> usize {
        self.network.opens.load(Ordering::SeqCst)
    }

    /// The number of times any database opened here was closed.
    pub fn close_count(&self) -> usize {
        self.network.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Database = FakeDatabase;

    async fn open(
        &self,
        address: &Address,
        auth: &AuthInfo,
        _schema: &str,
        _max_conns: usize,
    ) -> Result<Self::Database, backend::Error> {
        let delay = self.network.open_delays.lock().unwrap().get(address).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.network.check(address)?;
        self.network.opens.fetch_add(1, Ordering::SeqCst);
        Ok(FakeDatabase {
            address: address.clone(),
            user: auth.user.clone(),
            network: self.network.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

/// A connection leased from a [FakeDatabase].
#[derive(Debug)]
pub struct FakeConnection {
    pub address: Address,
    pub user: String,
}

pub struct FakeDatabase {
    address: Address,
    user: String,
    network: Arc<Network>,
    closed: AtomicBool,
}

impl FakeDatabase {
    /// A reachable database which does not belong to any connector.
    pub fn detached(address: Address, user: &str) -> Self {
        Self {
            address,
            user: user.to_string(),
            network: Arc::new(Network::default()),
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Database for FakeDatabase {
    type Connection = FakeConnection;

    // Like a real server, pinging works regardless of whether this side has
    // closed its pool.
    async fn ping(&self) -> Result<(), backend::Error> {
        self.network.check(&self.address)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.network.closes.fetch_add(1, Ordering::SeqCst);
    }

    async fn get_conn(&self) -> Result<Self::Connection, backend::Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(backend::Error::Closed);
        }
        self.network.check(&self.address)?;
        Ok(FakeConnection {
            address: self.address.clone(),
            user: self.user.clone(),
        })
    }
}

pub fn setup_tracing_subscriber() {
    use tracing_subscriber::fmt::format::FmtSpan;
    let _ = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_span_events(FmtSpan::ENTER)
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
