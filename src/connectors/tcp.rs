//! Implementation of [Connector] for TCP.
//!
//! This speaks no database protocol: liveness is reachability of the
//! address, and credentials are ignored.

use crate::backend::{Address, Connector, Database, Error};
use crate::config::AuthInfo;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// How long a dial may take before it fails with [std::io::ErrorKind::TimedOut].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TcpConnector {
    pub connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Database = TcpDatabase;

    async fn open(
        &self,
        address: &Address,
        _auth: &AuthInfo,
        _schema: &str,
        max_conns: usize,
    ) -> Result<Self::Database, Error> {
        let db = TcpDatabase {
            address: address.clone(),
            connect_timeout: self.connect_timeout,
            permits: Arc::new(Semaphore::new(max_conns.max(1))),
        };
        // Fail fast on addresses which can't be reached at all.
        db.ping().await?;
        Ok(db)
    }
}

/// Dials one address, with at most `max_conns` streams leased at once.
pub struct TcpDatabase {
    address: Address,
    connect_timeout: Duration,
    permits: Arc<Semaphore>,
}

impl TcpDatabase {
    async fn connect(&self) -> Result<TcpStream, Error> {
        let stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(self.address.as_str()),
        )
        .await
        .map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("Timed out connecting to {}", self.address),
            )
        })??;
        Ok(stream)
    }
}

/// A stream leased from a [TcpDatabase].
///
/// The lease is returned when this is dropped.
pub struct TcpLease {
    pub stream: TcpStream,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl Database for TcpDatabase {
    type Connection = TcpLease;

    async fn ping(&self) -> Result<(), Error> {
        self.connect().await?;
        Ok(())
    }

    async fn close(&self) {
        self.permits.close();
    }

    async fn get_conn(&self) -> Result<Self::Connection, Error> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Closed)?;
        let stream = self.connect().await?;
        Ok(TcpLease {
            stream,
            _permit: permit,
        })
    }
}
