//! The interface for opening and probing backend database servers.

use crate::config::AuthInfo;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O Error")]
    Io(#[from] std::io::Error),

    #[error("Connection to backend closed")]
    Closed,

    #[error(transparent)]
    Other(anyhow::Error),
}

/// The `host:port` address of a single backend server.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
pub struct Address(pub Arc<str>);

impl Address {
    pub fn new(address: impl ToString) -> Self {
        Self(address.to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&'_ str> for Address {
    fn from(s: &'_ str) -> Self {
        Self(s.into())
    }
}

impl std::borrow::Borrow<str> for Address {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Interface for raw connections leased out of a [Database].
pub trait Connection: Send + 'static {}

impl<T> Connection for T where T: Send + 'static {}

/// A pooled connection to one backend address under one set of credentials.
///
/// Implementations own their own pooling and dialing. Resources are expected
/// to be released when the value is dropped; [Database::close] only has to
/// stop new leases from being handed out.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    type Connection: Connection;

    /// Checks that the backend is reachable.
    ///
    /// This is called by the health check loop, including on databases which
    /// have been closed, so that a recovered backend can be detected.
    async fn ping(&self) -> Result<(), Error>;

    /// Stops the database from handing out new connections.
    async fn close(&self);

    /// Leases a connection from the database.
    async fn get_conn(&self) -> Result<Self::Connection, Error>;
}

/// Describes how a [Database] for an address should be opened.
#[async_trait]
pub trait Connector: Send + Sync {
    type Database: Database;

    /// Opens a database against `address`, authenticating as `auth`.
    async fn open(
        &self,
        address: &Address,
        auth: &AuthInfo,
        schema: &str,
        max_conns: usize,
    ) -> Result<Self::Database, Error>;
}

pub type SharedConnector<Db> = Arc<dyn Connector<Database = Db>>;
