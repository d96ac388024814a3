//! shardpool manages the backend databases of a sharded MySQL proxy.
//!
//! It uses the following terminology:
//! * A node is one shard, served by a single master and any number of
//!   slaves.
//! * A backend is one server (master or slave), identified by its
//!   `host:port` address.
//! * A user pool holds one database handle per configured user, all against
//!   the same backend.
//!
//! # Usage
//!
//! * The main interface for this crate is [node::Node].
//! * To construct a node, you must supply a [config::NodeConfig] and a
//!   [backend::Connector], which describes "how to open a database against an
//!   address".
//! * Writes go to [node::Node::get_master_connection]. Reads go to
//!   [node::Node::get_slave_connection], which spreads load across slaves in
//!   proportion to their weights.
//! * [health::HealthCheck] pings every backend periodically, marking those
//!   which stay unreachable as down and bringing them back when they
//!   recover. Backends marked down by an administrator stay down until they
//!   are explicitly brought up.
//!
//! # DTrace probes
//!
//! shardpool contains a number of DTrace USDT probes, which fire as nodes
//! check and fail over their backends. The full list of probes is:
//!
//! - `health-check-start`: Fires before pinging a backend.
//! - `health-check-done`: Fires after a backend answers a ping.
//! - `health-check-failed`: Fires after a backend fails to answer a ping.
//! - `master-up`: Fires when a master is reopened and marked up.
//! - `master-down`: Fires when a master is marked down.
//! - `slave-up`: Fires when a slave is reopened and marked up.
//! - `slave-down`: Fires when a slave is marked down.
//! - `slave-selected`: Fires when the balancer picks a slave.
//!
//! The existence of the probes is behind the `"probes"` feature, which is
//! enabled by default. Probes are zero-cost unless they are explicitly enabled,
//! by tracing the program with the `dtrace(1)` command-line tool.
//!
//! Probes are registered by [node::Node::open]. Registration failure is
//! logged, and the node is usable without probes.

// Public API
pub mod backend;
pub mod balancer;
pub mod config;
pub mod handle;
pub mod health;
pub mod node;
pub mod user_pool;

// Necessary for implementation
mod join;
#[cfg(test)]
mod test_utils;

// Default implementations of generic interfaces
pub mod connectors;

/// USDT probes for tracing how nodes check and fail over their backends.
#[cfg(feature = "probes")]
#[usdt::provider(provider = "shardpool")]
mod probes {
    /// Fires right before pinging a backend.
    fn health__check__start(node: &str, addr: &str) {}

    /// Fires after a backend answers a ping.
    fn health__check__done(node: &str, addr: &str) {}

    /// Fires after a failed ping, with a string identifying the reason.
    fn health__check__failed(node: &str, addr: &str, reason: &str) {}

    /// Fires when the master has been reopened and marked up.
    fn master__up(node: &str, addr: &str) {}

    /// Fires when the master is marked down, either by health checks or by
    /// an administrator.
    fn master__down(node: &str, addr: &str) {}

    /// Fires when a slave has been reopened and marked up.
    fn slave__up(node: &str, addr: &str) {}

    /// Fires when a slave is marked down, either by health checks or by an
    /// administrator.
    fn slave__down(node: &str, addr: &str) {}

    /// Fires when the balancer picks a slave, with its index in the slave
    /// list.
    fn slave__selected(node: &str, addr: &str, index: u64) {}
}
