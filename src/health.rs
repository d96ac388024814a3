//! A background task which periodically checks a [Node]'s backends.

use crate::backend::Database;
use crate::node::Node;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{event, instrument, Level};

/// How often backends are pinged, by default.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(16);

#[derive(Error, Debug)]
pub enum Error {
    #[error("Health check terminated")]
    Terminated,
}

struct Worker {
    handle: tokio::task::JoinHandle<()>,
    terminate_tx: oneshot::Sender<()>,
}

/// Drives [Node::check_master] and [Node::check_slave] on an interval.
///
/// The task stops when [HealthCheck::terminate] is called, or is aborted
/// when this is dropped.
pub struct HealthCheck {
    worker: Mutex<Option<Worker>>,
}

impl HealthCheck {
    /// Starts checking `node` every [HEALTH_CHECK_INTERVAL].
    pub fn spawn<D: Database>(node: Arc<Node<D>>) -> Self {
        Self::spawn_with_interval(node, HEALTH_CHECK_INTERVAL)
    }

    pub fn spawn_with_interval<D: Database>(node: Arc<Node<D>>, interval: Duration) -> Self {
        let (terminate_tx, terminate_rx) = oneshot::channel();
        let handle = tokio::task::spawn(async move {
            run(node, interval, terminate_rx).await;
        });
        Self {
            worker: Mutex::new(Some(Worker {
                handle,
                terminate_tx,
            })),
        }
    }

    /// Stops the task, waiting for any in-progress check to finish.
    pub async fn terminate(&self) -> Result<(), Error> {
        let Some(worker) = self.worker.lock().unwrap().take() else {
            return Err(Error::Terminated);
        };
        let _send_result = worker.terminate_tx.send(());
        crate::join::propagate_panics(worker.handle.await);
        Ok(())
    }
}

impl Drop for HealthCheck {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.handle.abort();
        }
    }
}

#[instrument(skip_all, fields(node = %node.name()), name = "HealthCheck::run")]
async fn run<D: Database>(
    node: Arc<Node<D>>,
    interval: Duration,
    mut terminate_rx: oneshot::Receiver<()>,
) {
    event!(Level::INFO, ?interval, "Starting health checks");
    check(&node).await;
    // Failures before the task started should not count toward marking a
    // backend down.
    node.reset_ping_clock();

    loop {
        tokio::select! {
            _ = &mut terminate_rx => {
                event!(Level::INFO, "Stopping health checks");
                return;
            },
            _ = tokio::time::sleep(interval) => {},
        }
        check(&node).await;
    }
}

async fn check<D: Database>(node: &Node<D>) {
    node.check_master().await;
    node.check_slave().await;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::SharedConnector;
    use crate::config::{AuthInfo, NodeConfig};
    use crate::handle::State;
    use crate::test_utils::{setup_tracing_subscriber, FakeConnector, FakeDatabase};

    const MASTER: &str = "10.0.0.1:3306";
    const SLAVE: &str = "10.0.0.2:3306";

    async fn node(connector: &Arc<FakeConnector>) -> Arc<Node<FakeDatabase>> {
        let config = NodeConfig {
            name: "node1".to_string(),
            down_after_noalive: 30,
            max_conns_limit: 4,
            master: MASTER.to_string(),
            slave: SLAVE.to_string(),
            users: vec![AuthInfo::new("root", "")],
        };
        let shared: SharedConnector<FakeDatabase> = connector.clone();
        Arc::new(Node::open(config, shared).await.unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn marks_unreachable_backends_down() {
        setup_tracing_subscriber();
        let connector = Arc::new(FakeConnector::new());
        let node = node(&connector).await;
        connector.set_reachable(MASTER, false);

        let health = HealthCheck::spawn(node.clone());

        // Two failed checks, 32 seconds after the task started
        tokio::time::sleep(Duration::from_secs(40)).await;
        let status = node.status().await;
        assert_eq!(status.master.unwrap().state, State::Down);
        assert_eq!(status.slaves[0].state, State::Up);

        connector.set_reachable(MASTER, true);
        tokio::time::sleep(HEALTH_CHECK_INTERVAL).await;
        assert_eq!(node.status().await.master.unwrap().state, State::Up);

        health.terminate().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn terminate_twice() {
        let connector = Arc::new(FakeConnector::new());
        let node = node(&connector).await;

        let health = HealthCheck::spawn_with_interval(node, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(5)).await;

        health.terminate().await.unwrap();
        assert!(matches!(
            health.terminate().await.unwrap_err(),
            Error::Terminated
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_checks() {
        let connector = Arc::new(FakeConnector::new());
        let node = node(&connector).await;

        let health = HealthCheck::spawn(node.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(health);

        connector.set_reachable(SLAVE, false);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(node.status().await.slaves[0].state, State::Up);
    }
}
