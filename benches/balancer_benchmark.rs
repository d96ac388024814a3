use criterion::{black_box, criterion_group, criterion_main, Criterion};

use async_trait::async_trait;
use shardpool::backend::{self, Address, Connector, Database, SharedConnector};
use shardpool::balancer::Schedule;
use shardpool::config::{AuthInfo, NodeConfig};
use shardpool::node::Node;
use std::sync::Arc;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("schedule 5 slaves", |b| {
        b.iter(|| Schedule::new(black_box(&[7, 2, 5, 1, 4])))
    });

    c.bench_function("schedule 100 slaves", |b| {
        let weights: Vec<usize> = (1..=100).collect();
        b.iter(|| Schedule::new(black_box(&weights)))
    });

    let rt = tokio::runtime::Runtime::new().unwrap();
    let node = Arc::new(rt.block_on(test_node()));
    c.bench_function("concurrently select 100 slaves", |b| {
        b.to_async(&rt)
            .iter(|| concurrent_selects(node.clone(), black_box(100)))
    });

    c.bench_function("concurrently select 1000 slaves", |b| {
        b.to_async(&rt)
            .iter(|| concurrent_selects(node.clone(), black_box(1000)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

struct TestDatabase {}

#[async_trait]
impl Database for TestDatabase {
    type Connection = ();

    async fn ping(&self) -> Result<(), backend::Error> {
        Ok(())
    }

    async fn close(&self) {}

    async fn get_conn(&self) -> Result<Self::Connection, backend::Error> {
        Ok(())
    }
}

struct TestConnector {}

#[async_trait]
impl Connector for TestConnector {
    type Database = TestDatabase;

    async fn open(
        &self,
        _address: &Address,
        _auth: &AuthInfo,
        _schema: &str,
        _max_conns: usize,
    ) -> Result<Self::Database, backend::Error> {
        Ok(TestDatabase {})
    }
}

async fn test_node() -> Node<TestDatabase> {
    let config = NodeConfig {
        name: "bench".to_string(),
        down_after_noalive: 30,
        max_conns_limit: 16,
        master: "10.0.0.1:3306".to_string(),
        slave: "10.0.0.2:3306@1,10.0.0.3:3306@3,10.0.0.4:3306@2".to_string(),
        users: vec![AuthInfo::new("root", "")],
    };
    let connector: SharedConnector<TestDatabase> = Arc::new(TestConnector {});
    Node::open(config, connector)
        .await
        .expect("Failed to open node")
}

async fn concurrent_selects(node: Arc<Node<TestDatabase>>, count: usize) {
    let futs: Vec<_> = (0..count)
        .map(|_| {
            tokio::task::spawn({
                let node = node.clone();
                async move {
                    node.get_slave_connection("root")
                        .await
                        .expect("Failed to get slave connection");
                }
            })
        })
        .collect();
    futures::future::try_join_all(futs)
        .await
        .expect("Failed to select slaves");
}
