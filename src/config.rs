//! Configuration consumed when constructing a [crate::node::Node].

use std::time::Duration;

/// Used when a node does not specify `max_conns_limit`.
pub const DEFAULT_MAX_CONNS: usize = 16;

/// Credentials a node opens one connection pool for, per backend address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AuthInfo {
    pub user: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub password: String,
}

impl AuthInfo {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// Static description of one shard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NodeConfig {
    /// The name of the node, for instrumentation.
    pub name: String,

    /// Seconds of sustained ping failure before a backend is marked down.
    ///
    /// Zero disables automatic down-marking.
    #[cfg_attr(feature = "serde", serde(default))]
    pub down_after_noalive: u64,

    /// The maximum number of connections each backend database may open.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_conns_limit: usize,

    /// Address of the master, as `host:port`.
    pub master: String,

    /// Slave addresses, as `host:port[@weight]` separated by commas.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slave: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub users: Vec<AuthInfo>,
}

impl NodeConfig {
    pub fn down_after_noalive(&self) -> Duration {
        Duration::from_secs(self.down_after_noalive)
    }

    pub fn max_conns(&self) -> usize {
        if self.max_conns_limit == 0 {
            DEFAULT_MAX_CONNS
        } else {
            self.max_conns_limit
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn max_conns_falls_back_to_default() {
        let config = NodeConfig::default();
        assert_eq!(config.max_conns(), DEFAULT_MAX_CONNS);
        assert_eq!(config.down_after_noalive(), Duration::ZERO);

        let config = NodeConfig {
            max_conns_limit: 4,
            down_after_noalive: 300,
            ..Default::default()
        };
        assert_eq!(config.max_conns(), 4);
        assert_eq!(config.down_after_noalive(), Duration::from_secs(300));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_node_with_optional_fields() {
        let nodes: Vec<NodeConfig> = serde_json::from_str(
            r#"[
                {
                    "name": "node1",
                    "down_after_noalive": 300,
                    "max_conns_limit": 16,
                    "master": "127.0.0.1:3306",
                    "slave": "127.0.0.1:4306",
                    "users": [{ "user": "user_b", "password": "pass_b" }]
                },
                {
                    "name": "node2",
                    "master": "127.0.0.1:3307",
                    "users": [{ "user": "user_c" }]
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(
            nodes[0],
            NodeConfig {
                name: "node1".to_string(),
                down_after_noalive: 300,
                max_conns_limit: 16,
                master: "127.0.0.1:3306".to_string(),
                slave: "127.0.0.1:4306".to_string(),
                users: vec![AuthInfo::new("user_b", "pass_b")],
            }
        );
        assert_eq!(
            nodes[1],
            NodeConfig {
                name: "node2".to_string(),
                master: "127.0.0.1:3307".to_string(),
                users: vec![AuthInfo::new("user_c", "")],
                ..Default::default()
            }
        );
    }
}
