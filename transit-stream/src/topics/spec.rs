use std::collections::BTreeMap;

/// Topic-level settings applied unless a producer overrides them.
pub const DEFAULT_TOPIC_CONFIG: &[(&str, &str)] = &[
    ("compression.type", "lz4"),
    ("cleanup.policy", "delete"),
];

/// The shape a topic is created with.
///
/// Once the topic exists on the broker this shape is never changed; a later
/// spec for the same name that differs is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replicas: i32,
    pub config: BTreeMap<String, String>,
}

impl TopicSpec {
    /// A spec with the default topic config.
    pub fn new(name: impl Into<String>, partitions: i32, replicas: i32) -> Self {
        Self {
            name: name.into(),
            partitions,
            replicas,
            config: DEFAULT_TOPIC_CONFIG
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Set a topic-level config entry, replacing any default.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Keep only the latest record per key instead of expiring by age.
    pub fn compacted(self) -> Self {
        self.with_config("cleanup.policy", "compact")
    }
}
