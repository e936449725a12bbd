//! Partition assignment policy.

use rdkafka::client::ClientContext;
use rdkafka::consumer::{ConsumerContext, Rebalance};
use rdkafka::error::{KafkaError, KafkaResult};
use rdkafka::{Offset, TopicPartitionList};
use tracing::{error, info, warn};

/// Where a newly assigned partition starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetReset {
    /// Resume from the group's committed offsets.
    #[default]
    Committed,
    /// Replay every assigned partition from its oldest retained record.
    Earliest,
}

impl OffsetReset {
    pub fn from_earliest(earliest: bool) -> Self {
        if earliest {
            Self::Earliest
        } else {
            Self::Committed
        }
    }

    pub fn is_earliest(self) -> bool {
        self == Self::Earliest
    }

    /// Apply the policy to a whole assignment batch, in place.
    ///
    /// The list is the one librdkafka is about to assign, so the reset takes
    /// effect for every partition of the batch before any record is fetched.
    pub fn apply(self, assignment: &TopicPartitionList) -> KafkaResult<()> {
        if self == Self::Committed {
            return Ok(());
        }
        for mut element in assignment.elements() {
            element.set_offset(Offset::Beginning)?;
        }
        Ok(())
    }
}

/// Consumer context applying an [`OffsetReset`] on every assignment.
///
/// Assignment itself is left to rdkafka's default rebalance handling, which
/// covers both the eager and the cooperative protocol. The reset runs in
/// `pre_rebalance`, on the same list that is then assigned.
pub struct AssignmentContext {
    group_id: String,
    reset: OffsetReset,
}

impl AssignmentContext {
    pub fn new(group_id: impl Into<String>, reset: OffsetReset) -> Self {
        Self {
            group_id: group_id.into(),
            reset,
        }
    }
}

impl ClientContext for AssignmentContext {
    fn error(&self, error: KafkaError, reason: &str) {
        error!(group_id = %self.group_id, error = %error, reason = %reason, "Kafka client error");
    }
}

impl ConsumerContext for AssignmentContext {
    fn pre_rebalance<'a>(&self, rebalance: &Rebalance<'a>) {
        match rebalance {
            Rebalance::Assign(assignment) => {
                if let Err(e) = self.reset.apply(assignment) {
                    warn!(
                        group_id = %self.group_id,
                        error = %e,
                        "Failed to reset offsets, keeping committed offsets"
                    );
                }
            }
            Rebalance::Revoke(revoked) => info!(
                group_id = %self.group_id,
                partitions = revoked.count(),
                "Partitions revoked"
            ),
            Rebalance::Error(e) => warn!(
                group_id = %self.group_id,
                error = %e,
                "Rebalance error, releasing assignment"
            ),
        }
    }

    fn post_rebalance<'a>(&self, rebalance: &Rebalance<'a>) {
        if let Rebalance::Assign(assignment) = rebalance {
            info!(
                group_id = %self.group_id,
                partitions = assignment.count(),
                from_beginning = self.reset.is_earliest(),
                "Partitions assigned"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment() -> TopicPartitionList {
        let mut tpl = TopicPartitionList::new();
        let clark_and_lake = "org.chicago.cta.station.arrivals.clark_and_lake";
        tpl.add_partition_offset(clark_and_lake, 0, Offset::Offset(12))
            .unwrap();
        tpl.add_partition_offset(clark_and_lake, 1, Offset::Stored)
            .unwrap();
        tpl.add_partition_offset("org.chicago.cta.station.arrivals.belmont", 0, Offset::Offset(3))
            .unwrap();
        tpl
    }

    #[test]
    fn test_earliest_resets_every_partition() {
        let tpl = assignment();
        OffsetReset::Earliest.apply(&tpl).unwrap();

        assert_eq!(tpl.count(), 3);
        for element in tpl.elements() {
            assert_eq!(element.offset(), Offset::Beginning);
        }
    }

    #[test]
    fn test_committed_alters_nothing() {
        let tpl = assignment();
        OffsetReset::Committed.apply(&tpl).unwrap();

        let offsets: Vec<Offset> = tpl.elements().iter().map(|e| e.offset()).collect();
        assert_eq!(
            offsets,
            vec![Offset::Offset(12), Offset::Stored, Offset::Offset(3)]
        );
    }

    #[test]
    fn test_from_earliest() {
        assert_eq!(OffsetReset::from_earliest(true), OffsetReset::Earliest);
        assert_eq!(OffsetReset::from_earliest(false), OffsetReset::Committed);
        assert_eq!(OffsetReset::default(), OffsetReset::Committed);
    }

    fn context(reset: OffsetReset) -> AssignmentContext {
        AssignmentContext::new("org.chicago.cta.weather.v1-group", reset)
    }

    fn offsets(tpl: &TopicPartitionList) -> Vec<Offset> {
        tpl.elements().iter().map(|e| e.offset()).collect()
    }

    #[test]
    fn test_context_resets_assignment_before_it_is_accepted() {
        let context = context(OffsetReset::Earliest);
        let tpl = assignment();

        context.pre_rebalance(&Rebalance::Assign(&tpl));

        assert_eq!(offsets(&tpl), vec![Offset::Beginning; 3]);
    }

    #[test]
    fn test_context_keeps_committed_offsets_when_not_earliest() {
        let context = context(OffsetReset::Committed);
        let tpl = assignment();

        context.pre_rebalance(&Rebalance::Assign(&tpl));
        context.post_rebalance(&Rebalance::Assign(&tpl));

        assert_eq!(
            offsets(&tpl),
            vec![Offset::Offset(12), Offset::Stored, Offset::Offset(3)]
        );
    }

    #[test]
    fn test_context_leaves_revoked_partitions_alone() {
        let context = context(OffsetReset::Earliest);
        let tpl = assignment();

        context.pre_rebalance(&Rebalance::Revoke(&tpl));

        assert_eq!(
            offsets(&tpl),
            vec![Offset::Offset(12), Offset::Stored, Offset::Offset(3)]
        );
    }
}
