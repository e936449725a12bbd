//! Polling consumers.
//!
//! A [`PollLoop`] owns one [`MessageSource`] (one consumer group) and feeds
//! every polled message to its [`MessageHandler`].

mod message;
mod poll_loop;
mod rebalance;
mod source;

pub use message::InboundMessage;
pub use poll_loop::{
    DrainOutcome, LoopState, LoopStats, MessageHandler, PollLoop, PollLoopConfig,
    DEFAULT_POLL_TIMEOUT, DEFAULT_SLEEP_INTERVAL,
};
pub use rebalance::{AssignmentContext, OffsetReset};
pub use source::{group_id_for, KafkaSource, MessageSource};
