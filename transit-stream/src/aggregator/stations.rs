//! The transformed station table.

use tracing::debug;

use crate::aggregator::{Changelog, KeyedAggregator, SourcePosition, Summarize};
use crate::consumer::{InboundMessage, MessageHandler};
use crate::errors::StreamError;
use transit_shared::{Station, TransformedStation};

/// Keys stations by `stop_id` and reduces them to their line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationLines;

impl Summarize for StationLines {
    type Input = Station;
    type Key = i64;
    type Summary = TransformedStation;

    fn key(&self, station: &Station) -> i64 {
        station.stop_id
    }

    fn summarize(&self, station: &Station) -> TransformedStation {
        TransformedStation::from(station)
    }
}

/// Handler feeding raw station records into the transformed station table.
pub struct StationAggregation<C> {
    aggregator: KeyedAggregator<StationLines, C>,
}

impl<C> StationAggregation<C>
where
    C: Changelog<i64, TransformedStation>,
{
    pub fn new(changelog: C) -> Self {
        Self {
            aggregator: KeyedAggregator::new(StationLines, changelog),
        }
    }

    /// Rebuild the table from changelog messages.
    ///
    /// Fails on the first message that is not a valid changelog entry.
    pub fn restore<'a, I>(changelog: C, messages: I) -> Result<Self, StreamError>
    where
        I: IntoIterator<Item = &'a InboundMessage>,
    {
        let entries = messages
            .into_iter()
            .map(decode_changelog_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            aggregator: KeyedAggregator::restore(StationLines, changelog, entries),
        })
    }

    pub fn get(&self, stop_id: i64) -> Option<&TransformedStation> {
        self.aggregator.get(&stop_id)
    }

    pub fn aggregator(&self) -> &KeyedAggregator<StationLines, C> {
        &self.aggregator
    }
}

impl<C> MessageHandler for StationAggregation<C>
where
    C: Changelog<i64, TransformedStation>,
{
    fn handle(&mut self, message: &InboundMessage) -> Result<(), StreamError> {
        let station: Station = message.decode()?;
        let position = SourcePosition {
            topic: &message.topic,
            partition: message.partition,
            offset: message.offset,
        };

        let applied = self.aggregator.apply(Some(position), &station)?;
        debug!(
            stop_id = station.stop_id,
            line = %station.line(),
            applied = ?applied,
            "Station aggregated"
        );
        Ok(())
    }
}

/// Decode one message of the transformed station changelog.
pub fn decode_changelog_entry(
    message: &InboundMessage,
) -> Result<(i64, TransformedStation), StreamError> {
    Ok((message.decode_key()?, message.decode()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_shared::Line;

    type Entries = Vec<(i64, TransformedStation)>;

    fn station(stop_id: i64, red: bool, blue: bool, green: bool) -> Station {
        Station {
            stop_id,
            direction_id: "E".to_string(),
            stop_name: "Clark/Lake (Inner Loop)".to_string(),
            station_name: "Clark/Lake".to_string(),
            station_descriptive_name: "Clark/Lake (Blue, Brown, Green, Orange, Purple & Pink lines)"
                .to_string(),
            station_id: 40380,
            order: 7,
            red,
            blue,
            green,
        }
    }

    fn message(offset: i64, station: &Station) -> InboundMessage {
        InboundMessage::new("org.chicago.cta.stations", 0, offset)
            .with_payload(serde_json::to_vec(station).unwrap())
    }

    fn changelog_message(offset: i64, key: i64, value: &TransformedStation) -> InboundMessage {
        InboundMessage::new("org.chicago.cta.stations.table.v1", 0, offset)
            .with_key(serde_json::to_vec(&key).unwrap())
            .with_payload(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn test_flag_sequence_ends_unknown() {
        let mut aggregation = StationAggregation::new(Entries::new());
        let flags = [
            (true, false, false),
            (false, true, false),
            (false, false, true),
            (false, false, false),
        ];
        let expected = [Line::Red, Line::Blue, Line::Green, Line::Unknown];

        for (offset, ((red, blue, green), line)) in flags.iter().zip(expected).enumerate() {
            aggregation
                .handle(&message(offset as i64, &station(30374, *red, *blue, *green)))
                .unwrap();
            assert_eq!(aggregation.get(30374).unwrap().line, line);
        }

        assert_eq!(aggregation.aggregator().len(), 1);
        assert_eq!(aggregation.aggregator().changelog().len(), 4);
    }

    #[test]
    fn test_summary_shape() {
        let mut aggregation = StationAggregation::new(Entries::new());
        aggregation.handle(&message(0, &station(30374, false, true, false))).unwrap();

        assert_eq!(
            aggregation.get(30374),
            Some(&TransformedStation {
                station_id: 30374,
                station_name: "Clark/Lake".to_string(),
                order: 7,
                line: Line::Blue,
            })
        );
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        let mut aggregation = StationAggregation::new(Entries::new());
        let bad = InboundMessage::new("org.chicago.cta.stations", 0, 0)
            .with_payload(br#"{"stop_id": "not a number"}"#.to_vec());

        assert!(matches!(aggregation.handle(&bad), Err(StreamError::Serialization(_))));
        assert!(aggregation.aggregator().is_empty());
    }

    #[test]
    fn test_restore_from_changelog_matches_live() {
        let mut live = StationAggregation::new(Entries::new());
        live.handle(&message(0, &station(1, true, false, false))).unwrap();
        live.handle(&message(1, &station(2, false, false, true))).unwrap();
        live.handle(&message(2, &station(1, false, true, false))).unwrap();

        let changelog: Vec<InboundMessage> = live
            .aggregator()
            .changelog()
            .iter()
            .enumerate()
            .map(|(offset, (key, value))| changelog_message(offset as i64, *key, value))
            .collect();

        let restored = StationAggregation::restore(Entries::new(), &changelog).unwrap();

        assert_eq!(restored.aggregator().table(), live.aggregator().table());
        assert_eq!(restored.get(1).unwrap().line, Line::Blue);
    }

    #[test]
    fn test_restore_rejects_entry_without_key() {
        let value = TransformedStation {
            station_id: 1,
            station_name: "Belmont".to_string(),
            order: 3,
            line: Line::Red,
        };
        let keyless = InboundMessage::new("org.chicago.cta.stations.table.v1", 0, 0)
            .with_payload(serde_json::to_vec(&value).unwrap());

        let result = StationAggregation::restore(Entries::new(), [&keyless]);
        assert!(result.is_err());
    }
}
