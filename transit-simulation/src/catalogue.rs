//! The fixed set of stations the simulation runs.

use transit_shared::{Line, Station};

/// One stop of the simulated network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueEntry {
    pub stop_id: i64,
    pub station_id: i64,
    pub name: &'static str,
    pub line: Line,
    /// Position along the line, from the direction-A terminal.
    pub order: i32,
}

const CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        stop_id: 30171,
        station_id: 40890,
        name: "O'Hare",
        line: Line::Blue,
        order: 1,
    },
    CatalogueEntry {
        stop_id: 30247,
        station_id: 41280,
        name: "Jefferson Park",
        line: Line::Blue,
        order: 2,
    },
    CatalogueEntry {
        stop_id: 30074,
        station_id: 40380,
        name: "Clark/Lake",
        line: Line::Blue,
        order: 3,
    },
    CatalogueEntry {
        stop_id: 30076,
        station_id: 40390,
        name: "Forest Park",
        line: Line::Blue,
        order: 4,
    },
    CatalogueEntry {
        stop_id: 30173,
        station_id: 40900,
        name: "Howard",
        line: Line::Red,
        order: 1,
    },
    CatalogueEntry {
        stop_id: 30255,
        station_id: 41320,
        name: "Belmont",
        line: Line::Red,
        order: 2,
    },
    CatalogueEntry {
        stop_id: 30109,
        station_id: 40560,
        name: "Jackson",
        line: Line::Red,
        order: 3,
    },
    CatalogueEntry {
        stop_id: 30088,
        station_id: 40450,
        name: "95th/Dan Ryan",
        line: Line::Red,
        order: 4,
    },
    CatalogueEntry {
        stop_id: 30004,
        station_id: 40020,
        name: "Harlem/Lake",
        line: Line::Green,
        order: 1,
    },
    CatalogueEntry {
        stop_id: 30243,
        station_id: 41260,
        name: "Austin",
        line: Line::Green,
        order: 2,
    },
    CatalogueEntry {
        stop_id: 30221,
        station_id: 41160,
        name: "Clinton",
        line: Line::Green,
        order: 3,
    },
    CatalogueEntry {
        stop_id: 30057,
        station_id: 40290,
        name: "Ashland/63rd",
        line: Line::Green,
        order: 4,
    },
];

/// Every stop, grouped by line and ordered along it.
pub fn catalogue() -> &'static [CatalogueEntry] {
    CATALOGUE
}

/// Stops of one line in travel order.
pub fn line_stops(line: Line) -> Vec<CatalogueEntry> {
    let mut stops: Vec<CatalogueEntry> = CATALOGUE
        .iter()
        .copied()
        .filter(|e| e.line == line)
        .collect();
    stops.sort_by_key(|e| e.order);
    stops
}

impl CatalogueEntry {
    /// The record published on the stations topic for this stop.
    pub fn station(&self) -> Station {
        Station {
            stop_id: self.stop_id,
            direction_id: "N".to_string(),
            stop_name: format!("{} ({})", self.name, self.line),
            station_name: self.name.to_string(),
            station_descriptive_name: format!("{} ({} line)", self.name, self.line),
            station_id: self.station_id,
            order: self.order,
            red: self.line == Line::Red,
            blue: self.line == Line::Blue,
            green: self.line == Line::Green,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use transit_shared::topic_safe_station_name;

    #[test]
    fn test_stations_classify_to_their_line() {
        for entry in catalogue() {
            assert_eq!(entry.station().line(), entry.line, "{}", entry.name);
        }
    }

    #[test]
    fn test_topic_names_are_distinct() {
        let names: HashSet<String> = catalogue()
            .iter()
            .map(|e| topic_safe_station_name(e.name))
            .collect();
        assert_eq!(names.len(), catalogue().len());
        assert!(names.contains("ohare"));
        assert!(names.contains("95th_and_dan_ryan"));
    }

    #[test]
    fn test_line_stops_in_order() {
        let orders: Vec<i32> = line_stops(Line::Red).iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert!(line_stops(Line::Unknown).is_empty());
    }
}
