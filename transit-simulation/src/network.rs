//! Trains shuttling along the lines of the catalogue.

use rand::Rng;
use tracing::debug;

use crate::catalogue::{line_stops, CatalogueEntry};
use transit_shared::{Arrival, Direction, Line, TrainStatus};

/// Chance a train breaks down on a given tick.
const BREAKDOWN_PROBABILITY: f64 = 0.02;

/// Lines the simulation runs, in the order trains are numbered.
const LINES: [Line; 3] = [Line::Blue, Line::Red, Line::Green];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Train {
    pub train_id: String,
    pub status: TrainStatus,
    line_index: usize,
    position: usize,
    direction: Direction,
}

/// A train arriving at a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopArrival {
    pub stop: CatalogueEntry,
    pub arrival: Arrival,
}

/// The lines of the catalogue and the trains running on them.
#[derive(Debug, Clone)]
pub struct Network {
    lines: Vec<(Line, Vec<CatalogueEntry>)>,
    trains: Vec<Train>,
}

impl Network {
    /// Spread `trains_per_line` trains evenly along every line, all heading
    /// in direction A.
    pub fn new(trains_per_line: usize) -> Self {
        let lines: Vec<(Line, Vec<CatalogueEntry>)> = LINES
            .iter()
            .map(|line| (*line, line_stops(*line)))
            .filter(|(_, stops)| !stops.is_empty())
            .collect();

        let mut trains = Vec::new();
        for (line_index, (line, stops)) in lines.iter().enumerate() {
            for n in 0..trains_per_line {
                trains.push(Train {
                    train_id: format!("{}{:03}", train_prefix(*line), n + 1),
                    status: TrainStatus::InService,
                    line_index,
                    position: n * stops.len() / trains_per_line.max(1),
                    direction: Direction::A,
                });
            }
        }

        Self { lines, trains }
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    /// Every stop on every line.
    pub fn stops(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.lines.iter().flat_map(|(_, stops)| stops.iter())
    }

    /// Move every running train one stop, reversing at the terminals.
    ///
    /// A train that breaks down stays where it is and produces no arrival.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> Vec<StopArrival> {
        let mut arrivals = Vec::with_capacity(self.trains.len());

        for train in &mut self.trains {
            if rng.gen_bool(BREAKDOWN_PROBABILITY) {
                train.status = TrainStatus::BrokenDown;
                debug!(train_id = %train.train_id, "Train broke down");
                continue;
            }
            train.status = TrainStatus::InService;

            let (line, stops) = &self.lines[train.line_index];
            let previous = stops[train.position];
            let previous_direction = train.direction;

            let (position, direction) = next_stop(train.position, train.direction, stops.len());
            train.position = position;
            train.direction = direction;

            let stop = stops[position];
            let arrival = Arrival::new(
                stop.station_id,
                train.train_id.clone(),
                direction,
                *line,
                train.status,
            )
            .from_previous(previous.station_id, previous_direction);

            arrivals.push(StopArrival { stop, arrival });
        }

        arrivals
    }
}

fn next_stop(position: usize, direction: Direction, stops: usize) -> (usize, Direction) {
    if stops < 2 {
        return (position, direction);
    }
    match direction {
        Direction::A if position + 1 < stops => (position + 1, Direction::A),
        Direction::A => (position - 1, Direction::B),
        Direction::B if position > 0 => (position - 1, Direction::B),
        Direction::B => (position + 1, Direction::A),
    }
}

fn train_prefix(line: Line) -> &'static str {
    match line {
        Line::Blue => "BL",
        Line::Red => "RL",
        Line::Green => "GL",
        Line::Unknown => "XX",
    }
}
