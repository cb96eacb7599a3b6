use super::types::{Batch, SimTime, StationId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What happens when a calendar entry comes due
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A batch reaches the first station's queue
    Arrival(Batch),
    /// A station completes its current service
    Departure(StationId),
}

#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub time: SimTime,
    pub sequence_num: u64,
    pub kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Future state transitions ordered by time, then by scheduling order
#[derive(Debug, Clone, Default)]
pub struct EventCalendar {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at absolute time `time`
    pub fn schedule(&mut self, time: SimTime, kind: EventKind) {
        self.event_queue.push(ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            kind,
        });
        self.sequence_counter += 1;
    }

    /// Time of the earliest pending event
    pub fn peek_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.time)
    }

    /// Remove the earliest pending event if it is due at or before `horizon`
    pub fn pop_due(&mut self, horizon: SimTime) -> Option<ScheduledEvent> {
        match self.peek_time() {
            Some(time) if time <= horizon => self.event_queue.pop(),
            _ => None,
        }
    }

    /// Time of the earliest pending arrival
    pub fn next_arrival_time(&self) -> Option<SimTime> {
        self.event_queue
            .iter()
            .filter(|event| matches!(event.kind, EventKind::Arrival(_)))
            .map(|event| event.time)
            .min_by(f64::total_cmp)
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departure(i: usize) -> EventKind {
        EventKind::Departure(StationId::new(i).unwrap())
    }

    fn batch(id: u64, t: SimTime) -> EventKind {
        EventKind::Arrival(Batch {
            id,
            size: 1,
            arrival_time: t,
        })
    }

    #[test]
    fn test_time_order() {
        let mut calendar = EventCalendar::new();
        calendar.schedule(3.0, departure(0));
        calendar.schedule(1.0, departure(1));
        calendar.schedule(2.0, departure(2));

        let times: Vec<_> = std::iter::from_fn(|| calendar.pop_due(f64::INFINITY))
            .map(|e| e.time)
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert!(calendar.is_empty());
    }

    #[test]
    fn test_ties_follow_scheduling_order() {
        let mut calendar = EventCalendar::new();
        calendar.schedule(5.0, departure(3));
        calendar.schedule(5.0, batch(1, 5.0));
        calendar.schedule(5.0, departure(0));

        assert_eq!(calendar.pop_due(5.0).unwrap().kind, departure(3));
        assert!(matches!(
            calendar.pop_due(5.0).unwrap().kind,
            EventKind::Arrival(_)
        ));
        assert_eq!(calendar.pop_due(5.0).unwrap().kind, departure(0));
    }

    #[test]
    fn test_pop_due_respects_horizon() {
        let mut calendar = EventCalendar::new();
        calendar.schedule(2.0, departure(0));
        assert!(calendar.pop_due(1.999).is_none());
        assert_eq!(calendar.len(), 1);
        assert!(calendar.pop_due(2.0).is_some());
    }

    #[test]
    fn test_next_arrival_time() {
        let mut calendar = EventCalendar::new();
        assert_eq!(calendar.next_arrival_time(), None);
        calendar.schedule(1.0, departure(0));
        calendar.schedule(7.0, batch(2, 7.0));
        calendar.schedule(4.0, batch(1, 4.0));
        assert_eq!(calendar.next_arrival_time(), Some(4.0));
        assert_eq!(calendar.peek_time(), Some(1.0));
    }
}
