use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Event;

/// Envelope for an event, carrying stream metadata.
///
/// This is the unit a store appends to an aggregate stream. `sequence_number`
/// is the aggregate version the event produced (1 for the first event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_id: Uuid,
    aggregate_type: String,
    event_type: String,
    sequence_number: u64,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: payload.event_type().to_string(),
            sequence_number,
            payload,
        }
    }

    /// Wrap a batch of freshly decided events, numbering them after `base_version`.
    pub fn seal_all(
        aggregate_id: Uuid,
        aggregate_type: &str,
        base_version: u64,
        events: impl IntoIterator<Item = E>,
    ) -> Vec<Self> {
        events
            .into_iter()
            .zip(base_version + 1..)
            .map(|(event, seq)| Self::new(aggregate_id, aggregate_type, seq, event))
            .collect()
    }
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Marked(u8);

    impl Event for Marked {
        fn event_type(&self) -> &'static str {
            "test.marked"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            DateTime::<Utc>::MIN_UTC
        }
    }

    #[test]
    fn seal_all_numbers_after_base_version() {
        let stream = Uuid::now_v7();
        let sealed = EventEnvelope::seal_all(stream, "test", 4, [Marked(1), Marked(2), Marked(3)]);

        let numbers: Vec<u64> = sealed.iter().map(EventEnvelope::sequence_number).collect();
        assert_eq!(numbers, vec![5, 6, 7]);
        assert!(sealed.iter().all(|e| e.aggregate_id() == stream));
        assert!(sealed.iter().all(|e| e.event_type() == "test.marked"));
        assert_eq!(sealed[1].payload(), &Marked(2));
        assert_ne!(sealed[0].event_id(), sealed[1].event_id());
    }

    #[test]
    fn first_event_of_a_new_stream_is_one() {
        let sealed = EventEnvelope::seal_all(Uuid::now_v7(), "test", 0, [Marked(9)]);
        assert_eq!(sealed.len(), 1);
        assert_eq!(sealed[0].sequence_number(), 1);
        assert_eq!(sealed[0].aggregate_type(), "test");
        assert_eq!(sealed.into_iter().next().map(EventEnvelope::into_payload), Some(Marked(9)));
    }

    #[test]
    fn empty_batch_seals_nothing() {
        let sealed = EventEnvelope::<Marked>::seal_all(Uuid::now_v7(), "test", 3, []);
        assert!(sealed.is_empty());
    }
}
