//! Property-based tests: every overlay against a `VecDeque` model.
//!
//! A random sequence of operations runs on a single thread against both the
//! ring buffer and a bounded queue model. After every step the two must agree
//! on contents, length, and discard count.

use proptest::prelude::*;
use ringbuffer_rs::{BuildError, Cardinality, DynReader, DynWriter, OverlayKind, RingConfig};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Publish(u32),
    PublishBatch(Vec<u32>),
    TryConsume,
    ConsumeUpTo(usize),
    ConsumeLatest,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::Publish),
        1 => prop::collection::vec(any::<u32>(), 0..6).prop_map(Op::PublishBatch),
        2 => Just(Op::TryConsume),
        1 => (0usize..10).prop_map(Op::ConsumeUpTo),
        1 => Just(Op::ConsumeLatest),
    ]
}

fn cardinality() -> impl Strategy<Value = Cardinality> {
    prop_oneof![Just(Cardinality::One), Just(Cardinality::Many)]
}

fn overlay() -> impl Strategy<Value = OverlayKind> {
    prop_oneof![
        Just(OverlayKind::Clearing),
        Just(OverlayKind::Blocking),
        Just(OverlayKind::Discarding),
        Just(OverlayKind::Fast),
    ]
}

/// Bounded FIFO with the overlay's full-buffer policy.
struct Model {
    capacity: usize,
    overlay: OverlayKind,
    items: VecDeque<u32>,
    discarded: u64,
}

impl Model {
    /// Whether a write of `n` elements completes without another thread.
    fn accepts(&self, n: usize) -> bool {
        match self.overlay {
            OverlayKind::Discarding => n <= self.capacity,
            _ => self.items.len() + n <= self.capacity,
        }
    }

    fn push(&mut self, value: u32) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
            self.discarded += 1;
        }
        self.items.push_back(value);
    }
}

fn apply(op: Op, model: &mut Model, w: &mut DynWriter<u32>, r: &mut DynReader<u32>) -> Result<(), TestCaseError> {
    match op {
        Op::Publish(v) => {
            if model.accepts(1) {
                prop_assert!(w.publish(v).is_ok());
                model.push(v);
            } else if model.overlay == OverlayKind::Clearing {
                let err = w.publish(v).unwrap_err();
                prop_assert!(err.error().is_full());
                prop_assert_eq!(err.into_inner(), v);
            }
        }
        Op::PublishBatch(items) => {
            if items.len() > model.capacity {
                prop_assert!(w.publish_batch(&items).is_err());
            } else if model.accepts(items.len()) {
                prop_assert!(w.publish_batch(&items).is_ok());
                for v in items {
                    model.push(v);
                }
            } else if model.overlay == OverlayKind::Clearing && !items.is_empty() {
                prop_assert!(w.publish_batch(&items).unwrap_err().is_full());
            }
        }
        Op::TryConsume => {
            prop_assert_eq!(r.try_consume(), model.items.pop_front());
        }
        Op::ConsumeUpTo(max) => {
            let mut got = Vec::new();
            let n = r.consume_up_to(max, |v| got.push(v));
            let take = max.min(model.items.len());
            let expected: Vec<u32> = model.items.drain(..take).collect();
            prop_assert_eq!(n, expected.len());
            prop_assert_eq!(got, expected);
        }
        Op::ConsumeLatest => {
            if let Some(&last) = model.items.back() {
                prop_assert_eq!(r.consume_latest().unwrap(), last);
                model.items.clear();
            }
        }
    }
    Ok(())
}

proptest! {
    /// Contents, order, and length always match the model.
    #[test]
    fn prop_matches_queue_model(
        capacity_log in 1u32..5,
        writers in cardinality(),
        readers in cardinality(),
        overlay in overlay(),
        ops in prop::collection::vec(op(), 1..120),
    ) {
        let capacity = 1usize << capacity_log;
        let (mut w, mut r) = RingConfig::new(capacity)
            .with_writers(writers)
            .with_readers(readers)
            .with_overlay(overlay)
            .build::<u32>()
            .unwrap();
        let mut model = Model { capacity, overlay, items: VecDeque::new(), discarded: 0 };

        for op in ops {
            apply(op, &mut model, &mut w, &mut r)?;
            prop_assert_eq!(r.len(), model.items.len());
            prop_assert!(w.len() <= capacity);
            prop_assert_eq!(w.discarded(), model.discarded);
        }

        let mut rest = Vec::new();
        r.consume_up_to(capacity, |v| rest.push(v));
        prop_assert_eq!(rest, Vec::from(model.items));
    }

    /// Non power-of-two capacities work for every overlay but the lock-free one.
    #[test]
    fn prop_capacity_validation(capacity in 0usize..300, overlay in overlay()) {
        let result = RingConfig::new(capacity)
            .with_writers(Cardinality::One)
            .with_readers(Cardinality::One)
            .with_overlay(overlay)
            .build::<u8>();

        if capacity < 2 {
            prop_assert_eq!(result.unwrap_err(), BuildError::CapacityTooSmall { capacity });
        } else if overlay == OverlayKind::Fast && !capacity.is_power_of_two() {
            prop_assert_eq!(result.unwrap_err(), BuildError::CapacityNotPowerOfTwo { capacity });
        } else {
            let (w, _r) = result.unwrap();
            prop_assert_eq!(w.capacity(), capacity);
        }
    }

    /// Arbitrary capacities wrap correctly over many laps.
    #[test]
    fn prop_wraps_any_capacity(capacity in 2usize..40, laps in 1usize..6) {
        let (mut w, mut r) = RingConfig::new(capacity)
            .with_writers(Cardinality::One)
            .with_readers(Cardinality::One)
            .build::<usize>()
            .unwrap();

        let mut next = 0;
        for _ in 0..laps {
            for i in 0..capacity {
                w.publish(next + i).unwrap();
            }
            prop_assert!(w.is_full());
            for i in 0..capacity {
                prop_assert_eq!(r.try_consume(), Some(next + i));
            }
            next += capacity;
        }
        prop_assert!(r.is_empty());
    }
}

#[test]
fn test_power_of_two_examples() {
    let fast = RingConfig::new(100)
        .with_writers(Cardinality::Many)
        .with_readers(Cardinality::One)
        .with_overlay(OverlayKind::Fast);
    assert_eq!(
        fast.build::<u64>().unwrap_err(),
        BuildError::CapacityNotPowerOfTwo { capacity: 100 }
    );
    assert!(fast.with_capacity(128).build::<u64>().is_ok());
}
