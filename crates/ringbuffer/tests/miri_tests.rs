//! Miri-compatible tests for detecting undefined behavior.
//!
//! Run with: `cargo +nightly miri test --test miri_tests`
//!
//! Miri is an interpreter for Rust's MIR that detects undefined behavior:
//! - Use of uninitialized memory
//! - Out-of-bounds memory access
//! - Use-after-free and double drops
//! - Data races
//!
//! These tests exercise the unsafe slot handling of every overlay with small
//! capacities and heap-owning element types, so a leaked, doubly-dropped or
//! uninitialized slot shows up as an error.

use ringbuffer_rs::RingBufferBuilder;
use std::sync::Arc;
use std::thread;

/// Basic publish/consume with an owning element type.
#[test]
fn miri_basic_operations() {
    let (mut w, mut r) = RingBufferBuilder::with_capacity(4)
        .one_writer()
        .one_reader()
        .build()
        .unwrap();

    w.publish(String::from("a")).unwrap();
    w.publish(String::from("b")).unwrap();
    assert_eq!(r.consume().unwrap(), "a");
    assert_eq!(r.try_consume().as_deref(), Some("b"));
    assert!(r.try_consume().is_none());
}

/// Wrap-around over a non power-of-two capacity.
#[test]
fn miri_wrap_around() {
    let (mut w, mut r) = RingBufferBuilder::with_capacity(3)
        .one_writer()
        .one_reader()
        .build()
        .unwrap();

    for round in 0..4u32 {
        for i in 0..3 {
            w.publish(Box::new(round * 10 + i)).unwrap();
        }
        let mut count = 0;
        r.consume_up_to(8, |item| {
            assert_eq!(*item / 10, round);
            count += 1;
        });
        assert_eq!(count, 3);
    }
}

/// Discarding drops the overwritten elements exactly once.
#[test]
fn miri_discarding_drops_once() {
    let (mut w, mut r) = RingBufferBuilder::with_capacity(2)
        .one_writer()
        .one_reader()
        .discarding()
        .build()
        .unwrap();

    for i in 0..5 {
        w.publish(vec![i; 3]).unwrap();
    }
    assert_eq!(w.discarded(), 3);
    assert_eq!(r.consume().unwrap(), vec![3; 3]);
    assert_eq!(r.consume().unwrap(), vec![4; 3]);
}

/// The lock-free overlay across several laps.
#[test]
fn miri_fast_laps() {
    let (mut w, mut r) = RingBufferBuilder::with_capacity(2)
        .one_writer()
        .one_reader()
        .without_locks()
        .build()
        .unwrap();

    for i in 0..6 {
        w.publish(i.to_string()).unwrap();
        assert_eq!(r.consume().unwrap(), i.to_string());
    }
}

/// An abandoned claim drops only what it wrote.
#[test]
fn miri_abandoned_claim() {
    let (mut w, mut r) = RingBufferBuilder::with_capacity(4)
        .one_writer()
        .one_reader()
        .build()
        .unwrap();

    {
        let mut claim = w.claim(3).unwrap();
        claim.write(String::from("lost")).unwrap();
    }
    let mut claim = w.claim(2).unwrap();
    claim.write(String::from("kept")).unwrap();
    assert_eq!(claim.publish(), 1);

    assert_eq!(r.consume().unwrap(), "kept");
    assert!(r.is_empty());
}

/// Dropping the handles drops whatever is still buffered.
#[test]
fn miri_drop_with_unread_items() {
    let marker = Arc::new(());
    {
        let (mut w, _r) = RingBufferBuilder::with_capacity(4)
            .many_writers()
            .many_readers()
            .without_locks()
            .build()
            .unwrap();
        for _ in 0..3 {
            w.publish(Arc::clone(&marker)).unwrap();
        }
        assert_eq!(Arc::strong_count(&marker), 4);
    }
    assert_eq!(Arc::strong_count(&marker), 1);
}

/// Two writers and two readers on a tiny blocking ring.
#[test]
fn miri_concurrent_blocking() {
    let (w, r) = RingBufferBuilder::with_capacity(2)
        .many_writers()
        .many_readers()
        .blocking()
        .build()
        .unwrap();

    let writers: Vec<_> = (0..2u64)
        .map(|id| {
            let mut w = w.clone();
            thread::spawn(move || {
                for i in 0..5 {
                    w.publish(Box::new(id * 100 + i)).unwrap();
                }
            })
        })
        .collect();
    drop(w);

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let mut r = r.clone();
            thread::spawn(move || (0..5).map(|_| *r.consume().unwrap()).sum::<u64>())
        })
        .collect();

    for h in writers {
        h.join().unwrap();
    }
    let total: u64 = readers.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, (0..5).sum::<u64>() + (100..105).sum::<u64>());
}
