//! Compares read-side wait strategies on a slow producer, and shows a custom
//! multi-step escalation with an external wake-up.

use ringbuffer_rs::wait::{
    escalating, BusyWaitStrategy, Hint, MultiStep, Park, Sleep, Wakeupable, Yield,
};
use ringbuffer_rs::RingBufferBuilder;
use std::thread;
use std::time::{Duration, Instant};

const MESSAGES: u32 = 200;
const GAP: Duration = Duration::from_micros(200);

fn run<S: BusyWaitStrategy>(name: &str, strategy: S) {
    let (mut writer, mut reader) = RingBufferBuilder::with_capacity(64)
        .one_writer()
        .one_reader()
        .blocking()
        .waiting_with(strategy)
        .build()
        .expect("valid capacity");

    let producer = thread::spawn(move || {
        for i in 0..MESSAGES {
            thread::sleep(GAP);
            writer.publish(i).expect("blocking publish");
        }
    });

    let start = Instant::now();
    let mut last = 0;
    for _ in 0..MESSAGES {
        last = reader.consume().expect("never interrupted");
    }
    producer.join().expect("producer panicked");

    println!("  {:<12} last={:<4} elapsed={:.2?}", name, last, start.elapsed());
}

fn main() {
    println!("ringbuffer-rs Wait Strategy Example");
    println!("===================================\n");

    println!("Read-side strategies ({} messages, {:?} apart):", MESSAGES, GAP);
    run("hint", Hint);
    run("yield", Yield);
    run("park", Park::default());
    run("sleep", Sleep::new(Duration::from_micros(50)));
    run("escalating", escalating());

    // 1000 spins, 100 yields, then park; a waker cuts a bounded wait short
    let custom = MultiStep::end_with(Park::new(Duration::from_micros(20)))
        .after(Yield, 100)
        .after(Hint, 1_000)
        .build()
        .expect("two intermediate steps");
    println!("\nCustom escalation ticks per step: {:?}", custom.step_ticks());
    run("custom", custom);

    let wakeable = Wakeupable::with_inner(10_000, Yield);
    let waker = wakeable.waker();
    let (mut writer, mut reader) = RingBufferBuilder::with_capacity(4)
        .one_writer()
        .one_reader()
        .waiting_with(wakeable)
        .build()
        .expect("valid capacity");

    let consumer = thread::spawn(move || reader.consume().expect("never interrupted"));
    thread::sleep(Duration::from_millis(5));
    writer.publish(42).expect("buffer has room");
    waker.wakeup();
    println!("Woken consumer received {}", consumer.join().expect("consumer panicked"));
}
