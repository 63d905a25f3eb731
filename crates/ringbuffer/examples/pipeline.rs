//! Two-stage pipeline: many producers feed a blocking ring, a pool of workers
//! drains it and forwards results through a discarding "latest value" ring.
//!
//! Run with `RUST_LOG=ringbuffer_rs=trace cargo run --example pipeline` to
//! see construction and discard events.

use ringbuffer_rs::wait::{escalating, Interruptible, Side};
use ringbuffer_rs::RingBufferBuilder;
use std::thread;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const N_PRODUCERS: u64 = 4;
const N_WORKERS: usize = 3;
const PER_PRODUCER: u64 = 250_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("ringbuffer-rs Pipeline Example");
    println!("==============================\n");

    let read_wait = Interruptible::new(Side::Reading, escalating());
    let stop_workers = read_wait.interrupter();

    let (jobs_tx, jobs_rx) = RingBufferBuilder::with_capacity(1 << 12)
        .many_writers()
        .many_readers()
        .blocking()
        .waiting_with(read_wait)
        .build()
        .expect("valid capacity");

    let (mut latest_tx, mut latest_rx) = RingBufferBuilder::with_capacity(8)
        .many_writers()
        .one_reader()
        .discarding()
        .build()
        .expect("valid capacity");

    println!("Configuration:");
    println!("  Jobs ring: {:?}", jobs_tx);
    println!("  Producers: {}", N_PRODUCERS);
    println!("  Workers: {}", N_WORKERS);
    println!("  Total jobs: {}\n", N_PRODUCERS * PER_PRODUCER);

    let start = Instant::now();

    let producers: Vec<_> = (0..N_PRODUCERS)
        .map(|id| {
            let mut tx = jobs_tx.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    tx.publish(id * PER_PRODUCER + i).expect("blocking publish");
                }
            })
        })
        .collect();
    drop(jobs_tx);

    let workers: Vec<_> = (0..N_WORKERS)
        .map(|_| {
            let mut rx = jobs_rx.clone();
            let mut out = latest_tx.clone();
            thread::spawn(move || {
                let mut handled = 0u64;
                let mut sum = 0u64;
                // Runs until interrupted
                while let Ok(job) = rx.consume() {
                    sum += job;
                    handled += 1;
                    if handled % 10_000 == 0 {
                        out.publish(handled).expect("discarding publish");
                    }
                }
                (handled, sum)
            })
        })
        .collect();

    for p in producers {
        p.join().expect("producer panicked");
    }
    while !jobs_rx.is_empty() {
        thread::yield_now();
    }
    // Each interrupt stops the one worker that observes it
    while workers.iter().any(|w| !w.is_finished()) {
        stop_workers.interrupt();
        thread::yield_now();
    }

    let mut handled = 0;
    let mut sum = 0;
    for w in workers {
        let (h, s) = w.join().expect("worker panicked");
        handled += h;
        sum += s;
    }
    latest_tx.publish(handled).expect("discarding publish");

    let elapsed = start.elapsed();
    let total = N_PRODUCERS * PER_PRODUCER;

    println!("Results:");
    println!("  Jobs handled: {}", handled);
    println!("  Sum check: {}", sum == total * (total - 1) / 2);
    println!("  Latest progress report: {:?}", latest_rx.consume_latest().ok());
    println!("  Progress reports discarded: {}", latest_tx.discarded());
    println!("  Time: {:.2?}", elapsed);
    println!(
        "  Throughput: {:.2} M jobs/sec",
        handled as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}
