//! # Coordinator: owns the buffer signals and drives the shutdown protocol.
//!
//! The [`Coordinator`] owns the event bus, a [`SubscriberSet`] and the run
//! configuration. It runs the blocking protocol on a tokio blocking thread while
//! a listener task fans events out to subscribers.
//!
//! ## Protocol
//! ```text
//! drive(cfg, bus):
//!   ├─► deadlock_risk()?           ─► publish DeadlockRisk (warn, keep going)
//!   ├─► BufferSignals::new         mutex(1) full(0) empty(capacity)
//!   ├─► spawn producer-0..P        each loops until the stop flag is set
//!   ├─► spawn consumer-0..C        each loops until its own quota is met
//!   ├─► join consumers             ─► publish ConsumersDone
//!   ├─► stop.cancel()
//!   ├─► empty.signal(P)            ─► publish ProducersReleased
//!   ├─► join producers             ─► publish AllDone
//!   └─► drop signals               ─► publish SignalsReleased
//! ```
//!
//! ## Rules
//! - The join → stop → release → join order is fixed.
//! - A parked producer cannot see the stop flag; the release gives each
//!   producer exactly one more slot so it can wake up and exit.
//! - Nothing times out. A configuration that cannot produce what consumers
//!   expect hangs forever after a `DeadlockRisk` warning.
//! - Failing to create signals or spawn a worker is fatal; workers already
//!   running are left to the process exit.
//!
//! ## Event flow
//! ```text
//!   workers/drive ── publish(Event) ──► Bus sink ──► listener ──► SubscriberSet::emit
//!                                                      │
//!                                      Bus dropped ────┴──► SubscriberSet::shutdown (drain)
//! ```
//!
//! The sink is bounded and publishing waits for room, so a slow subscriber
//! slows the workers down rather than losing events.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use semvisor::{Config, Coordinator};
//!
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         capacity: 2,
//!         producers: 2,
//!         consumers: 2,
//!         consumer_quota: 5,
//!         producer_delay: Duration::ZERO,
//!         consumer_delay: Duration::ZERO,
//!         ..Config::default()
//!     };
//!
//!     let report = Coordinator::builder(cfg).build().run().await?;
//!     assert_eq!(report.total_consumed(), 10);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    subscribers::SubscriberSet,
    sync::BufferSignals,
};

use super::{
    builder::CoordinatorBuilder,
    consumer::Consumer,
    producer::Producer,
    report::RunReport,
    worker::{self, Role, WorkerHandle},
};

/// Runs one producer/consumer session and delivers its events to subscribers.
pub struct Coordinator {
    cfg: Config,
    bus: Bus,
    sink: Option<mpsc::Receiver<Event>>,
    subs: SubscriberSet,
}

impl Coordinator {
    /// Starts building a coordinator for `cfg`.
    pub fn builder(cfg: Config) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        sink: Option<mpsc::Receiver<Event>>,
        subs: SubscriberSet,
    ) -> Self {
        Self {
            cfg,
            bus,
            sink,
            subs,
        }
    }

    /// Configuration this coordinator will run with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs the protocol to completion.
    ///
    /// Returns once every worker has been joined, the signals are released and
    /// every subscriber has processed every event. On a startup failure the
    /// subscribers are abandoned and the error is returned immediately.
    pub async fn run(self) -> Result<RunReport, RuntimeError> {
        let Self {
            cfg,
            bus,
            sink,
            subs,
        } = self;
        let listener = sink.map(|rx| spawn_listener(rx, subs));

        let joined = tokio::task::spawn_blocking(move || drive(&cfg, &bus)).await;
        let res = joined.unwrap_or_else(|e| {
            Err(RuntimeError::Protocol {
                reason: e.to_string(),
            })
        });

        if let Some(listener) = listener {
            match &res {
                Ok(_) | Err(RuntimeError::WorkerPanicked { .. }) => {
                    let _ = listener.await;
                }
                Err(_) => listener.abort(),
            }
        }
        res
    }
}

/// Forwards sink events to the subscriber set until every publisher is gone,
/// then drains the subscriber queues.
fn spawn_listener(mut rx: mpsc::Receiver<Event>, subs: SubscriberSet) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            subs.emit(ev).await;
        }
        subs.shutdown().await;
    })
}

/// Runs the blocking protocol on the calling thread.
///
/// Publishes item events and milestones to `bus`. Blocks forever on a
/// configuration that cannot finish (see [`Config::deadlock_risk`]).
pub fn drive(cfg: &Config, bus: &Bus) -> Result<RunReport, RuntimeError> {
    let started = Instant::now();

    if let Some(reason) = cfg.deadlock_risk() {
        bus.publish(Event::new(EventKind::DeadlockRisk).with_reason(reason));
    }

    let signals = Arc::new(BufferSignals::new(cfg.capacity, cfg.producers)?);
    let stop = CancellationToken::new();

    let producers = spawn_producers(cfg, bus, &signals, &stop)?;
    let consumers = spawn_consumers(cfg, bus, &signals)?;

    let (consumed, consumer_err) = join_all(consumers);
    bus.publish(Event::new(EventKind::ConsumersDone));

    stop.cancel();
    signals.release_producers(cfg.producers);
    bus.publish(Event::new(EventKind::ProducersReleased).with_count(cfg.producers as u64));

    let (produced, producer_err) = join_all(producers);
    bus.publish(Event::new(EventKind::AllDone));

    let occupancy = signals.occupancy();
    let signals = Arc::try_unwrap(signals).map_err(|_| RuntimeError::SignalsInUse)?;
    drop(signals);
    bus.publish(Event::new(EventKind::SignalsReleased));

    if let Some(e) = consumer_err.or(producer_err) {
        return Err(e);
    }

    Ok(RunReport {
        produced,
        consumed,
        released: cfg.producers,
        peak_in_flight: occupancy.peak_in_flight,
        peak_critical: occupancy.peak_critical,
        elapsed: started.elapsed(),
    })
}

fn spawn_producers(
    cfg: &Config,
    bus: &Bus,
    signals: &Arc<BufferSignals>,
    stop: &CancellationToken,
) -> Result<Vec<WorkerHandle>, RuntimeError> {
    (0..cfg.producers)
        .map(|index| {
            let producer = Producer {
                index,
                signals: Arc::clone(signals),
                bus: bus.clone(),
                stop: stop.clone(),
                delay: cfg.producer_delay,
            };
            worker::spawn(Role::Producer, index, move || producer.run())
        })
        .collect()
}

fn spawn_consumers(
    cfg: &Config,
    bus: &Bus,
    signals: &Arc<BufferSignals>,
) -> Result<Vec<WorkerHandle>, RuntimeError> {
    (0..cfg.consumers)
        .map(|index| {
            let consumer = Consumer {
                index,
                signals: Arc::clone(signals),
                bus: bus.clone(),
                quota: cfg.consumer_quota,
                delay: cfg.consumer_delay,
            };
            worker::spawn(Role::Consumer, index, move || consumer.run())
        })
        .collect()
}

/// Joins every handle; a panicked worker counts as zero and the first such
/// failure is returned alongside the totals.
fn join_all(handles: Vec<WorkerHandle>) -> (Vec<u64>, Option<RuntimeError>) {
    let mut totals = Vec::with_capacity(handles.len());
    let mut first_err = None;
    for h in handles {
        match h.join() {
            Ok(n) => totals.push(n),
            Err(e) => {
                totals.push(0);
                first_err.get_or_insert(e);
            }
        }
    }
    (totals, first_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::Subscribe;
    use crate::sync::CountingSignal;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::mpsc as std_mpsc;
    use std::thread;
    use tokio::sync::broadcast;
    use std::time::Duration;

    fn fast(capacity: usize, producers: usize, consumers: usize, quota: u64) -> Config {
        Config {
            capacity,
            producers,
            consumers,
            consumer_quota: quota,
            producer_delay: Duration::ZERO,
            consumer_delay: Duration::ZERO,
            silent: true,
            report: false,
            bus_capacity: 1 << 16,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn position(events: &[Event], kind: EventKind) -> usize {
        events
            .iter()
            .position(|e| e.kind == kind)
            .unwrap_or_else(|| panic!("{kind:?} not published"))
    }

    #[test]
    fn test_single_slot_alternates_produce_and_consume() {
        let cfg = fast(1, 1, 1, 3);
        let bus = Bus::new(cfg.bus_capacity);
        let mut rx = bus.subscribe();

        let report = drive(&cfg, &bus).unwrap();
        let events = drain(&mut rx);

        assert_eq!(report.consumed, vec![3]);
        assert!(report.total_produced() >= 3);
        assert!(report.total_produced() <= 3 + 1 + 1);

        let done = position(&events, EventKind::ConsumersDone);
        let before: Vec<EventKind> = events[..done]
            .iter()
            .filter(|e| e.is_item())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            &before[..6],
            &[
                EventKind::ItemProduced,
                EventKind::ItemConsumed,
                EventKind::ItemProduced,
                EventKind::ItemConsumed,
                EventKind::ItemProduced,
                EventKind::ItemConsumed,
            ]
        );
        assert!(before[6..].iter().all(|k| *k == EventKind::ItemProduced));
    }

    #[test]
    fn test_quota_is_per_consumer() {
        let cfg = fast(3, 4, 5, 20);
        let bus = Bus::new(cfg.bus_capacity);
        let mut rx = bus.subscribe();

        let report = drive(&cfg, &bus).unwrap();
        let events = drain(&mut rx);

        assert_eq!(report.consumed, vec![20; 5]);
        assert_eq!(report.total_consumed(), cfg.expected_consumption());
        assert_eq!(report.produced.len(), 4);

        let consumed_events = events
            .iter()
            .filter(|e| e.kind == EventKind::ItemConsumed)
            .count() as u64;
        let produced_events = events
            .iter()
            .filter(|e| e.kind == EventKind::ItemProduced)
            .count() as u64;
        assert_eq!(consumed_events, 100);
        assert_eq!(produced_events, report.total_produced());

        for index in 0..5 {
            let last = events
                .iter()
                .filter(|e| e.kind == EventKind::ItemConsumed && e.worker == Some(index))
                .filter_map(|e| e.count)
                .max();
            assert_eq!(last, Some(20));
        }
    }

    #[test]
    fn test_buffer_invariants_hold() {
        let cfg = fast(4, 6, 3, 50);
        let bus = Bus::new(cfg.bus_capacity);

        let report = drive(&cfg, &bus).unwrap();

        assert_eq!(report.peak_critical, 1);
        assert!(report.peak_in_flight <= cfg.capacity as u64);
        assert!(report.total_produced() >= report.total_consumed());
        assert!(
            report.total_produced()
                <= report.total_consumed() + cfg.capacity as u64 + cfg.producers as u64
        );
    }

    #[test]
    fn test_consumed_never_outruns_produced() {
        let cfg = fast(2, 3, 3, 40);
        let bus = Bus::new(cfg.bus_capacity);
        let mut rx = bus.subscribe();

        drive(&cfg, &bus).unwrap();

        let mut balance: i64 = 0;
        for ev in drain(&mut rx) {
            match ev.kind {
                EventKind::ItemProduced => balance += 1,
                EventKind::ItemConsumed => balance -= 1,
                _ => {}
            }
            assert!(balance >= 0, "consumed before produced at seq {}", ev.seq);
        }
    }

    #[test]
    fn test_shutdown_releases_one_slot_per_producer() {
        let cfg = fast(1, 5, 1, 2);
        let bus = Bus::new(cfg.bus_capacity);
        let mut rx = bus.subscribe();

        let report = drive(&cfg, &bus).unwrap();
        let events = drain(&mut rx);

        assert_eq!(report.released, 5);
        let released = &events[position(&events, EventKind::ProducersReleased)];
        assert_eq!(released.count, Some(5));

        let kinds: Vec<EventKind> = events
            .iter()
            .filter(|e| !e.is_item())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ConsumersDone,
                EventKind::ProducersReleased,
                EventKind::AllDone,
                EventKind::SignalsReleased,
            ]
        );

        // Each producer makes at most one item from a released slot.
        let after = position(&events, EventKind::ProducersReleased);
        let late = events[after..]
            .iter()
            .filter(|e| e.kind == EventKind::ItemProduced)
            .count();
        assert!(late <= cfg.producers);
    }

    #[test]
    fn test_no_consumers_still_stops_producers() {
        let cfg = fast(2, 2, 0, 10);
        let bus = Bus::new(cfg.bus_capacity);

        let report = drive(&cfg, &bus).unwrap();

        assert!(report.consumed.is_empty());
        assert!(report.total_produced() <= 2 + 2);
    }

    #[test]
    fn test_zero_quota_consumers_exit_immediately() {
        let report = drive(&fast(2, 1, 3, 0), &Bus::new(16)).unwrap();
        assert_eq!(report.consumed, vec![0, 0, 0]);
    }

    #[test]
    fn test_consumer_delay_is_applied_per_item() {
        let cfg = Config {
            consumer_delay: Duration::from_millis(10),
            ..fast(1, 1, 1, 3)
        };
        let report = drive(&cfg, &Bus::new(64)).unwrap();
        assert!(report.elapsed >= Duration::from_millis(30));
    }

    #[test]
    fn test_without_producers_the_run_never_finishes() {
        let cfg = fast(1, 0, 1, 1);
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (tx, done) = std_mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(drive(&cfg, &bus).is_ok());
        });

        assert!(matches!(
            done.recv_timeout(Duration::from_millis(300)),
            Err(std_mpsc::RecvTimeoutError::Timeout)
        ));
        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::DeadlockRisk);
        assert!(first.reason.is_some());
    }

    #[test]
    fn test_oversized_buffer_fails_before_spawning() {
        let cfg = fast(CountingSignal::MAX_COUNT, 1, 1, 1);
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        let err = drive(&cfg, &bus).unwrap_err();

        assert!(matches!(err, RuntimeError::Signal(_)));
        assert!(err.is_startup());
        assert!(drain(&mut rx).is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.clone());
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn queue_capacity(&self) -> usize {
            1 << 16
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_delivers_every_event_before_returning() {
        let rec = Arc::new(Recorder::default());
        let coordinator = Coordinator::builder(fast(2, 2, 2, 10))
            .with_subscriber(rec.clone())
            .build();
        assert_eq!(coordinator.config().consumers, 2);

        let report = coordinator.run().await.unwrap();

        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen.last().map(|e| e.kind), Some(EventKind::SignalsReleased));
        let consumed = seen
            .iter()
            .filter(|e| e.kind == EventKind::ItemConsumed)
            .count() as u64;
        assert_eq!(consumed, report.total_consumed());
        assert_eq!(consumed, 20);

        // Item events are published under the mutex signal, so they arrive in seq order.
        let items: Vec<u64> = seen.iter().filter(|e| e.is_item()).map(|e| e.seq).collect();
        assert!(items.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_surfaces_startup_failure() {
        let cfg = fast(CountingSignal::MAX_COUNT + 1, 1, 1, 1);
        let coordinator = Coordinator::builder(cfg)
            .with_subscriber(Arc::new(Recorder::default()))
            .build();
        let err = coordinator.run().await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_signal");
    }

    struct Sluggish {
        seen: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl Subscribe for Sluggish {
        async fn on_event(&self, ev: &Event) {
            tokio::task::yield_now().await;
            self.seen.lock().unwrap().push(ev.clone());
        }
        fn name(&self) -> &'static str {
            "sluggish"
        }
        fn queue_capacity(&self) -> usize {
            2
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_subscriber_sees_every_event_under_load() {
        let sluggish = Arc::new(Sluggish {
            seen: Mutex::new(Vec::new()),
        });
        let cfg = Config {
            bus_capacity: 4,
            ..fast(8, 10, 10, 200)
        };

        let report = Coordinator::builder(cfg)
            .with_subscriber(sluggish.clone())
            .build()
            .run()
            .await
            .unwrap();

        let seen = sluggish.seen.lock().unwrap();
        let count = |kind: EventKind| seen.iter().filter(|e| e.kind == kind).count() as u64;
        assert_eq!(count(EventKind::ItemConsumed), 2000);
        assert_eq!(count(EventKind::ItemProduced), report.total_produced());
        assert_eq!(count(EventKind::ConsumersDone), 1);
        assert_eq!(count(EventKind::AllDone), 1);
        assert_eq!(count(EventKind::SignalsReleased), 1);

        let done = seen
            .iter()
            .position(|e| e.kind == EventKind::ConsumersDone)
            .unwrap();
        assert!(seen[done..].iter().all(|e| e.kind != EventKind::ItemConsumed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_without_subscribers_needs_no_listener() {
        let report = Coordinator::builder(fast(2, 3, 3, 30)).build().run().await.unwrap();
        assert_eq!(report.total_consumed(), 90);
    }
}
