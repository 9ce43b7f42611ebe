//! End-to-end dispatch behavior of the bus.

mod common;

use common::{Faulty, Ping, PingPong, Pong, Recorder, Sleeper, SlowEvent};
use kairo::{
    AnyMessage, EventBus, ListenerOptions, Message, Subscriber, Subscriptions,
    testing::{CallLog, CollectingObserver},
};
use std::{
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

#[test]
fn test_lower_priority_runs_first() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let h1 = Arc::new(Recorder::<5>::new("H1", &log));
    let h2 = Arc::new(Recorder::<1>::new("H2", &log));

    bus.register(&h1);
    bus.register(&h2);
    bus.post(Ping::default());

    assert_eq!(log.entries(), vec!["H2", "H1"]);
}

#[test]
fn test_equal_priorities_keep_registration_order() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let first = Arc::new(Recorder::<3>::new("first", &log));
    let second = Arc::new(Recorder::<3>::new("second", &log));
    let early = Arc::new(Recorder::<{ -1 }>::new("early", &log));

    bus.register(&first);
    bus.register(&second);
    bus.register(&early);
    bus.post(Ping::default());

    assert_eq!(log.entries(), vec!["early", "first", "second"]);
}

#[test]
fn test_unregistered_owner_is_never_invoked() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let h1 = Arc::new(Recorder::<0>::new("H1", &log));

    bus.register(&h1);
    bus.unregister(&h1);
    bus.post(Ping::default());

    assert!(log.is_empty());
    assert!(!bus.is_registered(&h1));
    assert_eq!(bus.handler_count::<Ping>(), 0);
}

#[test]
fn test_unregister_covers_every_event_type() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let both = Arc::new(PingPong { log: log.clone() });
    let other = Arc::new(Recorder::<0>::new("other", &log));

    bus.register(&both);
    bus.register(&other);
    assert_eq!(bus.handler_count::<Ping>(), 2);
    assert_eq!(bus.handler_count::<Pong>(), 1);

    bus.unregister(&both);
    bus.post(Ping { seq: 1 });
    bus.post(Pong);

    assert_eq!(log.entries(), vec!["other"]);
    assert_eq!(bus.handler_count::<Pong>(), 0);
}

#[test]
fn test_post_without_handlers_is_a_no_op() {
    let observer = CollectingObserver::new();
    let bus = EventBus::builder()
        .observer(observer.clone())
        .build()
        .unwrap();

    bus.post(Pong);

    assert_eq!(observer.count(), 0);
    assert!(bus.registry().is_empty());
    assert_eq!(bus.worker_count(), 0);
}

#[test]
fn test_failing_handler_does_not_stop_later_handlers() {
    let log = CallLog::new();
    let observer = CollectingObserver::new();
    let bus = EventBus::builder()
        .observer(observer.clone())
        .build()
        .unwrap();
    let h1 = Arc::new(Faulty {
        panics: false,
        log: log.clone(),
    });
    let h2 = Arc::new(Recorder::<1>::new("H2", &log));

    bus.register(&h2);
    bus.register(&h1);
    bus.post(Ping::default());

    assert_eq!(log.entries(), vec!["faulty", "H2"]);
    let failures = observer.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("faulty handler failed"));
}

#[test]
fn test_panicking_handler_does_not_stop_later_handlers() {
    let log = CallLog::new();
    let observer = CollectingObserver::new();
    let bus = EventBus::builder()
        .observer(observer.clone())
        .build()
        .unwrap();
    let h1 = Arc::new(Faulty {
        panics: true,
        log: log.clone(),
    });
    let h2 = Arc::new(Recorder::<1>::new("H2", &log));

    bus.register(&h1);
    bus.register(&h2);
    bus.post(Ping::default());
    // The bus stays usable after a panic.
    bus.post(Ping::default());

    assert_eq!(log.entries(), vec!["faulty", "H2", "faulty", "H2"]);
    assert_eq!(observer.count(), 2);
    assert!(observer.failures()[0].contains("faulty handler panicked"));
}

#[test]
fn test_parallel_post_returns_before_slow_handler() {
    let bus = EventBus::new();
    let sleeper = Arc::new(Sleeper);
    bus.register(&sleeper);

    let (done, finished) = mpsc::channel();
    let started = Instant::now();
    bus.post(SlowEvent {
        delay: Duration::from_millis(200),
        done,
    });
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(100),
        "post blocked for {:?}",
        elapsed
    );

    let worker = finished.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(worker.starts_with("kairo-worker-"));
    assert_eq!(bus.worker_count(), 16);
    bus.shutdown();
}

/// Dispatched on the worker pool; `done` fires after the last handler.
struct Burst {
    done: mpsc::Sender<()>,
}

impl Message for Burst {
    const PARALLEL: bool = true;
}

struct Bursty {
    log: CallLog,
}

impl Bursty {
    fn explode(&self, _event: &Burst) {
        self.log.record("a");
        panic!("burst handler panicked");
    }

    fn finish(&self, event: &Burst) {
        self.log.record("b");
        let _ = event.done.send(());
    }
}

impl Subscriber for Bursty {
    fn subscribe(subscriptions: &mut Subscriptions<Self>) {
        subscriptions
            .on_with(ListenerOptions::new().priority(0), Self::explode)
            .on_with(ListenerOptions::new().priority(1), Self::finish);
    }
}

#[test]
fn test_parallel_failures_are_isolated_and_worker_survives() {
    let observer = CollectingObserver::new();
    let bus = EventBus::builder()
        .workers(1)
        .observer(observer.clone())
        .build()
        .unwrap();
    let log = CallLog::new();
    let bursty = Arc::new(Bursty { log: log.clone() });
    bus.register(&bursty);

    let (done, finished) = mpsc::channel();
    for _ in 0..2 {
        bus.post(Burst { done: done.clone() });
        finished.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    assert_eq!(log.entries(), vec!["a", "b", "a", "b"]);
    assert_eq!(observer.count(), 2);
    assert!(observer.failures()[0].contains("burst handler panicked"));
    assert_eq!(bus.worker_count(), 1);
    bus.shutdown();
}

#[test]
fn test_same_subscriber_registered_twice_runs_twice() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let h1 = Arc::new(Recorder::<0>::new("H1", &log));

    bus.register(&h1);
    bus.register(&h1);
    bus.post(Ping::default());
    assert_eq!(log.entries(), vec!["H1", "H1"]);

    // One unregister removes both registrations.
    bus.unregister(&h1);
    bus.post(Ping::default());
    assert_eq!(log.len(), 2);
}

#[test]
fn test_post_all_dispatches_in_order() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let both = Arc::new(PingPong { log: log.clone() });
    bus.register(&both);

    let events: Vec<Box<dyn AnyMessage>> = vec![
        Box::new(Ping { seq: 1 }),
        Box::new(Pong),
        Box::new(Ping { seq: 2 }),
    ];
    bus.post_all(events);

    assert_eq!(log.entries(), vec!["ping 1", "pong", "ping 2"]);
}

#[test]
fn test_post_macro_posts_each_event() {
    let bus = EventBus::new();
    let log = CallLog::new();
    let both = Arc::new(PingPong { log: log.clone() });
    bus.register(&both);

    kairo::post!(bus, Ping { seq: 7 });
    kairo::post!(bus, Pong, Ping { seq: 8 },);

    assert_eq!(log.entries(), vec!["ping 7", "pong", "ping 8"]);
}

#[test]
fn test_clones_share_registrations() {
    let bus = EventBus::new();
    let handle = bus.clone();
    let log = CallLog::new();
    let h1 = Arc::new(Recorder::<0>::new("H1", &log));

    handle.register(&h1);
    bus.post(Ping::default());

    assert_eq!(log.entries(), vec!["H1"]);
}
