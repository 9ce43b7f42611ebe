#![allow(dead_code)]

use kairo::{ListenerOptions, Message, Subscriber, Subscriptions, testing::CallLog};
use std::{sync::mpsc, thread, time::Duration};

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct Ping {
    pub seq: u32,
}

impl Message for Ping {}

#[derive(Clone, Debug, Default)]
pub struct Pong;

impl Message for Pong {}

/// Dispatched on the worker pool.
#[derive(Debug)]
pub struct SlowEvent {
    pub delay: Duration,
    pub done: mpsc::Sender<String>,
}

impl Message for SlowEvent {
    const PARALLEL: bool = true;
}

// ============================================================================
// Test Subscribers
// ============================================================================

/// Records its name for every `Ping`, at priority `P`.
pub struct Recorder<const P: i32> {
    pub name: &'static str,
    pub log: CallLog,
}

impl<const P: i32> Recorder<P> {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }

    fn on_ping(&self, _event: &Ping) {
        self.log.record(self.name);
    }
}

impl<const P: i32> Subscriber for Recorder<P> {
    fn subscribe(subscriptions: &mut Subscriptions<Self>) {
        subscriptions.on_with(ListenerOptions::new().priority(P), Self::on_ping);
    }
}

/// Handles both `Ping` and `Pong`.
pub struct PingPong {
    pub log: CallLog,
}

impl PingPong {
    fn on_ping(&self, event: &Ping) {
        self.log.record(format!("ping {}", event.seq));
    }

    fn on_pong(&self, _event: &Pong) {
        self.log.record("pong");
    }
}

impl Subscriber for PingPong {
    fn subscribe(subscriptions: &mut Subscriptions<Self>) {
        subscriptions.on(Self::on_ping).on(Self::on_pong);
    }
}

/// Fails on every `Ping` at priority 0, by error or by panic.
pub struct Faulty {
    pub panics: bool,
    pub log: CallLog,
}

impl Faulty {
    fn on_ping(&self, _event: &Ping) -> Result<(), String> {
        self.log.record("faulty");
        if self.panics {
            panic!("faulty handler panicked");
        }
        Err("faulty handler failed".to_string())
    }
}

impl Subscriber for Faulty {
    fn subscribe(subscriptions: &mut Subscriptions<Self>) {
        subscriptions.on_with(ListenerOptions::new().priority(0), Self::on_ping);
    }
}

/// Sleeps for the event's delay, then reports its thread name.
pub struct Sleeper;

impl Sleeper {
    fn on_slow(&self, event: &SlowEvent) {
        thread::sleep(event.delay);
        let name = thread::current().name().unwrap_or_default().to_string();
        let _ = event.done.send(name);
    }
}

impl Subscriber for Sleeper {
    fn subscribe(subscriptions: &mut Subscriptions<Self>) {
        subscriptions.on(Self::on_slow);
    }
}
