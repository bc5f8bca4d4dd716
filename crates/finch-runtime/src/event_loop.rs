//! Single-threaded run loop
//!
//! The loop owns everything the script asks of the host between events:
//! timers, the terminate flag and the keep-alive flag. Other threads reach
//! it only through an [`EventSender`], whose messages are drained on the
//! host thread before dispatch.
//!
//! Each turn of the loop:
//!
//! 1. enqueue a timer event for every due timer,
//! 2. drain the cross-thread channel,
//! 3. dispatch pending events in FIFO order,
//! 4. block until the next timer deadline or incoming message.
//!
//! Stopping a timer removes it from the schedule; an event it already
//! enqueued is still delivered.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use finch_sdk::{HandleId, HostValue};
use finch_stdlib::HostControl;
use rustc_hash::FxHashMap;

use crate::error::EXIT_SUCCESS;
use crate::host::{EventKind, Host};

// ============================================================================
// Events and senders
// ============================================================================

/// An event waiting to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    /// Callback to deliver to
    pub kind: EventKind,
    /// Value passed to the callback
    pub payload: HostValue,
}

enum Message {
    Event(HostEvent),
    Terminate,
    /// The last sender went away; wakes the loop so it can go idle
    Disconnected,
}

/// Posts events to a [`RunLoop`] from any thread.
pub struct EventSender {
    tx: Sender<Message>,
    live: Arc<AtomicUsize>,
}

impl EventSender {
    fn new(tx: Sender<Message>, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, AtomicOrdering::SeqCst);
        Self { tx, live }
    }

    /// Queue an event. Returns false if the loop is gone.
    pub fn send(&self, kind: EventKind, payload: HostValue) -> bool {
        self.tx.send(Message::Event(HostEvent { kind, payload })).is_ok()
    }

    /// Ask the loop to stop. Returns false if the loop is gone.
    pub fn terminate(&self) -> bool {
        self.tx.send(Message::Terminate).is_ok()
    }
}

impl Clone for EventSender {
    fn clone(&self) -> Self {
        Self::new(self.tx.clone(), self.live.clone())
    }
}

impl Drop for EventSender {
    fn drop(&mut self) {
        if self.live.fetch_sub(1, AtomicOrdering::SeqCst) == 1 {
            let _ = self.tx.send(Message::Disconnected);
        }
    }
}

// ============================================================================
// Timers
// ============================================================================

/// Entry in the timer heap
struct TimerEntry {
    /// When the timer is next due
    due: Instant,
    /// Insertion order, to keep equal deadlines FIFO
    seq: u64,
    id: HandleId,
}

// Reverse ordering for min-heap (earliest deadline first)
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

#[derive(Debug, Clone, Copy)]
struct TimerSpec {
    interval: Duration,
    repeats: bool,
}

/// Scheduled timers. Heap entries whose id is no longer active are stale
/// and skipped.
#[derive(Default)]
struct Timers {
    heap: BinaryHeap<TimerEntry>,
    active: FxHashMap<HandleId, TimerSpec>,
    next_id: u64,
    next_seq: u64,
}

impl Timers {
    fn start(&mut self, now: Instant, interval: Duration, repeats: bool) -> HandleId {
        self.next_id += 1;
        let id = HandleId(self.next_id);
        self.active.insert(id, TimerSpec { interval, repeats });
        self.schedule(id, now, interval);
        id
    }

    /// Queue `id` one interval after `now`. A deadline past what `Instant`
    /// can represent is never due; the timer stays active until stopped.
    fn schedule(&mut self, id: HandleId, now: Instant, interval: Duration) {
        let Some(due) = now.checked_add(interval) else {
            log::debug!("timer {} deadline out of range; it will not fire", id);
            return;
        };
        self.next_seq += 1;
        self.heap.push(TimerEntry {
            due,
            seq: self.next_seq,
            id,
        });
    }

    fn stop(&mut self, id: HandleId) -> bool {
        self.active.remove(&id).is_some()
    }

    fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(entry) = self.heap.peek() {
            if self.active.contains_key(&entry.id) {
                return Some(entry.due);
            }
            self.heap.pop();
        }
        None
    }

    /// Ids of every timer due at `now`, earliest first. Repeating timers
    /// are rescheduled one interval after now.
    fn fire_due(&mut self, now: Instant) -> Vec<HandleId> {
        let mut fired = Vec::new();
        while self.heap.peek().is_some_and(|entry| entry.due <= now) {
            let Some(entry) = self.heap.pop() else { break };
            match self.active.get(&entry.id).copied() {
                Some(spec) if spec.repeats => fired.push((entry.id, Some(spec.interval))),
                Some(_) => {
                    self.active.remove(&entry.id);
                    fired.push((entry.id, None));
                }
                None => {}
            }
        }
        for (id, interval) in &fired {
            if let Some(interval) = interval {
                self.schedule(*id, now, *interval);
            }
        }
        fired.into_iter().map(|(id, _)| id).collect()
    }
}

// ============================================================================
// Loop control
// ============================================================================

/// Loop state scripts reach through `Application`.
pub struct LoopControl {
    timers: RefCell<Timers>,
    terminated: Cell<bool>,
    kept_alive: Cell<bool>,
    arguments: Vec<String>,
    resource_dir: PathBuf,
}

impl LoopControl {
    fn new(arguments: Vec<String>, resource_dir: PathBuf) -> Self {
        Self {
            timers: RefCell::new(Timers::default()),
            terminated: Cell::new(false),
            kept_alive: Cell::new(false),
            arguments,
            resource_dir,
        }
    }

    /// Whether `Application.terminate` has been called.
    pub fn is_terminated(&self) -> bool {
        self.terminated.get()
    }

    /// Whether `Application.run` keeps the loop alive without timers.
    pub fn is_kept_alive(&self) -> bool {
        self.kept_alive.get()
    }

    /// Number of timers still scheduled.
    pub fn active_timers(&self) -> usize {
        self.timers.borrow().active.len()
    }
}

impl HostControl for LoopControl {
    fn start_timer(&self, interval: Duration, repeats: bool) -> HandleId {
        let id = self.timers.borrow_mut().start(Instant::now(), interval, repeats);
        log::debug!("timer {} started: every {:?}, repeats {}", id, interval, repeats);
        id
    }

    fn stop_timer(&self, timer: HandleId) -> bool {
        let stopped = self.timers.borrow_mut().stop(timer);
        log::debug!("timer {} stopped: {}", timer, stopped);
        stopped
    }

    fn terminate(&self) {
        self.terminated.set(true);
    }

    fn keep_alive(&self) {
        self.kept_alive.set(true);
    }

    fn close(&self) {
        self.kept_alive.set(false);
    }

    fn command_arguments(&self) -> Vec<String> {
        self.arguments.clone()
    }

    fn resource_dir(&self) -> PathBuf {
        self.resource_dir.clone()
    }
}

// ============================================================================
// Run loop
// ============================================================================

/// Drives a [`Host`] on the current thread.
pub struct RunLoop {
    control: Rc<LoopControl>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    live_senders: Arc<AtomicUsize>,
    pending: VecDeque<HostEvent>,
}

impl RunLoop {
    /// Create a loop. `arguments` and `resource_dir` are what scripts see
    /// as `Application.commandArguments` and `Application.resourcePath`.
    pub fn new(arguments: Vec<String>, resource_dir: PathBuf) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            control: Rc::new(LoopControl::new(arguments, resource_dir)),
            tx,
            rx,
            live_senders: Arc::new(AtomicUsize::new(0)),
            pending: VecDeque::new(),
        }
    }

    /// Loop state, to hand to the script catalog.
    pub fn control(&self) -> Rc<LoopControl> {
        self.control.clone()
    }

    /// A sender for other threads. The loop does not go idle while one is
    /// alive.
    pub fn sender(&self) -> EventSender {
        EventSender::new(self.tx.clone(), self.live_senders.clone())
    }

    /// Queue an event from the host thread.
    pub fn post(&mut self, kind: EventKind, payload: HostValue) {
        self.pending.push_back(HostEvent { kind, payload });
    }

    /// Run until the script terminates or nothing can produce another
    /// event. Returns the process exit code.
    pub fn run(&mut self, host: &mut Host) -> i32 {
        log::debug!("run loop started");
        loop {
            if self.control.is_terminated() {
                log::debug!("run loop terminated");
                break;
            }

            self.fire_timers(Instant::now());
            self.drain();
            self.dispatch_pending(host);

            if self.control.is_terminated() {
                log::debug!("run loop terminated");
                break;
            }
            if self.is_idle() {
                log::debug!("run loop idle");
                break;
            }
            self.wait();
        }
        EXIT_SUCCESS
    }

    fn fire_timers(&mut self, now: Instant) {
        let fired = self.control.timers.borrow_mut().fire_due(now);
        for id in fired {
            self.pending.push_back(HostEvent {
                kind: EventKind::Timer,
                payload: HostValue::Handle(id),
            });
        }
    }

    fn drain(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.accept(message);
        }
    }

    fn accept(&mut self, message: Message) {
        match message {
            Message::Event(event) => self.pending.push_back(event),
            Message::Terminate => self.control.terminate(),
            Message::Disconnected => {}
        }
    }

    fn dispatch_pending(&mut self, host: &mut Host) {
        while let Some(event) = self.pending.pop_front() {
            if self.control.is_terminated() {
                break;
            }
            if let Err(error) = host.dispatch_event(event.kind, event.payload) {
                log::warn!("{} callback failed: {}", event.kind, error);
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty()
            && self.control.timers.borrow().is_empty()
            && !self.control.is_kept_alive()
            && self.live_senders.load(AtomicOrdering::SeqCst) == 0
            && self.rx.is_empty()
    }

    fn wait(&mut self) {
        if !self.pending.is_empty() {
            return;
        }
        let deadline = self.control.timers.borrow_mut().next_deadline();
        let message = match deadline {
            Some(deadline) => match self.rx.recv_deadline(deadline) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
            },
            None => self.rx.recv().ok(),
        };
        if let Some(message) = message {
            self.accept(message);
        }
    }
}
