//! Timer and task scheduling for the conversation.
//!
//! The controller never sleeps. Delayed prompt reveals and the fire-and-forget
//! submission go through a [`Scheduler`], so production runs on tokio timers
//! while tests step through callbacks by hand.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A delayed callback.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// A detached background task.
pub type Task = BoxFuture<'static, ()>;

/// Runs callbacks after a delay and detached tasks in the background.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once `delay` has elapsed. Callbacks with equal delays
    /// run in scheduling order; no ordering holds across different delays.
    fn schedule(&self, delay: Duration, callback: Callback);

    /// Run `task` to completion without the caller awaiting it.
    fn spawn(&self, task: Task);
}

/// Scheduler backed by the tokio runtime.
///
/// Delayed callbacks are owned by one timer task that fires them in
/// `(deadline, schedule order)` order, so equal delays keep FIFO order on a
/// multi-thread runtime. Must be created from within a runtime. Task handles
/// are retained so a binary can wait for in-flight work before exiting.
pub struct TokioScheduler {
    timers: mpsc::UnboundedSender<TimerCommand>,
    next_seq: AtomicU64,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

enum TimerCommand {
    Schedule {
        deadline: Instant,
        seq: u64,
        callback: Callback,
    },
    /// Reply once the timer queue is empty.
    Idle(oneshot::Sender<()>),
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioScheduler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_timers(rx));
        Self {
            timers: tx,
            next_seq: AtomicU64::new(0),
            handles: Mutex::new(Vec::new()),
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Wait for every callback and task scheduled so far.
    pub async fn drain(&self) {
        let (tx, rx) = oneshot::channel();
        if self.timers.send(TimerCommand::Idle(tx)).is_ok() && rx.await.is_err() {
            tracing::warn!("Timer task stopped before pending callbacks ran");
        }

        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Scheduled task did not complete: {}", e);
            }
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: Callback) {
        let command = TimerCommand::Schedule {
            deadline: Instant::now() + delay,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            callback,
        };
        if self.timers.send(command).is_err() {
            tracing::warn!("Timer task is gone, dropping delayed callback");
        }
    }

    fn spawn(&self, task: Task) {
        let handle = tokio::spawn(task);
        self.track(handle);
    }
}

/// Timer loop: fire due callbacks in key order, then sleep until the next
/// deadline or the next command.
async fn run_timers(mut rx: mpsc::UnboundedReceiver<TimerCommand>) {
    let mut queue: BTreeMap<(Instant, u64), Callback> = BTreeMap::new();
    let mut idle_waiters: Vec<oneshot::Sender<()>> = Vec::new();

    loop {
        let now = Instant::now();
        while let Some(entry) = queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let callback = entry.remove();
            callback();
        }
        if queue.is_empty() {
            for waiter in idle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }

        let next_deadline = queue.first_key_value().map(|((deadline, _), _)| *deadline);
        let wake = async {
            match next_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            command = rx.recv() => match command {
                Some(TimerCommand::Schedule { deadline, seq, callback }) => {
                    queue.insert((deadline, seq), callback);
                }
                Some(TimerCommand::Idle(waiter)) => idle_waiters.push(waiter),
                None => break,
            },
            _ = wake => {}
        }
    }

    if !queue.is_empty() {
        tracing::debug!("Scheduler dropped with {} delayed callbacks pending", queue.len());
    }
}

/// Scheduler that only runs work when told to.
///
/// `run_pending` fires queued callbacks ordered by delay, then by the order
/// they were scheduled. `run_tasks` awaits queued background tasks.
#[derive(Default)]
pub struct ManualScheduler {
    callbacks: Mutex<Vec<(Duration, u64, Callback)>>,
    tasks: Mutex<Vec<Task>>,
    next_seq: AtomicU64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting to run.
    pub fn pending(&self) -> usize {
        self.callbacks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of background tasks waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Delays of the queued callbacks, in scheduling order.
    pub fn pending_delays(&self) -> Vec<Duration> {
        let callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
        callbacks.iter().map(|(delay, _, _)| *delay).collect()
    }

    /// Fire every queued callback, including ones queued while running.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let mut batch: Vec<(Duration, u64, Callback)> = {
                let mut guard = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
                std::mem::take(&mut *guard)
            };
            if batch.is_empty() {
                return ran;
            }
            batch.sort_by_key(|(delay, seq, _)| (*delay, *seq));
            for (_, _, callback) in batch {
                callback();
                ran += 1;
            }
        }
    }

    /// Await every queued background task. Returns how many ran.
    pub async fn run_tasks(&self) -> usize {
        let tasks: Vec<Task> = {
            let mut guard = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        let count = tasks.len();
        for task in tasks {
            task.await;
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: Callback) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((delay, seq, callback));
    }

    fn spawn(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(task);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |label: &'static str| -> Callback {
                let log = Arc::clone(&log);
                Box::new(move || log.lock().unwrap().push(label))
            }
        };
        (log, make)
    }

    #[test]
    fn manual_runs_by_delay_then_schedule_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        scheduler.schedule(Duration::from_millis(500), make("late"));
        scheduler.schedule(Duration::ZERO, make("first"));
        scheduler.schedule(Duration::ZERO, make("second"));

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.run_pending(), 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "late"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_holds_callbacks_until_run() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.schedule(Duration::ZERO, make("x"));
        assert!(log.lock().unwrap().is_empty());
        scheduler.run_pending();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn manual_runs_spawned_tasks() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let counter = Arc::clone(&counter);
            scheduler.spawn(Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(scheduler.pending_tasks(), 2);
        assert_eq!(scheduler.run_tasks().await, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&counter);
            scheduler.schedule(
                Duration::from_millis(10),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        scheduler.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn tokio_scheduler_keeps_equal_delay_order() {
        for _ in 0..10 {
            let scheduler = TokioScheduler::new();
            let fired = Arc::new(Mutex::new(Vec::new()));
            for i in 0..50 {
                let fired = Arc::clone(&fired);
                scheduler.schedule(
                    Duration::from_millis(5),
                    Box::new(move || fired.lock().unwrap().push(i)),
                );
            }
            scheduler.drain().await;
            assert_eq!(*fired.lock().unwrap(), (0..50).collect::<Vec<_>>());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tokio_scheduler_orders_by_deadline() {
        let scheduler = TokioScheduler::new();
        let (log, make) = recorder();
        scheduler.schedule(Duration::from_millis(40), make("late"));
        scheduler.schedule(Duration::ZERO, make("now"));
        scheduler.schedule(Duration::from_millis(10), make("soon"));
        scheduler.drain().await;
        assert_eq!(*log.lock().unwrap(), vec!["now", "soon", "late"]);
    }

    #[tokio::test]
    async fn tokio_drain_waits_for_spawned_tasks() {
        let scheduler = TokioScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&counter);
            scheduler.spawn(Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        scheduler.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
