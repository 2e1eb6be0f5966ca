//! Timer threads that feed intents into the worker mailbox.
//!
//! Every periodic timer is an OS thread blocked on `select!` over its own
//! cancel channel and the next deadline. One-shot delays share a single
//! delay-queue thread. Dropping a task's cancel sender wakes the thread and
//! ends it. Timers never touch garden state; they only submit.

use crossbeam_channel::{after, at, never, select, Sender};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use verdant_common::Cell;

use crate::config::SimConfig;
use crate::intent::{CellTask, Directive, Intent, IntentSender};

/// Period of the water-decay timer (sim-time).
pub const WATER_DECAY_PERIOD: Duration = Duration::from_secs(30);

/// Period of the day-advance timer (sim-time).
pub const DAY_PERIOD: Duration = Duration::from_secs(3600);

/// Bounds of the random insect-attack interval in sim-seconds.
pub const ATTACK_INTERVAL_SECS: (u64, u64) = (10, 40);

/// Delay between an attack and automatic pest control (sim-time).
pub const PEST_CONTROL_DELAY: Duration = Duration::from_secs(10);

/// Period of per-cell automatic watering (sim-time).
pub const AUTO_WATER_PERIOD: Duration = Duration::from_secs(5);

/// Period of per-cell health recovery (sim-time).
pub const RECOVERY_PERIOD: Duration = Duration::from_secs(15);

/// Delay before a transient cell flag is cleared (sim-time).
pub const FLAG_CLEAR_DELAY: Duration = Duration::from_secs(3);

const JOIN_POLL: Duration = Duration::from_millis(5);

/// A running timer thread.
///
/// Dropping the handle cancels the timer without waiting for it.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Thread name of the task.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the timer from producing further intents.
    pub fn cancel(&mut self) {
        self.cancel.take();
    }

    /// Returns true once the thread has exited (or never started).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancels and waits for the thread until `deadline`.
    ///
    /// Returns false if the thread was still running at the deadline; it is
    /// then left detached.
    pub fn join_until(mut self, deadline: Instant) -> bool {
        self.cancel();
        while !self.is_finished() {
            if Instant::now() >= deadline {
                warn!("Timer {} did not stop within the grace period", self.name);
                return false;
            }
            thread::sleep(JOIN_POLL);
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Timer {} panicked", self.name);
            }
        }
        true
    }
}

/// How a periodic timer picks its waits.
enum Cadence {
    /// Fire after `first`, then every `period`.
    Every { first: Duration, period: Duration },
    /// Fire after a uniformly random wait in `[min, max]` seconds, repeatedly.
    Random {
        rng: fastrand::Rng,
        min_secs: u64,
        max_secs: u64,
        scale: f64,
    },
}

impl Cadence {
    fn next_wait(&mut self, first: bool) -> Duration {
        match self {
            Self::Every { first: initial, period } => {
                if first {
                    *initial
                } else {
                    *period
                }
            },
            Self::Random {
                rng,
                min_secs,
                max_secs,
                scale,
            } => Duration::from_secs(rng.u64(*min_secs..=*max_secs)).div_f64(*scale),
        }
    }
}

fn spawn_timer<F>(name: String, tx: IntentSender, mut cadence: Cadence, mut make: F) -> TaskHandle
where
    F: FnMut() -> Intent + Send + 'static,
{
    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);
    let thread = spawn_thread(name.clone(), move || {
        let mut first = true;
        loop {
            let wait = cadence.next_wait(first);
            first = false;
            select! {
                recv(cancel_rx) -> _ => break,
                recv(after(wait)) -> _ => {
                    if !tx.submit(make()) {
                        break;
                    }
                },
            }
        }
    });
    TaskHandle {
        name,
        cancel: Some(cancel_tx),
        thread,
    }
}

fn spawn_thread<F>(name: String, body: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    match thread::Builder::new().name(name.clone()).spawn(body) {
        Ok(thread) => Some(thread),
        Err(e) => {
            error!("Failed to spawn timer {name}: {e}");
            None
        },
    }
}

/// One thread holding every pending one-shot intent, ordered by deadline.
#[derive(Debug)]
struct DelayQueue {
    schedule: Sender<(Instant, Intent)>,
    task: TaskHandle,
}

impl DelayQueue {
    fn spawn(tx: IntentSender) -> Self {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);
        let (schedule, schedule_rx) = crossbeam_channel::unbounded::<(Instant, Intent)>();
        let name = "verdant-delays".to_string();
        let thread = spawn_thread(name.clone(), move || {
            let mut deadlines: BinaryHeap<Reverse<(Instant, u64)>> = BinaryHeap::new();
            let mut pending: HashMap<u64, Intent> = HashMap::new();
            let mut next_id = 0u64;
            loop {
                let timer = deadlines
                    .peek()
                    .map_or_else(never, |Reverse((due, _))| at(*due));
                select! {
                    recv(cancel_rx) -> _ => break,
                    recv(schedule_rx) -> msg => match msg {
                        Ok((due, intent)) => {
                            next_id += 1;
                            deadlines.push(Reverse((due, next_id)));
                            pending.insert(next_id, intent);
                        },
                        Err(_) => break,
                    },
                    recv(timer) -> _ => {
                        let now = Instant::now();
                        while let Some(&Reverse((due, id))) = deadlines.peek() {
                            if due > now {
                                break;
                            }
                            deadlines.pop();
                            if let Some(intent) = pending.remove(&id) {
                                if !tx.submit(intent) {
                                    return;
                                }
                            }
                        }
                    },
                }
            }
            debug!(dropped = pending.len(), "Delay queue stopped");
        });
        Self {
            schedule,
            task: TaskHandle {
                name,
                cancel: Some(cancel_tx),
                thread,
            },
        }
    }
}

/// Owns every timer thread and applies the worker's directives.
#[derive(Debug)]
pub struct Scheduler {
    tx: IntentSender,
    time_scale: f64,
    seed: Option<u64>,
    global: Vec<TaskHandle>,
    cells: HashMap<(CellTask, Cell), TaskHandle>,
    detached: Vec<TaskHandle>,
    delays: Option<DelayQueue>,
    closed: bool,
}

impl Scheduler {
    /// Creates a scheduler submitting into `tx`.
    #[must_use]
    pub fn new(config: &SimConfig, tx: IntentSender) -> Self {
        Self {
            tx,
            time_scale: config.effective_time_scale(),
            seed: config.seed,
            global: Vec::new(),
            cells: HashMap::new(),
            detached: Vec::new(),
            delays: None,
            closed: false,
        }
    }

    fn real(&self, sim: Duration) -> Duration {
        sim.div_f64(self.time_scale)
    }

    fn delay(&mut self, sim: Duration, intent: Intent) {
        let due = Instant::now() + self.real(sim);
        let tx = &self.tx;
        let queue = self.delays.get_or_insert_with(|| DelayQueue::spawn(tx.clone()));
        if queue.schedule.send((due, intent)).is_err() {
            warn!("Delay queue is gone, dropping one-shot intent");
        }
    }

    /// Starts the process-wide timers: water decay, day advance, random attacks.
    pub fn start_global(&mut self) {
        if self.closed || !self.global.is_empty() {
            return;
        }
        let decay = self.real(WATER_DECAY_PERIOD);
        self.global.push(spawn_timer(
            "verdant-water-decay".to_string(),
            self.tx.clone(),
            Cadence::Every {
                first: decay,
                period: decay,
            },
            || Intent::WaterDecay,
        ));

        let day = self.real(DAY_PERIOD);
        self.global.push(spawn_timer(
            "verdant-day".to_string(),
            self.tx.clone(),
            Cadence::Every {
                first: day,
                period: day,
            },
            || Intent::AdvanceDay,
        ));

        let rng = match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed.wrapping_add(1)),
            None => fastrand::Rng::new(),
        };
        self.global.push(spawn_timer(
            "verdant-insects".to_string(),
            self.tx.clone(),
            Cadence::Random {
                rng,
                min_secs: ATTACK_INTERVAL_SECS.0,
                max_secs: ATTACK_INTERVAL_SECS.1,
                scale: self.time_scale,
            },
            || Intent::InsectAttack,
        ));
        debug!("Started {} global timers", self.global.len());
    }

    /// Carries out one directive from the worker. Ignored once closed.
    pub fn apply(&mut self, directive: Directive) {
        if self.closed {
            return;
        }
        self.detached.retain(|task| !task.is_finished());

        match directive {
            Directive::Arm {
                task,
                cell,
                generation,
            } => {
                let (first, period) = match task {
                    CellTask::Watering => (Duration::ZERO, self.real(AUTO_WATER_PERIOD)),
                    CellTask::Recovery => {
                        let period = self.real(RECOVERY_PERIOD);
                        (period, period)
                    },
                };
                let handle = spawn_timer(
                    format!("verdant-{task:?}-{}-{}", cell.row, cell.col).to_lowercase(),
                    self.tx.clone(),
                    Cadence::Every { first, period },
                    move || match task {
                        CellTask::Watering => Intent::AutoWater { cell, generation },
                        CellTask::Recovery => Intent::Recover { cell, generation },
                    },
                );
                if let Some(mut previous) = self.cells.insert((task, cell), handle) {
                    previous.cancel();
                    self.detached.push(previous);
                }
            },
            Directive::Disarm { task, cell } => {
                if let Some(mut previous) = self.cells.remove(&(task, cell)) {
                    previous.cancel();
                    self.detached.push(previous);
                }
            },
            Directive::ClearFlagAfter {
                cell,
                flag,
                plant,
                delay,
            } => self.delay(delay, Intent::ClearFlag { cell, flag, plant }),
            Directive::PestControlAfter { delay } => self.delay(delay, Intent::AutoPestControl),
        }
    }

    /// Returns true if a periodic task runs for `(task, cell)`.
    #[must_use]
    pub fn is_armed(&self, task: CellTask, cell: Cell) -> bool {
        self.cells.contains_key(&(task, cell))
    }

    /// Number of live per-cell periodic tasks.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of timer threads still running.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.global
            .iter()
            .chain(self.cells.values())
            .chain(self.detached.iter())
            .chain(self.delays.iter().map(|d| &d.task))
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Cancels every timer and refuses further directives.
    pub fn cancel_all(&mut self) {
        self.closed = true;
        for task in self
            .global
            .iter_mut()
            .chain(self.cells.values_mut())
            .chain(self.detached.iter_mut())
            .chain(self.delays.iter_mut().map(|d| &mut d.task))
        {
            task.cancel();
        }
    }

    /// Cancels and joins every timer thread until `deadline`.
    ///
    /// Returns how many threads were still running at the deadline.
    pub fn join_until(&mut self, deadline: Instant) -> usize {
        self.cancel_all();
        let tasks = self
            .global
            .drain(..)
            .chain(self.cells.drain().map(|(_, task)| task))
            .chain(self.detached.drain(..))
            .chain(self.delays.take().map(|d| d.task))
            .collect::<Vec<_>>();
        tasks
            .into_iter()
            .filter(|task| !task.is_finished())
            .map(|task| task.join_until(deadline))
            .filter(|joined| !joined)
            .count()
    }
}
