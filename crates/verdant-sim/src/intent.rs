//! Intents, directives and the mailbox that carries intents to the worker.
//!
//! Timer threads and the command surface only ever *submit* intents. The
//! single worker thread applies them in FIFO order and answers with
//! [`Effects`]: events for the sinks, alerts, and [`Directive`]s telling the
//! scheduler which timers to start or stop next.

use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::time::Duration;

use verdant_common::{Cell, PlantId};

use crate::engine::Engine;
use crate::events::{Alert, EventCategory, GardenEvent};
use crate::garden::CellFlag;

/// A mutation run on the worker with exclusive access to the engine.
pub type Command = Box<dyn FnOnce(&mut Engine, &mut Effects) + Send>;

/// Per-cell periodic task kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellTask {
    /// Automatic watering (every 5 s, first fire immediate)
    Watering,
    /// Health recovery (every 15 s)
    Recovery,
}

/// A queued description of a state mutation.
pub enum Intent {
    /// Periodic water loss for every plant
    WaterDecay,
    /// Day rollover
    AdvanceDay,
    /// Random insect attack
    InsectAttack,
    /// Automatic pest control after an attack
    AutoPestControl,
    /// One automatic-watering fire for `cell`
    AutoWater {
        /// Target cell
        cell: Cell,
        /// Arm generation the firing task belongs to
        generation: u64,
    },
    /// One recovery fire for `cell`
    Recover {
        /// Target cell
        cell: Cell,
        /// Arm generation the firing task belongs to
        generation: u64,
    },
    /// Clear a transient flag set for `plant`
    ClearFlag {
        /// Target cell
        cell: Cell,
        /// Flag to clear
        flag: CellFlag,
        /// Plant the flag was set for
        plant: PlantId,
    },
    /// Arbitrary command from the public handle
    Command(Command),
    /// Stop the worker
    Shutdown,
}

impl Intent {
    /// Returns true for intents produced by timers.
    #[must_use]
    pub fn is_timer(&self) -> bool {
        !matches!(self, Self::Command(_) | Self::Shutdown)
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaterDecay => f.write_str("WaterDecay"),
            Self::AdvanceDay => f.write_str("AdvanceDay"),
            Self::InsectAttack => f.write_str("InsectAttack"),
            Self::AutoPestControl => f.write_str("AutoPestControl"),
            Self::AutoWater { cell, generation } => f
                .debug_struct("AutoWater")
                .field("cell", cell)
                .field("generation", generation)
                .finish(),
            Self::Recover { cell, generation } => f
                .debug_struct("Recover")
                .field("cell", cell)
                .field("generation", generation)
                .finish(),
            Self::ClearFlag { cell, flag, plant } => f
                .debug_struct("ClearFlag")
                .field("cell", cell)
                .field("flag", flag)
                .field("plant", plant)
                .finish(),
            Self::Command(_) => f.write_str("Command(..)"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Follow-on scheduling decided by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Start (or replace) the periodic task for `(task, cell)`
    Arm {
        /// Task kind
        task: CellTask,
        /// Target cell
        cell: Cell,
        /// Generation the new task must stamp on its intents
        generation: u64,
    },
    /// Stop the periodic task for `(task, cell)`
    Disarm {
        /// Task kind
        task: CellTask,
        /// Target cell
        cell: Cell,
    },
    /// Submit a flag clear after `delay` sim-time
    ClearFlagAfter {
        /// Target cell
        cell: Cell,
        /// Flag to clear
        flag: CellFlag,
        /// Plant the flag was set for
        plant: PlantId,
        /// Delay in sim-time
        delay: Duration,
    },
    /// Submit automatic pest control after `delay` sim-time
    PestControlAfter {
        /// Delay in sim-time
        delay: Duration,
    },
}

/// Everything one applied intent produced.
#[derive(Debug, Default)]
pub struct Effects {
    /// Events for the event sinks
    pub events: Vec<GardenEvent>,
    /// Alerts for the alert sinks
    pub alerts: Vec<Alert>,
    /// Scheduling requests for the scheduler
    pub directives: Vec<Directive>,
}

impl Effects {
    /// Creates empty effects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits an ordinary event.
    pub fn ordinary(&mut self, category: EventCategory, message: impl Into<String>) {
        self.events.push(GardenEvent::ordinary(category, message));
    }

    /// Emits an important event.
    pub fn important(&mut self, category: EventCategory, message: impl Into<String>) {
        self.events.push(GardenEvent::important(category, message));
    }

    /// Raises an alert.
    pub fn alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    /// Queues a directive.
    pub fn direct(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Returns true if nothing was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.alerts.is_empty() && self.directives.is_empty()
    }

    /// Messages of every event, in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.message.as_str()).collect()
    }
}

/// Cloneable, non-blocking submission side of the worker mailbox.
#[derive(Debug, Clone)]
pub struct IntentSender {
    tx: Sender<Intent>,
}

impl IntentSender {
    /// Queues an intent. Returns false once the worker has gone away.
    pub fn submit(&self, intent: Intent) -> bool {
        self.tx.send(intent).is_ok()
    }
}

/// Creates the unbounded intent mailbox.
#[must_use]
pub fn mailbox() -> (IntentSender, Receiver<Intent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (IntentSender { tx }, rx)
}
