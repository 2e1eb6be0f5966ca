//! The public simulation handle and its worker thread.
//!
//! [`Simulation::start`] spawns one worker that owns the [`Engine`] and the
//! [`Scheduler`]. Every public method travels to the worker as a command
//! intent and waits for its reply, so callers on any thread see the same
//! serialized garden the timers do.

use crossbeam_channel::Receiver;
use std::collections::BTreeMap;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info};

use verdant_common::{Cell, GardenError, GardenResult, PlantId};

use crate::config::SimConfig;
use crate::engine::{Engine, PlantDetails};
use crate::events::{AlertSink, EventSink, TracingSink};
use crate::insects::Insect;
use crate::intent::{mailbox, Effects, Intent, IntentSender};
use crate::pest_control::PestControlAction;
use crate::plant::{PlantModel, PlantType};
use crate::scheduler::Scheduler;
use crate::stats::GardenReport;

/// Collaborators that receive events and alerts.
#[derive(Default)]
pub struct Sinks {
    events: Vec<Box<dyn EventSink>>,
    alerts: Vec<Box<dyn AlertSink>>,
}

impl Sinks {
    /// No sinks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards everything to `tracing`.
    #[must_use]
    pub fn tracing() -> Self {
        Self::new()
            .with_event_sink(TracingSink)
            .with_alert_sink(TracingSink)
    }

    /// Adds an event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.events.push(Box::new(sink));
        self
    }

    /// Adds an alert sink.
    #[must_use]
    pub fn with_alert_sink(mut self, sink: impl AlertSink + 'static) -> Self {
        self.alerts.push(Box::new(sink));
        self
    }

    fn deliver(&mut self, effects: &Effects) {
        for event in &effects.events {
            for sink in &mut self.events {
                sink.record(event);
            }
        }
        for alert in &effects.alerts {
            for sink in &mut self.alerts {
                sink.alert(alert);
            }
        }
    }

    fn flush(&mut self) {
        for sink in &mut self.events {
            sink.flush();
        }
    }
}

struct Worker {
    engine: Engine,
    scheduler: Scheduler,
    sinks: Sinks,
    rx: Receiver<Intent>,
    config: SimConfig,
}

impl Worker {
    fn dispatch(&mut self, intent: Intent) {
        let effects = self.engine.apply(intent);
        self.sinks.deliver(&effects);
        for directive in effects.directives {
            self.scheduler.apply(directive);
        }
    }

    fn run(mut self) {
        info!(
            size = %self.engine.garden().size(),
            time_scale = self.config.effective_time_scale(),
            "Simulation started"
        );
        self.scheduler.start_global();

        while let Ok(intent) = self.rx.recv() {
            if matches!(intent, Intent::Shutdown) {
                break;
            }
            self.dispatch(intent);
        }

        self.shut_down();
    }

    fn shut_down(&mut self) {
        let deadline = Instant::now() + self.config.shutdown_grace();
        self.scheduler.cancel_all();

        let mut drained = 0usize;
        while Instant::now() < deadline {
            match self.rx.try_recv() {
                Ok(Intent::Shutdown) => {},
                Ok(intent) => {
                    self.dispatch(intent);
                    drained += 1;
                },
                Err(_) => break,
            }
        }

        let stragglers = self.scheduler.join_until(deadline);
        self.sinks.flush();
        info!(
            drained,
            stragglers,
            ticks = self.engine.clock().ticks(),
            "Simulation stopped"
        );
    }
}

/// Handle to a running garden simulation.
///
/// Dropping the handle shuts the simulation down.
pub struct Simulation {
    tx: IntentSender,
    worker: Option<JoinHandle<()>>,
}

impl Simulation {
    /// Spawns the worker and starts the global timers.
    pub fn start(config: SimConfig, sinks: Sinks) -> io::Result<Self> {
        let (tx, rx) = mailbox();
        let worker = Worker {
            engine: Engine::new(&config),
            scheduler: Scheduler::new(&config, tx.clone()),
            sinks,
            rx,
            config,
        };
        let handle = thread::Builder::new()
            .name("verdant-worker".to_string())
            .spawn(move || worker.run())?;
        Ok(Self {
            tx,
            worker: Some(handle),
        })
    }

    /// Runs `f` on the worker and waits for its result.
    pub fn call<R, F>(&self, f: F) -> GardenResult<R>
    where
        F: FnOnce(&mut Engine, &mut Effects) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let command = Box::new(move |engine: &mut Engine, effects: &mut Effects| {
            // the caller may have given up waiting
            let _ = reply_tx.send(f(engine, effects));
        });
        if !self.tx.submit(Intent::Command(command)) {
            return Err(GardenError::SimulationStopped);
        }
        reply_rx.recv().map_err(|_| GardenError::SimulationStopped)
    }

    /// Plants a plant of `plant_type` at `cell`.
    pub fn plant(&self, cell: Cell, plant_type: Option<PlantType>) -> GardenResult<PlantId> {
        self.call(move |engine, effects| engine.plant(cell, plant_type, effects))?
    }

    /// Removes the plant at `cell`.
    pub fn remove_plant(&self, cell: Cell) -> GardenResult<PlantModel> {
        self.call(move |engine, effects| engine.remove_plant(cell, effects))?
    }

    /// Waters every plant. Returns the number of plants watered.
    pub fn add_water(&self, amount: u32) -> GardenResult<usize> {
        self.call(move |engine, effects| engine.add_water(amount, effects))
    }

    /// Sets the ambient temperature.
    pub fn set_temperature(&self, temperature: i32) -> GardenResult<()> {
        self.call(move |engine, effects| engine.set_temperature(temperature, effects))
    }

    /// Attacks every susceptible plant with every selected insect.
    pub fn trigger_insect_attack(&self, insects: &[Insect]) -> GardenResult<u32> {
        let insects = insects.to_vec();
        self.call(move |engine, effects| engine.trigger_insect_attack(&insects, effects))
    }

    /// Applies the selected pest-control agents.
    pub fn apply_pest_control(&self, agents: &[Insect]) -> GardenResult<Vec<PestControlAction>> {
        let agents = agents.to_vec();
        self.call(move |engine, effects| engine.apply_pest_control(&agents, effects))
    }

    /// Details of every live plant, keyed by name.
    pub fn plant_details(&self) -> GardenResult<BTreeMap<String, PlantDetails>> {
        self.call(|engine, _| engine.plant_details())
    }

    /// Current statistics report.
    pub fn report(&self) -> GardenResult<GardenReport> {
        self.call(|engine, _| engine.report())
    }

    /// Returns true while the worker thread runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stops all timers, drains queued intents within the grace period and
    /// waits for the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        debug!("Requesting simulation shutdown");
        self.tx.submit(Intent::Shutdown);
        if worker.join().is_err() {
            error!("Simulation worker panicked");
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}
