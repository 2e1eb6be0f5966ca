//! Garden events, alerts, and the sinks that receive them.
//!
//! This module provides:
//! - Severity-routed event records emitted by the simulation worker
//! - Alerts raised by the stats reporter
//! - Sink traits for collaborators (viewers, durable logs, notifications)
//! - A bounded in-memory event log for transient viewers
//! - A sink that forwards everything to `tracing`

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Default capacity of the in-memory event log.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// How an event must be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Needs only reach a transient viewer.
    Ordinary,
    /// Must also be recorded durably.
    Important,
}

impl Severity {
    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ordinary => "ORDINARY",
            Self::Important => "IMPORTANT",
        }
    }
}

/// What an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// A plant was planted
    Planting,
    /// A plant was removed by command
    Removal,
    /// A plant died
    Death,
    /// Water was applied by command
    Watering,
    /// Automatic watering ran
    AutoWatering,
    /// Watering pushed a plant above the safe level
    Overwatering,
    /// Periodic water loss
    WaterStatus,
    /// Health lost to low water
    WaterStress,
    /// Insects attacked a plant
    InsectAttack,
    /// Pest control ran or finished
    PestControl,
    /// A plant regained health
    Recovery,
    /// Ambient temperature changed
    Temperature,
    /// A new day began
    Day,
    /// Performance report
    Report,
    /// A command was rejected
    Rejected,
}

impl EventCategory {
    /// Returns the icon for this category.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Planting => "🌱",
            Self::Removal => "🗑️",
            Self::Death => "💀",
            Self::Watering | Self::WaterStatus => "💧",
            Self::AutoWatering => "💦",
            Self::Overwatering | Self::WaterStress | Self::Rejected => "⚠️",
            Self::InsectAttack => "🚨",
            Self::PestControl => "🧴",
            Self::Recovery => "💚",
            Self::Temperature => "🌡️",
            Self::Day => "📅",
            Self::Report => "📊",
        }
    }
}

/// A single event emitted by the simulation.
#[derive(Debug, Clone)]
pub struct GardenEvent {
    /// When the event was produced
    pub timestamp: DateTime<Local>,
    /// Routing severity
    pub severity: Severity,
    /// Event category
    pub category: EventCategory,
    /// Free-text message
    pub message: String,
}

impl GardenEvent {
    /// Creates an ordinary event.
    #[must_use]
    pub fn ordinary(category: EventCategory, message: impl Into<String>) -> Self {
        Self::new(Severity::Ordinary, category, message)
    }

    /// Creates an important event.
    #[must_use]
    pub fn important(category: EventCategory, message: impl Into<String>) -> Self {
        Self::new(Severity::Important, category, message)
    }

    /// Creates an event stamped with the current local time.
    #[must_use]
    pub fn new(severity: Severity, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            category,
            message: message.into(),
        }
    }

    /// Returns true if the event must be recorded durably.
    #[must_use]
    pub fn is_important(&self) -> bool {
        self.severity == Severity::Important
    }
}

impl fmt::Display for GardenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%H:%M:%S"),
            self.category.icon(),
            self.message
        )
    }
}

/// A notification for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Short title
    pub title: String,
    /// Body text
    pub body: String,
}

impl Alert {
    /// Creates an alert.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Receives garden events from the simulation worker.
pub trait EventSink: Send {
    /// Records one event.
    fn record(&mut self, event: &GardenEvent);

    /// Flushes buffered output. Called on shutdown.
    fn flush(&mut self) {}
}

/// Receives alerts from the simulation worker.
pub trait AlertSink: Send {
    /// Delivers one alert.
    fn alert(&mut self, alert: &Alert);
}

/// Forwards events and alerts to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: &GardenEvent) {
        match event.severity {
            Severity::Ordinary => info!(category = ?event.category, "{}", event.message),
            Severity::Important => warn!(category = ?event.category, "{}", event.message),
        }
    }
}

impl AlertSink for TracingSink {
    fn alert(&mut self, alert: &Alert) {
        warn!(title = %alert.title, "{}", alert.body);
    }
}

/// Bounded, shareable log of recent events and alerts.
///
/// Clones share the same buffer, so one clone can be handed to the simulation
/// as a sink while another is read by a viewer.
#[derive(Debug, Clone)]
pub struct EventLog {
    inner: Arc<Mutex<EventLogInner>>,
}

#[derive(Debug)]
struct EventLogInner {
    events: VecDeque<GardenEvent>,
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventLog {
    /// Creates a log keeping at most `capacity` events and `capacity` alerts.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventLogInner {
                events: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
                alerts: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Returns true if no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Copies out the most recent `count` events, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<GardenEvent> {
        let inner = self.inner.lock();
        let skip = inner.events.len().saturating_sub(count);
        inner.events.iter().skip(skip).cloned().collect()
    }

    /// Copies out retained events matching `predicate`.
    pub fn find<F>(&self, predicate: F) -> Vec<GardenEvent>
    where
        F: Fn(&GardenEvent) -> bool,
    {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Copies out retained alerts, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.lock().alerts.iter().cloned().collect()
    }

    /// Drops all retained events and alerts.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.events.clear();
        inner.alerts.clear();
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: &GardenEvent) {
        let mut inner = self.inner.lock();
        if inner.events.len() >= inner.capacity {
            inner.events.pop_front();
        }
        inner.events.push_back(event.clone());
    }
}

impl AlertSink for EventLog {
    fn alert(&mut self, alert: &Alert) {
        let mut inner = self.inner.lock();
        if inner.alerts.len() >= inner.capacity {
            inner.alerts.pop_front();
        }
        inner.alerts.push_back(alert.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity() {
        let event = GardenEvent::important(EventCategory::Death, "Apple 0 has perished");
        assert!(event.is_important());
        assert!(!GardenEvent::ordinary(EventCategory::Day, "Day 2").is_important());
        assert!(event.to_string().ends_with("💀 Apple 0 has perished"));
    }

    #[test]
    fn test_event_log_capacity() {
        let log = EventLog::new(3);
        let mut sink = log.clone();
        for day in 0..5 {
            sink.record(&GardenEvent::ordinary(EventCategory::Day, format!("Day {day}")));
        }
        assert_eq!(log.len(), 3);
        let messages: Vec<String> = log.recent(2).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["Day 3".to_string(), "Day 4".to_string()]);
    }

    #[test]
    fn test_alerts_share_the_capacity() {
        let log = EventLog::new(2);
        let mut sink = log.clone();
        for n in 0..4 {
            sink.alert(&Alert::new(format!("Alert {n}"), "body"));
        }
        let titles: Vec<String> = log.alerts().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["Alert 2".to_string(), "Alert 3".to_string()]);
    }

    #[test]
    fn test_event_log_find_and_alerts() {
        let log = EventLog::default();
        let mut sink = log.clone();
        sink.record(&GardenEvent::ordinary(EventCategory::Watering, "water"));
        sink.record(&GardenEvent::important(EventCategory::Death, "dead"));
        sink.alert(&Alert::new("title", "body"));

        assert_eq!(log.find(GardenEvent::is_important).len(), 1);
        assert_eq!(log.alerts(), vec![Alert::new("title", "body")]);

        log.clear();
        assert!(log.is_empty());
        assert!(log.alerts().is_empty());
    }
}
