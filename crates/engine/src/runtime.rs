// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime: the scheduling loop and command surface
//!
//! One `Runtime` owns the store, journal, event bus, queue gate, and
//! notification dispatcher. `run_tick` drives a bounded pool of concurrent
//! executor tasks; `handle_command` serves the CLI/daemon surface. Both
//! paths share the in-flight registry, so an entity never has two
//! executors at once.

use crate::commands::{Command, CommandOutcome};
use crate::dispatcher::NotificationDispatcher;
use crate::error::EngineError;
use crate::queue_gate::QueueGate;
use crate::recovery::reconcile_pending_rebooks;
use crate::rollover_executor::run_rollover_cycle;
use crate::scheduler::{plan, InFlight, JobKey};
use crate::watch_executor::run_watch_check;
use cw_adapters::PortalClient;
use cw_core::{
    BookingAttempt, CheckOutcome, Clock, Effect, EngineConfig, Event, EventBus, IdGen, JobKind,
    JobRecord, LogLevel, NotificationKind, NotificationMessage, Rollover, RolloverInput,
    RolloverState, Watch,
};
use cw_storage::{Journal, JsonStore, StorageError};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

/// Runtime dependencies
pub struct RuntimeDeps<P> {
    pub portal: Arc<P>,
    pub store: JsonStore,
    pub journal: Journal,
    pub dispatcher: NotificationDispatcher,
    pub config: EngineConfig,
}

struct Inner<P, C, I> {
    portal: Arc<P>,
    store: JsonStore,
    journal: Mutex<Journal>,
    dispatcher: NotificationDispatcher,
    config: EngineConfig,
    bus: EventBus,
    gate: QueueGate,
    in_flight: InFlight,
    clock: C,
    id_gen: I,
}

/// The automation engine runtime
pub struct Runtime<P, C: Clock, I: IdGen> {
    inner: Arc<Inner<P, C, I>>,
}

impl<P, C: Clock, I: IdGen> Clone for Runtime<P, C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, C, I> Runtime<P, C, I>
where
    P: PortalClient,
    C: Clock + 'static,
    I: IdGen + 'static,
{
    pub fn new(deps: RuntimeDeps<P>, clock: C, id_gen: I) -> Self {
        let gate = QueueGate::new(&deps.config);
        Self {
            inner: Arc::new(Inner {
                portal: deps.portal,
                store: deps.store,
                journal: Mutex::new(deps.journal),
                dispatcher: deps.dispatcher,
                config: deps.config,
                bus: EventBus::new(),
                gate,
                in_flight: InFlight::new(),
                clock,
                id_gen,
            }),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn store(&self) -> &JsonStore {
        &self.inner.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.inner.in_flight
    }

    /// Reconcile interrupted rebooks before the first tick
    pub async fn recover(&self) -> Result<(), EngineError> {
        let resolved =
            reconcile_pending_rebooks(&self.inner.store, self.inner.portal.as_ref(), &self.inner.clock)
                .await?;
        for (_, effects) in resolved {
            self.execute_effects(effects).await?;
        }
        Ok(())
    }

    /// One scheduler pass: queue-session upkeep, candidate selection, and
    /// dispatch of up to `max_concurrent` executor tasks. The returned
    /// handles let callers await quiescence; the daemon detaches them.
    pub async fn run_tick(&self) -> Result<Vec<JoinHandle<()>>, EngineError> {
        let events = self
            .inner
            .gate
            .maintain(self.inner.portal.as_ref(), &self.inner.clock)
            .await;
        for event in events {
            self.inner.bus.publish(event);
        }

        let now = self.inner.clock.now_utc();
        let watches = self.inner.store.list_watches()?;
        let rollovers = self.inner.store.list_rollovers()?;
        let in_flight = self.inner.in_flight.snapshot();
        let capacity = self
            .inner
            .config
            .max_concurrent
            .saturating_sub(in_flight.len());

        let dispatches = plan(&watches, &rollovers, &in_flight, now, capacity);
        if !dispatches.is_empty() {
            tracing::debug!(count = dispatches.len(), "dispatching due jobs");
        }

        let mut handles = Vec::with_capacity(dispatches.len());
        for dispatch in dispatches {
            let Some(guard) = self.inner.in_flight.try_begin(dispatch.key.clone()) else {
                continue;
            };
            let runtime = self.clone();
            handles.push(tokio::spawn(async move {
                let _guard = guard;
                runtime.execute_job(dispatch.key).await;
            }));
        }
        Ok(handles)
    }

    /// Handle one command, returning the result envelope
    pub async fn handle_command(&self, command: Command) -> CommandOutcome {
        match self.dispatch_command(command).await {
            Ok(data) => CommandOutcome::ok(data),
            Err(error) => CommandOutcome::err(error.to_string()),
        }
    }

    async fn dispatch_command(&self, command: Command) -> Result<serde_json::Value, EngineError> {
        match command {
            Command::WatchCreate { spec } => {
                let mut watch = Watch::new(
                    self.inner.id_gen.next(),
                    spec.name,
                    spec.campground_id,
                    spec.range,
                    spec.guests,
                    &self.inner.clock,
                )
                .with_interval_minutes(spec.check_interval_minutes);
                watch.site_type = spec.site_type;
                watch.max_price = spec.max_price;
                watch.auto_book = spec.auto_book;
                watch.notify_only = spec.notify_only;
                watch.validate()?;
                self.inner.store.save_watch(&watch)?;
                tracing::info!(watch_id = %watch.id, name = %watch.name, "watch created");
                Ok(serde_json::to_value(&watch)?)
            }

            Command::WatchList => {
                let watches = self.inner.store.list_watches()?;
                Ok(serde_json::to_value(&watches)?)
            }

            Command::WatchGet { id } => {
                let watch = self.load_watch(&id)?;
                Ok(serde_json::to_value(&watch)?)
            }

            Command::WatchActivate { id } => {
                let watch = self.load_watch(&id)?.activate(&self.inner.clock);
                self.inner.store.save_watch(&watch)?;
                Ok(serde_json::to_value(&watch)?)
            }

            Command::WatchDeactivate { id } => {
                let watch = self.load_watch(&id)?.deactivate();
                self.inner.store.save_watch(&watch)?;
                Ok(serde_json::to_value(&watch)?)
            }

            Command::WatchDelete { id } => {
                self.load_watch(&id)?;
                self.inner.store.delete_watch(&id)?;
                Ok(serde_json::json!({ "deleted": id }))
            }

            Command::WatchCheckNow { id } => {
                let watch = self.load_watch(&id)?;
                if !watch.active {
                    return Err(EngineError::Rejected(format!("watch {} is inactive", id)));
                }
                let Some(_guard) = self.inner.in_flight.try_begin(JobKey::watch(id.as_str())) else {
                    return Err(EngineError::AlreadyRunning { kind: "watch", id });
                };
                let started = self.inner.clock.now();
                self.execute_watch(&id, started).await
            }

            Command::RolloverCreate { spec } => {
                let entry = Rollover::new(
                    self.inner.id_gen.next(),
                    spec.name,
                    spec.campground_id,
                    spec.guests,
                    spec.current_stay,
                    spec.target_stay,
                    spec.booking_reference,
                    &self.inner.clock,
                )
                .with_interval_minutes(spec.check_interval_minutes)
                .with_max_attempts(spec.max_attempts);
                let entry = match spec.site_type {
                    Some(site_type) => entry.with_site_type(site_type),
                    None => entry,
                };
                entry.validate()?;
                self.inner.store.save_rollover(&entry)?;
                tracing::info!(rollover_id = %entry.id, name = %entry.name, "rollover created");
                Ok(serde_json::to_value(&entry)?)
            }

            Command::RolloverList => {
                let entries = self.inner.store.list_rollovers()?;
                Ok(serde_json::to_value(&entries)?)
            }

            Command::RolloverGet { id } => {
                let entry = self.load_rollover(&id)?;
                Ok(serde_json::to_value(&entry)?)
            }

            Command::RolloverActivate { id } => {
                let entry = self.load_rollover(&id)?;
                if entry.state.is_terminal() {
                    return Err(cw_core::ValidationError::Finished {
                        state: entry.state.label().to_string(),
                    }
                    .into());
                }
                let (entry, effects) = entry.transition(RolloverInput::Activate, &self.inner.clock);
                self.inner.store.save_rollover(&entry)?;
                self.execute_effects(effects).await?;
                Ok(serde_json::to_value(&entry)?)
            }

            Command::RolloverDeactivate { id } => {
                let entry = self.load_rollover(&id)?;
                let (entry, effects) =
                    entry.transition(RolloverInput::Deactivate, &self.inner.clock);
                self.inner.store.save_rollover(&entry)?;
                self.execute_effects(effects).await?;
                Ok(serde_json::to_value(&entry)?)
            }

            Command::RolloverDelete { id } => {
                self.load_rollover(&id)?;
                self.inner.store.delete_rollover(&id)?;
                Ok(serde_json::json!({ "deleted": id }))
            }

            Command::RolloverRunNow { id } => {
                let entry = self.load_rollover(&id)?;
                if entry.state != RolloverState::Active {
                    return Err(EngineError::Rejected(format!(
                        "rollover {} is not active (state: {})",
                        id,
                        entry.state.label()
                    )));
                }
                let Some(_guard) = self.inner.in_flight.try_begin(JobKey::rollover(id.as_str())) else {
                    return Err(EngineError::AlreadyRunning {
                        kind: "rollover",
                        id,
                    });
                };
                let started = self.inner.clock.now();
                self.execute_rollover(&id, started).await
            }

            Command::QueueStatus => {
                let session = self.inner.gate.status(&self.inner.clock).await;
                Ok(match session {
                    Some(session) => serde_json::json!({
                        "status": session.status,
                        "position": session.position,
                        "estimated_wait_secs": session.estimated_wait.map(|d| d.as_secs()),
                        "expires_in_secs": session.expiry_remaining(&self.inner.clock).as_secs(),
                    }),
                    None => serde_json::json!({ "status": "none" }),
                })
            }

            Command::NotificationList { unread_only } => {
                let mut messages = self.inner.store.list_notifications()?;
                if unread_only {
                    messages.retain(|m| !m.read);
                }
                Ok(serde_json::to_value(&messages)?)
            }

            Command::NotificationMarkRead { id } => {
                let message = self.load_notification(&id)?.mark_read();
                self.inner.store.save_notification(&message)?;
                Ok(serde_json::to_value(&message)?)
            }

            Command::NotificationDelete { id } => {
                self.load_notification(&id)?;
                self.inner.store.delete_notification(&id)?;
                Ok(serde_json::json!({ "deleted": id }))
            }

            Command::JobList { limit } => {
                let records = self
                    .inner
                    .journal
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .tail(limit)?;
                Ok(serde_json::to_value(&records)?)
            }
        }
    }

    async fn execute_job(&self, key: JobKey) {
        let started = self.inner.clock.now();
        let result = match key.kind {
            JobKind::WatchCheck => self.execute_watch(&key.id, started).await,
            JobKind::RolloverCheck => self.execute_rollover(&key.id, started).await,
        };

        // An executor failure is recorded and contained; it never takes the
        // scheduler or other jobs down with it
        if let Err(error) = result {
            tracing::error!(kind = %key.kind, target_id = %key.id, error = %error, "job execution failed");
            let duration = self.inner.clock.now().duration_since(started);
            let record = JobRecord::failed(
                self.inner.id_gen.next(),
                key.kind,
                &key.id,
                error.to_string(),
                duration,
                &self.inner.clock,
            );
            if let Err(journal_error) = self.append_job(&record) {
                tracing::error!(error = %journal_error, "failed to journal job failure");
            }
        }
    }

    async fn execute_watch(
        &self,
        id: &str,
        started: Instant,
    ) -> Result<serde_json::Value, EngineError> {
        let watch = match self.inner.store.load_watch(id) {
            Ok(watch) => watch,
            Err(StorageError::NotFound { .. }) => {
                tracing::debug!(watch_id = %id, "watch deleted before execution");
                return Ok(serde_json::Value::Null);
            }
            Err(error) => return Err(error.into()),
        };
        if !watch.active {
            return Ok(serde_json::Value::Null);
        }

        let (outcome, events) = run_watch_check(
            &watch,
            self.inner.portal.as_ref(),
            &self.inner.gate,
            &self.inner.config,
            &self.inner.clock,
        )
        .await;
        for event in events {
            self.inner.bus.publish(event);
        }

        let job = match &outcome {
            CheckOutcome::Found {
                booking: Some(BookingAttempt::Booked(confirmation)),
                ..
            } => Ok(format!("booked:{}", confirmation.reference)),
            CheckOutcome::Found {
                booking: Some(BookingAttempt::Failed { reason }),
                ..
            } => Ok(format!("found; booking failed: {}", reason)),
            CheckOutcome::Found { .. } => Ok("found".to_string()),
            CheckOutcome::NotFound => Ok("not_found".to_string()),
            CheckOutcome::Transient { reason } => Err(reason.clone()),
            CheckOutcome::AuthRequired { reason } => {
                Err(format!("authentication required: {}", reason))
            }
        };

        let (updated, effects) = watch.apply_outcome(outcome, &self.inner.clock);
        self.inner.store.save_watch(&updated)?;
        self.execute_effects(effects).await?;

        let duration = self.inner.clock.now().duration_since(started);
        let record = match job {
            Ok(detail) => JobRecord::completed(
                self.inner.id_gen.next(),
                JobKind::WatchCheck,
                id,
                detail,
                duration,
                &self.inner.clock,
            ),
            Err(error) => JobRecord::failed(
                self.inner.id_gen.next(),
                JobKind::WatchCheck,
                id,
                error,
                duration,
                &self.inner.clock,
            ),
        };
        self.append_job(&record)?;

        Ok(serde_json::to_value(&updated)?)
    }

    async fn execute_rollover(
        &self,
        id: &str,
        started: Instant,
    ) -> Result<serde_json::Value, EngineError> {
        let entry = match self.inner.store.load_rollover(id) {
            Ok(entry) => entry,
            Err(StorageError::NotFound { .. }) => {
                tracing::debug!(rollover_id = %id, "rollover deleted before execution");
                return Ok(serde_json::Value::Null);
            }
            Err(error) => return Err(error.into()),
        };
        if entry.state != RolloverState::Active {
            return Ok(serde_json::Value::Null);
        }

        let output = run_rollover_cycle(
            &entry,
            self.inner.portal.as_ref(),
            &self.inner.gate,
            &self.inner.store,
            &self.inner.config,
            &self.inner.clock,
        )
        .await?;
        for event in output.events {
            self.inner.bus.publish(event);
        }

        self.inner.store.save_rollover(&output.entry)?;
        self.execute_effects(output.effects).await?;

        let duration = self.inner.clock.now().duration_since(started);
        let record = match output.job {
            Ok(detail) => JobRecord::completed(
                self.inner.id_gen.next(),
                JobKind::RolloverCheck,
                id,
                detail,
                duration,
                &self.inner.clock,
            ),
            Err(error) => JobRecord::failed(
                self.inner.id_gen.next(),
                JobKind::RolloverCheck,
                id,
                error,
                duration,
                &self.inner.clock,
            ),
        };
        self.append_job(&record)?;

        Ok(serde_json::to_value(&output.entry)?)
    }

    async fn execute_effects(&self, effects: Vec<Effect>) -> Result<(), EngineError> {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.inner.bus.publish(event),
                Effect::Notify { kind, title, body } => {
                    self.notify(kind, title, body).await?;
                }
                Effect::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!("{}", message),
                    LogLevel::Info => tracing::info!("{}", message),
                    LogLevel::Warn => tracing::warn!("{}", message),
                    LogLevel::Error => tracing::error!("{}", message),
                },
            }
        }
        Ok(())
    }

    /// Create and persist the message, then fan it out. The stored message
    /// is the authoritative record whatever the channels do.
    async fn notify(
        &self,
        kind: NotificationKind,
        title: String,
        body: String,
    ) -> Result<(), EngineError> {
        let message = NotificationMessage::new(
            self.inner.id_gen.next(),
            kind,
            title,
            body,
            &self.inner.clock,
        );
        self.inner.store.save_notification(&message)?;
        self.inner.bus.publish(Event::NotificationCreated {
            id: message.id.clone(),
            kind,
            title: message.title.clone(),
        });
        self.inner
            .dispatcher
            .dispatch(&message, &self.inner.store, &self.inner.id_gen, &self.inner.clock)
            .await;
        Ok(())
    }

    fn append_job(&self, record: &JobRecord) -> Result<(), EngineError> {
        self.inner
            .journal
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .append(record)?;
        Ok(())
    }

    fn load_watch(&self, id: &str) -> Result<Watch, EngineError> {
        self.inner.store.load_watch(id).map_err(|e| match e {
            StorageError::NotFound { .. } => EngineError::NotFound {
                kind: "watch",
                id: id.to_string(),
            },
            other => other.into(),
        })
    }

    fn load_rollover(&self, id: &str) -> Result<Rollover, EngineError> {
        self.inner.store.load_rollover(id).map_err(|e| match e {
            StorageError::NotFound { .. } => EngineError::NotFound {
                kind: "rollover",
                id: id.to_string(),
            },
            other => other.into(),
        })
    }

    fn load_notification(&self, id: &str) -> Result<NotificationMessage, EngineError> {
        self.inner.store.load_notification(id).map_err(|e| match e {
            StorageError::NotFound { .. } => EngineError::NotFound {
                kind: "notification",
                id: id.to_string(),
            },
            other => other.into(),
        })
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
