//! Transition State Machine
//!
//! A transition replaces the active module set: every active module is
//! deactivated, the provider table and waitlist are cleared, the incoming
//! modules are activated concurrently, and finally every consumer still
//! waiting is told its service is absent.
//!
//! Phases run Idle -> Deactivating -> Activating -> Idle for reloads and
//! teardowns alike; a teardown is a transition to an empty module set and
//! leaves the registry ready for another reload. Only one transition runs at
//! a time; [`PhaseGuard`] enforces that and restores Idle if a transition is
//! abandoned part way.

use crate::module::api::{Module, ModuleError, ModuleResult};
use crate::registry::config::RegistryConfig;
use crate::registry::context::{RegistryShared, ServiceContext};
use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::state::{panic_message, TransitionPhase};
use crate::service::api::ServiceHandle;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{Id, JoinError, JoinSet};

/// What triggered a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransitionKind {
    Reload,
    Teardown,
}

/// Outcome of a successful transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSummary {
    pub kind: TransitionKind,
    pub epoch: u64,
    /// Modules deactivated at the start of the transition
    pub deactivated: Vec<String>,
    /// Modules active when the transition finished, sorted by name
    pub activated: Vec<String>,
    /// Handles whose consumers were told the service is absent
    pub unmet: Vec<ServiceHandle>,
    pub watchdog_fired: bool,
    pub elapsed: Duration,
}

/// Owns the registry's phase for the duration of one transition
struct PhaseGuard {
    shared: Arc<RegistryShared>,
    finished: bool,
}

impl PhaseGuard {
    /// Move Idle -> Deactivating and open a new epoch
    fn begin(shared: &Arc<RegistryShared>) -> RegistryResult<(Self, u64)> {
        let mut state = shared.lock()?;
        match state.phase {
            TransitionPhase::Idle => {}
            phase => return Err(RegistryError::TransitionInProgress { phase }),
        }
        state.phase = TransitionPhase::Deactivating;
        state.epoch += 1;
        let epoch = state.epoch;
        drop(state);

        Ok((
            Self {
                shared: Arc::clone(shared),
                finished: false,
            },
            epoch,
        ))
    }

    fn set(&self, phase: TransitionPhase) -> RegistryResult<()> {
        self.shared.lock()?.phase = phase;
        Ok(())
    }

    fn finish(mut self) {
        self.shared.lock_unpoisoned().phase = TransitionPhase::Idle;
        self.finished = true;
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if !self.finished {
            log::warn!("Transition abandoned before completion; registry returned to idle");
            let mut state = self.shared.lock_unpoisoned();
            state.phase = TransitionPhase::Idle;
            state.sealed = true;
        }
    }
}

/// Keep only the last module for each name, in order of those last occurrences
pub(crate) fn dedupe_by_name(modules: Vec<Arc<dyn Module>>) -> Vec<Arc<dyn Module>> {
    let mut slots: Vec<Option<Arc<dyn Module>>> = Vec::with_capacity(modules.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for module in modules {
        let name = module.name().to_string();
        if let Some(previous) = positions.insert(name.clone(), slots.len()) {
            log::debug!("Module '{}' shadowed by a later module of the same name", name);
            slots[previous] = None;
        }
        slots.push(Some(module));
    }

    slots.into_iter().flatten().collect()
}

/// Run one full transition to `modules`
pub(crate) async fn run_transition(
    shared: &Arc<RegistryShared>,
    config: &RegistryConfig,
    modules: Vec<Arc<dyn Module>>,
    kind: TransitionKind,
) -> RegistryResult<TransitionSummary> {
    let started = Instant::now();
    let (guard, epoch) = PhaseGuard::begin(shared)?;
    log::info!(
        "Transition {} ({}) started with {} incoming modules",
        epoch,
        kind,
        modules.len()
    );

    let deactivated = deactivate_all(shared)?;

    let discarded = shared.lock()?.open_epoch();
    if discarded > 0 {
        log::debug!(
            "Discarded {} unresolved subscriptions from the previous epoch",
            discarded
        );
    }

    guard.set(TransitionPhase::Activating)?;
    let modules = dedupe_by_name(modules);
    let outcome = activate_all(shared, config, epoch, modules).await?;

    let unmet = sweep_unmet(shared)?;

    if !outcome.failures.is_empty() && config.rollback_on_failure {
        rollback(shared, &outcome.activated)?;
    }

    guard.finish();

    let mut failures = outcome.failures.into_iter();
    if let Some((module, source)) = failures.next() {
        log::error!("Transition {} failed: {}", epoch, source);
        return Err(RegistryError::ActivationFailed {
            module,
            source,
            others: failures.map(|(name, _)| name).collect(),
        });
    }

    let mut activated = outcome.activated;
    activated.sort();
    let summary = TransitionSummary {
        kind,
        epoch,
        deactivated,
        activated,
        unmet,
        watchdog_fired: outcome.watchdog_fired,
        elapsed: started.elapsed(),
    };
    log::info!(
        "Transition {} ({}) complete: {} active, {} deactivated, {} unmet services in {:?}",
        epoch,
        kind,
        summary.activated.len(),
        summary.deactivated.len(),
        summary.unmet.len(),
        summary.elapsed
    );
    Ok(summary)
}

/// Deactivate and remove every active module, one at a time
fn deactivate_all(shared: &Arc<RegistryShared>) -> RegistryResult<Vec<String>> {
    let mut names: Vec<String> = shared.lock()?.active.keys().cloned().collect();
    names.sort();

    for name in &names {
        let module = shared.lock()?.active.get(name).cloned();
        if let Some(module) = module {
            log::debug!("Deactivating module '{}'", name);
            module.deactivate();
        }
        shared.lock()?.active.remove(name);
    }
    Ok(names)
}

struct ActivationOutcome {
    activated: Vec<String>,
    failures: Vec<(String, ModuleError)>,
    watchdog_fired: bool,
}

/// Activate every module concurrently and wait for all of them
async fn activate_all(
    shared: &Arc<RegistryShared>,
    config: &RegistryConfig,
    epoch: u64,
    modules: Vec<Arc<dyn Module>>,
) -> RegistryResult<ActivationOutcome> {
    let mut tasks: JoinSet<ModuleResult<()>> = JoinSet::new();
    let mut pending: HashMap<Id, Arc<dyn Module>> = HashMap::new();

    for module in modules {
        let context = ServiceContext::new(Arc::clone(shared), epoch, module.name());
        let task_module = Arc::clone(&module);
        let handle = tasks.spawn(async move { task_module.activate(context).await });
        pending.insert(handle.id(), module);
    }

    let mut outcome = ActivationOutcome {
        activated: Vec::new(),
        failures: Vec::new(),
        watchdog_fired: false,
    };

    let watchdog = tokio::time::sleep(config.watchdog_delay);
    tokio::pin!(watchdog);

    loop {
        tokio::select! {
            joined = tasks.join_next_with_id() => {
                let Some(joined) = joined else { break };
                let (id, result) = match joined {
                    Ok((id, result)) => (id, result),
                    Err(e) => (e.id(), Err(panic_error(&pending, e))),
                };
                let Some(module) = pending.remove(&id) else { continue };
                let name = module.name().to_string();

                match result {
                    Ok(()) => {
                        log::debug!("Module '{}' activated", name);
                        shared.lock()?.active.insert(name.clone(), module);
                        outcome.activated.push(name);
                    }
                    Err(e) => {
                        log::error!("Module '{}' failed to activate: {}", name, e);
                        outcome.failures.push((name, e));
                    }
                }
            }
            _ = &mut watchdog, if !outcome.watchdog_fired => {
                outcome.watchdog_fired = true;
                report_outstanding(shared, &pending);
            }
        }
    }

    Ok(outcome)
}

fn panic_error(pending: &HashMap<Id, Arc<dyn Module>>, error: JoinError) -> ModuleError {
    let module = pending
        .get(&error.id())
        .map(|m| m.name().to_string())
        .unwrap_or_default();
    let message = if error.is_panic() {
        panic_message(error.into_panic().as_ref())
    } else {
        "activation task was cancelled".to_string()
    };
    ModuleError::Panicked { module, message }
}

fn report_outstanding(shared: &Arc<RegistryShared>, pending: &HashMap<Id, Arc<dyn Module>>) {
    let mut modules: Vec<&str> = pending.values().map(|m| m.name()).collect();
    modules.sort();
    let waiting: Vec<String> = shared
        .lock_unpoisoned()
        .waiting_modules()
        .into_iter()
        .map(|(handle, consumers)| format!("'{}' <- {}", handle, consumers.join(", ")))
        .collect();

    log::info!(
        "Activation still running for modules [{}]",
        modules.join(", ")
    );
    // Absent notifications are only sent once every activation has returned
    if !waiting.is_empty() {
        log::info!("Unresolved subscriptions: [{}]", waiting.join("; "));
    }
}

/// Seal the epoch and tell every remaining consumer its service is absent
fn sweep_unmet(shared: &Arc<RegistryShared>) -> RegistryResult<Vec<ServiceHandle>> {
    let unmet = shared.lock()?.seal_epoch();

    let mut handles = Vec::with_capacity(unmet.len());
    for (handle, consumers) in unmet {
        log::info!(
            "Service '{}' unavailable; notifying {} consumers",
            handle,
            consumers.len()
        );
        for consumer in consumers {
            log::trace!("Notifying '{}' that '{}' is absent", consumer.module(), handle);
            consumer.notify(None);
        }
        handles.push(handle);
    }
    Ok(handles)
}

/// Deactivate modules activated by a failed transition
fn rollback(shared: &Arc<RegistryShared>, activated: &[String]) -> RegistryResult<()> {
    log::warn!(
        "Rolling back {} modules activated by the failed transition",
        activated.len()
    );
    for name in activated {
        let module = shared.lock()?.active.get(name).cloned();
        if let Some(module) = module {
            module.deactivate();
        }
        shared.lock()?.active.remove(name);
    }
    shared.lock()?.providers.clear();
    Ok(())
}
