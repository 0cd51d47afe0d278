//! Fixed-step simulation tick
//!
//! One tick is motion → contact detection → dominance resolution →
//! convergence check. It cannot fail for any arena/population pair.

use super::collision::detect_contacts;
use super::dominance::{CollisionResponse, Conversion, resolve_all};
use super::motion::{advance_all, resettle};
use super::state::{Kind, RunPhase, SimulationRun};

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Contacting pairs found this tick
    pub contacts: usize,
    /// Kind changes, in resolution order
    pub conversions: Vec<Conversion>,
    /// Set on the single tick where the run converged
    pub converged: Option<Kind>,
}

/// Advance a run by one tick.
///
/// Converged runs are frozen: the call is a no-op and reports nothing, so
/// convergence is reported exactly once per run.
pub fn tick(run: &mut SimulationRun, response: CollisionResponse) -> TickOutcome {
    if run.is_converged() {
        return TickOutcome::default();
    }

    run.time_ticks += 1;
    run.phase = RunPhase::Running;

    advance_all(&mut run.entities, &run.arena);

    let pairs = detect_contacts(&run.entities);
    let conversions = resolve_all(&mut run.entities, &pairs, response);
    if response == CollisionResponse::Bounce && !conversions.is_empty() {
        for entity in run.entities.iter_mut() {
            resettle(entity, &run.arena);
        }
    }

    let converged = run.census().sole_kind();
    if let Some(winner) = converged {
        run.phase = RunPhase::Converged { winner };
        log::info!(
            "Run {} converged on {} after {} ticks",
            run.id,
            winner,
            run.time_ticks
        );
    }

    TickOutcome {
        contacts: pairs.len(),
        conversions,
        converged,
    }
}
