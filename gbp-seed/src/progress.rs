//! Seed and dump progress reporting.

use gbp_catalog::EntityKind;

use crate::seed::SeedPhase;

/// Trait for receiving seed/dump progress updates.
pub trait SeedProgress {
    /// Called whenever the run moves to a new phase.
    fn on_phase(&self, phase: SeedPhase);

    /// Called after each row is applied or written.
    fn on_row(&self, kind: EntityKind, current: usize, total: usize, name: &str);

    /// Called when the run is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl SeedProgress for SilentProgress {
    fn on_phase(&self, _phase: SeedPhase) {}
    fn on_row(&self, _kind: EntityKind, _current: usize, _total: usize, _name: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl SeedProgress for LogProgress {
    fn on_phase(&self, phase: SeedPhase) {
        match phase {
            SeedPhase::RollingBack | SeedPhase::Failed => log::warn!("{}", phase),
            SeedPhase::Seeding(_) | SeedPhase::Dumping(_) => log::info!("{}", phase),
            _ => log::debug!("{}", phase),
        }
    }

    fn on_row(&self, kind: EntityKind, current: usize, total: usize, name: &str) {
        if current.is_multiple_of(100) || current == total {
            log::debug!("  [{}/{}] {} {}", current, total, kind, name);
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
