use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gbp_catalog::EntityKind;
use gbp_seed::{LogProgress, SeedStats};
use gbp_server::Settings;

use crate::{CliError, log_blank, open_store};

pub(crate) fn run_seed(settings: &Settings, file: &Path) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let stats = gbp_seed::seed(&store, file, &LogProgress)
        .map_err(|e| CliError::seed(format!("Seeding from {} failed: {}", file.display(), e)))?;

    print_seed_stats(&stats);
    Ok(())
}

pub(crate) fn run_restore(settings: &Settings, dump_id: &str) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let stats = gbp_seed::restore(&store, dump_id, &LogProgress)
        .map_err(|e| CliError::seed(format!("Restore failed: {}", e)))?;

    print_seed_stats(&stats);
    Ok(())
}

fn print_seed_stats(stats: &SeedStats) {
    log_blank();
    log::info!(
        "{}",
        "Seed complete".if_supports_color(Stdout, |t| t.bold())
    );
    log::info!(
        "  {:<20} {:>8} {:>8} {:>10}",
        "Kind",
        "Created",
        "Updated",
        "Unchanged"
    );
    for kind in EntityKind::ALL {
        let k = stats.kind(kind);
        log::info!(
            "  {:<20} {:>8} {:>8} {:>10}",
            kind.collection(),
            k.created,
            k.updated,
            k.unchanged
        );
    }
    log_blank();
    log::info!(
        "  {} created, {} updated, {} unchanged",
        stats.created().if_supports_color(Stdout, |t| t.green()),
        stats.updated().if_supports_color(Stdout, |t| t.yellow()),
        stats.unchanged(),
    );
    log::info!(
        "  Dictionary version: {}",
        stats.hash.if_supports_color(Stdout, |t| t.cyan())
    );
}
