use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gbp_catalog::EntityKind;
use gbp_db::list_dumps;
use gbp_seed::LogProgress;
use gbp_server::Settings;

use crate::{CliError, log_blank, open_store};

pub(crate) fn run_dump(settings: &Settings, file: &Path, notes: &str) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let (stats, saved) = gbp_seed::dump_and_save(&store, file, notes, &LogProgress)
        .map_err(|e| CliError::seed(format!("Dump to {} failed: {}", file.display(), e)))?;

    log_blank();
    log::info!(
        "{} {}",
        "Dumped to".if_supports_color(Stdout, |t| t.bold()),
        file.display()
    );
    for kind in EntityKind::ALL {
        let rows = stats.rows.get(&kind).copied().unwrap_or(0);
        log::info!("  {:<20} {:>8}", kind.dump_table(), rows);
    }
    log::info!("  {:<20} {:>8}", "icons", stats.icons);
    log_blank();
    log::info!("  Dump record: {}", saved.id);
    log::info!(
        "  Hash:        {}",
        saved.hash.if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

pub(crate) fn run_dumps(settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let mut dumps = list_dumps(store.conn())
        .map_err(|e| CliError::store(format!("Failed to list dumps: {}", e)))?;

    if dumps.is_empty() {
        log::info!("No dumps recorded.");
        return Ok(());
    }

    dumps.reverse();
    for dump in dumps {
        log::info!(
            "{}  {}  {}",
            dump.id.if_supports_color(Stdout, |t| t.bold()),
            dump.created,
            dump.hash.if_supports_color(Stdout, |t| t.cyan()),
        );
        if !dump.notes.is_empty() {
            log::info!("    {}", dump.notes);
        }
    }
    Ok(())
}
