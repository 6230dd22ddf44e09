use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gbp_catalog::CollectionType;
use gbp_db::{CURRENT_VERSION, list_collections};
use gbp_server::Settings;

use crate::{CliError, log_blank, open_store};

pub(crate) fn run_migrate(settings: &Settings) -> Result<(), CliError> {
    // Opening the store applies pending migrations.
    let store = open_store(settings)?;
    let version = store
        .schema_version()
        .map_err(|e| CliError::store(format!("Failed to read schema version: {}", e)))?;

    log::info!(
        "Schema version {} (latest {}) at {}",
        version.if_supports_color(Stdout, |t| t.bold()),
        CURRENT_VERSION,
        settings.data_dir.display()
    );

    let collections = list_collections(store.conn())
        .map_err(|e| CliError::store(format!("Failed to list collections: {}", e)))?;
    log_blank();
    for info in collections {
        let access = match info.list_rule.as_deref() {
            Some("") => "public",
            Some(_) => "owner",
            None => "superuser",
        };
        let name = match info.collection_type {
            CollectionType::System => format!("{} (system)", info.name),
            CollectionType::Base => info.name,
        };
        log::info!(
            "  {:<28} {:<16} {}",
            name,
            info.id.if_supports_color(Stdout, |t| t.dimmed()),
            access
        );
    }
    Ok(())
}
