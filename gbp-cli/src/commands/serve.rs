use gbp_server::Settings;

use crate::CliError;

pub(crate) fn run_serve(mut settings: Settings, addr: Option<String>) -> Result<(), CliError> {
    if let Some(addr) = addr {
        settings.http.addr = addr;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(gbp_server::serve(settings))
        .map_err(|e| CliError::runtime(e.to_string()))
}
