use std::path::Path;

use crate::CliError;

/// Print the digest of `file`; with `dest`, also write it there.
pub(crate) fn run_hash(file: &Path, dest: Option<&Path>) -> Result<(), CliError> {
    let hash = gbp_seed::hash_file(file).map_err(|e| CliError::seed(e.to_string()))?;
    println!("{}", hash);

    if let Some(dest) = dest {
        gbp_seed::write_hash(&hash, dest).map_err(|e| CliError::seed(e.to_string()))?;
        log::debug!("Wrote hash to {}", dest.display());
    }
    Ok(())
}
