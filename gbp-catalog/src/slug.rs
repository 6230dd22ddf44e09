//! File-name normalization for icons extracted into dump files.

/// Build the file name an icon gets when it is written into a dump.
///
/// The stem comes from the entity name (lowercased, spaces and apostrophes
/// replaced by `_`); the extension is taken from the stored file name.
pub fn icon_file_name(entity_name: &str, stored_name: &str) -> String {
    let stem: String = entity_name
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '\'' { '_' } else { c })
        .collect();

    match extension(stored_name) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn extension(file_name: &str) -> Option<&str> {
    let (base, ext) = file_name.rsplit_once('.')?;
    if base.is_empty() || ext.is_empty() || ext.contains('/') {
        None
    } else {
        Some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_replaces_separators() {
        assert_eq!(
            icon_file_name("Wolf's Gravestone", "wolf_s_gravestone_k2j4h5g6d1.png"),
            "wolf_s_gravestone.png"
        );
        assert_eq!(
            icon_file_name("Iron Blade", "icon_abc.webp"),
            "iron_blade.webp"
        );
    }

    #[test]
    fn keeps_only_last_extension() {
        assert_eq!(icon_file_name("Pyro", "pyro.tar.png"), "pyro.png");
    }

    #[test]
    fn no_extension() {
        assert_eq!(icon_file_name("Anemo", "anemo"), "anemo");
        assert_eq!(icon_file_name("Anemo", ".hidden"), "anemo");
    }
}
