use super::schema::Config;

const THEMES: [&str; 3] = ["auto", "dark", "light"];

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref file) = config.export_file {
        if file.trim().is_empty() {
            errors.push("export_file: must not be empty".to_string());
        }
    }

    if let Some(ref dir) = config.data_dir {
        if dir.trim().is_empty() {
            errors.push("data_dir: must not be empty".to_string());
        }
    }

    if let Some(ref theme) = config.theme {
        if !THEMES.contains(&theme.as_str()) {
            errors.push(format!(
                "theme: invalid '{}' - expected one of {}",
                theme,
                THEMES.join(", ")
            ));
        }
    }

    if let Some(ref duration) = config.flash_duration {
        if let Err(e) = humantime::parse_duration(duration) {
            errors.push(format!(
                "flash_duration: invalid format '{}' - {}",
                duration, e
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
