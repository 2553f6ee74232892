//! Wires settings, catalogue, configuration, and manager together.

use std::io::Write;

use camino::Utf8PathBuf;
use color_eyre::eyre::Result;
use content_loc::{
    ConfigSource, ConfigVars, FluentCatalog, LANGUAGE_CVAR, LocValue, LocalizationManager,
    LocalizationSettings,
};

use crate::cli::Cli;

/// Catalogue shipped with the demo.
fn bundled_catalog_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/locales"))
}

/// Settings from file and environment with command-line overrides applied.
fn resolve_settings(cli: &Cli) -> Result<LocalizationSettings> {
    let mut settings = LocalizationSettings::load(cli.config_path.as_deref())?;
    if let Some(dir) = &cli.catalog_dir {
        settings.catalog_dir = Some(dir.clone());
    }
    if let Some(language) = &cli.language {
        settings.language.clone_from(language);
    }
    Ok(settings)
}

/// Renders `cli.id` to `out`, then again after `--switch-to` if given.
///
/// # Errors
///
/// Fails when settings cannot be loaded, the fallback culture or catalogue
/// cannot be initialised, or writing to `out` fails.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let root = settings
        .catalog_dir
        .clone()
        .unwrap_or_else(bundled_catalog_dir);
    tracing::debug!(root = %root, language = %settings.language, "rendering message");

    let manager = LocalizationManager::new(FluentCatalog::new().with_directory(root));
    manager.initialize(&settings.fallback_language)?;
    let vars = ConfigVars::from_settings(&settings);
    manager.attach_config(&vars)?;

    let args: Vec<(&str, LocValue)> = cli
        .args
        .iter()
        .map(|arg| (arg.name.as_str(), arg.value.clone()))
        .collect();
    writeln!(out, "{}", manager.get_string(&cli.id, &args))?;

    if let Some(next) = &cli.switch_to {
        vars.set(LANGUAGE_CVAR.name, next)?;
        writeln!(out, "{}", manager.get_string(&cli.id, &args))?;
    }
    Ok(())
}
