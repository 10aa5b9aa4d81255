use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gd_ascii::stats::glyph_frequencies;
use gd_core::config::{ConvertConfig, load_config};

pub mod cli;
pub mod pipeline;
pub mod render;

const DEFAULT_CONFIG: &str = "config/default.toml";

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config)?;
    log::debug!("Config : {config:?}");

    // 4. Convertir
    let conversion = pipeline::run(&cli.image, &config)?;

    // 5. Infos source (stderr, stdout reste réservé au texte)
    if cli.info {
        let s = &conversion.source;
        eprintln!(
            "{} : {}x{} ({} pixels), {} canaux, format {}",
            cli.image.display(),
            s.width,
            s.height,
            s.pixel_count(),
            s.channels,
            s.format
        );
    }

    // 6. Rendu texte
    let glyphs = &conversion.output.glyphs;
    match cli.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Impossible de créer {}", path.display()))?;
            let mut out = BufWriter::new(file);
            render::write_grid(&mut out, glyphs, config.glyph_repeat, &config.row_terminator)?;
            out.flush()?;
            log::info!("Texte écrit dans {}", path.display());
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            render::write_grid(&mut out, glyphs, config.glyph_repeat, &config.row_terminator)?;
            out.flush()?;
        }
    }

    // 7. Statistiques
    if cli.stats {
        let freq = glyph_frequencies(glyphs, conversion.converter.palette());
        render::write_frequencies(&mut io::stderr().lock(), &freq, config.glyph_repeat)?;
    }

    // 8. Grille d'erreur
    if let (Some(path), Some(errors)) = (cli.errors.as_deref(), conversion.output.errors.as_ref()) {
        write_error_file(path, errors)?;
    }

    Ok(())
}

/// `--config` explicite : doit exister. Sinon config/default.toml si présent.
fn resolve_config(cli: &cli::Cli) -> Result<ConvertConfig> {
    if let Some(ref path) = cli.config {
        return load_config(path);
    }
    let path = PathBuf::from(DEFAULT_CONFIG);
    if path.exists() {
        load_config(&path)
    } else {
        log::debug!("Pas de {DEFAULT_CONFIG}, utilisation des défauts.");
        Ok(ConvertConfig::default())
    }
}

fn write_error_file(path: &Path, errors: &gd_core::frame::ErrorGrid) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut out = BufWriter::new(file);
    render::write_errors(&mut out, errors)?;
    out.flush()?;
    log::info!(
        "Grille d'erreur {}x{} écrite dans {}",
        errors.width,
        errors.height,
        path.display()
    );
    Ok(())
}
