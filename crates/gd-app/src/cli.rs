use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gd_core::config::ConvertConfig;

/// glyphdither — image → glyphes ASCII par diffusion d'erreur.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    pub image: PathBuf,

    /// Fichier de configuration TOML. Défaut : config/default.toml s'il existe.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Formule de luminance : luminance, lightness, average, norm, r, g, b, max, min.
    #[arg(long)]
    pub mode: Option<String>,

    /// Inverser la luminance (texte sombre sur fond clair).
    #[arg(long, default_value_t = false)]
    pub invert: bool,

    /// Pondérer la luminance par le canal alpha.
    #[arg(long, default_value_t = false)]
    pub alpha: bool,

    /// Charset preset : default, compact, blocks.
    #[arg(long)]
    pub charset: Option<String>,

    /// Largeur cible en pixels (hauteur déduite si absente).
    #[arg(long)]
    pub width: Option<u32>,

    /// Hauteur cible en pixels (largeur déduite si absente).
    #[arg(long)]
    pub height: Option<u32>,

    /// Filtre de redimensionnement : nearest, bilinear, catmullrom, lanczos3.
    #[arg(long)]
    pub filter: Option<String>,

    /// Répétitions horizontales de chaque glyphe.
    #[arg(long)]
    pub repeat: Option<usize>,

    /// Terminateur de ligne (séquences \n, \r, \t interprétées).
    #[arg(long)]
    pub end: Option<String>,

    /// Écrire le résultat dans un fichier au lieu de stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Afficher la fréquence de chaque glyphe.
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Afficher les informations de l'image source.
    #[arg(long, default_value_t = false)]
    pub info: bool,

    /// Écrire la grille d'erreur de quantification dans ce fichier.
    #[arg(long)]
    pub errors: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration.
    ///
    /// # Errors
    /// Returns an error for an unknown mode, filter or charset preset.
    pub fn apply_overrides(&self, config: &mut ConvertConfig) -> Result<()> {
        if let Some(ref mode) = self.mode {
            config.mode = mode.parse()?;
        }
        if self.invert {
            config.invert = true;
        }
        if self.alpha {
            config.alpha = true;
        }
        if let Some(ref name) = self.charset {
            config.apply_preset(name)?;
        }
        if self.width.is_some() {
            config.width = self.width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if let Some(ref filter) = self.filter {
            config.filter = filter.parse()?;
        }
        if let Some(repeat) = self.repeat {
            config.glyph_repeat = repeat;
        }
        if let Some(ref end) = self.end {
            config.row_terminator = unescape(end);
        }
        if self.errors.is_some() {
            config.record_errors = true;
        }
        config.clamp_all();
        Ok(())
    }
}

/// Interpret `\n`, `\r`, `\t` and `\\` typed literally on the command line.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
