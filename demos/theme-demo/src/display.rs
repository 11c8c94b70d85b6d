//! Display utilities for the theme demo
//!
//! Provides colored output for catalog listings and render-surface snapshots.

use colored::Colorize;
use vellum_theme::{EffectiveTheme, InMemoryRenderTarget, PresetCatalog, PresetKind};

/// Print a banner
pub fn print_banner() {
    println!("{}", "=== Vellum Theme Demo ===".cyan().bold());
    println!("{}", "Multi-observer theme synchronization".dimmed());
    println!();
}

/// Print a stage heading
pub fn print_stage(msg: &str) {
    println!("{}", msg.yellow().bold());
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "[INFO]".blue().bold(), msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print the theme catalog
pub fn print_preset_list(catalog: &PresetCatalog) {
    println!("{}", format!("{} theme(s):", catalog.len()).cyan().bold());
    println!();

    for entry in catalog.iter() {
        let kind = match entry.kind {
            PresetKind::Base => "base  ".white(),
            PresetKind::Preset => "preset".magenta(),
        };
        println!(
            "  {} {} {}",
            kind,
            entry.name.white().bold(),
            format!("({})", entry.id).dimmed()
        );
        let swatch = entry
            .swatch
            .as_deref()
            .map(|s| format!(" | swatch {s}"))
            .unwrap_or_default();
        println!(
            "      {} | {} token(s){}",
            entry.description.dimmed(),
            entry.tokens.len(),
            swatch.dimmed()
        );
    }
    println!();
}

/// Print what a selector resolves to
pub fn print_effective(theme: &EffectiveTheme) {
    println!("{}", format!("=== {} ===", theme.selector).cyan().bold());
    if theme.is_neutral() {
        println!(
            "{}",
            "neutral: the surface's own color scheme shows through".dimmed()
        );
        return;
    }
    for class in &theme.classes {
        println!("  {} {}", "class".dimmed(), class.white().bold());
    }
    for (name, value) in theme.tokens.iter() {
        println!("  {} {}", name.dimmed(), value);
    }
}

/// Print one observer's render surface
pub fn print_surface(label: &str, target: &InMemoryRenderTarget) {
    let classes = target.classes();
    let class_list = if classes.is_empty() {
        "(none)".to_string()
    } else {
        classes.into_iter().collect::<Vec<_>>().join(" ")
    };
    println!(
        "  {} classes [{}], {} token(s)",
        format!("{label:<9}").white().bold(),
        class_list,
        target.tokens().len()
    );
}

/// Print both surfaces and whether they agree
pub fn print_surfaces(navbar: &InMemoryRenderTarget, settings: &InMemoryRenderTarget) {
    print_surface("navbar", navbar);
    print_surface("settings", settings);
    if navbar.tokens() == settings.tokens() && navbar.classes() == settings.classes() {
        println!("  {}", "converged: yes".green());
    } else {
        println!("  {}", "converged: no".red());
    }
    println!();
}
