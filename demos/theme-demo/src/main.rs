//! Vellum Theme Demo - Multi-Observer Theme Synchronization
//!
//! A demo application showing how several observers of one surface converge
//! on profile and theme changes through a shared store and notification bus.
//!
//! ## Usage
//!
//! ```bash
//! # List the built-in theme catalog
//! theme-demo presets
//!
//! # Show what a selector resolves to
//! theme-demo resolve tokyo-night
//!
//! # Scripted two-observer convergence walkthrough
//! theme-demo converge
//! ```

mod display;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use vellum_engine::{
    AmbientScheme, CallerId, NotificationBus, Profile, ThemeEngine, ThemeSelector,
};
use vellum_profile::InMemoryProfileStore;
use vellum_theme::{InMemoryRenderTarget, PresetCatalog};

use display::*;

/// Vellum Theme Demo - Theme Synchronization
#[derive(Parser)]
#[command(name = "theme-demo")]
#[command(about = "Multi-observer theme synchronization demo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in theme catalog
    Presets,
    /// Show what a selector resolves to
    Resolve {
        /// `system`, `custom`, or a preset id
        selector: String,
    },
    /// Demo: two observers converging on profile and theme changes
    Converge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("theme_demo=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Presets => cmd_presets(),
        Commands::Resolve { selector } => cmd_resolve(&selector),
        Commands::Converge => cmd_converge().await,
    }
}

fn cmd_presets() -> Result<()> {
    print_banner();
    print_preset_list(&PresetCatalog::default());
    Ok(())
}

fn cmd_resolve(raw: &str) -> Result<()> {
    let catalog = PresetCatalog::default();
    let profile = Profile::with_selector("Demo", ThemeSelector::parse(raw));
    print_effective(&catalog.resolve(&profile));
    Ok(())
}

async fn cmd_converge() -> Result<()> {
    print_banner();
    println!(
        "{}",
        "Two observers, one caller: a navbar and a settings page.".cyan()
    );
    println!();

    // One caller with two profiles; Imogen starts active.
    let mut imogen = Profile::with_selector("Imogen", ThemeSelector::Named("tokyo-night".into()));
    imogen.is_active = true;
    let mut rafael = Profile::with_selector("Rafael", ThemeSelector::Named("nord".into()));
    rafael.created_at_millis = imogen.created_at_millis + 1;
    let rafael_id = rafael.id.clone();

    let caller = CallerId::new("session-1");
    let store = Arc::new(InMemoryProfileStore::new());
    store.insert_profile(&caller, imogen);
    store.insert_profile(&caller, rafael);

    // The observers share the store and the bus; each paints its own surface.
    let bus = Arc::new(NotificationBus::new());
    let navbar_surface = Arc::new(InMemoryRenderTarget::new());
    let settings_surface = Arc::new(InMemoryRenderTarget::new());

    let navbar = ThemeEngine::builder(store.clone(), caller.clone(), navbar_surface.clone())
        .bus(bus.clone())
        .settle_delay(Duration::ZERO)
        .mount()
        .await?;
    let settings = ThemeEngine::builder(store.clone(), caller, settings_surface.clone())
        .bus(bus.clone())
        .settle_delay(Duration::ZERO)
        .mount()
        .await?;
    tracing::info!("both engines mounted");

    print_stage("Mounted: both observers paint Imogen's tokyo-night");
    print_surfaces(&navbar_surface, &settings_surface);

    print_stage("Settings switches the active profile to Rafael (nord)");
    settings.switch_profile(&rafael_id).await?;
    settle().await;
    print_surfaces(&navbar_surface, &settings_surface);

    print_stage("Navbar selects the dracula preset");
    navbar
        .select_preset(ThemeSelector::Named("dracula".into()))
        .await?;
    settle().await;
    print_surfaces(&navbar_surface, &settings_surface);

    print_stage("Settings opens an editor and stages two tokens (preview stays local)");
    let mut editor = settings.open_editor().await?;
    editor.stage("--background", "hsl(260 25% 12%)").await?;
    editor.stage("--accent", "hsl(150 80% 45%)").await?;
    print_surfaces(&navbar_surface, &settings_surface);

    print_stage("Settings commits the custom theme");
    editor.commit().await?;
    settle().await;
    print_surfaces(&navbar_surface, &settings_surface);

    print_stage("The environment flips to dark (ambient change, zero writes)");
    bus.publish_ambient(AmbientScheme::Dark);
    settle().await;
    print_surfaces(&navbar_surface, &settings_surface);

    print_info(&format!(
        "{} durable writes total, every one from the engine that initiated the change",
        store.write_count()
    ));
    if navbar_surface.tokens() == settings_surface.tokens()
        && navbar_surface.classes() == settings_surface.classes()
    {
        print_success("Surfaces are identical (notification-driven convergence)");
    } else {
        print_warning("Surfaces differ (unexpected)");
    }

    navbar.shutdown().await;
    settings.shutdown().await;
    print_info("Both engines shut down; the root is neutral again");

    Ok(())
}

/// Give broadcast listeners a beat to converge.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
