use clap::Parser;
use log::{error, info, warn};
use rehear::playback::gst_output::GstAudioOutput;
use rehear::player::DialoguePlayer;
use rehear::types::settings::PlayerSettings;
use rehear::ui::app::{AppState, RehearApp};
use std::path::PathBuf;

/// Play back a synthesized dialogue with line-by-line highlighting.
#[derive(Debug, Parser)]
#[command(name = "rehear", version)]
struct Args {
    /// Dialogue bundle (JSON with `lines` and `audio_base64`) to open on start.
    bundle: Option<PathBuf>,

    /// Player settings file (JSON). Missing fields use defaults.
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => PlayerSettings::load_from_file(path).inspect_err(|e| {
            error!("Failed to load settings from {}: {e}", path.display());
        })?,
        None => PlayerSettings::default(),
    };

    let mut player = DialoguePlayer::new(GstAudioOutput::open(), settings);
    let audio_blocked = match player.ensure_ready() {
        Ok(()) => false,
        Err(e) => {
            warn!("{e}");
            true
        }
    };

    let mut app = RehearApp::new(AppState {
        player,
        title: String::new(),
        audio_blocked,
        status_message: None,
    });
    if let Some(path) = &args.bundle {
        app.open_bundle(path);
    }

    info!("Starting player window");
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Rehear",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}
