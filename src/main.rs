//! Command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse arguments and load [`AppConfig`] (defaults on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Dispatch the subcommand:
//!    * `render` : align syllable weights onto the verse text.
//!    * `play`   : karaoke playback driven by the playback session.
//!    * `pattern`: grouped L/G pattern of a token file.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use chandas_karaoke::{
    analysis::{decode_response, ApiAnalyzer, ChandasAnalysis, ChandasAnalyzer, FallbackAnalyzer},
    config::AppConfig,
    playback::{
        lock_controller, new_shared_controller, run_session, spawn_ticker, ClockEngine,
        PlaybackCommand, PlaybackEvent, PlaybackState,
    },
    prosody::{grouped_pattern, Aligner, SyllableStream, SyllableToken},
    render::{karaoke_line, paint_aligned, pattern_table, status_line, Palette},
    timing::{TimingTree, Verse},
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "chandas-karaoke")]
#[command(about = "Syllable-weight rendering and karaoke playback for Sanskrit verses")]
struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, env = "CHANDAS_KARAOKE_CONFIG")]
    config: Option<PathBuf>,

    /// Disable ANSI colours.
    #[arg(long, default_value_t = false)]
    no_colour: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a verse with each syllable coloured by weight.
    Render {
        verse: PathBuf,
        /// Syllable tokens (JSON array or a saved service response).
        #[arg(long, conflicts_with = "analyze")]
        tokens: Option<PathBuf>,
        /// Ask the chandas service for the syllable breakdown.
        #[arg(long, default_value_t = false)]
        analyze: bool,
        /// Emit the alignment as JSON instead of coloured text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Play a verse's recitation with the active word highlighted.
    Play {
        verse: PathBuf,
        /// Audio file; defaults to the verse's own `audio` reference.
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Start position in milliseconds.
        #[arg(long, default_value_t = 0)]
        from: i64,
        /// Clock rate multiplier (overrides the configured rate).
        #[arg(long)]
        rate: Option<f64>,
    },
    /// Print the grouped L/G pattern of a token file.
    Pattern {
        #[arg(long)]
        tokens: PathBuf,
        /// Syllables per group (overrides the configured size).
        #[arg(long)]
        group: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read tokens from either a bare `[{syllable, type, position}]` array or a
/// full `/chandas/identify` response.
fn load_tokens(path: &Path) -> Result<Vec<SyllableToken>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading tokens from {}", path.display()))?;
    if let Ok(tokens) = serde_json::from_str::<Vec<SyllableToken>>(&content) {
        return Ok(tokens);
    }
    let analysis = decode_response(&content)
        .with_context(|| format!("parsing tokens in {}", path.display()))?;
    Ok(analysis.tokens)
}

fn load_verse(path: &Path) -> Result<Verse> {
    Verse::load(path).with_context(|| format!("loading verse {}", path.display()))
}

/// The verse text, or its lines joined when the verse carries none.
fn verse_text(verse: &Verse) -> String {
    if !verse.text.trim().is_empty() {
        return verse.text.clone();
    }
    verse
        .lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn run_render(
    rt: &tokio::runtime::Runtime,
    config: &AppConfig,
    palette: &Palette,
    verse_path: &Path,
    tokens: Option<&Path>,
    analyze: bool,
    json: bool,
) -> Result<()> {
    let verse = load_verse(verse_path)?;
    let text = verse_text(&verse);

    let analysis = if let Some(path) = tokens {
        ChandasAnalysis {
            tokens: load_tokens(path)?,
            ..ChandasAnalysis::default()
        }
    } else if analyze {
        if !config.analysis.enabled {
            bail!("chandas analysis is disabled in settings");
        }
        let analyzer: Arc<dyn ChandasAnalyzer> =
            Arc::new(FallbackAnalyzer::new(ApiAnalyzer::from_config(&config.analysis)));
        rt.block_on(analyzer.analyze(&text))?
    } else {
        ChandasAnalysis::default()
    };

    let aligned = Aligner::default().align_text(&text, &analysis.stream());

    if json {
        println!("{}", serde_json::to_string_pretty(&aligned)?);
        return Ok(());
    }

    if !analysis.chandas_name.is_empty() {
        println!("{} ({:.0}%)", analysis.chandas_name, analysis.confidence * 100.0);
    }
    println!("{}", paint_aligned(&aligned, palette));
    if !analysis.is_empty() {
        println!();
        println!("{}", pattern_table(&analysis.tokens, config.render.group_size, palette));
    }
    Ok(())
}

fn run_pattern(
    config: &AppConfig,
    palette: &Palette,
    tokens: &Path,
    group: Option<usize>,
) -> Result<()> {
    let tokens = SyllableStream::new(load_tokens(tokens)?).into_tokens();
    let group_size = group.unwrap_or(config.render.group_size);
    println!("{}", grouped_pattern(&tokens, group_size));
    println!("{}", pattern_table(&tokens, group_size, palette));
    Ok(())
}

async fn run_play(
    config: &AppConfig,
    palette: &Palette,
    verse_path: &Path,
    audio: Option<PathBuf>,
    from: i64,
    rate: Option<f64>,
) -> Result<()> {
    let verse = load_verse(verse_path)?;
    let uri = match (audio, verse.audio.as_deref()) {
        (Some(path), _) => path,
        (None, Some(reference)) => config.playback.resolve_audio(verse_path, reference),
        (None, None) => bail!("verse {:?} has no audio; pass --audio", verse.id),
    };
    let tree = TimingTree::checked(verse);

    let engine = ClockEngine::new(rate.unwrap_or(config.playback.playback_rate));
    let controller = new_shared_controller(engine);

    let (cmd_tx, cmd_rx) = mpsc::channel::<PlaybackCommand>(32);
    let (evt_tx, mut evt_rx) = mpsc::channel::<PlaybackEvent>(64);

    let session = tokio::spawn(run_session(Arc::clone(&controller), cmd_rx, evt_tx));
    let ticker = spawn_ticker(
        Arc::clone(&controller),
        cmd_tx.clone(),
        Duration::from_millis(config.playback.tick_interval_ms.max(1)),
    );

    cmd_tx
        .send(PlaybackCommand::Load {
            tree: tree.clone(),
            uri: uri.to_string_lossy().into_owned(),
            autoplay: config.playback.autoplay,
        })
        .await?;
    if from > 0 {
        cmd_tx.send(PlaybackCommand::Seek(from)).await?;
    }
    cmd_tx.send(PlaybackCommand::Play).await?;

    let mut duration_ms = tree.duration_ms();
    let mut outcome = Ok(());
    loop {
        let event = tokio::select! {
            event = evt_rx.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                cmd_tx.send(PlaybackCommand::Stop).await?;
                continue;
            }
        };
        let Some(event) = event else { break };

        match event {
            PlaybackEvent::StateChanged(state) => {
                log::debug!("playback state: {}", state.label());
                let track_ms = lock_controller(&controller).duration_ms();
                if track_ms > 0 {
                    duration_ms = track_ms;
                }
                if state == PlaybackState::Stopped {
                    println!();
                    break;
                }
            }
            PlaybackEvent::Highlight {
                position_ms,
                active,
            } => {
                print!(
                    "\r\x1b[2K{}  {}",
                    status_line(PlaybackState::Playing, position_ms, duration_ms),
                    karaoke_line(&tree, active, palette)
                );
                std::io::stdout().flush()?;
            }
            PlaybackEvent::Seeked(position_ms) => {
                log::debug!("seeked to {position_ms} ms");
            }
            PlaybackEvent::Finished => {
                cmd_tx.send(PlaybackCommand::Stop).await?;
            }
            PlaybackEvent::Error(e) => {
                outcome = Err(anyhow::Error::new(e).context(format!("playing {}", uri.display())));
                break;
            }
        }
    }

    ticker.abort();
    drop(cmd_tx);
    drop(evt_rx);
    session.await?;
    outcome
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Arguments and configuration
    let cli = Cli::parse();
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if cli.no_colour {
        config.render.colour = false;
    }
    let palette = Palette::from_config(&config.render);

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Dispatch
    match cli.command {
        Command::Render {
            verse,
            tokens,
            analyze,
            json,
        } => run_render(&rt, &config, &palette, &verse, tokens.as_deref(), analyze, json),
        Command::Play {
            verse,
            audio,
            from,
            rate,
        } => rt.block_on(run_play(&config, &palette, &verse, audio, from, rate)),
        Command::Pattern { tokens, group } => run_pattern(&config, &palette, &tokens, group),
    }
}
