//! Command implementations

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::app::container::AppContainer;
use crate::app::session::Session;
use crate::cli::args::{ClipArgs, TimeArgs};
use crate::domain::model::{QualityTier, TimeRange, TimeSpec, DERIVED_DOWNLOAD_NAME};

const SESSION_HELP: &str = "\
commands:
  download <url> [quality]   fetch a video (quality: best, 2160, 720, 480, 360)
  crop [start] <end>         cut start..end out of it (m:s or seconds)
  save [path]                copy the clip out (default cropped_video.mp4)
  status                     show the current phase and files
  reset                      discard everything downloaded so far
  quit                       reset and leave";

/// Execute the clip command
///
/// The session is always reset afterwards so nothing stays behind in the
/// work root, whether the clip succeeded or not.
pub async fn clip<W: Write>(
    container: &dyn AppContainer,
    args: ClipArgs,
    default_quality: QualityTier,
    out: &mut W,
) -> Result<()> {
    // a bad range should fail before anything is downloaded
    let range = TimeRange::parse(&args.start, &args.end)
        .with_context(|| format!("Invalid range '{}'..'{}'", args.start, args.end))?;
    let quality = args.quality.unwrap_or(default_quality);
    info!("Clipping {} at {} ({})", args.url, quality, range);

    let mut session = container.new_session();
    let result = run_clip(&mut session, &args, quality, range, out).await;

    if let Err(e) = session.reset().await {
        warn!("Work area not fully removed: {}", e);
    }
    result
}

async fn run_clip<W: Write>(
    session: &mut Session,
    args: &ClipArgs,
    quality: QualityTier,
    range: TimeRange,
    out: &mut W,
) -> Result<()> {
    let downloaded = session
        .download(&args.url, quality)
        .await
        .context("Download failed")?;
    info!("Downloaded {}", downloaded.source.file_name());

    let outcome = session.crop_range(range).await.context("Crop failed")?;
    if outcome.clamped {
        writeln!(out, "note: end clamped to {}", outcome.range.end())?;
    }

    let written = session
        .export_derived(&args.output)
        .await
        .with_context(|| format!("Failed to save clip to {}", args.output.display()))?;
    writeln!(out, "{} ({} bytes)", args.output.display(), written)?;
    Ok(())
}

/// Execute the session command, reading one command per line from `input`
pub async fn session<R, W>(
    container: &dyn AppContainer,
    default_quality: QualityTier,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = container.new_session();

    let mut phases = session.subscribe();
    tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            debug!(%phase, "Session phase changed");
        }
    });

    let result = run_session(&mut session, default_quality, input, out).await;

    if let Err(e) = session.reset().await {
        warn!("Work area not fully removed: {}", e);
        if result.is_ok() {
            writeln!(out, "warning: {}", e)?;
        }
    }
    result
}

async fn run_session<R, W>(
    session: &mut Session,
    default_quality: QualityTier,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", SESSION_HELP)?;
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };
        if matches!(command, "quit" | "exit") {
            break;
        }
        if let Err(e) = run_session_command(session, command, rest, default_quality, out).await {
            writeln!(out, "error: {:#}", e)?;
        }
        out.flush()?;
    }
    Ok(())
}

async fn run_session_command<W: Write>(
    session: &mut Session,
    command: &str,
    args: &[&str],
    default_quality: QualityTier,
    out: &mut W,
) -> Result<()> {
    match (command, args) {
        ("download", [url, rest @ ..]) if rest.len() <= 1 => {
            let quality = match rest.first() {
                Some(text) => QualityTier::parse(text)?,
                None => default_quality,
            };
            let outcome = session.download(url, quality).await?;
            for warning in &outcome.warnings {
                writeln!(out, "warning: {}", warning)?;
            }
            writeln!(out, "ready: {}", outcome.source)?;
        }
        ("crop", [end]) => crop(session, "", end, out).await?,
        ("crop", [start, end]) => crop(session, start, end, out).await?,
        ("save", []) => save(session, Path::new(DERIVED_DOWNLOAD_NAME), out).await?,
        ("save", [path]) => save(session, Path::new(path), out).await?,
        ("status", []) => status(session, out)?,
        ("reset", []) => {
            if let Err(e) = session.reset().await {
                writeln!(out, "warning: {}", e)?;
            }
            writeln!(out, "idle")?;
        }
        ("help", _) => writeln!(out, "{}", SESSION_HELP)?,
        _ => writeln!(out, "unknown command '{}', try help", command)?,
    }
    Ok(())
}

async fn crop<W: Write>(session: &mut Session, start: &str, end: &str, out: &mut W) -> Result<()> {
    let outcome = session.crop(start, end).await?;
    if outcome.clamped {
        writeln!(out, "note: end clamped to {}", outcome.range.end())?;
    }
    writeln!(out, "cropped: {} ({})", outcome.derived, outcome.range)?;
    Ok(())
}

async fn save<W: Write>(session: &Session, dest: &Path, out: &mut W) -> Result<()> {
    let written = session.export_derived(dest).await?;
    writeln!(out, "saved {} bytes to {}", written, dest.display())?;
    Ok(())
}

fn status<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    writeln!(out, "phase: {}", session.phase())?;
    if let Some(source) = session.source() {
        writeln!(out, "source: {}", source)?;
    }
    if let Some(derived) = session.derived() {
        writeln!(out, "clip: {}", derived)?;
    }
    let actions: Vec<String> = session
        .available_actions()
        .iter()
        .map(ToString::to_string)
        .collect();
    writeln!(out, "actions: {}", actions.join(", "))?;
    Ok(())
}

/// Execute the time command
pub fn time<W: Write>(args: &TimeArgs, out: &mut W) -> Result<()> {
    let mut failed = Vec::new();
    for value in &args.values {
        match TimeSpec::parse(value) {
            Ok(spec) => writeln!(out, "{} = {}s ({})", value, spec.as_seconds(), spec)?,
            Err(e) => {
                writeln!(out, "{}: {}", value, e)?;
                failed.push(value.clone());
            }
        }
    }
    if !failed.is_empty() {
        anyhow::bail!("could not parse {}", failed.join(", "));
    }
    Ok(())
}
