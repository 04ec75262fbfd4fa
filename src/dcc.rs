//! DCC transfer control.
//!
//! A detected file offer is handled by [`handle_offer`]: dropped when DCC is
//! disabled, streamed straight to disk when auto-accept is on, or surfaced
//! to the user as a pending offer with a fixed acceptance window otherwise.
//! The byte-mover reports [`TransferProgress`] over a bounded channel owned
//! by the session; it blocks on backpressure rather than dropping updates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ircgate_proto::DccSend;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Config;
use crate::event::{DccOffer, Event, EventSink};
use crate::hub::Hub;

/// Depth of the per-session progress channel.
pub const PROGRESS_CHANNEL_DEPTH: usize = 4;

/// How long a surfaced offer stays acceptable.
pub const OFFER_EXPIRY: Duration = Duration::from_secs(150);

/// Minimum interval between intermediate progress reports.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Errors terminating a transfer.
#[derive(Debug, Error)]
pub enum DccError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed after {received} of {expected} bytes")]
    Incomplete { received: u64, expected: u64 },
}

/// Progress of one running transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferProgress {
    pub file: String,
    /// Percent complete, 0-100. Stays 0 when the length is unknown.
    pub percent: f64,
    /// Transfer rate in bytes per second.
    pub speed: f64,
    pub bytes_remaining: u64,
    pub seconds_remaining: f64,
    /// Terminal error; when set the transfer is over.
    pub error: Option<String>,
}

/// A rendered status line for one progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub content: String,
    /// Logged lines are persisted and open a `@dcc` conversation; unlogged
    /// lines are transient UI-only updates.
    pub logged: bool,
}

/// Render a progress update into its status line.
///
/// Precedence: error, then completion, then start, then continuation.
pub fn render_progress(progress: &TransferProgress, url: &str) -> StatusLine {
    if let Some(error) = &progress.error {
        StatusLine {
            content: format!("{}: Download failed ({})", progress.file, error),
            logged: true,
        }
    } else if progress.percent == 100.0 {
        StatusLine {
            content: format!("Download finished, get it here: {}", url),
            logged: true,
        }
    } else if progress.percent == 0.0 {
        StatusLine {
            content: format!("{}: Starting download", progress.file),
            logged: true,
        }
    } else {
        StatusLine {
            content: format!(
                "{}: {:.1}%, {}/s, {} remaining, {:.1}s left",
                progress.file,
                progress.percent,
                human_bytes(progress.speed),
                human_bytes(progress.bytes_remaining as f64),
                progress.seconds_remaining
            ),
            logged: false,
        }
    }
}

/// Session context an offer is handled against.
pub struct OfferContext {
    pub host: String,
    pub from: String,
    pub username: String,
    pub config: Arc<Config>,
    pub hub: Arc<Hub>,
    pub sink: Arc<dyn EventSink>,
    pub progress: mpsc::Sender<TransferProgress>,
}

/// Handle a detected DCC SEND offer.
///
/// Runs as its own task; with auto-accept off it stays alive for the whole
/// acceptance window and expires the pending offer afterwards.
pub async fn handle_offer(pack: DccSend, ctx: OfferContext) {
    if !ctx.config.dcc.enabled {
        return;
    }

    if ctx.config.dcc.autoget.enabled {
        let Some(file) = open_download_target(&ctx.config, &ctx.username, &pack.file).await else {
            return;
        };
        download(file, pack, ctx.progress).await;
    } else {
        ctx.hub.set_pending_dcc(&pack.file, pack.clone());

        ctx.sink.send(Event::DccOffer(DccOffer {
            server: ctx.host,
            from: ctx.from,
            filename: pack.file.clone(),
            url: ctx.config.download_url(&ctx.username, &pack.file),
        }));

        tokio::time::sleep(OFFER_EXPIRY).await;
        ctx.hub.delete_pending_dcc(&pack.file);
    }
}

/// Accept a pending offer on the user's behalf.
///
/// Consumes the pending entry and starts the transfer as an independent
/// task. Returns `false` when the offer already expired or the destination
/// file could not be opened.
pub async fn accept_offer(
    file_name: &str,
    username: &str,
    config: &Arc<Config>,
    hub: &Hub,
    progress: mpsc::Sender<TransferProgress>,
) -> bool {
    let Some(pack) = hub.take_pending_dcc(file_name) else {
        return false;
    };
    let Some(file) = open_download_target(config, username, &pack.file).await else {
        return false;
    };
    tokio::spawn(download(file, pack, progress));
    true
}

async fn open_download_target(config: &Config, username: &str, file_name: &str) -> Option<File> {
    let path = config.downloaded_file(username, file_name);
    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            debug!(error = %e, file = %file_name, "failed to create download directory");
            return None;
        }
    }
    match tokio::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&path)
        .await
    {
        Ok(file) => Some(file),
        Err(e) => {
            debug!(error = %e, file = %file_name, "failed to open download target");
            None
        }
    }
}

/// Stream an accepted offer to disk, reporting progress as it proceeds.
pub async fn download(file: File, pack: DccSend, progress: mpsc::Sender<TransferProgress>) {
    let file_name = pack.file.clone();
    if let Err(e) = download_inner(file, &pack, &progress).await {
        let _ = progress
            .send(TransferProgress {
                file: file_name,
                error: Some(e.to_string()),
                ..TransferProgress::default()
            })
            .await;
    }
}

async fn download_inner(
    mut file: File,
    pack: &DccSend,
    progress: &mpsc::Sender<TransferProgress>,
) -> Result<(), DccError> {
    let mut stream = TcpStream::connect((pack.ip, pack.port)).await?;

    let _ = progress
        .send(TransferProgress {
            file: pack.file.clone(),
            bytes_remaining: pack.length,
            ..TransferProgress::default()
        })
        .await;

    let mut buf = [0u8; 8192];
    let mut received: u64 = 0;
    let mut window_start = Instant::now();
    let mut window_bytes: u64 = 0;

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        file.write_all(&buf[..n]).await?;
        received += n as u64;
        window_bytes += n as u64;

        // Classic DCC ack: total received, 32-bit network byte order.
        stream.write_u32((received & 0xffff_ffff) as u32).await?;

        if pack.length > 0 && received >= pack.length {
            break;
        }

        if window_start.elapsed() >= REPORT_INTERVAL {
            let elapsed = window_start.elapsed().as_secs_f64();
            let speed = window_bytes as f64 / elapsed;
            let bytes_remaining = pack.length.saturating_sub(received);
            let percent = if pack.length > 0 {
                received as f64 / pack.length as f64 * 100.0
            } else {
                0.0
            };
            let seconds_remaining = if speed > 0.0 {
                bytes_remaining as f64 / speed
            } else {
                0.0
            };

            progress
                .send(TransferProgress {
                    file: pack.file.clone(),
                    percent,
                    speed,
                    bytes_remaining,
                    seconds_remaining,
                    error: None,
                })
                .await
                .ok();

            window_start = Instant::now();
            window_bytes = 0;
        }
    }

    file.flush().await?;

    if pack.length > 0 && received < pack.length {
        return Err(DccError::Incomplete {
            received,
            expected: pack.length,
        });
    }

    let _ = progress
        .send(TransferProgress {
            file: pack.file.clone(),
            percent: 100.0,
            ..TransferProgress::default()
        })
        .await;

    Ok(())
}

/// Format a byte quantity with SI units, one decimal above bytes.
fn human_bytes(n: f64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut value = n;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", value.round() as u64)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
