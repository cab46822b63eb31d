//! Terminal watch client
//!
//! Connects to a running server, optionally issues one command, and prints
//! the shared timer as the server reports it. The elapsed time is computed
//! locally from the server's `startTime`, corrected by the offset between
//! the local clock and the server `timestamp` carried by each `start` event.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::model::{
    command::Command,
    event::Event,
    timer::{now_millis, Millis},
};
use crate::util::init_log;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/";

const REFRESH: Duration = Duration::from_secs(1);

/// The client's local rendering of the shared timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockView {
    #[default]
    Idle,
    /// `offset` is how far the local clock is ahead of the server's.
    Running { start_time: Millis, offset: Millis },
    /// Frozen at the elapsed time observed when the stop arrived.
    Stopped { elapsed: Millis },
}

impl ClockView {
    pub fn apply(&mut self, event: Event, local_now: Millis) {
        *self = match event {
            Event::Start {
                start_time,
                timestamp,
            } => ClockView::Running {
                start_time,
                offset: local_now - timestamp,
            },
            Event::Stop => ClockView::Stopped {
                elapsed: self.elapsed_millis(local_now),
            },
            Event::Reset => ClockView::Idle,
        };
    }

    /// Elapsed milliseconds on the server's clock, never negative.
    pub fn elapsed_millis(&self, local_now: Millis) -> Millis {
        match *self {
            ClockView::Idle => 0,
            ClockView::Running { start_time, offset } => (local_now - offset - start_time).max(0),
            ClockView::Stopped { elapsed } => elapsed,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ClockView::Running { .. })
    }
}

/// Formats milliseconds as `HH:MM:SS`.
pub fn format_elapsed(millis: Millis) -> String {
    let secs = millis.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Runs the watch client until the server closes or ctrl-c is pressed.
pub fn main(url: String, command: Option<Command>) -> Result<()> {
    init_log();

    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    runtime.block_on(async {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };
        run(&url, command, shutdown).await.map(|_| ())
    })
}

/// Connects, sends `command` if given, then follows the timer until the
/// server closes the connection or `shutdown` completes.
///
/// Returns the last rendered view.
pub async fn run(
    url: &str,
    command: Option<Command>,
    shutdown: impl Future<Output = ()>,
) -> Result<ClockView> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .with_context(|| format!("connecting to {url}"))?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    info!(%url, "connected to timer server");

    if let Some(command) = command {
        ws_sender
            .send(Message::text(command.encode()))
            .await
            .context("sending command")?;
        info!(?command, "sent command");
    }

    let mut view = ClockView::default();
    let mut ticker = tokio::time::interval(REFRESH);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                None | Some(Ok(Message::Close(_))) => {
                    info!("server closed the connection");
                    break;
                }
                Some(Err(e)) => return Err(e).context("reading from server"),
                Some(Ok(Message::Text(text))) => match Event::decode(text.as_str()) {
                    Ok(event) => {
                        view.apply(event, now_millis());
                        println!("{} {}", label(&event), format_elapsed(view.elapsed_millis(now_millis())));
                    }
                    Err(e) => warn!(error = %e, "ignoring unexpected frame"),
                },
                Some(Ok(_)) => {}
            },

            _ = ticker.tick() => {
                if view.is_running() {
                    println!("       {}", format_elapsed(view.elapsed_millis(now_millis())));
                }
            }

            () = &mut shutdown => break,
        }
    }

    Ok(view)
}

fn label(event: &Event) -> &'static str {
    match event {
        Event::Start { .. } => "start ",
        Event::Stop => "stop  ",
        Event::Reset => "reset ",
    }
}
