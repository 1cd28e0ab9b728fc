//! Async-friendly studio facade backed by a dedicated worker thread.
//!
//! The worker thread owns the renderer and the session state and executes
//! commands sent from async tasks, so callers get an async interface while
//! all state stays on one thread. Commands are processed one at a time,
//! which is what enforces the at-most-one-export-in-flight rule: the busy
//! flag can never race because nothing else runs while an export does.

use log::{debug, warn};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::export::{self, ExportOutcome};
use crate::session::{AssetStatus, Event, SessionState, Stage};
use crate::sizing::fit_font_size;
use crate::{Error, Renderer, Result, StudioConfig};

enum Command {
    SetName(String, oneshot::Sender<SessionState>),
    Generate(oneshot::Sender<SessionState>),
    Download(oneshot::Sender<Result<ExportOutcome>>),
    Retry(oneshot::Sender<SessionState>),
    Reset(oneshot::Sender<SessionState>),
    Snapshot(oneshot::Sender<SessionState>),
    Close(oneshot::Sender<()>),
}

/// Handle to a running certificate studio.
///
/// Cloning is cheap; all clones talk to the same worker. Dropping the last
/// clone shuts the worker down.
#[derive(Clone)]
pub struct Studio {
    cmd_tx: Sender<Command>,
}

impl Studio {
    /// Create a studio with the default renderer backend.
    pub async fn new(config: StudioConfig) -> Result<Self> {
        let renderer = crate::new_renderer(config.clone())?;
        Self::with_renderer(config, renderer).await
    }

    /// Create a studio around an explicit renderer. Useful for tests that
    /// inject a failing or instrumented backend.
    pub async fn with_renderer<R>(config: StudioConfig, mut renderer: R) -> Result<Self>
    where
        R: Renderer + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // The worker only needs timers (settle delay, debounce)
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = init_tx.send(Err(Error::InitializationError(format!(
                        "worker runtime: {}",
                        e
                    ))));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            let mut state = SessionState::default();
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::SetName(name, resp) => {
                        state.apply(Event::NameChanged(name));
                        recompute_font(&rt, &mut state, &renderer, &config);
                        let _ = resp.send(state.clone());
                    }
                    Command::Generate(resp) => {
                        state.apply(Event::GenerateRequested);
                        if state.stage == Stage::Certificate
                            && state.asset_status == AssetStatus::Loading
                        {
                            load_template(&mut state, &mut renderer);
                            recompute_font(&rt, &mut state, &renderer, &config);
                        }
                        let _ = resp.send(state.clone());
                    }
                    Command::Download(resp) => {
                        let res = download(&rt, &mut state, &renderer, &config);
                        let _ = resp.send(res);
                    }
                    Command::Retry(resp) => {
                        state.apply(Event::RetryRequested);
                        if state.stage == Stage::Certificate
                            && state.asset_status == AssetStatus::Loading
                        {
                            load_template(&mut state, &mut renderer);
                            recompute_font(&rt, &mut state, &renderer, &config);
                        }
                        let _ = resp.send(state.clone());
                    }
                    Command::Reset(resp) => {
                        state.apply(Event::ResetRequested);
                        let _ = resp.send(state.clone());
                    }
                    Command::Snapshot(resp) => {
                        let _ = resp.send(state.clone());
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
        });

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    /// Update the name field. The font size is recomputed (after the
    /// debounce) whenever the certificate stage is showing and the template
    /// is ready; otherwise the recompute is inert.
    pub async fn set_name(&self, name: &str) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::SetName(name.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("SetName canceled: {}", e)))
    }

    /// Trigger the Generate action (the Enter keypress on the name field
    /// maps to this as well). A whitespace-only name leaves the state on
    /// the form stage; otherwise the template load is kicked off and the
    /// font size is fitted once the template dimensions are known.
    pub async fn generate(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Generate(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Generate canceled: {}", e)))
    }

    /// Run the export pipeline. Fails with a typed error while the template
    /// is loading or failed, or when nothing has been generated yet. The
    /// busy flag is cleared on every exit path, so a failed download can
    /// always be retried.
    pub async fn download(&self) -> Result<ExportOutcome> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Download(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Download canceled: {}", e)))?
    }

    /// Retry the template load after a failure (the full-reload retry
    /// affordance). Inert unless the certificate stage shows a failed
    /// asset.
    pub async fn retry_assets(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Retry(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Retry canceled: {}", e)))
    }

    /// The Create Another action: back to the form stage with a fresh
    /// default record.
    pub async fn reset(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Reset(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Reset canceled: {}", e)))
    }

    /// Current session state.
    pub async fn snapshot(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Snapshot(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Snapshot canceled: {}", e)))
    }

    /// Shut down the worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}

fn load_template<R: Renderer>(state: &mut SessionState, renderer: &mut R) {
    match renderer.load_template() {
        Ok(info) => {
            debug!("template loaded: {}x{}", info.width, info.height);
            state.apply(Event::AssetLoaded);
        }
        Err(e) => {
            warn!("certificate template failed to load: {}", e);
            state.apply(Event::AssetFailed);
        }
    }
}

/// Refit the font size to the current name. Inert until the certificate
/// stage is showing and the template dimensions are known, and re-invoked
/// by the callers right after a successful template load so the available
/// width basis is reliable.
fn recompute_font<R: Renderer>(
    rt: &tokio::runtime::Runtime,
    state: &mut SessionState,
    renderer: &R,
    config: &StudioConfig,
) {
    if state.stage != Stage::Certificate || state.asset_status != AssetStatus::Ready {
        return;
    }
    let Some(info) = renderer.template_info() else {
        return;
    };
    if config.debounce_ms > 0 {
        rt.block_on(async { tokio::time::sleep(Duration::from_millis(config.debounce_ms)).await });
    }
    let available = config.sizing.available_width(info.width);
    state.font_size = fit_font_size(renderer.measurer(), state.name.trim(), available, &config.sizing);
}

fn download<R: Renderer>(
    rt: &tokio::runtime::Runtime,
    state: &mut SessionState,
    renderer: &R,
    config: &StudioConfig,
) -> Result<ExportOutcome> {
    if state.stage != Stage::Certificate {
        return Err(Error::ExportError(
            "nothing to export; generate a certificate first".to_string(),
        ));
    }
    match state.asset_status {
        AssetStatus::Loading => {
            return Err(Error::AssetError(
                "certificate template is still loading".to_string(),
            ))
        }
        AssetStatus::Failed => {
            return Err(Error::AssetError(
                "certificate template failed to load; retry the load first".to_string(),
            ))
        }
        AssetStatus::Ready => {}
    }

    state.apply(Event::DownloadRequested);
    let name = state.name.clone();
    let result = rt.block_on(export::run(renderer, &name, state.font_size, config));
    state.apply(Event::ExportFinished);
    result
}
