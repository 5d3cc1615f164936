//! Headless model of the viewer UI.
//!
//! [`Session`] wires the identifier resolver, the background fetch worker
//! and the viewport controller together and exposes what a form, a set of
//! display controls, a details panel and an error banner need to bind to.
//! It never touches the rendering surface itself.
//!
//! ```no_run
//! # use std::time::Duration;
//! # use molview::identifier::IdentifierKind;
//! # use molview::options::Options;
//! # use molview::session::Session;
//! # use molview::viewport::SceneSurface;
//! let mut session: Session<SceneSurface> = Session::new(&Options::default())?;
//! session.mount(SceneSurface::new);
//! let _ = session.submit("caffeine", IdentifierKind::Name)?;
//! loop {
//!     session.poll();
//!     session.tick(Duration::from_millis(16));
//!     if !session.loading() {
//!         break;
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use web_time::Instant;

use crate::error::MolviewError;
use crate::identifier::{resolve, IdentifierKind};
use crate::options::{BackgroundPreset, DisplayOptions, Options};
use crate::pubchem::{
    Completed, DetailRow, FetchOutcome, FetchWorker, Fetcher, HttpTransport,
    MoleculeData, PropertyRecord,
};
use crate::ticket::Ticket;
use crate::viewport::{
    LoadStatus, RenderSurface, SurfaceConfig, ViewerState, ViewportController,
    VisualStyle,
};

/// Identifier shown in the form before the user types anything.
pub const DEFAULT_IDENTIFIER: &str = "Aspirin";

/// One viewing session: form input, loading flag, error banner, property
/// record, and the viewport.
pub struct Session<S> {
    worker: FetchWorker,
    viewport: ViewportController<S>,
    presets: Vec<BackgroundPreset>,
    input: String,
    input_kind: IdentifierKind,
    properties: Option<PropertyRecord>,
    error: Option<String>,
    loading: bool,
}

impl<S: RenderSurface> Session<S> {
    /// Session backed by the live PubChem service.
    ///
    /// # Errors
    ///
    /// Returns [`MolviewError::ThreadSpawn`] if the fetch thread cannot be
    /// started.
    pub fn new(options: &Options) -> Result<Self, MolviewError> {
        Self::with_fetcher(&options.display, Fetcher::new(&options.pubchem))
    }

    /// Session using an arbitrary fetcher (alternate transport or base URL).
    ///
    /// # Errors
    ///
    /// Returns [`MolviewError::ThreadSpawn`] if the fetch thread cannot be
    /// started.
    pub fn with_fetcher<T>(
        display: &DisplayOptions,
        fetcher: Fetcher<T>,
    ) -> Result<Self, MolviewError>
    where
        T: HttpTransport + 'static,
    {
        Ok(Self {
            worker: FetchWorker::new(fetcher)?,
            viewport: ViewportController::new(display),
            presets: display.background_presets.clone(),
            input: DEFAULT_IDENTIFIER.to_owned(),
            input_kind: IdentifierKind::Name,
            properties: None,
            error: None,
            loading: false,
        })
    }

    /// Create the rendering surface. Only the first call has an effect.
    ///
    /// A structure that arrived before mounting is shown now; if the
    /// surface rejects it the error banner is set and its property record
    /// is withdrawn, since nothing is on screen.
    pub fn mount<F>(&mut self, create: F)
    where
        F: FnOnce(&SurfaceConfig) -> S,
    {
        if let Err(e) = self.viewport.mount(create) {
            log::warn!("{e}");
            self.properties = None;
            self.error = Some(e.to_string());
        }
    }

    /// Validate and submit an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MolviewError::Rejected`] without issuing any request when
    /// the input is empty or malformed; session state is left as it was.
    /// Returns [`MolviewError::WorkerStopped`] if the fetch thread has
    /// exited; the error banner shows it and nothing is loading.
    pub fn submit(
        &mut self,
        raw: &str,
        kind: IdentifierKind,
    ) -> Result<Ticket, MolviewError> {
        let resolved = resolve(raw, kind).inspect_err(|e| {
            log::info!("submission rejected: {e}");
        })?;
        let value = resolved.identifier().value().to_owned();

        let ticket = match self.worker.submit(resolved) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.loading = false;
                self.error = Some(e.to_string());
                return Err(e);
            }
        };
        self.input = value;
        self.input_kind = kind;
        self.error = None;
        self.loading = true;
        self.viewport.begin_load(ticket);
        Ok(ticket)
    }

    /// Submit whatever the form currently holds (initially
    /// [`DEFAULT_IDENTIFIER`] by name).
    ///
    /// # Errors
    ///
    /// See [`Session::submit`].
    pub fn submit_current(&mut self) -> Result<Ticket, MolviewError> {
        let raw = self.input.clone();
        self.submit(&raw, self.input_kind)
    }

    /// Apply every fetch result that has arrived. Never blocks.
    pub fn poll(&mut self) {
        while let Some(done) = self.worker.try_recv() {
            self.handle(done);
        }
    }

    /// Block until the latest submission has landed or `timeout` passes.
    /// Returns `true` if nothing is loading afterwards.
    ///
    /// If the fetch thread has exited, the pending submission can never
    /// land: loading stops and the error banner says so.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.worker.recv_timeout(remaining) {
                Ok(done) => self.handle(done),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    let e = MolviewError::WorkerStopped;
                    log::error!("{e}");
                    self.loading = false;
                    self.error = Some(e.to_string());
                }
            }
        }
        !self.loading
    }

    fn handle(&mut self, done: Completed) {
        let Completed { ticket, outcome } = done;
        if !self.worker.is_current(ticket) {
            log::info!("ignoring result {ticket}: superseded");
            return;
        }
        self.loading = false;

        match outcome {
            FetchOutcome::Success(data) => {
                let MoleculeData {
                    structure,
                    properties,
                } = *data;
                match self.viewport.load_structure(ticket, structure) {
                    Ok(LoadStatus::Applied | LoadStatus::Deferred) => {
                        self.properties = Some(properties);
                    }
                    Ok(LoadStatus::Superseded) => {}
                    Err(e) => {
                        log::warn!("{e}");
                        self.error = Some(e.to_string());
                    }
                }
            }
            failure => {
                let message = failure.message().unwrap_or_default();
                log::warn!("fetch {ticket} failed: {message}");
                self.viewport.clear_structure();
                self.properties = None;
                self.error = Some(message);
            }
        }
    }

    /// Hide the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Message for the error banner, if one is showing.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a submission is still in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Current form contents.
    #[must_use]
    pub fn input(&self) -> (&str, IdentifierKind) {
        (self.input.as_str(), self.input_kind)
    }

    /// Property record of the displayed compound.
    #[must_use]
    pub fn properties(&self) -> Option<&PropertyRecord> {
        self.properties.as_ref()
    }

    /// Rows for the details panel.
    #[must_use]
    pub fn details(&self) -> Option<Vec<DetailRow>> {
        self.properties.as_ref().map(PropertyRecord::rows)
    }

    /// What the viewport shows.
    #[must_use]
    pub fn viewer_state(&self) -> &ViewerState {
        self.viewport.state()
    }

    /// Read-only access to the viewport controller.
    #[must_use]
    pub fn viewport(&self) -> &ViewportController<S> {
        &self.viewport
    }

    /// Background choices for the display controls.
    #[must_use]
    pub fn background_presets(&self) -> &[BackgroundPreset] {
        &self.presets
    }

    /// Change the representation.
    pub fn set_style(&mut self, style: VisualStyle) {
        self.viewport.set_style(style);
    }

    /// Change the background color.
    pub fn set_background(&mut self, color: &str) {
        self.viewport.set_background(color);
    }

    /// Start or stop rotation.
    pub fn set_spin(&mut self, enabled: bool) {
        self.viewport.set_spin(enabled);
    }

    /// Advance animation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.viewport.tick(dt);
    }
}
