//! Viewport state machine.
//!
//! [`ViewportController`] owns the one rendering surface of a viewing
//! session and the [`ViewerState`] it displays. Each field of the state
//! changes through exactly one operation, and each operation touches only
//! the surface calls it needs:
//!
//! | operation        | surface calls                                   |
//! |------------------|-------------------------------------------------|
//! | load structure   | clear, load, set_style, fit_view, render        |
//! | clear structure  | clear, render                                   |
//! | set style        | set_style, render (only with a structure loaded) |
//! | set background   | set_background, render                          |
//! | set spin         | spin                                            |
//!
//! Loading a structure is the only operation that moves the camera.

use std::fmt;
use std::time::Duration;

use super::command::ViewportCommand;
use super::style::{Selector, Spin, VisualStyle};
use super::surface::{RenderSurface, SurfaceConfig};
use crate::identifier::Identifier;
use crate::options::DisplayOptions;
use crate::pubchem::StructurePayload;
use crate::ticket::Ticket;

/// What the viewport currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    /// The structure on screen, if any.
    pub loaded_structure: Option<StructurePayload>,
    /// Representation applied to the structure.
    pub visual_style: VisualStyle,
    /// Background color string.
    pub background_color: String,
    /// Whether continuous rotation is on.
    pub spinning: bool,
}

/// What happened to a structure handed to
/// [`ViewportController::load_structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The structure is now on screen.
    Applied,
    /// No surface yet; the structure is shown when one is mounted.
    Deferred,
    /// A newer submission exists; the structure was discarded.
    Superseded,
}

/// The surface refused a structure. The previous view is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    identifier: Identifier,
    reason: String,
}

impl RenderError {
    /// Identifier of the structure that failed to load.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Reason reported by the surface.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not display structure for {}: {}",
            self.identifier, self.reason
        )
    }
}

impl std::error::Error for RenderError {}

/// Keeps one rendering surface in sync with structure, style, background
/// and spin changes.
pub struct ViewportController<S> {
    surface: Option<S>,
    state: ViewerState,
    spin: Spin,
    latest: Option<Ticket>,
    pending: Option<StructurePayload>,
}

impl<S: RenderSurface> ViewportController<S> {
    /// Unmounted controller with the initial display state.
    #[must_use]
    pub fn new(display: &DisplayOptions) -> Self {
        Self {
            surface: None,
            state: ViewerState {
                loaded_structure: None,
                visual_style: display.style,
                background_color: display.background.clone(),
                spinning: display.spin,
            },
            spin: display.spin_params(),
            latest: None,
            pending: None,
        }
    }

    /// Create the surface on first call; later calls do nothing.
    ///
    /// The new surface receives the current background, spin state, and
    /// any structure that arrived before mounting.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a deferred structure is rejected.
    pub fn mount<F>(&mut self, create: F) -> Result<(), RenderError>
    where
        F: FnOnce(&SurfaceConfig) -> S,
    {
        if self.surface.is_some() {
            log::debug!("viewport already mounted");
            return Ok(());
        }

        let mut surface = create(&SurfaceConfig {
            background: self.state.background_color.clone(),
        });
        if self.state.spinning {
            surface.spin(Some(self.spin));
        }
        self.surface = Some(surface);
        log::debug!("viewport mounted");

        match self.pending.take() {
            Some(payload) => self.apply_load(payload),
            None => {
                self.render();
                Ok(())
            }
        }
    }

    /// Whether the surface has been created.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Current viewer state.
    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Read-only view of the surface, for inspection.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a structure load is rejected.
    pub fn execute(
        &mut self,
        command: ViewportCommand,
    ) -> Result<(), RenderError> {
        match command {
            ViewportCommand::BeginLoad(ticket) => self.begin_load(ticket),
            ViewportCommand::LoadStructure { ticket, payload } => {
                let _ = self.load_structure(ticket, payload)?;
            }
            ViewportCommand::ClearStructure => self.clear_structure(),
            ViewportCommand::SetStyle(style) => self.set_style(style),
            ViewportCommand::SetBackground(color) => {
                self.set_background(&color);
            }
            ViewportCommand::SetSpin(enabled) => self.set_spin(enabled),
        }
        Ok(())
    }

    /// Record a new submission; structures for older tickets will be
    /// dropped.
    pub fn begin_load(&mut self, ticket: Ticket) {
        if !self.is_superseded(ticket) {
            self.latest = Some(ticket);
        }
    }

    /// Whether a newer submission than `ticket` has been seen.
    #[must_use]
    pub fn is_superseded(&self, ticket: Ticket) -> bool {
        self.latest.is_some_and(|latest| ticket < latest)
    }

    /// Show `payload`, replacing the current structure and refitting the
    /// camera, unless a newer submission has been seen.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the surface rejects the structure. The
    /// previously loaded structure stays on screen and in the state.
    pub fn load_structure(
        &mut self,
        ticket: Ticket,
        payload: StructurePayload,
    ) -> Result<LoadStatus, RenderError> {
        if self.is_superseded(ticket) {
            log::info!(
                "dropping structure {ticket} for {}: superseded",
                payload.identifier()
            );
            return Ok(LoadStatus::Superseded);
        }
        self.latest = Some(ticket);

        if self.surface.is_none() {
            self.pending = Some(payload);
            return Ok(LoadStatus::Deferred);
        }
        self.apply_load(payload)?;
        Ok(LoadStatus::Applied)
    }

    /// Remove the displayed structure. Style, background and spin are kept.
    pub fn clear_structure(&mut self) {
        self.pending = None;
        self.state.loaded_structure = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
            surface.render();
        }
    }

    /// Change the representation. Re-styles the loaded structure without
    /// touching the camera; with nothing loaded only the state changes.
    pub fn set_style(&mut self, style: VisualStyle) {
        self.state.visual_style = style;
        if self.state.loaded_structure.is_none() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.set_style(Selector::All, style.spec());
            surface.render();
        }
    }

    /// Change the background color. Takes effect with or without a
    /// structure.
    pub fn set_background(&mut self, color: &str) {
        color.clone_into(&mut self.state.background_color);
        if let Some(surface) = self.surface.as_mut() {
            surface.set_background(color);
            surface.render();
        }
    }

    /// Start or stop continuous rotation.
    pub fn set_spin(&mut self, enabled: bool) {
        self.state.spinning = enabled;
        if let Some(surface) = self.surface.as_mut() {
            surface.spin(enabled.then_some(self.spin));
        }
    }

    /// Advance surface animation by `dt` and redraw while spinning.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(surface) = self.surface.as_mut() {
            surface.advance(dt);
            if self.state.spinning {
                surface.render();
            }
        }
    }

    fn render(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.render();
        }
    }

    fn apply_load(
        &mut self,
        payload: StructurePayload,
    ) -> Result<(), RenderError> {
        let Some(surface) = self.surface.as_mut() else {
            self.pending = Some(payload);
            return Ok(());
        };

        surface.clear();
        if let Err(e) = surface.load(payload.text(), payload.format()) {
            log::error!(
                "surface rejected structure for {}: {e}",
                payload.identifier()
            );
            restore(
                surface,
                self.state.loaded_structure.as_ref(),
                self.state.visual_style,
            );
            return Err(RenderError {
                identifier: payload.identifier().clone(),
                reason: e.0,
            });
        }

        surface.set_style(Selector::All, self.state.visual_style.spec());
        surface.fit_view();
        surface.render();
        log::info!("loaded structure for {}", payload.identifier());
        self.state.loaded_structure = Some(payload);
        Ok(())
    }
}

/// Put the last good structure back after a rejected load. The camera was
/// not moved by the failed attempt, so no refit.
fn restore<S: RenderSurface>(
    surface: &mut S,
    previous: Option<&StructurePayload>,
    style: VisualStyle,
) {
    if let Some(previous) = previous {
        match surface.load(previous.text(), previous.format()) {
            Ok(()) => surface.set_style(Selector::All, style.spec()),
            Err(e) => log::error!("failed to restore previous view: {e}"),
        }
    }
    surface.render();
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::identifier::{resolve, IdentifierKind};
    use crate::viewport::style::StyleSpec;
    use crate::viewport::surface::SurfaceError;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Clear,
        Load(String),
        SetStyle(StyleSpec),
        SetBackground(String),
        Spin(Option<Spin>),
        FitView,
        Render,
    }

    /// Surface that records every call and rejects text starting with
    /// `"bad"`.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) config: Option<SurfaceConfig>,
        pub(crate) calls: Vec<Call>,
        pub(crate) models: Vec<String>,
        pub(crate) style: Option<StyleSpec>,
        pub(crate) background: Option<String>,
    }

    impl RecordingSurface {
        pub(crate) fn create(config: &SurfaceConfig) -> Self {
            Self {
                config: Some(config.clone()),
                background: Some(config.background.clone()),
                ..Self::default()
            }
        }

        pub(crate) fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl RenderSurface for RecordingSurface {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
            self.models.clear();
        }

        fn load(
            &mut self,
            text: &str,
            _format: &str,
        ) -> Result<(), SurfaceError> {
            self.calls.push(Call::Load(text.to_owned()));
            if text.starts_with("bad") {
                return Err(SurfaceError("no atoms".to_owned()));
            }
            self.models.push(text.to_owned());
            Ok(())
        }

        fn set_style(&mut self, _selector: Selector, style: StyleSpec) {
            self.calls.push(Call::SetStyle(style));
            self.style = Some(style);
        }

        fn set_background(&mut self, color: &str) {
            self.calls.push(Call::SetBackground(color.to_owned()));
            self.background = Some(color.to_owned());
        }

        fn spin(&mut self, spin: Option<Spin>) {
            self.calls.push(Call::Spin(spin));
        }

        fn fit_view(&mut self) {
            self.calls.push(Call::FitView);
        }

        fn render(&mut self) {
            self.calls.push(Call::Render);
        }
    }

    pub(crate) fn payload(text: &str, name: &str) -> StructurePayload {
        let id = resolve(name, IdentifierKind::Name).unwrap();
        StructurePayload::new(text.to_owned(), id.identifier().clone())
    }

    fn mounted() -> ViewportController<RecordingSurface> {
        let mut controller =
            ViewportController::new(&DisplayOptions::default());
        controller.mount(RecordingSurface::create).unwrap();
        controller
    }

    fn surface(c: &ViewportController<RecordingSurface>) -> &RecordingSurface {
        c.surface().unwrap()
    }

    fn ticket(n: u64) -> Ticket {
        (0..n).fold(Ticket::default(), |t, _| t.next())
    }

    #[test]
    fn load_applies_current_style_and_fits_once() {
        let mut c = mounted();
        c.set_style(VisualStyle::Sphere);
        let status =
            c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        assert_eq!(status, LoadStatus::Applied);

        let s = surface(&c);
        assert_eq!(s.models, ["mol-a"]);
        assert_eq!(s.style, Some(VisualStyle::Sphere.spec()));
        assert_eq!(s.count(&Call::FitView), 1);
        assert_eq!(
            c.state().loaded_structure.as_ref().map(StructurePayload::text),
            Some("mol-a")
        );
    }

    #[test]
    fn style_without_structure_only_records() {
        let mut c = mounted();
        let before = surface(&c).calls.len();
        c.set_style(VisualStyle::Line);
        assert_eq!(surface(&c).calls.len(), before);
        assert_eq!(c.state().visual_style, VisualStyle::Line);
    }

    #[test]
    fn style_changes_never_refit_camera() {
        let mut c = mounted();
        let _ = c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        for style in [
            VisualStyle::Sphere,
            VisualStyle::Line,
            VisualStyle::Stick,
            VisualStyle::Stick,
            VisualStyle::Sphere,
        ] {
            c.set_style(style);
        }
        let s = surface(&c);
        assert_eq!(s.count(&Call::FitView), 1);
        assert_eq!(s.count(&Call::Clear), 1);
        assert_eq!(s.style, Some(VisualStyle::Sphere.spec()));
    }

    #[test]
    fn repeated_style_is_idempotent() {
        let mut c = mounted();
        let _ = c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        c.set_style(VisualStyle::Line);
        let state_once = c.state().clone();
        let (models, style) = (surface(&c).models.clone(), surface(&c).style);

        c.set_style(VisualStyle::Line);
        assert_eq!(c.state(), &state_once);
        assert_eq!(surface(&c).models, models);
        assert_eq!(surface(&c).style, style);
    }

    #[test]
    fn last_submitted_wins_when_older_result_arrives_late() {
        let mut c = mounted();
        let (a, b) = (ticket(1), ticket(2));
        c.begin_load(a);
        c.begin_load(b);

        assert_eq!(
            c.load_structure(b, payload("mol-b", "b")).unwrap(),
            LoadStatus::Applied
        );
        assert_eq!(
            c.load_structure(a, payload("mol-a", "a")).unwrap(),
            LoadStatus::Superseded
        );
        assert_eq!(surface(&c).models, ["mol-b"]);
        assert_eq!(
            c.state().loaded_structure.as_ref().map(StructurePayload::text),
            Some("mol-b")
        );
    }

    #[test]
    fn last_submitted_wins_when_older_result_arrives_first() {
        let mut c = mounted();
        let (a, b) = (ticket(1), ticket(2));
        c.execute(ViewportCommand::BeginLoad(a)).unwrap();
        c.execute(ViewportCommand::BeginLoad(b)).unwrap();
        c.execute(ViewportCommand::LoadStructure {
            ticket: a,
            payload: payload("mol-a", "a"),
        })
        .unwrap();
        assert!(c.state().loaded_structure.is_none());
        assert!(surface(&c).calls.iter().all(|call| *call != Call::Clear));

        c.execute(ViewportCommand::LoadStructure {
            ticket: b,
            payload: payload("mol-b", "b"),
        })
        .unwrap();
        assert_eq!(surface(&c).models, ["mol-b"]);
    }

    #[test]
    fn rejected_load_keeps_previous_view() {
        let mut c = mounted();
        let _ = c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        let err = c
            .load_structure(ticket(1), payload("bad text", "broken"))
            .unwrap_err();
        assert_eq!(err.identifier().value(), "broken");
        assert_eq!(err.reason(), "no atoms");

        let s = surface(&c);
        assert_eq!(s.models, ["mol-a"]);
        assert_eq!(s.count(&Call::FitView), 1);
        assert_eq!(
            c.state().loaded_structure.as_ref().map(StructurePayload::text),
            Some("mol-a")
        );
    }

    #[test]
    fn rejected_first_load_leaves_nothing_loaded() {
        let mut c = mounted();
        assert!(c.load_structure(ticket(0), payload("bad", "x")).is_err());
        assert!(c.state().loaded_structure.is_none());
        assert!(surface(&c).models.is_empty());
    }

    #[test]
    fn background_applies_without_structure() {
        let mut c = mounted();
        c.set_background("#ccc");
        let s = surface(&c);
        assert_eq!(s.background.as_deref(), Some("#ccc"));
        assert_eq!(s.calls.last(), Some(&Call::Render));
        assert_eq!(c.state().background_color, "#ccc");
        assert!(c.state().loaded_structure.is_none());
    }

    #[test]
    fn spin_toggles_independently() {
        let mut c = mounted();
        let _ = c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        c.set_spin(false);
        c.set_spin(true);
        let s = surface(&c);
        let spins: Vec<&Call> =
            s.calls.iter().filter(|c| matches!(c, Call::Spin(_))).collect();
        // Mount starts spinning (default), then off, then on again.
        assert_eq!(
            spins,
            [
                &Call::Spin(Some(Spin::default())),
                &Call::Spin(None),
                &Call::Spin(Some(Spin::default())),
            ]
        );
        assert_eq!(s.count(&Call::FitView), 1);
        assert_eq!(s.models, ["mol-a"]);
    }

    #[test]
    fn clear_structure_keeps_other_state() {
        let mut c = mounted();
        let _ = c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        c.set_background("#fff");
        c.clear_structure();
        assert!(c.state().loaded_structure.is_none());
        assert_eq!(c.state().background_color, "#fff");
        assert!(surface(&c).models.is_empty());
    }

    #[test]
    fn mount_is_lazy_and_happens_once() {
        let mut c: ViewportController<RecordingSurface> =
            ViewportController::new(&DisplayOptions::default());
        assert!(!c.is_mounted());

        c.set_background("#123");
        c.set_spin(false);
        c.set_style(VisualStyle::Line);
        let status =
            c.load_structure(ticket(0), payload("mol-a", "a")).unwrap();
        assert_eq!(status, LoadStatus::Deferred);
        assert!(c.state().loaded_structure.is_none());

        c.mount(RecordingSurface::create).unwrap();
        let s = surface(&c);
        assert_eq!(
            s.config.as_ref().map(|cfg| cfg.background.as_str()),
            Some("#123")
        );
        assert_eq!(s.count(&Call::Spin(Some(Spin::default()))), 0);
        assert_eq!(s.models, ["mol-a"]);
        assert_eq!(s.style, Some(VisualStyle::Line.spec()));

        let mut created_again = false;
        c.mount(|cfg| {
            created_again = true;
            RecordingSurface::create(cfg)
        })
        .unwrap();
        assert!(!created_again);
        assert_eq!(surface(&c).models, ["mol-a"]);
    }

    #[test]
    fn execute_dispatches_every_command() {
        let mut c = mounted();
        c.execute(ViewportCommand::SetBackground("#abc".to_owned()))
            .unwrap();
        c.execute(ViewportCommand::SetSpin(false)).unwrap();
        c.execute(ViewportCommand::SetStyle(VisualStyle::Sphere)).unwrap();
        c.execute(ViewportCommand::LoadStructure {
            ticket: ticket(0),
            payload: payload("mol-a", "a"),
        })
        .unwrap();
        assert!(c
            .execute(ViewportCommand::LoadStructure {
                ticket: ticket(1),
                payload: payload("bad", "b"),
            })
            .is_err());
        c.execute(ViewportCommand::ClearStructure).unwrap();

        let state = c.state();
        assert_eq!(state.background_color, "#abc");
        assert!(!state.spinning);
        assert_eq!(state.visual_style, VisualStyle::Sphere);
        assert!(state.loaded_structure.is_none());
    }
}
