//! The controller's complete vocabulary.
//!
//! Every change to what the viewport shows, whether it comes from a
//! finished fetch, a style button, or the background picker, is one
//! `ViewportCommand`. Consumers construct commands and pass them to
//! [`ViewportController::execute`](super::ViewportController::execute).

use super::style::VisualStyle;
use crate::pubchem::StructurePayload;
use crate::ticket::Ticket;

/// A discrete operation on the viewport.
///
/// ```ignore
/// controller.execute(ViewportCommand::SetStyle(VisualStyle::Sphere))?;
/// controller.execute(ViewportCommand::SetSpin(false))?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportCommand {
    /// Record that a structure request was submitted. Results for older
    /// tickets are dropped from now on.
    BeginLoad(Ticket),

    /// Replace the displayed structure and refit the camera.
    LoadStructure {
        /// Submission the payload belongs to.
        ticket: Ticket,
        /// Structure text as fetched.
        payload: StructurePayload,
    },

    /// Remove the displayed structure.
    ClearStructure,

    /// Change the representation without moving the camera.
    SetStyle(VisualStyle),

    /// Change the background color.
    SetBackground(String),

    /// Start or stop continuous rotation.
    SetSpin(bool),
}
