//! In-place patching of the imported scene's root transform

use crate::{
    layout::{LayoutError, SceneBuffer, SceneLayout},
    transform::{is_identity, Matrix4x4},
};

/// Outcome of [`apply_root_transform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The composite was the identity; scene memory was not touched
    SkippedIdentity,
    /// The root transform was replaced by `existing * composite`
    Applied,
    /// Walking or writing the scene failed; the scene is left as imported
    Abandoned(LayoutError),
}

/// Multiply the root node's transform by `composite`, in place.
///
/// Never fails: an identity composite short-circuits before the scene is
/// read, and any layout error abandons the patch so the import can continue
/// with the unmodified scene.
pub fn apply_root_transform<B: SceneBuffer + ?Sized>(
    scene: &mut B,
    layout: &SceneLayout,
    composite: &Matrix4x4,
) -> PatchOutcome {
    if is_identity(composite) {
        return PatchOutcome::SkippedIdentity;
    }

    match patch(scene, layout, composite) {
        Ok(()) => PatchOutcome::Applied,
        Err(err) => {
            // Lenient by contract, but a layout mismatch with the engine shows up here.
            tracing::warn!(error = %err, "root transform patch abandoned");
            PatchOutcome::Abandoned(err)
        }
    }
}

fn patch<B: SceneBuffer + ?Sized>(
    scene: &mut B,
    layout: &SceneLayout,
    composite: &Matrix4x4,
) -> Result<(), LayoutError> {
    let existing = layout.read_root_transform(scene)?;
    layout.write_root_transform(scene, &(existing * *composite))
}
