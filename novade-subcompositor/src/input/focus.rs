//! Picking the surface under a point.

use crate::scene::SceneElement;
use crate::surface::SurfaceId;

/// Topmost surface whose input area contains `point`, with the point
/// translated into that surface's local coordinates.
///
/// `scene` is paint-ordered bottom first, as produced by
/// [`crate::scene::snapshot`], so it is searched from the end. A surface
/// whose input region excludes the point lets the search fall through to
/// whatever is below it.
pub fn surface_at(scene: &[SceneElement], point: (f64, f64)) -> Option<(SurfaceId, (f64, f64))> {
    let (px, py) = point;
    scene
        .iter()
        .rev()
        .find(|element| element.accepts_input_at(px, py))
        .map(|element| {
            (
                element.surface,
                (px - element.position.0 as f64, py - element.position.1 as f64),
            )
        })
}
