//! Flattened, paint-ordered view of the surface trees.
//!
//! A [`Scene`] is what the renderer consumes: one [`SceneElement`] per mapped
//! surface, bottom first, with subsurface offsets already resolved into
//! absolute positions. Unmapped surfaces are left out together with their
//! whole subtree.

use crate::buffer::BufferRef;
use crate::region::{Rectangle, Region};
use crate::registry::SurfaceRegistry;
use crate::surface::{BufferTransform, RoleKind, SurfaceId};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub surface: SurfaceId,
    /// Absolute position of the surface origin.
    pub position: (i32, i32),
    /// Number of subsurface links between this surface and its root.
    pub depth: usize,
    pub buffer: BufferRef,
    pub buffer_offset: (i32, i32),
    pub transform: BufferTransform,
    pub scale: i32,
    /// Surface-local; `None` accepts input everywhere.
    pub input_region: Option<Region>,
    pub opaque_region: Option<Region>,
    size: (i32, i32),
}

impl SceneElement {
    /// Absolute rectangle covered by the surface.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.position.0, self.position.1, self.size.0, self.size.1)
    }

    /// Whether the absolute point `(x, y)` hits this surface's input area.
    pub fn accepts_input_at(&self, x: f64, y: f64) -> bool {
        if !self.bounds().contains_point(x, y) {
            return false;
        }
        match &self.input_region {
            Some(region) => region.contains_point(x - self.position.0 as f64, y - self.position.1 as f64),
            None => true,
        }
    }
}

/// Paint-ordered elements, bottom first.
pub type Scene = Vec<SceneElement>;

enum Step {
    Expand { id: SurfaceId, origin: (i32, i32), depth: usize },
    Emit { id: SurfaceId, origin: (i32, i32), depth: usize },
}

/// All mapped trees. Roots (surfaces that are not subsurfaces) sit at the
/// origin and are painted in creation order.
pub fn snapshot(registry: &SurfaceRegistry) -> Scene {
    let mut scene = Vec::new();
    for root in registry.iter().filter(|s| s.role() != Some(RoleKind::Subsurface)) {
        scene.extend(snapshot_tree(registry, root.id(), (0, 0)));
    }
    scene
}

/// The tree below `root`, with `root` placed at `origin`.
pub fn snapshot_tree(registry: &SurfaceRegistry, root: SurfaceId, origin: (i32, i32)) -> Scene {
    let mut scene = Vec::new();
    let mut work = vec![Step::Expand { id: root, origin, depth: 0 }];

    while let Some(step) = work.pop() {
        match step {
            Step::Expand { id, origin, depth } => {
                let Some(surface) = registry.get(id) else { continue };
                if !surface.has_buffer() || (depth > 0 && !registry.is_mapped(id)) {
                    continue;
                }
                // Pushed top first so the bottom entry pops first.
                for &entry in surface.stack().as_slice().iter().rev() {
                    if entry == id {
                        work.push(Step::Emit { id, origin, depth });
                        continue;
                    }
                    let Some(offset) = registry
                        .get(entry)
                        .and_then(|child| child.subsurface())
                        .map(|role| role.position())
                    else {
                        continue;
                    };
                    work.push(Step::Expand {
                        id: entry,
                        origin: (
                            origin.0.saturating_add(offset.0),
                            origin.1.saturating_add(offset.1),
                        ),
                        depth: depth + 1,
                    });
                }
            }
            Step::Emit { id, origin, depth } => {
                let Some(surface) = registry.get(id) else { continue };
                let current = surface.current();
                let Some(buffer) = current.buffer else { continue };
                scene.push(SceneElement {
                    surface: id,
                    position: origin,
                    depth,
                    buffer,
                    buffer_offset: current.buffer_offset,
                    transform: current.transform,
                    scale: current.scale,
                    input_region: current.input_region.clone(),
                    opaque_region: current.opaque_region.clone(),
                    size: current.surface_size(),
                });
            }
        }
    }
    scene
}
