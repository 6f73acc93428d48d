//! The compositor-owned surface table.
//!
//! Every operation of the subcompositor core takes the registry explicitly, so
//! independent compositor instances (tests in particular) never share state.
//! Parent and sibling links elsewhere are plain [`SurfaceId`]s: they are looked
//! up here on use and are never followed once their surface is gone.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::error::SubsurfaceError;
use crate::surface::{RoleKind, Surface, SurfaceId};

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: BTreeMap<SurfaceId, Surface>,
    next_id: u64,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `wl_compositor.create_surface`.
    pub fn create_surface(&mut self) -> SurfaceId {
        self.next_id += 1;
        let id = SurfaceId::from_raw(self.next_id);
        self.surfaces.insert(id, Surface::new(id));
        trace!(%id, "surface created");
        id
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    /// Like [`get`](Self::get), reporting a missing surface as an error.
    pub fn surface(&self, id: SurfaceId) -> Result<&Surface, SubsurfaceError> {
        self.get(id).ok_or(SubsurfaceError::UnknownSurface(id))
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut Surface, SubsurfaceError> {
        self.get_mut(id).ok_or(SubsurfaceError::UnknownSurface(id))
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Live surfaces in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    /// Attached parent of `id`, if `id` is a live subsurface.
    pub fn parent_of(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.get(id).and_then(Surface::parent)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: SurfaceId) -> Vec<SurfaceId> {
        let mut chain = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(parent) = cursor {
            // Acyclic by construction; the bound only guards against corruption.
            if chain.len() > self.surfaces.len() {
                break;
            }
            chain.push(parent);
            cursor = self.parent_of(parent);
        }
        chain
    }

    /// Returns `true` if `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: SurfaceId, id: SurfaceId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Number of levels below `id`, following attached children.
    pub fn subtree_height(&self, id: SurfaceId) -> usize {
        let mut height = 0;
        let mut work = vec![(id, 0usize)];
        while let Some((current, depth)) = work.pop() {
            height = height.max(depth);
            if let Some(surface) = self.get(current) {
                work.extend(surface.stack.children().map(|child| (child, depth + 1)));
            }
        }
        height
    }

    /// Assigns a non-subsurface role. Subsurface roles go through
    /// [`Subcompositor::get_subsurface`](crate::subcompositor::Subcompositor::get_subsurface).
    pub fn set_role(&mut self, id: SurfaceId, kind: RoleKind) -> Result<(), SubsurfaceError> {
        let surface = self.surface_mut(id)?;
        if surface.role.is_some() || kind == RoleKind::Subsurface {
            return Err(SubsurfaceError::InvalidRole { surface: id });
        }
        surface.role = Some(kind);
        debug!(%id, ?kind, "role assigned");
        Ok(())
    }

    /// Whether `id` takes part in composition: it shows a buffer and, for a
    /// subsurface, every ancestor is alive, attached and mapped too.
    pub fn is_mapped(&self, id: SurfaceId) -> bool {
        let mut cursor = id;
        let mut steps = 0;
        loop {
            let Some(surface) = self.get(cursor) else {
                return false;
            };
            if !surface.has_buffer() {
                return false;
            }
            match surface.role {
                Some(RoleKind::Subsurface) => match surface.parent() {
                    Some(parent) => cursor = parent,
                    None => return false,
                },
                _ => return true,
            }
            steps += 1;
            if steps > self.surfaces.len() {
                return false;
            }
        }
    }

    /// Drains the frame callbacks that became current for `id`.
    pub fn take_frame_callbacks(&mut self, id: SurfaceId) -> Vec<u64> {
        self.get_mut(id)
            .map(|surface| std::mem::take(&mut surface.current.frame_callbacks))
            .unwrap_or_default()
    }

    /// `wl_surface.destroy`. Never fails and may be repeated.
    ///
    /// The surface leaves its parent's stack, and its direct children lose
    /// their parent, which unmaps them together with their own subtrees.
    pub fn destroy_surface(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.remove(&id) else {
            trace!(%id, "destroy of unknown surface ignored");
            return;
        };

        if let Some(parent) = surface.parent() {
            if let Some(parent_surface) = self.get_mut(parent) {
                parent_surface.stack.remove(id);
            }
        }

        let mut orphaned = 0;
        for child in surface.stack.children() {
            if let Some(role) = self
                .get_mut(child)
                .and_then(|child_surface| child_surface.subsurface.as_mut())
            {
                role.detach();
                orphaned += 1;
            }
        }
        debug!(%id, orphaned, "surface destroyed");
    }
}
