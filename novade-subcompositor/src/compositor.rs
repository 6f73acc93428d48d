//! Request-level facade over the surface tree.
//!
//! [`Compositor`] bundles the registry, the subcompositor global and the
//! configuration behind one method per protocol request. The protocol layer
//! owns one instance per display and shares it between its event-loop
//! handlers through [`SharedCompositor`].

use std::sync::{Arc, Mutex};
use tracing::info;

use crate::buffer::BufferRef;
use crate::commit::{self, CommitReport};
use crate::config::CompositorConfig;
use crate::error::SubsurfaceError;
use crate::input::focus;
use crate::region::Region;
use crate::registry::SurfaceRegistry;
use crate::scene::{self, Scene};
use crate::subcompositor::{self, Subcompositor, SyncMode};
use crate::surface::{BufferTransform, RoleKind, Surface, SurfaceId};

#[derive(Debug)]
pub struct Compositor {
    config: CompositorConfig,
    registry: SurfaceRegistry,
    subcompositor: Subcompositor,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        let subcompositor = Subcompositor::new(&config.subcompositor);
        info!(max_tree_depth = subcompositor.max_tree_depth(), "compositor core ready");
        Self {
            config,
            registry: SurfaceRegistry::new(),
            subcompositor,
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn subcompositor(&self) -> &Subcompositor {
        &self.subcompositor
    }

    pub fn surface(&self, id: SurfaceId) -> Result<&Surface, SubsurfaceError> {
        self.registry.surface(id)
    }

    pub fn create_surface(&mut self) -> SurfaceId {
        self.registry.create_surface()
    }

    pub fn attach(&mut self, id: SurfaceId, buffer: Option<BufferRef>, dx: i32, dy: i32) -> Result<(), SubsurfaceError> {
        self.registry.surface_mut(id)?.attach(buffer, dx, dy);
        Ok(())
    }

    pub fn set_input_region(&mut self, id: SurfaceId, region: Option<Region>) -> Result<(), SubsurfaceError> {
        self.registry.surface_mut(id)?.set_input_region(region);
        Ok(())
    }

    pub fn set_opaque_region(&mut self, id: SurfaceId, region: Option<Region>) -> Result<(), SubsurfaceError> {
        self.registry.surface_mut(id)?.set_opaque_region(region);
        Ok(())
    }

    pub fn set_buffer_transform(&mut self, id: SurfaceId, transform: BufferTransform) -> Result<(), SubsurfaceError> {
        self.registry.surface_mut(id)?.set_buffer_transform(transform);
        Ok(())
    }

    pub fn set_buffer_scale(&mut self, id: SurfaceId, scale: i32) -> Result<(), SubsurfaceError> {
        self.registry.surface_mut(id)?.set_buffer_scale(scale)
    }

    pub fn frame(&mut self, id: SurfaceId, callback_id: u64) -> Result<(), SubsurfaceError> {
        self.registry.surface_mut(id)?.frame(callback_id);
        Ok(())
    }

    pub fn commit(&mut self, id: SurfaceId) -> Result<CommitReport, SubsurfaceError> {
        commit::commit(&mut self.registry, id)
    }

    pub fn destroy_surface(&mut self, id: SurfaceId) {
        self.registry.destroy_surface(id);
    }

    pub fn set_role(&mut self, id: SurfaceId, kind: RoleKind) -> Result<(), SubsurfaceError> {
        self.registry.set_role(id, kind)
    }

    pub fn get_subsurface(&mut self, surface: SurfaceId, parent: SurfaceId) -> Result<(), SubsurfaceError> {
        self.subcompositor.get_subsurface(&mut self.registry, surface, parent)
    }

    pub fn set_position(&mut self, id: SurfaceId, x: i32, y: i32) -> Result<(), SubsurfaceError> {
        subcompositor::set_position(&mut self.registry, id, x, y)
    }

    pub fn place_above(&mut self, id: SurfaceId, sibling: SurfaceId) -> Result<(), SubsurfaceError> {
        subcompositor::place_above(&mut self.registry, id, sibling)
    }

    pub fn place_below(&mut self, id: SurfaceId, sibling: SurfaceId) -> Result<(), SubsurfaceError> {
        subcompositor::place_below(&mut self.registry, id, sibling)
    }

    pub fn set_sync_mode(&mut self, id: SurfaceId, mode: SyncMode) -> Result<CommitReport, SubsurfaceError> {
        subcompositor::set_sync_mode(&mut self.registry, id, mode)
    }

    pub fn destroy_subsurface_role(&mut self, id: SurfaceId) -> Result<(), SubsurfaceError> {
        subcompositor::destroy_subsurface_role(&mut self.registry, id)
    }

    pub fn is_mapped(&self, id: SurfaceId) -> bool {
        self.registry.is_mapped(id)
    }

    pub fn snapshot(&self) -> Scene {
        scene::snapshot(&self.registry)
    }

    pub fn surface_at(&self, point: (f64, f64)) -> Option<(SurfaceId, (f64, f64))> {
        focus::surface_at(&self.snapshot(), point)
    }

    /// Drains the applied frame callbacks of every surface: painted surfaces
    /// first in paint order, then unmapped ones in creation order. Nothing is
    /// left behind, so a surface that never becomes visible cannot pile up
    /// callbacks.
    pub fn take_frame_callbacks(&mut self) -> Vec<(SurfaceId, Vec<u64>)> {
        let mut order: Vec<SurfaceId> = self.snapshot().iter().map(|e| e.surface).collect();
        let unpainted: Vec<SurfaceId> = self
            .registry
            .iter()
            .filter(|s| !s.current().frame_callbacks.is_empty() && !order.contains(&s.id()))
            .map(|s| s.id())
            .collect();
        order.extend(unpainted);
        order
            .into_iter()
            .map(|id| (id, self.registry.take_frame_callbacks(id)))
            .filter(|(_, callbacks)| !callbacks.is_empty())
            .collect()
    }
}

/// A [`Compositor`] shared between threads.
#[derive(Debug, Clone)]
pub struct SharedCompositor {
    inner: Arc<Mutex<Compositor>>,
}

impl SharedCompositor {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(compositor)),
        }
    }

    /// Runs `f` with the compositor locked. A poisoned lock is reported as
    /// [`SubsurfaceError::LockPoisoned`].
    pub fn with<R>(&self, f: impl FnOnce(&mut Compositor) -> R) -> Result<R, SubsurfaceError> {
        let mut guard = self.inner.lock().map_err(|_| SubsurfaceError::LockPoisoned)?;
        Ok(f(&mut guard))
    }
}
