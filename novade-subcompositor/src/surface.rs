//! `wl_surface` state: identity, double-buffered pending/current state and role.
//!
//! Requests such as `attach` or `set_input_region` only stage values into the
//! surface's [`PendingState`]. Nothing becomes visible until the commit
//! machinery in [`crate::commit`] decides to apply the staged state, which for
//! synchronized subsurfaces may happen much later.

use bitflags::bitflags;
use std::fmt;

use crate::buffer::BufferRef;
use crate::error::SubsurfaceError;
use crate::region::Region;
use crate::stack::{StackOrder, StackRequest};
use crate::subcompositor::SubsurfaceRole;

/// Handle of a surface inside one [`SurfaceRegistry`](crate::registry::SurfaceRegistry).
///
/// Ids are never reused by a registry, so a stale handle simply stops
/// resolving once its surface is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface@{}", self.0)
    }
}

/// Buffer transform as in `wl_output.transform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferTransform {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
    Flipped,
    Flipped90,
    Flipped180,
    Flipped270,
}

impl BufferTransform {
    /// Whether the transform swaps width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            BufferTransform::Rotate90
                | BufferTransform::Rotate270
                | BufferTransform::Flipped90
                | BufferTransform::Flipped270
        )
    }
}

/// Kinds of role a surface can take. Once set, the kind never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Subsurface,
    Toplevel,
    Cursor,
    DragIcon,
}

bitflags! {
    /// State groups touched by an applied commit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateChanges: u32 {
        const BUFFER = 1;
        const TRANSFORM = 1 << 1;
        const SCALE = 1 << 2;
        const INPUT_REGION = 1 << 3;
        const OPAQUE_REGION = 1 << 4;
        const FRAME_CALLBACKS = 1 << 5;
        /// Subsurface offset relative to the parent.
        const POSITION = 1 << 6;
        /// Paint order within the parent's stack.
        const STACK = 1 << 7;
    }
}

/// What `wl_surface.attach` staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferAssignment {
    /// A null buffer: the surface unmaps once this is applied.
    Removed,
    Attached(BufferRef),
}

/// State staged since the last commit. `None` means "unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingState {
    pub buffer: Option<BufferAssignment>,
    pub buffer_offset: Option<(i32, i32)>,
    pub transform: Option<BufferTransform>,
    pub scale: Option<i32>,
    /// `Some(None)` resets the input region to the whole surface.
    pub input_region: Option<Option<Region>>,
    /// `Some(None)` resets the opaque region to empty.
    pub opaque_region: Option<Option<Region>>,
    pub frame_callbacks: Vec<u64>,
    /// Staged `wl_subsurface.set_position`.
    pub position: Option<(i32, i32)>,
    /// Staged `wl_subsurface.place_above` / `place_below`, in request order.
    pub stack_requests: Vec<StackRequest>,
}

impl PendingState {
    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }

    /// The state groups this pending state would touch.
    pub fn changes(&self) -> StateChanges {
        let mut changes = StateChanges::empty();
        changes.set(
            StateChanges::BUFFER,
            self.buffer.is_some() || self.buffer_offset.is_some(),
        );
        changes.set(StateChanges::TRANSFORM, self.transform.is_some());
        changes.set(StateChanges::SCALE, self.scale.is_some());
        changes.set(StateChanges::INPUT_REGION, self.input_region.is_some());
        changes.set(StateChanges::OPAQUE_REGION, self.opaque_region.is_some());
        changes.set(StateChanges::FRAME_CALLBACKS, !self.frame_callbacks.is_empty());
        changes.set(StateChanges::POSITION, self.position.is_some());
        changes.set(StateChanges::STACK, !self.stack_requests.is_empty());
        changes
    }

    /// Folds a newer state on top of this one.
    ///
    /// Values set in `newer` win; callbacks and stack requests accumulate in
    /// order.
    pub fn merge(&mut self, newer: PendingState) {
        let PendingState {
            buffer,
            buffer_offset,
            transform,
            scale,
            input_region,
            opaque_region,
            frame_callbacks,
            position,
            stack_requests,
        } = newer;

        if buffer.is_some() {
            self.buffer = buffer;
        }
        if buffer_offset.is_some() {
            self.buffer_offset = buffer_offset;
        }
        if transform.is_some() {
            self.transform = transform;
        }
        if scale.is_some() {
            self.scale = scale;
        }
        if input_region.is_some() {
            self.input_region = input_region;
        }
        if opaque_region.is_some() {
            self.opaque_region = opaque_region;
        }
        if position.is_some() {
            self.position = position;
        }
        self.frame_callbacks.extend(frame_callbacks);
        self.stack_requests.extend(stack_requests);
    }

    /// Splits off the subsurface-role part (position and reorders).
    pub(crate) fn take_role_state(&mut self) -> (Option<(i32, i32)>, Vec<StackRequest>) {
        (self.position.take(), std::mem::take(&mut self.stack_requests))
    }
}

/// State that is visible to the renderer and to input routing.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentState {
    pub buffer: Option<BufferRef>,
    pub buffer_offset: (i32, i32),
    pub transform: BufferTransform,
    pub scale: i32,
    /// `None` means the whole surface accepts input.
    pub input_region: Option<Region>,
    /// `None` means nothing is known to be opaque.
    pub opaque_region: Option<Region>,
    /// Callbacks waiting for the next frame of this surface.
    pub frame_callbacks: Vec<u64>,
}

impl Default for CurrentState {
    fn default() -> Self {
        Self {
            buffer: None,
            buffer_offset: (0, 0),
            transform: BufferTransform::Normal,
            scale: 1,
            input_region: None,
            opaque_region: None,
            frame_callbacks: Vec::new(),
        }
    }
}

impl CurrentState {
    /// Applies the surface-level part of `state`. Role state (position, stack
    /// requests) must have been taken off beforehand.
    pub(crate) fn apply(&mut self, state: PendingState) -> StateChanges {
        debug_assert!(state.position.is_none() && state.stack_requests.is_empty());
        let changes = state.changes();

        if let Some(buffer) = state.buffer {
            self.buffer = match buffer {
                BufferAssignment::Removed => None,
                BufferAssignment::Attached(buffer) => Some(buffer),
            };
        }
        if let Some(offset) = state.buffer_offset {
            self.buffer_offset = offset;
        }
        if let Some(transform) = state.transform {
            self.transform = transform;
        }
        if let Some(scale) = state.scale {
            self.scale = scale;
        }
        if let Some(region) = state.input_region {
            self.input_region = region;
        }
        if let Some(region) = state.opaque_region {
            self.opaque_region = region;
        }
        self.frame_callbacks.extend(state.frame_callbacks);
        changes
    }

    /// Size in surface coordinates, or `(0, 0)` without a buffer.
    pub fn surface_size(&self) -> (i32, i32) {
        let Some(buffer) = self.buffer else {
            return (0, 0);
        };
        let scale = self.scale.max(1);
        let (w, h) = (buffer.width as i32 / scale, buffer.height as i32 / scale);
        if self.transform.swaps_axes() {
            (h, w)
        } else {
            (w, h)
        }
    }
}

/// A surface as owned by the registry.
#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    pub(crate) pending: PendingState,
    pub(crate) current: CurrentState,
    pub(crate) role: Option<RoleKind>,
    /// The live subsurface role object, if any. A surface whose role kind is
    /// [`RoleKind::Subsurface`] but has no role object had it destroyed.
    pub(crate) subsurface: Option<SubsurfaceRole>,
    /// Paint order of this surface and its direct children.
    pub(crate) stack: StackOrder,
}

impl Surface {
    pub(crate) fn new(id: SurfaceId) -> Self {
        Self {
            id,
            pending: PendingState::default(),
            current: CurrentState::default(),
            role: None,
            subsurface: None,
            stack: StackOrder::new(id),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    pub fn current(&self) -> &CurrentState {
        &self.current
    }

    pub fn role(&self) -> Option<RoleKind> {
        self.role
    }

    pub fn subsurface(&self) -> Option<&SubsurfaceRole> {
        self.subsurface.as_ref()
    }

    pub fn stack(&self) -> &StackOrder {
        &self.stack
    }

    /// Parent of an attached subsurface.
    pub fn parent(&self) -> Option<SurfaceId> {
        self.subsurface.as_ref().and_then(|role| role.parent())
    }

    pub fn has_buffer(&self) -> bool {
        self.current.buffer.is_some()
    }

    /// `wl_surface.attach`. `None` attaches a null buffer.
    pub fn attach(&mut self, buffer: Option<BufferRef>, dx: i32, dy: i32) {
        self.pending.buffer = Some(match buffer {
            Some(buffer) => BufferAssignment::Attached(buffer),
            None => BufferAssignment::Removed,
        });
        self.pending.buffer_offset = Some((dx, dy));
    }

    /// `wl_surface.set_input_region`. `None` means the whole surface.
    pub fn set_input_region(&mut self, region: Option<Region>) {
        self.pending.input_region = Some(region);
    }

    /// `wl_surface.set_opaque_region`. `None` means no opaque area.
    pub fn set_opaque_region(&mut self, region: Option<Region>) {
        self.pending.opaque_region = Some(region);
    }

    pub fn set_buffer_transform(&mut self, transform: BufferTransform) {
        self.pending.transform = Some(transform);
    }

    pub fn set_buffer_scale(&mut self, scale: i32) -> Result<(), SubsurfaceError> {
        if scale <= 0 {
            return Err(SubsurfaceError::InvalidScale {
                surface: self.id,
                scale,
            });
        }
        self.pending.scale = Some(scale);
        Ok(())
    }

    /// `wl_surface.frame`.
    pub fn frame(&mut self, callback_id: u64) {
        self.pending.frame_callbacks.push(callback_id);
    }

    /// Checks that a newly attached buffer matches the scale it will be
    /// shown at.
    pub(crate) fn validate_pending(&self) -> Result<(), SubsurfaceError> {
        if let Some(BufferAssignment::Attached(buffer)) = self.pending.buffer {
            let scale = self.pending.scale.unwrap_or(self.current.scale);
            if !buffer.fits_scale(scale) {
                return Err(SubsurfaceError::InvalidBufferSize {
                    surface: self.id,
                    width: buffer.width,
                    height: buffer.height,
                    scale,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferFormat, BufferId};
    use crate::region::Rectangle;
    use crate::stack::Placement;

    fn buffer(id: u64, w: u32, h: u32) -> BufferRef {
        BufferRef::new(BufferId::new(id), w, h, BufferFormat::Argb8888)
    }

    #[test]
    fn test_surface_creation_defaults() {
        let surface = Surface::new(SurfaceId::from_raw(7));
        assert_eq!(surface.id().as_raw(), 7);
        assert!(surface.pending().is_empty());
        assert_eq!(surface.current(), &CurrentState::default());
        assert_eq!(surface.current().scale, 1);
        assert!(surface.role().is_none());
        assert!(surface.parent().is_none());
        assert!(!surface.has_buffer());
        assert_eq!(surface.stack().snapshot(), vec![surface.id()]);
    }

    #[test]
    fn test_staging_has_no_immediate_effect() {
        let mut surface = Surface::new(SurfaceId::from_raw(1));
        surface.attach(Some(buffer(1, 10, 10)), 0, 0);
        surface.set_input_region(Some(Region::from_rect(Rectangle::new(0, 0, 5, 5))));
        surface.set_buffer_transform(BufferTransform::Rotate90);
        surface.frame(42);

        assert!(surface.current().buffer.is_none());
        assert!(surface.current().input_region.is_none());
        assert_eq!(
            surface.pending().changes(),
            StateChanges::BUFFER
                | StateChanges::INPUT_REGION
                | StateChanges::TRANSFORM
                | StateChanges::FRAME_CALLBACKS
        );
    }

    #[test]
    fn test_set_buffer_scale_rejects_non_positive() {
        let mut surface = Surface::new(SurfaceId::from_raw(1));
        assert!(matches!(
            surface.set_buffer_scale(0),
            Err(SubsurfaceError::InvalidScale { scale: 0, .. })
        ));
        assert!(surface.pending().scale.is_none());
        surface.set_buffer_scale(2).unwrap();
        assert_eq!(surface.pending().scale, Some(2));
    }

    #[test]
    fn test_validate_pending_checks_scale() {
        let mut surface = Surface::new(SurfaceId::from_raw(1));
        surface.attach(Some(buffer(1, 15, 10)), 0, 0);
        surface.set_buffer_scale(2).unwrap();
        assert!(matches!(
            surface.validate_pending(),
            Err(SubsurfaceError::InvalidBufferSize { width: 15, .. })
        ));
        surface.set_buffer_scale(1).unwrap();
        assert!(surface.validate_pending().is_ok());
    }

    #[test]
    fn test_pending_merge_newer_wins() {
        let reference = SurfaceId::from_raw(9);
        let mut older = PendingState::default();
        older.buffer = Some(BufferAssignment::Attached(buffer(1, 4, 4)));
        older.position = Some((1, 1));
        older.frame_callbacks.push(1);
        older.stack_requests.push(StackRequest { reference, placement: Placement::Above });

        let mut newer = PendingState::default();
        newer.position = Some((5, 5));
        newer.frame_callbacks.push(2);
        newer.input_region = Some(None);

        older.merge(newer);
        assert_eq!(older.buffer, Some(BufferAssignment::Attached(buffer(1, 4, 4))));
        assert_eq!(older.position, Some((5, 5)));
        assert_eq!(older.frame_callbacks, vec![1, 2]);
        assert_eq!(older.input_region, Some(None));
        assert_eq!(older.stack_requests.len(), 1);
    }

    #[test]
    fn test_current_apply_null_buffer_unmaps() {
        let mut current = CurrentState::default();
        let mut state = PendingState::default();
        state.buffer = Some(BufferAssignment::Attached(buffer(3, 8, 8)));
        assert!(current.apply(state).contains(StateChanges::BUFFER));
        assert_eq!(current.surface_size(), (8, 8));

        let mut state = PendingState::default();
        state.buffer = Some(BufferAssignment::Removed);
        current.apply(state);
        assert!(current.buffer.is_none());
        assert_eq!(current.surface_size(), (0, 0));
    }

    #[test]
    fn test_surface_size_honours_scale_and_rotation() {
        let mut current = CurrentState::default();
        current.buffer = Some(buffer(1, 40, 20));
        current.scale = 2;
        assert_eq!(current.surface_size(), (20, 10));
        current.transform = BufferTransform::Rotate270;
        assert_eq!(current.surface_size(), (10, 20));
    }
}
