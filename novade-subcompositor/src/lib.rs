//! # Novade Subcompositor
//!
//! Surface-tree core of the Novade Wayland compositor:
//! - Surfaces (`wl_surface`): double-buffered pending/current state and roles.
//! - Subsurfaces (`wl_subsurface`): parent links, positions, per-parent
//!   stacking, and synchronized/desynchronized commit behaviour.
//! - Commit propagation: caching of synchronized state and its release when
//!   an ancestor's state is applied.
//! - A paint-ordered [`scene`] snapshot and hit testing for input routing.
//!
//! Protocol parsing and rendering live elsewhere; the binding layer maps
//! requests onto [`Compositor`] methods and [`SubsurfaceError`]s onto
//! protocol errors.

pub mod buffer;
pub mod commit;
pub mod compositor;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod region;
pub mod registry;
pub mod scene;
pub mod stack;
pub mod subcompositor;
pub mod surface;

pub use buffer::{BufferFormat, BufferId, BufferRef};
pub use commit::CommitReport;
pub use compositor::{Compositor, SharedCompositor};
pub use config::{CompositorConfig, ConfigLoader, LoggingConfig, SubcompositorConfig};
pub use error::{ConfigError, LoggingError, SubsurfaceError};
pub use region::{Rectangle, Region};
pub use registry::SurfaceRegistry;
pub use scene::{Scene, SceneElement};
pub use stack::{Placement, StackOrder};
pub use subcompositor::{CachedState, Subcompositor, SubsurfaceRole, SyncMode};
pub use surface::{BufferTransform, RoleKind, StateChanges, Surface, SurfaceId};
