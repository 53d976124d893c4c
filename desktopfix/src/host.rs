//! Host boundary
//!
//! Everything the patches read from the surrounding system: the main
//! graphics device, the current port, the Window Manager's color port,
//! the menu bar height and the window list. All of it is owned and
//! updated by the host; the patches only look.

use crate::handle::Handle;
use crate::pattern::PixPat;
use crate::region::Region;
use crate::surface::DeviceDescriptor;

/// Identity of a graphics port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(pub u64);

/// The parts of a color graphics port the patches care about.
#[derive(Debug)]
pub struct GrafPort {
    pub id: PortId,
    /// Background pattern used by `EraseRect`
    pub bk_pix_pat: Option<Handle<PixPat>>,
}

impl GrafPort {
    pub fn new(id: PortId) -> Self {
        Self {
            id,
            bk_pix_pat: None,
        }
    }

    pub fn with_background(id: PortId, pattern: Handle<PixPat>) -> Self {
        Self {
            id,
            bk_pix_pat: Some(pattern),
        }
    }
}

/// One entry of the window list.
#[derive(Debug, Clone, Default)]
pub struct WindowRecord {
    /// Structure region (frame plus content), if the window has one
    pub struc_rgn: Option<Region>,
}

impl WindowRecord {
    pub fn with_structure(rgn: Region) -> Self {
        Self {
            struc_rgn: Some(rgn),
        }
    }
}

/// Read-only view of the host's graphics state.
///
/// Called from inside patched traps, so implementations must not call
/// back into the patched primitives.
pub trait Host: Send + Sync {
    /// `GetMainDevice`
    fn main_device(&self) -> Option<DeviceDescriptor>;

    /// `GetPort`
    fn current_port(&self) -> PortId;

    /// `WMgrCPort`, the port the desktop is drawn through
    fn window_manager_port(&self) -> Option<&GrafPort>;

    /// `MBarHeight`
    fn menu_bar_height(&self) -> i32;

    /// `WindowList`, front to back. The last entry is the desktop window.
    fn window_list(&self) -> &[WindowRecord];

    /// `Gestalt(gestaltQuickdrawVersion)`
    fn quickdraw_version(&self) -> Option<u32>;
}
