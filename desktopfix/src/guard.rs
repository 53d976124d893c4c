//! Repair guard
//!
//! Decides whether a patched call drew the kind of thing the 32bpp pattern
//! bug corrupts: a small desktop area (icon mask or label) drawn through
//! the Window Manager port, below the menu bar, clear of every window.
//! Anything else is left exactly as the original trap drew it.

use crate::config::RepairLimits;
use crate::geometry::Rect;
use crate::host::{Host, WindowRecord};

/// Which primitive the area came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaForm {
    /// `FillCRgn`, area is a region's bounding box
    Region,
    /// `EraseRect`
    Rect,
}

impl AreaForm {
    /// Smallest accepted width and height for this form
    pub fn min_extent(self, limits: &RepairLimits) -> i32 {
        match self {
            AreaForm::Region => limits.min_region_extent,
            AreaForm::Rect => limits.min_rect_extent,
        }
    }
}

/// Check if drawing currently goes through `WMgrCPort`.
pub fn is_window_manager_draw(host: &dyn Host) -> bool {
    host.window_manager_port()
        .is_some_and(|port| port.id == host.current_port())
}

/// Check if `area`'s size is inside the accepted window.
pub fn within_size_limits(area: &Rect, form: AreaForm, limits: &RepairLimits) -> bool {
    let min = form.min_extent(limits);
    let (w, h) = (area.width(), area.height());
    w >= min && h >= min && w <= limits.max_extent && h <= limits.max_extent
}

/// Check if `area` touches the structure region of any window but the
/// last (the desktop window).
pub fn rect_in_any_window_struc(area: &Rect, windows: &[WindowRecord]) -> bool {
    let Some((_desktop, windows)) = windows.split_last() else {
        return false;
    };

    windows.iter().any(|win| {
        win.struc_rgn
            .as_ref()
            .is_some_and(|rgn| rgn.intersects_rect(area))
    })
}

/// Whether the corrective repaint should run for `area`.
///
/// `surface_ready` is the state of the screen cache; without a 32bpp
/// screen there is nothing to fix.
pub fn should_repair(
    host: &dyn Host,
    surface_ready: bool,
    area: &Rect,
    form: AreaForm,
    limits: &RepairLimits,
) -> bool {
    if !surface_ready || !is_window_manager_draw(host) {
        return false;
    }

    if !within_size_limits(area, form, limits) {
        log::trace!("{:?} {:?} outside size limits", form, area);
        return false;
    }

    if area.top < host.menu_bar_height() {
        log::trace!("{:?} {:?} reaches into the menu bar", form, area);
        return false;
    }

    if rect_in_any_window_struc(area, host.window_list()) {
        log::trace!("{:?} {:?} overlaps a window", form, area);
        return false;
    }

    true
}
