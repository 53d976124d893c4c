//! DesktopFix
//!
//! Repairs desktop pattern corruption on 32bpp screens.
//!
//! At 32 bits per pixel, `FillCRgn` and `EraseRect` draw small desktop
//! areas (behind icon masks and icon labels) with garbage instead of the
//! desktop pixel pattern. This crate tail-patches both traps: the original
//! runs first, then the pattern tile is rendered again straight into the
//! frame buffer from the pattern's raw 8-bit data and color table.
//!
//! # Architecture
//!
//! - `surface`: cached main screen description and direct pixel access
//! - `render`: indexed tile to 32bpp renderer, region and rect forms
//! - `guard`: when a repaint is allowed to happen
//! - `intercept`: the patches, their recursion flag and statistics
//! - `trap`: trap table entries and an in-memory dispatch table
//! - `host`: what the patches read from the running system
//! - `handle`, `pattern`, `region`, `geometry`: host data model
//!
//! Nothing here reports errors to the drawing code: when the fix does
//! not apply, the original trap's output is left as it is.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod geometry;
pub mod guard;
pub mod handle;
pub mod host;
pub mod intercept;
pub mod pattern;
pub mod region;
pub mod render;
pub mod surface;
pub mod trap;

#[cfg(test)]
mod testing;

use alloc::sync::Arc;

pub use config::RepairLimits;
pub use error::{InstallError, PatternError, SurfaceError};
pub use geometry::{Point, Rect};
pub use handle::{Handle, HandleLock, HandleState};
pub use host::{GrafPort, Host, PortId, WindowRecord};
pub use intercept::{Interceptor, PatchStatsSnapshot};
pub use pattern::{ColorSpec, ColorTable, PatternType, PixMap, PixPat, RgbColor};
pub use region::Region;
pub use surface::{DeviceDescriptor, DevicePixMap, FrameBuffer, PixelBuffer};
pub use trap::{DispatchTable, TrapEntry, TrapOrigin, TrapSelector, TrapTable};

/// Check for 32-bit QuickDraw and patch `FillCRgn` and `EraseRect`.
///
/// Call once at startup, before anything draws. On error nothing has
/// been patched.
pub fn install(
    host: Arc<dyn Host>,
    table: &dyn TrapTable,
) -> Result<Arc<Interceptor>, InstallError> {
    let version = host
        .quickdraw_version()
        .ok_or(InstallError::QuickDrawUnavailable)?;
    if version < config::GESTALT_32BIT_QD {
        return Err(InstallError::QuickDrawTooOld(version));
    }

    log::info!("QuickDraw {:#06x}, installing desktop pattern fix", version);
    Interceptor::install(host, table, RepairLimits::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{solid_pattern, MockHost, RED};

    fn table() -> DispatchTable {
        let table = DispatchTable::new();
        table.set_tool_trap_address(TrapSelector::FillCRgn, TrapEntry::fill_c_rgn(|_, _| {}));
        table.set_tool_trap_address(TrapSelector::EraseRect, TrapEntry::erase_rect(|_| {}));
        table
    }

    #[test]
    fn test_install_requires_32bit_quickdraw() {
        let table = table();

        let old: Arc<dyn Host> =
            Arc::new(MockHost::new(64, 64).with_quickdraw_version(Some(0x0100)));
        assert_eq!(
            install(old, &table).err(),
            Some(InstallError::QuickDrawTooOld(0x0100))
        );

        let none: Arc<dyn Host> = Arc::new(MockHost::new(64, 64).with_quickdraw_version(None));
        assert_eq!(
            install(none, &table).err(),
            Some(InstallError::QuickDrawUnavailable)
        );

        assert_eq!(
            table.get_tool_trap_address(TrapSelector::FillCRgn).unwrap().origin,
            TrapOrigin::Host
        );
    }

    #[test]
    fn test_install_and_dispatch() {
        let table = table();
        let host = Arc::new(
            MockHost::new(64, 64)
                .with_menu_bar_height(4)
                .with_background(solid_pattern(RED)),
        );

        let patch = install(host.clone(), &table).unwrap();
        assert_eq!(*patch.limits(), RepairLimits::default());

        table.fill_c_rgn(&Region::from_rect(Rect::new(8, 8, 16, 16)), host.background());
        assert_eq!(host.pixels().pixel(8, 8), Some(0x00FF_0000));
        assert!(patch.surface_ready());
        assert_eq!(patch.stats().repairs, 1);
    }
}
