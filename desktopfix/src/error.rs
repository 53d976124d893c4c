//! DesktopFix Error Types
//!
//! None of these reach the caller of a patched primitive. Surface and
//! pattern errors only explain, in the log, why a repaint was skipped.
//! Installation errors are returned to whoever installs the patches.

use core::fmt;

use crate::pattern::PatternType;
use crate::trap::TrapSelector;

/// Why the main screen cannot be written directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// No main graphics device.
    NoDevice,
    /// The device has no pixel map (or it was purged).
    NoPixMap,
    /// The screen is not at 32 bits per pixel.
    UnsupportedDepth(u16),
    /// The pixel map bounds are empty.
    EmptyBounds,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::NoDevice => write!(f, "no main device"),
            SurfaceError::NoPixMap => write!(f, "main device has no pixel map"),
            SurfaceError::UnsupportedDepth(depth) => {
                write!(f, "screen depth {} is not 32bpp", depth)
            }
            SurfaceError::EmptyBounds => write!(f, "screen bounds are empty"),
        }
    }
}

/// Why a pattern cannot be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    /// No pattern handle, or it was purged.
    MissingPattern,
    /// Not an indexed pixel pattern.
    UnsupportedType(PatternType),
    /// The pattern's pixel map is missing or purged.
    MissingPixMap,
    /// The pattern's pixel data is missing or purged.
    MissingPixData,
    /// Tile bounds have no area.
    EmptyTile { width: i32, height: i32 },
    /// The tile is not 8 bits per pixel.
    UnsupportedDepth(u16),
    /// The tile has no color table.
    MissingColorTable,
    /// Pixel data is shorter than the tile geometry requires.
    TruncatedData { needed: usize, available: usize },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MissingPattern => write!(f, "no pattern"),
            PatternError::UnsupportedType(ty) => write!(f, "unsupported pattern type {:?}", ty),
            PatternError::MissingPixMap => write!(f, "pattern has no pixel map"),
            PatternError::MissingPixData => write!(f, "pattern has no pixel data"),
            PatternError::EmptyTile { width, height } => {
                write!(f, "empty tile {}x{}", width, height)
            }
            PatternError::UnsupportedDepth(depth) => {
                write!(f, "tile depth {} is not 8bpp", depth)
            }
            PatternError::MissingColorTable => write!(f, "tile has no color table"),
            PatternError::TruncatedData { needed, available } => {
                write!(
                    f,
                    "tile data truncated: needed={}, available={}",
                    needed, available
                )
            }
        }
    }
}

/// Installation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    /// Gestalt has no QuickDraw version.
    QuickDrawUnavailable,
    /// QuickDraw predates 32-bit color.
    QuickDrawTooOld(u32),
    /// The function table has no entry for this trap.
    MissingTrap(TrapSelector),
    /// The entry for this trap has the wrong procedure shape.
    MismatchedTrap(TrapSelector),
    /// The entry for this trap is already one of ours.
    AlreadyInstalled(TrapSelector),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::QuickDrawUnavailable => write!(f, "QuickDraw version unavailable"),
            InstallError::QuickDrawTooOld(version) => {
                write!(f, "QuickDraw {:#06x} lacks 32-bit color", version)
            }
            InstallError::MissingTrap(sel) => write!(f, "no entry for trap {}", sel),
            InstallError::MismatchedTrap(sel) => {
                write!(f, "entry for trap {} has the wrong shape", sel)
            }
            InstallError::AlreadyInstalled(sel) => write!(f, "trap {} already patched", sel),
        }
    }
}
