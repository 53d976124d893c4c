//! Trap dispatch table
//!
//! Toolbox primitives are reached through a table keyed by trap word.
//! Patching a trap means reading the current entry, keeping it, and
//! writing a new entry that calls the kept one (`GetToolTrapAddress` /
//! `SetToolTrapAddress`).
//!
//! [`DispatchTable`] is an in-memory table with the same contract. Calls
//! through it never hold the table lock while a routine runs, so a routine
//! may dispatch further traps, including the one it implements.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::fmt;

use spin::Mutex;

use crate::config::{ERASE_RECT_TRAP, FILL_C_RGN_TRAP};
use crate::geometry::Rect;
use crate::handle::Handle;
use crate::pattern::PixPat;
use crate::region::Region;

/// The patched traps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapSelector {
    FillCRgn,
    EraseRect,
}

impl TrapSelector {
    /// Trap word used as the table key
    pub fn trap_word(self) -> u16 {
        match self {
            TrapSelector::FillCRgn => FILL_C_RGN_TRAP,
            TrapSelector::EraseRect => ERASE_RECT_TRAP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrapSelector::FillCRgn => "FillCRgn",
            TrapSelector::EraseRect => "EraseRect",
        }
    }
}

impl fmt::Display for TrapSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06X})", self.name(), self.trap_word())
    }
}

/// `FillCRgn(rgn, pp)`
pub type FillCRgnProc = Arc<dyn Fn(&Region, Option<&Handle<PixPat>>) + Send + Sync>;

/// `EraseRect(r)`
pub type EraseRectProc = Arc<dyn Fn(&Rect) + Send + Sync>;

/// A trap routine of either shape.
#[derive(Clone)]
pub enum TrapProc {
    FillCRgn(FillCRgnProc),
    EraseRect(EraseRectProc),
}

/// Who installed a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOrigin {
    /// The system or an earlier patch
    Host,
    /// This crate's interceptor
    DesktopFix,
}

/// One table entry.
#[derive(Clone)]
pub struct TrapEntry {
    pub routine: TrapProc,
    pub origin: TrapOrigin,
}

impl TrapEntry {
    /// A host-provided `FillCRgn`
    pub fn fill_c_rgn<F>(f: F) -> Self
    where
        F: Fn(&Region, Option<&Handle<PixPat>>) + Send + Sync + 'static,
    {
        Self {
            routine: TrapProc::FillCRgn(Arc::new(f)),
            origin: TrapOrigin::Host,
        }
    }

    /// A host-provided `EraseRect`
    pub fn erase_rect<F>(f: F) -> Self
    where
        F: Fn(&Rect) + Send + Sync + 'static,
    {
        Self {
            routine: TrapProc::EraseRect(Arc::new(f)),
            origin: TrapOrigin::Host,
        }
    }

    /// The trap this routine's shape belongs to
    pub fn shape(&self) -> TrapSelector {
        match self.routine {
            TrapProc::FillCRgn(_) => TrapSelector::FillCRgn,
            TrapProc::EraseRect(_) => TrapSelector::EraseRect,
        }
    }
}

impl fmt::Debug for TrapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrapEntry")
            .field("shape", &self.shape())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Read and replace trap table entries.
pub trait TrapTable {
    /// `GetToolTrapAddress`
    fn get_tool_trap_address(&self, selector: TrapSelector) -> Option<TrapEntry>;

    /// `SetToolTrapAddress`
    fn set_tool_trap_address(&self, selector: TrapSelector, entry: TrapEntry);
}

/// In-memory trap table.
#[derive(Default)]
pub struct DispatchTable {
    entries: Mutex<BTreeMap<u16, TrapEntry>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch `FillCRgn` through the current entry
    pub fn fill_c_rgn(&self, rgn: &Region, pp: Option<&Handle<PixPat>>) {
        match self.get_tool_trap_address(TrapSelector::FillCRgn) {
            Some(TrapEntry {
                routine: TrapProc::FillCRgn(f),
                ..
            }) => f(rgn, pp),
            other => log::warn!("FillCRgn dispatched to {:?}", other),
        }
    }

    /// Dispatch `EraseRect` through the current entry
    pub fn erase_rect(&self, r: &Rect) {
        match self.get_tool_trap_address(TrapSelector::EraseRect) {
            Some(TrapEntry {
                routine: TrapProc::EraseRect(f),
                ..
            }) => f(r),
            other => log::warn!("EraseRect dispatched to {:?}", other),
        }
    }
}

impl TrapTable for DispatchTable {
    fn get_tool_trap_address(&self, selector: TrapSelector) -> Option<TrapEntry> {
        self.entries.lock().get(&selector.trap_word()).cloned()
    }

    fn set_tool_trap_address(&self, selector: TrapSelector, entry: TrapEntry) {
        self.entries.lock().insert(selector.trap_word(), entry);
    }
}
