//! Tail patches for `FillCRgn` and `EraseRect`
//!
//! Each patch always runs the saved original first, with the caller's
//! arguments untouched, so region bookkeeping and invalidation stay
//! QuickDraw's. Afterwards, if the guard accepts the area, the pattern is
//! rendered again directly into the 32bpp screen.
//!
//! ## Re-entrancy
//!
//! The original routines may call the other patched trap (or the same
//! one). While a patch is running, nested calls go straight to the saved
//! original: no guard, no render.
//!
//! ```text
//!   Idle ──enter──▶ InPatch ──exit (always)──▶ Idle
//!                      │
//!                      └─ nested call: original only
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use spin::Mutex;

use crate::config::RepairLimits;
use crate::error::{InstallError, PatternError};
use crate::geometry::Rect;
use crate::guard::{should_repair, AreaForm};
use crate::handle::Handle;
use crate::host::Host;
use crate::pattern::PixPat;
use crate::region::Region;
use crate::render::{render_pattern_in_rect, render_pattern_in_region, RenderStats};
use crate::surface::{PixelBuffer, SurfaceCache};
use crate::trap::{
    EraseRectProc, FillCRgnProc, TrapEntry, TrapOrigin, TrapProc, TrapSelector, TrapTable,
};

/// Marks a patch as running for as long as it lives.
pub struct PatchScope<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PatchScope<'a> {
    /// Enter the patch. `None` if a patch is already running.
    pub fn enter(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::Relaxed) {
            return None;
        }
        Some(Self { flag })
    }
}

impl<'a> Drop for PatchScope<'a> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Patch activity counters.
#[derive(Debug, Default)]
pub struct PatchStats {
    fill_calls: AtomicU64,
    erase_calls: AtomicU64,
    reentrant_calls: AtomicU64,
    guard_evaluations: AtomicU64,
    repairs: AtomicU64,
    render_failures: AtomicU64,
    pixels_written: AtomicU64,
}

/// Point-in-time copy of [`PatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStatsSnapshot {
    /// Calls into the `FillCRgn` patch, nested ones included
    pub fill_calls: u64,
    /// Calls into the `EraseRect` patch, nested ones included
    pub erase_calls: u64,
    /// Nested calls passed straight to the original
    pub reentrant_calls: u64,
    pub guard_evaluations: u64,
    /// Successful repaints
    pub repairs: u64,
    /// Repaints abandoned because of the pattern
    pub render_failures: u64,
    pub pixels_written: u64,
}

impl PatchStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PatchStatsSnapshot {
        PatchStatsSnapshot {
            fill_calls: self.fill_calls.load(Ordering::Relaxed),
            erase_calls: self.erase_calls.load(Ordering::Relaxed),
            reentrant_calls: self.reentrant_calls.load(Ordering::Relaxed),
            guard_evaluations: self.guard_evaluations.load(Ordering::Relaxed),
            repairs: self.repairs.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
            pixels_written: self.pixels_written.load(Ordering::Relaxed),
        }
    }
}

/// The patch context: saved originals, screen cache and recursion flag.
pub struct Interceptor {
    host: Arc<dyn Host>,
    original_fill: FillCRgnProc,
    original_erase: EraseRectProc,
    surface: Mutex<SurfaceCache>,
    in_patch: AtomicBool,
    limits: RepairLimits,
    stats: PatchStats,
}

impl Interceptor {
    /// Wrap the given originals. Nothing is installed.
    pub fn new(
        host: Arc<dyn Host>,
        original_fill: FillCRgnProc,
        original_erase: EraseRectProc,
        limits: RepairLimits,
    ) -> Self {
        Self {
            host,
            original_fill,
            original_erase,
            surface: Mutex::new(SurfaceCache::new()),
            in_patch: AtomicBool::new(false),
            limits,
            stats: PatchStats::default(),
        }
    }

    /// Save the current `FillCRgn` and `EraseRect` entries of `table` and
    /// replace them with the patches.
    ///
    /// Must run once, before anything draws. Both entries are checked
    /// before either is replaced, so a failure leaves `table` untouched.
    pub fn install(
        host: Arc<dyn Host>,
        table: &dyn TrapTable,
        limits: RepairLimits,
    ) -> Result<Arc<Self>, InstallError> {
        let fill = match Self::saved_entry(table, TrapSelector::FillCRgn)? {
            TrapProc::FillCRgn(f) => f,
            TrapProc::EraseRect(_) => {
                return Err(InstallError::MismatchedTrap(TrapSelector::FillCRgn))
            }
        };
        let erase = match Self::saved_entry(table, TrapSelector::EraseRect)? {
            TrapProc::EraseRect(f) => f,
            TrapProc::FillCRgn(_) => {
                return Err(InstallError::MismatchedTrap(TrapSelector::EraseRect))
            }
        };

        let patch = Arc::new(Self::new(host, fill, erase, limits));

        let p = patch.clone();
        table.set_tool_trap_address(
            TrapSelector::FillCRgn,
            TrapEntry {
                origin: TrapOrigin::DesktopFix,
                ..TrapEntry::fill_c_rgn(move |rgn, pp| p.fill_c_rgn(rgn, pp))
            },
        );
        let p = patch.clone();
        table.set_tool_trap_address(
            TrapSelector::EraseRect,
            TrapEntry {
                origin: TrapOrigin::DesktopFix,
                ..TrapEntry::erase_rect(move |r| p.erase_rect(r))
            },
        );

        log::info!(
            "patched {} and {}",
            TrapSelector::FillCRgn,
            TrapSelector::EraseRect
        );
        Ok(patch)
    }

    fn saved_entry(
        table: &dyn TrapTable,
        selector: TrapSelector,
    ) -> Result<TrapProc, InstallError> {
        let entry = table
            .get_tool_trap_address(selector)
            .ok_or(InstallError::MissingTrap(selector))?;
        if entry.origin == TrapOrigin::DesktopFix {
            return Err(InstallError::AlreadyInstalled(selector));
        }
        Ok(entry.routine)
    }

    /// Patched `FillCRgn`
    pub fn fill_c_rgn(&self, rgn: &Region, pp: Option<&Handle<PixPat>>) {
        PatchStats::bump(&self.stats.fill_calls);

        let Some(_scope) = PatchScope::enter(&self.in_patch) else {
            PatchStats::bump(&self.stats.reentrant_calls);
            (self.original_fill)(rgn, pp);
            return;
        };

        (self.original_fill)(rgn, pp);

        if let Some(surface) = self.repair_target(&rgn.bounding_box(), AreaForm::Region) {
            let result = render_pattern_in_region(&surface, rgn, pp);
            self.record(TrapSelector::FillCRgn, result);
        }
    }

    /// Patched `EraseRect`. Repaints with the `WMgrCPort` background.
    pub fn erase_rect(&self, r: &Rect) {
        PatchStats::bump(&self.stats.erase_calls);

        let Some(_scope) = PatchScope::enter(&self.in_patch) else {
            PatchStats::bump(&self.stats.reentrant_calls);
            (self.original_erase)(r);
            return;
        };

        (self.original_erase)(r);

        if let Some(surface) = self.repair_target(r, AreaForm::Rect) {
            let background = self
                .host
                .window_manager_port()
                .and_then(|port| port.bk_pix_pat.as_ref());
            match background {
                Some(pattern) => {
                    let result = render_pattern_in_rect(&surface, r, Some(pattern));
                    self.record(TrapSelector::EraseRect, result);
                }
                None => log::trace!("WMgrCPort has no background pattern"),
            }
        }
    }

    /// The screen to repaint, if the guard accepts `area`.
    fn repair_target(&self, area: &Rect, form: AreaForm) -> Option<PixelBuffer> {
        PatchStats::bump(&self.stats.guard_evaluations);

        let mut cache = self.surface.lock();
        let ready = cache.ensure(&*self.host);
        if !should_repair(&*self.host, ready, area, form, &self.limits) {
            return None;
        }
        cache.buffer().cloned()
    }

    fn record(&self, selector: TrapSelector, result: Result<RenderStats, PatternError>) {
        match result {
            Ok(stats) => {
                PatchStats::bump(&self.stats.repairs);
                self.stats
                    .pixels_written
                    .fetch_add(stats.pixels_written, Ordering::Relaxed);
                log::trace!(
                    "{} repaired {} pixels in {} rows",
                    selector.name(),
                    stats.pixels_written,
                    stats.rows
                );
            }
            Err(err) => {
                PatchStats::bump(&self.stats.render_failures);
                log::debug!("{} repair skipped: {}", selector.name(), err);
            }
        }
    }

    /// Check if a patch is currently running
    pub fn in_patch(&self) -> bool {
        self.in_patch.load(Ordering::Relaxed)
    }

    /// Check if the 32bpp screen has been found
    pub fn surface_ready(&self) -> bool {
        self.surface.lock().is_ready()
    }

    pub fn limits(&self) -> &RepairLimits {
        &self.limits
    }

    pub fn stats(&self) -> PatchStatsSnapshot {
        self.stats.snapshot()
    }
}
