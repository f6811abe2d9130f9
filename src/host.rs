//! The window-manager side of the overlay. The overlay asks for a size and
//! hands over finished views; where and how they end up on screen is the
//! host's business.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ratatui::layout::Rect;
use tracing::debug;

use crate::overlay::layout::WindowSize;
use crate::overlay::render::OverlayView;

pub trait WindowHost: Send {
    fn request_resize(&mut self, size: WindowSize);
    fn present(&mut self, view: &OverlayView);
}

/// Pixel size of one terminal cell, used to turn window pixels into cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMetrics {
    pub width_px: u16,
    pub height_px: u16,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width_px: 8,
            height_px: 16,
        }
    }
}

impl CellMetrics {
    pub fn cells(self, size: WindowSize) -> (u16, u16) {
        let w = u32::from(self.width_px.max(1));
        let h = u32::from(self.height_px.max(1));
        let cols = size.width.div_ceil(w);
        let rows = size.height.div_ceil(h);
        (
            u16::try_from(cols).unwrap_or(u16::MAX),
            u16::try_from(rows).unwrap_or(u16::MAX),
        )
    }
}

#[derive(Default)]
struct Slot {
    size: Option<WindowSize>,
    view: Option<OverlayView>,
    resizes: u64,
}

/// Hosts the overlay as a floating panel inside the terminal. The overlay
/// thread writes through one clone, the draw loop reads through another.
#[derive(Clone)]
pub struct TerminalHost {
    metrics: CellMetrics,
    slot: Arc<Mutex<Slot>>,
}

impl TerminalHost {
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            metrics,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn size(&self) -> Option<WindowSize> {
        self.slot().size
    }

    pub fn view(&self) -> Option<OverlayView> {
        self.slot().view.clone()
    }

    pub fn resize_count(&self) -> u64 {
        self.slot().resizes
    }

    /// Where the panel goes: bottom-right corner of `screen`, clipped.
    pub fn placement(&self, screen: Rect) -> Option<Rect> {
        let size = self.size()?;
        let (cols, rows) = self.metrics.cells(size);
        let width = cols.min(screen.width);
        let height = rows.min(screen.height);
        let x = screen.x + screen.width.saturating_sub(width).saturating_sub(1);
        let y = screen.y + screen.height.saturating_sub(height).saturating_sub(1);
        Some(Rect::new(x, y, width, height))
    }
}

impl WindowHost for TerminalHost {
    fn request_resize(&mut self, size: WindowSize) {
        let mut slot = self.slot();
        if slot.size != Some(size) {
            debug!(width = size.width, height = size.height, "overlay resize");
        }
        slot.size = Some(size);
        slot.resizes += 1;
    }

    fn present(&mut self, view: &OverlayView) {
        self.slot().view = Some(view.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_round_up() {
        let m = CellMetrics::default();
        assert_eq!(m.cells(WindowSize::for_group_count(0)), (19, 7));
        assert_eq!(m.cells(WindowSize::for_group_count(1)), (23, 7));
    }

    #[test]
    fn test_zero_metrics_do_not_divide_by_zero() {
        let m = CellMetrics { width_px: 0, height_px: 0 };
        assert_eq!(m.cells(WindowSize { width: 10, height: 5 }), (10, 5));
    }

    #[test]
    fn test_placement_bottom_right() {
        let mut host = TerminalHost::new(CellMetrics::default());
        assert!(host.placement(Rect::new(0, 0, 80, 24)).is_none());
        host.request_resize(WindowSize::for_group_count(0));
        assert_eq!(host.placement(Rect::new(0, 0, 80, 24)), Some(Rect::new(60, 16, 19, 7)));
        assert_eq!(host.resize_count(), 1);
    }

    #[test]
    fn test_placement_clipped_to_small_screen() {
        let mut host = TerminalHost::new(CellMetrics::default());
        host.request_resize(WindowSize::for_group_count(10));
        let r = host.placement(Rect::new(0, 0, 20, 4)).unwrap();
        assert_eq!((r.width, r.height), (20, 4));
    }
}
