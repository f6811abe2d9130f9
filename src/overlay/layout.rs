use crate::keyboard::KeystrokeFrame;

pub const BASE_WIDTH_PX: u32 = 150;
pub const GROUP_WIDTH_PX: u32 = 32;
pub const WINDOW_HEIGHT_PX: u32 = 100;

/// Host window size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    /// `150 + 32n` by `100` for a frame of `n` key-groups.
    pub fn for_group_count(groups: usize) -> Self {
        let groups = u32::try_from(groups).unwrap_or(u32::MAX);
        Self {
            width: BASE_WIDTH_PX.saturating_add(GROUP_WIDTH_PX.saturating_mul(groups)),
            height: WINDOW_HEIGHT_PX,
        }
    }

    pub fn for_frame(frame: &KeystrokeFrame) -> Self {
        Self::for_group_count(frame.group_count())
    }
}

/// How key-groups are arranged inside the overlay. Sizing and colors do not
/// depend on the choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// One row per key-group.
    #[default]
    ChordRows,
    /// Every key on a single row, with a gap between groups.
    FlatRow,
    /// Groups flow left to right and wrap after `columns`.
    WrapGrid { columns: u16 },
}

/// Grid coordinates of one key glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub group: usize,
    pub key: usize,
    pub row: u16,
    pub column: u16,
}

impl LayoutStrategy {
    pub fn name(self) -> &'static str {
        match self {
            LayoutStrategy::ChordRows => "chord-rows",
            LayoutStrategy::FlatRow => "flat-row",
            LayoutStrategy::WrapGrid { .. } => "wrap-grid",
        }
    }

    /// Place every key of `frame` on a logical grid. Columns count glyphs,
    /// not cells; the widget decides how wide a glyph is.
    pub fn arrange(self, frame: &KeystrokeFrame) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(frame.key_count());
        match self {
            LayoutStrategy::ChordRows => {
                for (g, group) in frame.groups().iter().enumerate() {
                    for k in 0..group.len() {
                        slots.push(Slot {
                            group: g,
                            key: k,
                            row: to_u16(g),
                            column: to_u16(k),
                        });
                    }
                }
            }
            LayoutStrategy::FlatRow => {
                let mut column = 0u16;
                for (g, group) in frame.groups().iter().enumerate() {
                    if g > 0 {
                        column = column.saturating_add(1);
                    }
                    for k in 0..group.len() {
                        slots.push(Slot {
                            group: g,
                            key: k,
                            row: 0,
                            column,
                        });
                        column = column.saturating_add(1);
                    }
                }
            }
            LayoutStrategy::WrapGrid { columns } => {
                let columns = columns.max(1);
                let mut row = 0u16;
                let mut column = 0u16;
                for (g, group) in frame.groups().iter().enumerate() {
                    let width = to_u16(group.len());
                    // a group never straddles a line unless it is wider than one
                    if column > 0 && column.saturating_add(width) > columns {
                        row = row.saturating_add(1);
                        column = 0;
                    }
                    for k in 0..group.len() {
                        slots.push(Slot {
                            group: g,
                            key: k,
                            row,
                            column,
                        });
                        column = column.saturating_add(1);
                    }
                    column = column.saturating_add(1);
                }
            }
        }
        slots
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
