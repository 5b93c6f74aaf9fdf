//! Session fingerprints
//!
//! SHA-256 over a fixed, explicit byte encoding of the session state, so two
//! sessions that went through the same byte stream hash identically. Every
//! integer is fed little-endian at a fixed width and every variable-length
//! field is length-prefixed.

use sha2::{Digest, Sha256};

use crate::core::{BacklogBeacon, Cell, CursorShape, Grid, SavedCursor, Screen, ScreenKind};

/// Marks an unset title or icon name
const UNSET: &[u8] = b"(NULL)";

/// Session state that lives outside the screen
pub(crate) struct SessionProps<'a> {
    pub title: Option<&'a str>,
    pub icon_name: Option<&'a str>,
    pub cursor_shape: CursorShape,
    pub write_buffer: &'a [u8],
}

/// Grids, cursor with save slots, dimensions and modes
pub(crate) fn hash_visible(hasher: &mut Sha256, screen: &Screen) {
    put_usize(hasher, screen.cols());
    put_usize(hasher, screen.rows());
    hasher.update(screen.modes().fingerprint());

    let cursor = screen.cursor();
    put_usize(hasher, cursor.row);
    put_usize(hasher, cursor.col);
    put_attrs(hasher, &cursor.attrs);
    hasher.update([
        cursor.visible as u8,
        cursor.blinking as u8,
        cursor.pending_wrap as u8,
    ]);
    hasher.update(cursor.charsets.fingerprint());
    for kind in [ScreenKind::Primary, ScreenKind::Alternate] {
        put_saved(hasher, screen.saved_cursor(kind));
    }

    let (top, bottom) = screen.scroll_region();
    put_usize(hasher, top);
    put_usize(hasher, bottom);

    put_grid(hasher, screen.grid_of(ScreenKind::Primary));
    put_grid(hasher, screen.grid_of(ScreenKind::Alternate));
}

/// Backlog counters and beacon, icon and title, cursor shape and pending
/// reply bytes
pub(crate) fn hash_session(hasher: &mut Sha256, screen: &Screen, props: &SessionProps<'_>) {
    let backlog = screen.backlog();
    put_usize(hasher, backlog.capacity());
    put_usize(hasher, backlog.len());
    hasher.update(backlog.backpos().to_le_bytes());
    put_beacon(hasher, backlog.beacon());

    put_str_or_unset(hasher, props.icon_name);
    put_str_or_unset(hasher, props.title);
    put_bytes(hasher, props.cursor_shape.name().as_bytes());
    put_bytes(hasher, props.write_buffer);
}

/// Lowercase hex of a finished digest
pub(crate) fn finish(hasher: Sha256) -> String {
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn put_usize(hasher: &mut Sha256, value: usize) {
    hasher.update((value as u64).to_le_bytes());
}

fn put_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    put_usize(hasher, bytes.len());
    hasher.update(bytes);
}

fn put_str_or_unset(hasher: &mut Sha256, value: Option<&str>) {
    put_bytes(hasher, value.map_or(UNSET, str::as_bytes));
}

fn put_beacon(hasher: &mut Sha256, beacon: BacklogBeacon) {
    hasher.update(beacon.position.to_le_bytes());
    hasher.update(beacon.generation.to_le_bytes());
}

fn put_attrs(hasher: &mut Sha256, attrs: &crate::core::CellAttrs) {
    hasher.update(attrs.fg.fingerprint());
    hasher.update(attrs.bg.fingerprint());
    hasher.update([attrs.style.bits()]);
}

fn put_saved(hasher: &mut Sha256, saved: Option<&SavedCursor>) {
    let Some(saved) = saved else {
        hasher.update([0]);
        return;
    };
    hasher.update([1]);
    put_usize(hasher, saved.row);
    put_usize(hasher, saved.col);
    put_attrs(hasher, &saved.attrs);
    hasher.update([
        saved.pending_wrap as u8,
        saved.origin as u8,
        saved.autowrap as u8,
    ]);
    hasher.update(saved.charsets.fingerprint());
}

fn put_grid(hasher: &mut Sha256, grid: &Grid) {
    for row in grid.iter() {
        hasher.update([row.wrapped as u8]);
        for cell in &row.cells {
            put_cell(hasher, cell);
        }
    }
}

fn put_cell(hasher: &mut Sha256, cell: &Cell) {
    put_bytes(hasher, cell.content.as_bytes());
    put_attrs(hasher, &cell.attrs);
    hasher.update([cell.width]);
}
