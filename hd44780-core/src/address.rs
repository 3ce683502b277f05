//! DDRAM addressing
//!
//! Rows are not contiguous in DDRAM: rows 0 and 1 start at 0x00 and 0x40,
//! and 4-row panels continue rows 0 and 1 as rows 2 and 3.

use crate::config::Geometry;

/// DDRAM address of column 0 for each row
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Cursor position outside the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressError {
    pub column: u8,
    pub row: u8,
}

/// DDRAM address of (`column`, `row`) on a panel of the given geometry
pub fn ddram_address(column: u8, row: u8, geometry: &Geometry) -> Result<u8, AddressError> {
    if column >= geometry.columns || row >= geometry.rows || usize::from(row) >= ROW_OFFSETS.len() {
        return Err(AddressError { column, row });
    }
    Ok(ROW_OFFSETS[usize::from(row)] + column)
}
