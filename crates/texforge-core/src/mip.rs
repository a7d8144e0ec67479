//! Mip-chain arithmetic.

use glam::UVec2;

/// Length of the full mip chain for a `width` x `height` image, down to 1x1.
///
/// Equals `floor(log2(max(width, height))) + 1`; zero-sized images have no chain.
#[must_use]
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height);
    if largest == 0 {
        0
    } else {
        u32::BITS - largest.leading_zeros()
    }
}

/// Extent of mip `level` for a base extent. Each level halves (rounding down),
/// clamped to 1.
#[must_use]
pub fn mip_extent(base: UVec2, level: u32) -> UVec2 {
    UVec2::new(
        base.x.checked_shr(level).unwrap_or(0).max(1),
        base.y.checked_shr(level).unwrap_or(0).max(1),
    )
}

/// Extents of every level of the full chain, level 0 first.
#[must_use]
pub fn mip_chain(width: u32, height: u32) -> Vec<UVec2> {
    let base = UVec2::new(width, height);
    (0..mip_level_count(width, height))
        .map(|level| mip_extent(base, level))
        .collect()
}

/// Flat subresource index of (`mip_level`, `array_slice`) in a resource with
/// `mip_levels` levels per slice.
#[must_use]
pub fn subresource_index(mip_level: u32, array_slice: u32, mip_levels: u32) -> u32 {
    mip_level + array_slice * mip_levels
}
