//! Projection descriptors and CRS-backed point transforms.

pub mod crs;

use crate::extent::Extent;

/// Half the Web Mercator world span, in metres.
const WEB_MERCATOR_HALF_WORLD: f64 = 20_037_508.342789244;

/// What the mesh builder needs to know about the source projection.
///
/// The projection math itself stays outside the core: point transforms come
/// in as plain closures (see [`crs::CrsTransform::point_fn`]).
#[derive(Clone, Copy, Debug)]
pub struct SourceProjection {
    /// Valid coordinate domain, when known.
    pub extent: Option<Extent>,
    /// Whether moving one world width along x lands on the same physical
    /// location (the projection has a dateline seam).
    pub can_wrap_x: bool,
    /// Whether the projection covers the whole globe; wide quads of global
    /// sources are force-subdivided.
    pub is_global: bool,
}

impl SourceProjection {
    pub fn new(extent: Option<Extent>, can_wrap_x: bool, is_global: bool) -> Self {
        Self {
            extent,
            can_wrap_x,
            is_global,
        }
    }

    /// Span of the valid x range, when known.
    pub fn world_width(&self) -> Option<f64> {
        self.extent.map(|e| e.width())
    }

    /// Geographic WGS84 (EPSG:4326).
    pub fn geographic() -> Self {
        Self::new(Some(Extent::new(-180.0, -90.0, 180.0, 90.0)), true, true)
    }

    /// Web Mercator (EPSG:3857).
    pub fn web_mercator() -> Self {
        Self::new(
            Some(Extent::new(
                -WEB_MERCATOR_HALF_WORLD,
                -WEB_MERCATOR_HALF_WORLD,
                WEB_MERCATOR_HALF_WORLD,
                WEB_MERCATOR_HALF_WORLD,
            )),
            true,
            true,
        )
    }

    /// Build a descriptor from an EPSG-style CRS string.
    ///
    /// Recognizes the common global wrapping cases; anything else is treated
    /// as a bounded projection with an unknown extent (fields can be
    /// overridden afterwards).
    pub fn from_crs(crs: &str) -> Self {
        match parse_epsg(crs) {
            Some(4326) => Self::geographic(),
            Some(3857) | Some(900913) => Self::web_mercator(),
            _ => Self::new(None, false, false),
        }
    }
}

fn parse_epsg(crs: &str) -> Option<u32> {
    crs.strip_prefix("EPSG:")
        .or_else(|| crs.strip_prefix("epsg:"))?
        .parse()
        .ok()
}
