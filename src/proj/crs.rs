use crate::error::ProjError;
use proj4rs::Proj;

/// Thin wrapper around proj4rs that handles radians/degrees conversion
/// transparently.
///
/// proj4rs uses radians for geographic CRS, but extents and mesh coordinates
/// are in CRS native units (degrees for EPSG:4326-like CRS). This wrapper
/// auto-converts on both ends.
pub struct CrsTransform {
    from: Proj,
    to: Proj,
    from_is_geo: bool,
    to_is_geo: bool,
}

impl CrsTransform {
    /// Create a transform from one CRS to another.
    ///
    /// Accepts EPSG codes ("EPSG:4326") or PROJ strings ("+proj=utm +zone=33 ...").
    pub fn new(from_crs: &str, to_crs: &str) -> Result<Self, ProjError> {
        let from = Proj::from_user_string(from_crs)
            .map_err(|e| ProjError::UnknownCrs(format!("{from_crs}: {e}")))?;
        let to = Proj::from_user_string(to_crs)
            .map_err(|e| ProjError::UnknownCrs(format!("{to_crs}: {e}")))?;
        let from_is_geo = from.is_latlong();
        let to_is_geo = to.is_latlong();
        Ok(Self {
            from,
            to,
            from_is_geo,
            to_is_geo,
        })
    }

    /// Transform a single point, in CRS native units on both ends.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let mut point = if self.from_is_geo {
            (x.to_radians(), y.to_radians())
        } else {
            (x, y)
        };

        proj4rs::transform::transform(&self.from, &self.to, &mut point)
            .map_err(|e| ProjError::TransformFailed(e.to_string()))?;

        if self.to_is_geo {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok(point)
        }
    }

    /// The plain point function the mesh core consumes.
    ///
    /// Out-of-domain input surfaces as NaN components instead of an error;
    /// the triangulator clamps those against the source domain or drops the
    /// quad.
    pub fn point_fn(&self) -> impl Fn(f64, f64) -> (f64, f64) + '_ {
        move |x, y| self.transform(x, y).unwrap_or((f64::NAN, f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip_4326_to_3857() {
        let fwd = CrsTransform::new("EPSG:4326", "EPSG:3857").unwrap();
        let inv = CrsTransform::new("EPSG:3857", "EPSG:4326").unwrap();

        let lon = 10.75;
        let lat = 59.91;

        let (x, y) = fwd.transform(lon, lat).unwrap();
        assert!(x > 1_000_000.0 && x < 1_500_000.0, "x out of range: {x}");
        assert!(y > 8_000_000.0 && y < 9_000_000.0, "y out of range: {y}");

        let (lon2, lat2) = inv.transform(x, y).unwrap();
        assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        assert_relative_eq!(lat2, lat, epsilon = 1e-8);
    }

    #[test]
    fn test_equator_maps_to_zero() {
        let fwd = CrsTransform::new("EPSG:4326", "EPSG:3857").unwrap();
        let (x, y) = fwd.transform(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_crs() {
        assert!(CrsTransform::new("EPSG:99999", "EPSG:4326").is_err());
    }

    #[test]
    fn test_point_fn_maps_failures_to_nan() {
        let fwd = CrsTransform::new("EPSG:4326", "EPSG:3857").unwrap();
        let f = fwd.point_fn();

        let (x, y) = f(10.0, 20.0);
        assert!(x.is_finite() && y.is_finite());

        // The Web Mercator pole is outside the projection's domain
        let (x, y) = f(0.0, 90.0);
        assert!(!x.is_finite() || !y.is_finite());
    }

    #[test]
    fn test_projected_to_projected() {
        // UTM 33N to Web Mercator (both projected, no degree conversion)
        let ct = CrsTransform::new("EPSG:32633", "EPSG:3857").unwrap();
        let (x, y) = ct.transform(500000.0, 6600000.0).unwrap();
        assert!(x.abs() < 20_000_000.0, "x out of range: {x}");
        assert!(y.abs() < 20_000_000.0, "y out of range: {y}");
    }
}
