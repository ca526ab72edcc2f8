//! Nearest-neighbor sampling with clamp-to-edge behavior.

use ndarray::ArrayView2;
use num_traits::NumCast;

/// Sample a 2D array using nearest-neighbor selection.
///
/// Uses the corner-based pixel convention: pixel (0,0) spans [0,1) × [0,1)
/// with its center at (0.5, 0.5), so `floor()` selects the containing pixel.
/// Coordinates outside the array are clamped onto the border pixels; the
/// caller decides how far outside still counts as coverage (the compositor
/// allows half a pixel, which is what keeps adjacent tiles seamless).
///
/// Returns `None` only for an empty array or a nodata hit.
pub fn sample<T>(src: &ArrayView2<'_, T>, x: f64, y: f64, nodata: Option<T>) -> Option<T>
where
    T: Copy + NumCast + PartialEq,
{
    let (rows, cols) = src.dim();
    if rows == 0 || cols == 0 {
        return None;
    }

    let col = (x.floor() as isize).clamp(0, cols as isize - 1) as usize;
    let row = (y.floor() as isize).clamp(0, rows as isize - 1) as usize;

    let val = src[(row, col)];
    if let Some(nd) = nodata {
        if val == nd {
            return None;
        }
    }
    Some(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_center_of_pixel() {
        let arr = array![[1.0, 2.0], [3.0, 4.0]];
        let view = arr.view();

        assert_eq!(sample(&view, 0.5, 0.5, None), Some(1.0));
        assert_eq!(sample(&view, 1.5, 0.5, None), Some(2.0));
        assert_eq!(sample(&view, 0.5, 1.5, None), Some(3.0));
        assert_eq!(sample(&view, 1.5, 1.5, None), Some(4.0));
    }

    #[test]
    fn test_outside_clamps_to_border() {
        let arr = array![[1.0, 2.0], [3.0, 4.0]];
        let view = arr.view();

        assert_eq!(sample(&view, -0.4, 0.5, None), Some(1.0));
        assert_eq!(sample(&view, 2.4, 0.5, None), Some(2.0));
        assert_eq!(sample(&view, 0.5, -0.4, None), Some(1.0));
        assert_eq!(sample(&view, 1.5, 2.4, None), Some(4.0));
    }

    #[test]
    fn test_nodata() {
        let arr = array![[-9999.0, 2.0], [3.0, 4.0]];
        let view = arr.view();
        assert_eq!(sample(&view, 0.5, 0.5, Some(-9999.0)), None);
        assert_eq!(sample(&view, 1.5, 0.5, Some(-9999.0)), Some(2.0));

        // Without the nodata flag, the sentinel is a valid value
        assert_eq!(sample(&view, 0.5, 0.5, None), Some(-9999.0));
    }

    #[test]
    fn test_integer_type() {
        let arr = array![[1u8, 2], [3, 4]];
        let view = arr.view();
        assert_eq!(sample(&view, 0.5, 0.5, None), Some(1));
        assert_eq!(sample(&view, 1.5, 1.5, None), Some(4));
        assert_eq!(sample(&view, 0.5, 0.5, Some(1)), None);
    }

    #[test]
    fn test_boundary_at_exact_pixel_edge() {
        // At integer coordinates, floor() picks the pixel to the right/below
        let arr = array![[10.0, 20.0, 30.0], [40.0, 50.0, 60.0], [70.0, 80.0, 90.0]];
        let view = arr.view();

        assert_eq!(sample(&view, 1.0, 0.0, None), Some(20.0));
        assert_eq!(sample(&view, 0.999, 0.0, None), Some(10.0));
        // The far edge coordinate clamps back onto the last pixel
        assert_eq!(sample(&view, 3.0, 0.0, None), Some(30.0));
    }

    #[test]
    fn test_empty_array() {
        let arr = ndarray::Array2::<f64>::zeros((0, 0));
        assert_eq!(sample(&arr.view(), 0.5, 0.5, None), None);
    }
}
