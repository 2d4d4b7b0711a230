//! Geometric primitives and placement math.
//!
//! Boundaries are axis-aligned rectangles in page space (origin bottom-left,
//! y up). [`compute_placement`] turns a container size and a payload size into
//! the translation and rotation used when a shared resource is drawn inside a
//! page-sized overlay.

use crate::error::{Error, Result};
use std::f64::consts::FRAC_PI_2;

/// Width and height of a drawable area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    pub fn fit_within(&self, bounds: Size) -> Size {
        let aspect = self.width / self.height;
        if aspect > bounds.width / bounds.height {
            Size::new(bounds.width, bounds.width / aspect)
        } else {
            Size::new(bounds.height * aspect, bounds.height)
        }
    }

    fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// A rectangle in page coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f64,
    /// Y coordinate of the lower-left corner
    pub y: f64,
    /// Width of rectangle
    pub width: f64,
    /// Height of rectangle
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stamp::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    ///
    /// The corners may be given in any order; the result is normalized so
    /// that width and height are non-negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_stamp::geometry::Rect;
    ///
    /// let rect = Rect::from_points(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.y, 20.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// US Letter media box (612 x 792 pt).
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, 612.0, 792.0)
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Dimensions of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when the rectangle has positive, finite extent on both axes.
    pub fn has_area(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Corner coordinates as `[x0, y0, x1, y1]`, the layout of a PDF rectangle.
    pub fn to_corners(&self) -> [f64; 4] {
        [self.left(), self.bottom(), self.right(), self.top()]
    }
}

/// How a payload is positioned inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementMode {
    /// Center the payload without rotation
    #[default]
    Centered,
    /// Rotate the payload onto the container's corner-to-corner diagonal and center it
    DiagonalRotated,
}

/// Affine placement of a payload inside a container.
///
/// The payload is first rotated counter-clockwise by `rotation` radians about
/// its own origin, then translated by (`tx`, `ty`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Horizontal translation
    pub tx: f64,
    /// Vertical translation
    pub ty: f64,
    /// Counter-clockwise rotation in radians
    pub rotation: f64,
}

impl Placement {
    /// The transformation matrix `[a b c d e f]` for a `cm` operator.
    ///
    /// `scale` is applied before the rotation; image XObjects live in a unit
    /// square and are drawn with `scale` set to their display size, form
    /// XObjects already carry their size in their bounding box and use `(1, 1)`.
    pub fn matrix(&self, scale: Size) -> [f64; 6] {
        let (sin, cos) = self.rotation.sin_cos();
        [
            scale.width * cos,
            scale.width * sin,
            -scale.height * sin,
            scale.height * cos,
            self.tx,
            self.ty,
        ]
    }
}

/// Compute where a payload of size `payload` goes inside `container`.
///
/// `Centered` yields `((W-w)/2, (H-h)/2)` and no rotation; a payload larger
/// than the container gets negative offsets and overflows it.
///
/// `DiagonalRotated` aligns the payload with the container diagonal:
/// `alpha = atan(H/W)`, `beta = PI/2 - alpha`, and the rotated payload's
/// bounding box is centered in the container.
///
/// # Errors
///
/// Negative or non-finite dimensions are rejected for both modes. A
/// `DiagonalRotated` container with zero width or height has no diagonal and
/// fails with [`Error::DegenerateGeometry`].
///
/// # Examples
///
/// ```
/// use pdf_stamp::geometry::{compute_placement, PlacementMode, Size};
///
/// let p = compute_placement(Size::new(200.0, 100.0), Size::new(50.0, 20.0), PlacementMode::Centered)
///     .unwrap();
/// assert_eq!((p.tx, p.ty, p.rotation), (75.0, 40.0, 0.0));
/// ```
pub fn compute_placement(container: Size, payload: Size, mode: PlacementMode) -> Result<Placement> {
    if !container.is_finite()
        || !payload.is_finite()
        || container.width < 0.0
        || container.height < 0.0
        || payload.width < 0.0
        || payload.height < 0.0
    {
        return Err(Error::DegenerateGeometry {
            width: container.width,
            height: container.height,
        });
    }

    match mode {
        PlacementMode::Centered => Ok(Placement {
            tx: (container.width - payload.width) / 2.0,
            ty: (container.height - payload.height) / 2.0,
            rotation: 0.0,
        }),
        PlacementMode::DiagonalRotated => {
            if container.width == 0.0 || container.height == 0.0 {
                return Err(Error::DegenerateGeometry {
                    width: container.width,
                    height: container.height,
                });
            }

            let alpha = (container.height / container.width).atan();
            let beta = FRAC_PI_2 - alpha;

            let centering_delta = payload.height * beta.cos();
            let rotated_width = payload.width * alpha.cos() + centering_delta;
            let rotated_height = payload.width * alpha.sin() + payload.height * beta.sin();

            Ok(Placement {
                tx: centering_delta + (container.width - rotated_width) / 2.0,
                ty: (container.height - rotated_height) / 2.0,
                rotation: alpha,
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_fit_within_keeps_aspect() {
        let wide = Size::new(200.0, 100.0);
        assert_eq!(wide.fit_within(Size::new(100.0, 100.0)), Size::new(100.0, 50.0));
        assert_eq!(wide.fit_within(Size::new(400.0, 100.0)), Size::new(200.0, 100.0));
        let tall = Size::new(10.0, 40.0);
        assert_eq!(tall.fit_within(Size::new(50.0, 50.0)), Size::new(12.5, 50.0));
    }

    #[test]
    fn test_rect_corners() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.to_corners(), [10.0, 20.0, 110.0, 70.0]);
        assert!(rect.has_area());
        assert!(!Rect::new(0.0, 0.0, 0.0, 10.0).has_area());
    }

    #[test]
    fn test_centered_placement() {
        let p = compute_placement(
            Size::new(612.0, 792.0),
            Size::new(100.0, 200.0),
            PlacementMode::Centered,
        )
        .unwrap();
        assert_eq!(p.tx, 256.0);
        assert_eq!(p.ty, 296.0);
        assert_eq!(p.rotation, 0.0);
    }

    #[test]
    fn test_centered_overflow_gives_negative_offsets() {
        let p = compute_placement(
            Size::new(100.0, 100.0),
            Size::new(300.0, 120.0),
            PlacementMode::Centered,
        )
        .unwrap();
        assert_eq!(p.tx, -100.0);
        assert_eq!(p.ty, -10.0);
    }

    #[test]
    fn test_diagonal_square_container() {
        let p = compute_placement(
            Size::new(100.0, 100.0),
            Size::new(50.0, 50.0),
            PlacementMode::DiagonalRotated,
        )
        .unwrap();
        assert!((p.rotation - FRAC_PI_4).abs() < EPS);

        // Rotated 50x50 square spans 50*sqrt(2) on both axes.
        let span = 50.0 * 2f64.sqrt();
        assert!((p.ty - (100.0 - span) / 2.0).abs() < EPS);
        assert!((p.tx - (50.0 * FRAC_PI_4.sin() + (100.0 - span) / 2.0)).abs() < EPS);
    }

    #[test]
    fn test_diagonal_is_deterministic() {
        let a = compute_placement(
            Size::new(612.0, 792.0),
            Size::new(380.0, 92.0),
            PlacementMode::DiagonalRotated,
        )
        .unwrap();
        let b = compute_placement(
            Size::new(612.0, 792.0),
            Size::new(380.0, 92.0),
            PlacementMode::DiagonalRotated,
        )
        .unwrap();
        assert!(a.tx.is_finite() && a.ty.is_finite() && a.rotation.is_finite());
        assert!((a.tx - b.tx).abs() < EPS);
        assert!((a.ty - b.ty).abs() < EPS);
        assert!((a.rotation - b.rotation).abs() < EPS);
    }

    #[test]
    fn test_diagonal_centers_rotated_box() {
        let container = Size::new(612.0, 792.0);
        let payload = Size::new(300.0, 80.0);
        let p = compute_placement(container, payload, PlacementMode::DiagonalRotated).unwrap();
        let m = p.matrix(Size::new(1.0, 1.0));

        let corners = [
            (0.0, 0.0),
            (payload.width, 0.0),
            (0.0, payload.height),
            (payload.width, payload.height),
        ];
        let xs: Vec<f64> = corners.iter().map(|(x, y)| m[0] * x + m[2] * y + m[4]).collect();
        let ys: Vec<f64> = corners.iter().map(|(x, y)| m[1] * x + m[3] * y + m[5]).collect();
        let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        assert!(((min_x + max_x) / 2.0 - container.width / 2.0).abs() < 1e-6);
        assert!(((min_y + max_y) / 2.0 - container.height / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_diagonal_zero_width_container_fails() {
        let result = compute_placement(
            Size::new(0.0, 100.0),
            Size::new(10.0, 10.0),
            PlacementMode::DiagonalRotated,
        );
        assert!(matches!(result, Err(Error::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_diagonal_zero_height_container_fails() {
        let result = compute_placement(
            Size::new(100.0, 0.0),
            Size::new(10.0, 10.0),
            PlacementMode::DiagonalRotated,
        );
        assert!(matches!(result, Err(Error::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_non_finite_dimensions_rejected() {
        let result = compute_placement(
            Size::new(f64::NAN, 100.0),
            Size::new(10.0, 10.0),
            PlacementMode::Centered,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_matrix_scales_image_payload() {
        let p = Placement {
            tx: 5.0,
            ty: 7.0,
            rotation: 0.0,
        };
        assert_eq!(p.matrix(Size::new(40.0, 20.0)), [40.0, 0.0, -0.0, 20.0, 5.0, 7.0]);
    }
}
