use crate::core::models::conformation::Conformation;
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use thiserror::Error;

/// Number of decimal places every rotated coordinate is rounded to.
pub const COORDINATE_DECIMALS: i32 = 4;

const AXIS_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Rotation axis is degenerate: endpoints ({x:.4}, {y:.4}, {z:.4}) coincide")]
    DegenerateAxis { x: f64, y: f64, z: f64 },
    #[error("Cannot compute the centroid of an empty point set")]
    EmptyPointSet,
}

#[inline]
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_DECIMALS);
    (value * factor).round() / factor
}

#[inline]
pub fn round_point(point: &Point3<f64>) -> Point3<f64> {
    Point3::new(
        round_coordinate(point.x),
        round_coordinate(point.y),
        round_coordinate(point.z),
    )
}

fn axis_rotation(
    axis_a: &Point3<f64>,
    axis_b: &Point3<f64>,
    angle_degrees: f64,
) -> Result<Rotation3<f64>, GeometryError> {
    let unit = Unit::try_new(axis_b - axis_a, AXIS_EPSILON).ok_or(GeometryError::DegenerateAxis {
        x: axis_a.x,
        y: axis_a.y,
        z: axis_a.z,
    })?;
    Ok(Rotation3::from_axis_angle(&unit, angle_degrees.to_radians()))
}

/// Rotates `point` by `angle_degrees` about the axis running from `axis_a` to `axis_b`.
///
/// The rotation follows the right-hand rule around `axis_b - axis_a`. The result
/// is rounded to [`COORDINATE_DECIMALS`] places so that energies derived from it
/// are reproducible across platforms.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateAxis`] if `axis_a` and `axis_b` coincide.
pub fn rotate_point(
    axis_a: &Point3<f64>,
    axis_b: &Point3<f64>,
    point: &Point3<f64>,
    angle_degrees: f64,
) -> Result<Point3<f64>, GeometryError> {
    let rotation = axis_rotation(axis_a, axis_b, angle_degrees)?;
    Ok(round_point(&(axis_a + rotation * (point - axis_a))))
}

/// Rotates every point of a fragment about the same axis.
///
/// Points that coincide exactly with one of the axis endpoints are passed
/// through untouched.
pub fn rotate_fragment(
    axis_a: &Point3<f64>,
    axis_b: &Point3<f64>,
    points: &[Point3<f64>],
    angle_degrees: f64,
) -> Result<Vec<Point3<f64>>, GeometryError> {
    let rotation = axis_rotation(axis_a, axis_b, angle_degrees)?;
    Ok(points
        .iter()
        .map(|p| {
            if p == axis_a || p == axis_b {
                *p
            } else {
                round_point(&(axis_a + rotation * (p - axis_a)))
            }
        })
        .collect())
}

/// Rotates the atoms at `indices` of a conformation in place.
///
/// Same semantics as [`rotate_fragment`], without collecting the fragment first.
pub fn rotate_indices(
    conformation: &mut Conformation,
    indices: &[usize],
    axis_a: &Point3<f64>,
    axis_b: &Point3<f64>,
    angle_degrees: f64,
) -> Result<(), GeometryError> {
    let rotation = axis_rotation(axis_a, axis_b, angle_degrees)?;
    for &idx in indices {
        let p = conformation[idx];
        if p != *axis_a && p != *axis_b {
            conformation[idx] = round_point(&(axis_a + rotation * (p - axis_a)));
        }
    }
    Ok(())
}

pub fn centroid(points: &[Point3<f64>]) -> Result<Point3<f64>, GeometryError> {
    if points.is_empty() {
        return Err(GeometryError::EmptyPointSet);
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Ok(Point3::from(sum / points.len() as f64))
}

/// Euclidean distance between the centroids of two point sets.
pub fn centroid_distance(
    set_a: &[Point3<f64>],
    set_b: &[Point3<f64>],
) -> Result<f64, GeometryError> {
    Ok((centroid(set_a)? - centroid(set_b)?).norm())
}
