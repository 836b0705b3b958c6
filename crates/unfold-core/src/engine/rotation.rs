use crate::core::graph::{FragmentSide, RotatableBond};
use crate::core::models::conformation::Conformation;
use crate::core::torsion::group::RotationGroup;
use crate::core::utils::geometry::{self, GeometryError};
use crate::engine::error::EngineError;

/// Rotates one fragment of a bond about the bond's current axis.
///
/// The axis runs from the endpoint in the fixed fragment to the endpoint in the
/// moving fragment, using positions from `conformation` as they are now. A zero
/// angle leaves the conformation untouched.
fn rotate_bond_fragment(
    conformation: &mut Conformation,
    bond: &RotatableBond,
    moving: FragmentSide,
    angle_degrees: f64,
) -> Result<(), GeometryError> {
    if angle_degrees == 0.0 {
        return Ok(());
    }
    let axis_a = conformation[bond.endpoint(moving.opposite())];
    let axis_b = conformation[bond.endpoint(moving)];
    geometry::rotate_indices(
        conformation,
        bond.fragment(moving),
        &axis_a,
        &axis_b,
        angle_degrees,
    )
}

/// Applies a rotation group and measures the separation it achieves.
///
/// Starting from a copy of `base`, each member bond in order rotates its moving
/// fragment by the matching entry of `angles`. Returns the rotated conformation
/// and the centroid distance between the group's two sides.
pub fn apply_rotation_group(
    bonds: &[RotatableBond],
    group: &RotationGroup,
    angles: &[f64],
    base: &Conformation,
) -> Result<(Conformation, f64), EngineError> {
    if angles.len() != group.len() {
        return Err(EngineError::Internal(format!(
            "group '{}' has {} members but {} angles were given",
            group.name,
            group.len(),
            angles.len()
        )));
    }

    let mut conformation = base.clone();
    for (member, &angle) in group.members.iter().zip(angles) {
        let bond = bonds.get(member.bond_index).ok_or_else(|| {
            EngineError::Internal(format!("unknown bond index {}", member.bond_index))
        })?;
        rotate_bond_fragment(&mut conformation, bond, member.moving, angle)?;
    }

    let distance = side_distance(group, &conformation)?;
    Ok((conformation, distance))
}

/// Centroid distance between the two sides of a group in a conformation.
pub fn side_distance(group: &RotationGroup, conformation: &Conformation) -> Result<f64, GeometryError> {
    geometry::centroid_distance(
        &conformation.points_of(&group.side_0),
        &conformation.points_of(&group.side_1),
    )
}

/// Replays one torsion per bond over the whole molecule.
///
/// Bond `i` rotates its second fragment by `angles[i]`, in bond order, each about
/// the axis as already moved by the previous rotations.
pub fn apply_torsions(
    bonds: &[RotatableBond],
    angles: &[f64],
    base: &Conformation,
) -> Result<Conformation, EngineError> {
    if angles.len() != bonds.len() {
        return Err(EngineError::Internal(format!(
            "{} bonds but {} angles were given",
            bonds.len(),
            angles.len()
        )));
    }

    let mut conformation = base.clone();
    for (bond, &angle) in bonds.iter().zip(angles) {
        rotate_bond_fragment(&mut conformation, bond, FragmentSide::One, angle)?;
    }
    Ok(conformation)
}
