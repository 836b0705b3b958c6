use nalgebra::Point3;
use std::ops::{Index, IndexMut};

/// A set of atom positions indexed by dense atom index.
///
/// A conformation is always derived from a molecule's original coordinates by a
/// sequence of rigid rotations. It is cheap to clone, and every torsion-group
/// evaluation starts from a fresh copy of the shared base conformation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conformation {
    positions: Vec<Point3<f64>>,
}

impl Conformation {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Collects the positions of the given dense indices, in the given order.
    pub fn points_of(&self, indices: &[usize]) -> Vec<Point3<f64>> {
        indices.iter().map(|&idx| self.positions[idx]).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.positions.iter()
    }
}

impl Index<usize> for Conformation {
    type Output = Point3<f64>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.positions[index]
    }
}

impl IndexMut<usize> for Conformation {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.positions[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_of_preserves_requested_order() {
        let conformation = Conformation::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);

        let points = conformation.points_of(&[2, 0]);

        assert_eq!(points, vec![Point3::new(2.0, 0.0, 0.0), Point3::origin()]);
    }

    #[test]
    fn index_mut_updates_single_position() {
        let mut conformation = Conformation::new(vec![Point3::origin(); 2]);
        conformation[1] = Point3::new(1.0, 1.0, 1.0);

        assert_eq!(conformation[0], Point3::origin());
        assert_eq!(conformation[1], Point3::new(1.0, 1.0, 1.0));
    }
}
