//! Paint Materials
//!
//! The five paintable materials and their physical properties. Density
//! drives region mass, friction and bounce are forwarded to the physics
//! colliders, tint and texture name are for the frontend.

use serde::{Deserialize, Serialize};

/// Identifier for one of the built-in materials.
///
/// Ordering is ascending density: wood < plaster < brick < stone < metal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialId {
    Wood,
    Plaster,
    Brick,
    Stone,
    Metal,
}

/// Physical and visual properties of a paint material.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Material {
    pub name: &'static str,
    /// Mass per unit area before the global mass scale is applied
    pub density: f32,
    /// Collider friction coefficient
    pub friction: f32,
    /// Collider restitution (0.0 = dead, 1.0 = fully elastic)
    pub bounce: f32,
    /// Frontend texture key
    pub texture: &'static str,
    /// Frontend tint, linear RGB
    pub tint: [f32; 3],
}

/// Property table indexed by [`MaterialId::index`].
pub const MATERIALS: [Material; 5] = [
    Material {
        name: "wood",
        density: 0.4,
        friction: 0.55,
        bounce: 0.25,
        texture: "mat_wood",
        tint: [0.69, 0.49, 0.27],
    },
    Material {
        name: "plaster",
        density: 0.55,
        friction: 0.6,
        bounce: 0.1,
        texture: "mat_plaster",
        tint: [0.9, 0.88, 0.84],
    },
    Material {
        name: "brick",
        density: 0.8,
        friction: 0.7,
        bounce: 0.15,
        texture: "mat_brick",
        tint: [0.6, 0.3, 0.2],
    },
    Material {
        name: "stone",
        density: 1.0,
        friction: 0.75,
        bounce: 0.12,
        texture: "mat_stone",
        tint: [0.55, 0.55, 0.58],
    },
    Material {
        name: "metal",
        density: 2.0,
        friction: 0.3,
        bounce: 0.3,
        texture: "mat_metal",
        tint: [0.7, 0.72, 0.78],
    },
];

impl MaterialId {
    pub const ALL: [MaterialId; 5] = [
        MaterialId::Wood,
        MaterialId::Plaster,
        MaterialId::Brick,
        MaterialId::Stone,
        MaterialId::Metal,
    ];

    pub fn index(self) -> usize {
        match self {
            MaterialId::Wood => 0,
            MaterialId::Plaster => 1,
            MaterialId::Brick => 2,
            MaterialId::Stone => 3,
            MaterialId::Metal => 4,
        }
    }

    /// Property record for this material.
    pub fn properties(self) -> &'static Material {
        &MATERIALS[self.index()]
    }

    pub fn density(self) -> f32 {
        self.properties().density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn densities_are_strictly_ascending() {
        for pair in MaterialId::ALL.windows(2) {
            assert!(
                pair[0].density() < pair[1].density(),
                "{} should be lighter than {}",
                pair[0].properties().name,
                pair[1].properties().name
            );
        }
    }

    #[test]
    fn index_matches_table() {
        for id in MaterialId::ALL {
            assert_eq!(MATERIALS[id.index()].name, id.properties().name);
        }
    }
}
