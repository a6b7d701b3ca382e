// Core types shared across the builder.
//
// Defines grid coordinates (`VoxelCoord`), relative offsets (`Offset`), the
// six block faces (`Face`), the four cardinal rotations (`Yaw`), block and
// item materials (`Material`), and the compact IDs used for operators and
// builder instances. All types derive `Serialize` and `Deserialize` so host
// code can snapshot builder state if it wants to.
//
// Coordinate system (matches the host voxel grid):
// - X: east  (positive) / west  (negative)
// - Y: up    (positive) / down  (negative)
// - Z: south (positive) / north (negative)
//
// Blueprint offsets live in a local frame where +X is "forward" and -Z is
// "left". `Yaw::East` is the identity rotation; `Offset::rotated()` maps a
// local offset into world space for any other yaw.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg};

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in the 3D voxel grid. Each component is in voxel units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The coordinate translated by a relative offset.
    pub const fn offset(self, by: Offset) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.z + by.z)
    }

    /// The face-adjacent neighbor in the given direction.
    pub const fn relative(self, face: Face) -> Self {
        self.offset(face.offset())
    }

    /// Shorthand for `relative(Face::Down)`.
    pub const fn below(self) -> Self {
        self.relative(Face::Down)
    }

    /// The offset that leads from `origin` to `self`.
    pub const fn offset_from(self, origin: Self) -> Offset {
        Offset::new(self.x - origin.x, self.y - origin.y, self.z - origin.z)
    }
}

impl fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// An integer delta between two grid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Rotate a local-frame offset into world space for the given yaw.
    ///
    /// Rotation is about the Y axis; the vertical component is unchanged.
    pub const fn rotated(self, yaw: Yaw) -> Self {
        let Self { x, y, z } = self;
        match yaw {
            Yaw::East => Self::new(x, y, z),
            Yaw::South => Self::new(-z, y, x),
            Yaw::West => Self::new(-x, y, -z),
            Yaw::North => Self::new(z, y, -x),
        }
    }

    /// Dot product, used to order cells along a direction of travel.
    pub const fn dot(self, other: Self) -> i32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl From<Face> for Offset {
    fn from(face: Face) -> Self {
        face.offset()
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y, -self.z)
    }
}

/// One of the six faces of a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    Up,
    Down,
    North,
    South,
    East,
    West,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Down,
        Face::North,
        Face::South,
        Face::East,
        Face::West,
    ];

    /// Unit offset pointing out of this face.
    pub const fn offset(self) -> Offset {
        match self {
            Face::Up => Offset::new(0, 1, 0),
            Face::Down => Offset::new(0, -1, 0),
            Face::North => Offset::new(0, 0, -1),
            Face::South => Offset::new(0, 0, 1),
            Face::East => Offset::new(1, 0, 0),
            Face::West => Offset::new(-1, 0, 0),
        }
    }

    pub const fn opposite(self) -> Face {
        match self {
            Face::Up => Face::Down,
            Face::Down => Face::Up,
            Face::North => Face::South,
            Face::South => Face::North,
            Face::East => Face::West,
            Face::West => Face::East,
        }
    }

    /// Block-data encoding of a horizontal facing for directional blocks
    /// such as furnaces. Vertical faces encode as 0.
    pub const fn facing_variant(self) -> u8 {
        match self {
            Face::North => 2,
            Face::South => 3,
            Face::West => 4,
            Face::East => 5,
            Face::Up | Face::Down => 0,
        }
    }
}

/// One of the four cardinal rotations about the vertical axis.
///
/// Quarter turns run clockwise when seen from above: East, South, West,
/// North. `Yaw::East` is the blueprint's own frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Yaw {
    East,
    South,
    West,
    North,
}

impl Yaw {
    pub const ALL: [Yaw; 4] = [Yaw::East, Yaw::South, Yaw::West, Yaw::North];

    /// Number of clockwise quarter turns from `East`.
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Yaw::East => 0,
            Yaw::South => 1,
            Yaw::West => 2,
            Yaw::North => 3,
        }
    }

    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Yaw::East,
            1 => Yaw::South,
            2 => Yaw::West,
            _ => Yaw::North,
        }
    }

    /// The horizontal face this yaw points toward.
    pub const fn facing(self) -> Face {
        match self {
            Yaw::East => Face::East,
            Yaw::South => Face::South,
            Yaw::West => Face::West,
            Yaw::North => Face::North,
        }
    }

    /// Compose two rotations: `self` turned further by `delta`.
    pub const fn rotate_by(self, delta: Yaw) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + delta.quarter_turns())
    }

    /// The rotation that undoes this one.
    pub const fn inverse(self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }

    pub const fn opposite(self) -> Self {
        self.rotate_by(Yaw::West)
    }

    /// The yaw a quarter turn counterclockwise (to the left).
    pub const fn left(self) -> Self {
        self.rotate_by(Yaw::North)
    }

    /// The yaw a quarter turn clockwise (to the right).
    pub const fn right(self) -> Self {
        self.rotate_by(Yaw::South)
    }

    /// The delta that turns `other` into `self`.
    pub const fn subtract(self, other: Yaw) -> Self {
        Self::from_quarter_turns(4 + self.quarter_turns() - other.quarter_turns())
    }

    /// Snap an observer's look direction to the nearest cardinal yaw.
    ///
    /// Uses the host convention: 0° looks south, 90° west, 180° north,
    /// 270° east. Any finite angle is accepted.
    pub fn from_observer_degrees(degrees: f32) -> Self {
        let quarter = (degrees / 90.0).round() as i64;
        match quarter.rem_euclid(4) {
            0 => Yaw::South,
            1 => Yaw::West,
            2 => Yaw::North,
            _ => Yaw::East,
        }
    }
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Block and item kinds known to the builder.
///
/// Block materials occupy grid cells; item-only materials (coal, sticks)
/// appear only in inventories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Air,
    Stone,
    Dirt,
    Grass,
    Cobblestone,
    Sand,
    Gravel,
    Wood,
    Planks,
    Glass,
    IronBlock,
    Furnace,
    BurningFurnace,
    Chest,
    Lever,
    Torch,
    Water,
    TallGrass,
    Coal,
    Stick,
}

impl Material {
    /// Whether the material is a full solid block: something a builder can
    /// stand on and build on top of, and something it may place.
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Material::Stone
                | Material::Dirt
                | Material::Grass
                | Material::Cobblestone
                | Material::Sand
                | Material::Gravel
                | Material::Wood
                | Material::Planks
                | Material::Glass
                | Material::IronBlock
                | Material::Furnace
                | Material::BurningFurnace
        )
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Material::Air)
    }

    /// Ticks of energy granted by burning one unit, or `None` if the
    /// material is not a fuel.
    pub const fn burn_ticks(self) -> Option<u32> {
        match self {
            Material::Coal => Some(1600),
            Material::Wood | Material::Planks => Some(300),
            Material::Stick => Some(100),
            _ => None,
        }
    }

    pub const fn classify(self) -> Classification {
        if self.is_empty() {
            Classification::Empty
        } else if self.is_solid() {
            Classification::Solid
        } else {
            Classification::Other(self)
        }
    }
}

/// How the builder treats the contents of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Solid,
    Empty,
    /// Occupied, but neither solid nor empty (levers, water, torches).
    Other(Material),
}

impl Classification {
    pub const fn is_solid(self) -> bool {
        matches!(self, Classification::Solid)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Classification::Empty)
    }
}

/// The full contents of a grid cell: material plus its data value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub material: Material,
    pub variant: u8,
}

impl Block {
    pub const AIR: Block = Block::new(Material::Air, 0);

    pub const fn new(material: Material, variant: u8) -> Self {
        Self { material, variant }
    }

    pub const fn of(material: Material) -> Self {
        Self::new(material, 0)
    }
}

// ---------------------------------------------------------------------------
// IDs: simple integers, assigned by the host.
// ---------------------------------------------------------------------------

/// Identity of an operator (a player or other actor holding capabilities).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperatorId(pub u32);

/// Compact identifier for an active builder instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuilderId(pub u32);

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperatorId({})", self.0)
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuilderId({})", self.0)
    }
}
