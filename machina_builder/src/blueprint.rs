// Blueprint data model: the rigid structural template of a builder.
//
// A blueprint is a set of modules (`ModuleId`): the mandatory base module
// and two optional side modules. Each module is a list of cells, each cell a
// local-frame `Offset` plus the `Material` expected there. Some cells are
// "key cells" (the lever, the furnace, the chest, the heads) that the
// builder needs to address by name every tick.
//
// ## Handles
//
// Key cells are registered through `BlueprintFactory::add_key()`, which
// returns an opaque `KeyHandle`, a small index into the blueprint's key
// table. `BlueprintFactory::finalize()` consumes the factory and
// precomputes, for every key and every yaw, the rotated offset, and for
// every module and yaw, the rotated footprint. After that the `Blueprint`
// is immutable; lookups on the per-tick path are plain array indexing.
//
// ## The builder blueprint
//
// `builder_blueprint()` returns the process-wide `BuilderBlueprint`, built
// once on first use (`LazyLock`) and shared by every builder instance:
//
//   base:  lever (0,1,0)  wood (0,0,0)  burning furnace (-1,0,0)
//          chest (1,1,0)  iron head (1,0,0)
//   left:  iron head (1,0,-1)  wood (0,0,-1)
//   right: iron head (1,0,1)   wood (0,0,1)
//
// Local +X is forward, local -Z is left (see `types.rs`).
//
// See also: `detect.rs` for matching a blueprint against the grid,
// `movement.rs` for footprint relocation.

use crate::types::{Material, Offset, VoxelCoord, Yaw};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// A named sub-pattern of the blueprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleId {
    Base,
    Left,
    Right,
}

impl ModuleId {
    /// Fixed priority order: base first, then left, then right.
    pub const ALL: [ModuleId; 3] = [ModuleId::Base, ModuleId::Left, ModuleId::Right];

    const fn index(self) -> usize {
        match self {
            ModuleId::Base => 0,
            ModuleId::Left => 1,
            ModuleId::Right => 2,
        }
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// The modules present on one builder, as a bitmask. Always contains the
/// base module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleSet(u8);

impl ModuleSet {
    pub const fn base_only() -> Self {
        Self(ModuleId::Base.bit())
    }

    /// Every module: base plus both sides.
    pub const fn full() -> Self {
        Self(ModuleId::Base.bit() | ModuleId::Left.bit() | ModuleId::Right.bit())
    }

    pub const fn with(self, module: ModuleId) -> Self {
        Self(self.0 | module.bit())
    }

    pub fn insert(&mut self, module: ModuleId) {
        self.0 |= module.bit();
    }

    pub const fn contains(self, module: ModuleId) -> bool {
        self.0 & module.bit() != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Modules in priority order (base, left, right).
    pub fn iter(self) -> impl Iterator<Item = ModuleId> {
        ModuleId::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl Default for ModuleSet {
    fn default() -> Self {
        Self::base_only()
    }
}

// ---------------------------------------------------------------------------
// Blueprint construction
// ---------------------------------------------------------------------------

/// Opaque handle to a key cell. Only a `BlueprintFactory` hands these out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyHandle(u16);

/// One cell of a module footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FootprintCell {
    pub offset: Offset,
    pub material: Material,
}

#[derive(Clone, Copy, Debug)]
struct KeyCell {
    module: ModuleId,
    cell: FootprintCell,
}

/// Collects module cells before the blueprint is finalized.
#[derive(Debug, Default)]
pub struct BlueprintFactory {
    cells: [Vec<FootprintCell>; 3],
    keys: Vec<KeyCell>,
}

impl BlueprintFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key cell to a module and return its handle.
    pub fn add_key(&mut self, module: ModuleId, offset: Offset, material: Material) -> KeyHandle {
        let cell = FootprintCell { offset, material };
        let handle = KeyHandle(self.keys.len() as u16);
        self.keys.push(KeyCell { module, cell });
        self.cells[module.index()].push(cell);
        handle
    }

    /// Add a plain (unnamed) cell to a module.
    pub fn add(&mut self, module: ModuleId, offset: Offset, material: Material) -> &mut Self {
        self.cells[module.index()].push(FootprintCell { offset, material });
        self
    }

    /// Freeze the factory into an immutable blueprint with precomputed
    /// rotations.
    pub fn finalize(self) -> Blueprint {
        let rotated_keys = self
            .keys
            .iter()
            .map(|k| Yaw::ALL.map(|yaw| k.cell.offset.rotated(yaw)))
            .collect();
        let footprints = std::array::from_fn(|m| {
            std::array::from_fn(|y| {
                let yaw = Yaw::from_quarter_turns(y as u8);
                self.cells[m]
                    .iter()
                    .map(|c| FootprintCell {
                        offset: c.offset.rotated(yaw),
                        material: c.material,
                    })
                    .collect()
            })
        });
        Blueprint {
            keys: self.keys,
            rotated_keys,
            footprints,
        }
    }
}

/// Rotated footprint storage; the builder's modules have at most 5 cells.
pub type Footprint = SmallVec<[FootprintCell; 8]>;

/// An immutable, finalized blueprint.
#[derive(Clone, Debug)]
pub struct Blueprint {
    keys: Vec<KeyCell>,
    /// `rotated_keys[handle][yaw]`.
    rotated_keys: Vec<[Offset; 4]>,
    /// `footprints[module][yaw]`.
    footprints: [[Footprint; 4]; 3],
}

impl Blueprint {
    /// World-space offset of a key cell from the anchor under a yaw.
    ///
    /// `module` must be the module the key was registered in.
    pub fn resolve_offset(&self, key: KeyHandle, yaw: Yaw, module: ModuleId) -> Offset {
        debug_assert_eq!(self.keys[key.0 as usize].module, module);
        self.rotated_keys[key.0 as usize][yaw.quarter_turns() as usize]
    }

    /// Absolute coordinate of a key cell for a builder at `anchor`.
    pub fn resolve(&self, anchor: VoxelCoord, key: KeyHandle, yaw: Yaw, module: ModuleId) -> VoxelCoord {
        anchor.offset(self.resolve_offset(key, yaw, module))
    }

    /// Material the blueprint expects at a key cell.
    pub fn key_material(&self, key: KeyHandle) -> Material {
        self.keys[key.0 as usize].cell.material
    }

    /// All cells of a module, rotated for `yaw`, relative to the anchor.
    pub fn footprint(&self, module: ModuleId, yaw: Yaw) -> &[FootprintCell] {
        &self.footprints[module.index()][yaw.quarter_turns() as usize]
    }

    /// Every absolute cell occupied by the given modules.
    pub fn occupied(&self, anchor: VoxelCoord, yaw: Yaw, modules: ModuleSet) -> FxHashSet<VoxelCoord> {
        modules
            .iter()
            .flat_map(|m| self.footprint(m, yaw))
            .map(|c| anchor.offset(c.offset))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// The builder blueprint
// ---------------------------------------------------------------------------

pub const HEAD_MATERIAL: Material = Material::IronBlock;
pub const BASE_MATERIAL: Material = Material::Wood;
pub const FURNACE_MATERIAL: Material = Material::Furnace;
pub const BURNING_FURNACE_MATERIAL: Material = Material::BurningFurnace;
pub const CONTAINER_MATERIAL: Material = Material::Chest;
pub const LEVER_MATERIAL: Material = Material::Lever;

/// The builder's blueprint together with its named key handles.
#[derive(Debug)]
pub struct BuilderBlueprint {
    pub blueprint: Blueprint,
    pub lever: KeyHandle,
    pub central_base: KeyHandle,
    pub furnace: KeyHandle,
    pub container: KeyHandle,
    pub primary_head: KeyHandle,
    pub left_head: KeyHandle,
    pub right_head: KeyHandle,
}

static BUILDER_BLUEPRINT: LazyLock<BuilderBlueprint> = LazyLock::new(BuilderBlueprint::define);

/// The shared, process-wide builder blueprint.
pub fn builder_blueprint() -> &'static BuilderBlueprint {
    &BUILDER_BLUEPRINT
}

impl BuilderBlueprint {
    fn define() -> Self {
        use ModuleId::{Base, Left, Right};

        let mut f = BlueprintFactory::new();
        let lever = f.add_key(Base, Offset::new(0, 1, 0), LEVER_MATERIAL);
        let central_base = f.add_key(Base, Offset::new(0, 0, 0), BASE_MATERIAL);
        let furnace = f.add_key(Base, Offset::new(-1, 0, 0), BURNING_FURNACE_MATERIAL);
        let container = f.add_key(Base, Offset::new(1, 1, 0), CONTAINER_MATERIAL);
        let primary_head = f.add_key(Base, Offset::new(1, 0, 0), HEAD_MATERIAL);

        let left_head = f.add_key(Left, Offset::new(1, 0, -1), HEAD_MATERIAL);
        f.add(Left, Offset::new(0, 0, -1), BASE_MATERIAL);

        let right_head = f.add_key(Right, Offset::new(1, 0, 1), HEAD_MATERIAL);
        f.add(Right, Offset::new(0, 0, 1), BASE_MATERIAL);

        Self {
            blueprint: f.finalize(),
            lever,
            central_base,
            furnace,
            container,
            primary_head,
            left_head,
            right_head,
        }
    }

    /// The head key cell of a module.
    pub fn head_of(&self, module: ModuleId) -> KeyHandle {
        match module {
            ModuleId::Base => self.primary_head,
            ModuleId::Left => self.left_head,
            ModuleId::Right => self.right_head,
        }
    }

    pub fn resolve(&self, anchor: VoxelCoord, key: KeyHandle, yaw: Yaw, module: ModuleId) -> VoxelCoord {
        self.blueprint.resolve(anchor, key, yaw, module)
    }
}
