// Reference placement and permission policies.
//
// `ProtectedRegions` stands in for a region-protection plugin: it denies
// placements inside boxes owned by someone else. `PermissionTable` maps each
// operator to an explicit capability set. Both are plain data and derive
// serde so a host can load them from JSON alongside `MachinaConfig`.
//
// See also: `host.rs` for the `PlacementVeto` and `Permissions` traits.

use crate::host::{Capability, PlacementVeto, Permissions};
use crate::types::{Material, OperatorId, VoxelCoord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An inclusive axis-aligned box of cells owned by one operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub min: VoxelCoord,
    pub max: VoxelCoord,
    pub owner: OperatorId,
}

impl Region {
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        (self.min.x..=self.max.x).contains(&coord.x)
            && (self.min.y..=self.max.y).contains(&coord.y)
            && (self.min.z..=self.max.z).contains(&coord.z)
    }
}

/// Denies placement inside regions the operator does not own.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProtectedRegions {
    pub regions: Vec<Region>,
}

impl ProtectedRegions {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }
}

impl PlacementVeto for ProtectedRegions {
    fn can_place(
        &self,
        operator: OperatorId,
        target: VoxelCoord,
        _material: Material,
        _support: VoxelCoord,
    ) -> bool {
        self.regions
            .iter()
            .filter(|r| r.contains(target))
            .all(|r| r.owner == operator)
    }
}

/// Explicit per-operator capability grants. Operators without an entry have
/// no capabilities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PermissionTable {
    grants: BTreeMap<OperatorId, BTreeSet<Capability>>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, operator: OperatorId, capability: Capability) -> &mut Self {
        self.grants.entry(operator).or_default().insert(capability);
        self
    }

    pub fn revoke(&mut self, operator: OperatorId, capability: Capability) -> &mut Self {
        if let Some(set) = self.grants.get_mut(&operator) {
            set.remove(&capability);
        }
        self
    }

    /// Grant every capability to an operator.
    pub fn grant_all(&mut self, operator: OperatorId) -> &mut Self {
        for capability in [
            Capability::Activate,
            Capability::DeactivateOwn,
            Capability::DeactivateAll,
            Capability::Rotate,
        ] {
            self.grant(operator, capability);
        }
        self
    }
}

impl Permissions for PermissionTable {
    fn has_capability(&self, operator: OperatorId, capability: Capability) -> bool {
        self.grants
            .get(&operator)
            .is_some_and(|set| set.contains(&capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_denies_other_operators_only() {
        let owner = OperatorId(1);
        let stranger = OperatorId(2);
        let veto = ProtectedRegions::new(vec![Region {
            min: VoxelCoord::new(0, 0, 0),
            max: VoxelCoord::new(4, 4, 4),
            owner,
        }]);
        let inside = VoxelCoord::new(2, 2, 2);
        let outside = VoxelCoord::new(5, 2, 2);

        assert!(veto.can_place(owner, inside, Material::Stone, inside.below()));
        assert!(!veto.can_place(stranger, inside, Material::Stone, inside.below()));
        assert!(veto.can_place(stranger, outside, Material::Stone, outside.below()));
    }

    #[test]
    fn permission_table_grant_and_revoke() {
        let op = OperatorId(7);
        let mut table = PermissionTable::new();
        assert!(!table.has_capability(op, Capability::Activate));

        table.grant(op, Capability::Activate).grant(op, Capability::Rotate);
        assert!(table.has_capability(op, Capability::Activate));
        assert!(table.has_capability(op, Capability::Rotate));
        assert!(!table.has_capability(op, Capability::DeactivateAll));

        table.revoke(op, Capability::Rotate);
        assert!(!table.has_capability(op, Capability::Rotate));
    }

    #[test]
    fn grant_all_covers_every_capability() {
        let op = OperatorId(3);
        let mut table = PermissionTable::new();
        table.grant_all(op);
        assert!(table.has_capability(op, Capability::Activate));
        assert!(table.has_capability(op, Capability::DeactivateOwn));
        assert!(table.has_capability(op, Capability::DeactivateAll));
        assert!(table.has_capability(op, Capability::Rotate));
        assert!(!table.has_capability(OperatorId(4), Capability::Activate));
    }
}
