//! Item kinds the entity core hands out or consumes.
//!
//! Only the items mobs drop, hold, or react to are modelled; the full item
//! registry belongs to the inventory subsystem.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    Wool,
    Mutton,
    Feather,
    RawChicken,
    Egg,
    InkSac,
    AmethystShard,
    Bone,
    RottenFlesh,
    Arrow,
    Bow,
    Trident,
    BlazeRod,
    Wheat,
    Seeds,
    Shears,
    IronSword,
    Cookie,
    Leather,
}

impl ItemKind {
    /// Whether a stack of this item loses durability instead of count when used.
    pub fn is_tool(&self) -> bool {
        matches!(
            self,
            Self::Shears | Self::Bow | Self::Trident | Self::IronSword
        )
    }
}

/// A counted stack of one item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub count: u32,
}

impl ItemStack {
    pub fn new(kind: ItemKind, count: u32) -> Self {
        Self { kind, count }
    }

    pub fn one(kind: ItemKind) -> Self {
        Self { kind, count: 1 }
    }

    pub fn is(&self, kind: ItemKind) -> bool {
        self.kind == kind && self.count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools() {
        assert!(ItemKind::Shears.is_tool());
        assert!(!ItemKind::Wheat.is_tool());
    }

    #[test]
    fn test_is_requires_count() {
        assert!(ItemStack::one(ItemKind::Wheat).is(ItemKind::Wheat));
        assert!(!ItemStack::new(ItemKind::Wheat, 0).is(ItemKind::Wheat));
    }
}
