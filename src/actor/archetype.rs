//! Archetype tags and their static behaviour profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Classification;
use crate::aggro::AggroPolicy;
use crate::error::SimError;
use crate::item::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Sheep,
    Chicken,
    Squid,
    Bat,
    Allay,
    Wolf,
    Zombie,
    Drowned,
    Skeleton,
    Blaze,
}

/// Where an archetype lives; drives physics and spawn placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Habitat {
    Ground,
    Water,
    Air,
}

/// Static tuning for one archetype
#[derive(Debug)]
pub struct ArchetypeProfile {
    pub classification: Classification,
    pub habitat: Habitat,
    pub max_health: f32,
    /// Blocks per second
    pub speed: f32,
    pub armor: f32,
    pub despawn_eligible: bool,
    pub aggro: &'static AggroPolicy,
    pub base_drops: &'static [(ItemKind, u32)],
}

// =====================================================
// Aggro policies
// =====================================================

static PREY: AggroPolicy = AggroPolicy::prey(10.0, 5.0);
static WOLF_PACK: AggroPolicy = AggroPolicy::territorial(16.0, Some(8.0));
static UNDEAD_HORDE: AggroPolicy = AggroPolicy::hunter(16.0, 2.0, Some(12.0));
static LONE_HUNTER: AggroPolicy = AggroPolicy::hunter(16.0, 2.0, None);
static BLAZE_HUNTER: AggroPolicy = AggroPolicy::hunter(24.0, 1.0, None);

// =====================================================
// Profiles
// =====================================================

static SHEEP: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Passive,
    habitat: Habitat::Ground,
    max_health: 8.0,
    speed: 2.3,
    armor: 0.0,
    despawn_eligible: false,
    aggro: &PREY,
    // wool is added by the sheep itself when unsheared
    base_drops: &[(ItemKind::Mutton, 1)],
};

static CHICKEN: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Passive,
    habitat: Habitat::Ground,
    max_health: 4.0,
    speed: 2.5,
    armor: 0.0,
    despawn_eligible: false,
    aggro: &PREY,
    base_drops: &[(ItemKind::Feather, 1), (ItemKind::RawChicken, 1)],
};

static SQUID: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Passive,
    habitat: Habitat::Water,
    max_health: 10.0,
    speed: 2.0,
    armor: 0.0,
    despawn_eligible: true,
    aggro: &PREY,
    base_drops: &[(ItemKind::InkSac, 2)],
};

static BAT: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Passive,
    habitat: Habitat::Air,
    max_health: 6.0,
    speed: 4.0,
    armor: 0.0,
    despawn_eligible: true,
    aggro: &PREY,
    base_drops: &[],
};

static ALLAY: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Passive,
    habitat: Habitat::Air,
    max_health: 20.0,
    speed: 3.0,
    armor: 0.0,
    despawn_eligible: false,
    aggro: &PREY,
    base_drops: &[],
};

static WOLF: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Neutral,
    habitat: Habitat::Ground,
    max_health: 8.0,
    speed: 3.0,
    armor: 0.0,
    despawn_eligible: true,
    aggro: &WOLF_PACK,
    base_drops: &[],
};

static ZOMBIE: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Hostile,
    habitat: Habitat::Ground,
    max_health: 20.0,
    speed: 2.3,
    armor: 2.0,
    despawn_eligible: true,
    aggro: &UNDEAD_HORDE,
    base_drops: &[(ItemKind::RottenFlesh, 1)],
};

static DROWNED: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Hostile,
    habitat: Habitat::Water,
    max_health: 20.0,
    speed: 2.3,
    armor: 2.0,
    despawn_eligible: true,
    aggro: &UNDEAD_HORDE,
    base_drops: &[(ItemKind::RottenFlesh, 1)],
};

static SKELETON: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Hostile,
    habitat: Habitat::Ground,
    max_health: 20.0,
    speed: 2.5,
    armor: 0.0,
    despawn_eligible: true,
    aggro: &LONE_HUNTER,
    base_drops: &[(ItemKind::Bone, 1), (ItemKind::Arrow, 1)],
};

static BLAZE: ArchetypeProfile = ArchetypeProfile {
    classification: Classification::Hostile,
    habitat: Habitat::Air,
    max_health: 20.0,
    speed: 2.3,
    armor: 0.0,
    despawn_eligible: true,
    aggro: &BLAZE_HUNTER,
    base_drops: &[(ItemKind::BlazeRod, 1)],
};

impl Archetype {
    pub fn all() -> [Archetype; 10] {
        [
            Self::Sheep,
            Self::Chicken,
            Self::Squid,
            Self::Bat,
            Self::Allay,
            Self::Wolf,
            Self::Zombie,
            Self::Drowned,
            Self::Skeleton,
            Self::Blaze,
        ]
    }

    pub fn profile(&self) -> &'static ArchetypeProfile {
        match self {
            Self::Sheep => &SHEEP,
            Self::Chicken => &CHICKEN,
            Self::Squid => &SQUID,
            Self::Bat => &BAT,
            Self::Allay => &ALLAY,
            Self::Wolf => &WOLF,
            Self::Zombie => &ZOMBIE,
            Self::Drowned => &DROWNED,
            Self::Skeleton => &SKELETON,
            Self::Blaze => &BLAZE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sheep => "sheep",
            Self::Chicken => "chicken",
            Self::Squid => "squid",
            Self::Bat => "bat",
            Self::Allay => "allay",
            Self::Wolf => "wolf",
            Self::Zombie => "zombie",
            Self::Drowned => "drowned",
            Self::Skeleton => "skeleton",
            Self::Blaze => "blaze",
        }
    }

    pub fn habitat(&self) -> Habitat {
        self.profile().habitat
    }

    /// Undead burn when exposed to daylight
    pub fn burns_in_daylight(&self) -> bool {
        matches!(self, Self::Zombie | Self::Skeleton)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|a| a.as_str() == lowered)
            .ok_or_else(|| SimError::UnknownArchetype(s.to_string()))
    }
}
