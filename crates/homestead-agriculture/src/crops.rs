//! Crop catalogue.

use homestead_common::SeededRng;
use serde::{Deserialize, Serialize};

use crate::biome::BiomeType;

/// A crop that can be planted in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crop {
    /// Grain
    Wheat,
    /// Grain
    Barley,
    /// Grain
    Oats,
    /// Orchard
    Apples,
    /// Orchard
    Pears,
    /// Orchard
    Plums,
    /// Orchard
    Grapes,
    /// Vegetable
    Potatoes,
    /// Vegetable
    Carrots,
    /// Vegetable
    Onions,
    /// Vegetable
    Cabbages,
    /// Mixed
    Mushrooms,
    /// Mixed
    GardenHerbs,
    /// Mixed
    PipeWeed,
    /// Mixed
    Hops,
}

const GRAIN: &[Crop] = &[Crop::Wheat, Crop::Barley, Crop::Oats];
const ORCHARD: &[Crop] = &[Crop::Apples, Crop::Pears, Crop::Plums, Crop::Grapes];
const VEGETABLE: &[Crop] = &[Crop::Potatoes, Crop::Carrots, Crop::Onions, Crop::Cabbages];
const MIXED: &[Crop] = &[Crop::Mushrooms, Crop::GardenHerbs, Crop::PipeWeed, Crop::Hops];

impl Crop {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Crop::Wheat => "Wheat",
            Crop::Barley => "Barley",
            Crop::Oats => "Oats",
            Crop::Apples => "Apples",
            Crop::Pears => "Pears",
            Crop::Plums => "Plums",
            Crop::Grapes => "Grapes",
            Crop::Potatoes => "Potatoes",
            Crop::Carrots => "Carrots",
            Crop::Onions => "Onions",
            Crop::Cabbages => "Cabbages",
            Crop::Mushrooms => "Mushrooms",
            Crop::GardenHerbs => "Garden Herbs",
            Crop::PipeWeed => "Pipe-Weed",
            Crop::Hops => "Hops",
        }
    }

    /// Biome the crop belongs to.
    #[must_use]
    pub const fn biome(self) -> BiomeType {
        match self {
            Crop::Wheat | Crop::Barley | Crop::Oats => BiomeType::Grain,
            Crop::Apples | Crop::Pears | Crop::Plums | Crop::Grapes => BiomeType::Orchard,
            Crop::Potatoes | Crop::Carrots | Crop::Onions | Crop::Cabbages => BiomeType::Vegetable,
            Crop::Mushrooms | Crop::GardenHerbs | Crop::PipeWeed | Crop::Hops => BiomeType::Mixed,
        }
    }

    /// Crops grown in `biome`.
    #[must_use]
    pub const fn for_biome(biome: BiomeType) -> &'static [Crop] {
        match biome {
            BiomeType::Grain => GRAIN,
            BiomeType::Orchard => ORCHARD,
            BiomeType::Vegetable => VEGETABLE,
            BiomeType::Mixed => MIXED,
        }
    }

    /// Random crop for `biome`, falling back to mixed crops.
    pub fn random_for_biome(biome: BiomeType, rng: &mut SeededRng) -> Crop {
        let crops = match Self::for_biome(biome) {
            [] => MIXED,
            crops => crops,
        };
        rng.pick(crops).copied().unwrap_or(Crop::Hops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_consistent() {
        for biome in [
            BiomeType::Grain,
            BiomeType::Orchard,
            BiomeType::Vegetable,
            BiomeType::Mixed,
        ] {
            let crops = Crop::for_biome(biome);
            assert!(!crops.is_empty());
            assert!(crops.iter().all(|c| c.biome() == biome));
        }
    }

    #[test]
    fn test_random_crop_matches_biome() {
        let mut rng = SeededRng::new(11);
        for _ in 0..50 {
            assert_eq!(
                Crop::random_for_biome(BiomeType::Vegetable, &mut rng).biome(),
                BiomeType::Vegetable
            );
        }
        assert_eq!(Crop::GardenHerbs.name(), "Garden Herbs");
    }
}
