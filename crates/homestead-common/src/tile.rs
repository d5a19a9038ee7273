//! Tile palette shared by terrain generation, farm stamping, and collision.

use bytemuck::NoUninit;
use serde::{Deserialize, Serialize};

/// A single world tile.
///
/// Codes below 10 are ground tiles; codes from 10 upward are overlays that a
/// renderer draws on top of [`Tile::base_tile`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, NoUninit,
)]
#[repr(u8)]
pub enum Tile {
    /// Open grass
    #[default]
    Grass = 0,
    /// Bare dirt, patches and paths
    Dirt = 1,
    /// Interior floor
    Floor = 2,
    /// Plowed field
    Plowed = 3,
    /// Solid wall (buildings, ruins)
    Wall = 10,
    /// Door in a wall
    Door = 11,
    /// Table, well, shed and other small solid props
    Table = 12,
    /// Pond or lake water
    Water = 13,
    /// Bridge over water
    Bridge = 14,
    /// Farm fence
    Fence = 15,
    /// Orchard tree row
    OrchardTree = 16,
}

impl Tile {
    /// All tiles, in code order.
    pub const ALL: [Tile; 11] = [
        Tile::Grass,
        Tile::Dirt,
        Tile::Floor,
        Tile::Plowed,
        Tile::Wall,
        Tile::Door,
        Tile::Table,
        Tile::Water,
        Tile::Bridge,
        Tile::Fence,
        Tile::OrchardTree,
    ];

    /// Integer tile code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a tile by its code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Returns whether the tile is drawn over a base tile.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        self.code() >= 10
    }

    /// Ground tile drawn underneath an overlay; ground tiles return themselves.
    #[must_use]
    pub const fn base_tile(self) -> Self {
        match self {
            Tile::Door | Tile::Table => Tile::Floor,
            Tile::Bridge => Tile::Dirt,
            Tile::Wall | Tile::Water | Tile::Fence | Tile::OrchardTree => Tile::Grass,
            ground => ground,
        }
    }

    /// Returns whether the tile blocks movement.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Tile::Wall | Tile::Water | Tile::Table)
    }

    /// Open ground that terrain overlays (water) and farm placement may claim.
    #[must_use]
    pub const fn is_flat(self) -> bool {
        matches!(self, Tile::Grass | Tile::Dirt)
    }

    /// Single-character glyph for debug views.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Tile::Grass => '.',
            Tile::Dirt => ',',
            Tile::Floor => '_',
            Tile::Plowed => '=',
            Tile::Wall => '#',
            Tile::Door => '+',
            Tile::Table => 'o',
            Tile::Water => '~',
            Tile::Bridge => 'H',
            Tile::Fence => ':',
            Tile::OrchardTree => 'T',
        }
    }
}
