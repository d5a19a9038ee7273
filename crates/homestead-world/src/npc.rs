//! Farmer NPC lifecycle: spawn, dormancy, restore.
//!
//! Every NPC identity cycles between two maps and never leaves them once
//! spawned:
//!
//! ```text
//! unspawned -> active -> dormant -> active -> dormant -> ...
//! ```
//!
//! A farm's NPCs belong to the chunk holding its farmhouse (the home chunk).
//! They spawn when that chunk is first generated, go dormant with their last
//! pose when it is evicted, and come back at that pose when it is reloaded.

use std::collections::{BTreeMap, HashMap};

use glam::DVec2;
use homestead_agriculture::{
    generate_farmers_for_farm, Direction, FarmerRole, TroubleKind, Waypoint,
};
use homestead_common::{
    feature_seed, ChunkCoord, FarmId, NpcId, SeededRng, WorldCoord, WorldError, WorldSeed,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chunk::Chunk;
use crate::region::RegionFarm;
use crate::registry::RegionRegistry;

/// Purpose tag for the farmer generator stream.
const FARMER_STREAM: &str = "farmers";

/// A live farmer in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Npc {
    /// Identity
    pub id: NpcId,
    /// Given name
    pub name: &'static str,
    /// Sprite key
    pub sprite: &'static str,
    /// Role on the farm
    pub role: FarmerRole,
    /// Continuous world position
    pub position: DVec2,
    /// Facing
    pub direction: Direction,
    /// Walking animation in progress
    pub is_moving: bool,
    /// Animation frame
    pub anim_frame: u8,
    /// Patrol route (world space)
    pub waypoints: Vec<Waypoint>,
    /// Dialogue lines
    pub dialogue: Vec<String>,
    /// Hardship the farmer talks about
    pub trouble: Option<TroubleKind>,
}

impl Npc {
    /// Tile the NPC stands on.
    #[must_use]
    pub fn tile(&self) -> WorldCoord {
        WorldCoord::from_position(self.position.x, self.position.y)
    }

    /// Chunk the NPC stands in.
    #[must_use]
    pub fn chunk(&self) -> ChunkCoord {
        self.tile().to_chunk()
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> NpcPose {
        NpcPose {
            position: self.position,
            direction: self.direction,
        }
    }

    fn apply_pose(&mut self, pose: NpcPose) {
        self.position = pose.position;
        self.direction = pose.direction;
    }
}

/// Position and facing, the part of an NPC that survives dormancy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpcPose {
    /// World position
    pub position: DVec2,
    /// Facing
    pub direction: Direction,
}

/// Bookkeeping for one NPC identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcState {
    /// The NPC
    pub npc: Npc,
    /// Farm the NPC works
    pub home_farm: FarmId,
    /// Chunk holding the farmhouse
    pub home_chunk: ChunkCoord,
    /// Chunk the NPC was last seen in
    pub current_chunk: ChunkCoord,
    /// Pose saved when the NPC went dormant
    pub saved: Option<NpcPose>,
}

/// Poses of every known NPC, for carrying NPC state across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    /// Pose per identity
    pub poses: BTreeMap<NpcId, NpcPose>,
}

impl NpcSnapshot {
    /// Encodes the snapshot with bincode.
    pub fn encode(&self) -> Result<Vec<u8>, WorldError> {
        bincode::serialize(self).map_err(|e| WorldError::Snapshot(e.to_string()))
    }

    /// Decodes a snapshot produced by [`NpcSnapshot::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, WorldError> {
        bincode::deserialize(bytes).map_err(|e| WorldError::Snapshot(e.to_string()))
    }

    /// Number of poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Returns whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// Tracks active and dormant NPCs for one world.
#[derive(Debug)]
pub struct NpcManager {
    world: WorldSeed,
    active: BTreeMap<NpcId, NpcState>,
    dormant: BTreeMap<NpcId, NpcState>,
    /// Imported poses waiting for their identity's first spawn
    pending: HashMap<NpcId, NpcPose>,
}

impl NpcManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new(world: WorldSeed) -> Self {
        Self {
            world,
            active: BTreeMap::new(),
            dormant: BTreeMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Spawns or restores the NPCs of every farm whose home is `chunk`.
    ///
    /// Farms that merely pass through the chunk are skipped, so each farm's
    /// NPCs appear exactly once however many chunks the farm covers.
    pub fn spawn_for_chunk(&mut self, chunk: &mut Chunk, regions: &RegionRegistry) {
        let coord = chunk.coord();
        let farm_ids = chunk.farm_ids().to_vec();
        for farm_id in farm_ids {
            let Some(farm) = regions.farm_by_id(farm_id) else {
                trace!(farm = %farm_id, "farm not in registry");
                continue;
            };
            if farm.home_chunk() != Some(coord) {
                continue;
            }

            if self.has_dormant(farm_id) {
                self.restore(farm_id, chunk);
            } else if !self.has_active(farm_id) {
                self.spawn_fresh(farm, chunk);
            }
        }
        debug_assert!(self.verify_invariants().is_ok());
    }

    fn spawn_fresh(&mut self, farm: &RegionFarm, chunk: &mut Chunk) {
        let seed = feature_seed(farm.origin, FARMER_STREAM, self.world);
        let farmers = generate_farmers_for_farm(&farm.farm, &mut SeededRng::new(seed));

        for (index, farmer) in farmers.into_iter().enumerate() {
            let id = NpcId::new(farm.id, index as u32);
            let at = farm.to_world(farmer.x, farmer.y);
            let waypoints = farmer
                .waypoints
                .iter()
                .map(|w| {
                    let p = farm.to_world(w.x, w.y);
                    Waypoint { x: p.x, y: p.y, ..*w }
                })
                .collect();

            let mut npc = Npc {
                id,
                name: farmer.name,
                sprite: farmer.sprite,
                role: farmer.role,
                position: DVec2::new(at.x as f64, at.y as f64),
                direction: farmer.direction,
                is_moving: false,
                anim_frame: 0,
                waypoints,
                dialogue: farmer.dialogue,
                trouble: farmer.trouble,
            };
            if let Some(pose) = self.pending.remove(&id) {
                npc.apply_pose(pose);
            }

            let current_chunk = npc.chunk();
            self.active.insert(
                id,
                NpcState {
                    npc,
                    home_farm: farm.id,
                    home_chunk: chunk.coord(),
                    current_chunk,
                    saved: None,
                },
            );
            chunk.attach_npc(id);
        }
        debug!(farm = %farm.id, chunk = %chunk.coord(), "spawned farmers");
    }

    fn restore(&mut self, farm: FarmId, chunk: &mut Chunk) {
        let ids: Vec<NpcId> = self.dormant.range(farm_range(farm)).map(|(id, _)| *id).collect();
        for id in ids {
            let Some(mut state) = self.dormant.remove(&id) else {
                continue;
            };
            if let Some(pose) = state.saved.take() {
                state.npc.apply_pose(pose);
            }
            state.current_chunk = state.npc.chunk();
            self.active.insert(id, state);
            chunk.attach_npc(id);
        }
        trace!(farm = %farm, chunk = %chunk.coord(), "restored dormant farmers");
    }

    /// Sends every active NPC homed in `chunk` to dormancy and detaches them.
    pub fn save_for_chunk(&mut self, chunk: &mut Chunk) {
        let coord = chunk.coord();
        let leaving: Vec<NpcId> = self
            .active
            .iter()
            .filter(|(_, state)| state.home_chunk == coord)
            .map(|(id, _)| *id)
            .collect();

        for id in &leaving {
            if let Some(mut state) = self.active.remove(id) {
                state.saved = Some(state.npc.pose());
                self.dormant.insert(*id, state);
            }
        }
        chunk.detach_npcs();

        if !leaving.is_empty() {
            trace!(chunk = %coord, npcs = leaving.len(), "farmers went dormant");
        }
        debug_assert!(self.verify_invariants().is_ok());
    }

    /// Refreshes each active NPC's current chunk from its live position.
    ///
    /// Returns how many NPCs changed chunk.
    pub fn update(&mut self) -> usize {
        let mut moved = 0;
        for state in self.active.values_mut() {
            let now = state.npc.chunk();
            if now != state.current_chunk {
                state.current_chunk = now;
                moved += 1;
            }
        }
        moved
    }

    fn has_dormant(&self, farm: FarmId) -> bool {
        self.dormant.range(farm_range(farm)).next().is_some()
    }

    fn has_active(&self, farm: FarmId) -> bool {
        self.active.range(farm_range(farm)).next().is_some()
    }

    /// Active NPCs, in identity order.
    pub fn active_npcs(&self) -> impl Iterator<Item = &Npc> {
        self.active.values().map(|s| &s.npc)
    }

    /// State of an active NPC.
    #[must_use]
    pub fn active_state(&self, id: NpcId) -> Option<&NpcState> {
        self.active.get(&id)
    }

    /// State of a dormant NPC.
    #[must_use]
    pub fn dormant_state(&self, id: NpcId) -> Option<&NpcState> {
        self.dormant.get(&id)
    }

    /// An active NPC.
    #[must_use]
    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.active.get(&id).map(|s| &s.npc)
    }

    /// An active NPC, for external movement code.
    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.active.get_mut(&id).map(|s| &mut s.npc)
    }

    /// Returns whether the identity is active.
    #[must_use]
    pub fn is_active(&self, id: NpcId) -> bool {
        self.active.contains_key(&id)
    }

    /// Number of active NPCs.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of dormant NPCs.
    #[must_use]
    pub fn dormant_count(&self) -> usize {
        self.dormant.len()
    }

    /// Active plus dormant NPCs belonging to `farm`.
    #[must_use]
    pub fn farm_npc_count(&self, farm: FarmId) -> usize {
        self.active.range(farm_range(farm)).count() + self.dormant.range(farm_range(farm)).count()
    }

    /// Checks that no identity is both active and dormant.
    pub fn verify_invariants(&self) -> Result<(), WorldError> {
        let (small, large) = if self.active.len() <= self.dormant.len() {
            (&self.active, &self.dormant)
        } else {
            (&self.dormant, &self.active)
        };
        match small.keys().find(|id| large.contains_key(id)) {
            Some(id) => Err(WorldError::NpcDuplicated(*id)),
            None => Ok(()),
        }
    }

    /// Poses of every known NPC: live poses for active NPCs, saved poses for dormant ones.
    #[must_use]
    pub fn export_snapshot(&self) -> NpcSnapshot {
        let active = self.active.iter().map(|(id, s)| (*id, s.npc.pose()));
        let dormant = self
            .dormant
            .iter()
            .map(|(id, s)| (*id, s.saved.unwrap_or_else(|| s.npc.pose())));
        NpcSnapshot {
            poses: active.chain(dormant).collect(),
        }
    }

    /// Loads poses from a snapshot.
    ///
    /// Dormant identities get their saved pose replaced; identities not yet
    /// spawned start from the imported pose when they first spawn. Active
    /// NPCs keep their live pose.
    pub fn import_snapshot(&mut self, snapshot: NpcSnapshot) {
        for (id, pose) in snapshot.poses {
            if let Some(state) = self.dormant.get_mut(&id) {
                state.saved = Some(pose);
            } else if !self.active.contains_key(&id) {
                self.pending.insert(id, pose);
            }
        }
    }
}

fn farm_range(farm: FarmId) -> std::ops::RangeInclusive<NpcId> {
    NpcId::new(farm, 0)..=NpcId::new(farm, u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ChunkGenerator;
    use homestead_common::RegionCoord;

    struct Fixture {
        regions: RegionRegistry,
        generator: ChunkGenerator,
        npcs: NpcManager,
        farm: FarmId,
        home: ChunkCoord,
    }

    impl Fixture {
        fn new() -> Self {
            let world = WorldSeed::new(42);
            let mut regions = RegionRegistry::new(world);
            let region = regions.get_or_generate(RegionCoord::new(0, 0));
            let farm = region.farms.first().expect("region has farms");
            let (id, home) = (farm.id, farm.home_chunk().expect("farmhouse"));
            Self {
                regions,
                generator: ChunkGenerator::new(world),
                npcs: NpcManager::new(world),
                farm: id,
                home,
            }
        }

        fn load(&mut self, coord: ChunkCoord) -> Chunk {
            let mut chunk = self.generator.generate(coord, &mut self.regions);
            self.npcs.spawn_for_chunk(&mut chunk, &self.regions);
            chunk
        }
    }

    #[test]
    fn test_spawns_only_in_home_chunk() {
        let mut fx = Fixture::new();
        let farm = fx.regions.farm_by_id(fx.farm).expect("farm").clone();
        let home = fx.home;
        for &coord in farm.affected_chunks.iter().filter(|c| **c != home) {
            let chunk = fx.load(coord);
            assert!(chunk.npcs().iter().all(|id| id.farm != fx.farm));
        }
        assert_eq!(fx.npcs.farm_npc_count(fx.farm), 0);

        let home = fx.load(fx.home);
        let count = fx.npcs.farm_npc_count(fx.farm);
        assert!((1..=2).contains(&count));
        assert!(home.npcs().iter().filter(|id| id.farm == fx.farm).count() == count);
    }

    #[test]
    fn test_reloading_active_chunk_does_not_duplicate() {
        let mut fx = Fixture::new();
        let _first = fx.load(fx.home);
        let before = fx.npcs.active_count();
        let second = fx.load(fx.home);
        assert_eq!(fx.npcs.active_count(), before);
        assert!(second.npcs().is_empty());
    }

    #[test]
    fn test_dormancy_restores_last_pose() {
        let mut fx = Fixture::new();
        let mut chunk = fx.load(fx.home);
        let id = NpcId::new(fx.farm, 0);

        let npc = fx.npcs.npc_mut(id).expect("spawned");
        npc.position += DVec2::new(0.5, 1.25);
        npc.direction = Direction::Left;
        let moved = npc.pose();

        fx.npcs.save_for_chunk(&mut chunk);
        assert!(chunk.npcs().is_empty());
        assert!(!fx.npcs.is_active(id));
        assert_eq!(fx.npcs.dormant_state(id).and_then(|s| s.saved), Some(moved));

        let reloaded = fx.load(fx.home);
        assert!(reloaded.npcs().contains(&id));
        assert_eq!(fx.npcs.npc(id).map(Npc::pose), Some(moved));
        assert_eq!(fx.npcs.dormant_count(), 0);
        assert!(fx.npcs.verify_invariants().is_ok());
    }

    #[test]
    fn test_spawn_is_deterministic() {
        let mut a = Fixture::new();
        let mut b = Fixture::new();
        a.load(a.home);
        b.load(b.home);
        let left: Vec<_> = a.npcs.active_npcs().cloned().collect();
        let right: Vec<_> = b.npcs.active_npcs().cloned().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_update_tracks_current_chunk() {
        let mut fx = Fixture::new();
        fx.load(fx.home);
        let id = NpcId::new(fx.farm, 0);
        assert_eq!(fx.npcs.update(), 0);

        if let Some(npc) = fx.npcs.npc_mut(id) {
            npc.position += DVec2::new(200.0, 0.0);
        }
        assert_eq!(fx.npcs.update(), 1);
        let state = fx.npcs.active_state(id).expect("active");
        assert_eq!(state.current_chunk, state.npc.chunk());
        assert_eq!(state.home_chunk, fx.home);
    }

    #[test]
    fn test_snapshot_round_trip_into_fresh_manager() {
        let mut fx = Fixture::new();
        let mut chunk = fx.load(fx.home);
        let id = NpcId::new(fx.farm, 0);
        if let Some(npc) = fx.npcs.npc_mut(id) {
            npc.position = DVec2::new(-3.5, 7.0);
        }
        fx.npcs.save_for_chunk(&mut chunk);

        let bytes = fx.npcs.export_snapshot().encode().expect("encode");
        let snapshot = NpcSnapshot::decode(&bytes).expect("decode");
        assert_eq!(snapshot.poses[&id].position, DVec2::new(-3.5, 7.0));

        let mut fresh = Fixture::new();
        fresh.npcs.import_snapshot(snapshot);
        fresh.load(fresh.home);
        assert_eq!(
            fresh.npcs.npc(id).map(|n| n.position),
            Some(DVec2::new(-3.5, 7.0))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            NpcSnapshot::decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]),
            Err(WorldError::Snapshot(_))
        ));
    }
}
