//! A player's free-form Rush board: letter tiles at integer coordinates.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub type TileId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LetterTile {
    pub id: TileId,
    pub value: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile: LetterTile,
    pub pos: Pos,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterGrid {
    tiles: BTreeMap<TileId, PlacedTile>,
    #[serde_as(as = "Vec<(_, _)>")]
    at: HashMap<Pos, TileId>,
}

impl LetterGrid {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.tiles.values()
    }

    pub fn tile_at(&self, pos: Pos) -> Option<TileId> {
        self.at.get(&pos).copied()
    }

    pub fn position_of(&self, id: TileId) -> Option<Pos> {
        self.tiles.get(&id).map(|p| p.pos)
    }

    /// Place a tile on an empty square. Returns false when occupied.
    pub fn add(&mut self, tile: LetterTile, pos: Pos) -> bool {
        if self.at.contains_key(&pos) {
            return false;
        }
        self.at.insert(pos, tile.id);
        self.tiles.insert(tile.id, PlacedTile { tile, pos });
        true
    }

    pub fn remove(&mut self, id: TileId) -> Option<LetterTile> {
        let placed = self.tiles.remove(&id)?;
        self.at.remove(&placed.pos);
        Some(placed.tile)
    }

    /// Move a placed tile; a tile already at `pos` swaps into the old spot.
    pub fn move_to(&mut self, id: TileId, pos: Pos) -> bool {
        let Some(from) = self.position_of(id) else {
            return false;
        };
        match self.tile_at(pos) {
            Some(other) if other != id => self.swap(id, other),
            Some(_) => true,
            None => {
                self.at.remove(&from);
                self.at.insert(pos, id);
                if let Some(placed) = self.tiles.get_mut(&id) {
                    placed.pos = pos;
                }
                true
            }
        }
    }

    /// Exchange the positions of two placed tiles.
    pub fn swap(&mut self, first: TileId, second: TileId) -> bool {
        let (Some(a), Some(b)) = (self.position_of(first), self.position_of(second)) else {
            return false;
        };
        self.at.insert(a, second);
        self.at.insert(b, first);
        if let Some(placed) = self.tiles.get_mut(&first) {
            placed.pos = b;
        }
        if let Some(placed) = self.tiles.get_mut(&second) {
            placed.pos = a;
        }
        true
    }

    fn read(&self, start: Pos, dx: i32, dy: i32) -> String {
        let mut word = String::new();
        let mut pos = start;
        while let Some(id) = self.tile_at(pos) {
            if let Some(placed) = self.tiles.get(&id) {
                word.push(placed.tile.value);
            }
            pos = pos.offset(dx, dy);
        }
        word
    }

    /// Every maximal left-to-right and top-to-bottom run of two or more
    /// tiles, in a stable order.
    pub fn words(&self) -> Vec<String> {
        let mut starts: Vec<Pos> = self.at.keys().copied().collect();
        starts.sort();
        let mut words = Vec::new();
        for pos in starts {
            let occupied = |p: Pos| self.at.contains_key(&p);
            if !occupied(pos.offset(-1, 0)) && occupied(pos.offset(1, 0)) {
                words.push(self.read(pos, 1, 0));
            }
            if !occupied(pos.offset(0, -1)) && occupied(pos.offset(0, 1)) {
                words.push(self.read(pos, 0, 1));
            }
        }
        words
    }

    /// Whether all tiles form one edge-connected group.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.at.keys().next().copied() else {
            return true;
        };
        let mut seen = HashSet::from([first]);
        let mut queue = VecDeque::from([first]);
        while let Some(pos) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = pos.offset(dx, dy);
                if self.at.contains_key(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() == self.at.len()
    }
}
