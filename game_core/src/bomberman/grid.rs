use glam::IVec2;
use rand::Rng;

use crate::{GameRng, Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Indestructible
    Wall,
    /// Destroyed by the first blast that reaches it
    Block,
    Empty,
}

/// The four blast and movement directions
pub const DIRECTIONS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Square tile grid, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Grid with the fixed wall pattern and nothing else, at least 5 tiles wide
    pub fn walls_only(size: i32) -> Self {
        let size = size.max(5);
        let mut grid = Self {
            size,
            tiles: vec![Tile::Empty; (size * size) as usize],
        };
        for y in 0..size {
            for x in 0..size {
                if grid.is_fixed_wall(x, y) {
                    grid.set(IVec2::new(x, y), Tile::Wall);
                }
            }
        }
        grid
    }

    /// Random level: fixed walls, blocks with `block_chance`, safe zones cleared
    pub fn generate(size: i32, block_chance: f64, rng: &mut GameRng) -> Self {
        let mut grid = Self::walls_only(size);
        let size = grid.size;
        for y in 0..size {
            for x in 0..size {
                let pos = IVec2::new(x, y);
                if grid.get(pos) == Tile::Empty && rng.0.gen_bool(block_chance.clamp(0.0, 1.0)) {
                    grid.set(pos, Tile::Block);
                }
            }
        }
        for pos in safe_zone(size) {
            if !grid.is_fixed_wall(pos.x, pos.y) {
                grid.set(pos, Tile::Empty);
            }
        }
        grid
    }

    /// Border tiles and tiles with both coordinates even
    fn is_fixed_wall(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.size - 1 || y == self.size - 1 || (x % 2 == 0 && y % 2 == 0)
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size && pos.y < self.size
    }

    /// Tile at `pos`; anything off the grid reads as a wall
    pub fn get(&self, pos: IVec2) -> Tile {
        if self.contains(pos) {
            self.tiles[(pos.y * self.size + pos.x) as usize]
        } else {
            Tile::Wall
        }
    }

    pub fn set(&mut self, pos: IVec2, tile: Tile) {
        if self.contains(pos) {
            self.tiles[(pos.y * self.size + pos.x) as usize] = tile;
        }
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Tiles hit by a blast of `radius` at `origin`, destroying blocks on the way
    ///
    /// Each arm stops before the first wall and at the first block, so at
    /// most one block per direction is cleared. Returns the covered tiles
    /// (origin first) and the number of blocks destroyed.
    pub fn blast(&mut self, origin: IVec2, radius: i32) -> (Vec<IVec2>, u32) {
        let mut covered = vec![origin];
        let mut destroyed = 0;

        for dir in DIRECTIONS {
            for i in 1..=radius {
                let pos = origin + dir * i;
                match self.get(pos) {
                    Tile::Wall => break,
                    Tile::Block => {
                        self.set(pos, Tile::Empty);
                        destroyed += 1;
                        covered.push(pos);
                        break;
                    }
                    Tile::Empty => covered.push(pos),
                }
            }
        }

        (covered, destroyed)
    }
}

/// Player start, the far corner and their neighbours
pub fn safe_zone(size: i32) -> [IVec2; 6] {
    let far = size - 2;
    [
        IVec2::new(1, 1),
        IVec2::new(1, 2),
        IVec2::new(2, 1),
        IVec2::new(far, far),
        IVec2::new(far - 1, far),
        IVec2::new(far, far - 1),
    ]
}

impl Default for Grid {
    fn default() -> Self {
        Self::walls_only(Params::GRID_SIZE)
    }
}
