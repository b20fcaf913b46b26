use glam::IVec2;
use rand::Rng;

use super::grid::{Grid, Tile, DIRECTIONS};
use super::BombermanStats;
use crate::config::Difficulty;
use crate::{GameRng, Params};

/// Who planted a bomb; enemies are only hurt by the player's blasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bomb {
    pub pos: IVec2,
    pub fuse_ms: f32,
    pub radius: i32,
    pub owner: Owner,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub pos: IVec2,
    pub ttl_ms: f32,
    pub owner: Owner,
}

impl Explosion {
    /// Remaining strength in `[0, 1]`, used as draw opacity
    pub fn strength(&self) -> f32 {
        (self.ttl_ms / Params::EXPLOSION_MS).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub pos: IVec2,
    pub bombs: u32,
    pub blast_radius: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub pos: IVec2,
    pub timer_ms: f32,
    pub step_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// One Bomberman round
pub struct BombermanGame {
    grid: Grid,
    player: Player,
    enemies: Vec<Enemy>,
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    stats: BombermanStats,
    outcome: Option<Outcome>,
    elapsed_ms: f32,
    rng: GameRng,
}

impl BombermanGame {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let mut grid = Grid::generate(Params::GRID_SIZE, Params::BLOCK_CHANCE, &mut rng);

        let far = grid.size() - 2;
        let step_ms = match difficulty {
            Difficulty::Easy => Params::ENEMY_STEP_MS_EASY,
            _ => Params::ENEMY_STEP_MS,
        };
        let corners = [IVec2::new(1, far), IVec2::new(far, 1), IVec2::new(far, far)];
        let enemies = corners
            .iter()
            .cycle()
            .take(Params::ENEMY_COUNT)
            .map(|&pos| {
                // An enemy must never start inside a block
                grid.set(pos, Tile::Empty);
                Enemy {
                    pos,
                    timer_ms: 0.0,
                    step_ms,
                }
            })
            .collect();

        let blast_radius = match difficulty {
            Difficulty::Hard => Params::PLAYER_BLAST_RADIUS_HARD,
            _ => Params::PLAYER_BLAST_RADIUS,
        };

        log::info!("bomberman round started ({:?})", difficulty);

        Self::from_parts(
            grid,
            Player {
                pos: IVec2::new(1, 1),
                bombs: Params::PLAYER_BOMBS,
                blast_radius,
            },
            enemies,
            rng,
        )
    }

    /// Build a round from an explicit layout
    pub fn from_parts(grid: Grid, player: Player, enemies: Vec<Enemy>, rng: GameRng) -> Self {
        Self {
            grid,
            player,
            enemies,
            bombs: Vec::new(),
            explosions: Vec::new(),
            stats: BombermanStats::default(),
            outcome: None,
            elapsed_ms: 0.0,
            rng,
        }
    }

    /// Advance timers by `dt_ms`; returns the outcome once, when the round ends
    pub fn update(&mut self, dt_ms: f32) -> Option<Outcome> {
        if self.outcome.is_some() {
            return None;
        }
        let dt_ms = dt_ms.max(0.0);
        self.elapsed_ms += dt_ms;

        for explosion in &mut self.explosions {
            explosion.ttl_ms -= dt_ms;
        }
        self.explosions.retain(|e| e.ttl_ms > 0.0);

        for bomb in &mut self.bombs {
            bomb.fuse_ms -= dt_ms;
        }
        let (ready, pending): (Vec<Bomb>, Vec<Bomb>) =
            self.bombs.drain(..).partition(|b| b.fuse_ms <= 0.0);
        self.bombs = pending;
        for bomb in ready {
            self.explode(bomb);
        }

        for i in 0..self.enemies.len() {
            self.enemies[i].timer_ms -= dt_ms;
            if self.enemies[i].timer_ms <= 0.0 {
                self.step_enemy(i);
                self.enemies[i].timer_ms = self.enemies[i].step_ms;
            }
        }

        self.check_hits()
    }

    fn explode(&mut self, bomb: Bomb) {
        let (covered, destroyed) = self.grid.blast(bomb.pos, bomb.radius);
        self.stats.blocks_destroyed += destroyed;
        self.explosions.extend(covered.into_iter().map(|pos| Explosion {
            pos,
            ttl_ms: Params::EXPLOSION_MS,
            owner: bomb.owner,
        }));
        if bomb.owner == Owner::Player {
            self.player.bombs += 1;
        }
    }

    fn step_enemy(&mut self, index: usize) {
        let from = self.enemies[index].pos;
        let options: Vec<IVec2> = DIRECTIONS
            .iter()
            .map(|d| from + *d)
            .filter(|p| self.is_walkable(*p))
            .collect();
        if options.is_empty() {
            return;
        }

        let to = options[self.rng.0.gen_range(0..options.len())];
        self.enemies[index].pos = to;

        if self.rng.0.gen_bool(Params::ENEMY_BOMB_CHANCE) {
            self.bombs.push(Bomb {
                pos: to,
                fuse_ms: Params::BOMB_FUSE_MS,
                radius: Params::ENEMY_BLAST_RADIUS,
                owner: Owner::Enemy,
            });
        }
    }

    fn check_hits(&mut self) -> Option<Outcome> {
        let player_hit = self.explosions.iter().any(|e| e.pos == self.player.pos);

        let explosions = &self.explosions;
        let before = self.enemies.len();
        self.enemies.retain(|enemy| {
            !explosions
                .iter()
                .any(|e| e.owner == Owner::Player && e.pos == enemy.pos)
        });
        self.stats.enemies_killed += (before - self.enemies.len()) as u32;

        // A loss in the same frame wins over clearing the last enemy
        let outcome = if player_hit {
            Some(Outcome::Lost)
        } else if self.enemies.is_empty() {
            Some(Outcome::Won)
        } else {
            None
        };

        if let Some(result) = outcome {
            log::info!("bomberman round over: {:?}", result);
            self.outcome = Some(result);
        }
        outcome
    }

    /// Empty tile without a bomb
    pub fn is_walkable(&self, pos: IVec2) -> bool {
        self.grid.get(pos) == Tile::Empty && !self.bombs.iter().any(|b| b.pos == pos)
    }

    pub fn move_player(&mut self, direction: Direction) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let target = self.player.pos + direction.delta();
        if self.is_walkable(target) {
            self.player.pos = target;
            true
        } else {
            false
        }
    }

    pub fn place_bomb(&mut self) -> bool {
        if self.outcome.is_some() || self.player.bombs == 0 {
            return false;
        }
        if self.bombs.iter().any(|b| b.pos == self.player.pos) {
            return false;
        }
        self.player.bombs -= 1;
        self.bombs.push(Bomb {
            pos: self.player.pos,
            fuse_ms: Params::BOMB_FUSE_MS,
            radius: self.player.blast_radius,
            owner: Owner::Player,
        });
        self.stats.bombs_placed += 1;
        true
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn stats(&self) -> &BombermanStats {
        &self.stats
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Open level, player at (1,1), one parked enemy far away
    fn open_game(enemies: Vec<IVec2>) -> BombermanGame {
        let grid = Grid::walls_only(Params::GRID_SIZE);
        let player = Player {
            pos: IVec2::new(1, 1),
            bombs: 1,
            blast_radius: 3,
        };
        let enemies = enemies
            .into_iter()
            .map(|pos| Enemy {
                pos,
                timer_ms: f32::MAX,
                step_ms: f32::MAX,
            })
            .collect();
        BombermanGame::from_parts(grid, player, enemies, GameRng::new(1))
    }

    #[test]
    fn test_new_round_layout() {
        let game = BombermanGame::new(Difficulty::Medium, 5);
        assert_eq!(game.player().pos, IVec2::new(1, 1));
        assert_eq!(game.player().blast_radius, 3);
        assert_eq!(game.enemies().len(), 3);
        for enemy in game.enemies() {
            assert_eq!(game.grid().get(enemy.pos), Tile::Empty);
            assert_eq!(enemy.step_ms, 1000.0);
        }
    }

    #[test]
    fn test_difficulty_tuning() {
        assert_eq!(BombermanGame::new(Difficulty::Hard, 1).player().blast_radius, 4);
        let easy = BombermanGame::new(Difficulty::Easy, 1);
        assert!(easy.enemies().iter().all(|e| e.step_ms == 1500.0));
    }

    #[test]
    fn test_player_cannot_walk_into_walls_or_bombs() {
        let mut game = open_game(vec![IVec2::new(13, 13)]);
        assert!(!game.move_player(Direction::Up), "Border wall");
        assert!(game.move_player(Direction::Right));
        assert!(game.place_bomb());
        assert!(game.move_player(Direction::Left));
        assert!(!game.move_player(Direction::Right), "Bomb blocks the tile");
    }

    #[test]
    fn test_bomb_stock_returns_after_explosion() {
        let mut game = open_game(vec![IVec2::new(13, 13)]);
        assert!(game.place_bomb());
        assert!(!game.place_bomb(), "Only one bomb in stock");
        assert_eq!(game.stats().bombs_placed, 1);

        // Walk out of the blast first
        game.move_player(Direction::Right);
        game.move_player(Direction::Right);
        game.move_player(Direction::Right);
        game.move_player(Direction::Right);
        game.move_player(Direction::Down);

        game.update(2999.0);
        assert_eq!(game.bombs().len(), 1);
        game.update(1.0);
        assert!(game.bombs().is_empty());
        assert_eq!(game.player().bombs, 1);
        assert!(!game.explosions().is_empty());
        assert_eq!(game.outcome(), None);

        game.update(500.0);
        assert!(game.explosions().is_empty(), "Explosions fade after 500ms");
    }

    #[test]
    fn test_standing_in_blast_loses() {
        let mut game = open_game(vec![IVec2::new(13, 13)]);
        game.place_bomb();
        assert_eq!(game.update(3000.0), Some(Outcome::Lost));
        assert_eq!(game.update(16.0), None, "Outcome reported once");
        assert!(!game.move_player(Direction::Right));
    }

    #[test]
    fn test_killing_last_enemy_wins() {
        let mut game = open_game(vec![IVec2::new(5, 1)]);
        game.move_player(Direction::Right);
        game.place_bomb();
        game.move_player(Direction::Left);
        game.move_player(Direction::Down);
        game.move_player(Direction::Down);
        game.move_player(Direction::Down);

        // Bomb at (2,1) radius 3 reaches (5,1); player at (1,4) is clear
        assert_eq!(game.update(3000.0), Some(Outcome::Won));
        assert_eq!(game.stats().enemies_killed, 1);
    }

    #[test]
    fn test_enemy_blast_spares_enemies_but_not_player() {
        let mut game = open_game(vec![IVec2::new(3, 1), IVec2::new(13, 13)]);
        game.bombs.push(Bomb {
            pos: IVec2::new(3, 1),
            fuse_ms: 10.0,
            radius: 2,
            owner: Owner::Enemy,
        });

        assert_eq!(game.update(10.0), Some(Outcome::Lost));
        assert_eq!(game.enemies().len(), 2, "Enemy bombs never kill enemies");
    }

    #[test]
    fn test_loss_beats_win_in_same_frame() {
        let mut game = open_game(vec![IVec2::new(3, 1)]);
        game.place_bomb();
        assert_eq!(game.update(3000.0), Some(Outcome::Lost));
        assert_eq!(game.stats().enemies_killed, 1);
    }

    #[test]
    fn test_blocks_destroyed_are_counted() {
        let mut game = open_game(vec![IVec2::new(13, 13)]);
        game.grid.set(IVec2::new(3, 1), Tile::Block);
        game.grid.set(IVec2::new(1, 3), Tile::Block);
        game.place_bomb();
        game.update(3000.0);
        assert_eq!(game.stats().blocks_destroyed, 2);
    }

    #[test]
    fn test_enemies_move_on_their_timer() {
        let grid = Grid::walls_only(Params::GRID_SIZE);
        let player = Player {
            pos: IVec2::new(1, 1),
            bombs: 1,
            blast_radius: 3,
        };
        let start = IVec2::new(7, 7);
        let enemy = Enemy {
            pos: start,
            timer_ms: 1000.0,
            step_ms: 1000.0,
        };
        let mut game = BombermanGame::from_parts(grid, player, vec![enemy], GameRng::new(9));

        game.update(999.0);
        assert_eq!(game.enemies()[0].pos, start);
        game.update(1.0);
        let moved = game.enemies()[0].pos;
        assert_eq!((moved - start).abs().element_sum(), 1, "One tile per step");
        assert_eq!(game.grid().get(moved), Tile::Empty);
    }
}
