//! Mouse-and-cheese grid world
//!
//! A mouse starts in a corner of a rectangular grid and moves one tile per
//! step. Cheese pays a small reward and is eaten, traps and the big cheese
//! end the episode. Tiles are numbered column by column: the tile at
//! `(x, y)` has index `x * height + y`, so with the default 6×6 layout the
//! tiles directly below the start are 1, 2, 3, …

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, enabled, trace, Level};

use mousetrap_core::{
    DiscreteAction, DiscreteSpace, Environment, Result, Reward, RlError, Step, StepInfo, TileIndex,
};

/// One of the four moves, in action-index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    /// Action 0
    Up,
    /// Action 1
    Down,
    /// Action 2
    Left,
    /// Action 3
    Right,
}

impl Move {
    /// All moves, indexed by action
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Decode an action index
    #[must_use]
    pub fn from_action(action: DiscreteAction) -> Option<Self> {
        Self::ALL.get(action.index()).copied()
    }

    /// Action index of this move
    #[must_use]
    pub fn action(self) -> DiscreteAction {
        DiscreteAction(self as usize)
    }

    /// Arrow used when printing a policy
    #[must_use]
    pub fn arrow(self) -> char {
        match self {
            Move::Up => '↑',
            Move::Down => '↓',
            Move::Left => '←',
            Move::Right => '→',
        }
    }
}

/// What a tile holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    /// Nothing; stepping here pays the empty reward
    Empty,
    /// Eaten on arrival, then empty until the next reset
    Cheese,
    /// Ends the episode with a penalty
    Trap,
    /// Ends the episode with the big reward
    BigCheese,
}

impl Tile {
    /// Whether stepping on this tile ends the episode
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Tile::Trap | Tile::BigCheese)
    }

    fn symbol(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Cheese => 'c',
            Tile::Trap => 'X',
            Tile::BigCheese => 'C',
        }
    }

    fn name(self) -> &'static str {
        match self {
            Tile::Empty => "empty",
            Tile::Cheese => "cheese",
            Tile::Trap => "trap",
            Tile::BigCheese => "big_cheese",
        }
    }
}

/// Reward paid for arriving on each kind of tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRewards {
    /// Reward for an empty tile
    pub empty: f64,
    /// Reward for eating a cheese
    pub cheese: f64,
    /// Reward for a trap
    pub trap: f64,
    /// Reward for the big cheese
    pub big_cheese: f64,
}

impl Default for TileRewards {
    fn default() -> Self {
        Self {
            empty: 0.0,
            cheese: 1.0,
            trap: -100.0,
            big_cheese: 100.0,
        }
    }
}

impl TileRewards {
    fn for_tile(&self, tile: Tile) -> f64 {
        match tile {
            Tile::Empty => self.empty,
            Tile::Cheese => self.cheese,
            Tile::Trap => self.trap,
            Tile::BigCheese => self.big_cheese,
        }
    }
}

/// Largest grid [`GridConfig::layout`] accepts
pub const MAX_TILES: usize = 1 << 20;

/// Grid layout and rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tiles along x
    pub width: usize,
    /// Tiles along y
    pub height: usize,
    /// Starting tile of the mouse
    pub start: usize,
    /// Cheese tiles
    pub cheese: Vec<usize>,
    /// Trap tiles
    pub traps: Vec<usize>,
    /// Big cheese tiles
    pub big_cheese: Vec<usize>,
    /// Rewards per tile kind
    pub rewards: TileRewards,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            start: 0,
            cheese: vec![15, 17, 19, 23],
            traps: vec![3, 5, 7, 22, 32],
            big_cheese: vec![35],
            rewards: TileRewards::default(),
        }
    }
}

impl GridConfig {
    /// Build the starting tile layout, rejecting oversized grids and
    /// out-of-range or overlapping tiles
    pub fn layout(&self) -> Result<Vec<Tile>> {
        if self.width == 0 || self.height == 0 {
            return Err(RlError::config(format!(
                "grid must have at least one tile, got {}x{}",
                self.width, self.height
            )));
        }
        let size = self
            .width
            .checked_mul(self.height)
            .filter(|&size| size <= MAX_TILES)
            .ok_or_else(|| {
                RlError::config(format!(
                    "grid of {}x{} tiles exceeds the limit of {MAX_TILES}",
                    self.width, self.height
                ))
            })?;
        if self.start >= size {
            return Err(RlError::config(format!(
                "start tile {} outside a grid of {size} tiles",
                self.start
            )));
        }

        let mut tiles = vec![Tile::Empty; size];
        let groups = [
            (Tile::Cheese, &self.cheese),
            (Tile::Trap, &self.traps),
            (Tile::BigCheese, &self.big_cheese),
        ];
        for (kind, indices) in groups {
            for &index in indices {
                let slot = tiles.get_mut(index).ok_or_else(|| {
                    RlError::config(format!(
                        "{} tile {index} outside a grid of {size} tiles",
                        kind.name()
                    ))
                })?;
                if *slot != Tile::Empty {
                    return Err(RlError::config(format!(
                        "tile {index} is both {} and {}",
                        slot.name(),
                        kind.name()
                    )));
                }
                *slot = kind;
            }
        }
        if tiles[self.start] != Tile::Empty {
            return Err(RlError::config(format!(
                "start tile {} must be empty",
                self.start
            )));
        }
        Ok(tiles)
    }
}

/// The mouse-and-cheese environment.
///
/// Landing on a terminal tile resets the world in the same step: the step
/// reports `done` and the start tile as the next state.
#[derive(Debug, Clone)]
pub struct GridWorld {
    config: GridConfig,
    initial: Vec<Tile>,
    tiles: Vec<Tile>,
    x: usize,
    y: usize,
    episodes_completed: usize,
}

impl GridWorld {
    /// Create a grid world from a validated layout
    pub fn new(config: GridConfig) -> Result<Self> {
        let initial = config.layout()?;
        let (x, y) = (config.start / config.height, config.start % config.height);
        Ok(Self {
            tiles: initial.clone(),
            initial,
            config,
            x,
            y,
            episodes_completed: 0,
        })
    }

    /// Layout and rewards in use
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Tile index under the mouse
    #[must_use]
    pub fn position(&self) -> TileIndex {
        self.index_of(self.x, self.y)
    }

    /// Current contents of `tile`
    #[must_use]
    pub fn tile(&self, tile: TileIndex) -> Option<Tile> {
        self.tiles.get(tile.get()).copied()
    }

    /// Number of tiles
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Episodes ended by a trap or the big cheese
    #[must_use]
    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Print one character per tile: the tile symbol for traps and the big
    /// cheese, otherwise the arrow `policy` picks there (`·` when it has
    /// no opinion).
    pub fn policy_map<F>(&self, policy: F) -> String
    where
        F: Fn(TileIndex) -> Option<DiscreteAction>,
    {
        let mut out = String::new();
        for y in 0..self.config.height {
            for x in 0..self.config.width {
                let index = self.index_of(x, y);
                let tile = self.initial[index.get()];
                let symbol = if tile.is_terminal() {
                    tile.symbol()
                } else {
                    policy(index)
                        .and_then(Move::from_action)
                        .map_or('·', Move::arrow)
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }

    fn index_of(&self, x: usize, y: usize) -> TileIndex {
        TileIndex(x * self.config.height + y)
    }

    fn restore(&mut self) {
        self.tiles.clone_from(&self.initial);
        self.x = self.config.start / self.config.height;
        self.y = self.config.start % self.config.height;
    }

    fn apply_move(&mut self, mv: Move) -> bool {
        match mv {
            Move::Up if self.y > 0 => self.y -= 1,
            Move::Down if self.y + 1 < self.config.height => self.y += 1,
            Move::Left if self.x > 0 => self.x -= 1,
            Move::Right if self.x + 1 < self.config.width => self.x += 1,
            _ => return false,
        }
        true
    }
}

#[async_trait]
impl Environment for GridWorld {
    type State = TileIndex;

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace { n: Move::ALL.len() }
    }

    async fn reset(&mut self) -> Result<(TileIndex, StepInfo)> {
        self.restore();
        Ok((self.position(), StepInfo::default()))
    }

    async fn step(&mut self, action: DiscreteAction) -> Result<Step<TileIndex>> {
        let mv = Move::from_action(action).ok_or(RlError::InvalidAction {
            action: action.index(),
            action_count: Move::ALL.len(),
        })?;
        let moved = self.apply_move(mv);
        let here = self.position();
        let tile = self.tiles[here.get()];
        let reward = self.config.rewards.for_tile(tile);
        trace!(?mv, moved, tile = tile.name(), reward, position = here.get(), "grid step");

        let info = StepInfo::default()
            .with("tile", tile.name())
            .with("moved", moved);

        let done = tile.is_terminal();
        if done {
            self.episodes_completed += 1;
            debug!(
                tile = tile.name(),
                episodes = self.episodes_completed,
                "episode ended, resetting grid"
            );
            self.restore();
        } else if tile == Tile::Cheese {
            self.tiles[here.get()] = Tile::Empty;
        }

        Ok(Step {
            state: self.position(),
            reward: Reward(reward),
            done,
            truncated: false,
            info,
        })
    }

    async fn render(&self) -> Result<()> {
        if enabled!(Level::DEBUG) {
            let grid = self.to_string();
            debug!("\n{grid}");
        }
        Ok(())
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.config.height {
            for x in 0..self.config.width {
                let symbol = if (x, y) == (self.x, self.y) {
                    'M'
                } else {
                    self.tiles[self.index_of(x, y).get()].symbol()
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> GridWorld {
        GridWorld::new(GridConfig::default()).unwrap()
    }

    async fn walk(world: &mut GridWorld, moves: &[Move]) -> Vec<Step<TileIndex>> {
        let mut steps = Vec::new();
        for mv in moves {
            steps.push(world.step(mv.action()).await.unwrap());
        }
        steps
    }

    #[test]
    fn test_default_layout() {
        let world = world();
        assert_eq!(world.tile_count(), 36);
        assert_eq!(world.position(), TileIndex(0));
        assert_eq!(world.tile(TileIndex(15)), Some(Tile::Cheese));
        assert_eq!(world.tile(TileIndex(22)), Some(Tile::Trap));
        assert_eq!(world.tile(TileIndex(35)), Some(Tile::BigCheese));
        assert_eq!(world.tile(TileIndex(36)), None);
    }

    #[test]
    fn test_display_matches_layout() {
        let expected = "\
M.....
.X.c..
.....X
X.c...
...X..
X.cc.C
";
        assert_eq!(world().to_string(), expected);
    }

    #[tokio::test]
    async fn test_walls_block_movement() {
        let mut world = world();
        let steps = walk(&mut world, &[Move::Up, Move::Left]).await;
        for step in &steps {
            assert_eq!(step.state, TileIndex(0));
            assert_eq!(step.reward, Reward(0.0));
            assert!(!step.done);
            assert_eq!(step.info.get("moved"), Some(&serde_json::json!(false)));
        }
    }

    #[tokio::test]
    async fn test_moves_follow_tile_numbering() {
        let mut world = world();
        let path = [Move::Right, Move::Right, Move::Down, Move::Up, Move::Left, Move::Down];
        let steps = walk(&mut world, &path).await;
        let states: Vec<_> = steps.iter().map(|s| s.state.get()).collect();
        assert_eq!(states, vec![6, 12, 13, 12, 6, 0]);
        // tile 7 is a trap: the world resets in the same step
        assert!(steps[5].done);
        assert_eq!(world.position(), TileIndex(0));
    }

    #[tokio::test]
    async fn test_trap_ends_episode_and_resets() {
        let mut world = world();
        let steps = walk(&mut world, &[Move::Down, Move::Down, Move::Down]).await;
        let last = steps.last().unwrap();
        assert!(last.done);
        assert!(!last.truncated);
        assert_eq!(last.reward, Reward(-100.0));
        assert_eq!(last.state, TileIndex(0));
        assert_eq!(last.info.get("tile"), Some(&serde_json::json!("trap")));
        assert_eq!(world.position(), TileIndex(0));
        assert_eq!(world.episodes_completed(), 1);
    }

    #[tokio::test]
    async fn test_cheese_is_eaten_once() {
        let mut world = world();
        // (0,0) -> (2,0) -> (2,3): tile 15 is cheese
        let path = [Move::Right, Move::Right, Move::Down, Move::Down, Move::Down];
        let steps = walk(&mut world, &path).await;
        let last = steps.last().unwrap();
        assert_eq!(last.state, TileIndex(15));
        assert_eq!(last.reward, Reward(1.0));
        assert!(!last.done);
        assert_eq!(world.tile(TileIndex(15)), Some(Tile::Empty));

        let back = walk(&mut world, &[Move::Up, Move::Down]).await;
        assert_eq!(back[1].state, TileIndex(15));
        assert_eq!(back[1].reward, Reward(0.0));

        world.reset().await.unwrap();
        assert_eq!(world.tile(TileIndex(15)), Some(Tile::Cheese));
    }

    #[tokio::test]
    async fn test_big_cheese_pays_and_resets() {
        let config = GridConfig {
            width: 2,
            height: 1,
            cheese: vec![],
            traps: vec![],
            big_cheese: vec![1],
            ..GridConfig::default()
        };
        let mut world = GridWorld::new(config).unwrap();
        let step = world.step(Move::Right.action()).await.unwrap();
        assert!(step.done);
        assert_eq!(step.reward, Reward(100.0));
        assert_eq!(step.state, TileIndex(0));
    }

    #[tokio::test]
    async fn test_invalid_action_rejected() {
        let mut world = world();
        assert!(matches!(
            world.step(DiscreteAction(4)).await,
            Err(RlError::InvalidAction {
                action: 4,
                action_count: 4,
            })
        ));
        assert_eq!(world.position(), TileIndex(0));
    }

    #[test]
    fn test_layout_validation() {
        let out_of_range = GridConfig {
            traps: vec![36],
            ..GridConfig::default()
        };
        assert!(matches!(
            GridWorld::new(out_of_range),
            Err(RlError::InvalidConfiguration(_))
        ));

        let overlapping = GridConfig {
            cheese: vec![3],
            ..GridConfig::default()
        };
        assert!(GridWorld::new(overlapping).is_err());

        let empty = GridConfig {
            width: 0,
            ..GridConfig::default()
        };
        assert!(GridWorld::new(empty).is_err());

        let overflowing = GridConfig {
            width: usize::MAX,
            height: 2,
            ..GridConfig::default()
        };
        assert!(matches!(
            GridWorld::new(overflowing),
            Err(RlError::InvalidConfiguration(_))
        ));

        let oversized = GridConfig {
            width: MAX_TILES,
            height: 2,
            cheese: vec![],
            traps: vec![],
            big_cheese: vec![],
            ..GridConfig::default()
        };
        assert!(matches!(
            GridWorld::new(oversized),
            Err(RlError::InvalidConfiguration(_))
        ));

        let at_limit = GridConfig {
            width: MAX_TILES,
            height: 1,
            cheese: vec![],
            traps: vec![],
            big_cheese: vec![],
            ..GridConfig::default()
        };
        assert_eq!(GridWorld::new(at_limit).unwrap().tile_count(), MAX_TILES);

        let start_on_trap = GridConfig {
            start: 3,
            ..GridConfig::default()
        };
        assert!(GridWorld::new(start_on_trap).is_err());
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: GridConfig =
            serde_json::from_str(r#"{ "traps": [4], "rewards": { "trap": -10.0 } }"#).unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.traps, vec![4]);
        assert_eq!(config.rewards.trap, -10.0);
        assert_eq!(config.rewards.big_cheese, 100.0);
    }

    #[test]
    fn test_policy_map() {
        let world = world();
        let map = world.policy_map(|tile| (tile.get() == 0).then_some(Move::Down.action()));
        let first_line = map.lines().next().unwrap();
        assert_eq!(first_line, "↓·····");
        assert!(map.lines().nth(5).unwrap().ends_with('C'));
    }
}
