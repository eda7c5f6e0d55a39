use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::WallError;
use crate::model::*;
use crate::util::misc::unixtime_now;

const N_DORA: usize = 5;
const N_REPLACEMENT: usize = 4;
const DEAD_WALL: usize = N_DORA * 2 + N_REPLACEMENT; // 王牌

// 牌山
// 元の並び(保存形式)の先頭から 配牌(13枚x4) | ツモ山(70枚) | ドラ表示牌(5) | 裏ドラ表示牌(5) | 嶺上牌(4)
// ツモ山と嶺上牌は先頭から順にツモる
#[derive(Debug, Clone)]
pub struct Wall {
    tiles: Vec<Tile>,
    hands: [Vec<Tile>; SEAT],
    mountain: Vec<Tile>,     // 末尾が次のツモ
    replacements: Vec<Tile>, // 末尾が次の嶺上牌
    dora_indicators: Vec<Tile>,
    ura_dora_indicators: Vec<Tile>,
}

// ルールに従った136枚の牌 (並びは固定)
pub fn create_tiles(rule: &Rule) -> Result<Vec<Tile>, WallError> {
    if rule.players != SEAT {
        return Err(WallError::NotImplemented(rule.players));
    }
    let reds: [usize; 3] = match rule.red_dora {
        0 => [0, 0, 0],
        3 => [1, 1, 1],
        4 => [1, 2, 1],
        n => return Err(WallError::RedDora(n)),
    };

    let mut tiles = Vec::with_capacity(WALL_SIZE);
    for ti in 0..TYPE {
        for ni in 1..TNUM {
            if ti == TZ && ni > DR {
                break;
            }
            for n in 0..TILE {
                let ni2 = if ti != TZ && ni == 5 && n < reds[ti] {
                    0 // 赤5
                } else {
                    ni
                };
                tiles.push(Tile::from_index(ti, ni2));
            }
        }
    }
    Ok(tiles)
}

impl Wall {
    // seedがNoneの場合は現在時刻を使用
    pub fn new(rule: &Rule, seed: Option<u64>) -> Result<Self, WallError> {
        let seed = seed.unwrap_or_else(|| unixtime_now() as u64);
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(rule, &mut rng)
    }

    pub fn with_rng<R: Rng>(rule: &Rule, rng: &mut R) -> Result<Self, WallError> {
        let mut tiles = create_tiles(rule)?;
        tiles.shuffle(rng);
        Self::from_tiles(tiles)
    }

    // シャッフルせずにそのままの並びで分割
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self, WallError> {
        if tiles.len() != WALL_SIZE {
            return Err(WallError::Length(tiles.len()));
        }

        let n_hand = HAND_SIZE * SEAT;
        let dead = WALL_SIZE - DEAD_WALL;
        let mut hands: [Vec<Tile>; SEAT] = Default::default();
        for (s, h) in hands.iter_mut().enumerate() {
            *h = tiles[s * HAND_SIZE..(s + 1) * HAND_SIZE].to_vec();
        }
        let mountain = tiles[n_hand..dead].iter().rev().copied().collect();
        let dora_indicators = tiles[dead..dead + N_DORA].to_vec();
        let ura_dora_indicators = tiles[dead + N_DORA..dead + N_DORA * 2].to_vec();
        let replacements = tiles[dead + N_DORA * 2..].iter().rev().copied().collect();

        Ok(Self {
            tiles,
            hands,
            mountain,
            replacements,
            dora_indicators,
            ura_dora_indicators,
        })
    }

    pub fn from_ids(ids: &[TileId]) -> Result<Self, WallError> {
        let tiles = ids
            .iter()
            .map(|&id| Tile::new(id))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tiles(tiles)
    }

    pub fn from_json(json: &str) -> Result<Self, WallError> {
        let ids: Vec<TileId> = serde_json::from_str(json)?;
        Self::from_ids(&ids)
    }

    pub fn to_json(&self) -> Result<String, WallError> {
        Ok(serde_json::to_string(&self.ids())?)
    }

    pub fn load(path: &str) -> Result<Self, WallError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &str) -> Result<(), WallError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    // 元の並びの136枚
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|t| t.id()).collect()
    }

    pub fn to_deck(&self) -> Deck {
        Deck::from_tiles(self.tiles.clone())
    }

    pub fn starting_hand(&self, seat: Seat) -> Deck {
        Deck::from_tiles(self.hands[seat].clone()).into_sorted()
    }

    // 表示済みの枚数分のドラ表示牌
    pub fn dora_indicators(&self, revealed: usize) -> &[Tile] {
        &self.dora_indicators[..revealed.min(N_DORA)]
    }

    pub fn ura_dora_indicators(&self, revealed: usize) -> &[Tile] {
        &self.ura_dora_indicators[..revealed.min(N_DORA)]
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Tile> {
        self.mountain.pop()
    }

    #[inline]
    pub fn pop_replacement(&mut self) -> Option<Tile> {
        self.replacements.pop()
    }

    #[inline]
    pub fn tiles_left(&self) -> usize {
        self.mountain.len()
    }

    #[inline]
    pub fn replacements_left(&self) -> usize {
        self.replacements.len()
    }
}

#[test]
fn test_wall_partition() {
    let rule = Rule::default();
    let mut wall = Wall::new(&rule, Some(1)).unwrap();
    assert_eq!(wall.tiles().len(), WALL_SIZE);
    assert_eq!(wall.tiles_left(), 70);
    assert_eq!(wall.replacements_left(), 4);
    assert_eq!(wall.dora_indicators(5).len(), 5);
    assert_eq!(wall.dora_indicators(1).len(), 1);
    assert_eq!(wall.starting_hand(3).len(), 13);
    assert_eq!(wall.starting_hand(3).tiles(), Deck::from_tiles(wall.tiles()[39..52].to_vec()).into_sorted().tiles());

    let t = wall.tiles()[52];
    assert_eq!(wall.pop(), Some(t));
    assert_eq!(wall.tiles_left(), 69);
    assert_eq!(wall.pop_replacement(), Some(wall.tiles()[132]));

    // 各部分の合計が元の牌と一致
    let mut all = Deck::new();
    for s in 0..SEAT {
        all = all + wall.starting_hand(s);
    }
    let mut wall = Wall::new(&rule, Some(1)).unwrap();
    while let Some(t) = wall.pop() {
        all.push(t);
    }
    while let Some(t) = wall.pop_replacement() {
        all.push(t);
    }
    all.extend(wall.dora_indicators(5).iter().copied());
    all.extend(wall.ura_dora_indicators(5).iter().copied());
    assert_eq!(all, wall.to_deck());
}

#[test]
fn test_wall_deterministic() {
    let rule = Rule::default();
    let w1 = Wall::new(&rule, Some(42)).unwrap();
    let w2 = Wall::new(&rule, Some(42)).unwrap();
    assert_eq!(w1.ids(), w2.ids());
    for s in 0..SEAT {
        assert_eq!(w1.starting_hand(s), w2.starting_hand(s));
    }
    let w3 = Wall::new(&rule, Some(43)).unwrap();
    assert_ne!(w1.ids(), w3.ids());
}

#[test]
fn test_wall_red_dora() {
    let count_red = |n: usize| {
        let rule = Rule {
            red_dora: n,
            ..Default::default()
        };
        create_tiles(&rule)
            .unwrap()
            .iter()
            .filter(|t| t.is_red())
            .count()
    };
    assert_eq!(count_red(0), 0);
    assert_eq!(count_red(3), 3);
    assert_eq!(count_red(4), 4);

    let rule = Rule {
        red_dora: 2,
        ..Default::default()
    };
    assert!(matches!(Wall::new(&rule, Some(0)), Err(WallError::RedDora(2))));
    let rule = Rule {
        players: 3,
        ..Default::default()
    };
    assert!(matches!(Wall::new(&rule, Some(0)), Err(WallError::NotImplemented(3))));
}

#[test]
fn test_wall_json() {
    let w1 = Wall::new(&Rule::default(), Some(7)).unwrap();
    let json = w1.to_json().unwrap();
    let w2 = Wall::from_json(&json).unwrap();
    assert_eq!(w1.ids(), w2.ids());
    assert_eq!(w1.dora_indicators(5), w2.dora_indicators(5));

    assert!(matches!(Wall::from_ids(&[11, 12]), Err(WallError::Length(2))));
    assert!(matches!(Wall::from_json("[11, 10]"), Err(WallError::Tile(_))));
    assert!(matches!(Wall::from_json("{"), Err(WallError::Json(_))));
}
