use std::cmp::Ordering;
use std::str::FromStr;

use super::*;
use crate::error::TileError;

// 有効な牌ID (0は「牌なし」を表す番兵)
pub const VALID_IDS: [TileId; 38] = [
    0, //
    11, 12, 13, 14, 15, 16, 17, 18, 19, // 萬子
    21, 22, 23, 24, 25, 26, 27, 28, 29, // 筒子
    31, 32, 33, 34, 35, 36, 37, 38, 39, // 索子
    41, 42, 43, 44, 45, 46, 47, // 字牌
    51, 52, 53, // 赤5
];

pub const NO_TILE: Tile = Tile(0);

const SUITS: [char; TYPE] = ['m', 'p', 's', 'z'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tile(TileId);

impl Tile {
    pub fn new(id: TileId) -> Result<Self, TileError> {
        if VALID_IDS.contains(&id) {
            Ok(Self(id))
        } else {
            Err(TileError::InvalidId(id))
        }
    }

    // "1m", "0p"(赤5), "7z" など
    pub fn from_symbol(s: &str) -> Result<Self, TileError> {
        let err = || TileError::InvalidSymbol(s.to_string());
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(err());
        }
        let ni = chars[0].to_digit(10).ok_or_else(err)? as usize;
        let ti = SUITS.iter().position(|&c| c == chars[1]).ok_or_else(err)?;
        let valid = match ti {
            TZ => (1..=DR).contains(&ni),
            _ => ni <= 9,
        };
        if !valid {
            return Err(err());
        }
        Ok(Self::from_index(ti, ni))
    }

    // 種別と数字のindexから生成 (ni=0は赤5)
    // 範囲外のindexを渡さないこと
    #[inline]
    pub fn from_index(ti: Type, ni: Tnum) -> Self {
        if ni == 0 {
            Self(51 + ti as TileId)
        } else {
            Self(((ti + 1) * 10 + ni) as TileId)
        }
    }

    // 34種のindex (0~33) から生成 赤5は返さない
    #[inline]
    pub fn from_kind(kind: usize) -> Self {
        Self::from_index(kind / 9, kind % 9 + 1)
    }

    #[inline]
    pub fn id(&self) -> TileId {
        self.0
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    // 牌種 (0:萬子, 1:筒子, 2:索子, 3:字牌)
    #[inline]
    pub fn ti(&self) -> Type {
        if self.is_red() {
            (self.0 - 51) as Type
        } else {
            (self.0 / 10) as Type - 1
        }
    }

    // 数字部分 赤5は0
    #[inline]
    pub fn ni(&self) -> Tnum {
        if self.is_red() {
            0
        } else {
            (self.0 % 10) as Tnum
        }
    }

    // 赤5は5を返却
    #[inline]
    pub fn rank(&self) -> Tnum {
        if self.is_red() {
            5
        } else {
            (self.0 % 10) as Tnum
        }
    }

    pub fn suit(&self) -> &'static str {
        if self.is_none() {
            return "";
        }
        ["m", "p", "s", "z"][self.ti()]
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.0 > 50
    }

    // 赤5の場合,通常の5を返却. それ以外の場合はコピーをそのまま返却.
    #[inline]
    pub fn to_normal(self) -> Self {
        if self.is_red() {
            Self((self.0 - 50) * 10 + 5)
        } else {
            self
        }
    }

    // 数牌
    #[inline]
    pub fn is_suit(&self) -> bool {
        !self.is_none() && self.ti() != TZ
    }

    // 字牌
    #[inline]
    pub fn is_honor(&self) -> bool {
        !self.is_none() && self.ti() == TZ
    }

    // 1,9牌
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.is_suit() && (self.rank() == 1 || self.rank() == 9)
    }

    // 么九牌
    #[inline]
    pub fn is_end(&self) -> bool {
        self.is_honor() || self.is_terminal()
    }

    // 赤5を区別しない34種のindex (0~33)
    #[inline]
    pub fn kind_index(&self) -> usize {
        self.ti() * 9 + self.rank() - 1
    }

    pub fn name(&self) -> String {
        if self.is_none() {
            return String::new();
        }
        format!("{}{}", self.ni(), SUITS[self.ti()])
    }

    pub fn unicode(&self) -> char {
        if self.is_none() {
            return ' ';
        }
        let code = match self.ti() {
            TM => 0x1F007 + self.rank() as u32 - 1,
            TS => 0x1F010 + self.rank() as u32 - 1,
            TP => 0x1F019 + self.rank() as u32 - 1,
            _ => [0x1F000, 0x1F001, 0x1F002, 0x1F003, 0x1F006, 0x1F005, 0x1F004][self.rank() - 1],
        };
        char::from_u32(code).unwrap_or(' ')
    }

    // 並び替え用のキー 赤5は4.5として扱う
    #[inline]
    fn sort_key(&self) -> (usize, usize) {
        if self.is_none() {
            return (0, 0);
        }
        let n = if self.is_red() { 9 } else { self.rank() * 2 };
        (self.ti() + 1, n)
    }
}

impl Default for Tile {
    fn default() -> Self {
        NO_TILE
    }
}

impl TryFrom<u8> for Tile {
    type Error = TileError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Tile> for u8 {
    fn from(t: Tile) -> Self {
        t.0
    }
}

impl FromStr for Tile {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[test]
fn test_tile_basic() {
    let t = Tile::new(15).unwrap();
    assert_eq!(t, Tile::from_symbol("5m").unwrap());
    assert_eq!(t.to_string(), "5m");
    assert_eq!(t.rank(), 5);
    assert_eq!(t.suit(), "m");
    assert!(!t.is_red());

    let r = Tile::from_symbol("0s").unwrap();
    assert_eq!(r.id(), 53);
    assert_eq!(r.rank(), 5);
    assert_eq!(r.suit(), "s");
    assert!(r.is_red());
    assert_ne!(r, Tile::new(35).unwrap());
    assert_eq!(r.to_normal(), Tile::new(35).unwrap());
    assert_eq!(Tile::new(52).unwrap().to_normal().id(), 25);

    assert_eq!(NO_TILE.suit(), "");
    assert_eq!(NO_TILE.name(), "");
}

#[test]
fn test_tile_invalid() {
    assert_eq!(Tile::new(10), Err(TileError::InvalidId(10)));
    assert_eq!(Tile::new(48), Err(TileError::InvalidId(48)));
    assert!(Tile::from_symbol("8z").is_err());
    assert!(Tile::from_symbol("0z").is_err());
    assert!(Tile::from_symbol("1x").is_err());
    assert!(Tile::from_symbol("11m").is_err());
    assert!(serde_json::from_str::<Tile>("20").is_err());
}

#[test]
fn test_tile_name_roundtrip() {
    for &id in &VALID_IDS[1..] {
        let t = Tile::new(id).unwrap();
        assert_eq!(Tile::from_symbol(&t.name()).unwrap(), t);
    }
}

#[test]
fn test_tile_order_and_index() {
    let r = Tile::new(51).unwrap();
    let t4 = Tile::new(14).unwrap();
    let t5 = Tile::new(15).unwrap();
    assert!(t4 < r && r < t5);
    assert!(Tile::new(19).unwrap() < Tile::new(21).unwrap());

    assert_eq!(Tile::new(11).unwrap().kind_index(), 0);
    assert_eq!(r.kind_index(), 4);
    assert_eq!(Tile::new(47).unwrap().kind_index(), 33);
    for k in 0..KIND {
        assert_eq!(Tile::from_kind(k).kind_index(), k);
    }
}

#[test]
fn test_tile_unicode() {
    assert_eq!(Tile::new(33).unwrap().unicode(), '\u{1F012}');
    assert_eq!(Tile::from_symbol("5z").unwrap().unicode(), '\u{1F006}');
    assert_eq!(Tile::from_symbol("7z").unwrap().unicode(), '\u{1F004}');
}
