use std::ops::{Add, Sub};
use std::str::FromStr;

use super::*;
use crate::error::DeckError;

// 牌の集合
// 比較は多重集合として行い,反復やindexアクセスは格納順に従う
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Deck {
    tiles: Vec<Tile>,
    sorted: bool, // trueの場合,変更操作の度に並び替えを行う
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            sorted: false,
        }
    }

    pub fn from_ids(ids: &[TileId]) -> Result<Self, DeckError> {
        let tiles = ids
            .iter()
            .map(|&id| Tile::new(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_tiles(tiles))
    }

    // "055m123p78889s113z" や "0m5m5m1p2p3p" の形式を右から順に解析
    // 数字はその右側で最も近い牌種の文字に属する
    pub fn parse(exp: &str) -> Result<Self, DeckError> {
        let mut tiles = vec![];
        let mut suit = None;
        for c in exp.chars().rev() {
            match c {
                'm' | 'p' | 's' | 'z' => suit = Some(c),
                '0'..='9' => {
                    let s = suit.ok_or_else(|| DeckError::Format(exp.to_string()))?;
                    tiles.push(Tile::from_symbol(&format!("{}{}", c, s))?);
                }
                _ => return Err(DeckError::Format(exp.to_string())),
            }
        }
        tiles.sort();
        Ok(Self::from_tiles(tiles))
    }

    // 常に並び替えられた状態を保つモードに変更
    pub fn into_sorted(mut self) -> Self {
        self.sorted = true;
        self.sort();
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Tile> {
        self.tiles.get(index).copied()
    }

    #[inline]
    pub fn last(&self) -> Option<Tile> {
        self.tiles.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    pub fn ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|t| t.id()).collect()
    }

    pub fn sort(&mut self) {
        self.tiles.sort();
    }

    pub fn push(&mut self, t: Tile) {
        self.tiles.push(t);
        if self.sorted {
            self.sort();
        }
    }

    pub fn pop(&mut self) -> Option<Tile> {
        let t = self.tiles.pop();
        if self.sorted {
            self.sort();
        }
        t
    }

    pub fn extend(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        self.tiles.extend(tiles);
        if self.sorted {
            self.sort();
        }
    }

    // 格納順で最初に一致した1枚を削除
    pub fn remove(&mut self, t: Tile) -> Result<(), DeckError> {
        let i = self
            .tiles
            .iter()
            .position(|&x| x == t)
            .ok_or(DeckError::NotFound(t))?;
        self.tiles.remove(i);
        Ok(())
    }

    #[inline]
    pub fn contains(&self, t: Tile) -> bool {
        self.tiles.contains(&t)
    }

    // 赤5と通常の5は区別する
    pub fn count(&self, t: Tile) -> usize {
        self.tiles.iter().filter(|&&x| x == t).count()
    }

    // 赤5と通常の5を区別しない
    pub fn count_kind(&self, t: Tile) -> usize {
        let k = t.kind_index();
        self.tiles.iter().filter(|x| x.kind_index() == k).count()
    }

    // 34種の枚数配列 (赤5は通常の5に含む)
    pub fn to_34_array(&self) -> [usize; KIND] {
        let mut arr = [0; KIND];
        for t in &self.tiles {
            arr[t.kind_index()] += 1;
        }
        arr
    }

    // 各牌に136枚中のindexを割り当てる (格納順)
    // 同種の4枚は kind*4..kind*4+4 を使用し,赤5は先頭の枠から,通常の5は末尾の枠から埋める
    // (赤5の枚数によらず通常の5が赤5の枠に入らない)
    pub fn instances(&self) -> Vec<usize> {
        let mut reds = [0; KIND];
        let mut plains = [0; KIND];
        for t in &self.tiles {
            if t.is_red() {
                reds[t.kind_index()] += 1;
            } else {
                plains[t.kind_index()] += 1;
            }
        }

        let mut next_red = [0; KIND];
        let mut next_plain = [0; KIND];
        for k in 0..KIND {
            let t = Tile::from_kind(k);
            if t.is_suit() && t.rank() == 5 {
                next_plain[k] = TILE.saturating_sub(plains[k]);
            }
        }

        self.tiles
            .iter()
            .map(|t| {
                let k = t.kind_index();
                let slot = if t.is_red() {
                    next_red[k] += 1;
                    next_red[k] - 1
                } else {
                    next_plain[k] += 1;
                    next_plain[k] - 1
                };
                k * TILE + slot.min(TILE - 1)
            })
            .collect()
    }

    // 136枚表現 (昇順)
    pub fn to_136_array(&self) -> Vec<usize> {
        let mut v = self.instances();
        v.sort_unstable();
        v
    }

    // 牌種ごとに数字をまとめた表現 "055m123p"
    pub fn compact_string(&self) -> String {
        let mut s = String::new();
        for ti in 0..TYPE {
            let digits: String = self
                .tiles
                .iter()
                .filter(|t| t.ti() == ti)
                .map(|t| char::from(b'0' + t.ni() as u8))
                .collect();
            if !digits.is_empty() {
                s.push_str(&digits);
                s.push(['m', 'p', 's', 'z'][ti]);
            }
        }
        s
    }

    pub fn unicode_string(&self) -> String {
        self.tiles.iter().map(|t| t.unicode()).collect()
    }

    fn sorted_ids(&self) -> Vec<TileId> {
        let mut v = self.ids();
        v.sort_unstable();
        v
    }
}

impl PartialEq for Deck {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted_ids() == other.sorted_ids()
    }
}

impl Eq for Deck {}

impl FromStr for Deck {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<Tile>> for Deck {
    fn from(tiles: Vec<Tile>) -> Self {
        Self::from_tiles(tiles)
    }
}

impl From<Deck> for Vec<Tile> {
    fn from(deck: Deck) -> Self {
        deck.tiles
    }
}

impl FromIterator<Tile> for Deck {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Self::from_tiles(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

impl std::ops::Index<usize> for Deck {
    type Output = Tile;

    fn index(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.tiles {
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

// 和集合 (末尾に連結)
impl Add for Deck {
    type Output = Deck;

    fn add(mut self, rhs: Deck) -> Deck {
        self.extend(rhs.tiles);
        self
    }
}

// 差集合 右辺に含まれ左辺に存在しない牌は無視
impl Sub for Deck {
    type Output = Deck;

    fn sub(mut self, rhs: Deck) -> Deck {
        for t in rhs.tiles {
            let _ = self.remove(t);
        }
        self
    }
}

// 牌1枚の削除 存在しない場合はエラー
impl Sub<Tile> for Deck {
    type Output = Result<Deck, DeckError>;

    fn sub(mut self, rhs: Tile) -> Result<Deck, DeckError> {
        self.remove(rhs)?;
        Ok(self)
    }
}

#[cfg(test)]
fn deck(s: &str) -> Deck {
    Deck::parse(s).unwrap()
}

#[test]
fn test_deck_basic() {
    let d = deck("19m19s19p1234567z7p").into_sorted();
    assert_eq!(d.to_string(), "1m9m1p7p9p1s9s1z2z3z4z5z6z7z");
    let d = deck("31m29s1p4m4z1z7m7z2m2m3m2p3z").into_sorted();
    assert_eq!(d.to_string(), "1m2m2m3m3m4m7m1p2p2s9s1z3z4z7z");
    assert_eq!(deck("055m123p78889s113z"), deck("0m5m5m1p2p3p7s8s8s8s9s1z1z3z"));
}

#[test]
fn test_deck_empty() {
    let d = Deck::new();
    assert_eq!(d.to_string(), "");
    assert_eq!(d.unicode_string(), "");
    assert_eq!(d.compact_string(), "");
    assert!(d.is_empty());
}

#[test]
fn test_deck_parse_error() {
    assert!(matches!(Deck::parse("123"), Err(DeckError::Format(_))));
    assert!(matches!(Deck::parse("12m3"), Err(DeckError::Format(_))));
    assert!(matches!(Deck::parse("12x"), Err(DeckError::Format(_))));
    assert!(matches!(Deck::parse("8z"), Err(DeckError::Tile(_))));
}

#[test]
fn test_deck_eq_add_sub() {
    assert_eq!(deck("1m1p13s1z2s"), deck("1m1z1p123s"));
    assert_ne!(deck("1m1p"), deck("1m1p1p"));

    let d = deck("1m1p1s1z");
    let sum = d.clone() + d.clone();
    assert_eq!(sum, deck("1m1m1p1p1s1s1z1z"));
    assert_eq!(sum.to_string(), "1m1p1s1z1m1p1s1z");

    let mut d = deck("1m1p1s1z");
    assert_eq!(d.pop(), Tile::from_symbol("1z").ok());
    assert_eq!(d.clone() - deck("1m1s1z"), deck("1p"));
    assert!((d.clone() - Tile::from_symbol("9m").unwrap()).is_err());
    assert_eq!((d - Tile::from_symbol("1p").unwrap()).unwrap(), deck("1m1s"));
}

#[test]
fn test_deck_sorted_mode() {
    let mut d = deck("123m").into_sorted();
    d.push(Tile::from_symbol("1p").unwrap());
    d.push(Tile::from_symbol("0m").unwrap());
    assert_eq!(d.to_string(), "1m2m3m0m1p");
    d.remove(Tile::from_symbol("2m").unwrap()).unwrap();
    assert_eq!(d.to_string(), "1m3m0m1p");
    assert!(matches!(
        d.remove(Tile::from_symbol("2m").unwrap()),
        Err(DeckError::NotFound(_))
    ));
}

#[test]
fn test_deck_arrays() {
    let d = deck("055m1z");
    let arr = d.to_34_array();
    assert_eq!(arr[4], 3);
    assert_eq!(arr[27], 1);
    assert_eq!(d.to_136_array(), vec![16, 18, 19, 108]);
    assert_eq!(d.instances(), vec![16, 18, 19, 108]);

    let d = deck("5555m");
    assert_eq!(d.to_136_array(), vec![16, 17, 18, 19]);
    let d = deck("0p") + deck("5p");
    assert_eq!(d.instances(), vec![52, 55]);
}

#[test]
fn test_deck_compact_roundtrip() {
    for s in ["055m123p78889s113z", "19m19p19s1234567z", "3m2m1m0p"] {
        let d = deck(s);
        assert_eq!(deck(&d.compact_string()), d);
    }
    assert_eq!(deck("0m5m5m1z").compact_string(), "055m1z");
}
