use serde::{Deserialize, Serialize};

use crate::model::*;

// [和了形]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinShape {
    Ordinary,        // 4面子1雀頭
    ThirteenOrphans, // 国士無双
    SevenPairs,      // 七対子
}

impl WinShape {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::ThirteenOrphans => "kokushi_musou",
            Self::SevenPairs => "chiitoitsu",
        }
    }
}

impl std::fmt::Display for WinShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

type Counts = [usize; KIND];

// 赤5は通常の5として集計
fn to_counts(tiles: &[Tile]) -> Counts {
    let mut c = [0; KIND];
    for t in tiles {
        c[t.kind_index()] += 1;
    }
    c
}

#[inline]
fn is_orphan_kind(k: usize) -> bool {
    k >= 27 || k % 9 == 0 || k % 9 == 8
}

// [完成形判定]
// tilesは手牌(鳴いた牌を除く), 副露1つにつき手牌は3枚減る
// 通常形は足りない面子を副露済みとみなす (例: "123m456p789s11z")
// 通常形, 国士無双, 七対子の順に判定して最初に一致した形を返却
pub fn is_complete(tiles: &[Tile], calls: &[Meld]) -> Option<WinShape> {
    let n = tiles.len();
    if n % 3 != 2 || n + calls.len() * 3 > 14 {
        return None;
    }

    let c = to_counts(tiles);
    if is_ordinary(&c) {
        return Some(WinShape::Ordinary);
    }
    if calls.is_empty() && n == 14 {
        if is_thirteen_orphans(&c) {
            return Some(WinShape::ThirteenOrphans);
        }
        if is_seven_pairs(&c) {
            return Some(WinShape::SevenPairs);
        }
    }
    None
}

// 雀頭候補 (2枚以上ある牌) を順に外して残りが面子に分解できるかを確認
fn is_ordinary(c: &Counts) -> bool {
    let mut c = *c;
    for k in 0..KIND {
        if c[k] < 2 {
            continue;
        }
        c[k] -= 2;
        let ok = decompose(&mut c, 0);
        c[k] += 2;
        if ok {
            return true;
        }
    }
    false
}

// 残っている最初の牌から刻子(ちょうど3枚の場合のみ), 順子の順で取り除く
fn decompose(c: &mut Counts, start: usize) -> bool {
    let k = match (start..KIND).find(|&k| c[k] != 0) {
        Some(k) => k,
        None => return true,
    };

    if c[k] == 3 {
        c[k] = 0;
        let ok = decompose(c, k);
        c[k] = 3;
        if ok {
            return true;
        }
    }

    // 字牌は順子を構成しない. 9を超える順子もなし
    if k < 27 && k % 9 <= 6 && c[k + 1] != 0 && c[k + 2] != 0 {
        c[k] -= 1;
        c[k + 1] -= 1;
        c[k + 2] -= 1;
        let ok = decompose(c, k);
        c[k] += 1;
        c[k + 1] += 1;
        c[k + 2] += 1;
        if ok {
            return true;
        }
    }

    false
}

fn is_thirteen_orphans(c: &Counts) -> bool {
    let mut n = 0;
    for k in 0..KIND {
        if is_orphan_kind(k) {
            if c[k] == 0 {
                return false;
            }
            n += c[k];
        } else if c[k] != 0 {
            return false;
        }
    }
    n == 14
}

fn is_seven_pairs(c: &Counts) -> bool {
    c.iter().filter(|&&n| n == 2).count() == 7
}

// [聴牌判定]
// 34種の牌をそれぞれ加えて和了形になるものがあるか
pub fn tenpai(tiles: &[Tile], calls: &[Meld]) -> bool {
    !winning_kinds(tiles, calls).is_empty()
}

// 和了牌の一覧 (赤5は含まない)
pub fn winning_kinds(tiles: &[Tile], calls: &[Meld]) -> Vec<Tile> {
    let mut v = tiles.to_vec();
    let mut res = vec![];
    for k in 0..KIND {
        v.push(Tile::from_kind(k));
        if is_complete(&v, calls).is_some() {
            res.push(Tile::from_kind(k));
        }
        v.pop();
    }
    res
}

// [リーチ宣言牌]
// 副露が暗槓のみの場合に,切ると聴牌になる手牌の牌を返却
// 同じ牌が複数ある場合はそれぞれの位置について返却する
pub fn reach_candidates(tiles: &[Tile], calls: &[Meld]) -> Vec<Tile> {
    if calls.iter().any(|m| m.meld_type != MeldType::Ankan) {
        return vec![];
    }

    let mut res = vec![];
    for i in 0..tiles.len() {
        let mut rest = tiles.to_vec();
        let t = rest.remove(i);
        if tenpai(&rest, calls) {
            res.push(t);
        }
    }
    res
}

#[cfg(test)]
fn tiles(s: &str) -> Vec<Tile> {
    Deck::parse(s).unwrap().tiles().to_vec()
}

#[test]
fn test_complete_shapes() {
    assert_eq!(is_complete(&tiles("123m456p789s11122z"), &[]), Some(WinShape::Ordinary));
    assert_eq!(is_complete(&tiles("123m406p789s11122z"), &[]), Some(WinShape::Ordinary));
    assert_eq!(
        is_complete(&tiles("19m19p19s12345677z"), &[]),
        Some(WinShape::ThirteenOrphans)
    );
    assert_eq!(
        is_complete(&tiles("19m19p119s1234567z"), &[]),
        Some(WinShape::ThirteenOrphans)
    );
    assert_eq!(is_complete(&tiles("4477m11889p9p5566z"), &[]), Some(WinShape::SevenPairs));
    assert_eq!(WinShape::SevenPairs.label(), "chiitoitsu");

    assert_eq!(is_complete(&tiles("147m258p369s34567z"), &[]), None);
    assert_eq!(is_complete(&tiles("123m456p789s11z"), &[]), Some(WinShape::Ordinary));
    assert_eq!(is_complete(&tiles("11z"), &[]), Some(WinShape::Ordinary));
    assert_eq!(is_complete(&tiles("123m456p789s1z"), &[]), None); // 雀頭なし
    assert_eq!(is_complete(&tiles("123m456p789s12z"), &[]), None);
    // 副露を含めて14枚を超える
    let calls = vec![Meld::parse("41p4141").unwrap(); 2];
    assert_eq!(is_complete(&tiles("123m456p789s11z"), &calls), None);
}

#[test]
fn test_complete_edge_cases() {
    // 4枚の牌を刻子として使わない
    assert_eq!(is_complete(&tiles("1111m234p567s789s1z"), &[]), None);
    assert_eq!(is_complete(&tiles("111123m456p789s11z"), &[]), Some(WinShape::Ordinary));
    // 同じ牌4枚の七対子は不可
    assert_eq!(is_complete(&tiles("1111m2233p4455s66z"), &[]), None);
    // 字牌の順子は不可, 9を超える順子も不可
    assert_eq!(is_complete(&tiles("123z456m789m123p55s"), &[]), None);
    assert_eq!(is_complete(&tiles("891m456m789p123p55s"), &[]), None);
    // 一盃口形
    assert_eq!(is_complete(&tiles("112233m456p789s55z"), &[]), Some(WinShape::Ordinary));
}

#[test]
fn test_complete_with_calls() {
    let calls = vec![Meld::parse("41p4141").unwrap()];
    assert_eq!(is_complete(&tiles("123m456p789s22z"), &calls), Some(WinShape::Ordinary));
    assert_eq!(is_complete(&tiles("123m456p789s11z"), &calls), Some(WinShape::Ordinary));
    // 副露がある場合は七対子にならない
    assert_eq!(is_complete(&tiles("1122m3344p556s"), &calls), None);
}

#[test]
fn test_tenpai() {
    assert!(tenpai(&tiles("123m456p789s1122z"), &[]));
    assert!(tenpai(&tiles("19m19p19s1234567z"), &[]));
    assert!(!tenpai(&tiles("147m258p369s3456z"), &[]));
    assert_eq!(
        winning_kinds(&tiles("23m456p789s11122z"), &[]),
        vec![Tile::from_symbol("1m").unwrap(), Tile::from_symbol("4m").unwrap()]
    );
    assert_eq!(winning_kinds(&tiles("19m19p19s1234567z"), &[]).len(), 13);
}

#[test]
fn test_reach_candidates() {
    let v = reach_candidates(&tiles("19m19p19s1234567z4m"), &[]);
    assert_eq!(v, vec![Tile::from_symbol("4m").unwrap()]);

    let v = reach_candidates(&tiles("19m19p19s12345677z"), &[]);
    assert_eq!(v.len(), 14);

    assert!(reach_candidates(&tiles("147m258p369s34567z"), &[]).is_empty());

    let v = reach_candidates(&tiles("123m456p789s11225z"), &[]);
    assert_eq!(v, tiles("5z"));

    // 暗槓のみなら可, それ以外の副露があれば不可
    let ankan = vec![Meld::parse("414141a41").unwrap()];
    assert!(!reach_candidates(&tiles("123m456p789s25z"), &ankan).is_empty());
    let pon = vec![Meld::parse("41p4141").unwrap()];
    assert!(reach_candidates(&tiles("123m456p789s25z"), &pon).is_empty());
}
