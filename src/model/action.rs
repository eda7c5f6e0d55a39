use super::*;
use crate::error::ActionError;

// リーチ宣言時にツモ牌をそのまま捨てることを表すID
pub const DRAWN_TILE_ID: TileId = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Noop, // 鳴き,ロンのスキップ

    // 手番の操作
    Ankan,   // 暗槓
    Kakan,   // 加槓
    Discard, // ツモ切り
    Replace, // 手出し (手牌から打牌し,ツモ牌を手牌に加える)
    Reach,   // リーチ
    Tsumo,   // ツモ

    // 他家の打牌に対する操作
    Minkan, // 明槓
    Chii,   // チー
    Pon,    // ポン
    Ron,    // ロン

    // 流局時の宣言
    Ten,   // 聴牌
    Noten, // 不聴
}

impl ActionType {
    #[inline]
    pub fn is_kan(&self) -> bool {
        matches!(self, Self::Ankan | Self::Minkan | Self::Kakan)
    }

    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Chii | Self::Pon | Self::Minkan)
    }
}

// action_stringは2桁の牌IDの列と鳴きの種類を示す1文字の記号で構成される
// 鳴き(ポン,明槓,加槓)の記号の位置は鳴いた牌を捨てた席の相対位置を表す
// (直後の牌が鳴いた牌で,記号の前にある牌の数+1 = 下家:1,対面:2,上家:3)
//   ankan:  "151515a51"   4枚目の前に'a'
//   minkan: "1212m1212"   対面から明槓
//   kakan:  "47k474747"   対面からポンした牌に加槓
//   chii:   "c275226"     鳴いた牌,手牌の2枚
//   pon:    "41p4141"     対面からポン
//   reach:  "r51" (手牌の0mを切ってリーチ), "r60" (ツモ切りリーチ)
//   replace: "41" (手牌の1zを切る)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub action_string: String,
}

impl Action {
    #[inline]
    pub fn new(action_type: ActionType, action_string: impl Into<String>) -> Self {
        Self {
            action_type,
            action_string: action_string.into(),
        }
    }

    #[inline]
    pub fn noop() -> Self {
        Self::new(ActionType::Noop, "")
    }

    #[inline]
    pub fn discard() -> Self {
        Self::new(ActionType::Discard, "")
    }

    #[inline]
    pub fn replace(t: Tile) -> Self {
        Self::new(ActionType::Replace, t.id().to_string())
    }

    // t が NO_TILE の場合はツモ切りリーチ
    pub fn reach(t: Tile) -> Self {
        let id = if t.is_none() { DRAWN_TILE_ID } else { t.id() };
        Self::new(ActionType::Reach, format!("r{}", id))
    }

    #[inline]
    pub fn reach_drawn() -> Self {
        Self::reach(NO_TILE)
    }

    #[inline]
    pub fn tsumo() -> Self {
        Self::new(ActionType::Tsumo, "")
    }

    #[inline]
    pub fn ron() -> Self {
        Self::new(ActionType::Ron, "")
    }

    #[inline]
    pub fn ten() -> Self {
        Self::new(ActionType::Ten, "")
    }

    #[inline]
    pub fn noten() -> Self {
        Self::new(ActionType::Noten, "")
    }

    pub fn ankan(mut tiles: [Tile; 4]) -> Self {
        tiles.sort_by_key(|t| t.id());
        let s = format!(
            "{}{}{}a{}",
            tiles[0].id(),
            tiles[1].id(),
            tiles[2].id(),
            tiles[3].id()
        );
        Self::new(ActionType::Ankan, s)
    }

    // 鳴いた牌の前に'c'
    pub fn chii(called: Tile, mut hand: [Tile; 2]) -> Self {
        hand.sort();
        let s = format!("c{}{}{}", called.id(), hand[0].id(), hand[1].id());
        Self::new(ActionType::Chii, s)
    }

    // rel: 鳴いた牌を捨てた席の相対位置 (下家:1, 対面:2, 上家:3)
    pub fn pon(called: Tile, hand: [Tile; 2], rel: usize) -> Self {
        Self::new(ActionType::Pon, encode_call('p', called, &hand, rel))
    }

    pub fn minkan(called: Tile, hand: [Tile; 3], rel: usize) -> Self {
        Self::new(ActionType::Minkan, encode_call('m', called, &hand, rel))
    }

    // ポンの表記を加槓に変換. 加える牌はポンの最後の牌と同じ牌とする
    // 既に加槓の表記の場合はそのまま
    pub fn kakan(pon_or_kan: &str) -> Result<Self, ActionError> {
        if pon_or_kan.contains('p') {
            let last = pon_or_kan
                .get(pon_or_kan.len().saturating_sub(2)..)
                .ok_or_else(|| ActionError::Malformed(pon_or_kan.to_string()))?;
            Ok(Self::new(
                ActionType::Kakan,
                pon_or_kan.replace('p', "k") + last,
            ))
        } else if pon_or_kan.contains('k') {
            Ok(Self::new(ActionType::Kakan, pon_or_kan))
        } else {
            Err(ActionError::NotPromotable(pon_or_kan.to_string()))
        }
    }

    // 加える牌を明示して加槓 (手牌の赤5を加える場合など)
    pub fn kakan_with(pon: &str, added: Tile) -> Result<Self, ActionError> {
        if !pon.contains('p') {
            return Err(ActionError::NotPromotable(pon.to_string()));
        }
        Ok(Self::new(
            ActionType::Kakan,
            format!("{}{}", pon.replace('p', "k"), added.id()),
        ))
    }

    // action_stringに含まれる牌のリスト
    // 00 または 60 が現れた時点で打ち切る
    pub fn tiles(&self) -> Result<Vec<Tile>, ActionError> {
        decode_tiles(&self.action_string)
    }

    // リーチで手牌から切る牌. ツモ切りリーチの場合はNone
    pub fn reach_tile(&self) -> Result<Option<Tile>, ActionError> {
        Ok(self.tiles()?.first().copied())
    }

    pub fn unicode_string(&self) -> String {
        let mut s = String::new();
        let mut digits = vec![];
        let mut stopped = false;
        for c in self.action_string.chars() {
            if stopped || !c.is_ascii_digit() {
                if !digits.is_empty() {
                    s.extend(digits.drain(..));
                }
                s.push(c);
                continue;
            }
            digits.push(c);
            if digits.len() == 2 {
                let id = (digits[0] as u8 - b'0') * 10 + (digits[1] as u8 - b'0');
                match Tile::new(id) {
                    Ok(t) if !t.is_none() => {
                        s.push(t.unicode());
                        digits.clear();
                    }
                    _ => {
                        stopped = true;
                        s.extend(digits.drain(..));
                    }
                }
            }
        }
        s.extend(digits);

        if self.action_type == ActionType::Replace {
            s
        } else {
            format!("{} {}", self.type_name(), s)
        }
    }

    fn type_name(&self) -> String {
        serde_json::to_value(self.action_type)
            .ok()
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name(), self.action_string)
    }
}

fn encode_call(marker: char, called: Tile, hand: &[Tile], rel: usize) -> String {
    let mut ids: Vec<TileId> = hand.iter().map(|t| t.id()).collect();
    ids.sort_unstable();
    let pos = rel.clamp(1, ids.len() + 1) - 1;
    let mut s = String::new();
    for (i, id) in ids.iter().enumerate() {
        if i == pos {
            s.push(marker);
            s.push_str(&called.id().to_string());
        }
        s.push_str(&id.to_string());
    }
    if pos == ids.len() {
        s.push(marker);
        s.push_str(&called.id().to_string());
    }
    s
}

pub(crate) fn decode_tiles(s: &str) -> Result<Vec<Tile>, ActionError> {
    let digits: Vec<u8> = s
        .bytes()
        .filter(|c| c.is_ascii_digit())
        .map(|c| c - b'0')
        .collect();
    let mut tiles = vec![];
    for pair in digits.chunks(2) {
        if pair.len() != 2 {
            return Err(ActionError::Malformed(s.to_string()));
        }
        let id = pair[0] * 10 + pair[1];
        if id == 0 || id == DRAWN_TILE_ID {
            break;
        }
        tiles.push(Tile::new(id)?);
    }
    Ok(tiles)
}

#[cfg(test)]
fn tile(s: &str) -> Tile {
    Tile::from_symbol(s).unwrap()
}

#[test]
fn test_action_encoding() {
    let t = tile("1z");
    assert_eq!(Action::pon(t, [t, t], 2).action_string, "41p4141");
    assert_eq!(Action::pon(t, [t, t], 1).action_string, "p414141");
    assert_eq!(Action::pon(t, [t, t], 3).action_string, "4141p41");

    let t = tile("2m");
    assert_eq!(Action::minkan(t, [t, t, t], 3).action_string, "1212m1212");
    assert_eq!(Action::ankan([t, t, t, t]).action_string, "121212a12");
    let r = tile("0m");
    let f = tile("5m");
    assert_eq!(Action::ankan([r, f, f, f]).action_string, "151515a51");

    let a = Action::chii(tile("7p"), [tile("6p"), tile("0p")]);
    assert_eq!(a.action_string, "c275226");

    assert_eq!(Action::reach(r).action_string, "r51");
    assert_eq!(Action::reach_drawn().action_string, "r60");
    assert_eq!(Action::replace(tile("1z")).action_string, "41");
    assert_eq!(Action::discard().action_string, "");
}

#[test]
fn test_action_pon_relation() {
    let t = tile("3s");
    let next = Action::pon(t, [t, t], 1);
    let opposite = Action::pon(t, [t, t], 2);
    assert_ne!(next, opposite);
    assert_eq!(next.tiles().unwrap(), opposite.tiles().unwrap());
}

#[test]
fn test_action_kakan() {
    let a = Action::kakan("47p4747").unwrap();
    assert_eq!(a.action_type, ActionType::Kakan);
    assert_eq!(a.action_string, "47k474747");
    assert_eq!(Action::kakan("47k474747").unwrap().action_string, "47k474747");
    assert_eq!(
        Action::kakan("123456"),
        Err(ActionError::NotPromotable("123456".to_string()))
    );

    let a = Action::kakan_with("p151515", tile("0m")).unwrap();
    assert_eq!(a.action_string, "k15151551");
    assert!(Action::kakan_with("121212a12", tile("2m")).is_err());
}

#[test]
fn test_action_tiles() {
    let a = Action::reach_drawn();
    assert!(a.tiles().unwrap().is_empty());
    assert_eq!(a.reach_tile().unwrap(), None);
    let a = Action::reach(tile("9s"));
    assert_eq!(a.reach_tile().unwrap(), Some(tile("9s")));

    let a = Action::chii(tile("7p"), [tile("6p"), tile("0p")]);
    let ids: Vec<TileId> = a.tiles().unwrap().iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![27, 52, 26]);

    assert!(Action::noop().tiles().unwrap().is_empty());
    assert!(Action::new(ActionType::Replace, "4").tiles().is_err());
    assert!(Action::new(ActionType::Replace, "10").tiles().is_err());
}

#[test]
fn test_action_unicode_and_json() {
    assert_eq!(Action::replace(tile("1z")).unicode_string(), "\u{1F000}");
    assert_eq!(Action::reach_drawn().unicode_string(), "reach r60");
    assert_eq!(
        Action::pon(tile("1z"), [tile("1z"), tile("1z")], 2).unicode_string(),
        "pon \u{1F000}p\u{1F000}\u{1F000}"
    );

    let a = Action::kakan("47p4747").unwrap();
    let json = serde_json::to_string(&a).unwrap();
    assert_eq!(json, r#"{"action_type":"kakan","action_string":"47k474747"}"#);
    assert_eq!(serde_json::from_str::<Action>(&json).unwrap(), a);
}
