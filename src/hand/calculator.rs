use serde::{Deserialize, Serialize};

use crate::error::HandValueError;
use crate::model::*;

// 点数計算の外部インターフェース
// 牌は136枚表現のindex (Deck::instances) で受け渡す

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Chi,
    Pon,
    Kan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeldDescriptor {
    pub kind: MeldKind,
    pub opened: bool,
    pub tiles: Vec<usize>,
    pub called_tile: Option<usize>, // 槓の場合のみ,鳴いた牌
}

// 和了時の状況
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandConfig {
    pub is_tsumo: bool,
    pub is_riichi: bool,
    pub is_ippatsu: bool,
    pub is_rinshan: bool,
    pub is_chankan: bool,
    pub is_haitei: bool,
    pub is_houtei: bool,
    pub is_daburu_riichi: bool,
    pub is_nagashi_mangan: bool,
    pub is_tenhou: bool,
    pub is_chiihou: bool,
    pub player_wind: Tnum, // WE | WS | WW | WN
    pub round_wind: Tnum,
    pub options: Rule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRequest {
    pub tiles: Vec<usize>, // 手牌,副露,和了牌を含む (昇順)
    pub win_tile: usize,
    pub melds: Vec<MeldDescriptor>,
    pub dora_indicators: Vec<usize>,
    pub ura_dora_indicators: Vec<usize>,
    pub config: HandConfig,
}

impl HandRequest {
    // hand: 和了牌を含まない手牌
    pub fn new(
        hand: &[Tile],
        calls: &[Meld],
        win_tile: Tile,
        dora_indicators: &[Tile],
        ura_dora_indicators: &[Tile],
        config: HandConfig,
    ) -> Self {
        // 赤5の枠が衝突しないように手牌と副露をまとめてindexを割り当てる
        let mut all = hand.to_vec();
        all.push(win_tile);
        for m in calls {
            all.extend(m.tiles.iter().copied());
        }
        let instances = Deck::from_tiles(all).instances();

        let mut offset = hand.len() + 1;
        let mut melds = vec![];
        for m in calls {
            let ids = instances[offset..offset + m.tiles.len()].to_vec();
            let (kind, called_tile) = match m.meld_type {
                MeldType::Chii => (MeldKind::Chi, None),
                MeldType::Pon => (MeldKind::Pon, None),
                _ => (MeldKind::Kan, m.called_tile().map(|_| ids[m.marker])),
            };
            melds.push(MeldDescriptor {
                kind,
                opened: m.is_open(),
                tiles: ids,
                called_tile,
            });
            offset += m.tiles.len();
        }

        let mut tiles = instances.clone();
        tiles.sort_unstable();

        Self {
            tiles,
            win_tile: instances[hand.len()],
            melds,
            dora_indicators: Deck::from_tiles(dora_indicators.to_vec()).instances(),
            ura_dora_indicators: Deck::from_tiles(ura_dora_indicators.to_vec()).instances(),
            config,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCost {
    pub main: Score,       // ロン: 放銃者の支払い, ツモ: 親の支払い (親の和了の場合は子全員)
    pub additional: Score, // ツモ: 子の支払い
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResponse {
    pub han: usize,
    pub fu: usize,
    pub cost: HandCost,
    pub yaku: Vec<String>,
}

pub trait HandValueCalculator {
    fn calculate(&self, req: &HandRequest) -> Result<HandResponse, HandValueError>;
}

#[test]
fn test_hand_request() {
    let hand = Deck::parse("23m406p789s11z").unwrap();
    let calls = vec![Meld::parse("p151551").unwrap()];
    let req = HandRequest::new(
        hand.tiles(),
        &calls,
        Tile::from_symbol("1m").unwrap(),
        &[Tile::from_symbol("1z").unwrap()],
        &[],
        HandConfig::default(),
    );
    assert_eq!(req.tiles.len(), 14);
    assert_eq!(req.win_tile, 0);
    assert_eq!(req.melds.len(), 1);
    assert_eq!(req.melds[0].kind, MeldKind::Pon);
    assert!(req.melds[0].opened);
    // 0m は先頭の枠
    assert!(req.melds[0].tiles.contains(&16));
    assert!(req.tiles.contains(&52)); // 0p
    assert_eq!(req.dora_indicators, vec![108]);

    let calls = vec![Meld::parse("141414a14").unwrap()];
    let req = HandRequest::new(
        Deck::parse("23m406p789s1z").unwrap().tiles(),
        &calls,
        Tile::from_symbol("1z").unwrap(),
        &[],
        &[],
        HandConfig::default(),
    );
    assert_eq!(req.tiles.len(), 14);
    assert!(!req.melds[0].opened);
    assert_eq!(req.melds[0].called_tile, None);
    assert_eq!(req.melds[0].tiles, vec![12, 13, 14, 15]);
}
