use super::*;

// 行動選択を行うプレイヤーの状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Active,           // ツモ番
    Passive,          // 他家の打牌に対する応答
    Chankan(MeldType), // 他家の槓に対する応答 (槓の種類)
    EndGame,          // 流局時の聴牌宣言
}

// プレイヤーに公開される情報 (卓の状態のコピー)
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub seat: Seat,
    pub state: PlayerState,
    pub hand: Deck,
    pub calls: Vec<Meld>,
    pub incoming: Option<Tile>, // ツモ牌, 打牌, 槓の牌
    pub active_seat: Seat,
    pub discards: [Vec<Tile>; SEAT],
    pub melds: [Vec<Meld>; SEAT],
    pub reach: [bool; SEAT],
    pub credits: [Score; SEAT],
    pub dora_indicators: Vec<Tile>,
    pub tiles_left: usize,
    pub can_kan: bool,
    pub round_wind: Tnum,
    pub seat_wind: Tnum,
    pub dealer: Seat,
    pub repeat: usize,
    pub reach_sticks: usize,
}

impl Observation {
    pub fn new(stg: &Stage, seat: Seat, state: PlayerState, incoming: Option<Tile>) -> Self {
        let pl = &stg.players[seat];
        let mut discards: [Vec<Tile>; SEAT] = Default::default();
        let mut melds: [Vec<Meld>; SEAT] = Default::default();
        let mut reach = [false; SEAT];
        for s in 0..SEAT {
            discards[s] = stg.players[s].discards.clone();
            melds[s] = stg.players[s].calls.clone();
            reach[s] = stg.players[s].is_reach;
        }

        Self {
            seat,
            state,
            hand: pl.hand.clone(),
            calls: pl.calls.clone(),
            incoming,
            active_seat: stg.active_seat,
            discards,
            melds,
            reach,
            credits: stg.credits(),
            dora_indicators: stg.dora_indicators.clone(),
            tiles_left: stg.tiles_left,
            can_kan: stg.can_kan(),
            round_wind: stg.round_wind,
            seat_wind: stg.seat_wind(seat),
            dealer: stg.dealer,
            repeat: stg.repeat,
            reach_sticks: stg.reach_sticks,
        }
    }

    #[inline]
    pub fn is_reach(&self) -> bool {
        self.reach[self.seat]
    }

    #[inline]
    pub fn credit(&self) -> Score {
        self.credits[self.seat]
    }

    // 手牌とツモ牌
    pub fn hand_with_incoming(&self) -> Vec<Tile> {
        let mut v = self.hand.tiles().to_vec();
        if let Some(t) = self.incoming {
            v.push(t);
        }
        v
    }
}

#[test]
fn test_observation_copy() {
    let mut stg = Stage::default();
    stg.players[1].hand = Deck::parse("123m").unwrap();
    stg.players[1].credit = 25000;
    stg.players[2].is_reach = true;
    stg.active_seat = 2;

    let obs = Observation::new(&stg, 1, PlayerState::Passive, Tile::new(14).ok());
    stg.players[1].hand.push(Tile::new(41).unwrap());
    assert_eq!(obs.hand.len(), 3);
    assert_eq!(obs.hand_with_incoming().len(), 4);
    assert_eq!(obs.credit(), 25000);
    assert!(!obs.is_reach());
    assert!(obs.reach[2]);

    let json = serde_json::to_value(&obs).unwrap();
    assert_eq!(json["state"], "passive");
    assert_eq!(json["hand"], serde_json::json!([11, 12, 13]));
}
