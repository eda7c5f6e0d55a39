use super::*;

// 各座席の状態
#[derive(Debug, Clone, Default, Serialize)]
pub struct StagePlayer {
    pub hand: Deck,             // 手牌 (ツモ牌を含まない)
    pub incoming: Option<Tile>, // ツモ牌
    pub calls: Vec<Meld>,       // 副露
    pub discards: Vec<Tile>,    // 捨て牌
    pub credit: Score,          // 持ち点
    pub is_reach: bool,         // リーチ (ダブルリーチを含む)
    pub is_double_reach: bool,  // ダブルリーチ
    pub is_ippatsu: bool,       // 一発 リーチ後の次の打牌または鳴き,槓でfalse
}

impl StagePlayer {
    // 副露が暗槓のみ
    pub fn is_menzen(&self) -> bool {
        self.calls.iter().all(|m| !m.is_open())
    }
}

// 局の状態 (MahjongGameが唯一の所有者)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stage {
    pub round_wind: Tnum,             // 場風 (WE | WS | WW | WN)
    pub dealer: Seat,                 // 親の座席
    pub repeat: usize,                // 本場
    pub reach_sticks: usize,          // 供託リーチ棒
    pub active_seat: Seat,            // ツモ番の座席
    pub players: [StagePlayer; SEAT], // 各座席
    pub dora_indicators: Vec<Tile>,   // 公開済みのドラ表示牌
    pub tiles_left: usize,            // 牌山の残り枚数
    pub replacements_left: usize,     // 嶺上牌の残り枚数
    pub kan_seats: Vec<Seat>,         // 槓を宣言した座席 (宣言順)
    pub any_call: bool,               // 局中に鳴き(暗槓を含む)があったかどうか
    pub no_draw: bool,                // 鳴きによりツモ番を得た (次のツモなし)
    pub rinshan: bool,                // 嶺上牌のツモ待ち
    pub chankan: bool,                // 槍槓の応答待ち
}

impl Stage {
    #[inline]
    pub fn is_dealer(&self, seat: Seat) -> bool {
        seat == self.dealer
    }

    #[inline]
    pub fn seat_wind(&self, seat: Seat) -> Tnum {
        (seat + SEAT - self.dealer) % SEAT + 1 // WE | WS | WW | WN
    }

    pub fn credits(&self) -> [Score; SEAT] {
        let mut c = [0; SEAT];
        for s in 0..SEAT {
            c[s] = self.players[s].credit;
        }
        c
    }

    #[inline]
    pub fn n_kan(&self) -> usize {
        self.kan_seats.len()
    }

    // 槓が宣言可能 (嶺上牌と牌山が残っている)
    #[inline]
    pub fn can_kan(&self) -> bool {
        self.replacements_left > 0 && self.tiles_left > 0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let winds = ["", "E", "S", "W", "N"];
        writeln!(
            f,
            "round: {}, dealer: {}, repeat: {}, reach_sticks: {}, active: {}, tiles_left: {}",
            winds[self.round_wind.min(WN)],
            self.dealer,
            self.repeat,
            self.reach_sticks,
            self.active_seat,
            self.tiles_left,
        )?;
        let doras: Vec<String> = self.dora_indicators.iter().map(|t| t.to_string()).collect();
        write!(f, "dora: [{}], kan: {:?}", doras.join(", "), self.kan_seats)?;
        for (s, p) in self.players.iter().enumerate() {
            let calls: Vec<String> = p.calls.iter().map(|m| m.to_string()).collect();
            let discards: Vec<String> = p.discards.iter().map(|t| t.to_string()).collect();
            writeln!(f)?;
            writeln!(
                f,
                "seat{}: credit: {}, reach: {}, ippatsu: {}",
                s, p.credit, p.is_reach, p.is_ippatsu
            )?;
            write!(
                f,
                "  hand: {} {}, calls: [{}], discards: [{}]",
                p.hand.compact_string(),
                p.incoming.map(|t| t.to_string()).unwrap_or_default(),
                calls.join(", "),
                discards.join(", ")
            )?;
        }
        Ok(())
    }
}

#[test]
fn test_stage_winds() {
    let stg = Stage {
        dealer: 1,
        round_wind: WE,
        ..Default::default()
    };
    assert_eq!(stg.seat_wind(1), WE);
    assert_eq!(stg.seat_wind(2), WS);
    assert_eq!(stg.seat_wind(0), WN);
    assert!(stg.is_dealer(1));
    assert!(!stg.can_kan());
    assert!(stg.to_string().contains("round: E"));
}
