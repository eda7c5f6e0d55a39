use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use super::{player::Player, possible_actions::REACH_COST, wall::Wall};
use crate::error::{GameError, HandValueError};
use crate::hand::*;
use crate::model::*;
use crate::util::misc::unixtime_now;

use ActionType::*;

// [Engine]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Tsumo,     // ツモ番のプレイヤーの和了
    Ron,       // ロン (ダブロン,トリロンを含む)
    Exhausted, // 荒牌平局
    Suukaikan, // 四槓散了
}

#[derive(Debug, Clone, Serialize)]
pub struct WinResult {
    pub seat: Seat,
    pub from: Option<Seat>, // 放銃者 (ツモの場合はNone)
    pub win_tile: Tile,
    pub shape: WinShape,
    pub response: HandResponse,
    pub deltas: [Score; SEAT], // この和了による得点変動 (積み棒,供託を含む)
}

// 局の終了 (エラーではなく通常の制御フロー)
#[derive(Debug, Clone, Serialize)]
pub struct HandEnd {
    pub reason: EndReason,
    pub wins: Vec<WinResult>,
    pub tenpai: [bool; SEAT], // 流局時の聴牌
    pub deltas: [Score; SEAT],
}

impl HandEnd {
    fn new(reason: EndReason) -> Self {
        Self {
            reason,
            wins: vec![],
            tenpai: [false; SEAT],
            deltas: [0; SEAT],
        }
    }
}

#[derive(Debug, Clone)]
pub enum Step {
    Continue,
    Ended(HandEnd),
}

// 他家の応答の対象となっている牌
#[derive(Debug, Clone, Copy)]
struct Claim {
    seat: Seat,            // 打牌または槓をした座席
    tile: Tile,            // 打牌または槓の牌
    kan: Option<MeldType>, // 槍槓の応答の場合は槓の種類
}

// 鳴きの優先順位 (ロンは別途処理)
fn call_priority(tp: ActionType) -> usize {
    match tp {
        Minkan | Pon => 2,
        Chii => 1,
        _ => 0,
    }
}

// 流局時の聴牌料 (聴牌者の受け取り, 不聴者の支払い)
fn no_ten_exchange(n_tenpai: usize) -> (Score, Score) {
    match n_tenpai {
        1 => (3000, 1000),
        2 => (1500, 1500),
        3 => (1000, 3000),
        _ => (0, 0), // 全員聴牌 or 全員ノーテン
    }
}

pub struct MahjongGame {
    seed: u64,   // 牌山生成用の乱数のシード値
    rng: StdRng, // 乱数 (牌山生成, 起家)
    rule: Rule,
    stage: Stage,
    wall: Wall,
    players: [Player; SEAT],
    calculator: Box<dyn HandValueCalculator>,
    first_dealer: Seat,          // 起家
    dora_revealed: usize,        // 公開済みのドラ表示牌の枚数
    claim: Option<Claim>,        // 応答待ちの牌
    pending_reach: Option<Seat>, // 打牌が通る前のリーチ宣言
    result: Option<HandEnd>,
    n_hand: usize,
}

impl MahjongGame {
    // seedがNoneの場合は現在時刻を使用
    pub fn new(
        rule: Rule,
        players: [Player; SEAT],
        calculator: Box<dyn HandValueCalculator>,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let seed = seed.unwrap_or_else(|| unixtime_now() as u64);
        let mut rng = StdRng::seed_from_u64(seed);
        let wall = Wall::with_rng(&rule, &mut rng)?;
        let dealer = rng.gen_range(0..SEAT);
        let mut game = Self::with_wall(rule, players, calculator, wall, dealer)?;
        game.seed = seed;
        game.rng = rng;
        Ok(game)
    }

    // 牌山と起家を指定して開始 (牌譜の再現,テスト用)
    pub fn with_wall(
        rule: Rule,
        players: [Player; SEAT],
        calculator: Box<dyn HandValueCalculator>,
        wall: Wall,
        dealer: Seat,
    ) -> Result<Self, GameError> {
        if rule.players != SEAT {
            return Err(crate::error::WallError::NotImplemented(rule.players).into());
        }
        let mut stage = Stage {
            round_wind: WE,
            dealer: dealer % SEAT,
            ..Default::default()
        };
        for pl in stage.players.iter_mut() {
            pl.credit = rule.initial_credit;
        }

        let mut game = Self {
            seed: 0,
            rng: StdRng::seed_from_u64(0),
            rule,
            stage,
            wall,
            players,
            calculator,
            first_dealer: dealer % SEAT,
            dora_revealed: 0,
            claim: None,
            pending_reach: None,
            result: None,
            n_hand: 0,
        };
        game.init_hand();
        Ok(game)
    }

    // 局の初期化 持ち点,場風,親,本場,供託は引き継ぐ
    pub fn init_hand(&mut self) {
        let stg = &mut self.stage;
        for s in 0..SEAT {
            let credit = stg.players[s].credit;
            stg.players[s] = StagePlayer {
                hand: self.wall.starting_hand(s),
                credit,
                ..Default::default()
            };
        }
        stg.active_seat = stg.dealer;
        stg.kan_seats.clear();
        stg.any_call = false;
        stg.no_draw = false;
        stg.rinshan = false;
        stg.chankan = false;

        self.dora_revealed = 1;
        self.claim = None;
        self.pending_reach = None;
        self.result = None;
        self.update_stage_wall();
        for s in 0..SEAT {
            self.players[s].init(s);
        }

        info!(
            "hand {} start: round_wind: {}, dealer: {}, repeat: {}, reach_sticks: {}, dora: {}",
            self.n_hand,
            self.stage.round_wind,
            self.stage.dealer,
            self.stage.repeat,
            self.stage.reach_sticks,
            self.stage.dora_indicators[0],
        );
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    #[inline]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[inline]
    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    #[inline]
    pub fn players(&self) -> &[Player; SEAT] {
        &self.players
    }

    #[inline]
    pub fn dora_revealed(&self) -> usize {
        self.dora_revealed
    }

    #[inline]
    pub fn result(&self) -> Option<&HandEnd> {
        self.result.as_ref()
    }

    // 飛び (持ち点がマイナス) による対戦終了
    pub fn is_busted(&self) -> bool {
        self.rule.enable_bust && self.stage.players.iter().any(|pl| pl.credit < 0)
    }

    // 1巡分の処理: ツモ -> 手番の操作 (槓の場合は繰り返し) -> 他家の応答
    pub fn step(&mut self) -> Result<Step, GameError> {
        if let Some(end) = &self.result {
            return Ok(Step::Ended(end.clone()));
        }
        let seat = self.stage.active_seat;

        // ツモ (鳴きの後はツモなし)
        if self.stage.no_draw {
            self.stage.no_draw = false;
        } else {
            if self.stage.tiles_left == 0 {
                return self.end_exhaustive();
            }
            let t = self
                .wall
                .pop()
                .ok_or_else(|| self.violation("mountain is empty"))?;
            self.stage.players[seat].incoming = Some(t);
            self.update_stage_wall();
            debug!("seat{} draw {}", seat, t);
        }

        // 手番の操作
        let discarded = loop {
            let obs = self.observe(seat, PlayerState::Active);
            let acts = self.filter_wins(seat, self.players[seat].action_space(&obs))?;
            let act = self.players[seat].act(&obs, &acts);
            let t = self.perform_action(seat, &act)?;
            if self.result.is_some() {
                break None;
            }
            match act.action_type {
                Ankan | Kakan => {
                    let meld = Meld::from_action(&act).map_err(|e| self.violation(e.to_string()))?;
                    let kt = meld.tiles[meld.tiles.len() - 1];
                    self.after_kan(seat, meld.meld_type, kt)?;
                    if self.result.is_some() {
                        break None;
                    }
                }
                _ => break t,
            }
        };
        if let Some(end) = &self.result {
            return Ok(Step::Ended(end.clone()));
        }

        // 他家の応答
        if let Some(t) = discarded {
            self.poll_calls(seat, t)?;
            if let Some(end) = &self.result {
                return Ok(Step::Ended(end.clone()));
            }
        }

        // リーチ成立 (打牌が通った場合のみ供託)
        if let Some(s) = self.pending_reach.take() {
            self.stage.players[s].credit -= REACH_COST;
            self.stage.reach_sticks += 1;
            debug!("seat{} reach accepted", s);
        }

        if !self.stage.no_draw {
            self.stage.active_seat = (seat + 1) % SEAT;
        }
        Ok(Step::Continue)
    }

    // 局が終了するまでstepを繰り返す
    pub fn play(&mut self) -> Result<HandEnd, GameError> {
        loop {
            if let Step::Ended(end) = self.step()? {
                return Ok(end);
            }
        }
    }

    // 次の局へ
    // 親の和了,流局時の親の聴牌,途中流局では連荘 (本場+1)
    pub fn next_hand(&mut self) -> Result<(), GameError> {
        let end = match self.result.take() {
            Some(end) => end,
            None => return Err(self.violation("hand is not finished")),
        };

        let dealer = self.stage.dealer;
        let dealer_won = end.wins.iter().any(|w| w.seat == dealer);
        let (keep, repeat) = match end.reason {
            EndReason::Tsumo | EndReason::Ron => {
                if dealer_won {
                    (true, self.stage.repeat + 1)
                } else {
                    (false, 0)
                }
            }
            EndReason::Exhausted => (end.tenpai[dealer], self.stage.repeat + 1),
            EndReason::Suukaikan => (true, self.stage.repeat + 1),
        };
        self.stage.repeat = repeat;
        if !end.wins.is_empty() {
            self.stage.reach_sticks = 0;
        }
        if !keep {
            self.stage.dealer = (dealer + 1) % SEAT;
            if self.stage.dealer == self.first_dealer {
                self.stage.round_wind = self.stage.round_wind % WN + 1;
            }
        }

        self.wall = Wall::with_rng(&self.rule, &mut self.rng)?;
        self.n_hand += 1;
        self.init_hand();
        Ok(())
    }

    // [Action]
    // Actionを適用して卓の状態を更新. 打牌された牌を返却
    // 構造的に不正な操作はRuleViolation
    pub fn perform_action(&mut self, seat: Seat, act: &Action) -> Result<Option<Tile>, GameError> {
        debug!("seat{} {}", seat, act);
        let tp = act.action_type;
        match tp {
            Discard | Replace | Reach | Ankan | Kakan | Tsumo => {
                if seat != self.stage.active_seat || self.claim.is_some() {
                    return Err(self.violation(format!("seat{} is not active: {}", seat, act)));
                }
            }
            Chii | Pon | Minkan | Ron => match self.claim {
                Some(c) if c.seat != seat => {}
                _ => return Err(self.violation(format!("seat{} cannot claim: {}", seat, act))),
            },
            Noop | Ten | Noten => {}
        }

        match tp {
            Noop | Ten | Noten => Ok(None),
            Discard => {
                let t = self.discard_tile(seat, None)?;
                Ok(Some(t))
            }
            Replace => {
                let t = self.action_tiles(act)?.first().copied();
                let t = t.ok_or_else(|| self.violation(format!("no tile in {}", act)))?;
                let t = self.discard_tile(seat, Some(t))?;
                Ok(Some(t))
            }
            Reach => {
                if self.stage.players[seat].is_reach {
                    return Err(self.violation(format!("seat{} is already in reach", seat)));
                }
                let target = act
                    .reach_tile()
                    .map_err(|e| self.violation(e.to_string()))?;
                let is_first = self.stage.players[seat].discards.is_empty() && !self.stage.any_call;
                let t = self.discard_tile(seat, target)?;

                let pl = &mut self.stage.players[seat];
                pl.is_reach = true;
                pl.is_double_reach = is_first;
                pl.is_ippatsu = self.rule.enable_ippatsu;
                self.pending_reach = Some(seat);
                Ok(Some(t))
            }
            Ankan => {
                let meld = self.action_meld(act)?;
                self.merge_incoming(seat);
                self.remove_tiles(seat, &meld.tiles)?;
                self.stage.players[seat].calls.push(meld);
                Ok(None)
            }
            Kakan => {
                let meld = self.action_meld(act)?;
                let base = meld.base_tile();
                let idx = self.stage.players[seat]
                    .calls
                    .iter()
                    .position(|m| m.meld_type == MeldType::Pon && m.base_tile() == base);
                let idx = idx.ok_or_else(|| self.violation(format!("no pon for {}", act)))?;
                let added = *meld.tiles.last().unwrap_or(&base);
                if added.to_normal() != base {
                    return Err(self.violation(format!("{} does not extend pon of {}", act, base)));
                }
                self.merge_incoming(seat);
                self.remove_tiles(seat, &[added])?;
                self.stage.players[seat].calls[idx] = meld;
                Ok(None)
            }
            Chii | Pon | Minkan => {
                let meld = self.action_meld(act)?;
                let claim = self.claim.ok_or_else(|| self.violation("no claim"))?;
                if meld.called_tile() != Some(claim.tile) {
                    return Err(self.violation(format!("{} does not call {}", act, claim.tile)));
                }
                self.stage.players[seat].hand.push(claim.tile);
                self.remove_tiles(seat, &meld.tiles)?;

                let stg = &mut self.stage;
                stg.players[seat].calls.push(meld);
                stg.active_seat = seat;
                stg.no_draw = true;
                stg.any_call = true;
                for pl in stg.players.iter_mut() {
                    pl.is_ippatsu = false;
                }
                Ok(None)
            }
            Tsumo => {
                let t = self.stage.players[seat].incoming;
                let t = t.ok_or_else(|| self.violation("tsumo without incoming tile"))?;
                self.settle_win(seat, None, t)?;
                Ok(None)
            }
            Ron => {
                let claim = self.claim.ok_or_else(|| self.violation("no claim"))?;
                self.settle_win(seat, Some(claim.seat), claim.tile)?;
                Ok(None)
            }
        }
    }

    // 打牌 targetがNoneの場合はツモ切り,それ以外は手出し (ツモ牌は手牌に加える)
    fn discard_tile(&mut self, seat: Seat, target: Option<Tile>) -> Result<Tile, GameError> {
        let t = match target {
            None => {
                let t = self.stage.players[seat].incoming.take();
                t.ok_or_else(|| self.violation(format!("seat{} has no incoming tile", seat)))?
            }
            Some(t) => {
                self.remove_tiles(seat, &[t])?;
                self.merge_incoming(seat);
                t
            }
        };

        let stg = &mut self.stage;
        let pl = &mut stg.players[seat];
        pl.discards.push(t);
        pl.is_ippatsu = false;
        stg.rinshan = false;
        Ok(t)
    }

    // ツモ牌を手牌に加える
    fn merge_incoming(&mut self, seat: Seat) {
        let pl = &mut self.stage.players[seat];
        if let Some(t) = pl.incoming.take() {
            pl.hand.push(t);
        }
    }

    // 手牌から複数枚を削除 1枚でも存在しない場合は手牌を変更せずにエラー
    fn remove_tiles(&mut self, seat: Seat, tiles: &[Tile]) -> Result<(), GameError> {
        let mut hand = self.stage.players[seat].hand.clone();
        for &t in tiles {
            if let Err(e) = hand.remove(t) {
                return Err(self.violation(format!("seat{}: {}", seat, e)));
            }
        }
        self.stage.players[seat].hand = hand;
        Ok(())
    }

    fn action_tiles(&self, act: &Action) -> Result<Vec<Tile>, GameError> {
        act.tiles().map_err(|e| self.violation(e.to_string()))
    }

    fn action_meld(&self, act: &Action) -> Result<Meld, GameError> {
        Meld::from_action(act).map_err(|e| self.violation(e.to_string()))
    }

    fn violation(&self, reason: impl Into<String>) -> GameError {
        GameError::violation(reason, &self.stage)
    }

    fn observe(&self, seat: Seat, state: PlayerState) -> Observation {
        let incoming = match state {
            PlayerState::Active => self.stage.players[seat].incoming,
            PlayerState::Passive | PlayerState::Chankan(_) => self.claim.map(|c| c.tile),
            PlayerState::EndGame => None,
        };
        Observation::new(&self.stage, seat, state, incoming)
    }

    fn update_stage_wall(&mut self) {
        // 槓の数だけ牌山の末尾が王牌に移動したものとして扱う
        self.stage.tiles_left = self.wall.tiles_left().saturating_sub(self.stage.n_kan());
        self.stage.replacements_left = self.wall.replacements_left();
        self.stage.dora_indicators = self.wall.dora_indicators(self.dora_revealed).to_vec();
    }

    // [Call]
    // 打牌に対して他家の応答を下家から順に収集してから優先順位に従って適用
    // ロン > ポン,明槓 > チー, 複数のロンは頭ハネ (enableMultiRonの場合は全員)
    fn poll_calls(&mut self, from: Seat, tile: Tile) -> Result<(), GameError> {
        self.claim = Some(Claim {
            seat: from,
            tile,
            kan: None,
        });

        let mut rons = vec![];
        let mut call: Option<(Seat, Action)> = None;
        for i in 1..SEAT {
            let s = (from + i) % SEAT;
            let obs = self.observe(s, PlayerState::Passive);
            let acts = self.filter_wins(s, self.players[s].action_space(&obs))?;
            let act = self.players[s].act(&obs, &acts);
            match act.action_type {
                Ron => rons.push(s),
                Chii | Pon | Minkan => {
                    let p = call_priority(act.action_type);
                    if call.as_ref().map_or(true, |(_, a)| p > call_priority(a.action_type)) {
                        call = Some((s, act));
                    }
                }
                _ => {}
            }
        }

        if !rons.is_empty() {
            self.declare_rons(&rons)?;
        } else if let Some((s, act)) = call {
            self.perform_action(s, &act)?;
            if act.action_type == Minkan {
                self.after_kan(s, MeldType::Minkan, tile)?;
            }
        }
        self.claim = None;
        Ok(())
    }

    // 槍槓の確認, 槓ドラ, 嶺上牌
    fn after_kan(&mut self, seat: Seat, meld_type: MeldType, tile: Tile) -> Result<(), GameError> {
        self.claim = Some(Claim {
            seat,
            tile,
            kan: Some(meld_type),
        });
        self.stage.chankan = true;
        let mut rons = vec![];
        for i in 1..SEAT {
            let s = (seat + i) % SEAT;
            let obs = self.observe(s, PlayerState::Chankan(meld_type));
            let acts = self.filter_wins(s, self.players[s].action_space(&obs))?;
            if self.players[s].act(&obs, &acts).action_type == Ron {
                rons.push(s);
            }
        }
        if !rons.is_empty() {
            self.declare_rons(&rons)?;
        }
        self.stage.chankan = false;
        self.claim = None;
        if self.result.is_some() {
            return Ok(());
        }

        let stg = &mut self.stage;
        stg.kan_seats.push(seat);
        stg.any_call = true;
        for pl in stg.players.iter_mut() {
            pl.is_ippatsu = false;
        }
        self.dora_revealed += 1;
        self.update_stage_wall();

        // 四槓散了: 2人以上で合計4回, または5回目の槓
        let n_kan = self.stage.n_kan();
        let multi = self.stage.kan_seats.iter().any(|&s| s != seat);
        if n_kan > 4 || (n_kan == 4 && multi) {
            self.end_abortive(EndReason::Suukaikan);
            return Ok(());
        }

        match self.wall.pop_replacement() {
            Some(t) => {
                self.stage.players[seat].incoming = Some(t);
                self.stage.rinshan = true;
                self.update_stage_wall();
                debug!("seat{} draw replacement {}", seat, t);
            }
            None => self.end_abortive(EndReason::Suukaikan),
        }
        Ok(())
    }

    fn declare_rons(&mut self, rons: &[Seat]) -> Result<(), GameError> {
        let n = if self.rule.enable_multi_ron { rons.len() } else { 1 };
        for &s in &rons[..n] {
            self.perform_action(s, &Action::ron())?;
        }
        Ok(())
    }

    // [Win]
    fn hand_request(&self, seat: Seat, win_tile: Tile, is_tsumo: bool) -> HandRequest {
        let stg = &self.stage;
        let pl = &stg.players[seat];
        let is_chankan = !is_tsumo && self.claim.map_or(false, |c| c.kan.is_some());
        let is_first = pl.discards.is_empty() && !stg.any_call;
        let config = HandConfig {
            is_tsumo,
            is_riichi: pl.is_reach,
            is_ippatsu: pl.is_ippatsu,
            is_rinshan: is_tsumo && stg.rinshan,
            is_chankan,
            is_haitei: is_tsumo && !stg.rinshan && stg.tiles_left == 0,
            is_houtei: !is_tsumo && !is_chankan && stg.tiles_left == 0,
            is_daburu_riichi: pl.is_double_reach,
            is_nagashi_mangan: false,
            is_tenhou: is_tsumo && is_first && stg.is_dealer(seat),
            is_chiihou: is_tsumo && is_first && !stg.is_dealer(seat),
            player_wind: stg.seat_wind(seat),
            round_wind: stg.round_wind,
            options: self.rule.clone(),
        };
        HandRequest::new(
            pl.hand.tiles(),
            &pl.calls,
            win_tile,
            &stg.dora_indicators,
            self.wall.ura_dora_indicators(self.dora_revealed),
            config,
        )
    }

    fn win_tile(&self, seat: Seat, is_tsumo: bool) -> Option<Tile> {
        if is_tsumo {
            self.stage.players[seat].incoming
        } else {
            self.claim.map(|c| c.tile)
        }
    }

    // 役のない和了形はツモ,ロンの選択肢から除外
    fn filter_wins(&self, seat: Seat, acts: Vec<Action>) -> Result<Vec<Action>, GameError> {
        let mut res = vec![];
        for a in acts {
            let is_tsumo = match a.action_type {
                Tsumo => true,
                Ron => false,
                _ => {
                    res.push(a);
                    continue;
                }
            };
            let t = match self.win_tile(seat, is_tsumo) {
                Some(t) => t,
                None => continue,
            };
            match self.calculator.calculate(&self.hand_request(seat, t, is_tsumo)) {
                Ok(_) => res.push(a),
                Err(HandValueError::NoYaku) => debug!("seat{} {} has no yaku", seat, a),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(res)
    }

    // 和了の精算 ron_fromがNoneの場合はツモ
    // 積み棒と供託は最初の和了者 (放銃者から最も近い座席) のみ
    fn settle_win(&mut self, seat: Seat, ron_from: Option<Seat>, win_tile: Tile) -> Result<(), GameError> {
        let is_tsumo = ron_from.is_none();
        let pl = &self.stage.players[seat];
        let mut tiles = pl.hand.tiles().to_vec();
        tiles.push(win_tile);
        let shape = is_complete(&tiles, &pl.calls)
            .ok_or_else(|| self.violation(format!("seat{} declared win on incomplete hand", seat)))?;
        let res = self.calculator.calculate(&self.hand_request(seat, win_tile, is_tsumo))?;

        let first = self.result.is_none();
        let repeat = if first { self.stage.repeat as Score } else { 0 };
        let mut deltas = [0; SEAT];
        match ron_from {
            None => {
                for s in 0..SEAT {
                    if s == seat {
                        continue;
                    }
                    let pay = if self.stage.is_dealer(s) {
                        res.cost.main
                    } else {
                        res.cost.additional
                    } + repeat * 100;
                    deltas[s] -= pay;
                    deltas[seat] += pay;
                }
            }
            Some(from) => {
                let pay = res.cost.main + repeat * 300;
                deltas[from] -= pay;
                deltas[seat] += pay;
            }
        }
        if first {
            deltas[seat] += self.stage.reach_sticks as Score * 1000;
            self.stage.reach_sticks = 0;
        }

        info!(
            "seat{} {} {} ({}han {}fu {}) {:?}",
            seat,
            if is_tsumo { "tsumo" } else { "ron" },
            win_tile,
            res.han,
            res.fu,
            res.yaku.join(","),
            deltas
        );

        let reason = if is_tsumo { EndReason::Tsumo } else { EndReason::Ron };
        let end = self.result.get_or_insert_with(|| HandEnd::new(reason));
        for s in 0..SEAT {
            end.deltas[s] += deltas[s];
            self.stage.players[s].credit += deltas[s];
        }
        end.wins.push(WinResult {
            seat,
            from: ron_from,
            win_tile,
            shape,
            response: res,
            deltas,
        });
        Ok(())
    }

    // [Draw]
    // 荒牌平局 親から順に聴牌を宣言
    fn end_exhaustive(&mut self) -> Result<Step, GameError> {
        let mut tenpai = [false; SEAT];
        for i in 0..SEAT {
            let s = (self.stage.dealer + i) % SEAT;
            let obs = self.observe(s, PlayerState::EndGame);
            let acts = self.players[s].action_space(&obs);
            let act = self.players[s].act(&obs, &acts);
            self.perform_action(s, &act)?;
            let pl = &self.stage.players[s];
            // 実際に聴牌している場合のみ聴牌として扱う
            tenpai[s] = act.action_type == Ten && crate::hand::tenpai(pl.hand.tiles(), &pl.calls);
        }

        let mut end = HandEnd::new(EndReason::Exhausted);
        end.tenpai = tenpai;
        if self.rule.enable_no_ten_penalty {
            let n = tenpai.iter().filter(|&&t| t).count();
            let (recv, pay) = no_ten_exchange(n);
            for s in 0..SEAT {
                end.deltas[s] = if tenpai[s] { recv } else { -pay };
                self.stage.players[s].credit += end.deltas[s];
            }
        }
        info!("exhaustive draw: tenpai: {:?}, deltas: {:?}", tenpai, end.deltas);

        self.result = Some(end.clone());
        Ok(Step::Ended(end))
    }

    fn end_abortive(&mut self, reason: EndReason) {
        info!("abortive draw: {:?}", reason);
        self.result = Some(HandEnd::new(reason));
    }
}

#[cfg(test)]
use crate::actor::{Actor, Config, Nop};

// 優先するActionの種類を順に試し,なければ打牌かスキップ
#[cfg(test)]
#[derive(Clone)]
struct Prefer(Config, Vec<ActionType>);

#[cfg(test)]
impl Actor for Prefer {
    fn select(&mut self, _obs: &Observation, acts: &[Action]) -> Action {
        for tp in self.1.iter().chain([Discard, Noop, Noten].iter()) {
            if let Some(a) = acts.iter().find(|a| a.action_type == *tp) {
                return a.clone();
            }
        }
        acts[0].clone()
    }

    fn get_config(&self) -> &Config {
        &self.0
    }
}

#[cfg(test)]
fn prefer(types: &[ActionType]) -> Player {
    let config = Config {
        name: "Prefer".to_string(),
        args: vec![],
    };
    Player::new("prefer", Box::new(Prefer(config, types.to_vec())))
}

#[cfg(test)]
fn nop() -> Player {
    Player::new("nop", Box::new(Nop::new()))
}

// 役に関係なく1翻30符相当の点数を返す
#[cfg(test)]
struct FlatCalculator;

#[cfg(test)]
impl HandValueCalculator for FlatCalculator {
    fn calculate(&self, req: &HandRequest) -> Result<HandResponse, HandValueError> {
        let cost = if req.config.is_tsumo {
            HandCost {
                main: 500,
                additional: 300,
            }
        } else {
            HandCost {
                main: 1000,
                additional: 0,
            }
        };
        Ok(HandResponse {
            han: 1,
            fu: 30,
            cost,
            yaku: vec!["flat".to_string()],
        })
    }
}

// 配牌とツモ順を指定した牌山 (指定のない座席と残りの牌は固定の乱数で並べる)
#[cfg(test)]
fn arranged_wall(hands: [&str; SEAT], draws: &str) -> Wall {
    let rule = Rule::default();
    let mut rest = Deck::from_tiles(super::wall::create_tiles(&rule).unwrap());
    let mut take = |tiles: Vec<Tile>| -> Vec<Tile> {
        for &t in &tiles {
            rest.remove(t).unwrap();
        }
        tiles
    };

    let mut fixed: [Option<Vec<Tile>>; SEAT] = Default::default();
    for s in 0..SEAT {
        if !hands[s].is_empty() {
            fixed[s] = Some(take(Deck::parse(hands[s]).unwrap().tiles().to_vec()));
        }
    }
    let draws: Vec<Tile> = take(
        draws
            .split_whitespace()
            .map(|s| Tile::from_symbol(s).unwrap())
            .collect(),
    );

    let mut rest: Vec<Tile> = rest.into();
    rest.shuffle(&mut StdRng::seed_from_u64(0));
    let mut tiles = vec![];
    for f in fixed {
        match f {
            Some(h) => tiles.extend(h),
            None => tiles.extend(rest.drain(..HAND_SIZE)),
        }
    }
    tiles.extend(draws);
    tiles.extend(rest);
    Wall::from_tiles(tiles).unwrap()
}

#[cfg(test)]
fn game_with(players: [Player; SEAT], wall: Wall, rule: Rule, calc: Box<dyn HandValueCalculator>) -> MahjongGame {
    MahjongGame::with_wall(rule, players, calc, wall, 0).unwrap()
}

#[test]
fn test_game_exhaustive_nop() {
    let players = [nop(), nop(), nop(), nop()];
    let mut game = MahjongGame::new(Rule::default(), players, Box::new(BasicCalculator), Some(1)).unwrap();
    let end = game.play().unwrap();
    assert_eq!(end.reason, EndReason::Exhausted);
    assert_eq!(end.deltas, [0; SEAT]);
    assert_eq!(game.stage().tiles_left, 0);
    assert_eq!(game.stage().credits(), [25000; SEAT]);
    for pl in &game.stage().players {
        assert_eq!(pl.hand.len(), 13);
        assert!(pl.calls.is_empty());
    }
    let total: usize = game.stage().players.iter().map(|pl| pl.discards.len()).sum();
    assert_eq!(total, 70);

    // 終了後のstepは同じ結果を返す
    assert!(matches!(game.step(), Ok(Step::Ended(e)) if e.reason == EndReason::Exhausted));
}

#[test]
fn test_game_tenhou() {
    let wall = arranged_wall(["123m456p789s1122z", "", "", ""], "1z");
    let players = [prefer(&[Tsumo]), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    let end = game.play().unwrap();
    assert_eq!(end.reason, EndReason::Tsumo);
    assert_eq!(end.wins.len(), 1);
    assert_eq!(end.wins[0].shape, WinShape::Ordinary);
    assert!(end.wins[0].response.yaku.contains(&"tenhou".to_string()));
    assert_eq!(end.deltas, [48000, -16000, -16000, -16000]);
    assert_eq!(game.stage().credits(), [73000, 9000, 9000, 9000]);
}

#[test]
fn test_game_ron_without_yaku() {
    // 役がなければロンは選択肢に含まれない
    let wall = arranged_wall(["", "12378m456p789s11z", "", ""], "9m");
    let players = [prefer(&[]), prefer(&[Ron]), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    assert!(matches!(game.step(), Ok(Step::Continue)));
    assert_eq!(game.stage().active_seat, 1);
    assert_eq!(game.stage().players[0].discards, vec![Tile::from_symbol("9m").unwrap()]);
}

#[test]
fn test_game_ron() {
    let wall = arranged_wall(["", "12378m456p789s11z", "", ""], "9m");
    let players = [prefer(&[]), prefer(&[Ron]), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(FlatCalculator));
    let end = game.play().unwrap();
    assert_eq!(end.reason, EndReason::Ron);
    assert_eq!(end.wins[0].seat, 1);
    assert_eq!(end.wins[0].from, Some(0));
    assert_eq!(end.deltas, [-1000, 1000, 0, 0]);

    // 子の和了で親が移動
    game.next_hand().unwrap();
    assert_eq!(game.stage().dealer, 1);
    assert_eq!(game.stage().repeat, 0);
    assert_eq!(game.stage().active_seat, 1);
    assert!(game.result().is_none());
}

#[test]
fn test_game_head_bump() {
    let hands = ["", "12378m456p789s11z", "12378m456p789s22z", ""];
    let players = || [prefer(&[]), prefer(&[Ron]), prefer(&[Ron]), nop()];

    // 頭ハネ: 放銃者から近い席のみ和了
    let rule = Rule {
        enable_multi_ron: false,
        ..Default::default()
    };
    let mut game = game_with(players(), arranged_wall(hands, "9m"), rule, Box::new(FlatCalculator));
    let end = game.play().unwrap();
    assert_eq!(end.wins.len(), 1);
    assert_eq!(end.wins[0].seat, 1);
    assert_eq!(end.deltas, [-1000, 1000, 0, 0]);

    let rule = Rule {
        enable_multi_ron: true,
        ..Default::default()
    };
    let mut game = game_with(players(), arranged_wall(hands, "9m"), rule, Box::new(FlatCalculator));
    let end = game.play().unwrap();
    assert_eq!(end.wins.len(), 2);
    assert_eq!(end.wins[1].seat, 2);
    assert_eq!(end.deltas, [-2000, 1000, 1000, 0]);
}

#[test]
fn test_game_call_priority() {
    // 下家のチーより対面のポンを優先
    let hands = ["", "78m13579p13579s1z", "99m13579p2468s12z", ""];
    let players = [prefer(&[]), prefer(&[Chii]), prefer(&[Pon]), nop()];
    let mut game = game_with(players, arranged_wall(hands, "9m"), Rule::default(), Box::new(BasicCalculator));
    assert!(matches!(game.step(), Ok(Step::Continue)));

    let stg = game.stage();
    assert!(stg.players[1].calls.is_empty());
    assert_eq!(stg.players[2].calls.len(), 1);
    assert_eq!(stg.players[2].calls[0].to_string(), "19p1919");
    assert_eq!(stg.players[2].calls[0].rel(), 2);
    assert_eq!(stg.players[2].hand.len(), 11);
    assert_eq!(stg.active_seat, 2);
    assert!(stg.no_draw && stg.any_call);

    // ツモなしで手牌から打牌
    let tiles_left = stg.tiles_left;
    assert!(matches!(game.step(), Ok(Step::Continue)));
    let stg = game.stage();
    assert_eq!(stg.tiles_left, tiles_left);
    assert_eq!(stg.players[2].hand.len(), 10);
    assert_eq!(stg.players[2].discards.len(), 1);
    assert_eq!(stg.active_seat, 3);
}

#[test]
fn test_game_reach() {
    let wall = arranged_wall(["123m456p789s1122z", "", "", ""], "5z");
    let players = [prefer(&[Reach]), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    assert!(matches!(game.step(), Ok(Step::Continue)));

    let stg = game.stage();
    let pl = &stg.players[0];
    assert!(pl.is_reach && pl.is_double_reach && pl.is_ippatsu);
    assert_eq!(pl.credit, 24000);
    assert_eq!(stg.reach_sticks, 1);
    assert_eq!(pl.discards, vec![Tile::from_symbol("5z").unwrap()]);
    assert_eq!(pl.hand.len(), 13);
}

#[test]
fn test_game_ankan() {
    let wall = arranged_wall(["111m456p789s1235z", "", "", ""], "1m");
    let players = [prefer(&[Ankan]), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    let replacement = game.wall().tiles()[132];
    let tiles_left = game.stage().tiles_left;
    assert!(matches!(game.step(), Ok(Step::Continue)));

    let stg = game.stage();
    let pl = &stg.players[0];
    assert_eq!(pl.calls.len(), 1);
    assert_eq!(pl.calls[0].meld_type, MeldType::Ankan);
    assert_eq!(pl.calls[0].to_string(), "111111a11");
    assert_eq!(stg.kan_seats, vec![0]);
    assert_eq!(game.dora_revealed(), 2);
    assert_eq!(stg.dora_indicators.len(), 2);
    assert_eq!(stg.replacements_left, 3);
    // 嶺上牌をツモ切り
    assert_eq!(pl.discards, vec![replacement]);
    assert_eq!(pl.hand.len(), 10);
    assert_eq!(stg.tiles_left, tiles_left - 2);
    assert!(!stg.rinshan);
}

#[test]
fn test_game_exhaustive_tenpai() {
    let wall = arranged_wall(["123m456p789s1122z", "", "", ""], "");
    let players = [prefer(&[Ten]), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    let end = game.play().unwrap();
    assert_eq!(end.reason, EndReason::Exhausted);
    assert_eq!(end.tenpai, [true, false, false, false]);
    assert_eq!(end.deltas, [3000, -1000, -1000, -1000]);

    // 親の聴牌で連荘
    game.next_hand().unwrap();
    assert_eq!(game.stage().dealer, 0);
    assert_eq!(game.stage().repeat, 1);
    assert_eq!(game.stage().credits(), [28000, 24000, 24000, 24000]);

    let rule = Rule {
        enable_no_ten_penalty: false,
        ..Default::default()
    };
    let wall = arranged_wall(["123m456p789s1122z", "", "", ""], "");
    let players = [prefer(&[Ten]), nop(), nop(), nop()];
    let mut game = game_with(players, wall, rule, Box::new(BasicCalculator));
    assert_eq!(game.play().unwrap().deltas, [0; SEAT]);
}

#[test]
fn test_game_rule_violation() {
    let wall = arranged_wall(["123m456p789s1122z", "", "", ""], "");
    let players = [nop(), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));

    // 手番以外の座席
    let err = game.perform_action(1, &Action::discard()).unwrap_err();
    assert!(matches!(err, GameError::RuleViolation { .. }));

    // ツモ牌がない状態でのツモ切り
    let err = game.perform_action(0, &Action::discard()).unwrap_err();
    assert!(matches!(err, GameError::RuleViolation { .. }));

    // 手牌にない牌 (手牌は変更されない)
    let err = game
        .perform_action(0, &Action::replace(Tile::from_symbol("9m").unwrap()))
        .unwrap_err();
    match err {
        GameError::RuleViolation { snapshot, .. } => {
            assert_eq!(snapshot.active_seat, 0);
            assert_eq!(snapshot.players[0].hand.len(), 13);
        }
        e => panic!("unexpected error: {}", e),
    }
    assert_eq!(game.stage().players[0].hand.len(), 13);

    // ポンしていない牌の加槓
    let kakan = Action::kakan("11p1111").unwrap();
    assert!(matches!(
        game.perform_action(0, &kakan),
        Err(GameError::RuleViolation { .. })
    ));

    // 応答待ちの牌がない状態でのロン
    assert!(matches!(
        game.perform_action(2, &Action::ron()),
        Err(GameError::RuleViolation { .. })
    ));

    // 局の途中でnext_hand
    assert!(game.next_hand().is_err());
}

#[test]
fn test_game_next_hand_rotation() {
    let players = [nop(), nop(), nop(), nop()];
    let mut game = MahjongGame::new(Rule::default(), players, Box::new(BasicCalculator), Some(5)).unwrap();
    let first = game.stage().dealer;
    for i in 1..=4 {
        game.play().unwrap();
        game.next_hand().unwrap();
        // 全員ノーテンで親流れ
        assert_eq!(game.stage().dealer, (first + i) % SEAT);
        assert_eq!(game.stage().repeat, i);
    }
    assert_eq!(game.stage().round_wind, WS);
    assert_eq!(game.stage().tiles_left, 70);
}

#[test]
fn test_game_kakan_mismatch() {
    let wall = arranged_wall(["123m456p789s1122z", "", "", ""], "");
    let players = [nop(), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    game.stage.players[0].calls.push(Meld::parse("p292929").unwrap());
    let t = game.wall.pop().unwrap();
    game.stage.players[0].incoming = Some(t);

    // ポンと異なる牌を加えた加槓
    let act = Action::new(Kakan, "k29292911");
    let err = game.perform_action(0, &act).unwrap_err();
    assert!(matches!(err, GameError::RuleViolation { .. }));
    let pl = &game.stage().players[0];
    assert_eq!(pl.hand.len(), 13);
    assert_eq!(pl.calls[0].meld_type, MeldType::Pon);
    assert_eq!(pl.incoming, Some(t));
}

#[test]
fn test_game_suukaikan() {
    // 2人で合計4回の槓
    let wall = arranged_wall(["1111m2222m3333m4z", "6666m123p456p789p", "", ""], "1z 2z");
    let players = [prefer(&[Ankan]), prefer(&[Ankan]), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    assert!(matches!(game.step(), Ok(Step::Continue)));
    assert_eq!(game.stage().kan_seats, vec![0, 0, 0]);
    assert_eq!(game.stage().replacements_left, 1);

    let end = game.play().unwrap();
    assert_eq!(end.reason, EndReason::Suukaikan);
    assert_eq!(end.deltas, [0; SEAT]);
    assert_eq!(game.stage().kan_seats, vec![0, 0, 0, 1]);
    assert_eq!(game.stage().credits(), [25000; SEAT]);

    // 途中流局は親の連荘
    game.next_hand().unwrap();
    assert_eq!(game.stage().dealer, 0);
    assert_eq!(game.stage().repeat, 1);
}

#[test]
fn test_game_suukaikan_no_replacement() {
    let wall = arranged_wall(["1111m456p789s125z", "", "", ""], "");
    let players = [nop(), nop(), nop(), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    while game.wall.pop_replacement().is_some() {}
    let t = game.wall.pop().unwrap();
    game.stage.players[0].incoming = Some(t);

    // 嶺上牌が残っていなければ途中流局
    let m1 = Tile::from_symbol("1m").unwrap();
    game.perform_action(0, &Action::ankan([m1; 4])).unwrap();
    game.after_kan(0, MeldType::Ankan, m1).unwrap();
    let end = game.result().unwrap();
    assert_eq!(end.reason, EndReason::Suukaikan);
    assert_eq!(end.deltas, [0; SEAT]);
    assert!(matches!(game.step(), Ok(Step::Ended(e)) if e.reason == EndReason::Suukaikan));
}

#[test]
fn test_game_minkan_rinshan() {
    // 上家の打牌を大明槓して嶺上牌をツモ
    let wall = arranged_wall(["", "", "999p147m258s1357z", ""], "1s 9p");
    let players = [nop(), nop(), prefer(&[Minkan]), nop()];
    let mut game = game_with(players, wall, Rule::default(), Box::new(BasicCalculator));
    let replacement = game.wall().tiles()[132];
    assert!(matches!(game.step(), Ok(Step::Continue)));
    assert!(matches!(game.step(), Ok(Step::Continue)));

    let stg = game.stage();
    let pl = &stg.players[2];
    assert_eq!(pl.calls.len(), 1);
    assert_eq!(pl.calls[0].meld_type, MeldType::Minkan);
    assert_eq!(pl.calls[0].rel(), 3);
    assert_eq!(pl.incoming, Some(replacement));
    assert_eq!(pl.hand.len(), 10);
    assert!(stg.rinshan && stg.no_draw && stg.any_call);
    assert_eq!(stg.active_seat, 2);
    assert_eq!(stg.kan_seats, vec![2]);
    assert_eq!(stg.dora_indicators.len(), 2);

    // 次のstepはツモなしで嶺上牌を打牌
    let tiles_left = stg.tiles_left;
    assert!(matches!(game.step(), Ok(Step::Continue)));
    let stg = game.stage();
    assert_eq!(stg.players[2].discards, vec![replacement]);
    assert_eq!(stg.players[2].incoming, None);
    assert!(!stg.rinshan);
    assert_eq!(stg.tiles_left, tiles_left);
    assert_eq!(stg.active_seat, 3);
}

#[cfg(test)]
fn kakan_game(seat2: Player) -> MahjongGame {
    // seat1のツモ切りをseat0がポン, 一巡後に4枚目をツモって加槓
    let hands = ["99p3p147m258s1357z", "", "123m45678p789s11z", ""];
    let wall = arranged_wall(hands, "1s 9p 2s 3s 4s 9p");
    let players = [prefer(&[Pon, Kakan]), nop(), seat2, nop()];
    game_with(players, wall, Rule::default(), Box::new(BasicCalculator))
}

#[test]
fn test_game_kakan() {
    let mut game = kakan_game(prefer(&[Ron]));
    let mut game2 = kakan_game(nop());
    for g in [&mut game, &mut game2] {
        for _ in 0..6 {
            assert!(matches!(g.step(), Ok(Step::Continue)));
        }
        let pl = &g.stage().players[0];
        assert_eq!(pl.calls[0].meld_type, MeldType::Pon);
        assert_eq!(pl.calls[0].to_string(), "p292929");
        assert_eq!(pl.hand.len(), 10);
    }

    // 槍槓なし: 加槓して嶺上牌をツモ切り
    let replacement = game2.wall().tiles()[132];
    assert!(matches!(game2.step(), Ok(Step::Continue)));
    let stg = game2.stage();
    let pl = &stg.players[0];
    assert_eq!(pl.calls[0].meld_type, MeldType::Kakan);
    assert_eq!(pl.calls[0].to_string(), "k29292929");
    assert_eq!(pl.hand.len(), 10);
    assert_eq!(pl.discards.last(), Some(&replacement));
    assert_eq!(stg.kan_seats, vec![0]);
    assert_eq!(stg.dora_indicators.len(), 2);
    assert_eq!(stg.active_seat, 1);

    // 槍槓: 加槓した牌でロン
    let end = game.play().unwrap();
    assert_eq!(end.reason, EndReason::Ron);
    assert_eq!(end.wins.len(), 1);
    assert_eq!(end.wins[0].seat, 2);
    assert_eq!(end.wins[0].from, Some(0));
    assert_eq!(end.wins[0].win_tile, Tile::from_symbol("9p").unwrap());
    assert!(end.wins[0].response.yaku.contains(&"chankan".to_string()));
    assert!(end.deltas[0] < 0 && end.deltas[2] > 0);
    assert_eq!(end.deltas.iter().sum::<Score>(), 0);
    assert!(game.stage().kan_seats.is_empty());
}
