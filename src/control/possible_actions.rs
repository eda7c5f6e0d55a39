use super::common::*;
use crate::hand::*;
use crate::model::*;

// リーチ宣言に必要な持ち点と牌山の残り枚数
pub const REACH_COST: Score = 1000;
const REACH_TILES_LEFT: usize = 4;

// [Possible Actions]
// 観測情報から選択可能な操作の一覧を返却
// 順番に意味はないが同じ観測に対しては常に同じ順番を返す
pub fn calc_possible_actions(obs: &Observation) -> Vec<Action> {
    let acts = match obs.state {
        PlayerState::Active => calc_possible_turn_actions(obs),
        PlayerState::Passive => calc_possible_call_actions(obs),
        PlayerState::Chankan(kan_type) => {
            let mut acts = vec![Action::noop()];
            acts.append(&mut check_ron(obs, Some(kan_type)));
            acts
        }
        PlayerState::EndGame => {
            let mut acts = vec![];
            if tenpai(obs.hand.tiles(), &obs.calls) {
                acts.push(Action::ten());
            }
            acts.push(Action::noten());
            acts
        }
    };
    dedup(acts)
}

// [Turn Action Check]
fn calc_possible_turn_actions(obs: &Observation) -> Vec<Action> {
    if obs.incoming.is_none() {
        // 鳴きの後は手牌から打牌するのみ
        return check_replace(obs);
    }

    let mut acts = vec![Action::discard()];
    if obs.is_reach() {
        acts.append(&mut check_tsumo(obs));
        return acts;
    }

    acts.append(&mut check_replace(obs));
    if obs.can_kan {
        acts.append(&mut check_kakan(obs));
        acts.append(&mut check_ankan(obs));
    }
    acts.append(&mut check_reach(obs));
    acts.append(&mut check_tsumo(obs));
    acts
}

fn check_replace(obs: &Observation) -> Vec<Action> {
    obs.hand.iter().map(|&t| Action::replace(t)).collect()
}

fn check_tsumo(obs: &Observation) -> Vec<Action> {
    if is_complete(&obs.hand_with_incoming(), &obs.calls).is_some() {
        vec![Action::tsumo()]
    } else {
        vec![]
    }
}

// ポンしている牌を手牌(ツモ牌を含む)に持っている場合
pub fn check_kakan(obs: &Observation) -> Vec<Action> {
    let tiles = obs.hand_with_incoming();
    let mut acts = vec![];
    for m in &obs.calls {
        if m.meld_type != MeldType::Pon {
            continue;
        }
        for t in tiles_with_red5(&tiles, m.base_tile()) {
            if let Ok(act) = Action::kakan_with(&m.to_string(), t) {
                acts.push(act);
            }
        }
    }
    acts
}

// 同じ種類の牌(赤5を区別しない)を4枚持っている場合
pub fn check_ankan(obs: &Observation) -> Vec<Action> {
    let mut tiles = obs.hand_with_incoming();
    tiles.sort();
    let mut acts = vec![];
    for w in tiles.windows(TILE) {
        let k = w[0].kind_index();
        if w.iter().all(|t| t.kind_index() == k) {
            acts.push(Action::ankan([w[0], w[1], w[2], w[3]]));
        }
    }
    acts
}

// 切ると聴牌になる牌. ツモ牌を切る場合は r60
pub fn check_reach(obs: &Observation) -> Vec<Action> {
    if obs.is_reach() || obs.credit() < REACH_COST || obs.tiles_left < REACH_TILES_LEFT {
        return vec![];
    }

    let candidates = reach_candidates(&obs.hand_with_incoming(), &obs.calls);
    let mut acts = vec![];
    for &t in &candidates {
        if obs.hand.contains(t) {
            acts.push(Action::reach(t));
        }
    }
    if let Some(t) = obs.incoming {
        if candidates.contains(&t) {
            acts.push(Action::reach_drawn());
        }
    }
    acts
}

// [Call Action Check]
fn calc_possible_call_actions(obs: &Observation) -> Vec<Action> {
    let mut acts = vec![Action::noop()];
    if obs.tiles_left > 0 && !obs.is_reach() {
        acts.append(&mut check_chii(obs));
        acts.append(&mut check_pon(obs));
        if obs.can_kan {
            acts.append(&mut check_minkan(obs));
        }
    }
    acts.append(&mut check_ron(obs, None));
    acts
}

pub fn check_chii(obs: &Observation) -> Vec<Action> {
    let d = match obs.incoming {
        Some(d) if d.is_suit() => d,
        _ => return vec![],
    };
    if calc_seat_offset(obs.seat, obs.active_seat) != 3 || obs.is_reach() {
        return vec![];
    }

    let (ti, ni) = (d.ti(), d.rank());
    let mut check: Vec<(Tnum, Tnum)> = vec![];
    if 3 <= ni {
        check.push((ni - 2, ni - 1)); // 右端をチー
    }
    if (2..=8).contains(&ni) {
        check.push((ni - 1, ni + 1)); // 嵌張をチー
    }
    if ni <= 7 {
        check.push((ni + 1, ni + 2)); // 左端をチー
    }

    let h = obs.hand.tiles();
    let mut acts = vec![];
    for (ni0, ni1) in check {
        for t0 in tiles_with_red5(h, Tile::from_index(ti, ni0)) {
            for t1 in tiles_with_red5(h, Tile::from_index(ti, ni1)) {
                acts.push(Action::chii(d, [t0, t1]));
            }
        }
    }
    acts
}

pub fn check_pon(obs: &Observation) -> Vec<Action> {
    let d = match obs.incoming {
        Some(d) => d,
        None => return vec![],
    };
    let rel = calc_seat_offset(obs.seat, obs.active_seat);
    if rel == 0 || obs.is_reach() {
        return vec![];
    }

    let h = obs.hand.tiles();
    let t = d.to_normal();
    let n = count_tile(h, t);
    let mut acts = vec![];
    if n >= 2 {
        acts.push(Action::pon(d, [t, t], rel));
    }
    if t.is_suit() && t.rank() == 5 {
        let r = Tile::from_index(t.ti(), 0);
        let nr = count_tile(h, r);
        if nr >= 1 && n >= 1 {
            acts.push(Action::pon(d, [r, t], rel)); // 手牌の赤5を含むポン
        }
        if nr >= 2 {
            acts.push(Action::pon(d, [r, r], rel));
        }
    }
    acts
}

pub fn check_minkan(obs: &Observation) -> Vec<Action> {
    let d = match obs.incoming {
        Some(d) => d,
        None => return vec![],
    };
    let rel = calc_seat_offset(obs.seat, obs.active_seat);
    if rel == 0 || obs.is_reach() {
        return vec![];
    }

    let k = d.kind_index();
    let same: Vec<Tile> = obs.hand.iter().copied().filter(|t| t.kind_index() == k).collect();
    if same.len() != 3 {
        return vec![];
    }
    vec![Action::minkan(d, [same[0], same[1], same[2]], rel)]
}

// 槍槓の場合,加槓以外(暗槓,明槓)は国士無双のみ
pub fn check_ron(obs: &Observation, chankan: Option<MeldType>) -> Vec<Action> {
    if obs.incoming.is_none() || obs.seat == obs.active_seat {
        return vec![];
    }
    let shape = match is_complete(&obs.hand_with_incoming(), &obs.calls) {
        Some(s) => s,
        None => return vec![],
    };
    match chankan {
        Some(MeldType::Kakan) | None => vec![Action::ron()],
        Some(_) if shape == WinShape::ThirteenOrphans => vec![Action::ron()],
        Some(_) => vec![],
    }
}

fn dedup(acts: Vec<Action>) -> Vec<Action> {
    let mut res: Vec<Action> = vec![];
    for a in acts {
        if !res.contains(&a) {
            res.push(a);
        }
    }
    res
}

#[cfg(test)]
fn observation(
    hand: &str,
    seat: Seat,
    active: Seat,
    state: PlayerState,
    incoming: Option<&str>,
) -> Observation {
    let mut stg = Stage::default();
    stg.players[seat].hand = Deck::parse(hand).unwrap();
    for s in 0..SEAT {
        stg.players[s].credit = 25000;
    }
    stg.active_seat = active;
    stg.tiles_left = 50;
    stg.replacements_left = 4;
    let incoming = incoming.map(|s| Tile::from_symbol(s).unwrap());
    Observation::new(&stg, seat, state, incoming)
}

#[cfg(test)]
fn has(acts: &[Action], tp: ActionType) -> bool {
    acts.iter().any(|a| a.action_type == tp)
}

#[test]
fn test_active_actions() {
    let obs = observation("123m456p789s1122z", 0, 0, PlayerState::Active, Some("3z"));
    let acts = calc_possible_actions(&obs);
    assert_eq!(acts[0], Action::discard());
    assert!(has(&acts, ActionType::Replace));
    assert!(!has(&acts, ActionType::Tsumo));
    // ツモ牌の3zを切ってリーチ
    assert!(acts.contains(&Action::reach_drawn()));
    assert!(!acts.contains(&Action::reach(Tile::from_symbol("1z").unwrap())));
    // 手牌の重複はひとつにまとめる
    let n = acts
        .iter()
        .filter(|a| **a == Action::replace(Tile::from_symbol("1z").unwrap()))
        .count();
    assert_eq!(n, 1);

    // 手牌の5zを切ってリーチ
    let obs = observation("123m456p789s1125z", 0, 0, PlayerState::Active, Some("2z"));
    let acts = calc_possible_actions(&obs);
    assert!(acts.contains(&Action::reach(Tile::from_symbol("5z").unwrap())));
    assert!(!acts.contains(&Action::reach_drawn()));

    let obs = observation("123m456p789s1122z", 0, 0, PlayerState::Active, Some("2z"));
    let acts = calc_possible_actions(&obs);
    assert!(has(&acts, ActionType::Tsumo));
}

#[test]
fn test_active_reach_state() {
    let mut obs = observation("123m456p789s1122z", 0, 0, PlayerState::Active, Some("3z"));
    obs.reach[0] = true;
    assert_eq!(calc_possible_actions(&obs), vec![Action::discard()]);

    obs.incoming = Tile::from_symbol("1z").ok();
    assert_eq!(calc_possible_actions(&obs), vec![Action::discard(), Action::tsumo()]);
}

#[test]
fn test_reach_conditions() {
    let mut obs = observation("123m456p789s1122z", 0, 0, PlayerState::Active, Some("3z"));
    obs.credits[0] = 900;
    assert!(!has(&calc_possible_actions(&obs), ActionType::Reach));

    let mut obs = observation("123m456p789s1122z", 0, 0, PlayerState::Active, Some("3z"));
    obs.tiles_left = 3;
    assert!(!has(&calc_possible_actions(&obs), ActionType::Reach));

    // ポンしている場合は不可
    let mut obs = observation("123m456p789s22z", 0, 0, PlayerState::Active, Some("3z"));
    obs.calls = vec![Meld::parse("41p4141").unwrap()];
    assert!(!has(&calc_possible_actions(&obs), ActionType::Reach));
}

#[test]
fn test_active_after_call() {
    let obs = observation("123m456p789s22z", 0, 0, PlayerState::Active, None);
    let acts = calc_possible_actions(&obs);
    assert_eq!(acts.len(), 10);
    assert!(acts.iter().all(|a| a.action_type == ActionType::Replace));
}

#[test]
fn test_kan_actions() {
    let obs = observation("1111m456p789s122z", 0, 0, PlayerState::Active, Some("3z"));
    let acts = calc_possible_actions(&obs);
    assert!(acts.contains(&Action::new(ActionType::Ankan, "111111a11")));

    // 赤5を含む暗槓
    let obs = observation("055m456p789s1122z", 0, 0, PlayerState::Active, Some("5m"));
    let acts = calc_possible_actions(&obs);
    assert!(acts.contains(&Action::new(ActionType::Ankan, "151515a51")));

    let mut obs = observation("123m456p789s2z", 0, 0, PlayerState::Active, Some("1z"));
    obs.calls = vec![Meld::parse("41p4141").unwrap()];
    let acts = calc_possible_actions(&obs);
    assert!(acts.contains(&Action::new(ActionType::Kakan, "41k414141")));

    // 嶺上牌が残っていない場合は不可
    obs.can_kan = false;
    assert!(!has(&calc_possible_actions(&obs), ActionType::Kakan));
}

#[test]
fn test_chii() {
    // 上家(seat3)の打牌
    let obs = observation("3467m", 0, 3, PlayerState::Passive, Some("5m"));
    let acts = check_chii(&obs);
    assert_eq!(acts.len(), 3); // 345, 456, 567

    // 対面からはチー不可
    let obs = observation("3467m", 0, 2, PlayerState::Passive, Some("5m"));
    assert!(check_chii(&obs).is_empty());

    // 赤5と通常の5の両方を持っている場合は別の候補
    let obs = observation("4055m", 1, 0, PlayerState::Passive, Some("3m"));
    let acts = check_chii(&obs);
    assert!(acts.contains(&Action::new(ActionType::Chii, "c131415")));
    assert!(acts.contains(&Action::new(ActionType::Chii, "c131451")));
    assert_eq!(acts.len(), 2);

    // 字牌は不可
    let obs = observation("11z23z", 1, 0, PlayerState::Passive, Some("1z"));
    assert!(check_chii(&obs).is_empty());
}

#[test]
fn test_pon() {
    let obs = observation("11z", 2, 0, PlayerState::Passive, Some("1z"));
    assert_eq!(check_pon(&obs), vec![Action::new(ActionType::Pon, "41p4141")]);
    let obs = observation("11z", 1, 0, PlayerState::Passive, Some("1z"));
    assert_eq!(check_pon(&obs), vec![Action::new(ActionType::Pon, "4141p41")]);

    let obs = observation("055s", 1, 0, PlayerState::Passive, Some("5s"));
    let acts = check_pon(&obs);
    assert_eq!(acts.len(), 2);
    assert!(acts.contains(&Action::pon(
        Tile::from_symbol("5s").unwrap(),
        [Tile::from_symbol("0s").unwrap(), Tile::from_symbol("5s").unwrap()],
        3
    )));

    let mut obs = observation("11z", 2, 0, PlayerState::Passive, Some("1z"));
    obs.reach[2] = true;
    assert!(check_pon(&obs).is_empty());
}

#[test]
fn test_passive_actions() {
    let obs = observation("111z", 2, 0, PlayerState::Passive, Some("1z"));
    let acts = calc_possible_actions(&obs);
    assert_eq!(acts[0], Action::noop());
    assert!(has(&acts, ActionType::Pon));
    assert!(acts.contains(&Action::new(ActionType::Minkan, "41m414141")));

    let obs = observation("123m456p789s1122z", 1, 0, PlayerState::Passive, Some("2z"));
    let acts = calc_possible_actions(&obs);
    assert!(has(&acts, ActionType::Ron));

    // 河底ではロンのみ
    let mut obs = observation("123m456p789s1122z", 1, 0, PlayerState::Passive, Some("2z"));
    obs.tiles_left = 0;
    assert_eq!(calc_possible_actions(&obs), vec![Action::noop(), Action::ron()]);
}

#[test]
fn test_chankan() {
    let hand = "123m456p789s1122z";
    let obs = observation(hand, 1, 0, PlayerState::Chankan(MeldType::Kakan), Some("2z"));
    assert_eq!(calc_possible_actions(&obs), vec![Action::noop(), Action::ron()]);
    let obs = observation(hand, 1, 0, PlayerState::Chankan(MeldType::Ankan), Some("2z"));
    assert_eq!(calc_possible_actions(&obs), vec![Action::noop()]);

    let obs = observation(
        "19m19p19s1234567z",
        1,
        0,
        PlayerState::Chankan(MeldType::Ankan),
        Some("1m"),
    );
    assert_eq!(calc_possible_actions(&obs), vec![Action::noop(), Action::ron()]);
}

#[test]
fn test_end_game() {
    let obs = observation("123m456p789s1122z", 1, 0, PlayerState::EndGame, None);
    assert_eq!(calc_possible_actions(&obs), vec![Action::ten(), Action::noten()]);
    let obs = observation("147m258p369s3456z", 1, 0, PlayerState::EndGame, None);
    assert_eq!(calc_possible_actions(&obs), vec![Action::noten()]);
}
