use super::calculator::*;
use crate::error::HandValueError;
use crate::model::*;

// (ロン, ツモ時の子の支払い, ツモ時の親の支払い)
// 親の和了の場合は (ロン, ツモ時の子の支払い, 0)
pub type Points = (Score, Score, Score);

fn ceil(n: Score) -> Score {
    (n + 99) / 100 * 100
}

fn calc_base_point(fu: usize, fan: usize, yakuman: usize) -> Score {
    (if yakuman == 0 {
        let base = fu * 2_usize.pow(fan as u32 + 2);
        if base >= 2000 || fan >= 5 {
            match fan {
                0..=5 => 2000,   // 満貫
                6..=7 => 3000,   // 跳満
                8..=10 => 4000,  // 倍満
                11..=12 => 6000, // 三倍満
                _ => 8000,       // 数え役満
            }
        } else {
            base
        }
    } else {
        8000 * yakuman
    }) as Score
}

pub fn get_score_title(base_point: Score, yakuman: usize) -> String {
    match yakuman {
        0 => match base_point {
            2000 => "満貫",
            3000 => "跳満",
            4000 => "倍満",
            6000 => "三倍満",
            8000 => "数え役満",
            _ => "",
        },
        1 => "役満",
        2 => "二倍役満",
        3 => "三倍役満",
        _ => "N倍役満",
    }
    .to_string()
}

pub fn calc_points(is_dealer: bool, fu: usize, fan: usize, yakuman: usize) -> (Points, String) {
    let base = calc_base_point(fu, fan, yakuman);
    let title = get_score_title(base, yakuman);
    if is_dealer {
        ((ceil(base * 6), ceil(base * 2), 0), title)
    } else {
        ((ceil(base * 4), ceil(base), ceil(base * 2)), title)
    }
}

// [簡易点数計算]
// 和了のタイミングで成立する役とドラのみを数え,符は30符固定
// 手役(断么九,役牌など)は判定しない
#[derive(Debug, Clone, Default)]
pub struct BasicCalculator;

const FIXED_FU: usize = 30;

impl HandValueCalculator for BasicCalculator {
    fn calculate(&self, req: &HandRequest) -> Result<HandResponse, HandValueError> {
        if req.tiles.len() < 14 || !req.tiles.contains(&req.win_tile) {
            return Err(HandValueError::Malformed(format!(
                "{} tiles, win tile {}",
                req.tiles.len(),
                req.win_tile
            )));
        }

        let cfg = &req.config;
        let is_menzen = req.melds.iter().all(|m| !m.opened);
        let mut yaku: Vec<(&str, usize)> = vec![];
        let mut yakuman = 0;
        if cfg.is_tenhou {
            yaku.push(("tenhou", 13));
            yakuman += 1;
        }
        if cfg.is_chiihou {
            yaku.push(("chiihou", 13));
            yakuman += 1;
        }
        if cfg.is_nagashi_mangan {
            yaku.push(("nagashi_mangan", 5));
        }
        if cfg.is_daburu_riichi {
            yaku.push(("double_riichi", 2));
        } else if cfg.is_riichi {
            yaku.push(("riichi", 1));
        }
        if cfg.is_ippatsu && cfg.options.enable_ippatsu {
            yaku.push(("ippatsu", 1));
        }
        if cfg.is_tsumo && is_menzen {
            yaku.push(("menzen_tsumo", 1));
        }
        if cfg.is_rinshan {
            yaku.push(("rinshan_kaihou", 1));
        }
        if cfg.is_chankan {
            yaku.push(("chankan", 1));
        }
        if cfg.is_haitei {
            yaku.push(("haitei_raoyue", 1));
        }
        if cfg.is_houtei {
            yaku.push(("houtei_raoyui", 1));
        }

        let mut han: usize = yaku.iter().map(|y| y.1).sum();
        if yaku.is_empty() || (yakuman == 0 && han < cfg.options.min_yaku.max(1)) {
            return Err(HandValueError::NoYaku);
        }

        let mut names: Vec<String> = yaku.iter().map(|y| y.0.to_string()).collect();
        if yakuman == 0 {
            let mut dora = count_dora(&req.tiles, &req.dora_indicators);
            if cfg.is_riichi || cfg.is_daburu_riichi {
                dora += count_dora(&req.tiles, &req.ura_dora_indicators);
            }
            dora += count_red(&req.tiles, cfg.options.red_dora);
            for _ in 0..dora {
                names.push("dora".to_string());
            }
            han += dora;
        }

        let is_dealer = cfg.player_wind == WE;
        let (points, _) = calc_points(is_dealer, FIXED_FU, han, yakuman);
        let cost = if !cfg.is_tsumo {
            HandCost {
                main: points.0,
                additional: 0,
            }
        } else if is_dealer {
            HandCost {
                main: points.1,
                additional: points.1,
            }
        } else {
            HandCost {
                main: points.2,
                additional: points.1,
            }
        };

        Ok(HandResponse {
            han,
            fu: FIXED_FU,
            cost,
            yaku: names,
        })
    }
}

// ドラ表示牌の次の牌の種類 (34種のindex)
pub fn next_dora_kind(kind: usize) -> usize {
    if kind < 27 {
        kind / 9 * 9 + (kind % 9 + 1) % 9
    } else if kind < 31 {
        27 + (kind - 27 + 1) % 4 // 風牌
    } else {
        31 + (kind - 31 + 1) % 3 // 三元牌
    }
}

fn count_dora(tiles: &[usize], indicators: &[usize]) -> usize {
    indicators
        .iter()
        .map(|&i| {
            let k = next_dora_kind(i / TILE);
            tiles.iter().filter(|&&t| t / TILE == k).count()
        })
        .sum()
}

// 赤5は各牌種の5の先頭の枠 (赤4枚ルールの筒子は2枠)
fn count_red(tiles: &[usize], red_dora: usize) -> usize {
    let slots: [usize; 3] = match red_dora {
        0 => [0, 0, 0],
        4 => [1, 2, 1],
        _ => [1, 1, 1],
    };
    tiles
        .iter()
        .filter(|&&t| {
            let (kind, slot) = (t / TILE, t % TILE);
            kind < 27 && kind % 9 == 4 && slot < slots[kind / 9]
        })
        .count()
}

#[test]
fn test_calc_points() {
    let ((ron, ko, oya), _) = calc_points(false, 30, 1, 0);
    assert_eq!((ron, ko, oya), (1000, 300, 500));
    let ((ron, ko, _), _) = calc_points(true, 30, 2, 0);
    assert_eq!((ron, ko), (2900, 1000));
    let ((ron, _, _), title) = calc_points(false, 30, 5, 0);
    assert_eq!((ron, title.as_str()), (8000, "満貫"));
    let ((ron, _, _), title) = calc_points(true, 30, 13, 0);
    assert_eq!((ron, title.as_str()), (48000, "数え役満"));
    let ((ron, _, _), title) = calc_points(false, 0, 0, 1);
    assert_eq!((ron, title.as_str()), (32000, "役満"));
}

#[test]
fn test_next_dora_kind() {
    assert_eq!(next_dora_kind(0), 1); // 1m -> 2m
    assert_eq!(next_dora_kind(8), 0); // 9m -> 1m
    assert_eq!(next_dora_kind(17), 9); // 9p -> 1p
    assert_eq!(next_dora_kind(30), 27); // 北 -> 東
    assert_eq!(next_dora_kind(33), 31); // 中 -> 白
}

#[cfg(test)]
fn request(hand: &str, win: &str, config: HandConfig) -> HandRequest {
    let hand = Deck::parse(hand).unwrap();
    HandRequest::new(
        hand.tiles(),
        &[],
        Tile::from_symbol(win).unwrap(),
        &[Tile::from_symbol("9s").unwrap()],
        &[Tile::from_symbol("1z").unwrap()],
        config,
    )
}

#[test]
fn test_basic_calculator() {
    let calc = BasicCalculator;

    // 役なし
    let req = request("23m406p789s11122z", "1m", HandConfig::default());
    assert_eq!(calc.calculate(&req), Err(HandValueError::NoYaku));

    // 子のリーチ,ロン: リーチ1 + 赤1 + 裏(2z)2 = 4翻30符
    let config = HandConfig {
        is_riichi: true,
        player_wind: WS,
        round_wind: WE,
        ..Default::default()
    };
    let res = calc.calculate(&request("23m406p789s11122z", "1m", config)).unwrap();
    assert_eq!(res.han, 4);
    assert_eq!(res.fu, 30);
    assert_eq!(res.cost, HandCost { main: 7700, additional: 0 });
    assert!(res.yaku.contains(&"riichi".to_string()));

    // 親の門前ツモ
    let config = HandConfig {
        is_tsumo: true,
        player_wind: WE,
        round_wind: WE,
        options: Rule {
            red_dora: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let res = calc.calculate(&request("23m456p789s11122z", "1m", config)).unwrap();
    assert_eq!(res.han, 1);
    assert_eq!(res.cost, HandCost { main: 500, additional: 500 });

    let req = HandRequest {
        tiles: vec![0, 1, 2],
        ..request("23m456p789s11122z", "1m", HandConfig::default())
    };
    assert!(matches!(calc.calculate(&req), Err(HandValueError::Malformed(_))));
}
