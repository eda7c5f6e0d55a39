use proptest::prelude::*;

use mahjong_env::actor::{create_actor, Nop, Random};
use mahjong_env::control::common::calc_seat_offset;
use mahjong_env::control::{MahjongGame, Player, Step, Wall};
use mahjong_env::error::GameError;
use mahjong_env::hand::BasicCalculator;
use mahjong_env::model::*;

fn random_players(seed: u64) -> [Player; SEAT] {
    [
        Player::new("random0", Box::new(Random::new(seed))),
        Player::new("random1", Box::new(Random::new(seed + 1))),
        Player::new("discard", create_actor(&format!("RandomDiscard({},true)", seed)).unwrap()),
        Player::new("nop", Box::new(Nop::new())),
    ]
}

fn total_points(stg: &Stage) -> Score {
    stg.credits().iter().sum::<Score>() + stg.reach_sticks as Score * 1000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // 無作為な選択でも規則違反にならず,点数の合計が保存される
    #[test]
    fn test_random_game(seed in 1u64..100000) {
        let rule = Rule::default();
        let mut game =
            MahjongGame::new(rule, random_players(seed), Box::new(BasicCalculator), Some(seed)).unwrap();
        for _ in 0..4 {
            match game.play() {
                Ok(end) => {
                    prop_assert_eq!(end.deltas.iter().sum::<Score>() % 1000, 0);
                }
                Err(GameError::RuleViolation { reason, .. }) => {
                    prop_assert!(false, "rule violation: {}", reason);
                }
                Err(e) => prop_assert!(false, "{}", e),
            }
            prop_assert_eq!(total_points(game.stage()), 100000);
            if game.is_busted() {
                break;
            }
            game.next_hand().unwrap();
        }
    }

    // 同じseedなら同じ牌山
    #[test]
    fn test_wall_determinism(seed in any::<u64>()) {
        let rule = Rule::default();
        let w1 = Wall::new(&rule, Some(seed)).unwrap();
        let w2 = Wall::new(&rule, Some(seed)).unwrap();
        prop_assert_eq!(w1.ids(), w2.ids());
        prop_assert_eq!(w1.tiles().len(), WALL_SIZE);

        let w3 = Wall::from_json(&w1.to_json().unwrap()).unwrap();
        prop_assert_eq!(w1.ids(), w3.ids());
    }

    #[test]
    fn test_deck_compact_string(ids in prop::collection::vec(prop::sample::select(VALID_IDS[1..].to_vec()), 0..14)) {
        let deck = Deck::from_ids(&ids).unwrap();
        let parsed = Deck::parse(&deck.compact_string()).unwrap();
        prop_assert_eq!(parsed, deck);
    }
}

#[test]
fn test_step_until_end() {
    let rule = Rule::default();
    let players = [
        Player::new("a", create_actor("RandomDiscard(7)").unwrap()),
        Player::new("b", Box::new(Nop::new())),
        Player::new("c", Box::new(Nop::new())),
        Player::new("d", Box::new(Nop::new())),
    ];
    let mut game = MahjongGame::new(rule, players, Box::new(BasicCalculator), Some(7)).unwrap();
    let mut n = 0;
    let end = loop {
        match game.step().unwrap() {
            Step::Continue => n += 1,
            Step::Ended(end) => break end,
        }
    };
    assert!(n > 0);
    assert!(game.result().is_some());
    assert_eq!(end.deltas.iter().sum::<Score>() % 1000, 0);
    assert_eq!(total_points(game.stage()), 100000);
}

#[test]
fn test_pon_marker_position() {
    let t = Tile::from_symbol("9m").unwrap();
    // seat0の捨て牌をseat1(上家から見て下家)がポン
    let rel = calc_seat_offset(1, 0);
    assert_eq!(rel, 3);
    let a1 = Action::pon(t, [t, t], rel);
    // seat0の捨て牌をseat2(対面)がポン
    let a2 = Action::pon(t, [t, t], calc_seat_offset(2, 0));
    assert_eq!(a2.action_string, "19p1919");
    assert_ne!(a1.action_string, a2.action_string);

    let m1 = Meld::from_action(&a1).unwrap();
    let m2 = Meld::from_action(&a2).unwrap();
    assert_eq!(m1.rel(), 3);
    assert_eq!(m2.rel(), 2);
    assert_eq!(m1.called_tile(), Some(t));
    assert_eq!(m1.base_tile(), t);
}

#[test]
fn test_action_tiles() {
    let t = |s: &str| Tile::from_symbol(s).unwrap();
    let act = Action::chii(t("3s"), [t("5s"), t("4s")]);
    assert_eq!(act.tiles().unwrap(), vec![t("3s"), t("4s"), t("5s")]);

    let pon = Action::pon(t("0p"), [t("5p"), t("5p")], 1);
    let kakan = Action::kakan(&pon.action_string).unwrap();
    assert_eq!(kakan.action_type, ActionType::Kakan);
    assert_eq!(kakan.tiles().unwrap().len(), 4);

    assert_eq!(Action::reach_drawn().reach_tile().unwrap(), None);
    assert_eq!(Action::reach(t("1z")).reach_tile().unwrap(), Some(t("1z")));
}

#[test]
fn test_tile_name() {
    for &id in VALID_IDS[1..].iter() {
        let t = Tile::new(id).unwrap();
        assert_eq!(Tile::from_symbol(&t.name()).unwrap(), t);
        assert_eq!(t.to_string().parse::<Tile>().unwrap(), t);
    }
    assert_eq!((0..KIND).filter(|&k| Tile::from_kind(k).is_end()).count(), 13);
    assert!(Tile::new(0).unwrap().is_none());
    assert!(Tile::new(10).is_err());
    assert!(Tile::from_symbol("8z").is_err());
}
