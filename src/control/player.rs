use tracing::warn;

use super::possible_actions::calc_possible_actions;
use crate::actor::{Actor, Manual};
use crate::model::*;
use crate::util::misc::vec_to_string;

// 座席に着くプレイヤー
// 局の状態は持たず,観測情報からActionを選択するのみ
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    actor: Box<dyn Actor>,
}

impl Player {
    pub fn new(name: impl Into<String>, actor: Box<dyn Actor>) -> Self {
        Self {
            name: name.into(),
            actor,
        }
    }

    // 標準入力から操作するプレイヤー
    pub fn manual(name: impl Into<String>) -> Self {
        Self::new(name, Box::new(Manual::new()))
    }

    pub fn init(&mut self, seat: Seat) {
        self.actor.init(seat);
    }

    #[inline]
    pub fn actor(&self) -> &dyn Actor {
        self.actor.as_ref()
    }

    pub fn action_space(&self, obs: &Observation) -> Vec<Action> {
        calc_possible_actions(obs)
    }

    // actsから1つを選択. 選択肢が1つの場合はActorに問い合わせない
    pub fn act(&mut self, obs: &Observation, acts: &[Action]) -> Action {
        match acts.len() {
            0 => return Action::noop(),
            1 => return acts[0].clone(),
            _ => {}
        }

        let act = self.actor.select(obs, acts);
        if acts.contains(&act) {
            act
        } else {
            warn!(
                "{}: action {} not found in {}. {} is selected instead",
                self.name,
                act,
                vec_to_string(acts),
                acts[0]
            );
            acts[0].clone()
        }
    }
}

#[cfg(test)]
#[derive(Clone)]
struct Fixed(crate::actor::Config, Action);

#[cfg(test)]
impl Actor for Fixed {
    fn select(&mut self, _obs: &Observation, _acts: &[Action]) -> Action {
        self.1.clone()
    }

    fn get_config(&self) -> &crate::actor::Config {
        &self.0
    }
}

#[test]
fn test_player_act() {
    let config = crate::actor::Config {
        name: "Fixed".to_string(),
        args: vec![],
    };
    let mut pl = Player::new("p0", Box::new(Fixed(config, Action::ron())));
    let obs = Observation::new(&Stage::default(), 0, PlayerState::Passive, None);

    // 選択肢にあればそのまま
    let acts = vec![Action::noop(), Action::ron()];
    assert_eq!(pl.act(&obs, &acts), Action::ron());
    // 選択肢にない場合は先頭
    let acts = vec![Action::noop(), Action::pon(Tile::new(11).unwrap(), [Tile::new(11).unwrap(); 2], 1)];
    assert_eq!(pl.act(&obs, &acts), Action::noop());
    // 選択肢が1つ
    assert_eq!(pl.act(&obs, &[Action::noten()]), Action::noten());
    assert_eq!(format!("{:?}", pl.actor()), "Fixed()");
}
