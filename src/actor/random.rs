use rand::prelude::*;
use rand::rngs::StdRng;

use super::*;

use ActionType::*;

fn seed_of(config: &Config) -> u64 {
    config.arg("seed").and_then(|v| v.as_int()).unwrap_or(0) as u64
}

pub struct RandomDiscardBuilder;

impl ActorBuilder for RandomDiscardBuilder {
    fn get_default_config(&self) -> Config {
        Config {
            name: "RandomDiscard".to_string(),
            args: vec![Arg::int("seed", 0), Arg::bool("win", false)],
        }
    }

    fn create(&self, config: Config) -> Box<dyn Actor> {
        Box::new(RandomDiscard::from_config(config))
    }
}

// 手牌とツモ牌から無作為に打牌. 鳴きは行わない
// win=trueの場合はツモ,ロンが可能なら和了
#[derive(Clone)]
pub struct RandomDiscard {
    config: Config,
    rng: StdRng,
    win: bool,
}

impl RandomDiscard {
    pub fn from_config(config: Config) -> Self {
        let rng = StdRng::seed_from_u64(seed_of(&config));
        let win = config.arg("win").and_then(|v| v.as_bool()).unwrap_or(false);
        Self { config, rng, win }
    }
}

impl Actor for RandomDiscard {
    fn select(&mut self, _obs: &Observation, acts: &[Action]) -> Action {
        if self.win {
            if let Some(a) = acts.iter().find(|a| matches!(a.action_type, Tsumo | Ron)) {
                return a.clone();
            }
        }
        let discards: Vec<&Action> = acts
            .iter()
            .filter(|a| matches!(a.action_type, Discard | Replace))
            .collect();
        if let Some(&a) = discards.choose(&mut self.rng) {
            return a.clone();
        }
        acts.iter()
            .find(|a| matches!(a.action_type, Noop | Noten))
            .unwrap_or(&acts[0])
            .clone()
    }

    fn get_config(&self) -> &Config {
        &self.config
    }
}

pub struct RandomBuilder;

impl ActorBuilder for RandomBuilder {
    fn get_default_config(&self) -> Config {
        Config {
            name: "Random".to_string(),
            args: vec![Arg::int("seed", 0)],
        }
    }

    fn create(&self, config: Config) -> Box<dyn Actor> {
        Box::new(Random::from_config(config))
    }
}

// 選択可能なActionから一様に選択
#[derive(Clone)]
pub struct Random {
    config: Config,
    rng: StdRng,
}

impl Random {
    pub fn from_config(config: Config) -> Self {
        let rng = StdRng::seed_from_u64(seed_of(&config));
        Self { config, rng }
    }

    pub fn new(seed: u64) -> Self {
        let mut config = RandomBuilder {}.get_default_config();
        config.args[0].value = Variant::Int(seed as i64);
        Self::from_config(config)
    }
}

impl Actor for Random {
    fn select(&mut self, _obs: &Observation, acts: &[Action]) -> Action {
        acts.choose(&mut self.rng).unwrap_or(&acts[0]).clone()
    }

    fn get_config(&self) -> &Config {
        &self.config
    }
}

#[test]
fn test_random_discard() {
    let obs = Observation::new(&Stage::default(), 0, PlayerState::Active, None);
    let mut a = RandomDiscard::from_config(RandomDiscardBuilder {}.get_default_config());
    let t = Tile::new(11).unwrap();
    let acts = vec![Action::discard(), Action::replace(t), Action::tsumo()];
    for _ in 0..20 {
        let act = a.select(&obs, &acts);
        assert!(matches!(act.action_type, Discard | Replace));
    }
    let acts = vec![Action::noop(), Action::pon(t, [t, t], 1)];
    assert_eq!(a.select(&obs, &acts), Action::noop());

    // 和了する設定
    let mut config = RandomDiscardBuilder {}.get_default_config();
    config.args[1].value = Variant::Bool(true);
    let mut a = RandomDiscard::from_config(config);
    let acts = vec![Action::discard(), Action::replace(t), Action::tsumo()];
    assert_eq!(a.select(&obs, &acts), Action::tsumo());
    let acts = vec![Action::noop(), Action::ron()];
    assert_eq!(a.select(&obs, &acts), Action::ron());
}

#[test]
fn test_random_seeded() {
    let obs = Observation::new(&Stage::default(), 0, PlayerState::Active, None);
    let acts: Vec<Action> = [11, 12, 13, 14, 15]
        .iter()
        .map(|&id| Action::replace(Tile::new(id).unwrap()))
        .collect();
    let mut a1 = Random::new(3);
    let mut a2 = Random::new(3);
    for _ in 0..10 {
        let act = a1.select(&obs, &acts);
        assert!(acts.contains(&act));
        assert_eq!(act, a2.select(&obs, &acts));
    }
}
