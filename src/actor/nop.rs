use super::*;

use ActionType::*;

pub struct NopBuilder;

impl ActorBuilder for NopBuilder {
    fn get_default_config(&self) -> Config {
        Config {
            name: "Nop".to_string(),
            args: vec![],
        }
    }

    fn create(&self, config: Config) -> Box<dyn Actor> {
        Box::new(Nop::from_config(config))
    }
}

// ツモ切りと鳴きのスキップのみを行う
#[derive(Clone)]
pub struct Nop {
    config: Config,
}

impl Nop {
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn new() -> Self {
        Self::from_config(NopBuilder {}.get_default_config())
    }
}

impl Default for Nop {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for Nop {
    fn select(&mut self, _obs: &Observation, acts: &[Action]) -> Action {
        for tp in [Discard, Noop, Noten] {
            if let Some(a) = acts.iter().find(|a| a.action_type == tp) {
                return a.clone();
            }
        }
        // 鳴きの後は手牌の先頭を切る
        acts[0].clone()
    }

    fn get_config(&self) -> &Config {
        &self.config
    }
}

#[test]
fn test_nop_select() {
    let obs = Observation::new(&Stage::default(), 0, PlayerState::Passive, None);
    let mut nop = Nop::new();
    let acts = vec![Action::noop(), Action::ron()];
    assert_eq!(nop.select(&obs, &acts), Action::noop());
    let acts = vec![Action::discard(), Action::tsumo()];
    assert_eq!(nop.select(&obs, &acts), Action::discard());
    let t = Tile::new(11).unwrap();
    assert_eq!(nop.select(&obs, &[Action::replace(t)]), Action::replace(t));
}
