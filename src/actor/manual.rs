use super::*;
use crate::util::misc::prompt;

use ActionType::*;

pub struct ManualBuilder;

impl ActorBuilder for ManualBuilder {
    fn get_default_config(&self) -> Config {
        Config {
            name: "Manual".to_string(),
            args: vec![],
        }
    }

    fn create(&self, config: Config) -> Box<dyn Actor> {
        Box::new(Manual::from_config(config))
    }
}

// 標準入力からActionを選択
// 入力はActionの番号または牌の記号 (例: 5m -> 手牌の5mを切る)
#[derive(Clone)]
pub struct Manual {
    config: Config,
    seat: Seat,
}

impl Manual {
    pub fn from_config(config: Config) -> Self {
        Self { config, seat: 0 }
    }

    pub fn new() -> Self {
        Self::from_config(ManualBuilder {}.get_default_config())
    }
}

impl Default for Manual {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for Manual {
    fn init(&mut self, seat: Seat) {
        self.seat = seat;
    }

    fn select(&mut self, obs: &Observation, acts: &[Action]) -> Action {
        let mut hand_str = obs.hand.unicode_string();
        match obs.state {
            PlayerState::Active => {
                println!("[Turn Action] seat{}: select action or discard tile", self.seat);
                if let Some(t) = obs.incoming {
                    hand_str.push_str(&format!(" {}", t.unicode()));
                }
            }
            _ => {
                println!("[Call Action] seat{}: select action", self.seat);
                if let Some(t) = obs.incoming {
                    hand_str.push_str(&format!(" ({})", t.unicode()));
                }
            }
        }
        for m in &obs.calls {
            hand_str.push_str(&format!(",{}", m));
        }
        println!("{}", hand_str);
        for (i, act) in acts.iter().enumerate() {
            println!("{} => {}", i, act.unicode_string());
        }

        loop {
            let buf = match prompt() {
                Some(buf) => buf,
                None => {
                    // 入力が終了した場合は先頭のActionを選択
                    println!();
                    return acts[0].clone();
                }
            };
            let buf = buf.trim();
            if buf.is_empty() {
                continue;
            }
            if buf == "!print" {
                match serde_json::to_string(obs) {
                    Ok(s) => println!("{}", s),
                    Err(e) => tracing::error!("{}", e),
                }
                continue;
            }
            match parse_input(buf, obs, acts) {
                Ok(i) => return acts[i].clone(),
                Err(e) => tracing::error!("{}", e),
            }
        }
    }

    fn get_config(&self) -> &Config {
        &self.config
    }
}

// 入力文字列を選択するActionのindexに変換
fn parse_input(buf: &str, obs: &Observation, acts: &[Action]) -> Result<usize, String> {
    if let Ok(n) = buf.parse::<usize>() {
        return if n < acts.len() {
            Ok(n)
        } else {
            Err(format!("invalid action index: {}", n))
        };
    }

    let t = Tile::from_symbol(buf).map_err(|e| e.to_string())?;
    let target = if obs.incoming == Some(t) && !obs.hand.contains(t) {
        Action::discard()
    } else {
        Action::replace(t)
    };
    acts.iter()
        .position(|a| *a == target)
        .or_else(|| {
            // リーチ後はツモ切りのみ
            acts.iter()
                .position(|a| a.action_type == Discard && obs.incoming == Some(t))
        })
        .ok_or_else(|| format!("discard not allowed: {}", t))
}

#[test]
fn test_manual_parse_input() {
    let mut stg = Stage::default();
    stg.players[0].hand = Deck::parse("123m").unwrap();
    let t = |s: &str| Tile::from_symbol(s).unwrap();
    let obs = Observation::new(&stg, 0, PlayerState::Active, Some(t("9p")));
    let acts = vec![
        Action::discard(),
        Action::replace(t("1m")),
        Action::replace(t("2m")),
        Action::replace(t("3m")),
    ];
    assert_eq!(parse_input("2", &obs, &acts), Ok(2));
    assert!(parse_input("4", &obs, &acts).is_err());
    assert_eq!(parse_input("3m", &obs, &acts), Ok(3));
    assert_eq!(parse_input("9p", &obs, &acts), Ok(0));
    assert!(parse_input("5s", &obs, &acts).is_err());
    assert!(parse_input("xx", &obs, &acts).is_err());
}
