use tracing::{info, warn};

use crate::actor::create_actor;
use crate::control::{EndReason, MahjongGame, Player, Wall};
use crate::hand::BasicCalculator;
use crate::model::*;
use crate::util::misc::*;

// [App]
// 指定したActorで複数局の対局を行う
#[derive(Debug)]
pub struct EngineApp {
    seed: u64,
    rule: Rule,
    n_hand: usize,
    write_wall: Option<String>, // 最初の局の牌山の保存先
    load_wall: Option<String>,  // 牌山を読み込んで1局のみ実行
    names: [String; SEAT],      // actor names
}

impl EngineApp {
    pub fn new(args: Vec<String>) -> Res<Self> {
        let mut app = Self {
            seed: 0,
            rule: Rule::default(),
            n_hand: 1,
            write_wall: None,
            load_wall: None,
            names: ["Nop".into(), "Nop".into(), "Nop".into(), "Nop".into()],
        };

        let mut it = args.iter();
        while let Some(s) = it.next() {
            match s.as_str() {
                "-s" => app.seed = next_value(&mut it, s)?,
                "-g" => app.n_hand = next_value(&mut it, s)?,
                "-r-red5" => app.rule.red_dora = next_value(&mut it, s)?,
                "-r-init" => app.rule.initial_credit = next_value(&mut it, s)?,
                "-r-noten" => app.rule.enable_no_ten_penalty = next_value(&mut it, s)?,
                "-w-wall" => app.write_wall = Some(next_value(&mut it, s)?),
                "-l-wall" => app.load_wall = Some(next_value(&mut it, s)?),
                "-0" => app.names[0] = next_value(&mut it, s)?,
                "-1" => app.names[1] = next_value(&mut it, s)?,
                "-2" => app.names[2] = next_value(&mut it, s)?,
                "-3" => app.names[3] = next_value(&mut it, s)?,
                "-d" | "-q" => {} // ログレベルはmainで設定済み
                opt => return Err(format!("unknown option: {}", opt).into()),
            }
        }

        if app.seed == 0 {
            app.seed = unixtime_now() as u64;
            info!(
                "Random seed is not specified. Unix timestamp '{}' is used as seed.",
                app.seed
            );
        }

        Ok(app)
    }

    pub fn run(self) -> Res {
        info!("seed: {}, rule: {}", self.seed, self.rule);

        let mut players = vec![];
        for s in 0..SEAT {
            let actor = create_actor(&self.names[s])?;
            info!("actor{}: {:?}", s, actor);
            players.push(Player::new(format!("seat{}", s), actor));
        }
        let players: [Player; SEAT] = players
            .try_into()
            .map_err(|_| "failed to create players".to_string())?;

        let start = std::time::Instant::now();
        let calc = Box::new(BasicCalculator);
        let (mut game, n_hand) = match &self.load_wall {
            Some(path) => {
                let wall = Wall::load(path)?;
                (MahjongGame::with_wall(self.rule.clone(), players, calc, wall, 0)?, 1)
            }
            None => (
                MahjongGame::new(self.rule.clone(), players, calc, Some(self.seed))?,
                self.n_hand.max(1),
            ),
        };
        if let Some(path) = &self.write_wall {
            game.wall().save(path)?;
            info!("wall saved: {}", path);
        }

        let mut counts = [0; 4]; // tsumo, ron, exhausted, suukaikan
        for i in 0..n_hand {
            let end = game.play()?;
            counts[match end.reason {
                EndReason::Tsumo => 0,
                EndReason::Ron => 1,
                EndReason::Exhausted => 2,
                EndReason::Suukaikan => 3,
            }] += 1;
            info!("hand {} end: {:?}, deltas: {:?}", i, end.reason, end.deltas);

            if game.is_busted() {
                warn!("hand {}: busted {:?}", i, game.stage().credits());
                break;
            }
            if i + 1 < n_hand {
                game.next_hand()?;
            }
        }

        println!(
            "tsumo: {}, ron: {}, exhausted: {}, suukaikan: {}",
            counts[0], counts[1], counts[2], counts[3]
        );
        for (s, c) in game.stage().credits().iter().enumerate() {
            println!("seat{}: {:6} ({:?})", s, c, game.players()[s].actor());
        }
        println!(
            "total elapsed time: {:8.3}sec",
            start.elapsed().as_nanos() as f32 / 1000000000.0
        );
        Ok(())
    }
}

#[test]
fn test_engine_app_args() {
    let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let app = EngineApp::new(args(&["-s", "5", "-g", "3", "-r-red5", "4", "-1", "Random(2)"])).unwrap();
    assert_eq!(app.seed, 5);
    assert_eq!(app.n_hand, 3);
    assert_eq!(app.rule.red_dora, 4);
    assert_eq!(app.names[1], "Random(2)");

    assert!(EngineApp::new(args(&["-x"])).is_err());
    assert!(EngineApp::new(args(&["-s"])).is_err());
    assert!(EngineApp::new(args(&["-r-noten", "maybe"])).is_err());
}

#[test]
fn test_engine_app_run() {
    let args = ["-s", "3", "-g", "2", "-0", "RandomDiscard(1,true)", "-1", "Random(2)"];
    let app = EngineApp::new(args.iter().map(|s| s.to_string()).collect()).unwrap();
    app.run().unwrap();
}
