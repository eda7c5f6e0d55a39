mod manual;
mod nop;
mod random;

use std::fmt;

use crate::model::*;
use crate::util::misc::Res;
use crate::util::variant::*;

pub use self::{manual::Manual, nop::Nop, random::Random, random::RandomDiscard};

#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub args: Vec<Arg>,
}

impl Config {
    // 引数名から値を取得
    pub fn arg(&self, name: &str) -> Option<&Variant> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

// Actor trait
// 局のデータは持たず,観測情報と選択可能なActionの組から1つを選ぶ
pub trait Actor: ActorClone + Send {
    // 局開始時の初期化処理
    fn init(&mut self, _seat: Seat) {}

    // 可能なアクションの選択
    // actsは常に1つ以上の要素を含む. acts以外のActionを返した場合はacts[0]に置き換えられる
    fn select(&mut self, obs: &Observation, acts: &[Action]) -> Action;

    // Actorの詳細表示用
    fn get_config(&self) -> &Config;
}

impl fmt::Debug for dyn Actor + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conf = self.get_config();
        let arg_str = conf
            .args
            .iter()
            .map(|a| format!("{}={}", a.name, a.value))
            .collect::<Vec<String>>()
            .join(",");
        write!(f, "{}({})", conf.name, arg_str)
    }
}

// https://stackoverflow.com/questions/30353462/how-to-clone-a-struct-storing-a-boxed-trait-object
pub trait ActorClone {
    fn clone_box(&self) -> Box<dyn Actor>;
}

impl<T> ActorClone for T
where
    T: 'static + Actor + Clone,
{
    fn clone_box(&self) -> Box<dyn Actor> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Actor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

trait ActorBuilder {
    fn get_default_config(&self) -> Config;
    fn create(&self, config: Config) -> Box<dyn Actor>;
}

// "Name" または "Name(arg0,arg1,...)" の形式の文字列からActorを生成
// 空の引数は既定値のまま
pub fn create_actor(exp: &str) -> Res<Box<dyn Actor>> {
    let builders: Vec<Box<dyn ActorBuilder>> = vec![
        Box::new(nop::NopBuilder {}),
        Box::new(random::RandomDiscardBuilder {}),
        Box::new(random::RandomBuilder {}),
        Box::new(manual::ManualBuilder {}),
    ];

    let exp = exp.trim();
    let (name, args): (&str, Vec<&str>) = match (exp.find('('), exp.rfind(')')) {
        (Some(l), Some(r)) if l < r => (&exp[..l], exp[l + 1..r].split(',').collect()),
        (None, None) => (exp, vec![]),
        _ => return Err(format!("invalid paren: {}", exp).into()),
    };

    let builder = builders
        .iter()
        .find(|b| b.get_default_config().name == name)
        .ok_or_else(|| format!("unknown actor name: {}", name))?;

    let mut conf = builder.get_default_config();
    if conf.args.len() < args.len() {
        return Err(format!(
            "expected {} arguments for {}. but {} arguments are provided.",
            conf.args.len(),
            name,
            args.len(),
        )
        .into());
    }
    for (i, a) in args.iter().enumerate() {
        let a = a.trim();
        if !a.is_empty() {
            conf.args[i].value = conf.args[i]
                .value
                .parse_as(a)
                .map_err(|e| format!("{}: {}", e, a))?;
        }
    }

    Ok(builder.create(conf))
}

#[test]
fn test_create_actor() {
    let a = create_actor("Nop").unwrap();
    assert_eq!(format!("{:?}", a), "Nop()");
    let a = create_actor("Random(7)").unwrap();
    assert_eq!(format!("{:?}", a), "Random(seed=7)");
    let a = create_actor("RandomDiscard()").unwrap();
    assert_eq!(format!("{:?}", a), "RandomDiscard(seed=0,win=false)");
    let b = a.clone();
    assert_eq!(b.get_config().arg("seed"), Some(&Variant::Int(0)));

    assert!(create_actor("Unknown").is_err());
    assert!(create_actor("Random(x)").is_err());
    assert!(create_actor("Random(1,2)").is_err());
    let a = create_actor("RandomDiscard(3, true)").unwrap();
    assert_eq!(format!("{:?}", a), "RandomDiscard(seed=3,win=true)");
    assert!(create_actor("RandomDiscard(3,yes)").is_err());
    assert!(create_actor("Random)1(").is_err());
}
