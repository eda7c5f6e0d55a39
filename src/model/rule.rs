use super::*;

// ルール設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rule {
    pub players: usize,         // プレイヤー数 (4のみ対応)
    pub red_dora: usize,        // 赤5の枚数 (0, 3, 4)
    pub min_yaku: usize,        // 和了に必要な最低翻数
    pub enable_kuitan: bool,    // 喰いタン
    pub enable_atozuke: bool,   // 後付け
    pub enable_multi_ron: bool, // ダブロン,トリロン
    pub enable_ippatsu: bool,   // 一発
    pub enable_no_ten_penalty: bool, // 流局時の不聴罰符
    pub enable_bust: bool,      // 飛び
    pub initial_credit: Score,  // 初期持ち点
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            players: SEAT,
            red_dora: 3,
            min_yaku: 0,
            enable_kuitan: true,
            enable_atozuke: true,
            enable_multi_ron: true,
            enable_ippatsu: true,
            enable_no_ten_penalty: true,
            enable_bust: true,
            initial_credit: 25000,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "players: {}, red5: {}, initial: {}, multi_ron: {}, noten_penalty: {}",
            self.players,
            self.red_dora,
            self.initial_credit,
            self.enable_multi_ron,
            self.enable_no_ten_penalty
        )
    }
}

#[test]
fn test_rule_json() {
    let r: Rule = serde_json::from_str(r#"{"redDora": 4, "enableMultiRon": false}"#).unwrap();
    assert_eq!(r.red_dora, 4);
    assert!(!r.enable_multi_ron);
    assert_eq!(r.players, 4);
    assert_eq!(r.initial_credit, 25000);

    let v = serde_json::to_value(Rule::default()).unwrap();
    assert_eq!(v["enableNoTenPenalty"], true);
    assert_eq!(v["minYaku"], 0);
}
