// 和了形の判定と点数計算のインターフェース
mod calculator;
mod point;
mod win;

pub use self::{
    calculator::{
        HandConfig, HandCost, HandRequest, HandResponse, HandValueCalculator, MeldDescriptor,
        MeldKind,
    },
    point::{calc_points, get_score_title, next_dora_kind, BasicCalculator, Points},
    win::{is_complete, reach_candidates, tenpai, winning_kinds, WinShape},
};
