// 局の進行制御
pub mod common;
pub mod engine;
pub mod player;
pub mod possible_actions;
pub mod wall;

pub use self::{
    engine::{EndReason, HandEnd, MahjongGame, Step, WinResult},
    player::Player,
    possible_actions::calc_possible_actions,
    wall::Wall,
};
