// mainから直接呼び出すアプリケーションのモジュール

mod engine;

pub use engine::EngineApp;
