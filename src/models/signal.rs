use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Wait,
    Neutral,
    BuyPrepare,
    SellPrepare,
}

/// Actionable reading of a wave prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub kind: SignalKind,
    pub reason: String,
    pub entry_zone: Option<(f64, f64)>,
    pub stop_loss: Option<f64>,
    pub take_profit: Vec<f64>,
    pub risk_reward: Option<f64>,
    pub confidence: f64,
}

impl TradingSignal {
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            kind: SignalKind::Neutral,
            reason: reason.into(),
            entry_zone: None,
            stop_loss: None,
            take_profit: Vec::new(),
            risk_reward: None,
            confidence: 0.0,
        }
    }
}
