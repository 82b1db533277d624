//! 内存状态仓储

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use mtf_engine_domain::traits::StateRepository;
use mtf_engine_domain::MtfState;

/// 内存多周期状态仓储
#[derive(Default)]
pub struct InMemoryStateRepository {
    states: DashMap<String, MtfState>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateRepository for InMemoryStateRepository {
    async fn get(&self, symbol: &str) -> Result<Option<MtfState>> {
        Ok(self.states.get(symbol).map(|s| s.clone()))
    }

    async fn upsert(&self, state: &MtfState) -> Result<()> {
        self.states.insert(state.symbol.clone(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtf_engine_domain::{Side, Timeframe};

    #[tokio::test]
    async fn test_upsert_and_get() {
        let repo = InMemoryStateRepository::new();
        assert!(repo.get("BTC-USDT").await.unwrap().is_none());

        let mut state = MtfState::new("BTC-USDT");
        state.apply(Timeframe::H4, 1000, Side::Long);
        repo.upsert(&state).await.unwrap();

        let loaded = repo.get("BTC-USDT").await.unwrap().unwrap();
        assert!(loaded.is_validated(Timeframe::H4));
        assert!(!loaded.is_validated(Timeframe::H1));
    }
}
