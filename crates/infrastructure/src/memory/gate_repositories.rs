//! 内存开关 / 冷却 / 黑名单仓储

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use mtf_engine_domain::traits::{CooldownRepository, SwitchRepository};
use mtf_engine_domain::{BlacklistedContract, ContractCooldown, MtfSwitch, SwitchScope};

/// 内存开关仓储
#[derive(Default)]
pub struct InMemorySwitchRepository {
    switches: DashMap<String, MtfSwitch>,
}

impl InMemorySwitchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SwitchRepository for InMemorySwitchRepository {
    async fn get(&self, scope: &SwitchScope) -> Result<Option<MtfSwitch>> {
        Ok(self.switches.get(&scope.key()).map(|s| s.clone()))
    }

    async fn set(&self, switch: &MtfSwitch) -> Result<()> {
        self.switches.insert(switch.scope.key(), switch.clone());
        Ok(())
    }

    async fn clear(&self, scope: &SwitchScope) -> Result<()> {
        self.switches.remove(&scope.key());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<MtfSwitch>> {
        Ok(self.switches.iter().map(|e| e.value().clone()).collect())
    }
}

/// 内存冷却 / 黑名单仓储
#[derive(Default)]
pub struct InMemoryCooldownRepository {
    cooldowns: DashMap<String, ContractCooldown>,
    blacklist: DashMap<String, BlacklistedContract>,
}

impl InMemoryCooldownRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CooldownRepository for InMemoryCooldownRepository {
    async fn find_cooldown(&self, symbol: &str) -> Result<Option<ContractCooldown>> {
        Ok(self.cooldowns.get(symbol).map(|c| c.clone()))
    }

    async fn upsert_cooldown(&self, cooldown: &ContractCooldown) -> Result<()> {
        match self.cooldowns.get_mut(&cooldown.symbol) {
            Some(mut existing) => {
                if let Some(until) = cooldown.active_until {
                    existing.extend(until, cooldown.reason);
                } else {
                    existing.active_until = None;
                    existing.reason = cooldown.reason;
                }
            }
            None => {
                self.cooldowns
                    .insert(cooldown.symbol.clone(), cooldown.clone());
            }
        }
        Ok(())
    }

    async fn clear_cooldown(&self, symbol: &str) -> Result<()> {
        self.cooldowns.remove(symbol);
        Ok(())
    }

    async fn find_blacklist(&self, symbol: &str) -> Result<Option<BlacklistedContract>> {
        Ok(self.blacklist.get(symbol).map(|b| b.clone()))
    }

    async fn add_blacklist(&self, entry: &BlacklistedContract) -> Result<()> {
        self.blacklist.insert(entry.symbol.clone(), entry.clone());
        Ok(())
    }

    async fn list_cooldowns(&self) -> Result<Vec<ContractCooldown>> {
        Ok(self.cooldowns.iter().map(|e| e.value().clone()).collect())
    }

    async fn list_blacklist(&self) -> Result<Vec<BlacklistedContract>> {
        Ok(self.blacklist.iter().map(|e| e.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mtf_engine_domain::CooldownReason;

    #[tokio::test]
    async fn test_upsert_cooldown_extends_in_place() {
        let repo = InMemoryCooldownRepository::new();
        let now = Utc::now();

        let cd = ContractCooldown::new(
            "ETH-USDT",
            CooldownReason::TooManyErrors,
            Some(now + Duration::minutes(10)),
        );
        repo.upsert_cooldown(&cd).await.unwrap();

        let extended = ContractCooldown::new(
            "ETH-USDT",
            CooldownReason::Manual,
            Some(now + Duration::minutes(30)),
        );
        repo.upsert_cooldown(&extended).await.unwrap();

        let stored = repo.find_cooldown("ETH-USDT").await.unwrap().unwrap();
        assert_eq!(stored.active_until, Some(now + Duration::minutes(30)));
        assert_eq!(stored.reason, CooldownReason::Manual);
    }
}
