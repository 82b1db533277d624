//! 内存订单侧仓储（入场区间 / 订单意图 / 订单计划）

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use mtf_engine_domain::traits::{EntryZoneRepository, OrderIntentRepository, OrderPlanRepository};
use mtf_engine_domain::{EntryZoneLive, OrderIntent, OrderPlan, Side, ZoneStatus};

/// 内存入场区间仓储
#[derive(Default)]
pub struct InMemoryEntryZoneRepository {
    zones: Mutex<Vec<EntryZoneLive>>,
}

impl InMemoryEntryZoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zones_snapshot(&self) -> Vec<EntryZoneLive> {
        self.zones.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntryZoneRepository for InMemoryEntryZoneRepository {
    async fn insert_superseding(&self, zone: &EntryZoneLive) -> Result<()> {
        let mut guard = self.zones.lock().unwrap();
        for existing in guard.iter_mut() {
            if existing.symbol == zone.symbol
                && existing.side == zone.side
                && existing.status == ZoneStatus::Waiting
            {
                existing.status = ZoneStatus::Superseded;
            }
        }
        guard.push(zone.clone());
        Ok(())
    }

    async fn latest(&self, symbol: &str, side: Side) -> Result<Option<EntryZoneLive>> {
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|z| z.symbol == symbol && z.side == side && z.status != ZoneStatus::Superseded)
            .cloned())
    }
}

/// 内存订单意图仓储
#[derive(Default)]
pub struct InMemoryOrderIntentRepository {
    intents: DashMap<String, OrderIntent>,
}

impl InMemoryOrderIntentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderIntentRepository for InMemoryOrderIntentRepository {
    async fn insert(&self, intent: &OrderIntent) -> Result<()> {
        self.intents
            .insert(intent.client_order_id.clone(), intent.clone());
        Ok(())
    }

    async fn update(&self, intent: &OrderIntent) -> Result<()> {
        self.intents
            .insert(intent.client_order_id.clone(), intent.clone());
        Ok(())
    }

    async fn find_by_client_order_id(&self, client_order_id: &str) -> Result<Option<OrderIntent>> {
        Ok(self.intents.get(client_order_id).map(|i| i.clone()))
    }

    async fn delete(&self, client_order_id: &str) -> Result<()> {
        // 意图持有保护单，删除自然级联
        self.intents.remove(client_order_id);
        Ok(())
    }
}

/// 内存订单计划仓储
#[derive(Default)]
pub struct InMemoryOrderPlanRepository {
    plans: DashMap<i64, OrderPlan>,
    next_id: AtomicI64,
}

impl InMemoryOrderPlanRepository {
    pub fn new() -> Self {
        Self {
            plans: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn get(&self, id: i64) -> Option<OrderPlan> {
        self.plans.get(&id).map(|p| p.clone())
    }
}

#[async_trait]
impl OrderPlanRepository for InMemoryOrderPlanRepository {
    async fn insert(&self, plan: &OrderPlan) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.plans.insert(id, plan.clone());
        Ok(id)
    }

    async fn update(&self, id: i64, plan: &OrderPlan) -> Result<()> {
        self.plans.insert(id, plan.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn zone(symbol: &str) -> EntryZoneLive {
        let now = Utc::now();
        EntryZoneLive {
            symbol: symbol.into(),
            side: Side::Long,
            min_price: 99.0,
            max_price: 101.0,
            atr_pct: 1.0,
            volume_ratio: 1.0,
            vwap: 100.0,
            config_profile: "default".into(),
            config_version: 1,
            valid_from: now,
            valid_until: now + Duration::minutes(15),
            status: ZoneStatus::Waiting,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_zone_supersede() {
        let repo = InMemoryEntryZoneRepository::new();
        repo.insert_superseding(&zone("BTC-USDT")).await.unwrap();
        repo.insert_superseding(&zone("BTC-USDT")).await.unwrap();

        let all = repo.zones_snapshot();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].status, ZoneStatus::Superseded);
        assert_eq!(all[1].status, ZoneStatus::Waiting);

        let latest = repo.latest("BTC-USDT", Side::Long).await.unwrap().unwrap();
        assert_eq!(latest.status, ZoneStatus::Waiting);
    }
}
