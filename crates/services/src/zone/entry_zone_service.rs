//! 入场区间服务 (EntryZoneService)
//!
//! 以 VWAP 为中心、ATR 波动度定宽、成交量比收紧的价格区间：
//! 量能越高区间越窄（信号越可信，允许的滑点越小）。
//! 每次重算插入新行并取代旧行；价格偏离区间只产生诊断事件，不拦截。

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use mtf_engine_core::config::environment;
use mtf_engine_domain::traits::{AuditRepository, EntryZoneRepository};
use mtf_engine_domain::{EntryZoneLive, Side, TimeframeSignal, TradeZoneEvent, ZoneStatus};

/// 区间参数档位
#[derive(Debug, Clone)]
pub struct ZoneProfile {
    pub name: String,
    pub version: u32,
    /// 半宽 = price * atr_pct/100 * atr_multiple / clamp(volume_ratio)
    pub atr_multiple: f64,
    /// 成交量比的收紧范围
    pub min_volume_ratio: f64,
    pub max_volume_ratio: f64,
}

impl Default for ZoneProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            version: 1,
            atr_multiple: 1.0,
            min_volume_ratio: 0.5,
            max_volume_ratio: 3.0,
        }
    }
}

pub struct EntryZoneService {
    zones: Arc<dyn EntryZoneRepository>,
    audits: Arc<dyn AuditRepository>,
    profile: ZoneProfile,
}

impl EntryZoneService {
    pub fn new(
        zones: Arc<dyn EntryZoneRepository>,
        audits: Arc<dyn AuditRepository>,
        profile: ZoneProfile,
    ) -> Self {
        Self {
            zones,
            audits,
            profile,
        }
    }

    /// 从执行周期快照计算新区间并落库（取代旧区间）
    pub async fn recalculate(
        &self,
        symbol: &str,
        side: Side,
        signal: &TimeframeSignal,
    ) -> Result<EntryZoneLive> {
        let ratio = signal
            .volume_ratio
            .clamp(self.profile.min_volume_ratio, self.profile.max_volume_ratio);
        let half_width =
            signal.price * (signal.atr_pct / 100.0) * self.profile.atr_multiple / ratio;

        let now = Utc::now();
        let zone = EntryZoneLive {
            symbol: symbol.to_string(),
            side,
            min_price: signal.vwap - half_width,
            max_price: signal.vwap + half_width,
            atr_pct: signal.atr_pct,
            volume_ratio: signal.volume_ratio,
            vwap: signal.vwap,
            config_profile: self.profile.name.clone(),
            config_version: self.profile.version,
            valid_from: now,
            valid_until: now + Duration::minutes(environment::entry_zone_validity_minutes()),
            status: ZoneStatus::Waiting,
            created_at: now,
        };

        self.zones.insert_superseding(&zone).await?;
        info!(
            "Entry zone recalculated: symbol={}, side={}, range=[{:.4}, {:.4}]",
            symbol,
            side.as_str(),
            zone.min_price,
            zone.max_price
        );
        Ok(zone)
    }

    /// 检查候选价格；偏离区间时写入诊断事件并返回它
    pub async fn check_price(
        &self,
        run_id: &str,
        zone: &EntryZoneLive,
        price: f64,
        mtf_context: serde_json::Value,
    ) -> Result<Option<TradeZoneEvent>> {
        if zone.contains(price) {
            return Ok(None);
        }

        let event = TradeZoneEvent {
            symbol: zone.symbol.clone(),
            run_id: Some(run_id.to_string()),
            price,
            zone_min: zone.min_price,
            zone_max: zone.max_price,
            deviation_pct: zone.deviation_pct(price),
            mtf_context,
            created_at: Utc::now(),
        };
        self.audits.insert_zone_events(std::slice::from_ref(&event)).await?;
        Ok(Some(event))
    }

    pub async fn latest(&self, symbol: &str, side: Side) -> Result<Option<EntryZoneLive>> {
        self.zones.latest(symbol, side).await
    }
}
