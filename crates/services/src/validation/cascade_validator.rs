//! 级联校验器 (CascadeValidator)
//!
//! 对单个交易对按 4h → 1h → 15m → 5m → 1m 顺序逐周期校验：
//! - 周期开关关闭（含 SYMBOL_TF 级）：在该周期 Blocked
//! - 指标快照缺失：整个交易对记为 Failed（输入失败，不是被挡）
//! - 周期无方向 / 方向与已通过周期冲突 / K线回退：在该周期 Blocked
//! - K线与状态持平：该周期本轮已通过，直接放行
//!
//! 每个周期的通过结果写入 TTL 缓存，TTL 内重复校验不再拉取指标。
//! 被挡住时已通过的父级周期照常落库，下一轮从断点继续。

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mtf_engine_core::cache::validation_cache_key;
use mtf_engine_core::config::environment;
use mtf_engine_domain::traits::{
    AuditRepository, MarketDataProvider, StateRepository, ValidationCacheStore,
};
use mtf_engine_domain::{
    AuditCategory, AuditSeverity, MtfAudit, MtfState, Side, Timeframe, TimeframeSignal,
};

use crate::gate::{Gate, GateDecision, SwitchGate};

/// 订单决策所用的执行周期
pub const EXECUTION_TF: Timeframe = Timeframe::M5;

/// 单周期通过结果的缓存载荷
#[derive(Debug, Serialize, Deserialize)]
struct CachedAcceptance {
    candle_ts: i64,
    side: Side,
}

/// 级联校验结果
#[derive(Debug, Clone)]
pub enum CascadeStatus {
    /// 五个周期全部通过且方向一致
    Validated {
        side: Side,
        /// 执行周期 (5m) 的指标快照
        execution: TimeframeSignal,
    },
    /// 在某个周期被挡住（正常信号）
    Blocked {
        blocking_tf: Timeframe,
        reason: String,
    },
    /// 输入缺失或处理异常
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub symbol: String,
    pub status: CascadeStatus,
    /// 走完级联后的状态（含本轮新通过的周期）
    pub state: MtfState,
    /// 本轮视为已通过的周期（按级联顺序）
    pub validated_tfs: Vec<Timeframe>,
}

impl CascadeOutcome {
    pub fn is_validated(&self) -> bool {
        matches!(self.status, CascadeStatus::Validated { .. })
    }
}

pub struct CascadeValidator {
    market: Arc<dyn MarketDataProvider>,
    states: Arc<dyn StateRepository>,
    cache: Arc<dyn ValidationCacheStore>,
    audits: Arc<dyn AuditRepository>,
    /// 逐周期开关检查；SYMBOL_TF 级的关停在这里生效
    switches: Arc<SwitchGate>,
}

impl CascadeValidator {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        states: Arc<dyn StateRepository>,
        cache: Arc<dyn ValidationCacheStore>,
        audits: Arc<dyn AuditRepository>,
        switches: Arc<SwitchGate>,
    ) -> Self {
        Self {
            market,
            states,
            cache,
            audits,
            switches,
        }
    }

    pub async fn validate_symbol(&self, run_id: &str, symbol: &str) -> Result<CascadeOutcome> {
        let mut state = self
            .states
            .get(symbol)
            .await?
            .unwrap_or_else(|| MtfState::new(symbol));

        let mut audits: Vec<MtfAudit> = Vec::new();
        let mut validated_tfs: Vec<Timeframe> = Vec::new();
        let mut run_side: Option<Side> = None;
        let mut execution_signal: Option<TimeframeSignal> = None;
        let mut status: Option<CascadeStatus> = None;

        for tf in Timeframe::CASCADE {
            match self.check_timeframe(symbol, tf, &mut state, &mut run_side).await? {
                StepResult::Accepted { side, signal } => {
                    if tf == EXECUTION_TF {
                        execution_signal = signal.clone();
                    }
                    audits.push(
                        MtfAudit::new(
                            symbol,
                            AuditCategory::Validation,
                            AuditSeverity::Info,
                            "tf_accepted",
                        )
                        .with_run(run_id)
                        .with_timeframe(tf)
                        .with_details(serde_json::json!({
                            "side": side.as_str(),
                            "candle_ts": state.slot(tf).last_candle_ts,
                        })),
                    );
                    validated_tfs.push(tf);
                }
                StepResult::Blocked { reason } => {
                    audits.push(
                        MtfAudit::new(
                            symbol,
                            AuditCategory::Validation,
                            AuditSeverity::Info,
                            "tf_blocked",
                        )
                        .with_run(run_id)
                        .with_timeframe(tf)
                        .with_details(serde_json::json!({ "reason": reason })),
                    );
                    debug!(
                        "Cascade blocked: symbol={}, tf={}, reason={}",
                        symbol,
                        tf.as_str(),
                        reason
                    );
                    status = Some(CascadeStatus::Blocked {
                        blocking_tf: tf,
                        reason,
                    });
                    break;
                }
                StepResult::MissingData => {
                    let error = format!("missing market data for {}", tf.as_str());
                    audits.push(
                        MtfAudit::new(
                            symbol,
                            AuditCategory::Validation,
                            AuditSeverity::Error,
                            "tf_input_missing",
                        )
                        .with_run(run_id)
                        .with_timeframe(tf),
                    );
                    status = Some(CascadeStatus::Failed { error });
                    break;
                }
            }
        }

        let status = match status {
            Some(s) => s,
            None => self.finalize(symbol, &state, run_side, execution_signal).await?,
        };

        // 被挡住也要把已通过的父级落库
        self.states.upsert(&state).await?;
        self.audits.insert_audits(&audits).await?;

        Ok(CascadeOutcome {
            symbol: symbol.to_string(),
            status,
            state,
            validated_tfs,
        })
    }

    /// 五个周期全部走完后的收束判定
    ///
    /// 执行周期命中缓存时没有新快照，此处补拉一次。
    async fn finalize(
        &self,
        symbol: &str,
        state: &MtfState,
        run_side: Option<Side>,
        execution_signal: Option<TimeframeSignal>,
    ) -> Result<CascadeStatus> {
        let Some(side) = run_side else {
            return Ok(CascadeStatus::Failed {
                error: "cascade completed without a resolved side".to_string(),
            });
        };
        if !state.has_consistent_sides() {
            return Ok(CascadeStatus::Blocked {
                blocking_tf: Timeframe::M1,
                reason: "side_conflict".to_string(),
            });
        }

        let execution = match execution_signal {
            Some(s) => Some(s),
            None => self.market.signal(symbol, EXECUTION_TF).await?,
        };
        match execution {
            Some(execution) => {
                info!(
                    "Cascade validated: symbol={}, side={}",
                    symbol,
                    side.as_str()
                );
                Ok(CascadeStatus::Validated { side, execution })
            }
            None => Ok(CascadeStatus::Failed {
                error: format!("missing market data for {}", EXECUTION_TF.as_str()),
            }),
        }
    }

    async fn check_timeframe(
        &self,
        symbol: &str,
        tf: Timeframe,
        state: &mut MtfState,
        run_side: &mut Option<Side>,
    ) -> Result<StepResult> {
        // 周期级开关先于缓存与指标：关停的周期直接挡住
        if let GateDecision::Skip(_) = self.switches.check(symbol, Some(tf)).await? {
            return Ok(StepResult::Blocked {
                reason: "switch_off".to_string(),
            });
        }

        let cache_key = validation_cache_key(symbol, tf.as_str());

        // TTL 内直接复用上次的通过结果，不再拉取指标
        if let Some(payload) = self.cache.get(&cache_key).await? {
            if let Ok(cached) = serde_json::from_value::<CachedAcceptance>(payload) {
                if conflicts(run_side, cached.side) {
                    return Ok(StepResult::Blocked {
                        reason: "side_conflict".to_string(),
                    });
                }
                if state.slot(tf).last_candle_ts < Some(cached.candle_ts) {
                    state.apply(tf, cached.candle_ts, cached.side);
                }
                *run_side = Some(cached.side);
                return Ok(StepResult::Accepted {
                    side: cached.side,
                    signal: None,
                });
            }
        }

        let Some(signal) = self.market.signal(symbol, tf).await? else {
            return Ok(StepResult::MissingData);
        };

        let Some(side) = signal.side else {
            return Ok(StepResult::Blocked {
                reason: "no_side".to_string(),
            });
        };

        if conflicts(run_side, side) {
            return Ok(StepResult::Blocked {
                reason: "side_conflict".to_string(),
            });
        }

        let prev_ts = state.slot(tf).last_candle_ts;
        let accepted = match prev_ts {
            // 同一根K线：上一轮已通过，本轮直接放行
            Some(prev) if signal.candle_ts == prev => state.slot(tf).side == Some(side),
            _ => state.apply(tf, signal.candle_ts, side),
        };
        if !accepted {
            return Ok(StepResult::Blocked {
                reason: "stale_candle".to_string(),
            });
        }

        let payload = serde_json::to_value(CachedAcceptance {
            candle_ts: signal.candle_ts,
            side,
        })?;
        self.cache
            .put(&cache_key, &payload, environment::validation_cache_ttl_secs())
            .await?;

        *run_side = Some(side);
        Ok(StepResult::Accepted {
            side,
            signal: Some(signal),
        })
    }
}

enum StepResult {
    Accepted {
        side: Side,
        /// 缓存命中时为 None（没有新快照）
        signal: Option<TimeframeSignal>,
    },
    Blocked {
        reason: String,
    },
    MissingData,
}

fn conflicts(run_side: &Option<Side>, side: Side) -> bool {
    matches!(run_side, Some(s) if *s != side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use mtf_engine_domain::traits::SwitchRepository;
    use mtf_engine_domain::{MtfSwitch, SwitchScope};
    use mtf_engine_infrastructure::{
        InMemoryAuditRepository, InMemoryStateRepository, InMemorySwitchRepository,
        InMemoryValidationCache,
    };

    /// 固定快照的指标桩，记录拉取次数
    struct StubMarket {
        signals: DashMap<(String, Timeframe), TimeframeSignal>,
        calls: AtomicUsize,
    }

    impl StubMarket {
        fn new() -> Self {
            Self {
                signals: DashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn set(&self, symbol: &str, tf: Timeframe, candle_ts: i64, side: Option<Side>) {
            self.signals.insert(
                (symbol.to_string(), tf),
                TimeframeSignal {
                    candle_ts,
                    side,
                    price: 50_000.0,
                    atr: 300.0,
                    atr_pct: 0.6,
                    volume_ratio: 1.2,
                    vwap: 50_010.0,
                },
            );
        }

        fn set_all(&self, symbol: &str, candle_ts: i64, side: Side) {
            for tf in Timeframe::CASCADE {
                self.set(symbol, tf, candle_ts, Some(side));
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubMarket {
        async fn signal(&self, symbol: &str, tf: Timeframe) -> Result<Option<TimeframeSignal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .signals
                .get(&(symbol.to_string(), tf))
                .map(|s| s.clone()))
        }
    }

    struct Fixture {
        market: Arc<StubMarket>,
        states: Arc<InMemoryStateRepository>,
        audits: Arc<InMemoryAuditRepository>,
        switches: Arc<InMemorySwitchRepository>,
        validator: CascadeValidator,
    }

    fn fixture() -> Fixture {
        let market = Arc::new(StubMarket::new());
        let states = Arc::new(InMemoryStateRepository::new());
        let audits = Arc::new(InMemoryAuditRepository::new());
        let cache = Arc::new(InMemoryValidationCache::new());
        let switches = Arc::new(InMemorySwitchRepository::new());
        let validator = CascadeValidator::new(
            market.clone(),
            states.clone(),
            cache,
            audits.clone(),
            Arc::new(SwitchGate::new(switches.clone(), false)),
        );
        Fixture {
            market,
            states,
            audits,
            switches,
            validator,
        }
    }

    #[tokio::test]
    async fn test_full_cascade_validates() {
        let f = fixture();
        f.market.set_all("BTC-USDT", 1_000, Side::Long);

        let outcome = f.validator.validate_symbol("run-1", "BTC-USDT").await.unwrap();
        match &outcome.status {
            CascadeStatus::Validated { side, execution } => {
                assert_eq!(*side, Side::Long);
                assert_eq!(execution.candle_ts, 1_000);
            }
            other => panic!("expected validated, got {:?}", other),
        }
        assert_eq!(outcome.validated_tfs, Timeframe::CASCADE.to_vec());

        // 状态已落库
        let state = f.states.get("BTC-USDT").await.unwrap().unwrap();
        assert!(state.is_validated(Timeframe::M1));
        assert_eq!(state.consistent_side(), Some(Side::Long));

        // 每个周期一条通过审计
        let audits = f.audits.audits_snapshot();
        assert_eq!(audits.iter().filter(|a| a.event == "tf_accepted").count(), 5);
    }

    #[tokio::test]
    async fn test_blocked_at_missing_side_keeps_parents() {
        let f = fixture();
        f.market.set("BTC-USDT", Timeframe::H4, 1_000, Some(Side::Long));
        f.market.set("BTC-USDT", Timeframe::H1, 1_000, Some(Side::Long));
        f.market.set("BTC-USDT", Timeframe::M15, 1_000, None);
        f.market.set("BTC-USDT", Timeframe::M5, 1_000, Some(Side::Long));
        f.market.set("BTC-USDT", Timeframe::M1, 1_000, Some(Side::Long));

        let outcome = f.validator.validate_symbol("run-1", "BTC-USDT").await.unwrap();
        match &outcome.status {
            CascadeStatus::Blocked {
                blocking_tf,
                reason,
            } => {
                assert_eq!(*blocking_tf, Timeframe::M15);
                assert_eq!(reason, "no_side");
            }
            other => panic!("expected blocked, got {:?}", other),
        }

        // 父级照常落库，15m 之后的周期没有被碰
        let state = f.states.get("BTC-USDT").await.unwrap().unwrap();
        assert!(state.is_validated(Timeframe::H1));
        assert!(!state.is_validated(Timeframe::M15));
        assert!(!state.is_validated(Timeframe::M5));
    }

    #[tokio::test]
    async fn test_side_conflict_blocks() {
        let f = fixture();
        f.market.set_all("BTC-USDT", 1_000, Side::Long);
        f.market.set("BTC-USDT", Timeframe::M5, 1_000, Some(Side::Short));

        let outcome = f.validator.validate_symbol("run-1", "BTC-USDT").await.unwrap();
        match &outcome.status {
            CascadeStatus::Blocked {
                blocking_tf,
                reason,
            } => {
                assert_eq!(*blocking_tf, Timeframe::M5);
                assert_eq!(reason, "side_conflict");
            }
            other => panic!("expected blocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeframe_switch_blocks_cascade() {
        let f = fixture();
        f.market.set_all("BTC-USDT", 1_000, Side::Long);
        f.switches
            .set(&MtfSwitch::new(
                SwitchScope::SymbolTf("BTC-USDT".to_string(), Timeframe::M5),
                false,
                None,
            ))
            .await
            .unwrap();

        let outcome = f.validator.validate_symbol("run-1", "BTC-USDT").await.unwrap();
        match &outcome.status {
            CascadeStatus::Blocked {
                blocking_tf,
                reason,
            } => {
                assert_eq!(*blocking_tf, Timeframe::M5);
                assert_eq!(reason, "switch_off");
            }
            other => panic!("expected blocked, got {:?}", other),
        }

        // 父级照常通过，关停的周期连指标都不拉
        assert_eq!(
            outcome.validated_tfs,
            vec![Timeframe::H4, Timeframe::H1, Timeframe::M15]
        );
        assert_eq!(f.market.call_count(), 3);

        // 开关清除后恢复正常
        f.switches
            .clear(&SwitchScope::SymbolTf("BTC-USDT".to_string(), Timeframe::M5))
            .await
            .unwrap();
        assert!(f
            .validator
            .validate_symbol("run-2", "BTC-USDT")
            .await
            .unwrap()
            .is_validated());
    }

    #[tokio::test]
    async fn test_missing_data_is_failure() {
        let f = fixture();
        f.market.set("BTC-USDT", Timeframe::H4, 1_000, Some(Side::Long));
        // 1h 起没有任何快照

        let outcome = f.validator.validate_symbol("run-1", "BTC-USDT").await.unwrap();
        match &outcome.status {
            CascadeStatus::Failed { error } => assert!(error.contains("1h")),
            other => panic!("expected failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_skips_market_pull_within_ttl() {
        let f = fixture();
        f.market.set_all("BTC-USDT", 1_000, Side::Long);

        assert!(f
            .validator
            .validate_symbol("run-1", "BTC-USDT")
            .await
            .unwrap()
            .is_validated());
        let first_pass_calls = f.market.call_count();
        assert_eq!(first_pass_calls, 5);

        // 第二轮五个周期全部命中缓存，只为执行周期补拉一次快照
        assert!(f
            .validator
            .validate_symbol("run-2", "BTC-USDT")
            .await
            .unwrap()
            .is_validated());
        assert_eq!(f.market.call_count(), first_pass_calls + 1);
    }

    #[tokio::test]
    async fn test_stale_candle_blocks() {
        let f = fixture();
        f.market.set_all("BTC-USDT", 2_000, Side::Long);
        assert!(f
            .validator
            .validate_symbol("run-1", "BTC-USDT")
            .await
            .unwrap()
            .is_validated());

        // 4h 的K线回退（缓存换新内容模拟过期后的再校验）
        let f2 = Fixture {
            market: f.market.clone(),
            states: f.states.clone(),
            audits: f.audits.clone(),
            switches: f.switches.clone(),
            validator: CascadeValidator::new(
                f.market.clone(),
                f.states.clone(),
                Arc::new(InMemoryValidationCache::new()),
                f.audits.clone(),
                Arc::new(SwitchGate::new(f.switches.clone(), false)),
            ),
        };
        f2.market.set("BTC-USDT", Timeframe::H4, 1_500, Some(Side::Long));

        let outcome = f2
            .validator
            .validate_symbol("run-2", "BTC-USDT")
            .await
            .unwrap();
        match &outcome.status {
            CascadeStatus::Blocked {
                blocking_tf,
                reason,
            } => {
                assert_eq!(*blocking_tf, Timeframe::H4);
                assert_eq!(reason, "stale_candle");
            }
            other => panic!("expected blocked, got {:?}", other),
        }
    }
}
