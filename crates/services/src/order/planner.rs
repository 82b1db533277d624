//! 订单计划器 (OrderPlanner)
//!
//! 把级联校验的结论变成一条可追溯的订单计划：
//! 风险参数推导保护单价位，意图服务负责执行，执行结果回写计划。

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use mtf_engine_domain::traits::OrderPlanRepository;
use mtf_engine_domain::{
    DecisionContext, IntentStatus, OrderIntent, OrderPlan, OrderType, ProtectionKind,
    OrderProtection, RiskParams, Side, Timeframe, TimeframeSignal,
};

use super::intent_service::OrderIntentService;

/// 计划参数
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// 单笔名义价值 (USDT)
    pub notional_per_trade: f64,
    pub leverage: u32,
    pub risk_per_trade_pct: f64,
    pub stop_atr_multiple: f64,
    pub take_profit_atr_multiple: f64,
    pub order_type: OrderType,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            notional_per_trade: 100.0,
            leverage: 3,
            risk_per_trade_pct: 1.0,
            stop_atr_multiple: 1.5,
            take_profit_atr_multiple: 3.0,
            order_type: OrderType::Limit,
        }
    }
}

pub struct OrderPlanner {
    plans: Arc<dyn OrderPlanRepository>,
    intent_service: Arc<OrderIntentService>,
    config: PlannerConfig,
}

impl OrderPlanner {
    pub fn new(
        plans: Arc<dyn OrderPlanRepository>,
        intent_service: Arc<OrderIntentService>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            plans,
            intent_service,
            config,
        }
    }

    /// 生成计划并驱动意图执行；返回终态的计划与意图
    pub async fn plan_and_execute(
        &self,
        run_id: &str,
        symbol: &str,
        side: Side,
        execution: &TimeframeSignal,
        validated_tfs: &[Timeframe],
    ) -> Result<(OrderPlan, OrderIntent)> {
        let risk = RiskParams {
            risk_per_trade_pct: self.config.risk_per_trade_pct,
            stop_atr_multiple: self.config.stop_atr_multiple,
            take_profit_atr_multiple: self.config.take_profit_atr_multiple,
            leverage: self.config.leverage,
            extra: serde_json::Value::Null,
        };
        let context = DecisionContext {
            execution_tf: crate::validation::EXECUTION_TF,
            validated_tfs: validated_tfs.to_vec(),
            price: execution.price,
            atr: execution.atr,
            atr_pct: execution.atr_pct,
            volume_ratio: execution.volume_ratio,
            extra: serde_json::Value::Null,
        };

        let mut plan = OrderPlan::new(symbol, side, risk, context);
        let plan_id = self.plans.insert(&plan).await?;
        info!(
            "Order plan created: symbol={}, side={}, plan_id={}",
            symbol,
            side.as_str(),
            plan_id
        );

        let size = self.config.notional_per_trade / execution.price;
        let (stop, take_profit) = protection_prices(side, execution, &plan.risk);

        let intent = self
            .intent_service
            .execute(
                run_id,
                symbol,
                side,
                self.config.order_type,
                self.config.leverage,
                execution.price,
                size,
                vec![
                    OrderProtection::new(ProtectionKind::StopLoss, stop),
                    OrderProtection::new(ProtectionKind::TakeProfit, take_profit),
                ],
            )
            .await?;

        match intent.status {
            IntentStatus::Sent => {
                plan.mark_executed(&intent.client_order_id, intent.exchange_order_id.clone());
            }
            // dry-run 止步于待发送，计划保持 Planned 但记下意图
            IntentStatus::ReadyToSend => {
                plan.outcome.client_order_id = Some(intent.client_order_id.clone());
            }
            IntentStatus::Cancelled => plan.mark_cancelled(),
            _ => {
                let reason = intent
                    .failure_reason
                    .clone()
                    .unwrap_or_else(|| "intent did not reach a sendable state".to_string());
                plan.mark_failed(&reason);
            }
        }
        self.plans.update(plan_id, &plan).await?;

        Ok((plan, intent))
    }
}

/// 止损/止盈价位：多头止损在下方，空头镜像
fn protection_prices(side: Side, signal: &TimeframeSignal, risk: &RiskParams) -> (f64, f64) {
    let stop_distance = signal.atr * risk.stop_atr_multiple;
    let tp_distance = signal.atr * risk.take_profit_atr_multiple;
    match side {
        Side::Long => (signal.price - stop_distance, signal.price + tp_distance),
        Side::Short => (signal.price + stop_distance, signal.price - tp_distance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mtf_engine_domain::traits::{ContractSpecProvider, ExecutionClient};
    use mtf_engine_domain::{ContractSpec, PlanStatus};
    use mtf_engine_infrastructure::{
        InMemoryAuditRepository, InMemoryOrderIntentRepository, InMemoryOrderPlanRepository,
    };

    struct StubSpecs;

    #[async_trait]
    impl ContractSpecProvider for StubSpecs {
        async fn spec(&self, symbol: &str) -> Result<Option<ContractSpec>> {
            Ok(Some(ContractSpec {
                symbol: symbol.to_string(),
                tick_size: 0.1,
                step_size: 0.0001,
                min_notional: 10.0,
                max_leverage: 20,
            }))
        }
    }

    struct StubExecution {
        fail: bool,
    }

    #[async_trait]
    impl ExecutionClient for StubExecution {
        async fn submit(&self, _intent: &OrderIntent) -> Result<String> {
            if self.fail {
                anyhow::bail!("exchange rejected")
            }
            Ok("okx-7".to_string())
        }
    }

    fn signal() -> TimeframeSignal {
        TimeframeSignal {
            candle_ts: 1_000,
            side: Some(Side::Long),
            price: 50_000.0,
            atr: 300.0,
            atr_pct: 0.6,
            volume_ratio: 1.2,
            vwap: 50_010.0,
        }
    }

    fn planner(fail_submit: bool, dry_run: bool) -> (Arc<InMemoryOrderPlanRepository>, OrderPlanner) {
        let plans = Arc::new(InMemoryOrderPlanRepository::new());
        let intent_service = Arc::new(OrderIntentService::new(
            Arc::new(InMemoryOrderIntentRepository::new()),
            Arc::new(InMemoryAuditRepository::new()),
            Arc::new(StubSpecs),
            Arc::new(StubExecution { fail: fail_submit }),
            dry_run,
        ));
        let planner = OrderPlanner::new(plans.clone(), intent_service, PlannerConfig::default());
        (plans, planner)
    }

    #[tokio::test]
    async fn test_executed_plan_records_order_ids() {
        let (_, planner) = planner(false, false);
        let (plan, intent) = planner
            .plan_and_execute(
                "run-1",
                "BTC-USDT",
                Side::Long,
                &signal(),
                &Timeframe::CASCADE,
            )
            .await
            .unwrap();

        assert_eq!(plan.status, PlanStatus::Executed);
        assert_eq!(
            plan.outcome.client_order_id.as_deref(),
            Some(intent.client_order_id.as_str())
        );
        assert_eq!(plan.outcome.exchange_order_id.as_deref(), Some("okx-7"));
        assert_eq!(intent.status, IntentStatus::Sent);
    }

    #[tokio::test]
    async fn test_failed_submit_fails_plan() {
        let (_, planner) = planner(true, false);
        let (plan, intent) = planner
            .plan_and_execute(
                "run-1",
                "BTC-USDT",
                Side::Long,
                &signal(),
                &Timeframe::CASCADE,
            )
            .await
            .unwrap();

        assert_eq!(plan.status, PlanStatus::Failed);
        assert!(plan
            .outcome
            .failure_reason
            .as_deref()
            .unwrap()
            .contains("exchange rejected"));
        assert_eq!(intent.status, IntentStatus::Failed);
    }

    #[tokio::test]
    async fn test_dry_run_plan_stays_planned() {
        let (_, planner) = planner(false, true);
        let (plan, intent) = planner
            .plan_and_execute(
                "run-1",
                "BTC-USDT",
                Side::Long,
                &signal(),
                &Timeframe::CASCADE,
            )
            .await
            .unwrap();

        assert_eq!(plan.status, PlanStatus::Planned);
        assert_eq!(intent.status, IntentStatus::ReadyToSend);
        assert!(plan.outcome.exchange_order_id.is_none());
    }

    #[test]
    fn test_protection_prices_mirror_by_side() {
        let risk = RiskParams {
            risk_per_trade_pct: 1.0,
            stop_atr_multiple: 1.5,
            take_profit_atr_multiple: 3.0,
            leverage: 3,
            extra: serde_json::Value::Null,
        };
        let s = signal();

        let (stop, tp) = protection_prices(Side::Long, &s, &risk);
        assert!((stop - (50_000.0 - 450.0)).abs() < 1e-9);
        assert!((tp - (50_000.0 + 900.0)).abs() < 1e-9);

        let (stop, tp) = protection_prices(Side::Short, &s, &risk);
        assert!((stop - (50_000.0 + 450.0)).abs() < 1e-9);
        assert!((tp - (50_000.0 - 900.0)).abs() < 1e-9);
    }
}
