//! 订单意图服务 (OrderIntentService)
//!
//! 驱动意图走完 DRAFT → VALIDATED → READY_TO_SEND → SENT，
//! 每次流转持久化一次并写生命周期事件。量化校验失败与提交失败
//! 都终结在 FAILED，绝不静默发送未校验的订单。
//! dry-run 模式走到 READY_TO_SEND 为止，不触发交易所提交。

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use mtf_engine_domain::traits::{
    AuditRepository, ContractSpecProvider, ExecutionClient, OrderIntentRepository,
};
use mtf_engine_domain::{
    OrderIntent, OrderProtection, OrderType, Side, TradeLifecycleEvent,
};

pub struct OrderIntentService {
    intents: Arc<dyn OrderIntentRepository>,
    audits: Arc<dyn AuditRepository>,
    specs: Arc<dyn ContractSpecProvider>,
    execution: Arc<dyn ExecutionClient>,
    dry_run: bool,
}

impl OrderIntentService {
    pub fn new(
        intents: Arc<dyn OrderIntentRepository>,
        audits: Arc<dyn AuditRepository>,
        specs: Arc<dyn ContractSpecProvider>,
        execution: Arc<dyn ExecutionClient>,
        dry_run: bool,
    ) -> Self {
        Self {
            intents,
            audits,
            specs,
            execution,
            dry_run,
        }
    }

    /// 从草稿驱动到终点；返回最终状态的意图
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        run_id: &str,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        leverage: u32,
        raw_price: f64,
        raw_size: f64,
        protections: Vec<OrderProtection>,
    ) -> Result<OrderIntent> {
        let mut intent = OrderIntent::draft(symbol, side, order_type, leverage);
        let mut events: Vec<TradeLifecycleEvent> = Vec::new();
        self.intents.insert(&intent).await?;

        let Some(spec) = self.specs.spec(symbol).await? else {
            self.terminate(run_id, &mut intent, &mut events, "missing contract spec")
                .await?;
            return Ok(intent);
        };

        let from = intent.status;
        let passed = intent.validate(&spec, raw_price, raw_size)?;
        if !passed {
            let reason = format!("quantization: {}", intent.validation_errors.join("; "));
            warn!(
                "Intent rejected by quantization: symbol={}, errors={:?}",
                symbol, intent.validation_errors
            );
            self.terminate(run_id, &mut intent, &mut events, &reason).await?;
            return Ok(intent);
        }
        events.push(self.event(run_id, &intent, from.as_str()));

        // 保护单触发价按同一约束量化
        for mut protection in protections {
            protection.trigger_price = spec.quantize_price(protection.trigger_price);
            intent.add_protection(protection);
        }

        let from = intent.status;
        intent.prepare()?;
        events.push(self.event(run_id, &intent, from.as_str()));
        self.intents.update(&intent).await?;

        if self.dry_run {
            info!(
                "Dry-run: intent stops before submit: symbol={}, client_order_id={}",
                symbol, intent.client_order_id
            );
            self.audits.insert_lifecycle_events(&events).await?;
            return Ok(intent);
        }

        let from = intent.status;
        match self.execution.submit(&intent).await {
            Ok(exchange_order_id) => {
                intent.mark_as_sent(&exchange_order_id)?;
                events.push(self.event(run_id, &intent, from.as_str()));
                info!(
                    "Intent sent: symbol={}, client_order_id={}, exchange_order_id={}",
                    symbol, intent.client_order_id, exchange_order_id
                );
            }
            Err(e) => {
                let reason = format!("submit failed: {}", e);
                self.terminate(run_id, &mut intent, &mut events, &reason).await?;
                return Ok(intent);
            }
        }

        self.intents.update(&intent).await?;
        self.audits.insert_lifecycle_events(&events).await?;
        Ok(intent)
    }

    /// 人工取消一个未终结的意图
    pub async fn cancel(&self, run_id: &str, client_order_id: &str) -> Result<Option<OrderIntent>> {
        let Some(mut intent) = self.intents.find_by_client_order_id(client_order_id).await? else {
            return Ok(None);
        };
        let from = intent.status;
        intent.cancel()?;
        self.intents.update(&intent).await?;
        self.audits
            .insert_lifecycle_events(&[self.event(run_id, &intent, from.as_str())])
            .await?;
        Ok(Some(intent))
    }

    async fn terminate(
        &self,
        run_id: &str,
        intent: &mut OrderIntent,
        events: &mut Vec<TradeLifecycleEvent>,
        reason: &str,
    ) -> Result<()> {
        let from = intent.status;
        intent.fail(reason)?;
        let mut event = self.event(run_id, intent, from.as_str());
        event.reason = Some(reason.to_string());
        events.push(event);

        self.intents.update(intent).await?;
        self.audits.insert_lifecycle_events(events).await?;
        Ok(())
    }

    fn event(&self, run_id: &str, intent: &OrderIntent, from: &str) -> TradeLifecycleEvent {
        let mut event = TradeLifecycleEvent::new(
            &intent.symbol,
            &intent.client_order_id,
            from,
            intent.status.as_str(),
            None,
        );
        event.run_id = Some(run_id.to_string());
        event
    }
}
