//! 外部协作方接口
//!
//! K线/指标服务、交易所执行客户端、合约元数据服务都只以接口出现，
//! 引擎不关心它们的具体实现。

use anyhow::Result;
use async_trait::async_trait;

use crate::entities::OrderIntent;
use crate::enums::Timeframe;
use crate::value_objects::{ContractSpec, TimeframeSignal};

/// K线/指标服务：级联校验与区间计算的全部输入来源
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 某交易对/周期的最新快照；数据缺失返回 None（由调用方记为输入失败）
    async fn signal(&self, symbol: &str, tf: Timeframe) -> Result<Option<TimeframeSignal>>;
}

/// 交易所执行客户端：接收定稿的订单意图，返回交易所订单ID
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn submit(&self, intent: &OrderIntent) -> Result<String>;
}

/// 合约元数据服务：提供量化约束
#[async_trait]
pub trait ContractSpecProvider: Send + Sync {
    async fn spec(&self, symbol: &str) -> Result<Option<ContractSpec>>;
}
