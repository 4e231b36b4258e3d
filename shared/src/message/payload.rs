use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::{OrderEvent, OrderSnapshot};

// ==================== Channel Status ====================

/// 推送通道连接状态 (传输层 -> 客户端)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// 通道已建立
    Connected,
    /// 通道断开
    Disconnected,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

// ==================== Payloads ====================

/// 订单增量载荷 (服务端 -> 所有客户端)
///
/// 事件与快照由服务端捆绑下发：客户端无需再发请求解析
/// "订单现在长什么样"，也就不存在第二条增量在解析请求完成前
/// 到达的竞态窗口。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDeltaPayload {
    /// 事件 (用于时间线展示)
    pub event: OrderEvent,
    /// 服务端计算的快照 (服务端权威，客户端不做本地计算)
    pub snapshot: OrderSnapshot,
}

/// 重同步请求载荷 (服务端 -> 所有客户端)
///
/// 服务端重启或事件日志被截断后下发。客户端收到此消息即
/// 无条件执行全量同步，字段仅为前向兼容保留。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResyncRequestPayload {
    /// 服务端建议的起始序列号 (本客户端忽略)
    pub since_sequence: u64,
}
