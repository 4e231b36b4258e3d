//! 推送通道消息类型定义
//!
//! 订单服务端通过推送通道向客户端下发三类通知：订单增量、
//! 连接状态变更、重同步请求。这些类型在服务端和客户端之间共享。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 协议版本号
pub const PROTOCOL_VERSION: u16 = 1;

/// 推送主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushTopic {
    /// 订单增量 (事件 + 快照)
    OrderDelta = 0,
    /// 连接状态变更
    ConnectionStatus = 1,
    /// 服务端要求全量重同步
    ResyncRequest = 2,
}

impl TryFrom<u8> for PushTopic {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PushTopic::OrderDelta),
            1 => Ok(PushTopic::ConnectionStatus),
            2 => Ok(PushTopic::ResyncRequest),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PushTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushTopic::OrderDelta => write!(f, "order-delta"),
            PushTopic::ConnectionStatus => write!(f, "connection-status"),
            PushTopic::ResyncRequest => write!(f, "resync-request"),
        }
    }
}

/// 推送消息体
///
/// 载荷按主题对应的类型序列化为 JSON 字节，接收方用
/// [`PushMessage::parse_payload`] 还原。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub message_id: Uuid,
    pub topic: PushTopic,
    pub payload: Vec<u8>,
}

impl PushMessage {
    pub fn new(topic: PushTopic, payload: Vec<u8>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            topic,
            payload,
        }
    }

    /// 创建订单增量消息
    pub fn order_delta(payload: &OrderDeltaPayload) -> Self {
        Self::new(
            PushTopic::OrderDelta,
            serde_json::to_vec(payload).expect("Failed to serialize order delta"),
        )
    }

    /// 创建连接状态消息
    pub fn connection_status(status: ChannelStatus) -> Self {
        Self::new(
            PushTopic::ConnectionStatus,
            serde_json::to_vec(&status).expect("Failed to serialize channel status"),
        )
    }

    /// 创建重同步请求消息
    pub fn resync_request(payload: &ResyncRequestPayload) -> Self {
        Self::new(
            PushTopic::ResyncRequest,
            serde_json::to_vec(payload).expect("Failed to serialize resync request"),
        )
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// 推送消息路由结果
///
/// 客户端监听任务据此决定把消息交给哪条处理路径。
#[derive(Debug)]
pub enum PushRoute {
    /// 订单增量 -> 增量应用路径
    OrderDelta(Box<OrderDeltaPayload>),
    /// 连接状态变更 -> 连接状态处理
    ConnectionStatus(ChannelStatus),
    /// 重同步请求 -> 无条件全量同步
    ResyncRequest(ResyncRequestPayload),
    /// 载荷无法解码 (协议错误)
    Unroutable {
        topic: PushTopic,
        error: serde_json::Error,
    },
}

impl PushRoute {
    /// 按主题解码一条推送消息
    pub fn from_message(msg: PushMessage) -> Self {
        match msg.topic {
            PushTopic::OrderDelta => match msg.parse_payload::<OrderDeltaPayload>() {
                Ok(delta) => PushRoute::OrderDelta(Box::new(delta)),
                Err(error) => PushRoute::Unroutable {
                    topic: msg.topic,
                    error,
                },
            },
            PushTopic::ConnectionStatus => match msg.parse_payload::<ChannelStatus>() {
                Ok(status) => PushRoute::ConnectionStatus(status),
                Err(error) => PushRoute::Unroutable {
                    topic: msg.topic,
                    error,
                },
            },
            PushTopic::ResyncRequest => match msg.parse_payload::<ResyncRequestPayload>() {
                Ok(req) => PushRoute::ResyncRequest(req),
                Err(error) => PushRoute::Unroutable {
                    topic: msg.topic,
                    error,
                },
            },
        }
    }
}
