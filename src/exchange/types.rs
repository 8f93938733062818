//! Type definitions for Bitget mix-futures API payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope wrapping every Bitget REST response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Bitget signals success with code "00000".
    pub fn is_ok(&self) -> bool {
        self.code == "00000"
    }
}

/// Futures account snapshot for one margin coin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub margin_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub available: Decimal,
}

/// One open position as reported by the exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    pub symbol: String,
    pub hold_side: PositionSide,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

/// Direction of a held position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

/// Order side in Bitget's open/close vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

impl OrderSide {
    /// Side that establishes a position in the given direction.
    pub fn open_for(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => OrderSide::OpenLong,
            PositionSide::Short => OrderSide::OpenShort,
        }
    }

    /// Side that closes a position held in the given direction.
    pub fn close_for(held: PositionSide) -> Self {
        match held {
            PositionSide::Long => OrderSide::CloseLong,
            PositionSide::Short => OrderSide::CloseShort,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::OpenLong => write!(f, "open_long"),
            OrderSide::OpenShort => write!(f, "open_short"),
            OrderSide::CloseLong => write!(f, "close_long"),
            OrderSide::CloseShort => write!(f, "close_short"),
        }
    }
}

/// Order type. Only market orders are used; the engine never rests on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

/// New order request for `/api/mix/v1/order/placeOrder`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    pub margin_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub leverage: u8,
}

/// Acknowledgement returned on successful order placement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub client_oid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_side_mapping() {
        assert_eq!(OrderSide::open_for(PositionSide::Long), OrderSide::OpenLong);
        assert_eq!(OrderSide::open_for(PositionSide::Short), OrderSide::OpenShort);
        assert_eq!(OrderSide::close_for(PositionSide::Long), OrderSide::CloseLong);
        assert_eq!(OrderSide::close_for(PositionSide::Short), OrderSide::CloseShort);
    }

    #[test]
    fn test_order_request_serializes_to_bitget_fields() {
        let order = OrderRequest {
            symbol: "BTCUSDT_UMCBL".to_string(),
            margin_coin: "USDT".to_string(),
            size: dec!(0.015),
            side: OrderSide::OpenLong,
            order_type: OrderType::Market,
            leverage: 2,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["symbol"], "BTCUSDT_UMCBL");
        assert_eq!(json["marginCoin"], "USDT");
        assert_eq!(json["size"], "0.015");
        assert_eq!(json["side"], "open_long");
        assert_eq!(json["orderType"], "market");
        assert_eq!(json["leverage"], 2);
    }

    #[test]
    fn test_position_payload_parses() {
        let raw = r#"{"symbol":"AVAXUSDT_UMCBL","holdSide":"short","total":"12.5"}"#;
        let pos: PositionData = serde_json::from_str(raw).unwrap();
        assert_eq!(pos.hold_side, PositionSide::Short);
        assert_eq!(pos.total, dec!(12.5));
    }

    #[test]
    fn test_api_response_success_code() {
        let raw = r#"{"code":"00000","msg":"success","data":{"orderId":"1","clientOid":null}}"#;
        let resp: ApiResponse<OrderAck> = serde_json::from_str(raw).unwrap();
        assert!(resp.is_ok());

        let raw = r#"{"code":"40786","msg":"duplicate order","data":null}"#;
        let resp: ApiResponse<OrderAck> = serde_json::from_str(raw).unwrap();
        assert!(!resp.is_ok());
    }
}
