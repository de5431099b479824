//! Builders for the business messages this engine sends to a counterparty.
//!
//! These sit alongside the session-message construction in [`super::session`] (Logon,
//! Logout, Heartbeat, TestRequest, ResendRequest), which the engine builds itself in
//! response to protocol events. The functions here are the ones an application calls
//! directly: each takes a small argument struct (rather than a long parameter list) and
//! returns a [`MessageBuilder`] ready to hand to [`crate::FixApplicationHandle::send_message`].
//!
//! Builders that originate their own correlation id (`MDReqID`, `MassStatusReqID`,
//! `TradeRequestID`) take an [`IdGenerator`] explicitly and return the id alongside the
//! message. [`crate::FixApplicationHandle::id_generator`] hands back the generator the
//! engine itself uses, so callers don't need to keep a separate one around.
//!
//! A builder fails with [`BuilderError::InvalidArguments`] when a caller omits a field
//! that a particular variant requires (`StopPx` on a stop-limit order, `ExpireDate` on a
//! good-till-date order, the `MDReqID` being cancelled on an unsubscribe request). These
//! checks run before any tag is written and perform no I/O.

use crate::fix::clock::IdGenerator;
use crate::fix::encode::{formatted_time_micros, MessageBuilder, SerializedInt};
use crate::fix::generated::{self, MsgType, Tags};
use thiserror::Error;

/// A FIX `MsgType(35)` code this engine sends that the generated [`MsgType`] dictionary
/// doesn't carry, because the dictionary was generated from FIX.4.2 and these codes were
/// only assigned in later FIX versions.
const TRADE_CAPTURE_REPORT_REQUEST: &[u8] = b"AD";
const TRADE_CAPTURE_REPORT_ACK: &[u8] = b"AR";
const ORDER_MASS_STATUS_REQUEST: &[u8] = b"AF";
const USER_REQUEST: &[u8] = b"BE";

/// An error building a business message: a required field was missing or inconsistent
/// with another field on the same message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// A single entry of the `NoPartyIDs(453)` repeating group. This engine only ever sends
/// one party per order, so there is no need to model the group generically.
pub struct PartyId {
    pub party_id: String,
    pub party_role: u8,
}

/// Arguments for [`new_order_single`].
pub struct NewOrderSingleParams {
    pub cl_ord_id: String,
    pub party: Option<PartyId>,
    pub account_type: Option<u32>,
    pub cust_order_capacity: Option<u32>,
    pub exec_inst: Option<Vec<u8>>,
    pub currency: Option<String>,
    pub side: generated::Side,
    pub symbol: String,
    pub product: u32,
    pub order_qty: u32,
    pub ord_type: generated::OrdType,
    pub price: String,
    pub stop_px: Option<String>,
    pub expire_date: Option<String>,
    pub time_in_force: generated::TimeInForce,
    /// Only meaningful when `time_in_force` is `IMMEDIATE_OR_CANCEL`; pushed regardless,
    /// since a counterparty ignoring it on other TimeInForce values is harmless.
    pub min_qty: Option<u32>,
}

/// Builds a `NewOrderSingle<D>`.
///
/// `HandlInst(21)` is always stamped `1` ("automated execution, no broker intervention,
/// private"); this engine never routes orders through a broker for manual handling.
///
/// # Errors
/// Returns [`BuilderError::InvalidArguments`] if `ord_type` is `STOP_LIMIT` and `stop_px`
/// is absent, or if `time_in_force` is `GOOD_TILL_DATE` and `expire_date` is absent.
pub fn new_order_single(
    begin_string: &str,
    params: NewOrderSingleParams,
) -> Result<MessageBuilder, BuilderError> {
    if params.ord_type == generated::OrdType::STOP_LIMIT && params.stop_px.is_none() {
        return Err(BuilderError::InvalidArguments(
            "StopPx is required when OrdType is stop-limit".into(),
        ));
    }
    if params.time_in_force == generated::TimeInForce::GOOD_TILL_DATE && params.expire_date.is_none()
    {
        return Err(BuilderError::InvalidArguments(
            "ExpireDate is required when TimeInForce is good-till-date".into(),
        ));
    }

    let mut builder =
        MessageBuilder::new(begin_string, MsgType::ORDER_SINGLE).push(Tags::ClOrdID, params.cl_ord_id.as_bytes());

    if let Some(party) = params.party {
        builder = builder
            .push(Tags::NoPartyIDs, b"1")
            .push(Tags::PartyID, party.party_id.as_bytes())
            .push(Tags::PartyRole, party.party_role.to_string().as_bytes());
    }
    if let Some(account_type) = params.account_type {
        builder = builder.push(Tags::AccountType, SerializedInt::from(account_type).as_bytes());
    }
    if let Some(capacity) = params.cust_order_capacity {
        builder = builder.push(
            Tags::CustOrderCapacity,
            SerializedInt::from(capacity).as_bytes(),
        );
    }
    builder = builder.push(
        Tags::HandlInst,
        generated::HandlInst::AUTOMATED_EXECUTION_ORDER_PRIVATE_NO_BROKER_INTERVENTION.into(),
    );
    if let Some(exec_inst) = &params.exec_inst {
        builder = builder.push(Tags::ExecInst, exec_inst);
    }
    if let Some(currency) = &params.currency {
        builder = builder.push(Tags::Currency, currency.as_bytes());
    }
    builder = builder
        .push(Tags::Side, params.side.into())
        .push(Tags::Symbol, params.symbol.as_bytes())
        .push(Tags::Product, SerializedInt::from(params.product).as_bytes())
        .push(Tags::TransactTime, formatted_time_micros().as_bytes())
        .push(Tags::OrderQty, SerializedInt::from(params.order_qty).as_bytes())
        .push(Tags::OrdType, params.ord_type.into())
        .push(Tags::Price, params.price.as_bytes());
    if let Some(stop_px) = &params.stop_px {
        builder = builder.push(Tags::StopPx, stop_px.as_bytes());
    }
    if let Some(expire_date) = &params.expire_date {
        builder = builder.push(Tags::ExpireDate, expire_date.as_bytes());
    }
    builder = builder.push(Tags::TimeInForce, params.time_in_force.into());
    if let Some(min_qty) = params.min_qty {
        builder = builder.push(Tags::MinQty, SerializedInt::from(min_qty).as_bytes());
    }
    Ok(builder)
}

/// Arguments for [`order_cancel_replace_request`].
pub struct OrderCancelReplaceParams {
    pub order_id: String,
    pub orig_cl_ord_id: String,
    pub cl_ord_id: String,
    pub party: Option<PartyId>,
    pub account_type: Option<u32>,
    pub cust_order_capacity: Option<u32>,
    pub hand_inst: Option<u32>,
    pub exec_inst: Option<Vec<u8>>,
    pub currency: Option<String>,
    pub side: generated::Side,
    pub symbol: String,
    pub product: Option<u32>,
    pub order_qty: Option<u32>,
    pub ord_type: Option<generated::OrdType>,
    pub price: Option<String>,
    pub stop_px: Option<String>,
    pub expire_date: Option<String>,
    pub time_in_force: Option<generated::TimeInForce>,
    pub min_qty: Option<u32>,
    /// Custom `OverfillProtection(5000)` tag: reject the replace if it would allow the
    /// order to execute beyond its original quantity.
    pub overfill_protection: bool,
}

/// Builds an `OrderCancelReplaceRequest<G>`.
///
/// # Errors
/// Returns [`BuilderError::InvalidArguments`] under the same conditions as
/// [`new_order_single`], when `ord_type`/`time_in_force` are supplied.
pub fn order_cancel_replace_request(
    begin_string: &str,
    params: OrderCancelReplaceParams,
) -> Result<MessageBuilder, BuilderError> {
    if matches!(&params.ord_type, Some(ord_type) if *ord_type == generated::OrdType::STOP_LIMIT)
        && params.stop_px.is_none()
    {
        return Err(BuilderError::InvalidArguments(
            "StopPx is required when OrdType is stop-limit".into(),
        ));
    }
    if matches!(&params.time_in_force, Some(tif) if *tif == generated::TimeInForce::GOOD_TILL_DATE)
        && params.expire_date.is_none()
    {
        return Err(BuilderError::InvalidArguments(
            "ExpireDate is required when TimeInForce is good-till-date".into(),
        ));
    }

    let mut builder = MessageBuilder::new(begin_string, MsgType::ORDER_CANCEL_REPLACE_REQUEST)
        .push(Tags::OrderID, params.order_id.as_bytes())
        .push(Tags::OrigClOrdID, params.orig_cl_ord_id.as_bytes())
        .push(Tags::ClOrdID, params.cl_ord_id.as_bytes());

    if let Some(party) = params.party {
        builder = builder
            .push(Tags::NoPartyIDs, b"1")
            .push(Tags::PartyID, party.party_id.as_bytes())
            .push(Tags::PartyRole, party.party_role.to_string().as_bytes());
    }
    if let Some(account_type) = params.account_type {
        builder = builder.push(Tags::AccountType, SerializedInt::from(account_type).as_bytes());
    }
    if let Some(capacity) = params.cust_order_capacity {
        builder = builder.push(
            Tags::CustOrderCapacity,
            SerializedInt::from(capacity).as_bytes(),
        );
    }
    if let Some(hand_inst) = params.hand_inst {
        builder = builder.push(Tags::HandlInst, SerializedInt::from(hand_inst).as_bytes());
    }
    if let Some(exec_inst) = &params.exec_inst {
        builder = builder.push(Tags::ExecInst, exec_inst);
    }
    if let Some(currency) = &params.currency {
        builder = builder.push(Tags::Currency, currency.as_bytes());
    }
    builder = builder
        .push(Tags::Side, params.side.into())
        .push(Tags::Symbol, params.symbol.as_bytes());
    if let Some(product) = params.product {
        builder = builder.push(Tags::Product, SerializedInt::from(product).as_bytes());
    }
    builder = builder.push(Tags::TransactTime, formatted_time_micros().as_bytes());
    if let Some(order_qty) = params.order_qty {
        builder = builder.push(Tags::OrderQty, SerializedInt::from(order_qty).as_bytes());
    }
    if let Some(ord_type) = params.ord_type {
        builder = builder.push(Tags::OrdType, ord_type.into());
    }
    if let Some(price) = &params.price {
        builder = builder.push(Tags::Price, price.as_bytes());
    }
    if let Some(stop_px) = &params.stop_px {
        builder = builder.push(Tags::StopPx, stop_px.as_bytes());
    }
    if let Some(expire_date) = &params.expire_date {
        builder = builder.push(Tags::ExpireDate, expire_date.as_bytes());
    }
    if let Some(tif) = params.time_in_force {
        builder = builder.push(Tags::TimeInForce, tif.into());
    }
    if let Some(min_qty) = params.min_qty {
        builder = builder.push(Tags::MinQty, SerializedInt::from(min_qty).as_bytes());
    }
    if params.overfill_protection {
        builder = builder.push(Tags::OverfillProtection, b"Y");
    }
    Ok(builder)
}

/// What an `OrderCancelRequest<F>` targets.
pub enum OrderCancelTarget {
    /// Cancel a single, named order.
    Order {
        cl_ord_id: String,
        order_id: String,
        orig_cl_ord_id: String,
        side: generated::Side,
        symbol: String,
    },
    /// The "open-order mass cancel" shorthand: stamps synthetic identifiers the
    /// counterparty recognizes as "cancel everything currently open" rather than naming
    /// a specific order.
    AllOpenOrders,
}

/// Arguments for [`order_cancel_request`].
pub struct OrderCancelRequestParams {
    pub target: OrderCancelTarget,
    pub ord_type: Option<generated::OrdType>,
}

/// Builds an `OrderCancelRequest<F>`.
pub fn order_cancel_request(begin_string: &str, params: OrderCancelRequestParams) -> MessageBuilder {
    let builder = MessageBuilder::new(begin_string, MsgType::ORDER_CANCEL_REQUEST);
    let mut builder = match params.target {
        OrderCancelTarget::Order {
            cl_ord_id,
            order_id,
            orig_cl_ord_id,
            side,
            symbol,
        } => builder
            .push(Tags::OrigClOrdID, orig_cl_ord_id.as_bytes())
            .push(Tags::OrderID, order_id.as_bytes())
            .push(Tags::ClOrdID, cl_ord_id.as_bytes())
            .push(Tags::Side, side.into())
            .push(Tags::Symbol, symbol.as_bytes()),
        OrderCancelTarget::AllOpenOrders => builder
            .push(Tags::OrigClOrdID, b"OPEN_ORDER")
            .push(Tags::OrderID, b"OPEN_ORDER")
            .push(Tags::ClOrdID, b"OPEN_ORDER")
            .push(Tags::Side, generated::Side::BUY.into())
            .push(Tags::Symbol, b"NA")
            .push(Tags::MassCancelMarker, b"Y"),
    };
    builder = builder.push(Tags::TransactTime, formatted_time_micros().as_bytes());
    if let Some(ord_type) = params.ord_type {
        builder = builder.push(Tags::OrdType, ord_type.into());
    }
    builder
}

/// Which book entries a [`MarketDataRequest`](market_data_request) asks for.
pub enum MarketDataKind {
    /// Bid and offer entries, aggregated by price level.
    FullBook,
    /// Trade prints only.
    Trade,
}

/// Arguments for [`market_data_request`].
pub struct MarketDataRequestParams {
    pub subscription_request_type: generated::SubscriptionRequestType,
    /// The `MDReqID` of the subscription being cancelled. Required when
    /// `subscription_request_type` is `DISABLE_PREVIOUS_SNAPSHOT_PLUS_UPDATE_REQUEST`,
    /// ignored otherwise (a fresh id is generated for a new subscription).
    pub unsubscribe_target: Option<String>,
    pub market_depth: u32,
    pub kind: MarketDataKind,
    pub symbols: Vec<String>,
}

/// Builds a `MarketDataRequest<V>`.
///
/// Every call path returns the same `(MessageBuilder, String)` shape: the `MDReqID` is
/// either the caller-supplied id being cancelled (unsubscribe) or one freshly generated
/// from `id_generator` (subscribe), but it is always handed back so the caller can match
/// later snapshot/incremental messages against it.
///
/// # Errors
/// Returns [`BuilderError::InvalidArguments`] if `subscription_request_type` is
/// `DISABLE_PREVIOUS_SNAPSHOT_PLUS_UPDATE_REQUEST` and `unsubscribe_target` is absent.
pub fn market_data_request(
    begin_string: &str,
    id_generator: &dyn IdGenerator,
    params: MarketDataRequestParams,
) -> Result<(MessageBuilder, String), BuilderError> {
    let md_req_id = if params.subscription_request_type
        == generated::SubscriptionRequestType::DISABLE_PREVIOUS_SNAPSHOT_PLUS_UPDATE_REQUEST
    {
        params.unsubscribe_target.ok_or_else(|| {
            BuilderError::InvalidArguments(
                "unsubscribe_target (the MDReqID being cancelled) is required to disable a \
                 market data subscription"
                    .into(),
            )
        })?
    } else {
        id_generator.next_id()
    };

    let mut builder = MessageBuilder::new(begin_string, MsgType::MARKET_DATA_REQUEST)
        .push(Tags::MDReqID, md_req_id.as_bytes())
        .push(
            Tags::SubscriptionRequestType,
            params.subscription_request_type.into(),
        )
        .push(
            Tags::MarketDepth,
            SerializedInt::from(params.market_depth).as_bytes(),
        )
        .push(Tags::MDUpdateType, b"1");

    if !matches!(params.kind, MarketDataKind::Trade) {
        builder = builder.push(Tags::AggregatedBook, generated::AggregatedBook::YES.into());
    }

    let entry_types: Vec<generated::MDEntryType> = match params.kind {
        MarketDataKind::FullBook => vec![generated::MDEntryType::BID, generated::MDEntryType::OFFER],
        MarketDataKind::Trade => vec![generated::MDEntryType::TRADE],
    };
    builder = builder.push(
        Tags::NoMDEntryTypes,
        entry_types.len().to_string().as_bytes(),
    );
    for entry_type in entry_types {
        builder = builder.push(Tags::MDEntryType, entry_type.into());
    }

    builder = builder.push(
        Tags::NoRelatedSym,
        params.symbols.len().to_string().as_bytes(),
    );
    for symbol in &params.symbols {
        builder = builder.push(Tags::Symbol, symbol.as_bytes());
    }

    Ok((builder, md_req_id))
}

/// Builds an `OrderMassStatusRequest<AF>`, returning the message together with the
/// generated `MassStatusReqID`.
///
/// `MassStatusReqType(585)` is always `8`, "status for all orders" -- this engine has no
/// use for the narrower per-symbol/per-side variants FIX also defines.
pub fn order_mass_status_request(
    begin_string: &str,
    id_generator: &dyn IdGenerator,
) -> (MessageBuilder, String) {
    let mass_status_req_id = id_generator.next_id();
    let builder = MessageBuilder::new(begin_string, ORDER_MASS_STATUS_REQUEST.to_vec())
        .push(Tags::MassStatusReqID, mass_status_req_id.as_bytes())
        .push(Tags::MassStatusReqType, b"8")
        .push(Tags::TransactTime, formatted_time_micros().as_bytes());
    (builder, mass_status_req_id)
}

/// Builds a `TradeCaptureReportRequest<AD>`, returning the message together with the
/// generated `TradeRequestID`.
///
/// `TradeRequestType(569)` is always `0`, "all trades".
pub fn trade_capture_report_request(
    begin_string: &str,
    id_generator: &dyn IdGenerator,
    updates_only: bool,
) -> (MessageBuilder, String) {
    let trade_request_id = id_generator.next_id();
    let subscription_request_type: &[u8] = if updates_only { b"9" } else { b"1" };
    let builder = MessageBuilder::new(begin_string, TRADE_CAPTURE_REPORT_REQUEST.to_vec())
        .push(Tags::TradeRequestID, trade_request_id.as_bytes())
        .push(Tags::TradeRequestType, b"0")
        .push(Tags::SubscriptionRequestType, subscription_request_type);
    (builder, trade_request_id)
}

/// Arguments for [`trade_capture_report_ack`].
pub struct TradeCaptureReportAckParams {
    /// Echoes the `TradeReportID` of the report being acknowledged.
    pub trade_report_id: String,
    /// Defaults to `"NA"` when the ack is not instrument-specific.
    pub symbol: Option<String>,
}

/// Builds a `TradeCaptureReportAck<AR>`.
pub fn trade_capture_report_ack(begin_string: &str, params: TradeCaptureReportAckParams) -> MessageBuilder {
    let symbol = params.symbol.unwrap_or_else(|| "NA".to_string());
    MessageBuilder::new(begin_string, TRADE_CAPTURE_REPORT_ACK.to_vec())
        .push(Tags::TradeReportID, params.trade_report_id.as_bytes())
        .push(Tags::Symbol, symbol.as_bytes())
}

/// Arguments for [`change_password`].
pub struct ChangePasswordParams {
    pub username: String,
    pub password: String,
    pub new_password: String,
}

/// Builds a `UserRequest<BE>` with `UserRequestType(924)=3`, requesting a password
/// change. A fresh `UserRequestID` is generated for it, but (unlike `MarketDataRequest`
/// and the others above) is not returned: this engine has no need to correlate the
/// `UserResponse` it provokes against anything but the session itself.
pub fn change_password(
    begin_string: &str,
    id_generator: &dyn IdGenerator,
    params: ChangePasswordParams,
) -> MessageBuilder {
    MessageBuilder::new(begin_string, USER_REQUEST.to_vec())
        .push(Tags::UserRequestID, id_generator.next_id().as_bytes())
        .push(Tags::UserRequestType, b"3")
        .push(Tags::Username, params.username.as_bytes())
        .push(Tags::Password, params.password.as_bytes())
        .push(Tags::NewPassword, params.new_password.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fix::clock::AtomicIdGenerator;
    use crate::fix::encode::AdditionalHeaders;
    use tokio::io::AsyncWriteExt;

    async fn encoded(builder: MessageBuilder) -> String {
        let mut buf = Vec::new();
        let mut cur = tokio::io::BufWriter::new(&mut buf);
        let additional_headers: AdditionalHeaders = Default::default();
        builder
            .build_async(&mut cur, 1, &additional_headers, std::time::UNIX_EPOCH.into())
            .await
            .expect("building");
        cur.flush().await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn new_order_single_contract() {
        let params = NewOrderSingleParams {
            cl_ord_id: "A1".to_string(),
            party: None,
            account_type: None,
            cust_order_capacity: None,
            exec_inst: None,
            currency: None,
            side: generated::Side::BUY,
            symbol: "BTCUSD".to_string(),
            product: 2,
            order_qty: 1,
            ord_type: generated::OrdType::LIMIT,
            price: "30000".to_string(),
            stop_px: None,
            expire_date: None,
            time_in_force: generated::TimeInForce::GOOD_TILL_CANCEL,
            min_qty: None,
        };
        let msg = encoded(new_order_single("FIX.4.2", params).expect("valid order"))
            .await;
        assert!(msg.contains("\x0111=A1\x01"));
        assert!(msg.contains("\x0154=1\x01"));
        assert!(msg.contains("\x0155=BTCUSD\x01"));
        assert!(msg.contains("\x0138=1\x01"));
        assert!(msg.contains("\x0144=30000\x01"));
        assert!(msg.contains("\x0140=2\x01"));
        assert!(msg.contains("\x0159=1\x01"));
        assert!(msg.contains("\x01460=2\x01"));
        assert!(msg.contains("\x0121=1\x01"));
        assert!(msg.contains("\x0160="));
    }

    #[test]
    fn new_order_single_requires_stop_px_for_stop_limit() {
        let params = NewOrderSingleParams {
            cl_ord_id: "A1".to_string(),
            party: None,
            account_type: None,
            cust_order_capacity: None,
            exec_inst: None,
            currency: None,
            side: generated::Side::BUY,
            symbol: "BTCUSD".to_string(),
            product: 2,
            order_qty: 1,
            ord_type: generated::OrdType::STOP_LIMIT,
            price: "30000".to_string(),
            stop_px: None,
            expire_date: None,
            time_in_force: generated::TimeInForce::GOOD_TILL_CANCEL,
            min_qty: None,
        };
        assert_eq!(
            new_order_single("FIX.4.2", params),
            Err(BuilderError::InvalidArguments(
                "StopPx is required when OrdType is stop-limit".into()
            ))
        );
    }

    #[test]
    fn new_order_single_requires_expire_date_for_gtd() {
        let params = NewOrderSingleParams {
            cl_ord_id: "A1".to_string(),
            party: None,
            account_type: None,
            cust_order_capacity: None,
            exec_inst: None,
            currency: None,
            side: generated::Side::BUY,
            symbol: "BTCUSD".to_string(),
            product: 2,
            order_qty: 1,
            ord_type: generated::OrdType::LIMIT,
            price: "30000".to_string(),
            stop_px: None,
            expire_date: None,
            time_in_force: generated::TimeInForce::GOOD_TILL_DATE,
            min_qty: None,
        };
        assert_eq!(
            new_order_single("FIX.4.2", params),
            Err(BuilderError::InvalidArguments(
                "ExpireDate is required when TimeInForce is good-till-date".into()
            ))
        );
    }

    #[tokio::test]
    async fn mass_cancel_stamps_synthetic_identifiers() {
        let builder = order_cancel_request(
            "FIX.4.2",
            OrderCancelRequestParams {
                target: OrderCancelTarget::AllOpenOrders,
                ord_type: None,
            },
        );
        let msg = encoded(builder).await;
        assert!(msg.contains("\x0141=OPEN_ORDER\x01"));
        assert!(msg.contains("\x0137=OPEN_ORDER\x01"));
        assert!(msg.contains("\x0111=OPEN_ORDER\x01"));
        assert!(msg.contains("\x0155=NA\x01"));
        assert!(msg.contains("\x017559=Y\x01"));
    }

    #[test]
    fn market_data_request_uniform_return_shape() {
        let id_generator = AtomicIdGenerator::new("md");

        let (_builder, subscribe_id) = market_data_request(
            "FIX.4.2",
            &id_generator,
            MarketDataRequestParams {
                subscription_request_type: generated::SubscriptionRequestType::SNAPSHOT_PLUS_UPDATES,
                unsubscribe_target: None,
                market_depth: 0,
                kind: MarketDataKind::FullBook,
                symbols: vec!["BTCUSD".to_string()],
            },
        )
        .expect("subscribe is always valid");
        assert!(subscribe_id.starts_with("md-"));

        let (_builder, unsubscribe_id) = market_data_request(
            "FIX.4.2",
            &id_generator,
            MarketDataRequestParams {
                subscription_request_type:
                    generated::SubscriptionRequestType::DISABLE_PREVIOUS_SNAPSHOT_PLUS_UPDATE_REQUEST,
                unsubscribe_target: Some(subscribe_id.clone()),
                market_depth: 0,
                kind: MarketDataKind::FullBook,
                symbols: vec!["BTCUSD".to_string()],
            },
        )
        .expect("unsubscribe target supplied");
        assert_eq!(unsubscribe_id, subscribe_id);
    }

    #[test]
    fn market_data_request_requires_unsubscribe_target() {
        let id_generator = AtomicIdGenerator::new("md");
        let result = market_data_request(
            "FIX.4.2",
            &id_generator,
            MarketDataRequestParams {
                subscription_request_type:
                    generated::SubscriptionRequestType::DISABLE_PREVIOUS_SNAPSHOT_PLUS_UPDATE_REQUEST,
                unsubscribe_target: None,
                market_depth: 0,
                kind: MarketDataKind::FullBook,
                symbols: vec!["BTCUSD".to_string()],
            },
        );
        assert!(matches!(result, Err(BuilderError::InvalidArguments(_))));
    }

    #[test]
    fn order_mass_status_request_returns_generated_id() {
        let id_generator = AtomicIdGenerator::new("mass-status");
        let (_builder, id) = order_mass_status_request("FIX.4.2", &id_generator);
        assert!(id.starts_with("mass-status-"));
    }

    #[tokio::test]
    async fn trade_capture_report_ack_defaults_symbol() {
        let msg = encoded(trade_capture_report_ack(
            "FIX.4.2",
            TradeCaptureReportAckParams {
                trade_report_id: "TR1".to_string(),
                symbol: None,
            },
        ))
        .await;
        assert!(msg.contains("\x01571=TR1\x01"));
        assert!(msg.contains("\x0155=NA\x01"));
    }

    #[tokio::test]
    async fn change_password_builds_user_request() {
        let id_generator = AtomicIdGenerator::new("user-req");
        let msg = encoded(change_password(
            "FIX.4.2",
            &id_generator,
            ChangePasswordParams {
                username: "trader".to_string(),
                password: "old-pw".to_string(),
                new_password: "new-pw".to_string(),
            },
        ))
        .await;
        assert!(msg.contains("\x0135=BE\x01"));
        assert!(msg.contains("\x01924=3\x01"));
        assert!(msg.contains("\x01553=trader\x01"));
        assert!(msg.contains("\x01554=old-pw\x01"));
        assert!(msg.contains("\x01925=new-pw\x01"));
    }
}
