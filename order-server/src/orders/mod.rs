//! Orders
//!
//! - [`OrderLedger`]: pure lifecycle state machine
//! - [`money`]: decimal totals
//! - [`OrderService`]: validate → ledger → persist → broadcast

pub mod error;
pub mod ledger;
pub mod money;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use ledger::{LineRequest, OrderLedger, TransitionPolicy};
pub use service::{
    CreateOrderRequest, OrderItemRequest, OrderLineResponse, OrderResponse, OrderService,
    OrderSummary, UpdateStatusRequest,
};
