//! Core of the blossom flower-shop bot: the domain model, the store
//! ports, and the conversation state machines. Everything here is
//! transport-agnostic; the chat crate owns inbound/outbound wire shapes
//! and the db crate owns persistence.

pub mod config;
pub mod domain;
pub mod flows;
pub mod payment;
pub mod reply;
pub mod store;

pub use domain::catalog::{CatalogItem, Category, ItemId, NewCatalogItem};
pub use domain::order::{NewOrder, Order, OrderId, OrderStatus, OrderSummary};
pub use domain::UserId;
pub use flows::engine::{EngineError, EngineSettings, FlowEngine};
pub use flows::session::{Session, SessionStore};
pub use flows::states::{FlowEvent, FlowState, SelectedItem};
pub use payment::{InvoiceRequest, NoopPaymentGateway, PaymentError, PaymentGateway};
pub use reply::{Choice, ChoiceAction, Reply};
pub use store::{CatalogStore, InMemoryCatalogStore, InMemoryOrderStore, OrderStore, StoreError};
