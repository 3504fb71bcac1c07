use crate::domain::catalog::{Category, ItemId};

/// The item fields captured at selection time. Order totals come from this
/// snapshot, not from a re-read of the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedItem {
    pub id: ItemId,
    pub title: String,
    pub price: i64,
}

/// Conversation position for one user. Each variant carries exactly the
/// scratch fields that are meaningful in that position, so a state cannot
/// exist without the data its transitions need.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingItemNumber {
        category: Category,
    },
    AwaitingAddress {
        category: Category,
        item: SelectedItem,
    },
    AwaitingDeliveryTime {
        category: Category,
        item: SelectedItem,
        address: String,
    },
    AwaitingPaymentChoice {
        item: SelectedItem,
        address: String,
        delivery_time: String,
    },
    AddAwaitingCategory,
    AddAwaitingNumber {
        category: Category,
    },
    AddAwaitingTitle {
        category: Category,
        number: u32,
    },
    AddAwaitingPrice {
        category: Category,
        number: u32,
        title: String,
    },
    AddAwaitingPhoto {
        category: Category,
        number: u32,
        title: String,
        price: i64,
    },
}

impl FlowState {
    /// Stable name for logs and assertions.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingItemNumber { .. } => "awaiting_item_number",
            Self::AwaitingAddress { .. } => "awaiting_address",
            Self::AwaitingDeliveryTime { .. } => "awaiting_delivery_time",
            Self::AwaitingPaymentChoice { .. } => "awaiting_payment_choice",
            Self::AddAwaitingCategory => "add_awaiting_category",
            Self::AddAwaitingNumber { .. } => "add_awaiting_number",
            Self::AddAwaitingTitle { .. } => "add_awaiting_title",
            Self::AddAwaitingPrice { .. } => "add_awaiting_price",
            Self::AddAwaitingPhoto { .. } => "add_awaiting_photo",
        }
    }
}

/// Inbound occurrences the engines react to, already lifted out of
/// transport payloads by the chat crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    Started,
    MainMenuRequested,
    BrowseRequested,
    CategorySelected(Category),
    NumberPicked(u32),
    TextEntered(String),
    PhotoSupplied(String),
    BackRequested,
    ConfirmWithoutPayment,
    InvoiceRequested,
    PaymentSucceeded,
    OrdersRequested,
    AdminPanelRequested,
    AdminAddRequested,
    AdminListRequested,
    AdminToggleRequested { item_id: Option<ItemId> },
    AdminCategorySelected(Category),
}
