//! Text commands and the selection-payload grammar. Encoding (used when
//! rendering choices into buttons) and parsing (used when a selection
//! comes back) live side by side so the grammar cannot drift.

use blossom_core::{Category, ChoiceAction, FlowEvent, ItemId};

use crate::outbound::ButtonPayload;

/// Persistent main-menu labels; the transport shows these as plain
/// keyboard buttons that echo their label back as text.
pub const BROWSE_LABEL: &str = "Bouquets";
pub const MY_ORDERS_LABEL: &str = "My orders";
pub const ADMIN_LABEL: &str = "Admin";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextCommand {
    Start,
    Browse,
    MyOrders,
    AdminPanel,
    Toggle { item_id: Option<i64> },
    Freeform(String),
}

pub fn parse_text_command(text: &str) -> TextCommand {
    let trimmed = text.trim();
    if trimmed == "/start" {
        return TextCommand::Start;
    }
    if let Some(rest) = trimmed.strip_prefix("/toggle") {
        if rest.is_empty() || rest.starts_with(' ') {
            let argument = rest.trim();
            let item_id = (!argument.is_empty()
                && argument.bytes().all(|byte| byte.is_ascii_digit()))
            .then(|| argument.parse().ok())
            .flatten();
            return TextCommand::Toggle { item_id };
        }
    }

    match trimmed {
        BROWSE_LABEL => TextCommand::Browse,
        MY_ORDERS_LABEL => TextCommand::MyOrders,
        ADMIN_LABEL => TextCommand::AdminPanel,
        _ => TextCommand::Freeform(text.to_owned()),
    }
}

pub fn encode_choice_action(action: &ChoiceAction) -> ButtonPayload {
    match action {
        ChoiceAction::BrowseCatalog => ButtonPayload::Callback("menu:browse".to_owned()),
        ChoiceAction::ListOrders => ButtonPayload::Callback("menu:orders".to_owned()),
        ChoiceAction::OpenAdminPanel => ButtonPayload::Callback("menu:admin".to_owned()),
        ChoiceAction::MainMenu => ButtonPayload::Callback("menu:main".to_owned()),
        ChoiceAction::SelectCategory(category) => {
            ButtonPayload::Callback(format!("size:{category}"))
        }
        ChoiceAction::PickNumber(number) => ButtonPayload::Callback(format!("pick:{number}")),
        ChoiceAction::BackToCategories => ButtonPayload::Callback("pay:back".to_owned()),
        ChoiceAction::ConfirmWithoutPayment => ButtonPayload::Callback("pay:test".to_owned()),
        ChoiceAction::RequestInvoice => ButtonPayload::Callback("pay:invoice".to_owned()),
        ChoiceAction::AdminAddItem => ButtonPayload::Callback("admin:add".to_owned()),
        ChoiceAction::AdminListItems => ButtonPayload::Callback("admin:list".to_owned()),
        ChoiceAction::AdminSelectCategory(category) => {
            ButtonPayload::Callback(format!("admin:add:size:{category}"))
        }
        ChoiceAction::OpenUrl(url) => ButtonPayload::Url(url.clone()),
    }
}

/// Lifts a selection payload into a flow event. Unknown payloads are
/// dropped silently; a stale button from an old message must not crash
/// anything.
pub fn parse_selection(data: &str) -> Option<FlowEvent> {
    match data.trim() {
        "menu:browse" => Some(FlowEvent::BrowseRequested),
        "menu:orders" => Some(FlowEvent::OrdersRequested),
        "menu:admin" => Some(FlowEvent::AdminPanelRequested),
        "menu:main" => Some(FlowEvent::MainMenuRequested),
        "pay:back" => Some(FlowEvent::BackRequested),
        "pay:test" => Some(FlowEvent::ConfirmWithoutPayment),
        "pay:invoice" => Some(FlowEvent::InvoiceRequested),
        "admin:add" => Some(FlowEvent::AdminAddRequested),
        "admin:list" => Some(FlowEvent::AdminListRequested),
        other => {
            if let Some(raw) = other.strip_prefix("admin:add:size:") {
                return raw.parse::<Category>().ok().map(FlowEvent::AdminCategorySelected);
            }
            if let Some(raw) = other.strip_prefix("size:") {
                return raw.parse::<Category>().ok().map(FlowEvent::CategorySelected);
            }
            if let Some(raw) = other.strip_prefix("pick:") {
                return raw.parse::<u32>().ok().map(FlowEvent::NumberPicked);
            }
            None
        }
    }
}

/// The text-command half of event lifting; selections and photos are
/// mapped in `events`.
pub fn flow_event_from_text(text: &str) -> FlowEvent {
    match parse_text_command(text) {
        TextCommand::Start => FlowEvent::Started,
        TextCommand::Browse => FlowEvent::BrowseRequested,
        TextCommand::MyOrders => FlowEvent::OrdersRequested,
        TextCommand::AdminPanel => FlowEvent::AdminPanelRequested,
        TextCommand::Toggle { item_id } => {
            FlowEvent::AdminToggleRequested { item_id: item_id.map(ItemId) }
        }
        TextCommand::Freeform(text) => FlowEvent::TextEntered(text),
    }
}
