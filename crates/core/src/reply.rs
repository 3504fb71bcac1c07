use crate::domain::catalog::Category;

/// An outbound message directive produced by the flow engines. The chat
/// crate renders these into transport messages; the core never touches
/// keyboard layout or markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), choices: Vec::new() }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self { text: text.into(), choices }
    }
}

/// One selectable option attached to a reply: a label plus the event the
/// selection raises when activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action: ChoiceAction,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: ChoiceAction) -> Self {
        Self { label: label.into(), action }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChoiceAction {
    BrowseCatalog,
    ListOrders,
    MainMenu,
    SelectCategory(Category),
    PickNumber(u32),
    BackToCategories,
    ConfirmWithoutPayment,
    RequestInvoice,
    OpenUrl(String),
    OpenAdminPanel,
    AdminAddItem,
    AdminListItems,
    AdminSelectCategory(Category),
}
