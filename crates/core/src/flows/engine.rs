use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::catalog::Category;
use crate::domain::order::NewOrder;
use crate::domain::UserId;
use crate::flows::states::{FlowEvent, FlowState, SelectedItem};
use crate::flows::{admin, session::Session, validation};
use crate::payment::{InvoiceRequest, PaymentError, PaymentGateway};
use crate::reply::{Choice, ChoiceAction, Reply};
use crate::store::{CatalogStore, OrderStore, StoreError};

/// Items shown in one category listing.
pub const ITEM_LIST_LIMIT: usize = 10;
/// Number buttons offered under a listing.
pub const NUMBER_CHOICE_LIMIT: usize = 30;
/// Most-recent orders shown by "my orders".
pub const ORDER_LIST_LIMIT: usize = 10;

pub const DEFAULT_CHECKOUT_URL: &str = "https://example-pay.page.link/checkout";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Engine knobs that come from configuration rather than collaborators.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub admins: HashSet<UserId>,
    pub checkout_url: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { admins: HashSet::new(), checkout_url: DEFAULT_CHECKOUT_URL.to_owned() }
    }
}

/// The conversation state machine. Given an event and the caller-held
/// session, it reads the catalog, writes orders, mutates the session
/// position, and produces outbound reply directives.
///
/// Store failures abort before any session mutation, so a failed event is
/// always safe to retry.
pub struct FlowEngine {
    pub(crate) catalog: Arc<dyn CatalogStore>,
    pub(crate) orders: Arc<dyn OrderStore>,
    payment: Option<Arc<dyn PaymentGateway>>,
    pub(crate) settings: EngineSettings,
}

impl FlowEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        payment: Option<Arc<dyn PaymentGateway>>,
        settings: EngineSettings,
    ) -> Self {
        Self { catalog, orders, payment, settings }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.settings.admins.contains(&user_id)
    }

    pub async fn handle(
        &self,
        session: &mut Session,
        event: FlowEvent,
    ) -> Result<Vec<Reply>, EngineError> {
        match event {
            FlowEvent::Started => Ok(vec![Reply::with_choices(
                "Hi! I'm the flower shop bot. Tap Bouquets to browse what's in stock.",
                self.main_menu_choices(),
            )]),
            FlowEvent::MainMenuRequested => {
                Ok(vec![Reply::with_choices("Main menu:", self.main_menu_choices())])
            }
            FlowEvent::BrowseRequested => {
                session.reset();
                Ok(vec![category_prompt("Choose a bouquet size:")])
            }
            FlowEvent::CategorySelected(category) => self.start_selection(session, category).await,
            FlowEvent::NumberPicked(number) => self.pick_number(session, number).await,
            FlowEvent::TextEntered(text) => self.text_entered(session, text).await,
            FlowEvent::PhotoSupplied(image_ref) => {
                admin::photo_supplied(self, session, image_ref).await
            }
            FlowEvent::BackRequested => {
                session.reset();
                Ok(vec![category_prompt("Okay, back to the start. Choose a bouquet size:")])
            }
            FlowEvent::ConfirmWithoutPayment => self.confirm_without_payment(session).await,
            FlowEvent::InvoiceRequested => self.request_invoice(session).await,
            FlowEvent::PaymentSucceeded => self.payment_succeeded(session).await,
            FlowEvent::OrdersRequested => self.list_orders(session.user_id).await,
            FlowEvent::AdminPanelRequested
            | FlowEvent::AdminAddRequested
            | FlowEvent::AdminListRequested
            | FlowEvent::AdminToggleRequested { .. }
            | FlowEvent::AdminCategorySelected(_) => admin::handle(self, session, event).await,
        }
    }

    /// Category selection is accepted from any state: tapping a size
    /// button restarts browsing wherever the user happens to be.
    async fn start_selection(
        &self,
        session: &mut Session,
        category: Category,
    ) -> Result<Vec<Reply>, EngineError> {
        let items = self.catalog.list_available(category).await?;
        if items.is_empty() {
            session.reset();
            return Ok(vec![Reply::text(format!(
                "No {} bouquets are in stock right now.",
                category.label()
            ))]);
        }

        let listing = items
            .iter()
            .take(ITEM_LIST_LIMIT)
            .map(|item| format!("No. {} - {} - ${}", item.number, item.title, item.price))
            .collect::<Vec<_>>()
            .join("\n");
        let numbers = items
            .iter()
            .take(NUMBER_CHOICE_LIMIT)
            .map(|item| Choice::new(item.number.to_string(), ChoiceAction::PickNumber(item.number)))
            .collect();

        session.state = FlowState::AwaitingItemNumber { category };
        Ok(vec![
            Reply::text(format!("Bouquets in stock:\n{listing}")),
            Reply::with_choices("Tap a bouquet number:", numbers),
        ])
    }

    async fn pick_number(
        &self,
        session: &mut Session,
        number: u32,
    ) -> Result<Vec<Reply>, EngineError> {
        let category = match &session.state {
            FlowState::AwaitingItemNumber { category } => *category,
            _ => return Ok(Vec::new()),
        };

        let Some(item) = self.catalog.find(category, number).await? else {
            // Hold the state: the user retries from the same listing.
            return Ok(vec![Reply::text("No bouquet with that number. Pick one from the list.")]);
        };

        let selected = SelectedItem { id: item.id, title: item.title.clone(), price: item.price };
        session.state = FlowState::AwaitingAddress { category, item: selected };
        Ok(vec![Reply::text(format!(
            "You picked: No. {} - {}\nSize: {}\nPrice: ${}\n\nSend the delivery address:",
            item.number,
            item.title,
            category.label(),
            item.price
        ))])
    }

    async fn text_entered(
        &self,
        session: &mut Session,
        text: String,
    ) -> Result<Vec<Reply>, EngineError> {
        match &session.state {
            FlowState::AwaitingAddress { category, item } => {
                let Some(address) = validation::normalize_address(&text) else {
                    return Ok(vec![Reply::text("Please send a complete delivery address.")]);
                };
                let (category, item) = (*category, item.clone());
                session.state = FlowState::AwaitingDeliveryTime { category, item, address };
                Ok(vec![Reply::text("When should we deliver? (for example: today 18:30)")])
            }
            FlowState::AwaitingDeliveryTime { item, address, .. } => {
                let Some(delivery_time) = validation::normalize_delivery_time(&text) else {
                    return Ok(vec![Reply::text(
                        "Send the time as HH:MM, optionally with 'today' or 'tomorrow'.",
                    )]);
                };
                let (item, address) = (item.clone(), address.clone());
                let reply = self.payment_choice_reply(&item, &address, &delivery_time);
                session.state = FlowState::AwaitingPaymentChoice { item, address, delivery_time };
                Ok(vec![reply])
            }
            FlowState::AddAwaitingNumber { .. }
            | FlowState::AddAwaitingTitle { .. }
            | FlowState::AddAwaitingPrice { .. } => Ok(admin::text_entered(session, &text)),
            _ => Ok(Vec::new()),
        }
    }

    fn payment_choice_reply(&self, item: &SelectedItem, address: &str, delivery_time: &str) -> Reply {
        let summary = format!(
            "Let's check the order:\nBouquet: {}\nTotal: ${}\nAddress: {}\nDelivery: {}\n\nIf everything looks right, choose how to pay.",
            item.title, item.price, address, delivery_time
        );
        let mut choices = if self.payment.is_some() {
            vec![Choice::new("Pay in chat", ChoiceAction::RequestInvoice)]
        } else {
            vec![
                Choice::new(
                    "Pay by card (link)",
                    ChoiceAction::OpenUrl(self.settings.checkout_url.clone()),
                ),
                Choice::new("Confirm without payment (test)", ChoiceAction::ConfirmWithoutPayment),
            ]
        };
        choices.push(Choice::new("Back", ChoiceAction::BackToCategories));
        Reply::with_choices(summary, choices)
    }

    async fn confirm_without_payment(
        &self,
        session: &mut Session,
    ) -> Result<Vec<Reply>, EngineError> {
        let (item, address, delivery_time) = match &session.state {
            FlowState::AwaitingPaymentChoice { item, address, delivery_time } => {
                (item.clone(), address.clone(), delivery_time.clone())
            }
            _ => return Ok(Vec::new()),
        };

        let order = self
            .orders
            .create(NewOrder {
                user_id: session.user_id,
                item_id: item.id,
                total: item.price,
                address,
                delivery_time,
            })
            .await?;
        session.reset();
        Ok(vec![Reply::with_choices(
            format!("Order #{} is placed. Status: awaiting payment (test).", order.id),
            self.main_menu_choices(),
        )])
    }

    async fn request_invoice(&self, session: &mut Session) -> Result<Vec<Reply>, EngineError> {
        let (item, address, delivery_time) = match &session.state {
            FlowState::AwaitingPaymentChoice { item, address, delivery_time } => {
                (item.clone(), address.clone(), delivery_time.clone())
            }
            _ => return Ok(Vec::new()),
        };

        let Some(payment) = &self.payment else {
            return Ok(vec![Reply::text("Payment provider is not configured.")]);
        };

        payment
            .request_invoice(InvoiceRequest {
                user_id: session.user_id,
                title: item.title,
                amount: item.price,
                description: format!("Delivery: {delivery_time}\nAddress: {address}"),
            })
            .await?;

        // The session stays in AwaitingPaymentChoice until the provider's
        // asynchronous confirmation arrives as a PaymentSucceeded event.
        Ok(vec![Reply::text("Invoice sent. Complete the payment to place the order.")])
    }

    /// Payment confirmations are delivered at-least-once and correlated by
    /// user id only. When the pending selection is gone, the confirmation
    /// is acknowledged without creating anything.
    async fn payment_succeeded(&self, session: &mut Session) -> Result<Vec<Reply>, EngineError> {
        let (item, address, delivery_time) = match &session.state {
            FlowState::AwaitingPaymentChoice { item, address, delivery_time } => {
                (item.clone(), address.clone(), delivery_time.clone())
            }
            _ => {
                return Ok(vec![Reply::text(
                    "Thanks for your payment! Your order is already being processed.",
                )]);
            }
        };

        let order = self
            .orders
            .create(NewOrder {
                user_id: session.user_id,
                item_id: item.id,
                total: item.price,
                address,
                delivery_time,
            })
            .await?;
        session.reset();
        Ok(vec![Reply::with_choices(
            format!("Payment received! Order #{} is confirmed.", order.id),
            self.main_menu_choices(),
        )])
    }

    /// Stateless: available from any position and alters nothing.
    async fn list_orders(&self, user_id: UserId) -> Result<Vec<Reply>, EngineError> {
        let orders = self.orders.list_by_user(user_id).await?;
        if orders.is_empty() {
            return Ok(vec![Reply::text("You have no orders yet.")]);
        }

        let lines = orders
            .iter()
            .take(ORDER_LIST_LIMIT)
            .map(|order| {
                format!(
                    "#{} - {} ({}, No. {})\nStatus: {} · Total: ${} · {}",
                    order.id,
                    order.item_title,
                    order.item_category.label(),
                    order.item_number,
                    order.status.label(),
                    order.total,
                    order.created_at.format("%Y-%m-%d %H:%M"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(vec![Reply::text(lines)])
    }

    pub(crate) fn main_menu_choices(&self) -> Vec<Choice> {
        let mut choices = vec![
            Choice::new("Bouquets", ChoiceAction::BrowseCatalog),
            Choice::new("My orders", ChoiceAction::ListOrders),
        ];
        // The button is shown whenever a privileged set exists; pressing it
        // is still authorization-checked per user.
        if !self.settings.admins.is_empty() {
            choices.push(Choice::new("Admin", ChoiceAction::OpenAdminPanel));
        }
        choices
    }
}

pub(crate) fn category_prompt(text: &str) -> Reply {
    Reply::with_choices(text, category_choices(ChoiceAction::SelectCategory))
}

pub(crate) fn category_choices(action: fn(Category) -> ChoiceAction) -> Vec<Choice> {
    Category::ALL.iter().map(|category| Choice::new(category.label(), action(*category))).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::domain::catalog::{Category, NewCatalogItem};
    use crate::domain::order::NewOrder;
    use crate::domain::UserId;
    use crate::flows::engine::{EngineSettings, FlowEngine, ORDER_LIST_LIMIT};
    use crate::flows::session::Session;
    use crate::flows::states::{FlowEvent, FlowState};
    use crate::payment::{InvoiceRequest, PaymentError, PaymentGateway};
    use crate::reply::{ChoiceAction, Reply};
    use crate::store::{CatalogStore, InMemoryCatalogStore, InMemoryOrderStore, OrderStore};

    #[derive(Default)]
    struct RecordingGateway {
        requests: Mutex<Vec<InvoiceRequest>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn request_invoice(&self, request: InvoiceRequest) -> Result<(), PaymentError> {
            self.requests.lock().expect("gateway lock").push(request);
            Ok(())
        }
    }

    struct Harness {
        engine: FlowEngine,
        catalog: Arc<InMemoryCatalogStore>,
        orders: Arc<InMemoryOrderStore>,
    }

    fn harness(payment: Option<Arc<dyn PaymentGateway>>) -> Harness {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let orders = Arc::new(InMemoryOrderStore::new(catalog.clone()));
        let settings =
            EngineSettings { admins: HashSet::from([UserId(900)]), ..EngineSettings::default() };
        let engine = FlowEngine::new(catalog.clone(), orders.clone(), payment, settings);
        Harness { engine, catalog, orders }
    }

    async fn seed_bouquet(harness: &Harness, number: u32, price: i64) {
        harness
            .catalog
            .insert(NewCatalogItem {
                category: Category::Small,
                number,
                title: format!("Bouquet {number}"),
                price,
                image_ref: format!("file-{number}"),
            })
            .await
            .expect("seed insert");
    }

    async fn advance(harness: &Harness, session: &mut Session, event: FlowEvent) -> Vec<Reply> {
        harness.engine.handle(session, event).await.expect("event handled")
    }

    /// Walks browse -> pick -> address -> time, leaving the session at the
    /// payment choice.
    async fn reach_payment_choice(harness: &Harness, session: &mut Session) {
        advance(harness, session, FlowEvent::CategorySelected(Category::Small)).await;
        advance(harness, session, FlowEvent::NumberPicked(1)).await;
        advance(harness, session, FlowEvent::TextEntered("123 Main Street".to_owned())).await;
        advance(harness, session, FlowEvent::TextEntered("today 18:30".to_owned())).await;
        assert_eq!(session.state.tag(), "awaiting_payment_choice");
    }

    #[tokio::test]
    async fn browsing_an_empty_category_reports_out_of_stock_and_stays_idle() {
        let harness = harness(None);
        let mut session = Session::new(UserId(1));

        let replies =
            advance(&harness, &mut session, FlowEvent::CategorySelected(Category::Large)).await;

        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("No Large bouquets are in stock"));
    }

    #[tokio::test]
    async fn full_flow_without_provider_creates_one_pending_order() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        reach_payment_choice(&harness, &mut session).await;
        let replies = advance(&harness, &mut session, FlowEvent::ConfirmWithoutPayment).await;

        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(harness.orders.order_count().await, 1);
        assert!(replies[0].text.contains("awaiting payment"));

        let listed = harness.orders.list_by_user(UserId(1)).await.expect("list");
        assert_eq!(listed[0].total, 45);
    }

    #[tokio::test]
    async fn unknown_number_re_prompts_and_holds_the_selection_state() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        advance(&harness, &mut session, FlowEvent::CategorySelected(Category::Small)).await;
        let replies = advance(&harness, &mut session, FlowEvent::NumberPicked(42)).await;

        assert_eq!(session.state, FlowState::AwaitingItemNumber { category: Category::Small });
        assert!(replies[0].text.contains("No bouquet with that number"));

        // Retrying with a listed number still works.
        advance(&harness, &mut session, FlowEvent::NumberPicked(1)).await;
        assert_eq!(session.state.tag(), "awaiting_address");
    }

    #[tokio::test]
    async fn short_address_is_rejected_until_a_full_one_arrives() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        advance(&harness, &mut session, FlowEvent::CategorySelected(Category::Small)).await;
        advance(&harness, &mut session, FlowEvent::NumberPicked(1)).await;

        let rejected =
            advance(&harness, &mut session, FlowEvent::TextEntered("ab".to_owned())).await;
        assert_eq!(session.state.tag(), "awaiting_address");
        assert!(rejected[0].text.contains("complete delivery address"));

        advance(&harness, &mut session, FlowEvent::TextEntered("123 Main Street".to_owned()))
            .await;
        assert_eq!(session.state.tag(), "awaiting_delivery_time");
    }

    #[tokio::test]
    async fn delivery_time_is_validated_before_advancing() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        advance(&harness, &mut session, FlowEvent::CategorySelected(Category::Small)).await;
        advance(&harness, &mut session, FlowEvent::NumberPicked(1)).await;
        advance(&harness, &mut session, FlowEvent::TextEntered("123 Main Street".to_owned()))
            .await;

        for bad in ["banana", "25:99"] {
            advance(&harness, &mut session, FlowEvent::TextEntered(bad.to_owned())).await;
            assert_eq!(session.state.tag(), "awaiting_delivery_time", "rejected input {bad}");
        }

        advance(&harness, &mut session, FlowEvent::TextEntered("tomorrow 9:05".to_owned())).await;
        assert_eq!(session.state.tag(), "awaiting_payment_choice");
    }

    #[tokio::test]
    async fn order_total_captures_the_price_at_selection_time() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        reach_payment_choice(&harness, &mut session).await;

        let item = harness.catalog.find(Category::Small, 1).await.expect("find").expect("item");
        assert!(harness.catalog.set_price(item.id, 90).await);

        advance(&harness, &mut session, FlowEvent::ConfirmWithoutPayment).await;
        let listed = harness.orders.list_by_user(UserId(1)).await.expect("list");
        assert_eq!(listed[0].total, 45);
    }

    #[tokio::test]
    async fn duplicate_payment_confirmation_creates_at_most_one_order() {
        let gateway = Arc::new(RecordingGateway::default());
        let harness = harness(Some(gateway.clone()));
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        reach_payment_choice(&harness, &mut session).await;
        advance(&harness, &mut session, FlowEvent::InvoiceRequested).await;
        assert_eq!(session.state.tag(), "awaiting_payment_choice");
        assert_eq!(gateway.requests.lock().expect("gateway lock").len(), 1);

        let first = advance(&harness, &mut session, FlowEvent::PaymentSucceeded).await;
        assert!(first[0].text.contains("Payment received"));
        assert_eq!(session.state, FlowState::Idle);

        // Redelivery after the scratch was cleared acknowledges without a
        // second order.
        let second = advance(&harness, &mut session, FlowEvent::PaymentSucceeded).await;
        assert!(second[0].text.contains("already being processed"));
        assert_eq!(harness.orders.order_count().await, 1);
    }

    #[tokio::test]
    async fn payment_confirmation_without_pending_selection_creates_nothing() {
        let harness = harness(None);
        let mut session = Session::new(UserId(1));

        let replies = advance(&harness, &mut session, FlowEvent::PaymentSucceeded).await;

        assert!(replies[0].text.contains("already being processed"));
        assert_eq!(harness.orders.order_count().await, 0);
        assert_eq!(session.state, FlowState::Idle);
    }

    #[tokio::test]
    async fn invoice_request_without_provider_reports_not_configured() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        reach_payment_choice(&harness, &mut session).await;
        let replies = advance(&harness, &mut session, FlowEvent::InvoiceRequested).await;

        assert!(replies[0].text.contains("not configured"));
        assert_eq!(session.state.tag(), "awaiting_payment_choice");
        assert_eq!(harness.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn back_from_payment_choice_resets_and_re_prompts_categories() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        reach_payment_choice(&harness, &mut session).await;
        let replies = advance(&harness, &mut session, FlowEvent::BackRequested).await;

        assert_eq!(session.state, FlowState::Idle);
        assert!(replies[0]
            .choices
            .iter()
            .any(|choice| matches!(choice.action, ChoiceAction::SelectCategory(_))));
        assert_eq!(harness.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn order_listing_truncates_to_the_display_limit_newest_first() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let item = harness.catalog.find(Category::Small, 1).await.expect("find").expect("item");
        let mut session = Session::new(UserId(1));

        for sequence in 0..11 {
            harness
                .orders
                .create(NewOrder {
                    user_id: UserId(1),
                    item_id: item.id,
                    total: 45,
                    address: format!("{sequence} Rose Lane"),
                    delivery_time: "18:30".to_owned(),
                })
                .await
                .expect("create order");
        }

        let replies = advance(&harness, &mut session, FlowEvent::OrdersRequested).await;
        let entries = replies[0].text.split("\n\n").count();
        assert_eq!(entries, ORDER_LIST_LIMIT);
        assert_eq!(session.state, FlowState::Idle);
    }

    #[tokio::test]
    async fn payment_configured_summary_offers_the_invoice_path() {
        let harness = harness(Some(Arc::new(RecordingGateway::default())));
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        advance(&harness, &mut session, FlowEvent::CategorySelected(Category::Small)).await;
        advance(&harness, &mut session, FlowEvent::NumberPicked(1)).await;
        advance(&harness, &mut session, FlowEvent::TextEntered("123 Main Street".to_owned()))
            .await;
        let replies =
            advance(&harness, &mut session, FlowEvent::TextEntered("18:30".to_owned())).await;

        let actions: Vec<_> = replies[0].choices.iter().map(|choice| &choice.action).collect();
        assert!(actions.iter().any(|action| matches!(action, ChoiceAction::RequestInvoice)));
        assert!(!actions
            .iter()
            .any(|action| matches!(action, ChoiceAction::ConfirmWithoutPayment)));
    }

    #[tokio::test]
    async fn unconfigured_summary_offers_link_and_test_confirmation() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        advance(&harness, &mut session, FlowEvent::CategorySelected(Category::Small)).await;
        advance(&harness, &mut session, FlowEvent::NumberPicked(1)).await;
        advance(&harness, &mut session, FlowEvent::TextEntered("123 Main Street".to_owned()))
            .await;
        let replies =
            advance(&harness, &mut session, FlowEvent::TextEntered("18:30".to_owned())).await;

        let actions: Vec<_> = replies[0].choices.iter().map(|choice| &choice.action).collect();
        assert!(actions.iter().any(|action| matches!(action, ChoiceAction::OpenUrl(_))));
        assert!(actions
            .iter()
            .any(|action| matches!(action, ChoiceAction::ConfirmWithoutPayment)));
    }

    #[tokio::test]
    async fn stray_selection_events_are_ignored_outside_their_state() {
        let harness = harness(None);
        seed_bouquet(&harness, 1, 45).await;
        let mut session = Session::new(UserId(1));

        assert!(advance(&harness, &mut session, FlowEvent::NumberPicked(1)).await.is_empty());
        assert!(advance(&harness, &mut session, FlowEvent::ConfirmWithoutPayment).await.is_empty());
        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(harness.orders.order_count().await, 0);
    }
}
