//! Catalog administration flow: item creation, listing, availability
//! toggling. Same mechanics as the order flow, driven by the same engine.

use crate::domain::catalog::{ItemId, NewCatalogItem};
use crate::flows::engine::{category_choices, EngineError, FlowEngine};
use crate::flows::session::Session;
use crate::flows::states::{FlowEvent, FlowState};
use crate::reply::{Choice, ChoiceAction, Reply};
use crate::store::StoreError;

/// Entry-point dispatch. Unauthorized invocations are dropped without a
/// reply so the bot never reveals who is privileged.
pub(crate) async fn handle(
    engine: &FlowEngine,
    session: &mut Session,
    event: FlowEvent,
) -> Result<Vec<Reply>, EngineError> {
    if !engine.is_admin(session.user_id) {
        return Ok(Vec::new());
    }

    match event {
        FlowEvent::AdminPanelRequested => Ok(vec![Reply::with_choices(
            "Admin panel:",
            vec![
                Choice::new("Add bouquet", ChoiceAction::AdminAddItem),
                Choice::new("List bouquets", ChoiceAction::AdminListItems),
                Choice::new("Main menu", ChoiceAction::MainMenu),
            ],
        )]),
        FlowEvent::AdminAddRequested => {
            session.state = FlowState::AddAwaitingCategory;
            Ok(vec![Reply::with_choices(
                "Size for the new bouquet:",
                category_choices(ChoiceAction::AdminSelectCategory),
            )])
        }
        FlowEvent::AdminCategorySelected(category) => {
            if session.state != FlowState::AddAwaitingCategory {
                return Ok(Vec::new());
            }
            session.state = FlowState::AddAwaitingNumber { category };
            Ok(vec![Reply::text("Bouquet number (an integer):")])
        }
        FlowEvent::AdminListRequested => list_items(engine).await,
        FlowEvent::AdminToggleRequested { item_id } => toggle_item(engine, item_id).await,
        _ => Ok(Vec::new()),
    }
}

/// Text steps of the add flow. Each validates and re-prompts without
/// advancing; these states are only reachable through the authorized
/// entry point.
pub(crate) fn text_entered(session: &mut Session, text: &str) -> Vec<Reply> {
    match &session.state {
        FlowState::AddAwaitingNumber { category } => {
            let number = match text.trim().parse::<u32>() {
                Ok(number) if number >= 1 => number,
                _ => return vec![Reply::text("Send the number as digits, starting from 1.")],
            };
            let category = *category;
            session.state = FlowState::AddAwaitingTitle { category, number };
            vec![Reply::text("Short title or description:")]
        }
        FlowState::AddAwaitingTitle { category, number } => {
            let title = text.trim();
            if title.is_empty() {
                return vec![Reply::text("The title cannot be empty.")];
            }
            let (category, number, title) = (*category, *number, title.to_owned());
            session.state = FlowState::AddAwaitingPrice { category, number, title };
            vec![Reply::text("Price in whole dollars:")]
        }
        FlowState::AddAwaitingPrice { category, number, title } => {
            let price = match text.trim().parse::<i64>() {
                Ok(price) if price >= 0 => price,
                _ => return vec![Reply::text("Send the price as a non-negative whole number.")],
            };
            let (category, number, title) = (*category, *number, title.clone());
            session.state = FlowState::AddAwaitingPhoto { category, number, title, price };
            vec![Reply::text("Send one photo of the bouquet:")]
        }
        _ => Vec::new(),
    }
}

/// Final step of the add flow: the photo arrives and the item is inserted.
/// A duplicate (category, number) surfaces to the admin and resets the
/// flow so no half-created draft lingers.
pub(crate) async fn photo_supplied(
    engine: &FlowEngine,
    session: &mut Session,
    image_ref: String,
) -> Result<Vec<Reply>, EngineError> {
    let (category, number, title, price) = match &session.state {
        FlowState::AddAwaitingPhoto { category, number, title, price } => {
            (*category, *number, title.clone(), *price)
        }
        _ => return Ok(Vec::new()),
    };

    match engine
        .catalog
        .insert(NewCatalogItem { category, number, title, price, image_ref })
        .await
    {
        Ok(item) => {
            session.reset();
            Ok(vec![Reply::with_choices(
                format!("Added bouquet No. {} ({}).", item.number, item.category.label()),
                engine.main_menu_choices(),
            )])
        }
        Err(StoreError::DuplicateKey { category, number }) => {
            session.reset();
            Ok(vec![Reply::text(format!(
                "A bouquet numbered {number} already exists in the {} size.",
                category.label()
            ))])
        }
        Err(error) => Err(error.into()),
    }
}

async fn list_items(engine: &FlowEngine) -> Result<Vec<Reply>, EngineError> {
    let items = engine.catalog.list_all().await?;
    if items.is_empty() {
        return Ok(vec![Reply::text("The catalog is empty.")]);
    }

    let lines = items
        .iter()
        .map(|item| {
            let mark = if item.available { "✓" } else { "✗" };
            format!(
                "{mark} {} No. {} - {} - ${} (id:{})",
                item.category.as_str().to_uppercase(),
                item.number,
                item.title,
                item.price,
                item.id,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(vec![Reply::text(lines)])
}

async fn toggle_item(
    engine: &FlowEngine,
    item_id: Option<ItemId>,
) -> Result<Vec<Reply>, EngineError> {
    let Some(item_id) = item_id else {
        return Ok(vec![Reply::text("Usage: /toggle <id>")]);
    };

    let items = engine.catalog.list_all().await?;
    let Some(item) = items.iter().find(|item| item.id == item_id) else {
        return Ok(vec![Reply::text(format!("No bouquet with id {item_id}."))]);
    };

    let now_available = !item.available;
    engine.catalog.set_availability(item_id, now_available).await?;
    Ok(vec![Reply::text(format!(
        "Bouquet {item_id} is now {}.",
        if now_available { "in stock" } else { "out of stock" }
    ))])
}
