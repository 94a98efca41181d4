use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use seva_core::{Category, Offering};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/offerings: the catalog with live availability per entry.
pub async fn list_offerings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let offerings = state
        .catalog
        .list_all()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut entries = Vec::with_capacity(offerings.len());
    for offering in &offerings {
        let availability = state.admission.availability(offering.id, None).await?;
        entries.push(json!({
            "id": offering.id,
            "name": offering.name,
            "nameMalayalam": offering.name_malayalam,
            "malayalamDate": offering.malayalam_date,
            "day": offering.day,
            "date": offering.bookable_date,
            "amount": offering.amount,
            "category": offering.category,
            "maxParticipants": offering.capacity.limit(),
            "bookedCount": availability.completed_count,
            "availableSlots": availability.remaining,
            "available": availability.has_room(),
            "description": offering.description,
            "descriptionEnglish": offering.description_english,
            "parentCategory": offering.parent_key,
            "bookingRequirements": offering.booking_requirements(),
            "requiresAdvanceBooking": offering.requires_advance_booking,
            "requiresDirectVisit": offering.requires_direct_visit,
            "requiresNotification": offering.requires_notification,
            "requiresBooking": offering.requires_booking,
            "isComprehensiveRitual": offering.is_comprehensive_ritual,
            "onlineBookingAvailable": offering.online_booking_available,
        }));
    }

    Ok(Json(json!({
        "status": "success",
        "data": entries,
        "meta": {
            "totalOfferings": offerings.len(),
            "categories": category_counts(&offerings),
        }
    })))
}

/// GET /api/offerings/categories: grouped listing, parents carrying their
/// subcategories.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let regular = state.catalog.list_by_category(Category::Regular).await;
    let special = state.catalog.list_by_category(Category::Special).await;
    let festival = state.catalog.list_by_category(Category::Festival).await;
    let premium = state.catalog.list_by_category(Category::Premium).await;
    let parents = state.catalog.list_by_category(Category::Parent).await;

    let internal = |e: seva_core::RepoError| AppError::InternalServerError(e.to_string());
    let (regular, special, festival, premium, parents) = (
        regular.map_err(internal)?,
        special.map_err(internal)?,
        festival.map_err(internal)?,
        premium.map_err(internal)?,
        parents.map_err(internal)?,
    );

    let mut parent_groups = Vec::with_capacity(parents.len());
    for parent in parents {
        let subcategories = state
            .catalog
            .find_subcategories(&parent.name_malayalam)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        parent_groups.push(json!({
            "parent": parent,
            "subcategories": subcategories,
        }));
    }

    Ok(Json(json!({
        "status": "success",
        "data": {
            "regular": regular,
            "special": special,
            "festival": festival,
            "premium": premium,
            "specialOfferingCategories": parent_groups,
        }
    })))
}

/// GET /api/offerings/subcategories/{parent}
pub async fn subcategories(
    State(state): State<AppState>,
    Path(parent): Path<String>,
) -> Result<Json<Value>, AppError> {
    let subcategories = state
        .catalog
        .find_subcategories(&parent)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if subcategories.is_empty() {
        return Err(AppError::NotFound(format!(
            "no subcategories found for parent category '{parent}'"
        )));
    }

    Ok(Json(json!({
        "status": "success",
        "data": {
            "parentCategory": parent,
            "subcategories": subcategories,
        }
    })))
}

/// GET /api/offerings/available/{date}: fixed-date matches plus any-day
/// offerings.
pub async fn available_on_date(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Value>, AppError> {
    let offerings = state
        .catalog
        .list_all()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let available: Vec<&Offering> = offerings
        .iter()
        .filter(|o| o.bookable_date.is_none() || o.bookable_date == Some(date))
        .collect();

    Ok(Json(json!({
        "status": "success",
        "data": {
            "date": date,
            "availableOfferings": available,
        }
    })))
}

/// GET /api/stars: nakshatra names for the booking form.
pub async fn stars(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let stars = state
        .catalog
        .list_stars()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "data": stars,
    })))
}

fn category_counts(offerings: &[Offering]) -> Value {
    let count = |category: Category| {
        offerings
            .iter()
            .filter(|o| o.category == category)
            .count()
    };
    json!({
        "regular": count(Category::Regular),
        "special": count(Category::Special),
        "festival": count(Category::Festival),
        "premium": count(Category::Premium),
        "parent": count(Category::Parent),
        "subcategory": count(Category::Subcategory),
    })
}
