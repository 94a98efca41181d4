use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use seva_core::{BookingFilter, Capacity, Category, Offering, PaymentStatus};

use crate::auth::{issue_admin_token, verify_admin};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// POST /api/admin/login: stateless JWT issuance, credentials from
/// config.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, AppError> {
    if body.username != state.auth.admin_username || body.password != state.auth.admin_password {
        return Err(AppError::AuthenticationError(
            "invalid credentials".to_string(),
        ));
    }

    let token = issue_admin_token(&state.auth)?;
    info!(username = %body.username, "admin login");

    Ok(Json(json!({
        "status": "success",
        "message": "Login successful",
        "token": token,
        "admin": { "username": body.username, "role": "admin" },
    })))
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    verify_admin(&state.auth, bearer.token())?;

    let internal = |e: seva_core::RepoError| AppError::InternalServerError(e.to_string());

    let offerings = state.catalog.list_all().await.map_err(internal)?;
    let total_completed = state
        .bookings
        .count_all(Some(PaymentStatus::Completed))
        .await
        .map_err(internal)?;
    let total_pending = state
        .bookings
        .count_all(Some(PaymentStatus::Pending))
        .await
        .map_err(internal)?;
    let total_revenue = state.bookings.completed_revenue().await.map_err(internal)?;
    let recent = state
        .bookings
        .list_recent_completed(10)
        .await
        .map_err(internal)?;

    let mut offering_stats = Vec::with_capacity(offerings.len());
    for offering in &offerings {
        offering_stats.push(offering_stat(&state, offering).await?);
    }

    Ok(Json(json!({
        "status": "success",
        "data": {
            "overview": {
                "totalOfferings": offerings.len(),
                "totalBookings": total_completed,
                "pendingBookings": total_pending,
                "totalRevenue": total_revenue,
                "categoryBreakdown": {
                    "regular": count_by(&offerings, Category::Regular),
                    "special": count_by(&offerings, Category::Special),
                    "festival": count_by(&offerings, Category::Festival),
                    "premium": count_by(&offerings, Category::Premium),
                    "parent": count_by(&offerings, Category::Parent),
                    "subcategory": count_by(&offerings, Category::Subcategory),
                },
            },
            "recentBookings": recent.iter().map(|b| json!({
                "id": b.id,
                "receiptNumber": b.receipt_number,
                "devoteeName": b.devotee_name,
                "starSign": b.star_sign,
                "offeringId": b.offering_id,
                "amount": b.amount,
                "sequenceNumber": b.sequence_number,
                "transactionId": b.transaction_id,
                "date": b.created_at,
            })).collect::<Vec<_>>(),
            "offeringStats": offering_stats,
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    #[serde(default)]
    pub offering_id: Option<i32>,
    /// "pending" | "completed" | "failed" | "all"; defaults to completed
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/admin/bookings: filtered, paginated listing.
pub async fn list_bookings(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Value>, AppError> {
    verify_admin(&state.auth, bearer.token())?;

    let status = match query.status.as_deref() {
        None => Some(PaymentStatus::Completed),
        Some("all") => None,
        Some(s) => Some(PaymentStatus::parse(s).ok_or_else(|| {
            AppError::Booking(seva_admission::BookingError::Validation(format!(
                "unknown payment status '{s}'"
            )))
        })?),
    };

    let filter = BookingFilter {
        offering_id: query.offering_id,
        status,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(50).clamp(1, 200),
    };

    let (bookings, total) = state
        .bookings
        .list(&filter)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let total_pages = total.div_ceil(filter.limit);
    Ok(Json(json!({
        "status": "success",
        "data": {
            "bookings": bookings,
            "pagination": {
                "current": filter.page,
                "total": total_pages,
                "count": total,
                "limit": filter.limit,
            },
        }
    })))
}

/// GET /api/admin/offerings/{id}/participants: the slot roster. Numbered
/// slots for finite capacity (empty ones included), a sequential list for
/// unlimited offerings.
pub async fn offering_participants(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Path(offering_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    verify_admin(&state.auth, bearer.token())?;

    let internal = |e: seva_core::RepoError| AppError::InternalServerError(e.to_string());

    let offering = state
        .catalog
        .find_by_id(offering_id)
        .await
        .map_err(internal)?
        .ok_or(AppError::Booking(
            seva_admission::BookingError::OfferingNotFound(offering_id),
        ))?;

    if offering.category == Category::Parent {
        let subcategories = state
            .catalog
            .find_subcategories(&offering.name_malayalam)
            .await
            .map_err(internal)?;
        return Ok(Json(json!({
            "status": "error",
            "kind": "not_bookable",
            "message": "Parent categories cannot have direct bookings",
            "subcategories": subcategories,
        })));
    }

    let completed = state
        .bookings
        .list_completed(offering_id)
        .await
        .map_err(internal)?;

    let participants: Vec<Value> = match offering.capacity {
        Capacity::Limited(capacity) => (1..=capacity)
            .map(|slot| match completed.get(slot as usize - 1) {
                Some(booking) => booked_slot(slot, booking),
                None => json!({ "slotNumber": slot, "status": "available" }),
            })
            .collect(),
        Capacity::Unlimited => completed
            .iter()
            .enumerate()
            .map(|(i, booking)| booked_slot(i as u32 + 1, booking))
            .collect(),
    };

    let booked = completed.len() as u32;
    let revenue: i64 = completed.iter().map(|b| b.amount as i64).sum();
    let statistics = json!({
        "totalSlots": match offering.capacity {
            Capacity::Limited(n) => json!(n),
            Capacity::Unlimited => json!("unlimited"),
        },
        "bookedSlots": booked,
        "availableSlots": match offering.capacity {
            Capacity::Limited(n) => json!(n.saturating_sub(booked)),
            Capacity::Unlimited => json!("unlimited"),
        },
        "totalRevenue": revenue,
        "averageAmount": if booked > 0 { revenue / booked as i64 } else { 0 },
        "fillPercentage": offering.capacity.limit().map(|n| booked * 100 / n),
    });

    Ok(Json(json!({
        "status": "success",
        "data": {
            "offeringId": offering_id,
            "offeringName": offering.name,
            "category": offering.category,
            "date": offering.bookable_date,
            "participants": participants,
            "statistics": statistics,
        }
    })))
}

async fn offering_stat(state: &AppState, offering: &Offering) -> Result<Value, AppError> {
    // Parent and unpriced entries carry no bookings by construction.
    let (booked, revenue) = if offering.is_bookable() {
        let completed = state
            .bookings
            .list_completed(offering.id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        let revenue: i64 = completed.iter().map(|b| b.amount as i64).sum();
        (completed.len() as u32, revenue)
    } else {
        (0, 0)
    };

    Ok(json!({
        "id": offering.id,
        "name": offering.name,
        "nameMalayalam": offering.name_malayalam,
        "date": offering.bookable_date,
        "category": offering.category,
        "amount": offering.amount,
        "bookedCount": booked,
        "maxParticipants": offering.capacity.limit(),
        "availableSlots": match offering.capacity {
            Capacity::Limited(n) => json!(n.saturating_sub(booked)),
            Capacity::Unlimited => json!("unlimited"),
        },
        "revenue": revenue,
        "isFullyBooked": offering.capacity.limit().is_some_and(|n| booked >= n),
        "isBookable": offering.is_bookable(),
    }))
}

fn booked_slot(slot: u32, booking: &seva_core::Booking) -> Value {
    json!({
        "slotNumber": slot,
        "status": "booked",
        "devoteeName": booking.devotee_name,
        "starSign": booking.star_sign,
        "bookingDate": booking.created_at,
        "receiptNumber": booking.receipt_number,
        "transactionId": booking.transaction_id,
        "paymentMethod": booking.payment_method,
        "amount": booking.amount,
        "bookingId": booking.id,
        "sequenceNumber": booking.sequence_number,
    })
}

fn count_by(offerings: &[Offering], category: Category) -> usize {
    offerings.iter().filter(|o| o.category == category).count()
}
