use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use seva_admission::{AdmissionService, SettlementService, SlotLocks};
use seva_api::{app, AppState};
use seva_core::{
    Capacity, Category, CustomerDetails, GatewayError, GatewayOrder, Offering, PaymentGateway,
};
use seva_api::gateway::ManualGateway;
use seva_store::app_config::{AuthConfig, TempleConfig};
use seva_store::memory::{InMemoryBookingStore, InMemoryCatalog};

/// Gateway stub that always opens a session.
struct AlwaysOnGateway;

#[async_trait::async_trait]
impl PaymentGateway for AlwaysOnGateway {
    async fn create_order(
        &self,
        order_id: &str,
        _amount: i32,
        _customer: &CustomerDetails,
        _note: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        Ok(GatewayOrder {
            provider_order_id: format!("cf_{order_id}"),
            payment_session_id: "session_test_token".to_string(),
        })
    }
}

fn offering(id: i32, name: &str, amount: Option<i32>, capacity: Capacity) -> Offering {
    Offering {
        id,
        name: name.to_string(),
        name_malayalam: format!("{name}-ml"),
        malayalam_date: "Medam 1".to_string(),
        day: "Sunday".to_string(),
        bookable_date: None,
        amount,
        category: Category::Regular,
        parent_key: None,
        description: None,
        description_english: None,
        capacity,
        online_booking_available: true,
        requires_direct_visit: false,
        requires_notification: false,
        requires_advance_booking: false,
        requires_booking: false,
        is_comprehensive_ritual: false,
    }
}

fn parent_offering(id: i32, name: &str) -> Offering {
    Offering {
        category: Category::Parent,
        amount: None,
        ..offering(id, name, None, Capacity::Unlimited)
    }
}

fn subcategory_of(id: i32, name: &str, parent: &Offering) -> Offering {
    Offering {
        category: Category::Subcategory,
        parent_key: Some(parent.name_malayalam.clone()),
        ..offering(id, name, Some(500), Capacity::Unlimited)
    }
}

fn test_app(offerings: Vec<Offering>, gateway: Arc<dyn PaymentGateway>, live: bool) -> Router {
    let catalog: Arc<dyn seva_core::CatalogRepository> = Arc::new(InMemoryCatalog::with_offerings(
        offerings,
        vec!["Ashwathi".to_string(), "Bharani".to_string()],
    ));
    let bookings: Arc<dyn seva_core::BookingRepository> = Arc::new(InMemoryBookingStore::new());
    let locks = Arc::new(SlotLocks::new());

    let state = AppState {
        catalog: catalog.clone(),
        bookings: bookings.clone(),
        admission: Arc::new(AdmissionService::new(
            catalog.clone(),
            bookings.clone(),
            locks.clone(),
            "VST",
        )),
        settlement: Arc::new(SettlementService::new(catalog, bookings, locks)),
        gateway,
        gateway_live: live,
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_seconds: 3600,
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
        },
        temple: TempleConfig {
            name: "Test Temple".to_string(),
            address: "Temple Road".to_string(),
            phone: "+91 9000000000".to_string(),
            receipt_prefix: "VST".to_string(),
        },
    };

    app(state)
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn booking_body(offering_id: i32) -> Value {
    json!({
        "offeringId": offering_id,
        "devoteeName": "Arjun Menon",
        "starSign": "Ashwathi",
        "paymentMethod": "online",
    })
}

#[tokio::test]
async fn create_booking_in_manual_mode() {
    let app = test_app(
        vec![offering(1, "Archana", Some(50), Capacity::Unlimited)],
        Arc::new(ManualGateway),
        false,
    );

    let (status, body) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["paymentMode"], "manual");
    assert_eq!(body["data"]["sequenceNumber"], 1);
    assert_eq!(body["data"]["paymentStatus"], "pending");
    assert!(body["data"]["receiptNumber"]
        .as_str()
        .unwrap()
        .starts_with("VST"));
}

#[tokio::test]
async fn create_booking_opens_gateway_session() {
    let app = test_app(
        vec![offering(1, "Archana", Some(50), Capacity::Unlimited)],
        Arc::new(AlwaysOnGateway),
        true,
    );

    let (status, body) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["paymentMode"], "cashfree");
    assert_eq!(body["paymentSessionId"], "session_test_token");
    assert!(body["gatewayOrderId"].as_str().unwrap().starts_with("cf_"));
}

#[tokio::test]
async fn parent_category_rejection_lists_subcategories() {
    let parent = parent_offering(10, "Vazhipadu");
    let sub = subcategory_of(11, "Ganapathi Homam", &parent);
    let app = test_app(vec![parent, sub], Arc::new(ManualGateway), false);

    let (status, body) = request(&app, Method::POST, "/api/bookings", Some(booking_body(10))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "not_bookable");
    let subs = body["availableSubcategories"].as_array().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0]["id"], 11);
}

#[tokio::test]
async fn payment_complete_returns_receipt() {
    let app = test_app(
        vec![offering(1, "Archana", Some(50), Capacity::Unlimited)],
        Arc::new(ManualGateway),
        false,
    );

    let (_, created) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    let booking_id = created["data"]["bookingId"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/bookings/payment-complete",
        Some(json!({ "bookingId": booking_id, "transactionId": "txn_123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let receipt = &body["receiptData"];
    assert_eq!(receipt["devotee"]["name"], "Arjun Menon");
    assert_eq!(receipt["temple"]["name"], "Test Temple");
    assert_eq!(receipt["booking"]["transactionId"], "txn_123");
    assert_eq!(receipt["booking"]["sequenceNumber"], 1);

    // settlement is idempotent, a retry answers 200 with the same receipt
    let (status, retry) = request(
        &app,
        Method::POST,
        "/api/bookings/payment-complete",
        Some(json!({ "bookingId": booking_id, "transactionId": "txn_456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retry["receiptData"]["booking"]["transactionId"], "txn_123");

    let (status, fetched) = request(
        &app,
        Method::GET,
        &format!("/api/bookings/{booking_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["payment_status"], "completed");
}

#[tokio::test]
async fn webhook_settles_booking_and_always_answers_ok() {
    let app = test_app(
        vec![offering(1, "Archana", Some(50), Capacity::Unlimited)],
        Arc::new(ManualGateway),
        false,
    );

    let (_, created) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    let order_id = created["data"]["orderId"].as_str().unwrap().to_string();
    let booking_id = created["data"]["bookingId"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/webhooks/cashfree",
        Some(json!({
            "orderId": order_id,
            "paymentStatus": "SUCCESS",
            "cashfreePaymentId": "cf_pay_789",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, fetched) = request(
        &app,
        Method::GET,
        &format!("/api/bookings/{booking_id}"),
        None,
    )
    .await;
    assert_eq!(fetched["data"]["payment_status"], "completed");
    assert_eq!(fetched["data"]["transaction_id"], "cf_pay_789");

    // unknown order: logged, still 200 so the provider stops retrying
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/webhooks/cashfree",
        Some(json!({ "orderId": "ORDER_unknown", "paymentStatus": "SUCCESS" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn admission_rejects_when_completed_count_reaches_capacity() {
    let app = test_app(
        vec![offering(1, "Udayasthamana Pooja", Some(5000), Capacity::Limited(1))],
        Arc::new(ManualGateway),
        false,
    );

    let (_, created) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    let booking_id = created["data"]["bookingId"].as_str().unwrap().to_string();
    request(
        &app,
        Method::POST,
        "/api/bookings/payment-complete",
        Some(json!({ "bookingId": booking_id })),
    )
    .await;

    let (status, body) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "fully_booked");
    assert_eq!(body["booked"], 1);
    assert_eq!(body["capacity"], 1);
}

#[tokio::test]
async fn offerings_list_reports_availability() {
    let app = test_app(
        vec![
            offering(1, "Archana", Some(50), Capacity::Unlimited),
            offering(2, "Abhishekam", Some(200), Capacity::Limited(10)),
        ],
        Arc::new(ManualGateway),
        false,
    );

    let (status, body) = request(&app, Method::GET, "/api/offerings", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let limited = entries.iter().find(|e| e["id"] == 2).unwrap();
    assert_eq!(limited["maxParticipants"], 10);
    assert_eq!(limited["bookedCount"], 0);
    assert_eq!(limited["availableSlots"], 10);
    assert_eq!(limited["available"], true);
    let unlimited = entries.iter().find(|e| e["id"] == 1).unwrap();
    assert_eq!(unlimited["availableSlots"], "unlimited");
}

#[tokio::test]
async fn admin_routes_require_valid_token() {
    let app = test_app(
        vec![offering(1, "Archana", Some(50), Capacity::Unlimited)],
        Arc::new(ManualGateway),
        false,
    );

    // no Authorization header at all
    let (status, _) = request(&app, Method::GET, "/api/admin/dashboard", None).await;
    assert_ne!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/admin/dashboard")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, login) = request(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "username": "admin", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(login["status"], "error");
}

#[tokio::test]
async fn admin_dashboard_reflects_completed_bookings() {
    let app = test_app(
        vec![offering(1, "Archana", Some(50), Capacity::Limited(5))],
        Arc::new(ManualGateway),
        false,
    );

    let (_, created) = request(&app, Method::POST, "/api/bookings", Some(booking_body(1))).await;
    let booking_id = created["data"]["bookingId"].as_str().unwrap().to_string();
    request(
        &app,
        Method::POST,
        "/api/bookings/payment-complete",
        Some(json!({ "bookingId": booking_id })),
    )
    .await;

    let (status, login) = request(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "username": "admin", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/admin/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["overview"]["totalBookings"], 1);
    assert_eq!(body["data"]["overview"]["totalRevenue"], 50);
    assert_eq!(body["data"]["recentBookings"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/admin/offerings/1/participants")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let participants = body["data"]["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 5);
    assert_eq!(participants[0]["status"], "booked");
    assert_eq!(participants[0]["devoteeName"], "Arjun Menon");
    assert_eq!(participants[1]["status"], "available");
    assert_eq!(body["data"]["statistics"]["bookedSlots"], 1);
    assert_eq!(body["data"]["statistics"]["fillPercentage"], 20);
}
