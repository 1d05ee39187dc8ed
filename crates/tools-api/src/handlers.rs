//! # Request Handlers
//!
//! Axum request handlers for the storefront API.
//! Each handler makes exactly one record store or payment bridge call,
//! after any ownership check, and serializes its result.

use crate::auth::{role_of, Admin, Identity};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tools_core::{
    Collection, Currency, DeleteAck, Document, Filter, InsertAck, InsertOutcome, ListOrder,
    PaymentBridge, RecordKey, RecordStore, Role, UpdateAck, EMAIL_FIELD, ID_FIELD, ROLE_FIELD,
};
use tracing::{debug, info, instrument};

/// Query fields `GET /user` forwards to the store
pub const USER_FILTER_FIELDS: &[&str] = &["email", "role", "name"];

/// Query fields `GET /product` forwards to the store
pub const PRODUCT_FILTER_FIELDS: &[&str] = &["name", "category", "brand"];

/// Fields identifying a duplicate order
pub const ORDER_UNIQUE_FIELDS: &[&str] = &["product", "date", "email"];

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response of `PUT /user/{email}`
#[derive(Debug, Serialize)]
pub struct UserSessionResponse {
    pub token: String,
    pub result: UpdateAck,
}

/// Response of `GET /admin/{email}`
#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

/// Response of `POST /order`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrderOutcome {
    Created { success: bool, result: InsertAck },
    Existing { success: bool, appointment: Document },
}

impl From<InsertOutcome> for OrderOutcome {
    fn from(outcome: InsertOutcome) -> Self {
        match outcome {
            InsertOutcome::Inserted(result) => OrderOutcome::Created {
                success: true,
                result,
            },
            InsertOutcome::Existing(appointment) => OrderOutcome::Existing {
                success: false,
                appointment,
            },
        }
    }
}

/// Body of `POST /create-payment-intent`
#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in major units
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Self-service user writes may not touch the id, the natural key or the role.
fn self_service_patch(mut body: Document, email: &str) -> Document {
    if body.remove(ROLE_FIELD).is_some() {
        debug!(email, "Ignoring role in self-service user write");
    }
    body.remove(ID_FIELD);
    body.insert(EMAIL_FIELD.to_string(), Value::String(email.to_string()));
    body
}

/// Fill the owner email from the identity, rejecting a different one.
fn claim_ownership(body: &mut Document, identity: &Identity) -> ApiResult<()> {
    match body.get(EMAIL_FIELD) {
        None | Some(Value::Null) => {
            body.insert(
                EMAIL_FIELD.to_string(),
                Value::String(identity.email.clone()),
            );
            Ok(())
        }
        Some(other) => identity.ensure_owner(other.as_str()),
    }
}

// =============================================================================
// Service
// =============================================================================

pub async fn welcome() -> &'static str {
    "Welcome to Hexa Tools Server!"
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hexa-tools",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.backend_name(),
        "payments": state.payments.provider_name(),
    }))
}

// =============================================================================
// Users
// =============================================================================

/// Upsert the user keyed by `email` and issue a token for it.
#[instrument(skip(state, identity, body))]
pub async fn upsert_user(
    State(state): State<AppState>,
    identity: Option<Identity>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Document>,
) -> ApiResult<Json<UserSessionResponse>> {
    if let Some(identity) = &identity {
        identity.ensure_owner(Some(&email))?;
    }

    let result = state
        .store
        .upsert(
            Collection::Users,
            &RecordKey::email(&email),
            self_service_patch(body, &email),
        )
        .await?;
    let token = state.tokens.issue(&email)?;

    info!(upserted = result.upserted_count, "User session issued");
    Ok(Json(UserSessionResponse { token, result }))
}

#[instrument(skip(state, _identity))]
pub async fn list_users(
    State(state): State<AppState>,
    _identity: Identity,
    AppQuery(query): AppQuery<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Document>>> {
    let filter = Filter::from_query(&query, USER_FILTER_FIELDS);
    let users = state
        .store
        .find_many(Collection::Users, &filter, ListOrder::Natural)
        .await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .store
        .find_one(Collection::Users, &RecordKey::email(&email))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("user {}", email)))
}

#[instrument(skip(state, body))]
pub async fn patch_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Document>,
) -> ApiResult<Json<UpdateAck>> {
    let ack = state
        .store
        .upsert(
            Collection::Users,
            &RecordKey::email(&email),
            self_service_patch(body, &email),
        )
        .await?;
    Ok(Json(ack))
}

#[instrument(skip(state, admin), fields(by = %admin.email))]
pub async fn promote_admin(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(email): Path<String>,
) -> ApiResult<Json<UpdateAck>> {
    let mut patch = Document::new();
    patch.insert(
        ROLE_FIELD.to_string(),
        Value::String(Role::Admin.as_str().to_string()),
    );

    let ack = state
        .store
        .update(Collection::Users, &RecordKey::email(&email), patch)
        .await?;
    info!(email = %email, matched = ack.matched_count, "Promoted user to admin");
    Ok(Json(ack))
}

#[instrument(skip(state, _identity))]
pub async fn check_admin(
    State(state): State<AppState>,
    _identity: Identity,
    Path(email): Path<String>,
) -> ApiResult<Json<AdminCheckResponse>> {
    let admin = role_of(&state, &email)
        .await?
        .is_some_and(|role| role.is_admin());
    Ok(Json(AdminCheckResponse { admin }))
}

// =============================================================================
// Products
// =============================================================================

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Document>>> {
    let filter = Filter::from_query(&query, PRODUCT_FILTER_FIELDS);
    let products = state
        .store
        .find_many(Collection::Products, &filter, ListOrder::Natural)
        .await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .store
        .find_one(Collection::Products, &RecordKey::id(&id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("product {}", id)))
}

#[instrument(skip(state, _admin, body))]
pub async fn create_product(
    State(state): State<AppState>,
    _admin: Admin,
    AppJson(body): AppJson<Document>,
) -> ApiResult<Json<InsertAck>> {
    let ack = state.store.insert(Collection::Products, body).await?;
    info!(id = %ack.inserted_id, "Created product");
    Ok(Json(ack))
}

#[instrument(skip(state, _admin, body))]
pub async fn update_product(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
    AppJson(body): AppJson<Document>,
) -> ApiResult<Json<UpdateAck>> {
    let ack = state
        .store
        .update(Collection::Products, &RecordKey::id(&id), body)
        .await?;
    Ok(Json(ack))
}

#[instrument(skip(state, _admin))]
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    let ack = state
        .store
        .delete(Collection::Products, &RecordKey::id(&id))
        .await?;
    info!(deleted = ack.deleted_count, "Deleted product");
    Ok(Json(ack))
}

// =============================================================================
// Reviews
// =============================================================================

#[instrument(skip(state, identity, body), fields(email = %identity.email))]
pub async fn create_review(
    State(state): State<AppState>,
    identity: Identity,
    AppJson(mut body): AppJson<Document>,
) -> ApiResult<Json<InsertAck>> {
    claim_ownership(&mut body, &identity)?;
    let ack = state.store.insert(Collection::Reviews, body).await?;
    Ok(Json(ack))
}

/// Reviews, newest first
#[instrument(skip(state))]
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let reviews = state
        .store
        .find_many(Collection::Reviews, &Filter::all(), ListOrder::NewestFirst)
        .await?;
    Ok(Json(reviews))
}

// =============================================================================
// Orders
// =============================================================================

/// Insert the order unless one exists for the same product, date and email.
#[instrument(skip(state, identity, body), fields(email = %identity.email))]
pub async fn create_order(
    State(state): State<AppState>,
    identity: Identity,
    AppJson(mut body): AppJson<Document>,
) -> ApiResult<Json<OrderOutcome>> {
    claim_ownership(&mut body, &identity)?;

    let outcome = state
        .store
        .insert_if_absent(Collection::Orders, body, ORDER_UNIQUE_FIELDS)
        .await?;
    if !outcome.is_inserted() {
        info!("Order already booked");
    }
    Ok(Json(outcome.into()))
}

/// The caller's own orders; `email` must name the caller.
#[instrument(skip(state, identity), fields(identity = %identity.email))]
pub async fn list_orders(
    State(state): State<AppState>,
    identity: Identity,
    AppQuery(query): AppQuery<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Document>>> {
    let email = query.get(EMAIL_FIELD).map(String::as_str);
    identity.ensure_owner(email)?;

    let orders = state
        .store
        .find_many(
            Collection::Orders,
            &Filter::all().with(EMAIL_FIELD, identity.email.as_str()),
            ListOrder::Natural,
        )
        .await?;
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .store
        .find_one(Collection::Orders, &RecordKey::id(&id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("order {}", id)))
}

#[instrument(skip(state, identity), fields(identity = %identity.email))]
pub async fn delete_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    let key = RecordKey::id(&id);
    let order = state
        .store
        .find_one(Collection::Orders, &key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("order {}", id)))?;
    identity.ensure_owner(order.get(EMAIL_FIELD).and_then(Value::as_str))?;

    let ack = state.store.delete(Collection::Orders, &key).await?;
    info!(deleted = ack.deleted_count, "Deleted order");
    Ok(Json(ack))
}

#[instrument(skip(state, _admin))]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: Admin,
) -> ApiResult<Json<Vec<Document>>> {
    let orders = state
        .store
        .find_many(Collection::Orders, &Filter::all(), ListOrder::Natural)
        .await?;
    Ok(Json(orders))
}

// =============================================================================
// Payments
// =============================================================================

#[instrument(skip(state, _identity, request), fields(price = request.price))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    _identity: Identity,
    AppJson(request): AppJson<PaymentIntentRequest>,
) -> ApiResult<Json<PaymentIntentResponse>> {
    let currency = match request.currency.as_deref() {
        Some(code) => code.parse::<Currency>()?,
        None => Currency::default(),
    };

    let intent = state.payments.create_intent(request.price, currency).await?;
    info!(
        provider = state.payments.provider_name(),
        intent_id = %intent.intent_id,
        "Created payment intent"
    );

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
