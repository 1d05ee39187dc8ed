use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tools_api::routes::{route_table, Guard, Verb};
use tools_api::{create_router, AppConfig, AppState, Claims, TokenConfig, TokenService};
use tools_core::{
    Collection, Currency, DeleteAck, Document, Filter, InsertAck, ListOrder, MemoryStore,
    PaymentBridge, PaymentError, PaymentIntent, PaymentResult, RecordKey, RecordStore,
    SharedStore, StoreResult, UpdateAck,
};
use tower::ServiceExt; // for .oneshot()

const SECRET: &str = "router-test-secret-with-plenty-of-length";
const ADMIN: &str = "admin@x.com";
const ALICE: &str = "alice@x.com";
const BOB: &str = "bob@x.com";

// =============================================================================
// Harness
// =============================================================================

/// Payment bridge answering without a network
struct StubBridge {
    decline: bool,
}

#[async_trait]
impl PaymentBridge for StubBridge {
    async fn create_intent(&self, amount: f64, currency: Currency) -> PaymentResult<PaymentIntent> {
        let minor_units = currency.to_minor_units(amount)?;
        if self.decline {
            return Err(PaymentError::ProviderError {
                provider: "stub".to_string(),
                message: "Your card was declined.".to_string(),
            });
        }
        Ok(PaymentIntent {
            intent_id: "pi_stub".to_string(),
            client_secret: format!("pi_stub_secret_{}_{}", minor_units, currency.as_str()),
            amount: minor_units,
            currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// Store whose calls never complete
struct StalledStore;

#[async_trait]
impl RecordStore for StalledStore {
    async fn find_many(&self, _: Collection, _: &Filter, _: ListOrder) -> StoreResult<Vec<Document>> {
        std::future::pending().await
    }

    async fn find_one(&self, _: Collection, _: &RecordKey) -> StoreResult<Option<Document>> {
        std::future::pending().await
    }

    async fn insert(&self, _: Collection, _: Document) -> StoreResult<InsertAck> {
        std::future::pending().await
    }

    async fn write(&self, _: Collection, _: &RecordKey, _: Document, _: bool) -> StoreResult<UpdateAck> {
        std::future::pending().await
    }

    async fn delete(&self, _: Collection, _: &RecordKey) -> StoreResult<DeleteAck> {
        std::future::pending().await
    }

    fn backend_name(&self) -> &'static str {
        "stalled"
    }
}

struct Harness {
    app: Router,
    state: AppState,
}

impl Harness {
    /// Memory store seeded with an admin, a user and a user without a role
    async fn new() -> Self {
        Self::seeded(false).await
    }

    async fn declining() -> Self {
        Self::seeded(true).await
    }

    async fn seeded(decline: bool) -> Self {
        let harness = Self::build(Arc::new(MemoryStore::new()), decline);
        harness.seed_user(ADMIN, Some("admin")).await;
        harness.seed_user(ALICE, Some("user")).await;
        harness.seed_user(BOB, None).await;
        harness
    }

    fn build(store: SharedStore, decline: bool) -> Self {
        let config = AppConfig {
            store_timeout: Duration::from_millis(200),
            ..AppConfig::default()
        };
        let state = AppState::new(
            config,
            store,
            Arc::new(StubBridge { decline }),
            TokenService::new(TokenConfig::new(SECRET, 24)),
        );

        Self {
            app: create_router(state.clone()),
            state,
        }
    }

    async fn seed_user(&self, email: &str, role: Option<&str>) {
        let mut record = Document::new();
        record.insert("name".to_string(), json!(email.split('@').next()));
        if let Some(role) = role {
            record.insert("role".to_string(), json!(role));
        }
        self.state
            .store
            .upsert(Collection::Users, &RecordKey::email(email), record)
            .await
            .unwrap();
    }

    fn token(&self, email: &str) -> String {
        self.state.tokens.issue(email).unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let auth = token.map(|t| format!("Bearer {}", t));
        self.call_with_auth(method, uri, auth.as_deref(), body).await
    }

    async fn call_with_auth(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, json)
    }

    async fn create_product(&self, name: &str) -> String {
        let admin = self.token(ADMIN);
        let (status, body) = self
            .call(Method::POST, "/product", Some(&admin), Some(json!({"name": name})))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["insertedId"].as_str().unwrap().to_string()
    }
}

/// A concrete URI for a route pattern
fn concrete(path: &str) -> String {
    path.replace("{email}", ALICE).replace("{id}", "0123456789abcdef")
}

fn needs_body(verb: Verb) -> bool {
    matches!(verb, Verb::Post | Verb::Put | Verb::Patch)
}

// =============================================================================
// Gate
// =============================================================================

#[tokio::test]
async fn guarded_routes_without_credential_are_401() {
    let harness = Harness::new().await;

    for route in route_table().into_iter().filter(|r| r.guard.requires_credential()) {
        let method = route.verb.method();
        let body = needs_body(route.verb).then(|| json!({}));
        let (status, body) = harness
            .call(method.clone(), &concrete(route.path), None, body)
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, route.path);
        assert_eq!(body["code"], json!(401));
    }
}

#[tokio::test]
async fn tampered_credentials_are_403() {
    let harness = Harness::new().await;
    let foreign = TokenService::new(TokenConfig::new(
        "a-completely-different-signing-secret-value",
        24,
    ))
    .issue(ALICE)
    .unwrap();

    let mut tampered = harness.token(ALICE);
    tampered.push('x');

    let bad_headers = [
        "Bearer not-a-jwt".to_string(),
        format!("Bearer {}", foreign),
        format!("Bearer {}", tampered),
        "Basic YWxpY2U6c2VjcmV0".to_string(),
    ];

    for route in route_table().into_iter().filter(|r| r.guard != Guard::Public) {
        let method = route.verb.method();
        for auth in &bad_headers {
            let body = needs_body(route.verb).then(|| json!({}));
            let (status, _) = harness
                .call_with_auth(method.clone(), &concrete(route.path), Some(auth), body)
                .await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {} with {}", method, route.path, auth);
        }
    }
}

#[tokio::test]
async fn blank_credentials_count_as_missing() {
    let harness = Harness::new().await;

    for route in route_table().into_iter().filter(|r| r.guard.requires_credential()) {
        let method = route.verb.method();
        for auth in ["", "Bearer", "Bearer   "] {
            let body = needs_body(route.verb).then(|| json!({}));
            let (status, _) = harness
                .call_with_auth(method.clone(), &concrete(route.path), Some(auth), body)
                .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with {:?}", method, route.path, auth);
        }
    }

    let (status, body) = harness
        .call_with_auth(
            Method::PUT,
            "/user/carol@x.com",
            Some(""),
            Some(json!({"name": "Carol"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn expired_credential_is_403() {
    let harness = Harness::new().await;
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        email: ALICE.to_string(),
        iat: now - 7200,
        exp: now - 60,
    };
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, _) = harness
        .call(Method::GET, "/order?email=alice@x.com", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_routes_reject_non_admins_and_serve_admins() {
    let harness = Harness::new().await;
    let product_id = harness.create_product("Hammer").await;
    let product_uri = format!("/product/{}", product_id);

    let calls: Vec<(Method, String, Option<Value>)> = vec![
        (Method::PUT, "/user/admin/bob@x.com".to_string(), None),
        (Method::POST, "/product".to_string(), Some(json!({"name": "Saw"}))),
        (Method::PATCH, product_uri.clone(), Some(json!({"price": 20}))),
        (Method::GET, "/all-orders".to_string(), None),
        (Method::DELETE, product_uri.clone(), None),
    ];

    let alice = harness.token(ALICE);
    let bob = harness.token(BOB);
    for (method, uri, body) in &calls {
        for token in [&alice, &bob] {
            let (status, _) = harness
                .call(method.clone(), uri, Some(token), body.clone())
                .await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        }
    }

    let admin = harness.token(ADMIN);
    for (method, uri, body) in calls {
        let (status, _) = harness.call(method.clone(), &uri, Some(&admin), body).await;
        assert_eq!(status, StatusCode::OK, "{} {}", method, uri);
    }

    let (status, _) = harness.call(Method::GET, &product_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn identity_without_user_record_fails_role_check_closed() {
    let harness = Harness::new().await;
    let ghost = harness.token("ghost@x.com");

    let (status, body) = harness
        .call(Method::GET, "/all-orders", Some(&ghost), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!(403));
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn login_then_admin_check_scenario() {
    let harness = Harness::new().await;

    let (status, body) = harness
        .call(Method::PUT, "/user/carol@x.com", None, Some(json!({"role": "user"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["acknowledged"], json!(true));

    let token = body["token"].as_str().unwrap().to_string();
    let claims = harness.state.tokens.verify(&token).unwrap();
    assert_eq!(claims.email, "carol@x.com");

    let (status, body) = harness
        .call(Method::GET, "/admin/carol@x.com", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"admin": false}));
}

#[tokio::test]
async fn existing_user_login_returns_token_for_that_user() {
    let harness = Harness::new().await;

    let (status, body) = harness
        .call(Method::PUT, "/user/alice@x.com", None, Some(json!({"name": "Alice"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["matchedCount"], json!(1));

    let token = body["token"].as_str().unwrap();
    assert_eq!(harness.state.tokens.verify(token).unwrap().email, ALICE);
}

#[tokio::test]
async fn upsert_user_with_someone_elses_credential_is_403() {
    let harness = Harness::new().await;
    let bob = harness.token(BOB);

    let (status, _) = harness
        .call(Method::PUT, "/user/alice@x.com", Some(&bob), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn self_service_writes_cannot_grant_admin() {
    let harness = Harness::new().await;

    let (status, body) = harness
        .call(Method::PUT, "/user/mallory@x.com", None, Some(json!({"role": "admin"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let mallory = body["token"].as_str().unwrap().to_string();

    let (status, _) = harness
        .call(Method::PATCH, "/user/mallory@x.com", None, Some(json!({"role": "admin", "name": "M"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = harness
        .call(Method::GET, "/admin/mallory@x.com", Some(&mallory), None)
        .await;
    assert_eq!(body, json!({"admin": false}));

    let (status, _) = harness
        .call(Method::GET, "/all-orders", Some(&mallory), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, user) = harness.call(Method::GET, "/user/mallory@x.com", None, None).await;
    assert_eq!(user["name"], json!("M"));
    assert!(user.get("role").is_none());
}

#[tokio::test]
async fn promotion_grants_admin() {
    let harness = Harness::new().await;
    let admin = harness.token(ADMIN);
    let bob = harness.token(BOB);

    let (status, body) = harness
        .call(Method::PUT, "/user/admin/bob@x.com", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], json!(1));

    let (_, body) = harness
        .call(Method::GET, "/admin/bob@x.com", Some(&bob), None)
        .await;
    assert_eq!(body, json!({"admin": true}));

    let (status, _) = harness.call(Method::GET, "/all-orders", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn user_listing_filters_on_allowed_fields_only() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);

    let (status, body) = harness
        .call(Method::GET, "/user?role=admin", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], json!(ADMIN));

    // Unlisted fields are ignored rather than matched
    let (_, body) = harness
        .call(Method::GET, "/user?_id=nope", Some(&alice), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn wrench_creation_scenario() {
    let harness = Harness::new().await;
    let product = Some(json!({"name": "Wrench"}));

    let (status, _) = harness
        .call(Method::POST, "/product", None, product.clone())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = harness.token(ALICE);
    let (status, _) = harness
        .call(Method::POST, "/product", Some(&alice), product.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = harness.token(ADMIN);
    let (status, body) = harness
        .call(Method::POST, "/product", Some(&admin), product)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledged"], json!(true));
    let id = body["insertedId"].as_str().unwrap();

    let (status, body) = harness
        .call(Method::GET, &format!("/product/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Wrench"));
    assert_eq!(body["_id"], json!(id));
}

#[tokio::test]
async fn product_listing_filters_by_category() {
    let harness = Harness::new().await;
    let admin = harness.token(ADMIN);
    for (name, category) in [("Wrench", "hand"), ("Drill", "power"), ("Pliers", "hand")] {
        harness
            .call(
                Method::POST,
                "/product",
                Some(&admin),
                Some(json!({"name": name, "category": category})),
            )
            .await;
    }

    let (_, body) = harness.call(Method::GET, "/product?category=hand", None, None).await;
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Wrench", "Pliers"]);

    let (_, body) = harness.call(Method::GET, "/product", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn lookup_misses_are_404() {
    let harness = Harness::new().await;

    for uri in ["/product/missing", "/order/missing", "/user/nobody@x.com"] {
        let (status, body) = harness.call(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["code"], json!(404));
    }
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn reviews_are_listed_newest_first() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);

    for n in 1..=4 {
        let (status, _) = harness
            .call(
                Method::POST,
                "/review",
                Some(&alice),
                Some(json!({"rating": n, "text": format!("review {}", n)})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = harness.call(Method::GET, "/review", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ratings: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rating"].as_i64().unwrap())
        .collect();
    assert_eq!(ratings, vec![4, 3, 2, 1]);
    assert_eq!(body[0]["email"], json!(ALICE));
}

#[tokio::test]
async fn review_for_another_email_is_403() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);

    let (status, _) = harness
        .call(
            Method::POST,
            "/review",
            Some(&alice),
            Some(json!({"text": "great", "email": BOB})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = harness.call(Method::GET, "/review", None, None).await;
    assert_eq!(body, json!([]));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn order_creation_is_idempotent_per_product_date_email() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);
    let order = json!({"product": "p1", "date": "2024-06-01", "quantity": 2});

    let (status, first) = harness
        .call(Method::POST, "/order", Some(&alice), Some(order.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], json!(true));
    let id = first["result"]["insertedId"].as_str().unwrap().to_string();

    let (status, second) = harness
        .call(Method::POST, "/order", Some(&alice), Some(order))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["success"], json!(false));
    assert_eq!(second["appointment"]["_id"], json!(id));
    assert_eq!(second["appointment"]["email"], json!(ALICE));

    // A different date is a different booking
    let (_, third) = harness
        .call(
            Method::POST,
            "/order",
            Some(&alice),
            Some(json!({"product": "p1", "date": "2024-06-02"})),
        )
        .await;
    assert_eq!(third["success"], json!(true));

    let admin = harness.token(ADMIN);
    let (_, all) = harness.call(Method::GET, "/all-orders", Some(&admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn order_for_another_email_is_403() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);

    let (status, _) = harness
        .call(
            Method::POST,
            "/order",
            Some(&alice),
            Some(json!({"product": "p1", "date": "2024-06-01", "email": BOB})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_listing_is_scoped_to_the_caller() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);
    let bob = harness.token(BOB);

    for (token, product) in [(&alice, "p1"), (&alice, "p2"), (&bob, "p3")] {
        harness
            .call(
                Method::POST,
                "/order",
                Some(token),
                Some(json!({"product": product, "date": "2024-06-01"})),
            )
            .await;
    }

    let (status, body) = harness
        .call(Method::GET, "/order?email=alice@x.com", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = harness
        .call(Method::GET, "/order?email=bob@x.com", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = harness.call(Method::GET, "/order", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_deletion_requires_ownership() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);
    let bob = harness.token(BOB);

    let (_, created) = harness
        .call(
            Method::POST,
            "/order",
            Some(&alice),
            Some(json!({"product": "p1", "date": "2024-06-01"})),
        )
        .await;
    let uri = format!("/order/{}", created["result"]["insertedId"].as_str().unwrap());

    let (status, _) = harness.call(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = harness.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"], json!("p1"));

    let (status, body) = harness.call(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], json!(1));

    let (status, _) = harness.call(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn payment_intent_returns_client_secret() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);

    let (status, body) = harness
        .call(
            Method::POST,
            "/create-payment-intent",
            Some(&alice),
            Some(json!({"price": 12.5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"clientSecret": "pi_stub_secret_1250_usd"}));

    let (status, body) = harness
        .call(
            Method::POST,
            "/create-payment-intent",
            Some(&alice),
            Some(json!({"price": 3, "currency": "EUR"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientSecret"], json!("pi_stub_secret_300_eur"));
}

#[tokio::test]
async fn payment_intent_rejects_bad_input() {
    let harness = Harness::new().await;
    let alice = harness.token(ALICE);

    let requests = [
        json!({"price": -1}),
        json!({"price": 0}),
        json!({"price": 0.004}),
        json!({"price": 1e300}),
        json!({"price": 5, "currency": "jpy"}),
        json!({"price": "ten"}),
        json!({"currency": "usd"}),
    ];
    for request in requests {
        let (status, body) = harness
            .call(Method::POST, "/create-payment-intent", Some(&alice), Some(request.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", request);
        assert_eq!(body["code"], json!(400), "{}", request);
        assert_eq!(body["retryable"], json!(false));
    }
}

#[tokio::test]
async fn processor_failure_is_502() {
    let harness = Harness::declining().await;
    let alice = harness.token(ALICE);

    let (status, body) = harness
        .call(
            Method::POST,
            "/create-payment-intent",
            Some(&alice),
            Some(json!({"price": 10})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], json!(502));
}

// =============================================================================
// Service
// =============================================================================

#[tokio::test]
async fn welcome_and_health() {
    let harness = Harness::new().await;

    let (status, body) = harness.call(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Welcome to Hexa Tools Server!"));

    let (status, body) = harness.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["store"], json!("memory"));
    assert_eq!(body["payments"], json!("stub"));
}

#[tokio::test(start_paused = true)]
async fn stalled_store_times_out_as_retryable_503() {
    let harness = Harness::build(Arc::new(StalledStore), false);

    let (status, body) = harness.call(Method::GET, "/product", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], json!(true));
}
