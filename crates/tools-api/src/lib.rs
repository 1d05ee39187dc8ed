//! # tools-api
//!
//! HTTP API layer for the Hexa Tools storefront.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Bearer token issue/verify and the identity/admin gate extractors
//! - REST endpoints over users, products, reviews and orders
//! - Payment intent creation
//!
//! ## Endpoints
//!
//! | Method | Path | Guard | Description |
//! |--------|------|-------|-------------|
//! | GET | `/` | none | Welcome text |
//! | GET | `/health` | none | Health check |
//! | PUT | `/user/{email}` | optional identity | Upsert user, issue token |
//! | GET | `/user` | identity | List users |
//! | GET | `/user/{email}` | none | Get user |
//! | PATCH | `/user/{email}` | none | Update user |
//! | PUT | `/user/admin/{email}` | admin | Promote to admin |
//! | GET | `/admin/{email}` | identity | Is the user an admin |
//! | GET | `/product` | none | List products |
//! | GET | `/product/{id}` | none | Get product |
//! | POST | `/product` | admin | Create product |
//! | PATCH | `/product/{id}` | admin | Update product |
//! | DELETE | `/product/{id}` | admin | Delete product |
//! | POST | `/review` | identity | Create review |
//! | GET | `/review` | none | List reviews, newest first |
//! | POST | `/order` | identity | Book order unless already booked |
//! | GET | `/order` | identity | Caller's orders |
//! | GET | `/order/{id}` | none | Get order |
//! | DELETE | `/order/{id}` | identity | Delete own order |
//! | GET | `/all-orders` | admin | List all orders |
//! | POST | `/create-payment-intent` | identity | Stripe client secret |

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod token;

pub use auth::{Admin, Identity};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::{AppJson, AppQuery};
pub use routes::create_router;
pub use state::{AppConfig, AppState, StoreBackend};
pub use token::{Claims, TokenConfig, TokenError, TokenService};
