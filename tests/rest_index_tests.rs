//! End-to-end tests of the REST exposure
//!
//! Uses axum-test's TestServer against a router built by `ServerBuilder`
//! over seeded in-memory stores.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use storefront::prelude::*;
use storefront::server::{TOTAL_COUNT_HEADER, TOTAL_PAGES_HEADER};

fn product(name: &str, price: f64, status: ProductStatus) -> Product {
    Product::new(
        name.to_string(),
        format!("About {}", name),
        price,
        status,
        false,
        Uuid::new_v4(),
    )
}

/// 23 numbered products plus a users store with two accounts
fn create_test_server() -> (TestServer, InMemoryStore<Product>) {
    let products = InMemoryStore::with_records((1..=23).map(|i| {
        product(
            &format!("Product {:02}", i),
            i as f64,
            ProductStatus::Available,
        )
    }));
    let users = InMemoryStore::with_records(vec![
        User::new("Ada".to_string(), "ada@test".to_string(), Profile::Admin),
        User::new("Carl".to_string(), "carl@test".to_string(), Profile::Client),
    ]);

    let app = ServerBuilder::new()
        .register("products", products.clone())
        .expect("Failed to register products")
        .register("users", users)
        .expect("Failed to register users")
        .build()
        .expect("Failed to build app");

    let server = TestServer::try_new(app).expect("Failed to create test server");
    (server, products)
}

fn record_names(body: &Value, plural: &str) -> Vec<String> {
    body[plural]
        .as_array()
        .expect("records array")
        .iter()
        .map(|r| r["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _) = create_test_server();

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["entities"], serde_json::json!(["product", "user"]));
    }

    #[tokio::test]
    async fn test_healthz_endpoint() {
        let (server, _) = create_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
    }
}

// =============================================================================
// Index Tests
// =============================================================================

mod index_tests {
    use super::*;

    #[tokio::test]
    async fn test_index_defaults() {
        let (server, _) = create_test_server();

        let response = server.get("/products").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["products"].as_array().unwrap().len(), 10);
        assert_eq!(body["meta"]["current_page"], 1);
        assert_eq!(body["meta"]["next_page"], 2);
        assert_eq!(body["meta"]["prev_page"], Value::Null);
        assert_eq!(body["meta"]["total_pages"], 3);
        assert_eq!(body["meta"]["total_count"], 23);
        assert_eq!(body["meta"]["length"], 10);
    }

    #[tokio::test]
    async fn test_index_headers() {
        let (server, _) = create_test_server();

        let response = server.get("/products").add_query_param("length", 5).await;
        response.assert_status_ok();

        assert_eq!(response.header(TOTAL_COUNT_HEADER), "23");
        assert_eq!(response.header(TOTAL_PAGES_HEADER), "5");
    }

    #[tokio::test]
    async fn test_index_second_page() {
        let (server, _) = create_test_server();

        let response = server
            .get("/products")
            .add_query_param("page", 2)
            .add_query_param("length", 10)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let expected: Vec<String> = (11..=20).map(|i| format!("Product {:02}", i)).collect();
        assert_eq!(record_names(&body, "products"), expected);
        assert_eq!(body["meta"]["prev_page"], 1);
        assert_eq!(body["meta"]["next_page"], 3);
    }

    #[tokio::test]
    async fn test_index_search_and_order() {
        let (server, _) = create_test_server();

        let response = server
            .get("/products")
            .add_query_param("search[name]", "product 1")
            .add_query_param("order[price]", "desc")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let expected: Vec<String> = (10..=19)
            .rev()
            .map(|i| format!("Product {:02}", i))
            .collect();
        assert_eq!(record_names(&body, "products"), expected);
        assert_eq!(body["meta"]["total_count"], 10);
    }

    #[tokio::test]
    async fn test_index_ignores_unlisted_attributes() {
        let (server, _) = create_test_server();

        // description is not searchable for products
        let response = server
            .get("/products")
            .add_query_param("search[description]", "nothing matches this")
            .add_query_param("order[description]", "desc")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["meta"]["total_count"], 23);
        assert_eq!(body["products"][0]["name"], "Product 01");
    }

    #[tokio::test]
    async fn test_index_unknown_direction_is_ascending() {
        let (server, _) = create_test_server();

        let response = server
            .get("/users")
            .add_query_param("order[name]", "sideways")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(record_names(&body, "users"), vec!["Ada", "Carl"]);
    }

    #[tokio::test]
    async fn test_index_non_numeric_pagination_uses_defaults() {
        let (server, _) = create_test_server();

        let response = server
            .get("/products")
            .add_query_param("page", "abc")
            .add_query_param("length", "")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["meta"]["current_page"], 1);
        assert_eq!(body["meta"]["length"], 10);
    }

    #[tokio::test]
    async fn test_index_length_is_clamped() {
        let (server, _) = create_test_server();

        let response = server
            .get("/products")
            .add_query_param("length", 100_000)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["meta"]["length"], 100);
        assert_eq!(body["products"].as_array().unwrap().len(), 23);
    }

    #[tokio::test]
    async fn test_index_negative_length_is_rejected() {
        let (server, _) = create_test_server();

        let response = server
            .get("/products")
            .add_query_param("length", -10)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_PARAMETER");
        assert_eq!(body["details"]["parameter"], "length");
    }

    #[tokio::test]
    async fn test_index_sees_new_records() {
        let (server, products) = create_test_server();

        products
            .insert(product("Late Arrival", 1.0, ProductStatus::Unavailable))
            .unwrap();

        let response = server
            .get("/products")
            .add_query_param("search[name]", "late")
            .await;
        let body: Value = response.json();
        assert_eq!(body["meta"]["total_count"], 1);
        assert_eq!(body["products"][0]["status"], "unavailable");
    }
}

// =============================================================================
// Show Tests
// =============================================================================

mod show_tests {
    use super::*;

    #[tokio::test]
    async fn test_show_existing_record() {
        let (server, products) = create_test_server();
        let first = products.list().unwrap().remove(0);

        let response = server.get(&format!("/products/{}", first.id)).await;
        response.assert_status_ok();

        let body: Value = response.json();
        let shown: Product = serde_json::from_value(body["product"].clone()).unwrap();
        assert_eq!(shown, first);
    }

    #[tokio::test]
    async fn test_show_missing_record() {
        let (server, _) = create_test_server();

        let response = server.get(&format!("/products/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["code"], "ENTITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_show_malformed_id() {
        let (server, _) = create_test_server();

        let response = server.get("/products/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_unregistered_entity_is_not_routed() {
        let (server, _) = create_test_server();

        let response = server.get("/coupons").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Write Tests
// =============================================================================

mod write_tests {
    use super::*;
    use serde_json::json;

    struct WriteFixture {
        server: TestServer,
        coupons: InMemoryStore<Coupon>,
        requirements: InMemoryStore<SystemRequirement>,
        /// Referenced by one game
        used: SystemRequirement,
        /// Referenced by no game
        unused: SystemRequirement,
    }

    fn requirement(name: &str) -> SystemRequirement {
        SystemRequirement::new(
            name.to_string(),
            "Windows 10".to_string(),
            "50GB".to_string(),
            "Intel i5".to_string(),
            "8GB".to_string(),
            "GTX 1050".to_string(),
        )
    }

    fn create_write_server() -> WriteFixture {
        let coupons = InMemoryStore::with_records(vec![Coupon::new(
            "Black Friday".to_string(),
            "BF2024".to_string(),
            CouponStatus::Active,
            25.0,
            100,
            Utc::now(),
        )]);
        let used = requirement("Basic");
        let unused = requirement("Ultra");
        let requirements = InMemoryStore::with_records(vec![used.clone(), unused.clone()]);
        let games = InMemoryStore::with_records(vec![Game::new(
            GameMode::Both,
            "Blizzard".to_string(),
            Utc::now(),
            used.id,
        )]);

        let app = ServerBuilder::new()
            .register("coupons", coupons.clone())
            .expect("Failed to register coupons")
            .restrict_delete(
                "system_requirements",
                ForeignKey::new("games", "system_requirement_id", games.clone()),
            )
            .expect("Failed to restrict system requirement deletes")
            .register("system_requirements", requirements.clone())
            .expect("Failed to register system requirements")
            .register("games", games)
            .expect("Failed to register games")
            .build()
            .expect("Failed to build app");

        WriteFixture {
            server: TestServer::try_new(app).expect("Failed to create test server"),
            coupons,
            requirements,
            used,
            unused,
        }
    }

    fn coupon_body() -> Value {
        json!({
            "coupon": {
                "name": "Cyber Monday",
                "code": "CM2024",
                "status": "inactive",
                "discount_value": 15.5,
                "max_use": 20,
                "due_date": "2030-12-02T00:00:00Z"
            }
        })
    }

    fn first_coupon(fixture: &WriteFixture) -> Coupon {
        fixture.coupons.list().unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_create_returns_stored_record() {
        let fixture = create_write_server();

        let response = fixture.server.post("/coupons").json(&coupon_body()).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["coupon"]["code"], "CM2024");
        assert_eq!(body["coupon"]["status"], "inactive");

        let id: Uuid = serde_json::from_value(body["coupon"]["id"].clone()).unwrap();
        let stored = fixture.coupons.get(&id).unwrap().expect("stored coupon");
        assert_eq!(stored.name, "Cyber Monday");
        assert_eq!(fixture.coupons.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_with_null_name_is_unprocessable() {
        let fixture = create_write_server();
        let mut body = coupon_body();
        body["coupon"]["name"] = Value::Null;

        let response = fixture.server.post("/coupons").json(&body).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["fields"]["name"], json!(["can't be blank"]));
        assert_eq!(fixture.coupons.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_without_root_key_is_bad_request() {
        let fixture = create_write_server();

        let response = fixture
            .server
            .post("/coupons")
            .json(&coupon_body()["coupon"])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert_eq!(fixture.coupons.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_patch_updates_given_attributes() {
        let fixture = create_write_server();
        let coupon = first_coupon(&fixture);

        let response = fixture
            .server
            .patch(&format!("/coupons/{}", coupon.id))
            .json(&json!({ "coupon": { "name": "Singles Day" } }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["coupon"]["name"], "Singles Day");
        assert_eq!(body["coupon"]["code"], "BF2024");

        let stored = fixture.coupons.get(&coupon.id).unwrap().unwrap();
        assert_eq!(stored.name, "Singles Day");
        assert_eq!(stored.created_at, coupon.created_at);
    }

    #[tokio::test]
    async fn test_patch_with_blank_name_keeps_record() {
        let fixture = create_write_server();
        let coupon = first_coupon(&fixture);

        let response = fixture
            .server
            .patch(&format!("/coupons/{}", coupon.id))
            .json(&json!({ "coupon": { "name": "" } }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert!(body["errors"]["fields"]["name"].is_array());
        assert_eq!(fixture.coupons.get(&coupon.id).unwrap(), Some(coupon));
    }

    #[tokio::test]
    async fn test_patch_unknown_record() {
        let fixture = create_write_server();

        let response = fixture
            .server
            .patch(&format!("/coupons/{}", Uuid::new_v4()))
            .json(&json!({ "coupon": { "name": "Nobody" } }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_returns_no_content() {
        let fixture = create_write_server();
        let coupon = first_coupon(&fixture);

        let response = fixture
            .server
            .delete(&format!("/coupons/{}", coupon.id))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        assert!(response.text().is_empty());
        assert!(fixture.coupons.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_requirement() {
        let fixture = create_write_server();

        let response = fixture
            .server
            .delete(&format!("/system_requirements/{}", fixture.unused.id))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        assert_eq!(fixture.requirements.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_referenced_requirement_is_refused() {
        let fixture = create_write_server();

        let response = fixture
            .server
            .delete(&format!("/system_requirements/{}", fixture.used.id))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        let base = body["errors"]["fields"]["base"][0].as_str().unwrap();
        assert!(base.contains("games"));
        assert!(fixture.requirements.get(&fixture.used.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unknown_record() {
        let fixture = create_write_server();

        let response = fixture
            .server
            .delete(&format!("/coupons/{}", Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        assert_eq!(fixture.coupons.len().unwrap(), 1);
    }
}
