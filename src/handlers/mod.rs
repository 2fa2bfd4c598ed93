pub mod checkout;
pub mod payments;
pub mod sales;
pub mod status;
pub mod webhooks;

use utoipa::OpenApi;

use crate::config::{ConfigReport, CredentialMode};

#[derive(OpenApi)]
#[openapi(
    paths(
        checkout::create_preference,
        webhooks::receive_payment_notification,
        payments::get_payment,
        sales::get_sale,
        status::config_status,
    ),
    components(schemas(
        checkout::CartLineRequest,
        checkout::UserRequest,
        checkout::ShippingDetailsRequest,
        checkout::CreatePreferenceRequest,
        checkout::CreatePreferenceResponse,
        webhooks::WebhookResponse,
        sales::SaleResponse,
        sales::SaleLineResponse,
        ConfigReport,
        CredentialMode,
    )),
    tags(
        (name = "checkout", description = "Checkout intents"),
        (name = "webhooks", description = "Payment provider notifications"),
        (name = "payments", description = "Payment lookups"),
        (name = "sales", description = "Recorded sales"),
        (name = "operations", description = "Service diagnostics"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::application::checkout_service::tests::{InMemoryCatalog, RecordingGateway};
    use crate::application::checkout_service::CheckoutService;
    use crate::application::fulfillment_service::tests::{
        cart_line, payment, store_with_cart, InMemorySales,
    };
    use crate::application::fulfillment_service::FulfillmentService;
    use crate::domain::checkout::CheckoutSettings;
    use crate::domain::ports::PaymentGateway;
    use crate::{configure, json_config};

    struct Harness {
        gateway: Arc<RecordingGateway>,
        store: Arc<InMemorySales>,
    }

    impl Harness {
        fn new(gateway: RecordingGateway) -> Self {
            Self {
                gateway: Arc::new(gateway),
                store: Arc::new(store_with_cart(42, vec![cart_line(7, 3, 100)])),
            }
        }

        fn app(
            &self,
        ) -> App<
            impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
        > {
            let gateway: Arc<dyn PaymentGateway> = self.gateway.clone();
            let checkout = CheckoutService::new(
                Arc::new(InMemoryCatalog::with_prices(&[(7, "100")])),
                gateway.clone(),
                CheckoutSettings {
                    frontend_url: "https://shop.example".to_string(),
                    backend_url: "https://api.shop.example".to_string(),
                    currency: "ARS".to_string(),
                },
            );
            let fulfillment = FulfillmentService::new(self.store.clone(), gateway);
            let report = ConfigReport {
                mode: CredentialMode::Test,
                frontend_url: true,
                backend_url: true,
                access_token: true,
            };
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(checkout))
                .app_data(web::Data::new(fulfillment))
                .app_data(web::Data::new(report))
                .configure(configure)
        }
    }

    fn checkout_body() -> Value {
        json!({
            "cart": [{"productId": 1007, "variantId": 7, "name": "Mug", "price": 100, "quantity": 3}],
            "total": 500,
            "user": {"id": 42, "email": "ana@example.com", "name": "Ana"}
        })
    }

    #[actix_web::test]
    async fn create_preference_returns_201_with_redirect_urls() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let req = test::TestRequest::post()
            .uri("/checkout/preferences")
            .set_json(checkout_body())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["preferenceId"], "pref-1");
        assert_eq!(body["initPoint"], "https://pay.example/init");
        assert!(body["externalReference"]
            .as_str()
            .unwrap()
            .starts_with("order_42_"));
        assert_eq!(harness.gateway.intent_count(), 1);
    }

    #[actix_web::test]
    async fn invalid_checkout_is_rejected_before_the_provider_is_called() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let mut body = checkout_body();
        body["cart"][0]["quantity"] = json!(0);
        let req = test::TestRequest::post()
            .uri("/checkout/preferences")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "cart[0].quantity must be positive");
        assert_eq!(harness.gateway.intent_count(), 0);
    }

    #[actix_web::test]
    async fn unparseable_checkout_json_is_a_400() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let req = test::TestRequest::post()
            .uri("/checkout/preferences")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        assert_eq!(harness.gateway.intent_count(), 0);
    }

    #[actix_web::test]
    async fn line_with_mismatched_product_is_a_400() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let mut body = checkout_body();
        body["cart"][0]["productId"] = json!(5);
        let req = test::TestRequest::post()
            .uri("/checkout/preferences")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "variant 7 does not belong to product 5");
        assert_eq!(harness.gateway.intent_count(), 0);
    }

    #[actix_web::test]
    async fn unknown_variant_is_a_404() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let mut body = checkout_body();
        body["cart"][0]["variantId"] = json!(99);
        let req = test::TestRequest::post()
            .uri("/checkout/preferences")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 404);
        assert_eq!(harness.gateway.intent_count(), 0);
    }

    #[actix_web::test]
    async fn approved_webhook_creates_a_sale_once() {
        let harness = Harness::new(
            RecordingGateway::default()
                .with_payment("123", payment("123", "approved", json!({"user_id": 42}))),
        );
        let app = test::init_service(harness.app()).await;

        let first = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/webhooks/payments")
                .set_json(json!({"type": "payment", "data": {"id": "123"}}))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), 200);
        let first: Value = test::read_body_json(first).await;
        assert_eq!(first["outcome"], "fulfilled");
        assert_eq!(first["processed"], true);
        assert_eq!(first["totalAmount"], "500");
        let sale_id = first["saleId"].as_str().unwrap().to_string();

        // IPN-style redelivery of the same payment.
        let second = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/webhooks/payments?topic=payment&id=123")
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), 200);
        let second: Value = test::read_body_json(second).await;
        assert_eq!(second["outcome"], "already_fulfilled");
        assert_eq!(second["duplicate"], true);
        assert_eq!(second["saleId"], sale_id.as_str());

        assert_eq!(harness.store.sale_count(), 1);
        assert_eq!(harness.store.cart_len(42), 0);

        let sale = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/sales/{sale_id}"))
                .to_request(),
        )
        .await;
        assert_eq!(sale.status(), 200);
        let sale: Value = test::read_body_json(sale).await;
        assert_eq!(sale["paymentId"], "123");
        assert_eq!(sale["shippingCost"], "200");
        assert_eq!(sale["lines"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn non_payment_webhook_is_acknowledged_without_lookup() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/webhooks/payments")
                .set_json(json!({"type": "merchant_order", "data": {"id": "5"}}))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "ignored");
        assert_eq!(body["processed"], false);
        assert_eq!(harness.gateway.fetch_count(), 0);
    }

    #[actix_web::test]
    async fn payment_webhook_without_id_is_a_400() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/webhooks/payments")
                .set_json(json!({"type": "payment", "data": {}}))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 400);
        assert_eq!(harness.gateway.fetch_count(), 0);
    }

    #[actix_web::test]
    async fn failed_verification_returns_500_so_the_provider_retries() {
        let harness = Harness::new(RecordingGateway {
            fail_with: Some("upstream unavailable".to_string()),
            ..Default::default()
        });
        let app = test::init_service(harness.app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/webhooks/payments")
                .set_json(json!({"type": "payment", "data": {"id": "77"}}))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 500);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("77"));
        assert_eq!(harness.store.sale_count(), 0);
    }

    #[actix_web::test]
    async fn payment_unknown_to_the_provider_is_retried_not_settled() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/webhooks/payments")
                .set_json(json!({"type": "payment", "data": {"id": "31337"}}))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 500);
        assert_eq!(harness.gateway.fetch_count(), 1);
        assert_eq!(harness.store.sale_count(), 0);
    }

    #[actix_web::test]
    async fn payment_lookup_proxies_the_provider_record() {
        let harness = Harness::new(
            RecordingGateway::default()
                .with_payment("123", payment("123", "approved", json!({"user_id": 42}))),
        );
        let app = test::init_service(harness.app()).await;

        let found = test::call_service(
            &app,
            test::TestRequest::get().uri("/payments/123").to_request(),
        )
        .await;
        assert_eq!(found.status(), 200);
        let found: Value = test::read_body_json(found).await;
        assert_eq!(found["status"], "approved");

        let missing = test::call_service(
            &app,
            test::TestRequest::get().uri("/payments/404").to_request(),
        )
        .await;
        assert_eq!(missing.status(), 404);
    }

    #[actix_web::test]
    async fn unknown_sale_is_a_404() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/sales/{}", uuid::Uuid::new_v4()))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn config_status_reports_mode_without_secrets() {
        let harness = Harness::new(RecordingGateway::default());
        let app = test::init_service(harness.app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/config/status").to_request(),
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["mode"], "test");
        assert_eq!(body["accessToken"], true);
        assert!(!body.to_string().contains("TEST-"));
    }

    #[actix_web::test]
    async fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/checkout/preferences",
            "/webhooks/payments",
            "/payments/{id}",
            "/sales/{id}",
            "/config/status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
