//! Router tests

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::analysis::AnalysisService;
    use crate::sentiment::classifier::MockTextClassifier;
    use crate::sentiment::{ClassifierVerdict, Lexicon, ModelEvaluator};
    use crate::storage::{Database, MockTimeSeriesStore, TimeSeriesStore};
    use crate::types::{SentimentSummary, TimeSeriesPoint};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use serde_json::Value;
    use tower::ServiceExt;

    fn models() -> SentimentModels {
        let mut mock = MockTextClassifier::new();
        mock.expect_classify()
            .returning(|_| Ok(ClassifierVerdict::Negative));
        SentimentModels::new(Arc::new(Lexicon::crypto().unwrap()), Arc::new(mock))
    }

    fn app(store: Arc<dyn TimeSeriesStore>) -> Router {
        let models = models();
        let analysis = AnalysisService::new(store, ModelEvaluator::new(models.clone()));
        router(Arc::new(AppState::new(analysis, models)))
    }

    async fn seeded(n: i64) -> Arc<Database> {
        let db = Arc::new(Database::in_memory().await.unwrap());
        for i in 0..n {
            db.insert(&TimeSeriesPoint {
                coin: "bitcoin".to_string(),
                timestamp: Utc::now() - Duration::minutes((n - i) * 15),
                price: Decimal::from(5_000_000 + i * 500),
                sentiment: SentimentSummary {
                    score: if i % 2 == 0 { 0.2 } else { -0.1 },
                    count: 5,
                },
                source_posts: vec![],
            })
            .await
            .unwrap();
        }
        db
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(seeded(0).await), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_evaluate_text() {
        let (status, body) = send(
            app(seeded(0).await),
            post_json("/api/ml/evaluate", r#"{"text": "buy the dip, great profit"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "buy the dip, great profit");
        // "buy", "great" and "profit" match; "dip," keeps its comma and does not
        let baseline = body["baseline"].as_f64().unwrap();
        assert!((baseline - 0.6).abs() < 1e-9);
        assert_eq!(body["ml"].as_f64().unwrap(), -1.0);
        let hybrid = body["hybrid"].as_f64().unwrap();
        assert!((hybrid - (0.7 * -1.0 + 0.3 * 0.6)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_evaluate_requires_text() {
        for payload in [r#"{}"#, r#"{"text": ""}"#, r#"{"text": null}"#, "not json"] {
            let (status, body) =
                send(app(seeded(0).await), post_json("/api/ml/evaluate", payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_evaluate_whitespace_text_is_scored() {
        let (status, body) = send(
            app(seeded(0).await),
            post_json("/api/ml/evaluate", r#"{"text": "   "}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "   ");
        assert_eq!(body["baseline"].as_f64().unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_correlation_insufficient_data_is_bad_request() {
        let (status, body) = send(
            app(seeded(5).await),
            get("/api/ml/correlation?coin=bitcoin&hours=24"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Insufficient data"));
    }

    #[tokio::test]
    async fn test_correlation_defaults() {
        let (status, body) = send(app(seeded(12).await), get("/api/ml/correlation")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coin"], "bitcoin");
        assert_eq!(body["timeRange"].as_f64().unwrap(), 24.0);
        assert_eq!(body["dataPoints"], 12);
        assert!(body["interpretation"].as_str().unwrap().ends_with("correlation"));
        assert!(body["sentimentStats"]["mean"].is_number());
        assert!(body["priceStats"]["max"].is_number());
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let mut store = MockTimeSeriesStore::new();
        store
            .expect_query_range()
            .returning(|_, _| Err(TrackerError::Internal("no such table: coin_data".into())));

        let (status, body) = send(app(Arc::new(store)), get("/api/ml/correlation")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Details stay in the logs
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_performance_report() {
        let (status, body) = send(app(seeded(11).await), get("/api/ml/performance")).await;

        assert_eq!(status, StatusCode::OK);
        let comparison = &body["modelComparison"];
        assert_eq!(comparison["baseline"]["total"], 5);
        assert!(comparison["ml"]["accuracy"].is_number());
        assert_eq!(body["correlationAnalysis"]["dataPoints"], 11);
        assert!(body["recommendations"].is_array());
    }

    #[tokio::test]
    async fn test_coin_timeseries() {
        let (status, body) = send(
            app(seeded(4).await),
            get("/api/coins/bitcoin/timeseries?hours=12"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coin"], "bitcoin");
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        assert!(data[0]["sentiment"]["smoothedScore"].is_number());
        assert!(data[0].get("smoothedScore").is_none());
        assert!(data[0]["topPosts"].is_array());
    }

    #[tokio::test]
    async fn test_timeseries_rejects_bad_hours() {
        let (status, _) = send(
            app(seeded(0).await),
            get("/api/coins/bitcoin/timeseries?hours=-1"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
