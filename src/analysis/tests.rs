//! Unit tests for analysis module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::sentiment::classifier::MockTextClassifier;
    use crate::sentiment::{ClassifierVerdict, Lexicon, ModelAccuracy, SentimentModels};
    use crate::storage::{Database, MockTimeSeriesStore};
    use crate::types::{SentimentSummary, TimeSeriesPoint};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn evaluator(verdict: Option<ClassifierVerdict>) -> ModelEvaluator {
        let mut mock = MockTextClassifier::new();
        mock.expect_classify().returning(move |_| {
            verdict.ok_or_else(|| TrackerError::ExternalService("connection refused".into()))
        });
        ModelEvaluator::new(SentimentModels::new(Arc::new(Lexicon::crypto().unwrap()), Arc::new(mock)))
    }

    fn point(coin: &str, minutes_ago: i64, score: f64, price: Decimal) -> TimeSeriesPoint {
        TimeSeriesPoint {
            coin: coin.to_string(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            price,
            sentiment: SentimentSummary { score, count: 3 },
            source_posts: vec![],
        }
    }

    /// `n` bitcoin points, oldest first, where price rises with sentiment
    async fn seeded_store(n: i64) -> Arc<Database> {
        let db = Arc::new(Database::in_memory().await.unwrap());
        for i in 0..n {
            let score = -0.5 + i as f64 * 0.1;
            let price = dec!(5000000) + Decimal::from(i * 1000);
            db.insert(&point("bitcoin", (n - i) * 15, score, price))
                .await
                .unwrap();
        }
        db
    }

    fn service(store: Arc<dyn TimeSeriesStore>, verdict: Option<ClassifierVerdict>) -> AnalysisService {
        AnalysisService::new(store, evaluator(verdict))
    }

    #[tokio::test]
    async fn test_correlation_report_requires_ten_points() {
        let analysis = service(seeded_store(9).await, None);

        let err = analysis.correlation_report("bitcoin", 24.0).await.unwrap_err();
        match err {
            TrackerError::InsufficientData {
                required,
                available,
            } => {
                assert_eq!(required, 10);
                assert_eq!(available, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_correlation_report_with_ten_points() {
        let analysis = service(seeded_store(10).await, None);

        let report = analysis.correlation_report("bitcoin", 24.0).await.unwrap();
        assert_eq!(report.coin, "bitcoin");
        assert_eq!(report.time_range, 24.0);
        assert_eq!(report.data_points, 10);
        assert!((report.correlation - 1.0).abs() < 1e-9);
        assert_eq!(report.interpretation, CorrelationStrength::Strong);

        assert!((report.sentiment_stats.min - -0.5).abs() < 1e-9);
        assert!((report.sentiment_stats.max - 0.4).abs() < 1e-9);
        assert_eq!(report.price_stats.min, 5000000.0);
        assert_eq!(report.price_stats.max, 5009000.0);
    }

    #[tokio::test]
    async fn test_correlation_report_ignores_other_coins_and_old_points() {
        let db = seeded_store(10).await;
        db.insert(&point("bitcoin", 60 * 48, 0.9, dec!(1))).await.unwrap();
        db.insert(&point("ethereum", 5, 0.9, dec!(1))).await.unwrap();

        let analysis = service(db, None);
        let report = analysis.correlation_report("bitcoin", 24.0).await.unwrap();
        assert_eq!(report.data_points, 10);

        let err = analysis.correlation_report("ethereum", 24.0).await.unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InsufficientData { available: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_correlation_report_rejects_bad_window() {
        let analysis = service(Arc::new(MockTimeSeriesStore::new()), None);

        for hours in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = analysis.correlation_report("bitcoin", hours).await.unwrap_err();
            assert!(matches!(err, TrackerError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_correlation_report_store_failure() {
        let mut store = MockTimeSeriesStore::new();
        store
            .expect_query_range()
            .returning(|_, _| Err(TrackerError::Internal("database is locked".into())));

        let analysis = service(Arc::new(store), None);
        let err = analysis.correlation_report("bitcoin", 24.0).await.unwrap_err();
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_performance_report_skips_correlation_below_eleven_points() {
        let analysis = service(seeded_store(10).await, None);

        let report = analysis.model_performance_report().await.unwrap();
        assert!(report.correlation_analysis.is_none());
        assert_eq!(report.model_comparison.baseline, ModelAccuracy::from_counts(2, 5));
        // Classifier down: hybrid equals baseline, nothing to recommend
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_performance_report_with_correlation() {
        let analysis = service(seeded_store(12).await, Some(ClassifierVerdict::Positive));

        let report = analysis.model_performance_report().await.unwrap();
        let correlation = report.correlation_analysis.as_ref().unwrap();
        assert_eq!(correlation.data_points, 12);
        // Recent points come newest first, ordering does not change the coefficient
        assert!((correlation.correlation - 1.0).abs() < 1e-9);
        assert_eq!(correlation.interpretation, CorrelationStrength::Strong);

        assert_eq!(report.model_comparison.hybrid.accuracy, 0.6);
        assert_eq!(
            report.recommendations,
            vec![HYBRID_IMPROVES.to_string(), STRONG_CORRELATION.to_string()]
        );
    }

    #[tokio::test]
    async fn test_performance_report_limits_recent_points() {
        let mut store = MockTimeSeriesStore::new();
        store
            .expect_query_recent()
            .withf(|limit| *limit == PERFORMANCE_SAMPLE_LIMIT)
            .times(1)
            .returning(|_| Ok(vec![]));

        let analysis = service(Arc::new(store), None);
        let report = analysis.model_performance_report().await.unwrap();
        assert!(report.correlation_analysis.is_none());
    }

    #[test]
    fn test_recommendations() {
        let weak = EvaluationReport {
            baseline: ModelAccuracy::from_counts(2, 5),
            external: ModelAccuracy::from_counts(2, 5),
            hybrid: ModelAccuracy::from_counts(2, 5),
        };
        let better = EvaluationReport {
            hybrid: ModelAccuracy::from_counts(4, 5),
            ..weak
        };
        let analysis = |correlation: f64| CorrelationAnalysis {
            correlation,
            data_points: 20,
            interpretation: CorrelationStrength::from_coefficient(correlation),
        };

        assert!(recommendations(&weak, None).is_empty());
        assert_eq!(recommendations(&better, None), vec![HYBRID_IMPROVES]);
        assert!(recommendations(&weak, Some(&analysis(0.2))).is_empty());
        assert_eq!(
            recommendations(&weak, Some(&analysis(0.25))),
            vec![STRONG_CORRELATION]
        );
        assert!(recommendations(&weak, Some(&analysis(-0.8))).is_empty());
    }

    #[tokio::test]
    async fn test_timeseries_is_smoothed_and_ascending() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        for (minutes_ago, score) in [(40, 0.0), (30, 0.6), (20, -0.6), (10, 1.0)] {
            db.insert(&point("dogecoin", minutes_ago, score, dec!(12.5)))
                .await
                .unwrap();
        }

        let analysis = service(db, None);
        let series = analysis.timeseries("dogecoin", 24.0).await.unwrap();
        assert_eq!(series.coin, "dogecoin");

        let smoothed: Vec<f64> = series.data.iter().map(|p| p.sentiment.smoothed_score).collect();
        let expected = [0.0, 0.3, 0.0, 1.0 / 3.0];
        assert_eq!(smoothed.len(), expected.len());
        for (got, want) in smoothed.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9);
        }

        let json = serde_json::to_value(&series.data[1]).unwrap();
        assert_eq!(json["coin"], "dogecoin");
        assert_eq!(json["sentiment"]["score"], 0.6);
        assert!((json["sentiment"]["smoothedScore"].as_f64().unwrap() - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_timeseries_empty_window() {
        let analysis = service(Arc::new(Database::in_memory().await.unwrap()), None);
        let series = analysis.timeseries("bitcoin", 1.0).await.unwrap();
        assert!(series.data.is_empty());
    }
}
