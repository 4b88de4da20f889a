//! Unit tests for decision providers: keyword heuristic, reply parsing and
//! the model-backed provider's failure handling.

#[cfg(test)]
mod decision_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use crate::config::{AppConfig, ProviderKind};
    use crate::constants;
    use crate::decision::*;
    use crate::error::{DecisionError, SimError};

    struct FixedBackend(&'static str);

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String, DecisionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingBackend(DecisionError);

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String, DecisionError> {
            Err(self.0.clone())
        }
    }

    struct SlowBackend(Duration);

    #[async_trait]
    impl ChatBackend for SlowBackend {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String, DecisionError> {
            tokio::time::sleep(self.0).await;
            Ok("BUY".to_string())
        }
    }

    /// Fails with a transport error until `failures` calls have been made
    struct FlakyBackend {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for FlakyBackend {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String, DecisionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(DecisionError::Transport("connection reset".to_string()))
            } else {
                Ok("SELL".to_string())
            }
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        async fn chat(&self, system: &str, user: &str) -> Result<String, DecisionError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok("HOLD".to_string())
        }
    }

    fn model(backend: impl ChatBackend + 'static) -> ModelDecider {
        ModelDecider::new(Arc::new(backend))
    }

    // ============= KeywordHeuristic Tests =============

    #[test]
    fn test_heuristic_bullish_news() {
        let h = KeywordHeuristic::default();
        assert_eq!(h.decide("Tech sector reports record breaking profits!"), Decision::Buy);
        assert_eq!(h.decide("New trade deal promises economic growth."), Decision::Buy);
    }

    #[test]
    fn test_heuristic_bearish_news() {
        let h = KeywordHeuristic::default();
        assert_eq!(h.decide("Housing market crash predicted by experts."), Decision::Sell);
        assert_eq!(h.decide("Uncertainty looms as inflation hits new highs."), Decision::Sell);
    }

    #[test]
    fn test_heuristic_neutral_news() {
        let h = KeywordHeuristic::default();
        assert_eq!(h.decide("Market remains stable with no major changes."), Decision::Hold);
        assert_eq!(h.decide(""), Decision::Hold);
    }

    #[test]
    fn test_heuristic_is_case_insensitive() {
        let h = KeywordHeuristic::default();
        assert_eq!(h.decide("HOUSING BOOM"), Decision::Buy);
        assert_eq!(h.decide("Debt CRISIS deepens"), Decision::Sell);
    }

    #[test]
    fn test_heuristic_bullish_wins_when_both_match() {
        let h = KeywordHeuristic::default();
        assert_eq!(h.decide("Crisis averted by last-minute deal"), Decision::Buy);
    }

    #[test]
    fn test_heuristic_custom_keywords() {
        let h = KeywordHeuristic::new(["Rally "], ["slump"]);
        assert_eq!(h.decide("Stocks RALLY on jobs data"), Decision::Buy);
        assert_eq!(h.decide("Retail slump continues"), Decision::Sell);
        assert_eq!(h.decide("Record profits"), Decision::Hold);
    }

    // ============= Reply Parsing Tests =============

    #[test]
    fn test_parse_reply_exact_words() {
        assert_eq!(parse_reply("BUY"), Decision::Buy);
        assert_eq!(parse_reply("SELL"), Decision::Sell);
        assert_eq!(parse_reply("HOLD"), Decision::Hold);
    }

    #[test]
    fn test_parse_reply_normalizes_case_and_whitespace() {
        assert_eq!(parse_reply("  buy\n"), Decision::Buy);
        assert_eq!(parse_reply("Sell."), Decision::Sell);
    }

    #[test]
    fn test_parse_reply_buy_checked_before_sell() {
        assert_eq!(parse_reply("Don't SELL, BUY"), Decision::Buy);
    }

    #[test]
    fn test_parse_reply_unexpected_text_is_hold() {
        assert_eq!(parse_reply("I would wait and see."), Decision::Hold);
        assert_eq!(parse_reply(""), Decision::Hold);
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Buy.to_string(), "BUY");
        assert_eq!(Decision::Sell.to_string(), "SELL");
        assert_eq!(Decision::Hold.to_string(), "HOLD");
        assert_eq!(Decision::default(), Decision::Hold);
    }

    // ============= ModelDecider Tests =============

    #[tokio::test]
    async fn test_model_decider_parses_reply() {
        assert_eq!(model(FixedBackend(" buy ")).decide("anything").await, Decision::Buy);
        assert_eq!(model(FixedBackend("SELL")).decide("anything").await, Decision::Sell);
        assert_eq!(model(FixedBackend("maybe")).decide("anything").await, Decision::Hold);
    }

    #[tokio::test]
    async fn test_model_decider_sends_fixed_instruction_and_news() {
        let backend = Arc::new(RecordingBackend::default());
        let decider = ModelDecider::new(backend.clone());

        decider.decide("Housing market crash predicted by experts.").await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, constants::llm::SYSTEM_PROMPT);
        assert!(seen[0].1.contains("Housing market crash predicted by experts."));
        assert!(seen[0].1.contains("BUY, SELL, or HOLD"));
    }

    #[tokio::test]
    async fn test_model_decider_backend_failure_is_hold() {
        let failures = [
            DecisionError::Transport("dns failure".to_string()),
            DecisionError::EmptyReply,
            DecisionError::QueueClosed,
        ];
        for err in failures {
            let decider = model(FailingBackend(err));
            assert_eq!(decider.decide("record profits").await, Decision::Hold);
        }
    }

    #[tokio::test]
    async fn test_model_decider_timeout_is_hold() {
        let decider = model(SlowBackend(Duration::from_secs(5)))
            .with_timeout(Duration::from_millis(20));

        let started = Instant::now();
        assert_eq!(decider.decide("record profits").await, Decision::Hold);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_model_decider_single_attempt_by_default() {
        let backend = Arc::new(FlakyBackend {
            failures: 1,
            calls: AtomicUsize::new(0),
        });
        let decider = ModelDecider::new(backend.clone());

        assert_eq!(decider.decide("news").await, Decision::Hold);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_decider_retries_transient_errors() {
        let backend = Arc::new(FlakyBackend {
            failures: 2,
            calls: AtomicUsize::new(0),
        });
        let decider =
            ModelDecider::new(backend.clone()).with_retries(2, Duration::from_millis(1));

        assert_eq!(decider.decide("news").await, Decision::Sell);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_model_decider_gives_up_after_retries() {
        let backend = Arc::new(FlakyBackend {
            failures: 10,
            calls: AtomicUsize::new(0),
        });
        let decider =
            ModelDecider::new(backend.clone()).with_retries(2, Duration::from_millis(1));

        assert_eq!(decider.decide("news").await, Decision::Hold);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_transient_errors() {
        assert!(DecisionError::Transport("x".into()).is_transient());
        assert!(DecisionError::Timeout { secs: 1 }.is_transient());
        assert!(!DecisionError::EmptyReply.is_transient());
        assert!(!DecisionError::QueueClosed.is_transient());
    }

    // ============= DecisionProvider Tests =============

    #[tokio::test]
    async fn test_provider_dispatch() {
        let heuristic = DecisionProvider::from(KeywordHeuristic::default());
        assert_eq!(heuristic.kind(), "heuristic");
        assert_eq!(heuristic.decide("record breaking profits").await, Decision::Buy);

        let llm = DecisionProvider::from(model(FixedBackend("SELL")));
        assert_eq!(llm.kind(), "llm");
        assert_eq!(llm.decide("record breaking profits").await, Decision::Sell);
    }

    #[test]
    fn test_from_config_heuristic() {
        let provider = DecisionProvider::from_config(&AppConfig::default()).unwrap();
        assert!(matches!(provider, DecisionProvider::Heuristic(_)));
    }

    #[test]
    fn test_from_config_llm_without_key_fails() {
        let mut config = AppConfig::default();
        config.decision.provider = ProviderKind::Llm;
        config.llm.api_key = None;

        let result = DecisionProvider::from_config(&config);
        assert!(matches!(result, Err(SimError::MissingCredential { .. })));

        config.llm.api_key = Some("  ".to_string());
        let result = DecisionProvider::from_config(&config);
        assert!(matches!(result, Err(SimError::MissingCredential { .. })));
    }

    #[tokio::test]
    async fn test_from_config_llm_with_key() {
        let mut config = AppConfig::default();
        config.decision.provider = ProviderKind::Llm;
        config.llm.api_key = Some("sk-test".to_string());

        let provider = DecisionProvider::from_config(&config).unwrap();
        assert_eq!(provider.kind(), "llm");
    }
}
