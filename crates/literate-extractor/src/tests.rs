//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{Extractor, ExtractorConfig};
    use literate_domain::{ErrorKind, ExtractionClient, Relationship};
    use literate_llm::{LlmError, MockProvider};
    use std::time::Duration;

    const ALICE_BOB: &str = r#"{
        "objects": [
            {
                "name": "Alice",
                "description": "A curious girl who loves reading",
                "relationships": [{"target": "Bob", "description": "friend"}]
            },
            {"name": "Bob", "description": "Alice's neighbor", "relationships": []}
        ]
    }"#;

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let llm = MockProvider::new(ALICE_BOB);
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let result = extractor
            .extract("Alice is a curious girl. Her neighbor Bob ...")
            .await
            .unwrap();

        assert_eq!(result.names(), vec!["Alice", "Bob"]);
        assert_eq!(result.objects[0].relationships, vec![Relationship::new("Bob", "friend")]);
        assert_eq!(llm.call_count(), 1);
        assert!(llm.prompts()[0].contains("Her neighbor Bob"));
    }

    #[tokio::test]
    async fn test_extraction_with_invalid_json_is_schema_error() {
        let llm = MockProvider::new("This is not JSON");
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let err = extractor.extract("Some text").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[tokio::test]
    async fn test_extraction_with_missing_name_is_schema_error() {
        let llm = MockProvider::new(r#"{"objects": [{"description": "who?"}]}"#);
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let err = extractor.extract("Some text").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[tokio::test]
    async fn test_provider_failure_is_transport_error() {
        let mut llm = MockProvider::default();
        llm.add_error("Text", LlmError::Communication("connection refused".into()));
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let err = extractor.extract("Some text").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_invalid_envelope_is_schema_error() {
        let mut llm = MockProvider::default();
        llm.add_error("Text", LlmError::InvalidResponse("missing 'response'".into()));
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let err = extractor.extract("Some text").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let llm = MockProvider::new(ALICE_BOB).with_delay(Duration::from_secs(60));
        let config = ExtractorConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        let extractor = Extractor::new(llm, config);

        let err = extractor.extract("Alice and Bob").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("timed out"));
    }

    #[tokio::test]
    async fn test_correction_returns_first_object() {
        let mut llm = MockProvider::default();
        llm.add_response(
            "needs correction",
            r#"{"objects": [{"name": "Alice", "description": "A girl from the village"}]}"#,
        );
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let corrected = extractor
            .correct("Alise", "Alice lived in the village.")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(corrected.name, "Alice");
        assert_eq!(corrected.description, "A girl from the village");
        assert!(llm.prompts()[0].contains("\"Alise\""));
    }

    #[tokio::test]
    async fn test_correction_with_no_objects() {
        let llm = MockProvider::new(r#"{"objects": []}"#);
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let corrected = extractor.correct("Ghost", "Nobody here.").await.unwrap();
        assert!(corrected.is_none());
    }

    #[tokio::test]
    async fn test_availability_delegates_to_provider() {
        let up = Extractor::new(MockProvider::default(), ExtractorConfig::default());
        let down = Extractor::new(MockProvider::default().unavailable(), ExtractorConfig::default());

        assert!(up.is_available().await);
        assert!(!down.is_available().await);
    }

    #[tokio::test]
    async fn test_calls_are_independent() {
        let mut llm = MockProvider::default();
        llm.add_response("first", r#"{"objects": [{"name": "Alice"}]}"#);
        llm.add_response("second", r#"{"objects": [{"name": "Bob"}]}"#);
        let extractor = Extractor::new(llm, ExtractorConfig::default());

        let first = extractor.extract("the first text").await.unwrap();
        let second = extractor.extract("the second text").await.unwrap();

        assert_eq!(first.names(), vec!["Alice"]);
        assert_eq!(second.names(), vec!["Bob"]);
    }
}
