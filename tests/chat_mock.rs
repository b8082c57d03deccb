//! Retrieval/chat orchestration tests with mock collaborators.

use std::sync::Arc;

use serde_json::{json, Map};
use url::Url;

use ragmill::chat::NOT_FOUND_MESSAGE;
use ragmill::services::mock::{MockCompleter, MockEmbedder, MockExtractor, MockIndex};
use ragmill::services::SearchIndex;
use ragmill::{ChunkingConfig, DocumentPipeline, EnhancedPipeline, RagChatService, SYSTEM_PROMPT_BASELINE};

async fn seeded_index() -> Arc<MockIndex> {
    let mut fields = Map::new();
    fields.insert("reportTitle".into(), json!("Cloud Security Assessment"));
    fields.insert("reportNumber".into(), json!("GAO-23-105672"));
    fields.insert("topicCategory".into(), json!("Cybersecurity"));
    fields.insert("agencies".into(), json!(["GSA"]));

    let text = "Cloud adoption has outpaced security controls at several agencies.\n\n\
                The review found gaps in continuous monitoring practices.\n\n\
                GAO recommends updating incident response procedures.";

    let extractor = Arc::new(MockExtractor::new(text).with_fields(fields));
    let embedder = Arc::new(MockEmbedder::new(8));
    let index = Arc::new(MockIndex::new());

    let pipeline = EnhancedPipeline::new(extractor, embedder, index.clone(), "enhanced-index");
    pipeline.prepare().await.unwrap();
    pipeline
        .process_document(
            &Url::parse("https://corpus.test/gao-23-105672.pdf").unwrap(),
            "gao-23-105672",
            &ChunkingConfig::new(120, 20),
        )
        .await
        .unwrap();
    index
}

fn chat_service(index: Arc<MockIndex>, completer: Arc<MockCompleter>) -> RagChatService {
    RagChatService::new(index, Arc::new(MockEmbedder::new(8)), completer)
}

#[tokio::test]
async fn zero_results_short_circuit_without_completion() {
    let index = Arc::new(MockIndex::new());
    index.ensure_index("empty-index", false).await.unwrap();
    let completer = Arc::new(MockCompleter::new("should never be returned"));
    let chat = chat_service(index, completer.clone());

    let reply = chat
        .chat_baseline("anything at all", "empty-index")
        .await
        .unwrap();

    assert_eq!(reply.message, NOT_FOUND_MESSAGE);
    assert!(reply.citations.is_empty());
    assert!(reply.metadata.is_none());
    assert_eq!(completer.calls(), 0, "completion must not run");
}

#[tokio::test]
async fn answer_returns_completion_verbatim_with_citations() {
    let index = seeded_index().await;
    let completer = Arc::new(MockCompleter::new(
        "Security controls lag cloud adoption [gao-23-105672].",
    ));
    let chat = chat_service(index, completer.clone());

    let reply = chat
        .answer(
            "What did the review find about security controls?",
            "enhanced-index",
            SYSTEM_PROMPT_BASELINE,
            5,
        )
        .await
        .unwrap();

    assert_eq!(
        reply.message,
        "Security controls lag cloud adoption [gao-23-105672]."
    );
    assert!(!reply.citations.is_empty());
    for citation in &reply.citations {
        assert_eq!(citation.document_id, "gao-23-105672");
        assert!(citation.chunk_id.starts_with("gao-23-105672-"));
        assert!(citation.snippet.chars().count() <= 200);
        assert_eq!(citation.report_number, "GAO-23-105672");
    }
    // Plain answer() does not aggregate metadata.
    assert!(reply.metadata.is_none());
}

#[tokio::test]
async fn context_sent_to_completer_carries_metadata_headers() {
    let index = seeded_index().await;
    let completer = Arc::new(MockCompleter::new("ok"));
    let chat = chat_service(index, completer.clone());

    chat.chat_enhanced("What gaps exist in monitoring controls?", "enhanced-index")
        .await
        .unwrap();

    let user_content = completer.last_user_content().expect("completer was called");
    assert!(user_content.starts_with("Context:\n"));
    assert!(user_content.contains("[gao-23-105672]"));
    assert!(user_content.contains("Report: Cloud Security Assessment"));
    assert!(user_content.contains("(GAO-23-105672)"));
    assert!(user_content.contains("Category: Cybersecurity"));
    assert!(user_content.contains("Agencies: GSA"));
    assert!(user_content.contains("\n\nQuestion: What gaps exist in monitoring controls?"));
}

#[tokio::test]
async fn enhanced_chat_aggregates_citation_metadata() {
    let index = seeded_index().await;
    let completer = Arc::new(MockCompleter::new("ok"));
    let chat = chat_service(index, completer);

    let reply = chat
        .chat_enhanced("What are the recommendations on incident response?", "enhanced-index")
        .await
        .unwrap();

    let metadata = reply.metadata.expect("enhanced variant aggregates");
    assert_eq!(metadata.agencies, vec!["GSA"]);
    assert_eq!(metadata.topics, vec!["Cybersecurity"]);
    assert_eq!(metadata.reports.len(), 1);
    assert_eq!(metadata.reports[0].title, "Cloud Security Assessment");
    assert_eq!(metadata.reports[0].number, "GAO-23-105672");
    assert!(!metadata.has_executive_summary);
}

#[tokio::test]
async fn top_k_limits_citation_count() {
    let index = seeded_index().await;
    let completer = Arc::new(MockCompleter::new("ok"));
    let chat = chat_service(index, completer);

    let reply = chat
        .answer(
            "security controls monitoring",
            "enhanced-index",
            SYSTEM_PROMPT_BASELINE,
            1,
        )
        .await
        .unwrap();

    assert_eq!(reply.citations.len(), 1);
}
