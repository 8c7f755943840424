use super::*;
use std::sync::atomic::Ordering;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use tempfile::TempDir;

use crate::matcher::MockScorer;
use crate::model::ModelError;

const VOCAB_ROWS: usize = 8;

/// Writes vocabulary, catalog and a random-weight checkpoint into `dir`.
fn write_artifacts(dir: &TempDir) -> Config {
    let vocab_path = dir.path().join("word_dict.json");
    std::fs::write(&vocab_path, r#"{"深圳": 1, "市": 2, "南山区": 3, "北京": 4}"#).unwrap();

    let catalog_path = dir.path().join("unique_addresses.txt");
    std::fs::write(&catalog_path, "深圳市南山区\n\n北京市\n").unwrap();

    let config = Config {
        vocab_path,
        catalog_path,
        checkpoint_path: dir.path().join("esim.safetensors"),
        vocab_size: VOCAB_ROWS,
        embedding_dim: 6,
        hidden_dim: 4,
        max_seq_len: 16,
        force_cpu: true,
        ..Default::default()
    };

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    EsimModel::new(config.model_config(), vb).unwrap();
    varmap.save(&config.checkpoint_path).unwrap();

    config
}

fn mock_session(catalog: &[&str]) -> InferenceSession<MockScorer> {
    let vocab = Arc::new(Vocabulary::from_pairs([("深圳", 1), ("市", 2), ("南山区", 3)]).unwrap());
    InferenceSession::from_parts(
        Indexer::with_default_len(vocab),
        MockScorer,
        Catalog::from_lines(catalog),
    )
}

#[test]
fn test_load_and_match() {
    let dir = TempDir::new().unwrap();
    let config = write_artifacts(&dir);

    let session = InferenceSession::load(&config).unwrap();
    let outcome = session.match_query("深圳市").unwrap();

    let best = outcome.best().expect("non-empty catalog always yields a match");
    assert!((0.0..=1.0).contains(&best.score));
    assert!(session.catalog().iter().any(|c| c == best.candidate));

    let summary = session.summary();
    assert_eq!(summary.vocabulary_words, 4);
    assert_eq!(summary.catalog_entries, 2);
    assert_eq!(summary.max_seq_len, 16);
    assert_eq!(summary.segmenter, "max-match");
    assert_eq!(summary.scorer, "esim");
}

#[test]
fn test_load_is_deterministic_across_sessions() {
    let dir = TempDir::new().unwrap();
    let config = write_artifacts(&dir);

    let first = InferenceSession::load(&config).unwrap();
    let second = InferenceSession::load(&config).unwrap();

    assert_eq!(
        first.match_query("深圳市南山区").unwrap(),
        second.match_query("深圳市南山区").unwrap()
    );
}

#[test]
fn test_missing_vocabulary_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        vocab_path: dir.path().join("missing.json"),
        ..write_artifacts(&dir)
    };

    let err = InferenceSession::load(&config).unwrap_err();
    assert!(matches!(err, SessionError::Config(_)));
}

#[test]
fn test_unreadable_vocabulary_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let config = write_artifacts(&dir);
    std::fs::write(&config.vocab_path, "not json").unwrap();

    let err = InferenceSession::load(&config).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Configuration {
            artifact: "vocabulary",
            ..
        }
    ));
}

#[test]
fn test_dimension_mismatch_aborts_before_inference() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        embedding_dim: 10,
        ..write_artifacts(&dir)
    };

    let err = InferenceSession::load(&config).unwrap_err();
    assert!(err.is_shape_mismatch(), "unexpected error: {err}");
}

#[test]
fn test_vocabulary_larger_than_embedding_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_artifacts(&dir);
    std::fs::write(&config.vocab_path, r#"{"深圳": 1, "市": 8}"#).unwrap();

    let err = InferenceSession::load(&config).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Model(ModelError::VocabularyExceedsEmbedding { .. })
    ));
    assert!(err.is_shape_mismatch());
}

#[test]
fn test_corrupt_checkpoint_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let config = write_artifacts(&dir);
    std::fs::write(&config.checkpoint_path, b"garbage").unwrap();

    let err = InferenceSession::load(&config).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Configuration {
            artifact: "checkpoint",
            ..
        }
    ));
}

#[test]
fn test_mock_session_matches_prefix() {
    let session = mock_session(&["北京市", "深圳市南山区"]);

    let outcome = session.match_query("深圳市").unwrap();
    assert_eq!(outcome.best().unwrap().candidate, "深圳市南山区");

    let ranked = session.rank("深圳市", 1).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].candidate, "深圳市南山区");
}

#[test]
fn test_mock_session_cancellation() {
    let session = mock_session(&["深圳市南山区"]);
    let cancel = AtomicBool::new(false);
    cancel.store(true, Ordering::Release);

    let err = session.match_query_cancellable("深圳市", &cancel).unwrap_err();
    assert!(matches!(err, MatchError::Cancelled { .. }));
}

#[test]
fn test_summary_reports_mock_scorer() {
    let session = mock_session(&[]);
    let summary = session.summary();

    assert_eq!(summary.catalog_entries, 0);
    assert_eq!(summary.scorer, "mock");
    assert_eq!(summary.max_seq_len, 128);
}
