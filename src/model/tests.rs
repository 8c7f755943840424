use super::*;
use std::collections::HashMap;

use candle_core::{D, DType};
use candle_nn::VarMap;
use tempfile::TempDir;

const VOCAB: usize = 10;
const EMB: usize = 6;
const HIDDEN: usize = 4;
const SEQ: usize = 12;

fn tiny_config() -> EsimConfig {
    EsimConfig::new(VOCAB, EMB, HIDDEN).with_max_seq_len(SEQ)
}

fn random_model(config: EsimConfig) -> (EsimModel, VarMap) {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let model = EsimModel::new(config, vb).unwrap();
    (model, varmap)
}

fn seq(ids: &[u32]) -> EncodedSequence {
    EncodedSequence::from_ids(ids.to_vec(), SEQ)
}

fn varmap_tensors(varmap: &VarMap, prefix: &str) -> HashMap<String, Tensor> {
    varmap
        .data()
        .lock()
        .unwrap()
        .iter()
        .map(|(name, var)| (format!("{prefix}{name}"), var.as_tensor().clone()))
        .collect()
}

fn assert_all_close(t: &Tensor, expected: f32) {
    for v in t.flatten_all().unwrap().to_vec1::<f32>().unwrap() {
        assert!((v - expected).abs() < 1e-5, "{v} != {expected}");
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_default_dimensions() {
        let config = EsimConfig::default();
        assert_eq!(config.vocab_size, 44_018);
        assert_eq!(config.embedding_dim, 200);
        assert_eq!(config.hidden_dim, 128);
        assert_eq!(config.max_seq_len, 128);
        assert_eq!(config.enriched_dim(), 1024);
        assert_eq!(config.pooled_dim(), 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_dims() {
        let config = EsimConfig::new(VOCAB, 0, HIDDEN);
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_dropout() {
        let mut config = tiny_config();
        config.dropout = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expected_shapes_cover_all_parameters() {
        let shapes: HashMap<String, Vec<usize>> = tiny_config().expected_shapes().into_iter().collect();

        assert_eq!(shapes.len(), 21);
        assert_eq!(shapes["embedding.weight"], vec![VOCAB, EMB]);
        assert_eq!(shapes["lstm1.weight_ih_l0"], vec![4 * HIDDEN, EMB]);
        assert_eq!(shapes["lstm1.weight_hh_l0_reverse"], vec![4 * HIDDEN, HIDDEN]);
        assert_eq!(shapes["lstm2.weight_ih_l0"], vec![4 * HIDDEN, 8 * HIDDEN]);
        assert_eq!(shapes["fc.0.weight"], vec![HIDDEN, 8 * HIDDEN]);
        assert_eq!(shapes["fc.3.weight"], vec![1, HIDDEN]);
        assert_eq!(shapes["fc.3.bias"], vec![1]);
    }
}

mod layer_tests {
    use super::*;
    use super::super::encoder::reverse_time;

    #[test]
    fn test_alignment_weights_are_normalised() {
        let a = Tensor::randn(0f32, 1.0, (2, 5, 8), &Device::Cpu).unwrap();
        let b = Tensor::randn(0f32, 1.0, (2, 3, 8), &Device::Cpu).unwrap();

        let aligned = soft_align(&a, &b).unwrap();

        assert_eq!(aligned.a_weights.dims(), &[2, 5, 3]);
        assert_eq!(aligned.b_weights.dims(), &[2, 3, 5]);
        assert_eq!(aligned.a_aligned.dims(), &[2, 5, 8]);
        assert_eq!(aligned.b_aligned.dims(), &[2, 3, 8]);
        assert_all_close(&aligned.a_weights.sum(D::Minus1).unwrap(), 1.0);
        assert_all_close(&aligned.b_weights.sum(D::Minus1).unwrap(), 1.0);
    }

    #[test]
    fn test_alignment_attends_to_padding() {
        // Second position of `b` is an all-zero padding encoding.
        let a = Tensor::new(&[[[1f32, 0.0], [0.0, 1.0]]], &Device::Cpu).unwrap();
        let b = Tensor::new(&[[[1f32, 1.0], [0.0, 0.0]]], &Device::Cpu).unwrap();

        let aligned = soft_align(&a, &b).unwrap();
        let weights = aligned.a_weights.flatten_all().unwrap().to_vec1::<f32>().unwrap();

        assert!(weights.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_enrich_layout() {
        let x = Tensor::new(&[[[3f32, 4.0]]], &Device::Cpu).unwrap();
        let aligned = Tensor::new(&[[[1f32, 2.0]]], &Device::Cpu).unwrap();

        let enriched = enrich(&x, &aligned).unwrap();
        let values = enriched.flatten_all().unwrap().to_vec1::<f32>().unwrap();

        assert_eq!(values, vec![3.0, 4.0, 1.0, 2.0, 2.0, 2.0, 3.0, 8.0]);
    }

    #[test]
    fn test_pool_pair_order() {
        let a = Tensor::new(&[[[1f32], [3.0]]], &Device::Cpu).unwrap();
        let b = Tensor::new(&[[[0f32], [0.0], [6.0]]], &Device::Cpu).unwrap();

        let pooled = pool_pair(&a, &b).unwrap();
        let values = pooled.flatten_all().unwrap().to_vec1::<f32>().unwrap();

        assert_eq!(values, vec![3.0, 2.0, 6.0, 2.0]);
    }

    #[test]
    fn test_reverse_time() {
        let xs = Tensor::new(&[[[1f32], [2.0], [3.0]]], &Device::Cpu).unwrap();
        let values = reverse_time(&xs)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_bilstm_output_width() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let lstm = BiLstm::new(EMB, HIDDEN, vb).unwrap();

        let xs = Tensor::randn(0f32, 1.0, (1, SEQ, EMB), &Device::Cpu).unwrap();
        let out = lstm.forward(&xs).unwrap();

        assert_eq!(out.dims(), &[1, SEQ, 2 * HIDDEN]);
    }
}

mod model_tests {
    use super::*;

    #[test]
    fn test_score_is_probability() {
        let (model, _) = random_model(tiny_config());

        let score = model.score(&seq(&[1, 2, 3]), &seq(&[1, 2, 4, 5])).unwrap();

        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_embedding_table_shape() {
        let (model, _) = random_model(tiny_config());
        assert_eq!(model.encoder.embeddings().dims(), &[VOCAB, EMB]);
    }

    #[test]
    fn test_score_is_deterministic() {
        let (model, _) = random_model(tiny_config());
        let a = seq(&[1, 2, 3]);
        let b = seq(&[7, 8]);

        let first = model.score(&a, &b).unwrap();
        for _ in 0..3 {
            assert_eq!(model.score(&a, &b).unwrap(), first);
        }
    }

    #[test]
    fn test_forward_batch_shape() {
        let (model, _) = random_model(tiny_config());
        let a = Tensor::zeros((3, SEQ), DType::U32, &Device::Cpu).unwrap();
        let b = Tensor::ones((3, SEQ), DType::U32, &Device::Cpu).unwrap();

        let out = model.forward(&a, &b).unwrap();

        assert_eq!(out.dims(), &[3, 1]);
    }

    #[test]
    fn test_align_shapes() {
        let (model, _) = random_model(tiny_config());

        let alignment = model.align(&seq(&[1, 2]), &seq(&[3])).unwrap();

        assert_eq!(alignment.a_weights.dims(), &[1, SEQ, SEQ]);
        assert_eq!(alignment.a_aligned.dims(), &[1, SEQ, 2 * HIDDEN]);
    }

    #[test]
    fn test_check_vocabulary() {
        let (model, _) = random_model(tiny_config());

        let fits = Vocabulary::from_pairs([("深圳", 1), ("市", 9)]).unwrap();
        assert!(model.check_vocabulary(&fits).is_ok());

        let too_large = Vocabulary::from_pairs([("深圳", 1), ("市", 10)]).unwrap();
        assert!(matches!(
            model.check_vocabulary(&too_large),
            Err(ModelError::VocabularyExceedsEmbedding { max_id: 10, rows: VOCAB })
        ));
    }

    #[test]
    fn test_pair_scorer_impl() {
        let (model, _) = random_model(tiny_config());
        let a = seq(&[1, 2]);
        let b = seq(&[2, 3]);

        let direct = model.score(&a, &b).unwrap();
        let via_trait = PairScorer::score(&model, &a, &b).unwrap();

        assert_eq!(direct, via_trait);
        assert_eq!(model.mode(), "esim");
    }
}

mod checkpoint_tests {
    use super::*;

    #[test]
    fn test_safetensors_roundtrip_preserves_scores() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("esim.safetensors");
        let (model, varmap) = random_model(tiny_config());
        varmap.save(&path).unwrap();

        let reloaded = EsimModel::load(&path, tiny_config(), &Device::Cpu).unwrap();

        let a = seq(&[1, 2, 3]);
        let b = seq(&[3, 4]);
        let before = model.score(&a, &b).unwrap();
        let after = reloaded.score(&a, &b).unwrap();
        assert!((before - after).abs() < 1e-6);
    }

    #[test]
    fn test_wrapped_parameters_are_unwrapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrapped.safetensors");
        let (_, varmap) = random_model(tiny_config());
        let tensors = varmap_tensors(&varmap, &format!("{WRAPPED_PARAMS_KEY}."));
        candle_core::safetensors::save(&tensors, &path).unwrap();

        let checkpoint = Checkpoint::load(&path, &Device::Cpu).unwrap();

        assert!(checkpoint.tensor("embedding.weight").is_some());
        assert!(checkpoint.validate(&tiny_config()).is_ok());
        assert_eq!(checkpoint.metadata(), &CheckpointMetadata::default());
    }

    #[test]
    fn test_hidden_dim_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("esim.safetensors");
        let (_, varmap) = random_model(tiny_config());
        varmap.save(&path).unwrap();

        let wider = EsimConfig::new(VOCAB, EMB, HIDDEN + 2).with_max_seq_len(SEQ);
        let err = EsimModel::load(&path, wider, &Device::Cpu).unwrap_err();

        assert!(err.is_shape_mismatch());
        match err {
            ModelError::ShapeMismatch {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "lstm1.weight_ih_l0");
                assert_eq!(expected, vec![4 * (HIDDEN + 2), EMB]);
                assert_eq!(actual, vec![4 * HIDDEN, EMB]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_parameter_is_rejected() {
        let (_, varmap) = random_model(tiny_config());
        let mut tensors = varmap_tensors(&varmap, "");
        tensors.remove("fc.3.bias");

        let err = EsimModel::from_checkpoint(
            Checkpoint::from_tensors(tensors),
            tiny_config(),
            &Device::Cpu,
        )
        .unwrap_err();

        assert!(matches!(err, ModelError::MissingTensor { name } if name == "fc.3.bias"));
    }

    #[test]
    fn test_missing_file() {
        let err = Checkpoint::load(Path::new("/nonexistent/esim.pth"), &Device::Cpu).unwrap_err();
        assert!(matches!(err, ModelError::CheckpointNotFound { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("esim.onnx");
        std::fs::write(&path, b"not a checkpoint").unwrap();

        let err = Checkpoint::load(&path, &Device::Cpu).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            CheckpointFormat::from_path(Path::new("result/best_esim_model.pth")),
            Some(CheckpointFormat::Pickle)
        );
        assert_eq!(
            CheckpointFormat::from_path(Path::new("model.safetensors")),
            Some(CheckpointFormat::SafeTensors)
        );
        assert_eq!(CheckpointFormat::from_path(Path::new("model")), None);
    }

    #[test]
    fn test_safetensors_metadata_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta.safetensors");

        let header = br#"{"__metadata__":{"epoch":"7","best_f1":"0.9312"},"fc.3.bias":{"dtype":"F32","shape":[1],"data_offsets":[0,4]}}"#;
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header);
        bytes.extend_from_slice(&0.5f32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let metadata = read_safetensors_metadata(&path).unwrap();
        assert_eq!(metadata.get("epoch").map(String::as_str), Some("7"));

        let checkpoint = Checkpoint::load(&path, &Device::Cpu).unwrap();
        assert_eq!(checkpoint.metadata().epoch, Some(7));
        assert_eq!(checkpoint.metadata().best_f1, Some(0.9312));
        assert_eq!(checkpoint.len(), 1);
    }

    #[test]
    fn test_safetensors_without_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.safetensors");
        let (_, varmap) = random_model(tiny_config());
        varmap.save(&path).unwrap();

        assert!(read_safetensors_metadata(&path).unwrap().is_empty());
        let checkpoint = Checkpoint::load(&path, &Device::Cpu).unwrap();
        assert_eq!(checkpoint.metadata(), &CheckpointMetadata::default());
    }

    #[test]
    fn test_truncated_safetensors_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.safetensors");
        std::fs::write(&path, 64u64.to_le_bytes()).unwrap();

        assert!(matches!(
            read_safetensors_metadata(&path),
            Err(ModelError::LoadFailed { .. })
        ));
    }

    const WRAPPED_PTH: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/esim_wrapped.pth");
    const RAW_PTH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/esim_raw.pth");

    fn score_pth(path: &str) -> f32 {
        let checkpoint = Checkpoint::load(Path::new(path), &Device::Cpu).unwrap();
        assert_eq!(checkpoint.len(), tiny_config().expected_shapes().len());
        assert_eq!(checkpoint.metadata(), &CheckpointMetadata::default());

        let model = EsimModel::from_checkpoint(checkpoint, tiny_config(), &Device::Cpu).unwrap();
        model.score(&seq(&[1, 2, 3]), &seq(&[3, 4])).unwrap()
    }

    #[test]
    fn test_pickle_wrapped_in_training_state() {
        let score = score_pth(WRAPPED_PTH);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_pickle_raw_state_dict() {
        let score = score_pth(RAW_PTH);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_pickle_layouts_load_the_same_weights() {
        assert_eq!(score_pth(WRAPPED_PTH), score_pth(RAW_PTH));
    }
}
