//! Embedding similarity tier.
//!
//! Both strings go through a [`SentenceEncoder`]; the score is the cosine of
//! the two vectors. With the `embeddings` feature, [`MiniLmEncoder`] runs a
//! sentence-transformers BERT model locally through candle.

use super::{SimilarityBackend, SimilarityTier};
use crate::error::{Error, Result};

/// Turns sentences into fixed-size dense vectors.
pub trait SentenceEncoder: Send + Sync {
    /// Encode each text into one vector. All vectors share one dimension.
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Name of the underlying model.
    fn model_name(&self) -> &str {
        "custom"
    }
}

/// Cosine similarity of two vectors. Zero for empty, mismatched or zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Similarity tier backed by a sentence encoder.
pub struct EmbeddingBackend {
    encoder: Box<dyn SentenceEncoder>,
}

impl EmbeddingBackend {
    pub fn new(encoder: Box<dyn SentenceEncoder>) -> Self {
        Self { encoder }
    }

    /// Model name of the wrapped encoder.
    pub fn model_name(&self) -> &str {
        self.encoder.model_name()
    }
}

impl SimilarityBackend for EmbeddingBackend {
    fn tier(&self) -> SimilarityTier {
        SimilarityTier::Embedding
    }

    fn score(&self, a: &str, b: &str) -> Result<f32> {
        let vectors = self.encoder.encode(&[a, b])?;
        match vectors.as_slice() {
            [left, right] if !left.is_empty() && left.len() == right.len() => {
                Ok(cosine_similarity(left, right))
            }
            _ => Err(Error::Encoder(format!(
                "expected two vectors of equal dimension, got {}",
                vectors.len()
            ))),
        }
    }
}

#[cfg(feature = "embeddings")]
pub use minilm::{MiniLmEncoder, DEFAULT_EMBEDDING_MODEL};

#[cfg(not(feature = "embeddings"))]
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[cfg(feature = "embeddings")]
mod minilm {
    use candle_core::{DType, Device, Tensor};
    use candle_nn::VarBuilder;
    use candle_transformers::models::bert::{BertModel, Config as BertConfig};
    use hf_hub::api::sync::ApiBuilder;
    use std::path::Path;
    use tokenizers::Tokenizer;

    use super::SentenceEncoder;
    use crate::error::{Error, Result};

    pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

    const MAX_SEQ_LEN: usize = 256;

    fn encoder_err(e: impl std::fmt::Display) -> Error {
        Error::Encoder(e.to_string())
    }

    /// Mean-pooled, L2-normalized BERT sentence embeddings on the CPU.
    pub struct MiniLmEncoder {
        model: BertModel,
        tokenizer: Tokenizer,
        device: Device,
        name: String,
    }

    impl MiniLmEncoder {
        /// Load the default MiniLM model.
        pub fn new() -> Result<Self> {
            Self::from_pretrained(DEFAULT_EMBEDDING_MODEL)
        }

        /// Load from a local model directory or a HuggingFace model id.
        pub fn from_pretrained(model: &str) -> Result<Self> {
            let dir = Path::new(model);
            if dir.is_dir() {
                return Self::from_dir(dir);
            }

            let api = ApiBuilder::new()
                .with_progress(false)
                .build()
                .map_err(encoder_err)?;
            let repo = api.model(model.to_string());

            log::info!("Fetching sentence encoder {}", model);
            let config = repo.get("config.json").map_err(encoder_err)?;
            let tokenizer = repo.get("tokenizer.json").map_err(encoder_err)?;
            let weights = repo
                .get("model.safetensors")
                .or_else(|_| repo.get("pytorch_model.bin"))
                .map_err(encoder_err)?;

            let mut encoder = Self::from_files(&config, &tokenizer, &weights)?;
            encoder.name = model.to_string();
            Ok(encoder)
        }

        /// Load `config.json`, `tokenizer.json` and weights from a directory.
        pub fn from_dir(dir: &Path) -> Result<Self> {
            let safetensors = dir.join("model.safetensors");
            let weights = if safetensors.exists() {
                safetensors
            } else {
                dir.join("pytorch_model.bin")
            };
            let mut encoder =
                Self::from_files(&dir.join("config.json"), &dir.join("tokenizer.json"), &weights)?;
            encoder.name = dir.display().to_string();
            Ok(encoder)
        }

        pub fn from_files(config: &Path, tokenizer: &Path, weights: &Path) -> Result<Self> {
            let device = Device::Cpu;

            let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(config)?)?;
            let tokenizer = Tokenizer::from_file(tokenizer).map_err(encoder_err)?;

            let vb = if weights.extension().is_some_and(|e| e == "safetensors") {
                // SAFETY: the weights file is not modified while mapped
                unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device) }
            } else {
                VarBuilder::from_pth(weights, DType::F32, &device)
            }
            .map_err(encoder_err)?;

            let model = BertModel::load(vb, &config).map_err(encoder_err)?;

            Ok(Self {
                model,
                tokenizer,
                device,
                name: String::new(),
            })
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let encoding = self.tokenizer.encode(text, true).map_err(encoder_err)?;
            let mut ids = encoding.get_ids().to_vec();
            ids.truncate(MAX_SEQ_LEN);

            let input_ids = Tensor::new(&ids[..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(encoder_err)?;
            let token_type_ids = input_ids.zeros_like().map_err(encoder_err)?;

            let hidden = self
                .model
                .forward(&input_ids, &token_type_ids, None)
                .map_err(encoder_err)?;

            // [1, seq_len, dim] -> [dim]
            let pooled = hidden.mean(1).and_then(|t| t.squeeze(0)).map_err(encoder_err)?;
            let norm = pooled
                .sqr()
                .and_then(|t| t.sum_all())
                .and_then(|t| t.sqrt())
                .and_then(|t| t.to_scalar::<f32>())
                .map_err(encoder_err)?
                .max(1e-12);

            (pooled / norm as f64)
                .and_then(|t| t.to_vec1::<f32>())
                .map_err(encoder_err)
        }
    }

    impl SentenceEncoder for MiniLmEncoder {
        fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEncoder(Vec<Vec<f32>>);

    impl SentenceEncoder for FixedEncoder {
        fn encode(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_backend_uses_encoder() {
        let backend = EmbeddingBackend::new(Box::new(FixedEncoder(vec![
            vec![3.0, 4.0],
            vec![3.0, 4.0],
        ])));
        assert!((backend.score("a", "b").unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(backend.tier(), SimilarityTier::Embedding);
    }

    #[test]
    fn test_backend_rejects_bad_output() {
        let backend = EmbeddingBackend::new(Box::new(FixedEncoder(vec![vec![1.0]])));
        assert!(backend.score("a", "b").is_err());

        let backend = EmbeddingBackend::new(Box::new(FixedEncoder(vec![vec![1.0], vec![1.0, 0.0]])));
        assert!(backend.score("a", "b").is_err());
    }
}
