use anyhow::{Result, bail};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::model::{EncodedUnit, TextUnit};
use crate::text::normalize_whitespace;

pub const DEFAULT_MODEL_ID: &str = "local-hash-multilingual-v1";
pub const DEFAULT_MODEL_NAME: &str = "feature-hash word+trigram (de/en)";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;
pub const DEFAULT_NORMALIZATION: &str = "l2";
pub const DEFAULT_BACKEND: &str = "local-hash-v1";
pub const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticModelConfig {
    pub model_id: String,
    pub model_name: String,
    pub dimensions: usize,
    pub normalization: String,
    pub backend: String,
}

/// Maps text to fixed-size vectors, one per input and in input order.
pub trait VectorEncoder {
    fn config(&self) -> &SemanticModelConfig;

    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub fn resolve_model_config(model_id: &str, dimensions: usize) -> SemanticModelConfig {
    let trimmed = model_id.trim();
    let resolved_id = if trimmed.is_empty() {
        DEFAULT_MODEL_ID
    } else {
        trimmed
    };

    if resolved_id == DEFAULT_MODEL_ID {
        return SemanticModelConfig {
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            dimensions: dimensions.max(8),
            normalization: DEFAULT_NORMALIZATION.to_string(),
            backend: DEFAULT_BACKEND.to_string(),
        };
    }

    SemanticModelConfig {
        model_id: resolved_id.to_string(),
        model_name: resolved_id.to_string(),
        dimensions,
        normalization: DEFAULT_NORMALIZATION.to_string(),
        backend: "fastembed".to_string(),
    }
}

pub fn create_encoder(config: SemanticModelConfig) -> Result<Box<dyn VectorEncoder>> {
    let backend = config.backend.clone();
    match backend.as_str() {
        DEFAULT_BACKEND => Ok(Box::new(LocalHashEncoder::new(config))),
        #[cfg(feature = "local-embeddings-fastembed")]
        "fastembed" => Ok(Box::new(fastembed_backend::FastembedEncoder::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "fastembed" => bail!(
            "model '{}' requires building with --features local-embeddings-fastembed",
            config.model_id
        ),
        other => bail!("unknown embedding backend: {other}"),
    }
}

/// Encodes `units` and pairs every unit with its own vector.
pub fn encode_units(
    encoder: &mut dyn VectorEncoder,
    units: Vec<TextUnit>,
) -> Result<Vec<EncodedUnit>> {
    if units.is_empty() {
        return Ok(Vec::new());
    }

    let texts = units
        .iter()
        .map(|unit| unit.text.clone())
        .collect::<Vec<String>>();

    let mut vectors = Vec::<Vec<f32>>::with_capacity(texts.len());
    for batch in texts.chunks(DEFAULT_BATCH_SIZE) {
        vectors.extend(encoder.encode(batch)?);
        info!(
            model_id = %encoder.config().model_id,
            encoded = vectors.len(),
            total = texts.len(),
            "encode batch completed"
        );
    }

    if vectors.len() != units.len() {
        bail!(
            "encoder '{}' returned {} vectors for {} inputs",
            encoder.config().model_id,
            vectors.len(),
            units.len()
        );
    }

    Ok(units
        .into_iter()
        .zip(vectors)
        .map(|(unit, vector)| EncodedUnit { unit, vector })
        .collect())
}

/// Deterministic feature-hashing encoder.
///
/// Words and character trigrams are hashed into a signed bag of features, so
/// German compounds and their English or inflected counterparts still share
/// part of their feature space.
#[derive(Debug, Clone)]
pub struct LocalHashEncoder {
    config: SemanticModelConfig,
}

impl LocalHashEncoder {
    pub fn new(config: SemanticModelConfig) -> Self {
        Self { config }
    }
}

impl VectorEncoder for LocalHashEncoder {
    fn config(&self) -> &SemanticModelConfig {
        &self.config
    }

    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| embed_text_local(text, self.config.dimensions))
            .collect())
    }
}

pub fn embed_text_local(payload: &str, dimensions: usize) -> Vec<f32> {
    let dims = dimensions.max(8);
    let mut vector = vec![0_f32; dims];
    let mut tokens = tokenize_payload(payload);

    if tokens.is_empty() {
        return vector;
    }

    for token in tokens.drain(..) {
        let hash = stable_hash(&token);
        let index = (hash % dims as u64) as usize;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        let base = if token.starts_with("t:") { 0.5 } else { 1.0 };
        let weight = base + (((hash >> 48) & 0xFF) as f32 / 255.0);
        vector[index] += sign * weight;
    }

    normalize_vector(&mut vector);
    vector
}

/// Cosine similarity; zero when either side has no magnitude or the lengths differ.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut left_norm = 0.0_f64;
    let mut right_norm = 0.0_f64;
    for (left_value, right_value) in left.iter().zip(right.iter()) {
        let left_value = f64::from(*left_value);
        let right_value = f64::from(*right_value);
        dot += left_value * right_value;
        left_norm += left_value * left_value;
        right_norm += right_value * right_value;
    }

    if left_norm <= 0.0 || right_norm <= 0.0 {
        return 0.0;
    }

    dot / (left_norm.sqrt() * right_norm.sqrt())
}

fn stable_hash(value: &str) -> u64 {
    let digest = Sha256::digest(value.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn tokenize_payload(payload: &str) -> Vec<String> {
    let normalized = normalize_whitespace(payload);
    if normalized.is_empty() {
        return Vec::new();
    }

    let words = normalized
        .split(' ')
        .map(|value| {
            value
                .chars()
                .filter(|character| character.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|value| !value.is_empty())
        .collect::<Vec<String>>();

    if words.is_empty() {
        return Vec::new();
    }

    let mut features = Vec::<String>::with_capacity(words.len() * 4);
    for (index, word) in words.iter().enumerate() {
        features.push(format!("w:{word}"));
        if let Some(next) = words.get(index + 1) {
            features.push(format!("b:{word}_{next}"));
        }

        let padded = format!("<{word}>").chars().collect::<Vec<char>>();
        for window in padded.windows(3) {
            features.push(format!("t:{}", window.iter().collect::<String>()));
        }
    }
    features
}

fn normalize_vector(values: &mut [f32]) {
    let squared_norm = values
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>();

    if squared_norm <= 0.0 {
        return;
    }

    let norm = squared_norm.sqrt() as f32;
    if norm == 0.0 {
        return;
    }

    for value in values {
        *value /= norm;
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
mod fastembed_backend {
    use anyhow::{Result, anyhow, bail};

    use super::{DEFAULT_BATCH_SIZE, SemanticModelConfig, VectorEncoder};

    pub struct FastembedEncoder {
        config: SemanticModelConfig,
        model: fastembed::TextEmbedding,
    }

    impl FastembedEncoder {
        pub fn new(mut config: SemanticModelConfig) -> Result<Self> {
            let (model_kind, dimensions) = config_to_fastembed_model(&config.model_id)?;
            let model = fastembed::TextEmbedding::try_new(
                fastembed::InitOptions::new(model_kind).with_show_download_progress(true),
            )
            .map_err(|error| anyhow!("failed to initialize local embedding model: {error}"))?;
            config.dimensions = dimensions;

            Ok(Self { config, model })
        }
    }

    impl VectorEncoder for FastembedEncoder {
        fn config(&self) -> &SemanticModelConfig {
            &self.config
        }

        fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.model
                .embed(texts.to_vec(), Some(DEFAULT_BATCH_SIZE))
                .map_err(|error| anyhow!("local embedding failed: {error}"))
        }
    }

    fn config_to_fastembed_model(name: &str) -> Result<(fastembed::EmbeddingModel, usize)> {
        match name {
            "multilingual-e5-small" => Ok((fastembed::EmbeddingModel::MultilingualE5Small, 384)),
            "multilingual-e5-base" => Ok((fastembed::EmbeddingModel::MultilingualE5Base, 768)),
            "multilingual-e5-large" => Ok((fastembed::EmbeddingModel::MultilingualE5Large, 1024)),
            other => bail!(
                "unknown local embedding model: '{other}'. Supported models: \
                 multilingual-e5-small, multilingual-e5-base, multilingual-e5-large"
            ),
        }
    }
}
