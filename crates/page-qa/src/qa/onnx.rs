//! ONNX-based extractive question answering
//!
//! Runs a DistilBERT-SQuAD style model (start/end logits per token). Long
//! contexts are split into overlapping windows, each encoded as
//! `[CLS] question [SEP] window [SEP]`; the best span over all windows wins.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::OnnxQaConfig;
use crate::error::{Error, Result};

use super::span::{best_span, context_windows, SpanCandidate};
use super::{QaAnswer, QaModel};

/// Local ONNX QA model
pub struct OnnxQaModel {
    engine: Arc<QaEngine>,
}

struct QaEngine {
    /// ONNX Runtime session
    session: Mutex<Session>,
    /// HuggingFace tokenizer
    tokenizer: Tokenizer,
    /// Whether the graph takes `token_type_ids` (BERT does, DistilBERT does not)
    uses_token_type_ids: bool,
    cls_id: u32,
    sep_id: u32,
    pad_id: u32,
    config: OnnxQaConfig,
}

/// One encoded window of the context
struct EncodedWindow {
    /// Context token range covered by this window
    context_tokens: std::ops::Range<usize>,
    /// Position of the first context token in the sequence
    sequence_offset: usize,
    input_ids: Vec<i64>,
    type_ids: Vec<i64>,
}

impl OnnxQaModel {
    /// Create a new ONNX QA model, downloading files into the cache if needed
    pub async fn new(config: &OnnxQaConfig) -> Result<Self> {
        tracing::info!("Initializing ONNX QA model in {}", config.cache_dir.display());

        std::fs::create_dir_all(&config.cache_dir).map_err(|e| {
            Error::Config(format!("Failed to create cache directory: {}", e))
        })?;

        let model_path = config.cache_dir.join("model.onnx");
        let tokenizer_path = config.cache_dir.join("tokenizer.json");

        if !model_path.exists() {
            download_file(&config.model_url, &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download_file(&config.tokenizer_url, &tokenizer_path).await?;
        }

        let config = config.clone();
        let engine = tokio::task::spawn_blocking(move || {
            QaEngine::load(&model_path, &tokenizer_path, config)
        })
        .await
        .map_err(|e| Error::internal(format!("model loading task failed: {}", e)))??;

        tracing::info!("ONNX QA model initialized successfully");

        Ok(Self {
            engine: Arc::new(engine),
        })
    }
}

impl QaEngine {
    fn load(model_path: &Path, tokenizer_path: &Path, config: OnnxQaConfig) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| Error::model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::model(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| Error::model(format!("Failed to set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| Error::model(format!("Failed to load model: {}", e)))?;

        let uses_token_type_ids = session.inputs.iter().any(|i| i.name == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| Error::model(format!("Failed to load tokenizer: {}", e)))?;
        // Windowing is done here, the tokenizer must return every token
        tokenizer
            .with_truncation(None)
            .map_err(|e| Error::model(format!("Failed to disable truncation: {}", e)))?;
        tokenizer.with_padding(None);

        let special = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| Error::model(format!("Tokenizer has no {} token", token)))
        };
        let cls_id = special("[CLS]")?;
        let sep_id = special("[SEP]")?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            uses_token_type_ids,
            cls_id,
            sep_id,
            pad_id,
            config,
        })
    }

    fn answer(&self, question: &str, context: &str) -> Result<QaAnswer> {
        let question_enc = self
            .tokenizer
            .encode(question, false)
            .map_err(|e| Error::model(format!("Tokenization failed: {}", e)))?;
        let context_enc = self
            .tokenizer
            .encode(context, false)
            .map_err(|e| Error::model(format!("Tokenization failed: {}", e)))?;

        let mut question_ids: Vec<u32> = question_enc.get_ids().to_vec();
        question_ids.truncate(self.config.max_seq_len / 2);

        let context_ids = context_enc.get_ids();
        let offsets = context_enc.get_offsets();

        let windows = self.encode_windows(&question_ids, context_ids);
        if windows.is_empty() {
            return Ok(QaAnswer::empty());
        }

        let (start_logits, end_logits, seq_len) = self.run(&windows)?;

        // (window index, span) of the best candidate overall
        let mut best: Option<(usize, SpanCandidate)> = None;
        for (i, window) in windows.iter().enumerate() {
            let row = i * seq_len..(i + 1) * seq_len;
            let context_range =
                window.sequence_offset..window.sequence_offset + window.context_tokens.len();
            if let Some(span) = best_span(
                &start_logits[row.clone()],
                &end_logits[row],
                context_range,
                self.config.max_answer_tokens,
            ) {
                if best.map_or(true, |(_, b)| span.score > b.score) {
                    best = Some((i, span));
                }
            }
        }

        let Some((window_idx, span)) = best else {
            return Ok(QaAnswer::empty());
        };
        if span.score < self.config.min_score {
            tracing::debug!("Best span score {:.4} below threshold", span.score);
            return Ok(QaAnswer::empty());
        }

        let window = &windows[window_idx];
        let first = window.context_tokens.start + (span.start - window.sequence_offset);
        let last = window.context_tokens.start + (span.end - window.sequence_offset);
        let start_byte = offsets[first].0;
        let end_byte = offsets[last].1;

        let answer = context
            .get(start_byte..end_byte)
            .ok_or_else(|| Error::model("Answer offsets fall outside the context"))?;

        Ok(QaAnswer {
            answer: answer.to_string(),
            score: span.score,
            start: Some(start_byte),
            end: Some(end_byte),
        })
    }

    fn encode_windows(&self, question_ids: &[u32], context_ids: &[u32]) -> Vec<EncodedWindow> {
        // [CLS] question [SEP] ... [SEP]
        let budget = self
            .config
            .max_seq_len
            .saturating_sub(question_ids.len() + 3);
        let overlap = self.config.doc_stride.min(budget.saturating_sub(1));
        let sequence_offset = question_ids.len() + 2;

        context_windows(context_ids.len(), budget, overlap)
            .into_iter()
            .map(|range| {
                let mut input_ids = Vec::with_capacity(sequence_offset + range.len() + 1);
                input_ids.push(self.cls_id as i64);
                input_ids.extend(question_ids.iter().map(|&id| id as i64));
                input_ids.push(self.sep_id as i64);
                input_ids.extend(context_ids[range.clone()].iter().map(|&id| id as i64));
                input_ids.push(self.sep_id as i64);

                let mut type_ids = vec![0i64; sequence_offset];
                type_ids.resize(input_ids.len(), 1);

                EncodedWindow {
                    context_tokens: range,
                    sequence_offset,
                    input_ids,
                    type_ids,
                }
            })
            .collect()
    }

    /// Run all windows as one padded batch, returning flattened logits
    fn run(&self, windows: &[EncodedWindow]) -> Result<(Vec<f32>, Vec<f32>, usize)> {
        let batch_size = windows.len();
        let seq_len = windows.iter().map(|w| w.input_ids.len()).max().unwrap_or(0);

        let mut input_ids = vec![self.pad_id as i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (i, window) in windows.iter().enumerate() {
            for (j, &id) in window.input_ids.iter().enumerate() {
                input_ids[i * seq_len + j] = id;
                attention_mask[i * seq_len + j] = 1;
                token_type_ids[i * seq_len + j] = window.type_ids[j];
            }
        }

        let input_ids_tensor = Tensor::from_array((
            vec![batch_size, seq_len],
            input_ids.into_boxed_slice(),
        ))
        .map_err(|e| Error::model(format!("Input tensor creation failed: {}", e)))?;

        let attention_mask_tensor = Tensor::from_array((
            vec![batch_size, seq_len],
            attention_mask.into_boxed_slice(),
        ))
        .map_err(|e| Error::model(format!("Attention mask tensor creation failed: {}", e)))?;

        let mut inputs = vec![
            ("input_ids", input_ids_tensor.into_dyn()),
            ("attention_mask", attention_mask_tensor.into_dyn()),
        ];
        if self.uses_token_type_ids {
            let token_type_ids_tensor = Tensor::from_array((
                vec![batch_size, seq_len],
                token_type_ids.into_boxed_slice(),
            ))
            .map_err(|e| Error::model(format!("Token type tensor creation failed: {}", e)))?;
            inputs.push(("token_type_ids", token_type_ids_tensor.into_dyn()));
        }

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::model(format!("Inference failed: {}", e)))?;

        let named: Vec<_> = outputs.iter().collect();
        let start_value = find_output(&named, "start_logits", 0)
            .ok_or_else(|| Error::model("Model produced no start logits"))?;
        let end_value = find_output(&named, "end_logits", 1)
            .ok_or_else(|| Error::model("Model produced no end logits"))?;

        let (_, start_data) = start_value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::model(format!("Failed to extract start logits: {}", e)))?;
        let (_, end_data) = end_value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::model(format!("Failed to extract end logits: {}", e)))?;

        if start_data.len() != batch_size * seq_len || end_data.len() != batch_size * seq_len {
            return Err(Error::model(format!(
                "Unexpected logits shape: expected {} values, got {}/{}",
                batch_size * seq_len,
                start_data.len(),
                end_data.len()
            )));
        }

        Ok((start_data.to_vec(), end_data.to_vec(), seq_len))
    }
}

fn find_output<'a, V>(named: &'a [(&str, V)], name: &str, fallback: usize) -> Option<&'a V> {
    named
        .iter()
        .find(|(n, _)| *n == name)
        .or_else(|| named.get(fallback))
        .map(|(_, v)| v)
}

#[async_trait]
impl QaModel for OnnxQaModel {
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer> {
        let engine = Arc::clone(&self.engine);
        let question = question.to_string();
        let context = context.to_string();

        tokio::task::spawn_blocking(move || engine.answer(&question, &context))
            .await
            .map_err(|e| Error::model(format!("Inference task failed: {}", e)))?
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Download a model file into the cache
async fn download_file(url: &str, path: &Path) -> Result<()> {
    tracing::info!("Downloading {}", url);

    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::Config(format!("Failed to download {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(Error::Config(format!(
            "Download of {} failed: HTTP {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", url, e)))?;

    // Write to a temp name first so an interrupted download is not cached
    let partial = path.with_extension("partial");
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, path).await?;

    tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());

    Ok(())
}
