//! Local language model backend for context-aware translation.
//!
//! Runs a quantized Qwen2 model through candle for the middle stage of the
//! translation cascade. The model is prompted for Traditional Chinese but
//! is not trusted to comply; its output always goes through the script
//! normalizer downstream.
//!
//! # Feature Gate
//!
//! The real backend requires the `llm` feature:
//!
//! ```bash
//! cargo build --features llm
//! ```

use crate::error::Result;

#[cfg(feature = "llm")]
use crate::error::CantosubError;

/// Trait for local text generation.
pub trait LlmBackend: Send {
    /// Generate a completion for the prompt.
    fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Name of the backend for logging.
    fn name(&self) -> &str;
}

/// Build the translation prompt for one English phrase.
pub fn translation_prompt(phrase: &str) -> String {
    format!(
        "將以下英文翻譯成繁體中文。只輸出翻譯結果，不要解釋。\n\n英文：{}\n繁體中文：",
        phrase
    )
}

/// Strip label prefixes the model tends to echo back.
pub fn clean_generation(raw: &str) -> String {
    let mut text = raw.trim();
    for prefix in ["繁體中文：", "翻譯結果：", "翻譯：", "結果："] {
        if let Some(stripped) = text.strip_prefix(prefix) {
            text = stripped.trim();
        }
    }
    // Keep only the first line; chatty models append commentary
    text.lines().next().unwrap_or("").trim().to_string()
}

/// Mock backend for tests.
#[derive(Debug, Clone, Default)]
pub struct MockLlm {
    response: Option<String>,
    should_fail: bool,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl LlmBackend for MockLlm {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(crate::error::CantosubError::Inference {
                message: "mock llm failure".to_string(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| prompt.to_string()))
    }

    fn name(&self) -> &str {
        "mock-llm"
    }
}

/// Maximum tokens generated per phrase translation.
#[cfg(feature = "llm")]
const MAX_DECODE_TOKENS: usize = 128;

/// Quantized Qwen2 backend running on CPU through candle.
#[cfg(feature = "llm")]
pub struct QwenLlm {
    model: candle_transformers::models::quantized_qwen2::ModelWeights,
    tokenizer: tokenizers::Tokenizer,
    device: candle_core::Device,
    eos_tokens: Vec<u32>,
    model_name: String,
}

#[cfg(feature = "llm")]
impl QwenLlm {
    /// Load a quantized Qwen2 model from the HuggingFace cache,
    /// downloading on first use.
    pub fn load(repo: &str, gguf_filename: &str) -> Result<Self> {
        use candle_transformers::models::quantized_qwen2::ModelWeights;
        use hf_hub::api::sync::Api;

        let device = candle_core::Device::Cpu;
        let api = Api::new().map_err(|e| CantosubError::ModelLoad {
            model: repo.to_string(),
            message: format!("HF Hub API init: {e}"),
        })?;
        let hub = api.model(repo.to_string());

        let model_path = hub.get(gguf_filename).map_err(|e| CantosubError::ModelLoad {
            model: repo.to_string(),
            message: format!("Download {gguf_filename}: {e}"),
        })?;
        let tokenizer_path = hub.get("tokenizer.json").map_err(|e| CantosubError::ModelLoad {
            model: repo.to_string(),
            message: format!("Download tokenizer: {e}"),
        })?;

        let mut reader = std::fs::File::open(&model_path)?;
        let content = candle_core::quantized::gguf_file::Content::read(&mut reader).map_err(
            |e| CantosubError::ModelLoad {
                model: repo.to_string(),
                message: format!("Read GGUF {}: {e}", model_path.display()),
            },
        )?;
        let model = ModelWeights::from_gguf(content, &mut reader, &device).map_err(|e| {
            CantosubError::ModelLoad {
                model: repo.to_string(),
                message: format!("Init Qwen2 weights: {e}"),
            }
        })?;

        let tokenizer =
            tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
                CantosubError::ModelLoad {
                    model: repo.to_string(),
                    message: format!("Load tokenizer: {e}"),
                }
            })?;

        let eos_tokens = ["<|im_end|>", "<|endoftext|>"]
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();

        Ok(Self {
            model,
            tokenizer,
            device,
            eos_tokens,
            model_name: repo.to_string(),
        })
    }
}

#[cfg(feature = "llm")]
impl LlmBackend for QwenLlm {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        use candle_core::Tensor;

        let chat_prompt = format!(
            "<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n",
            prompt
        );
        let encoding = self
            .tokenizer
            .encode(chat_prompt, true)
            .map_err(|e| CantosubError::Inference {
                message: format!("Tokenize: {e}"),
            })?;

        let prompt_ids: Vec<u32> = encoding.get_ids().to_vec();
        let mut generated: Vec<u32> = Vec::new();

        // Prompt pass, then greedy decoding one token at a time with the
        // KV cache carrying the context.
        let mut next_input = prompt_ids.clone();
        let mut index_pos = 0usize;

        for _ in 0..MAX_DECODE_TOKENS {
            let input = Tensor::new(next_input.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| CantosubError::Inference {
                    message: format!("Create input tensor: {e}"),
                })?;

            let logits =
                self.model
                    .forward(&input, index_pos)
                    .map_err(|e| CantosubError::Inference {
                        message: format!("Forward pass: {e}"),
                    })?;

            let logits = logits.squeeze(0).map_err(|e| CantosubError::Inference {
                message: format!("Squeeze logits: {e}"),
            })?;

            let next_token = logits
                .argmax(candle_core::D::Minus1)
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| CantosubError::Inference {
                    message: format!("Argmax: {e}"),
                })?;

            if self.eos_tokens.contains(&next_token) {
                break;
            }

            index_pos += next_input.len();
            generated.push(next_token);
            next_input = vec![next_token];
        }

        let output = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| CantosubError::Inference {
                message: format!("Detokenize: {e}"),
            })?;

        Ok(output)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
