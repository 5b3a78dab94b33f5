//! Statistical machine translation fallback.
//!
//! Runs a Marian English-to-Chinese model through candle as the last
//! stage of the translation cascade. Marian's native output is Simplified
//! script; it must never be accepted without script normalization.
//!
//! # Feature Gate
//!
//! The real backend requires the `llm` feature (it shares the candle
//! stack with the rewrite model).

use crate::error::Result;

#[cfg(feature = "llm")]
use crate::error::CantosubError;

/// Trait for English-to-Chinese translation.
pub trait MtBackend: Send {
    /// Translate English text to Chinese (script unspecified).
    fn translate(&mut self, text: &str) -> Result<String>;

    /// Name of the backend for logging.
    fn name(&self) -> &str;
}

/// Mock backend for tests.
#[derive(Debug, Clone, Default)]
pub struct MockMt {
    response: Option<String>,
    should_fail: bool,
}

impl MockMt {
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

impl MtBackend for MockMt {
    fn translate(&mut self, text: &str) -> Result<String> {
        if self.should_fail {
            return Err(crate::error::CantosubError::Inference {
                message: "mock mt failure".to_string(),
            });
        }
        Ok(self.response.clone().unwrap_or_else(|| text.to_string()))
    }

    fn name(&self) -> &str {
        "mock-mt"
    }
}

/// Maximum decoder steps per translation.
#[cfg(feature = "llm")]
const MAX_DECODE_TOKENS: usize = 128;

/// Marian translator running on CPU through candle.
#[cfg(feature = "llm")]
pub struct MarianTranslator {
    model: candle_transformers::models::marian::MTModel,
    config: candle_transformers::models::marian::Config,
    tokenizer: tokenizers::Tokenizer,
    tokenizer_dec: tokenizers::Tokenizer,
    device: candle_core::Device,
    model_name: String,
}

#[cfg(feature = "llm")]
impl MarianTranslator {
    /// Load a Marian model from the HuggingFace cache, downloading on
    /// first use. `repo` is an opus-mt style repository carrying
    /// safetensors weights plus source and target tokenizers.
    pub fn load(repo: &str) -> Result<Self> {
        use candle_core::DType;
        use candle_nn::VarBuilder;
        use candle_transformers::models::marian;
        use hf_hub::api::sync::Api;

        let device = candle_core::Device::Cpu;
        let api = Api::new().map_err(|e| CantosubError::ModelLoad {
            model: repo.to_string(),
            message: format!("HF Hub API init: {e}"),
        })?;
        let hub = api.model(repo.to_string());

        let fetch = |filename: &str| {
            hub.get(filename).map_err(|e| CantosubError::ModelLoad {
                model: repo.to_string(),
                message: format!("Download {filename}: {e}"),
            })
        };

        let weights_path = fetch("model.safetensors")?;
        let config_path = fetch("config.json")?;
        let tokenizer_path = fetch("tokenizer.json")?;
        let tokenizer_dec_path = fetch("tokenizer_dec.json")?;

        let config_bytes = std::fs::read(&config_path)?;
        let config: marian::Config =
            serde_json::from_slice(&config_bytes).map_err(|e| CantosubError::ModelLoad {
                model: repo.to_string(),
                message: format!("Parse Marian config: {e}"),
            })?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device).map_err(
                |e| CantosubError::ModelLoad {
                    model: repo.to_string(),
                    message: format!("Load safetensors: {e}"),
                },
            )?
        };
        let model = marian::MTModel::new(&config, vb).map_err(|e| CantosubError::ModelLoad {
            model: repo.to_string(),
            message: format!("Init Marian model: {e}"),
        })?;

        let load_tokenizer = |path: &std::path::Path| {
            tokenizers::Tokenizer::from_file(path).map_err(|e| CantosubError::ModelLoad {
                model: repo.to_string(),
                message: format!("Load tokenizer {}: {e}", path.display()),
            })
        };

        Ok(Self {
            model,
            config,
            tokenizer: load_tokenizer(&tokenizer_path)?,
            tokenizer_dec: load_tokenizer(&tokenizer_dec_path)?,
            device,
            model_name: repo.to_string(),
        })
    }
}

#[cfg(feature = "llm")]
impl MtBackend for MarianTranslator {
    fn translate(&mut self, text: &str) -> Result<String> {
        use candle_core::Tensor;

        self.model.reset_kv_cache();

        let mut input_ids = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CantosubError::Inference {
                message: format!("Tokenize: {e}"),
            })?
            .get_ids()
            .to_vec();
        input_ids.push(self.config.eos_token_id);

        let input = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| CantosubError::Inference {
                message: format!("Create encoder input: {e}"),
            })?;
        let encoder_xs = self
            .model
            .encoder()
            .forward(&input, 0)
            .map_err(|e| CantosubError::Inference {
                message: format!("Encoder forward: {e}"),
            })?;

        // Greedy decoding, feeding one token per step past the first
        let mut token_ids = vec![self.config.decoder_start_token_id];
        for index in 0..MAX_DECODE_TOKENS {
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let decoder_input = Tensor::new(&token_ids[start_pos..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| CantosubError::Inference {
                    message: format!("Create decoder input: {e}"),
                })?;

            let logits = self
                .model
                .decode(&decoder_input, &encoder_xs, start_pos)
                .map_err(|e| CantosubError::Inference {
                    message: format!("Decoder forward: {e}"),
                })?;

            let logits = logits
                .squeeze(0)
                .and_then(|t| {
                    let len = t.dim(0)?;
                    t.get(len - 1)
                })
                .map_err(|e| CantosubError::Inference {
                    message: format!("Slice logits: {e}"),
                })?;

            let next_token = logits
                .argmax(candle_core::D::Minus1)
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| CantosubError::Inference {
                    message: format!("Argmax: {e}"),
                })?;

            if next_token == self.config.eos_token_id
                || next_token == self.config.forced_eos_token_id
            {
                break;
            }
            token_ids.push(next_token);
        }

        let output = self
            .tokenizer_dec
            .decode(&token_ids[1..], true)
            .map_err(|e| CantosubError::Inference {
                message: format!("Detokenize: {e}"),
            })?;

        Ok(output.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_response() {
        let mut mt = MockMt::new().with_response("软件");
        assert_eq!(mt.translate("software").unwrap(), "软件");
    }

    #[test]
    fn mock_failure_is_an_error() {
        let mut mt = MockMt::new().with_failure();
        assert!(mt.translate("anything").is_err());
    }

    #[test]
    fn backend_trait_is_object_safe() {
        let mut backend: Box<dyn MtBackend> = Box::new(MockMt::new().with_response("你好"));
        assert_eq!(backend.translate("hello").unwrap(), "你好");
        assert_eq!(backend.name(), "mock-mt");
    }
}
