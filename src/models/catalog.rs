//! Catalog of model artifacts the pipeline can use.
//!
//! This module is always available (no feature flags) because it contains
//! only static metadata. Loading the models requires the `whisper` and
//! `llm` features respectively.

/// Role a model plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    /// Speech recognition (Whisper ggml).
    Recognition,
    /// Style rewrite and in-context translation (quantized Qwen2).
    Rewrite,
    /// Statistical English-to-Chinese fallback (Marian).
    Translation,
}

/// Metadata for one model artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Short name used on the command line.
    pub name: &'static str,
    pub role: ModelRole,
    /// HuggingFace repository carrying the artifact.
    pub hf_repo: &'static str,
    /// Main weights file within the repository.
    pub hf_filename: &'static str,
    /// Approximate download size in MB.
    pub size_mb: u32,
    /// Notes shown in listings.
    pub description: &'static str,
}

/// Known model artifacts, recognition models first.
///
/// Cantonese needs the multilingual Whisper models; the `.en` variants
/// are useless here and deliberately absent.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "large-v3",
        role: ModelRole::Recognition,
        hf_repo: "ggerganov/whisper.cpp",
        hf_filename: "ggml-large-v3.bin",
        size_mb: 3100,
        description: "Best Cantonese accuracy, needs ~4 GB memory",
    },
    ModelInfo {
        name: "large-v3-turbo",
        role: ModelRole::Recognition,
        hf_repo: "ggerganov/whisper.cpp",
        hf_filename: "ggml-large-v3-turbo.bin",
        size_mb: 1620,
        description: "Near large-v3 accuracy at twice the speed",
    },
    ModelInfo {
        name: "medium",
        role: ModelRole::Recognition,
        hf_repo: "ggerganov/whisper.cpp",
        hf_filename: "ggml-medium.bin",
        size_mb: 1530,
        description: "Acceptable accuracy on slower machines",
    },
    ModelInfo {
        name: "small",
        role: ModelRole::Recognition,
        hf_repo: "ggerganov/whisper.cpp",
        hf_filename: "ggml-small.bin",
        size_mb: 488,
        description: "Fast, noticeably weaker on colloquial Cantonese",
    },
    ModelInfo {
        name: "qwen2.5-3b",
        role: ModelRole::Rewrite,
        hf_repo: "Qwen/Qwen2.5-3B-Instruct-GGUF",
        hf_filename: "qwen2.5-3b-instruct-q4_k_m.gguf",
        size_mb: 1930,
        description: "Context-aware register conversion and translation",
    },
    ModelInfo {
        name: "opus-mt-en-zh",
        role: ModelRole::Translation,
        hf_repo: "Helsinki-NLP/opus-mt-en-zh",
        hf_filename: "model.safetensors",
        size_mb: 310,
        description: "Statistical fallback translator, Simplified output",
    },
];

/// Look up a model by name.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// All models for a given role, in catalog order.
pub fn models_for_role(role: ModelRole) -> impl Iterator<Item = &'static ModelInfo> {
    MODELS.iter().filter(move |m| m.role == role)
}

/// Default cache location for recognition model files.
pub fn model_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cantosub")
        .join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_model_known_names() {
        let model = get_model("large-v3").expect("large-v3 should exist");
        assert_eq!(model.role, ModelRole::Recognition);
        assert_eq!(model.hf_filename, "ggml-large-v3.bin");

        let qwen = get_model("qwen2.5-3b").expect("qwen should exist");
        assert_eq!(qwen.role, ModelRole::Rewrite);

        let marian = get_model("opus-mt-en-zh").expect("marian should exist");
        assert_eq!(marian.role, ModelRole::Translation);
    }

    #[test]
    fn get_model_unknown_name() {
        assert!(get_model("nonexistent").is_none());
        assert!(get_model("").is_none());
    }

    #[test]
    fn no_english_only_recognition_models() {
        for model in models_for_role(ModelRole::Recognition) {
            assert!(
                !model.name.ends_with(".en"),
                "{} is English-only and cannot recognize Cantonese",
                model.name
            );
        }
    }

    #[test]
    fn exactly_one_rewrite_and_one_translation_model() {
        assert_eq!(models_for_role(ModelRole::Rewrite).count(), 1);
        assert_eq!(models_for_role(ModelRole::Translation).count(), 1);
    }

    #[test]
    fn all_names_unique() {
        let mut seen = std::collections::HashSet::new();
        for model in MODELS {
            assert!(seen.insert(model.name), "Duplicate model name {}", model.name);
        }
    }

    #[test]
    fn all_sizes_nonzero() {
        for model in MODELS {
            assert!(model.size_mb > 0, "{} has no size", model.name);
        }
    }

    #[test]
    fn cache_dir_ends_with_models() {
        let dir = model_cache_dir();
        assert!(dir.ends_with("cantosub/models"));
    }
}
