use anyhow::{Context, Result, bail};
use cantosub::asr::whisper::WhisperConfig;
use cantosub::audio::extractor::{AudioExtractor, is_supported_media};
use cantosub::cli::{Cli, Commands};
use cantosub::config::Config;
use cantosub::export::SubtitleFormat;
use cantosub::models::catalog::{self, ModelRole, model_cache_dir};
use cantosub::pipeline::{
    Orchestrator, PipelineOptions, RunOutcome, StyleBackend, WhisperBackend,
};
use cantosub::style::StyleEngine;
use cantosub::vad::{EnergyVad, VadConfig};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Models) => {
            list_models();
            Ok(())
        }
        Some(Commands::Check) => check_dependencies(),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "cantosub",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        None => {
            let Some(media) = cli.media.clone() else {
                Cli::command().print_help().ok();
                std::process::exit(2);
            };
            run_pipeline(cli, media)
        }
    }
}

fn list_models() {
    println!("{}", "Recognition models (--model):".bold());
    for model in catalog::models_for_role(ModelRole::Recognition) {
        println!(
            "  {:16} {:>6} MB  {}",
            model.name.green(),
            model.size_mb,
            model.description
        );
    }
    println!();
    println!("{}", "Style models (loaded automatically):".bold());
    for model in catalog::MODELS {
        if model.role != ModelRole::Recognition {
            println!(
                "  {:16} {:>6} MB  {}",
                model.name.green(),
                model.size_mb,
                model.description
            );
        }
    }
    println!();
    println!("Recognition models are looked up in {}", model_cache_dir().display());
}

fn check_dependencies() -> Result<()> {
    let mut ok = true;

    match std::process::Command::new("ffmpeg").arg("-version").output() {
        Ok(out) if out.status.success() => {
            println!("{} ffmpeg found", "✓".green());
        }
        _ => {
            ok = false;
            println!("{} ffmpeg not found (needed for non-WAV media)", "✗".red());
            println!("  Ubuntu/Debian: sudo apt install ffmpeg");
        }
    }

    let cache = model_cache_dir();
    let mut any_model = false;
    for model in catalog::models_for_role(ModelRole::Recognition) {
        if cache.join(model.hf_filename).exists() {
            println!("{} model {} installed", "✓".green(), model.name);
            any_model = true;
        }
    }
    if !any_model {
        ok = false;
        println!("{} no recognition model in {}", "✗".red(), cache.display());
        println!("  Download a ggml Whisper model, e.g.:");
        println!("  curl -Lo {}/ggml-large-v3.bin \\", cache.display());
        println!("    https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin");
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Resolve a model name or path to a ggml file on disk.
fn resolve_model(model: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(model);
    if direct.exists() {
        return Ok(direct);
    }

    let Some(info) = catalog::get_model(model) else {
        bail!(
            "Unknown model '{}'. Run `cantosub models` for the list, or pass a path to a ggml file.",
            model
        );
    };

    let candidates = [
        model_cache_dir().join(info.hf_filename),
        PathBuf::from("models").join(info.hf_filename),
    ];
    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }

    bail!(
        "Model '{}' is not installed. Expected {}. Run `cantosub check` for download instructions.",
        model,
        candidates[0].display()
    )
}

/// Style backend wiring the rewrite and translation models when available.
struct LocalStyleBackend {
    dictionary_only: bool,
    disable_script_normalization: bool,
}

impl StyleBackend for LocalStyleBackend {
    fn load(&self) -> cantosub::Result<StyleEngine> {
        let mut engine = StyleEngine::new();

        if self.disable_script_normalization {
            engine = engine.with_normalizer(None);
        }

        if self.dictionary_only {
            return Ok(engine);
        }

        #[cfg(feature = "llm")]
        {
            use cantosub::style::llm::QwenLlm;
            use cantosub::style::mt::MarianTranslator;

            let qwen = catalog::models_for_role(ModelRole::Rewrite)
                .next()
                .map(|info| QwenLlm::load(info.hf_repo, info.hf_filename));
            match qwen {
                Some(Ok(llm)) => engine = engine.with_llm(Box::new(llm)),
                Some(Err(e)) => eprintln!("cantosub: rewrite model unavailable: {e}"),
                None => {}
            }

            let marian = catalog::models_for_role(ModelRole::Translation)
                .next()
                .map(|info| MarianTranslator::load(info.hf_repo));
            match marian {
                Some(Ok(mt)) => engine = engine.with_mt(Box::new(mt)),
                Some(Err(e)) => eprintln!("cantosub: translation model unavailable: {e}"),
                None => {}
            }
        }

        Ok(engine)
    }
}

fn run_pipeline(cli: Cli, media: PathBuf) -> Result<()> {
    if !media.exists() {
        bail!("Media file not found: {}", media.display());
    }
    if !is_supported_media(&media) {
        bail!("Unsupported media format: {}", media.display());
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?
        .with_env_overrides();

    // CLI flags override the config file
    if let Some(model) = cli.model {
        config.asr.model = model;
    }
    if let Some(language) = cli.language {
        config.asr.language = language;
    }
    if let Some(register) = cli.register {
        config.style.options.register = register.into();
    }
    if let Some(english) = cli.english {
        config.style.options.english = english.into();
    }
    if let Some(numerals) = cli.numerals {
        config.style.options.numerals = numerals.into();
    }
    if let Some(vocabulary) = cli.vocabulary {
        config.asr.custom_vocabulary = Some(vocabulary);
    }
    if let Some(max_gap) = cli.max_gap {
        config.merge.max_gap = max_gap;
    }
    if !cli.formats.is_empty() {
        config.export.formats = cli.formats.clone();
    }
    if let Some(output) = cli.output {
        config.export.output_dir = Some(output);
    }
    if cli.dictionary_only {
        config.style.dictionary_only = true;
    }

    let formats = parse_formats(&config.export.formats)?;
    let output_dir = config
        .export
        .output_dir
        .clone()
        .or_else(|| media.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let model_path = resolve_model(&config.asr.model)?;

    let options = PipelineOptions {
        language: config.asr.language.clone(),
        custom_vocabulary: config.asr.custom_vocabulary.clone(),
        max_gap: config.merge.max_gap,
        style: config.style.options,
        formats,
        output_dir,
    };

    let vad_config = VadConfig {
        speech_threshold: config.merge.vad_threshold,
        min_silence_ms: config.merge.min_silence_ms,
        min_speech_ms: config.merge.min_speech_ms,
        speech_pad_ms: config.merge.speech_pad_ms,
    };

    let orchestrator = Orchestrator::new(
        Box::new(AudioExtractor::new()),
        Box::new(EnergyVad::new(vad_config)),
        Box::new(WhisperBackend {
            config: WhisperConfig {
                model_path,
                threads: config.asr.threads,
            },
        }),
        Box::new(LocalStyleBackend {
            dictionary_only: config.style.dictionary_only,
            disable_script_normalization: config.style.disable_script_normalization,
        }),
        options,
    );

    let handle = orchestrator.start(media);

    let progress = if cli.quiet {
        None
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.green} {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    };

    let progress_rx = handle.progress().clone();
    let drain = std::thread::spawn(move || {
        for update in progress_rx.iter() {
            if let Some(bar) = &progress {
                bar.set_position(update.percent as u64);
                bar.set_message(update.label().to_string());
            }
        }
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
    });

    let outcome = handle.wait();
    drain.join().ok();

    match outcome {
        RunOutcome::Done { output_paths } => {
            for path in &output_paths {
                println!("{} {}", "wrote".green(), path.display());
            }
            Ok(())
        }
        RunOutcome::Cancelled => {
            eprintln!("{}", "cancelled".yellow());
            std::process::exit(130);
        }
        RunOutcome::Failed(e) => {
            bail!("{e}");
        }
    }
}

fn parse_formats(names: &[String]) -> Result<Vec<SubtitleFormat>> {
    let mut formats = Vec::new();
    for name in names {
        let format = SubtitleFormat::parse(name)
            .with_context(|| format!("unknown subtitle format '{name}'"))?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        formats.push(SubtitleFormat::Srt);
    }
    Ok(formats)
}
