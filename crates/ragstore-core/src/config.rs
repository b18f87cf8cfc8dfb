//! Configuration loading and the typed parameter blocks used across the
//! pipeline.
//!
//! Figment merges `config.toml`, an optional `config.<env>.toml` selected
//! by `RUST_ENV`, and `RAGSTORE_*` environment variables. Each typed block
//! carries its defaults and a `validate` method; invalid values are
//! rejected at load time, never clamped.

use std::env;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("RAGSTORE_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::Config(format!("failed to get '{key}': {e}")))
    }

    /// Like [`Config::get`] but falls back to `default` when the key is
    /// absent from every merged source.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment.extract_inner(key).unwrap_or(default)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. If `p` is absolute, it is returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

/// Chunk sizing in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Per-signal weights applied during rank fusion. Weights need not sum
/// to one; only their ratio matters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub lexical: f32,
    pub semantic: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            lexical: 0.38,
            semantic: 0.62,
        }
    }
}

impl FusionWeights {
    pub fn new(lexical: f32, semantic: f32) -> Result<Self> {
        let weights = Self { lexical, semantic };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("lexical", self.lexical), ("semantic", self.semantic)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "fusion weight '{name}' must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Query-time parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result list length requested from each signal and from fusion.
    pub k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { k: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// HTTP embedding service speaking the OpenAI embeddings protocol.
    Remote,
    /// Deterministic local embedder for tests and offline smoke runs.
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key
    /// itself never appears in config files.
    pub api_key_env: String,
    pub dim: usize,
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Remote,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "RAGSTORE_EMBED_API_KEY".to_string(),
            dim: 1536,
            timeout_ms: 30_000,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(Error::Config("embedding dim must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_dir: String,
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_dir: "./data/lancedb".to_string(),
            table: "chunks".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_defaults_are_valid() {
        let cfg = ChunkingConfig::default();
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.chunk_overlap, 200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn chunking_rejects_overlap_not_smaller_than_size() {
        let cfg = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn chunking_rejects_zero_size() {
        let cfg = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fusion_defaults_favor_semantic() {
        let w = FusionWeights::default();
        assert!((w.lexical - 0.38).abs() < f32::EPSILON);
        assert!((w.semantic - 0.62).abs() < f32::EPSILON);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn fusion_rejects_negative_weight() {
        assert!(FusionWeights::new(-0.1, 0.5).is_err());
    }

    #[test]
    fn fusion_rejects_non_finite_weight() {
        assert!(FusionWeights::new(f32::NAN, 0.5).is_err());
        assert!(FusionWeights::new(0.5, f32::INFINITY).is_err());
    }

    #[test]
    fn expand_path_handles_plain_relative() {
        assert_eq!(expand_path("data/db"), PathBuf::from("data/db"));
    }

    #[test]
    fn resolve_with_base_keeps_absolute() {
        let base = Path::new("/srv/app");
        assert_eq!(resolve_with_base(base, "/var/db"), PathBuf::from("/var/db"));
        assert_eq!(
            resolve_with_base(base, "data/db"),
            PathBuf::from("/srv/app/data/db")
        );
    }
}
