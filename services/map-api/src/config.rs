//! Map API configuration.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct MapApiConfig {
    /// Equirectangular world image to render from
    pub image_path: PathBuf,

    /// Integer factor the source image is shrunk by at startup
    pub downscale_factor: u32,

    /// Width used when a request names neither width nor height
    pub default_render_width: usize,

    /// Largest accepted width or height
    pub max_render_dimension: usize,

    /// Number of view lookup tables kept in memory
    pub lut_cache_capacity: usize,

    /// Total bytes the cached lookup tables may occupy; a single table
    /// larger than this is built per request and never cached
    pub lut_cache_max_bytes: usize,
}

impl Default for MapApiConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("assets/world.jpg"),
            downscale_factor: 3,
            default_render_width: 1024,
            max_render_dimension: 4096,
            lut_cache_capacity: 16,
            lut_cache_max_bytes: 256 * 1024 * 1024,
        }
    }
}

impl MapApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to
    /// defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            image_path: lookup("MAP_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.image_path),
            downscale_factor: parse_or(&lookup, "MAP_DOWNSCALE_FACTOR", defaults.downscale_factor)?,
            default_render_width: parse_or(
                &lookup,
                "DEFAULT_RENDER_WIDTH",
                defaults.default_render_width,
            )?,
            max_render_dimension: parse_or(
                &lookup,
                "MAX_RENDER_DIMENSION",
                defaults.max_render_dimension,
            )?,
            lut_cache_capacity: parse_or(&lookup, "LUT_CACHE_CAPACITY", defaults.lut_cache_capacity)?,
            lut_cache_max_bytes: parse_or(
                &lookup,
                "LUT_CACHE_MAX_BYTES",
                defaults.lut_cache_max_bytes,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.downscale_factor >= 1, "MAP_DOWNSCALE_FACTOR must be at least 1");
        anyhow::ensure!(self.max_render_dimension >= 1, "MAX_RENDER_DIMENSION must be at least 1");
        anyhow::ensure!(
            (1..=self.max_render_dimension).contains(&self.default_render_width),
            "DEFAULT_RENDER_WIDTH must be between 1 and MAX_RENDER_DIMENSION"
        );
        anyhow::ensure!(self.lut_cache_capacity >= 1, "LUT_CACHE_CAPACITY must be at least 1");
        anyhow::ensure!(self.lut_cache_max_bytes >= 1, "LUT_CACHE_MAX_BYTES must be at least 1");
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
