use std::env;
use std::path::PathBuf;

/// Runtime configuration, loaded from the environment with sensible defaults
/// so a bare `cargo run` serves out of `./data`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for blob files, upload spool and the catalog snapshot.
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    /// Slug of the video the hero slider pins before everything else.
    pub primary_hero_slug: String,
    /// Static video reference used when no pinned hero video exists.
    /// Setting `HERO_FALLBACK_URL` to an empty string disables the fallback
    /// slide entirely.
    pub hero_fallback_url: Option<String>,
    pub section_cache_ttl_secs: u64,
}

pub const DEFAULT_PRIMARY_HERO_SLUG: &str = "hero-lonier-video";
pub const DEFAULT_HERO_FALLBACK_URL: &str = "/static/hero-fallback.mp4";

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let data_dir =
            PathBuf::from(env::var("MEDIA_DATA_DIR").unwrap_or_else(|_| "./data".to_string()));
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;
        let primary_hero_slug = env::var("PRIMARY_HERO_SLUG")
            .unwrap_or_else(|_| DEFAULT_PRIMARY_HERO_SLUG.to_string());
        let hero_fallback_url = match env::var("HERO_FALLBACK_URL") {
            Ok(url) if url.is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => Some(DEFAULT_HERO_FALLBACK_URL.to_string()),
        };
        let section_cache_ttl_secs: u64 = env::var("SECTION_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        Ok(AppConfig {
            data_dir,
            bind_addr,
            port,
            primary_hero_slug,
            hero_fallback_url,
            section_cache_ttl_secs,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("./data"),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            primary_hero_slug: DEFAULT_PRIMARY_HERO_SLUG.to_string(),
            hero_fallback_url: Some(DEFAULT_HERO_FALLBACK_URL.to_string()),
            section_cache_ttl_secs: 30,
        }
    }
}
