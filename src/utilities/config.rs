use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_MAX_SIZE: u32 = 4096;
const DEFAULT_OUTPUT_DIR: &str = "static/collages";
const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { name, value } => write!(f, "invalid value for {name}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    pub max_width: u32,
    pub max_height: u32,
    pub output_dir: PathBuf,
    pub jpeg_quality: u8,
    pub font: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_SIZE,
            max_height: DEFAULT_MAX_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            font: None,
            user_agent: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// builds the config from `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            max_width: parse(&lookup, "COLLAGE_MAX_WIDTH", defaults.max_width)?,
            max_height: parse(&lookup, "COLLAGE_MAX_HEIGHT", defaults.max_height)?,
            output_dir: lookup("COLLAGE_OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from),
            jpeg_quality: parse(&lookup, "COLLAGE_JPEG_QUALITY", defaults.jpeg_quality)?,
            font: lookup("COLLAGE_FONT").map(PathBuf::from),
            user_agent: lookup("USER_AGENT"),
        };

        if !(1..=100).contains(&config.jpeg_quality) {
            return Err(ConfigError::Invalid {
                name: "COLLAGE_JPEG_QUALITY",
                value: config.jpeg_quality.to_string(),
            });
        }

        for (name, value) in
            [("COLLAGE_MAX_WIDTH", config.max_width), ("COLLAGE_MAX_HEIGHT", config.max_height)]
        {
            if value == 0 {
                return Err(ConfigError::Invalid { name, value: value.to_string() });
            }
        }

        log::debug!("loaded config: {config:?}");
        Ok(config)
    }
}

fn parse<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
