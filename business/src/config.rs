use std::any::Any;

use anyhow::{Context as _, bail};
use mapconsole_states::{State, state_assign_impl};
use serde::Deserialize;

use crate::maps::api::maps_url;
use crate::maps::params::DEFAULT_PAGE_SIZE;

pub const DEFAULT_MAPS_PATH: &str = "/management/maps";
pub const DEFAULT_FONT_PATH: &str = "assets/fonts/SourceHanSerifCN-VF.ttf";
const MAX_PAGE_SIZE: u32 = 100;

/// Environment variables as read, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    maps_path: Option<String>,
    page_size: Option<u32>,
    font_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    /// Empty on web: requests go to the serving origin.
    pub api_base_url: String,
    pub maps_path: String,
    pub page_size: u32,
    /// CJK font for the native UI.
    pub font_path: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: if cfg!(target_arch = "wasm32") {
                String::new()
            } else {
                "http://localhost:8080".to_owned()
            },
            maps_path: DEFAULT_MAPS_PATH.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            font_path: DEFAULT_FONT_PATH.to_owned(),
        }
    }
}

impl BusinessConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Read `API_BASE_URL`, `MAPS_PATH`, `PAGE_SIZE` and `FONT_PATH` from
    /// the process environment. Unset variables keep their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, S>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let raw: RawConfig =
            serde_env::from_iter(vars).context("failed to read configuration from environment")?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let api_base_url = match raw.api_base_url {
            Some(url) => {
                let url = url.trim().trim_end_matches('/').to_owned();
                if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                    bail!("API_BASE_URL must start with http:// or https://, got {url:?}");
                }
                url
            }
            None => defaults.api_base_url,
        };

        let maps_path = match raw.maps_path {
            Some(path) if path.trim().is_empty() => bail!("MAPS_PATH must not be empty"),
            Some(path) => format!("/{}", path.trim().trim_start_matches('/')),
            None => defaults.maps_path,
        };

        let page_size = raw.page_size.unwrap_or(defaults.page_size);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            bail!("PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {page_size}");
        }

        Ok(Self {
            api_base_url,
            maps_path,
            page_size,
            font_path: raw.font_path.unwrap_or(defaults.font_path),
        })
    }

    pub fn maps_url(&self) -> String {
        maps_url(&self.api_base_url, &self.maps_path)
    }
}

impl State for BusinessConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
