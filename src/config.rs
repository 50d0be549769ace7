//! Configuration surface (§6 / §2.1): CLI flags layered over an optional
//! `gir2ts.toml` project file, with explicit flags taking precedence over
//! whatever the project file sets.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Gjs,
    Node,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Gjs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Types,
    Lib,
}

impl Default for BuildType {
    fn default() -> Self {
        BuildType::Types
    }
}

/// Fully-resolved settings for a run: CLI flags take precedence over
/// whatever a `gir2ts.toml` file supplied.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub environment: Environment,
    pub build_type: BuildType,
    pub inheritance: bool,
    pub outdir: PathBuf,
    pub gir_directories: Vec<PathBuf>,
    pub verbose: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            build_type: BuildType::default(),
            inheritance: false,
            outdir: PathBuf::from("."),
            gir_directories: Vec::new(),
            verbose: false,
        }
    }
}

/// The on-disk shape of `gir2ts.toml`; every field is optional so a
/// partial file only overrides the settings it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfigFile {
    pub environment: Option<Environment>,
    pub build_type: Option<BuildType>,
    pub inheritance: Option<bool>,
    #[serde(default)]
    pub gir_directories: Vec<PathBuf>,
}

impl ProjectConfigFile {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn apply_defaults(&self, config: &mut GeneratorConfig) {
        if let Some(env) = self.environment {
            config.environment = env;
        }
        if let Some(bt) = self.build_type {
            config.build_type = bt;
        }
        if let Some(inh) = self.inheritance {
            config.inheritance = inh;
        }
        if !self.gir_directories.is_empty() {
            config.gir_directories = self.gir_directories.clone();
        }
    }
}
