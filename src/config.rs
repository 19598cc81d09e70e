// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::chart;
use anyhow::{Context, Result};
use std::env;
use url::Url;

/// Chart source configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Helm repository serving the chart releases
    pub chart_repository: Url,
    pub chart_name: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to the public k8ssandra repository
    pub fn from_env() -> Result<Self> {
        let repository =
            env::var("K8SSANDRA_CHART_REPO").unwrap_or_else(|_| chart::DEFAULT_REPOSITORY.to_string());
        let chart_name =
            env::var("K8SSANDRA_CHART_NAME").unwrap_or_else(|_| chart::DEFAULT_NAME.to_string());

        Self::new(&repository, chart_name)
    }

    pub fn new(repository: &str, chart_name: impl Into<String>) -> Result<Self> {
        let chart_repository = Url::parse(repository)
            .with_context(|| format!("K8SSANDRA_CHART_REPO is not a valid URL: {}", repository))?;

        Ok(Config {
            chart_repository,
            chart_name: chart_name.into(),
        })
    }
}
