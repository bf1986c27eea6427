//! Configuração do reconciliador carregada a partir de `reconcile.toml`.
//!
//! A struct [`ReconcileConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `RECONCILE_CASE_PASSWORD` tem precedência sobre o
//! arquivo para a senha da API de casos.
//!
//! Antes da execução a configuração é congelada em um [`RunConfig`], que é
//! passado explicitamente a cada componente.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::enrichment::lookup::DISABLED_SENTINEL;
use crate::retry::RetryPolicy;

/// Nome do arquivo procurado no diretório atual.
pub const DEFAULT_CONFIG_FILE: &str = "reconcile.toml";

/// Variável de ambiente com a senha da API de casos.
pub const PASSWORD_ENV: &str = "RECONCILE_CASE_PASSWORD";

/// Categoria exibida para itens pendentes quando não está em modo debug.
pub const ENRICHED_CATEGORY: &str = "Final Planning Package";

/// Configuração de nível superior carregada de `reconcile.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Janela, em horas, em que uma extração conta como bem-sucedida.
    #[serde(default = "default_success_hours_threshold")]
    pub success_hours_threshold: u32,

    /// Tentativas por listagem de pasta antes de desistir.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Atraso fixo, em segundos, entre tentativas.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Modo debug: desativa a consulta de casos e processa apenas `debug_container`.
    #[serde(default)]
    pub debug: bool,

    /// Único contêiner processado em modo debug.
    #[serde(default)]
    pub debug_container: Option<String>,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Acesso à API de gestão de casos.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
    /// Nó do caso consultado em `/api/v1/nodes/{case_id}/output`.
    #[serde(default)]
    pub case_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Destino dos arquivos de relatório.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_report_name")]
    pub report_name: String,
}

// Valor padrão da janela de sucesso: 24 horas.
fn default_success_hours_threshold() -> u32 {
    24
}

// Valor padrão para tentativas: 10.
fn default_max_retries() -> u32 {
    10
}

// Valor padrão para o atraso entre tentativas: 60s.
fn default_retry_delay_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_environment() -> String {
    "UnknownEnv".to_string()
}

fn default_report_name() -> String {
    "reconciliation".to_string()
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: String::new(),
            case_id: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            environment: default_environment(),
            report_name: default_report_name(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            success_hours_threshold: default_success_hours_threshold(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            debug: false,
            debug_container: None,
            enrichment: EnrichmentConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl ReconcileConfig {
    /// Carrega a configuração do caminho informado, ou de `reconcile.toml`
    /// no diretório atual. Sem caminho explícito e sem arquivo, usa os padrões.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let contents = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config {}", p.display()))?;
                toml::from_str::<ReconcileConfig>(&contents)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                let contents = std::fs::read_to_string(DEFAULT_CONFIG_FILE)?;
                toml::from_str::<ReconcileConfig>(&contents)?
            }
            None => Self::default(),
        };

        // Variável de ambiente tem precedência sobre o arquivo para a senha.
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            if !password.is_empty() {
                config.enrichment.password = password;
            }
        }

        Ok(config)
    }

    /// Valida e congela a configuração para uma execução.
    pub fn run_config(&self) -> Result<RunConfig> {
        if self.max_retries == 0 {
            bail!("max_retries must be at least 1");
        }
        if self.debug && self.debug_container.as_deref().is_none_or(str::is_empty) {
            bail!("debug mode requires debug_container");
        }
        let lookups = self.enrichment.enabled && !self.debug;
        if lookups && (self.enrichment.base_url.is_empty() || self.enrichment.case_id.is_empty()) {
            bail!("enrichment is enabled but base_url or case_id is missing");
        }

        Ok(RunConfig {
            success_hours_threshold: f64::from(self.success_hours_threshold),
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_secs(self.retry_delay_secs),
            ),
            debug: self.debug,
            debug_container: self.debug_container.clone().filter(|_| self.debug),
            lookups_enabled: lookups,
        })
    }
}

/// Parâmetros imutáveis de uma execução.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub success_hours_threshold: f64,
    pub retry: RetryPolicy,
    pub debug: bool,
    /// Presente apenas em modo debug.
    pub debug_container: Option<String>,
    /// Consulta à API de casos ativa (desligada em modo debug).
    pub lookups_enabled: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            success_hours_threshold: f64::from(default_success_hours_threshold()),
            retry: RetryPolicy::default(),
            debug: false,
            debug_container: None,
            lookups_enabled: false,
        }
    }
}

impl RunConfig {
    /// Indica se o contêiner entra na execução (filtro do modo debug).
    pub fn includes_container(&self, name: &str) -> bool {
        match &self.debug_container {
            Some(only) => only.eq_ignore_ascii_case(name),
            None => true,
        }
    }

    /// Valor da coluna "Enriched Category" para itens pendentes.
    pub fn enriched_category(&self) -> &'static str {
        if self.debug {
            DISABLED_SENTINEL
        } else {
            ENRICHED_CATEGORY
        }
    }
}
