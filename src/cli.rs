//! Interface de linha de comando do reconciliador baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, check, zones)
//! e flags globais (--config, --threshold, --max-retries, --retry-delay,
//! --offline, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Reconcilia o inventário de conteúdo com o sistema de gestão de casos.
#[derive(Debug, Parser)]
#[command(name = "reconcile", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./reconcile.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Janela de sucesso em horas.
    #[arg(long, global = true)]
    pub threshold: Option<u32>,

    /// Número máximo de tentativas por listagem de pasta.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Atraso fixo entre tentativas, em segundos.
    #[arg(long, global = true)]
    pub retry_delay: Option<u64>,

    /// Desativa a consulta à API de casos.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa a reconciliação e grava o relatório CSV/HTML.
    Run {
        /// Exportação JSON do inventário.
        #[arg(long)]
        snapshot: PathBuf,

        /// Diretório de saída (sobrepõe `report.output_dir`).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Executa a reconciliação e mostra apenas o resumo, sem gravar arquivos.
    Check {
        /// Exportação JSON do inventário.
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Lista as descrições de fuso horário reconhecidas.
    Zones,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_subcommand() {
        let cli = Cli::parse_from(["reconcile", "run", "--snapshot", "inventory.json"]);
        match cli.command {
            Command::Run { snapshot, output } => {
                assert_eq!(snapshot, PathBuf::from("inventory.json"));
                assert!(output.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "reconcile",
            "--threshold",
            "48",
            "--max-retries",
            "5",
            "--retry-delay",
            "2",
            "--offline",
            "--verbose",
            "check",
            "--snapshot",
            "inv.json",
        ]);
        assert!(cli.verbose);
        assert!(cli.offline);
        assert_eq!(cli.threshold, Some(48));
        assert_eq!(cli.max_retries, Some(5));
        assert_eq!(cli.retry_delay, Some(2));
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn cli_requires_snapshot_for_run() {
        assert!(Cli::try_parse_from(["reconcile", "run"]).is_err());
    }

    #[test]
    fn cli_parses_zones() {
        let cli = Cli::parse_from(["reconcile", "zones"]);
        assert!(matches!(cli.command, Command::Zones));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
