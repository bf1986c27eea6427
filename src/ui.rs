//! Interface de terminal do reconciliador: spinner e resumo colorido.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`RunProgress`] acompanha visualmente a
//! execução, contêiner a contêiner.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::report::html::Band;
use crate::report::{Report, WrittenReport};

/// Indicador visual de progresso para uma execução no terminal.
pub struct RunProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl RunProgress {
    /// Inicia o spinner. Fica oculto quando `visible` é falso (saída não interativa).
    pub fn start(visible: bool) -> Self {
        let pb = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Connecting to content store...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow().bold(),
        }
    }

    /// Atualiza a mensagem com o contêiner em processamento.
    pub fn container(&self, name: &str) {
        self.pb.set_message(format!("Processing {name}"));
    }

    /// Finaliza o spinner e imprime o resumo da execução.
    pub fn finish(&self, report: &Report) {
        self.pb.finish_and_clear();
        let stats = &report.summary;

        println!(
            "  {} Successful (last {}h): {}",
            self.green.apply_to("✓"),
            report.threshold_hours,
            stats.total_successful
        );
        println!("  Total pending: {}", stats.total_pending);
        println!("    Assembled:          {}", stats.assembled);
        println!("    Sent to FAO:        {}", stats.sent_to_fao);
        println!("    FCMP WO Status Set: {}", stats.fcmp_set);
        println!("    CLSD WO Status Set: {}", stats.clsd_set);

        let style = match Band::for_hours(stats.average_pending_hours) {
            Band::Green => &self.green,
            Band::Yellow => &self.yellow,
            Band::Red => &self.red,
        };
        println!(
            "  Average pending: {}",
            style.apply_to(format!("{:.2} hours", stats.average_pending_hours))
        );

        if report.skipped_items > 0 {
            println!(
                "  {} {} item(s) skipped for missing fields",
                self.yellow.apply_to("!"),
                report.skipped_items
            );
        }
        for container in &report.failed_containers {
            println!("  {} Container failed: {container}", self.red.apply_to("✗"));
        }
    }

    /// Imprime os caminhos dos arquivos gerados.
    pub fn written(&self, written: &WrittenReport) {
        println!("  CSV:  {}", written.csv.display());
        println!("  HTML: {}", written.html.display());
    }

    /// Finaliza o spinner com uma mensagem de falha.
    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }
}
