use crate::core::format::DateStyle;
use crate::core::{exporter, importer, Storage, Store};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;
use tracing::Instrument;

/// One unit of work for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    ImportClients { file: String },
    ImportInvoices { file: String },
    ImportProducts { file: String },
    ExportClients { after: NaiveDateTime, out: String },
    ExportProducts { min_name_length: usize, out: String },
}

impl Job {
    /// Short name used as the `kind` field of the job span.
    pub fn kind(&self) -> &'static str {
        match self {
            Job::ImportClients { .. } => "import_clients",
            Job::ImportInvoices { .. } => "import_invoices",
            Job::ImportProducts { .. } => "import_products",
            Job::ExportClients { .. } => "export_clients",
            Job::ExportProducts { .. } => "export_products",
        }
    }
}

/// What a finished job produced: an import report or the written export.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Imported { report: String },
    Exported { path: String, bytes: usize },
}

pub struct EtlEngine<S: Store, F: Storage> {
    store: S,
    input: F,
    output: F,
    date_style: DateStyle,
}

impl<S: Store, F: Storage> EtlEngine<S, F> {
    pub fn new(store: S, input: F, output: F, date_style: DateStyle) -> Self {
        Self {
            store,
            input,
            output,
            date_style,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn run(&self, job: &Job) -> Result<JobOutcome> {
        let span = tracing::info_span!("job", kind = job.kind());
        self.dispatch(job).instrument(span).await
    }

    async fn dispatch(&self, job: &Job) -> Result<JobOutcome> {
        tracing::info!("Starting job: {:?}", job);

        let outcome = match job {
            Job::ImportClients { file } => {
                let xml = self.read_text(file).await?;
                JobOutcome::Imported {
                    report: importer::import_clients(&self.store, &xml).await?,
                }
            }
            Job::ImportInvoices { file } => {
                let json = self.read_text(file).await?;
                JobOutcome::Imported {
                    report: importer::import_invoices(&self.store, &json).await?,
                }
            }
            Job::ImportProducts { file } => {
                let json = self.read_text(file).await?;
                JobOutcome::Imported {
                    report: importer::import_products(&self.store, &json).await?,
                }
            }
            Job::ExportClients { after, out } => {
                let xml =
                    exporter::export_clients_with_invoices(&self.store, *after, self.date_style)
                        .await?;
                self.write_text(out, &xml).await?
            }
            Job::ExportProducts {
                min_name_length,
                out,
            } => {
                let json = exporter::export_products_with_most_clients(&self.store, *min_name_length)
                    .await?;
                self.write_text(out, &json).await?
            }
        };

        tracing::info!("Job finished");
        Ok(outcome)
    }

    async fn read_text(&self, file: &str) -> Result<String> {
        let data = self.input.read_file(file).await?;
        String::from_utf8(data).map_err(|e| EtlError::ProcessingError {
            message: format!("{} is not valid UTF-8: {}", file, e),
        })
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<JobOutcome> {
        self.output.write_file(path, content.as_bytes()).await?;
        Ok(JobOutcome::Exported {
            path: path.to_string(),
            bytes: content.len(),
        })
    }
}
