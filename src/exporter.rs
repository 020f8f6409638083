use crate::collector::Lead;
use crate::error::ExportError;
use chrono::Local;
use log::info;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::path::{Path, PathBuf};

pub const COLUMNS: [&str; 4] = ["Name", "Email", "Phone", "LinkedIn"];
const SHEET_NAME: &str = "Leads";

/// Paths of one saved run plus the timestamp baked into their names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub spreadsheet: PathBuf,
    pub delimited: PathBuf,
    pub timestamp: String,
}

impl SavedFiles {
    pub fn paths(&self) -> Vec<String> {
        vec![
            self.spreadsheet.display().to_string(),
            self.delimited.display().to_string(),
        ]
    }
}

pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Exporter {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `leads` as `.xlsx` and `.csv` named after the query and the
    /// current minute.
    pub fn save(&self, leads: &[Lead], title: &str, area: &str) -> Result<SavedFiles, ExportError> {
        self.save_at(leads, title, area, &run_timestamp())
    }

    pub fn save_at(
        &self,
        leads: &[Lead],
        title: &str,
        area: &str,
        timestamp: &str,
    ) -> Result<SavedFiles, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ExportError::Io {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let base = base_filename(title, area, timestamp);
        let spreadsheet = self.output_dir.join(format!("{}.xlsx", base));
        let delimited = self.output_dir.join(format!("{}.csv", base));

        write_xlsx(&spreadsheet, leads)?;
        write_csv(&delimited, leads)?;

        info!("Saved {} leads to {:?} and {:?}", leads.len(), spreadsheet, delimited);
        Ok(SavedFiles {
            spreadsheet,
            delimited,
            timestamp: timestamp.to_string(),
        })
    }
}

pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M").to_string()
}

/// `<title>_<area>_<timestamp>` with whitespace and path separators turned
/// into underscores.
pub fn base_filename(title: &str, area: &str, timestamp: &str) -> String {
    format!("{}_{}_{}", title, area, timestamp)
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

fn write_csv(path: &Path, leads: &[Lead]) -> Result<(), ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(COLUMNS).map_err(csv_err)?;
    for lead in leads {
        writer
            .write_record([
                lead.name.as_str(),
                lead.email.as_str(),
                lead.phone_or_marker(),
                lead.profile_link.as_str(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_xlsx(path: &Path, leads: &[Lead]) -> Result<(), ExportError> {
    let xlsx_err = |e: XlsxError| ExportError::Xlsx {
        path: path.to_path_buf(),
        source: e,
    };

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_err)?;
    for (col, title) in COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(xlsx_err)?;
    }

    for (i, lead) in leads.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, lead.name.as_str()).map_err(xlsx_err)?;
        sheet.write_string(row, 1, lead.email.as_str()).map_err(xlsx_err)?;
        sheet.write_string(row, 2, lead.phone_or_marker()).map_err(xlsx_err)?;
        sheet
            .write_string(row, 3, lead.profile_link.as_str())
            .map_err(xlsx_err)?;
    }

    workbook.save(path).map_err(xlsx_err)
}
