//! Report projector: maps listed companies into fixed-order tabular rows
//! and encodes them as an xlsx workbook in memory.

use models::company::Model;
use rust_xlsxwriter::{Format, Workbook};

use crate::errors::ServiceError;

pub const REPORT_FILENAME: &str = "empresas.xlsx";
pub const REPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Column order is part of the report contract.
pub const REPORT_COLUMNS: [&str; 4] = ["name", "impactLevel", "yearsOfExperience", "category"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub impact_level: &'static str,
    pub years_of_experience: i32,
    pub category: String,
}

/// One row per record, in the given (already filtered/sorted) order.
pub fn project(companies: &[Model]) -> Vec<ReportRow> {
    companies
        .iter()
        .map(|c| ReportRow {
            name: c.name.clone(),
            impact_level: c.impact_level.as_str(),
            years_of_experience: c.years_of_experience,
            category: c.category.clone(),
        })
        .collect()
}

/// Encode the projected rows as an xlsx byte buffer (header row first).
pub fn build_xlsx(companies: &[Model]) -> Result<Vec<u8>, ServiceError> {
    let rows = project(companies);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Empresas")
        .map_err(|e| ServiceError::Report(e.to_string()))?;

    let bold = Format::new().set_bold();
    for (col, header) in REPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| ServiceError::Report(e.to_string()))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet
            .write_string(r, 0, &row.name)
            .and_then(|ws| ws.write_string(r, 1, row.impact_level))
            .and_then(|ws| ws.write_number(r, 2, row.years_of_experience as f64))
            .and_then(|ws| ws.write_string(r, 3, &row.category))
            .map_err(|e| ServiceError::Report(e.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServiceError::Report(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::company::ImpactLevel;
    use uuid::Uuid;

    fn mk(name: &str, level: ImpactLevel, years: i32, category: &str) -> Model {
        let now = Utc::now().into();
        Model {
            id: Uuid::new_v4(),
            name: name.into(),
            impact_level: level,
            years_of_experience: years,
            category: category.into(),
            status: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn projects_one_row_per_record_in_order() {
        let companies = vec![
            mk("Acme", ImpactLevel::High, 30, "Tech"),
            mk("Burgers SA", ImpactLevel::Low, 0, "Food"),
        ];
        let rows = project(&companies);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Acme");
        assert_eq!(rows[0].impact_level, "High");
        assert_eq!(rows[1].years_of_experience, 0);
        assert_eq!(rows[1].category, "Food");
    }

    #[test]
    fn column_contract_is_fixed() {
        assert_eq!(REPORT_COLUMNS, ["name", "impactLevel", "yearsOfExperience", "category"]);
        assert_eq!(REPORT_FILENAME, "empresas.xlsx");
    }

    #[test]
    fn xlsx_buffer_is_a_zip_container() {
        let companies = vec![mk("Acme", ImpactLevel::Medium, 12, "Tech")];
        let bytes = build_xlsx(&companies).expect("encode xlsx");
        // xlsx files are ZIP archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_result_set_still_produces_a_workbook() {
        let bytes = build_xlsx(&[]).expect("encode empty xlsx");
        assert_eq!(&bytes[..2], b"PK");
    }
}
