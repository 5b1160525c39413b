// src/table/write.rs

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::csv::WriterBuilder;
use chrono::Local;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use super::Table;
use crate::config::ExportFormat;
use crate::record::ValidationError;

/// One named sheet of the workbook.
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub name: &'a str,
    pub table: &'a Table,
    pub errors: &'a [ValidationError],
}

impl<'a> Sheet<'a> {
    pub fn new(name: &'a str, table: &'a Table, errors: &'a [ValidationError]) -> Self {
        Self {
            name,
            table,
            errors,
        }
    }
}

/// Write every sheet under `dir`, stamped `<name>_<YYYY-MM-DD>`.
///
/// - Xlsx: one `<stem>.xlsx` with a worksheet per sheet, plus
///   `<stem>_errors.json` beside it. Returns the workbook file.
/// - Parquet / Csv: a `<stem>/` directory holding `<sheet>.parquet` or
///   `<sheet>.csv` and `errors.json`. Returns the directory.
///
/// Every sheet starts with an `index` row-label column. The error report maps
/// sheet name → list of soft-error messages.
pub fn write_workbook<P: AsRef<Path>>(
    dir: P,
    name: &str,
    format: ExportFormat,
    sheets: &[Sheet<'_>],
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let stem = format!("{}_{}", name, Local::now().format("%Y-%m-%d"));
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {:?}", dir))?;

    if format == ExportFormat::Xlsx {
        let path = dir.join(format!("{}.xlsx", stem));
        write_xlsx(&path, sheets)?;
        write_errors(&dir.join(format!("{}_errors.json", stem)), sheets)?;
        info!(sheets = sheets.len(), path = %path.display(), "wrote workbook");
        return Ok(path);
    }

    let out_dir = dir.join(&stem);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating workbook directory {:?}", &out_dir))?;

    for sheet in sheets {
        let path = out_dir.join(format!("{}.{}", sheet.name, format.extension()));
        write_sheet(&path, sheet.table, format)?;
        info!(sheet = sheet.name, rows = sheet.table.num_rows(), path = %path.display(), "wrote sheet");
    }

    write_errors(&out_dir.join("errors.json"), sheets)?;
    Ok(out_dir)
}

fn write_xlsx(path: &Path, sheets: &[Sheet<'_>]) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let batch = sheet.table.with_row_index()?;
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet.name)
            .with_context(|| format!("naming worksheet {:?}", sheet.name))?;

        for (col, field) in batch.schema().fields().iter().enumerate() {
            worksheet.write_string(0, col as u16, field.name())?;
        }
        for (col, array) in batch.columns().iter().enumerate() {
            write_cells(worksheet, col as u16, array)
                .with_context(|| format!("writing column {} of {}", col, sheet.name))?;
        }
    }

    let tmp_path = path.with_extension("xlsx.tmp");
    workbook
        .save(&tmp_path)
        .with_context(|| format!("saving workbook {:?}", &tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

/// Fill one worksheet column below the header. Nulls stay blank.
fn write_cells(worksheet: &mut Worksheet, col: u16, array: &ArrayRef) -> Result<()> {
    if let Some(arr) = array.as_any().downcast_ref::<StringArray>() {
        for (row, value) in arr.iter().enumerate() {
            if let Some(v) = value {
                worksheet.write_string(row as u32 + 1, col, v)?;
            }
        }
    } else if let Some(arr) = array.as_any().downcast_ref::<Float64Array>() {
        for (row, value) in arr.iter().enumerate() {
            if let Some(v) = value {
                worksheet.write_number(row as u32 + 1, col, v)?;
            }
        }
    } else if let Some(arr) = array.as_any().downcast_ref::<UInt64Array>() {
        for (row, value) in arr.iter().enumerate() {
            if let Some(v) = value {
                worksheet.write_number(row as u32 + 1, col, v as f64)?;
            }
        }
    } else {
        bail!("unsupported column type {:?}", array.data_type());
    }
    Ok(())
}

fn write_sheet(path: &Path, table: &Table, format: ExportFormat) -> Result<()> {
    let batch = table.with_row_index()?;

    // Write to a temporary path first, then rename over the target
    let tmp_path = path.with_extension("tmp");
    let file = File::create(&tmp_path)
        .with_context(|| format!("creating sheet file {:?}", &tmp_path))?;

    match format {
        ExportFormat::Parquet => {
            let props = WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build();
            let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
                .context("creating Arrow writer for sheet")?;
            writer.write(&batch).context("writing sheet batch")?;
            writer.close().context("closing sheet writer")?;
        }
        ExportFormat::Xlsx => bail!("xlsx sheets are written together by write_xlsx"),
        ExportFormat::Csv => {
            let mut writer = WriterBuilder::new()
                .with_header(true)
                .build(BufWriter::new(file));
            writer.write(&batch).context("writing sheet CSV")?;
            writer.into_inner().flush().context("flushing sheet CSV")?;
        }
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

fn write_errors(path: &Path, sheets: &[Sheet<'_>]) -> Result<()> {
    let report: BTreeMap<&str, Vec<String>> = sheets
        .iter()
        .map(|s| (s.name, s.errors.iter().map(ToString::to_string).collect()))
        .collect();

    let tmp_path = path.with_extension("json.tmp");
    let mut tmp = File::create(&tmp_path)
        .with_context(|| format!("creating {:?}", &tmp_path))?;
    serde_json::to_writer_pretty(&mut tmp, &report).context("serializing error report")?;
    tmp.write_all(b"\n")?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{validate_info, CatalogRecord, Course, FieldMap, FieldValue, Program};
    use crate::table::{Columns, INDEX_COLUMN};
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use glob::glob;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn course(name: &str, department: Option<&str>) -> FieldMap {
        FieldMap::new()
            .with("Name", FieldValue::Text(Some(name.into())))
            .with("Faculty", FieldValue::Text(Some("Science".into())))
            .with("Department", FieldValue::Text(department.map(Into::into)))
            .with("Level", FieldValue::Text(Some("Undergraduate".into())))
            .with("Credits", FieldValue::Number(3.0))
    }

    fn courses() -> (Table, Vec<ValidationError>) {
        let rows = [
            course("COMP 202 (3 credits)", Some("Computer Science")),
            course("COMP 250 (3 credits)", None),
            course("MATH 133 (3 credits)", Some("Mathematics")),
        ];
        let mut cols = Columns::for_record::<Course>();
        let mut errors = Vec::new();
        for row in &rows {
            if let Err(e) = validate_info(row) {
                errors.push(e);
            }
            cols.push(row).unwrap();
        }
        (Table::from_columns(&cols).unwrap(), errors)
    }

    #[test]
    fn writes_single_xlsx_with_named_sheets() -> Result<()> {
        let tmp = tempdir()?;
        let (course_table, course_errors) = courses();
        let program_table = Table::from_columns(&Columns::for_record::<Program>())?;

        let sheets = [
            Sheet::new(Course::SHEET, &course_table, &course_errors),
            Sheet::new(Program::SHEET, &program_table, &[]),
        ];
        let path = write_workbook(tmp.path(), "McGill", ExportFormat::Xlsx, &sheets)?;

        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("McGill_"));
        assert!(file_name.ends_with(".xlsx"));
        assert!(path.is_file());

        let mut book: Xlsx<_> = open_workbook(&path)?;
        assert_eq!(book.sheet_names(), vec!["Courses", "Programs"]);

        let courses = book.worksheet_range("Courses")?;
        assert_eq!(courses.height(), 4);
        assert_eq!(courses.width(), 6);
        assert_eq!(courses.get((0, 0)), Some(&Data::String(INDEX_COLUMN.into())));
        assert_eq!(courses.get((0, 3)), Some(&Data::String("Department".into())));
        assert_eq!(courses.get((2, 0)), Some(&Data::Float(1.0)));
        assert_eq!(
            courses.get((1, 1)),
            Some(&Data::String("COMP 202 (3 credits)".into()))
        );
        assert_eq!(courses.get((1, 5)), Some(&Data::Float(3.0)));
        // absent department is a blank cell
        assert_eq!(courses.get((2, 3)), Some(&Data::Empty));

        // header only
        let programs = book.worksheet_range("Programs")?;
        assert_eq!(programs.height(), 1);
        assert_eq!(programs.get((0, 5)), Some(&Data::String("Degree".into())));

        let report: BTreeMap<String, Vec<String>> = serde_json::from_str(&fs::read_to_string(
            path.with_file_name(file_name.replace(".xlsx", "_errors.json")),
        )?)?;
        assert_eq!(report["Courses"].len(), 1);
        assert!(report["Programs"].is_empty());

        let leftovers = glob(&format!("{}/*.tmp", tmp.path().display()))?.count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    fn writes_parquet_workbook() -> Result<()> {
        let tmp = tempdir()?;
        let (course_table, course_errors) = courses();
        let program_table = Table::from_columns(&Columns::for_record::<Program>())?;

        let sheets = [
            Sheet::new(Course::SHEET, &course_table, &course_errors),
            Sheet::new(Program::SHEET, &program_table, &[]),
        ];
        let out = write_workbook(tmp.path(), "McGill", ExportFormat::Parquet, &sheets)?;

        let dir_name = out.file_name().unwrap().to_string_lossy().to_string();
        assert!(dir_name.starts_with("McGill_"));

        let files: Vec<_> = glob(&format!("{}/*.parquet", out.display()))?
            .filter_map(Result::ok)
            .collect();
        assert_eq!(files.len(), 2);

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(out.join("Courses.parquet"))?)?
            .build()?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 3);
        assert_eq!(batches[0].schema().field(0).name(), INDEX_COLUMN);
        assert_eq!(batches[0].num_columns(), 6);

        // no temp files left behind
        let leftovers = glob(&format!("{}/*.tmp", out.display()))?.count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    fn writes_csv_and_error_report() -> Result<()> {
        let tmp = tempdir()?;
        let (table, errors) = courses();
        let sheets = [Sheet::new(Course::SHEET, &table, &errors)];
        let out = write_workbook(tmp.path(), "Catalog", ExportFormat::Csv, &sheets)?;

        let csv = fs::read_to_string(out.join("Courses.csv"))?;
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("index,Name,Faculty,Department,Level,Credits")
        );
        assert_eq!(lines.count(), 3);

        let report: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&fs::read_to_string(out.join("errors.json"))?)?;
        assert_eq!(report["Courses"].len(), 1);
        assert!(report["Courses"][0].starts_with("Could not find data for Department."));
        Ok(())
    }
}
