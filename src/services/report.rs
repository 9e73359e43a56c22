//! Monthly payroll spreadsheet.
//!
//! One sheet per month: a header row with a narrow rotated column per day,
//! then for every site a merged banner row followed by its workers, and a
//! totals row at the bottom.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::calendar::Month;
use crate::database::models::{MonthlyPayroll, PayrollLine};

const NAME_COL: u16 = 0;
const FIRST_DAY_COL: u16 = 1;
const HEADER_ROW: u32 = 0;
const SUMMARY_HEADERS: [&str; 5] = ["Rate", "Total hours", "Advances", "Gross", "Net"];

struct Styles {
    header: Format,
    day_header: Format,
    summary_header: Format,
    banner: Format,
    name: Format,
    hours: Format,
    absent: Format,
    money: Format,
    net: Format,
    total_label: Format,
    total_hours: Format,
    total_money: Format,
}

impl Styles {
    fn new() -> Self {
        let cell = Format::new().set_border(FormatBorder::Thin);
        let rotated = cell
            .clone()
            .set_bold()
            .set_rotation(90)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            header: cell
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            day_header: rotated.clone(),
            summary_header: rotated.set_background_color(Color::Yellow),
            banner: cell
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(Color::Yellow),
            name: cell.clone(),
            hours: cell.clone().set_num_format("0.##").set_align(FormatAlign::Center),
            absent: cell.clone().set_background_color(Color::Red),
            money: cell.clone().set_num_format("#,##0"),
            net: cell.clone().set_num_format("#,##0").set_bold(),
            total_label: cell.clone().set_bold(),
            total_hours: cell.clone().set_bold().set_num_format("0.##"),
            total_money: cell.set_bold().set_num_format("#,##0"),
        }
    }
}

/// Column layout derived from the number of days in the month
struct Columns {
    days: u16,
}

impl Columns {
    fn day(&self, day: u32) -> u16 {
        FIRST_DAY_COL + day as u16 - 1
    }

    fn rate(&self) -> u16 {
        FIRST_DAY_COL + self.days
    }

    fn total_hours(&self) -> u16 {
        self.rate() + 1
    }

    fn advances(&self) -> u16 {
        self.rate() + 2
    }

    fn gross(&self) -> u16 {
        self.rate() + 3
    }

    fn net(&self) -> u16 {
        self.rate() + 4
    }
}

pub fn report_file_name(month: Month) -> String {
    format!("payroll_{}_{:02}.xlsx", month.year(), month.number())
}

pub fn render_workbook(payroll: &MonthlyPayroll) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(payroll.month.to_string())?;

    let styles = Styles::new();
    let columns = Columns {
        days: payroll.month.days() as u16,
    };

    write_header(worksheet, payroll.month, &columns, &styles)?;

    let mut row = HEADER_ROW + 1;
    for group in &payroll.sites {
        worksheet.merge_range(
            row,
            NAME_COL,
            row,
            columns.net(),
            &group.site.to_uppercase(),
            &styles.banner,
        )?;
        row += 1;

        for line in &group.lines {
            write_line(worksheet, row, line, &columns, &styles)?;
            row += 1;
        }
    }

    write_totals(worksheet, row, payroll, &columns, &styles)?;

    worksheet.set_freeze_panes(HEADER_ROW + 1, FIRST_DAY_COL)?;

    workbook.save_to_buffer()
}

fn write_header(
    worksheet: &mut Worksheet,
    month: Month,
    columns: &Columns,
    styles: &Styles,
) -> Result<(), XlsxError> {
    worksheet.set_row_height(HEADER_ROW, 70)?;
    worksheet.set_column_width(NAME_COL, 30)?;
    worksheet.write_string_with_format(HEADER_ROW, NAME_COL, "Full name", &styles.header)?;

    for date in month.dates() {
        let col = columns.day(chrono::Datelike::day(&date));
        worksheet.set_column_width(col, 4)?;
        worksheet.write_string_with_format(
            HEADER_ROW,
            col,
            date.format("%d.%m.%Y").to_string(),
            &styles.day_header,
        )?;
    }

    for (offset, title) in SUMMARY_HEADERS.iter().enumerate() {
        let col = columns.rate() + offset as u16;
        worksheet.set_column_width(col, 12)?;
        worksheet.write_string_with_format(HEADER_ROW, col, *title, &styles.summary_header)?;
    }

    Ok(())
}

fn write_line(
    worksheet: &mut Worksheet,
    row: u32,
    line: &PayrollLine,
    columns: &Columns,
    styles: &Styles,
) -> Result<(), XlsxError> {
    worksheet.write_string_with_format(row, NAME_COL, &line.name, &styles.name)?;

    for day in 1..=u32::from(columns.days) {
        let col = columns.day(day);
        match line.daily_hours.get(&day) {
            Some(hours) if *hours > 0.0 => {
                worksheet.write_number_with_format(row, col, *hours, &styles.hours)?;
            }
            Some(_) => {
                worksheet.write_blank(row, col, &styles.absent)?;
            }
            None => {
                worksheet.write_blank(row, col, &styles.name)?;
            }
        }
    }

    worksheet.write_number_with_format(row, columns.rate(), line.hourly_rate, &styles.money)?;
    worksheet.write_number_with_format(
        row,
        columns.total_hours(),
        line.total_hours,
        &styles.hours,
    )?;
    worksheet.write_number_with_format(row, columns.advances(), line.advances, &styles.money)?;
    worksheet.write_number_with_format(row, columns.gross(), line.gross, &styles.money)?;
    worksheet.write_number_with_format(row, columns.net(), line.net, &styles.net)?;

    Ok(())
}

fn write_totals(
    worksheet: &mut Worksheet,
    row: u32,
    payroll: &MonthlyPayroll,
    columns: &Columns,
    styles: &Styles,
) -> Result<(), XlsxError> {
    worksheet.write_string_with_format(row, NAME_COL, "Total", &styles.total_label)?;
    worksheet.write_number_with_format(
        row,
        columns.total_hours(),
        payroll.total_hours(),
        &styles.total_hours,
    )?;
    worksheet.write_number_with_format(
        row,
        columns.advances(),
        payroll.total_advances(),
        &styles.total_money,
    )?;
    worksheet.write_number_with_format(
        row,
        columns.gross(),
        payroll.total_gross(),
        &styles.total_money,
    )?;
    worksheet.write_number_with_format(
        row,
        columns.net(),
        payroll.total_net(),
        &styles.total_money,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::SiteGroup;
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use std::collections::BTreeMap;
    use std::io::{Cursor, Read};

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    /// Style index of a cell in the sheet XML
    fn style_of(sheet: &str, cell: &str) -> String {
        let pattern = Regex::new(&format!(r#"<c r="{}" s="(\d+)""#, cell)).unwrap();
        pattern.captures(sheet).unwrap()[1].to_string()
    }

    fn number_at(sheet: &str, cell: &str) -> f64 {
        let pattern = Regex::new(&format!(r#"<c r="{}"[^>]*><v>([^<]+)</v>"#, cell)).unwrap();
        pattern.captures(sheet).unwrap()[1].parse().unwrap()
    }

    fn sample_payroll() -> MonthlyPayroll {
        let month = Month::new(2025, 2).unwrap();
        let line = PayrollLine {
            worker_id: 1,
            name: "Ali Valiyev".to_string(),
            hourly_rate: 20_000.0,
            daily_hours: BTreeMap::from([(3, 8.0), (4, 0.0), (28, 6.5)]),
            total_hours: 14.5,
            advances: 100_000.0,
            gross: 290_000.0,
            net: 190_000.0,
        };
        MonthlyPayroll {
            month,
            sites: vec![SiteGroup {
                site: "H Block".to_string(),
                lines: vec![line],
            }],
        }
    }

    #[test]
    fn renders_an_xlsx_archive() {
        let bytes = render_workbook(&sample_payroll()).unwrap();
        assert!(bytes.len() > 1000);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn sheet_layout_reads_back() {
        // Arrange
        let bytes = render_workbook(&sample_payroll()).unwrap();

        // Act
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        let strings = read_part(&bytes, "xl/sharedStrings.xml");

        // Assert
        for text in ["Full name", "Rate", "Total hours", "Advances", "Gross", "Net", "Total"] {
            assert!(strings.contains(&format!(">{}<", text)), "missing {}", text);
        }
        assert!(strings.contains(">03.02.2025<"));
        assert!(strings.contains(">H BLOCK<"));
        assert!(!strings.contains(">H Block<"));

        // Banner spans the name column through Net on row 2
        assert!(sheet.contains(r#"<mergeCell ref="A2:AH2"/>"#));

        // Day 4 is an explicit absence, day 5 has no record
        assert_ne!(style_of(&sheet, "E3"), style_of(&sheet, "F3"));
        assert_eq!(number_at(&sheet, "D3"), 8.0);

        // Net is styled apart from the other money columns
        assert_ne!(style_of(&sheet, "AH3"), style_of(&sheet, "AF3"));

        // Totals row
        assert_eq!(number_at(&sheet, "AE4"), 14.5);
        assert_eq!(number_at(&sheet, "AF4"), 100_000.0);
        assert_eq!(number_at(&sheet, "AG4"), 290_000.0);
        assert_eq!(number_at(&sheet, "AH4"), 190_000.0);
    }

    #[test]
    fn empty_month_still_renders() {
        let payroll = MonthlyPayroll {
            month: Month::new(2025, 11).unwrap(),
            sites: Vec::new(),
        };
        let bytes = render_workbook(&payroll).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn summary_columns_follow_the_days() {
        let columns = Columns { days: 28 };
        assert_eq!(columns.day(1), 1);
        assert_eq!(columns.day(28), 28);
        assert_eq!(columns.rate(), 29);
        assert_eq!(columns.net(), 33);
    }

    #[test]
    fn file_name_is_zero_padded() {
        assert_eq!(
            report_file_name(Month::new(2025, 3).unwrap()),
            "payroll_2025_03.xlsx"
        );
    }
}
