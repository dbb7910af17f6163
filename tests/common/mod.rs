//! Shared fixtures for integration tests.
//!
//! Workbooks are written as real `.xlsx` files (a zip of SpreadsheetML parts)
//! so the reader is exercised through calamine exactly as in production.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

use museum_exhibits::config::Settings;
use museum_exhibits::server::{self, AppState};
use museum_exhibits::workbook::REQUIRED_COLUMNS;

// ============================================================================
// Workbook fixtures
// ============================================================================

/// One cell value in a fixture sheet.
#[derive(Debug, Clone)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    /// A serial number formatted as a date (`numFmtId` 14), so calamine
    /// reports it as a date-time cell.
    Date(f64),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }
}

pub struct WorkbookFixture {
    pub sheets: Vec<Sheet>,
    pub date1904: bool,
    pub active_tab: Option<usize>,
}

impl WorkbookFixture {
    pub fn single(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheets: vec![Sheet::new("Экспонаты", rows)],
            date1904: false,
            active_tab: None,
        }
    }

    pub fn write(&self, path: &Path) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut put = |name: &str, body: String| {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", self.content_types());
        put("_rels/.rels", ROOT_RELS.to_string());
        put("xl/workbook.xml", self.workbook_xml());
        put("xl/_rels/workbook.xml.rels", self.workbook_rels());
        put("xl/styles.xml", STYLES.to_string());
        for (i, sheet) in self.sheets.iter().enumerate() {
            put(&format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(&sheet.rows));
        }

        zip.finish().unwrap();
    }

    fn content_types(&self) -> String {
        let sheets: String = (1..=self.sheets.len())
            .map(|i| {
                format!(
                    r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{sheets}</Types>"#
        )
    }

    fn workbook_xml(&self) -> String {
        let pr = if self.date1904 {
            r#"<workbookPr date1904="1"/>"#
        } else {
            "<workbookPr/>"
        };
        let views = match self.active_tab {
            Some(tab) => format!(r#"<bookViews><workbookView activeTab="{tab}"/></bookViews>"#),
            None => "<bookViews><workbookView/></bookViews>".to_string(),
        };
        let sheets: String = self
            .sheets
            .iter()
            .enumerate()
            .map(|(i, sheet)| {
                format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    escape(&sheet.name),
                    i + 1,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{pr}{views}<sheets>{sheets}</sheets></workbook>"#
        )
    }

    fn workbook_rels(&self) -> String {
        let sheets: String = (1..=self.sheets.len())
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{sheets}<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#
        )
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

/// Two cell formats: 0 is General, 1 is the built-in short date.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font/></fonts><fills count="1"><fill/></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf numFmtId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" xfId="0"/><xf numFmtId="14" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

fn sheet_xml(rows: &[Vec<CellValue>]) -> String {
    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        let row_num = r + 1;
        data.push_str(&format!(r#"<row r="{row_num}">"#));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(c), row_num);
            match cell {
                CellValue::Empty => {}
                CellValue::Text(text) => data.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    escape(text)
                )),
                CellValue::Number(n) => {
                    data.push_str(&format!(r#"<c r="{reference}"><v>{n}</v></c>"#))
                }
                CellValue::Date(n) => {
                    data.push_str(&format!(r#"<c r="{reference}" s="1"><v>{n}</v></c>"#))
                }
            }
        }
        data.push_str("</row>");
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
}

/// Zero-based column index to `A`, `B`, ..., `Z`, `AA`, ...
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// Catalog helpers
// ============================================================================

/// The required header row in canonical order.
pub fn header() -> Vec<CellValue> {
    REQUIRED_COLUMNS.iter().map(|&h| CellValue::from(h)).collect()
}

/// A full data row in canonical column order.
pub struct Row {
    pub id: CellValue,
    pub name: &'static str,
    pub museum: &'static str,
    pub description: &'static str,
    pub period: &'static str,
    pub category: &'static str,
    pub received: CellValue,
    pub photo: &'static str,
    pub story: &'static str,
}

impl Row {
    pub fn new(id: i64, name: &'static str) -> Self {
        Self {
            id: id.into(),
            name,
            museum: "",
            description: "",
            period: "",
            category: "",
            received: CellValue::Empty,
            photo: "",
            story: "",
        }
    }

    pub fn cells(self) -> Vec<CellValue> {
        vec![
            self.id,
            self.name.into(),
            self.museum.into(),
            self.description.into(),
            self.period.into(),
            self.category.into(),
            self.received,
            self.photo.into(),
            self.story.into(),
        ]
    }
}

/// Three exhibits across two museums, deliberately out of id order.
pub fn sample_rows() -> Vec<Vec<CellValue>> {
    vec![
        header(),
        Row {
            museum: "Краеведческий музей",
            category: "Быт",
            period: "XIX век",
            description: "Медный самовар тульской работы",
            received: CellValue::Date(32947.0),
            photo: "samovar.jpg",
            story: "Принадлежал воронежскому купцу",
            ..Row::new(3, "Самовар")
        }
        .cells(),
        Row {
            museum: "Художественный музей",
            category: "Живопись",
            period: "XVII век",
            received: "15.03.1990".into(),
            ..Row::new(1, "Икона Богоматери")
        }
        .cells(),
        Row {
            museum: "Краеведческий музей",
            category: "Быт",
            description: "Глиняный сосуд",
            photo: "../../secret/кувшин.png",
            ..Row::new(2, "Кувшин")
        }
        .cells(),
    ]
}

/// A data directory with `exhibits.xlsx` and a `photos/` directory.
pub struct Catalog {
    pub root: tempfile::TempDir,
    pub settings: Settings,
}

impl Catalog {
    pub fn with_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let root = tempfile::TempDir::new().unwrap();
        let photos_dir = root.path().join("photos");
        fs::create_dir_all(&photos_dir).unwrap();
        let xlsx_path = root.path().join("exhibits.xlsx");
        WorkbookFixture::single(rows).write(&xlsx_path);

        let settings = Settings {
            xlsx_path,
            photos_dir,
            log_dir: root.path().join("logs"),
            ..Settings::default()
        };
        Self { root, settings }
    }

    pub fn sample() -> Self {
        let catalog = Self::with_rows(sample_rows());
        catalog.add_photo("3.jpg");
        catalog.add_photo("secret/кувшин.png");
        catalog
    }

    pub fn add_photo(&self, name: &str) -> PathBuf {
        let path = self.settings.photos_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"photo").unwrap();
        path
    }
}

// ============================================================================
// HTTP helpers
// ============================================================================

pub fn build_test_app(settings: Settings) -> Router {
    server::router(AppState::new(settings))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
