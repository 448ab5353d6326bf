//! # Report Driver
//!
//! Runs one generation: pre-scan for the page count, then for each page open
//! a page on the surface, lay the page root out with fresh per-page counters
//! and close it. The document is opened through a [`DocumentGuard`], so an
//! error on any page abandons the surface instead of leaving it half written.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, Span};

use crate::error::ReportError;
use crate::font::FontSet;
use crate::layout::PageLayout;
use crate::model::{Document, FontDef};
use crate::paginate::{compute_total_pages, PageState};
use crate::surface::{DocumentGuard, Rotated, Surface};
use crate::template::{FieldFormats, FieldResolver};

/// Per-run settings. Nothing here is global; two reports with different
/// configurations can run side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    /// Render page 1 only, whatever the data needs.
    pub single_page: bool,
    /// Turn every page a quarter turn clockwise.
    pub rotate: bool,
    /// Where relative `file=` font paths are looked up.
    pub font_dir: Option<PathBuf>,
    /// Used when the document declares no `default` font.
    pub default_font: FontDef,
    pub formats: FieldFormats,
    /// Fixed clock for `{currentdate}`/`{currenttime}`. Local time when unset.
    pub timestamp: Option<NaiveDateTime>,
    /// Gap between autowidth columns.
    pub column_space: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            single_page: false,
            rotate: false,
            font_dir: None,
            default_font: FontDef::default(),
            formats: FieldFormats::default(),
            timestamp: None,
            column_space: 4.0,
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub pages: usize,
    pub rows_per_list: Vec<usize>,
}

pub struct Report<'d> {
    document: &'d Document,
    config: ReportConfig,
}

impl<'d> Report<'d> {
    pub fn new(document: &'d Document, config: ReportConfig) -> Self {
        Report { document, config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    #[instrument(skip_all, fields(pages = tracing::field::Empty))]
    pub fn generate(
        &self,
        data: &crate::record::DataSet,
        surface: &mut dyn Surface,
    ) -> Result<RenderSummary, ReportError> {
        let root = &self.document.root;
        let page_attrs = self.document.page().ok_or_else(|| {
            ReportError::InvalidDocument(format!(
                "root element is <{}>, expected <page>",
                root.tag().name()
            ))
        })?;
        self.config.formats.validate().map_err(ReportError::Config)?;

        let mut rotated;
        let surface: &mut dyn Surface = if self.config.rotate {
            rotated = Rotated::new(surface);
            &mut rotated
        } else {
            surface
        };

        let fonts = FontSet::new(&self.document.fonts, &self.config.default_font);
        fonts.load_files(self.config.font_dir.as_deref(), surface);

        let pagination = compute_total_pages(root, data, self.config.single_page);
        Span::current().record("pages", pagination.total_pages);

        let now = self
            .config
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());
        let root_font = match &root.common.font {
            Some(name) => fonts.resolve(name),
            None => fonts.default_font(),
        };
        let geometry = page_attrs.geometry(&root_font.scale(&*surface));

        let mut guard = DocumentGuard::begin(surface, &self.document.metadata)?;
        let mut state = PageState::new(&pagination);
        for page in 1..=pagination.total_pages {
            state.page = page;
            let fields = FieldResolver::new(data, &state, now, &self.config.formats);
            let layout = PageLayout::new(&fonts, &fields, &state, self.config.column_space);

            let surface = guard.surface();
            surface.begin_page(geometry.width, geometry.height)?;
            layout.render_page(root, &geometry, surface)?;
            surface.end_page()?;
            debug!(page, total = pagination.total_pages, "page rendered");
        }
        guard.finish()?;

        Ok(RenderSummary {
            pages: pagination.total_pages,
            rows_per_list: pagination.rows_per_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::model::{Node, Tag};
    use crate::record::{DataSet, Record, RecordList};
    use crate::surface::{BarcodeSpec, FontMetrics, FontSpec, Line, Rect, RecordingSurface, TextRun};

    fn config() -> ReportConfig {
        ReportConfig {
            timestamp: NaiveDateTime::parse_from_str("2026-03-04 05:06:07", "%Y-%m-%d %H:%M:%S").ok(),
            ..ReportConfig::default()
        }
    }

    fn document(children: Vec<Node>) -> Document {
        Document::new(Node::new(Tag::Page, [("paper", "100 200")], "", children))
    }

    fn listing(rows: usize) -> Document {
        document(vec![
            Node::new(Tag::Text, Vec::<(&str, &str)>::new(), "{page}/{totalpages}", vec![]),
            Node::new(
                Tag::Table,
                [("list", "1".to_string()), ("rows", rows.to_string()), ("y", "+1l".to_string())],
                "",
                vec![Node::new(
                    Tag::Body,
                    Vec::<(&str, &str)>::new(),
                    "",
                    vec![Node::new(Tag::Text, Vec::<(&str, &str)>::new(), "{list.n}", vec![])],
                )],
            ),
        ])
    }

    fn numbers(n: usize) -> DataSet {
        let list: RecordList = (1..=n)
            .map(|i| Some(Record::from_pairs([("n", i.to_string())])))
            .collect();
        DataSet::new(Record::new(), vec![list])
    }

    #[test]
    fn renders_every_page() {
        let doc = listing(2);
        let mut surface = RecordingSurface::new();
        let summary = Report::new(&doc, config())
            .generate(&numbers(5), &mut surface)
            .unwrap();

        assert_eq!(summary.pages, 3);
        assert_eq!(summary.rows_per_list, vec![2]);
        assert!(surface.finished);
        assert_eq!(surface.pages.len(), 3);
        assert_eq!(surface.pages[0].strings(), vec!["1/3", "1", "2"]);
        assert_eq!(surface.pages[2].strings(), vec!["3/3", "5"]);
        assert_eq!((surface.pages[0].width, surface.pages[0].height), (100.0, 200.0));
    }

    #[test]
    fn single_page_mode_stops_after_first_page() {
        let doc = listing(2);
        let mut surface = RecordingSurface::new();
        let summary = Report::new(
            &doc,
            ReportConfig {
                single_page: true,
                ..config()
            },
        )
        .generate(&numbers(5), &mut surface)
        .unwrap();
        assert_eq!(summary.pages, 1);
        assert_eq!(surface.pages[0].strings()[0], "1/1");
    }

    #[test]
    fn root_must_be_a_page() {
        let doc = Document::new(Node::new(Tag::Text, Vec::<(&str, &str)>::new(), "x", vec![]));
        let mut surface = RecordingSurface::new();
        let err = Report::new(&doc, config())
            .generate(&DataSet::default(), &mut surface)
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidDocument(_)));
        assert!(surface.metadata.is_none());
        assert!(surface.pages.is_empty());
    }

    #[test]
    fn bad_date_pattern_fails_before_any_page() {
        let doc = document(vec![Node::new(
            Tag::Text,
            Vec::<(&str, &str)>::new(),
            "{currentdate}",
            vec![],
        )]);
        let mut config = config();
        config.formats.date_format = "%Q".to_string();
        let mut surface = RecordingSurface::new();
        let err = Report::new(&doc, config)
            .generate(&DataSet::default(), &mut surface)
            .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
        assert!(surface.metadata.is_none());
        assert!(surface.pages.is_empty());
    }

    #[test]
    fn fixed_timestamp_is_used_on_every_page() {
        let doc = document(vec![Node::new(
            Tag::Text,
            Vec::<(&str, &str)>::new(),
            "{currentdate} {currenttime}",
            vec![],
        )]);
        let mut surface = RecordingSurface::new();
        Report::new(&doc, config())
            .generate(&DataSet::default(), &mut surface)
            .unwrap();
        assert_eq!(surface.pages[0].strings(), vec!["2026-03-04 05:06:07"]);
    }

    #[test]
    fn config_from_json_keeps_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{ "rotate": true, "formats": { "dateFormat": "%d.%m.%Y" } }"#)
                .unwrap();
        assert!(config.rotate);
        assert!(!config.single_page);
        assert_eq!(config.column_space, 4.0);
        assert_eq!(config.formats.date_format, "%d.%m.%Y");
        assert_eq!(config.formats.time_format, "%H:%M:%S");
        assert_eq!(config.default_font.face, "Helvetica");
    }

    /// Fails to open any page after the first.
    struct FailsOnSecondPage(RecordingSurface);

    impl Surface for FailsOnSecondPage {
        fn begin_document(&mut self, metadata: &crate::model::Metadata) -> Result<(), SurfaceError> {
            self.0.begin_document(metadata)
        }
        fn begin_page(&mut self, width: f64, height: f64) -> Result<(), SurfaceError> {
            if !self.0.pages.is_empty() {
                return Err(SurfaceError::Io(std::io::Error::other("disk full")));
            }
            self.0.begin_page(width, height)
        }
        fn end_page(&mut self) -> Result<(), SurfaceError> {
            self.0.end_page()
        }
        fn finish(&mut self) -> Result<(), SurfaceError> {
            self.0.finish()
        }
        fn abandon(&mut self) {
            self.0.abandon()
        }
        fn draw_line(&mut self, line: Line) -> Result<(), SurfaceError> {
            self.0.draw_line(line)
        }
        fn draw_text(&mut self, run: &TextRun) -> Result<(), SurfaceError> {
            self.0.draw_text(run)
        }
        fn draw_barcode(&mut self, spec: &BarcodeSpec, rect: Rect) -> Result<(), SurfaceError> {
            self.0.draw_barcode(spec, rect)
        }
        fn barcode_size(&self, spec: &BarcodeSpec) -> Result<(f64, f64), SurfaceError> {
            self.0.barcode_size(spec)
        }
        fn measure_font(&self, font: &FontSpec) -> FontMetrics {
            self.0.measure_font(font)
        }
        fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
            self.0.text_width(font, text)
        }
        fn register_font(&mut self, face: &str, data: Vec<u8>) -> Result<(), SurfaceError> {
            self.0.register_font(face, data)
        }
    }

    #[test]
    fn failure_mid_run_abandons_the_document() {
        let doc = listing(2);
        let mut surface = FailsOnSecondPage(RecordingSurface::new());
        let err = Report::new(&doc, config())
            .generate(&numbers(5), &mut surface)
            .unwrap_err();
        assert!(matches!(err, ReportError::Surface(SurfaceError::Io(_))));
        assert!(surface.0.abandoned);
        assert!(!surface.0.finished);
    }
}
