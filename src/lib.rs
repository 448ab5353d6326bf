//! # Pagewright
//!
//! A data-driven report engine. A layout is a tree of absolutely or
//! relatively positioned fields under a page root; a data set is one record
//! plus any number of record lists. Tables bound to a list show a window of
//! it on every page, and the engine works out how many pages that takes
//! before drawing the first one.
//!
//! ## Architecture
//!
//! ```text
//! Layout (XML/JSON)      Data (JSON)
//!       ↓                    ↓
//!   [model]              [record]
//!       ↓                    ↓
//!   [paginate] - page count and rows per list
//!       ↓
//!   [driver]   - one pass per page
//!       ↓
//!   [layout]   - cursor engine; [template] fills fields, [param] resolves positions
//!       ↓
//!   [surface]  - drawing primitives; [pdf] writes them as PDF
//! ```

pub mod driver;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod paginate;
pub mod param;
pub mod pdf;
pub mod record;
pub mod surface;
pub mod template;
pub mod xml;

pub use driver::{RenderSummary, Report, ReportConfig};
pub use error::{ReportError, SurfaceError};
pub use model::Document;
pub use record::{DataSet, Record, RecordList};

use pdf::PdfSurface;

/// Render a document and data set to PDF bytes.
pub fn render_pdf(
    document: &Document,
    data: &DataSet,
    config: ReportConfig,
) -> Result<Vec<u8>, ReportError> {
    let mut surface = PdfSurface::new(Vec::new());
    Report::new(document, config).generate(data, &mut surface)?;
    surface
        .into_inner()
        .ok_or_else(|| ReportError::InvalidDocument("output was abandoned".to_string()))
}

/// Render XML layout markup with a JSON data set to PDF bytes.
pub fn render_xml(xml: &str, data_json: &str, config: ReportConfig) -> Result<Vec<u8>, ReportError> {
    let document = xml::parse_document(xml)?;
    let data = DataSet::from_json(data_json)?;
    render_pdf(&document, &data, config)
}
