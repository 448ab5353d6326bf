//! # Pagewright CLI
//!
//! Usage:
//!   pagewright layout.xml --data data.json -o report.pdf
//!   pagewright layout.xml --data data.json --config report.json --rotate
//!   pagewright --example > invoice.xml

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pagewright::pdf::PdfSurface;
use pagewright::{xml, DataSet, Report, ReportConfig, ReportError};

#[derive(Debug, Parser)]
#[command(name = "pagewright", version, about = "Render a report layout to PDF")]
struct Args {
    /// Layout markup.
    #[arg(required_unless_present = "example")]
    layout: Option<PathBuf>,

    /// Data set as JSON. Without it the report renders with no data.
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[arg(short, long, default_value = "output.pdf")]
    output: PathBuf,

    /// Report settings as JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render the first page only.
    #[arg(long)]
    single_page: bool,

    /// Turn every page a quarter turn clockwise.
    #[arg(long)]
    rotate: bool,

    /// Directory for `file=` fonts.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Print an example layout and exit.
    #[arg(long)]
    example: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.example {
        print!("{}", EXAMPLE_LAYOUT);
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(pages) => {
            info!(pages, output = %args.output.display(), "report written");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<usize, ReportError> {
    let mut config: ReportConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => ReportConfig::default(),
    };
    config.single_page |= args.single_page;
    config.rotate |= args.rotate;
    if args.font_dir.is_some() {
        config.font_dir = args.font_dir.clone();
    }

    let layout = args
        .layout
        .as_ref()
        .ok_or_else(|| ReportError::InvalidDocument("no layout given".to_string()))?;
    let document = xml::parse_document(&fs::read_to_string(layout)?)?;
    let data = match &args.data {
        Some(path) => DataSet::from_json(&fs::read_to_string(path)?)?,
        None => DataSet::default(),
    };

    // Check the layout before the output file is created.
    if document.page().is_none() {
        return Err(ReportError::InvalidDocument(format!(
            "root element is <{}>, expected <page>",
            document.root.tag().name()
        )));
    }
    let mut surface = PdfSurface::create(&args.output)?;
    let summary = Report::new(&document, config).generate(&data, &mut surface)?;
    Ok(summary.pages)
}

const EXAMPLE_LAYOUT: &str = r#"<report paper="A4" margin="15m">
  <meta title="Invoice {number}" author="Pagewright"/>
  <font name="default" face="Helvetica" size="10"/>
  <font name="title" face="Helvetica" size="18" bold="yes"/>
  <font name="mono" face="Courier" size="9"/>

  <text font="title">Invoice {number}</text>
  <text x="100%" align="right">{currentdate}</text>
  <text x="0" y="+2l">{customer}</text>

  <table list="1" rows="25" y="+2l" height="120m" border="yes" autowidth="yes">
    <header border-bottom="yes">
      <text width="4">Item</text>
      <text width="1" align="right">Qty</text>
      <text width="2" align="right">Amount</text>
    </header>
    <body omitnodata="yes">
      <text width="4" clip="char">{list.item}</text>
      <text width="1" align="right">{list.qty:number}</text>
      <text width="2" align="right" font="mono">{list.amount:decimal(2)}</text>
    </body>
    <footer border-top="yes">
      <text width="7" align="right" cond="{lastline}">Total {total:decimal(2)}</text>
    </footer>
  </table>

  <barcode type="qr" x="0" y="-30m" width="25m" height="25m">{number}</barcode>
  <text x="100%" y="-10m" align="right">Page {page} of {totalpages}</text>
</report>
"#;
