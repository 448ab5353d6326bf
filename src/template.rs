//! Field substitution.
//!
//! Text content, barcode payloads and `cond` attributes are templates with
//! `{name[:option[:option...]]}` placeholders. A name resolves, in order,
//! against:
//!
//! 1. the active record's field names,
//! 2. `field<N>`, positional in the active record,
//! 3. `list...` references into record lists,
//! 4. the built-ins `page`, `totalpages`, `currentdate`, `currenttime`,
//!    `firstpage`, `lastpage`, `lastline`.
//!
//! Names that match nothing are left in the output verbatim, braces and all.
//! The resolved text then runs through the option pipeline left to right,
//! each stage consuming the previous stage's text.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::paginate::PageState;
use crate::record::DataSet;

/// Separators used by `number` and `decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            decimal_separator: '.',
            group_separator: ',',
        }
    }
}

/// Formats for number and date built-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldFormats {
    pub number: NumberFormat,
    /// chrono strftime pattern for `{currentdate}`.
    pub date_format: String,
    /// chrono strftime pattern for `{currenttime}`.
    pub time_format: String,
}

impl Default for FieldFormats {
    fn default() -> Self {
        FieldFormats {
            number: NumberFormat::default(),
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M:%S".to_string(),
        }
    }
}

impl FieldFormats {
    /// Check both strftime patterns. chrono panics while formatting a
    /// pattern it cannot parse, so this has to run before any page is drawn.
    pub fn validate(&self) -> Result<(), String> {
        for (name, pattern) in [
            ("dateFormat", &self.date_format),
            ("timeFormat", &self.time_format),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(format!("{} '{}' is not a valid strftime pattern", name, pattern));
            }
        }
        Ok(())
    }
}

/// One stage of the option pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOption {
    /// Fixed-point with this many decimals.
    Number(usize),
    /// Fixed-point with digit grouping.
    Decimal(usize),
    /// Pad on the left or keep the rightmost characters.
    FixLength { len: usize, fill: char },
    /// Negative numbers become "0".
    PlusOnly,
    Prefix(String),
    Postfix(String),
}

impl FormatOption {
    /// Parse `opname` or `opname(arg, ...)`. Unknown options yield `None`.
    pub fn parse(spec: &str) -> Option<FormatOption> {
        let spec = spec.trim();
        let (name, args) = match spec.find('(') {
            Some(open) => {
                let close = spec.rfind(')').filter(|&c| c > open)?;
                (&spec[..open], split_args(&spec[open + 1..close]))
            }
            None => (spec, Vec::new()),
        };
        let num_arg = |i: usize, default: usize| {
            args.get(i)
                .and_then(|a| a.trim().parse::<usize>().ok())
                .unwrap_or(default)
        };
        let text_arg = |i: usize| args.get(i).cloned().unwrap_or_default();

        Some(match name.trim().to_ascii_lowercase().as_str() {
            "number" => FormatOption::Number(num_arg(0, 0)),
            "decimal" => FormatOption::Decimal(num_arg(0, 0)),
            "fixlength" => FormatOption::FixLength {
                len: num_arg(0, 5),
                fill: args
                    .get(1)
                    .and_then(|a| a.chars().next())
                    .unwrap_or('0'),
            },
            "plusonly" => FormatOption::PlusOnly,
            "prefix" => FormatOption::Prefix(text_arg(0)),
            "postfix" => FormatOption::Postfix(text_arg(0)),
            _ => return None,
        })
    }

    /// Run this stage on `input`.
    pub fn apply(&self, input: &str, format: &NumberFormat) -> String {
        match self {
            FormatOption::Number(decimals) => match parse_number(input, format) {
                Some(v) => format_fixed(v, *decimals, format, false),
                None => input.to_string(),
            },
            FormatOption::Decimal(decimals) => match parse_number(input, format) {
                Some(v) => format_fixed(v, *decimals, format, true),
                None => input.to_string(),
            },
            FormatOption::FixLength { len, fill } => fix_length(input, *len, *fill),
            FormatOption::PlusOnly => match parse_number(input, format) {
                Some(v) if v < 0.0 => "0".to_string(),
                _ => input.to_string(),
            },
            FormatOption::Prefix(p) => format!("{}{}", p, input),
            FormatOption::Postfix(p) => format!("{}{}", input, p),
        }
    }
}

/// A `list...` reference. Missing parts fall back to the current list/line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRef {
    pub list: Option<usize>,
    pub line: Option<usize>,
    pub column: String,
}

impl ListRef {
    /// Recognize `list<sep>col`, `list<N><sep>col`, `list<sep><N><sep><L><sep>col`
    /// and friends. Returns `None` when the name is not a list reference at
    /// all; a list reference with a malformed index yields `Some(None)`.
    pub fn parse(name: &str) -> Option<Option<ListRef>> {
        let lower = name.to_ascii_lowercase();
        let rest = lower.strip_prefix("list")?;
        if !rest.is_empty() && !rest.starts_with(['.', '-']) && !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        // Keep the column's original spelling: field names are case-sensitive.
        let rest = &name[4..];
        let rest = rest.strip_prefix(['.', '-']).unwrap_or(rest);
        if rest.is_empty() {
            return None;
        }
        let parts: Vec<&str> = rest.split(['.', '-']).collect();
        let index = |s: &str| s.trim().parse::<usize>().ok().filter(|&n| n > 0);
        Some(match parts.as_slice() {
            [column] => Some(ListRef {
                list: None,
                line: None,
                column: column.to_string(),
            }),
            [list, column] => index(list).map(|l| ListRef {
                list: Some(l),
                line: None,
                column: column.to_string(),
            }),
            [list, line, column] => match (index(list), index(line)) {
                (Some(l), Some(n)) => Some(ListRef {
                    list: Some(l),
                    line: Some(n),
                    column: column.to_string(),
                }),
                _ => None,
            },
            _ => None,
        })
    }
}

/// Resolves placeholders for one page of one run.
pub struct FieldResolver<'a> {
    data: &'a DataSet,
    page: &'a PageState,
    now: NaiveDateTime,
    formats: &'a FieldFormats,
}

impl<'a> FieldResolver<'a> {
    pub fn new(
        data: &'a DataSet,
        page: &'a PageState,
        now: NaiveDateTime,
        formats: &'a FieldFormats,
    ) -> Self {
        FieldResolver {
            data,
            page,
            now,
            formats,
        }
    }

    pub fn data(&self) -> &'a DataSet {
        self.data
    }

    /// Replace every resolvable placeholder in `template`.
    pub fn substitute(&self, template: &str, list: Option<usize>, line: usize) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find(['{', '}']) {
                Some(i) if after.as_bytes()[i] == b'}' => {
                    let inner = &after[..i];
                    match self.resolve_placeholder(inner, list, line) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push('{');
                            out.push_str(inner);
                            out.push('}');
                        }
                    }
                    rest = &after[i + 1..];
                }
                Some(i) => {
                    // Another '{' before any '}': the first one is literal.
                    out.push('{');
                    out.push_str(&after[..i]);
                    rest = &after[i..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Evaluate a `cond` attribute: "", "0", "false" and "no" are false.
    pub fn condition(&self, cond: &str, list: Option<usize>, line: usize) -> bool {
        let value = self.substitute(cond, list, line);
        !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no"
        )
    }

    fn resolve_placeholder(&self, inner: &str, list: Option<usize>, line: usize) -> Option<String> {
        let mut segments = split_top_level(inner, ':').into_iter();
        let first = segments.next()?;
        let name = first.trim();
        if name.is_empty() {
            return None;
        }
        let value = self.resolve_name(name, list, line)?;
        Some(
            segments
                .filter_map(|s| FormatOption::parse(&s))
                .fold(value, |acc, opt| opt.apply(&acc, &self.formats.number)),
        )
    }

    fn resolve_name(&self, name: &str, list: Option<usize>, line: usize) -> Option<String> {
        let record = &self.data.record;
        if let Some(v) = record.get(name) {
            return Some(v.to_string());
        }
        if let Some(n) = name
            .strip_prefix("field")
            .and_then(|d| d.parse::<usize>().ok())
        {
            return Some(record.position(n).unwrap_or_default().to_string());
        }
        if let Some(list_ref) = ListRef::parse(name) {
            return Some(
                list_ref
                    .and_then(|r| self.lookup_list(&r, list, line))
                    .unwrap_or_default(),
            );
        }
        self.builtin(name, list, line)
    }

    fn lookup_list(&self, r: &ListRef, list: Option<usize>, line: usize) -> Option<String> {
        let list_index = r.list.or(list)?;
        let line = r.line.unwrap_or(line);
        self.data
            .list(list_index)?
            .line(line)?
            .column(&r.column)
            .map(str::to_string)
    }

    fn builtin(&self, name: &str, list: Option<usize>, line: usize) -> Option<String> {
        let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();
        Some(match name.to_ascii_lowercase().as_str() {
            "page" => self.page.page.to_string(),
            "totalpages" => self.page.total_pages.to_string(),
            "currentdate" => self.now.format(&self.formats.date_format).to_string(),
            "currenttime" => self.now.format(&self.formats.time_format).to_string(),
            "firstpage" => yes_no(self.page.page == 1),
            "lastpage" => yes_no(self.page.page == self.page.total_pages),
            "lastline" => yes_no(
                list.and_then(|l| self.data.list(l))
                    .is_some_and(|l| l.len() == line),
            ),
            _ => return None,
        })
    }
}

// ── helpers ─────────────────────────────────────────────────────────

/// Split on `sep` outside parentheses and double quotes.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quoted = false;
    for ch in s.chars() {
        match ch {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 && !quoted => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    parts.push(current);
    parts
}

/// Split option arguments on commas; double quotes protect commas and
/// spaces and are removed.
fn split_args(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in s.chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => args.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    args.push(current);
    args
}

fn parse_number(input: &str, format: &NumberFormat) -> Option<f64> {
    let s = input.trim();
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    let normalized: String = s
        .chars()
        .filter(|&c| c != format.group_separator)
        .map(|c| if c == format.decimal_separator { '.' } else { c })
        .collect();
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_fixed(v: f64, decimals: usize, format: &NumberFormat, grouped: bool) -> String {
    let mut text = format!("{:.*}", decimals, v);
    // No "-0.00".
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text.remove(0);
    }
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut out = String::from(sign);
    if grouped {
        let digits: Vec<char> = int_part.chars().collect();
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(format.group_separator);
            }
            out.push(*d);
        }
    } else {
        out.push_str(int_part);
    }
    if let Some(frac) = frac_part {
        out.push(format.decimal_separator);
        out.push_str(frac);
    }
    out
}

fn fix_length(input: &str, len: usize, fill: char) -> String {
    let count = input.chars().count();
    if count >= len {
        input.chars().skip(count - len).collect()
    } else {
        std::iter::repeat(fill)
            .take(len - count)
            .chain(input.chars())
            .collect()
    }
}
