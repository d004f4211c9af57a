//! gettext `.po` reader and writer for combined sky-culture catalogs.
//!
//! Only the parts of the format that matter for merging are modelled:
//! header metadata, context, singular/plural ids and strings, the four
//! comment kinds, and obsolete entries. Output is deterministic so that two
//! runs over the same input produce identical files.

use color_eyre::eyre::WrapErr;
use skysync_core::{Catalog, CatalogEntry, Result, SkySyncError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Read and parse a catalog from disk.
pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let text =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    parse_catalog(&text, &path.display().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Ctxt,
    Id,
    IdPlural,
    Str,
    StrPlural(usize),
}

impl Field {
    fn is_msgstr(self) -> bool {
        matches!(self, Field::Str | Field::StrPlural(_))
    }
}

#[derive(Default)]
struct Pending {
    entry: CatalogEntry,
    has_id: bool,
    field: Option<Field>,
}

impl Pending {
    fn in_msgstr(&self) -> bool {
        self.field.map(Field::is_msgstr).unwrap_or(false)
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Ctxt => self.entry.msgctxt.get_or_insert_with(String::new),
            Field::Id => &mut self.entry.msgid,
            Field::IdPlural => self.entry.msgid_plural.get_or_insert_with(String::new),
            Field::Str => &mut self.entry.msgstr,
            Field::StrPlural(n) => {
                if self.entry.msgstr_plural.len() <= n {
                    self.entry.msgstr_plural.resize(n + 1, String::new());
                }
                &mut self.entry.msgstr_plural[n]
            }
        }
    }
}

fn flush(pending: &mut Pending, catalog: &mut Catalog, header_done: &mut bool) {
    let done = std::mem::take(pending);
    if !done.has_id {
        // comments with no message attached
        return;
    }
    let entry = done.entry;
    if !*header_done && catalog.entries.is_empty() && entry.msgid.is_empty() && entry.msgctxt.is_none()
    {
        catalog.metadata = parse_header(&entry.msgstr);
        *header_done = true;
        return;
    }
    catalog.entries.push(entry);
}

fn parse_header(msgstr: &str) -> Vec<(String, String)> {
    msgstr
        .split('\n')
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Parse catalog text. `origin` is only used in error messages.
pub fn parse_catalog(text: &str, origin: &str) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    let mut pending = Pending::default();
    let mut header_done = false;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (idx, raw) in text.lines().enumerate() {
        let parse_err = |message: String| SkySyncError::CatalogParse {
            path: origin.to_string(),
            line: idx + 1,
            message,
        };

        let mut line = raw.trim();
        let mut obsolete = false;
        if let Some(rest) = line.strip_prefix("#~") {
            obsolete = true;
            line = rest.trim_start();
            if let Some(prev) = line.strip_prefix('|') {
                if pending.in_msgstr() {
                    flush(&mut pending, &mut catalog, &mut header_done);
                }
                pending.entry.previous.push(prev.trim().to_string());
                continue;
            }
            if line.is_empty() {
                continue;
            }
        }

        if line.is_empty() {
            flush(&mut pending, &mut catalog, &mut header_done);
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if pending.in_msgstr() {
                flush(&mut pending, &mut catalog, &mut header_done);
            }
            let e = &mut pending.entry;
            if let Some(flags) = comment.strip_prefix(',') {
                e.flags.extend(
                    flags
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(String::from),
                );
            } else if let Some(refs) = comment.strip_prefix(':') {
                e.references
                    .extend(refs.split_whitespace().map(String::from));
            } else if let Some(x) = comment.strip_prefix('.') {
                e.extracted_comments.push(x.trim().to_string());
            } else if let Some(prev) = comment.strip_prefix('|') {
                e.previous.push(prev.trim().to_string());
            } else {
                let c = comment.strip_prefix(' ').unwrap_or(comment);
                e.translator_comments.push(c.to_string());
            }
            continue;
        }

        if line.starts_with('"') {
            let Some(field) = pending.field else {
                return Err(parse_err("continuation string outside of a message".into()).into());
            };
            let value = parse_po_string(line).map_err(|m| parse_err(m))?;
            pending.slot(field).push_str(&value);
            continue;
        }

        let split_at = line
            .find(|c: char| c.is_whitespace() || c == '"')
            .unwrap_or(line.len());
        let (keyword, rest) = line.split_at(split_at);
        let field = match keyword {
            "msgctxt" => Field::Ctxt,
            "msgid" => Field::Id,
            "msgid_plural" => Field::IdPlural,
            "msgstr" => Field::Str,
            k if k.starts_with("msgstr[") && k.ends_with(']') => {
                let n = k["msgstr[".len()..k.len() - 1]
                    .parse::<usize>()
                    .map_err(|_| parse_err(format!("bad plural index in {k}")))?;
                Field::StrPlural(n)
            }
            other => return Err(parse_err(format!("unexpected keyword {other:?}")).into()),
        };

        if matches!(field, Field::Ctxt | Field::Id) && pending.in_msgstr() {
            flush(&mut pending, &mut catalog, &mut header_done);
        }
        if field.is_msgstr() && !pending.has_id {
            return Err(parse_err("msgstr without msgid".into()).into());
        }
        if field == Field::IdPlural && !pending.has_id {
            return Err(parse_err("msgid_plural without msgid".into()).into());
        }

        let value = parse_po_string(rest).map_err(|m| parse_err(m))?;
        if field == Field::Id {
            pending.has_id = true;
        }
        if obsolete {
            pending.entry.obsolete = true;
        }
        *pending.slot(field) = value;
        pending.field = Some(field);
    }

    flush(&mut pending, &mut catalog, &mut header_done);
    Ok(catalog)
}

fn parse_po_string(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return Err(format!("invalid po string: {s}"));
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    // unknown escapes are kept verbatim
                    out.push('\\');
                    out.push(other);
                }
                None => return Err(format!("dangling escape in {s}")),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn escape_po(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_field<W: Write>(w: &mut W, prefix: &str, keyword: &str, value: &str) -> std::io::Result<()> {
    // gettext multi-line form only when a newline sits before the end
    let multiline = value
        .find('\n')
        .map(|i| i + 1 < value.len())
        .unwrap_or(false);
    if !multiline {
        return writeln!(w, "{prefix}{keyword} \"{}\"", escape_po(value));
    }
    writeln!(w, "{prefix}{keyword} \"\"")?;
    for seg in value.split_inclusive('\n') {
        writeln!(w, "{prefix}\"{}\"", escape_po(seg))?;
    }
    Ok(())
}

fn write_entry<W: Write>(w: &mut W, e: &CatalogEntry) -> std::io::Result<()> {
    for c in &e.translator_comments {
        if c.is_empty() {
            writeln!(w, "#")?;
        } else {
            writeln!(w, "# {c}")?;
        }
    }
    for c in &e.extracted_comments {
        writeln!(w, "#. {c}")?;
    }
    if !e.references.is_empty() {
        writeln!(w, "#: {}", e.references.join(" "))?;
    }
    if !e.flags.is_empty() {
        writeln!(w, "#, {}", e.flags.join(", "))?;
    }
    let prefix = if e.obsolete { "#~ " } else { "" };
    for p in &e.previous {
        writeln!(w, "{}| {p}", if e.obsolete { "#~" } else { "#" })?;
    }
    if let Some(ctx) = &e.msgctxt {
        write_field(w, prefix, "msgctxt", ctx)?;
    }
    write_field(w, prefix, "msgid", &e.msgid)?;
    if let Some(plural) = &e.msgid_plural {
        write_field(w, prefix, "msgid_plural", plural)?;
        if e.msgstr_plural.is_empty() {
            write_field(w, prefix, "msgstr[0]", "")?;
        }
        for (n, s) in e.msgstr_plural.iter().enumerate() {
            write_field(w, prefix, &format!("msgstr[{n}]"), s)?;
        }
    } else {
        write_field(w, prefix, "msgstr", &e.msgstr)?;
    }
    Ok(())
}

/// Serialize a catalog into any writer.
pub fn write_catalog_to<W: Write>(mut w: W, catalog: &Catalog) -> Result<()> {
    let mut first = true;
    if !catalog.metadata.is_empty() {
        writeln!(w, "msgid \"\"")?;
        writeln!(w, "msgstr \"\"")?;
        for (k, v) in &catalog.metadata {
            writeln!(w, "\"{}\"", escape_po(&format!("{k}: {v}\n")))?;
        }
        first = false;
    }
    for e in &catalog.entries {
        if !first {
            writeln!(w)?;
        }
        write_entry(&mut w, e)?;
        first = false;
    }
    w.flush()?;
    Ok(())
}

/// Render a catalog to a string.
pub fn render_catalog(catalog: &Catalog) -> Result<String> {
    let mut buf = Vec::new();
    write_catalog_to(&mut buf, catalog)?;
    Ok(String::from_utf8(buf)?)
}

/// Write a catalog file, replacing any existing content.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    write_catalog_to(BufWriter::new(file), catalog)
}
