//! Page rendering.
//!
//! Pure functions from resolved entries to [`GeneratedPage`] values: one
//! page per header with a table of contents and per-symbol sections, plus
//! one page per documentation group and per standalone page directive.
//! Nothing here touches the filesystem; the orchestrator writes pages out
//! after the link checker has seen all of them.

use cdox_model::{Category, Doc, Entry, EntryPayload, GeneratedPage, page_path};

/// Escape angle brackets for MDX table cells, where raw `<`/`>` would be
/// parsed as JSX. Code fences are left untouched.
fn escape_angle(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

/// Render the `## API` table of contents grouped by category.
fn render_toc(entries: &[Entry], out: &mut Vec<String>) {
    out.push("## API".to_owned());
    for category in Category::TOC_ORDER {
        let group: Vec<&Entry> = entries.iter().filter(|e| e.category == category).collect();
        if group.is_empty() {
            continue;
        }
        out.push(format!("\n### {}", category.toc_label()));
        for entry in group {
            out.push(format!("- [`{}`](#{})", entry.name, entry.anchor));
        }
    }
    out.push(String::new());
}

/// Render the documentation fields shared by every category.
fn render_doc_common(doc: &Doc, out: &mut Vec<String>) {
    if let Some(brief) = &doc.brief {
        out.push(format!("{brief}\n"));
    }
    if let Some(description) = &doc.description {
        out.push(format!("{description}\n"));
    }
    for (label, items) in [
        ("Notes", &doc.notes),
        ("Warnings", &doc.warnings),
        ("TODOs", &doc.todos),
        ("Known Bugs", &doc.bugs),
        ("See also", &doc.see),
    ] {
        if !items.is_empty() {
            out.push(format!("\n**{label}**"));
            for item in items {
                out.push(format!("- {item}"));
            }
        }
    }
    if let Some(deprecated) = &doc.deprecated {
        out.push(format!("\n> **Deprecated** — {deprecated}"));
    }
    if let Some(since) = &doc.since {
        out.push(format!("\n> Since: {since}"));
    }
}

/// Section heading with the entry's anchor.
fn render_heading(entry: &Entry, out: &mut Vec<String>) {
    out.push(format!("<a id=\"{}\"></a>", entry.anchor));
    out.push(format!("### `{}`", entry.name));
}

fn render_function(entry: &Entry, signature: &str, out: &mut Vec<String>) {
    render_heading(entry, out);
    if !entry.from_docblock {
        out.push(
            "> ⚠️ No doc comment found. Add a `/** ... */` block above this declaration.\n"
                .to_owned(),
        );
    }
    render_doc_common(&entry.doc, out);

    out.push("\n**Signature**\n```c".to_owned());
    out.push(signature.trim().to_owned());
    out.push("```".to_owned());

    if !entry.doc.params.is_empty() {
        out.push("\n**Parameters**\n| Name | Description |".to_owned());
        out.push("|------|-------------|".to_owned());
        for p in &entry.doc.params {
            out.push(format!("| `{}` | {} |", p.name, p.desc));
        }
    }
    if let Some(returns) = &entry.doc.returns {
        out.push(format!("\n**Returns**\n{returns}"));
    }
    if !entry.doc.errors.is_empty() {
        out.push("\n**Errors**".to_owned());
        for e in &entry.doc.errors {
            out.push(format!("- {e}"));
        }
    }
    if let Some(example) = &entry.doc.example {
        out.push("\n**Example**\n```c".to_owned());
        out.push(example.clone());
        out.push("```".to_owned());
    }
}

fn render_macro_const(entry: &Entry, value: Option<&str>, out: &mut Vec<String>) {
    render_heading(entry, out);
    render_doc_common(&entry.doc, out);
    if let Some(value) = value {
        out.push("\n**Value**\n```c".to_owned());
        out.push(format!("#define {} {value}", entry.name));
        out.push("```".to_owned());
    }
}

fn render_macro_fn(entry: &Entry, signature: &str, out: &mut Vec<String>) {
    render_heading(entry, out);
    render_doc_common(&entry.doc, out);
    out.push("\n**Signature**\n```c".to_owned());
    let args_on = signature.find('(').map_or(signature, |i| &signature[i..]);
    out.push(format!("#define {}{args_on}", entry.name));
    out.push("```".to_owned());
}

fn render_typedef(entry: &Entry, definition: &str, out: &mut Vec<String>) {
    render_heading(entry, out);
    render_doc_common(&entry.doc, out);
    out.push("\n**Definition**\n```c".to_owned());
    let definition = definition.trim();
    if definition.ends_with(';') {
        out.push(definition.to_owned());
    } else {
        out.push(format!("{definition};"));
    }
    out.push("```".to_owned());
}

fn render_enum(entry: &Entry, enumerators: &[cdox_model::Enumerator], out: &mut Vec<String>) {
    render_heading(entry, out);
    render_doc_common(&entry.doc, out);
    if !enumerators.is_empty() {
        out.push("\n**Enumerators**\n| Name | Value |".to_owned());
        out.push("|------|-------|".to_owned());
        for e in enumerators {
            out.push(format!("| `{}` | {} |", e.name, e.value.as_deref().unwrap_or("")));
        }
    }
}

fn render_aggregate(entry: &Entry, members: &[cdox_model::Member], out: &mut Vec<String>) {
    render_heading(entry, out);
    render_doc_common(&entry.doc, out);
    if !members.is_empty() {
        out.push("\n**Members**\n| Name | Type |".to_owned());
        out.push("|------|------|".to_owned());
        for m in members {
            out.push(format!("| `{}` | `{}` |", m.name, escape_angle(&m.ty)));
        }
    }
}

/// Render the page for one header from its symbol entries.
///
/// `header_rel` is the header's input-root-relative path; the page lands at
/// the mirrored path with an `.mdx` extension.
#[must_use]
pub fn render_header_page(header_rel: &str, entries: &[Entry]) -> GeneratedPage {
    let title = header_rel
        .rsplit('/')
        .next()
        .unwrap_or(header_rel)
        .trim_end_matches(".h");
    let mut out: Vec<String> = Vec::new();
    render_toc(entries, &mut out);

    for entry in entries {
        match &entry.payload {
            EntryPayload::Function { signature, .. } => render_function(entry, signature, &mut out),
            EntryPayload::MacroConst { value } => {
                render_macro_const(entry, value.as_deref(), &mut out);
            }
            EntryPayload::MacroFn { signature, .. } => render_macro_fn(entry, signature, &mut out),
            EntryPayload::Typedef { definition } => render_typedef(entry, definition, &mut out),
            EntryPayload::Enum { enumerators } => render_enum(entry, enumerators, &mut out),
            EntryPayload::Aggregate { members } => render_aggregate(entry, members, &mut out),
            EntryPayload::None | EntryPayload::Page { .. } => {}
        }
        out.push(String::new());
    }

    let body = format!(
        "---\ntitle: {title}\n---\n\n> Auto-generated from `{header_rel}`. \
Edit doc comments in the header and rebuild.\n\n{}\n",
        out.join("\n")
    );
    GeneratedPage::new(
        page_path(header_rel),
        body,
        entries.iter().map(|e| e.anchor.clone()),
    )
}

/// Render the auxiliary page for a documentation group.
#[must_use]
pub fn render_group_page(group: &Entry) -> GeneratedPage {
    let title = group.doc.brief.as_deref().unwrap_or(&group.name);
    let description = group.doc.description.as_deref().unwrap_or("");
    let body = format!(
        "---\ntitle: {title}\n---\n\n> Group: `{}`\n\n{description}\n",
        group.name
    );
    let stem = group.file_rel.trim_end_matches(".h");
    GeneratedPage::new(
        format!("{stem}.group.{}.mdx", group.name),
        body,
        [group.anchor.clone()],
    )
}

/// Render a standalone page declared via `@page`.
#[must_use]
pub fn render_standalone_page(page: &Entry, page_id: &str, page_title: &str) -> GeneratedPage {
    let text = page
        .doc
        .description
        .as_deref()
        .or(page.doc.brief.as_deref())
        .unwrap_or("");
    let body = format!("---\ntitle: {page_title}\n---\n\n{text}\n");
    let stem = page.file_rel.trim_end_matches(".h");
    GeneratedPage::new(
        format!("{stem}.page.{page_id}.mdx"),
        body,
        [page.anchor.clone()],
    )
}
