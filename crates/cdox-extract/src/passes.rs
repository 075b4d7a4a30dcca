//! Declaration recognizer passes.
//!
//! Extraction runs a fixed sequence of passes over one header. Every pass
//! implements [`Pass`] and receives the same [`SourceView`] plus a mutable
//! [`ExtractContext`] holding the entries found so far and the claimed
//! identities, so ordering and precedence are explicit: a declaration
//! claimed by an earlier pass is never re-captured by a later one.
//!
//! Pass order:
//!
//! 1. File-level docblock (`@file`, `@page` or `@defgroup` in the first block)
//! 2. Docblock-paired function prototypes
//! 3. Bare function prototypes
//! 4. Inline function definitions (ending in `{`)
//! 5. Object-like macros, then function-like macros
//! 6. Typedefs (callback typedefs detected by a function-pointer shape)
//! 7. Enums
//! 8. Structs and unions

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use cdox_model::{
    Category, Doc, Entry, EntryPayload, Enumerator, Member, PageDef, SigParam,
};

use crate::comments::{clean_signature, function_name, strip_comments};
use crate::docblock::parse_docblock;

/// Qualifiers and type names that may precede a function name.
const QUAL_OR_TYPE: &str = "(?:extern|static|inline|const|unsigned|signed|void|int|char|long|\
short|float|double|size_t|ssize_t|bool|struct\\s+[A-Za-z_]\\w*|enum\\s+[A-Za-z_]\\w*|\
union\\s+[A-Za-z_]\\w*|[A-Za-z_]\\w+)";

/// A `/** ... */` docblock, body captured.
static DOCBLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").expect("invalid docblock regex"));

/// First semicolon-terminated prototype in a lookahead window. One or more
/// qualifier/type tokens, then the function name and a balanced parameter
/// list with at most one level of nesting (enough for function-pointer
/// parameters, no bodies).
static PROTO_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?m)^[ \\t]*(?:{QUAL_OR_TYPE}[ \\t\\*]+)+([A-Za-z_]\\w*)\\s*\\((?:[^(){{}};]|\\([^()]*\\))*\\)\\s*;"
    ))
    .expect("invalid prototype regex")
});

/// Full-line prototypes anywhere in the comment-free buffer.
static PROTO_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?m)^[ \\t]*(?:{QUAL_OR_TYPE}[ \\t\\*]+)+([A-Za-z_]\\w*)\\s*\\((?:[^(){{}};]|\\([^()]*\\))*\\)\\s*;[ \\t]*$"
    ))
    .expect("invalid prototype regex")
});

/// Function definitions ending in `{` rather than `;`.
static FN_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?m)^[ \\t]*(?:{QUAL_OR_TYPE}[ \\t\\*]+)+([A-Za-z_]\\w*)\\s*\\((?:[^(){{}};]|\\([^()]*\\))*\\)\\s*\\{{"
    ))
    .expect("invalid definition regex")
});

/// `#define NAME value` (whitespace between name and value required, which
/// is what distinguishes it from a function-like macro).
static MACRO_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#\s*define\s+([A-Za-z_]\w+)\s+(.+?)\s*$").expect("invalid macro regex")
});

/// `#define NAME(args) body`, opening paren immediately after the name.
static MACRO_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#\s*define\s+([A-Za-z_]\w+)\(([^)]*)\)\s+(.+?)\s*$")
        .expect("invalid macro regex")
});

/// Single-line `typedef ...;`.
static TYPEDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*typedef\s+(.+?);\s*$").expect("invalid typedef regex"));

/// Trailing identifier of a typedef body.
static TRAILING_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_]\w*)\s*$").expect("invalid identifier regex"));

/// Function-pointer shape marking a callback typedef; captures the name.
static FN_POINTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*\*\s*([A-Za-z_]\w*)\s*\)\s*\(").expect("invalid fn pointer regex")
});

/// Brace-delimited enum with optional leading/trailing name.
static ENUM_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:^|\n)[ \t]*enum\s+([A-Za-z_]\w*)?\s*\{(.*?)\}\s*([A-Za-z_]\w*)?\s*;")
        .expect("invalid enum regex")
});

/// Brace-delimited struct/union with optional leading/trailing name.
static AGGREGATE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)(?:^|\n)[ \t]*(struct|union)\s+([A-Za-z_]\w*)?\s*\{(.*?)\}\s*([A-Za-z_]\w*)?\s*;",
    )
    .expect("invalid aggregate regex")
});

/// `type name;` member line.
static MEMBER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+([A-Za-z_]\w*)\s*;\s*$").expect("invalid member regex"));

/// `NAME` or `NAME = value` enumerator.
static ENUMERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)(?:\s*=\s*(.+))?$").expect("invalid enumerator regex")
});

/// How far past a docblock the paired pass looks for a prototype, in bytes.
const PAIRING_WINDOW: usize = 2000;

/// The two text buffers every pass works on.
pub struct SourceView<'a> {
    /// Preprocessed source, comments intact (needed to find docblocks).
    pub raw: &'a str,
    /// Preprocessed source with all comments stripped; the substrate for
    /// every structural pattern.
    pub code: &'a str,
    /// Header path relative to its input root.
    pub file_rel: &'a str,
}

/// Explicit per-file extraction state threaded through the passes.
///
/// Tracks claimed signatures and claimed `(category, name)` identities so
/// the same declaration is never captured twice; later duplicate
/// discoveries are dropped, never overwritten.
#[derive(Default)]
pub struct ExtractContext {
    entries: Vec<Entry>,
    claimed_sigs: HashSet<String>,
    claimed_idents: HashSet<(Category, String)>,
}

impl ExtractContext {
    /// True when `(category, name)` is still unclaimed.
    #[must_use]
    pub fn is_free(&self, category: Category, name: &str) -> bool {
        !self
            .claimed_idents
            .contains(&(category, name.to_owned()))
    }

    /// Claim an identity, and optionally a signature, then record the entry.
    ///
    /// Returns false (dropping the entry) when the identity or signature
    /// was already claimed by an earlier pass.
    pub fn claim(&mut self, entry: Entry, signature: Option<&str>) -> bool {
        let ident = (entry.category, entry.name.clone());
        if self.claimed_idents.contains(&ident) {
            return false;
        }
        if let Some(sig) = signature {
            let sig_key = format!("{}::{sig}", entry.category);
            if self.claimed_sigs.contains(&sig_key) {
                return false;
            }
            self.claimed_sigs.insert(sig_key);
        }
        self.claimed_idents.insert(ident);
        self.entries.push(entry);
        true
    }

    /// All entries recorded so far, in discovery order.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

/// One declaration recognizer.
///
/// Implementations scan the [`SourceView`] and claim entries on the
/// context. The trait is the seam that would let a real tokenizer replace
/// the regex recognizers.
pub trait Pass {
    /// Short name for trace logs.
    fn name(&self) -> &'static str;
    /// Scan `src` and record recognized declarations on `ctx`.
    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext);
}

/// Short hex digest used for synthetic anonymous-aggregate names.
fn content_hash(body: &str, len: usize) -> String {
    let digest = hex::encode(Sha256::digest(body.as_bytes()));
    digest[..len].to_owned()
}

/// Back `idx` off to the nearest char boundary at or below it.
fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx.min(s.len())
}

/// Best-effort split of a cleaned signature's parameter list.
#[must_use]
pub fn parse_signature_params(signature: &str) -> Vec<SigParam> {
    let Some(open) = signature.find('(') else {
        return Vec::new();
    };
    let Some(close) = signature.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    let list = signature[open + 1..close].trim();
    if list.is_empty() || list == "void" {
        return Vec::new();
    }

    // Split on top-level commas only; function-pointer params nest parens.
    let mut parts: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in list.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }

    static TYPE_THEN_NAME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(.+?)\s*([A-Za-z_]\w*)$").expect("invalid param regex"));

    parts
        .iter()
        .map(|p| {
            let text = p.trim();
            TYPE_THEN_NAME.captures(text).map_or_else(
                || SigParam {
                    name: text.to_owned(),
                    ty: text.to_owned(),
                },
                |caps| SigParam {
                    name: caps[2].to_owned(),
                    ty: caps[1].trim().to_owned(),
                },
            )
        })
        .collect()
}

/// Parse `type name;` member lines out of an aggregate body.
#[must_use]
pub fn parse_members(body: &str) -> Vec<Member> {
    body.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            MEMBER_LINE.captures(line).map(|caps| Member {
                name: caps[2].to_owned(),
                ty: caps[1].trim().to_owned(),
            })
        })
        .collect()
}

/// Parse enumerators out of an enum body. Values stay raw text.
#[must_use]
pub fn parse_enumerators(body: &str) -> Vec<Enumerator> {
    body.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            ENUMERATOR.captures(part).map(|caps| Enumerator {
                name: caps[1].to_owned(),
                value: caps.get(2).map(|m| m.as_str().trim().to_owned()),
            })
        })
        .collect()
}

/// Build a function entry from a cleaned prototype.
fn function_entry(
    file_rel: &str,
    signature: String,
    doc: Doc,
    from_docblock: bool,
) -> Option<(Entry, String)> {
    let name = function_name(&signature)?.to_owned();
    let params = parse_signature_params(&signature);
    let mut entry = Entry::new(
        Category::Function,
        name,
        file_rel,
        from_docblock,
        doc,
        EntryPayload::Function {
            signature: signature.clone(),
            params,
        },
    );
    if !from_docblock {
        entry.warn("no documentation comment attached to this declaration");
    }
    Some((entry, signature))
}

/// File-level docblock: the first `/** ... */` block yields a `file` entry
/// when it carries `@file`, a `@page`, or a `@defgroup`.
pub struct FileBlockPass;

impl Pass for FileBlockPass {
    fn name(&self) -> &'static str {
        "file-block"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        let Some(caps) = DOCBLOCK.captures(src.raw) else {
            return;
        };
        let doc = parse_docblock(&caps[1]);
        if !doc.tags.contains_key("file") && doc.page.is_none() && doc.group_defs.is_empty() {
            return;
        }
        let name = src
            .file_rel
            .rsplit('/')
            .next()
            .unwrap_or(src.file_rel)
            .to_owned();
        ctx.claim(
            Entry::new(Category::File, name, src.file_rel, true, doc, EntryPayload::None),
            None,
        );
    }
}

/// Docblock-paired prototypes: for every structured comment, look ahead a
/// bounded window for the first semicolon-terminated prototype. The window
/// is cut short at the next docblock so a comment never pairs with a
/// prototype that belongs to a later one.
pub struct DocumentedPrototypePass;

impl Pass for DocumentedPrototypePass {
    fn name(&self) -> &'static str {
        "documented-prototypes"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for caps in DOCBLOCK.captures_iter(src.raw) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let body = &caps[1];

            let tail_start = whole.end();
            let mut tail_end =
                floor_char_boundary(src.raw, (tail_start + PAIRING_WINDOW).min(src.raw.len()));
            let tail = &src.raw[tail_start..tail_end];
            if let Some(next_block) = tail.find("/**") {
                tail_end = tail_start + next_block;
            }
            let window = &src.raw[tail_start..tail_end];

            let Some(proto) = PROTO_FIRST.find(window) else {
                continue;
            };
            let signature = clean_signature(proto.as_str());
            let doc = parse_docblock(body);
            if let Some((entry, sig)) = function_entry(src.file_rel, signature, doc, true) {
                ctx.claim(entry, Some(&sig));
            }
        }
    }
}

/// Bare prototypes anywhere in the comment-free buffer.
pub struct BarePrototypePass;

impl Pass for BarePrototypePass {
    fn name(&self) -> &'static str {
        "bare-prototypes"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for m in PROTO_LINE.find_iter(src.code) {
            let signature = clean_signature(m.as_str());
            if let Some((entry, sig)) = function_entry(src.file_rel, signature, Doc::default(), false)
            {
                ctx.claim(entry, Some(&sig));
            }
        }
    }
}

/// Inline function definitions: declarations ending in `{`. The displayed
/// signature is truncated at the closing parenthesis with a synthetic `;`.
pub struct InlineDefinitionPass;

impl Pass for InlineDefinitionPass {
    fn name(&self) -> &'static str {
        "inline-definitions"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for m in FN_DEFINITION.find_iter(src.code) {
            let text = m.as_str();
            let head = text.find('{').map_or(text, |i| &text[..i]);
            let proto = head.rfind(')').map_or(head, |i| &head[..=i]);
            let signature = format!("{};", clean_signature(proto));
            if let Some((entry, sig)) = function_entry(src.file_rel, signature, Doc::default(), false)
            {
                ctx.claim(entry, Some(&sig));
            }
        }
    }
}

/// Object-like macros (`#define NAME value`).
pub struct ObjectMacroPass;

impl Pass for ObjectMacroPass {
    fn name(&self) -> &'static str {
        "object-macros"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for caps in MACRO_OBJECT.captures_iter(src.code) {
            let entry = Entry::new(
                Category::MacroConst,
                &caps[1],
                src.file_rel,
                false,
                Doc::default(),
                EntryPayload::MacroConst {
                    value: Some(caps[2].to_owned()),
                },
            );
            ctx.claim(entry, None);
        }
    }
}

/// Function-like macros (`#define NAME(args) body`).
pub struct FunctionMacroPass;

impl Pass for FunctionMacroPass {
    fn name(&self) -> &'static str {
        "function-macros"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for caps in MACRO_FUNCTION.captures_iter(src.code) {
            let name = &caps[1];
            let args = &caps[2];
            let body = &caps[3];
            let params: Vec<SigParam> = args
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(|a| SigParam {
                    name: a.to_owned(),
                    ty: "macro-param".to_owned(),
                })
                .collect();
            let entry = Entry::new(
                Category::MacroFn,
                name,
                src.file_rel,
                false,
                Doc::default(),
                EntryPayload::MacroFn {
                    signature: format!("{name}({args}) /* {body} */"),
                    params,
                },
            );
            ctx.claim(entry, None);
        }
    }
}

/// Typedefs; callback typedefs are detected by a function-pointer shape.
pub struct TypedefPass;

impl Pass for TypedefPass {
    fn name(&self) -> &'static str {
        "typedefs"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for caps in TYPEDEF.captures_iter(src.code) {
            let body = &caps[1];
            // A function-pointer body never ends in an identifier; its name
            // sits inside the `(*name)` group instead.
            let (category, name) = if let Some(ptr) = FN_POINTER.captures(body) {
                (Category::CallbackTypedef, ptr[1].to_owned())
            } else if let Some(trailing) = TRAILING_IDENT.captures(body) {
                (Category::Typedef, trailing[1].to_owned())
            } else {
                continue;
            };
            let entry = Entry::new(
                category,
                name,
                src.file_rel,
                false,
                Doc::default(),
                EntryPayload::Typedef {
                    definition: caps[0].trim().to_owned(),
                },
            );
            ctx.claim(entry, None);
        }
    }
}

/// Enums with brace-delimited enumerator lists. Anonymous enums get a
/// synthetic name derived from a content hash of the body so they stay
/// stable and addressable across runs.
pub struct EnumPass;

impl Pass for EnumPass {
    fn name(&self) -> &'static str {
        "enums"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for caps in ENUM_DECL.captures_iter(src.code) {
            let body = &caps[2];
            let name = caps
                .get(1)
                .or_else(|| caps.get(3))
                .map_or_else(
                    || format!("anonymous_enum_{}", content_hash(body, 6)),
                    |m| m.as_str().to_owned(),
                );
            let entry = Entry::new(
                Category::Enum,
                name,
                src.file_rel,
                false,
                Doc::default(),
                EntryPayload::Enum {
                    enumerators: parse_enumerators(body),
                },
            );
            ctx.claim(entry, None);
        }
    }
}

/// Structs and unions with brace-delimited member lists. Anonymous
/// aggregates get a content-hash name like anonymous enums.
pub struct AggregatePass;

impl Pass for AggregatePass {
    fn name(&self) -> &'static str {
        "aggregates"
    }

    fn recognize(&self, src: &SourceView<'_>, ctx: &mut ExtractContext) {
        for caps in AGGREGATE_DECL.captures_iter(src.code) {
            let kind = if &caps[1] == "union" {
                Category::Union
            } else {
                Category::Struct
            };
            let body = &caps[3];
            let name = caps
                .get(2)
                .or_else(|| caps.get(4))
                .map_or_else(
                    || format!("anonymous_{}_{}", &caps[1], content_hash(body, 6)),
                    |m| m.as_str().to_owned(),
                );
            let entry = Entry::new(
                kind,
                name,
                src.file_rel,
                false,
                Doc::default(),
                EntryPayload::Aggregate {
                    members: parse_members(body),
                },
            );
            ctx.claim(entry, None);
        }
    }
}

/// Run the full pass sequence over one preprocessed header.
///
/// `preprocessed` must already have inactive conditional branches blanked;
/// comment stripping happens here.
#[must_use]
pub fn extract_entries(preprocessed: &str, file_rel: &str) -> Vec<Entry> {
    let code = strip_comments(preprocessed);
    let src = SourceView {
        raw: preprocessed,
        code: &code,
        file_rel,
    };

    let passes: [&dyn Pass; 9] = [
        &FileBlockPass,
        &DocumentedPrototypePass,
        &BarePrototypePass,
        &InlineDefinitionPass,
        &ObjectMacroPass,
        &FunctionMacroPass,
        &TypedefPass,
        &EnumPass,
        &AggregatePass,
    ];
    let mut ctx = ExtractContext::default();
    for pass in passes {
        debug!(file = file_rel, pass = pass.name(), "running pass");
        pass.recognize(&src, &mut ctx);
    }
    ctx.into_entries()
}

/// Derive group and standalone-page entries from directives found in the
/// extracted entries' docblocks.
#[must_use]
pub fn group_and_page_entries(entries: &[Entry], file_rel: &str) -> Vec<Entry> {
    let mut extras = Vec::new();
    for entry in entries {
        for def in &entry.doc.group_defs {
            let mut doc = entry.doc.clone();
            doc.brief = Some(def.title.clone());
            extras.push(Entry::new(
                Category::Group,
                &def.id,
                file_rel,
                true,
                doc,
                EntryPayload::None,
            ));
        }
        if let Some(PageDef { id, title }) = &entry.doc.page {
            extras.push(Entry::new(
                Category::Page,
                id,
                file_rel,
                true,
                entry.doc.clone(),
                EntryPayload::Page {
                    page_id: id.clone(),
                    page_title: title.clone(),
                },
            ));
        }
    }
    extras
}
