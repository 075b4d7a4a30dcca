//! `cdox generate` command implementation.
//!
//! Orchestrates the full pipeline: walk header trees, preprocess and
//! extract entries, assign stable anchors, resolve cross references, copy
//! assets, render and write pages, then check links and report warnings.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use cdox_anchors::{AnchorKey, AnchorStore, JsonFileStore, assign_anchor, slug};
use cdox_extract::{apply_defines, extract_entries, group_and_page_entries};
use cdox_model::{Category, Entry, EntryPayload, GeneratedPage};
use cdox_render::{
    AssetCopier, SymbolIndex, check_links, render_group_page, render_header_page,
    render_standalone_page, resolver::resolve_references,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Input root directory containing .h files (repeatable).
    #[arg(long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Output root directory for generated .mdx pages (repeatable; either
    /// one shared root or one per input).
    #[arg(long = "output", required = true)]
    outputs: Vec<PathBuf>,

    /// Directory for copied assets (default: _assets under the first
    /// output root).
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Preprocessor symbol to treat as defined (repeatable).
    #[arg(long = "define")]
    defines: Vec<String>,

    /// Anchor map file (default: cdox-anchors.json beside the first output
    /// root).
    #[arg(long)]
    anchor_map: Option<PathBuf>,

    /// Exit non-zero when any extraction warning was recorded.
    #[arg(long)]
    fail_on_warnings: bool,

    /// Enable verbose output (per-pass extraction logs).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Entries of one processed header, as a range into the flat entry list.
struct FileUnit {
    out_root: PathBuf,
    header_dir: PathBuf,
    start: usize,
    len: usize,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error on root-count mismatch, I/O or anchor-store
    /// failures, broken links, or recorded warnings under
    /// `--fail-on-warnings`.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let pairs = pair_roots(&self.inputs, &self.outputs)?;
        let assets_dir = self
            .assets_dir
            .clone()
            .unwrap_or_else(|| self.outputs[0].join("_assets"));
        let anchor_map = self
            .anchor_map
            .clone()
            .unwrap_or_else(|| self.outputs[0].join("cdox-anchors.json"));
        let defines: BTreeSet<String> = self.defines.iter().cloned().collect();

        let mut store = JsonFileStore::load(&anchor_map)?;
        let mut flat: Vec<Entry> = Vec::new();
        let mut units: Vec<FileUnit> = Vec::new();
        let mut header_count = 0usize;

        for (in_root, out_root) in &pairs {
            output.info(&format!("Source: {}", in_root.display()));
            output.info(&format!("Output: {}", out_root.display()));
            write_landing(in_root, out_root)?;

            let headers = walk_headers(in_root)?;
            if headers.is_empty() {
                output.warning(&format!("no .h files under {}", in_root.display()));
                continue;
            }
            for header in headers {
                let rel = rel_unix(in_root, &header);
                info!(header = %rel, "extracting");
                let source = fs::read_to_string(&header)?;
                let preprocessed = apply_defines(&source, &defines);
                let mut entries = extract_entries(&preprocessed, &rel);
                entries.extend(group_and_page_entries(&entries, &rel));
                for entry in &mut entries {
                    assign_entry_anchor(&mut store, entry);
                }

                let start = flat.len();
                let len = entries.len();
                flat.extend(entries);
                units.push(FileUnit {
                    out_root: out_root.clone(),
                    header_dir: header.parent().map_or_else(PathBuf::new, Path::to_path_buf),
                    start,
                    len,
                });
                header_count += 1;
            }
        }

        let index = SymbolIndex::build(&flat);
        resolve_references(&mut flat, &index);

        let copier = AssetCopier::new(self.inputs.clone(), assets_dir);
        for unit in &units {
            for entry in &mut flat[unit.start..unit.start + unit.len] {
                copier.copy_for_entry(entry, &unit.header_dir);
            }
        }

        // Pages grouped per output root so the link checker sees each
        // root's self-contained page set.
        let mut by_root: Vec<(PathBuf, Vec<GeneratedPage>)> = Vec::new();
        for unit in &units {
            let entries = &flat[unit.start..unit.start + unit.len];
            let mut pages = Vec::new();
            let symbols: Vec<Entry> = entries
                .iter()
                .filter(|e| e.category.is_symbol())
                .cloned()
                .collect();
            if let Some(first) = symbols.first() {
                pages.push(render_header_page(&first.file_rel, &symbols));
            }
            for entry in entries {
                match (&entry.category, &entry.payload) {
                    (Category::Group, _) => pages.push(render_group_page(entry)),
                    (Category::Page, EntryPayload::Page { page_id, page_title }) => {
                        pages.push(render_standalone_page(entry, page_id, page_title));
                    }
                    _ => {}
                }
            }
            let pos = by_root.iter().position(|(root, _)| root == &unit.out_root);
            let pos = match pos {
                Some(p) => p,
                None => {
                    by_root.push((unit.out_root.clone(), Vec::new()));
                    by_root.len() - 1
                }
            };
            by_root[pos].1.extend(pages);
        }

        let mut page_count = 0usize;
        for (root, pages) in &by_root {
            for page in pages {
                let dest = root.join(&page.path);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(dest, &page.body)?;
                page_count += 1;
            }
        }

        let mut broken_count = 0usize;
        for (_, pages) in &by_root {
            for link in check_links(pages) {
                output.error(&format!(
                    "{}: broken link `{}` ({})",
                    link.page, link.target, link.reason
                ));
                broken_count += 1;
            }
        }
        if broken_count > 0 {
            return Err(CliError::BrokenLinks(broken_count));
        }

        let mut warning_count = 0usize;
        for entry in &flat {
            for warning in &entry.warnings {
                output.warning(&format!("{}: {warning}", entry.file_rel));
                warning_count += 1;
            }
        }
        if self.fail_on_warnings && warning_count > 0 {
            return Err(CliError::WarningsFatal(warning_count));
        }

        store.save()?;
        output.success(&format!(
            "Generated {page_count} pages from {header_count} headers"
        ));
        Ok(())
    }
}

/// Pair input roots with output roots: one shared output or one per input.
fn pair_roots(
    inputs: &[PathBuf],
    outputs: &[PathBuf],
) -> Result<Vec<(PathBuf, PathBuf)>, CliError> {
    if outputs.len() == 1 {
        return Ok(inputs
            .iter()
            .map(|i| (i.clone(), outputs[0].clone()))
            .collect());
    }
    if outputs.len() == inputs.len() {
        return Ok(inputs.iter().cloned().zip(outputs.iter().cloned()).collect());
    }
    Err(CliError::Config(format!(
        "{} input root(s) need either 1 or {} output root(s), got {}",
        inputs.len(),
        inputs.len(),
        outputs.len()
    )))
}

/// Write the landing `index.mdx` into an output root if it does not exist.
fn write_landing(in_root: &Path, out_root: &Path) -> Result<(), CliError> {
    let landing = out_root.join("index.mdx");
    if landing.exists() {
        return Ok(());
    }
    fs::create_dir_all(out_root)?;
    let source = in_root
        .file_name()
        .map_or_else(|| in_root.display().to_string(), |n| n.to_string_lossy().into_owned());
    fs::write(
        landing,
        format!(
            "---\ntitle: API Reference\n---\nBrowse API references generated from header files in `{source}`.\n"
        ),
    )?;
    Ok(())
}

/// Collect every `.h` file under `root`, sorted by relative path.
fn walk_headers(root: &Path) -> Result<Vec<PathBuf>, CliError> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk(&path, out)?;
            } else if path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("h"))
            {
                out.push(path);
            }
        }
        Ok(())
    }
    let mut headers = Vec::new();
    walk(root, &mut headers)?;
    headers.sort();
    Ok(headers)
}

/// Root-relative path with `/` separators.
fn rel_unix(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Assign the entry's stable anchor through the store, recording slug
/// drift as an entry warning.
fn assign_entry_anchor(store: &mut dyn AnchorStore, entry: &mut Entry) {
    let key = AnchorKey::new(&entry.file_rel, &entry.name, entry.category);
    let proposed = slug(&format!("{}-{}", entry.category.as_str(), entry.name));
    let assignment = assign_anchor(store, &key, &proposed);
    if let Some(old) = &assignment.drifted_from {
        entry.warn(format!(
            "anchor `{}` kept from anchor map; current slug would be `{old}`",
            assignment.anchor
        ));
    }
    entry.anchor = assignment.anchor;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn args(inputs: Vec<PathBuf>, outputs: Vec<PathBuf>) -> GenerateArgs {
        GenerateArgs {
            inputs,
            outputs,
            assets_dir: None,
            defines: Vec::new(),
            anchor_map: None,
            fail_on_warnings: false,
            verbose: false,
        }
    }

    fn run(args: GenerateArgs) -> Result<(), CliError> {
        args.execute(&Output::new())
    }

    #[test]
    fn test_generates_pages_and_anchor_map() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(input.join("net")).unwrap();
        fs::write(
            input.join("net/http.h"),
            "/** @brief Fetch a URL.\n * @param url Target URL.\n * @return Status code.\n */\nint http_get(const char *url);\n",
        )
        .unwrap();

        run(args(vec![input.clone()], vec![out.clone()])).unwrap();

        let page = fs::read_to_string(out.join("net/http.mdx")).unwrap();
        assert!(page.contains("### `http_get`"));
        assert!(page.contains("Fetch a URL."));
        assert!(page.contains("| `url` | Target URL. |"));
        assert!(out.join("index.mdx").exists());
        assert!(out.join("cdox-anchors.json").exists());
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("util.h"),
            "/** @brief Clamp. */\nint clamp(int v, int lo, int hi);\n\n/** @brief Limit. */\n#define LIMIT 64\n",
        )
        .unwrap();

        run(args(vec![input.clone()], vec![out.clone()])).unwrap();
        let first = fs::read_to_string(out.join("util.mdx")).unwrap();
        run(args(vec![input.clone()], vec![out.clone()])).unwrap();
        let second = fs::read_to_string(out.join("util.mdx")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_define_selects_branch() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("feat.h"),
            "#ifdef FEATURE\n/** @brief With feature. */\nint with_feature(void);\n#else\n/** @brief Without. */\nint without_feature(void);\n#endif\n",
        )
        .unwrap();

        let mut a = args(vec![input.clone()], vec![out.clone()]);
        a.defines = vec!["FEATURE".to_owned()];
        run(a).unwrap();

        let page = fs::read_to_string(out.join("feat.mdx")).unwrap();
        assert!(page.contains("with_feature"));
        assert!(!page.contains("without_feature"));
    }

    #[test]
    fn test_root_count_mismatch_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();

        let err = run(args(
            vec![a.clone(), b.clone()],
            vec![tmp.path().join("o1"), tmp.path().join("o2"), tmp.path().join("o3")],
        ))
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_broken_link_fails_with_exit_3() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("a.h"),
            "/** @brief See [details](missing.mdx). */\nint broken_fn(void);\n",
        )
        .unwrap();

        let err = run(args(vec![input], vec![out.clone()])).unwrap_err();
        assert!(matches!(err, CliError::BrokenLinks(1)));
        assert_eq!(err.exit_code(), 3);
        // Pages are written before the check runs.
        assert!(out.join("a.mdx").exists());
    }

    #[test]
    fn test_broken_link_recovers_when_target_appears() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("a.h"),
            "/** @brief See [other](b.mdx). */\nint linked_fn(void);\n",
        )
        .unwrap();

        let err = run(args(vec![input.clone()], vec![out.clone()])).unwrap_err();
        assert!(matches!(err, CliError::BrokenLinks(1)));

        fs::write(input.join("b.h"), "/** @brief Target. */\nint target_fn(void);\n").unwrap();
        run(args(vec![input], vec![out])).unwrap();
    }

    #[test]
    fn test_copydoc_inherits_brief() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("c.h"),
            "/** @brief Source brief. */\nint src_fn(void);\n\n/** @copydoc src_fn */\nint dst_fn(void);\n",
        )
        .unwrap();

        run(args(vec![input], vec![out.clone()])).unwrap();
        let page = fs::read_to_string(out.join("c.mdx")).unwrap();
        assert_eq!(page.matches("Source brief.").count(), 2);
    }

    #[test]
    fn test_fail_on_warnings_exits_4() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("bare.h"), "int undocumented_fn(void);\n").unwrap();

        let mut a = args(vec![input], vec![out]);
        a.fail_on_warnings = true;
        let err = run(a).unwrap_err();
        assert!(matches!(err, CliError::WarningsFatal(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_file_block_gets_no_toc_link() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("include");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("sample.h"),
            "/**\n * @file sample.h\n * @brief File-level overview.\n */\n\n\
             /** @brief Does work. */\nint work(void);\n",
        )
        .unwrap();

        run(args(vec![input], vec![out.clone()])).unwrap();
        let page = fs::read_to_string(out.join("sample.mdx")).unwrap();
        assert!(!page.contains("](#file-"));
        assert!(page.contains("- [`work`](#function-work-"));
        // Every TOC target has a matching anchor tag in the body.
        for (i, _) in page.match_indices("](#") {
            let target: String = page[i + 3..]
                .chars()
                .take_while(|c| *c != ')')
                .collect();
            assert!(
                page.contains(&format!("<a id=\"{target}\"></a>")),
                "TOC links to undefined anchor {target}"
            );
        }
    }

    #[test]
    fn test_shared_output_root_for_two_inputs() {
        let tmp = TempDir::new().unwrap();
        let in_a = tmp.path().join("a");
        let in_b = tmp.path().join("b");
        let out = tmp.path().join("docs");
        fs::create_dir_all(&in_a).unwrap();
        fs::create_dir_all(&in_b).unwrap();
        fs::write(in_a.join("one.h"), "/** @brief One. */\nint one(void);\n").unwrap();
        fs::write(in_b.join("two.h"), "/** @brief Two. */\nint two(void);\n").unwrap();

        run(args(vec![in_a, in_b], vec![out.clone()])).unwrap();
        assert!(out.join("one.mdx").exists());
        assert!(out.join("two.mdx").exists());
    }
}
