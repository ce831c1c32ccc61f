use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::parsing::{Diagnostic, DocParser};
use crate::tree::{NodeId, Root};

const INCLUDE_BEGIN: &str = "#+BEGIN_FILE_INCLUDE";
const INCLUDE_END: &str = "#+END_FILE_INCLUDE";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp"];

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("End of file reached before include section in {0} terminated")]
    UnterminatedInclude(PathBuf),
    #[error("File {including} tried to include non-existent file {missing}")]
    MissingInclude { including: PathBuf, missing: PathBuf },
    #[error("Include cycle: {}", format_cycle(.0))]
    IncludeCycle(Vec<PathBuf>),
    #[error("Bad file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

fn format_cycle(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Whether `path` names an image file by its extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Text of `path` with every include section replaced by the contents of the
/// files it lists. Nested includes are expanded too.
pub fn preprocess_includes(path: &Path, text: &str) -> Result<String, IoError> {
    let mut included = vec![];
    let mut stack = vec![fs::canonicalize(path)?];
    expand(path, text, &mut stack, &mut included)
}

/// Expands includes of `path`, pushing every file spliced in onto `included`.
/// `stack` holds the canonical paths currently being expanded.
fn expand(
    path: &Path,
    text: &str,
    stack: &mut Vec<PathBuf>,
    included: &mut Vec<PathBuf>,
) -> Result<String, IoError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut out: Vec<String> = vec![];
    let mut lines = text.split('\n');
    while let Some(line) = lines.next() {
        if !starts_with_ignore_case(line, INCLUDE_BEGIN) {
            out.push(line.to_string());
            continue;
        }
        let mut listed = vec![];
        loop {
            match lines.next() {
                Some(l) if starts_with_ignore_case(l, INCLUDE_END) => break,
                Some(l) => listed.push(l.trim().to_string()),
                None => return Err(IoError::UnterminatedInclude(path.to_path_buf())),
            }
        }
        for entry in listed.iter().filter(|e| !e.is_empty()) {
            let target = dir.join(entry);
            if !target.exists() {
                return Err(IoError::MissingInclude {
                    including: path.to_path_buf(),
                    missing: target,
                });
            }
            let canonical = fs::canonicalize(&target)?;
            if stack.contains(&canonical) {
                let mut cycle = stack.clone();
                cycle.push(canonical);
                return Err(IoError::IncludeCycle(cycle));
            }
            debug!("including {} into {}", target.display(), path.display());
            let contents = read_file(&target)?;
            stack.push(canonical.clone());
            let expanded = expand(&target, &contents, stack, included)?;
            stack.pop();
            included.push(canonical);
            out.push(expanded);
        }
    }
    Ok(out.join("\n"))
}

/// Outcome of parsing one source file into the shared root.
#[derive(Debug)]
pub struct BranchReport {
    pub path: PathBuf,
    pub branch: NodeId,
    pub diagnostics: Vec<Diagnostic>,
}

/// Several files parsed into one tree, in input order.
#[derive(Debug)]
pub struct Composition {
    pub root: Root,
    pub branches: Vec<BranchReport>,
    /// Internal links nothing in any branch answers to.
    pub unresolved: Vec<Diagnostic>,
}

impl Composition {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.branches
            .iter()
            .flat_map(|b| b.diagnostics.iter())
            .chain(self.unresolved.iter())
    }
}

/// Reads, preprocesses and parses `paths` into a single root. Files that are
/// included by another file in the set are not parsed on their own.
pub fn compose(paths: &[PathBuf]) -> Result<Composition, IoError> {
    if paths.is_empty() {
        return Err(IoError::InvalidInput("no input files".to_string()));
    }
    let mut included = vec![];
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        let text = read_file(path)?;
        let canonical = fs::canonicalize(path)?;
        let mut stack = vec![canonical.clone()];
        let contents = expand(path, &text, &mut stack, &mut included)?;
        info!("read {} ({} bytes)", path.display(), contents.len());
        expanded.push((path, canonical, contents));
    }

    let mut root = Root::new();
    let mut branches = vec![];
    for (path, canonical, contents) in expanded {
        if included.contains(&canonical) {
            info!("skipping {}, included by another file", path.display());
            continue;
        }
        let mut parser = DocParser::new(&contents, path.display().to_string());
        if let Some(dir) = path.parent() {
            parser = parser.with_base_dir(dir);
        }
        let branch = parser.parse(&mut root);
        branches.push(BranchReport {
            path: path.clone(),
            branch,
            diagnostics: parser.diagnostics().to_vec(),
        });
    }
    let unresolved = root.link_diagnostics();
    Ok(Composition {
        root,
        branches,
        unresolved,
    })
}

pub fn parse_file(path: &Path) -> Result<Composition, IoError> {
    compose(&[path.to_path_buf()])
}

/// Every `*.org` file directly inside `dir`, sorted by name.
pub fn scan_org_files(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::InvalidInput(format!(
            "not a directory: {}",
            dir.display()
        )));
    }
    let pattern = dir.join("*.org");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| IoError::InvalidInput(format!("non UTF-8 path: {}", dir.display())))?;
    let mut files: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

pub fn parse_directory(dir: &Path) -> Result<Composition, IoError> {
    let files = scan_org_files(dir)?;
    if files.is_empty() {
        return Err(IoError::InvalidInput(format!(
            "no .org files in {}",
            dir.display()
        )));
    }
    compose(&files)
}

/// Paths listed one per line in `list`, relative ones taken from its directory.
pub fn read_file_list(list: &Path) -> Result<Vec<PathBuf>, IoError> {
    let dir = list.parent().unwrap_or(Path::new("."));
    Ok(read_file(list)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| dir.join(l))
        .collect())
}

pub fn parse_file_list(list: &Path) -> Result<Composition, IoError> {
    compose(&read_file_list(list)?)
}
