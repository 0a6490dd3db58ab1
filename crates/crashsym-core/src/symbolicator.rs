//! # Symbolicator
//!
//! Runs the whole pipeline for one crash report:
//!
//! 1. Read the report (missing file is a configuration error)
//! 2. Build the [`SymbolIndex`] from the working directory
//! 3. Extract the crashed thread and the binary image table
//! 4. Resolve each backtrace line
//! 5. Render the report with resolved lines spliced in
//!
//! Everything runs sequentially on the calling thread.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crashsym_core::symbolicator::{SymbolicateOptions, Symbolicator};
//!
//! fn main() -> crashsym_core::Result<()>
//! {
//!     let options = SymbolicateOptions::new(".", "MyApp-2024-01-01.crash");
//!     let report = Symbolicator::new(options).run()?;
//!     print!("{}", report.output);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::{Result, SymbolicateError};
use crate::render::{render_backtrace, render_report};
use crate::report::ReportSections;
use crate::resolve::{AddressResolver, AtosResolver, CachingResolver, DwarfResolver, FrameOutcome, FrameResolver};
use crate::symbols::{DwarfdumpIdentifier, IndexOptions, MachOIdentifier, SliceIdentifier, SymbolIndex};

/// Which identifier/resolver pair to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend
{
    /// `dwarfdump --uuid` and `atos` (Xcode command line tools)
    #[default]
    Tools,
    /// In-process Mach-O and DWARF parsing
    Native,
}

impl FromStr for Backend
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "tools" | "xcode" | "atos" => Ok(Backend::Tools),
            "native" | "dwarf" => Ok(Backend::Native),
            _ => Err(format!("Unknown backend: {s}. Use 'tools' or 'native'")),
        }
    }
}

impl fmt::Display for Backend
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Backend::Tools => "tools",
            Backend::Native => "native",
        };
        write!(f, "{label}")
    }
}

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicateOptions
{
    /// Directory scanned for dSYM bundles.
    pub work_dir: PathBuf,
    /// Crash report; relative paths resolve against `work_dir`.
    pub report: PathBuf,
    pub index: IndexOptions,
    pub backend: Backend,
    /// Memoize resolver answers.
    pub cache: bool,
}

impl SymbolicateOptions
{
    pub fn new(work_dir: impl Into<PathBuf>, report: impl Into<PathBuf>) -> Self
    {
        Self {
            work_dir: work_dir.into(),
            report: report.into(),
            index: IndexOptions::default(),
            backend: Backend::default(),
            cache: true,
        }
    }

    /// The report path with `work_dir` applied.
    pub fn report_path(&self) -> PathBuf
    {
        if self.report.is_absolute() {
            self.report.clone()
        } else {
            self.work_dir.join(&self.report)
        }
    }
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats
{
    /// Lines in the crashed thread's section.
    pub lines: usize,
    pub resolved: usize,
    pub not_a_frame: usize,
    pub no_image: usize,
    pub no_symbol_file: usize,
    pub resolver_errors: usize,
    /// Rows parsed from the binary image table.
    pub images: usize,
    /// Entries in the symbol index.
    pub symbol_files: usize,
}

impl RunStats
{
    fn record(&mut self, outcome: &FrameOutcome)
    {
        match outcome {
            FrameOutcome::Resolved(_) => self.resolved += 1,
            FrameOutcome::NotAFrame => self.not_a_frame += 1,
            FrameOutcome::NoImage => self.no_image += 1,
            FrameOutcome::NoSymbolFile => self.no_symbol_file += 1,
            FrameOutcome::ResolverFailed(_) => self.resolver_errors += 1,
        }
    }

    /// Frames that parsed but were left unresolved.
    pub fn unresolved(&self) -> usize
    {
        self.no_image + self.no_symbol_file + self.resolver_errors
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicationReport
{
    /// The full report with resolved lines spliced in.
    pub output: String,
    pub stats: RunStats,
}

/// Symbolicate `report` text against an existing index.
///
/// This is the pure core of a run: no filesystem access beyond what
/// `resolver` does.
pub fn symbolicate(report: &str, index: &SymbolIndex, resolver: &mut dyn AddressResolver) -> SymbolicationReport
{
    let sections = ReportSections::extract(report);
    let lines = sections.backtrace.lines();

    let outcomes = FrameResolver::new(&sections.images, index, resolver).resolve_lines(lines);

    let mut stats = RunStats {
        lines: lines.len(),
        images: sections.images.len(),
        symbol_files: index.len(),
        ..RunStats::default()
    };
    for outcome in &outcomes {
        stats.record(outcome);
    }

    let rendered = render_backtrace(lines, &outcomes);
    let output = render_report(report, &sections.backtrace, &rendered);
    SymbolicationReport { output, stats }
}

/// Drives one run with its external collaborators.
pub struct Symbolicator
{
    options: SymbolicateOptions,
    identifier: Box<dyn SliceIdentifier>,
    resolver: Box<dyn AddressResolver>,
}

impl Symbolicator
{
    /// Create a symbolicator using the collaborators `options.backend` names.
    pub fn new(options: SymbolicateOptions) -> Self
    {
        let (identifier, resolver): (Box<dyn SliceIdentifier>, Box<dyn AddressResolver>) =
            match (options.backend, options.cache) {
                (Backend::Tools, true) => (Box::new(DwarfdumpIdentifier), Box::new(CachingResolver::new(AtosResolver))),
                (Backend::Tools, false) => (Box::new(DwarfdumpIdentifier), Box::new(AtosResolver)),
                (Backend::Native, true) => (
                    Box::new(MachOIdentifier),
                    Box::new(CachingResolver::new(DwarfResolver::new())),
                ),
                (Backend::Native, false) => (Box::new(MachOIdentifier), Box::new(DwarfResolver::new())),
            };
        Self::with_collaborators(options, identifier, resolver)
    }

    /// Create a symbolicator with explicit collaborators (used by tests).
    pub fn with_collaborators(
        options: SymbolicateOptions,
        identifier: Box<dyn SliceIdentifier>,
        resolver: Box<dyn AddressResolver>,
    ) -> Self
    {
        Self {
            options,
            identifier,
            resolver,
        }
    }

    pub fn options(&self) -> &SymbolicateOptions
    {
        &self.options
    }

    /// Run the pipeline.
    ///
    /// ## Errors
    ///
    /// - [`SymbolicateError::ReportNotFound`] if the report does not exist
    /// - any error from [`SymbolIndex::build`]
    /// - I/O errors reading the report
    pub fn run(&mut self) -> Result<SymbolicationReport>
    {
        let report_path = self.options.report_path();
        let report = read_report(&report_path)?;

        let index = SymbolIndex::build(&self.options.work_dir, &self.options.index, self.identifier.as_ref())?;

        let result = symbolicate(&report, &index, self.resolver.as_mut());
        let stats = result.stats;
        info!(
            report = %report_path.display(),
            lines = stats.lines,
            resolved = stats.resolved,
            unresolved = stats.unresolved(),
            images = stats.images,
            symbol_files = stats.symbol_files,
            "symbolication finished"
        );
        Ok(result)
    }
}

fn read_report(path: &Path) -> Result<String>
{
    if !path.is_file() {
        return Err(SymbolicateError::ReportNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
