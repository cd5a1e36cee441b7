//! Size-bounded zip packaging.
//!
//! Requests are split, in order, into contiguous runs whose source files add
//! up to at most `max_size` bytes. Each run becomes one zip archive holding
//! the source files plus a `Package` manifest describing exactly that run.
//! A file larger than the budget still gets a run of its own.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use zippkg_core::{Pkg, PkgHeader, Request, MAX_PKG_REQUESTS};

use crate::error::IoError;

pub const DEFAULT_MAX_SIZE: u64 = 980 * 1024 * 1024;
pub const DEFAULT_FILE_NAME_PATTERN: &str = "package-${yyMMddHHmmssSSS}-${splitSeq}";
pub const DEFAULT_SOURCE_ID: &str = "0086";
pub const DEFAULT_META_XML_FILE_NAME: &str = "package-metadata.xml";

const TIMESTAMP_TOKEN: &str = "${yyMMddHHmmssSSS}";
const SEQ_TOKEN: &str = "${splitSeq}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// Directory holding the files named by each request.
    pub src_dir: PathBuf,
    /// Directory receiving archives (created if missing).
    pub dst_dir: PathBuf,
    pub max_size: u64,
    /// Archive base name; `${yyMMddHHmmssSSS}` and `${splitSeq}` are substituted.
    pub file_name_pattern: String,
    /// Also mirror each run, unzipped, into `<name>.d/`.
    pub unzip: bool,
    pub source_id: String,
    pub meta_xml_file_name: String,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("sources"),
            dst_dir: PathBuf::from("output"),
            max_size: DEFAULT_MAX_SIZE,
            file_name_pattern: DEFAULT_FILE_NAME_PATTERN.into(),
            unzip: true,
            source_id: DEFAULT_SOURCE_ID.into(),
            meta_xml_file_name: DEFAULT_META_XML_FILE_NAME.into(),
        }
    }
}

/// One archive written by [`package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutput {
    /// 1-based split sequence.
    pub seq: usize,
    pub archive: PathBuf,
    pub mirror_dir: Option<PathBuf>,
    pub request_count: usize,
    pub bytes: u64,
}

// ---------------------------------------------------------------------------
// Split planning
// ---------------------------------------------------------------------------

/// Greedy run builder. Feed file sizes in order; a run closes as soon as the
/// running total would exceed the budget, and the overflowing file starts the
/// next run.
#[derive(Debug)]
pub struct SplitPlanner {
    max_size: u64,
    start: usize,
    next: usize,
    total: u64,
}

impl SplitPlanner {
    pub fn new(max_size: u64) -> Self {
        Self { max_size, start: 0, next: 0, total: 0 }
    }

    /// Add the next file. Returns `(run, bytes)` when a run was closed.
    pub fn push(&mut self, size: u64) -> Option<(Range<usize>, u64)> {
        let index = self.next;
        self.next += 1;

        let total = self.total.saturating_add(size);
        if total <= self.max_size || index == self.start {
            // An oversized first file stays alone in the current run
            self.total = total;
            return None;
        }

        let closed = (self.start..index, self.total);
        self.start = index;
        self.total = size;
        Some(closed)
    }

    /// The final run, flushed unconditionally (empty only for empty input).
    pub fn finish(self) -> (Range<usize>, u64) {
        (self.start..self.next, self.total)
    }
}

/// All runs for `sizes`, in order.
pub fn plan_splits(sizes: &[u64], max_size: u64) -> Vec<Range<usize>> {
    let mut planner = SplitPlanner::new(max_size);
    let mut runs: Vec<Range<usize>> = sizes.iter().filter_map(|&s| planner.push(s)).map(|(r, _)| r).collect();
    runs.push(planner.finish().0);
    runs
}

/// Substitute the timestamp (`yyMMddHHmmssSSS`) and split sequence tokens.
pub fn resolve_file_name(pattern: &str, at: NaiveDateTime, seq: usize) -> String {
    let stamp = at.format("%y%m%d%H%M%S%3f").to_string();
    pattern
        .replace(TIMESTAMP_TOKEN, &stamp)
        .replace(SEQ_TOKEN, &seq.to_string())
}

// ---------------------------------------------------------------------------
// Packaging
// ---------------------------------------------------------------------------

/// Split `requests` and write one archive per run.
///
/// Any filesystem or zip error aborts immediately; archives already written
/// are left in place.
pub fn package(requests: &[Request], options: &PackageOptions) -> Result<Vec<PackageOutput>, IoError> {
    ensure_dir(&options.src_dir)?;

    let mut planner = SplitPlanner::new(options.max_size);
    let mut outputs = Vec::new();

    for request in requests {
        let path = options.src_dir.join(&request.file_name);
        let size = fs::metadata(&path)
            .map_err(|e| IoError::fs("cannot stat source file", &path, e))?
            .len();
        if let Some((run, bytes)) = planner.push(size) {
            let seq = outputs.len() + 1;
            outputs.push(write_split(&requests[run], seq, bytes, options)?);
        }
    }

    let (run, bytes) = planner.finish();
    let seq = outputs.len() + 1;
    outputs.push(write_split(&requests[run], seq, bytes, options)?);
    Ok(outputs)
}

fn ensure_dir(dir: &Path) -> Result<(), IoError> {
    let meta = fs::metadata(dir).map_err(|e| IoError::fs("cannot open source directory", dir, e))?;
    if !meta.is_dir() {
        return Err(IoError::fs(
            "source is not a directory",
            dir,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }
    Ok(())
}

fn write_split(
    run: &[Request],
    seq: usize,
    bytes: u64,
    options: &PackageOptions,
) -> Result<PackageOutput, IoError> {
    if run.len() > MAX_PKG_REQUESTS {
        return Err(IoError::archive(
            &options.dst_dir,
            format!(
                "split {seq} holds {} requests, more than the manifest limit of {MAX_PKG_REQUESTS}",
                run.len()
            ),
        ));
    }

    fs::create_dir_all(&options.dst_dir)
        .map_err(|e| IoError::fs("cannot create output directory", &options.dst_dir, e))?;

    let now = Local::now().naive_local();
    let name = resolve_file_name(&options.file_name_pattern, now, seq);
    let archive_path = options.dst_dir.join(format!("{name}.zip"));

    let file = File::create(&archive_path)
        .map_err(|e| IoError::fs("cannot create archive", &archive_path, e))?;
    let mut zip = ZipWriter::new(file);

    let mirror_dir = if options.unzip {
        let dir = options.dst_dir.join(format!("{name}.d"));
        fs::create_dir(&dir).map_err(|e| IoError::fs("cannot create mirror directory", &dir, e))?;
        Some(dir)
    } else {
        None
    };

    let mut written = HashSet::new();
    for request in run {
        if !written.insert(request.file_name.as_str()) {
            log::debug!("already zipped: {}", request.file_name);
            continue;
        }
        let src = options.src_dir.join(&request.file_name);
        zip_file(&mut zip, &archive_path, &src, &request.file_name)?;
        if let Some(dir) = &mirror_dir {
            copy_into(&src, &dir.join(&request.file_name))?;
        }
    }

    let header = PkgHeader {
        submission_date: now.format("%Y-%m-%d").to_string(),
        submission_time: now.format("%H:%M:%S").to_string(),
        source: options.source_id.clone(),
    };
    let pkg = Pkg::new(seq.to_string(), header, run.to_vec());
    let xml = pkg
        .to_xml()
        .map_err(|e| IoError::serialization(&archive_path, e))?;

    zip.start_file(options.meta_xml_file_name.as_str(), entry_options(false))
        .map_err(|e| IoError::archive(&archive_path, e))?;
    zip.write_all(xml.as_bytes())
        .map_err(|e| IoError::fs("cannot write manifest entry", &archive_path, e))?;
    log::debug!("zipped: {}", options.meta_xml_file_name);

    if let Some(dir) = &mirror_dir {
        let meta_path = dir.join(&options.meta_xml_file_name);
        fs::write(&meta_path, &xml).map_err(|e| IoError::fs("cannot write manifest", &meta_path, e))?;
        log::debug!("copied: {}", options.meta_xml_file_name);
    }

    zip.finish().map_err(|e| IoError::archive(&archive_path, e))?;
    log::info!(
        "wrote {} ({} requests, {} bytes)",
        archive_path.display(),
        run.len(),
        bytes
    );

    Ok(PackageOutput {
        seq,
        archive: archive_path,
        mirror_dir,
        request_count: run.len(),
        bytes,
    })
}

fn entry_options(large: bool) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(large)
}

fn zip_file(
    zip: &mut ZipWriter<File>,
    archive_path: &Path,
    src: &Path,
    entry_name: &str,
) -> Result<(), IoError> {
    let mut input = File::open(src).map_err(|e| IoError::fs("cannot open source file", src, e))?;
    let size = input
        .metadata()
        .map_err(|e| IoError::fs("cannot stat source file", src, e))?
        .len();

    zip.start_file(entry_name, entry_options(size >= u64::from(u32::MAX)))
        .map_err(|e| IoError::archive(archive_path, e))?;
    io::copy(&mut input, zip).map_err(|e| IoError::fs("cannot zip source file", src, e))?;
    log::debug!("zipped: {entry_name}");
    Ok(())
}

fn copy_into(src: &Path, target: &Path) -> Result<(), IoError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| IoError::fs("cannot create directory", parent, e))?;
    }
    fs::copy(src, target).map_err(|e| IoError::fs("cannot copy source file", target, e))?;
    log::debug!("copied: {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    #[test]
    fn greedy_split_on_overflow() {
        // 4 + 5 fits in 10; 4 + 5 + 3 does not
        assert_eq!(plan_splits(&[4, 5, 3, 7, 1], 10), vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn exact_fit_does_not_split() {
        assert_eq!(plan_splits(&[5, 5], 10), vec![0..2]);
    }

    #[test]
    fn oversized_files_get_their_own_run() {
        assert_eq!(plan_splits(&[50, 1, 2], 10), vec![0..1, 1..3]);
        assert_eq!(plan_splits(&[1, 50, 2], 10), vec![0..1, 1..2, 2..3]);
        assert_eq!(plan_splits(&[50], 10), vec![0..1]);
    }

    #[test]
    fn empty_input_flushes_one_empty_run() {
        assert_eq!(plan_splits(&[], 10), vec![0..0]);
    }

    #[test]
    fn planner_reports_run_bytes() {
        let mut planner = SplitPlanner::new(10);
        assert_eq!(planner.push(6), None);
        assert_eq!(planner.push(3), None);
        assert_eq!(planner.push(2), Some((0..2, 9)));
        assert_eq!(planner.finish(), (2..3, 2));
    }

    #[test]
    fn file_name_tokens() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(7, 8, 9, 42)
            .unwrap();
        assert_eq!(
            resolve_file_name(DEFAULT_FILE_NAME_PATTERN, at, 3),
            "package-240305070809042-3"
        );
        assert_eq!(resolve_file_name("batch-${splitSeq}-${splitSeq}", at, 12), "batch-12-12");
        assert_eq!(resolve_file_name("fixed", at, 1), "fixed");
    }

    fn request(seq: usize, file_name: &str) -> Request {
        Request {
            row_number: seq,
            id: seq.to_string(),
            file_name: file_name.into(),
            mime_type: "application/pdf".into(),
            ..Default::default()
        }
    }

    fn fixture(sizes: &[(&str, usize)]) -> (tempfile::TempDir, PackageOptions, Vec<Request>) {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        let mut requests = Vec::new();
        for (i, (name, size)) in sizes.iter().enumerate() {
            let path = src.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, vec![b'x'; *size]).unwrap();
            requests.push(request(i + 1, name));
        }
        let options = PackageOptions {
            src_dir: src,
            dst_dir: dir.path().join("out"),
            max_size: 100,
            file_name_pattern: "pkg-${splitSeq}".into(),
            ..Default::default()
        };
        (dir, options, requests)
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(String::from).collect::<std::collections::BTreeSet<_>>().into_iter().collect()
    }

    fn manifest(path: &Path) -> Pkg {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(DEFAULT_META_XML_FILE_NAME).unwrap();
        let mut text = String::new();
        std::io::Read::read_to_string(&mut entry, &mut text).unwrap();
        Pkg::from_xml(&text).unwrap()
    }

    #[test]
    fn package_writes_one_archive_per_run() {
        let (_dir, options, requests) = fixture(&[("a.pdf", 60), ("b.pdf", 30), ("c.pdf", 20)]);
        let outputs = package(&requests, &options).unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].seq, 1);
        assert_eq!(outputs[0].request_count, 2);
        assert_eq!(outputs[0].bytes, 90);
        assert_eq!(outputs[1].request_count, 1);
        assert!(outputs[0].archive.ends_with("pkg-1.zip"));
        assert!(outputs[1].archive.ends_with("pkg-2.zip"));

        assert_eq!(
            entry_names(&outputs[0].archive),
            ["a.pdf", "b.pdf", DEFAULT_META_XML_FILE_NAME]
        );
        let pkg = manifest(&outputs[0].archive);
        assert_eq!(pkg.id, "1");
        assert_eq!(pkg.header.source, DEFAULT_SOURCE_ID);
        assert_eq!(pkg.trailer.request_count, 2);
        let ids: Vec<_> = pkg.requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);

        let second = manifest(&outputs[1].archive);
        assert_eq!(second.trailer.request_count, 1);
        assert_eq!(second.requests[0].file_name, "c.pdf");
    }

    #[test]
    fn mirror_holds_sources_and_manifest() {
        let (_dir, options, requests) = fixture(&[("a.pdf", 10), ("sub/b.pdf", 10)]);
        let outputs = package(&requests, &options).unwrap();

        let mirror = outputs[0].mirror_dir.as_ref().unwrap();
        assert!(mirror.ends_with("pkg-1.d"));
        assert_eq!(fs::read(mirror.join("a.pdf")).unwrap().len(), 10);
        assert_eq!(fs::read(mirror.join("sub").join("b.pdf")).unwrap().len(), 10);
        let text = fs::read_to_string(mirror.join(DEFAULT_META_XML_FILE_NAME)).unwrap();
        assert_eq!(Pkg::from_xml(&text).unwrap().requests.len(), 2);
    }

    #[test]
    fn unzip_off_skips_mirror() {
        let (_dir, mut options, requests) = fixture(&[("a.pdf", 10)]);
        options.unzip = false;
        let outputs = package(&requests, &options).unwrap();
        assert_eq!(outputs[0].mirror_dir, None);
        assert!(!options.dst_dir.join("pkg-1.d").exists());
    }

    #[test]
    fn oversized_single_file_is_packaged_alone() {
        let (_dir, options, requests) = fixture(&[("big.pdf", 500), ("a.pdf", 10)]);
        let outputs = package(&requests, &options).unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(entry_names(&outputs[0].archive), ["big.pdf", DEFAULT_META_XML_FILE_NAME]);
        assert_eq!(outputs[0].bytes, 500);
    }

    #[test]
    fn empty_request_list_writes_manifest_only_archive() {
        let (_dir, options, _) = fixture(&[]);
        let outputs = package(&[], &options).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(entry_names(&outputs[0].archive), [DEFAULT_META_XML_FILE_NAME]);
        assert_eq!(manifest(&outputs[0].archive).trailer.request_count, 0);
    }

    #[test]
    fn repeated_file_name_is_zipped_once() {
        let (_dir, options, mut requests) = fixture(&[("a.pdf", 10)]);
        requests.push(request(2, "a.pdf"));
        let outputs = package(&requests, &options).unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].request_count, 2);
        assert_eq!(entry_names(&outputs[0].archive), ["a.pdf", DEFAULT_META_XML_FILE_NAME]);
        let pkg = manifest(&outputs[0].archive);
        assert_eq!(pkg.trailer.request_count, 2);
        let ids: Vec<_> = pkg.requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert!(outputs[0].mirror_dir.as_ref().unwrap().join("a.pdf").is_file());
    }

    #[test]
    fn run_over_manifest_limit_is_rejected() {
        let (_dir, options, _) = fixture(&[]);
        let run = vec![request(1, "a.pdf"); MAX_PKG_REQUESTS + 1];
        let err = write_split(&run, 1, 0, &options).unwrap_err();
        assert!(matches!(err, IoError::Archive { .. }), "{err}");
        assert!(!options.dst_dir.exists());
    }

    #[test]
    fn missing_source_file_aborts() {
        let (_dir, options, mut requests) = fixture(&[("a.pdf", 10)]);
        requests.push(request(2, "absent.pdf"));
        let err = package(&requests, &options).unwrap_err();
        assert!(matches!(err, IoError::FileSystem { .. }), "{err}");
        assert!(err.path().ends_with("absent.pdf"));
    }

    #[test]
    fn missing_source_directory_aborts() {
        let (_dir, mut options, requests) = fixture(&[("a.pdf", 10)]);
        options.src_dir = options.src_dir.join("nope");
        assert!(package(&requests, &options).is_err());
    }

    #[test]
    fn existing_mirror_directory_aborts() {
        let (_dir, options, requests) = fixture(&[("a.pdf", 10)]);
        fs::create_dir_all(options.dst_dir.join("pkg-1.d")).unwrap();
        let err = package(&requests, &options).unwrap_err();
        assert!(err.path().ends_with("pkg-1.d"));
    }

    proptest! {
        #[test]
        fn runs_cover_input_and_respect_budget(
            sizes in proptest::collection::vec(0u64..300, 1..60),
            max_size in 1u64..500,
        ) {
            let runs = plan_splits(&sizes, max_size);

            let mut expected_start = 0;
            for run in &runs {
                prop_assert_eq!(run.start, expected_start);
                prop_assert!(!run.is_empty());
                expected_start = run.end;

                let total: u64 = sizes[run.clone()].iter().sum();
                prop_assert!(total <= max_size || run.len() == 1);
            }
            prop_assert_eq!(expected_start, sizes.len());
        }
    }
}
