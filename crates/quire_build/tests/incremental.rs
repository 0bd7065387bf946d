//! End-to-end incremental builds against in-process boundaries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quire_adapter::{SymbolTable, LEGACY_JDT_COMPILER, RENAMED_JDT_COMPILER};
use quire_build::{
    clean, compile, compile_with, status, BuildError, BuildEvent, BuildRequest, BuildResult,
};
use quire_cache::ChangeKind;
use quire_common::DependencySet;
use quire_config::ResolvedTask;
use quire_worker::{CancelFlag, InProcessFactory, JobError, WorkerPool};

const SIX: &str = "net.sf.jasperreports:jasperreports:6.21.0";
const SEVEN: &str = "net.sf.jasperreports:jasperreports:7.0.1";

struct Project {
    dir: tempfile::TempDir,
    factory: Arc<InProcessFactory>,
}

impl Project {
    fn new() -> Self {
        let factory = InProcessFactory::new(SymbolTable::new().with_class(LEGACY_JDT_COMPILER))
            .with_major_version(7, SymbolTable::new().with_class(RENAMED_JDT_COMPILER));
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/main/jasper")).unwrap();
        Self {
            dir,
            factory: Arc::new(factory),
        }
    }

    fn src(&self) -> PathBuf {
        self.dir.path().join("src/main/jasper")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("build/reports")
    }

    fn write(&self, rel: &str, body: &str) {
        let path = self.src().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn task(&self, deps: &str) -> ResolvedTask {
        ResolvedTask {
            name: "compileJasper".to_string(),
            source_dir: self.src(),
            output_dir: self.out(),
            source_extension: "jrxml".to_string(),
            output_extension: "jasper".to_string(),
            compiler: LEGACY_JDT_COMPILER.to_string(),
            validate_xml: true,
            keep_java_file: false,
            dependencies: DependencySet::parse_all([deps]).unwrap(),
        }
    }

    fn request(&self) -> BuildRequest {
        BuildRequest::for_task(self.task(SIX), &self.dir.path().join(".quire-cache"))
    }

    /// Runs a build and returns the number of boundaries it opened.
    fn build(&self, request: &BuildRequest) -> (BuildResult, usize) {
        let before = self.factory.opened();
        let report = compile(request, self.factory.clone(), CancelFlag::new()).unwrap();
        (report.result, self.factory.opened() - before)
    }
}

fn report(name: &str) -> String {
    format!("<jasperReport name=\"{name}\"/>")
}

#[test]
fn incremental_lifecycle() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    p.write("b.jrxml", &report("b"));
    let req = p.request();

    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 2);
    assert!(p.out().join("a.jasper").is_file());
    assert!(p.out().join("b.jasper").is_file());

    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 0, "no changes means no jobs");

    let b_before = fs::read(p.out().join("b.jasper")).unwrap();
    p.write("a.jrxml", &report("a2"));
    let (_, jobs) = p.build(&req);
    assert_eq!(jobs, 1);
    assert_eq!(fs::read(p.out().join("b.jasper")).unwrap(), b_before);

    fs::remove_file(p.src().join("b.jrxml")).unwrap();
    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 0);
    assert!(!p.out().join("b.jasper").exists());
    assert!(p.out().join("a.jasper").is_file());
}

#[test]
fn nested_directories_are_mirrored_and_pruned() {
    let p = Project::new();
    p.write("sales/2024/q1.jrxml", &report("q1"));
    p.write("x.jrxmlish/y.jrxml", &report("y"));
    let req = p.request();

    assert!(p.build(&req).0.is_success());
    assert!(p.out().join("sales/2024/q1.jasper").is_file());
    assert!(p.out().join("x.jrxmlish/y.jasper").is_file());

    fs::remove_dir_all(p.src().join("sales")).unwrap();
    assert!(p.build(&req).0.is_success());
    assert!(!p.out().join("sales").exists());
}

#[test]
fn failure_is_isolated_and_retried() {
    let p = Project::new();
    p.write("good.jrxml", &report("good"));
    p.write("bad.jrxml", "<html/>");
    let req = p.request();

    let (result, jobs) = p.build(&req);
    assert_eq!(jobs, 2);
    let BuildResult::Failure(failures) = result else {
        panic!("expected failure");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, Path::new("bad.jrxml"));
    assert!(matches!(failures[0].cause, JobError::Compilation { .. }));
    assert!(p.out().join("good.jasper").is_file());
    assert!(!p.out().join("bad.jasper").exists());

    // Unchanged but failed last time: retried.
    let (_, jobs) = p.build(&req);
    assert_eq!(jobs, 1);

    p.write("bad.jrxml", &report("fixed"));
    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 1);
    assert!(p.out().join("bad.jasper").is_file());
}

#[test]
fn missing_artifact_is_rebuilt() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    let req = p.request();
    p.build(&req);
    fs::remove_file(p.out().join("a.jasper")).unwrap();

    let (_, jobs) = p.build(&req);
    assert_eq!(jobs, 1);
    assert!(p.out().join("a.jasper").is_file());
}

#[test]
fn force_recompiles_everything() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    p.write("b.jrxml", &report("b"));
    p.build(&p.request());

    let (_, jobs) = p.build(&p.request().force(true));
    assert_eq!(jobs, 2);
}

#[test]
fn dependency_change_invalidates_snapshot_and_resolves_renamed_compiler() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    p.build(&p.request());
    let six = fs::read_to_string(p.out().join("a.jasper")).unwrap();
    assert!(six.contains(LEGACY_JDT_COMPILER));

    let upgraded = BuildRequest::for_task(p.task(SEVEN), &p.dir.path().join(".quire-cache"));
    let (result, jobs) = p.build(&upgraded);
    assert!(result.is_success());
    assert_eq!(jobs, 1);
    let seven = fs::read_to_string(p.out().join("a.jasper")).unwrap();
    assert!(seven.contains(RENAMED_JDT_COMPILER));
}

#[test]
fn unreadable_source_root_aborts_before_jobs() {
    let p = Project::new();
    fs::remove_dir_all(p.src()).unwrap();
    fs::write(p.src(), "not a directory").unwrap();

    let before = p.factory.opened();
    let err = compile(&p.request(), p.factory.clone(), CancelFlag::new()).unwrap_err();
    assert!(matches!(err, BuildError::Detection(_)));
    assert_eq!(p.factory.opened(), before);
}

#[cfg(unix)]
#[test]
fn unreadable_design_keeps_its_artifact() {
    use std::os::unix::fs::PermissionsExt;

    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    let req = p.request();
    assert!(p.build(&req).0.is_success());

    let source = p.src().join("a.jrxml");
    fs::set_permissions(&source, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&source).is_ok() {
        // Permission bits are not enforced for this user.
        return;
    }

    let before = p.factory.opened();
    let err = compile(&req, p.factory.clone(), CancelFlag::new()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Detection(quire_cache::DetectionError::UnreadableSource { .. })
    ));
    assert_eq!(p.factory.opened(), before);
    assert!(p.out().join("a.jasper").is_file());

    fs::set_permissions(&source, fs::Permissions::from_mode(0o644)).unwrap();
    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 0);
}

#[test]
fn output_extension_change_replaces_artifacts() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    p.write("sales/b.jrxml", &report("b"));
    assert!(p.build(&p.request()).0.is_success());

    let mut task = p.task(SIX);
    task.output_extension = "jrprint".to_string();
    let req = BuildRequest::for_task(task, &p.dir.path().join(".quire-cache"));
    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 2);
    assert!(p.out().join("a.jrprint").is_file());
    assert!(p.out().join("sales/b.jrprint").is_file());
    assert!(!p.out().join("a.jasper").exists());
    assert!(!p.out().join("sales/b.jasper").exists());

    let (_, jobs) = p.build(&req);
    assert_eq!(jobs, 0);
}

#[test]
fn source_extension_change_removes_old_artifacts() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    assert!(p.build(&p.request()).0.is_success());
    assert!(p.out().join("a.jasper").is_file());

    let mut task = p.task(SIX);
    task.source_extension = "xml".to_string();
    let req = BuildRequest::for_task(task, &p.dir.path().join(".quire-cache"));
    let (result, jobs) = p.build(&req);
    assert!(result.is_success());
    assert_eq!(jobs, 0);
    assert!(!p.out().join("a.jasper").exists());

    let manifest = fs::read_to_string(p.dir.path().join(".quire-cache/compileJasper/manifest.json")).unwrap();
    assert!(!manifest.contains("a.jrxml"));
}

#[test]
fn missing_source_root_is_an_empty_build() {
    let p = Project::new();
    fs::remove_dir_all(p.src()).unwrap();
    let (result, jobs) = p.build(&p.request());
    assert!(result.is_success());
    assert_eq!(jobs, 0);
}

#[test]
fn cancelled_build_records_nothing() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    let cancel = CancelFlag::new();
    cancel.cancel();
    let report = compile(&p.request(), p.factory.clone(), cancel).unwrap();
    let BuildResult::Failure(failures) = report.result else {
        panic!("expected failure");
    };
    assert!(matches!(failures[0].cause, JobError::Cancelled));

    let (result, jobs) = p.build(&p.request());
    assert!(result.is_success());
    assert_eq!(jobs, 1);
}

#[test]
fn events_and_summary() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    p.write("b.jrxml", &report("b"));
    p.build(&p.request());
    p.write("a.jrxml", &report("a2"));
    fs::remove_file(p.src().join("b.jrxml")).unwrap();
    p.write("c.jrxml", "<html/>");

    let pool = WorkerPool::new(p.factory.clone(), Some(2), CancelFlag::new()).unwrap();
    let mut seen = Vec::new();
    let report = compile_with(&p.request(), &pool, &mut |event| {
        let line = match event {
            BuildEvent::Compiling(path) => format!("compiling {}", path.display()),
            BuildEvent::Compiled(path) => format!("compiled {}", path.display()),
            BuildEvent::Removed(path) => format!("removed {}", path.display()),
            BuildEvent::Failed(path, _) => format!("failed {}", path.display()),
        };
        seen.push(line);
    })
    .unwrap();

    assert_eq!(report.summary.compiled, 1);
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.unchanged, 0);
    assert_eq!(seen[0], "removed b.jrxml");
    assert!(seen.contains(&"compiled a.jrxml".to_string()));
    assert!(seen.contains(&"failed c.jrxml".to_string()));
}

#[test]
fn status_reports_without_compiling() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    p.build(&p.request());
    p.write("b.jrxml", &report("b"));

    let before = p.factory.opened();
    let changes = status(&p.request()).unwrap();
    assert_eq!(p.factory.opened(), before);
    assert_eq!(changes.count(ChangeKind::Unchanged), 1);
    assert_eq!(changes.count(ChangeKind::Added), 1);
    assert!(!p.out().join("b.jasper").exists());
}

#[test]
fn clean_removes_outputs_and_snapshot() {
    let p = Project::new();
    p.write("a.jrxml", &report("a"));
    let req = p.request();
    p.build(&req);

    clean(&req).unwrap();
    assert!(!p.out().exists());
    clean(&req).unwrap();

    let (_, jobs) = p.build(&req);
    assert_eq!(jobs, 1);
}
