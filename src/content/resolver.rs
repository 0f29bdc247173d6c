use crate::error::{ExecutorError, Result};
use crate::models::{ContentType, TestContent};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const TEST_CONTENT_DIR: &str = "test-content";
pub const REPO_DIR: &str = "repo";
pub const OUTPUT_DIR: &str = "output";
pub const JTL_REPORT_FILE: &str = "report.jtl";
pub const HTML_REPORT_DIR: &str = "report";

/// Paths of a single JMeter run, computed fresh per execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRun {
    /// Test plan handed to `-t`; always a regular file
    pub script_path: PathBuf,
    /// Directory JMeter runs in
    pub working_dir: PathBuf,
    /// Arguments forwarded to JMeter after directory-mode trimming
    pub args: Vec<String>,
}

impl ResolvedRun {
    /// Directory owned by this run, recreated before every invocation
    pub fn output_dir(&self) -> PathBuf {
        self.working_dir.join(OUTPUT_DIR)
    }

    /// JTL report written by `-l`
    pub fn report_path(&self) -> PathBuf {
        self.output_dir().join(JTL_REPORT_FILE)
    }

    /// HTML dashboard written by `-e -o`
    pub fn dashboard_dir(&self) -> PathBuf {
        self.output_dir().join(HTML_REPORT_DIR)
    }
}

/// Resolves the test plan location from a content descriptor
#[derive(Debug)]
pub struct ContentResolver {
    data_root: PathBuf,
}

impl ContentResolver {
    pub fn new(data_root: &Path) -> Result<Self> {
        let data_root = std::path::absolute(data_root)?;
        Ok(Self { data_root })
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Compute script path, working directory and forwarded arguments.
    ///
    /// For git directory content the last argument names the script inside
    /// the checked out directory and is removed from the forwarded arguments.
    pub fn resolve(&self, content: Option<&TestContent>, args: &[String]) -> Result<ResolvedRun> {
        let content = content.ok_or_else(|| {
            ExecutorError::UnsupportedContent("execution has no test content".to_string())
        })?;

        let repository = content
            .repository
            .as_ref()
            .filter(|_| content.content_type.is_git());
        let working_dir = repository
            .map(|r| confine(&r.working_dir))
            .transpose()?
            .filter(|wd| !wd.as_os_str().is_empty());
        let repo_path = repository
            .map(|r| confine(&r.path))
            .transpose()?
            .unwrap_or_default();

        let path = match content.content_type {
            ContentType::InlineString | ContentType::FileUri => {
                self.data_root.join(TEST_CONTENT_DIR)
            }
            ContentType::GitFile | ContentType::GitDir | ContentType::GitRepository => {
                let repo = self.data_root.join(REPO_DIR);
                if repo_path.as_os_str().is_empty() {
                    repo
                } else {
                    repo.join(&repo_path)
                }
            }
        };

        let metadata = fs::metadata(&path).map_err(|source| ExecutorError::ContentPathNotFound {
            path: path.clone(),
            source,
        })?;

        let mut args = args.to_vec();
        let script_path = if metadata.is_dir() {
            if !matches!(
                content.content_type,
                ContentType::GitDir | ContentType::GitRepository
            ) {
                return Err(ExecutorError::UnsupportedContent(format!(
                    "{} is a directory but the content type expects a single file",
                    path.display()
                )));
            }

            let script_name = args
                .pop()
                .ok_or_else(|| ExecutorError::MissingScriptArgument(path.clone()))?;
            let script_name = confine(&script_name)?;

            let (directory, script_name) = match &working_dir {
                Some(wd) => (
                    self.data_root.join(REPO_DIR).join(wd),
                    repo_path.join(&script_name),
                ),
                None => (path, script_name),
            };

            tracing::info!(
                script = %script_name.display(),
                directory = %directory.display(),
                "Directory test, looking up script from the last argument"
            );

            let script_path = directory.join(&script_name);
            match fs::metadata(&script_path) {
                Ok(meta) if meta.is_file() => script_path,
                _ => {
                    return Err(ExecutorError::ScriptNotFoundInDirectory {
                        script: script_name.display().to_string(),
                        directory,
                    });
                }
            }
        } else {
            path
        };

        let working_dir = match working_dir {
            Some(wd) => self.data_root.join(REPO_DIR).join(wd),
            None => self.data_root.clone(),
        };

        Ok(ResolvedRun {
            script_path,
            working_dir,
            args,
        })
    }
}

/// Turn a caller supplied path into a relative one that stays below
/// whatever base it is joined to. Root and prefix components are dropped,
/// `.` is skipped and `..` may only undo components of the segment itself.
fn confine(segment: &str) -> Result<PathBuf> {
    let mut confined = PathBuf::new();

    for component in Path::new(segment).components() {
        match component {
            Component::Normal(part) => confined.push(part),
            Component::ParentDir => {
                if !confined.pop() {
                    return Err(ExecutorError::UnsupportedContent(format!(
                        "path {} escapes its base directory",
                        segment
                    )));
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }

    Ok(confined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Repository;
    use tempfile::TempDir;

    fn repository(path: &str, working_dir: &str) -> Repository {
        Repository {
            path: path.to_string(),
            working_dir: working_dir.to_string(),
            ..Default::default()
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<jmeterTestPlan/>").unwrap();
    }

    #[test]
    fn test_resolves_each_content_type() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("test-content"));
        touch(&root.path().join("repo/perf/plan.jmx"));

        let resolver = ContentResolver::new(root.path()).unwrap();
        let cases = vec![
            (TestContent::new(ContentType::InlineString), "test-content"),
            (TestContent::new(ContentType::FileUri), "test-content"),
            (
                TestContent::new(ContentType::GitFile)
                    .with_repository(repository("perf/plan.jmx", "")),
                "repo/perf/plan.jmx",
            ),
            (
                TestContent::new(ContentType::GitDir)
                    .with_repository(repository("perf/plan.jmx", "")),
                "repo/perf/plan.jmx",
            ),
            (
                TestContent::new(ContentType::GitRepository)
                    .with_repository(repository("perf/plan.jmx", "")),
                "repo/perf/plan.jmx",
            ),
        ];

        for (content, expected) in cases {
            let run = resolver.resolve(Some(&content), &[]).unwrap();
            assert_eq!(
                run.script_path,
                resolver.data_root().join(expected),
                "content type {:?}",
                content.content_type
            );
            assert_eq!(run.working_dir, resolver.data_root());
        }
    }

    #[test]
    fn test_directory_mode_takes_last_argument() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("repo/perf/load.jmx"));

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::GitDir).with_repository(repository("perf", ""));
        let args = vec!["-Jthreads=5".to_string(), "load.jmx".to_string()];

        let run = resolver.resolve(Some(&content), &args).unwrap();
        assert_eq!(
            run.script_path,
            resolver.data_root().join("repo/perf/load.jmx")
        );
        assert_eq!(run.args, vec!["-Jthreads=5"]);
    }

    #[test]
    fn test_directory_mode_with_working_dir() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("repo/suite/perf/load.jmx"));
        fs::create_dir_all(root.path().join("repo/perf")).unwrap();

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::GitRepository)
            .with_repository(repository("perf", "suite"));
        let args = vec!["load.jmx".to_string()];

        let run = resolver.resolve(Some(&content), &args).unwrap();
        assert_eq!(
            run.script_path,
            resolver.data_root().join("repo/suite/perf/load.jmx")
        );
        assert_eq!(run.working_dir, resolver.data_root().join("repo/suite"));
        assert!(run.args.is_empty());
        assert_eq!(
            run.output_dir(),
            resolver.data_root().join("repo/suite/output")
        );
    }

    #[test]
    fn test_absolute_segments_stay_below_data_root() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("repo/perf/plan.jmx"));
        touch(&root.path().join("repo/suite/perf/load.jmx"));

        let resolver = ContentResolver::new(root.path()).unwrap();
        let cases = vec![
            (
                TestContent::new(ContentType::GitFile)
                    .with_repository(repository("/perf/plan.jmx", "")),
                vec![],
                "repo/perf/plan.jmx",
                "",
            ),
            (
                TestContent::new(ContentType::GitDir).with_repository(repository("/perf", "")),
                vec!["/plan.jmx".to_string()],
                "repo/perf/plan.jmx",
                "",
            ),
            (
                TestContent::new(ContentType::GitRepository)
                    .with_repository(repository("/perf", "/suite")),
                vec!["load.jmx".to_string()],
                "repo/suite/perf/load.jmx",
                "repo/suite",
            ),
            (
                TestContent::new(ContentType::GitDir)
                    .with_repository(repository("./perf/../perf", "")),
                vec!["./plan.jmx".to_string()],
                "repo/perf/plan.jmx",
                "",
            ),
        ];

        for (content, args, script, working_dir) in cases {
            let run = resolver.resolve(Some(&content), &args).unwrap();
            assert_eq!(run.script_path, resolver.data_root().join(script));
            assert!(run.script_path.starts_with(resolver.data_root()));
            let expected_dir = if working_dir.is_empty() {
                resolver.data_root().to_path_buf()
            } else {
                resolver.data_root().join(working_dir)
            };
            assert_eq!(run.working_dir, expected_dir);
        }
    }

    #[test]
    fn test_absolute_path_of_existing_file_is_not_followed() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let plan = outside.path().join("plan.jmx");
        touch(&plan);

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::GitFile)
            .with_repository(repository(plan.to_str().unwrap(), ""));

        let err = resolver.resolve(Some(&content), &[]).unwrap_err();
        match err {
            ExecutorError::ContentPathNotFound { path, .. } => {
                assert!(path.starts_with(resolver.data_root().join("repo")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parent_segments_cannot_escape() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("repo/perf/load.jmx"));

        let resolver = ContentResolver::new(root.path()).unwrap();
        let cases = vec![
            (repository("../../etc/passwd", ""), vec![]),
            (repository("perf", "../.."), vec!["load.jmx".to_string()]),
            (repository("perf", ""), vec!["../../../load.jmx".to_string()]),
        ];

        for (repo, args) in cases {
            let content = TestContent::new(ContentType::GitDir).with_repository(repo);
            let err = resolver.resolve(Some(&content), &args).unwrap_err();
            assert!(
                matches!(err, ExecutorError::UnsupportedContent(_)),
                "unexpected error: {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_content_path() {
        let root = TempDir::new().unwrap();
        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::InlineString);

        let err = resolver.resolve(Some(&content), &[]).unwrap_err();
        assert!(matches!(err, ExecutorError::ContentPathNotFound { .. }));
    }

    #[test]
    fn test_script_missing_in_directory() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("repo/perf")).unwrap();

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::GitDir).with_repository(repository("perf", ""));

        let err = resolver
            .resolve(Some(&content), &["missing.jmx".to_string()])
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ScriptNotFoundInDirectory { .. }));
    }

    #[test]
    fn test_script_argument_naming_a_directory() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("repo/perf/nested.jmx")).unwrap();

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::GitDir).with_repository(repository("perf", ""));

        let err = resolver
            .resolve(Some(&content), &["nested.jmx".to_string()])
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ScriptNotFoundInDirectory { .. }));
    }

    #[test]
    fn test_directory_mode_without_arguments() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("repo")).unwrap();

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::GitRepository);

        let err = resolver.resolve(Some(&content), &[]).unwrap_err();
        assert!(matches!(err, ExecutorError::MissingScriptArgument(_)));
    }

    #[test]
    fn test_file_content_directory_is_rejected() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("test-content")).unwrap();

        let resolver = ContentResolver::new(root.path()).unwrap();
        let content = TestContent::new(ContentType::FileUri);

        let err = resolver
            .resolve(Some(&content), &["plan.jmx".to_string()])
            .unwrap_err();
        assert!(matches!(err, ExecutorError::UnsupportedContent(_)));
    }

    #[test]
    fn test_no_content() {
        let resolver = ContentResolver::new(Path::new("/data")).unwrap();
        let err = resolver.resolve(None, &[]).unwrap_err();
        assert!(matches!(err, ExecutorError::UnsupportedContent(_)));
    }
}
