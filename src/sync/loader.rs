//! Loaders: content transforms bound to rules
//!
//! A loader is either an in-process [`Transform`] (inline, or looked up by
//! name in a [`LoaderRegistry`] when settings are loaded) or an external
//! command that reads content on stdin and writes the result to stdout.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{TscpError, TscpResult};

/// Error returned by a transform
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only context handed to every loader
#[derive(Debug, Clone, Copy)]
pub struct LoaderMeta<'a> {
    pub source_path: &'a Path,
    pub destination_path: &'a Path,
    pub config: &'a Config,
}

/// In-process content transform
pub trait Transform: Send + Sync {
    fn transform(&self, content: Vec<u8>, meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(Vec<u8>, &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> + Send + Sync,
{
    fn transform(&self, content: Vec<u8>, meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> {
        self(content, meta)
    }
}

/// External program used as a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLoader {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLoader {
    /// Relative programs containing a separator resolve against `cwd`;
    /// bare names go through `PATH`.
    fn resolve_program(&self, cwd: &Path) -> PathBuf {
        if self.program.is_relative() && self.program.components().count() > 1 {
            cwd.join(&self.program)
        } else {
            self.program.clone()
        }
    }

    fn run(&self, content: Vec<u8>, meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> {
        let program = self.resolve_program(&meta.config.cwd);
        let mut child = Command::new(&program)
            .args(&self.args)
            .current_dir(&meta.config.cwd)
            .env("TSCP_SOURCE_PATH", meta.source_path)
            .env("TSCP_DESTINATION_PATH", meta.destination_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", program.display()))?;

        // Feed stdin from another thread so a chatty child can't deadlock us.
        let mut stdin = child.stdin.take().ok_or("child stdin unavailable")?;
        let writer = std::thread::spawn(move || stdin.write_all(&content));

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| "stdin writer panicked")?
            .or_else(|e| {
                // The child may legitimately exit without reading everything.
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    Ok(())
                } else {
                    Err(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} exited with {}: {}", program.display(), output.status, stderr.trim()).into());
        }
        Ok(output.stdout)
    }
}

/// A loader binding inside a rule
#[derive(Clone)]
pub enum Loader {
    /// In-process transform
    Transform {
        name: String,
        transform: Arc<dyn Transform>,
    },
    /// External command, spawned per file
    Command(CommandLoader),
}

impl Loader {
    /// Wrap a byte-level transform.
    pub fn inline(
        name: impl Into<String>,
        f: impl Fn(Vec<u8>, &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> + Send + Sync + 'static,
    ) -> Self {
        Loader::Transform {
            name: name.into(),
            transform: Arc::new(f),
        }
    }

    /// Wrap a text transform. Non UTF-8 input is a loader error.
    pub fn text(
        name: impl Into<String>,
        f: impl Fn(String, &LoaderMeta<'_>) -> Result<String, TransformError> + Send + Sync + 'static,
    ) -> Self {
        Loader::inline(name, move |content, meta| {
            let text = String::from_utf8(content)?;
            f(text, meta).map(String::into_bytes)
        })
    }

    pub fn command(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Loader::Command(CommandLoader {
            program: program.into(),
            args,
        })
    }

    pub fn name(&self) -> String {
        match self {
            Loader::Transform { name, .. } => name.clone(),
            Loader::Command(cmd) => cmd.program.display().to_string(),
        }
    }

    /// Run this loader, attributing failures to the loader and source file.
    pub fn run(&self, content: Vec<u8>, meta: &LoaderMeta<'_>) -> TscpResult<Vec<u8>> {
        let result = match self {
            Loader::Transform { transform, .. } => transform.transform(content, meta),
            Loader::Command(cmd) => cmd.run(content, meta),
        };
        result.map_err(|e| TscpError::Loader {
            loader: self.name(),
            source_path: meta.source_path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loader::Transform { name, .. } => f.debug_struct("Transform").field("name", name).finish(),
            Loader::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
        }
    }
}

/// Named transforms available to settings files
#[derive(Clone)]
pub struct LoaderRegistry {
    loaders: BTreeMap<String, Arc<dyn Transform>>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.loaders.keys()).finish()
    }
}

impl LoaderRegistry {
    pub fn empty() -> Self {
        Self {
            loaders: BTreeMap::new(),
        }
    }

    /// Registry preloaded with the built-in transforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("strip-bom", strip_bom);
        registry.register("normalize-eol", normalize_eol);
        registry.register("trim-trailing-whitespace", trim_trailing_whitespace);
        registry.register("ensure-trailing-newline", ensure_trailing_newline);
        registry
    }

    /// Register (or replace) a named transform function.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(Vec<u8>, &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> + Send + Sync + 'static,
    ) {
        self.loaders.insert(name.into(), Arc::new(f));
    }

    pub fn names(&self) -> Vec<&str> {
        self.loaders.keys().map(String::as_str).collect()
    }

    /// Look up `name`, failing with a configuration error when missing.
    pub fn resolve(&self, name: &str) -> TscpResult<Loader> {
        self.loaders
            .get(name)
            .map(|transform| Loader::Transform {
                name: name.to_string(),
                transform: transform.clone(),
            })
            .ok_or_else(|| TscpError::UnknownLoader {
                name: name.to_string(),
                registered: self.names().join(", "),
            })
    }
}

fn strip_bom(content: Vec<u8>, _meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> {
    const BOM: &[u8] = b"\xEF\xBB\xBF";
    Ok(match content.strip_prefix(BOM) {
        Some(rest) => rest.to_vec(),
        None => content,
    })
}

fn normalize_eol(content: Vec<u8>, _meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> {
    let mut out = Vec::with_capacity(content.len());
    let mut bytes = content.iter().peekable();
    while let Some(&b) = bytes.next() {
        if b == b'\r' && bytes.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    Ok(out)
}

fn trim_trailing_whitespace(content: Vec<u8>, _meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> {
    let text = String::from_utf8(content)?;
    let mut out: Vec<&str> = text.split('\n').map(|line| line.trim_end_matches([' ', '\t'])).collect();
    // `split` leaves a trailing empty segment for newline-terminated input.
    if out.last() == Some(&"") && text.ends_with('\n') {
        out.pop();
        return Ok(format!("{}\n", out.join("\n")).into_bytes());
    }
    Ok(out.join("\n").into_bytes())
}

fn ensure_trailing_newline(mut content: Vec<u8>, _meta: &LoaderMeta<'_>) -> Result<Vec<u8>, TransformError> {
    if !content.is_empty() && content.last() != Some(&b'\n') {
        content.push(b'\n');
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(loader: &Loader, input: &str) -> String {
        let config = Config::default();
        let meta = LoaderMeta {
            source_path: Path::new("/src/a.css"),
            destination_path: Path::new("/out/a.css"),
            config: &config,
        };
        String::from_utf8(loader.run(input.as_bytes().to_vec(), &meta).unwrap()).unwrap()
    }

    #[test]
    fn text_loader_sees_meta() {
        let loader = Loader::text("stamp", |c, meta| {
            Ok(format!("/* {} */\n{c}", meta.destination_path.display()))
        });
        assert_eq!(run(&loader, "body{}"), "/* /out/a.css */\nbody{}");
    }

    #[test]
    fn text_loader_rejects_invalid_utf8() {
        let loader = Loader::text("noop", |c, _| Ok(c));
        let config = Config::default();
        let meta = LoaderMeta {
            source_path: Path::new("/src/img.png"),
            destination_path: Path::new("/out/img.png"),
            config: &config,
        };
        let err = loader.run(vec![0xff, 0xfe, 0x00], &meta).unwrap_err();
        assert!(matches!(err, TscpError::Loader { ref loader, .. } if loader == "noop"));
    }

    #[test]
    fn registry_resolves_builtins() {
        let registry = LoaderRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "ensure-trailing-newline",
                "normalize-eol",
                "strip-bom",
                "trim-trailing-whitespace"
            ]
        );
        assert!(registry.resolve("normalize-eol").is_ok());
    }

    #[test]
    fn registry_unknown_name_is_config_error() {
        let registry = LoaderRegistry::empty();
        let err = registry.resolve("sass").unwrap_err();
        assert!(matches!(err, TscpError::UnknownLoader { ref name, .. } if name == "sass"));
    }

    #[test]
    fn registry_accepts_custom_transform() {
        let mut registry = LoaderRegistry::empty();
        registry.register("upper", |c, _| Ok(c.to_ascii_uppercase()));
        let loader = registry.resolve("upper").unwrap();
        assert_eq!(run(&loader, "abc"), "ABC");
    }

    #[test]
    fn builtin_transforms() {
        let registry = LoaderRegistry::with_builtins();
        let eol = registry.resolve("normalize-eol").unwrap();
        assert_eq!(run(&eol, "a\r\nb\r\n"), "a\nb\n");

        let trim = registry.resolve("trim-trailing-whitespace").unwrap();
        assert_eq!(run(&trim, "a  \nb\t\n"), "a\nb\n");
        assert_eq!(run(&trim, "a  \nb "), "a\nb");

        let newline = registry.resolve("ensure-trailing-newline").unwrap();
        assert_eq!(run(&newline, "a"), "a\n");
        assert_eq!(run(&newline, "a\n"), "a\n");
        assert_eq!(run(&newline, ""), "");

        let bom = registry.resolve("strip-bom").unwrap();
        assert_eq!(run(&bom, "\u{feff}x"), "x");
    }

    #[cfg(unix)]
    #[test]
    fn command_loader_pipes_content() {
        let loader = Loader::command("tr", vec!["a-z".into(), "A-Z".into()]);
        assert_eq!(run(&loader, "hello"), "HELLO");
    }

    #[cfg(unix)]
    #[test]
    fn command_loader_failure_is_reported() {
        let loader = Loader::command("false", vec![]);
        let config = Config::default();
        let meta = LoaderMeta {
            source_path: Path::new("/src/a.css"),
            destination_path: Path::new("/out/a.css"),
            config: &config,
        };
        let err = loader.run(b"x".to_vec(), &meta).unwrap_err();
        assert!(err.to_string().contains("loader 'false' failed on /src/a.css"));
    }

    #[test]
    fn command_program_resolution() {
        let cmd = CommandLoader {
            program: PathBuf::from("scripts/minify"),
            args: vec![],
        };
        assert_eq!(cmd.resolve_program(Path::new("/work")), PathBuf::from("/work/scripts/minify"));

        let bare = CommandLoader {
            program: PathBuf::from("sass"),
            args: vec![],
        };
        assert_eq!(bare.resolve_program(Path::new("/work")), PathBuf::from("sass"));
    }
}
