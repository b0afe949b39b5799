use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{
    fs::read_to_string,
    io,
    path::{Path, PathBuf},
};

/// Looked up in the scanned directory when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = "gen-cmake-lists.toml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Extension of the test sources, without the leading dot.
    pub extension: String,
    /// Where the manifest goes, relative to the scanned directory.
    pub output: PathBuf,
    pub cmake_minimum: String,
    pub project: String,
    /// Directory copied next to the test executables at configure time.
    pub test_data: String,
    pub link_libraries: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: "cpp".to_owned(),
            output: PathBuf::from("CMakeLists.txt"),
            cmake_minimum: "3.4.1".to_owned(),
            project: "gracli_tests".to_owned(),
            test_data: "test_data".to_owned(),
            link_libraries: vec!["libgracli".to_owned(), "GTest::gtest_main".to_owned()],
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    extension: Option<String>,
    output: Option<PathBuf>,
    cmake_minimum: Option<String>,
    project: Option<String>,
    test_data: Option<String>,
    link_libraries: Option<Vec<String>>,
}

fn parse_string(src: &str) -> String {
    src.to_owned()
}

fn parse_path(src: &str) -> PathBuf {
    PathBuf::from(src)
}

fn parse_list(src: &str) -> Vec<String> {
    src.split_whitespace().map(str::to_owned).collect()
}

/// Accepts both `cpp` and `.cpp`, rejects anything that can't be a single extension.
fn normalise_extension(src: &str) -> Result<String> {
    let ext = src.strip_prefix('.').unwrap_or(src);
    if ext.is_empty() {
        bail!("the extension must not be empty");
    }
    if ext.contains(['.', '/', '\\']) {
        bail!("`{src}` is not a single file extension");
    }
    Ok(ext.to_owned())
}

impl Config {
    pub fn parse<'add>(
        src: &str,
        additional: impl IntoIterator<Item = &'add (impl AsRef<str> + 'add, impl AsRef<str> + 'add)>,
    ) -> Result<Self> {
        macro_rules! parser {
            [string] => {parse_string};
            [path] => {parse_path};
            [list] => {parse_list};
        }

        macro_rules! parse_field {
            ($k:expr, $v:expr, $cfg:ident . { $($name:ident : $ty:ident),+ }) => {{
                let v = $v;
                match $k {
                    $(stringify!($name) => $cfg.$name = Some(parser![$ty](v)),)+
                    k => bail!("unknown configuration key `{k}`"),
                }
            }};
        }

        let mut raw: RawConfig = basic_toml::from_str(src)?;
        for (key, value) in additional {
            parse_field!(key.as_ref(), value.as_ref(), raw.{
                extension: string,
                output: path,
                cmake_minimum: string,
                project: string,
                test_data: string,
                link_libraries: list
            });
        }

        let default = Self::default();
        Ok(Self {
            extension: match raw.extension {
                Some(ext) => normalise_extension(&ext).context("invalid `extension` value")?,
                None => default.extension,
            },
            output: raw.output.unwrap_or(default.output),
            cmake_minimum: raw.cmake_minimum.unwrap_or(default.cmake_minimum),
            project: raw.project.unwrap_or(default.project),
            test_data: raw.test_data.unwrap_or(default.test_data),
            link_libraries: raw.link_libraries.unwrap_or(default.link_libraries),
        })
    }

    /// An explicit `path` must exist; otherwise [`CONFIG_FILE_NAME`] in `dir` is used if present,
    /// falling back to the defaults.
    pub fn fetch<'add>(
        path: Option<&Path>,
        dir: &Path,
        additional: impl IntoIterator<Item = &'add (impl AsRef<str> + 'add, impl AsRef<str> + 'add)>,
    ) -> Result<Self> {
        if let Some(path) = path {
            let src = read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
            return Self::parse(&src, additional).with_context(|| format!("failed to parse {path:?}"));
        }

        let local = dir.join(CONFIG_FILE_NAME);
        match read_to_string(&local) {
            Ok(src) => {
                Self::parse(&src, additional).with_context(|| format!("failed to parse {local:?}"))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::parse("", additional),
            Err(err) => Err(anyhow!(err).context(format!("failed to read {local:?}"))),
        }
    }
}
