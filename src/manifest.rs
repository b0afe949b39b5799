//! Renders the CMake file registering every test source as its own GoogleTest executable.

use crate::{config::Config, discover::Entry};
use std::fmt::{self, Display, Write};

/// Left for CMake to resolve at configure time.
pub const WORKING_DIRECTORY: &str = "${CMAKE_CURRENT_SOURCE_DIR}";

pub struct Manifest {
    executables: String,
    discovery: String,
    document: String,
}

impl Manifest {
    /// Line `i` of both fragments always refers to `entries[i]`.
    pub fn render(entries: &[Entry], config: &Config) -> Self {
        let mut executables = String::new();
        let mut discovery = String::new();
        for entry in entries {
            let stem = entry.stem();
            _ = writeln!(executables, "add_executable({stem} {})", entry.file_name());
            _ = writeln!(
                discovery,
                "gtest_discover_tests({stem} WORKING_DIRECTORY {WORKING_DIRECTORY})"
            );
        }

        let mut document = String::with_capacity(256 + executables.len() + discovery.len());
        _ = writeln!(document, "cmake_minimum_required(VERSION {} FATAL_ERROR)", config.cmake_minimum);
        _ = writeln!(document, "project({})", config.project);
        document.push('\n');
        _ = writeln!(document, "file(COPY {} DESTINATION .)", config.test_data);
        document.push_str("\n# Tests\nenable_testing()\n\n");
        _ = writeln!(document, "link_libraries({})", config.link_libraries.join(" "));
        document.push_str("\n# Add executables\n");
        document.push_str(&executables);
        document.push_str("\ninclude(GoogleTest)\n\n# Discover Tests\n");
        document.push_str(&discovery);

        Self { executables, discovery, document }
    }

    /// The `add_executable` lines.
    pub fn executables(&self) -> &str {
        &self.executables
    }

    /// The `gtest_discover_tests` lines.
    pub fn discovery(&self) -> &str {
        &self.discovery
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

impl Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<Entry> {
        names.iter().filter_map(|n| Entry::new((*n).to_owned(), "cpp")).collect()
    }

    #[test]
    fn fragments_line_up() {
        let entries = entries(&["Zeta.cpp", "alpha.cpp", "lzend_test.cpp"]);
        let manifest = Manifest::render(&entries, &Config::default());
        let executables: Vec<_> = manifest.executables().lines().collect();
        let discovery: Vec<_> = manifest.discovery().lines().collect();
        assert_eq!(executables.len(), entries.len());
        assert_eq!(discovery.len(), entries.len());
        for ((entry, exe), disc) in entries.iter().zip(&executables).zip(&discovery) {
            assert_eq!(*exe, format!("add_executable({} {})", entry.stem(), entry.file_name()));
            assert!(disc.starts_with(&format!("gtest_discover_tests({} ", entry.stem())));
        }
    }

    #[test]
    fn working_directory_is_left_literal() {
        let manifest = Manifest::render(&entries(&["alpha.cpp"]), &Config::default());
        assert_eq!(
            manifest.discovery(),
            "gtest_discover_tests(alpha WORKING_DIRECTORY ${CMAKE_CURRENT_SOURCE_DIR})\n"
        );
    }

    #[test]
    fn empty_manifest_keeps_the_skeleton() {
        let manifest = Manifest::render(&[], &Config::default());
        assert_eq!(manifest.executables(), "");
        assert_eq!(manifest.discovery(), "");
        assert_eq!(
            manifest.document(),
            "cmake_minimum_required(VERSION 3.4.1 FATAL_ERROR)\n\
             project(gracli_tests)\n\
             \n\
             file(COPY test_data DESTINATION .)\n\
             \n\
             # Tests\n\
             enable_testing()\n\
             \n\
             link_libraries(libgracli GTest::gtest_main)\n\
             \n\
             # Add executables\n\
             \n\
             include(GoogleTest)\n\
             \n\
             # Discover Tests\n"
        );
    }

    #[test]
    fn config_feeds_the_preamble() {
        let config = Config {
            cmake_minimum: "3.20".to_owned(),
            project: "grammar_tests".to_owned(),
            test_data: "data".to_owned(),
            link_libraries: vec!["grammar".to_owned()],
            ..Config::default()
        };
        let manifest = Manifest::render(&[], &config);
        let mut lines = manifest.document().lines();
        assert_eq!(lines.next().unwrap(), "cmake_minimum_required(VERSION 3.20 FATAL_ERROR)");
        assert_eq!(lines.next().unwrap(), "project(grammar_tests)");
        assert!(manifest.document().contains("\nfile(COPY data DESTINATION .)\n"));
        assert!(manifest.document().contains("\nlink_libraries(grammar)\n"));
    }

    #[test]
    fn display_matches_document() {
        let manifest = Manifest::render(&entries(&["alpha.cpp"]), &Config::default());
        assert_eq!(manifest.to_string(), manifest.document());
    }
}
