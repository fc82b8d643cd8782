//! Software development analyzer.
//!
//! Input is usually a concatenation of project files, each introduced by a
//! header line of the form `=== path ===` or `--- File: path ---`. Text with no
//! headers is treated as a single anonymous file that is both prose and code.

use serde_json::{Map, Value};
use tracing::debug;

use crate::analyzers::error::{AnalyzerError, AnalyzerResult};
use crate::analyzers::rules::{push_unique, ExtractionRules, RuleTable};
use crate::analyzers::IndustryAnalyzer;
use crate::domain::{IndustryMetrics, ProjectAnalysis};

const SECTION_HEADER: &str =
    r"(?m)^[ \t]*(?:={3,}[ \t]*(.+?)[ \t]*={3,}|-{3}[ \t]*File:[ \t]*(.+?)[ \t]*(?:-{3,})?)[ \t]*$";

const FENCED_JSON: &str = r"(?s)```json[ \t]*\r?\n(.*?)```";

const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte", "rs", "py", "go", "java", "kt",
    "swift", "rb", "cs",
];

const COMPONENT_RULES: &[(&str, &str)] = &[
    (
        "js_export",
        r"\bexport\s+(?:default\s+)?(?:async\s+)?(?:function|class|const|let|var|interface|type|enum)\s+([A-Z][A-Za-z0-9_]*)",
    ),
    (
        "rust_pub",
        r"\bpub(?:\([a-z]+\))?\s+(?:struct|enum|trait)\s+([A-Z][A-Za-z0-9_]*)",
    ),
    ("py_class", r"(?m)^class\s+([A-Z][A-Za-z0-9_]*)"),
];

const INTERACTION_RULES: &[(&str, &str)] = &[
    ("handler", r"\b((?:on|handle)[A-Z][A-Za-z0-9]*)\b"),
    ("element", r"<(form|input|button|select|textarea)\b"),
];

const TODO_RULES: &[(&str, &str)] = &[(
    "marker",
    r"(?m)(?://+|#|/\*+|<!--|--)[ \t]*((?:TODO|FIXME|FEATURE|BUG)\b.*?)[ \t]*(?:\*/|-->)?[ \t]*$",
)];

const IMPORT_RULES: &[(&str, &str)] = &[
    (
        "es_import",
        r#"\bimport\s+(?:[\w*{}\s,$]+\s+from\s+)?['"](\.{1,2}/[^'"]+)['"]"#,
    ),
    ("commonjs", r#"\brequire\(\s*['"](\.{1,2}/[^'"]+)['"]\s*\)"#),
    ("python_relative", r"(?m)^from\s+(\.+[\w.]*)\s+import\b"),
];

pub const SOFTWARE_INDUSTRY: &str = "software_development";

/// A file carved out of the concatenated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSection<'a> {
    /// `None` when the input carried no headers.
    pub path: Option<&'a str>,
    pub body: &'a str,
}

impl FileSection<'_> {
    fn file_name(&self) -> Option<&str> {
        self.path
            .map(|p| p.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(p))
    }

    fn is_source(&self) -> bool {
        match self.path {
            None => true,
            Some(path) => path
                .rsplit_once('.')
                .map(|(_, ext)| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false),
        }
    }

    fn is_manifest(&self) -> bool {
        matches!(self.file_name(), Some("package.json") | Some("Cargo.toml"))
    }

    /// Prose is anything that is neither code nor a manifest.
    fn is_prose(&self) -> bool {
        self.path.is_none() || (!self.is_source() && !self.is_manifest())
    }
}

/// Dependencies and scripts collected from package manifests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestSummary {
    pub dependencies: Map<String, Value>,
    pub dev_dependencies: Map<String, Value>,
    pub scripts: Map<String, Value>,
    pub errors: Vec<String>,
}

impl ManifestSummary {
    fn merge(&mut self, other: ManifestSummary) {
        self.dependencies.extend(other.dependencies);
        self.dev_dependencies.extend(other.dev_dependencies);
        self.scripts.extend(other.scripts);
        self.errors.extend(other.errors);
    }

    fn record_error(&mut self, source: &str, message: impl std::fmt::Display) {
        debug!(source = %source, error = %message, "malformed manifest ignored");
        self.errors.push(format!("{source}: {message}"));
    }
}

fn string_map(value: Option<&Value>) -> Map<String, Value> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => Value::String(s.clone()),
                        other => Value::String(other.to_string()),
                    };
                    (k.clone(), v)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a `package.json` body.
pub fn parse_package_json(body: &str) -> Result<ManifestSummary, serde_json::Error> {
    let value: Value = serde_json::from_str(body.trim())?;
    Ok(ManifestSummary {
        dependencies: string_map(value.get("dependencies")),
        dev_dependencies: string_map(value.get("devDependencies")),
        scripts: string_map(value.get("scripts")),
        errors: Vec::new(),
    })
}

fn cargo_dependency_table(table: &toml::Table, key: &str) -> Map<String, Value> {
    let Some(deps) = table.get(key).and_then(toml::Value::as_table) else {
        return Map::new();
    };
    deps.iter()
        .map(|(name, spec)| {
            let version = match spec {
                toml::Value::String(v) => v.clone(),
                toml::Value::Table(t) => t
                    .get("version")
                    .and_then(toml::Value::as_str)
                    .map(str::to_string)
                    .or_else(|| t.get("path").map(|_| "path".to_string()))
                    .or_else(|| t.get("git").map(|_| "git".to_string()))
                    .unwrap_or_else(|| "*".to_string()),
                _ => "*".to_string(),
            };
            (name.clone(), Value::String(version))
        })
        .collect()
}

/// Parse a `Cargo.toml` body.
pub fn parse_cargo_toml(body: &str) -> Result<ManifestSummary, toml::de::Error> {
    let table: toml::Table = toml::from_str(body)?;
    Ok(ManifestSummary {
        dependencies: cargo_dependency_table(&table, "dependencies"),
        dev_dependencies: cargo_dependency_table(&table, "dev-dependencies"),
        scripts: Map::new(),
        errors: Vec::new(),
    })
}

#[derive(Debug, Clone)]
pub struct SoftwareAnalyzer {
    rules: ExtractionRules,
    section_header: regex::Regex,
    fenced_json: regex::Regex,
    components: RuleTable,
    interactions: RuleTable,
    todos: RuleTable,
    imports: RuleTable,
}

fn compile(category: &str, pattern: &str) -> AnalyzerResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|source| AnalyzerError::InvalidPattern {
        category: category.to_string(),
        source,
    })
}

impl SoftwareAnalyzer {
    pub fn new() -> AnalyzerResult<Self> {
        Ok(Self {
            rules: ExtractionRules::standard()?,
            section_header: compile("section_header", SECTION_HEADER)?,
            fenced_json: compile("fenced_json", FENCED_JSON)?,
            components: RuleTable::compile(COMPONENT_RULES)?,
            interactions: RuleTable::compile(INTERACTION_RULES)?,
            todos: RuleTable::compile(TODO_RULES)?,
            imports: RuleTable::compile(IMPORT_RULES)?,
        })
    }

    /// Split concatenated input into per-file sections.
    pub fn split_sections<'a>(&self, text: &'a str) -> Vec<FileSection<'a>> {
        let mut sections = Vec::new();
        let mut current: Option<(&'a str, usize)> = None;

        for caps in self.section_header.captures_iter(text) {
            let (Some(header), Some(path)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
            else {
                continue;
            };
            if let Some((prev, start)) = current.take() {
                sections.push(FileSection {
                    path: Some(prev),
                    body: &text[start..header.start()],
                });
            }
            current = Some((path.as_str(), header.end()));
        }

        match current {
            Some((path, start)) => sections.push(FileSection {
                path: Some(path),
                body: &text[start..],
            }),
            None => sections.push(FileSection {
                path: None,
                body: text,
            }),
        }
        sections
    }

    /// Collect dependencies and scripts from manifest sections, falling back
    /// to a fenced JSON block when no manifest file is present.
    pub fn parse_manifests(&self, sections: &[FileSection<'_>]) -> ManifestSummary {
        let mut summary = ManifestSummary::default();
        let mut found = false;

        for section in sections {
            match section.file_name() {
                Some("package.json") => {
                    found = true;
                    match parse_package_json(section.body) {
                        Ok(parsed) => summary.merge(parsed),
                        Err(err) => summary.record_error(section.path.unwrap_or_default(), err),
                    }
                }
                Some("Cargo.toml") => {
                    found = true;
                    match parse_cargo_toml(section.body) {
                        Ok(parsed) => summary.merge(parsed),
                        Err(err) => summary.record_error(section.path.unwrap_or_default(), err),
                    }
                }
                _ => {}
            }
        }

        if found {
            return summary;
        }

        for section in sections {
            for caps in self.fenced_json.captures_iter(section.body) {
                let Some(block) = caps.get(1).map(|m| m.as_str()) else {
                    continue;
                };
                if !block.contains("\"dependencies\"") && !block.contains("\"scripts\"") {
                    continue;
                }
                match parse_package_json(block) {
                    Ok(parsed) => summary.merge(parsed),
                    Err(err) => summary.record_error("fenced json", err),
                }
                return summary;
            }
        }
        summary
    }
}

impl IndustryAnalyzer for SoftwareAnalyzer {
    fn industry(&self) -> &str {
        SOFTWARE_INDUSTRY
    }

    fn display_name(&self) -> &str {
        "Software Development"
    }

    fn focus_areas(&self) -> &[&str] {
        &[
            "architecture",
            "dependencies",
            "components",
            "user interactions",
            "technical debt",
        ]
    }

    fn analyze_project(&self, text: &str) -> ProjectAnalysis {
        let sections = self.split_sections(text);
        let manifest = self.parse_manifests(&sections);

        let mut analysis = ProjectAnalysis::default();
        let mut components = Vec::new();
        let mut interactions = Vec::new();
        let mut files = Vec::new();
        let mut graph = Map::new();

        for section in &sections {
            if section.is_prose() {
                self.rules.apply(section.body, &mut analysis);
            }

            for todo in self.todos.extract(section.body) {
                push_unique(&mut analysis.key_tasks, &todo);
            }

            if section.is_source() {
                for name in self.components.extract(section.body) {
                    push_unique(&mut components, &name);
                }
                for name in self.interactions.extract(section.body) {
                    push_unique(&mut interactions, &name);
                }
            }

            if let Some(path) = section.path {
                files.push(Value::String(path.to_string()));
                if section.is_source() {
                    graph.insert(path.to_string(), self.imports.extract(section.body).into());
                }
            }
        }

        let mut analysis = analysis
            .with_insight("dependencies", manifest.dependencies)
            .with_insight("dev_dependencies", manifest.dev_dependencies)
            .with_insight("scripts", manifest.scripts)
            .with_insight("components", components)
            .with_insight("interactions", interactions)
            .with_insight("files", files)
            .with_insight("dependency_graph", graph);
        if !manifest.errors.is_empty() {
            analysis = analysis.with_insight("manifest_error", manifest.errors.join("; "));
        }
        analysis
    }

    fn industry_metrics(&self) -> IndustryMetrics {
        IndustryMetrics {
            accuracy: 0.85,
            completeness: 0.8,
            usefulness: 0.8,
            efficiency: 0.8,
            ..IndustryMetrics::default()
        }
        .with_threshold("code_coverage", 0.8)
        .with_threshold("build_success_rate", 0.95)
    }

    fn success_rate_estimate(&self) -> f64 {
        0.88
    }

    fn feedback_estimate(&self) -> f64 {
        4.3
    }

    fn time_savings_estimate(&self) -> f64 {
        0.45
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analyzer() -> SoftwareAnalyzer {
        SoftwareAnalyzer::new().expect("builtin tables compile")
    }

    const PROJECT: &str = r#"=== README.md ===
Build a task tracker for small teams.
Must support offline mode.

=== package.json ===
{
  "name": "tracker",
  "dependencies": { "react": "^18.2.0", "zustand": "4.5.0" },
  "devDependencies": { "vite": "^5.0.0" },
  "scripts": { "dev": "vite", "build": "vite build" }
}

--- File: src/App.tsx ---
import React from 'react';
import { TaskList } from './TaskList';
import './styles.css';

// TODO: add drag and drop
export default function App() {
  const handleSubmit = () => {};
  return <form onSubmit={handleSubmit}><input /><button onClick={handleSubmit}>Add</button></form>;
}

--- File: src/TaskList.tsx ---
export const TaskList = () => null;
export interface TaskItem { id: string }
"#;

    #[test]
    fn test_split_sections_on_both_header_styles() {
        let a = analyzer();
        let sections = a.split_sections(PROJECT);
        let paths: Vec<_> = sections.iter().map(|s| s.path).collect();
        assert_eq!(
            paths,
            vec![
                Some("README.md"),
                Some("package.json"),
                Some("src/App.tsx"),
                Some("src/TaskList.tsx")
            ]
        );
        assert!(sections[0].body.contains("task tracker"));
    }

    #[test]
    fn test_full_project_analysis() {
        let analysis = analyzer().analyze_project(PROJECT);

        assert_eq!(
            analysis.insight("dependencies"),
            Some(&json!({ "react": "^18.2.0", "zustand": "4.5.0" }))
        );
        assert_eq!(
            analysis.insight("scripts"),
            Some(&json!({ "dev": "vite", "build": "vite build" }))
        );
        assert_eq!(
            analysis.insight_list("components"),
            vec!["App", "TaskList", "TaskItem"]
        );
        let interactions = analysis.insight_list("interactions");
        for expected in ["handleSubmit", "onSubmit", "onClick", "form", "input", "button"] {
            assert!(interactions.iter().any(|i| i == expected), "{expected}");
        }
        assert!(analysis
            .key_tasks
            .iter()
            .any(|t| t == "TODO: add drag and drop"));
        assert!(analysis
            .key_tasks
            .iter()
            .any(|t| t == "Build a task tracker for small teams."));
        assert_eq!(analysis.requirements, vec!["Must support offline mode."]);
        assert_eq!(
            analysis.insight("dependency_graph"),
            Some(&json!({
                "src/App.tsx": ["./TaskList", "./styles.css"],
                "src/TaskList.tsx": []
            }))
        );
        assert_eq!(analysis.insight_list("files").len(), 4);
        assert!(analysis.insight("manifest_error").is_none());
    }

    #[test]
    fn test_malformed_manifest_is_swallowed() {
        let analysis =
            analyzer().analyze_project("=== package.json ===\n{ \"dependencies\": { oops\n");

        assert_eq!(analysis.insight("dependencies"), Some(&json!({})));
        let note = analysis
            .insight_str("manifest_error")
            .expect("manifest error noted");
        assert!(note.starts_with("package.json:"));
    }

    #[test]
    fn test_fenced_json_manifest_fallback() {
        let text = "Our app uses:\n```json\n{ \"dependencies\": { \"express\": \"^4.18.0\" } }\n```\n";
        let analysis = analyzer().analyze_project(text);
        assert_eq!(
            analysis.insight("dependencies"),
            Some(&json!({ "express": "^4.18.0" }))
        );
    }

    #[test]
    fn test_cargo_manifest_dependencies() {
        let text = "=== Cargo.toml ===\n[package]\nname = \"svc\"\n\n[dependencies]\ntokio = { version = \"1\", features = [\"full\"] }\nserde = \"1.0\"\nlocal = { path = \"../local\" }\n";
        let analysis = analyzer().analyze_project(text);
        assert_eq!(
            analysis.insight("dependencies"),
            Some(&json!({ "tokio": "1", "serde": "1.0", "local": "path" }))
        );
    }

    #[test]
    fn test_rust_public_types_are_components() {
        let text = "--- File: src/lib.rs ---\npub struct Ledger;\npub(crate) enum Entry {}\nstruct Hidden;\n// FIXME: handle overflow\n";
        let analysis = analyzer().analyze_project(text);
        assert_eq!(analysis.insight_list("components"), vec!["Ledger", "Entry"]);
        assert_eq!(analysis.key_tasks, vec!["FIXME: handle overflow"]);
    }
}
