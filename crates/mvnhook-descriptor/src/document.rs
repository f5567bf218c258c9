//! Maven descriptor document
//!
//! A [`Document`] owns the parsed tree of one POM. Queries look at the
//! top-level `build` section and at the `build` section of every profile;
//! mutations touch the same sections and keep the surrounding layout.

use crate::error::{ApplyError, ParseError, SerializeError};
use crate::hash::ContentHash;
use crate::identity::{plugin_matches, PluginIdentity, DEFAULT_PLUGIN_GROUP};
use crate::xml::{parse_tree, write_tree, Element, Layout, Node, XmlTree};
use std::path::Path;
use tracing::debug;

/// Name of the test runner property carrying listener classes
pub const LISTENER_PROPERTY: &str = "listener";

// Nesting depth of fixed POM elements below `project`
const BUILD_DEPTH: usize = 1;
const PROFILE_DEPTH: usize = 2;
const PROFILE_BUILD_DEPTH: usize = 3;

/// Lifecycle of a document within one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Parsed and untouched
    Parsed,
    /// At least one mutation applied
    Mutated,
    /// Written to disk
    Saved,
}

/// A parsed Maven descriptor
#[derive(Debug, Clone)]
pub struct Document {
    tree: XmlTree,
    indent: Option<String>,
    newline: &'static str,
    state: DocumentState,
}

impl Document {
    /// Parse descriptor text
    ///
    /// # Errors
    /// Returns [`ParseError`] for malformed markup or a missing root
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let tree = parse_tree(text)?;
        let indent = detect_indent(&tree.root);
        Ok(Self {
            tree,
            indent,
            newline: detect_newline(text),
            state: DocumentState::Parsed,
        })
    }

    /// Read and parse a descriptor file
    ///
    /// # Errors
    /// Returns [`ParseError::Io`] if the file cannot be read and
    /// [`ParseError::Encoding`] if it is not UTF-8
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ParseError::Encoding(format!("{} is not valid UTF-8", path.display()))
            } else {
                ParseError::io_error(path, e)
            }
        })?;
        Self::parse(&text)
    }

    /// Root element
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.tree.root
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DocumentState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.state == DocumentState::Mutated
    }

    /// Indentation unit detected from the source, `None` for compact files
    #[inline]
    #[must_use]
    pub fn indent_unit(&self) -> Option<&str> {
        self.indent.as_deref()
    }

    /// Line terminator detected from the first line of the source
    #[inline]
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        self.newline
    }

    /// Root element is a Maven `project`
    #[must_use]
    pub fn is_valid_project(&self) -> bool {
        self.tree.root.is_named("project")
    }

    /// True if any build section (top-level or profile) declares the plugin
    ///
    /// Only coordinates are compared; the version is ignored.
    #[must_use]
    pub fn is_plugin_present_anywhere(&self, group_id: &str, artifact_id: &str) -> bool {
        self.plugins()
            .any(|plugin| plugin_matches(plugin, group_id, artifact_id))
    }

    /// Version declared by the first matching plugin in document order
    #[must_use]
    pub fn plugin_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
        self.plugins()
            .find(|plugin| plugin_matches(plugin, group_id, artifact_id))
            .and_then(|plugin| plugin.child_text("version"))
            .filter(|version| !version.is_empty())
    }

    /// Number of `profile` elements
    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.tree
            .root
            .children_named("profiles")
            .map(|profiles| profiles.children_named("profile").count())
            .sum()
    }

    /// Append a plugin to the top-level build and to every profile build
    ///
    /// Missing `build` and `plugins` elements are created. A section that
    /// already declares the fragment's coordinates is left alone. Returns
    /// the number of sections that received the plugin.
    ///
    /// # Errors
    /// Returns [`ApplyError::InvalidFragment`] if `fragment` is not a
    /// `plugin` element with an `artifactId`
    pub fn add_plugin_to_all_profiles(&mut self, fragment: &Element) -> Result<usize, ApplyError> {
        let artifact_id = fragment
            .child_text("artifactId")
            .filter(|id| fragment.is_named("plugin") && !id.is_empty())
            .ok_or_else(|| ApplyError::InvalidFragment(fragment.name().to_string()))?;
        let group_id = fragment
            .child_text("groupId")
            .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string());

        let layout = layout(self.indent.as_deref(), self.newline);
        let root = &mut self.tree.root;
        let mut added = 0;

        let build = root
            .child_or_insert("build", 0, layout)
            .ok_or_else(|| ApplyError::MissingElement("build".to_string()))?;
        added += insert_plugin(build, BUILD_DEPTH, fragment, &group_id, &artifact_id, layout)?;

        for profiles in root.children_named_mut("profiles") {
            for profile in profiles.children_named_mut("profile") {
                let build = profile
                    .child_or_insert("build", PROFILE_DEPTH, layout)
                    .ok_or_else(|| ApplyError::MissingElement("build".to_string()))?;
                added += insert_plugin(
                    build,
                    PROFILE_BUILD_DEPTH,
                    fragment,
                    &group_id,
                    &artifact_id,
                    layout,
                )?;
            }
        }

        debug!(plugin = %artifact_id, sections = added, "plugin added");
        if added > 0 {
            self.state = DocumentState::Mutated;
        }
        Ok(added)
    }

    /// Wire the agent and listener into every declared test runner plugin
    ///
    /// `-javaagent:<agent_jar>` is prepended to `configuration/argLine`
    /// unless already there. With a listener the `listener` property is
    /// set to it; without one any `listener` property is removed. Sections
    /// without a test runner plugin are not touched. Returns the number of
    /// sections updated.
    pub fn update_test_runner_plugin(&mut self, listener: Option<&str>, agent_jar: &str) -> usize {
        let layout = layout(self.indent.as_deref(), self.newline);
        let agent = format!("-javaagent:{agent_jar}");
        let mut updated = 0;

        for (plugins, depth) in plugin_lists_mut(&mut self.tree.root) {
            let mut touched = false;
            for plugin in plugins.children_named_mut("plugin") {
                if PluginIdentity::TEST_RUNNER.matches(plugin) {
                    configure_test_runner(plugin, depth + 1, layout, &agent, listener);
                    touched = true;
                }
            }
            if touched {
                updated += 1;
            }
        }

        debug!(sections = updated, listener = ?listener, "test runner updated");
        if updated > 0 {
            self.state = DocumentState::Mutated;
        }
        updated
    }

    /// Serialize to text
    ///
    /// # Errors
    /// Returns [`SerializeError`] if the writer fails
    pub fn to_xml_string(&self) -> Result<String, SerializeError> {
        write_tree(&self.tree)
    }

    /// Hash of the serialized text
    ///
    /// # Errors
    /// Returns [`SerializeError`] if serialization fails
    pub fn checksum(&self) -> Result<ContentHash, SerializeError> {
        self.to_xml_string()
            .map(|text| ContentHash::compute(text.as_bytes()))
    }

    /// Write the document to `path`
    ///
    /// Returns the hash of the written text.
    ///
    /// # Errors
    /// Returns [`SerializeError`] if serialization or the write fails
    pub fn save(&mut self, path: &Path) -> Result<ContentHash, SerializeError> {
        let text = self.to_xml_string()?;
        std::fs::write(path, text.as_bytes()).map_err(|e| SerializeError::io_error(path, e))?;
        self.state = DocumentState::Saved;
        Ok(ContentHash::compute(text.as_bytes()))
    }

    fn plugins(&self) -> impl Iterator<Item = &Element> {
        plugin_lists(&self.tree.root)
            .into_iter()
            .flat_map(|plugins| plugins.children_named("plugin"))
    }
}

/// `plugins` elements of the top-level build and each profile build
fn plugin_lists(root: &Element) -> Vec<&Element> {
    let mut lists = Vec::new();
    for child in root.elements() {
        if child.is_named("build") {
            lists.extend(child.child("plugins"));
        } else if child.is_named("profiles") {
            for profile in child.children_named("profile") {
                lists.extend(profile.child("build").and_then(|b| b.child("plugins")));
            }
        }
    }
    lists
}

/// Mutable `plugins` elements paired with their depth below `project`
fn plugin_lists_mut(root: &mut Element) -> Vec<(&mut Element, usize)> {
    let mut lists = Vec::new();
    for child in root.elements_mut() {
        if child.is_named("build") {
            if let Some(plugins) = child.child_mut("plugins") {
                lists.push((plugins, BUILD_DEPTH + 1));
            }
        } else if child.is_named("profiles") {
            for profile in child.children_named_mut("profile") {
                if let Some(plugins) = profile.child_mut("build").and_then(|b| b.child_mut("plugins")) {
                    lists.push((plugins, PROFILE_BUILD_DEPTH + 1));
                }
            }
        }
    }
    lists
}

fn insert_plugin(
    build: &mut Element,
    build_depth: usize,
    fragment: &Element,
    group_id: &str,
    artifact_id: &str,
    layout: Option<Layout<'_>>,
) -> Result<usize, ApplyError> {
    let plugins = build
        .child_or_insert("plugins", build_depth, layout)
        .ok_or_else(|| ApplyError::MissingElement("plugins".to_string()))?;
    if plugins
        .children_named("plugin")
        .any(|plugin| plugin_matches(plugin, group_id, artifact_id))
    {
        return Ok(0);
    }
    plugins.append_child(fragment.clone(), build_depth + 1, layout);
    Ok(1)
}

fn configure_test_runner(
    plugin: &mut Element,
    plugin_depth: usize,
    layout: Option<Layout<'_>>,
    agent: &str,
    listener: Option<&str>,
) {
    let Some(configuration) = plugin.child_or_insert("configuration", plugin_depth, layout) else {
        return;
    };

    if let Some(arg_line) = configuration.child_or_insert("argLine", plugin_depth + 1, layout) {
        let current = arg_line.text();
        if !contains_argument(&current, agent) {
            if current.is_empty() {
                arg_line.set_text(agent);
            } else {
                arg_line.set_text(&format!("{agent} {current}"));
            }
        }
    }

    match listener {
        Some(listener) => {
            let Some(properties) =
                configuration.child_or_insert("properties", plugin_depth + 1, layout)
            else {
                return;
            };
            let existing = properties
                .children_named_mut("property")
                .find(|p| p.child_text("name").as_deref() == Some(LISTENER_PROPERTY));
            match existing {
                Some(property) => {
                    if let Some(value) = property.child_or_insert("value", plugin_depth + 3, layout) {
                        if value.text() != listener {
                            value.set_text(listener);
                        }
                    }
                }
                None => {
                    let property = Element::new("property")
                        .with_child(Element::with_text("name", LISTENER_PROPERTY))
                        .with_child(Element::with_text("value", listener));
                    properties.append_child(property, plugin_depth + 2, layout);
                }
            }
        }
        None => {
            if let Some(properties) = configuration.child_mut("properties") {
                properties.remove_elements_where(|p| {
                    p.is_named("property")
                        && p.child_text("name").as_deref() == Some(LISTENER_PROPERTY)
                });
            }
        }
    }
}

/// True if `arg` occurs in `line` followed by whitespace or the end
///
/// `arg` may itself contain spaces.
fn contains_argument(line: &str, arg: &str) -> bool {
    line.match_indices(arg).any(|(at, _)| {
        line[at + arg.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
    })
}

fn layout<'a>(unit: Option<&'a str>, newline: &'static str) -> Option<Layout<'a>> {
    unit.map(|unit| Layout::new(unit).with_newline(newline))
}

fn detect_newline(text: &str) -> &'static str {
    match text.find('\n') {
        Some(at) if text[..at].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Indentation unit taken from the first line break inside the root
fn detect_indent(root: &Element) -> Option<String> {
    root.children().iter().find_map(|node| match node {
        Node::Text(ws) if ws.contains('\n') && ws.chars().all(char::is_whitespace) => {
            let unit = ws.rsplit('\n').next().unwrap_or_default();
            (!unit.is_empty()).then(|| unit.to_string())
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SUREFIRE: PluginIdentity = PluginIdentity::TEST_RUNNER;

    fn fragment() -> Element {
        Element::new("plugin")
            .with_child(Element::with_text("groupId", "g"))
            .with_child(Element::with_text("artifactId", "a"))
    }

    #[test]
    fn detects_indent_unit() {
        let doc = Document::parse("<project>\n    <modelVersion>4.0.0</modelVersion>\n</project>")
            .unwrap();
        assert_eq!(doc.indent_unit(), Some("    "));

        let doc = Document::parse("<project><modelVersion>4.0.0</modelVersion></project>").unwrap();
        assert_eq!(doc.indent_unit(), None);
    }

    #[test]
    fn compact_document_gets_compact_insertion() {
        let mut doc = Document::parse("<project><artifactId>x</artifactId></project>").unwrap();
        assert_eq!(doc.add_plugin_to_all_profiles(&fragment()).unwrap(), 1);
        assert_eq!(
            doc.to_xml_string().unwrap(),
            "<project><artifactId>x</artifactId><build><plugins><plugin>\
             <groupId>g</groupId><artifactId>a</artifactId></plugin></plugins></build></project>"
        );
        assert!(doc.is_modified());
    }

    #[test]
    fn rejects_fragment_without_artifact() {
        let mut doc = Document::parse("<project/>").unwrap();
        let err = doc
            .add_plugin_to_all_profiles(&Element::new("dependency"))
            .unwrap_err();
        assert!(matches!(err, ApplyError::InvalidFragment(name) if name == "dependency"));
        assert_eq!(doc.state(), DocumentState::Parsed);
    }

    #[test]
    fn second_insertion_adds_nothing() {
        let mut doc = Document::parse(
            "<project><profiles><profile><id>p</id></profile></profiles></project>",
        )
        .unwrap();
        assert_eq!(doc.add_plugin_to_all_profiles(&fragment()).unwrap(), 2);
        assert_eq!(doc.add_plugin_to_all_profiles(&fragment()).unwrap(), 0);
        assert!(doc.is_plugin_present_anywhere("g", "a"));
    }

    #[test]
    fn plugin_version_is_first_in_document_order() {
        let doc = Document::parse(
            "<project><build><plugins><plugin><artifactId>maven-surefire-plugin</artifactId>\
             <version>2.22.2</version></plugin></plugins></build><profiles><profile><build>\
             <plugins><plugin><artifactId>maven-surefire-plugin</artifactId><version>3.0.0\
             </version></plugin></plugins></build></profile></profiles></project>",
        )
        .unwrap();
        assert_eq!(
            doc.plugin_version(SUREFIRE.group_id, SUREFIRE.artifact_id)
                .as_deref(),
            Some("2.22.2")
        );
        assert_eq!(doc.plugin_version("g", "a"), None);
    }

    #[test]
    fn agent_is_not_prepended_twice() {
        let mut doc = Document::parse(
            "<project><build><plugins><plugin><artifactId>maven-surefire-plugin</artifactId>\
             <configuration><argLine>-Xmx1g</argLine></configuration></plugin></plugins>\
             </build></project>",
        )
        .unwrap();
        assert_eq!(doc.update_test_runner_plugin(None, "/tmp/agent.jar"), 1);
        assert_eq!(doc.update_test_runner_plugin(None, "/tmp/agent.jar"), 1);
        let text = doc.to_xml_string().unwrap();
        assert!(text.contains("<argLine>-javaagent:/tmp/agent.jar -Xmx1g</argLine>"), "{text}");
    }

    #[test]
    fn agent_path_with_space_is_not_prepended_twice() {
        let mut doc = Document::parse(
            "<project><build><plugins><plugin><artifactId>maven-surefire-plugin</artifactId>\
             </plugin></plugins></build></project>",
        )
        .unwrap();
        doc.update_test_runner_plugin(None, "/opt/my agents/sl.jar");
        doc.update_test_runner_plugin(None, "/opt/my agents/sl.jar");
        let text = doc.to_xml_string().unwrap();
        assert_eq!(text.matches("-javaagent:").count(), 1, "{text}");
    }

    #[test]
    fn other_agent_with_same_prefix_still_gets_prepended() {
        assert!(contains_argument("-javaagent:/a.jar -Xmx1g", "-javaagent:/a.jar"));
        assert!(contains_argument("-Xmx1g -javaagent:/a b.jar", "-javaagent:/a b.jar"));
        assert!(!contains_argument("-javaagent:/a.jar2", "-javaagent:/a.jar"));
    }

    #[test]
    fn detects_line_ending() {
        let doc = Document::parse("<project>\r\n  <a/>\r\n</project>\r\n").unwrap();
        assert_eq!(doc.line_ending(), "\r\n");
        assert_eq!(doc.indent_unit(), Some("  "));
        assert_eq!(Document::parse("<project/>").unwrap().line_ending(), "\n");
    }

    #[test]
    fn no_test_runner_no_update() {
        let mut doc = Document::parse("<project><build><plugins/></build></project>").unwrap();
        assert_eq!(doc.update_test_runner_plugin(Some("L"), "/a.jar"), 0);
        assert!(!doc.is_plugin_present_anywhere(SUREFIRE.group_id, SUREFIRE.artifact_id));
        assert_eq!(doc.state(), DocumentState::Parsed);
    }

    #[test]
    fn profile_count() {
        let doc = Document::parse(
            "<project><profiles><profile/><profile/><profile/></profiles></project>",
        )
        .unwrap();
        assert_eq!(doc.profile_count(), 3);
    }
}
