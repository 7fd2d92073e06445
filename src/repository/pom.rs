//! pom.xml parsing
//!
//! A light string scanner, enough to pull the project coordinates,
//! properties and build plugins out of a Maven descriptor.

use std::collections::BTreeMap;

/// Parsed pom.xml file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenPom {
    /// Project-level artifact id
    pub artifact_id: Option<String>,
    /// Project-level version, falling back to the parent version
    pub version: Option<String>,
    /// Entries of the project `<properties>` block
    pub properties: BTreeMap<String, String>,
    /// Build plugins keyed by artifact id
    pub plugins: BTreeMap<String, MavenPlugin>,
}

/// One `<plugin>` of the build section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenPlugin {
    pub artifact_id: String,
    /// Raw inner text of the plugin `<configuration>`
    pub configuration: Option<String>,
    pub executions: Vec<PluginExecution>,
}

/// One `<execution>` of a plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginExecution {
    pub id: Option<String>,
    /// Raw inner text of the execution `<configuration>`
    pub configuration: Option<String>,
}

/// Blocks whose elements never describe the project itself
const NESTED_SECTIONS: [&str; 8] = [
    "parent",
    "dependencies",
    "dependencyManagement",
    "build",
    "profiles",
    "reporting",
    "properties",
    "distributionManagement",
];

impl MavenPom {
    /// Parse pom.xml content
    pub fn parse(content: &str) -> Self {
        let content = strip_comments(content);
        let project = extract_block(&content, "project").unwrap_or_else(|| content.clone());

        let top_level = NESTED_SECTIONS
            .iter()
            .fold(project.clone(), |text, section| remove_blocks(&text, section));

        let parent_version = extract_block(&project, "parent")
            .and_then(|parent| extract_element(&parent, "version"));

        let properties = extract_block(&remove_blocks(&project, "profiles"), "properties")
            .map(|block| parse_properties(&block))
            .unwrap_or_default();

        let plugins = extract_block(&project, "build")
            .map(|build| remove_blocks(&build, "pluginManagement"))
            .map(|build| parse_plugins(&build))
            .unwrap_or_default();

        MavenPom {
            artifact_id: extract_element(&top_level, "artifactId"),
            version: extract_element(&top_level, "version").or(parent_version),
            properties,
            plugins,
        }
    }

    pub fn plugin(&self, artifact_id: &str) -> Option<&MavenPlugin> {
        self.plugins.get(artifact_id)
    }
}

fn strip_comments(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("<!--") {
        result.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + 3..],
            None => {
                rest = "";
                break;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Position of `<element>` or `<element attr...>`, not of a longer tag name
fn find_start_tag(content: &str, element: &str, from: usize) -> Option<(usize, usize)> {
    let needle = format!("<{}", element);
    let mut pos = from;
    while let Some(found) = content[pos..].find(&needle) {
        let start = pos + found;
        let after = start + needle.len();
        match content[after..].chars().next() {
            Some('>') => return Some((start, after + 1)),
            Some(c) if c.is_whitespace() => {
                let close = content[after..].find('>')? + after + 1;
                return Some((start, close));
            }
            _ => pos = after,
        }
    }
    None
}

/// Inner text of the first `<element>` block, nesting aware
fn find_block(content: &str, element: &str, from: usize) -> Option<(usize, usize, usize)> {
    let (start, inner_start) = find_start_tag(content, element, from)?;
    let end_tag = format!("</{}>", element);
    let mut depth = 1;
    let mut pos = inner_start;
    loop {
        let next_close = content[pos..].find(&end_tag)? + pos;
        match find_start_tag(content, element, pos) {
            Some((open, open_end)) if open < next_close => {
                depth += 1;
                pos = open_end;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, inner_start, next_close));
                }
                pos = next_close + end_tag.len();
            }
        }
    }
}

fn extract_block(content: &str, element: &str) -> Option<String> {
    find_block(content, element, 0).map(|(_, inner, end)| content[inner..end].to_string())
}

/// Inner texts of every top-level `<element>` block
fn extract_blocks(content: &str, element: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some((_, inner, end)) = find_block(content, element, pos) {
        blocks.push(content[inner..end].to_string());
        pos = end;
    }
    blocks
}

fn remove_blocks(content: &str, element: &str) -> String {
    let end_tag_len = element.len() + 3;
    let mut result = String::with_capacity(content.len());
    let mut pos = 0;
    while let Some((start, _, end)) = find_block(content, element, pos) {
        result.push_str(&content[pos..start]);
        pos = end + end_tag_len;
    }
    result.push_str(&content[pos..]);
    result
}

/// Trimmed text of the first `<element>`, if non-empty
fn extract_element(content: &str, element: &str) -> Option<String> {
    extract_block(content, element)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_properties(block: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut pos = 0;
    while let Some(open) = block[pos..].find('<') {
        let open = pos + open;
        let Some(close) = block[open..].find('>').map(|c| open + c) else {
            break;
        };
        let name = block[open + 1..close].trim();
        if name.is_empty() || name.starts_with('/') || name.ends_with('/') {
            pos = close + 1;
            continue;
        }
        let end_tag = format!("</{}>", name);
        match block[close + 1..].find(&end_tag) {
            Some(end) => {
                let value = block[close + 1..close + 1 + end].trim();
                properties.insert(name.to_string(), value.to_string());
                pos = close + 1 + end + end_tag.len();
            }
            None => pos = close + 1,
        }
    }
    properties
}

fn parse_plugins(build: &str) -> BTreeMap<String, MavenPlugin> {
    let plugins_block = extract_block(build, "plugins").unwrap_or_default();
    extract_blocks(&plugins_block, "plugin")
        .iter()
        .filter_map(|block| parse_plugin(block))
        .map(|plugin| (plugin.artifact_id.clone(), plugin))
        .collect()
}

fn parse_plugin(block: &str) -> Option<MavenPlugin> {
    let own = remove_blocks(&remove_blocks(block, "dependencies"), "executions");
    let artifact_id = extract_element(&own, "artifactId")?;
    let configuration = extract_block(&own, "configuration");
    let executions = extract_block(block, "executions")
        .map(|executions| {
            extract_blocks(&executions, "execution")
                .iter()
                .map(|execution| PluginExecution {
                    id: extract_element(execution, "id"),
                    configuration: extract_block(execution, "configuration"),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(MavenPlugin {
        artifact_id,
        configuration,
        executions,
    })
}
