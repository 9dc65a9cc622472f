/*!
 * Segment and text-site discovery.
 *
 * Everything translatable in a document is addressed by child-index paths
 * from the root. Paths are collected first and resolved again right before
 * each mutation, so no borrow of the tree outlives a provider call. The only
 * structural edit made during a run is inserting a `target` right after its
 * `source`, which never shifts the path of any other container.
 */

use log::{debug, warn};

use super::XliffVersion;
use super::dom::{Document, Element, Node};
use crate::errors::XliffError;

const XLIFF_2_NAMESPACE_PREFIX: &str = "urn:oasis:names:tc:xliff:document:2";

/// Accessibility attributes translated by default
pub const DEFAULT_ATTRIBUTES: [&str; 5] = [
    "title",
    "alt",
    "aria-label",
    "aria-description",
    "aria-placeholder",
];

/// Location of one source/target pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRef {
    /// Path to the `trans-unit` (1.2) or `segment` (2.0)
    pub container: Vec<usize>,
    /// Child index of the source inside the container
    pub source: usize,
    /// Child index of the target, when one exists
    pub target: Option<usize>,
}

impl SegmentRef {
    pub fn source_path(&self) -> Vec<usize> {
        let mut path = self.container.clone();
        path.push(self.source);
        path
    }

    pub fn target_path(&self) -> Option<Vec<usize>> {
        self.target.map(|target| {
            let mut path = self.container.clone();
            path.push(target);
            path
        })
    }
}

/// Something translatable found during a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSite {
    /// Source/target pair
    Segment(SegmentRef),
    /// Element whose whole content is translated in place
    Note { path: Vec<usize> },
    /// Single attribute value
    Attribute { path: Vec<usize>, name: String },
}

/// Position of an element during a traversal
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    /// Child-index path from the root
    pub path: &'a [usize],
    /// Local names of all ancestors, root first
    pub ancestors: &'a [&'a str],
}

impl VisitContext<'_> {
    /// Whether any ancestor has one of the given local names
    pub fn within(&self, names: &[&str]) -> bool {
        self.ancestors.iter().any(|ancestor| names.contains(ancestor))
    }
}

/// Detect the schema generation from the root element
pub fn detect_version(root: &Element) -> XliffVersion {
    let namespace = root
        .namespace
        .as_deref()
        .or_else(|| root.attribute("xmlns"))
        .unwrap_or("");
    let version = root.attribute("version").unwrap_or("");

    if namespace.starts_with(XLIFF_2_NAMESPACE_PREFIX) || version.starts_with('2') {
        XliffVersion::V2_0
    } else {
        XliffVersion::V1_2
    }
}

/// Visit every element depth-first, gathering the sites the visitor reports
pub fn collect_sites(
    doc: &Document,
    visitor: &mut dyn FnMut(&Element, &VisitContext<'_>) -> Vec<TextSite>,
) -> Vec<TextSite> {
    let mut sites = Vec::new();
    let mut path = Vec::new();
    let mut ancestors = Vec::new();
    visit(&doc.root, &mut path, &mut ancestors, visitor, &mut sites);
    sites
}

fn visit<'a>(
    element: &'a Element,
    path: &mut Vec<usize>,
    ancestors: &mut Vec<&'a str>,
    visitor: &mut dyn FnMut(&Element, &VisitContext<'_>) -> Vec<TextSite>,
    sites: &mut Vec<TextSite>,
) {
    let context = VisitContext {
        path: path.as_slice(),
        ancestors: ancestors.as_slice(),
    };
    sites.extend(visitor(element, &context));

    ancestors.push(element.local_name());
    for (index, node) in element.children.iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            visit(child, path, ancestors, visitor, sites);
            path.pop();
        }
    }
    ancestors.pop();
}

/// Enumerate every source/target pair in document order
pub fn enumerate_segments(doc: &Document) -> Vec<SegmentRef> {
    let container_name = match doc.version() {
        XliffVersion::V1_2 => "trans-unit",
        XliffVersion::V2_0 => "segment",
    };
    let version = doc.version();
    // 2.0 units marked translate="no" cover every segment inside them
    let mut skipped_units: Vec<Vec<usize>> = Vec::new();

    let sites = collect_sites(doc, &mut |element: &Element, context: &VisitContext<'_>| {
        if version == XliffVersion::V2_0 && element.is("unit") && element.attribute("translate") == Some("no") {
            debug!("Skipping unit marked translate=\"no\" at {:?}", context.path);
            skipped_units.push(context.path.to_vec());
            return Vec::new();
        }
        if !element.is(container_name) {
            return Vec::new();
        }
        if skipped_units.iter().any(|unit| context.path.starts_with(unit)) {
            return Vec::new();
        }
        if version == XliffVersion::V2_0 && !context.ancestors.contains(&"unit") {
            warn!("Skipping segment outside a unit at {:?}", context.path);
            return Vec::new();
        }
        if element.attribute("translate") == Some("no") {
            debug!("Skipping {} marked translate=\"no\" at {:?}", container_name, context.path);
            return Vec::new();
        }
        match element.find_child("source") {
            Some(source) => vec![TextSite::Segment(SegmentRef {
                container: context.path.to_vec(),
                source,
                target: element.find_child("target"),
            })],
            None => {
                warn!("Skipping {} without a source at {:?}", container_name, context.path);
                Vec::new()
            }
        }
    });

    sites
        .into_iter()
        .filter_map(|site| match site {
            TextSite::Segment(segment) => Some(segment),
            _ => None,
        })
        .collect()
}

/// Notes with translatable text, in document order
pub fn note_sites(doc: &Document) -> Vec<TextSite> {
    collect_sites(doc, &mut |element: &Element, context: &VisitContext<'_>| {
        let translatable = element.is("note")
            && element.attribute("translate") != Some("no")
            && !element.text_content().trim().is_empty();
        if translatable {
            vec![TextSite::Note {
                path: context.path.to_vec(),
            }]
        } else {
            Vec::new()
        }
    })
}

/// Translatable attribute values. Elements inside a `source` or
/// `seg-source` are only included when sources are overwritten.
pub fn attribute_sites(doc: &Document, names: &[String], include_sources: bool) -> Vec<TextSite> {
    collect_sites(doc, &mut |element: &Element, context: &VisitContext<'_>| {
        if !include_sources && (element.is("source") || context.within(&["source", "seg-source"])) {
            return Vec::new();
        }
        element
            .attributes
            .iter()
            .filter(|attr| names.iter().any(|name| *name == attr.name))
            .filter(|attr| !attr.value.trim().is_empty())
            .map(|attr| TextSite::Attribute {
                path: context.path.to_vec(),
                name: attr.name.clone(),
            })
            .collect()
    })
}

/// Make sure a target exists for the segment, creating it after the source.
///
/// The new element reuses the source's prefix and namespace and takes over
/// its tail so the surrounding layout is unchanged. The segment is updated
/// with the target index.
pub fn ensure_target(doc: &mut Document, segment: &mut SegmentRef) -> Result<usize, XliffError> {
    let container = doc
        .element_at_mut(&segment.container)
        .ok_or_else(|| XliffError::StalePath(segment.container.clone()))?;

    if let Some(target) = segment.target {
        return match container.child_element(target) {
            Some(element) if element.is("target") => Ok(target),
            _ => Err(XliffError::StalePath(segment.target_path().unwrap_or_default())),
        };
    }

    let source = container
        .child_element(segment.source)
        .filter(|element| element.is("source"))
        .ok_or_else(|| XliffError::StalePath(segment.source_path()))?;

    let name = match source.name.split_once(':') {
        Some((prefix, local)) => format!("{}:{}", prefix, local.replace("source", "target")),
        None => source.name.replace("source", "target"),
    };
    let mut target = Element::new(name, source.namespace.clone());
    target.tail = source.tail.clone();

    let index = segment.source + 1;
    container.children.insert(index, Node::Element(target));
    segment.target = Some(index);
    Ok(index)
}

/// Record the output language on the document header
pub fn stamp_target_language(doc: &mut Document, language: &str) {
    match doc.version() {
        XliffVersion::V2_0 => doc.root.set_attribute("trgLang", language),
        XliffVersion::V1_2 => stamp_files(&mut doc.root, language),
    }
}

fn stamp_files(element: &mut Element, language: &str) {
    if element.is("file") {
        element.set_attribute("target-language", language);
        return;
    }
    for node in element.children.iter_mut() {
        if let Node::Element(child) = node {
            stamp_files(child, language);
        }
    }
}

/// Source language declared in the document header, if any
pub fn declared_source_language(doc: &Document) -> Option<String> {
    let declared = match doc.version() {
        XliffVersion::V2_0 => doc.root.attribute("srcLang").map(str::to_string),
        XliffVersion::V1_2 => {
            let mut found = None;
            collect_sites(doc, &mut |element: &Element, _: &VisitContext<'_>| {
                if found.is_none() && element.is("file") {
                    found = element.attribute("source-language").map(str::to_string);
                }
                Vec::new()
            });
            found
        }
    };
    declared.filter(|language| !language.trim().is_empty())
}
