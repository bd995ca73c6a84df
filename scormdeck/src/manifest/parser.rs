//! Event-driven manifest parser.
//!
//! Walks the markup once with quick-xml, building just enough structure to
//! answer the launch question: organizations with their nested item trees,
//! and the top-level resource list. Namespace prefixes (`adlcp:`,
//! `imsss:`) are ignored by matching on local names.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use super::types::{ManifestError, PackageManifest, ScormVersion, DEFAULT_TITLE};

#[derive(Debug, Default)]
struct ItemNode {
    identifier_ref: Option<String>,
    title: Option<String>,
    prerequisites: Vec<String>,
    children: Vec<ItemNode>,
}

#[derive(Debug, Default)]
struct Organization {
    identifier: Option<String>,
    title: Option<String>,
    items: Vec<ItemNode>,
}

/// Parse manifest markup into a [`PackageManifest`].
///
/// # Errors
///
/// Fails when the manifest root or organizations section is absent, when
/// no item carries a resource reference, or when that reference does not
/// resolve to a resource with an href. An unrecognized or missing schema
/// version is not an error: it falls back to SCORM 1.2 with a logged
/// diagnostic.
pub fn parse_manifest(xml: &str) -> Result<PackageManifest, ManifestError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut saw_manifest = false;
    let mut saw_organizations = false;
    let mut manifest_version_attr: Option<String> = None;
    let mut schema_version_text: Option<String> = None;
    let mut default_org_id: Option<String> = None;
    let mut organizations: Vec<Organization> = Vec::new();
    let mut current_org: Option<Organization> = None;
    let mut item_stack: Vec<ItemNode> = Vec::new();
    // resource identifier -> href (None when the resource has no href)
    let mut resources: HashMap<String, Option<String>> = HashMap::new();
    let mut element_stack: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ManifestError::Markup(e.to_string()))?
        {
            Event::Start(start) => {
                let name = start.local_name().as_ref().to_vec();
                handle_open(
                    &name,
                    &attributes(&start),
                    &mut saw_manifest,
                    &mut saw_organizations,
                    &mut manifest_version_attr,
                    &mut default_org_id,
                    &mut current_org,
                    &mut item_stack,
                    &mut resources,
                );
                element_stack.push(name);
            }
            Event::Empty(start) => {
                let name = start.local_name().as_ref().to_vec();
                handle_open(
                    &name,
                    &attributes(&start),
                    &mut saw_manifest,
                    &mut saw_organizations,
                    &mut manifest_version_attr,
                    &mut default_org_id,
                    &mut current_org,
                    &mut item_stack,
                    &mut resources,
                );
                handle_close(&name, &mut organizations, &mut current_org, &mut item_stack);
            }
            Event::End(end) => {
                let name = end.local_name().as_ref().to_vec();
                element_stack.pop();
                handle_close(&name, &mut organizations, &mut current_org, &mut item_stack);
            }
            Event::Text(text) => {
                let text = text
                    .xml_content()
                    .map_err(|e| ManifestError::Markup(e.to_string()))?;
                handle_text(
                    text.trim(),
                    &element_stack,
                    &mut schema_version_text,
                    &mut current_org,
                    &mut item_stack,
                );
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                handle_text(
                    text.trim(),
                    &element_stack,
                    &mut schema_version_text,
                    &mut current_org,
                    &mut item_stack,
                );
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_manifest {
        return Err(ManifestError::MissingManifestRoot);
    }
    if !saw_organizations {
        return Err(ManifestError::MissingOrganizations);
    }

    let version = resolve_version(schema_version_text.as_deref(), manifest_version_attr.as_deref());

    // Default organization by id, falling back to the first one present.
    let organization = default_org_id
        .as_deref()
        .and_then(|id| {
            organizations
                .iter()
                .find(|org| org.identifier.as_deref() == Some(id))
        })
        .or_else(|| organizations.first())
        .ok_or(ManifestError::NoLaunchableItem)?;

    let launch_item = find_launch_item(&organization.items).ok_or(ManifestError::NoLaunchableItem)?;
    let reference = launch_item
        .identifier_ref
        .clone()
        .unwrap_or_default();

    let launch_url = resources
        .get(&reference)
        .cloned()
        .flatten()
        .filter(|href| !href.is_empty())
        .ok_or_else(|| ManifestError::UnresolvedResource {
            reference: reference.clone(),
        })?;

    let title = launch_item
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| organization.title.clone().filter(|t| !t.is_empty()))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Ok(PackageManifest {
        launch_url,
        version,
        title,
        prerequisites: launch_item.prerequisites.clone(),
    })
}

fn attributes(start: &quick_xml::events::BytesStart<'_>) -> HashMap<Vec<u8>, String> {
    start
        .attributes()
        .flatten()
        .filter_map(|attr| {
            let key = attr.key.local_name().as_ref().to_vec();
            attr.unescape_value().ok().map(|v| (key, v.into_owned()))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn handle_open(
    name: &[u8],
    attrs: &HashMap<Vec<u8>, String>,
    saw_manifest: &mut bool,
    saw_organizations: &mut bool,
    manifest_version_attr: &mut Option<String>,
    default_org_id: &mut Option<String>,
    current_org: &mut Option<Organization>,
    item_stack: &mut Vec<ItemNode>,
    resources: &mut HashMap<String, Option<String>>,
) {
    match name {
        b"manifest" => {
            *saw_manifest = true;
            *manifest_version_attr = attrs.get(b"version".as_slice()).cloned();
        }
        b"organizations" => {
            *saw_organizations = true;
            *default_org_id = attrs.get(b"default".as_slice()).cloned();
        }
        b"organization" => {
            *current_org = Some(Organization {
                identifier: attrs.get(b"identifier".as_slice()).cloned(),
                ..Organization::default()
            });
        }
        b"item" => {
            item_stack.push(ItemNode {
                identifier_ref: attrs.get(b"identifierref".as_slice()).cloned(),
                ..ItemNode::default()
            });
        }
        b"resource" => {
            if let Some(identifier) = attrs.get(b"identifier".as_slice()) {
                resources.insert(
                    identifier.clone(),
                    attrs.get(b"href".as_slice()).cloned(),
                );
            }
        }
        _ => {}
    }
}

fn handle_close(
    name: &[u8],
    organizations: &mut Vec<Organization>,
    current_org: &mut Option<Organization>,
    item_stack: &mut Vec<ItemNode>,
) {
    match name {
        b"item" => {
            if let Some(item) = item_stack.pop() {
                match item_stack.last_mut() {
                    Some(parent) => parent.children.push(item),
                    None => {
                        if let Some(org) = current_org.as_mut() {
                            org.items.push(item);
                        }
                    }
                }
            }
        }
        b"organization" => {
            if let Some(org) = current_org.take() {
                organizations.push(org);
            }
        }
        _ => {}
    }
}

fn handle_text(
    text: &str,
    element_stack: &[Vec<u8>],
    schema_version_text: &mut Option<String>,
    current_org: &mut Option<Organization>,
    item_stack: &mut Vec<ItemNode>,
) {
    if text.is_empty() {
        return;
    }
    let Some(element) = element_stack.last() else {
        return;
    };
    match element.as_slice() {
        b"schemaversion" => *schema_version_text = Some(text.to_string()),
        b"title" => {
            let parent = element_stack
                .len()
                .checked_sub(2)
                .map(|i| element_stack[i].as_slice());
            match parent {
                Some(b"item") => {
                    if let Some(item) = item_stack.last_mut() {
                        item.title.get_or_insert_with(|| text.to_string());
                    }
                }
                Some(b"organization") => {
                    if let Some(org) = current_org.as_mut() {
                        org.title.get_or_insert_with(|| text.to_string());
                    }
                }
                _ => {}
            }
        }
        b"prerequisites" => {
            if let Some(item) = item_stack.last_mut() {
                item.prerequisites.push(text.to_string());
            }
        }
        _ => {}
    }
}

fn resolve_version(schema_text: Option<&str>, version_attr: Option<&str>) -> ScormVersion {
    let declared = schema_text.or(version_attr);
    match declared.and_then(ScormVersion::from_schema_text) {
        Some(version) => version,
        None => {
            warn!(
                declared = declared.unwrap_or("<absent>"),
                "unrecognized schema version, defaulting to SCORM 1.2"
            );
            ScormVersion::V1_2
        }
    }
}

/// Depth-first search for the first item carrying a resource reference.
fn find_launch_item(items: &[ItemNode]) -> Option<&ItemNode> {
    for item in items {
        if item.identifier_ref.is_some() {
            return Some(item);
        }
        if let Some(found) = find_launch_item(&item.children) {
            return Some(found);
        }
    }
    None
}
