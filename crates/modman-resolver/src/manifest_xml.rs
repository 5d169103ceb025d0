//! `Manifest.xml` document parsing.
//!
//! ```xml
//! <Manifest>
//!     <version>1.2.3</version>
//!     <dependencies>
//!         <li>brrainz.harmony >= 2.0</li>
//!         <li><packageId>author.lib</packageId><displayName>Lib</displayName></li>
//!     </dependencies>
//!     <incompatibleWith><li>author.oldmod</li></incompatibleWith>
//!     <loadAfter><li>brrainz.harmony</li></loadAfter>
//!     <manifestUri>https://example.com/Manifest.xml</manifestUri>
//!     <suggests><li>author.addon</li></suggests>
//!     <showCrossPromotions>false</showCrossPromotions>
//! </Manifest>
//! ```

use std::path::Path;

use modman_util::errors::ModmanError;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::dependency::DependencyKind;

const ROOT: &str = "Manifest";

/// One `<li>` of a constraint list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// A dependency line in the text grammar.
    Line(String),
    /// A `<packageId>`/`<displayName>` pair.
    Structured {
        package_id: String,
        display_name: Option<String>,
    },
}

/// The raw contents of a `Manifest.xml` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    pub identifier: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<ManifestEntry>,
    pub incompatible_with: Vec<ManifestEntry>,
    pub load_before: Vec<ManifestEntry>,
    pub load_after: Vec<ManifestEntry>,
    pub manifest_uri: Option<String>,
    pub download_uri: Option<String>,
    pub suggests: Vec<String>,
    pub show_cross_promotions: bool,
}

impl Default for ManifestDocument {
    fn default() -> Self {
        Self {
            identifier: None,
            version: None,
            dependencies: Vec::new(),
            incompatible_with: Vec::new(),
            load_before: Vec::new(),
            load_after: Vec::new(),
            manifest_uri: None,
            download_uri: None,
            suggests: Vec::new(),
            show_cross_promotions: true,
        }
    }
}

impl ManifestDocument {
    /// Entries of the list holding constraints of `kind`.
    pub fn entries(&self, kind: DependencyKind) -> &[ManifestEntry] {
        match kind {
            DependencyKind::DependsOn => &self.dependencies,
            DependencyKind::Incompatible => &self.incompatible_with,
            DependencyKind::LoadBefore => &self.load_before,
            DependencyKind::LoadAfter => &self.load_after,
        }
    }

    fn entries_mut(&mut self, list: &str) -> Option<&mut Vec<ManifestEntry>> {
        match list {
            "dependencies" => Some(&mut self.dependencies),
            "incompatibleWith" => Some(&mut self.incompatible_with),
            "loadBefore" => Some(&mut self.load_before),
            "loadAfter" => Some(&mut self.load_after),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ListItem {
    package_id: Option<String>,
    display_name: Option<String>,
}

/// Read and parse a `Manifest.xml` file.
pub fn load_manifest(path: &Path) -> Result<ManifestDocument, ModmanError> {
    let xml = std::fs::read_to_string(path).map_err(|e| ModmanError::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_manifest(&xml, path)
}

/// Parse a `Manifest.xml` string. `path` is only used in error messages.
pub fn parse_manifest(xml: &str, path: &Path) -> Result<ManifestDocument, ModmanError> {
    let fail = |message: String| ModmanError::ManifestParse {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = ManifestDocument::default();
    let mut path_stack: Vec<String> = Vec::new();
    let mut text_buf = String::new();
    let mut current_item: Option<ListItem> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if path_stack.is_empty() {
                    if tag != ROOT {
                        return Err(fail(format!("expected <{ROOT}> root, found <{tag}>")));
                    }
                    saw_root = true;
                }
                path_stack.push(tag);
                text_buf.clear();

                if path_stack.len() == 3 && path_stack[2] == "li" {
                    current_item = Some(ListItem::default());
                }
            }
            Ok(Event::Empty(ref e)) => {
                if path_stack.is_empty() {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if tag != ROOT {
                        return Err(fail(format!("expected <{ROOT}> root, found <{tag}>")));
                    }
                    saw_root = true;
                }
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::CData(e)) => {
                text_buf = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
            }
            Ok(Event::End(_)) => {
                let depth = path_stack.len();
                let leaf = path_stack.last().map(|s| s.as_str());

                // Top-level scalar fields
                if depth == 2 {
                    match leaf {
                        Some("version") => doc.version = non_empty(&text_buf),
                        Some("identifier") => doc.identifier = non_empty(&text_buf),
                        Some("manifestUri") => doc.manifest_uri = non_empty(&text_buf),
                        Some("downloadUri") => doc.download_uri = non_empty(&text_buf),
                        Some("showCrossPromotions") => {
                            doc.show_cross_promotions =
                                !text_buf.trim().eq_ignore_ascii_case("false");
                        }
                        _ => {}
                    }
                }

                // Structured list item fields: <li><packageId/><displayName/></li>
                if depth == 4 && path_stack[2] == "li" {
                    if let Some(ref mut item) = current_item {
                        match leaf {
                            Some("packageId") => item.package_id = non_empty(&text_buf),
                            Some("displayName") => item.display_name = non_empty(&text_buf),
                            _ => {}
                        }
                    }
                }

                // List items
                if depth == 3 && leaf == Some("li") {
                    let list = path_stack[1].as_str();
                    let item = current_item.take().unwrap_or_default();
                    if list == "suggests" {
                        if let Some(s) = non_empty(&text_buf) {
                            doc.suggests.push(s);
                        }
                    } else if let Some(entries) = doc.entries_mut(list) {
                        match item.package_id {
                            Some(package_id) => entries.push(ManifestEntry::Structured {
                                package_id,
                                display_name: item.display_name,
                            }),
                            None => entries.push(ManifestEntry::Line(text_buf.clone())),
                        }
                    }
                }

                path_stack.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(fail(format!("invalid XML: {e}"))),
            _ => {}
        }
    }

    if !saw_root {
        return Err(fail("empty document".to_string()));
    }
    Ok(doc)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
