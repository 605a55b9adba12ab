//! STAC catalog construction and link management.

use crate::cmr::CmrCollection;
use serde::{Serialize, Serializer};
use serde_json::Value;
use stac::{Link, Version};
use strum::{AsRefStr, Display};
use tracing::{debug, warn};

pub const DEFAULT_CATALOG_ID: &str = "default";
pub const DEFAULT_CATALOG_TITLE: &str = "Default Catalog";
pub const DEFAULT_CATALOG_DESCRIPTION: &str =
    "Default catalog for a no parameter search against common metadata repository.";

pub const ROOT_CATALOG_ID: &str = "cmr-stac";
pub const ROOT_CATALOG_TITLE: &str = "CMR STAC";
pub const ROOT_CATALOG_DESCRIPTION: &str =
    "Landing page of the STAC interface to NASA's Common Metadata Repository.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Relation {
    #[strum(serialize = "self")]
    SelfLink,
    Root,
    Child,
    Next,
    Search,
}

/// Which links a CMR collection contributes to a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionLink {
    Child,
    /// A child link plus a `next` link with the same target.
    ChildAndNext,
}

/// A collection whose `href` is a string containing `providers` is a provider
/// listing and gets a `next` link in addition to its child link. Absent or
/// non-string `href` values never match.
pub fn classify_collection(collection: &CmrCollection) -> CollectionLink {
    match &collection.href {
        Some(Value::String(href)) if href.contains("providers") => CollectionLink::ChildAndNext,
        _ => CollectionLink::Child,
    }
}

/// A STAC catalog being assembled for one response.
///
/// Child and next paths are resolved against the self href, so the self link
/// must be created before children are added.
#[derive(Debug, Clone)]
pub struct Catalog {
    inner: stac::Catalog,
    self_href: Option<String>,
}

impl Catalog {
    pub fn new(id: &str, description: &str) -> Self {
        Catalog {
            inner: stac::Catalog::new(id, description),
            self_href: None,
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.inner.title = Some(title.to_string());
    }

    /// Sets `stac_version`; an unparseable value keeps the crate default.
    pub fn set_stac_version(&mut self, version: &str) {
        match serde_json::from_value::<Version>(Value::String(version.to_string())) {
            Ok(v) => self.inner.version = v,
            Err(e) => warn!(version, error = %e, "Unusable STAC version, keeping default"),
        }
    }

    pub fn create_root(&mut self, url: &str) {
        self.push_link(url.to_string(), Relation::Root, None);
    }

    pub fn create_self(&mut self, url: &str) {
        self.self_href = Some(url.to_string());
        self.push_link(url.to_string(), Relation::SelfLink, None);
    }

    pub fn add_child(&mut self, title: &str, path: &str) {
        let href = self.resolve(path);
        self.push_link(href, Relation::Child, Some(title));
    }

    pub fn add_next(&mut self, title: &str, path: &str) {
        let href = self.resolve(path);
        self.push_link(href, Relation::Next, Some(title));
    }

    pub fn add_search(&mut self, url: &str) {
        self.push_link(url.to_string(), Relation::Search, None);
    }

    pub fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    pub fn links(&self) -> &[Link] {
        &self.inner.links
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.inner)
    }

    fn resolve(&self, path: &str) -> String {
        match &self.self_href {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => {
                debug!(path, "Catalog has no self link, keeping relative href");
                path.to_string()
            }
        }
    }

    fn push_link(&mut self, href: String, rel: Relation, title: Option<&str>) {
        let mut link = Link::new(href, rel.as_ref());
        link.r#type = Some("application/json".to_string());
        link.title = title.map(str::to_string);
        self.inner.links.push(link);
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

/// Landing catalog of the service, self and root at `stac_base_url`.
pub fn create_root_catalog(stac_base_url: &str, stac_version: &str) -> Catalog {
    let mut catalog = Catalog::new(ROOT_CATALOG_ID, ROOT_CATALOG_DESCRIPTION);
    catalog.set_stac_version(stac_version);
    catalog.set_title(ROOT_CATALOG_TITLE);
    catalog.create_self(stac_base_url);
    catalog.create_root(stac_base_url);
    catalog.add_search(&format!("{}/search", stac_base_url));
    catalog
}

pub fn create_default_catalog(stac_base_url: &str, stac_version: &str) -> Catalog {
    debug!("Creating the default catalog");
    let mut catalog = Catalog::new(DEFAULT_CATALOG_ID, DEFAULT_CATALOG_DESCRIPTION);
    catalog.set_stac_version(stac_version);
    catalog.set_title(DEFAULT_CATALOG_TITLE);
    catalog.create_root(stac_base_url);
    catalog.create_self(&format!("{}/{}", stac_base_url, DEFAULT_CATALOG_ID));
    catalog
}
