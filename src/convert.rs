//! CMR granule records to STAC items and item collections.

use crate::cmr::{CmrGranule, CmrLink, GranuleSearch};
use crate::common::context::RequestContext;
use anyhow::{Result, anyhow};
use reqwest::Url;
use serde_json::{Map, Value, json};
use stac::Link;
use stac_api::{Context, ItemCollection};

const DATA_REL: &str = "http://esipfed.org/ns/fedsearch/1.1/data#";
const BROWSE_REL: &str = "http://esipfed.org/ns/fedsearch/1.1/browse#";
const METADATA_REL: &str = "http://esipfed.org/ns/fedsearch/1.1/metadata#";

/// How the next page of a search is requested.
#[derive(Debug, Clone)]
pub enum NextPage {
    /// `GET /stac/search` with the original query pairs.
    Query(Vec<(String, String)>),
    /// `POST /stac/search` with the original body.
    Body(Map<String, Value>),
}

#[derive(Debug, Clone)]
pub struct Paging {
    pub limit: u64,
    pub page: u64,
    pub next: NextPage,
}

/// Builds the FeatureCollection answering one search request.
pub fn cmr_granules_to_feature_collection(
    ctx: &RequestContext,
    stac_version: &str,
    search: GranuleSearch,
    paging: &Paging,
) -> Result<ItemCollection> {
    let items: Vec<Map<String, Value>> = search
        .granules
        .iter()
        .filter_map(|granule| {
            cmr_granule_to_feature(ctx, stac_version, granule)
                .as_object()
                .cloned()
        })
        .collect();
    let returned = items.len() as u64;

    let mut item_collection =
        ItemCollection::new(items).map_err(|e| anyhow!("Could not build item collection: {}", e))?;

    let mut self_link = Link::new(ctx.request_url(), "self");
    self_link.r#type = Some("application/geo+json".to_string());
    item_collection.links.push(self_link);

    let mut root_link = Link::new(ctx.stac_base_url(), "root");
    root_link.r#type = Some("application/json".to_string());
    item_collection.links.push(root_link);

    if returned > 0 && returned == paging.limit {
        item_collection.links.push(next_link(ctx, paging)?);
    }

    item_collection.context = Some(Context {
        returned,
        limit: Some(paging.limit),
        matched: search.hits,
        additional_fields: Default::default(),
    });

    Ok(item_collection)
}

fn next_link(ctx: &RequestContext, paging: &Paging) -> Result<Link> {
    let search_url = format!("{}/search", ctx.stac_base_url());
    let next_page = paging.page + 1;

    let mut link = match &paging.next {
        NextPage::Query(pairs) => {
            let mut url = Url::parse(&search_url)?;
            {
                let mut query = url.query_pairs_mut();
                for (name, value) in pairs.iter().filter(|(name, _)| name != "page") {
                    query.append_pair(name, value);
                }
                query.append_pair("page", &next_page.to_string());
            }
            Link::new(url.to_string(), "next")
        }
        NextPage::Body(body) => {
            let mut body = body.clone();
            body.insert("page".to_string(), json!(next_page));
            let mut link = Link::new(search_url, "next");
            link.method = Some("POST".to_string());
            link.body = Some(body);
            link
        }
    };
    link.r#type = Some("application/geo+json".to_string());
    Ok(link)
}

/// Converts one CMR granule into a STAC item.
pub fn cmr_granule_to_feature(
    ctx: &RequestContext,
    stac_version: &str,
    granule: &CmrGranule,
) -> Value {
    let geometry = granule_geometry(granule);
    let bbox = geometry.as_ref().and_then(geometry_bbox);
    let collection = granule.collection_concept_id.clone().unwrap_or_default();
    let app_base = ctx.app_base_url();

    let mut properties = Map::new();
    properties.insert("datetime".to_string(), json!(granule.time_start));
    // A range is only published with its start
    if let Some(start) = &granule.time_start {
        properties.insert("start_datetime".to_string(), json!(start));
        if let Some(end) = &granule.time_end {
            properties.insert("end_datetime".to_string(), json!(end));
        }
    }
    if let Some(title) = &granule.title {
        properties.insert("title".to_string(), json!(title));
    }
    if let Some(updated) = &granule.updated {
        properties.insert("updated".to_string(), json!(updated));
    }
    if let Some(provider) = &granule.data_center {
        properties.insert("provider".to_string(), json!(provider));
    }

    let mut feature = json!({
        "type": "Feature",
        "stac_version": stac_version,
        "id": granule.id,
        "collection": collection,
        "geometry": geometry,
        "properties": properties,
        "links": [
            {
                "rel": "self",
                "type": "application/geo+json",
                "href": format!("{}/collections/{}/items/{}", app_base, collection, granule.id)
            },
            {
                "rel": "collection",
                "type": "application/json",
                "href": format!("{}/collections/{}", app_base, collection)
            },
            {
                "rel": "root",
                "type": "application/json",
                "href": ctx.stac_base_url()
            }
        ],
        "assets": granule_assets(&granule.links)
    });
    if let Some(bbox) = bbox {
        feature["bbox"] = json!(bbox);
    }
    feature
}

fn granule_assets(links: &[CmrLink]) -> Value {
    let mut assets = Map::new();
    for link in links.iter().filter(|l| l.inherited != Some(true)) {
        let (key, roles) = match link.rel.as_deref() {
            Some(DATA_REL) => ("data", vec!["data"]),
            Some(BROWSE_REL) => ("browse", vec!["overview"]),
            Some(METADATA_REL) => ("metadata", vec!["metadata"]),
            _ => continue,
        };
        if assets.contains_key(key) {
            continue;
        }
        let mut asset = json!({ "href": link.href, "roles": roles });
        if let Some(title) = &link.title {
            asset["title"] = json!(title);
        }
        if let Some(media_type) = &link.media_type {
            asset["type"] = json!(media_type);
        }
        assets.insert(key.to_string(), asset);
    }
    Value::Object(assets)
}

/// CMR writes spatial values as whitespace separated `lat lon` sequences.
fn parse_ordinates(text: &str) -> Option<Vec<f64>> {
    text.split_whitespace()
        .map(|part| part.parse::<f64>().ok())
        .collect()
}

/// `lat lon lat lon ...` into GeoJSON `[lon, lat]` positions.
fn lat_lon_positions(text: &str) -> Option<Vec<[f64; 2]>> {
    let ordinates = parse_ordinates(text)?;
    if ordinates.len() < 2 || ordinates.len() % 2 != 0 {
        return None;
    }
    Some(ordinates.chunks(2).map(|pair| [pair[1], pair[0]]).collect())
}

/// GeoJSON geometry of a granule: polygon, then box, then point.
pub fn granule_geometry(granule: &CmrGranule) -> Option<Value> {
    if let Some(rings) = granule.polygons.first() {
        let rings: Option<Vec<Vec<[f64; 2]>>> =
            rings.iter().map(|ring| lat_lon_positions(ring)).collect();
        if let Some(rings) = rings.filter(|r| !r.is_empty()) {
            return Some(json!({ "type": "Polygon", "coordinates": rings }));
        }
    }

    if let Some(bx) = granule.boxes.first() {
        if let Some(&[south, west, north, east]) = parse_ordinates(bx).as_deref() {
            return Some(json!({
                "type": "Polygon",
                "coordinates": [[
                    [west, south],
                    [east, south],
                    [east, north],
                    [west, north],
                    [west, south]
                ]]
            }));
        }
    }

    if let Some(point) = granule.points.first() {
        if let Some(positions) = lat_lon_positions(point) {
            let [lon, lat] = positions[0];
            return Some(json!({ "type": "Point", "coordinates": [lon, lat] }));
        }
    }

    None
}

/// `[west, south, east, north]` of a Point or Polygon geometry.
fn geometry_bbox(geometry: &Value) -> Option<[f64; 4]> {
    let positions: Vec<(f64, f64)> = match geometry["type"].as_str()? {
        "Point" => {
            let c = geometry["coordinates"].as_array()?;
            vec![(c.first()?.as_f64()?, c.get(1)?.as_f64()?)]
        }
        "Polygon" => geometry["coordinates"]
            .as_array()?
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|p| Some((p.get(0)?.as_f64()?, p.get(1)?.as_f64()?)))
            .collect(),
        _ => return None,
    };
    if positions.is_empty() {
        return None;
    }

    let mut bbox = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
    for (lon, lat) in positions {
        bbox[0] = bbox[0].min(lon);
        bbox[1] = bbox[1].min(lat);
        bbox[2] = bbox[2].max(lon);
        bbox[3] = bbox[3].max(lat);
    }
    Some(bbox)
}
