//! Route configuration and path resolution.
//!
//! Patterns use the segment syntax of the front-end route tables:
//! `/batches` (static), `/trace/:batchId` (parameter), `/trace/:batchId?`
//! (optional parameter) and `/:pathMatch(.*)*` (catch-all).

use std::collections::BTreeMap;

use tracing::debug;

use super::navigator::path_of;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param { name: String, optional: bool },
    CatchAll(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let Some(param) = raw.strip_prefix(':') else {
            return Segment::Static(raw.to_string());
        };
        if let Some(open) = param.find('(') {
            return Segment::CatchAll(param[..open].to_string());
        }
        match param.strip_suffix('?') {
            Some(name) => Segment::Param {
                name: name.to_string(),
                optional: true,
            },
            None => Segment::Param {
                name: param.to_string(),
                optional: false,
            },
        }
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Static description of one navigable destination.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pattern: String,
    segments: Vec<Segment>,
    name: Option<String>,
    requires_auth: bool,
    redirect: Option<String>,
}

impl RouteDescriptor {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            segments: split_segments(pattern).map(Segment::parse).collect(),
            name: None,
            requires_auth: false,
            redirect: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Make this a pure redirect record: matching it sends the router on to
    /// `target` without running guards for this record.
    pub fn redirect_to(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_protected(&self) -> bool {
        self.requires_auth
    }

    /// Match a path (no query) and extract its parameters.
    fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = split_segments(path).collect();
        let mut params = BTreeMap::new();
        let mut idx = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(expected) => {
                    if parts.get(idx) != Some(&expected.as_str()) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Param { name, optional } => match parts.get(idx) {
                    Some(value) => {
                        params.insert(name.clone(), decode(value));
                        idx += 1;
                    }
                    None if *optional => {}
                    None => return None,
                },
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), parts[idx..].join("/"));
                    idx = parts.len();
                }
            }
        }

        (idx == parts.len()).then_some(params)
    }
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path without query string.
    pub path: String,
    /// Path plus query string, as requested.
    pub full_path: String,
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    /// Name of the matched record, `None` when nothing matched.
    pub name: Option<String>,
    pub requires_auth: bool,
    pub redirect: Option<String>,
}

impl Route {
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn is_matched(&self) -> bool {
        self.name.is_some() || self.redirect.is_some()
    }
}

/// Ordered route configuration. The first matching record wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Resolve a location. Unmatched paths resolve to an unprotected route
    /// with no record, the same as an unknown page in the browser.
    pub fn resolve(&self, location: &str) -> Route {
        let without_fragment = location.split('#').next().unwrap_or_default();
        let path = path_of(without_fragment);
        let query = without_fragment
            .split_once('?')
            .map(|(_, q)| parse_query(q))
            .unwrap_or_default();

        for record in &self.routes {
            if let Some(params) = record.match_path(path) {
                return Route {
                    path: path.to_string(),
                    full_path: without_fragment.to_string(),
                    query,
                    params,
                    name: record.name.clone(),
                    requires_auth: record.requires_auth,
                    redirect: record.redirect.clone(),
                };
            }
        }

        debug!(%path, "No route record matched");
        Route {
            path: path.to_string(),
            full_path: without_fragment.to_string(),
            query,
            params: BTreeMap::new(),
            name: None,
            requires_auth: false,
            redirect: None,
        }
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(&key.replace('+', " ")), decode(&value.replace('+', " ")))
        })
        .collect()
}

/// Encode a query value, leaving path separators readable so a return
/// target shows up as `redirect=/batches`.
fn encode_query_value(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%2F", "/")
        .replace("%3A", ":")
        .replace("%40", "@")
}

/// Append query parameters to a path.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), encode_query_value(v)))
        .collect();
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, sep, query.join("&"))
}
