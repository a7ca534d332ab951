use browser_logging::{browser_debug, browser_warn};
use thiserror::Error;
use url::{form_urlencoded, Url};

const SESSION_SCHEME: &str = "wc";
const WRAPPER_PATH: &str = "wc";
const BROWSER_SCHEME: &str = "dapp";

/// Where wrapped session links may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkConfig {
    /// Host of `https://<product_domain>/wc?uri=...` links.
    pub product_domain: String,
    /// Scheme of `<product_scheme>://wc?uri=...` links.
    pub product_scheme: String,
}

impl Default for DeepLinkConfig {
    fn default() -> Self {
        Self {
            product_domain: "wallet.example".to_string(),
            product_scheme: "walletapp".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkAction {
    OpenSession {
        uri: String,
        redirect: Option<String>,
        autosign: Option<String>,
    },
    NavigateBrowser {
        url: String,
    },
    NotHandled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeepLinkError {
    #[error("malformed uri: {0}")]
    MalformedUri(String),
    #[error("invalid session uri: {0}")]
    InvalidSessionGrammar(String),
}

/// A validated `wc:<topic>@<version>?bridge=<url>&key=<hex>` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUri {
    pub topic: String,
    pub version: u32,
    pub bridge: String,
    pub key: String,
    pub redirect: Option<String>,
    pub autosign: Option<String>,
}

type Params = Vec<(String, String)>;

/// Turn an externally supplied URI into an action.
///
/// `on_handled` runs exactly once, before returning, whenever the result is
/// not [`DeepLinkAction::NotHandled`]. Errors are logged, never returned.
pub fn parse(uri: &str, config: &DeepLinkConfig, mut on_handled: impl FnMut()) -> DeepLinkAction {
    let uri = uri.trim();
    let action = match resolve(uri, config) {
        Ok(action) => action,
        Err(err) => {
            browser_warn!("deeplink: {} ({} chars)", err, uri.len());
            DeepLinkAction::NotHandled
        }
    };
    if action != DeepLinkAction::NotHandled {
        on_handled();
    }
    action
}

/// Validate a bare session URI.
pub fn parse_session_uri(uri: &str) -> Result<SessionUri, DeepLinkError> {
    parse_session(uri, &[])
}

fn resolve(uri: &str, config: &DeepLinkConfig) -> Result<DeepLinkAction, DeepLinkError> {
    let Some((scheme, _)) = uri.split_once(':') else {
        return Err(DeepLinkError::MalformedUri("missing scheme".into()));
    };
    let scheme = scheme.to_ascii_lowercase();

    if scheme == SESSION_SCHEME {
        return open_session(uri, &[]);
    }
    if scheme == "https" {
        let url = Url::parse(uri).map_err(|e| DeepLinkError::MalformedUri(e.to_string()))?;
        let is_wrapper = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&config.product_domain))
            && url.path().trim_matches('/') == WRAPPER_PATH;
        return unwrap_if(is_wrapper, &url);
    }
    if scheme == config.product_scheme.to_ascii_lowercase() {
        let url = Url::parse(uri).map_err(|e| DeepLinkError::MalformedUri(e.to_string()))?;
        let is_wrapper = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(WRAPPER_PATH))
            && url.path().trim_matches('/').is_empty();
        return unwrap_if(is_wrapper, &url);
    }
    if scheme == BROWSER_SCHEME {
        return navigate(uri);
    }

    browser_debug!("deeplink: scheme {:?} not handled", scheme);
    Ok(DeepLinkAction::NotHandled)
}

fn unwrap_if(is_wrapper: bool, url: &Url) -> Result<DeepLinkAction, DeepLinkError> {
    if !is_wrapper {
        return Ok(DeepLinkAction::NotHandled);
    }
    let mut outer = parse_query(url.query().unwrap_or_default());
    let position = outer
        .iter()
        .position(|(name, _)| name == "uri")
        .ok_or_else(|| DeepLinkError::MalformedUri("missing uri parameter".into()))?;
    let (_, inner) = outer.remove(position);
    open_session(&inner, &outer)
}

fn open_session(uri: &str, fallback: &[(String, String)]) -> Result<DeepLinkAction, DeepLinkError> {
    let session = parse_session(uri, fallback)?;
    Ok(DeepLinkAction::OpenSession {
        uri: uri.to_string(),
        redirect: session.redirect,
        autosign: session.autosign,
    })
}

/// `dapp://host/path` opens `https://host/path` in a new tab.
fn navigate(uri: &str) -> Result<DeepLinkAction, DeepLinkError> {
    let rest = uri
        .get(BROWSER_SCHEME.len() + 1..)
        .and_then(|rest| rest.strip_prefix("//"))
        .ok_or_else(|| DeepLinkError::MalformedUri("expected dapp://<host>".into()))?;
    let url = Url::parse(&format!("https://{rest}"))
        .map_err(|e| DeepLinkError::MalformedUri(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(DeepLinkError::MalformedUri("missing host".into()));
    }
    Ok(DeepLinkAction::NavigateBrowser {
        url: url.to_string(),
    })
}

fn parse_session(uri: &str, fallback: &[(String, String)]) -> Result<SessionUri, DeepLinkError> {
    let invalid = |reason: &str| DeepLinkError::InvalidSessionGrammar(reason.to_string());

    let rest = uri
        .get(..SESSION_SCHEME.len() + 1)
        .filter(|prefix| prefix.eq_ignore_ascii_case("wc:"))
        .map(|_| &uri[SESSION_SCHEME.len() + 1..])
        .ok_or_else(|| invalid("not a wc: uri"))?;
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    let (topic, version) = path
        .split_once('@')
        .ok_or_else(|| invalid("expected <topic>@<version>"))?;

    if topic.is_empty() || !topic.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("bad topic"));
    }
    let version: u32 = version.parse().map_err(|_| invalid("bad version"))?;
    if version == 0 {
        return Err(invalid("bad version"));
    }

    let params = parse_query(query);
    let lookup = |name: &str| {
        find_param(&params, name)
            .or_else(|| find_param(fallback, name))
            .filter(|value| !value.is_empty())
    };

    let bridge = lookup("bridge").ok_or_else(|| invalid("missing bridge"))?;
    let bridge_ok = Url::parse(bridge)
        .map(|url| matches!(url.scheme(), "https" | "http") && url.host_str().is_some())
        .unwrap_or(false);
    if !bridge_ok {
        return Err(invalid("bridge is not an http(s) url"));
    }

    let key = lookup("key").ok_or_else(|| invalid("missing key"))?;
    if !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("key is not hex"));
    }

    Ok(SessionUri {
        topic: topic.to_string(),
        version,
        bridge: bridge.to_string(),
        key: key.to_string(),
        redirect: lookup("redirect").map(str::to_string),
        autosign: lookup("autosign").map(str::to_string),
    })
}

/// Decode a query string, dropping pairs with broken percent escapes.
fn parse_query(query: &str) -> Params {
    let mut params = Vec::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        if !has_valid_escapes(pair) {
            browser_warn!("deeplink: dropping malformed query pair {:?}", pair);
            continue;
        }
        params.extend(
            form_urlencoded::parse(pair.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned())),
        );
    }
    params
}

fn find_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn has_valid_escapes(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match (bytes.get(i + 1), bytes.get(i + 2)) {
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
