use browser_core::{BrowserViewModel, Presentation, SecurityLevel, TabView};

/// Text rendering of the view model, one line per entry.
pub(crate) fn render(view: &BrowserViewModel) -> Vec<String> {
    if !view.ready {
        return vec!["loading tabs...".to_string()];
    }

    let mut lines: Vec<String> = view.tabs.iter().map(tab_line).collect();
    if view.suggest_page_visible {
        let mut status = "address bar focused, suggestions shown".to_string();
        if view.keyboard_inset > 0 {
            status.push_str(&format!(" (keyboard inset {}px)", view.keyboard_inset));
        }
        lines.push(status);
    }
    if let Some(advisory) = &view.advisory {
        let kind = match &advisory.presentation {
            Presentation::Blocking => "BLOCKED: resolve close|continue".to_string(),
            Presentation::Confirmation => "verified site: dismiss".to_string(),
            Presentation::Explanation { disclosure_url } => {
                format!("unverified site, see {disclosure_url}: dismiss")
            }
        };
        lines.push(format!(
            "advisory for tab {} [{}] {} ({})",
            advisory.tab_id,
            level_name(advisory.level),
            advisory.description,
            kind
        ));
    }
    lines
}

fn tab_line(tab: &TabView) -> String {
    let marker = if tab.active { '*' } else { ' ' };
    let title = if tab.title.is_empty() {
        "(untitled)"
    } else {
        tab.title.as_str()
    };
    let mut line = format!("{marker}{:>4}  {title}  {}", tab.id, tab.url);
    if let Some(level) = tab.security_level {
        line.push_str(&format!("  [{}]", level_name(level)));
    }
    line
}

pub(crate) fn level_name(level: SecurityLevel) -> &'static str {
    match level {
        SecurityLevel::Unknown => "unknown",
        SecurityLevel::Whitelisted => "verified",
        SecurityLevel::Warning => "warning",
        SecurityLevel::Danger => "danger",
    }
}
