use browser_core::{AdvisoryChoice, BrowserViewModel, Msg, TabId};

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Send(Msg),
    List,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  open [url]            new tab at the end
  open-right [url]      new tab right of the active one
  close [id]            close a tab (default: active)
  close-all
  switch <id>
  left | right          swipe the active address bar
  nav <id> <url> [title]
  link <uri>            deliver a deep link
  focus | unfocus       address input focus
  keyboard <height> | keyboard-hide
  blur                  leave the browser screen
  shield [id]           show the security advisory
  dismiss | resolve close|continue
  list | help | quit";

pub(crate) fn parse_command(line: &str, view: &BrowserViewModel) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Send(Msg::NoOp));
    };
    let rest: Vec<&str> = words.collect();
    let active = || view.active_id.ok_or_else(|| "tabs are not loaded yet".to_string());
    let url_arg = || rest.first().map(|url| url.to_string());

    let msg = match verb {
        "open" => Msg::NewTabRequested {
            url: url_arg(),
            insert_right: false,
        },
        "open-right" => Msg::NewTabRequested {
            url: url_arg(),
            insert_right: true,
        },
        "close" => Msg::CloseTabRequested {
            tab_id: id_or(rest.first(), active)?,
        },
        "close-all" => Msg::CloseAllTabsRequested,
        "switch" => Msg::SwitchTabRequested {
            tab_id: parse_id(rest.first().ok_or("switch needs a tab id")?)?,
        },
        "left" => Msg::SwipedLeft { tab_id: active()? },
        "right" => Msg::SwipedRight { tab_id: active()? },
        "nav" => {
            let tab_id = parse_id(rest.first().ok_or("nav needs a tab id")?)?;
            let url = rest.get(1).ok_or("nav needs a url")?.to_string();
            let title = (rest.len() > 2).then(|| rest[2..].join(" "));
            Msg::NavigationCommitted { tab_id, url, title }
        }
        "link" => Msg::DeepLinkReceived {
            uri: rest.first().ok_or("link needs a uri")?.to_string(),
        },
        "focus" => Msg::AddressFocusChanged { focused: true },
        "unfocus" => Msg::AddressFocusChanged { focused: false },
        "keyboard" => Msg::KeyboardShown {
            height: rest
                .first()
                .ok_or("keyboard needs a height")?
                .parse()
                .map_err(|_| "keyboard height must be a number".to_string())?,
        },
        "keyboard-hide" => Msg::KeyboardHidden,
        "blur" => Msg::ScreenBlurred,
        "shield" => Msg::ShieldTapped {
            tab_id: id_or(rest.first(), active)?,
        },
        "dismiss" => Msg::AdvisoryDismissRequested,
        "resolve" => Msg::AdvisoryResolved {
            choice: match rest.first().copied() {
                Some("close") => AdvisoryChoice::CloseTab,
                Some("continue") => AdvisoryChoice::ContinueAnyway,
                _ => return Err("resolve needs close or continue".to_string()),
            },
        },
        "list" => return Ok(Command::List),
        "help" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        other => return Err(format!("unknown command {other:?}")),
    };
    Ok(Command::Send(msg))
}

fn parse_id(word: &str) -> Result<TabId, String> {
    word.parse()
        .map_err(|_| format!("{word:?} is not a tab id"))
}

fn id_or(
    word: Option<&&str>,
    active: impl FnOnce() -> Result<TabId, String>,
) -> Result<TabId, String> {
    match word {
        Some(word) => parse_id(word),
        None => active(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loaded(active: TabId) -> BrowserViewModel {
        BrowserViewModel {
            ready: true,
            active_id: Some(active),
            ..BrowserViewModel::default()
        }
    }

    #[test]
    fn defaults_to_the_active_tab() {
        let view = loaded(7);
        assert_eq!(
            parse_command("close", &view),
            Ok(Command::Send(Msg::CloseTabRequested { tab_id: 7 }))
        );
        assert_eq!(
            parse_command("left", &view),
            Ok(Command::Send(Msg::SwipedLeft { tab_id: 7 }))
        );
        assert_eq!(
            parse_command("close 3", &view),
            Ok(Command::Send(Msg::CloseTabRequested { tab_id: 3 }))
        );
    }

    #[test]
    fn nav_joins_the_title() {
        assert_eq!(
            parse_command("nav 2 https://a.example/ A page", &loaded(1)),
            Ok(Command::Send(Msg::NavigationCommitted {
                tab_id: 2,
                url: "https://a.example/".to_string(),
                title: Some("A page".to_string()),
            }))
        );
    }

    #[test]
    fn needs_loaded_tabs_for_active_defaults() {
        let view = BrowserViewModel::default();
        assert!(parse_command("right", &view).is_err());
        assert_eq!(
            parse_command("link wc:abc@1", &view),
            Ok(Command::Send(Msg::DeepLinkReceived {
                uri: "wc:abc@1".to_string(),
            }))
        );
    }

    #[test]
    fn rejects_bad_input() {
        let view = loaded(1);
        assert!(parse_command("switch", &view).is_err());
        assert!(parse_command("switch x", &view).is_err());
        assert!(parse_command("resolve maybe", &view).is_err());
        assert!(parse_command("frobnicate", &view).is_err());
        assert_eq!(parse_command("   ", &view), Ok(Command::Send(Msg::NoOp)));
        assert_eq!(parse_command("quit", &view), Ok(Command::Quit));
    }
}
