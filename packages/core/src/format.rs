//! Multi-mode chain renderer.
//!
//! Verbosity is controlled by two independent flags plus a JSON switch:
//!
//! | flags            | output                                              |
//! |------------------|-----------------------------------------------------|
//! | (none)           | display message of the chain head                   |
//! | `detail`         | head only, with raw message, ordinal and call site  |
//! | `trace`          | every link, most recent first, `;`-separated        |
//! | `json` (+ above) | the same information as a JSON array of objects     |
//!
//! Text entries look like
//! `read ledger failed - #0 [src/repo.rs:87 (svc::repo::load)] (100102) Internal error`;
//! JSON entries always carry `error`, plus `message`/`code`/`caller` when
//! decorated. Ordinals count from the head: `#0` is the most recent wrap.

use std::error::Error as StdError;

use serde::Serialize;

use crate::code;
use crate::error::CodedError;
use crate::stack::Frame;

/// Render verbosity selection. The default is the plain terse mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderFlags {
    /// Decorate the head link with its raw message, ordinal and call site.
    pub detail: bool,
    /// Render every link in the chain, not just the head.
    pub trace: bool,
    /// Emit a JSON array instead of text.
    pub json: bool,
}

impl RenderFlags {
    /// Terse user-facing output: the display message only.
    pub const fn plain() -> Self {
        Self {
            detail: false,
            trace: false,
            json: false,
        }
    }

    /// Single-link operator output.
    pub const fn detail() -> Self {
        Self {
            detail: true,
            trace: false,
            json: false,
        }
    }

    /// Full-chain debugging output.
    pub const fn trace() -> Self {
        Self {
            detail: false,
            trace: true,
            json: false,
        }
    }

    /// Switch the selected verbosity to JSON encoding.
    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// A link as seen by the renderer: either one of ours, or a foreign error
/// terminating the chain.
enum Link<'a> {
    Coded(&'a CodedError),
    Foreign(&'a (dyn StdError + 'static)),
}

/// Display metadata computed per link.
struct FormatInfo<'a> {
    code: i32,
    message: String,
    error: String,
    frame: Option<&'a Frame>,
}

#[derive(Serialize)]
struct LinkJson {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
}

/// Walk the chain head-first. A cause that is not a [`CodedError`] is kept
/// as a foreign terminal; its own sources are not followed.
fn collect(head: &CodedError) -> Vec<Link<'_>> {
    let mut links: Vec<Link<'_>> = vec![Link::Coded(head)];
    let mut cursor = head.cause();
    while let Some(err) = cursor {
        match err.downcast_ref::<CodedError>() {
            Some(coded) => {
                links.push(Link::Coded(coded));
                cursor = coded.cause();
            }
            None => {
                links.push(Link::Foreign(err));
                break;
            }
        }
    }
    links
}

fn build_info<'a>(link: &Link<'a>) -> FormatInfo<'a> {
    match link {
        Link::Coded(err) => {
            let coder = code::lookup(err.code());
            let message = if coder.message().is_empty() {
                err.message().to_string()
            } else {
                coder.message().to_string()
            };
            FormatInfo {
                code: coder.code(),
                message,
                error: err.message().to_string(),
                frame: err.stack().top(),
            }
        }
        Link::Foreign(err) => {
            let text = err.to_string();
            FormatInfo {
                code: code::fallback_coder().code(),
                message: text.clone(),
                error: text,
                frame: None,
            }
        }
    }
}

/// The terse display message for the head of a chain: the resolved coder's
/// user-safe message, or the link's own message when the coder has none.
pub(crate) fn display_message(err: &CodedError) -> String {
    build_info(&Link::Coded(err)).message
}

/// Render a chain according to `flags`. Plain and detail modes touch only
/// the head link; trace walks the whole chain.
pub fn render(err: &CodedError, flags: RenderFlags) -> String {
    let links = if flags.trace {
        collect(err)
    } else {
        vec![Link::Coded(err)]
    };
    let decorated = flags.detail || flags.trace;

    if flags.json {
        render_json(&links, decorated)
    } else {
        render_text(&links, decorated)
    }
}

fn render_json(links: &[Link<'_>], decorated: bool) -> String {
    let entries: Vec<LinkJson> = links
        .iter()
        .enumerate()
        .map(|(k, link)| {
            let info = build_info(link);
            if decorated {
                LinkJson {
                    error: info.error,
                    message: Some(info.message),
                    code: Some(info.code),
                    caller: Some(caller_line(k, info.frame)),
                }
            } else {
                LinkJson {
                    error: info.message,
                    message: None,
                    code: None,
                    caller: None,
                }
            }
        })
        .collect();
    serde_json::to_string(&entries).unwrap_or_default()
}

fn render_text(links: &[Link<'_>], decorated: bool) -> String {
    let mut out = String::new();
    for (k, link) in links.iter().enumerate() {
        let info = build_info(link);
        if !decorated {
            out.push_str(&info.message);
            break;
        }
        if k > 0 {
            out.push(';');
        }
        match info.frame {
            Some(frame) => out.push_str(&format!(
                "{} - #{} [{}:{} ({})] ({}) {}",
                info.error,
                k,
                frame.file(),
                frame.line(),
                frame.function(),
                info.code,
                info.message,
            )),
            None => out.push_str(&format!("{} - #{} {}", info.error, k, info.message)),
        }
    }
    out.trim_matches(|c| matches!(c, '\r' | '\n' | '\t')).to_string()
}

fn caller_line(k: usize, frame: Option<&Frame>) -> String {
    match frame {
        Some(frame) => format!("#{} {}:{} ({})", k, frame.file(), frame.line(), frame.function()),
        None => format!("#{}", k),
    }
}
