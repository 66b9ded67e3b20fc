//! Member block extraction for class pages.
//!
//! A member block starts at a level 3 or level 4 heading and runs until the
//! next heading of level 4 or higher, or the end of the page. Blocks are
//! found with a line scanner that tracks fenced code, so `#` lines inside
//! code never start or end a block. Regexes only pick leaf fields out of a
//! block body.
//!
//! Each block yields a [`Member`] and is rewritten in place: the heading gets
//! its resolved `{#anchor}` at level 3 and the "Signature" sub-block is
//! dropped from the body.

use std::sync::LazyLock;

use docpack_renderer::AnchorAllocator;
use regex::Regex;

use crate::page::Member;
use crate::signature::normalize_signature;

/// Deepest heading level that can open or close a member block.
const MEMBER_LEVEL_MAX: usize = 4;

/// Level every member heading is emitted at.
const EMITTED_LEVEL: &str = "###";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{3,4})[ \t]+`?([^`\n]+?)`?[ \t]*(?:\{#([^}\s]+)\})?[ \t]*$").unwrap()
});

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\*{1,2}Signature:?\*{1,2}.*?```[^\n]*\n(.*?)```").unwrap()
});

static FIRST_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").unwrap());

static SIGNATURE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*{1,2}Signature:?\*{1,2}").unwrap());

static SYNOPSIS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,2}Synopsis:?\*{1,2}:?").unwrap());

static LABEL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*{1,2}[^*\s][^*\n]*\*{1,2}").unwrap());

/// Rewritten page text plus the members found in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub markdown: String,
    pub members: Vec<Member>,
}

/// Extract member blocks from a class page.
pub fn extract_members(markdown: &str) -> Extraction {
    let segments = scan(markdown);

    // Explicit anchors are reserved up front so generated ones never take them.
    let mut anchors = AnchorAllocator::new();
    for segment in &segments {
        if let Segment::Member(block) = segment
            && let Some(id) = &block.heading.explicit_id
        {
            anchors.reserve(id);
        }
    }

    let mut output = String::with_capacity(markdown.len());
    let mut members = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => output.push_str(&text),
            Segment::Member(block) => {
                let member = block.to_member(&mut anchors);
                output.push_str(&format!(
                    "{EMITTED_LEVEL} `{}` {{#{}}}\n",
                    block.heading.title, member.anchor_id
                ));
                output.push_str(&remove_signature_block(&block.body));
                members.push(member);
            }
        }
    }

    Extraction {
        markdown: output,
        members,
    }
}

#[derive(Debug)]
struct MemberHeading {
    title: String,
    explicit_id: Option<String>,
}

impl MemberHeading {
    fn parse(line: &str) -> Option<Self> {
        let caps = HEADING_RE.captures(line.trim_end_matches(['\n', '\r']))?;
        let title = caps[2].trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_owned(),
            explicit_id: caps.get(3).map(|m| m.as_str().to_owned()),
        })
    }
}

#[derive(Debug)]
struct MemberBlock {
    heading: MemberHeading,
    body: String,
}

impl MemberBlock {
    fn to_member(&self, anchors: &mut AnchorAllocator) -> Member {
        let anchor_id = match &self.heading.explicit_id {
            Some(id) => id.clone(),
            None => anchors.allocate(&self.heading.title),
        };
        let signature = find_signature(&self.body).unwrap_or(&self.heading.title);
        Member {
            anchor_id,
            title: normalize_signature(&self.heading.title),
            signature: normalize_signature(signature),
            synopsis: find_synopsis(&self.body),
        }
    }
}

#[derive(Debug)]
enum Segment {
    Text(String),
    Member(MemberBlock),
}

enum ScanState {
    Scanning,
    InBlock(MemberBlock),
}

/// Split a page into plain text runs and member blocks.
fn scan(markdown: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut fence = FenceTracker::default();
    let mut state = ScanState::Scanning;

    for line in markdown.split_inclusive('\n') {
        let level = if fence.observe(line) {
            None
        } else {
            heading_level(line)
        };

        state = match state {
            ScanState::Scanning => open_or_append(line, level, &mut text, &mut segments),
            ScanState::InBlock(mut block) => {
                if level.is_some_and(|level| level <= MEMBER_LEVEL_MAX) {
                    segments.push(Segment::Member(block));
                    open_or_append(line, level, &mut text, &mut segments)
                } else {
                    block.body.push_str(line);
                    ScanState::InBlock(block)
                }
            }
        };
    }

    if let ScanState::InBlock(block) = state {
        segments.push(Segment::Member(block));
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

fn open_or_append(
    line: &str,
    level: Option<usize>,
    text: &mut String,
    segments: &mut Vec<Segment>,
) -> ScanState {
    if matches!(level, Some(3 | 4))
        && let Some(heading) = MemberHeading::parse(line)
    {
        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(text)));
        }
        return ScanState::InBlock(MemberBlock {
            heading,
            body: String::new(),
        });
    }
    text.push_str(line);
    ScanState::Scanning
}

/// ATX heading level of `line`, if it is a heading.
fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    match line.as_bytes().get(hashes) {
        None | Some(b' ' | b'\t' | b'\n' | b'\r') => Some(hashes),
        _ => None,
    }
}

/// Fence delimiter at the start of `line`: marker byte and run length.
fn fence_marker(line: &str) -> Option<(u8, usize)> {
    let trimmed = line.trim_start_matches(' ');
    let marker = *trimmed.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let run = trimmed.bytes().take_while(|b| *b == marker).count();
    (run >= 3).then_some((marker, run))
}

fn closes_fence(line: &str, open: (u8, usize)) -> bool {
    match fence_marker(line) {
        Some((marker, run)) => {
            marker == open.0 && run >= open.1 && line.trim_start_matches(' ')[run..].trim().is_empty()
        }
        None => false,
    }
}

/// Tracks whether a line-by-line walk is inside fenced code.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(u8, usize)>,
}

impl FenceTracker {
    /// Feed one line; returns true if it is fence content or a delimiter.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        match self.open {
            Some(open) => {
                if closes_fence(line, open) {
                    self.open = None;
                }
                true
            }
            None => {
                self.open = fence_marker(line);
                self.open.is_some()
            }
        }
    }
}

/// Code of the labeled "Signature" fence, else of the first fence.
fn find_signature(body: &str) -> Option<&str> {
    SIGNATURE_RE
        .captures(body)
        .or_else(|| FIRST_FENCE_RE.captures(body))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|code| !code.is_empty())
}

/// Whitespace-collapsed text after the "Synopsis" label, up to the next
/// labeled sub-block, heading or fence.
fn find_synopsis(body: &str) -> String {
    let Some(label) = SYNOPSIS_LABEL_RE.find(body) else {
        return String::new();
    };

    let mut words: Vec<&str> = Vec::new();
    for line in body[label.end()..].lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#')
            || fence_marker(trimmed).is_some()
            || (!words.is_empty() && LABEL_LINE_RE.is_match(trimmed))
        {
            break;
        }
        words.extend(trimmed.split_whitespace());
    }
    words.join(" ")
}

/// Drop the "Signature" label line and the fenced block right after it.
fn remove_signature_block(body: &str) -> String {
    let lines: Vec<&str> = body.split_inclusive('\n').collect();
    let Some(start) = lines
        .iter()
        .position(|line| SIGNATURE_LABEL_RE.is_match(line.trim_start()))
    else {
        return body.to_owned();
    };

    let mut end = start + 1;
    let mut next = end;
    while next < lines.len() && lines[next].trim().is_empty() {
        next += 1;
    }
    if let Some(open) = lines.get(next).and_then(|line| fence_marker(line)) {
        let mut close = next + 1;
        while close < lines.len() && !closes_fence(lines[close], open) {
            close += 1;
        }
        end = (close + 1).min(lines.len());
    }
    while end < lines.len() && lines[end].trim().is_empty() {
        end += 1;
    }

    let mut result = lines[..start].concat();
    result.push_str(&lines[end..].concat());
    result
}
